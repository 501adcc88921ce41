pub mod email;
pub mod manager;
pub mod model;
pub mod password;
pub mod repo;

pub use manager::{create_superuser, create_user};
pub use model::{Account, ExtraFields};
pub use repo::{AccountStore, MemoryAccountStore, PgAccountStore};
