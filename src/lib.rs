//! Email-keyed user accounts: creation of regular and superuser accounts, password
//! hashing, persistence and avatar storage keys.

pub mod accounts;
pub mod avatar;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;

pub use accounts::{create_superuser, create_user, Account, AccountStore, ExtraFields};
pub use avatar::user_avatar_path;
pub use error::{AccountError, Result};
