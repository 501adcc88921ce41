use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::password::{hash_password, verify_password};
use crate::error::Result;

/// Account record. The email is the login identifier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Option<i64>,              // assigned by the store on first save
    pub email: String,                // normalized, unique
    #[serde(skip_serializing, default)]
    pub password_hash: String,        // argon2 PHC string, never exposed in JSON
    pub avatar_path: Option<String>,  // storage key of the uploaded avatar
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>, // refreshed by every save
}

impl Account {
    /// Unsaved, unprivileged account with no usable password.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            password_hash: String::new(),
            avatar_path: None,
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: OffsetDateTime::now_utc(),
            last_login: None,
        }
    }

    pub fn set_password(&mut self, plain: &str) -> Result<()> {
        self.password_hash = hash_password(plain)?;
        Ok(())
    }

    /// `false` for a wrong password and for a hash that was never set.
    pub fn check_password(&self, plain: &str) -> bool {
        verify_password(plain, &self.password_hash).unwrap_or(false)
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

/// Optional attributes accepted by the account factory. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFields {
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_path: Option<String>,
}

impl ExtraFields {
    pub(crate) fn apply(self, account: &mut Account) {
        if let Some(v) = self.is_staff {
            account.is_staff = v;
        }
        if let Some(v) = self.is_superuser {
            account.is_superuser = v;
        }
        if let Some(v) = self.is_active {
            account.is_active = v;
        }
        if let Some(v) = self.first_name {
            account.first_name = v;
        }
        if let Some(v) = self.last_name {
            account.last_name = v;
        }
        if self.avatar_path.is_some() {
            account.avatar_path = self.avatar_path;
        }
    }
}
