use thiserror::Error;

/// Errors surfaced by account creation and the collaborators behind it.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("an account with email {email} already exists")]
    UniquenessViolation { email: String },

    #[error("account not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl AccountError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        AccountError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AccountError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = AccountError::validation("The Email must be set");
        assert_eq!(err.to_string(), "The Email must be set");
        assert!(err.is_validation());
    }

    #[test]
    fn uniqueness_violation_names_the_email() {
        let err = AccountError::UniquenessViolation {
            email: "a@example.com".into(),
        };
        assert!(err.to_string().contains("a@example.com"));
        assert!(!err.is_validation());
    }
}
