use tracing::{info, instrument, warn};

use super::email::normalize_email;
use super::model::{Account, ExtraFields};
use super::repo::AccountStore;
use crate::error::{AccountError, Result};

/// Creates and saves an account identified by `email`.
///
/// The email must be non-blank; it is normalized before use. Fields in `extra`
/// override the model defaults, so this never grants privileges on its own.
#[instrument(skip(store, password, extra))]
pub async fn create_user(
    store: &dyn AccountStore,
    email: &str,
    password: &str,
    extra: ExtraFields,
) -> Result<Account> {
    if email.trim().is_empty() {
        warn!("create_user called without email");
        return Err(AccountError::validation("The Email must be set"));
    }

    let mut account = Account::new(normalize_email(email));
    extra.apply(&mut account);
    account.set_password(password)?;

    let account = store.save(account).await?;
    info!(
        account_id = ?account.id,
        email = %account.email,
        is_staff = account.is_staff,
        is_superuser = account.is_superuser,
        "account created"
    );
    Ok(account)
}

/// Creates a superuser. Missing privilege flags default to `true`; an explicit
/// `false` for `is_staff` or `is_superuser` is rejected.
#[instrument(skip(store, password, extra))]
pub async fn create_superuser(
    store: &dyn AccountStore,
    email: &str,
    password: &str,
    mut extra: ExtraFields,
) -> Result<Account> {
    extra.is_staff.get_or_insert(true);
    extra.is_superuser.get_or_insert(true);
    extra.is_active.get_or_insert(true);

    if extra.is_staff != Some(true) {
        warn!("superuser requested with is_staff=false");
        return Err(AccountError::validation("Superuser must have is_staff=True."));
    }
    if extra.is_superuser != Some(true) {
        warn!("superuser requested with is_superuser=false");
        return Err(AccountError::validation(
            "Superuser must have is_superuser=True.",
        ));
    }

    create_user(store, email, password, extra).await
}
