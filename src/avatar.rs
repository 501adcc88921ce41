use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::accounts::{Account, AccountStore};
use crate::error::{AccountError, Result};
use crate::storage::StorageClient;

/// Storage key for an account's avatar: `user_<id>/<filename>` once the account has
/// an id, `temp/<filename>` before its first save. `filename` is used as given.
pub fn user_avatar_path(account: &Account, filename: &str) -> String {
    match account.id {
        Some(id) if id != 0 => format!("user_{}/{}", id, filename),
        _ => format!("temp/{}", filename),
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Deletes an object the account no longer references. Failures are only logged:
/// a leftover object is harmless, the account row is already correct.
async fn discard_object(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %e, key, "could not delete unreferenced avatar object");
    }
}

/// Uploads `body` as the account's avatar and saves the new `avatar_path`.
///
/// If the save fails the uploaded object is deleted again. A previous avatar
/// stored under a different key is deleted once the new path is saved.
#[instrument(skip(storage, store, account, body), fields(account_id = ?account.id))]
pub async fn upload_avatar(
    storage: &dyn StorageClient,
    store: &dyn AccountStore,
    mut account: Account,
    filename: &str,
    body: Bytes,
) -> Result<Account> {
    if !account.is_saved() {
        warn!("account has no id yet, avatar goes under temp/");
    }
    let key = user_avatar_path(&account, filename);
    storage
        .put_object(&key, body, content_type_for(filename))
        .await
        .map_err(AccountError::Storage)?;

    let previous = account.avatar_path.replace(key.clone());
    let account = match store.save(account).await {
        Ok(account) => account,
        Err(e) => {
            discard_object(storage, &key).await;
            return Err(e);
        }
    };
    if let Some(old) = previous.filter(|old| *old != key) {
        discard_object(storage, &old).await;
    }
    info!(avatar_path = %key, "avatar uploaded");
    Ok(account)
}

/// Clears `avatar_path`, saves, then deletes the stored object.
#[instrument(skip(storage, store, account), fields(account_id = ?account.id))]
pub async fn remove_avatar(
    storage: &dyn StorageClient,
    store: &dyn AccountStore,
    mut account: Account,
) -> Result<Account> {
    let Some(key) = account.avatar_path.take() else {
        return Ok(account);
    };
    let account = store.save(account).await?;
    discard_object(storage, &key).await;
    info!(removed = %key, "avatar removed");
    Ok(account)
}

/// Time-limited download URL for the account's avatar.
pub async fn avatar_url(
    storage: &dyn StorageClient,
    account: &Account,
    expires_seconds: u64,
) -> Result<Option<String>> {
    match &account.avatar_path {
        Some(key) => storage
            .presign_get(key, expires_seconds)
            .await
            .map(Some)
            .map_err(AccountError::Storage),
        None => Ok(None),
    }
}
