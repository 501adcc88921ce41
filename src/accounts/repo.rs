use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use super::model::Account;
use crate::error::{AccountError, Result};

/// Persistence for accounts.
///
/// `save` inserts when the account has no id and updates otherwise. Either way the
/// returned account carries its id and a fresh `last_login`. A second account with an
/// email that is already stored fails with [`AccountError::UniquenessViolation`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn save(&self, account: Account) -> Result<Account>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>>;
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, avatar_path, first_name, last_name, \
     is_active, is_staff, is_superuser, date_joined, last_login";

/// Postgres-backed store over the `accounts` table.
#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn insert(&self, account: &Account) -> Result<Account> {
        let sql = format!(
            r#"
            INSERT INTO accounts (email, password_hash, avatar_path, first_name, last_name,
                                  is_active, is_staff, is_superuser, date_joined, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.avatar_path)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.is_active)
            .bind(account.is_staff)
            .bind(account.is_superuser)
            .bind(account.date_joined)
            .fetch_one(&self.db)
            .await
            .map_err(|e| write_error(e, &account.email))
    }

    async fn update(&self, id: i64, account: &Account) -> Result<Account> {
        let sql = format!(
            r#"
            UPDATE accounts
               SET email = $2, password_hash = $3, avatar_path = $4, first_name = $5,
                   last_name = $6, is_active = $7, is_staff = $8, is_superuser = $9,
                   last_login = now()
             WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.avatar_path)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.is_active)
            .bind(account.is_staff)
            .bind(account.is_superuser)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| write_error(e, &account.email))?
            .ok_or(AccountError::NotFound)
    }
}

fn write_error(e: sqlx::Error, email: &str) -> AccountError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AccountError::UniquenessViolation {
                email: email.to_string(),
            };
        }
    }
    AccountError::Database(e)
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn save(&self, account: Account) -> Result<Account> {
        let saved = match account.id {
            None => self.insert(&account).await?,
            Some(id) => self.update(id, &account).await?,
        };
        debug!(account_id = ?saved.id, "account saved");
        Ok(saved)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(account)
    }
}

/// In-process store with the same contract as [`PgAccountStore`].
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    last_id: i64,
    rows: BTreeMap<i64, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn save(&self, mut account: Account) -> Result<Account> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        let taken = inner
            .rows
            .values()
            .any(|row| row.email == account.email && row.id != account.id);
        if taken {
            return Err(AccountError::UniquenessViolation {
                email: account.email,
            });
        }

        let id = match account.id {
            Some(id) if inner.rows.contains_key(&id) => id,
            Some(_) => return Err(AccountError::NotFound),
            None => {
                inner.last_id += 1;
                inner.last_id
            }
        };
        account.id = Some(id);
        account.last_login = Some(OffsetDateTime::now_utc());
        inner.rows.insert(id, account.clone());
        debug!(account_id = id, "account saved");
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.rows.values().find(|row| row.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_save_assigns_increasing_ids() {
        let store = MemoryAccountStore::new();
        let a = store.save(Account::new("a@example.com")).await.unwrap();
        let b = store.save(Account::new("b@example.com")).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn save_with_id_updates_in_place() {
        let store = MemoryAccountStore::new();
        let mut acc = store.save(Account::new("a@example.com")).await.unwrap();
        acc.first_name = "Ada".into();
        let acc = store.save(acc).await.unwrap();
        assert_eq!(acc.id, Some(1));
        assert_eq!(store.len(), 1);
        let found = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.first_name, "Ada");
    }

    #[tokio::test]
    async fn every_save_refreshes_last_login() {
        let store = MemoryAccountStore::new();
        let acc = store.save(Account::new("a@example.com")).await.unwrap();
        let first = acc.last_login.expect("set on insert");
        let acc = store.save(acc).await.unwrap();
        assert!(acc.last_login.unwrap() >= first);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryAccountStore::new();
        store.save(Account::new("a@example.com")).await.unwrap();
        let err = store.save(Account::new("a@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            AccountError::UniquenessViolation { ref email } if email == "a@example.com"
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryAccountStore::new();
        let mut acc = Account::new("a@example.com");
        acc.id = Some(7);
        assert!(matches!(store.save(acc).await, Err(AccountError::NotFound)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn find_by_email_is_exact() {
        let store = MemoryAccountStore::new();
        store.save(Account::new("a@example.com")).await.unwrap();
        assert!(store.find_by_email("a@example.com").await.unwrap().is_some());
        assert!(store.find_by_email("b@example.com").await.unwrap().is_none());
    }
}
