//! Property-based tests for account creation and avatar keys.

use proptest::prelude::*;

use profiles::accounts::{create_user, ExtraFields, MemoryAccountStore};
use profiles::{user_avatar_path, Account};

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(fut)
}

proptest! {
    // every case runs a full argon2 hash
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The stored email is the trimmed input with a lowercased domain, and the
    /// stored hash verifies against the original password.
    #[test]
    fn prop_create_user_normalizes_and_keeps_password(
        pad_left in "[ \t]{0,3}",
        local in "[A-Za-z0-9._+-]{1,20}",
        domain in "[A-Za-z0-9-]{1,15}\\.[A-Za-z]{2,6}",
        pad_right in "[ \t]{0,3}",
        password in "\\PC{0,32}",
    ) {
        let raw = format!("{}{}@{}{}", pad_left, local, domain, pad_right);
        let store = MemoryAccountStore::new();
        let account = block_on(create_user(&store, &raw, &password, ExtraFields::default()))
            .expect("non-blank email is accepted");

        prop_assert_eq!(&account.email, &format!("{}@{}", local, domain.to_lowercase()));
        prop_assert!(account.check_password(&password));
        prop_assert!(account.id.is_some());
        prop_assert!(!account.is_staff && !account.is_superuser);
    }
}

proptest! {
    /// Blank emails are rejected whatever the password is.
    #[test]
    fn prop_blank_email_is_rejected(
        blank in "[ \t\r\n]{0,5}",
        password in "\\PC{0,32}",
    ) {
        let store = MemoryAccountStore::new();
        let err = block_on(create_user(&store, &blank, &password, ExtraFields::default()))
            .expect_err("blank email must fail");
        prop_assert!(err.is_validation());
        prop_assert!(store.is_empty());
    }

    /// The avatar key is a pure function of the id and the filename.
    #[test]
    fn prop_avatar_path_is_stable(
        id in proptest::option::of(1i64..i64::MAX),
        name in "\\PC{1,40}",
    ) {
        let mut account = Account::new("a@example.com");
        account.id = id;

        let first = user_avatar_path(&account, &name);
        prop_assert_eq!(&first, &user_avatar_path(&account, &name));
        match id {
            Some(id) => {
                prop_assert_eq!(first, format!("user_{}/{}", id, name));
            }
            None => {
                prop_assert_eq!(first, format!("temp/{}", name));
            }
        }
    }
}
