/// Canonicalizes an email address before it is stored or compared.
///
/// Surrounding whitespace is dropped and the domain (everything after the last `@`)
/// is lowercased. The local part is case sensitive and left alone. Input without an
/// `@` only gets trimmed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn lowercases_domain_only() {
        assert_eq!(normalize_email("John.Doe@EXAMPLE.Com"), "John.Doe@example.com");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize_email("  test@Example.com\n"), "test@example.com");
    }

    #[test]
    fn splits_on_last_at_sign() {
        assert_eq!(normalize_email("\"a@b\"@HOST.org"), "\"a@b\"@host.org");
    }

    #[test]
    fn leaves_input_without_at_sign() {
        assert_eq!(normalize_email(" NoDomain "), "NoDomain");
    }

    #[test]
    fn already_normal_is_unchanged() {
        let once = normalize_email("admin@example.com");
        assert_eq!(normalize_email(&once), once);
    }
}
