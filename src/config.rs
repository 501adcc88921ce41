use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub key_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub storage: Option<StorageConfig>, // avatar uploads are unavailable without it
    pub avatar_url_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let storage = match std::env::var("S3_ENDPOINT") {
            Ok(endpoint) => Some(StorageConfig {
                endpoint,
                bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "profiles".into()),
                access_key: std::env::var("S3_ACCESS_KEY")?,
                secret_key: std::env::var("S3_SECRET_KEY")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                key_prefix: std::env::var("S3_KEY_PREFIX").ok(),
            }),
            Err(_) => None,
        };
        let avatar_url_ttl_secs = std::env::var("AVATAR_URL_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30 * 60);
        Ok(Self {
            database_url,
            storage,
            avatar_url_ttl_secs,
        })
    }
}
