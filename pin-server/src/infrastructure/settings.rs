use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "development" | "dev" | "test" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(anyhow!("unknown APP_ENV '{other}'")),
        }
    }

    pub(crate) fn is_production(self) -> bool {
        matches!(self, AppEnv::Production)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum MediaSettings {
    Local {
        dir: String,
        public_url: String,
    },
    Cloudinary {
        cloud_name: String,
        api_key: String,
        api_secret: String,
        folder: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) database_url: String,
    pub(crate) database_max_connections: u32,
    pub(crate) jwt_secret: String,
    pub(crate) jwt_ttl_seconds: i64,
    pub(crate) http_addr: String,
    pub(crate) app_env: AppEnv,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) log_level: String,
    pub(crate) http_request_body_limit_bytes: usize,
    pub(crate) http_concurrency_limit: usize,
    pub(crate) http_request_timeout_secs: u64,
    pub(crate) media: MediaSettings,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = parse_usize_env("DATABASE_MAX_CONNECTIONS", 10)? as u32;
        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        let jwt_ttl_seconds: i64 = std::env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| "21600".to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let http_addr = match std::env::var("HTTP_ADDR") {
            Ok(addr) => addr,
            Err(_) => {
                let port: u16 = std::env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("Failed to parse PORT, expecting 0..65535")?;
                format!("0.0.0.0:{port}")
            }
        };
        let app_env = AppEnv::parse(&std::env::var("APP_ENV").unwrap_or_default())?;
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 10 * 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 30)?;
        let media = media_from_env()?;

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            app_env,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            media,
        })
    }
}

fn media_from_env() -> Result<MediaSettings> {
    let backend = std::env::var("MEDIA_BACKEND").unwrap_or_else(|_| "local".to_string());
    match backend.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(MediaSettings::Local {
            dir: std::env::var("MEDIA_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            public_url: std::env::var("MEDIA_PUBLIC_URL")
                .unwrap_or_else(|_| "/uploads".to_string())
                .trim_end_matches('/')
                .to_string(),
        }),
        "cloudinary" => Ok(MediaSettings::Cloudinary {
            cloud_name: get_required("CLOUDINARY_CLOUD_NAME")
                .context("CLOUDINARY_CLOUD_NAME is required for MEDIA_BACKEND=cloudinary")?,
            api_key: get_required("CLOUDINARY_API_KEY")
                .context("CLOUDINARY_API_KEY is required for MEDIA_BACKEND=cloudinary")?,
            api_secret: get_required("CLOUDINARY_API_SECRET")
                .context("CLOUDINARY_API_SECRET is required for MEDIA_BACKEND=cloudinary")?,
            folder: get_required("CLOUDINARY_FOLDER").ok(),
        }),
        other => Err(anyhow!("unknown MEDIA_BACKEND '{other}', expecting local|cloudinary")),
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{AppEnv, parse_cors_origins};

    #[test]
    fn app_env_accepts_known_values() {
        assert_eq!(AppEnv::parse("").expect("empty"), AppEnv::Development);
        assert_eq!(AppEnv::parse("Production").expect("prod"), AppEnv::Production);
        assert!(AppEnv::parse("staging").is_err());
    }

    #[test]
    fn cors_origins_skip_blank_entries() {
        let origins = parse_cors_origins(" http://a.test , ,http://b.test".to_string());
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }
}
