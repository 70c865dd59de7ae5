use std::str::FromStr;

use validator::Validate;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TenantCredentialSource {
    Header,
    Cookie,
}

impl TenantCredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl FromStr for TenantCredentialSource {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TenantDirectoryMode {
    None,
    Postgres,
}

impl FromStr for TenantDirectoryMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "postgres" => Ok(Self::Postgres),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, Validate)]
pub struct TenancySettings {
    pub credential_source: TenantCredentialSource,

    #[validate(length(min = 1, max = 128))]
    pub header_name: String,

    #[validate(length(min = 1, max = 128))]
    pub cookie_name: String,

    #[validate(length(min = 16))]
    pub cookie_secret: Option<String>,

    #[validate(length(min = 1))]
    pub database_url_template: String,

    #[validate(length(max = 32))]
    pub database_prefix: String,

    pub directory: TenantDirectoryMode,

    #[validate(range(min = 1, max = 100))]
    pub pool_max_connections: u32,

    #[validate(range(min = 100, max = 120000))]
    pub connect_timeout_ms: u64,

    #[validate(range(min = 1))]
    pub idle_timeout_secs: Option<u64>,

    pub verify_model_tables: bool,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub postgres_host: String,
    pub postgres_port: u16,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_admin_database: String,
    pub tenancy: TenancySettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let postgres_host =
            std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let postgres_port = std::env::var("POSTGRES_PORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse()
            .unwrap_or(5432);
        let postgres_user =
            std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
        let postgres_password =
            std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        let database_url_template = std::env::var("TENANT_DATABASE_URL_TEMPLATE")
            .unwrap_or_else(|_| {
                format!(
                    "postgres://{}:{}@{}:{}/{{tenant}}",
                    postgres_user, postgres_password, postgres_host, postgres_port
                )
            });

        let tenancy = TenancySettings {
            credential_source: std::env::var("TENANT_SOURCE")
                .ok()
                .and_then(|raw| raw.trim().to_lowercase().parse().ok())
                .unwrap_or(TenantCredentialSource::Header),
            header_name: std::env::var("TENANT_HEADER_NAME")
                .unwrap_or_else(|_| "x-tenant-id".to_string())
                .to_lowercase(),
            cookie_name: std::env::var("TENANT_COOKIE_NAME")
                .unwrap_or_else(|_| "tenant".to_string()),
            cookie_secret: std::env::var("TENANT_COOKIE_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            database_url_template,
            database_prefix: std::env::var("TENANT_DATABASE_PREFIX").unwrap_or_default(),
            directory: std::env::var("TENANT_DIRECTORY")
                .ok()
                .and_then(|raw| raw.trim().to_lowercase().parse().ok())
                .unwrap_or(TenantDirectoryMode::None),
            pool_max_connections: std::env::var("TENANT_POOL_MAX_CONNECTIONS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(5),
            connect_timeout_ms: std::env::var("TENANT_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(5000),
            idle_timeout_secs: std::env::var("TENANT_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok()),
            verify_model_tables: std::env::var("TENANT_VERIFY_MODEL_TABLES")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
        };

        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .unwrap_or(8081),
            postgres_host,
            postgres_port,
            postgres_user,
            postgres_password,
            postgres_admin_database: std::env::var("POSTGRES_ADMIN_DATABASE")
                .unwrap_or_else(|_| "postgres".to_string()),
            tenancy,
        }
    }

    pub fn admin_database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_admin_database
        )
    }
}
