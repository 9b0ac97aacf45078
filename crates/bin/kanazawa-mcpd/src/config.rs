use clap::{Parser, builder::BoolishValueParser};
use kanazawa_store::schema::DEFAULT_OPEN_DATA_BASE_URL;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_DB_URI: &str = "mem://";
const DEFAULT_DB_NAMESPACE: &str = "kanazawa";
const DEFAULT_DB_NAME: &str = "city";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_API_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_API_TIMEOUT_SECS: u64 = 45;
const DEFAULT_CACHE_SWEEP_SECS: u64 = 60;

#[derive(Parser, Debug)]
#[command(name = "kanazawa-mcpd", version, about = "Kanazawa MCP daemon.")]
#[allow(clippy::struct_excessive_bools)]
struct CliArgs {
    #[arg(
        long,
        env = "KANAZAWA_USE_OPEN_DATA",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    use_open_data: bool,

    #[arg(
        long,
        env = "KANAZAWA_OPEN_DATA_BASE_URL",
        default_value = DEFAULT_OPEN_DATA_BASE_URL
    )]
    open_data_base_url: String,

    #[arg(long, env = "KANAZAWA_CACHE_URI")]
    cache_uri: Option<String>,

    #[arg(
        long,
        env = "KANAZAWA_CACHE_SWEEP_SECS",
        default_value_t = DEFAULT_CACHE_SWEEP_SECS
    )]
    cache_sweep_secs: u64,

    #[arg(
        long,
        env = "KANAZAWA_DB_ENABLED",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    db_enabled: bool,

    #[arg(long, env = "KANAZAWA_DB_URI", default_value = DEFAULT_DB_URI)]
    db_uri: String,

    #[arg(long, env = "KANAZAWA_DB_USERNAME")]
    db_username: Option<String>,

    #[arg(long, env = "KANAZAWA_DB_PASSWORD")]
    db_password: Option<String>,

    #[arg(long, env = "KANAZAWA_DB_NAMESPACE", default_value = DEFAULT_DB_NAMESPACE)]
    db_namespace: String,

    #[arg(long, env = "KANAZAWA_DB_NAME", default_value = DEFAULT_DB_NAME)]
    db_name: String,

    #[arg(
        long = "stdio",
        env = "KANAZAWA_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "KANAZAWA_MCP_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "KANAZAWA_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "KANAZAWA_API_SERVE",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    api_serve: bool,

    #[arg(long, env = "KANAZAWA_API_ADDR", default_value = DEFAULT_API_ADDR)]
    api_addr: SocketAddr,

    #[arg(
        long,
        env = "KANAZAWA_API_TIMEOUT_SECS",
        default_value_t = DEFAULT_API_TIMEOUT_SECS
    )]
    api_timeout_secs: u64,
}

/// Credentials for a remote `SurrealDB` endpoint.
#[derive(Clone)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct KanazawaConfig {
    pub use_open_data: bool,
    pub open_data_base_url: String,
    pub cache_uri: Option<String>,
    pub cache_sweep_interval: Duration,
    pub db_enabled: bool,
    pub db_uri: String,
    pub db_credentials: Option<DbCredentials>,
    pub db_namespace: String,
    pub db_name: String,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub api_serve: bool,
    pub api_addr: SocketAddr,
    pub api_timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl KanazawaConfig {
    /// Parses process arguments and environment.
    ///
    /// # Errors
    /// Returns `ConfigError` when a setting is missing or invalid.
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for KanazawaConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let open_data_base_url = args.open_data_base_url.trim().to_string();
        if args.use_open_data
            && !(open_data_base_url.starts_with("http://")
                || open_data_base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidSetting {
                name: "KANAZAWA_OPEN_DATA_BASE_URL",
                value: args.open_data_base_url,
            });
        }

        let cache_uri = args.cache_uri.filter(|value| !value.trim().is_empty());
        if args.cache_sweep_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "KANAZAWA_CACHE_SWEEP_SECS",
                value: args.cache_sweep_secs.to_string(),
            });
        }

        let db_uri = args.db_uri.trim().to_string();
        if args.db_enabled && db_uri.is_empty() {
            return Err(ConfigError::MissingSetting("KANAZAWA_DB_URI"));
        }
        let db_username = args.db_username.filter(|value| !value.trim().is_empty());
        let db_password = args.db_password.filter(|value| !value.trim().is_empty());
        let db_credentials = match (db_username, db_password) {
            (Some(username), Some(password)) => Some(DbCredentials { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingSetting("KANAZAWA_DB_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::MissingSetting("KANAZAWA_DB_USERNAME")),
        };

        if args.db_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "KANAZAWA_DB_NAMESPACE",
                value: args.db_namespace,
            });
        }
        if args.db_name.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "KANAZAWA_DB_NAME",
                value: args.db_name,
            });
        }

        if args.api_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "KANAZAWA_API_TIMEOUT_SECS",
                value: args.api_timeout_secs.to_string(),
            });
        }

        if !(args.enable_stdio || args.mcp_serve || args.api_serve) {
            return Err(ConfigError::MissingSetting(
                "KANAZAWA_ENABLE_STDIO, KANAZAWA_MCP_SERVE, or KANAZAWA_API_SERVE",
            ));
        }

        Ok(Self {
            use_open_data: args.use_open_data,
            open_data_base_url,
            cache_uri,
            cache_sweep_interval: Duration::from_secs(args.cache_sweep_secs),
            db_enabled: args.db_enabled,
            db_uri,
            db_credentials,
            db_namespace: args.db_namespace,
            db_name: args.db_name,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            api_serve: args.api_serve,
            api_addr: args.api_addr,
            api_timeout: Duration::from_secs(args.api_timeout_secs),
        })
    }
}
