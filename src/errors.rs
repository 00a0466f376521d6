use std::fmt;

#[derive(Debug, Clone)]
pub enum UrlxError {
    Config(String),
    MissingCredentials(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    Serialization(String),
    LoggingInit(String),
    ShipperStart(String),
}

impl UrlxError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            UrlxError::Config(_) => "E001",
            UrlxError::MissingCredentials(_) => "E002",
            UrlxError::DatabaseConfig(_) => "E003",
            UrlxError::DatabaseConnection(_) => "E004",
            UrlxError::DatabaseOperation(_) => "E005",
            UrlxError::FileOperation(_) => "E006",
            UrlxError::Validation(_) => "E007",
            UrlxError::Serialization(_) => "E008",
            UrlxError::LoggingInit(_) => "E009",
            UrlxError::ShipperStart(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            UrlxError::Config(_) => "Configuration Error",
            UrlxError::MissingCredentials(_) => "Missing Log Sink Credentials",
            UrlxError::DatabaseConfig(_) => "Database Configuration Error",
            UrlxError::DatabaseConnection(_) => "Database Connection Error",
            UrlxError::DatabaseOperation(_) => "Database Operation Error",
            UrlxError::FileOperation(_) => "File Operation Error",
            UrlxError::Validation(_) => "Validation Error",
            UrlxError::Serialization(_) => "Serialization Error",
            UrlxError::LoggingInit(_) => "Logging Initialization Error",
            UrlxError::ShipperStart(_) => "Log Shipper Startup Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            UrlxError::Config(msg)
            | UrlxError::MissingCredentials(msg)
            | UrlxError::DatabaseConfig(msg)
            | UrlxError::DatabaseConnection(msg)
            | UrlxError::DatabaseOperation(msg)
            | UrlxError::FileOperation(msg)
            | UrlxError::Validation(msg)
            | UrlxError::Serialization(msg)
            | UrlxError::LoggingInit(msg)
            | UrlxError::ShipperStart(msg) => msg,
        }
    }

    /// Startup failures are printed before the tracing subscriber exists.
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for UrlxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for UrlxError {}

// 便捷的构造函数
impl UrlxError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        UrlxError::Config(msg.into())
    }

    pub fn missing_credentials<T: Into<String>>(msg: T) -> Self {
        UrlxError::MissingCredentials(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        UrlxError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        UrlxError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        UrlxError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        UrlxError::Validation(msg.into())
    }

    pub fn logging_init<T: Into<String>>(msg: T) -> Self {
        UrlxError::LoggingInit(msg.into())
    }

    pub fn shipper_start<T: Into<String>>(msg: T) -> Self {
        UrlxError::ShipperStart(msg.into())
    }
}

impl From<std::io::Error> for UrlxError {
    fn from(err: std::io::Error) -> Self {
        UrlxError::FileOperation(err.to_string())
    }
}

impl From<config::ConfigError> for UrlxError {
    fn from(err: config::ConfigError) -> Self {
        UrlxError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for UrlxError {
    fn from(err: toml::ser::Error) -> Self {
        UrlxError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UrlxError>;
