use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, UrlxError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Variables the service has always honoured, mapped onto config keys.
/// They win over both the TOML file and the `URLX__` environment.
const LEGACY_ENV_KEYS: [(&str, &str); 8] = [
    ("PORT", "server.port"),
    ("DATABASE_URL", "storage.database_url"),
    ("GRAFANA_LOKI_URL", "shipping.url"),
    ("GRAFANA_LOKI_USER", "shipping.user"),
    ("GRAFANA_LOKI_API_KEY", "shipping.api_key"),
    ("GRAFANA_LOKI_LANGUAGE", "shipping.language"),
    ("GRAFANA_LOKI_SOURCE", "shipping.source"),
    ("GRAFANA_SERVICE_NAME", "shipping.service_name"),
];

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、UI 页面
/// - storage: 存储后端选择
/// - logging: 本地日志输出
/// - shipping: 日志批量上报（Loki）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub shipping: ShippingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：旧版环境变量 > URLX__ 环境变量 > config.toml > 默认值
    /// 示例：URLX__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Same as [`StaticConfig::load`] but reads variables from `vars`
    /// instead of the process environment.
    pub fn load_with_env(path: Option<&str>, vars: HashMap<String, String>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("URLX")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone().into_iter().collect())),
            );

        for (var, key) in LEGACY_ENV_KEYS {
            let value = vars.get(var).filter(|v| !v.is_empty()).cloned();
            builder = builder.set_override_option(key, value)?;
        }

        let config: StaticConfig = builder.build()?.try_deserialize()?;
        config.shipping.validate()?;
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// actix worker 数量，未设置时使用 CPU 核心数
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_ui_path")]
    pub ui_path: String,
}

/// 存储后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "memory" 或 "database"；未设置时根据 database_url 推断
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Remote log sink settings.
///
/// `url`, `user` and `api_key` are mandatory while `enabled` is true;
/// their absence is reported when the transport is built, before the
/// flush thread starts.
#[derive(Clone, Serialize, Deserialize)]
pub struct ShippingConfig {
    #[serde(default = "default_shipping_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ShippingConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(UrlxError::validation(
                "shipping.queue_capacity must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            return Err(UrlxError::validation(
                "shipping.batch_size must be at least 1",
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(UrlxError::validation(
                "shipping.flush_interval_ms must be greater than 0",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(UrlxError::validation(
                "shipping.timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ShippingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("language", &self.language)
            .field("source", &self.source)
            .field("service_name", &self.service_name)
            .field("queue_capacity", &self.queue_capacity)
            .field("batch_size", &self.batch_size)
            .field("flush_interval_ms", &self.flush_interval_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_ui_path() -> String {
    "ui/index.html".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_shipping_enabled() -> bool {
    true
}

fn default_language() -> String {
    "Rust".to_string()
}

fn default_source() -> String {
    "Code".to_string()
}

fn default_service_name() -> String {
    "urlx".to_string()
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_batch_size() -> usize {
    10
}

fn default_flush_interval_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: None,
            ui_path: default_ui_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: None,
            database_url: None,
            pool_size: default_database_pool_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            enabled: default_shipping_enabled(),
            url: None,
            user: None,
            api_key: None,
            language: default_language(),
            source: default_source(),
            service_name: default_service_name(),
            queue_capacity: default_queue_capacity(),
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
