use serde::{Deserialize, Serialize};

use crate::errors::{LinkStoreError, Result};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "linkstore.toml";

/// Environment variable prefix; nested keys use `__` as separator
pub const ENV_PREFIX: &str = "LINKSTORE";

/// 配置（从 TOML 加载，环境变量覆盖）
///
/// - store: link store behaviour
/// - logging: tracing subscriber settings for the embedding application
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > linkstore.toml > 默认值
    /// 示例：LINKSTORE__STORE__LINKS_PATH=/api/links
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        match Self::load_from(CONFIG_FILE) {
            Ok(config) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", CONFIG_FILE);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit file (optional on disk) plus environment overrides
    pub fn load_from<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<StoreConfig>()?)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| LinkStoreError::config(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| LinkStoreError::config(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| LinkStoreError::config(e.to_string()))?;
        Ok(())
    }
}

/// Link store settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    /// Collection path for every link operation
    #[serde(default = "default_links_path")]
    pub links_path: String,
    /// Page size put into the initial query, `None` leaves it to the server
    #[serde(default)]
    pub default_page_size: Option<u32>,
    /// Log a warning whenever a list response arrives in the legacy shape
    #[serde(default = "default_warn_on_legacy_shape")]
    pub warn_on_legacy_shape: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

// ============================================================
// Default value functions
// ============================================================

fn default_links_path() -> String {
    "/links".to_string()
}

fn default_warn_on_legacy_shape() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            links_path: default_links_path(),
            default_page_size: None,
            warn_on_legacy_shape: default_warn_on_legacy_shape(),
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
