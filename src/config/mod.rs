//! 统一配置系统
//!
//! 提供TOML/JSON配置文件和环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::version::{BuildFlags, VersionGate, VersionTriple};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 绑定层主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// 原生库配置
    #[serde(default)]
    pub library: LibraryConfig,

    /// 版本配置
    #[serde(default)]
    pub version: VersionConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 原生库配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// 共享库路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// 原生库编译时启用的可选组件
    #[serde(default)]
    pub build_flags: BuildFlags,
}

/// 版本配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionConfig {
    /// 覆盖构建期版本，格式 `MAJOR.MINOR.MICRO`
    #[serde(rename = "override", default, skip_serializing_if = "Option::is_none")]
    pub override_version: Option<String>,
}

impl BridgeConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LAYOUT_BRIDGE_LIBRARY_PATH") {
            self.library.path = Some(PathBuf::from(path));
        }
        if let Some(version) = lookup("LAYOUT_BRIDGE_VERSION") {
            self.version.override_version = Some(version);
        }
        if let Some(level) = lookup("LAYOUT_BRIDGE_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&level) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.parsed_override()?;
        if let Some(path) = &self.library.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Library path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn parsed_override(&self) -> ConfigResult<Option<VersionTriple>> {
        self.version
            .override_version
            .as_deref()
            .map(|raw| {
                raw.parse::<VersionTriple>()
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))
            })
            .transpose()
    }

    /// 版本门：配置覆盖优先，否则使用构建期常量
    pub fn version_gate(&self) -> VersionGate {
        match self.parsed_override() {
            Ok(Some(version)) => VersionGate::new(version),
            Ok(None) => VersionGate::compiled(),
            Err(e) => {
                tracing::warn!(target: "config", "Ignoring version override: {}", e);
                VersionGate::compiled()
            }
        }
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./layout_bindings.toml
    /// 2. ./layout_bindings.json
    /// 3. ~/.config/layout_bindings/config.toml
    /// 4. 使用默认配置
    ///
    /// 最后应用环境变量覆盖。
    pub fn load_or_default() -> Self {
        let mut config = Self::find_config_file().unwrap_or_else(|| {
            tracing::info!(target: "config", "Using default configuration");
            Self::default()
        });
        config.apply_env_overrides();
        config
    }

    fn find_config_file() -> Option<Self> {
        if let Ok(config) = Self::from_toml_file("layout_bindings.toml") {
            tracing::info!(target: "config", "Loaded config from layout_bindings.toml");
            return Some(config);
        }

        if let Ok(config) = Self::from_json_file("layout_bindings.json") {
            tracing::info!(target: "config", "Loaded config from layout_bindings.json");
            return Some(config);
        }

        let home = env::var_os("HOME")?;
        let config_path = PathBuf::from(home)
            .join(".config")
            .join("layout_bindings")
            .join("config.toml");
        let config = Self::from_toml_file(&config_path).ok()?;
        tracing::info!(target: "config", "Loaded config from {:?}", config_path);
        Some(config)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version_gate(), VersionGate::compiled());
        assert!(config.library.path.is_none());
    }

    #[test]
    fn test_toml_parsing() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [library]
            path = "/usr/lib/libpango-1.0.so.0"

            [library.build_flags]
            cairo = true
            freetype = false

            [version]
            override = "1.10.0"

            [logging]
            level = "debug"
            log_to_console = false
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(
            config.library.path.as_deref(),
            Some(Path::new("/usr/lib/libpango-1.0.so.0"))
        );
        assert!(config.library.build_flags.cairo);
        assert_eq!(config.version_gate().version(), VersionTriple::new(1, 10, 0));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout_bindings.toml");

        let mut config = BridgeConfig::default();
        config.version.override_version = Some("1.4.0".to_string());
        config.save_toml(&path).unwrap();

        let loaded = BridgeConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.version_gate().version(), VersionTriple::new(1, 4, 0));
    }

    #[test]
    fn test_json_parsing() {
        let config =
            BridgeConfig::from_json_str(r#"{ "version": { "override": "2.0.1" } }"#).unwrap();
        assert_eq!(config.version_gate().version(), VersionTriple::new(2, 0, 1));
        assert_eq!(config.logging.level, LogLevel::Info);

        assert!(matches!(
            BridgeConfig::from_json_str("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_override() {
        let mut config = BridgeConfig::default();
        config.version.override_version = Some("1.x".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
        assert_eq!(config.version_gate(), VersionGate::compiled());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LAYOUT_BRIDGE_LIBRARY_PATH", "/opt/pango/libpango.so"),
            ("LAYOUT_BRIDGE_VERSION", "1.12.4"),
            ("LAYOUT_BRIDGE_LOG_LEVEL", "WARN"),
        ]
        .into_iter()
        .collect();

        let mut config = BridgeConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.library.path,
            Some(PathBuf::from("/opt/pango/libpango.so"))
        );
        assert!(config.version_gate().at_least(1, 12, 4));
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_partial_logging_section() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.log_to_console);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BridgeConfig::from_toml_file("/nonexistent/layout_bindings.toml"),
            Err(ConfigError::FileError(_))
        ));
    }
}
