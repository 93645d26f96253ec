//! 日志初始化

use crate::config::{LogLevel, LoggingConfig};

/// 初始化日志系统
///
/// 配置tracing日志框架。`RUST_LOG` 环境变量优先，未设置时使用配置中的级别。
/// 重复调用是安全的，已安装的订阅者不会被替换。
pub fn init_logging(config: &LoggingConfig) {
    if !config.log_to_console {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.as_filter()));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    tracing::debug!(target: "logging", "Logging initialized at {:?}", config.level);
}

impl LogLevel {
    /// EnvFilter 指令字符串
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
