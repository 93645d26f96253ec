//! 统一错误处理模块
//!
//! 提供绑定层范围内的统一错误类型定义
//!
//! ## 错误分类
//!
//! - **加载期错误** (`Configuration`, `Resolution`, `Library`): 在模块加载时出现，
//!   直接中止初始化，不会暴露部分初始化的注册表。
//! - **调用期错误** (`TypeMismatch`, `Host`): 只返回给直接调用者。

use thiserror::Error;

use crate::config::ConfigError;

/// 绑定层核心错误类型
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resolution error: native library reports no type for `{name}` ({resolver})")]
    Resolution { name: String, resolver: String },

    #[error("Type mismatch: expected `{expected}`, got `{actual}`")]
    TypeMismatch { expected: String, actual: String },

    #[error("Native library error: {0}")]
    Library(String),

    #[error("Host runtime error: {0}")]
    Host(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl BindingError {
    /// 是否为加载期致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Resolution { .. } | Self::Library(_) | Self::Config(_)
        )
    }
}

/// 绑定层结果类型别名
pub type BindingResult<T> = Result<T, BindingError>;
