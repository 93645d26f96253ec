//! 原生库版本门控
//!
//! 暴露被包装原生库的 (major, minor, micro) 版本常量，以及唯一的比较谓词
//! [`VersionGate::at_least`]。版本在构建期由环境变量
//! `LAYOUT_LIBRARY_{MAJOR,MINOR,MICRO}_VERSION` 提供，进程启动时可通过配置覆盖。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod features;

pub use features::{BuildFlag, BuildFlags, ConditionalFeature, FeatureSet};

/// 构建期主版本号
pub const LIBRARY_MAJOR_VERSION: u32 =
    parse_component(option_env!("LAYOUT_LIBRARY_MAJOR_VERSION"), 1);
/// 构建期次版本号
pub const LIBRARY_MINOR_VERSION: u32 =
    parse_component(option_env!("LAYOUT_LIBRARY_MINOR_VERSION"), 12);
/// 构建期修订号
pub const LIBRARY_MICRO_VERSION: u32 =
    parse_component(option_env!("LAYOUT_LIBRARY_MICRO_VERSION"), 3);

/// 构建期版本
pub const LIBRARY_VERSION: VersionTriple = VersionTriple::new(
    LIBRARY_MAJOR_VERSION,
    LIBRARY_MINOR_VERSION,
    LIBRARY_MICRO_VERSION,
);

// Malformed values fall back to the default instead of failing the build.
const fn parse_component(raw: Option<&str>, default: u32) -> u32 {
    let bytes = match raw {
        Some(s) => s.as_bytes(),
        None => return default,
    };
    if bytes.is_empty() {
        return default;
    }

    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < b'0' || b > b'9' {
            return default;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u32) {
                Some(v) => v,
                None => return default,
            },
            None => return default,
        };
        i += 1;
    }
    value
}

/// 版本三元组
///
/// 字段顺序决定派生的 `Ord`：先比较 major，再 minor，最后 micro。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self { major, minor, micro }
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// 版本字符串解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("Expected MAJOR.MINOR.MICRO, got `{0}`")]
    Malformed(String),
    #[error("Invalid version component `{0}`")]
    InvalidComponent(String),
}

impl FromStr for VersionTriple {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::Malformed(s.to_string()));
        }

        let mut components = [0u32; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| VersionParseError::InvalidComponent(part.to_string()))?;
        }

        Ok(Self::new(components[0], components[1], components[2]))
    }
}

/// 版本门
///
/// 在能力组合期使用，决定某个 [`ConditionalFeature`] 是否存在。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    version: VersionTriple,
}

impl VersionGate {
    pub const fn new(version: VersionTriple) -> Self {
        Self { version }
    }

    /// 使用构建期常量的版本门
    pub const fn compiled() -> Self {
        Self::new(LIBRARY_VERSION)
    }

    pub fn version(&self) -> VersionTriple {
        self.version
    }

    /// 原生库版本是否至少为 `major.minor.micro`
    pub fn at_least(&self, major: u32, minor: u32, micro: u32) -> bool {
        self.satisfies(VersionTriple::new(major, minor, micro))
    }

    pub fn satisfies(&self, required: VersionTriple) -> bool {
        self.version >= required
    }
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::compiled()
    }
}
