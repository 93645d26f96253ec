//! 条件能力
//!
//! 每个能力由最低版本（以及可选的构建标志）门控。组合只在模块加载时执行一次，
//! 不满足条件的能力完全不存在。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{VersionGate, VersionTriple};

/// 原生库编译时可选组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildFlags {
    /// cairo 渲染后端
    pub cairo: bool,
    /// FreeType/fontconfig 字体后端
    pub freetype: bool,
}

impl Default for BuildFlags {
    fn default() -> Self {
        Self {
            cairo: cfg!(feature = "cairo"),
            freetype: cfg!(feature = "freetype"),
        }
    }
}

/// 构建标志选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFlag {
    Cairo,
    Freetype,
}

impl BuildFlags {
    pub fn is_set(&self, flag: BuildFlag) -> bool {
        match flag {
            BuildFlag::Cairo => self.cairo,
            BuildFlag::Freetype => self.freetype,
        }
    }
}

/// 由版本门控的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalFeature {
    pub name: &'static str,
    pub requires: VersionTriple,
    pub flag: Option<BuildFlag>,
}

impl ConditionalFeature {
    pub const fn new(name: &'static str, requires: VersionTriple) -> Self {
        Self {
            name,
            requires,
            flag: None,
        }
    }

    pub const fn with_flag(self, flag: BuildFlag) -> Self {
        Self {
            flag: Some(flag),
            ..self
        }
    }

    pub fn is_available(&self, gate: &VersionGate, flags: &BuildFlags) -> bool {
        gate.satisfies(self.requires) && self.flag.map_or(true, |flag| flags.is_set(flag))
    }
}

/// 组合后存在的能力集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    present: BTreeSet<&'static str>,
}

impl FeatureSet {
    pub fn compose(
        gate: &VersionGate,
        flags: &BuildFlags,
        features: &[ConditionalFeature],
    ) -> Self {
        let mut present = BTreeSet::new();
        for feature in features {
            if feature.is_available(gate, flags) {
                present.insert(feature.name);
            } else {
                tracing::debug!(
                    target: "features",
                    "Feature {} omitted (requires {}, library is {})",
                    feature.name,
                    feature.requires,
                    gate.version()
                );
            }
        }
        Self { present }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.present.contains(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.present.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}
