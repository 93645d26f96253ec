//! 类型绑定：符号名与惰性解析的原生类型标识

use std::fmt;
use std::num::NonZeroU64;
use std::sync::{Arc, OnceLock};

use crate::core::{BindingError, BindingResult};

/// 原生库的不透明类型标识
///
/// 原生库用 0 表示无效类型，因此内部以非零整数保存。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeTypeId(NonZeroU64);

impl NativeTypeId {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for NativeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// 向原生库查询某个类型标识
///
/// 实现必须是确定性的，除查询原生库外没有其他副作用。
pub trait TypeResolver: Send + Sync {
    /// `None` 表示原生库中不存在该类型
    fn resolve(&self) -> Option<NativeTypeId>;

    /// 用于错误信息
    fn describe(&self) -> String {
        "closure".to_string()
    }
}

impl<F> TypeResolver for F
where
    F: Fn() -> Option<NativeTypeId> + Send + Sync,
{
    fn resolve(&self) -> Option<NativeTypeId> {
        self()
    }
}

/// 符号名与类型标识的关联
///
/// 首次访问时调用解析器，结果通过 `OnceLock` 发布后不再改变。
pub struct TypeBinding {
    name: String,
    resolver: Arc<dyn TypeResolver>,
    cached: OnceLock<NativeTypeId>,
}

impl TypeBinding {
    pub(crate) fn new(name: String, resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            name,
            resolver,
            cached: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 已缓存的标识，未解析时为 `None`
    pub fn cached(&self) -> Option<NativeTypeId> {
        self.cached.get().copied()
    }

    pub fn is_resolved(&self) -> bool {
        self.cached.get().is_some()
    }

    /// 解析并缓存类型标识
    ///
    /// Concurrent first calls may both reach the resolver; only the first
    /// published value is kept and returned to every caller.
    pub fn resolve(&self) -> BindingResult<NativeTypeId> {
        if let Some(id) = self.cached.get() {
            return Ok(*id);
        }

        let resolved = self
            .resolver
            .resolve()
            .ok_or_else(|| BindingError::Resolution {
                name: self.name.clone(),
                resolver: self.resolver.describe(),
            })?;

        let published = *self.cached.get_or_init(|| resolved);
        if published != resolved {
            tracing::warn!(
                target: "registry",
                "Resolver for {} returned {} but {} was already published",
                self.name,
                resolved,
                published
            );
        } else {
            tracing::trace!(target: "registry", "Resolved {} -> {}", self.name, published);
        }
        Ok(published)
    }
}

impl fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBinding")
            .field("name", &self.name)
            .field("resolver", &self.resolver.describe())
            .field("cached", &self.cached.get())
            .finish()
    }
}
