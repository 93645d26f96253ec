//! 类型注册表
//!
//! 管理所有已声明的类型绑定。注册只声明绑定，不会调用解析器；
//! 同名重复注册返回 `BindingError::Configuration`。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{BindingError, BindingResult};

pub mod binding;

pub use binding::{NativeTypeId, TypeBinding, TypeResolver};

#[derive(Default)]
pub struct TypeRegistry {
    bindings: Mutex<HashMap<String, Arc<TypeBinding>>>,
    sealed: AtomicBool,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are only ever inserted whole, so a poisoned map is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<TypeBinding>>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 声明绑定
    pub fn register<R>(&self, name: impl Into<String>, resolver: R) -> BindingResult<Arc<TypeBinding>>
    where
        R: TypeResolver + 'static,
    {
        self.register_shared(name, Arc::new(resolver))
    }

    /// 使用共享解析器声明绑定
    pub fn register_shared(
        &self,
        name: impl Into<String>,
        resolver: Arc<dyn TypeResolver>,
    ) -> BindingResult<Arc<TypeBinding>> {
        let name = name.into();

        if self.is_sealed() {
            return Err(BindingError::Configuration(format!(
                "Cannot register `{}`: registry is sealed",
                name
            )));
        }

        let mut entries = self.entries();
        // 检查重复绑定
        if entries.contains_key(&name) {
            return Err(BindingError::Configuration(format!(
                "Duplicate type binding: {}",
                name
            )));
        }

        let binding = Arc::new(TypeBinding::new(name.clone(), resolver));
        entries.insert(name.clone(), Arc::clone(&binding));
        tracing::debug!(target: "registry", "Registered type binding {}", name);

        Ok(binding)
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeBinding>> {
        self.entries().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    /// 解析绑定的类型标识（结果会被缓存）
    pub fn resolve(&self, binding: &TypeBinding) -> BindingResult<NativeTypeId> {
        binding.resolve()
    }

    /// 按名称顺序解析所有绑定，遇到第一个失败即返回
    pub fn resolve_all(&self) -> BindingResult<()> {
        let bindings = self.sorted_bindings();
        for binding in bindings {
            binding.resolve()?;
        }
        Ok(())
    }

    fn sorted_bindings(&self) -> Vec<Arc<TypeBinding>> {
        let mut bindings: Vec<_> = self.entries().values().cloned().collect();
        bindings.sort_by(|a, b| a.name().cmp(b.name()));
        bindings
    }

    /// 所有已注册名称（排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries().values().filter(|b| b.is_resolved()).count()
    }

    /// 封存注册表，之后的注册全部失败
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("bindings", &self.sorted_bindings())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
