//! 文本属性类表
//!
//! 原生属性记录以整数属性类型区分，宿主侧每种属性类型对应一个类。
//! 表中保存 属性类型 → 类绑定 的映射，用于属性与句柄之间的转换。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::handle::HostHandle;
use crate::core::{BindingError, BindingResult};
use crate::registry::TypeBinding;

/// 原生属性记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeAttribute {
    pub attr_type: i32,
    pub start_index: u32,
    pub end_index: u32,
}

impl NativeAttribute {
    pub fn new(attr_type: i32, start_index: u32, end_index: u32) -> Self {
        Self {
            attr_type,
            start_index,
            end_index,
        }
    }
}

#[derive(Default)]
pub struct AttributeClassTable {
    classes: Mutex<HashMap<i32, Arc<TypeBinding>>>,
}

impl AttributeClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn classes(&self) -> MutexGuard<'_, HashMap<i32, Arc<TypeBinding>>> {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 为属性类型注册宿主类
    ///
    /// 类绑定在此处立即解析，无法解析的类不会进入表中。
    pub fn add_attribute(&self, attr_type: i32, class: Arc<TypeBinding>) -> BindingResult<()> {
        class.resolve()?;

        let mut classes = self.classes();
        if let Some(existing) = classes.get(&attr_type) {
            return Err(BindingError::Configuration(format!(
                "Attribute type {} already bound to {}",
                attr_type,
                existing.name()
            )));
        }
        tracing::debug!(
            target: "attributes",
            "Attribute type {} -> {}",
            attr_type,
            class.name()
        );
        classes.insert(attr_type, class);
        Ok(())
    }

    pub fn class_for(&self, attr_type: i32) -> Option<Arc<TypeBinding>> {
        self.classes().get(&attr_type).cloned()
    }

    /// 将原生属性包装为其类对应的句柄
    pub fn make_attribute(&self, attr: NativeAttribute) -> BindingResult<HostHandle> {
        let class = self.class_for(attr.attr_type).ok_or_else(|| {
            BindingError::Configuration(format!(
                "No host class registered for attribute type {}",
                attr.attr_type
            ))
        })?;
        class.wrap(attr)
    }

    /// 从句柄取回原生属性
    pub fn get_attribute(&self, handle: &HostHandle) -> BindingResult<NativeAttribute> {
        let class = self
            .classes()
            .values()
            .find(|class| class.name() == handle.type_name())
            .cloned()
            .ok_or_else(|| BindingError::TypeMismatch {
                expected: "attribute".to_string(),
                actual: handle.type_name().to_string(),
            })?;
        class.unwrap(handle)
    }

    pub fn len(&self) -> usize {
        self.classes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes().is_empty()
    }
}
