//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use layout_bindings::impl_default;
///
/// struct MyStruct {
///     field1: u32,
///     field2: String,
/// }
///
/// impl_default!(MyStruct {
///     field1: 0,
///     field2: String::new(),
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 声明一组类型目录条目
///
/// 每个条目生成一个 [`TypeDescriptor`](crate::catalog::TypeDescriptor)，
/// `symbol` 为原生库导出的 `*_get_type` 入口。
///
/// 使用示例:
/// ```rust
/// use layout_bindings::type_descriptors;
///
/// const TYPES: &[layout_bindings::catalog::TypeDescriptor] = type_descriptors![
///     Item => "pango_item_get_type",
///     ScriptIter => "pango_script_iter_get_type" ; feature "script-iter",
/// ];
/// assert_eq!(TYPES.len(), 2);
/// ```
#[macro_export]
macro_rules! type_descriptors {
    (@feature) => { None };
    (@feature $feature:literal) => { Some($feature) };
    ($($name:ident => $symbol:literal $(; feature $feature:literal)?),* $(,)?) => {
        &[
            $(
                $crate::catalog::TypeDescriptor {
                    name: stringify!($name),
                    symbol: $symbol,
                    feature: $crate::type_descriptors!(@feature $($feature)?),
                }
            ),*
        ]
    };
}
