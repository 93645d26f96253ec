//! 原生库边界
//!
//! 每个暴露类型的解析器都是对原生库内省入口 `<type>_get_type` 的一次调用。
//! [`ResolverSource`] 为类型目录提供这些解析器：
//! - [`NativeLibrary`]: 通过 `libloading` 动态打开共享库
//! - [`StaticTypeTable`]: 内存中的符号表，用于静态链接或测试

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::registry::{NativeTypeId, TypeResolver};

pub mod library;

pub use library::NativeLibrary;

/// 为内省符号提供解析器
pub trait ResolverSource {
    fn resolver_for(&self, symbol: &'static str) -> Arc<dyn TypeResolver>;
}

/// 内存符号表
///
/// 记录每个符号被查询的次数。
#[derive(Debug, Default, Clone)]
pub struct StaticTypeTable {
    entries: Arc<HashMap<String, u64>>,
    lookups: Arc<AtomicUsize>,
}

impl StaticTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            entries: Arc::new(entries.into_iter().map(|(s, id)| (s.into(), id)).collect()),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 到目前为止的原生查询次数
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

struct TableResolver {
    table: StaticTypeTable,
    symbol: &'static str,
}

impl TypeResolver for TableResolver {
    fn resolve(&self) -> Option<NativeTypeId> {
        self.table.lookups.fetch_add(1, Ordering::SeqCst);
        self.table
            .entries
            .get(self.symbol)
            .and_then(|raw| NativeTypeId::new(*raw))
    }

    fn describe(&self) -> String {
        format!("static table symbol {}", self.symbol)
    }
}

impl ResolverSource for StaticTypeTable {
    fn resolver_for(&self, symbol: &'static str) -> Arc<dyn TypeResolver> {
        Arc::new(TableResolver {
            table: self.clone(),
            symbol,
        })
    }
}
