//! 动态加载的原生库

use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use super::ResolverSource;
use crate::core::{BindingError, BindingResult};
use crate::registry::{NativeTypeId, TypeResolver};
use crate::version::VersionTriple;

/// `GType` 大小与指针一致
type GetTypeFn = unsafe extern "C" fn() -> usize;
type VersionFn = unsafe extern "C" fn() -> c_int;

/// 运行时版本查询入口，编码为 `major * 10000 + minor * 100 + micro`
pub const VERSION_SYMBOL: &str = "pango_version";

/// 已打开的原生共享库
#[derive(Debug, Clone)]
pub struct NativeLibrary {
    library: Arc<Library>,
    path: PathBuf,
}

impl NativeLibrary {
    /// 打开共享库
    pub fn open(path: impl AsRef<Path>) -> BindingResult<Self> {
        let path = path.as_ref();

        // SAFETY: loading runs the library's initialisers; the caller chooses a
        // library that exposes the expected introspection API.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            BindingError::Library(format!("Failed to load {}: {}", path.display(), e))
        })?;

        tracing::info!(target: "native", "Loaded native library {}", path.display());
        Ok(Self {
            library: Arc::new(library),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 原生库在运行时报告的版本
    pub fn runtime_version(&self) -> Option<VersionTriple> {
        // SAFETY: `pango_version` takes no arguments and returns an int.
        let encoded = unsafe {
            let func: Symbol<VersionFn> = self.library.get(VERSION_SYMBOL.as_bytes()).ok()?;
            func()
        };
        decode_version(encoded)
    }
}

fn decode_version(encoded: c_int) -> Option<VersionTriple> {
    let encoded = u32::try_from(encoded).ok()?;
    Some(VersionTriple::new(
        encoded / 10000,
        (encoded / 100) % 100,
        encoded % 100,
    ))
}

struct SymbolResolver {
    library: Arc<Library>,
    symbol: &'static str,
}

impl TypeResolver for SymbolResolver {
    fn resolve(&self) -> Option<NativeTypeId> {
        // SAFETY: every `*_get_type` entry point takes no arguments and returns a GType.
        let raw = unsafe {
            let func: Symbol<GetTypeFn> = match self.library.get(self.symbol.as_bytes()) {
                Ok(func) => func,
                Err(e) => {
                    tracing::warn!(target: "native", "Symbol {} not found: {}", self.symbol, e);
                    return None;
                }
            };
            func()
        };
        NativeTypeId::new(raw as u64)
    }

    fn describe(&self) -> String {
        format!("symbol {}", self.symbol)
    }
}

impl ResolverSource for NativeLibrary {
    fn resolver_for(&self, symbol: &'static str) -> Arc<dyn TypeResolver> {
        Arc::new(SymbolResolver {
            library: Arc::clone(&self.library),
            symbol,
        })
    }
}
