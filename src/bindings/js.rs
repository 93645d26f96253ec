//! JavaScript Host Adapter using rquickjs
//!
//! Host handles are stored in an arena on the Rust side. Scripts only ever see a
//! plain object `{ __type, __typeId, __handle }`; reading one back goes through
//! the arena, and the usual tag check still applies at `unwrap` time.

use rquickjs::{Context, FromJs, Function, Object, Runtime};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::handle::HostHandle;
use super::protocol::HostAdapter;
use crate::core::{BindingError, BindingResult};
use crate::version::VersionGate;

pub const TYPE_KEY: &str = "__type";
pub const TYPE_ID_KEY: &str = "__typeId";
pub const HANDLE_KEY: &str = "__handle";

fn host_error(e: rquickjs::Error) -> BindingError {
    BindingError::Host(e.to_string())
}

fn to_js_int(component: u32) -> i32 {
    i32::try_from(component).unwrap_or(i32::MAX)
}

// Negative components are treated as 0.
fn from_js_int(component: i32) -> u32 {
    u32::try_from(component).unwrap_or(0)
}

// Keys are issued as exact integers; anything else did not come from us.
fn arena_key(raw: f64) -> Option<u64> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if raw.is_finite() && raw >= 1.0 && raw.fract() == 0.0 && raw <= MAX_EXACT {
        Some(raw as u64)
    } else {
        None
    }
}

/// Handles by key, plus the key each global name currently points at
#[derive(Default)]
struct HandleArena {
    handles: HashMap<u64, HostHandle>,
    globals: HashMap<String, u64>,
}

pub struct JsBridge {
    #[allow(dead_code)]
    runtime: Runtime,
    context: Context,
    arena: Mutex<HandleArena>,
    next_key: AtomicU64,
}

impl JsBridge {
    pub fn new(gate: VersionGate) -> BindingResult<Self> {
        let runtime = Runtime::new().map_err(host_error)?;
        let context = Context::full(&runtime).map_err(host_error)?;

        let bridge = Self {
            runtime,
            context,
            arena: Mutex::new(HandleArena::default()),
            next_key: AtomicU64::new(1),
        };
        bridge.bind_pango_namespace(gate)?;
        Ok(bridge)
    }

    fn arena(&self) -> MutexGuard<'_, HandleArena> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bind_pango_namespace(&self, gate: VersionGate) -> BindingResult<()> {
        let version = gate.version();

        self.context
            .with(|ctx| -> rquickjs::Result<()> {
                let pango = Object::new(ctx.clone())?;

                pango.set("MAJOR_VERSION", to_js_int(version.major))?;
                pango.set("MINOR_VERSION", to_js_int(version.minor))?;
                pango.set("MICRO_VERSION", to_js_int(version.micro))?;

                // Pango.checkVersion(major, minor, micro) -> bool
                pango.set(
                    "checkVersion",
                    Function::new(ctx.clone(), move |major: i32, minor: i32, micro: i32| {
                        gate.at_least(from_js_int(major), from_js_int(minor), from_js_int(micro))
                    })?,
                )?;

                ctx.globals().set("Pango", pango)?;
                Ok(())
            })
            .map_err(host_error)?;

        tracing::debug!(target: "bindings.js", "Installed Pango namespace ({})", version);
        Ok(())
    }

    pub fn eval<T>(&self, code: &str) -> BindingResult<T>
    where
        T: for<'js> FromJs<'js>,
    {
        self.context
            .with(|ctx| ctx.eval::<T, _>(code))
            .map_err(host_error)
    }
}

impl HostAdapter for JsBridge {
    fn language(&self) -> &'static str {
        "javascript"
    }

    /// Stores `handle` and exposes it to scripts under the global `name`.
    ///
    /// Returns the arena key. Rebinding a name releases the handle it held.
    fn expose(&self, name: &str, handle: HostHandle) -> BindingResult<u64> {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        let type_name = handle.type_name().to_string();
        let type_id = handle.tag().type_id().get();

        self.context
            .with(|ctx| -> rquickjs::Result<()> {
                let obj = Object::new(ctx.clone())?;
                obj.set(TYPE_KEY, type_name)?;
                // JS numbers are doubles
                obj.set(TYPE_ID_KEY, type_id as f64)?;
                obj.set(HANDLE_KEY, key as f64)?;
                ctx.globals().set(name, obj)?;
                Ok(())
            })
            .map_err(host_error)?;

        let mut arena = self.arena();
        arena.handles.insert(key, handle);
        if let Some(previous) = arena.globals.insert(name.to_string(), key) {
            arena.handles.remove(&previous);
            tracing::trace!(
                target: "bindings.js",
                "Released handle {} when rebinding {}",
                previous,
                name
            );
        }

        tracing::trace!(target: "bindings.js", "Exposed handle {} as {}", key, name);
        Ok(key)
    }

    /// Evaluates `expr` and returns the handle the resulting object refers to.
    fn fetch(&self, expr: &str) -> BindingResult<HostHandle> {
        let key = self
            .context
            .with(|ctx| -> rquickjs::Result<f64> {
                let obj: Object = ctx.eval(expr)?;
                obj.get(HANDLE_KEY)
            })
            .map_err(host_error)?;
        let key = arena_key(key)
            .ok_or_else(|| BindingError::Host(format!("Invalid host handle key {}", key)))?;

        self.arena()
            .handles
            .get(&key)
            .cloned()
            .ok_or_else(|| BindingError::Host(format!("Unknown host handle {}", key)))
    }

    /// Drops the arena entry; script objects pointing at it become dangling.
    fn release(&self, key: u64) -> Option<HostHandle> {
        let mut arena = self.arena();
        arena.globals.retain(|_, bound| *bound != key);
        arena.handles.remove(&key)
    }

    fn live_handles(&self) -> usize {
        self.arena().handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NativeTypeId, TypeRegistry};
    use crate::version::VersionTriple;

    fn bridge() -> JsBridge {
        JsBridge::new(VersionGate::new(VersionTriple::new(1, 12, 3))).unwrap()
    }

    #[test]
    fn test_check_version_from_script() {
        let js = bridge();
        assert!(js.eval::<bool>("Pango.checkVersion(1, 12, 3)").unwrap());
        assert!(js.eval::<bool>("Pango.checkVersion(1, 4, 0)").unwrap());
        assert!(!js.eval::<bool>("Pango.checkVersion(1, 13, 0)").unwrap());
        assert_eq!(js.eval::<i32>("Pango.MINOR_VERSION").unwrap(), 12);
    }

    #[test]
    fn test_expose_and_fetch() {
        let js = bridge();
        let registry = TypeRegistry::new();
        let binding = registry
            .register("LayoutIter", || NativeTypeId::new(0x42))
            .unwrap();

        js.expose("iter", binding.wrap(3usize).unwrap()).unwrap();
        assert_eq!(js.eval::<String>("iter.__type").unwrap(), "LayoutIter");
        assert_eq!(js.eval::<f64>("iter.__typeId").unwrap(), 66.0);

        let handle = js.fetch("iter").unwrap();
        assert_eq!(binding.unwrap::<usize>(&handle).unwrap(), 3);
    }

    #[test]
    fn test_tampered_handle_fails_unwrap() {
        let js = bridge();
        let registry = TypeRegistry::new();
        let iter = registry
            .register("LayoutIter", || NativeTypeId::new(1))
            .unwrap();
        let rect = registry
            .register("Rectangle", || NativeTypeId::new(2))
            .unwrap();

        js.expose("iter", iter.wrap(0u8).unwrap()).unwrap();
        js.expose("rect", rect.wrap(0u8).unwrap()).unwrap();
        js.eval::<()>("iter.__handle = rect.__handle; undefined").unwrap();

        let handle = js.fetch("iter").unwrap();
        assert!(matches!(
            iter.unwrap::<u8>(&handle),
            Err(BindingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_and_released_handles() {
        let js = bridge();
        assert!(matches!(
            js.fetch("({ __handle: 999 })"),
            Err(BindingError::Host(_))
        ));

        let registry = TypeRegistry::new();
        let binding = registry.register("Item", || NativeTypeId::new(5)).unwrap();
        let key = js.expose("item", binding.wrap(()).unwrap()).unwrap();
        assert_eq!(js.live_handles(), 1);
        assert!(js.release(key).is_some());
        assert!(matches!(js.fetch("item"), Err(BindingError::Host(_))));
    }

    #[test]
    fn test_script_error_is_host_error() {
        let js = bridge();
        assert!(matches!(
            js.eval::<()>("throw new Error('boom')"),
            Err(BindingError::Host(_))
        ));
    }

    #[test]
    fn test_bridge_as_host_adapter() {
        let js = bridge();
        let adapter: &dyn HostAdapter = &js;
        assert_eq!(adapter.language(), "javascript");
        assert_eq!(adapter.live_handles(), 0);
    }

    #[test]
    fn test_rebinding_global_releases_previous_handle() {
        let js = bridge();
        let registry = TypeRegistry::new();
        let binding = registry.register("Item", || NativeTypeId::new(5)).unwrap();

        let mut last = 0;
        for i in 0..100u32 {
            last = js.expose("item", binding.wrap(i).unwrap()).unwrap();
        }
        assert_eq!(js.live_handles(), 1);
        assert_eq!(binding.unwrap::<u32>(&js.fetch("item").unwrap()).unwrap(), 99);

        js.expose("other", binding.wrap(7u32).unwrap()).unwrap();
        assert_eq!(js.live_handles(), 2);
        assert!(js.release(last).is_some());
        assert_eq!(js.live_handles(), 1);
    }

    #[test]
    fn test_non_integer_handle_keys_rejected() {
        let js = bridge();
        let registry = TypeRegistry::new();
        let binding = registry.register("Item", || NativeTypeId::new(5)).unwrap();
        let key = js.expose("item", binding.wrap(()).unwrap()).unwrap();
        assert_eq!(key, 1);

        for forged in [
            "({ __handle: 1.9 })",
            "({ __handle: -1 })",
            "({ __handle: NaN })",
            "({ __handle: 0 })",
        ] {
            assert!(matches!(js.fetch(forged), Err(BindingError::Host(_))), "{forged}");
        }
        assert!(js.fetch("({ __handle: 1 })").is_ok());
    }

    #[test]
    fn test_arena_key_validation() {
        assert_eq!(arena_key(3.0), Some(3));
        assert_eq!(arena_key(2.5), None);
        assert_eq!(arena_key(-4.0), None);
        assert_eq!(arena_key(f64::NAN), None);
        assert_eq!(arena_key(f64::INFINITY), None);
    }
}
