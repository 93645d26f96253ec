//! # Layout Bindings
//!
//! Version gating and type registration for exposing a native text-layout
//! library (Pango) to a scripting runtime.
//!
//! ## Features
//!
//! - **Version Gate**: the wrapped library's version as constants plus a single
//!   `at_least` predicate, used once while composing optional capabilities
//! - **Type Registry**: symbolic type names mapped to lazily resolved native
//!   type identifiers, cached for the life of the registry
//! - **Host Handles**: tagged handles with checked `wrap` / `unwrap`
//! - **QuickJS Adapter**: exposes handles and `Pango.checkVersion` to scripts
//!
//! ### Example
//!
//! ```
//! use layout_bindings::catalog::load_module;
//! use layout_bindings::native::StaticTypeTable;
//! use layout_bindings::version::{BuildFlags, VersionGate, VersionTriple};
//!
//! let table = StaticTypeTable::from_entries(
//!     layout_bindings::catalog::CORE_TYPES
//!         .iter()
//!         .enumerate()
//!         .map(|(i, d)| (d.symbol, i as u64 + 1)),
//! );
//! let gate = VersionGate::new(VersionTriple::new(1, 12, 3));
//! let module = load_module(gate, &BuildFlags::default(), &table).unwrap();
//!
//! let handle = module.wrap("Rectangle", (0i32, 0i32, 10i32, 20i32)).unwrap();
//! let rect: (i32, i32, i32, i32) = module.unwrap("Rectangle", &handle).unwrap();
//! assert_eq!(rect, (0, 0, 10, 20));
//! assert!(module.unwrap::<(i32, i32, i32, i32)>("LayoutIter", &handle).is_err());
//! ```
//!
//! ## Modules
//!
//! - [`version`]: version constants, gate and conditional features
//! - [`registry`]: type bindings and the registry
//! - [`native`]: resolver sources (dynamic library, static tables)
//! - [`bindings`]: host handles, attribute classes, QuickJS adapter
//! - [`catalog`]: the standard type catalog and module loading
//! - [`config`]: configuration

/// Core infrastructure: errors, logging, macros
#[macro_use]
pub mod core;
/// Version gate
pub mod version;
/// Type registry
pub mod registry;
/// Native library boundary
pub mod native;
/// Host-side binding layer
pub mod bindings;
/// Type catalog and module loading
pub mod catalog;
/// Configuration system
pub mod config;

pub use crate::bindings::{unwrap, wrap, HostHandle, TypeTag};
pub use crate::catalog::{load_module, LoadedModule};
pub use crate::core::{init_logging, BindingError, BindingResult};
pub use crate::registry::{NativeTypeId, TypeBinding, TypeRegistry, TypeResolver};
pub use crate::version::{VersionGate, VersionTriple, LIBRARY_VERSION};
