//! Host Binding Layer
//!
//! Converts native values into host-visible handles and back. Every handle
//! carries the type tag of the binding that produced it.
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Host Runtime                             │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐ │
//! │  │  QuickJS (js.rs)    │   │  Embedding code (Rust)      │ │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘ │
//! │             │                             │                │
//! │             v                             v                │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │        HostHandle { TypeTag, payload }              │   │
//! │  │        wrap / unwrap / attributes                   │   │
//! │  └───────────────────────┬─────────────────────────────┘   │
//! │                          │                                  │
//! │                          v                                  │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │   TypeRegistry (name → lazily resolved type id)     │   │
//! │  └───────────────────────┬─────────────────────────────┘   │
//! │                          │                                  │
//! │                          v                                  │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │     Native library (*_get_type introspection)       │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod attributes;
pub mod handle;
pub mod js;
pub mod protocol;

pub use attributes::{AttributeClassTable, NativeAttribute};
pub use handle::{unwrap, wrap, HostHandle, TypeTag};
pub use js::JsBridge;
pub use protocol::HostAdapter;
