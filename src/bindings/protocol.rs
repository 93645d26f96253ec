//! Host adapter protocol
//!
//! Language-agnostic interface between a host runtime and the binding layer.
//! The host only ever stores keys; the adapter owns the handles.

use super::handle::HostHandle;
use crate::core::BindingResult;

/// Trait for language-specific host adapters
pub trait HostAdapter {
    /// Host language name, for logging
    fn language(&self) -> &'static str;

    /// Makes `handle` visible to host code under `name`, returning its key
    fn expose(&self, name: &str, handle: HostHandle) -> BindingResult<u64>;

    /// Reads back the handle a host expression refers to
    fn fetch(&self, expr: &str) -> BindingResult<HostHandle>;

    /// Forgets a previously exposed handle
    fn release(&self, key: u64) -> Option<HostHandle>;

    /// Number of handles currently exposed
    fn live_handles(&self) -> usize;
}
