//! Shared `Result` alias.
//!
//! Errors are rootcause `Report`s over a per-crate error enum:
//! `GraphError` and `CanvasError` in the workflow crate, `StoreError`,
//! `SessionError` and `ConfigError` in the client crate.

use rootcause::Report;

/// `Result` carrying a `Report` over the context type `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
