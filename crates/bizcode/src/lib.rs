//! # bizcode: Business Error Codes
//!
//! Classify errors with stable string keys, wrap them in chains that keep
//! the original cause, and ask later whether a chain contains a given
//! classification, at any depth.
//!
//! ## Design
//!
//! A [`Code`] is an immutable label. Wrapping an error with it yields a
//! [`CodedError`] node that owns the cause and exposes it through
//! [`std::error::Error::source`]. Nodes of one chain share:
//!
//! - a [`CorrelationId`] generated at the first wrap, and
//! - an [`Origin`]: the source location of the first wrap (plus a
//!   backtrace with the `backtrace` feature).
//!
//! Every wrap also hands an [`ErrorEvent`] to a [`Recorder`]. The default,
//! [`LogRecorder`], emits one `tracing` event per wrap.
//!
//! Large applications declare their codes as a tree with [`code_tree!`]
//! and assign hierarchical keys once at startup with [`init_module`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io;
//! use bizcode::{code_tree, init_module, match_code, Code, CodedResult};
//!
//! code_tree! {
//!     pub struct UserCodes {
//!         pub not_found: Code => key "notFound",
//!         pub invalid: Code => key "invalid",
//!     }
//!
//!     pub struct AppCodes {
//!         pub common: Code => key "common",
//!         pub user: UserCodes => prefix "user.",
//!     }
//! }
//!
//! fn load(codes: &AppCodes, id: u64) -> CodedResult<String> {
//!     let err = io::Error::new(io::ErrorKind::NotFound, format!("no row {}", id));
//!     Err(codes.user.not_found.wrap(err))
//! }
//!
//! let mut codes = AppCodes::default();
//! init_module("app.", &mut codes);
//!
//! let err = load(&codes, 7).unwrap_err();
//! assert_eq!(err.to_string(), "app.user.notFound");
//! assert!(codes.user.not_found.matches(&err));
//!
//! let status = match_code!(&err, {
//!     codes.user.invalid => 422,
//!     codes.user.not_found => 404,
//!     _ => 500,
//! });
//! assert_eq!(status, 404);
//! ```
//!
//! ## Feature Flags
//!
//! | Flag        | Effect |
//! |-------------|--------|
//! | `backtrace` | Captures `std::backtrace::Backtrace` at the chain origin; shown by `{:#}` |
//!
//! ## Dependencies
//!
//! - `tracing` for the default recorder and span contexts
//! - `uuid` for correlation ids
//! - `cfg-if` for feature-gated backtrace capture

mod id;
mod origin;
pub mod chain;
mod error;
mod code;
pub mod recorder;
mod tree;
#[macro_use]
mod macros;
mod convert;

// ── Public API ────────────────────────────────────────────────────

pub use id::CorrelationId;
pub use origin::Origin;
pub use error::{CodedError, Quoted};
pub use code::Code;
pub use recorder::{
    reset_recorder, set_recorder, set_recorder_arc, Discard, ErrorEvent, LogRecorder,
    LogRecorderConfig, Recorder,
};
pub use tree::{init_module, CodeTree, Field};
pub use convert::ResultExt;

/// Convenience Result alias.
pub type CodedResult<T> = Result<T, CodedError>;
