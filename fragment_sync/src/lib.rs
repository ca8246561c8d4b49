//! # Fragment Sync
//!
//! Keeps hand-authored script fragments in sync with the canonical names the
//! content generator produces. This crate consumes `fragment_model`, scans a
//! workspace of category folders, indexes the extracted fragments, reconciles
//! their header annotations and patches the changed headers back to disk.
//!
//! ## Core Components
//!
//! - **scanner**: header grammar, brace-depth state machine and body normalization
//! - **index**: the `category -> entity -> sub type -> body` index and its renderer
//! - **reconcile**: classification of annotations against canonical names
//! - **patcher**: line-oriented, write-only-on-diff header rewriting
//! - **pipeline**: scan -> reconcile -> patch -> rescan orchestration
//!
//! ## Pipeline
//!
//! The pipeline is synchronous and strictly sequential. Every per-record and
//! per-file problem is recorded in [`Diagnostics`] and recovered locally; only
//! a missing workspace root or an unrecoverable I/O failure aborts a run.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod logging;
pub mod names;
pub mod patcher;
pub mod pipeline;
pub mod reconcile;
pub mod scanner;
mod source;
pub mod workspace;

pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use index::*;
pub use logging::*;
pub use names::*;
pub use patcher::*;
pub use pipeline::*;
pub use reconcile::*;
pub use scanner::*;
pub use workspace::*;
