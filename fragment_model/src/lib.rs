//! # Fragment Model
//!
//! The data model shared by the fragment importer and the content generator.
//! This crate is the single source of truth for what a fragment *is* and for
//! the canonical name table it is reconciled against. It performs no
//! filesystem access.
//!
//! ## Core Components
//!
//! - **fragment**: categories, entity identifiers and fragment records
//! - **names**: the canonical name table, its sentinels and the localisation
//!   file format the generator emits

pub mod error;
pub mod fragment;
pub mod names;

pub use error::*;
pub use fragment::*;
pub use names::*;
