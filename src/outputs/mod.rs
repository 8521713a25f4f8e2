//! Output of the aggregated news mapping for operators.
//!
//! # Submodules
//!
//! - [`json`]: Serializes a [`NewsMap`](crate::models::NewsMap) to stdout or a file
//!
//! The written document is the mapping itself, keyed by source identity:
//!
//! ```text
//! {
//!   "BatDongSan": [ { "title": ..., "url": ..., "publishedAt": ... } ],
//!   "Cafef": [ ... ],
//!   "VnExpress": [ ... ]
//! }
//! ```

pub mod json;
