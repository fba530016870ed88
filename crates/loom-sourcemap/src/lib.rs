// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 support for Loom crash deminification.
//!
//! This crate provides functionality for:
//! - Decoding and encoding Base64 VLQ segments and `mappings` strings
//! - Parsing source map documents and serializing them back (JSON or inline comment)
//! - Looking up the original position of a generated position, tolerating
//!   off-by-one reports from browsers
//! - Composing a map with the map of one of its inputs, and flattening maps
//!   to line granularity
//!
//! # Example
//!
//! ```
//! use loom_sourcemap::{SourceMap, SourcePosition};
//!
//! let source_map = SourceMap::from_str(r#"{
//!     "version": 3,
//!     "file": "bundle.min.js",
//!     "sources": ["src/app.js"],
//!     "names": ["render"],
//!     "mappings": "AAAAA"
//! }"#).unwrap();
//!
//! let entry = source_map
//!     .mapping_entry_for_generated_position(SourcePosition::new(0, 0))
//!     .unwrap();
//! assert_eq!(entry.original_name.as_deref(), Some("render"));
//! ```

pub mod error;
pub mod mappings;
pub mod position;
pub mod serialize;
pub mod sourcemap;
pub mod vlq;

pub use error::{Result, SourceMapError};
pub use mappings::{parse_mappings, serialize_mappings, MappingEntry};
pub use position::SourcePosition;
pub use serialize::{generate_source_map_inline_comment, serialize_source_map};
pub use sourcemap::SourceMap;
pub use vlq::{decode_vlq_segment, encode_vlq, encode_vlq_segment};
