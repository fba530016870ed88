// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JavaScript stack trace deminification for Loom crash analytics.
//!
//! This crate provides functionality for:
//! - Parsing Chrome, Firefox, Edge and Internet Explorer stack traces
//! - Recovering original method names from the functions enclosing each
//!   frame in the generated code (function maps)
//! - Resolving original files and positions through source maps
//! - Building the pipeline from TOML or environment configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loom_crash_deminify::{InMemorySources, StackTraceDeminifier};
//!
//! let url = "http://localhost/app.min.js";
//! let mut sources = InMemorySources::new();
//! sources.add_source_code(url, "function a(){null.x}");
//! sources.add_source_map(url, r#"{
//!     "version": 3,
//!     "sources": ["app.js"],
//!     "names": ["render"],
//!     "mappings": "SAAAA,KACE"
//! }"#);
//! let sources = Arc::new(sources);
//!
//! let deminifier = StackTraceDeminifier::full(sources.clone(), sources);
//! let result = deminifier.deminify("TypeError: null has no properties\n    at a (http://localhost/app.min.js:1:15)");
//!
//! let frame = &result.deminified_stack_frame_results[0].deminified_stack_frame;
//! assert_eq!(frame.method_name.as_deref(), Some("render"));
//! assert_eq!(frame.file_path.as_deref(), Some("app.js"));
//! assert_eq!(frame.to_string(), "at render in app.js:2:3");
//! ```

pub mod cache;
pub mod config;
pub mod deminifier;
pub mod error;
pub mod frame;
pub mod function_map;
pub mod parser;
pub mod provider;
pub mod store;
pub mod trace;

pub use cache::KeyValueCache;
pub use config::{DeminifierConfig, DeminifierMode};
pub use deminifier::{MethodNameStackFrameDeminifier, SourceMapStackFrameDeminifier, StackFrameDeminifier};
pub use error::{DeminifyError, Result};
pub use frame::{DeminificationError, StackFrame, StackFrameDeminificationResult};
pub use function_map::{BindingInformation, FunctionMapEntry};
pub use parser::{BrowserStackTraceParser, ParsedStackTrace, StackTraceParser};
pub use provider::{InMemorySources, SourceCodeProvider, SourceMapProvider};
pub use store::{FunctionMapStore, SourceMapStore};
pub use trace::{DeminifyStackTraceResult, StackTraceDeminifier};
