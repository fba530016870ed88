// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for deminification.
//!
//! These only surface from building blocks (function map generation,
//! configuration loading). Deminifying a stack trace never fails: per-frame
//! problems are reported through [`crate::DeminificationError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeminifyError {
	#[error("Source map error: {0}")]
	SourceMap(#[from] loom_sourcemap::SourceMapError),

	#[error("Failed to parse JavaScript source: {0}")]
	JavaScriptParse(String),

	#[error("Generated source is not valid UTF-8: {0}")]
	InvalidUtf8(#[from] std::str::Utf8Error),

	#[error("Invalid configuration: {0}")]
	Config(#[from] toml::de::Error),

	#[error("Invalid value {value:?} for {key}")]
	InvalidConfigValue { key: &'static str, value: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeminifyError>;
