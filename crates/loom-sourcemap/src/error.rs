// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map decoding, encoding and composition.

use thiserror::Error;

/// Errors raised by the source map codecs.
#[derive(Debug, Error)]
pub enum SourceMapError {
	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid VLQ character: {0:?}")]
	InvalidVlqChar(char),

	#[error("Truncated VLQ value in segment {0:?}")]
	TruncatedVlq(String),

	#[error("VLQ value in segment {0:?} does not fit in 32 bits")]
	VlqOverflow(String),

	#[error("VLQ digit out of range: {0}")]
	VlqDigitOutOfRange(u64),

	#[error("Invalid mapping segment: expected 1, 4 or 5 fields, got {0}")]
	InvalidSegmentLength(usize),

	#[error("Invalid source index {index} (source map has {len} sources)")]
	InvalidSourceIndex { index: i64, len: usize },

	#[error("Invalid name index {index} (source map has {len} names)")]
	InvalidNameIndex { index: i64, len: usize },

	#[error("Invalid position: line {line}, column {column}")]
	InvalidPosition { line: i64, column: i64 },

	#[error("Source map is missing required field: {0}")]
	MissingField(&'static str),

	#[error("Mapping entries are not sorted: line {line} follows line {previous}")]
	UnsortedMappings { line: u32, previous: u32 },

	#[error("Source {0:?} is not listed in the source map sources")]
	UnknownSource(String),

	#[error("Name {0:?} is not listed in the source map names")]
	UnknownName(String),
}

pub type Result<T> = std::result::Result<T, SourceMapError>;
