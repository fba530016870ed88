// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map document serialization.

use base64::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::mappings::serialize_mappings;
use crate::sourcemap::SourceMap;

const INLINE_SOURCE_MAP_PREFIX: &str = "//# sourceMappingURL=data:application/json;base64,";

/// Wire form of a source map. Field order is the emitted key order.
#[derive(Debug, Serialize)]
struct SerializedSourceMap<'a> {
	version: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	file: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	mappings: Option<String>,
	sources: &'a [String],
	names: &'a [String],
	#[serde(rename = "sourcesContent", skip_serializing_if = "is_empty")]
	sources_content: &'a [Option<String>],
}

fn is_empty<T>(items: &&[T]) -> bool {
	items.is_empty()
}

/// Serialize a source map to compact JSON.
///
/// The `mappings` field is re-encoded from the parsed entries and ends with
/// a `;`. It is omitted entirely when the map has no entries.
pub fn serialize_source_map(source_map: &SourceMap) -> Result<String> {
	let mappings = if source_map.parsed_mappings.is_empty() {
		None
	} else {
		let mut mappings = serialize_mappings(&source_map.parsed_mappings, &source_map.sources, &source_map.names)?;
		mappings.push(';');
		Some(mappings)
	};

	let document = SerializedSourceMap {
		version: source_map.version,
		file: source_map.file.as_deref(),
		mappings,
		sources: &source_map.sources,
		names: &source_map.names,
		sources_content: &source_map.sources_content,
	};

	Ok(serde_json::to_string(&document)?)
}

/// Render a source map as a `//# sourceMappingURL=` data-URI comment.
pub fn generate_source_map_inline_comment(source_map: &SourceMap) -> Result<String> {
	let json = serialize_source_map(source_map)?;
	Ok(format!("{INLINE_SOURCE_MAP_PREFIX}{}", BASE64_STANDARD.encode(json)))
}
