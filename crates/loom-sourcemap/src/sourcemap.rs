// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map parsing, position lookup and composition.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SourceMapError};
use crate::mappings::{parse_mappings, MappingEntry};
use crate::position::SourcePosition;

/// Raw source map JSON structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	#[serde(default)]
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	mappings: Option<String>,
	#[serde(default)]
	sources: Vec<String>,
	#[serde(default)]
	names: Vec<String>,
	#[serde(default)]
	sources_content: Option<Vec<Option<String>>>,
}

/// A decoded source map ready for lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
	pub version: u32,
	/// Name of the generated file this map describes.
	pub file: Option<String>,
	/// The raw `mappings` text, when the map was parsed from a document.
	pub mappings: Option<String>,
	pub sources: Vec<String>,
	pub names: Vec<String>,
	pub sources_content: Vec<Option<String>>,
	/// Decoded mappings, sorted by generated position.
	pub parsed_mappings: Vec<MappingEntry>,
}

impl SourceMap {
	/// Build a version 3 source map from already-decoded entries.
	pub fn new(file: Option<String>, sources: Vec<String>, names: Vec<String>, parsed_mappings: Vec<MappingEntry>) -> Self {
		Self {
			version: 3,
			file,
			mappings: None,
			sources,
			names,
			sources_content: Vec::new(),
			parsed_mappings,
		}
	}

	/// Parse a source map from JSON bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_slice(data)?;

		let parsed_mappings = match raw.mappings.as_deref() {
			Some(mappings) => parse_mappings(mappings, &raw.sources, &raw.names)?,
			None => Vec::new(),
		};

		Ok(Self {
			version: raw.version,
			file: raw.file,
			mappings: raw.mappings,
			sources: raw.sources,
			names: raw.names,
			sources_content: raw.sources_content.unwrap_or_default(),
			parsed_mappings,
		})
	}

	/// Parse a source map from a JSON string.
	#[allow(clippy::should_implement_trait)]
	pub fn from_str(data: &str) -> Result<Self> {
		Self::from_bytes(data.as_bytes())
	}

	/// Find the mapping for a generated position.
	///
	/// An exact match wins. Otherwise the closest entry before the position
	/// is returned, but only if it is equalish to the requested position.
	pub fn mapping_entry_for_generated_position(&self, position: SourcePosition) -> Option<&MappingEntry> {
		match self
			.parsed_mappings
			.binary_search_by(|entry| entry.generated_position.cmp(&position))
		{
			Ok(idx) => self.parsed_mappings.get(idx),
			Err(insertion) => insertion
				.checked_sub(1)
				.and_then(|idx| self.parsed_mappings.get(idx))
				.filter(|entry| entry.generated_position.is_equalish(&position)),
		}
	}

	/// Compose this map with a map of one of its original files.
	///
	/// `submap` describes `source_file` (or `submap.file` when no override is
	/// given). Every entry of `self` that points into that file is rewritten
	/// to point through the submap; all other entries are kept as they are.
	/// Sources and names of the result are the distinct values referenced by
	/// the rewritten entries, and embedded source content is dropped.
	pub fn apply_source_map(&self, submap: &SourceMap, source_file: Option<&str>) -> Result<SourceMap> {
		let target = source_file
			.or(submap.file.as_deref())
			.ok_or(SourceMapError::MissingField("file"))?;

		let mut parsed_mappings = Vec::with_capacity(self.parsed_mappings.len());
		let mut rewritten = 0usize;

		for entry in &self.parsed_mappings {
			let through_submap = match (entry.original_file_name.as_deref(), entry.original_position) {
				(Some(file), Some(original)) if file == target => submap.mapping_entry_for_generated_position(original),
				_ => None,
			};

			match through_submap {
				Some(sub) => {
					rewritten += 1;
					parsed_mappings.push(MappingEntry {
						generated_position: entry.generated_position,
						original_position: sub.original_position,
						original_name: sub.original_name.clone().or_else(|| entry.original_name.clone()),
						original_file_name: sub
							.original_file_name
							.clone()
							.or_else(|| entry.original_file_name.clone()),
					});
				}
				None => parsed_mappings.push(entry.clone()),
			}
		}

		debug!(
			target_file = target,
			entries = parsed_mappings.len(),
			rewritten,
			"Applied source map"
		);

		let sources = distinct(parsed_mappings.iter().filter_map(|e| e.original_file_name.as_ref()));
		let names = distinct(parsed_mappings.iter().filter_map(|e| e.original_name.as_ref()));

		Ok(SourceMap {
			version: self.version,
			file: self.file.clone(),
			mappings: None,
			sources,
			names,
			sources_content: Vec::new(),
			parsed_mappings,
		})
	}

	/// Keep the first mapping of every generated line, with both columns set to 0.
	pub fn flatten(&self) -> SourceMap {
		let mut parsed_mappings: Vec<MappingEntry> = Vec::new();

		for entry in &self.parsed_mappings {
			let line = entry.generated_position.line;
			if parsed_mappings.last().is_some_and(|last| last.generated_position.line == line) {
				continue;
			}

			parsed_mappings.push(MappingEntry {
				generated_position: SourcePosition::new(line, 0),
				original_position: entry.original_position.map(|p| SourcePosition::new(p.line, 0)),
				original_name: entry.original_name.clone(),
				original_file_name: entry.original_file_name.clone(),
			});
		}

		SourceMap {
			version: self.version,
			file: self.file.clone(),
			mappings: None,
			sources: self.sources.clone(),
			names: self.names.clone(),
			sources_content: self.sources_content.clone(),
			parsed_mappings,
		}
	}
}

/// Distinct values in order of first appearance.
fn distinct<'a>(values: impl Iterator<Item = &'a Arc<str>>) -> Vec<String> {
	let mut seen = HashSet::new();
	values
		.filter(|value| seen.insert(Arc::clone(value)))
		.map(|value| value.to_string())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn entry(generated: (u32, u32), original: Option<(u32, u32)>, file: Option<&str>, name: Option<&str>) -> MappingEntry {
		MappingEntry {
			generated_position: SourcePosition::new(generated.0, generated.1),
			original_position: original.map(|(l, c)| SourcePosition::new(l, c)),
			original_name: name.map(Arc::from),
			original_file_name: file.map(Arc::from),
		}
	}

	fn map_with(entries: Vec<MappingEntry>) -> SourceMap {
		SourceMap::new(Some("generated.js".to_string()), Vec::new(), Vec::new(), entries)
	}

	#[test]
	fn test_parse_simple_sourcemap() {
		let json = r#"{
			"version": 3,
			"file": "CommonIntl",
			"sources": ["input/CommonIntl.js"],
			"names": ["CommonStrings", "afrikaans"],
			"mappings": "AACAA,aAAA,CAAc;"
		}"#;

		let map = SourceMap::from_str(json).unwrap();
		assert_eq!(map.version, 3);
		assert_eq!(map.file.as_deref(), Some("CommonIntl"));
		assert_eq!(map.mappings.as_deref(), Some("AACAA,aAAA,CAAc;"));
		assert_eq!(map.sources, vec!["input/CommonIntl.js"]);
		assert_eq!(map.parsed_mappings.len(), 3);
		assert!(map.sources_content.is_empty());
	}

	#[test]
	fn test_parse_tolerates_missing_fields() {
		let map = SourceMap::from_str(r#"{"version": 3}"#).unwrap();
		assert!(map.parsed_mappings.is_empty());
		assert!(map.sources.is_empty());
		assert_eq!(map.file, None);
	}

	#[test]
	fn test_parse_sources_content() {
		let json = r#"{
			"version": 3,
			"sources": ["a.js", "b.js"],
			"sourcesContent": ["var a;", null],
			"names": [],
			"mappings": "AAAA"
		}"#;

		let map = SourceMap::from_str(json).unwrap();
		assert_eq!(map.sources_content, vec![Some("var a;".to_string()), None]);
	}

	#[test]
	fn test_parse_invalid_json() {
		assert!(matches!(
			SourceMap::from_str("not json"),
			Err(SourceMapError::InvalidSourceMapJson(_))
		));
	}

	#[test]
	fn test_parse_propagates_mapping_errors() {
		let json = r#"{"version": 3, "sources": [], "names": [], "mappings": "AAAA"}"#;
		assert!(matches!(
			SourceMap::from_str(json),
			Err(SourceMapError::InvalidSourceIndex { index: 0, len: 0 })
		));
	}

	#[test]
	fn test_lookup_empty_map() {
		let map = map_with(Vec::new());
		assert!(map.mapping_entry_for_generated_position(SourcePosition::new(0, 0)).is_none());
	}

	#[test]
	fn test_lookup_exact_match() {
		let map = map_with(vec![
			entry((0, 2), Some((3, 4)), Some("a.js"), None),
			entry((0, 8), Some((3, 9)), Some("a.js"), Some("foo")),
			entry((1, 0), Some((4, 0)), Some("a.js"), None),
		]);

		let found = map
			.mapping_entry_for_generated_position(SourcePosition::new(0, 8))
			.unwrap();
		assert_eq!(found.original_name.as_deref(), Some("foo"));
	}

	#[test]
	fn test_lookup_off_by_one_column() {
		let map = map_with(vec![
			entry((0, 2), Some((3, 4)), Some("a.js"), None),
			entry((0, 8), Some((3, 9)), Some("a.js"), Some("foo")),
		]);

		let found = map
			.mapping_entry_for_generated_position(SourcePosition::new(0, 9))
			.unwrap();
		assert_eq!(found.generated_position, SourcePosition::new(0, 8));
	}

	#[test]
	fn test_lookup_too_far_returns_none() {
		let map = map_with(vec![
			entry((0, 2), Some((3, 4)), Some("a.js"), None),
			entry((0, 8), Some((3, 9)), Some("a.js"), None),
		]);

		assert!(map.mapping_entry_for_generated_position(SourcePosition::new(0, 10)).is_none());
		assert!(map.mapping_entry_for_generated_position(SourcePosition::new(0, 0)).is_none());
	}

	#[test]
	fn test_lookup_previous_line_end() {
		let map = map_with(vec![entry((3, 0), Some((10, 0)), Some("a.js"), None)]);

		let found = map
			.mapping_entry_for_generated_position(SourcePosition::new(4, 0))
			.unwrap();
		assert_eq!(found.original_position, Some(SourcePosition::new(10, 0)));
		assert!(map.mapping_entry_for_generated_position(SourcePosition::new(4, 1)).is_none());
	}

	#[test]
	fn test_apply_source_map_without_file_fails() {
		let parent = map_with(Vec::new());
		let submap = SourceMap::default();
		assert!(matches!(
			parent.apply_source_map(&submap, None),
			Err(SourceMapError::MissingField("file"))
		));
	}

	#[test]
	fn test_apply_source_map_rewrites_matching_entries() {
		let parent = SourceMap::new(
			Some("bundle.min.js".to_string()),
			vec!["bundle.js".to_string()],
			vec!["x".to_string()],
			vec![entry((0, 4), Some((2, 10)), Some("bundle.js"), Some("x"))],
		);
		let submap = SourceMap::new(
			Some("bundle.js".to_string()),
			vec!["src/app.ts".to_string()],
			vec!["render".to_string()],
			vec![entry((2, 10), Some((7, 3)), Some("src/app.ts"), Some("render"))],
		);

		let combined = parent.apply_source_map(&submap, None).unwrap();

		assert_eq!(combined.file.as_deref(), Some("bundle.min.js"));
		assert_eq!(combined.sources, vec!["src/app.ts"]);
		assert_eq!(combined.names, vec!["render"]);
		assert_eq!(
			combined.parsed_mappings,
			vec![entry((0, 4), Some((7, 3)), Some("src/app.ts"), Some("render"))]
		);
	}

	#[test]
	fn test_apply_source_map_keeps_parent_name_when_submap_has_none() {
		let parent = map_with(vec![entry((0, 4), Some((2, 10)), Some("bundle.js"), Some("x"))]);
		let submap = map_with(vec![entry((2, 10), Some((7, 3)), Some("src/app.ts"), None)]);

		let combined = parent.apply_source_map(&submap, Some("bundle.js")).unwrap();

		assert_eq!(combined.parsed_mappings[0].original_name.as_deref(), Some("x"));
		assert_eq!(combined.names, vec!["x"]);
	}

	#[test]
	fn test_apply_source_map_partial_match() {
		let parent = map_with(vec![
			entry((0, 0), Some((0, 0)), Some("bundle.js"), None),
			entry((0, 5), Some((1, 0)), Some("other.js"), Some("keep")),
			entry((0, 9), Some((9, 9)), Some("bundle.js"), None),
		]);
		let submap = map_with(vec![entry((0, 0), Some((5, 5)), Some("src/a.ts"), Some("start"))]);

		let combined = parent.apply_source_map(&submap, Some("bundle.js")).unwrap();

		assert_eq!(
			combined.parsed_mappings,
			vec![
				entry((0, 0), Some((5, 5)), Some("src/a.ts"), Some("start")),
				entry((0, 5), Some((1, 0)), Some("other.js"), Some("keep")),
				entry((0, 9), Some((9, 9)), Some("bundle.js"), None),
			]
		);
		assert_eq!(combined.sources, vec!["src/a.ts", "other.js", "bundle.js"]);
		assert_eq!(combined.names, vec!["start", "keep"]);
	}

	#[test]
	fn test_apply_source_map_chain() {
		let minified = map_with(vec![entry((0, 1), Some((4, 2)), Some("stage1.js"), None)]);
		let stage1 = SourceMap::new(
			Some("stage1.js".to_string()),
			Vec::new(),
			Vec::new(),
			vec![entry((4, 2), Some((8, 6)), Some("stage2.js"), None)],
		);
		let stage2 = SourceMap::new(
			Some("stage2.js".to_string()),
			Vec::new(),
			Vec::new(),
			vec![entry((8, 6), Some((12, 0)), Some("original.ts"), Some("deep"))],
		);

		let combined = minified
			.apply_source_map(&stage1, None)
			.and_then(|map| map.apply_source_map(&stage2, None))
			.unwrap();

		assert_eq!(
			combined.parsed_mappings,
			vec![entry((0, 1), Some((12, 0)), Some("original.ts"), Some("deep"))]
		);
	}

	#[test]
	fn test_apply_source_map_clears_sources_content() {
		let mut parent = map_with(Vec::new());
		parent.sources_content = vec![Some("var a;".to_string())];

		let combined = parent
			.apply_source_map(&map_with(Vec::new()), Some("x.js"))
			.unwrap();
		assert!(combined.sources_content.is_empty());
	}

	#[test]
	fn test_flatten_keeps_first_entry_per_line() {
		let map = map_with(vec![
			entry((0, 3), Some((1, 7)), Some("a.js"), Some("first")),
			entry((0, 9), Some((1, 12)), Some("a.js"), None),
			entry((2, 4), Some((5, 2)), Some("a.js"), None),
			entry((2, 6), Some((5, 8)), Some("a.js"), None),
		]);

		let flat = map.flatten();

		assert_eq!(
			flat.parsed_mappings,
			vec![
				entry((0, 0), Some((1, 0)), Some("a.js"), Some("first")),
				entry((2, 0), Some((5, 0)), Some("a.js"), None),
			]
		);
		assert_eq!(flat.file, map.file);
	}

	proptest! {
		#[test]
		fn lookup_at_mapped_position_is_exact(
			columns in prop::collection::btree_set(0u32..500, 1..20),
			line in 0u32..50,
		) {
			let entries: Vec<MappingEntry> = columns
				.iter()
				.map(|&c| entry((line, c), Some((c, line)), Some("a.js"), None))
				.collect();
			let map = map_with(entries.clone());

			for expected in &entries {
				let found = map.mapping_entry_for_generated_position(expected.generated_position);
				prop_assert_eq!(found, Some(expected));
			}
		}
	}
}
