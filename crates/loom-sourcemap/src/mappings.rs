// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decoding and encoding of the `mappings` field.
//!
//! The mappings string format:
//! - Lines are separated by semicolons (;)
//! - Segments within a line are separated by commas (,)
//! - Each segment contains 1, 4, or 5 VLQ-encoded values, all of them deltas
//!   against the previous segment (the generated column resets every line)

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SourceMapError};
use crate::position::SourcePosition;
use crate::vlq::{decode_vlq_segment, encode_vlq};

/// One decoded mapping: a generated position and, optionally, where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
	pub generated_position: SourcePosition,
	pub original_position: Option<SourcePosition>,
	pub original_name: Option<Arc<str>>,
	pub original_file_name: Option<Arc<str>>,
}

impl MappingEntry {
	/// An entry that maps a generated position without any original location.
	pub fn generated_only(generated_position: SourcePosition) -> Self {
		Self {
			generated_position,
			original_position: None,
			original_name: None,
			original_file_name: None,
		}
	}
}

/// Running delta bases while decoding a mappings string.
#[derive(Debug, Default)]
pub(crate) struct ParserState {
	generated_line: i64,
	generated_column: i64,
	source: i64,
	original_line: i64,
	original_column: i64,
	name: i64,
}

/// Decode a mappings string into entries, in the order they appear.
///
/// `sources` and `names` resolve the index fields; any index outside them is
/// an error, as is a segment with 2 or 3 fields.
pub fn parse_mappings(mappings: &str, sources: &[String], names: &[String]) -> Result<Vec<MappingEntry>> {
	let sources: Vec<Arc<str>> = sources.iter().map(|s| Arc::from(s.as_str())).collect();
	let names: Vec<Arc<str>> = names.iter().map(|n| Arc::from(n.as_str())).collect();

	let mut entries = Vec::new();
	let mut state = ParserState::default();

	for (line_idx, line) in mappings.split(';').enumerate() {
		state.generated_line = line_idx as i64;
		state.generated_column = 0;

		for segment in line.split(',').filter(|s| !s.is_empty()) {
			let fields = decode_vlq_segment(segment)?;
			entries.push(parse_segment(&fields, &mut state, &sources, &names)?);
		}
	}

	Ok(entries)
}

pub(crate) fn parse_segment(
	fields: &[i32],
	state: &mut ParserState,
	sources: &[Arc<str>],
	names: &[Arc<str>],
) -> Result<MappingEntry> {
	if !matches!(fields.len(), 1 | 4 | 5) {
		return Err(SourceMapError::InvalidSegmentLength(fields.len()));
	}

	state.generated_column += i64::from(fields[0]);
	let generated_position = to_position(state.generated_line, state.generated_column)?;
	let mut entry = MappingEntry::generated_only(generated_position);

	if fields.len() >= 4 {
		state.source += i64::from(fields[1]);
		state.original_line += i64::from(fields[2]);
		state.original_column += i64::from(fields[3]);

		let file = index(sources, state.source).ok_or(SourceMapError::InvalidSourceIndex {
			index: state.source,
			len: sources.len(),
		})?;
		entry.original_file_name = Some(Arc::clone(file));
		entry.original_position = Some(to_position(state.original_line, state.original_column)?);
	}

	if fields.len() == 5 {
		state.name += i64::from(fields[4]);

		let name = index(names, state.name).ok_or(SourceMapError::InvalidNameIndex {
			index: state.name,
			len: names.len(),
		})?;
		entry.original_name = Some(Arc::clone(name));
	}

	Ok(entry)
}

fn index<T>(items: &[T], idx: i64) -> Option<&T> {
	usize::try_from(idx).ok().and_then(|idx| items.get(idx))
}

fn to_position(line: i64, column: i64) -> Result<SourcePosition> {
	match (u32::try_from(line), u32::try_from(column)) {
		(Ok(l), Ok(c)) => Ok(SourcePosition::new(l, c)),
		_ => Err(SourceMapError::InvalidPosition { line, column }),
	}
}

/// Running delta bases while encoding entries.
#[derive(Debug, Default)]
struct GenerateState {
	last_generated_line: u32,
	last_generated_column: i64,
	last_source: i64,
	last_original_line: i64,
	last_original_column: i64,
	last_name: i64,
	first_in_line: bool,
}

/// Encode entries back into a mappings string.
///
/// Entries must be sorted by generated line. Every original file and name
/// referenced by an entry must be present in `sources` / `names`.
pub fn serialize_mappings(entries: &[MappingEntry], sources: &[String], names: &[String]) -> Result<String> {
	let source_indices = index_lookup(sources);
	let name_indices = index_lookup(names);

	let mut out = String::new();
	let mut state = GenerateState {
		first_in_line: true,
		..GenerateState::default()
	};

	for entry in entries {
		let line = entry.generated_position.line;
		if line < state.last_generated_line {
			return Err(SourceMapError::UnsortedMappings {
				line,
				previous: state.last_generated_line,
			});
		}

		if line > state.last_generated_line {
			for _ in state.last_generated_line..line {
				out.push(';');
			}
			state.last_generated_line = line;
			state.last_generated_column = 0;
			state.first_in_line = true;
		}

		if !state.first_in_line {
			out.push(',');
		}
		state.first_in_line = false;

		let column = i64::from(entry.generated_position.column);
		encode_delta(column, &mut state.last_generated_column, &mut out)?;

		let (Some(file), Some(original)) = (&entry.original_file_name, entry.original_position) else {
			continue;
		};

		let source = *source_indices
			.get(&**file)
			.ok_or_else(|| SourceMapError::UnknownSource(file.to_string()))?;
		encode_delta(source as i64, &mut state.last_source, &mut out)?;
		encode_delta(i64::from(original.line), &mut state.last_original_line, &mut out)?;
		encode_delta(i64::from(original.column), &mut state.last_original_column, &mut out)?;

		if let Some(name) = &entry.original_name {
			let name_index = *name_indices
				.get(&**name)
				.ok_or_else(|| SourceMapError::UnknownName(name.to_string()))?;
			encode_delta(name_index as i64, &mut state.last_name, &mut out)?;
		}
	}

	Ok(out)
}

fn index_lookup(items: &[String]) -> HashMap<&str, usize> {
	let mut lookup = HashMap::with_capacity(items.len());
	for (idx, item) in items.iter().enumerate() {
		lookup.entry(item.as_str()).or_insert(idx);
	}
	lookup
}

fn encode_delta(value: i64, last: &mut i64, out: &mut String) -> Result<()> {
	let delta = i32::try_from(value - *last).map_err(|_| SourceMapError::InvalidPosition {
		line: value,
		column: *last,
	})?;
	*last = value;
	encode_vlq(delta, out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strings(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	fn full_entry(generated: (u32, u32), original: (u32, u32), file: &str, name: Option<&str>) -> MappingEntry {
		MappingEntry {
			generated_position: SourcePosition::new(generated.0, generated.1),
			original_position: Some(SourcePosition::new(original.0, original.1)),
			original_name: name.map(Arc::from),
			original_file_name: Some(Arc::from(file)),
		}
	}

	#[test]
	fn test_parse_known_mappings() {
		let sources = strings(&["input/CommonIntl.js"]);
		let names = strings(&["CommonStrings", "afrikaans"]);

		let entries = parse_mappings("AACAA,aAAA,CAAc;", &sources, &names).unwrap();

		assert_eq!(entries.len(), 3);
		assert_eq!(entries[0].generated_position, SourcePosition::new(0, 0));
		assert_eq!(entries[0].original_position, Some(SourcePosition::new(1, 0)));
		assert_eq!(entries[0].original_name.as_deref(), Some("CommonStrings"));
		assert_eq!(entries[1].generated_position, SourcePosition::new(0, 13));
		assert_eq!(entries[1].original_position, Some(SourcePosition::new(1, 0)));
		assert_eq!(entries[1].original_name, None);
		assert_eq!(entries[2].generated_position, SourcePosition::new(0, 14));
		assert_eq!(entries[2].original_position, Some(SourcePosition::new(1, 14)));
		assert_eq!(entries[2].original_name, None);
		assert_eq!(entries[2].original_file_name.as_deref(), Some("input/CommonIntl.js"));
	}

	#[test]
	fn test_generated_column_resets_per_line() {
		let sources = strings(&["a.js"]);
		let entries = parse_mappings("KAAA;KACA", &sources, &[]).unwrap();

		assert_eq!(entries[0].generated_position, SourcePosition::new(0, 5));
		assert_eq!(entries[1].generated_position, SourcePosition::new(1, 5));
		assert_eq!(entries[1].original_position, Some(SourcePosition::new(1, 0)));
	}

	#[test]
	fn test_empty_segments_and_lines_are_skipped() {
		let sources = strings(&["a.js"]);
		let entries = parse_mappings(";;AAAA,,CAAC;", &sources, &[]).unwrap();

		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].generated_position, SourcePosition::new(2, 0));
		assert_eq!(entries[1].generated_position, SourcePosition::new(2, 1));
	}

	#[test]
	fn test_single_field_segment_has_no_original() {
		let entries = parse_mappings("C", &[], &[]).unwrap();
		assert_eq!(entries, vec![MappingEntry::generated_only(SourcePosition::new(0, 1))]);
	}

	#[test]
	fn test_segment_field_count_errors() {
		for fields in [&[][..], &[0, 0][..], &[0, 0, 0][..], &[0, 0, 0, 0, 0, 0][..]] {
			let mut state = ParserState::default();
			let result = parse_segment(fields, &mut state, &[Arc::from("a.js")], &[]);
			assert!(matches!(
				result,
				Err(SourceMapError::InvalidSegmentLength(n)) if n == fields.len()
			));
		}
		assert!(parse_mappings("AA", &[], &[]).is_err());
		assert!(parse_mappings("AAA", &[], &[]).is_err());
	}

	#[test]
	fn test_out_of_range_indices() {
		let sources = strings(&["a.js"]);
		assert!(matches!(
			parse_mappings("ACAA", &sources, &[]),
			Err(SourceMapError::InvalidSourceIndex { index: 1, len: 1 })
		));
		assert!(matches!(
			parse_mappings("AAAAA", &sources, &[]),
			Err(SourceMapError::InvalidNameIndex { index: 0, len: 0 })
		));
		assert!(matches!(
			parse_mappings("ADAA", &sources, &[]),
			Err(SourceMapError::InvalidSourceIndex { index: -1, len: 1 })
		));
	}

	#[test]
	fn test_negative_original_position_is_rejected() {
		let sources = strings(&["a.js"]);
		assert!(matches!(
			parse_mappings("AADA", &sources, &[]),
			Err(SourceMapError::InvalidPosition { line: -1, column: 0 })
		));
	}

	#[test]
	fn test_serialize_known_mappings() {
		let sources = strings(&["input/CommonIntl.js"]);
		let names = strings(&["CommonStrings", "afrikaans"]);
		let entries = vec![
			full_entry((0, 0), (1, 0), "input/CommonIntl.js", Some("CommonStrings")),
			full_entry((0, 13), (1, 0), "input/CommonIntl.js", None),
			full_entry((0, 14), (1, 14), "input/CommonIntl.js", None),
		];

		let mappings = serialize_mappings(&entries, &sources, &names).unwrap();
		assert_eq!(mappings, "AACAA,aAAA,CAAc");
	}

	#[test]
	fn test_serialize_line_advances() {
		let sources = strings(&["a.js"]);
		let entries = vec![
			full_entry((0, 5), (0, 0), "a.js", None),
			full_entry((2, 5), (1, 0), "a.js", None),
			MappingEntry::generated_only(SourcePosition::new(2, 9)),
		];

		let mappings = serialize_mappings(&entries, &sources, &[]).unwrap();
		assert_eq!(mappings, "KAAA;;KACA,I");

		let reparsed = parse_mappings(&mappings, &sources, &[]).unwrap();
		assert_eq!(reparsed, entries);
	}

	#[test]
	fn test_serialize_unsorted_lines_fails() {
		let entries = vec![
			MappingEntry::generated_only(SourcePosition::new(3, 0)),
			MappingEntry::generated_only(SourcePosition::new(1, 0)),
		];
		assert!(matches!(
			serialize_mappings(&entries, &[], &[]),
			Err(SourceMapError::UnsortedMappings { line: 1, previous: 3 })
		));
	}

	#[test]
	fn test_serialize_unknown_source_or_name_fails() {
		let entries = vec![full_entry((0, 0), (0, 0), "missing.js", None)];
		assert!(matches!(
			serialize_mappings(&entries, &strings(&["a.js"]), &[]),
			Err(SourceMapError::UnknownSource(s)) if s == "missing.js"
		));

		let entries = vec![full_entry((0, 0), (0, 0), "a.js", Some("ghost"))];
		assert!(matches!(
			serialize_mappings(&entries, &strings(&["a.js"]), &[]),
			Err(SourceMapError::UnknownName(s)) if s == "ghost"
		));
	}
}
