// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_sourcemap::SourcePosition;

use super::FunctionMapEntry;

/// Find the innermost function whose body strictly contains `position`.
///
/// `function_map` must be sorted by descending start, so the first match is
/// the closest enclosing function.
pub fn wrapping_function_for_position(
	position: SourcePosition,
	function_map: &[FunctionMapEntry],
) -> Option<&FunctionMapEntry> {
	function_map
		.iter()
		.find(|entry| entry.start < position && position < entry.end)
}
