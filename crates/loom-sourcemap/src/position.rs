// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Zero-based line/column positions.

use std::fmt;

/// A zero-based `(line, column)` location in a generated or original file.
///
/// Ordering is lexicographic: line first, then column. "Not found" is
/// expressed as `Option<SourcePosition>::None` by the types that carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourcePosition {
	pub line: u32,
	pub column: u32,
}

impl SourcePosition {
	pub const fn new(line: u32, column: u32) -> Self {
		Self { line, column }
	}

	/// Near-equality used to absorb off-by-one reports from browsers.
	///
	/// Two positions are equalish when they are on the same line and at most
	/// one column apart, or on adjacent lines where the later position sits
	/// at column 0.
	pub fn is_equalish(&self, other: &SourcePosition) -> bool {
		if self.line == other.line {
			return self.column.abs_diff(other.column) <= 1;
		}

		if self.line.abs_diff(other.line) == 1 {
			let later = if self.line > other.line { self } else { other };
			return later.column == 0;
		}

		false
	}
}

impl fmt::Display for SourcePosition {
	/// Renders the one-based form shown in stack traces.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", u64::from(self.line) + 1, u64::from(self.column) + 1)
	}
}
