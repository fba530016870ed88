// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frames and per-frame deminification outcomes.

use std::fmt;

use loom_sourcemap::SourcePosition;

/// One frame of a stack trace, minified or deminified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
	pub method_name: Option<String>,
	pub file_path: Option<String>,
	pub source_position: Option<SourcePosition>,
}

impl StackFrame {
	pub fn new(method_name: Option<String>, file_path: Option<String>, source_position: Option<SourcePosition>) -> Self {
		Self {
			method_name,
			file_path,
			source_position,
		}
	}

	/// A frame that only carries a method name.
	pub fn with_method_name(method_name: Option<String>) -> Self {
		Self {
			method_name,
			..Self::default()
		}
	}
}

impl fmt::Display for StackFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let method = self
			.method_name
			.as_deref()
			.filter(|name| !name.trim().is_empty())
			.unwrap_or("?");
		write!(f, "at {method}")?;

		if let Some(file) = self.file_path.as_deref().filter(|file| !file.trim().is_empty()) {
			write!(f, " in {file}")?;
		}

		if let Some(position) = self.source_position {
			write!(f, ":{position}")?;
		}

		Ok(())
	}
}

/// Why a frame could not be (fully) deminified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeminificationError {
	#[default]
	None,
	/// The generated source (or its source map) for the frame's file is unavailable.
	NoSourceCodeProvided,
	/// No function in the generated source encloses the frame's position.
	NoWrappingFunctionFound,
	/// No source map is available for the frame's file.
	NoSourceMap,
	/// The source map has no entry for the frame's position.
	NoMatchingMappingInSourceMap,
}

impl DeminificationError {
	pub fn is_none(&self) -> bool {
		matches!(self, DeminificationError::None)
	}
}

impl fmt::Display for DeminificationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			DeminificationError::None => "none",
			DeminificationError::NoSourceCodeProvided => "no_source_code_provided",
			DeminificationError::NoWrappingFunctionFound => "no_wrapping_function_found",
			DeminificationError::NoSourceMap => "no_source_map",
			DeminificationError::NoMatchingMappingInSourceMap => "no_matching_mapping_in_source_map",
		};
		f.write_str(s)
	}
}

/// The outcome of deminifying one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrameDeminificationResult {
	pub deminification_error: DeminificationError,
	pub deminified_stack_frame: StackFrame,
	/// The original name of the symbol at the frame's position, used as the
	/// caller name for the next frame of the trace.
	pub deminified_symbol_name: Option<String>,
}

impl StackFrameDeminificationResult {
	pub fn new(deminification_error: DeminificationError, deminified_stack_frame: StackFrame) -> Self {
		Self {
			deminification_error,
			deminified_stack_frame,
			deminified_symbol_name: None,
		}
	}

	pub fn failed(deminification_error: DeminificationError) -> Self {
		Self::new(deminification_error, StackFrame::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_full_frame() {
		let frame = StackFrame::new(
			Some("level3".to_string()),
			Some("crashcauser.js".to_string()),
			Some(SourcePosition::new(16, 12)),
		);
		assert_eq!(frame.to_string(), "at level3 in crashcauser.js:17:13");
	}

	#[test]
	fn test_display_blank_method_name() {
		let frame = StackFrame::new(Some("  ".to_string()), None, None);
		assert_eq!(frame.to_string(), "at ?");
		assert_eq!(StackFrame::default().to_string(), "at ?");
	}

	#[test]
	fn test_display_without_position() {
		let frame = StackFrame::new(Some("foo".to_string()), Some("app.js".to_string()), None);
		assert_eq!(frame.to_string(), "at foo in app.js");
	}

	#[test]
	fn test_display_position_without_file() {
		let frame = StackFrame::new(None, None, Some(SourcePosition::new(0, 0)));
		assert_eq!(frame.to_string(), "at ?:1:1");
	}

	#[test]
	fn test_error_defaults_to_none() {
		assert!(DeminificationError::default().is_none());
		assert!(!DeminificationError::NoSourceMap.is_none());
		assert_eq!(
			DeminificationError::NoMatchingMappingInSourceMap.to_string(),
			"no_matching_mapping_in_source_map"
		);
	}
}
