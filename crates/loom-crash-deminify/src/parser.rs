// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of browser JavaScript stack traces.

use std::sync::LazyLock;

use loom_sourcemap::SourcePosition;
use regex::Regex;

use crate::frame::StackFrame;

/// File, one-based line and one-based column at the end of a frame line.
static FRAME_LOCATION_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"([^@(\s]*\.js)[^/]*:([0-9]+):([0-9]+)[^/]*$").unwrap());

/// A stack trace split into its message and frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedStackTrace {
	pub message: Option<String>,
	/// Innermost frame first, positions zero-based.
	pub stack_frames: Vec<StackFrame>,
}

/// Turns raw stack trace text into frames.
pub trait StackTraceParser: Send + Sync {
	fn parse_stack_trace(&self, stack_trace: &str) -> ParsedStackTrace;
}

/// Parser for the Chrome, Firefox, Edge and Internet Explorer trace formats.
///
/// Lines that do not end in a `file.js:line:column` location are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStackTraceParser;

impl BrowserStackTraceParser {
	pub fn new() -> Self {
		Self
	}

	/// Parse a single frame line, e.g. `at d (http://localhost/app.min.js:1:75)`.
	pub fn parse_stack_frame(&self, frame: &str) -> Option<StackFrame> {
		let captures = FRAME_LOCATION_REGEX.captures(frame)?;

		let file_path = captures.get(1)?.as_str().to_string();
		let line: u32 = captures.get(2)?.as_str().parse().ok()?;
		let column: u32 = captures.get(3)?.as_str().parse().ok()?;

		// Browsers report one-based positions.
		let source_position = SourcePosition::new(line.saturating_sub(1), column.saturating_sub(1));

		Some(StackFrame::new(
			extract_method_name(frame),
			Some(file_path),
			Some(source_position),
		))
	}
}

impl StackTraceParser for BrowserStackTraceParser {
	fn parse_stack_trace(&self, stack_trace: &str) -> ParsedStackTrace {
		let mut lines = stack_trace.split('\n').peekable();

		let message = match lines.peek() {
			Some(first) if !first.starts_with(' ') && extract_method_name(first).is_none() => {
				let message = first.trim().to_string();
				lines.next();
				Some(message)
			}
			_ => None,
		};

		let stack_frames = lines.filter_map(|line| self.parse_stack_frame(line)).collect();

		ParsedStackTrace { message, stack_frames }
	}
}

/// Extract the method name of a frame line, if it has one.
fn extract_method_name(frame: &str) -> Option<String> {
	// Firefox: "c@http://localhost:19220/crashcauser.min.js:1:34"
	let method_name = if let Some(at_symbol) = frame.find("@http") {
		Some(frame[..at_symbol].trim_start().to_string())
	} else if let Some(at_word) = frame.find("at ") {
		// Chrome, Edge and IE: "   at d (http://localhost:19220/crashcauser.min.js:1:75)"
		let rest = &frame[at_word..];
		let end = rest
			.find(" (http")
			.or_else(|| rest.find(" http").map(|idx| idx + 1))
			.or_else(|| rest.find(" ("));
		end.map(|end| rest[..end].replace("at ", "").trim().to_string())
	} else {
		None
	};

	method_name.filter(|name| !name.trim().is_empty())
}
