// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Whole stack trace deminification.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::{DeminifierConfig, DeminifierMode};
use crate::deminifier::{MethodNameStackFrameDeminifier, SourceMapStackFrameDeminifier, StackFrameDeminifier};
use crate::frame::{StackFrame, StackFrameDeminificationResult};
use crate::parser::{BrowserStackTraceParser, StackTraceParser};
use crate::provider::{SourceCodeProvider, SourceMapProvider};
use crate::store::{FunctionMapStore, SourceMapStore};

/// The minified and deminified frames of one stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeminifyStackTraceResult {
	pub message: Option<String>,
	pub minified_stack_frames: Vec<StackFrame>,
	/// One result per minified frame, in the same order.
	pub deminified_stack_frame_results: Vec<StackFrameDeminificationResult>,
}

impl fmt::Display for DeminifyStackTraceResult {
	/// Prints every frame, falling back to the minified name and location
	/// where deminification did not produce them.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
			f.write_str(message)?;
		}

		for (minified, result) in self.minified_stack_frames.iter().zip(&self.deminified_stack_frame_results) {
			let deminified = &result.deminified_stack_frame;
			let (file_path, source_position) = match deminified.source_position {
				Some(position) => (deminified.file_path.clone(), Some(position)),
				None => (minified.file_path.clone(), minified.source_position),
			};
			let frame = StackFrame::new(
				deminified.method_name.clone().or_else(|| minified.method_name.clone()),
				file_path,
				source_position,
			);

			write!(f, "\n  {frame}")?;
		}

		Ok(())
	}
}

/// Parses stack traces and deminifies each of their frames.
pub struct StackTraceDeminifier {
	frame_deminifier: Box<dyn StackFrameDeminifier>,
	parser: Box<dyn StackTraceParser>,
	prefer_source_maps_symbols: bool,
}

impl StackTraceDeminifier {
	pub fn new(frame_deminifier: Box<dyn StackFrameDeminifier>, parser: Box<dyn StackTraceParser>) -> Self {
		Self {
			frame_deminifier,
			parser,
			prefer_source_maps_symbols: false,
		}
	}

	/// Resolve method names through function maps and positions through
	/// source maps. Both share one source map cache.
	pub fn full(source_map_provider: Arc<dyn SourceMapProvider>, source_code_provider: Arc<dyn SourceCodeProvider>) -> Self {
		let source_map_store = Arc::new(SourceMapStore::new(source_map_provider));
		let function_map_store = FunctionMapStore::with_source_map_store(source_code_provider, source_map_store.clone());
		let method_name_deminifier = MethodNameStackFrameDeminifier::new(Arc::new(function_map_store));

		Self::new(
			Box::new(SourceMapStackFrameDeminifier::new(source_map_store, Some(method_name_deminifier))),
			Box::new(BrowserStackTraceParser::new()),
		)
	}

	/// Resolve positions through source maps only. Frames are named after
	/// the symbol their caller was executing.
	pub fn map_only(source_map_provider: Arc<dyn SourceMapProvider>) -> Self {
		let source_map_store = Arc::new(SourceMapStore::new(source_map_provider));

		Self::new(
			Box::new(SourceMapStackFrameDeminifier::new(source_map_store, None)),
			Box::new(BrowserStackTraceParser::new()),
		)
	}

	/// Resolve method names only. Source maps are parsed while building
	/// function maps and then dropped.
	pub fn method_name_only(
		source_map_provider: Arc<dyn SourceMapProvider>,
		source_code_provider: Arc<dyn SourceCodeProvider>,
	) -> Self {
		let function_map_store = FunctionMapStore::with_uncached_source_maps(source_code_provider, source_map_provider);

		Self::new(
			Box::new(MethodNameStackFrameDeminifier::new(Arc::new(function_map_store))),
			Box::new(BrowserStackTraceParser::new()),
		)
	}

	pub fn from_config(
		config: &DeminifierConfig,
		source_map_provider: Arc<dyn SourceMapProvider>,
		source_code_provider: Arc<dyn SourceCodeProvider>,
	) -> Self {
		debug!(mode = %config.mode, "building stack trace deminifier");

		let deminifier = match config.mode {
			DeminifierMode::Full => Self::full(source_map_provider, source_code_provider),
			DeminifierMode::MapOnly => Self::map_only(source_map_provider),
			DeminifierMode::MethodNameOnly => Self::method_name_only(source_map_provider, source_code_provider),
		};

		deminifier.with_prefer_source_maps_symbols(config.prefer_source_maps_symbols)
	}

	/// Set the default used by [`Self::deminify`].
	pub fn with_prefer_source_maps_symbols(mut self, prefer_source_maps_symbols: bool) -> Self {
		self.prefer_source_maps_symbols = prefer_source_maps_symbols;
		self
	}

	pub fn deminify(&self, stack_trace: &str) -> DeminifyStackTraceResult {
		self.deminify_stack_trace(stack_trace, self.prefer_source_maps_symbols)
	}

	/// Parse and deminify a stack trace.
	///
	/// With `prefer_source_maps_symbols`, each frame is named after the
	/// source map symbol its caller was executing, so names read like a
	/// debug build's trace. The innermost frame keeps its own symbol as
	/// `caller => symbol`, and the outermost frame is left unnamed.
	#[instrument(skip(self, stack_trace), fields(frames))]
	pub fn deminify_stack_trace(&self, stack_trace: &str, prefer_source_maps_symbols: bool) -> DeminifyStackTraceResult {
		let parsed = self.parser.parse_stack_trace(stack_trace);
		tracing::Span::current().record("frames", parsed.stack_frames.len());

		// Outermost first, so each frame sees the symbol its caller resolved.
		let mut caller_symbol_name: Option<String> = None;
		let mut results: Vec<StackFrameDeminificationResult> = parsed
			.stack_frames
			.iter()
			.rev()
			.map(|frame| {
				let result = self.frame_deminifier.deminify_stack_frame(
					frame,
					caller_symbol_name.as_deref(),
					prefer_source_maps_symbols,
				);
				caller_symbol_name = result.deminified_symbol_name.clone();
				result
			})
			.collect();
		results.reverse();

		if prefer_source_maps_symbols {
			shift_method_names_to_callees(&mut results);
		}

		DeminifyStackTraceResult {
			message: parsed.message,
			minified_stack_frames: parsed.stack_frames,
			deminified_stack_frame_results: results,
		}
	}
}

fn shift_method_names_to_callees(results: &mut [StackFrameDeminificationResult]) {
	let count = results.len();

	for i in 0..count.saturating_sub(1) {
		let mut method_name = results[i + 1].deminified_stack_frame.method_name.clone();

		if i == 0 {
			if let Some(own) = results[0].deminified_stack_frame.method_name.as_deref() {
				method_name = Some(match method_name {
					Some(caller) => format!("{caller} => {own}"),
					None => format!("=> {own}"),
				});
			}
		}

		results[i].deminified_stack_frame.method_name = method_name;
	}

	if count > 1 {
		results[count - 1].deminified_stack_frame.method_name = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::frame::DeminificationError;
	use crate::provider::InMemorySources;
	use loom_sourcemap::SourcePosition;
	use std::sync::Mutex;

	/// Names every frame `m<line>` with symbol `s<line>` and records the
	/// caller symbol each frame was given.
	#[derive(Default)]
	struct RecordingDeminifier {
		callers: Arc<Mutex<Vec<Option<String>>>>,
		unnamed_line: Option<u32>,
	}

	impl StackFrameDeminifier for RecordingDeminifier {
		fn deminify_stack_frame(
			&self,
			stack_frame: &StackFrame,
			caller_symbol_name: Option<&str>,
			_prefer_source_maps_symbols: bool,
		) -> StackFrameDeminificationResult {
			self.callers.lock().unwrap().push(caller_symbol_name.map(str::to_string));

			let line = stack_frame.source_position.map(|p| p.line).unwrap_or_default();
			let method_name = (Some(line) != self.unnamed_line).then(|| format!("m{line}"));
			StackFrameDeminificationResult {
				deminification_error: DeminificationError::None,
				deminified_stack_frame: StackFrame::with_method_name(method_name),
				deminified_symbol_name: Some(format!("s{line}")),
			}
		}
	}

	const TRACE: &str = "Error: boom\n    at a (http://localhost/app.min.js:1:1)\n    at b (http://localhost/app.min.js:2:1)\n    at c (http://localhost/app.min.js:3:1)";

	fn recording(unnamed_line: Option<u32>) -> (StackTraceDeminifier, Arc<Mutex<Vec<Option<String>>>>) {
		let callers = Arc::new(Mutex::new(Vec::new()));
		let deminifier = RecordingDeminifier {
			callers: callers.clone(),
			unnamed_line,
		};
		(
			StackTraceDeminifier::new(Box::new(deminifier), Box::new(BrowserStackTraceParser::new())),
			callers,
		)
	}

	fn method_names(result: &DeminifyStackTraceResult) -> Vec<Option<&str>> {
		result
			.deminified_stack_frame_results
			.iter()
			.map(|r| r.deminified_stack_frame.method_name.as_deref())
			.collect()
	}

	#[test]
	fn test_caller_symbols_thread_from_outermost_frame() {
		let (deminifier, callers) = recording(None);

		let result = deminifier.deminify_stack_trace(TRACE, false);

		assert_eq!(
			*callers.lock().unwrap(),
			vec![None, Some("s2".to_string()), Some("s1".to_string())]
		);
		assert_eq!(result.message.as_deref(), Some("Error: boom"));
		assert_eq!(result.minified_stack_frames.len(), 3);
		assert_eq!(method_names(&result), vec![Some("m0"), Some("m1"), Some("m2")]);
	}

	#[test]
	fn test_prefer_symbols_shifts_names() {
		let (deminifier, _) = recording(None);

		let result = deminifier.deminify_stack_trace(TRACE, true);

		assert_eq!(method_names(&result), vec![Some("m1 => m0"), Some("m2"), None]);
	}

	#[test]
	fn test_prefer_symbols_without_caller_name() {
		let (deminifier, _) = recording(Some(1));

		let result = deminifier.deminify_stack_trace(TRACE, true);

		assert_eq!(method_names(&result), vec![Some("=> m0"), Some("m2"), None]);
	}

	#[test]
	fn test_prefer_symbols_without_own_name() {
		let (deminifier, _) = recording(Some(0));

		let result = deminifier.deminify_stack_trace(TRACE, true);

		assert_eq!(method_names(&result), vec![Some("m1"), Some("m2"), None]);
	}

	#[test]
	fn test_prefer_symbols_single_frame_keeps_name() {
		let (deminifier, _) = recording(None);

		let result = deminifier.deminify_stack_trace("    at a (http://localhost/app.min.js:1:1)", true);

		assert_eq!(method_names(&result), vec![Some("m0")]);
	}

	#[test]
	fn test_prefer_symbols_two_frames() {
		let (deminifier, _) = recording(None);

		let result = deminifier.deminify_stack_trace(
			"    at a (http://localhost/app.min.js:1:1)\n    at b (http://localhost/app.min.js:2:1)",
			true,
		);

		assert_eq!(method_names(&result), vec![Some("m1 => m0"), None]);
	}

	#[test]
	fn test_configured_default_preference() {
		let (deminifier, _) = recording(None);
		let deminifier = deminifier.with_prefer_source_maps_symbols(true);

		let result = deminifier.deminify(TRACE);

		assert_eq!(method_names(&result), vec![Some("m1 => m0"), Some("m2"), None]);
	}

	#[test]
	fn test_empty_trace() {
		let (deminifier, callers) = recording(None);

		let result = deminifier.deminify_stack_trace("", true);

		assert!(result.deminified_stack_frame_results.is_empty());
		assert!(callers.lock().unwrap().is_empty());
		assert_eq!(result.to_string(), "");
	}

	#[test]
	fn test_display_merges_minified_frames() {
		let result = DeminifyStackTraceResult {
			message: Some("Error: boom".to_string()),
			minified_stack_frames: vec![
				StackFrame::new(
					Some("a".to_string()),
					Some("app.min.js".to_string()),
					Some(SourcePosition::new(0, 10)),
				),
				StackFrame::new(
					Some("b".to_string()),
					Some("app.min.js".to_string()),
					Some(SourcePosition::new(0, 20)),
				),
			],
			deminified_stack_frame_results: vec![
				StackFrameDeminificationResult::new(
					DeminificationError::None,
					StackFrame::new(
						Some("render".to_string()),
						Some("app.js".to_string()),
						Some(SourcePosition::new(4, 2)),
					),
				),
				StackFrameDeminificationResult::failed(DeminificationError::NoSourceMap),
			],
		};

		assert_eq!(
			result.to_string(),
			"Error: boom\n  at render in app.js:5:3\n  at b in app.min.js:1:21"
		);
	}

	const URL: &str = "http://localhost/app.min.js";
	const SOURCE: &str = "function a(){b();}function b(){c();}function c(){null.x;}";
	// names at columns 9, 27 and 45; the calls inside each body at 13, 31 and 49
	const SOURCE_MAP: &str = r#"{"version":3,"sources":["app.js"],"names":["render","paint","draw"],"mappings":"SAAAA,IACE,cACFC,IACE,cACFC,IACE"}"#;

	fn sources() -> Arc<InMemorySources> {
		let mut sources = InMemorySources::new();
		sources.add_source_code(URL, SOURCE);
		sources.add_source_map(URL, SOURCE_MAP);
		Arc::new(sources)
	}

	const BUNDLE_TRACE: &str = "TypeError: null has no properties\n    at c (http://localhost/app.min.js:1:50)\n    at b (http://localhost/app.min.js:1:32)\n    at a (http://localhost/app.min.js:1:14)";

	#[test]
	fn test_method_name_only_pipeline() {
		let sources = sources();
		let deminifier = StackTraceDeminifier::method_name_only(sources.clone(), sources);

		let result = deminifier.deminify_stack_trace(BUNDLE_TRACE, false);

		assert_eq!(method_names(&result), vec![Some("draw"), Some("paint"), Some("render")]);
		assert!(result
			.deminified_stack_frame_results
			.iter()
			.all(|r| r.deminified_stack_frame.source_position.is_none()));
	}

	#[test]
	fn test_method_name_only_frames_outside_functions() {
		let sources = sources();
		let deminifier = StackTraceDeminifier::method_name_only(sources.clone(), sources);
		let trace = "    at c (http://localhost/app.min.js:1:50)\n    at http://localhost/app.min.js:1:19\n    at http://localhost/app.min.js:1:1";

		let result = deminifier.deminify_stack_trace(trace, false);

		let errors: Vec<_> = result
			.deminified_stack_frame_results
			.iter()
			.map(|r| r.deminification_error)
			.collect();
		assert_eq!(
			errors,
			vec![
				DeminificationError::None,
				DeminificationError::NoWrappingFunctionFound,
				DeminificationError::NoWrappingFunctionFound,
			]
		);
		assert_eq!(method_names(&result), vec![Some("draw"), None, None]);
	}

	#[test]
	fn test_from_config_selects_pipeline() {
		let sources = sources();
		let config = DeminifierConfig {
			mode: DeminifierMode::Full,
			prefer_source_maps_symbols: false,
		};

		let result = StackTraceDeminifier::from_config(&config, sources.clone(), sources).deminify(BUNDLE_TRACE);

		assert_eq!(method_names(&result), vec![Some("draw"), Some("paint"), Some("render")]);
		assert!(result
			.deminified_stack_frame_results
			.iter()
			.all(|r| r.deminified_stack_frame.file_path.as_deref() == Some("app.js")));
	}
}
