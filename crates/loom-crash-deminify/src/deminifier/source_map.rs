// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use loom_sourcemap::SourceMap;

use super::{MethodNameStackFrameDeminifier, StackFrameDeminifier};
use crate::frame::{DeminificationError, StackFrame, StackFrameDeminificationResult};
use crate::store::SourceMapStore;

/// Resolves original file, position and symbol of a frame through its
/// source map, and the method name through the function map when a
/// [`MethodNameStackFrameDeminifier`] is configured.
pub struct SourceMapStackFrameDeminifier {
	source_map_store: Arc<SourceMapStore>,
	method_name_deminifier: Option<MethodNameStackFrameDeminifier>,
}

impl SourceMapStackFrameDeminifier {
	pub fn new(
		source_map_store: Arc<SourceMapStore>,
		method_name_deminifier: Option<MethodNameStackFrameDeminifier>,
	) -> Self {
		Self {
			source_map_store,
			method_name_deminifier,
		}
	}

	/// Fill in the original position and symbol of a method-name result.
	fn resolve_original_position(
		result: StackFrameDeminificationResult,
		source_map: Option<&SourceMap>,
		stack_frame: &StackFrame,
		prefer_source_maps_symbols: bool,
	) -> StackFrameDeminificationResult {
		let Some(source_map) = source_map else {
			return StackFrameDeminificationResult {
				deminification_error: DeminificationError::NoSourceMap,
				..result
			};
		};

		let entry = stack_frame
			.source_position
			.and_then(|position| source_map.mapping_entry_for_generated_position(position));
		let Some(entry) = entry else {
			return StackFrameDeminificationResult {
				deminification_error: DeminificationError::NoMatchingMappingInSourceMap,
				..result
			};
		};

		let original_name = entry.original_name.as_deref().map(str::to_string);
		let method_name = if prefer_source_maps_symbols {
			original_name.clone()
		} else {
			result.deminified_stack_frame.method_name
		};

		StackFrameDeminificationResult {
			deminification_error: result.deminification_error,
			deminified_stack_frame: StackFrame {
				method_name,
				file_path: entry.original_file_name.as_deref().map(str::to_string),
				source_position: entry.original_position,
			},
			deminified_symbol_name: original_name,
		}
	}
}

impl StackFrameDeminifier for SourceMapStackFrameDeminifier {
	fn deminify_stack_frame(
		&self,
		stack_frame: &StackFrame,
		caller_symbol_name: Option<&str>,
		prefer_source_maps_symbols: bool,
	) -> StackFrameDeminificationResult {
		let source_map = self
			.source_map_store
			.source_map_for_url(stack_frame.file_path.as_deref());

		let method_name_result = self
			.method_name_deminifier
			.as_ref()
			.map(|deminifier| deminifier.deminify_stack_frame(stack_frame, caller_symbol_name, false))
			.filter(|result| result.deminification_error != DeminificationError::NoSourceCodeProvided);

		// Without a function map the caller's symbol is the best name available.
		let result = method_name_result.unwrap_or_else(|| {
			StackFrameDeminificationResult::new(
				DeminificationError::None,
				StackFrame::with_method_name(caller_symbol_name.map(str::to_string)),
			)
		});

		if !result.deminification_error.is_none() {
			return result;
		}

		Self::resolve_original_position(result, source_map.as_deref(), stack_frame, prefer_source_maps_symbols)
	}
}
