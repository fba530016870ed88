// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use super::StackFrameDeminifier;
use crate::frame::{DeminificationError, StackFrame, StackFrameDeminificationResult};
use crate::function_map::wrapping_function_for_position;
use crate::store::FunctionMapStore;

/// Recovers only the original method name of a frame, from the function
/// enclosing the frame's position in the generated code.
pub struct MethodNameStackFrameDeminifier {
	function_map_store: Arc<FunctionMapStore>,
}

impl MethodNameStackFrameDeminifier {
	pub fn new(function_map_store: Arc<FunctionMapStore>) -> Self {
		Self { function_map_store }
	}
}

impl StackFrameDeminifier for MethodNameStackFrameDeminifier {
	fn deminify_stack_frame(
		&self,
		stack_frame: &StackFrame,
		_caller_symbol_name: Option<&str>,
		_prefer_source_maps_symbols: bool,
	) -> StackFrameDeminificationResult {
		let Some(function_map) = self
			.function_map_store
			.function_map_for_url(stack_frame.file_path.as_deref())
		else {
			return StackFrameDeminificationResult::failed(DeminificationError::NoSourceCodeProvided);
		};

		let wrapping_function = stack_frame
			.source_position
			.and_then(|position| wrapping_function_for_position(position, &function_map));

		match wrapping_function {
			Some(function) => StackFrameDeminificationResult::new(
				DeminificationError::None,
				StackFrame::with_method_name(function.deminified_method_name.clone()),
			),
			None => StackFrameDeminificationResult::failed(DeminificationError::NoWrappingFunctionFound),
		}
	}
}
