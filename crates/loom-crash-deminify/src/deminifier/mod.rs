// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-frame deminification.

mod method_name;
mod source_map;

pub use method_name::MethodNameStackFrameDeminifier;
pub use source_map::SourceMapStackFrameDeminifier;

use crate::frame::{StackFrame, StackFrameDeminificationResult};

/// Deminifies a single stack frame.
pub trait StackFrameDeminifier: Send + Sync {
	/// `caller_symbol_name` is the original symbol name resolved for the
	/// frame that called into this one, if any.
	fn deminify_stack_frame(
		&self,
		stack_frame: &StackFrame,
		caller_symbol_name: Option<&str>,
		prefer_source_maps_symbols: bool,
	) -> StackFrameDeminificationResult;
}
