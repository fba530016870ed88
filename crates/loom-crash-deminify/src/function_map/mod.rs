// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Function maps: every function of a generated file with the bindings that
//! name it and the span of its body.

mod consumer;
mod finder;
mod generator;

pub use consumer::wrapping_function_for_position;
pub use generator::{deminified_method_name, function_map_for_source, generate_function_map};

use loom_sourcemap::SourcePosition;

/// An identifier or literal contributing to a function's name, at the
/// position it occupies in the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInformation {
	pub name: String,
	pub source_position: SourcePosition,
}

/// One function found in the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMapEntry {
	/// Outermost binding first, e.g. `foo`, `prototype`, `bar` for
	/// `foo.prototype.bar = function () {}`.
	pub bindings: Vec<BindingInformation>,
	/// Original name resolved through the source map, when any binding maps.
	pub deminified_method_name: Option<String>,
	/// Start of the function body (inclusive).
	pub start: SourcePosition,
	/// End of the function body (exclusive).
	pub end: SourcePosition,
}
