// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Function map generation from generated JavaScript.

use loom_sourcemap::SourceMap;
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap as CodeMap};
use swc_ecma_ast::EsVersion;
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax};
use tracing::{debug, instrument};

use super::finder::FunctionFinder;
use super::{BindingInformation, FunctionMapEntry};
use crate::error::{DeminifyError, Result};

/// Build the function map of a generated file.
///
/// Returns `None` when either input is missing or the source cannot be
/// parsed; the failure is logged.
pub fn generate_function_map(source_code: Option<&[u8]>, source_map: Option<&SourceMap>) -> Option<Vec<FunctionMapEntry>> {
	let (source_code, source_map) = (source_code?, source_map?);

	match function_map_for_source(source_code, source_map) {
		Ok(function_map) => Some(function_map),
		Err(e) => {
			debug!(error = %e, "Could not generate function map");
			None
		}
	}
}

/// Parse generated JavaScript and collect its named functions, sorted by
/// descending body start.
#[instrument(skip_all, fields(source_len = source_code.len()))]
pub fn function_map_for_source(source_code: &[u8], source_map: &SourceMap) -> Result<Vec<FunctionMapEntry>> {
	let source = std::str::from_utf8(source_code)?;

	let code_map: Lrc<CodeMap> = Default::default();
	let file = code_map.new_source_file(
		Lrc::new(FileName::Custom(source_map.file.clone().unwrap_or_default())),
		source.to_string(),
	);

	let syntax = Syntax::Es(EsSyntax {
		allow_return_outside_function: true,
		..Default::default()
	});
	let lexer = Lexer::new(syntax, EsVersion::EsNext, StringInput::from(&*file), None);
	let mut parser = Parser::new_from(lexer);

	let program = parser
		.parse_program()
		.map_err(|e| DeminifyError::JavaScriptParse(format!("{:?}", e.kind())))?;

	for e in parser.take_errors() {
		debug!(error = ?e.kind(), "Recovered from JavaScript syntax error");
	}

	let function_map = FunctionFinder::new(&code_map, source_map).find(&program);
	debug!(functions = function_map.len(), "Generated function map");

	Ok(function_map)
}

/// Resolve the original name of a function from its bindings.
///
/// Each binding is looked up in the source map; the original names found are
/// joined with `.`. A trailing name that merely repeats the qualified name
/// before it is dropped, as is a `prototype` segment when three or more
/// names were found.
pub fn deminified_method_name(source_map: &SourceMap, bindings: &[BindingInformation]) -> Option<String> {
	let mut names: Vec<&str> = bindings
		.iter()
		.filter_map(|binding| source_map.mapping_entry_for_generated_position(binding.source_position))
		.filter_map(|entry| entry.original_name.as_deref())
		.collect();

	let repeats_qualified_name = match names.as_slice() {
		[.., qualified, last] => {
			qualified.len() > last.len()
				&& qualified.ends_with(last)
				&& qualified[..qualified.len() - last.len()].ends_with('.')
		}
		_ => false,
	};
	if repeats_qualified_name {
		names.pop();
	}

	if names.len() > 2 && names[names.len() - 2] == "prototype" {
		names.remove(names.len() - 2);
	}

	if names.is_empty() {
		None
	} else {
		Some(names.join("."))
	}
}
