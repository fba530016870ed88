// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lookups for generated source code and source map documents.

use std::collections::HashMap;

/// Supplies the generated (minified) JavaScript for a URL.
pub trait SourceCodeProvider: Send + Sync {
	fn source_code(&self, url: &str) -> Option<Vec<u8>>;
}

/// Supplies the raw source map document for a generated file's URL.
pub trait SourceMapProvider: Send + Sync {
	fn source_map_contents(&self, url: &str) -> Option<Vec<u8>>;
}

impl<F> SourceCodeProvider for F
where
	F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
	fn source_code(&self, url: &str) -> Option<Vec<u8>> {
		self(url)
	}
}

impl<F> SourceMapProvider for F
where
	F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
	fn source_map_contents(&self, url: &str) -> Option<Vec<u8>> {
		self(url)
	}
}

/// In-memory source code and source map lookup keyed by URL.
#[derive(Debug, Default, Clone)]
pub struct InMemorySources {
	source_code: HashMap<String, Vec<u8>>,
	source_maps: HashMap<String, Vec<u8>>,
}

impl InMemorySources {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source_code(&mut self, url: impl Into<String>, code: impl Into<Vec<u8>>) {
		self.source_code.insert(url.into(), code.into());
	}

	pub fn add_source_map(&mut self, url: impl Into<String>, source_map: impl Into<Vec<u8>>) {
		self.source_maps.insert(url.into(), source_map.into());
	}
}

impl SourceCodeProvider for InMemorySources {
	fn source_code(&self, url: &str) -> Option<Vec<u8>> {
		self.source_code.get(url).cloned()
	}
}

impl SourceMapProvider for InMemorySources {
	fn source_map_contents(&self, url: &str) -> Option<Vec<u8>> {
		self.source_maps.get(url).cloned()
	}
}
