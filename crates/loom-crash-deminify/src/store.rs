// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Memoized per-URL source maps and function maps.

use std::sync::Arc;

use loom_sourcemap::SourceMap;
use tracing::warn;

use crate::cache::KeyValueCache;
use crate::function_map::{generate_function_map, FunctionMapEntry};
use crate::provider::{SourceCodeProvider, SourceMapProvider};

/// Parse the source map document for `url`, logging documents that fail to parse.
pub(crate) fn parse_source_map(provider: &dyn SourceMapProvider, url: &str) -> Option<SourceMap> {
	let contents = provider.source_map_contents(url)?;

	match SourceMap::from_bytes(&contents) {
		Ok(source_map) => Some(source_map),
		Err(e) => {
			warn!(url, error = %e, "Failed to parse source map");
			None
		}
	}
}

/// Parsed source maps, keyed by the generated file's URL.
pub struct SourceMapStore {
	cache: KeyValueCache<String, SourceMap>,
}

impl SourceMapStore {
	pub fn new(provider: Arc<dyn SourceMapProvider>) -> Self {
		Self {
			cache: KeyValueCache::new(move |url: &String| parse_source_map(provider.as_ref(), url)),
		}
	}

	pub fn source_map_for_url(&self, url: Option<&str>) -> Option<Arc<SourceMap>> {
		self.cache.get_value(&url?.to_string())
	}
}

/// Function maps of generated files, keyed by URL.
pub struct FunctionMapStore {
	cache: KeyValueCache<String, Vec<FunctionMapEntry>>,
}

impl FunctionMapStore {
	/// Build a store that reads source code from `source_code` and obtains
	/// each file's source map through `source_map`.
	pub fn new(
		source_code: Arc<dyn SourceCodeProvider>,
		source_map: impl Fn(&str) -> Option<Arc<SourceMap>> + Send + Sync + 'static,
	) -> Self {
		Self {
			cache: KeyValueCache::new(move |url: &String| {
				let code = source_code.source_code(url);
				let map = source_map(url.as_str());
				generate_function_map(code.as_deref(), map.as_deref())
			}),
		}
	}

	/// Share parsed source maps with a [`SourceMapStore`].
	pub fn with_source_map_store(source_code: Arc<dyn SourceCodeProvider>, store: Arc<SourceMapStore>) -> Self {
		Self::new(source_code, move |url| store.source_map_for_url(Some(url)))
	}

	/// Parse source maps on demand without keeping them around.
	pub fn with_uncached_source_maps(
		source_code: Arc<dyn SourceCodeProvider>,
		provider: Arc<dyn SourceMapProvider>,
	) -> Self {
		Self::new(source_code, move |url| parse_source_map(provider.as_ref(), url).map(Arc::new))
	}

	pub fn function_map_for_url(&self, url: Option<&str>) -> Option<Arc<Vec<FunctionMapEntry>>> {
		self.cache.get_value(&url?.to_string())
	}
}
