// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deminifier configuration: TOML files and environment variables.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DeminifyError, Result};

const ENV_MODE: &str = "LOOM_DEMINIFY_MODE";
const ENV_PREFER_SOURCE_MAPS_SYMBOLS: &str = "LOOM_DEMINIFY_PREFER_SOURCE_MAPS_SYMBOLS";

/// Which deminification pipeline to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeminifierMode {
	/// Function map names plus source map positions.
	#[default]
	Full,
	/// Source map positions only; names come from the caller's symbol.
	MapOnly,
	/// Function map names only, without retaining source maps.
	MethodNameOnly,
}

impl fmt::Display for DeminifierMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Full => write!(f, "full"),
			Self::MapOnly => write!(f, "map-only"),
			Self::MethodNameOnly => write!(f, "method-name-only"),
		}
	}
}

impl FromStr for DeminifierMode {
	type Err = DeminifyError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"full" => Ok(Self::Full),
			"map-only" => Ok(Self::MapOnly),
			"method-name-only" => Ok(Self::MethodNameOnly),
			_ => Err(DeminifyError::InvalidConfigValue {
				key: "mode",
				value: s.to_string(),
			}),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeminifierConfig {
	pub mode: DeminifierMode,
	/// Name frames with the exact source map symbols instead of the
	/// enclosing function's name.
	pub prefer_source_maps_symbols: bool,
}

impl DeminifierConfig {
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Load configuration from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading deminifier config");
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Override fields from `LOOM_DEMINIFY_MODE` and
	/// `LOOM_DEMINIFY_PREFER_SOURCE_MAPS_SYMBOLS`.
	pub fn apply_env_overrides(self) -> Result<Self> {
		self.apply_overrides_from(|name| std::env::var(name).ok())
	}

	/// Like [`Self::apply_env_overrides`], reading variables through `lookup`.
	pub fn apply_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

		if let Some(mode) = var(ENV_MODE) {
			self.mode = mode.trim().parse()?;
			debug!(mode = %self.mode, "deminifier mode overridden from environment");
		}

		if let Some(prefer) = var(ENV_PREFER_SOURCE_MAPS_SYMBOLS) {
			let prefer = prefer.trim();
			self.prefer_source_maps_symbols = prefer.eq_ignore_ascii_case("true") || prefer == "1";
		}

		Ok(self)
	}
}
