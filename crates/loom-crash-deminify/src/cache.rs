// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Concurrent memoizing cache.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

type ValueGetter<K, V> = Box<dyn Fn(&K) -> Option<V> + Send + Sync>;

/// Memoizes a value getter per key.
///
/// Available values are computed once and kept. An unavailable result is
/// cached too, but is retried (at most once per call) the next time the key
/// is requested, so a document that shows up later is picked up. The getter
/// always runs outside any shard lock; when two callers race on the same
/// key, the last writer wins.
pub struct KeyValueCache<K, V> {
	entries: DashMap<K, Option<Arc<V>>>,
	getter: ValueGetter<K, V>,
}

impl<K, V> KeyValueCache<K, V>
where
	K: Eq + Hash + Clone,
{
	pub fn new(getter: impl Fn(&K) -> Option<V> + Send + Sync + 'static) -> Self {
		Self {
			entries: DashMap::new(),
			getter: Box::new(getter),
		}
	}

	pub fn get_value(&self, key: &K) -> Option<Arc<V>> {
		// Clone out of the guard so the shard lock is released before the getter runs.
		let cached = self.entries.get(key).map(|entry| entry.value().clone());

		match cached {
			Some(Some(value)) => Some(value),
			Some(None) => {
				let value = (self.getter)(key).map(Arc::new);
				if value.is_some() {
					self.entries.insert(key.clone(), value.clone());
				}
				value
			}
			None => {
				let value = (self.getter)(key).map(Arc::new);
				self.entries.insert(key.clone(), value.clone());
				value
			}
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
