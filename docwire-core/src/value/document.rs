// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use indexmap::map::{IntoIter as EntriesIntoIter, Iter as EntriesIter};
use indexmap::IndexMap;

use super::{Pending, Value};
use crate::pool::Reusable;

/// A map node: string keys, unique, kept in insertion order.
///
/// Order is preserved so that re-encoding a decoded document reproduces the
/// same bytes, but it is not part of equality: two documents are equal when
/// they hold the same keys bound to equal values. Lookups are hashed, so
/// decoding a map of `n` entries costs `O(n)`.
#[derive(Clone, Debug, Default)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Document {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Binds `key` to `value`. An existing binding keeps its position and
    /// its old value is returned.
    #[inline(always)]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Entry at `index` in insertion order.
    #[inline(always)]
    pub(crate) fn entry(&self, index: usize) -> Option<(&str, &Value)> {
        self.entries.get_index(index).map(|(k, v)| (k.as_str(), v))
    }

    /// Moves every value out, leaving the document empty.
    pub(super) fn drain_values(&mut self) -> impl Iterator<Item = Value> + '_ {
        self.entries.drain(..).map(|(_, v)| v)
    }

    /// Queues the value pairs of two documents for comparison. Returns false
    /// as soon as their key sets differ.
    pub(super) fn pair_entries<'a>(
        &'a self,
        other: &'a Document,
        pending: &mut Pending<'a>,
    ) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for (k, v) in &self.entries {
            match other.entries.get(k) {
                Some(o) => pending.push((v, o)),
                None => return false,
            }
        }
        true
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Vec::new();
        self.pair_entries(other, &mut pending) && super::compare_pending(pending)
    }
}

impl Reusable for Document {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        doc.extend(iter);
        doc
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Document {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

pub struct Iter<'a> {
    inner: EntriesIter<'a, String, Value>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = EntriesIntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
