// TDB - TON Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Caller-owned memoization keyed on input identity.
//!
//! Derived views (line indexes, correlation graphs, condensed step lists) are
//! pure functions of inputs that are shared as `Arc`s. A [`Memo`] remembers the
//! last result together with the key it was computed for and recomputes only
//! when the key changes. Each view owns its memos, so there is no ambient
//! cache shared between views or tests.

use std::sync::Arc;

use tracing::trace;

/// Identity of a shared input: the address of its allocation.
///
/// Two ids are equal only while both inputs point to the same allocation.
/// The owner of a memo must keep the keyed inputs alive, otherwise a freed
/// address could be reused by an unrelated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(usize);

impl InputId {
    /// Identity of a shared input
    pub fn of<T: ?Sized>(input: &Arc<T>) -> Self {
        Self(Arc::as_ptr(input) as *const () as usize)
    }

    /// Identity of an optional shared input
    pub fn of_opt<T: ?Sized>(input: Option<&Arc<T>>) -> Option<Self> {
        input.map(Self::of)
    }
}

/// A single-entry memo with an explicit reset.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    /// Create an empty memo
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value computed for `key`, computing it first when the memo
    /// is empty or holds a value for another key.
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        let entry = match self.entry.take() {
            Some((cached, value)) if cached == key => (cached, value),
            _ => {
                trace!("memo miss, recomputing");
                (key, compute())
            }
        };
        &self.entry.insert(entry).1
    }

    /// Value computed for `key`, if that is what the memo currently holds
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entry.as_ref().filter(|(cached, _)| cached == key).map(|(_, value)| value)
    }

    /// Most recently computed value, whatever its key
    pub fn current(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, value)| value)
    }

    /// Whether a value has been computed since creation or the last reset
    pub fn is_initialized(&self) -> bool {
        self.entry.is_some()
    }

    /// Drop the memoized value
    pub fn reset(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_recomputes_only_on_key_change() {
        tdb_utils::logging::ensure_test_logging(None);

        let calls = Cell::new(0);
        let mut memo = Memo::new();
        let compute = |v: u32| {
            calls.set(calls.get() + 1);
            v * 2
        };

        assert_eq!(*memo.get_or_compute(1, || compute(1)), 2);
        assert_eq!(*memo.get_or_compute(1, || compute(1)), 2);
        assert_eq!(calls.get(), 1);

        assert_eq!(*memo.get_or_compute(5, || compute(5)), 10);
        assert_eq!(calls.get(), 2);
        assert_eq!(memo.get(&1), None);
        assert_eq!(memo.get(&5), Some(&10));
    }

    #[test]
    fn test_reset_lifecycle() {
        tdb_utils::logging::ensure_test_logging(None);

        let mut memo: Memo<u8, &str> = Memo::new();
        assert!(!memo.is_initialized());

        memo.get_or_compute(0, || "value");
        assert!(memo.is_initialized());
        assert_eq!(memo.current(), Some(&"value"));

        memo.reset();
        assert!(!memo.is_initialized());
        assert_eq!(memo.current(), None);
    }

    #[test]
    fn test_input_identity() {
        tdb_utils::logging::ensure_test_logging(None);

        let a = Arc::new(vec![1, 2, 3]);
        let b = Arc::new(vec![1, 2, 3]);

        assert_eq!(InputId::of(&a), InputId::of(&a.clone()));
        assert_ne!(InputId::of(&a), InputId::of(&b));
        assert_eq!(InputId::of_opt::<Vec<i32>>(None), None);
    }
}
