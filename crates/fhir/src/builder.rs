//! Staging state shared by every builder.
//!
//! Builders are mutable, single-owner values. A builder accumulates field values and is
//! consumed by `build()`, which freezes the staged state into an immutable record and then runs
//! the [`Validator`] when the builder's [`ModelConfig`] asks for it.

use crate::base::Record;
use crate::config::ModelConfig;
use crate::validation::{ValidationErrors, Validator};
use std::sync::OnceLock;

/// Staged values of a repeated field.
///
/// Entries are held as `Option<T>` so a missing entry is accepted when it is added and reported
/// by the validator together with its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repeated<T> {
    items: Vec<Option<T>>,
}

impl<T> Default for Repeated<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Repeated<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the entries of an already-built list.
    pub fn seed(values: Vec<T>) -> Self {
        Self {
            items: values.into_iter().map(Some).collect(),
        }
    }

    /// Add entries after the ones already staged.
    pub fn append<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<T>>,
    {
        self.items.extend(values.into_iter().map(Into::into));
    }

    /// Discard every staged entry and stage a fresh copy of `values`.
    pub fn replace<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<T>>,
    {
        self.items.clear();
        self.append(values);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stage a frozen list again, putting its missing entries back at their positions.
    pub(crate) fn restore(values: Vec<T>, field: &str, missing: &MissingEntries) -> Self {
        let mut items: Vec<Option<T>> = values.into_iter().map(Some).collect();
        for index in missing.indices(field) {
            items.insert(index.min(items.len()), None);
        }
        Self { items }
    }

    /// Freeze into the record's list, recording the position of every missing entry under
    /// `field`.
    pub(crate) fn freeze(self, field: &'static str, missing: &mut MissingEntries) -> Vec<T> {
        let mut values = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.into_iter().enumerate() {
            match item {
                Some(value) => values.push(value),
                None => missing.record(field, index),
            }
        }
        values
    }
}

/// Positions of missing entries dropped when a record's lists were frozen.
///
/// A record built without validation keeps these so a later validation pass can report them as
/// structural errors. They take part in equality and hashing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MissingEntries {
    entries: Vec<(&'static str, usize)>,
}

impl MissingEntries {
    pub(crate) fn record(&mut self, field: &'static str, index: usize) {
        self.entries.push((field, index));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Staged positions of the missing entries of `field`, ascending.
    pub fn indices<'a>(&'a self, field: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.entries
            .iter()
            .filter(move |(name, _)| *name == field)
            .map(|(_, index)| *index)
    }
}

/// Lazily computed hash of an immutable record.
///
/// The value is computed at most once per instance; clones carry the cached value with them.
#[derive(Clone, Debug, Default)]
pub struct HashCache(OnceLock<u64>);

impl HashCache {
    pub fn get_or_compute(&self, compute: impl FnOnce() -> u64) -> u64 {
        *self.0.get_or_init(compute)
    }

    pub fn is_computed(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Final step of every `build()`.
///
/// The validator only runs when `config.validating()` is set; missing list entries are reported
/// by that pass alongside every other error.
pub(crate) fn finish<R: Record>(record: R, config: ModelConfig) -> Result<R, ValidationErrors> {
    if !config.validating() {
        return Ok(record);
    }

    let mut validator = Validator::new(config);
    record.validate_fields(&mut validator);
    let errors = validator.into_errors();

    if errors.is_empty() {
        return Ok(record);
    }

    let type_name = R::DESCRIPTOR.type_name;
    tracing::debug!(
        record_type = type_name,
        errors = errors.len(),
        "record build rejected"
    );
    Err(ValidationErrors::new(type_name, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(items: &[Option<&'static str>]) -> Repeated<&'static str> {
        let mut list = Repeated::new();
        list.append(items.iter().copied());
        list
    }

    #[test]
    fn append_adds_after_existing_entries() {
        let mut list = staged(&[Some("a"), Some("b")]);
        list.append(["c"]);

        let mut missing = MissingEntries::default();
        assert_eq!(list.freeze("x", &mut missing), vec!["a", "b", "c"]);
        assert!(missing.is_empty());
    }

    #[test]
    fn replace_discards_existing_entries() {
        let mut list = staged(&[Some("a"), Some("b")]);
        list.replace(vec!["c"]);
        assert_eq!(list.len(), 1);

        let mut missing = MissingEntries::default();
        assert_eq!(list.freeze("x", &mut missing), vec!["c"]);
    }

    #[test]
    fn missing_entries_are_recorded_with_their_index() {
        let list = staged(&[Some("a"), None, Some("c"), None]);

        let mut missing = MissingEntries::default();
        let values = list.freeze("subject", &mut missing);
        assert_eq!(values, vec!["a", "c"]);
        assert_eq!(missing.indices("subject").collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(missing.indices("identifier").count(), 0);
    }

    #[test]
    fn restore_puts_missing_entries_back_in_place() {
        let list = staged(&[None, Some("a"), None, Some("c"), None]);
        let mut missing = MissingEntries::default();
        let values = list.clone().freeze("subject", &mut missing);

        assert_eq!(Repeated::restore(values, "subject", &missing), list);
    }

    #[test]
    fn empty_list_freezes_to_empty_vec() {
        let list: Repeated<u32> = Repeated::new();
        assert!(list.is_empty());
        let mut missing = MissingEntries::default();
        assert!(list.freeze("x", &mut missing).is_empty());
        assert!(missing.is_empty());
    }

    #[test]
    fn hash_cache_computes_once() {
        let cache = HashCache::default();
        assert!(!cache.is_computed());

        let mut calls = 0;
        let first = cache.get_or_compute(|| {
            calls += 1;
            42
        });
        let second = cache.get_or_compute(|| {
            calls += 1;
            7
        });

        assert_eq!((first, second, calls), (42, 42, 1));
        assert!(cache.is_computed());
        assert!(cache.clone().is_computed());
    }
}
