use std::collections::HashMap;
use std::ops::Range;

use crate::error::{MeshError, Result};
use crate::model::SubmeshRange;

/// A named index range within an uploaded mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submesh {
    pub name: String,
    pub start_index: u32,
    pub count: u32,
}

impl Submesh {
    pub fn index_range(&self) -> Range<u32> {
        self.start_index..self.start_index + self.count
    }
}

/// Submesh ranges in draw order, with lookup by name.
///
/// Names need not be unique. Iteration yields every entry, duplicates
/// included; [`SubmeshRegistry::range_of`] returns the first entry with the
/// requested name.
#[derive(Debug, Clone, Default)]
pub struct SubmeshRegistry {
    entries: Vec<Submesh>,
    first_by_name: HashMap<String, usize>,
}

impl SubmeshRegistry {
    pub fn new(ranges: Vec<SubmeshRange>) -> Self {
        let entries: Vec<Submesh> = ranges
            .into_iter()
            .map(|range| Submesh {
                start_index: range.start_index(),
                count: range.index_count(),
                name: range.name,
            })
            .collect();

        let mut first_by_name = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            first_by_name.entry(entry.name.clone()).or_insert(position);
        }

        Self {
            entries,
            first_by_name,
        }
    }

    /// Names in draw order, duplicates included.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Submesh> {
        self.entries.iter()
    }

    /// `(start_index, count)` of the first submesh named `name`.
    pub fn range_of(&self, name: &str) -> Result<(u32, u32)> {
        self.first_by_name
            .get(name)
            .map(|&position| {
                let entry = &self.entries[position];
                (entry.start_index, entry.count)
            })
            .ok_or_else(|| MeshError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first_by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest index buffer length every entry fits in.
    pub fn required_index_count(&self) -> u32 {
        self.entries
            .iter()
            .map(|entry| entry.start_index + entry.count)
            .max()
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a SubmeshRegistry {
    type Item = &'a Submesh;
    type IntoIter = std::slice::Iter<'a, Submesh>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
