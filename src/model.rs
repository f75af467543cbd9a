use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use crate::record::Record;

/// All packages from one ingestion run plus their section and tag counts.
///
/// Also used as the partial result of parsing a single Packages file.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub records: HashMap<String, Record>,
    pub sections_and_counts: BTreeMap<String, usize>,
    pub tags_and_counts: BTreeMap<String, usize>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    /// Section names in ascending order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections_and_counts.keys().map(String::as_str)
    }

    /// Tag names in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags_and_counts.keys().map(String::as_str)
    }

    /// Fold a partial model into this one.
    ///
    /// Records already present win over incoming ones with the same name;
    /// section and tag counts are summed. Returns the names of incoming
    /// records that were dropped as duplicates.
    pub fn merge(&mut self, other: Model) -> Vec<String> {
        let mut duplicates = Vec::new();
        for (name, record) in other.records {
            match self.records.entry(name) {
                Entry::Occupied(entry) => duplicates.push(entry.key().clone()),
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
            }
        }
        add_counts(&mut self.sections_and_counts, other.sections_and_counts);
        add_counts(&mut self.tags_and_counts, other.tags_and_counts);
        duplicates
    }

    /// Set long descriptions from a name → text map.
    ///
    /// Names with no matching record are ignored. Returns how many records
    /// were updated.
    pub fn apply_descriptions(
        &mut self,
        descriptions: HashMap<String, String>,
    ) -> usize {
        let mut applied = 0;
        for (name, long_desc) in descriptions {
            if let Some(record) = self.records.get_mut(&name) {
                record.long_desc = long_desc;
                applied += 1;
            }
        }
        applied
    }

    /// Count a section occurrence.
    pub(crate) fn count_section(&mut self, section: &str) {
        *self
            .sections_and_counts
            .entry(section.to_string())
            .or_default() += 1;
    }

    /// Count a tag occurrence.
    pub(crate) fn count_tag(&mut self, tag: &str) {
        *self.tags_and_counts.entry(tag.to_string()).or_default() += 1;
    }
}

fn add_counts(
    into: &mut BTreeMap<String, usize>,
    from: BTreeMap<String, usize>,
) {
    for (key, count) in from {
        *into.entry(key).or_default() += count;
    }
}
