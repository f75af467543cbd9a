use std::{collections::HashSet, fmt};

use crate::{model::Model, record::Record};

/// Section, tag and word constraints for selecting records.
///
/// An empty set places no constraint. Sections are always alternatives;
/// tags and words match any member unless their `_and` flag asks for all.
///
/// # Examples
///
/// ```
/// use debsearch::{Model, Query, Record};
///
/// let mut model = Model::new();
/// model.records.insert(
///     "nano".to_string(),
///     Record {
///         name: "nano".to_string(),
///         short_desc: "small, friendly text editor".to_string(),
///         ..Record::default()
///     },
/// );
///
/// let mut query = Query::new();
/// query.add_words(["Small"]);
/// let names: Vec<&str> = query
///     .select_from(&model)
///     .into_iter()
///     .map(|r| r.name.as_str())
///     .collect();
/// assert_eq!(names, ["nano"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub sections: HashSet<String>,
    pub tags: HashSet<String>,
    /// Require every tag rather than any.
    pub tags_and: bool,
    /// Lower-cased words.
    pub words: HashSet<String>,
    /// Require every word rather than any.
    pub words_and: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the query matches every record.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
            && self.tags.is_empty()
            && self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.sections.clear();
        self.tags.clear();
        self.tags_and = false;
        self.words.clear();
        self.words_and = false;
    }

    /// Add words, lower-casing them so they compare against
    /// [`Record::words`].
    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
    }

    pub fn matches(&self, record: &Record) -> bool {
        if !self.sections.is_empty() && !self.sections.contains(&record.section)
        {
            return false;
        }
        if !self.tags.is_empty()
            && !set_matches(&self.tags, &record.tags, self.tags_and)
        {
            return false;
        }
        if !self.words.is_empty()
            && !set_matches(&self.words, &record.words(), self.words_and)
        {
            return false;
        }
        true
    }

    /// Matching records ordered by case-insensitive name.
    pub fn select_from<'m>(&self, model: &'m Model) -> Vec<&'m Record> {
        let mut selected: Vec<&Record> = model
            .records
            .values()
            .filter(|record| self.matches(record))
            .collect();
        selected.sort_by_cached_key(|record| {
            (record.name.to_lowercase(), record.name.clone())
        });
        selected
    }
}

/// Any overlap is required; with `all`, every wanted item must be present.
fn set_matches(
    wanted: &HashSet<String>,
    present: &HashSet<String>,
    all: bool,
) -> bool {
    if all {
        wanted.is_subset(present)
    } else {
        !wanted.is_disjoint(present)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = |and: bool| if and { '&' } else { '|' };
        write!(
            f,
            "sections|{:?} tags{}{:?} words{}{:?}",
            joined(&self.sections, ","),
            op(self.tags_and),
            joined(&self.tags, ","),
            op(self.words_and),
            joined(&self.words, " "),
        )
    }
}

fn joined(items: &HashSet<String>, sep: &str) -> String {
    let mut items: Vec<&str> = items.iter().map(String::as_str).collect();
    items.sort_unstable();
    items.join(sep)
}
