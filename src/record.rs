use std::{collections::HashSet, fmt};

use serde::{Serialize, Serializer};

/// One package's normalized attributes.
///
/// Built up field by field by the parser; only records passing
/// [`Record::is_valid`] reach a [`Model`](crate::Model).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub version: String,
    /// Installed size in kilobytes.
    pub size: u64,
    /// Download size as listed by the `Size` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub section: String,
    #[serde(serialize_with = "sorted")]
    pub tags: HashSet<String>,
    pub short_desc: String,
    /// Multi-paragraph description, paragraphs separated by empty lines.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub long_desc: String,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.version.is_empty()
            && self.size > 0
            && !self.section.is_empty()
            && !self.short_desc.is_empty()
    }

    /// The distinct lower-cased words of the name and both descriptions.
    ///
    /// A word is a run of letters, digits and underscores.
    pub fn words(&self) -> HashSet<String> {
        [&self.name, &self.short_desc, &self.long_desc]
            .into_iter()
            .flat_map(|text| text.split(|c: char| !is_word_char(c)))
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    pub fn sorted_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> =
            self.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} {} {:?}",
            self.name,
            self.version,
            human_size(self.size),
            self.short_desc
        )?;
        if let Some(url) = &self.url {
            write!(f, " {url}")?;
        }
        Ok(())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn sorted<S: Serializer>(
    tags: &HashSet<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut tags: Vec<&String> = tags.iter().collect();
    tags.sort_unstable();
    serializer.collect_seq(tags)
}

/// Render a size given in kilobytes, e.g. `512 KB` or `1.5 MB`.
pub fn human_size(kb: u64) -> String {
    const UNITS: [&str; 3] = ["MB", "GB", "TB"];

    if kb < 1024 {
        return format!("{kb} KB");
    }
    let mut size = kb as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
