//! Line-oriented parsers for APT `Packages` and `Translation-en` files.
//!
//! Both formats are sequences of stanzas separated by blank lines. Each
//! stanza holds `Key: value` lines; lines starting with whitespace continue
//! the previous field.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    mem,
    path::Path,
};

use crate::{
    error::{Error, Result},
    model::Model,
    record::Record,
};

const PACKAGE_PREFIX: &str = "Package:";

/// Which field a continuation line belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Continuation {
    #[default]
    None,
    Tags,
    Description,
}

/// Parse one `Packages` file into a partial model.
pub fn parse_package_file(path: &Path) -> Result<Model> {
    let file = File::open(path).map_err(|e| Error::open_failure(path, e))?;
    let model = read_packages(BufReader::new(file))
        .map_err(|e| Error::open_failure(path, e))?;
    tracing::debug!(
        path = %path.display(),
        records = model.len(),
        sections = model.sections_and_counts.len(),
        tags = model.tags_and_counts.len(),
        "Parsed packages file"
    );
    Ok(model)
}

/// Parse one `Translation-en` file into a package name → long description
/// map.
pub fn parse_description_file(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path).map_err(|e| Error::open_failure(path, e))?;
    let descriptions = read_descriptions(BufReader::new(file))
        .map_err(|e| Error::open_failure(path, e))?;
    tracing::debug!(
        path = %path.display(),
        descriptions = descriptions.len(),
        "Parsed description file"
    );
    Ok(descriptions)
}

/// Parse `Packages` stanzas from any buffered reader.
pub fn read_packages(reader: impl BufRead) -> std::io::Result<Model> {
    let mut parser = PackagesParser::default();
    for_each_line(reader, |line| parser.line(line))?;
    Ok(parser.finish())
}

/// Parse `Translation-en` stanzas from any buffered reader.
pub fn read_descriptions(
    reader: impl BufRead,
) -> std::io::Result<HashMap<String, String>> {
    let mut descriptions = HashMap::new();
    let mut name = String::new();
    let mut long_desc = String::new();

    for_each_line(reader, |line| {
        if let Some(rest) = line.strip_prefix(PACKAGE_PREFIX) {
            commit_description(&mut descriptions, &name, &mut long_desc);
            name = rest.trim().to_string();
        } else if is_continuation(line) {
            push_description_line(&mut long_desc, line);
        }
    })?;
    commit_description(&mut descriptions, &name, &mut long_desc);

    Ok(descriptions)
}

/// Feed each line to `f` without its `\n` or `\r\n` ending.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the
/// whole file; only real I/O errors are returned.
fn for_each_line(
    mut reader: impl BufRead,
    mut f: impl FnMut(&str),
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let mut bytes = buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest;
        }
        if let Some(rest) = bytes.strip_suffix(b"\r") {
            bytes = rest;
        }
        f(&String::from_utf8_lossy(bytes));
    }
}

#[derive(Debug, Default)]
struct PackagesParser {
    model: Model,
    record: Record,
    continuation: Continuation,
}

impl PackagesParser {
    fn line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.continuation = Continuation::None;
        } else if let Some(rest) = line.strip_prefix(PACKAGE_PREFIX) {
            self.continuation = Continuation::None;
            self.finalize();
            self.record.name = rest.trim().to_string();
        } else if is_continuation(line) {
            match self.continuation {
                Continuation::Tags => add_tags(&mut self.record, line),
                Continuation::Description => {
                    push_description_line(&mut self.record.long_desc, line)
                }
                Continuation::None => {}
            }
        } else {
            self.continuation = self.key_value(line);
        }
    }

    /// Apply a `Key: value` line, returning what a following continuation
    /// line would belong to.
    fn key_value(&mut self, line: &str) -> Continuation {
        let Some((key, value)) = line.split_once(':') else {
            return Continuation::None;
        };
        let value = value.trim();
        if value.is_empty() {
            return Continuation::None;
        }

        let record = &mut self.record;
        match key.trim() {
            "Description" => {
                record.short_desc = value.to_string();
                return Continuation::Description;
            }
            "Tag" => {
                add_tags(record, value);
                return Continuation::Tags;
            }
            "Homepage" => record.url = Some(value.to_string()),
            "Installed-Size" => record.size = value.parse().unwrap_or(0),
            "Size" => record.download_size = value.parse().ok(),
            "Section" => record.section = value.to_string(),
            "Version" => record.version = value.to_string(),
            _ => {}
        }
        Continuation::None
    }

    /// Move the in-progress record into the model if it is valid and its
    /// name is new, and start afresh either way. The first stanza for a
    /// name wins.
    fn finalize(&mut self) {
        let mut record = mem::take(&mut self.record);
        if !record.is_valid() {
            return;
        }
        if self.model.records.contains_key(&record.name) {
            tracing::debug!(
                package = %record.name,
                "Duplicate stanza ignored; keeping first occurrence"
            );
            return;
        }
        trim_end_in_place(&mut record.long_desc);
        self.model.count_section(&record.section);
        for tag in &record.tags {
            self.model.count_tag(tag);
        }
        self.model.records.insert(record.name.clone(), record);
    }

    fn finish(mut self) -> Model {
        self.finalize();
        self.model
    }
}

fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Add the comma-separated tags in `text`, normalizing `facet::value` to
/// `facet/value`.
fn add_tags(record: &mut Record, text: &str) {
    for item in text.split(',') {
        let item = item.trim();
        if !item.is_empty() {
            record.tags.insert(item.replace("::", "/"));
        }
    }
}

/// Append one continuation line to a long description. A lone `.` is a
/// paragraph break.
fn push_description_line(long_desc: &mut String, line: &str) {
    // Only the single leading space is syntax; deeper indentation is
    // verbatim text.
    let mut chars = line.chars();
    chars.next();
    let text = chars.as_str().trim_end();
    let text = if text == "." { "" } else { text };

    if !long_desc.is_empty() {
        long_desc.push('\n');
    }
    long_desc.push_str(text);
}

fn commit_description(
    descriptions: &mut HashMap<String, String>,
    name: &str,
    long_desc: &mut String,
) {
    let mut text = mem::take(long_desc);
    trim_end_in_place(&mut text);
    if !name.is_empty() && !text.is_empty() {
        descriptions.insert(name.to_string(), text);
    }
}

fn trim_end_in_place(text: &mut String) {
    let len = text.trim_end().len();
    text.truncate(len);
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;

    const PACKAGES: &str = "\
Package: vim
Version: 2:9.0.1378-2
Installed-Size: 3741
Maintainer: Debian Vim Maintainers <team+vim@tracker.debian.org>
Homepage: https://www.vim.org/
Description: Vi IMproved - enhanced vi editor
 Vim is an almost compatible version of the UNIX editor Vi.
 .
 Many new features have been added.
Tag: devel::editor, implemented-in::c, interface::commandline,
 role::program, use::editing
Section: editors
Size: 1567404

Package: nano
Version: 7.2-1
Installed-Size: 2686
Tag: implemented-in::c, role::program, use::editing
Section: editors
Description: small, friendly text editor inspired by Pico
Size: 689600

Package: broken
Version: 1.0
Section: misc
Description: has no installed size
";

    fn parse(text: &str) -> Model {
        read_packages(text.as_bytes()).unwrap()
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_valid_stanzas() {
        let model = parse(PACKAGES);
        assert_eq!(model.len(), 2);

        let vim = model.get("vim").unwrap();
        assert_eq!(vim.version, "2:9.0.1378-2");
        assert_eq!(vim.size, 3741);
        assert_eq!(vim.download_size, Some(1567404));
        assert_eq!(vim.url.as_deref(), Some("https://www.vim.org/"));
        assert_eq!(vim.section, "editors");
        assert_eq!(vim.short_desc, "Vi IMproved - enhanced vi editor");
        assert_eq!(
            vim.long_desc,
            "Vim is an almost compatible version of the UNIX editor Vi.\n\
             \n\
             Many new features have been added."
        );
    }

    #[test]
    fn invalid_stanzas_are_dropped_silently() {
        let model = parse(PACKAGES);
        assert!(model.get("broken").is_none());
        assert!(!model.sections_and_counts.contains_key("misc"));
    }

    #[test]
    fn tags_are_normalized_across_continuations() {
        let model = parse(PACKAGES);
        assert_eq!(
            model.get("vim").unwrap().tags,
            set(&[
                "devel/editor",
                "implemented-in/c",
                "interface/commandline",
                "role/program",
                "use/editing",
            ])
        );
    }

    #[test]
    fn tag_line_normalization() {
        let model = parse(
            "Package: p\nVersion: 1\nInstalled-Size: 1\nSection: perl\n\
             Description: d\nTag: implemented-in::perl, role::program\n",
        );
        assert_eq!(
            model.get("p").unwrap().tags,
            set(&["implemented-in/perl", "role/program"])
        );
    }

    #[test]
    fn counts_follow_valid_records() {
        let model = parse(PACKAGES);
        assert_eq!(
            model.sections_and_counts,
            BTreeMap::from([("editors".to_string(), 2)])
        );
        assert_eq!(model.tags_and_counts["role/program"], 2);
        assert_eq!(model.tags_and_counts["devel/editor"], 1);
    }

    #[test]
    fn bad_installed_size_makes_record_invalid() {
        let model = parse(
            "Package: p\nVersion: 1\nInstalled-Size: lots\nSection: s\n\
             Description: d\n",
        );
        assert!(model.is_empty());
    }

    #[test]
    fn size_is_download_size_only() {
        let model = parse(
            "Package: p\nVersion: 1\nSize: 99\nSection: s\nDescription: d\n",
        );
        assert!(model.is_empty());
    }

    #[test]
    fn unknown_keys_and_empty_values_are_ignored() {
        let model = parse(
            "Package: p\nVersion: 1\nInstalled-Size: 5\nSection: s\n\
             Description: d\nHomepage:\nX-Custom: whatever\nno colon here\n",
        );
        let p = model.get("p").unwrap();
        assert!(p.url.is_none());
        assert_eq!(p.short_desc, "d");
    }

    #[test]
    fn continuation_after_other_key_is_ignored() {
        let model = parse(
            "Package: p\nVersion: 1\nInstalled-Size: 5\nSection: s\n\
             Description: d\nDepends: libc6,\n libfoo\n",
        );
        let p = model.get("p").unwrap();
        assert!(p.long_desc.is_empty());
        assert!(p.tags.is_empty());
    }

    #[test]
    fn blank_line_ends_continuation() {
        let model = parse(
            "Package: p\nVersion: 1\nInstalled-Size: 5\nSection: s\n\
             Description: d\n\n stray line\n",
        );
        assert!(model.get("p").unwrap().long_desc.is_empty());
    }

    #[test]
    fn crlf_line_endings() {
        let model = parse(
            "Package: p\r\nVersion: 1\r\nInstalled-Size: 5\r\nSection: s\r\n\
             Description: d\r\n more\r\n",
        );
        let p = model.get("p").unwrap();
        assert_eq!(p.name, "p");
        assert_eq!(p.long_desc, "more");
    }

    #[test]
    fn last_stanza_without_trailing_newline() {
        let model = parse(
            "Package: p\nVersion: 1\nInstalled-Size: 5\nSection: s\n\
             Description: d",
        );
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
    }

    const TRANSLATION: &str = "\
Package: vim
Description-md5: 59e8b8f7757db8b53566d5d119872de8
Description-en: Vi IMproved - enhanced vi editor
 Vim is an almost compatible version of the UNIX editor Vi.
 .
 Many new features have been added.

Package: empty
Description-md5: 0123
Description-en: nothing more

Package: nano
Description-md5: 4567
Description-en: small, friendly text editor inspired by Pico
 GNU nano is an easy-to-use text editor.
";

    #[test]
    fn parses_descriptions() {
        let descriptions = read_descriptions(TRANSLATION.as_bytes()).unwrap();
        assert_eq!(descriptions.len(), 2);
        assert_eq!(
            descriptions["vim"],
            "Vim is an almost compatible version of the UNIX editor Vi.\n\
             \n\
             Many new features have been added."
        );
        assert_eq!(
            descriptions["nano"],
            "GNU nano is an easy-to-use text editor."
        );
        assert!(!descriptions.contains_key("empty"));
    }

    #[test]
    fn description_lines_before_any_package_are_dropped() {
        let descriptions =
            read_descriptions(" orphan text\nPackage: a\n body\n".as_bytes())
                .unwrap();
        assert_eq!(descriptions.len(), 1);
        assert_eq!(descriptions["a"], "body");
    }

    #[test]
    fn invalid_utf8_does_not_lose_the_file() {
        let bytes: &[u8] = b"Package: a\n\
            Version: 1\n\
            Installed-Size: 1\n\
            Maintainer: Ren\xe9 X\n\
            Section: s\n\
            Description: first\n\
            \n\
            Package: b\n\
            Version: 1\n\
            Installed-Size: 1\n\
            Section: s\n\
            Description: second \xff\n";
        let model = read_packages(bytes).unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model.records["a"].short_desc, "first");
        assert_eq!(model.records["b"].short_desc, "second \u{fffd}");

        let descriptions =
            read_descriptions(&b"Package: a\n caf\xe9\n"[..]).unwrap();
        assert_eq!(descriptions["a"], "caf\u{fffd}");
    }

    #[test]
    fn duplicate_name_in_one_file_keeps_first() {
        let model = parse(
            "Package: a\nVersion: 1\nInstalled-Size: 1\nSection: s\n\
             Tag: role::program\nDescription: first\n\n\
             Package: a\nVersion: 2\nInstalled-Size: 2\nSection: s\n\
             Tag: role::program, use::editing\nDescription: second\n",
        );
        assert_eq!(model.len(), 1);
        assert_eq!(model.records["a"].version, "1");
        assert_eq!(model.records["a"].short_desc, "first");
        assert_eq!(model.sections_and_counts["s"], 1);
        assert_eq!(model.tags_and_counts["role/program"], 1);
        assert!(!model.tags_and_counts.contains_key("use/editing"));
    }

    #[test]
    fn missing_packages_file_is_open_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing_Packages");
        match parse_package_file(&path) {
            Err(Error::OpenFailure { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected OpenFailure, got {other:?}"),
        }
    }

    #[test]
    fn missing_description_file_is_open_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing_Translation-en");
        assert!(matches!(
            parse_description_file(&path),
            Err(Error::OpenFailure { .. })
        ));
    }

    #[test]
    fn parses_files_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let packages = tmp.path().join("Packages");
        let translation = tmp.path().join("Translation-en");
        std::fs::write(&packages, PACKAGES).unwrap();
        std::fs::write(&translation, TRANSLATION).unwrap();

        assert_eq!(parse_package_file(&packages).unwrap().len(), 2);
        assert_eq!(parse_description_file(&translation).unwrap().len(), 2);
    }
}
