use std::{collections::BTreeMap, io::Write};

use debsearch::{Query, Record, Result, record::human_size};
use serde_json::json;

/// Print search results one per line, with a count footer.
pub fn write_human(out: &mut impl Write, results: &[&Record]) -> Result<()> {
    if results.is_empty() {
        writeln!(out, "No packages found.")?;
        return Ok(());
    }

    for record in results {
        writeln!(out, "{record}")?;
    }
    writeln!(out, "\n{} package(s)", results.len())?;
    Ok(())
}

/// Print search results as a single JSON document.
pub fn write_json(
    out: &mut impl Write,
    query: &Query,
    results: &[&Record],
) -> Result<()> {
    let document = json!({
        "query": query.to_string(),
        "result_count": results.len(),
        "results": results,
    });
    serde_json::to_writer(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}

/// Print a name → count index, sorted by name.
pub fn write_counts(
    out: &mut impl Write,
    counts: &BTreeMap<String, usize>,
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, counts)?;
        writeln!(out)?;
        return Ok(());
    }

    let width = counts.values().max().map_or(1, |n| n.to_string().len());
    for (name, count) in counts {
        writeln!(out, "{count:>width$}  {name}")?;
    }
    Ok(())
}

/// Print one package in full.
pub fn write_record(
    out: &mut impl Write,
    record: &Record,
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Package: {}", record.name)?;
    writeln!(out, "Version: {}", record.version)?;
    writeln!(out, "Section: {}", record.section)?;
    writeln!(out, "Installed-Size: {}", human_size(record.size))?;
    if let Some(size) = record.download_size {
        writeln!(out, "Download-Size: {size}")?;
    }
    if let Some(url) = &record.url {
        writeln!(out, "Homepage: {url}")?;
    }
    if !record.tags.is_empty() {
        writeln!(out, "Tags: {}", record.sorted_tags().join(", "))?;
    }
    writeln!(out, "Description: {}", record.short_desc)?;
    for line in record.long_desc.lines() {
        if line.is_empty() {
            writeln!(out, " .")?;
        } else {
            writeln!(out, " {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nano() -> Record {
        Record {
            name: "nano".to_string(),
            version: "7.2-1".to_string(),
            size: 2686,
            download_size: Some(689600),
            url: Some("https://www.nano-editor.org/".to_string()),
            section: "editors".to_string(),
            tags: ["role/program", "implemented-in/c"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            short_desc: "small, friendly text editor".to_string(),
            long_desc: "GNU nano is easy.\n\nIt is small.".to_string(),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn human_output_lists_records_and_count() {
        let record = nano();
        let text = render(|out| write_human(out, &[&record]));
        assert!(text.starts_with("nano v7.2-1 2.6 MB"));
        assert!(text.ends_with("\n1 package(s)\n"));
    }

    #[test]
    fn human_output_without_results() {
        let text = render(|out| write_human(out, &[]));
        assert_eq!(text, "No packages found.\n");
    }

    #[test]
    fn json_output_shape() {
        let record = nano();
        let mut query = Query::new();
        query.add_words(["small"]);
        let text = render(|out| write_json(out, &query, &[&record]));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["result_count"], 1);
        assert_eq!(value["query"], "sections|\"\" tags|\"\" words|\"small\"");
        assert_eq!(value["results"][0]["name"], "nano");
        assert_eq!(value["results"][0]["size"], 2686);
    }

    #[test]
    fn counts_are_right_aligned() {
        let counts = BTreeMap::from([
            ("admin".to_string(), 5),
            ("net".to_string(), 120),
        ]);
        let text = render(|out| write_counts(out, &counts, false));
        assert_eq!(text, "  5  admin\n120  net\n");

        let text = render(|out| write_counts(out, &counts, true));
        assert_eq!(text, "{\"admin\":5,\"net\":120}\n");
    }

    #[test]
    fn record_detail_restores_paragraph_dots() {
        let text = render(|out| write_record(out, &nano(), false));
        assert!(text.contains("Tags: implemented-in/c, role/program\n"));
        assert!(text.ends_with(
            "Description: small, friendly text editor\n \
             GNU nano is easy.\n .\n It is small.\n"
        ));
    }
}
