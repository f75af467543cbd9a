use std::{
    collections::{HashMap, hash_map::Entry},
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;

use crate::{
    error::{Error, IngestFailures, Result},
    model::Model,
    parser,
};

/// A `Packages` file and the `Translation-en` file describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub packages: PathBuf,
    /// `None` skips description ingestion for this pair.
    pub descriptions: Option<PathBuf>,
}

impl FilePair {
    /// An empty `descriptions` path means the pair has no descriptions.
    pub fn new(
        packages: impl Into<PathBuf>,
        descriptions: impl Into<PathBuf>,
    ) -> Self {
        let descriptions = descriptions.into();
        Self {
            packages: packages.into(),
            descriptions: (!descriptions.as_os_str().is_empty())
                .then_some(descriptions),
        }
    }

    pub fn packages_only(packages: impl Into<PathBuf>) -> Self {
        Self {
            packages: packages.into(),
            descriptions: None,
        }
    }
}

/// The outcome of [`ingest`]: everything that could be read, plus the
/// files that could not.
#[derive(Debug, Default)]
pub struct Ingested {
    pub model: Model,
    pub failures: IngestFailures,
}

impl Ingested {
    /// Split into the model and the joined per-file error, if any.
    pub fn into_parts(self) -> (Model, Option<Error>) {
        (self.model, self.failures.into_error())
    }
}

#[derive(Debug, Clone, Copy)]
enum Job<'a> {
    Packages(&'a Path),
    Descriptions(&'a Path),
}

enum Parsed {
    Packages(Model),
    Descriptions(HashMap<String, String>),
}

impl Job<'_> {
    fn run(self) -> Result<Parsed> {
        match self {
            Job::Packages(path) => {
                parser::parse_package_file(path).map(Parsed::Packages)
            }
            Job::Descriptions(path) => {
                parser::parse_description_file(path).map(Parsed::Descriptions)
            }
        }
    }
}

/// Parse every file pair in parallel and merge the results into one model.
///
/// Each packages file and each descriptions file is parsed independently;
/// merging happens on the calling thread once all parses have finished,
/// in pair order. When a package name appears in more than one pair, the
/// earliest pair's record and description win.
///
/// A file that cannot be read does not stop the others: its error is
/// recorded in [`Ingested::failures`]. Only an empty `pairs` slice fails
/// the whole call, with [`Error::NoInputFiles`].
pub fn ingest(pairs: &[FilePair]) -> Result<Ingested> {
    if pairs.is_empty() {
        return Err(Error::NoInputFiles);
    }
    let started = Instant::now();

    let jobs: Vec<Job<'_>> = pairs
        .iter()
        .flat_map(|pair| {
            std::iter::once(Job::Packages(&pair.packages))
                .chain(pair.descriptions.as_deref().map(Job::Descriptions))
        })
        .collect();

    // Results come back in job order regardless of completion order.
    let parsed: Vec<Result<Parsed>> =
        jobs.par_iter().map(|job| job.run()).collect();

    let mut ingested = Ingested::default();
    let mut descriptions: HashMap<String, String> = HashMap::new();

    for result in parsed {
        match result {
            Ok(Parsed::Packages(partial)) => {
                for name in ingested.model.merge(partial) {
                    tracing::debug!(
                        package = %name,
                        "Duplicate package ignored; keeping first occurrence"
                    );
                }
            }
            Ok(Parsed::Descriptions(partial)) => {
                merge_descriptions(&mut descriptions, partial);
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to read package list file");
                ingested.failures.push(error);
            }
        }
    }

    let described = ingested.model.apply_descriptions(descriptions);

    tracing::info!(
        files = jobs.len(),
        records = ingested.model.len(),
        described,
        sections = ingested.model.sections_and_counts.len(),
        tags = ingested.model.tags_and_counts.len(),
        failures = ingested.failures.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Ingested package lists"
    );

    Ok(ingested)
}

fn merge_descriptions(
    into: &mut HashMap<String, String>,
    from: HashMap<String, String>,
) {
    for (name, text) in from {
        match into.entry(name) {
            Entry::Occupied(entry) => tracing::debug!(
                package = %entry.key(),
                "Duplicate description ignored; keeping first occurrence"
            ),
            Entry::Vacant(entry) => {
                entry.insert(text);
            }
        }
    }
}
