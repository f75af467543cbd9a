use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::{
    error::{Error, Result},
    ingest::FilePair,
};

/// Where APT keeps its downloaded package lists.
pub const DEFAULT_LISTS_DIR: &str = "/var/lib/apt/lists";

/// Archive components whose package lists are searched.
pub const COMPONENTS: &[&str] =
    &["contrib", "main", "non-free", "non-free-firmware"];

/// Which package lists to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    lists_dir: PathBuf,
    architecture: String,
    with_descriptions: bool,
}

impl Sources {
    pub fn new(
        lists_dir: impl Into<PathBuf>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            lists_dir: lists_dir.into(),
            architecture: architecture.into(),
            with_descriptions: true,
        }
    }

    /// Resolve the lists directory and architecture.
    ///
    /// The directory comes from, in order of priority:
    /// 1. An explicit path (from --lists-dir)
    /// 2. The DEBSEARCH_LISTS_DIR environment variable
    /// 3. [`DEFAULT_LISTS_DIR`]
    ///
    /// The architecture comes from `explicit_arch`, then DEBSEARCH_ARCH,
    /// then [`default_architecture`].
    pub fn resolve(
        explicit_dir: Option<&Path>,
        explicit_arch: Option<&str>,
    ) -> Result<Self> {
        let lists_dir = if let Some(path) = explicit_dir {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("DEBSEARCH_LISTS_DIR") {
            PathBuf::from(val)
        } else {
            PathBuf::from(DEFAULT_LISTS_DIR)
        };

        if !lists_dir.is_dir() {
            return Err(Error::Config(format!(
                "package lists directory does not exist: {}",
                lists_dir.display()
            )));
        }

        let architecture = match explicit_arch {
            Some(arch) => arch.to_string(),
            None => std::env::var("DEBSEARCH_ARCH")
                .unwrap_or_else(|_| default_architecture()),
        };
        validate_architecture(&architecture)?;

        Ok(Self::new(lists_dir, architecture))
    }

    pub fn with_descriptions(mut self, with_descriptions: bool) -> Self {
        self.with_descriptions = with_descriptions;
        self
    }

    pub fn lists_dir(&self) -> &Path {
        &self.lists_dir
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn wants_descriptions(&self) -> bool {
        self.with_descriptions
    }

    fn package_globs(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for component in COMPONENTS {
            let pattern =
                format!("*{component}_binary-{}_Packages", self.architecture);
            let glob = Glob::new(&pattern).map_err(|e| {
                Error::Config(format!("invalid glob pattern: {e}"))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| Error::Config(format!("invalid glob pattern: {e}")))
    }
}

/// The Debian name of the architecture this binary was built for.
pub fn default_architecture() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "i386",
        "aarch64" => "arm64",
        "arm" => "armhf",
        "powerpc64" => "ppc64el",
        "loongarch64" => "loong64",
        other => other,
    }
    .to_string()
}

fn validate_architecture(architecture: &str) -> Result<()> {
    let valid = !architecture.is_empty()
        && architecture
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "invalid architecture name: {architecture:?}"
        )))
    }
}

/// The `Translation-en` file that sits beside a `Packages` file.
///
/// `..._main_binary-amd64_Packages` maps to `..._main_i18n_Translation-en`.
pub fn description_file_for(packages: &Path) -> Option<PathBuf> {
    let file_name = packages.file_name()?.to_str()?;
    let (prefix, _) = file_name.split_once("_binary")?;
    Some(packages.with_file_name(format!("{prefix}_i18n_Translation-en")))
}

/// Find the package lists for the configured architecture and pair each
/// with its descriptions file, when wanted and present.
///
/// Pairs are sorted by packages file name. An empty result is not an
/// error here; [`ingest`](crate::ingest) rejects it.
pub fn discover_file_pairs(sources: &Sources) -> Result<Vec<FilePair>> {
    let globs = sources.package_globs()?;
    let mut packages = Vec::new();

    for entry in std::fs::read_dir(&sources.lists_dir)? {
        let entry = entry?;
        let path = entry.path();
        if globs.is_match(entry.file_name()) && path.is_file() {
            packages.push(path);
        }
    }
    packages.sort();

    let pairs: Vec<FilePair> = packages
        .into_iter()
        .map(|path| {
            let descriptions = sources
                .with_descriptions
                .then(|| description_file_for(&path))
                .flatten()
                .filter(|desc| desc.is_file());
            FilePair {
                packages: path,
                descriptions,
            }
        })
        .collect();

    tracing::debug!(
        lists_dir = %sources.lists_dir.display(),
        architecture = %sources.architecture,
        pairs = pairs.len(),
        described = pairs.iter().filter(|p| p.descriptions.is_some()).count(),
        "Discovered package lists"
    );
    Ok(pairs)
}
