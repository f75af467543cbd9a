//! debsearch - search the Debian package lists APT keeps on local disk.
//!
//! Package metadata is read from `Packages` files and their
//! `Translation-en` companions into an in-memory [`Model`], which a
//! [`Query`] filters by section, debtags tag and description word.
//!
//! # Quick start
//!
//! ```no_run
//! use debsearch::{Query, Sources, discover_file_pairs, ingest};
//!
//! let sources = Sources::resolve(None, None).unwrap();
//! let pairs = discover_file_pairs(&sources).unwrap();
//! let (model, error) = ingest(&pairs).unwrap().into_parts();
//! if let Some(error) = error {
//!     eprintln!("some package lists could not be read:\n{error}");
//! }
//!
//! let mut query = Query::new();
//! query.sections.insert("editors".to_string());
//! query.tags.insert("role/program".to_string());
//! query.add_words(["small"]);
//!
//! for record in query.select_from(&model) {
//!     println!("{record}");
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod query;
pub mod record;

pub use discovery::{Sources, discover_file_pairs};
pub use error::{Error, Result};
pub use ingest::{FilePair, Ingested, ingest};
pub use model::Model;
pub use parser::{parse_description_file, parse_package_file};
pub use query::Query;
pub use record::Record;
