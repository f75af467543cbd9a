use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use debsearch::Query;

#[derive(Debug, Parser)]
#[command(
    name = "debsearch",
    version,
    about = "Search the Debian package lists APT keeps on local disk"
)]
pub struct Cli {
    /// Directory holding the APT package lists
    #[arg(long, global = true)]
    pub lists_dir: Option<PathBuf>,

    /// Debian architecture to read lists for (e.g. amd64, arm64)
    #[arg(long, global = true)]
    pub arch: Option<String>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find packages by section, tag and description words
    Search(SearchArgs),
    /// List sections with their package counts
    Sections(ListArgs),
    /// List debtags tags with their package counts
    Tags(ListArgs),
    /// Show everything known about one package
    Show(ShowArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Words to look for in package names and descriptions
    pub words: Vec<String>,

    /// Restrict to these sections (repeatable or comma-separated)
    #[arg(short = 's', long = "section", value_delimiter = ',')]
    pub sections: Vec<String>,

    /// Restrict to packages with these tags (repeatable or comma-separated)
    #[arg(short = 't', long = "tag", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Require every tag instead of any
    #[arg(long)]
    pub all_tags: bool,

    /// Require every word instead of any
    #[arg(long)]
    pub all_words: bool,

    /// Skip reading long descriptions (faster, matches fewer words)
    #[arg(long)]
    pub no_descriptions: bool,

    /// Maximum number of results to print
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Build the query these arguments describe. Tags may be written in
    /// either `facet::value` or `facet/value` form.
    pub fn query(&self) -> Query {
        let mut query = Query::new();
        query.sections = self
            .sections
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        query.tags = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.replace("::", "/"))
            .collect();
        query.tags_and = self.all_tags;
        query.add_words(&self.words);
        query.words_and = self.all_words;
        query
    }
}

// -- Sections / Tags --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Show --

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Package name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "debsearch",
            &mut std::io::stdout(),
        );
    }
}
