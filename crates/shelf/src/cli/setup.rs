use clap::{Parser, Subcommand};
use shelfapp::commands::export::ExportFormat;
use shelfapp::commands::import::ConflictResolution;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shelf",
    bin_name = "shelf",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Shopping categories, classification rules and suggestions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to shelf.toml in the OS config directory)
    #[arg(long, global = true, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Data directory (overrides the config)
    #[arg(long, global = true, help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage categories
    #[command(alias = "c", display_order = 1)]
    Category {
        #[command(subcommand)]
        action: CategoryCommands,
    },

    /// Manage classification rules
    #[command(alias = "r", display_order = 2)]
    Rule {
        #[command(subcommand)]
        action: RuleCommands,
    },

    /// Record a purchase
    #[command(alias = "p", display_order = 3)]
    Purchase {
        /// Product name
        name: String,

        /// Category id to file the product under
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Suggest a category for a product
    #[command(alias = "s", display_order = 4)]
    Suggest {
        /// Product name
        name: String,

        /// Print the full suggestion as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the purchase history
    #[command(display_order = 5)]
    History,

    /// Export categories as JSON or CSV
    #[command(display_order = 10)]
    Export {
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Include rules (JSON only)
        #[arg(long)]
        rules: bool,

        /// Leave out category metadata (JSON only)
        #[arg(long)]
        no_metadata: bool,

        /// Leave out archived categories
        #[arg(long)]
        active_only: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import categories from a JSON or CSV export
    #[command(display_order = 11)]
    Import {
        file: PathBuf,

        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// skip, overwrite or rename (defaults to the config)
        #[arg(long)]
        conflict: Option<ConflictResolution>,

        /// Import rules too (JSON only)
        #[arg(long)]
        rules: bool,

        /// Accept categories whose parent is missing
        #[arg(long)]
        no_validate: bool,
    },

    /// Multi-language category templates
    #[command(display_order = 12)]
    Template {
        #[command(subcommand)]
        action: TemplateCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    #[command(alias = "a")]
    Add {
        name: String,

        /// Parent category id
        #[arg(short, long)]
        parent: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Move a category under a new parent (omit --parent for root)
    #[command(alias = "mv")]
    Move {
        id: String,

        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Archive a category and everything below it
    Archive { id: String },

    /// Restore a single archived category
    Unarchive { id: String },

    /// Show one category
    Show { id: String },

    /// Print the category tree
    Tree {
        /// Include archived categories
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// Create a rule
    #[command(alias = "a")]
    Add {
        name: String,

        /// contains, equals, startsWith, endsWith or regex
        #[arg(short, long)]
        operator: String,

        #[arg(short, long)]
        value: String,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        priority: i64,

        /// Create the rule disabled
        #[arg(long)]
        inactive: bool,

        /// Assign the new rule to this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List rules in evaluation order
    #[command(alias = "ls")]
    List,

    /// Let a category use a rule
    Assign { rule_id: String, category_id: String },

    /// Stop a category from using a rule
    Unassign { rule_id: String, category_id: String },

    Enable { rule_id: String },

    Disable { rule_id: String },

    /// Test text against one rule, or find the matching category
    Test {
        text: String,

        #[arg(long)]
        rule: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Write a template for some or all categories
    Export {
        /// Category ids (repeatable; all when omitted)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Declared languages
        #[arg(long, value_delimiter = ',', default_value = "de,en")]
        languages: Vec<String>,

        /// Language of the exported names (defaults to the configured locale)
        #[arg(long)]
        default_language: Option<String>,

        #[arg(long)]
        no_metadata: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create categories from a template
    Import {
        file: PathBuf,

        /// Preferred language (defaults to the configured locale)
        #[arg(long)]
        language: Option<String>,

        /// Second choice language
        #[arg(long)]
        fallback: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_add() {
        let cli = Cli::try_parse_from([
            "shelf", "category", "add", "Käse", "--parent", "abc", "--tags", "bio,regional",
        ])
        .unwrap();
        match cli.command {
            Commands::Category {
                action: CategoryCommands::Add { name, parent, tags, .. },
            } => {
                assert_eq!(name, "Käse");
                assert_eq!(parent.as_deref(), Some("abc"));
                assert_eq!(tags, vec!["bio", "regional"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_import_options() {
        let cli = Cli::try_parse_from([
            "shelf",
            "import",
            "cats.csv",
            "--format",
            "csv",
            "--conflict",
            "rename",
        ])
        .unwrap();
        match cli.command {
            Commands::Import {
                format, conflict, ..
            } => {
                assert_eq!(format, ExportFormat::Csv);
                assert_eq!(conflict, Some(ConflictResolution::Rename));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_format_is_rejected() {
        assert!(Cli::try_parse_from(["shelf", "export", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["shelf", "rule", "list", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
