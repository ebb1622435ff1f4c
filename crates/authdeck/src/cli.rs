use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "authdeck")]
#[command(author, version, about)]
#[command(long_about = "Step-through diagrams for OAuth 2.0, OpenID Connect and ID-JAG flows.\n\n\
    Present a built-in deck or your own YAML deck one step at a time.\n\n\
    Examples:\n  \
    authdeck                      Present the default built-in deck (fullscreen)\n  \
    authdeck --deck id-jag        Present the ID-JAG cross-app access deck\n  \
    authdeck flow.yaml --watch    Present a deck file and reload it on save\n  \
    authdeck export --deck oidc   Write one SVG per step")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// YAML deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Built-in deck to present when no file is given
    #[arg(long, global = false, conflicts_with = "file")]
    pub deck: Option<String>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Reload the deck file whenever it changes
    #[arg(long, global = false, requires = "file")]
    pub watch: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List built-in decks with their slides and steps
    List,

    /// Export every step of a deck as an SVG image
    Export {
        /// YAML deck file to export
        file: Option<PathBuf>,

        /// Built-in deck to export when no file is given
        #[arg(long, conflicts_with = "file")]
        deck: Option<String>,

        /// Output directory for SVG files
        #[arg(short, long, default_value = "export")]
        output_dir: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.deck, stage.bypass_padding)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Where a deck comes from: a file on disk or a built-in name.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckSource {
    File(PathBuf),
    Builtin(String),
}

impl DeckSource {
    /// Pick the source from the command line, falling back to the
    /// configured default and then the first built-in deck.
    pub fn resolve(file: Option<PathBuf>, deck: Option<String>, configured: Option<&str>) -> Self {
        match (file, deck) {
            (Some(path), _) => Self::File(path),
            (None, Some(name)) => Self::Builtin(name),
            (None, None) => Self::Builtin(
                configured
                    .unwrap_or(crate::deck::builtin::DEFAULT_DECK)
                    .to_string(),
            ),
        }
    }

    pub fn load(&self) -> anyhow::Result<crate::deck::Deck> {
        match self {
            Self::File(path) => {
                if !path.exists() {
                    anyhow::bail!("File not found: {}", path.display());
                }
                Ok(crate::deck::Deck::load(path)?)
            }
            Self::Builtin(name) => Ok(crate::deck::builtin::load(name)?),
        }
    }
}

impl Cli {
    /// Default log filter implied by `-q` and `-v`.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = crate::config::Config::load_or_default();
        match self.command {
            Some(Commands::List) => {
                crate::commands::list::run();
                Ok(())
            }
            Some(Commands::Export {
                file,
                deck,
                output_dir,
            }) => {
                let source = DeckSource::resolve(file, deck, config.deck());
                crate::commands::export::run(&source, &output_dir, &config, self.quiet)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                let source = DeckSource::resolve(self.file, self.deck, config.deck());
                let options = crate::app::LaunchOptions {
                    windowed: self.windowed,
                    start_slide: self
                        .slide
                        .map(|n| n.saturating_sub(1))
                        .or_else(|| config.start_slide()),
                    watch: self.watch,
                };
                crate::app::run(source, options, &config)
            }
        }
    }
}
