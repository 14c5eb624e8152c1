use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dirtrack",
    about = "Inspect and edit change-tracked documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON file holding the documents (overrides the config file)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create and save a new post
    New(NewArgs),
    /// Show a stored post
    Show(ShowArgs),
    /// List stored post keys
    List,
    /// Append tags to a post and save it
    Tag(TagArgs),
    /// Remove tags from a post and save it
    Untag(TagArgs),
    /// Change a post's status (refused while the post is locked)
    Status(StatusArgs),
    /// Lock or unlock a post
    Lock(LockArgs),
    /// Save a post without changing it
    Touch(TouchArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct NewArgs {
    pub key: String,
    #[arg(short, long)]
    pub title: String,
    #[arg(long = "tag")]
    pub tags: Vec<i64>,
    /// Only mark the given fields as supplied
    #[arg(long)]
    pub only: Vec<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub key: String,
}

#[derive(Args)]
pub struct TagArgs {
    pub key: String,
    #[arg(required = true)]
    pub tags: Vec<i64>,
}

#[derive(Args)]
pub struct StatusArgs {
    pub key: String,
    pub status: String,
}

#[derive(Args)]
pub struct LockArgs {
    pub key: String,
    #[arg(long)]
    pub off: bool,
}

#[derive(Args)]
pub struct TouchArgs {
    pub key: String,
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_new() {
        let cli = Cli::try_parse_from(["dirtrack", "new", "p1", "--title", "Hi", "--tag", "1", "--tag", "2"])
            .unwrap();
        if let Command::New(args) = cli.command {
            assert_eq!(args.key, "p1");
            assert_eq!(args.title, "Hi");
            assert_eq!(args.tags, vec![1, 2]);
            assert!(args.only.is_empty());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_tag_requires_values() {
        assert!(Cli::try_parse_from(["dirtrack", "tag", "p1"]).is_err());
        let cli = Cli::try_parse_from(["dirtrack", "tag", "p1", "2"]).unwrap();
        if let Command::Tag(args) = cli.command {
            assert_eq!(args.tags, vec![2]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_touch_force() {
        let cli = Cli::try_parse_from(["dirtrack", "touch", "p1", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::Touch(TouchArgs { force: true, .. })));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "dirtrack", "list", "--store", "db.json", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.store, Some(PathBuf::from("db.json")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn global_flags_have_help_text() {
        use clap::CommandFactory;

        let command = Cli::command();
        for id in ["config", "store", "verbose"] {
            let help = command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_help())
                .map(|help| help.to_string());
            assert!(help.is_some_and(|text| !text.is_empty()), "{id} has no help");
        }
    }

    #[test]
    fn parse_lock_off() {
        let cli = Cli::try_parse_from(["dirtrack", "lock", "p1", "--off"]).unwrap();
        if let Command::Lock(args) = cli.command {
            assert!(args.off);
        } else {
            panic!("wrong command");
        }
    }
}
