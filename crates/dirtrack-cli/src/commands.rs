use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;
use dirtrack_store::{Collection, DocumentStore, InMemoryDocumentStore};
use dirtrack_tracker::{Assignment, SaveOutcome, Tracked};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;
use crate::post::Post;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store = store;
    }
    let session = Session::open(&config)?;
    let format = cli.format;

    match cli.command {
        Command::New(args) => cmd_new(&session, format, args)?,
        Command::Show(args) => cmd_show(&session, format, args)?,
        Command::List => cmd_list(&session, format)?,
        Command::Tag(args) => cmd_tag(&session, format, args)?,
        Command::Untag(args) => cmd_untag(&session, format, args)?,
        Command::Status(args) => cmd_status(&session, format, args)?,
        Command::Lock(args) => cmd_lock(&session, format, args)?,
        Command::Touch(args) => cmd_touch(&session, format, args)?,
        Command::Config => cmd_config(&config)?,
    }

    session.flush()
}

/// Documents of one run: read from the JSON file, written back if changed.
struct Session {
    path: PathBuf,
    posts: Collection<InMemoryDocumentStore>,
    seeded_writes: u64,
}

impl Session {
    fn open(config: &CliConfig) -> anyhow::Result<Self> {
        let store = InMemoryDocumentStore::new();
        if config.store.exists() {
            let text = std::fs::read_to_string(&config.store)
                .with_context(|| format!("reading store {}", config.store.display()))?;
            let documents: BTreeMap<String, Value> = serde_json::from_str(&text)
                .with_context(|| format!("parsing store {}", config.store.display()))?;
            for (key, document) in documents {
                store.put(&key, document)?;
            }
        }
        let seeded_writes = store.write_count();
        debug!(path = %config.store.display(), documents = seeded_writes, "store opened");
        Ok(Self {
            path: config.store.clone(),
            posts: Collection::new(store, config.prefix.clone()).with_config(config.tracker.clone()),
            seeded_writes,
        })
    }

    fn load(&self, key: &str) -> anyhow::Result<Tracked<Post>> {
        self.posts
            .load(key)
            .with_context(|| format!("loading post {key}"))
    }

    fn flush(&self) -> anyhow::Result<()> {
        let store = self.posts.store();
        if store.write_count() == self.seeded_writes {
            return Ok(());
        }
        let mut documents = BTreeMap::new();
        for key in store.keys("")? {
            if let Some(document) = store.get(&key)? {
                documents.insert(key, document);
            }
        }
        let text = serde_json::to_string_pretty(&documents)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing store {}", self.path.display()))?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}

/// What a command did to one post.
#[derive(Serialize)]
struct Report<'a> {
    key: &'a str,
    changed: Vec<&'static str>,
    saved: bool,
    post: &'a Post,
}

/// Save `post` and print what happened.
fn save_and_report(post: &mut Tracked<Post>, format: OutputFormat, force: bool) -> anyhow::Result<()> {
    let changed: Vec<&'static str> = post.dirty_fields().into_iter().collect();
    if let Ok(changes) = post.changes() {
        for change in &changes.changes {
            debug!(?change, "pending change");
        }
    }
    let outcome = post.save(force)?;
    let report = Report {
        key: &post.key,
        changed,
        saved: outcome.is_saved(),
        post: post.model(),
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, &outcome),
    }
    Ok(())
}

fn print_report(report: &Report<'_>, outcome: &SaveOutcome) {
    let changed = if report.changed.is_empty() {
        "nothing".dimmed().to_string()
    } else {
        report.changed.join(", ").yellow().to_string()
    };
    match outcome {
        SaveOutcome::Saved(()) => println!("{} Saved {} (changed: {changed})", "✓".green().bold(), report.key.bold()),
        SaveOutcome::Skipped => println!("{} {} is clean, nothing to save", "·".dimmed(), report.key.bold()),
    }
}

fn print_post(post: &Post) {
    println!("{} {}", post.key.bold(), post.title);
    let lock = if post.locked { " (locked)".red().to_string() } else { String::new() };
    println!("  Status: {}{lock}", post.status.cyan());
    let tags: Vec<String> = post.tags.iter().map(i64::to_string).collect();
    println!("  Tags: [{}]", tags.join(", "));
}

fn cmd_new(session: &Session, format: OutputFormat, args: NewArgs) -> anyhow::Result<()> {
    if session.posts.get_raw(&args.key)?.is_some() {
        bail!("post {} already exists", args.key);
    }
    let mut builder = Tracked::builder(Post::new(args.key, args.title, args.tags));
    if !args.only.is_empty() {
        builder = builder.supplied(args.only);
    }
    let mut post = session.posts.track_with(builder)?;
    save_and_report(&mut post, format, false)
}

fn cmd_show(session: &Session, format: OutputFormat, args: ShowArgs) -> anyhow::Result<()> {
    let post = session.load(&args.key)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(post.model())?),
        OutputFormat::Text => print_post(&post),
    }
    Ok(())
}

fn cmd_list(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let keys = session.posts.keys()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&keys)?),
        OutputFormat::Text if keys.is_empty() => println!("No posts."),
        OutputFormat::Text => {
            for key in keys {
                println!("  {key}");
            }
        }
    }
    Ok(())
}

fn cmd_tag(session: &Session, format: OutputFormat, args: TagArgs) -> anyhow::Result<()> {
    let mut post = session.load(&args.key)?;
    post.container(&Post::TAGS).extend(args.tags);
    save_and_report(&mut post, format, false)
}

fn cmd_untag(session: &Session, format: OutputFormat, args: TagArgs) -> anyhow::Result<()> {
    let mut post = session.load(&args.key)?;
    post.container(&Post::TAGS).retain(|tag| !args.tags.contains(tag));
    save_and_report(&mut post, format, false)
}

fn cmd_status(session: &Session, format: OutputFormat, args: StatusArgs) -> anyhow::Result<()> {
    let mut post = session.load(&args.key)?;
    if let Assignment::Vetoed(status) = post.set(&Post::STATUS, args.status)? {
        eprintln!("{} {} is locked; status not changed to {}", "✗".red().bold(), args.key.bold(), status.yellow());
    }
    save_and_report(&mut post, format, false)
}

fn cmd_lock(session: &Session, format: OutputFormat, args: LockArgs) -> anyhow::Result<()> {
    let mut post = session.load(&args.key)?;
    post.set(&Post::LOCKED, !args.off)?;
    save_and_report(&mut post, format, false)
}

fn cmd_touch(session: &Session, format: OutputFormat, args: TouchArgs) -> anyhow::Result<()> {
    let mut post = session.load(&args.key)?;
    save_and_report(&mut post, format, args.force)
}

fn cmd_config(config: &CliConfig) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
