//! CLI entry point for `mboxspam`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mboxspam::config::Config;
use mboxspam::model::record::ParsedMailbox;
use mboxspam::parser::mbox::MailboxParser;
use mboxspam::report::{self, prompt, text};
use mboxspam::store::SpamStore;

#[derive(Parser)]
#[command(
    name = "mboxspam",
    version,
    about = "Load sender, weekday and spam-confidence fields from an MBOX file into SQLite and report on them"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SQLite database file (overrides the configured store path)
    #[arg(long, global = true, value_name = "PATH", env = "MBOXSPAM_DB")]
    db: Option<PathBuf>,

    /// Fail on a message missing its sender, weekday or confidence
    #[arg(long, global = true)]
    strict: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, load, list domains, then report on one domain (the default)
    Run {
        /// MBOX file to parse
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Delete existing rows before loading
        #[arg(long)]
        clear: bool,
        /// Report on this domain instead of prompting for one
        #[arg(long)]
        domain: Option<String>,
    },
    /// Parse an MBOX file and load it into the store
    Load {
        /// MBOX file to parse
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        /// Delete existing rows before loading
        #[arg(long)]
        clear: bool,
    },
    /// List every stored domain
    Domains,
    /// Show emails from a domain received on the chosen weekdays
    Query {
        domain: String,
        /// Comma-separated weekdays (default: Fri,Sat)
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show row counts for every table
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

/// Configuration after command-line overrides.
struct Settings {
    config: Config,
    store_path: PathBuf,
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = mboxspam::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let settings = Settings {
        store_path: cli
            .db
            .clone()
            .unwrap_or_else(|| config.paths.store_path.clone()),
        strict: cli.strict || config.parse.strict,
        config,
    };

    match cli.command {
        None => cmd_run(&settings, None, false, None),
        Some(Commands::Run {
            input,
            clear,
            domain,
        }) => cmd_run(&settings, input, clear, domain),
        Some(Commands::Load { path, clear }) => cmd_load(&settings, path, clear),
        Some(Commands::Domains) => cmd_domains(&settings),
        Some(Commands::Query { domain, days, json }) => cmd_query(&settings, &domain, &days, json),
        Some(Commands::Stats { json }) => cmd_stats(&settings, json),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mboxspam::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mboxspam.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Parse a mailbox with a progress bar on stderr.
fn parse_mailbox(path: &Path, strict: bool) -> anyhow::Result<ParsedMailbox> {
    let parser = MailboxParser::new(path)?.strict(strict);

    let pb = ProgressBar::new(parser.file_size());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Parsing [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let parsed = parser.parse(Some(&|current, total| {
        pb.set_length(total);
        pb.set_position(current);
    }));
    pb.finish_and_clear();
    let parsed = parsed?;

    if parsed.incomplete > 0 {
        eprintln!(
            "  Skipped {} message(s) missing a sender, weekday or confidence",
            parsed.incomplete
        );
    }
    Ok(parsed)
}

/// Open the store, clearing it first when asked to.
fn open_store(settings: &Settings, clear: bool) -> anyhow::Result<SpamStore> {
    let mut store = SpamStore::open(&settings.store_path)?;
    if clear || settings.config.paths.clear_on_start {
        store.clear()?;
    }
    Ok(store)
}

/// Full pipeline: parse, load, list domains, then report on one domain.
fn cmd_run(
    settings: &Settings,
    input: Option<PathBuf>,
    clear: bool,
    domain: Option<String>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| settings.config.paths.input_path.clone());
    let parsed = parse_mailbox(&input, settings.strict)?;

    let mut store = open_store(settings, clear)?;
    store.load(&parsed)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    text::write_domains(&mut out, &store.domains()?)?;

    let domain = match domain {
        Some(d) => d,
        None => prompt::prompt_domain(&mut std::io::stdin().lock(), &mut out)?,
    };

    let weekdays = report::parse_weekdays(&settings.config.report.weekdays)?;
    let rows = store.emails_from_domain(&domain, &weekdays)?;
    text::write_filtered(&mut out, &domain, &weekdays, &rows)?;
    out.flush()?;
    Ok(())
}

/// Parse and load only.
fn cmd_load(settings: &Settings, path: Option<PathBuf>, clear: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| settings.config.paths.input_path.clone());
    let parsed = parse_mailbox(&path, settings.strict)?;

    let mut store = open_store(settings, clear)?;
    let stats = store.load(&parsed)?;

    println!();
    println!("  {:<25} {}", "Input file", path.display());
    println!("  {:<25} {}", "Store", settings.store_path.display());
    println!("  {:<25} {}", "Records loaded", stats.records);
    println!("  {:<25} {}", "Incomplete skipped", parsed.incomplete);
    println!("  {:<25} {}", "New emails", stats.new_emails);
    println!("  {:<25} {}", "New domains", stats.new_domains);
    println!("  {:<25} {}", "New weekdays", stats.new_weekdays);
    println!();
    Ok(())
}

fn cmd_domains(settings: &Settings) -> anyhow::Result<()> {
    let store = SpamStore::open(&settings.store_path)?;
    text::write_domains(&mut std::io::stdout().lock(), &store.domains()?)?;
    Ok(())
}

/// Filtered report without the interactive prompt.
fn cmd_query(settings: &Settings, domain: &str, days: &[String], json: bool) -> anyhow::Result<()> {
    let weekdays = if days.is_empty() {
        report::parse_weekdays(&settings.config.report.weekdays)?
    } else {
        report::parse_weekdays(days)?
    };

    let store = SpamStore::open(&settings.store_path)?;
    let rows = store.emails_from_domain(domain, &weekdays)?;

    if json {
        let doc = report::json::filtered_json(domain, &weekdays, &rows);
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        text::write_filtered(&mut std::io::stdout().lock(), domain, &weekdays, &rows)?;
    }
    Ok(())
}

/// Print row counts and database size.
fn cmd_stats(settings: &Settings, json: bool) -> anyhow::Result<()> {
    use humansize::{format_size, BINARY};

    let store = SpamStore::open(&settings.store_path)?;
    let stats = store.stats()?;
    let file_size = std::fs::metadata(&settings.store_path)
        .map(|m| m.len())
        .unwrap_or(0);

    if json {
        let doc = report::json::stats_json(
            &settings.store_path.to_string_lossy(),
            file_size,
            &stats,
        );
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!();
    println!("  {:<20} {}", "Store", settings.store_path.display());
    println!("  {:<20} {}", "File size", format_size(file_size, BINARY));
    println!("  {:<20} {}", "Emails", stats.emails);
    println!("  {:<20} {}", "Domains", stats.domains);
    println!("  {:<20} {}", "Weekdays", stats.weekdays);
    println!("  {:<20} {}", "Records", stats.records);
    println!();
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mboxspam", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
