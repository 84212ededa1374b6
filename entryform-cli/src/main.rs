use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Report, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use entryform::{
    EntryForm, FormOptions,
    countdown::parse_deadline,
    domain::{FormSchema, Variant, load_form_schema, meta_schema},
    io::{DocumentFormat, OutputDestination, OutputOptions, emit},
    store::{FileStore, StorageKeys, SubmissionLog, clear_draft},
    submit::LogNotifier,
};

const DEFAULT_STORE_DIR: &str = ".entryform";
const LOG_FILE_NAME: &str = "entryform.log";

#[derive(Debug, Parser)]
#[command(
    name = "entryform",
    version,
    about = "Fill in and submit show applications from the terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Built-in form to load when no --schema is given
    #[arg(long, value_enum, default_value_t = VariantArg::Long, global = true)]
    variant: VariantArg,

    /// Form schema document (JSON, or YAML/TOML when enabled)
    #[arg(short = 's', long = "schema", value_name = "PATH", global = true)]
    schema: Option<PathBuf>,

    /// Directory holding drafts and the submissions log
    #[arg(long = "store-dir", value_name = "DIR", default_value = DEFAULT_STORE_DIR, global = true)]
    store_dir: PathBuf,

    /// Application deadline (RFC 3339, local date-time or date)
    #[arg(long, value_name = "WHEN", global = true)]
    deadline: Option<String>,

    /// Mail recipient for submissions
    #[arg(long, value_name = "ADDRESS", global = true)]
    recipient: Option<String>,

    /// Mail subject for submissions
    #[arg(long, value_name = "TEXT", global = true)]
    subject: Option<String>,

    /// Milliseconds of inactivity before a draft is saved
    #[arg(long = "quiet-ms", value_name = "MS", global = true)]
    quiet_ms: Option<u64>,

    /// Log the mail hand-off instead of opening a mail client
    #[arg(long = "no-mail", global = true)]
    no_mail: bool,

    /// Log file (defaults to <store-dir>/entryform.log)
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "entryform=debug"
    #[arg(long = "log-level", value_name = "FILTER", default_value = "info", global = true)]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the form in the terminal (default)
    Fill,
    /// Print the submissions log
    Submissions(ExportArgs),
    /// Remove the saved draft
    Discard,
    /// Print the meta-schema every form schema document must satisfy
    MetaSchema(ExportArgs),
}

#[derive(Debug, clap::Args)]
struct ExportArgs {
    /// Output format (json, yaml, toml)
    #[arg(long, value_name = "FORMAT", value_parser = parse_format, default_value = "json")]
    format: DocumentFormat,

    /// Output destinations ("-" writes to stdout)
    #[arg(short = 'o', long = "out", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact output rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Short,
    Long,
}

impl From<VariantArg> for Variant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Short => Variant::Short,
            VariantArg::Long => Variant::Long,
        }
    }
}

fn parse_format(raw: &str) -> std::result::Result<DocumentFormat, String> {
    raw.parse()
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Command::Fill) {
        Command::Fill => fill(&cli),
        Command::Submissions(args) => export_submissions(&cli, args),
        Command::Discard => discard(&cli),
        Command::MetaSchema(args) => export(&meta_schema(), args),
    }
}

fn fill(cli: &Cli) -> Result<()> {
    let schema = resolve_schema(cli)?;
    let store = FileStore::open(&cli.store_dir)
        .wrap_err_with(|| format!("failed to open store {}", cli.store_dir.display()))?;
    init_logging(cli)?;

    let options = form_options(cli, &schema)?;
    info!(form = %schema.id, store = %cli.store_dir.display(), "starting form");
    let mut form = EntryForm::new(schema)
        .with_options(options)
        .with_store(Box::new(store));
    if cli.no_mail {
        form = form.with_notifier(Box::new(LogNotifier::new()));
    }

    let submitted = form.run().map_err(Report::msg)?;
    match submitted.len() {
        0 => {}
        1 => println!("1 application submitted."),
        n => println!("{n} applications submitted."),
    }
    Ok(())
}

fn export_submissions(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let schema = resolve_schema(cli)?;
    let store = FileStore::open(&cli.store_dir)
        .wrap_err_with(|| format!("failed to open store {}", cli.store_dir.display()))?;
    let keys = StorageKeys::for_namespace(&schema.id);
    let records = SubmissionLog::new(keys.submissions)
        .read_all(&store)
        .wrap_err("failed to read the submissions log")?;
    let value = serde_json::to_value(&records).wrap_err("failed to encode submissions")?;
    export(&value, args)
}

fn discard(cli: &Cli) -> Result<()> {
    let schema = resolve_schema(cli)?;
    let mut store = FileStore::open(&cli.store_dir)
        .wrap_err_with(|| format!("failed to open store {}", cli.store_dir.display()))?;
    let keys = StorageKeys::for_namespace(&schema.id);
    clear_draft(&mut store, &keys).wrap_err("failed to discard the draft")?;
    println!("Draft discarded.");
    Ok(())
}

fn export(value: &serde_json::Value, args: &ExportArgs) -> Result<()> {
    let destinations = if args.outputs.is_empty() {
        vec![OutputDestination::Stdout]
    } else {
        args.outputs
            .iter()
            .map(|raw| OutputDestination::parse(raw))
            .collect()
    };
    let options = OutputOptions::new(args.format)
        .with_pretty(!args.no_pretty)
        .with_destinations(destinations);
    emit(value, &options).map_err(Report::msg)
}

fn resolve_schema(cli: &Cli) -> Result<FormSchema> {
    match cli.schema.as_deref() {
        Some(path) => load_form_schema(path).map_err(Report::msg),
        None => Ok(Variant::from(cli.variant).schema()),
    }
}

fn form_options(cli: &Cli, schema: &FormSchema) -> Result<FormOptions> {
    let mut options = FormOptions::default().with_namespace(schema.id.clone());
    if let Some(raw) = cli.deadline.as_deref() {
        let deadline =
            parse_deadline(raw).wrap_err_with(|| format!("invalid --deadline '{raw}'"))?;
        options = options.with_deadline(deadline);
    }
    if let Some(recipient) = cli.recipient.as_ref() {
        options = options.with_recipient(recipient.clone());
    }
    if let Some(subject) = cli.subject.as_ref() {
        options = options.with_subject(subject.clone());
    }
    if let Some(ms) = cli.quiet_ms {
        options = options.with_quiet_period(Duration::from_millis(ms));
    }
    Ok(options)
}

/// The form owns the terminal, so logs go to a file.
fn init_logging(cli: &Cli) -> Result<()> {
    let path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| cli.store_dir.join(LOG_FILE_NAME));
    ensure_parent(&path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_new(&cli.log_level)
        .wrap_err_with(|| format!("invalid --log-level '{}'", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(Report::msg)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
