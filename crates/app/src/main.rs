use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::QuestionSetId;
use quiz_core::quiz::TransitionTiming;
use services::{AppServices, Clock, QuestionSetService};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidMillis { flag: &'static str, raw: String },
    InvalidSetId { raw: String },
    MissingSetId,
    MissingImportPath,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidMillis { flag, raw } => {
                write!(f, "invalid {flag} value: {raw} (expected milliseconds)")
            }
            ArgsError::InvalidSetId { raw } => write!(f, "invalid --set value: {raw}"),
            ArgsError::MissingSetId => write!(f, "export requires --set <id>"),
            ArgsError::MissingImportPath => write!(f, "import requires a file path"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_millis(flag: &'static str, raw: &str) -> Result<u64, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidMillis {
        flag,
        raw: raw.to_string(),
    })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui     [--db <sqlite_url>] [--dwell-ms <n>] [--fade-ms <n>]");
    eprintln!("  cargo run -p app -- seed   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- export --set <id> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- import <path> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --dwell-ms 1500 --fade-ms 300");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_DWELL_MS, QUIZ_FADE_MS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
    Export,
    Import,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            "export" => Some(Self::Export),
            "import" => Some(Self::Import),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    timing: TransitionTiming,
    set_id: Option<QuestionSetId>,
    import_path: Option<PathBuf>,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut dwell_ms = match std::env::var("QUIZ_DWELL_MS") {
            Ok(raw) => parse_millis("QUIZ_DWELL_MS", &raw)?,
            Err(_) => millis(TransitionTiming::DEFAULT_DWELL),
        };
        let mut fade_ms = match std::env::var("QUIZ_FADE_MS") {
            Ok(raw) => parse_millis("QUIZ_FADE_MS", &raw)?,
            Err(_) => millis(TransitionTiming::DEFAULT_FADE),
        };
        let mut set_id = None;
        let mut import_path = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--dwell-ms" => {
                    dwell_ms = parse_millis("--dwell-ms", &require_value(args, "--dwell-ms")?)?;
                }
                "--fade-ms" => {
                    fade_ms = parse_millis("--fade-ms", &require_value(args, "--fade-ms")?)?;
                }
                "--set" if cmd == Command::Export => {
                    let value = require_value(args, "--set")?;
                    let parsed: QuestionSetId = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSetId { raw: value.clone() })?;
                    set_id = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if cmd == Command::Import && import_path.is_none() && !other.starts_with("--") => {
                    import_path = Some(PathBuf::from(other));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        match cmd {
            Command::Export if set_id.is_none() => return Err(ArgsError::MissingSetId),
            Command::Import if import_path.is_none() => return Err(ArgsError::MissingImportPath),
            _ => {}
        }

        Ok(Self {
            db_url,
            timing: TransitionTiming::from_millis(dwell_ms, fade_ms),
            set_id,
            import_path,
        })
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(log_fmt::layer())
        .with(filter)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // The database file must exist before the pool opens it.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.timing).await?;

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(services);
            let context = build_app_context(&app);

            // Some dev setups default the window to always-on-top.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Classroom Quiz")
                    .with_always_on_top(false),
            );

            info!(db_url = %parsed.db_url, "launching desktop ui");
            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let sets = services.question_sets();
            match seed_sample_set(&sets).await? {
                Some(id) => println!("seeded question set {id}"),
                None => println!("question sets already exist; nothing seeded"),
            }
            Ok(())
        }
        Command::Export => {
            let id = parsed.set_id.ok_or(ArgsError::MissingSetId)?;
            let json = services.question_sets().export_set(id).await?;
            println!("{json}");
            Ok(())
        }
        Command::Import => {
            let path = parsed.import_path.ok_or(ArgsError::MissingImportPath)?;
            let json = std::fs::read_to_string(&path)?;
            let id = services.question_sets().import_set(&json).await?;
            println!("imported question set {id}");
            Ok(())
        }
    }
}

/// Create a starter set when the database has none.
async fn seed_sample_set(
    sets: &QuestionSetService,
) -> Result<Option<QuestionSetId>, Box<dyn std::error::Error>> {
    if !sets.list_sets(1).await?.is_empty() {
        return Ok(None);
    }

    let id = sets.create_set("Sample Quiz").await?;
    for text in ["5 + 3 =", "12 - 7 =", "6 x 4 =", "20 ÷ 5 =", "(2 + 3) * 4 ="] {
        if let Some(answer) = sets.suggest_answer(text) {
            sets.add_question(id, text, &answer).await?;
        }
    }
    sets.add_question(id, "Capital of France?", "Paris").await?;
    info!(set_id = id.value(), "sample question set seeded");
    Ok(Some(id))
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(%err, "quiz app failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
