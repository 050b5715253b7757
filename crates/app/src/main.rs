use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use progress_core::gateway::GatewayConfig;
use progress_core::page::PageContext;
use services::{AppServices, DeploymentMode, PhaseNavigator, ProgressStore};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};
use url::Url;

const DEFAULT_PRODUCTION_HOST: &str = "learn.example.com";
const DEFAULT_PRODUCTION_API: &str = "https://api.example.com";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidMode { raw: String },
    InvalidUrl { flag: &'static str, raw: String },
    InvalidPort { raw: String },
    MissingShareUrl,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidMode { raw } => {
                write!(f, "invalid --mode value: {raw} (expected local or gateway)")
            }
            ArgsError::InvalidUrl { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid loopback port: {raw}"),
            ArgsError::MissingShareUrl => write!(f, "drive requires a share URL"),
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

fn parse_url(flag: &'static str, raw: &str) -> Result<Url, ArgsError> {
    Url::parse(raw.trim()).map_err(|_| ArgsError::InvalidUrl {
        flag,
        raw: raw.to_string(),
    })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

struct DesktopApp {
    services: AppServices,
    initial_page: PageContext,
}

impl UiApp for DesktopApp {
    fn progress(&self) -> Arc<ProgressStore> {
        self.services.progress()
    }

    fn navigator_for(&self, page: &PageContext) -> Arc<PhaseNavigator> {
        self.services.navigator_for(page)
    }

    fn initial_page(&self) -> PageContext {
        self.initial_page.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Local,
    Gateway,
}

impl ModeArg {
    fn parse(raw: &str) -> Result<Self, ArgsError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "gateway" => Ok(Self::Gateway),
            _ => Err(ArgsError::InvalidMode {
                raw: raw.to_string(),
            }),
        }
    }
}

struct Args {
    db_url: String,
    mode: ModeArg,
    page_url: Url,
    page_data: Option<String>,
    api_base: Option<Url>,
    token: Option<String>,
    production_host: String,
    production_api: Url,
    loopback_port: Option<u16>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui    [--db <sqlite_url>] [--mode local|gateway] [--page-url <url>]");
    eprintln!("                            [--page-data <json>] [--api-base <url>] [--token <token>]");
    eprintln!("  cargo run -p app -- drive <share_url> [--out <path>]");
    eprintln!();
    eprintln!("Defaults for ui:");
    eprintln!("  --db sqlite:progress.sqlite3");
    eprintln!("  --mode local");
    eprintln!("  --page-url file://<cwd>/BRD/index.html");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PHASEGATE_DB_URL, PHASEGATE_MODE, PHASEGATE_PAGE_URL, PHASEGATE_PAGE_DATA,");
    eprintln!("  PHASEGATE_API_BASE, PHASEGATE_TOKEN, PHASEGATE_PRODUCTION_HOST,");
    eprintln!("  PHASEGATE_PRODUCTION_API, PHASEGATE_LOOPBACK_PORT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Drive,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "drive" => Some(Self::Drive),
            _ => None,
        }
    }
}

impl Args {
    fn parse_ui(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = env_value("PHASEGATE_DB_URL")
            .map_or_else(
                || normalize_sqlite_url("sqlite:progress.sqlite3".into()),
                normalize_sqlite_url,
            );
        let mut mode = env_value("PHASEGATE_MODE")
            .map(|raw| ModeArg::parse(&raw))
            .transpose()?
            .unwrap_or(ModeArg::Local);
        let mut page_url = match env_value("PHASEGATE_PAGE_URL") {
            Some(raw) => parse_url("PHASEGATE_PAGE_URL", &raw)?,
            None => default_page_url()?,
        };
        let mut page_data = env_value("PHASEGATE_PAGE_DATA");
        let mut api_base = env_value("PHASEGATE_API_BASE")
            .map(|raw| parse_url("PHASEGATE_API_BASE", &raw))
            .transpose()?;
        let mut token = env_value("PHASEGATE_TOKEN");
        let production_host = env_value("PHASEGATE_PRODUCTION_HOST")
            .unwrap_or_else(|| DEFAULT_PRODUCTION_HOST.into());
        let production_api = parse_url(
            "PHASEGATE_PRODUCTION_API",
            &env_value("PHASEGATE_PRODUCTION_API").unwrap_or_else(|| DEFAULT_PRODUCTION_API.into()),
        )?;
        let loopback_port = env_value("PHASEGATE_LOOPBACK_PORT")
            .map(|raw| raw.trim().parse::<u16>().map_err(|_| ArgsError::InvalidPort { raw }))
            .transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--mode" => mode = ModeArg::parse(&require_value(args, "--mode")?)?,
                "--page-url" => {
                    page_url = parse_url("--page-url", &require_value(args, "--page-url")?)?;
                }
                "--page-data" => page_data = Some(require_value(args, "--page-data")?),
                "--api-base" => {
                    api_base = Some(parse_url("--api-base", &require_value(args, "--api-base")?)?);
                }
                "--token" => token = Some(require_value(args, "--token")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            mode,
            page_url,
            page_data,
            api_base,
            token,
            production_host,
            production_api,
            loopback_port,
        })
    }

    fn deployment_mode(&self) -> DeploymentMode {
        match self.mode {
            ModeArg::Local => DeploymentMode::Local,
            ModeArg::Gateway => {
                let mut config =
                    GatewayConfig::new(self.production_host.clone(), self.production_api.clone())
                        .with_api_base(self.api_base.clone())
                        .with_token(self.token.clone());
                if let Some(port) = self.loopback_port {
                    config = config.with_loopback_api_port(port);
                }
                DeploymentMode::Gateway(config)
            }
        }
    }

    fn initial_page(&self) -> PageContext {
        PageContext::from_raw(self.page_url.clone(), self.page_data.as_deref())
    }
}

struct DriveArgs {
    share_url: String,
    out: Option<PathBuf>,
}

impl DriveArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut share_url = None;
        let mut out = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => out = Some(PathBuf::from(require_value(args, "--out")?)),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if share_url.is_none() => share_url = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self {
            share_url: share_url.ok_or(ArgsError::MissingShareUrl)?,
            out,
        })
    }
}

fn default_page_url() -> Result<Url, ArgsError> {
    let path = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("BRD")
        .join("index.html");
    Url::from_file_path(&path).map_err(|()| ArgsError::InvalidUrl {
        flag: "--page-url",
        raw: path.display().to_string(),
    })
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Launch the UI when no subcommand is given.
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

    match cmd {
        Command::Ui => {
            let parsed = Args::parse_ui(&mut iter).inspect_err(|e| {
                eprintln!("{e}");
                print_usage();
            })?;

            // Open + migrate SQLite before the window exists.
            prepare_sqlite_file(&parsed.db_url)?;
            let services = AppServices::new_sqlite(&parsed.db_url, parsed.deployment_mode()).await?;
            let initial_page = parsed.initial_page();
            info!(
                "opening {} in {:?} mode",
                initial_page.location(),
                parsed.mode
            );

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                services,
                initial_page,
            });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Project Walkthrough")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Drive => {
            let parsed = DriveArgs::parse(&mut iter).inspect_err(|e| {
                eprintln!("{e}");
                print_usage();
            })?;
            let fetcher = services::DriveFetcher::new()?;
            let file = fetcher.fetch(&parsed.share_url).await?;
            info!(
                "downloaded {} bytes ({})",
                file.bytes.len(),
                file.content_type.as_deref().unwrap_or("unknown type")
            );
            match parsed.out {
                Some(path) => tokio::fs::write(&path, &file.bytes).await?,
                None => {
                    use tokio::io::AsyncWriteExt;
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&file.bytes).await?;
                    stdout.flush().await?;
                }
            }
            Ok(())
        }
    }
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
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
