use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use upgrade_alert::clock::SystemClock;
use upgrade_alert::config::{self, AlertConfig};
use upgrade_alert::feed::HostInfo;
use upgrade_alert::feed::provider::{FeedProvider, StaticVersionProvider};
use upgrade_alert::feed::providers::{FileFeedProvider, JsonFeedProvider};
use upgrade_alert::logging::{self, LogFormat, LogTarget};
use upgrade_alert::session::{
    ActionHandler, PromptOutcome, PromptRequest, SessionBuilder, TerminalPresenter,
};
use upgrade_alert::store::{AlertStateStore, KeyValueStore, SqliteStore};
use upgrade_alert::version::parse_lenient;

#[derive(Parser)]
#[command(name = "upgrade-alert")]
#[command(version, about = "Decide whether to prompt for an application upgrade")]
struct Cli {
    /// Alert state database (defaults to the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON configuration file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the log directory
    #[arg(long, global = true)]
    log_stderr: bool,

    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one check and prompt on the terminal if an upgrade should be offered
    Check(CheckArgs),
    /// Print the persisted alert state as JSON
    State,
    /// Forget every recorded alert and ignored version
    Reset,
}

#[derive(Args)]
struct CheckArgs {
    /// Version of the running application
    #[arg(long)]
    installed: String,

    #[arg(long, conflicts_with = "feed_file", required_unless_present = "feed_file")]
    feed_url: Option<String>,

    #[arg(long)]
    feed_file: Option<PathBuf>,

    #[arg(long)]
    app_id: Option<String>,

    #[arg(long)]
    locale: Option<String>,

    /// Host operating system, matched against each release's `os`
    #[arg(long)]
    os: Option<String>,

    #[arg(long)]
    os_version: Option<String>,

    /// Minimum supported version, overriding the feed
    #[arg(long)]
    min_app_version: Option<String>,

    /// Minimum seconds between two prompts
    #[arg(long)]
    throttle_secs: Option<i64>,

    #[arg(long)]
    always_show: bool,

    #[arg(long)]
    show_once: bool,
}

impl CheckArgs {
    fn apply(&self, config: &mut AlertConfig) {
        if let Some(app_id) = &self.app_id {
            config.app_id = Some(app_id.clone());
        }
        if let Some(locale) = &self.locale {
            config.locale = Some(locale.clone());
        }
        if let Some(min) = &self.min_app_version {
            config.min_app_version = Some(min.clone());
        }
        if let Some(secs) = self.throttle_secs {
            config.throttle_interval = secs.saturating_mul(1000);
        }
        config.debug_always_show |= self.always_show;
        config.debug_show_once |= self.show_once;
    }

    fn host(&self) -> HostInfo {
        HostInfo {
            os: self.os.clone(),
            os_version: self
                .os_version
                .as_deref()
                .and_then(|raw| parse_lenient(raw, "host OS version")),
        }
    }

    fn feed_provider(&self) -> anyhow::Result<Arc<dyn FeedProvider>> {
        match (&self.feed_url, &self.feed_file) {
            (Some(url), _) => Ok(Arc::new(JsonFeedProvider::new(url)?)),
            (None, Some(path)) => Ok(Arc::new(FileFeedProvider::new(path))),
            (None, None) => anyhow::bail!("either --feed-url or --feed-file is required"),
        }
    }
}

/// Points the user at the listing once they choose to update
struct ListingLink;

impl ActionHandler for ListingLink {
    fn on_update(&self, request: &PromptRequest) {
        if let Some(url) = &request.listing_url {
            println!("Download the new version from {}", url);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = config::log_dir();
    let target = if cli.log_stderr {
        LogTarget::Stderr
    } else {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("creating log directory {:?}", log_dir))?;
        LogTarget::Directory(&log_dir)
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    let _log_guard = logging::init(target, format);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    let storage = open_store(cli.db.as_deref())?;

    match cli.command {
        Command::Check(args) => {
            args.apply(&mut config);
            check(config, storage, &args).await
        }
        Command::State => print_state(storage).await,
        Command::Reset => {
            AlertStateStore::new(storage, Arc::new(SystemClock))
                .reset()
                .await?;
            println!("Alert state cleared");
            Ok(())
        }
    }
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<AlertConfig> {
    match explicit {
        Some(path) => AlertConfig::from_file(path)
            .with_context(|| format!("loading configuration from {:?}", path)),
        None => {
            let path = config::config_path();
            if path.exists() {
                AlertConfig::from_file(&path)
                    .with_context(|| format!("loading configuration from {:?}", path))
            } else {
                debug!("No configuration file at {:?}, using defaults", path);
                Ok(AlertConfig::default())
            }
        }
    }
}

fn open_store(explicit: Option<&Path>) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let dir = config::data_dir();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating data directory {:?}", dir))?;
            config::db_path()
        }
    };
    let store = SqliteStore::new(&path)
        .with_context(|| format!("opening alert state database {:?}", path))?;
    Ok(Arc::new(store))
}

async fn check(
    config: AlertConfig,
    storage: Arc<dyn KeyValueStore>,
    args: &CheckArgs,
) -> anyhow::Result<()> {
    let session = SessionBuilder::new(
        config,
        args.feed_provider()?,
        Arc::new(StaticVersionProvider::new(&args.installed)),
        storage,
        Arc::new(TerminalPresenter::stdio()),
    )
    .host(args.host())
    .action_handler(Arc::new(ListingLink))
    .build();

    match session.check_and_prompt().await {
        PromptOutcome::Suppressed(decision) => {
            info!("No prompt: {:?}", decision.reason);
            println!("No upgrade prompt ({:?})", decision.reason);
        }
        PromptOutcome::Presented { action, .. } => {
            info!("Prompt answered with {:?}", action);
        }
        PromptOutcome::AlreadyDisplaying => {
            println!("A prompt is already on screen");
        }
    }

    Ok(())
}

async fn print_state(storage: Arc<dyn KeyValueStore>) -> anyhow::Result<()> {
    let state = AlertStateStore::new(storage, Arc::new(SystemClock))
        .load()
        .await;

    let json = serde_json::json!({
        "lastTimeAlerted": state.last_alerted_at.map(|t| t.to_rfc3339()),
        "lastVersionAlerted": state.last_version_alerted.map(|v| v.to_string()),
        "userIgnoredVersion": state.user_ignored_version.map(|v| v.to_string()),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}
