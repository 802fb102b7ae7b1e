use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use puddle_sets::api::{build_router, state::AppState};
use puddle_sets::config::AppConfig;
use puddle_sets::fetch::{load_history, ApiClient, HistoryPage, HistorySource, HistoryView, StaticSource};
use puddle_sets::models::PlayerId;
use puddle_sets::parse_duration;
use puddle_sets::render::{render_view, RenderOptions};

#[derive(Parser)]
#[command(name = "puddle-sets")]
#[command(about = "Grouped match history and rating changes from the ranking API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./puddle.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a player's grouped match history
    History {
        /// Player id
        player_id: PlayerId,

        /// Character short code (default: highest rated)
        char_short: Option<String>,

        /// Games per page
        #[arg(long)]
        count: Option<usize>,

        /// Number of newer games to skip
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Refresh periodically until interrupted
        #[arg(long)]
        watch: bool,

        /// Refresh interval for --watch (e.g. "60s", "5m")
        #[arg(long)]
        interval: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Group saved API responses without network access
    Group {
        /// Saved player endpoint response
        #[arg(long)]
        player: PathBuf,

        /// Saved history endpoint response
        #[arg(long)]
        history: PathBuf,

        /// Character short code (default: highest rated)
        #[arg(long = "char")]
        char_short: Option<String>,

        /// Offset the history page was fetched with; non-zero means the
        /// newest record is the paging anchor
        #[arg(long, default_value = "0")]
        offset: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Serve grouped history over HTTP
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// List every game under its set
    #[arg(long)]
    expand: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show timestamps in local time
    #[arg(long)]
    local_time: bool,
}

impl OutputArgs {
    fn render_options(&self, config: &AppConfig) -> RenderOptions {
        RenderOptions {
            local_time: self.local_time || config.display.use_local_time,
            expand: self.expand,
        }
    }

    fn print(&self, view: &HistoryView, config: &AppConfig) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(view)?);
        } else {
            print!("{}", render_view(view, self.render_options(config)));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting puddle-sets v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::History {
            player_id,
            char_short,
            count,
            offset,
            watch,
            interval,
            output,
        } => {
            let source: Arc<dyn HistorySource> = Arc::new(ApiClient::new(&config.api)?);
            let page = HistoryPage::new(count.unwrap_or(config.history.default_count), offset);

            if watch {
                let every = match interval.as_deref() {
                    Some(s) => parse_duration(s)
                        .filter(|d| !d.is_zero())
                        .with_context(|| format!("invalid --interval: {}", s))?,
                    None => config
                        .history
                        .refresh_interval()
                        .unwrap_or(Duration::from_secs(60)),
                };
                watch_history(
                    source,
                    player_id,
                    char_short,
                    page,
                    every,
                    &output,
                    &config,
                    tokio::signal::ctrl_c(),
                )
                .await?;
            } else {
                let view = load_history(source.as_ref(), player_id, char_short.as_deref(), page)
                    .await?;
                output.print(&view, &config)?;
            }
        }
        Commands::Group {
            player,
            history,
            char_short,
            offset,
            output,
        } => {
            let player_json = std::fs::read_to_string(&player)
                .with_context(|| format!("reading {}", player.display()))?;
            let history_json = std::fs::read_to_string(&history)
                .with_context(|| format!("reading {}", history.display()))?;
            let source = StaticSource::from_json(&player_json, &history_json)?;
            let player_id = source.player_id();

            let page = HistoryPage::new(config.history.default_count, offset);
            let view = load_history(&source, player_id, char_short.as_deref(), page).await?;
            output.print(&view, &config)?;
        }
        Commands::Serve { host, port } => {
            let source: Arc<dyn HistorySource> = Arc::new(ApiClient::new(&config.api)?);
            let state = AppState {
                source,
                default_count: config.history.default_count,
            };
            let app = build_router(state, &config.server.cors_origin);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Serving grouped history on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Reload and print a history page on a fixed interval until `shutdown`
/// resolves. A shutdown also cancels a fetch that is still in flight.
#[allow(clippy::too_many_arguments)]
async fn watch_history(
    source: Arc<dyn HistorySource>,
    player_id: PlayerId,
    char_short: Option<String>,
    page: HistoryPage,
    every: Duration,
    output: &OutputArgs,
    config: &AppConfig,
    shutdown: impl Future<Output = std::io::Result<()>>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    tokio::pin!(shutdown);
    tracing::info!("Refreshing every {:?}, Ctrl-C to stop", every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = &mut shutdown => {
                result?;
                break;
            }
        }

        tokio::select! {
            loaded = load_history(source.as_ref(), player_id, char_short.as_deref(), page) => {
                match loaded {
                    Ok(view) => output.print(&view, config)?,
                    Err(e) => tracing::error!("Refresh failed: {}", e),
                }
            }
            result = &mut shutdown => {
                result?;
                break;
            }
        }
    }

    tracing::info!("Watch stopped");
    Ok(())
}
