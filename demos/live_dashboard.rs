//! Mount a dashboard view and print one JSON digest per view-model revision.
//!
//! ```bash
//! # Against a running backend
//! cargo run --example live_dashboard -- --base-url http://localhost:8000
//!
//! # Offline, from a directory of dashboard.json / agents.json / metrics.json / timeline.json
//! cargo run --example live_dashboard -- --fixtures ./fixtures
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use medisurge_monitor::{logging, DashboardSource, DashboardView, FileSource, Settings};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "live_dashboard")]
#[command(about = "Poll the MediSurge backend and print derived dashboard state")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read payloads from a fixture directory instead of the backend
    #[arg(short, long, conflicts_with = "base_url")]
    fixtures: Option<PathBuf>,

    /// Backend base URL (overrides api.base_url)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.api.base_url = base_url;
    }

    let source: Arc<dyn DashboardSource> = match args.fixtures {
        Some(dir) => Arc::new(FileSource::new(dir)),
        None => Arc::new(settings.http_source()?),
    };

    let view = DashboardView::mount(source, &settings.policies()?);
    let mut updates = view.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let model = updates.borrow_and_update().clone();
                println!("{}", serde_json::to_string(&model.digest(Utc::now()))?);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    view.unmount();
    Ok(())
}
