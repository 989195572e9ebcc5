use std::sync::Arc;

use anyhow::Result;
use archive::{
    ArchiveViewController, AvailabilitySummary, LeaderboardKind, RenderDecision, TimeNormalizer,
    VisualTier,
};
use common::{Config, HttpTransport};
use time::OffsetDateTime;
use tokio::task::JoinSet;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    // Configure tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let normalizer = TimeNormalizer::from_config(config.utc_offset, config.timezone);
    info!("Selections are read in {}", normalizer.zone());

    let transport = Arc::new(HttpTransport::new(config.require_api_url()?));
    let kinds = config
        .require_kinds()?
        .iter()
        .map(|kind| kind.parse::<LeaderboardKind>())
        .collect::<Result<Vec<_>>>()?;

    // One view per leaderboard, loaded in parallel
    let mut view_tasks = JoinSet::new();
    for kind in kinds {
        let transport = Arc::clone(&transport);
        let selection = config.viewer.selection.clone();
        let top_entries = config.viewer.top_entries;

        view_tasks.spawn(async move {
            match view_archive(kind, transport, normalizer, selection, top_entries).await {
                Ok(_) => {
                    info!("{} archive view completed", kind.title());
                    Ok(())
                }
                Err(e) => {
                    warn!("{} archive view failed: {}", kind.title(), e);
                    Err(e)
                }
            }
        });
    }

    let mut success_count = 0;
    let mut error_count = 0;

    while let Some(result) = view_tasks.join_next().await {
        match result {
            Ok(Ok(_)) => success_count += 1,
            Ok(Err(_)) | Err(_) => error_count += 1,
        }
    }

    info!(
        "All archive views finished. Successful: {}, Failed: {}",
        success_count, error_count
    );

    if error_count > 0 {
        anyhow::bail!("Some archive views failed to load");
    }

    Ok(())
}

async fn view_archive(
    kind: LeaderboardKind,
    transport: Arc<HttpTransport>,
    normalizer: TimeNormalizer,
    selection: Option<String>,
    top_entries: usize,
) -> Result<()> {
    let mut controller = ArchiveViewController::new(kind, transport, normalizer);

    controller.mount_and_load(OffsetDateTime::now_utc()).await?;
    if let Some(selection) = selection {
        info!("{}: selecting {}", kind.title(), selection);
        controller.select_and_load(&selection).await?;
    }

    report(&controller, top_entries);
    Ok(())
}

fn report(controller: &ArchiveViewController<HttpTransport>, top_entries: usize) {
    let kind = controller.kind();

    match controller.render() {
        RenderDecision::Table { caption, entries } => {
            info!("{} ({}): {}", kind.title(), controller.selection(), caption);
            for (rank, entry) in entries.iter().take(top_entries).enumerate() {
                info!(
                    "{:>4}. {:<24} {}",
                    rank + 1,
                    entry.display_name(),
                    entry.display_score()
                );
            }
        }
        RenderDecision::ErrorBanner(message) => {
            warn!("{} ({}): {}", kind.title(), controller.selection(), message)
        }
        RenderDecision::Spinner | RenderDecision::Idle => {
            info!("{}: nothing loaded", kind.title())
        }
    }

    if kind.uptime_supported() {
        match controller.availability() {
            Some(summary) => info!(
                "Archive availability {}: {} [{}]",
                summary.month_label,
                summary.percentage_label(),
                tracking_strip(summary)
            ),
            None => info!(
                "Archive availability: {}",
                controller.availability_header()
            ),
        }
    }
}

fn tracking_strip(summary: &AvailabilitySummary) -> String {
    summary
        .strip
        .iter()
        .map(|indicator| match indicator.class.tier {
            VisualTier::Good => '+',
            VisualTier::Warning => '~',
            VisualTier::Danger => 'x',
            VisualTier::Unknown => '?',
        })
        .collect()
}
