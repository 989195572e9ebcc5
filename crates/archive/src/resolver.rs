use std::sync::Arc;

use common::{ArchiveError, ArchiveResult, ArchiveTransport, HttpResponse};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::models::{
    BlitzEntry, LeaderboardEntry, LeaderboardKind, SnapshotBody, SnapshotRequest, SnapshotResult,
    XpEntry,
};

/// Asks the archive for the snapshot nearest to a requested instant.
pub struct SnapshotResolver<T> {
    transport: Arc<T>,
}

impl<T> Clone for SnapshotResolver<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: ArchiveTransport> SnapshotResolver<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// `Ok(Failure)` is the archive explaining why it has nothing to serve;
    /// `Err` means no usable answer came back at all.
    pub async fn resolve(
        &self,
        kind: LeaderboardKind,
        requested_timestamp: i64,
    ) -> ArchiveResult<SnapshotResult> {
        self.resolve_request(SnapshotRequest::new(kind, requested_timestamp))
            .await
    }

    pub async fn resolve_request(&self, request: SnapshotRequest) -> ArchiveResult<SnapshotResult> {
        let path = request.path();
        info!(
            "Resolving {} snapshot nearest to {}",
            request.kind, request.requested_timestamp
        );

        let response = self.transport.get(&path).await?;

        let result = decode_snapshot(request.kind, &response)?;
        match &result {
            SnapshotResult::Success {
                actual_timestamp,
                entries,
            } => debug!(
                "{} snapshot at {} ({} entries, {}s from request)",
                request.kind,
                actual_timestamp,
                entries.len(),
                result
                    .drift_from(request.requested_timestamp)
                    .unwrap_or_default()
            ),
            SnapshotResult::Failure { reason } => {
                info!("Archive has no {} snapshot: {}", request.kind, reason)
            }
        }
        Ok(result)
    }
}

pub fn decode_snapshot(kind: LeaderboardKind, response: &HttpResponse) -> ArchiveResult<SnapshotResult> {
    match kind {
        LeaderboardKind::Blitz => decode_body::<BlitzEntry>(response),
        LeaderboardKind::Xp => decode_body::<XpEntry>(response),
    }
}

fn decode_body<E>(response: &HttpResponse) -> ArchiveResult<SnapshotResult>
where
    E: DeserializeOwned + Into<LeaderboardEntry>,
{
    // A `detail` body only means "no data" on a 2xx; elsewhere it is the
    // framework's own error page (e.g. a route miss).
    if !response.is_success() {
        return Err(ArchiveError::Status {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let body: SnapshotBody<E> = serde_json::from_str(&response.body)?;
    Ok(body.into_result())
}
