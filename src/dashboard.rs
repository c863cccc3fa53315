//! # Live Dashboard Feed
//!
//! [`SnapshotHub`] keeps the latest snapshot JSON in a `watch` cell and fans
//! every update out over a `broadcast` channel. [`router`] exposes it over
//! HTTP:
//!
//! - `GET /api/data`: latest snapshot as JSON, `503` before the first update
//! - `GET /api/events`: `text/event-stream` with one `event: update` frame per
//!   snapshot, starting with the latest

use crate::snapshot::AstronomicalSnapshot;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Updates a slow subscriber may fall behind before it skips ahead.
const UPDATE_BUFFER: usize = 16;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("dashboard IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialise snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

struct HubInner {
    latest: watch::Sender<Option<Arc<str>>>,
    updates: broadcast::Sender<Arc<str>>,
}

/// Latest-value cell plus update fan-out. Cheap to clone.
#[derive(Clone)]
pub struct SnapshotHub {
    inner: Arc<HubInner>,
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotHub {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        Self {
            inner: Arc::new(HubInner { latest, updates }),
        }
    }

    /// Store `snapshot` as the latest and broadcast it.
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, snapshot: &AstronomicalSnapshot) -> Result<usize, DashboardError> {
        let json: Arc<str> = serde_json::to_string(snapshot)?.into();
        self.inner.latest.send_replace(Some(json.clone()));
        // Err only means nobody is listening
        let delivered = self.inner.updates.send(json).unwrap_or(0);
        info!(subscribers = delivered, "Snapshot broadcast complete");
        Ok(delivered)
    }

    pub fn latest(&self) -> Option<Arc<str>> {
        self.inner.latest.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.updates.receiver_count()
    }

    /// Stream of snapshot JSON: the latest first (if any), then every update.
    pub fn subscribe(&self) -> Subscription {
        // Subscribe before reading the cell so no publish falls in between
        let updates = self.inner.updates.subscribe();
        Subscription {
            pending: self.latest(),
            updates,
        }
    }
}

pub struct Subscription {
    pending: Option<Arc<str>>,
    updates: broadcast::Receiver<Arc<str>>,
}

impl Subscription {
    /// Next snapshot JSON, or `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<Arc<str>> {
        if let Some(json) = self.pending.take() {
            return Some(json);
        }
        loop {
            match self.updates.recv().await {
                Ok(json) => return Some(json),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Dashboard subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Server-sent event stream over a fresh subscription. The subscription,
/// and with it the broadcast receiver, is dropped with the response body.
fn update_events(hub: &SnapshotHub) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(hub.subscribe(), |mut subscription| async move {
        let json = subscription.next().await?;
        Some((Ok(Event::default().event("update").data(json)), subscription))
    })
}

async fn latest_snapshot(State(hub): State<SnapshotHub>) -> Response {
    match hub.latest() {
        Some(json) => {
            ([(header::CONTENT_TYPE, "application/json")], json.to_string()).into_response()
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "no snapshot yet").into_response(),
    }
}

async fn snapshot_events(
    State(hub): State<SnapshotHub>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = update_events(&hub);
    info!(subscribers = hub.subscriber_count(), "Dashboard client subscribed");
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Dashboard routes over `hub`.
pub fn router(hub: SnapshotHub) -> Router {
    Router::new()
        .route("/api/data", get(latest_snapshot))
        .route("/api/events", get(snapshot_events))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(hub)
}

/// Serve the dashboard routes on `listener` until the process exits.
pub async fn serve(listener: TcpListener, hub: SnapshotHub) -> Result<(), DashboardError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Dashboard listening");
    }
    axum::serve(listener, router(hub)).await?;
    Ok(())
}
