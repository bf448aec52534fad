//! Plant snapshot handoff from the data source to the tick thread.
//!
//! The data source (often a background fetch task) publishes whole
//! snapshots; the tick swaps the latest one in at the start of a tick. A
//! `tokio::sync::watch` channel gives single-writer/single-reader mailbox
//! semantics: only the newest snapshot is kept and the reader never blocks.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::watch;

use crate::core::Result;
use crate::garden::plant::Plant;

/// Point-in-time view of the garden published by the data source.
#[derive(Clone, Debug, Default)]
pub struct GardenSnapshot {
    /// Plants in data-source order.
    pub plants: Arc<[Plant]>,
    /// Weather the data source currently reports, if it reports one.
    pub weather: Option<String>,
}

/// Wire shape of an updates response.
#[derive(Deserialize)]
struct UpdatesPayload {
    #[serde(default)]
    plants: Vec<Plant>,
    #[serde(default)]
    weather: Option<String>,
}

impl GardenSnapshot {
    pub fn new(plants: Vec<Plant>) -> Self {
        Self {
            plants: plants.into(),
            weather: None,
        }
    }

    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.weather = Some(weather.into());
        self
    }

    /// Parse an updates document: `{ "plants": [...], "weather": "rain" }`.
    /// Unknown fields are ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let payload: UpdatesPayload = serde_json::from_str(json)?;
        Ok(Self {
            plants: payload.plants.into(),
            weather: payload.weather,
        })
    }
}

/// Writing half, owned by the data source.
#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Arc<GardenSnapshot>>,
}

impl SnapshotPublisher {
    /// Replace the pending snapshot. Never blocks; succeeds even if the
    /// reader is gone.
    pub fn publish(&self, snapshot: GardenSnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }

    /// Whether the tick side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reading half, owned by the tick.
pub struct SnapshotMailbox {
    rx: watch::Receiver<Arc<GardenSnapshot>>,
}

impl SnapshotMailbox {
    /// The newest snapshot if one arrived since the last call.
    pub fn take_new(&mut self) -> Option<Arc<GardenSnapshot>> {
        let snapshot = self.rx.borrow_and_update();
        if snapshot.has_changed() {
            Some(Arc::clone(&snapshot))
        } else {
            None
        }
    }
}

/// Create a connected publisher/mailbox pair holding an empty snapshot.
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotMailbox) {
    let (tx, rx) = watch::channel(Arc::new(GardenSnapshot::default()));
    (SnapshotPublisher { tx }, SnapshotMailbox { rx })
}
