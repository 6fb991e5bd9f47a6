//! Resource store - one snapshot for all in-flight document operations
//!
//! The store keeps a single immutable [`StoreSnapshot`] value holding one
//! [`OperationRecord`] per operation plus three side-effect flags. State only
//! moves through [`StoreEvent`]s folded by the pure reducer
//! [`StoreSnapshot::apply`]; the owning [`ResourceStore`] serializes writes
//! through a watch channel so readers always see a fully applied snapshot.
//!
//! Data-readiness and navigation signals are separate families: a
//! `Fulfilled` event never raises a side-effect flag by itself, and
//! consuming a flag never touches the operation records.

use docvault_client::Document;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

// =============================================================================
// Vocabulary
// =============================================================================

/// The five tracked operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Upload,
    Update,
    Delete,
    FetchAll,
    FetchOne,
}

/// Lifecycle state of one operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Successful payload of an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    One(Document),
    Many(Vec<Document>),
}

impl OperationOutput {
    pub fn as_one(&self) -> Option<&Document> {
        match self {
            Self::One(doc) => Some(doc),
            Self::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Document]> {
        match self {
            Self::Many(docs) => Some(docs),
            Self::One(_) => None,
        }
    }
}

/// Navigation/UI side-effect signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SideEffect {
    Created,
    Updated,
    Deleted,
}

/// Per-operation record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub status: OperationStatus,
    /// Last successful payload; survives later pending and rejected phases
    pub last_result: Option<OperationOutput>,
    /// Message from the server's structured failure body
    pub application_error: Option<String>,
    /// Low-level failure description
    pub transport_error: Option<String>,
}

/// Events the reducer folds into the snapshot
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// An operation was dispatched
    Pending(OperationKind),
    /// An operation settled successfully
    Fulfilled(OperationKind, OperationOutput),
    /// The server rejected an operation
    Rejected {
        kind: OperationKind,
        application_error: Option<String>,
        transport_error: Option<String>,
    },
    /// A navigation signal went up
    EffectRaised(SideEffect),
    /// The observer acted on a signal
    EffectConsumed(SideEffect),
    /// An operation record goes back to an earlier value, unless a terminal
    /// event has already settled it
    Restored(OperationKind, OperationRecord),
}

// =============================================================================
// Snapshot and reducer
// =============================================================================

/// Immutable aggregate of all operation records and side-effect flags
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub upload: OperationRecord,
    pub update: OperationRecord,
    pub delete: OperationRecord,
    pub fetch_all: OperationRecord,
    pub fetch_one: OperationRecord,
    pub created: bool,
    pub updated: bool,
    pub deleted: bool,
}

impl StoreSnapshot {
    /// Record for one operation
    pub fn record(&self, kind: OperationKind) -> &OperationRecord {
        match kind {
            OperationKind::Upload => &self.upload,
            OperationKind::Update => &self.update,
            OperationKind::Delete => &self.delete,
            OperationKind::FetchAll => &self.fetch_all,
            OperationKind::FetchOne => &self.fetch_one,
        }
    }

    /// Whether a side-effect flag is currently raised
    pub fn effect_raised(&self, effect: SideEffect) -> bool {
        match effect {
            SideEffect::Created => self.created,
            SideEffect::Updated => self.updated,
            SideEffect::Deleted => self.deleted,
        }
    }

    /// Fold one event into a new snapshot
    ///
    /// Pure function of (snapshot, event). `Pending` touches only the status
    /// of its record; `Fulfilled` stores the payload and clears both error
    /// channels; `Rejected` records both error channels and leaves the stale
    /// payload readable. Side-effect events never touch operation records and
    /// data events never touch the flags. `Restored` lands only while its
    /// record is still pending; once a terminal event has settled the record,
    /// a late restore is ignored.
    pub fn apply(&self, event: &StoreEvent) -> StoreSnapshot {
        let mut next = self.clone();

        match event {
            StoreEvent::Pending(kind) => {
                next.record_mut(*kind).status = OperationStatus::Pending;
            }
            StoreEvent::Fulfilled(kind, output) => {
                let record = next.record_mut(*kind);
                record.status = OperationStatus::Fulfilled;
                record.last_result = Some(output.clone());
                record.application_error = None;
                record.transport_error = None;
            }
            StoreEvent::Rejected {
                kind,
                application_error,
                transport_error,
            } => {
                let record = next.record_mut(*kind);
                record.status = OperationStatus::Rejected;
                record.application_error = application_error.clone();
                record.transport_error = transport_error.clone();
            }
            StoreEvent::EffectRaised(effect) => {
                *next.effect_mut(*effect) = true;
            }
            StoreEvent::EffectConsumed(effect) => {
                *next.effect_mut(*effect) = false;
            }
            StoreEvent::Restored(kind, record) => {
                let current = next.record_mut(*kind);
                if current.status == OperationStatus::Pending {
                    *current = record.clone();
                }
            }
        }

        next
    }

    fn record_mut(&mut self, kind: OperationKind) -> &mut OperationRecord {
        match kind {
            OperationKind::Upload => &mut self.upload,
            OperationKind::Update => &mut self.update,
            OperationKind::Delete => &mut self.delete,
            OperationKind::FetchAll => &mut self.fetch_all,
            OperationKind::FetchOne => &mut self.fetch_one,
        }
    }

    fn effect_mut(&mut self, effect: SideEffect) -> &mut bool {
        match effect {
            SideEffect::Created => &mut self.created,
            SideEffect::Updated => &mut self.updated,
            SideEffect::Deleted => &mut self.deleted,
        }
    }
}

// =============================================================================
// Owning store
// =============================================================================

/// Serialized-access owner of the snapshot
///
/// Writes go through [`ResourceStore::apply`], which replaces the snapshot
/// atomically inside the watch channel. Observers either read
/// [`ResourceStore::snapshot`] or hold a [`watch::Receiver`] from
/// [`ResourceStore::subscribe`] and get woken on every applied event.
pub struct ResourceStore {
    tx: watch::Sender<StoreSnapshot>,
}

impl ResourceStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreSnapshot::default());
        Self { tx }
    }

    /// Apply one event to the snapshot
    pub fn apply(&self, event: StoreEvent) {
        debug!("Store event: {:?}", event);
        self.tx.send_modify(|snapshot| *snapshot = snapshot.apply(&event));
    }

    /// Clone of the current snapshot
    pub fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    /// Lower a side-effect flag after acting on it
    pub fn consume(&self, effect: SideEffect) {
        self.apply(StoreEvent::EffectConsumed(effect));
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}
