//! Operation dispatcher - three-phase lifecycle over a document transport
//!
//! Every operation runs the same way: record `Pending`, await the transport,
//! then settle. A server that answered with a failure becomes a recorded
//! `Rejected` outcome the caller can inspect; a transport that never produced
//! a response re-raises after putting the operation record back to its
//! pre-dispatch value, so nothing is left dangling in the snapshot.

use async_trait::async_trait;
use docvault_client::{ApiError, Document, DocumentApi, DocumentPatch, NewDocument};
use tracing::warn;

use crate::store::{
    OperationKind, OperationOutput, ResourceStore, SideEffect, StoreEvent,
};

/// Transport seam for the five document operations
///
/// [`DocumentApi`] is the wire implementation; tests swap in stubs.
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    async fn upload(&self, input: &NewDocument) -> Result<Document, ApiError>;
    async fn update(&self, id: u64, patch: &DocumentPatch) -> Result<Document, ApiError>;
    async fn delete(&self, id: u64) -> Result<Document, ApiError>;
    async fn fetch_all(&self, category: Option<&str>) -> Result<Vec<Document>, ApiError>;
    async fn fetch_one(&self, id: u64) -> Result<Document, ApiError>;
}

#[async_trait]
impl DocumentTransport for DocumentApi {
    async fn upload(&self, input: &NewDocument) -> Result<Document, ApiError> {
        DocumentApi::upload(self, input).await
    }

    async fn update(&self, id: u64, patch: &DocumentPatch) -> Result<Document, ApiError> {
        DocumentApi::update(self, id, patch).await
    }

    async fn delete(&self, id: u64) -> Result<Document, ApiError> {
        DocumentApi::delete(self, id).await
    }

    async fn fetch_all(&self, category: Option<&str>) -> Result<Vec<Document>, ApiError> {
        DocumentApi::fetch_all(self, category).await
    }

    async fn fetch_one(&self, id: u64) -> Result<Document, ApiError> {
        DocumentApi::fetch_one(self, id).await
    }
}

/// How a dispatched operation settled when the server was reachable
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome<T> {
    /// The operation succeeded and the store recorded the payload
    Fulfilled(T),
    /// The server rejected the operation; both channels are recorded
    Rejected {
        application_error: Option<String>,
        transport_error: Option<String>,
    },
}

impl<T> DispatchOutcome<T> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// The payload, when fulfilled
    pub fn fulfilled(self) -> Option<T> {
        match self {
            Self::Fulfilled(value) => Some(value),
            Self::Rejected { .. } => None,
        }
    }
}

/// Dispatcher binding a transport to a [`ResourceStore`]
pub struct DocumentActions<T: DocumentTransport> {
    transport: T,
    store: ResourceStore,
}

impl<T: DocumentTransport> DocumentActions<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            store: ResourceStore::new(),
        }
    }

    /// The store this dispatcher writes to
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Upload a new document; raises `created` on success
    pub async fn upload(
        &self,
        input: &NewDocument,
    ) -> Result<DispatchOutcome<Document>, ApiError> {
        self.settle(
            OperationKind::Upload,
            Some(SideEffect::Created),
            self.transport.upload(input),
            |doc| OperationOutput::One(doc.clone()),
        )
        .await
    }

    /// Update a document's metadata; raises `updated` on success
    pub async fn update(
        &self,
        id: u64,
        patch: &DocumentPatch,
    ) -> Result<DispatchOutcome<Document>, ApiError> {
        self.settle(
            OperationKind::Update,
            Some(SideEffect::Updated),
            self.transport.update(id, patch),
            |doc| OperationOutput::One(doc.clone()),
        )
        .await
    }

    /// Delete a document; raises `deleted` on success
    pub async fn delete(&self, id: u64) -> Result<DispatchOutcome<Document>, ApiError> {
        self.settle(
            OperationKind::Delete,
            Some(SideEffect::Deleted),
            self.transport.delete(id),
            |doc| OperationOutput::One(doc.clone()),
        )
        .await
    }

    /// List documents, optionally filtered by category. Repeatable; raises no
    /// side-effect signal.
    pub async fn fetch_all(
        &self,
        category: Option<&str>,
    ) -> Result<DispatchOutcome<Vec<Document>>, ApiError> {
        self.settle(
            OperationKind::FetchAll,
            None,
            self.transport.fetch_all(category),
            |docs| OperationOutput::Many(docs.clone()),
        )
        .await
    }

    /// Fetch one document. Repeatable; raises no side-effect signal.
    pub async fn fetch_one(&self, id: u64) -> Result<DispatchOutcome<Document>, ApiError> {
        self.settle(
            OperationKind::FetchOne,
            None,
            self.transport.fetch_one(id),
            |doc| OperationOutput::One(doc.clone()),
        )
        .await
    }

    /// Shared settle routine
    ///
    /// Captures the pre-dispatch record before emitting `Pending` so a
    /// no-response failure can restore it exactly. When two dispatches of
    /// the same kind overlap, the later one may capture the earlier one's
    /// `Pending` record; the reducer ignores a restore once the record has
    /// settled, so a late failure never drags a finished record back to
    /// pending. Overlapping terminal events remain last-writer-wins.
    async fn settle<V, F>(
        &self,
        kind: OperationKind,
        effect: Option<SideEffect>,
        op: F,
        to_output: impl FnOnce(&V) -> OperationOutput,
    ) -> Result<DispatchOutcome<V>, ApiError>
    where
        F: std::future::Future<Output = Result<V, ApiError>>,
    {
        let prior = self.store.snapshot().record(kind).clone();
        self.store.apply(StoreEvent::Pending(kind));

        match op.await {
            Ok(value) => {
                self.store
                    .apply(StoreEvent::Fulfilled(kind, to_output(&value)));
                // The navigation signal is its own event, never folded into
                // the data transition
                if let Some(effect) = effect {
                    self.store.apply(StoreEvent::EffectRaised(effect));
                }
                Ok(DispatchOutcome::Fulfilled(value))
            }
            Err(err) if err.server_responded() => {
                let application_error = err.server_message();
                let transport_error = Some(err.to_string());
                warn!("{:?} rejected by server: {}", kind, err);
                self.store.apply(StoreEvent::Rejected {
                    kind,
                    application_error: application_error.clone(),
                    transport_error: transport_error.clone(),
                });
                Ok(DispatchOutcome::Rejected {
                    application_error,
                    transport_error,
                })
            }
            Err(err) => {
                warn!("{:?} got no response: {}", kind, err);
                self.store.apply(StoreEvent::Restored(kind, prior));
                Err(err)
            }
        }
    }
}
