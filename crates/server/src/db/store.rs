use std::sync::Arc;

use async_trait::async_trait;
use patient_core::{NewPatient, Patient, PatientFilter, PatientPatch};
use thiserror::Error;

/// Failure inside the persistence layer. Never a client error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create database pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// Persistence collaborator for Patient records.
///
/// Every call is one unit of work: it either commits as a whole or leaves
/// the store untouched. Lookups by an unknown id report absence through
/// `None` / `false` rather than an error.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Insert a record. The store assigns `id` and `created_at`.
    async fn insert(&self, new: NewPatient) -> Result<Patient, StoreError>;

    /// Records matching `filter`, ascending by `created_at`, paged by
    /// `filter.offset` / `filter.limit`.
    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Patient>, StoreError>;

    /// Apply the supplied fields and refresh `updated_at`
    async fn update(&self, id: &str, patch: &PatientPatch) -> Result<Option<Patient>, StoreError>;

    /// Hard delete. Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Connectivity probe for `/health`
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Store handle shared by every request
pub type SharedStore = Arc<dyn PatientStore>;
