use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use patient_core::{NewPatient, Patient, PatientFilter, PatientPatch, generate_id};
use tokio::sync::RwLock;

use super::store::{PatientStore, StoreError};

/// In-process Patient store, used by tests and `STORE_BACKEND=memory`.
///
/// Records are kept in insertion order. The whole operation runs under one
/// lock acquisition, which makes each call atomic.
#[derive(Debug, Default)]
pub struct MemoryPatientStore {
    rows: RwLock<Vec<Patient>>,
}

impl MemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Current time truncated to the microsecond resolution PostgreSQL keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn insert(&self, new: NewPatient) -> Result<Patient, StoreError> {
        let patient = Patient::from_new(generate_id(), new, now());
        self.rows.write().await.push(patient.clone());
        Ok(patient)
    }

    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, StoreError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&Patient> = rows.iter().filter(|p| filter.matches(p)).collect();
        // Stable sort, so equal timestamps keep insertion order
        matched.sort_by_key(|p| p.created_at);

        Ok(matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Patient>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: &str, patch: &PatientPatch) -> Result<Option<Patient>, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|p| p.id == id).map(|row| {
            row.apply(patch, now());
            row.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_core::{ListParams, Patch};

    fn new_patient(first: &str) -> NewPatient {
        NewPatient {
            first_name: first.into(),
            last_name: "Doe".into(),
            gender: "female".into(),
            birth_date: None,
            email: None,
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_creation_time() {
        let store = MemoryPatientStore::new();
        let patient = store.insert(new_patient("Ann")).await.unwrap();
        assert!(!patient.id.is_empty());
        assert!(patient.updated_at.is_none());
        assert_eq!(store.get(&patient.id).await.unwrap(), Some(patient));
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let store = MemoryPatientStore::new();
        for i in 0..15 {
            store.insert(new_patient(&format!("P{:02}", i))).await.unwrap();
        }
        let filter = ListParams {
            limit: Some(10),
            offset: Some(10),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        let names: Vec<_> = store
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.first_name)
            .collect();
        assert_eq!(names, vec!["P10", "P11", "P12", "P13", "P14"]);
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let store = MemoryPatientStore::new();
        let patch = PatientPatch {
            first_name: Patch::Present("Bob".into()),
            ..Default::default()
        };
        assert!(store.update("missing", &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_reported_once() {
        let store = MemoryPatientStore::new();
        let patient = store.insert(new_patient("Ann")).await.unwrap();
        assert!(store.delete(&patient.id).await.unwrap());
        assert!(!store.delete(&patient.id).await.unwrap());
        assert!(store.get(&patient.id).await.unwrap().is_none());
    }
}
