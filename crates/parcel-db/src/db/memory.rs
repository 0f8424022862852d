use async_trait::async_trait;
use chrono::Utc;
use parcel_core::models::{NewProperty, PropertyRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::error::PersistError;
use super::property::PropertyStore;

/// Process-local [`PropertyStore`].
///
/// Enforces the same uniqueness on `source_pdf_path` as the database schema.
#[derive(Clone, Default)]
pub struct InMemoryPropertyStore {
    records: Arc<Mutex<HashMap<Uuid, PropertyRecord>>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, PropertyRecord>>, PersistError> {
        self.records
            .lock()
            .map_err(|_| PersistError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn insert(&self, property: NewProperty) -> Result<PropertyRecord, PersistError> {
        let mut records = self.lock()?;

        if records
            .values()
            .any(|r| r.source_pdf_path == property.source_pdf_path)
        {
            return Err(PersistError::Constraint(format!(
                "duplicate key value violates unique constraint (source_pdf_path = {})",
                property.source_pdf_path
            )));
        }

        let record = property.into_record(Uuid::new_v4(), Utc::now());
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PropertyRecord>, PersistError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn ping(&self) -> Result<(), PersistError> {
        self.lock().map(|_| ())
    }
}
