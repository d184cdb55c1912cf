//! In-memory record collection.
//!
//! Seeded with the sample dataset at startup. Readers take a cloned
//! snapshot so filtering and statistics run without holding the lock.
//! Records are only ever appended, by saving a completed analysis.

use atc_core::analysis::AnalysisResult;
use atc_core::record::{next_record_id, sample_records, AnimalRecord};
use atc_core::types::AnalysisDate;
use tokio::sync::RwLock;

pub struct RecordStore {
    records: RwLock<Vec<AnimalRecord>>,
}

impl RecordStore {
    pub fn new(records: Vec<AnimalRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// A store holding the six sample records.
    pub fn with_sample_data() -> Self {
        Self::new(sample_records())
    }

    /// Copy of the whole collection in insertion order.
    pub async fn snapshot(&self) -> Vec<AnimalRecord> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<AnimalRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Append a completed record built from `result`, assigning the next
    /// free `ATC-NNN` identifier.
    pub async fn insert_result(&self, result: &AnalysisResult, date: AnalysisDate) -> AnimalRecord {
        let mut records = self.records.write().await;
        let record = result.to_record(next_record_id(&records), date);
        records.push(record.clone());
        record
    }
}
