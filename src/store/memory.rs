use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::annotation::{
    AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId,
};
use crate::error::{AppError, AppResult};

use super::AnnotationStore;
use super::table::RecordTable;

#[derive(Debug, Default)]
pub struct MemoryAnnotationStore {
    table: Mutex<RecordTable>,
}

impl MemoryAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|table| table.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, RecordTable>> {
        self.table
            .lock()
            .map_err(|_| AppError::persistence("lock", "annotation table is poisoned"))
    }
}

impl AnnotationStore for MemoryAnnotationStore {
    async fn list(
        &self,
        material: MaterialId,
        user: UserId,
        page: Option<PageNumber>,
    ) -> AppResult<Vec<AnnotationRecord>> {
        Ok(self.lock()?.list(material, user, page))
    }

    async fn save(&self, key: AnnotationKey, payload: String) -> AppResult<AnnotationRecord> {
        self.lock()?.upsert(key, payload, Utc::now())
    }

    async fn update(
        &self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
        payload: String,
    ) -> AppResult<AnnotationRecord> {
        self.lock()?.update(material, user, id, payload, Utc::now())
    }

    async fn delete(&self, material: MaterialId, user: UserId, id: RecordId) -> AppResult<()> {
        self.lock()?.delete(material, user, id)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryAnnotationStore;
    use crate::annotation::{AnnotationKey, MaterialId, PageNumber, UserId};
    use crate::store::AnnotationStore;

    #[tokio::test]
    async fn repeated_saves_leave_one_record_with_last_content() {
        let store = MemoryAnnotationStore::new();
        let key = AnnotationKey::new(MaterialId(3), UserId(8), PageNumber(3));

        let mut ids = Vec::new();
        for round in 0..5 {
            let record = store
                .save(key, format!("content-{round}"))
                .await
                .expect("save should succeed");
            ids.push(record.id);
        }
        assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));

        let all = store
            .list(key.material, key.user, None)
            .await
            .expect("list should succeed");
        assert_eq!(all.len(), 1);
        let fetched = store
            .fetch_for_page(key)
            .await
            .expect("fetch should succeed")
            .expect("record should exist");
        assert_eq!(fetched.annotation_objects, "content-4");
    }

    #[tokio::test]
    async fn fetch_for_missing_page_is_none() {
        let store = MemoryAnnotationStore::new();
        let key = AnnotationKey::new(MaterialId(3), UserId(8), PageNumber(1));
        assert!(store.fetch_for_page(key).await.expect("fetch").is_none());
        assert!(store.is_empty());
    }
}
