use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::annotation::{
    AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId,
};
use crate::error::{AppError, AppResult};

/// Authoritative record set: at most one record per key triple, ids never reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordTable {
    next_id: u64,
    records: Vec<AnnotationRecord>,
}

impl RecordTable {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn list(
        &self,
        material: MaterialId,
        user: UserId,
        page: Option<PageNumber>,
    ) -> Vec<AnnotationRecord> {
        let mut matches: Vec<_> = self
            .records
            .iter()
            .filter(|record| record.material_id == material && record.user_id == user)
            .filter(|record| page.is_none_or(|page| record.page_number == page))
            .cloned()
            .collect();
        matches.sort_by_key(|record| record.page_number);
        matches
    }

    pub(crate) fn upsert(
        &mut self,
        key: AnnotationKey,
        payload: String,
        now: DateTime<Utc>,
    ) -> AppResult<AnnotationRecord> {
        if payload.trim().is_empty() {
            return Err(AppError::invalid_argument(
                "annotation objects and page number are required",
            ));
        }

        if let Some(existing) = self.records.iter_mut().find(|record| record.key() == key) {
            existing.annotation_objects = payload;
            existing.updated_at = Some(now);
            return Ok(existing.clone());
        }

        let id = self.allocate_id();
        let record = AnnotationRecord {
            id: Some(id),
            material_id: key.material,
            user_id: key.user,
            page_number: key.page,
            annotation_objects: payload,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub(crate) fn update(
        &mut self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
        payload: String,
        now: DateTime<Utc>,
    ) -> AppResult<AnnotationRecord> {
        if payload.trim().is_empty() {
            return Err(AppError::invalid_argument("annotation objects are required"));
        }
        let record = self
            .records
            .iter_mut()
            .find(|record| owned_by(record, material, user, id))
            .ok_or_else(|| not_accessible(id))?;
        record.annotation_objects = payload;
        record.updated_at = Some(now);
        Ok(record.clone())
    }

    pub(crate) fn delete(
        &mut self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
    ) -> AppResult<()> {
        let index = self
            .records
            .iter()
            .position(|record| owned_by(record, material, user, id))
            .ok_or_else(|| not_accessible(id))?;
        self.records.remove(index);
        Ok(())
    }

    fn allocate_id(&mut self) -> RecordId {
        let floor = self
            .records
            .iter()
            .filter_map(|record| record.id)
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(floor).saturating_add(1);
        RecordId(self.next_id)
    }
}

fn owned_by(record: &AnnotationRecord, material: MaterialId, user: UserId, id: RecordId) -> bool {
    record.id == Some(id) && record.material_id == material && record.user_id == user
}

fn not_accessible(id: RecordId) -> AppError {
    AppError::not_found(format!("annotation {id} does not exist or is not accessible"))
}
