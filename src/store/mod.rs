use std::future::Future;

use crate::annotation::{
    AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId,
};
use crate::error::AppResult;

mod file;
mod http;
mod memory;
mod table;

pub use file::FileAnnotationStore;
pub use http::HttpAnnotationStore;
pub use memory::MemoryAnnotationStore;

/// Persistence for annotation records, keyed by (material, user, page).
///
/// Implementations are authoritative for uniqueness: `save` decides between
/// creating and updating, whatever the caller believes already exists.
pub trait AnnotationStore: Send + Sync + 'static {
    /// Records of `user` for `material`, ordered by page number.
    fn list(
        &self,
        material: MaterialId,
        user: UserId,
        page: Option<PageNumber>,
    ) -> impl Future<Output = AppResult<Vec<AnnotationRecord>>> + Send;

    /// Creates the record for `key` or replaces its content in place.
    fn save(
        &self,
        key: AnnotationKey,
        payload: String,
    ) -> impl Future<Output = AppResult<AnnotationRecord>> + Send;

    fn update(
        &self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
        payload: String,
    ) -> impl Future<Output = AppResult<AnnotationRecord>> + Send;

    fn delete(
        &self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
    ) -> impl Future<Output = AppResult<()>> + Send;

    fn fetch_for_page(
        &self,
        key: AnnotationKey,
    ) -> impl Future<Output = AppResult<Option<AnnotationRecord>>> + Send {
        async move {
            let records = self.list(key.material, key.user, Some(key.page)).await?;
            Ok(first_for_page(key, records))
        }
    }
}

pub(crate) fn first_for_page(
    key: AnnotationKey,
    records: Vec<AnnotationRecord>,
) -> Option<AnnotationRecord> {
    let mut matches = records
        .into_iter()
        .filter(|record| record.page_number == key.page);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        log::warn!(
            "{extra} duplicate annotation record(s) for {key}; using record {:?}",
            first.id
        );
    }
    Some(first)
}
