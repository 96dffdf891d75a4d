use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::annotation::{
    AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId,
};
use crate::error::{AppError, AppResult};

use super::AnnotationStore;
use super::table::RecordTable;

/// Records kept in a single JSON file. Every mutation is applied to a copy of
/// the table, written out, and only then committed.
///
/// Table access runs on the blocking pool; the lock is held across the write
/// so mutations reach the file in the order they were applied.
#[derive(Debug, Clone)]
pub struct FileAnnotationStore {
    file: Arc<TableFile>,
}

#[derive(Debug)]
struct TableFile {
    path: PathBuf,
    table: Mutex<RecordTable>,
}

impl FileAnnotationStore {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let table = if path.exists() {
            if !path.is_file() {
                return Err(AppError::invalid_argument(format!(
                    "annotation store path is not a regular file: {}",
                    path.display()
                )));
            }
            let raw = fs::read_to_string(path).map_err(|source| {
                AppError::io_with_context(
                    source,
                    format!("failed to read annotation store: {}", path.display()),
                )
            })?;
            serde_json::from_str::<RecordTable>(&raw).map_err(|source| {
                AppError::invalid_argument(format!(
                    "failed to parse annotation store {}: {source}",
                    path.display()
                ))
            })?
        } else {
            RecordTable::default()
        };

        log::debug!(
            "opened annotation store {} ({} records)",
            path.display(),
            table.len()
        );
        Ok(Self {
            file: Arc::new(TableFile {
                path: path.to_path_buf(),
                table: Mutex::new(table),
            }),
        })
    }

    async fn blocking<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&TableFile) -> AppResult<T> + Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || call(&file))
            .await
            .map_err(|err| AppError::persistence(operation, format!("worker failed: {err}")))?
    }
}

impl TableFile {
    fn read<T>(&self, f: impl FnOnce(&RecordTable) -> T) -> AppResult<T> {
        let table = self
            .table
            .lock()
            .map_err(|_| AppError::persistence("lock", "annotation table is poisoned"))?;
        Ok(f(&table))
    }

    fn mutate<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut RecordTable) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut table = self
            .table
            .lock()
            .map_err(|_| AppError::persistence("lock", "annotation table is poisoned"))?;
        let mut next = table.clone();
        let value = f(&mut next)?;
        self.write(&next)
            .map_err(|err| AppError::persistence(operation, err.to_string()))?;
        *table = next;
        Ok(value)
    }

    fn write(&self, table: &RecordTable) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| {
                AppError::io_with_context(
                    source,
                    format!("failed to create directory: {}", parent.display()),
                )
            })?;
        }

        let raw = serde_json::to_string_pretty(table).map_err(|err| {
            AppError::invalid_argument(format!("failed to encode annotation store: {err}"))
        })?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw).map_err(|source| {
            AppError::io_with_context(
                source,
                format!("failed to write annotation store: {}", staging.display()),
            )
        })?;
        fs::rename(&staging, &self.path).map_err(|source| {
            AppError::io_with_context(
                source,
                format!("failed to replace annotation store: {}", self.path.display()),
            )
        })
    }
}

impl AnnotationStore for FileAnnotationStore {
    async fn list(
        &self,
        material: MaterialId,
        user: UserId,
        page: Option<PageNumber>,
    ) -> AppResult<Vec<AnnotationRecord>> {
        self.blocking("fetch", move |file| {
            file.read(|table| table.list(material, user, page))
        })
        .await
    }

    async fn save(&self, key: AnnotationKey, payload: String) -> AppResult<AnnotationRecord> {
        self.blocking("save", move |file| {
            file.mutate("save", |table| table.upsert(key, payload, Utc::now()))
        })
        .await
    }

    async fn update(
        &self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
        payload: String,
    ) -> AppResult<AnnotationRecord> {
        self.blocking("update", move |file| {
            file.mutate("update", |table| {
                table.update(material, user, id, payload, Utc::now())
            })
        })
        .await
    }

    async fn delete(&self, material: MaterialId, user: UserId, id: RecordId) -> AppResult<()> {
        self.blocking("delete", move |file| {
            file.mutate("delete", |table| table.delete(material, user, id))
        })
        .await
    }
}
