use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, ShelfError};
use crate::forest::{find_folder, parent_trail};
use crate::models::{BreadcrumbState, FolderItem, RestoreSource, RestoredPath};

pub const SELECTED_FOLDER_KEY: &str = "shelfmark.selected_folder_id";
pub const PATH_IDS_KEY: &str = "shelfmark.path_ids";

/// Small synchronous string key-value cache.
pub trait BreadcrumbCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryBreadcrumbCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBreadcrumbCache {
    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ShelfError::Internal("breadcrumb cache mutex poisoned".to_string()))?;
        Ok(f(&mut entries))
    }
}

impl BreadcrumbCache for MemoryBreadcrumbCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

/// Cache persisted in a SQLite `breadcrumb_kv` table.
#[derive(Clone)]
pub struct SqliteBreadcrumbCache {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteBreadcrumbCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBreadcrumbCache").finish_non_exhaustive()
    }
}

impl SqliteBreadcrumbCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS breadcrumb_kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ShelfError::Internal("sqlite mutex poisoned".to_string()))?;
        f(&conn)
    }
}

impl BreadcrumbCache for SqliteBreadcrumbCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM breadcrumb_kv WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r"
                INSERT INTO breadcrumb_kv(key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM breadcrumb_kv WHERE key = ?1", params![key])?;
            Ok(())
        })
    }
}

/// Saves and restores the breadcrumb trail.
///
/// Saves are ignored until the first [`PathPersistence::restore`] has run, so an empty startup
/// selection cannot overwrite the trail that is about to be restored.
#[derive(Debug)]
pub struct PathPersistence<C> {
    cache: C,
    restored: AtomicBool,
}

impl<C: BreadcrumbCache> PathPersistence<C> {
    pub const fn new(cache: C) -> Self {
        Self {
            cache,
            restored: AtomicBool::new(false),
        }
    }

    pub const fn cache(&self) -> &C {
        &self.cache
    }

    pub fn has_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }

    /// Returns `false` when the save was skipped because nothing has been restored yet.
    pub fn save(&self, selected_folder_id: Option<&str>, path_ids: &[String]) -> Result<bool> {
        if !self.has_restored() {
            tracing::debug!("breadcrumb save skipped before first restore");
            return Ok(false);
        }
        match selected_folder_id {
            Some(selected) => {
                self.cache.set(SELECTED_FOLDER_KEY, selected)?;
                self.cache
                    .set(PATH_IDS_KEY, &serde_json::to_string(path_ids)?)?;
            }
            None => self.clear()?,
        }
        Ok(true)
    }

    pub fn load(&self) -> Result<Option<BreadcrumbState>> {
        let Some(selected_folder_id) = self.cache.get(SELECTED_FOLDER_KEY)? else {
            return Ok(None);
        };
        let path_ids = match self.cache.get(PATH_IDS_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "cached breadcrumb path is not a json id list");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(Some(BreadcrumbState {
            selected_folder_id,
            path_ids,
        }))
    }

    /// Resolves the cached trail against a freshly built forest.
    ///
    /// Tries the selected id, then the deepest resolvable prefix of the cached path, then a
    /// parent walk from the deepest cached id that still resolves. A complete miss clears the
    /// cache and yields `None`.
    pub fn restore(&self, forest: &[FolderItem]) -> Result<Option<RestoredPath>> {
        self.restored.store(true, Ordering::SeqCst);
        let Some(state) = self.load()? else {
            return Ok(None);
        };

        let resolved = resolve(forest, &state);
        match &resolved {
            Some(restored) => {
                if restored.source != RestoreSource::Exact {
                    tracing::warn!(
                        cached = %state.selected_folder_id,
                        restored = %restored.selected.id,
                        source = ?restored.source,
                        "breadcrumb restored from fallback"
                    );
                }
                self.save(Some(&restored.selected.id), &restored.path_ids())?;
            }
            None => {
                tracing::warn!(cached = %state.selected_folder_id, "breadcrumb no longer resolves");
                self.clear()?;
            }
        }
        Ok(resolved)
    }

    fn clear(&self) -> Result<()> {
        self.cache.remove(SELECTED_FOLDER_KEY)?;
        self.cache.remove(PATH_IDS_KEY)
    }
}

fn resolve(forest: &[FolderItem], state: &BreadcrumbState) -> Option<RestoredPath> {
    if find_folder(forest, &state.selected_folder_id).is_some() {
        return restored_at(forest, &state.selected_folder_id, RestoreSource::Exact);
    }

    let prefix_len = state
        .path_ids
        .iter()
        .take_while(|id| find_folder(forest, id).is_some())
        .count();
    if prefix_len > 0 {
        return restored_at(forest, &state.path_ids[prefix_len - 1], RestoreSource::Prefix);
    }

    state
        .path_ids
        .iter()
        .rev()
        .find(|id| find_folder(forest, id).is_some())
        .and_then(|id| restored_at(forest, id, RestoreSource::ParentWalk))
}

fn restored_at(forest: &[FolderItem], id: &str, source: RestoreSource) -> Option<RestoredPath> {
    let trail = parent_trail(forest, id)?;
    let selected = (*trail.last()?).clone();
    Some(RestoredPath {
        selected,
        path: trail.into_iter().cloned().collect(),
        source,
    })
}
