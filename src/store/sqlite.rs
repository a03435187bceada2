use super::types::{Category, LinkRecord, SortOrder, StoredLink};
use super::WriteStore;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Schema applied to a fresh database when no schema file is configured.
pub const BUNDLED_SCHEMA: &str = include_str!("../../schema/base.sql");

/// Hard cap on rows returned by a single listing.
pub const MAX_LIST_LIMIT: usize = 1000;

/// SQLite-backed link store.
///
/// Both the main application (fallback path) and the ingestion service open
/// their own store over the same file. Every write is a single autocommitted
/// statement and WAL mode lets the two processes interleave safely.
#[derive(Clone)]
pub struct SqliteLinkStore {
    db_path: PathBuf,
    conn: Connection,
}

impl SqliteLinkStore {
    /// Open the database at `config.path`, provisioning the schema if the
    /// `links` table does not exist yet.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let db_path = config.path.clone();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating database directory {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path).await?;

        conn.call(|conn: &mut rusqlite::Connection| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await?;

        let store = Self { db_path, conn };
        store.provision(config.schema.as_deref()).await?;
        Ok(store)
    }

    /// In-memory store with the bundled schema.
    pub async fn new_ephemeral() -> Result<Self> {
        let conn = Connection::open(":memory:").await?;

        conn.call(|conn: &mut rusqlite::Connection| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await?;

        let store = Self {
            db_path: PathBuf::from(":memory:"),
            conn,
        };
        store.provision(None).await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn provision(&self, schema_file: Option<&Path>) -> Result<()> {
        let provisioned: bool = self
            .conn
            .call(
                |conn: &mut rusqlite::Connection| -> tokio_rusqlite::Result<bool> {
                    Ok(conn.query_row(
                        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='links'",
                        [],
                        |row| row.get(0),
                    )?)
                },
            )
            .await?;

        if provisioned {
            debug!("Using existing database {}", self.db_path.display());
            return Ok(());
        }

        let schema = match schema_file {
            Some(path) => {
                info!(
                    "Provisioning {} from {}",
                    self.db_path.display(),
                    path.display()
                );
                std::fs::read_to_string(path).map_err(|e| {
                    Error::Schema(format!(
                        "cannot read schema file '{}': {}",
                        path.display(),
                        e
                    ))
                })?
            }
            None => {
                info!("Provisioning {} from bundled schema", self.db_path.display());
                BUNDLED_SCHEMA.to_string()
            }
        };

        self.conn
            .call(move |conn: &mut rusqlite::Connection| {
                let tx = conn.transaction()?;
                tx.execute_batch(&schema)?;
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Most recent links first (or oldest first), at most `limit` rows.
    pub async fn recent(&self, order: SortOrder, limit: usize) -> Result<Vec<StoredLink>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT) as i64;
        let sql = format!(
            "SELECT id, date, description, url, type, icon FROM links ORDER BY date {0}, id {0} LIMIT ?1",
            order.as_sql()
        );

        self.conn
            .call(move |conn: &mut rusqlite::Connection| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params![limit], |row| {
                    Ok(StoredLink {
                        id: row.get(0)?,
                        date: row.get(1)?,
                        description: row.get(2)?,
                        url: row.get(3)?,
                        type_id: row.get(4)?,
                        icon: row.get(5)?,
                    })
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.conn
            .call(|conn: &mut rusqlite::Connection| {
                let mut stmt = conn.prepare("SELECT id, name FROM type ORDER BY id")?;
                let rows = stmt.query_map([], |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .call(|conn: &mut rusqlite::Connection| {
                Ok(conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?)
            })
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Names of all user tables.
    pub async fn tables(&self) -> Result<Vec<String>> {
        self.conn
            .call(|conn: &mut rusqlite::Connection| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Cheap round trip used by the liveness endpoint.
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .call(|conn: &mut rusqlite::Connection| {
                conn.query_row("SELECT 1 FROM links LIMIT 1", [], |_| Ok(()))
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(()),
                        other => Err(other),
                    })?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl WriteStore for SqliteLinkStore {
    #[tracing::instrument(skip(self, record), fields(url = %record.url))]
    async fn insert(&self, record: LinkRecord) -> Result<i64> {
        let date = record.timestamp_string();
        let LinkRecord {
            description,
            url,
            type_id,
            icon,
            ..
        } = record;

        let id = self
            .conn
            .call(move |conn: &mut rusqlite::Connection| {
                conn.execute(
                    "INSERT INTO links (date, description, url, type, icon) VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![&date, &description, &url, type_id, &icon],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        debug!("Inserted link {}", id);
        Ok(id)
    }
}
