//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::{migration, Migratable};
use async_trait::async_trait;
use linkbase_core::limits::labels_match;
use linkbase_core::{
    Direction, Edge, EdgeId, GraphCounts, GraphStore, Node, NodeId, Result,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task;

/// Bound parameters per `IN (...)` lookup
const ID_CHUNK: usize = 500;

/// Only the edge uniqueness index turns an insert into a no-op; NOT NULL
/// and foreign key failures still raise.
const INSERT_EDGE_SQL: &str = "INSERT INTO edges (source_id, target_id, label) \
     VALUES (?1, ?2, ?3) ON CONFLICT DO NOTHING";

/// SQLite storage backend
///
/// One connection behind a mutex; every call runs on the blocking pool.
/// Writes use `BEGIN IMMEDIATE` so lookup and insert happen under the
/// database write lock, also across processes sharing the file.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON; \
             PRAGMA busy_timeout = 5000;",
        )?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        store.migrate_to_latest()?;

        tracing::debug!(
            "Opened SQLite store at {}",
            store
                .path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string())
        );
        Ok(store)
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("Lock error: {}", e)))
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StorageError::Connection(format!("Lock error: {}", e)))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StorageError::Connection(format!("Blocking task failed: {}", e)))?
    }

    /// CREATE statements for every table and index, with column listings
    pub async fn schema(&self) -> StorageResult<String> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT type, name, sql FROM sqlite_master \
                 WHERE name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
                 ORDER BY type DESC, name",
            )?;
            let objects = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut out = String::new();
            for (kind, name, sql) in objects {
                out.push_str(&format!("-- {} {}\n{};\n", kind, name, sql.trim()));
                if kind == "table" {
                    let mut cols = conn.prepare("SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1)")?;
                    let columns = cols
                        .query_map(params![name], |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, bool>(2)?,
                                row.get::<_, i64>(3)?,
                            ))
                        })?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    for (col, ty, not_null, pk) in columns {
                        out.push_str(&format!(
                            "--   {} {}{}{}\n",
                            col,
                            ty,
                            if not_null { " NOT NULL" } else { "" },
                            if pk > 0 { " PRIMARY KEY" } else { "" }
                        ));
                    }
                }
                out.push('\n');
            }
            Ok(out.trim_end().to_string())
        })
        .await
    }
}

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: NodeId(row.get(0)?),
        name: row.get(1)?,
        label: row.get(2)?,
    })
}

fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
    Ok(Edge {
        id: EdgeId(row.get(0)?),
        source_id: NodeId(row.get(1)?),
        target_id: NodeId(row.get(2)?),
        label: row.get(3)?,
    })
}

impl Migratable for SqliteStore {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self.lock()?;
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        let step = migration(version)
            .ok_or_else(|| StorageError::Migration(format!("Unknown schema version {}", version)))?;
        let conn = self.lock()?;
        conn.execute_batch(step.sql)
            .map_err(|e| StorageError::Migration(format!("v{} ({}): {}", version, step.description, e)))?;
        Ok(())
    }
}

#[async_trait]
impl GraphStore for SqliteStore {
    async fn initialize(&self) -> Result<()> {
        self.migrate_to_latest()?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch("PRAGMA optimize;")?;
            Ok(())
        })
        .await?;
        tracing::debug!("SQLite store closed");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let ok = self
            .with_conn(|conn| {
                let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
                Ok(one == 1)
            })
            .await?;
        Ok(ok)
    }

    async fn find_node_by_name(&self, name: &str) -> Result<Option<Node>> {
        let name = name.to_string();
        let node = self
            .with_conn(move |conn| {
                let node = conn
                    .query_row(
                        "SELECT id, name, label FROM nodes WHERE name = ?1",
                        params![name],
                        node_from_row,
                    )
                    .optional()?;
                Ok(node)
            })
            .await?;
        Ok(node)
    }

    async fn upsert_node(&self, name: &str, label: Option<&str>) -> Result<NodeId> {
        let name = name.to_string();
        let label = label.map(str::to_string);

        let id = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let existing = tx
                    .query_row(
                        "SELECT id, name, label FROM nodes WHERE name = ?1",
                        params![name],
                        node_from_row,
                    )
                    .optional()?;

                let id = match existing {
                    Some(node) => {
                        if let Some(label) = label.as_deref() {
                            if !labels_match(node.label.as_deref(), Some(label)) {
                                tx.execute(
                                    "UPDATE nodes SET label = ?1 WHERE id = ?2",
                                    params![label, node.id.0],
                                )?;
                                tracing::info!(
                                    "Updated label of node '{}' from {:?} to {:?}",
                                    name,
                                    node.label,
                                    label
                                );
                            }
                        }
                        node.id
                    }
                    None => {
                        tx.execute(
                            "INSERT INTO nodes (name, label) VALUES (?1, ?2)",
                            params![name, label],
                        )?;
                        let id = tx
                            .query_row(
                                "SELECT id FROM nodes WHERE name = ?1",
                                params![name],
                                |row| row.get::<_, i64>(0),
                            )
                            .optional()?
                            .ok_or_else(|| StorageError::MissingAfterWrite(format!("node '{}'", name)))?;
                        tracing::info!("Created node '{}' with id {}", name, id);
                        NodeId(id)
                    }
                };

                tx.commit()?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    async fn nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<Node>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let nodes = self
            .with_conn(move |conn| {
                let mut nodes = Vec::with_capacity(ids.len());
                for chunk in ids.chunks(ID_CHUNK) {
                    let placeholders = vec!["?"; chunk.len()].join(", ");
                    let sql = format!(
                        "SELECT id, name, label FROM nodes WHERE id IN ({}) ORDER BY id",
                        placeholders
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(params_from_iter(chunk.iter()), node_from_row)?;
                    for row in rows {
                        nodes.push(row?);
                    }
                }
                Ok(nodes)
            })
            .await?;
        Ok(nodes)
    }

    async fn all_nodes(&self) -> Result<Vec<Node>> {
        let nodes = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare("SELECT id, name, label FROM nodes ORDER BY id")?;
                let nodes = stmt
                    .query_map([], node_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(nodes)
            })
            .await?;
        Ok(nodes)
    }

    async fn upsert_edge(
        &self,
        source: NodeId,
        target: NodeId,
        label: Option<&str>,
    ) -> Result<EdgeId> {
        let label = label.map(str::to_string);

        let id = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let inserted =
                    tx.execute(INSERT_EDGE_SQL, params![source.0, target.0, label])?;

                // `IS` matches NULL against NULL, so an unlabeled edge is found too.
                let id = tx
                    .query_row(
                        "SELECT id FROM edges WHERE source_id = ?1 AND target_id = ?2 AND label IS ?3",
                        params![source.0, target.0, label],
                        |row| row.get::<_, i64>(0),
                    )
                    .optional()?
                    .ok_or_else(|| {
                        StorageError::MissingAfterWrite(format!(
                            "edge {} -> {} ({:?})",
                            source, target, label
                        ))
                    })?;

                tx.commit()?;

                if inserted > 0 {
                    tracing::info!("Created edge {} -> {} ({:?}) with id {}", source, target, label, id);
                } else {
                    tracing::debug!("Edge {} -> {} ({:?}) already exists as {}", source, target, label, id);
                }
                Ok(EdgeId(id))
            })
            .await?;
        Ok(id)
    }

    async fn edges_for_node(&self, node: NodeId, direction: Direction) -> Result<Vec<Edge>> {
        let sql = match direction {
            Direction::Outgoing => {
                "SELECT id, source_id, target_id, label FROM edges WHERE source_id = ?1 ORDER BY id"
            }
            Direction::Incoming => {
                "SELECT id, source_id, target_id, label FROM edges WHERE target_id = ?1 ORDER BY id"
            }
            Direction::Both => {
                "SELECT id, source_id, target_id, label FROM edges \
                 WHERE source_id = ?1 OR target_id = ?1 ORDER BY id"
            }
        };

        let edges = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare_cached(sql)?;
                let edges = stmt
                    .query_map(params![node.0], edge_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(edges)
            })
            .await?;
        Ok(edges)
    }

    async fn all_edges(&self) -> Result<Vec<Edge>> {
        let edges = self
            .with_conn(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, source_id, target_id, label FROM edges ORDER BY id")?;
                let edges = stmt
                    .query_map([], edge_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(edges)
            })
            .await?;
        Ok(edges)
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let counts = self
            .with_conn(|conn| {
                let nodes: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
                let edges: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
                Ok(GraphCounts {
                    nodes: nodes as u64,
                    edges: edges as u64,
                })
            })
            .await?;
        Ok(counts)
    }
}
