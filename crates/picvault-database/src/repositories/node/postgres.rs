//! PostgreSQL node repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use picvault_core::config::DatabaseConfig;
use picvault_core::error::{AppError, ErrorKind};
use picvault_core::result::AppResult;
use picvault_core::types::NodeId;
use picvault_entity::node::{ListFilter, MAX_TREE_DEPTH, NewNode, Node};

use super::{NodeRepository, ensure_depth, node_not_found, renamed_path, require_parent_folder};

const ORDER_BY: &str = "ORDER BY is_folder DESC, name COLLATE \"C\" ASC, created_at ASC, id ASC";

/// SQLSTATE codes that indicate a concurrent writer rather than a bug.
const CONFLICT_CODES: &[&str] = &["40001", "40P01", "23503", "55P03", "57014"];

/// Map a sqlx error, surfacing lock and serialization failures as `Conflict`.
pub fn map_sqlx_error(context: &str, e: sqlx::Error) -> AppError {
    let conflict = match &e {
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| CONFLICT_CODES.contains(&code.as_ref())),
        _ => false,
    };
    if conflict {
        AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: the tree was modified concurrently, retry the request"),
            e,
        )
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), e)
    }
}

#[derive(FromRow)]
struct SubtreeRow {
    #[sqlx(flatten)]
    node: Node,
    depth: i32,
}

/// Node repository over the `nodes` table.
#[derive(Debug, Clone)]
pub struct PgNodeRepository {
    pool: PgPool,
    statement_timeout_ms: u64,
    lock_timeout_ms: u64,
}

impl PgNodeRepository {
    /// Create a repository using the timeouts from `config`.
    pub fn new(pool: PgPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            statement_timeout_ms: config.statement_timeout_ms,
            lock_timeout_ms: config.lock_timeout_ms,
        }
    }

    /// Open a write transaction serialized per owner.
    async fn begin(&self, owner_id: &str) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout_ms
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to set statement timeout", e))?;

        sqlx::query(&format!("SET LOCAL lock_timeout = {}", self.lock_timeout_ms))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to set lock timeout", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to acquire owner lock", e))?;

        Ok(tx)
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    async fn lock_node(
        tx: &mut Transaction<'static, Postgres>,
        owner_id: &str,
        id: NodeId,
    ) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE id = $1 AND owner_id = $2 FOR UPDATE")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to load node", e))
    }

    /// Ids on the chain from `id` upward, bounded by the depth limit.
    async fn chain_ids(
        tx: &mut Transaction<'static, Postgres>,
        owner_id: &str,
        id: NodeId,
    ) -> AppResult<Vec<NodeId>> {
        sqlx::query_scalar::<_, NodeId>(
            "WITH RECURSIVE chain AS ( \
                SELECT id, parent_id, 1 AS depth FROM nodes WHERE id = $1 AND owner_id = $2 \
                UNION ALL \
                SELECT n.id, n.parent_id, c.depth + 1 FROM nodes n \
                INNER JOIN chain c ON n.id = c.parent_id \
                WHERE n.owner_id = $2 AND c.depth < $3 \
             ) SELECT id FROM chain ORDER BY depth ASC",
        )
        .bind(id)
        .bind(owner_id)
        .bind(MAX_TREE_DEPTH as i32)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to walk ancestors", e))
    }

    /// Depth of the deepest descendant below `root` (0 for a leaf).
    async fn subtree_height(
        tx: &mut Transaction<'static, Postgres>,
        owner_id: &str,
        root: NodeId,
    ) -> AppResult<usize> {
        let height = sqlx::query_scalar::<_, i32>(
            "WITH RECURSIVE subtree AS ( \
                SELECT id, 0 AS depth FROM nodes WHERE id = $1 AND owner_id = $2 \
                UNION ALL \
                SELECT n.id, s.depth + 1 FROM nodes n INNER JOIN subtree s ON n.parent_id = s.id \
                WHERE n.owner_id = $2 \
             ) SELECT COALESCE(MAX(depth), 0)::INT4 FROM subtree",
        )
        .bind(root)
        .bind(owner_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to measure subtree", e))?;
        Ok(usize::try_from(height).unwrap_or(0))
    }

    async fn rebase_descendants(
        tx: &mut Transaction<'static, Postgres>,
        owner_id: &str,
        root: NodeId,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "WITH RECURSIVE subtree AS ( \
                SELECT id FROM nodes WHERE parent_id = $1 AND owner_id = $2 \
                UNION ALL \
                SELECT n.id FROM nodes n INNER JOIN subtree s ON n.parent_id = s.id \
                WHERE n.owner_id = $2 \
             ) UPDATE nodes SET path = $3 || substr(path, $4), updated_at = NOW() \
             WHERE id IN (SELECT id FROM subtree)",
        )
        .bind(root)
        .bind(owner_id)
        .bind(new_prefix)
        .bind(old_prefix.chars().count() as i32 + 1)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to rewrite descendant paths", e))?;
        Ok(result.rows_affected())
    }

    async fn fetch_listing(&self, sql: String, owner_id: &str) -> AppResult<Vec<Node>> {
        sqlx::query_as::<_, Node>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list nodes", e))
    }
}

#[async_trait]
impl NodeRepository for PgNodeRepository {
    fn provider_type(&self) -> &str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| map_sqlx_error("Health check failed", e))
    }

    async fn find_by_id(&self, owner_id: &str, id: NodeId) -> AppResult<Option<Node>> {
        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find node", e))
    }

    async fn list_children(
        &self,
        owner_id: &str,
        parent_id: Option<NodeId>,
        filter: ListFilter,
    ) -> AppResult<Vec<Node>> {
        let flags = match filter {
            ListFilter::Active => "NOT is_trashed",
            ListFilter::Starred => "is_starred AND NOT is_trashed",
            ListFilter::Trashed => "is_trashed",
        };
        let sql = format!(
            "SELECT * FROM nodes WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND {flags} {ORDER_BY}"
        );
        sqlx::query_as::<_, Node>(&sql)
            .bind(owner_id)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list children", e))
    }

    async fn list_starred(&self, owner_id: &str) -> AppResult<Vec<Node>> {
        self.fetch_listing(
            format!("SELECT * FROM nodes WHERE owner_id = $1 AND is_starred AND NOT is_trashed {ORDER_BY}"),
            owner_id,
        )
        .await
    }

    async fn list_trash_roots(&self, owner_id: &str) -> AppResult<Vec<Node>> {
        self.fetch_listing(
            String::from(
                "SELECT n.* FROM nodes n LEFT JOIN nodes p ON p.id = n.parent_id \
                 WHERE n.owner_id = $1 AND n.is_trashed AND (p.id IS NULL OR NOT p.is_trashed) \
                 ORDER BY n.is_folder DESC, n.name COLLATE \"C\" ASC, n.created_at ASC, n.id ASC",
            ),
            owner_id,
        )
        .await
    }

    async fn ancestors(&self, owner_id: &str, id: NodeId) -> AppResult<Vec<Node>> {
        let rows = sqlx::query_as::<_, SubtreeRow>(
            "WITH RECURSIVE chain AS ( \
                SELECT n.*, 0 AS depth FROM nodes n WHERE n.id = $1 AND n.owner_id = $2 \
                UNION ALL \
                SELECT n.*, c.depth + 1 FROM nodes n \
                INNER JOIN chain c ON n.id = c.parent_id \
                WHERE n.owner_id = $2 AND c.depth < $3 \
             ) SELECT * FROM chain ORDER BY depth DESC",
        )
        .bind(id)
        .bind(owner_id)
        .bind(MAX_TREE_DEPTH as i32 - 1)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find ancestors", e))?;

        if rows.is_empty() {
            return Err(node_not_found(id));
        }
        Ok(rows.into_iter().map(|r| r.node).collect())
    }

    async fn insert(&self, new: NewNode) -> AppResult<Node> {
        let mut tx = self.begin(&new.owner_id).await?;

        let path = match new.parent_id {
            Some(parent_id) => {
                let parent = require_parent_folder(
                    Self::lock_node(&mut tx, &new.owner_id, parent_id).await?,
                    parent_id,
                )?;
                ensure_depth(Self::chain_ids(&mut tx, &new.owner_id, parent_id).await?.len(), 0)?;
                Node::child_path(Some(&parent), &new.name)
            }
            None => Node::child_path(None, &new.name),
        };
        let node = new.into_node(path);

        let inserted = sqlx::query_as::<_, Node>(
            "INSERT INTO nodes (id, owner_id, parent_id, name, path, size_bytes, content_type, \
             storage_url, thumbnail_url, storage_key, is_folder, is_starred, is_trashed, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        )
        .bind(node.id)
        .bind(&node.owner_id)
        .bind(node.parent_id)
        .bind(&node.name)
        .bind(&node.path)
        .bind(node.size_bytes)
        .bind(&node.content_type)
        .bind(&node.storage_url)
        .bind(&node.thumbnail_url)
        .bind(&node.storage_key)
        .bind(node.is_folder)
        .bind(node.is_starred)
        .bind(node.is_trashed)
        .bind(node.created_at)
        .bind(node.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to insert node", e))?;

        Self::commit(tx).await?;
        debug!(node_id = %inserted.id, path = %inserted.path, "Inserted node");
        Ok(inserted)
    }

    async fn toggle_star(&self, owner_id: &str, id: NodeId) -> AppResult<Node> {
        let mut tx = self.begin(owner_id).await?;
        let starred = sqlx::query_as::<_, Node>(
            "UPDATE nodes SET is_starred = NOT is_starred, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to toggle star", e))?
        .ok_or_else(|| node_not_found(id))?;
        Self::commit(tx).await?;
        Ok(starred)
    }

    async fn set_trashed(&self, owner_id: &str, id: NodeId, trashed: bool) -> AppResult<Node> {
        let mut tx = self.begin(owner_id).await?;
        let node = Self::lock_node(&mut tx, owner_id, id)
            .await?
            .ok_or_else(|| node_not_found(id))?;

        if !trashed {
            if let Some(parent_id) = node.parent_id {
                let parent = Self::lock_node(&mut tx, owner_id, parent_id).await?;
                if parent.is_some_and(|p| p.is_trashed) {
                    return Err(AppError::invalid_operation(format!(
                        "Cannot restore {id} while its parent folder is in the trash"
                    )));
                }
            }
        }

        let affected = sqlx::query(
            "WITH RECURSIVE subtree AS ( \
                SELECT id FROM nodes WHERE id = $1 AND owner_id = $2 \
                UNION ALL \
                SELECT n.id FROM nodes n INNER JOIN subtree s ON n.parent_id = s.id \
                WHERE n.owner_id = $2 \
             ) UPDATE nodes SET is_trashed = $3, updated_at = NOW() \
             WHERE id IN (SELECT id FROM subtree)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(trashed)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to update trash state", e))?
        .rows_affected();

        let updated = Self::lock_node(&mut tx, owner_id, id)
            .await?
            .ok_or_else(|| node_not_found(id))?;
        Self::commit(tx).await?;
        debug!(node_id = %id, trashed, affected, "Updated trash state");
        Ok(updated)
    }

    async fn move_node(
        &self,
        owner_id: &str,
        id: NodeId,
        new_parent_id: Option<NodeId>,
    ) -> AppResult<Node> {
        let mut tx = self.begin(owner_id).await?;
        let node = Self::lock_node(&mut tx, owner_id, id)
            .await?
            .ok_or_else(|| node_not_found(id))?;
        if node.is_trashed {
            return Err(AppError::invalid_operation(format!(
                "Cannot move {id} while it is in the trash"
            )));
        }

        let new_path = match new_parent_id {
            Some(parent_id) => {
                if parent_id == id {
                    return Err(AppError::invalid_operation("Cannot move a folder into itself"));
                }
                let parent = require_parent_folder(
                    Self::lock_node(&mut tx, owner_id, parent_id).await?,
                    parent_id,
                )?;
                let chain = Self::chain_ids(&mut tx, owner_id, parent_id).await?;
                if chain.contains(&id) {
                    return Err(AppError::invalid_operation(
                        "Cannot move a folder into one of its descendants",
                    ));
                }
                let height = Self::subtree_height(&mut tx, owner_id, id).await?;
                ensure_depth(chain.len(), height)?;
                Node::child_path(Some(&parent), &node.name)
            }
            None => Node::child_path(None, &node.name),
        };

        let moved = sqlx::query_as::<_, Node>(
            "UPDATE nodes SET parent_id = $3, path = $4, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(new_parent_id)
        .bind(&new_path)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to move node", e))?;

        let rewritten =
            Self::rebase_descendants(&mut tx, owner_id, id, &node.path, &new_path).await?;
        Self::commit(tx).await?;
        debug!(node_id = %id, path = %moved.path, rewritten, "Moved node");
        Ok(moved)
    }

    async fn rename(&self, owner_id: &str, id: NodeId, name: &str) -> AppResult<Node> {
        let mut tx = self.begin(owner_id).await?;
        let node = Self::lock_node(&mut tx, owner_id, id)
            .await?
            .ok_or_else(|| node_not_found(id))?;
        let new_path = renamed_path(&node.path, name);

        let renamed = sqlx::query_as::<_, Node>(
            "UPDATE nodes SET name = $3, path = $4, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .bind(&new_path)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to rename node", e))?;

        Self::rebase_descendants(&mut tx, owner_id, id, &node.path, &new_path).await?;
        Self::commit(tx).await?;
        Ok(renamed)
    }

    async fn delete_subtree(&self, owner_id: &str, id: NodeId) -> AppResult<Vec<Node>> {
        let mut tx = self.begin(owner_id).await?;
        let rows = sqlx::query_as::<_, SubtreeRow>(
            "WITH RECURSIVE subtree AS ( \
                SELECT n.*, 0 AS depth FROM nodes n WHERE n.id = $1 AND n.owner_id = $2 \
                UNION ALL \
                SELECT n.*, s.depth + 1 FROM nodes n INNER JOIN subtree s ON n.parent_id = s.id \
                WHERE n.owner_id = $2 \
             ) SELECT * FROM subtree ORDER BY depth DESC",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to load subtree", e))?;

        if rows.is_empty() {
            return Err(node_not_found(id));
        }
        if rows.iter().any(|r| !r.node.is_trashed) {
            return Err(AppError::invalid_operation(format!(
                "Node {id} and all of its contents must be in the trash before deletion"
            )));
        }

        // One statement per depth level, deepest first, keeps the
        // parent_id foreign key satisfied after every statement.
        for level in rows.chunk_by(|a, b| a.depth == b.depth) {
            let ids: Vec<Uuid> = level.iter().map(|r| r.node.id.into_uuid()).collect();
            Self::delete_ids(&mut tx, owner_id, &ids).await?;
        }

        Self::commit(tx).await?;
        Ok(rows.into_iter().map(|r| r.node).collect())
    }
}

impl PgNodeRepository {
    async fn delete_ids(
        tx: &mut Transaction<'static, Postgres>,
        owner_id: &str,
        ids: &[Uuid],
    ) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM nodes WHERE id = ANY($1) AND owner_id = $2")
            .bind(ids)
            .bind(owner_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete nodes", e))?;
        Ok(())
    }
}
