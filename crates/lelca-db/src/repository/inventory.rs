//! # Inventory Repository
//!
//! Database operations for the inventory collection.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Inventory Store Contract                             │
//! │                                                                         │
//! │  • update / bulk_update / adjust_quantity stamp last_updated on        │
//! │    touched rows only; untouched rows are never rewritten               │
//! │  • delete of a missing id is a no-op, not an error                     │
//! │  • insert / insert_many accept an optional QrEncoder; a missing or     │
//! │    failing encoder degrades to "item saved without a code"             │
//! │  • bulk operations run in one SQL transaction                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lelca_core::qr::{QrEncoder, QrPayload};
use lelca_core::validation::validate_new_item;
use lelca_core::{CoreError, InventoryItem, NewInventoryItem, ValidationError};

// =============================================================================
// Patch Types
// =============================================================================

/// Partial update for an inventory item. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct InventoryItemPatch {
    pub item_name: Option<String>,
    pub material_details: Option<String>,
    pub quantity: Option<i64>,
    pub price_cents: Option<i64>,
    pub qr_code: Option<String>,
    pub image: Option<String>,
}

impl InventoryItemPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.item_name {
            lelca_core::validation::validate_item_name(name)?;
        }
        if let Some(quantity) = self.quantity {
            lelca_core::validation::validate_quantity(quantity)?;
        }
        if let Some(price_cents) = self.price_cents {
            lelca_core::validation::validate_price_cents(price_cents)?;
        }
        Ok(())
    }
}

/// One entry in a bulk update batch.
#[derive(Debug, Clone)]
pub struct BulkUpdate {
    pub id: String,
    pub patch: InventoryItemPatch,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for inventory database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InventoryRepository::new(pool);
///
/// let item = repo.insert(fields, None).await?;
/// repo.adjust_quantity(&item.id, -3).await?; // checkout deduction
/// repo.adjust_quantity(&item.id, 3).await?;  // restock
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Lists the whole inventory, oldest additions first.
    pub async fn list(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, item_name, material_details, quantity, price_cents,
                   qr_code, image, date_added, last_updated
            FROM inventory_items
            ORDER BY date_added, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, item_name, material_details, quantity, price_cents,
                   qr_code, image, date_added, last_updated
            FROM inventory_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a new item built from user-supplied fields.
    ///
    /// Validates the fields, constructs the item through the factory,
    /// and attaches a QR code when an encoder is available. Encoder
    /// absence or failure never fails the insert.
    pub async fn insert(
        &self,
        fields: NewInventoryItem,
        qr: Option<&dyn QrEncoder>,
    ) -> DbResult<InventoryItem> {
        let item = build_item(fields, qr)?;

        debug!(id = %item.id, name = %item.item_name, "Inserting inventory item");

        insert_row(&self.pool, &item).await?;

        Ok(item)
    }

    /// Inserts a batch of items (bulk import) in one transaction.
    ///
    /// All rows validate before anything is written; a bad row fails
    /// the whole batch.
    pub async fn insert_many(
        &self,
        rows: Vec<NewInventoryItem>,
        qr: Option<&dyn QrEncoder>,
    ) -> DbResult<Vec<InventoryItem>> {
        let mut items = Vec::with_capacity(rows.len());
        for fields in rows {
            items.push(build_item(fields, qr)?);
        }

        debug!(count = items.len(), "Bulk inserting inventory items");

        let mut tx = self.pool.begin().await?;
        for item in &items {
            insert_row(&mut *tx, item).await?;
        }
        tx.commit().await?;

        Ok(items)
    }

    /// Applies a partial update, stamping `last_updated`.
    ///
    /// ## Returns
    /// The updated item.
    pub async fn update(&self, id: &str, patch: InventoryItemPatch) -> DbResult<InventoryItem> {
        patch.validate().map_err(CoreError::Validation)?;

        debug!(id = %id, "Updating inventory item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                item_name = COALESCE(?2, item_name),
                material_details = COALESCE(?3, material_details),
                quantity = COALESCE(?4, quantity),
                price_cents = COALESCE(?5, price_cents),
                qr_code = COALESCE(?6, qr_code),
                image = COALESCE(?7, image),
                last_updated = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.item_name)
        .bind(&patch.material_details)
        .bind(patch.quantity)
        .bind(patch.price_cents)
        .bind(&patch.qr_code)
        .bind(&patch.image)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Applies a batch of partial updates in one transaction.
    ///
    /// Entries whose id no longer exists are skipped, matching the
    /// single-item delete contract; touched rows get a fresh
    /// `last_updated`, untouched rows are not rewritten.
    ///
    /// ## Returns
    /// Number of rows actually updated.
    pub async fn bulk_update(&self, updates: Vec<BulkUpdate>) -> DbResult<usize> {
        for update in &updates {
            update.patch.validate().map_err(CoreError::Validation)?;
        }

        debug!(count = updates.len(), "Bulk updating inventory items");

        let now = Utc::now();
        let mut touched = 0usize;

        let mut tx = self.pool.begin().await?;
        for update in &updates {
            let result = sqlx::query(
                r#"
                UPDATE inventory_items SET
                    item_name = COALESCE(?2, item_name),
                    material_details = COALESCE(?3, material_details),
                    quantity = COALESCE(?4, quantity),
                    price_cents = COALESCE(?5, price_cents),
                    qr_code = COALESCE(?6, qr_code),
                    image = COALESCE(?7, image),
                    last_updated = ?8
                WHERE id = ?1
                "#,
            )
            .bind(&update.id)
            .bind(&update.patch.item_name)
            .bind(&update.patch.material_details)
            .bind(update.patch.quantity)
            .bind(update.patch.price_cents)
            .bind(&update.patch.qr_code)
            .bind(&update.patch.image)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            touched += result.rows_affected() as usize;
        }
        tx.commit().await?;

        Ok(touched)
    }

    /// Adjusts an item's stock by a signed delta, stamping
    /// `last_updated`.
    ///
    /// Negative deltas are checkout deductions, positive deltas are
    /// restocks. Fails with NotFound for unknown ids — callers that
    /// tolerate missing items (the refund engine) handle that inside
    /// their own transaction.
    pub async fn adjust_quantity(&self, id: &str, delta: i64) -> DbResult<InventoryItem> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity = quantity + ?2, last_updated = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Deletes an item by id. Deleting a missing id is a no-op.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "Delete inventory item");

        Ok(())
    }

    /// Deletes a batch of items in one transaction. Missing ids are
    /// skipped.
    pub async fn delete_many(&self, ids: &[String]) -> DbResult<usize> {
        let mut deleted = 0usize;

        let mut tx = self.pool.begin().await?;
        for id in ids {
            let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected() as usize;
        }
        tx.commit().await?;

        debug!(requested = ids.len(), deleted, "Bulk delete inventory items");

        Ok(deleted)
    }

    /// Replaces the whole collection with the given items, atomically.
    ///
    /// Used by import-preview "apply" and backup restore. Items are
    /// written as-is (ids and timestamps preserved).
    pub async fn replace_all(&self, items: &[InventoryItem]) -> DbResult<()> {
        debug!(count = items.len(), "Replacing inventory collection");

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM inventory_items")
            .execute(&mut *tx)
            .await?;
        for item in items {
            insert_row(&mut *tx, item).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Removes every inventory item (settings "reset data").
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM inventory_items")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Counts inventory items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Validates fields, runs the factory, and attaches a QR code when
/// possible.
fn build_item(
    fields: NewInventoryItem,
    qr: Option<&dyn QrEncoder>,
) -> Result<InventoryItem, DbError> {
    validate_new_item(&fields)
        .map_err(|mut errors| CoreError::Validation(errors.remove(0)))?;

    let mut item = InventoryItem::create(fields);

    if item.qr_code.is_none() {
        if let Some(encoder) = qr {
            // None from the encoder means "no code"; the item is saved
            // without one.
            item.qr_code = encoder.encode(&QrPayload::for_item(&item));
        }
    }

    Ok(item)
}

async fn insert_row<'e, E>(executor: E, item: &InventoryItem) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO inventory_items (
            id, item_name, material_details, quantity, price_cents,
            qr_code, image, date_added, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.item_name)
    .bind(&item.material_details)
    .bind(item.quantity)
    .bind(item.price_cents)
    .bind(&item.qr_code)
    .bind(&item.image)
    .bind(item.date_added)
    .bind(item.last_updated)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lelca_core::qr::QR_ITEM_TYPE;

    fn fields(name: &str, quantity: i64, price_cents: i64) -> NewInventoryItem {
        NewInventoryItem {
            item_name: name.to_string(),
            material_details: "Test material".to_string(),
            quantity,
            price_cents,
            qr_code: None,
            image: None,
        }
    }

    struct FakeEncoder;

    impl QrEncoder for FakeEncoder {
        fn encode(&self, payload: &QrPayload) -> Option<String> {
            Some(format!("qr:{}", payload.to_json()))
        }
    }

    struct BrokenEncoder;

    impl QrEncoder for BrokenEncoder {
        fn encode(&self, _payload: &QrPayload) -> Option<String> {
            None
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo.insert(fields("Coke (350ml)", 24, 450), None).await.unwrap();

        let loaded = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded, item);
        assert_eq!(loaded.quantity, 24);
        assert_eq!(loaded.qr_code, None);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_fields() {
        let db = test_db().await;
        let repo = db.inventory();

        let err = repo.insert(fields("", 1, 100), None).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        let err = repo.insert(fields("Ok", -1, 100), None).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_attaches_qr_when_encoder_present() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo
            .insert(fields("Hammer", 3, 2500), Some(&FakeEncoder))
            .await
            .unwrap();

        let code = item.qr_code.unwrap();
        assert!(code.contains(QR_ITEM_TYPE));
        assert!(code.contains(&item.id));
    }

    #[tokio::test]
    async fn test_insert_degrades_gracefully_without_working_encoder() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo
            .insert(fields("Hammer", 3, 2500), Some(&BrokenEncoder))
            .await
            .unwrap();

        // Saved without a code, not an error
        assert_eq!(item.qr_code, None);
        assert!(repo.get_by_id(&item.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_many_is_atomic() {
        let db = test_db().await;
        let repo = db.inventory();

        let err = repo
            .insert_many(
                vec![fields("Good", 1, 100), fields("", 1, 100)],
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(repo.count().await.unwrap(), 0);

        let items = repo
            .insert_many(vec![fields("A", 1, 100), fields("B", 2, 200)], None)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_stamps_last_updated_and_leaves_others_alone() {
        let db = test_db().await;
        let repo = db.inventory();

        let target = repo.insert(fields("Target", 5, 100), None).await.unwrap();
        let bystander = repo.insert(fields("Bystander", 9, 900), None).await.unwrap();

        let updated = repo
            .update(
                &target.id,
                InventoryItemPatch {
                    quantity: Some(8),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity, 8);
        assert_eq!(updated.item_name, "Target");
        assert!(updated.last_updated >= target.last_updated);

        // Untouched record is byte-identical
        let bystander_after = repo.get_by_id(&bystander.id).await.unwrap().unwrap();
        assert_eq!(bystander_after, bystander);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let db = test_db().await;
        let repo = db.inventory();

        let err = repo
            .update("missing", InventoryItemPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bulk_update_skips_missing_ids() {
        let db = test_db().await;
        let repo = db.inventory();

        let a = repo.insert(fields("A", 1, 100), None).await.unwrap();

        let touched = repo
            .bulk_update(vec![
                BulkUpdate {
                    id: a.id.clone(),
                    patch: InventoryItemPatch {
                        quantity: Some(50),
                        ..Default::default()
                    },
                },
                BulkUpdate {
                    id: "missing".to_string(),
                    patch: InventoryItemPatch {
                        quantity: Some(50),
                        ..Default::default()
                    },
                },
            ])
            .await
            .unwrap();

        assert_eq!(touched, 1);
        assert_eq!(repo.get_by_id(&a.id).await.unwrap().unwrap().quantity, 50);
    }

    #[tokio::test]
    async fn test_adjust_quantity_round_trip() {
        let db = test_db().await;
        let repo = db.inventory();

        let item = repo.insert(fields("Nails (2 inch)", 10, 50), None).await.unwrap();

        let after_sale = repo.adjust_quantity(&item.id, -4).await.unwrap();
        assert_eq!(after_sale.quantity, 6);

        let after_restock = repo.adjust_quantity(&item.id, 4).await.unwrap();
        assert_eq!(after_restock.quantity, 10);
        // Everything but quantity/last_updated unchanged
        assert_eq!(after_restock.item_name, item.item_name);
        assert_eq!(after_restock.price_cents, item.price_cents);
        assert_eq!(after_restock.date_added, item.date_added);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let db = test_db().await;
        let repo = db.inventory();

        // No error for a missing id
        repo.delete("never-existed").await.unwrap();

        let item = repo.insert(fields("Gone soon", 1, 100), None).await.unwrap();
        repo.delete(&item.id).await.unwrap();
        assert!(repo.get_by_id(&item.id).await.unwrap().is_none());

        // Deleting again is still fine
        repo.delete(&item.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_all_and_clear() {
        let db = test_db().await;
        let repo = db.inventory();

        repo.insert(fields("Old", 1, 100), None).await.unwrap();

        let replacement = vec![
            lelca_core::InventoryItem::create(fields("New A", 2, 200)),
            lelca_core::InventoryItem::create(fields("New B", 3, 300)),
        ];
        repo.replace_all(&replacement).await.unwrap();

        let items = repo.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.item_name.starts_with("New")));

        repo.clear().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_many() {
        let db = test_db().await;
        let repo = db.inventory();

        let a = repo.insert(fields("A", 1, 100), None).await.unwrap();
        let b = repo.insert(fields("B", 1, 100), None).await.unwrap();

        let deleted = repo
            .delete_many(&[a.id.clone(), b.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
