//! # Transaction Ledger Repository
//!
//! The append-only sales ledger, the refund engine's apply step, and
//! period reporting.
//!
//! ## Refund Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Refund Processing                                 │
//! │                                                                         │
//! │  1. LOAD                                                               │
//! │     └── transaction + line items + full refund history                 │
//! │                                                                         │
//! │  2. PLAN (lelca-core, pure)                                            │
//! │     └── plan_refund() validates every requested line and computes      │
//! │         the post-refund status; any violation aborts the batch         │
//! │                                                                         │
//! │  3. APPLY (one SQL transaction)                                        │
//! │     ├── restore inventory quantities (stamping last_updated)           │
//! │     ├── issue REF-xxxxx from the monotonic counter                     │
//! │     ├── append the refund record + item snapshots                      │
//! │     └── persist the new status                                         │
//! │                                                                         │
//! │  COMMIT or nothing: a failure at any point rolls back the whole        │
//! │  refund — no partial stock restoration, no dangling record.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reporting Is Dual-Dated
//! Gross sales, transaction counts and items sold are bucketed by the
//! **sale date** regardless of the transaction's current status (the
//! sale happened that day even if later refunded). Refund totals are
//! bucketed by the **refund date** independent of when the original
//! sale occurred. Net revenue is the difference. This is cash-flow
//! accounting: "what did we sell this period" vs "what did we pay back
//! this period".

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::numbering::{issue_receipt_number, issue_refund_note_number};
use lelca_core::refund::{plan_refund, RefundMeta, RefundRequest};
use lelca_core::{
    CoreError, NewTransaction, PaymentMethod, RefundItem, Transaction, TransactionItem,
    TransactionStatus, ValidationError,
};

// =============================================================================
// Reporting Types
// =============================================================================

/// Period sales metrics (see the dual-dating note in the module docs).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesMetrics {
    /// Gross sales booked in the period, by sale date, regardless of
    /// current status.
    pub total_sales_cents: i64,
    /// Refunds processed in the period, by refund date.
    pub total_refunds_cents: i64,
    /// `total_sales - total_refunds`.
    pub net_revenue_cents: i64,
    pub transaction_count: i64,
    pub refund_count: i64,
    /// Units sold at original sale quantity (not reduced by refunds).
    pub items_sold: i64,
    /// Average gross sale, zero when there were no transactions.
    pub avg_transaction_cents: i64,
}

/// One day of gross sales for the dashboard chart.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales_cents: i64,
}

/// Quantity-ranked seller for a period.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingItem {
    pub item_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Per-method payment totals for a period.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodStat {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub count: i64,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TransactionRow {
    transaction_id: String,
    receipt_number: String,
    date: DateTime<Utc>,
    subtotal_cents: i64,
    tax_cents: i64,
    total_amount_cents: i64,
    payment_method: PaymentMethod,
    amount_tendered_cents: Option<i64>,
    change_given_cents: Option<i64>,
    card_details: Option<String>,
    momo_details: Option<String>,
    status: TransactionStatus,
    cashier: String,
}

impl TransactionRow {
    fn into_transaction(
        self,
        items: Vec<TransactionItem>,
        refunds: Vec<lelca_core::RefundRecord>,
    ) -> Transaction {
        Transaction {
            transaction_id: self.transaction_id,
            receipt_number: self.receipt_number,
            date: self.date,
            items,
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            total_amount_cents: self.total_amount_cents,
            payment_method: self.payment_method,
            amount_tendered_cents: self.amount_tendered_cents,
            change_given_cents: self.change_given_cents,
            card_details: self.card_details,
            momo_details: self.momo_details,
            status: self.status,
            cashier: self.cashier,
            refunds,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionItemRow {
    transaction_id: String,
    #[sqlx(flatten)]
    item: TransactionItem,
}

#[derive(sqlx::FromRow)]
struct RefundRow {
    transaction_id: String,
    refund_note_number: String,
    refund_date: DateTime<Utc>,
    total_amount_cents: i64,
    reason: String,
    notes: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RefundItemRow {
    refund_note_number: String,
    #[sqlx(flatten)]
    item: RefundItem,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the transaction ledger.
///
/// Owns the checkout write path (`record_sale`), the refund engine's
/// apply step (`refund`), and period reporting. Cross-collection
/// operations (stock deduction, refund restoration) run against the
/// inventory table inside the same SQL transaction as the ledger write.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Records a completed sale: issues the receipt number, appends the
    /// transaction, and deducts stock for every line item, atomically.
    ///
    /// Stock checks honor `allow_negative_stock`; with it off, a line
    /// exceeding the available quantity fails the whole sale with
    /// `InsufficientStock`. Items that no longer exist in inventory are
    /// sold without a deduction (the snapshot is what was agreed at the
    /// register).
    pub async fn record_sale(
        &self,
        checkout: NewTransaction,
        allow_negative_stock: bool,
    ) -> DbResult<Transaction> {
        if checkout.items.is_empty() {
            return Err(CoreError::Validation(ValidationError::Required {
                field: "items".to_string(),
            })
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let receipt_number = issue_receipt_number(&mut tx).await?;
        let txn = Transaction::create(checkout, receipt_number);

        insert_transaction(&mut tx, &txn).await?;

        let now = Utc::now();
        for line in &txn.items {
            let stock: Option<(i64, String)> =
                sqlx::query_as("SELECT quantity, item_name FROM inventory_items WHERE id = ?1")
                    .bind(&line.item_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some((available, item_name)) = stock else {
                // Sold from a stale catalog entry; nothing to deduct.
                continue;
            };

            if !allow_negative_stock && available < line.quantity {
                return Err(CoreError::InsufficientStock {
                    item_name,
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity = quantity - ?2, last_updated = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&line.item_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            transaction_id = %txn.transaction_id,
            receipt_number = %txn.receipt_number,
            total = %txn.total_amount_cents,
            items = txn.items.len(),
            "Sale recorded"
        );

        Ok(txn)
    }

    /// Appends an already-built transaction to the ledger without
    /// touching inventory.
    ///
    /// Contract: the transaction becomes retrievable. Reverse-chron
    /// ordering is applied at read time; it is a presentation concern,
    /// not a correctness invariant.
    pub async fn append(&self, txn: &Transaction) -> DbResult<()> {
        debug!(transaction_id = %txn.transaction_id, "Appending transaction");

        let mut tx = self.pool.begin().await?;
        insert_transaction(&mut tx, txn).await?;
        tx.commit().await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets a transaction with its line items and refund history.
    pub async fn get_by_id(&self, transaction_id: &str) -> DbResult<Option<Transaction>> {
        let mut conn = self.pool.acquire().await?;
        load_transaction(&mut *conn, transaction_id).await
    }

    /// Lists all transactions, newest first.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let mut conn = self.pool.acquire().await?;
        load_many(&mut *conn, None).await
    }

    /// Lists transactions whose sale date falls in the inclusive day
    /// range, newest first.
    pub async fn list_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Transaction>> {
        let mut conn = self.pool.acquire().await?;
        load_many(&mut *conn, Some(day_range(start, end))).await
    }

    /// Today's transactions (UTC day).
    pub async fn todays_transactions(&self) -> DbResult<Vec<Transaction>> {
        let today = Utc::now().date_naive();
        self.list_in_range(today, today).await
    }

    /// Today's gross sales from transactions still in `Completed`
    /// status — the dashboard's "active sales revenue" card, which
    /// unlike [`Self::sales_metrics`] excludes refunded sales entirely.
    pub async fn todays_sales_total(&self) -> DbResult<i64> {
        let today = Utc::now().date_naive();
        let (start_dt, end_dt) = day_range(today, today);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0)
            FROM transactions
            WHERE date >= ?1 AND date <= ?2 AND status = ?3
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .bind(TransactionStatus::Completed)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Removes every transaction and its refund history (settings
    /// "reset data"). Inventory is untouched.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM transactions")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Refunds
    // -------------------------------------------------------------------------

    /// Processes a full or partial refund.
    ///
    /// Validation (`plan_refund`) runs against the loaded transaction
    /// before anything mutates; the apply step then restores inventory,
    /// appends the refund record, and moves the status, all in one SQL
    /// transaction. See the module docs for the full lifecycle.
    ///
    /// ## Returns
    /// The updated transaction, including the new refund record.
    ///
    /// ## Errors
    /// * `TransactionNotFound` - unknown id
    /// * `AlreadyRefunded` - the transaction is terminal
    /// * `ItemNotInTransaction` / `OverRefund` / `EmptyRefund` - the
    ///   request failed validation; nothing was applied
    pub async fn refund(
        &self,
        transaction_id: &str,
        meta: RefundMeta,
        requests: &[RefundRequest],
    ) -> DbResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let mut txn = load_transaction(&mut *tx, transaction_id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;

        let plan = plan_refund(&txn, requests)?;
        let new_status = plan.new_status;
        let refund_date = Utc::now();

        // Restore inventory. An item deleted from the catalog since the
        // sale is skipped: the money still goes back, the stock cannot.
        for item in &plan.items {
            sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity = quantity + ?2, last_updated = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&item.item_id)
            .bind(item.quantity)
            .bind(refund_date)
            .execute(&mut *tx)
            .await?;
        }

        let refund_note_number = issue_refund_note_number(&mut tx).await?;
        let record = plan.into_record(refund_note_number, refund_date, meta);

        sqlx::query(
            r#"
            INSERT INTO refunds (
                refund_note_number, transaction_id, refund_date,
                total_amount_cents, reason, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.refund_note_number)
        .bind(transaction_id)
        .bind(record.refund_date)
        .bind(record.total_amount_cents)
        .bind(&record.reason)
        .bind(&record.notes)
        .execute(&mut *tx)
        .await?;

        for (position, item) in record.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO refund_items (
                    refund_note_number, position, item_id, item_name,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&record.refund_note_number)
            .bind(position as i64)
            .bind(&item.item_id)
            .bind(&item.item_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE transactions SET status = ?2 WHERE transaction_id = ?1")
            .bind(transaction_id)
            .bind(new_status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            transaction_id = %transaction_id,
            refund_note_number = %record.refund_note_number,
            amount = %record.total_amount_cents,
            status = ?new_status,
            "Refund processed"
        );

        txn.status = new_status;
        txn.refunds.push(record);
        Ok(txn)
    }

    // -------------------------------------------------------------------------
    // Reporting
    // -------------------------------------------------------------------------

    /// Period metrics with dual-dated sales/refund accounting (see
    /// module docs; the mixed dating is deliberate).
    pub async fn sales_metrics(&self, start: NaiveDate, end: NaiveDate) -> DbResult<SalesMetrics> {
        let (start_dt, end_dt) = day_range(start, end);

        let (total_sales_cents, transaction_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0), COUNT(*)
            FROM transactions
            WHERE date >= ?1 AND date <= ?2
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .fetch_one(&self.pool)
        .await?;

        let items_sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(ti.quantity), 0)
            FROM transaction_items ti
            JOIN transactions t ON t.transaction_id = ti.transaction_id
            WHERE t.date >= ?1 AND t.date <= ?2
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .fetch_one(&self.pool)
        .await?;

        let (total_refunds_cents, refund_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0), COUNT(*)
            FROM refunds
            WHERE refund_date >= ?1 AND refund_date <= ?2
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .fetch_one(&self.pool)
        .await?;

        let avg_transaction_cents = if transaction_count > 0 {
            total_sales_cents / transaction_count
        } else {
            0
        };

        Ok(SalesMetrics {
            total_sales_cents,
            total_refunds_cents,
            net_revenue_cents: total_sales_cents - total_refunds_cents,
            transaction_count,
            refund_count,
            items_sold,
            avg_transaction_cents,
        })
    }

    /// Gross sales per day for the last `days` days (today inclusive),
    /// oldest day first. Counts only sales still in `Completed` status,
    /// matching the dashboard chart.
    pub async fn sales_history(&self, days: u32) -> DbResult<Vec<DailySales>> {
        let today = Utc::now().date_naive();
        let days = days.max(1);
        let start = today - chrono::Days::new(u64::from(days - 1));
        let (start_dt, end_dt) = day_range(start, today);

        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            r#"
            SELECT date, total_amount_cents
            FROM transactions
            WHERE date >= ?1 AND date <= ?2 AND status = ?3
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .bind(TransactionStatus::Completed)
        .fetch_all(&self.pool)
        .await?;

        let mut by_day: HashMap<NaiveDate, i64> = HashMap::new();
        for (date, cents) in rows {
            *by_day.entry(date.date_naive()).or_insert(0) += cents;
        }

        let history = (0..days)
            .map(|offset| {
                let date = start + chrono::Days::new(u64::from(offset));
                DailySales {
                    date,
                    total_sales_cents: by_day.get(&date).copied().unwrap_or(0),
                }
            })
            .collect();

        Ok(history)
    }

    /// Quantity-ranked sellers for the period, at original sale
    /// quantities.
    pub async fn top_selling_items(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: u32,
    ) -> DbResult<Vec<TopSellingItem>> {
        let (start_dt, end_dt) = day_range(start, end);

        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT ti.item_name, SUM(ti.quantity), SUM(ti.line_total_cents)
            FROM transaction_items ti
            JOIN transactions t ON t.transaction_id = ti.transaction_id
            WHERE t.date >= ?1 AND t.date <= ?2
            GROUP BY ti.item_name
            ORDER BY SUM(ti.quantity) DESC, ti.item_name
            LIMIT ?3
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item_name, quantity, revenue_cents)| TopSellingItem {
                item_name,
                quantity,
                revenue_cents,
            })
            .collect())
    }

    /// Per-method gross totals and counts for the period.
    pub async fn payment_method_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<PaymentMethodStat>> {
        let (start_dt, end_dt) = day_range(start, end);

        let rows: Vec<(PaymentMethod, i64, i64)> = sqlx::query_as(
            r#"
            SELECT payment_method, COALESCE(SUM(total_amount_cents), 0), COUNT(*)
            FROM transactions
            WHERE date >= ?1 AND date <= ?2
            GROUP BY payment_method
            ORDER BY payment_method
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(method, amount_cents, count)| PaymentMethodStat {
                method,
                amount_cents,
                count,
            })
            .collect())
    }

    /// Counts ledger entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Inclusive day range: start-of-day to end-of-day 23:59:59.999.
fn day_range(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    (
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(end_of_day).and_utc(),
    )
}

async fn insert_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    txn: &Transaction,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            transaction_id, receipt_number, date,
            subtotal_cents, tax_cents, total_amount_cents,
            payment_method, amount_tendered_cents, change_given_cents,
            card_details, momo_details, status, cashier
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&txn.transaction_id)
    .bind(&txn.receipt_number)
    .bind(txn.date)
    .bind(txn.subtotal_cents)
    .bind(txn.tax_cents)
    .bind(txn.total_amount_cents)
    .bind(txn.payment_method)
    .bind(txn.amount_tendered_cents)
    .bind(txn.change_given_cents)
    .bind(&txn.card_details)
    .bind(&txn.momo_details)
    .bind(txn.status)
    .bind(&txn.cashier)
    .execute(&mut **tx)
    .await?;

    for (position, item) in txn.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                transaction_id, position, item_id, item_name,
                quantity, unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&txn.transaction_id)
        .bind(position as i64)
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.line_total_cents)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn load_transaction(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> DbResult<Option<Transaction>> {
    let row: Option<TransactionRow> = sqlx::query_as(
        r#"
        SELECT transaction_id, receipt_number, date,
               subtotal_cents, tax_cents, total_amount_cents,
               payment_method, amount_tendered_cents, change_given_cents,
               card_details, momo_details, status, cashier
        FROM transactions
        WHERE transaction_id = ?1
        "#,
    )
    .bind(transaction_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items: Vec<TransactionItem> = sqlx::query_as(
        r#"
        SELECT item_id, item_name, quantity, unit_price_cents, line_total_cents
        FROM transaction_items
        WHERE transaction_id = ?1
        ORDER BY position
        "#,
    )
    .bind(transaction_id)
    .fetch_all(&mut *conn)
    .await?;

    let refund_rows: Vec<RefundRow> = sqlx::query_as(
        r#"
        SELECT transaction_id, refund_note_number, refund_date,
               total_amount_cents, reason, notes
        FROM refunds
        WHERE transaction_id = ?1
        ORDER BY refund_note_number
        "#,
    )
    .bind(transaction_id)
    .fetch_all(&mut *conn)
    .await?;

    let refund_item_rows: Vec<RefundItemRow> = sqlx::query_as(
        r#"
        SELECT ri.refund_note_number, ri.item_id, ri.item_name,
               ri.quantity, ri.unit_price_cents, ri.line_total_cents
        FROM refund_items ri
        JOIN refunds r ON r.refund_note_number = ri.refund_note_number
        WHERE r.transaction_id = ?1
        ORDER BY ri.refund_note_number, ri.position
        "#,
    )
    .bind(transaction_id)
    .fetch_all(&mut *conn)
    .await?;

    let refunds = assemble_refunds(refund_rows, refund_item_rows);

    Ok(Some(row.into_transaction(items, refunds)))
}

async fn load_many(
    conn: &mut SqliteConnection,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> DbResult<Vec<Transaction>> {
    let rows: Vec<TransactionRow> = match range {
        Some((start_dt, end_dt)) => {
            sqlx::query_as(
                r#"
                SELECT transaction_id, receipt_number, date,
                       subtotal_cents, tax_cents, total_amount_cents,
                       payment_method, amount_tendered_cents, change_given_cents,
                       card_details, momo_details, status, cashier
                FROM transactions
                WHERE date >= ?1 AND date <= ?2
                ORDER BY date DESC
                "#,
            )
            .bind(start_dt)
            .bind(end_dt)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT transaction_id, receipt_number, date,
                       subtotal_cents, tax_cents, total_amount_cents,
                       payment_method, amount_tendered_cents, change_given_cents,
                       card_details, momo_details, status, cashier
                FROM transactions
                ORDER BY date DESC
                "#,
            )
            .fetch_all(&mut *conn)
            .await?
        }
    };

    let item_rows: Vec<TransactionItemRow> = sqlx::query_as(
        r#"
        SELECT transaction_id, item_id, item_name, quantity,
               unit_price_cents, line_total_cents
        FROM transaction_items
        ORDER BY transaction_id, position
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let refund_rows: Vec<RefundRow> = sqlx::query_as(
        r#"
        SELECT transaction_id, refund_note_number, refund_date,
               total_amount_cents, reason, notes
        FROM refunds
        ORDER BY refund_note_number
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let refund_item_rows: Vec<RefundItemRow> = sqlx::query_as(
        r#"
        SELECT refund_note_number, item_id, item_name, quantity,
               unit_price_cents, line_total_cents
        FROM refund_items
        ORDER BY refund_note_number, position
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut items_by_txn: HashMap<String, Vec<TransactionItem>> = HashMap::new();
    for row in item_rows {
        items_by_txn
            .entry(row.transaction_id)
            .or_default()
            .push(row.item);
    }

    let mut refunds_by_txn: HashMap<String, Vec<RefundRow>> = HashMap::new();
    for row in refund_rows {
        refunds_by_txn
            .entry(row.transaction_id.clone())
            .or_default()
            .push(row);
    }

    let mut refund_items: HashMap<String, Vec<RefundItem>> = HashMap::new();
    for row in refund_item_rows {
        refund_items
            .entry(row.refund_note_number)
            .or_default()
            .push(row.item);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = items_by_txn.remove(&row.transaction_id).unwrap_or_default();
            let refunds = refunds_by_txn
                .remove(&row.transaction_id)
                .unwrap_or_default()
                .into_iter()
                .map(|r| {
                    let items = refund_items
                        .remove(&r.refund_note_number)
                        .unwrap_or_default();
                    lelca_core::RefundRecord {
                        refund_note_number: r.refund_note_number,
                        refund_date: r.refund_date,
                        items,
                        total_amount_cents: r.total_amount_cents,
                        reason: r.reason,
                        notes: r.notes,
                    }
                })
                .collect();
            row.into_transaction(items, refunds)
        })
        .collect())
}

fn assemble_refunds(
    rows: Vec<RefundRow>,
    item_rows: Vec<RefundItemRow>,
) -> Vec<lelca_core::RefundRecord> {
    let mut items_by_note: HashMap<String, Vec<RefundItem>> = HashMap::new();
    for row in item_rows {
        items_by_note
            .entry(row.refund_note_number)
            .or_default()
            .push(row.item);
    }

    rows.into_iter()
        .map(|r| lelca_core::RefundRecord {
            items: items_by_note
                .remove(&r.refund_note_number)
                .unwrap_or_default(),
            refund_note_number: r.refund_note_number,
            refund_date: r.refund_date,
            total_amount_cents: r.total_amount_cents,
            reason: r.reason,
            notes: r.notes,
        })
        .collect()
}

// =============================================================================
// Integration Tests
// =============================================================================
