//! # Refund Planning
//!
//! Validation and status computation for full/partial refunds.
//!
//! ## Two-Phase Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Refund Processing                                  │
//! │                                                                         │
//! │  Phase 1: PLAN (this module, pure)                                     │
//! │  ├── Reject terminal transactions (AlreadyRefunded)                    │
//! │  ├── Resolve each requested item against the original lines            │
//! │  ├── Cross-check against every prior refund record                     │
//! │  ├── Reject over-quota requests (OverRefund) — whole batch             │
//! │  └── Compute the post-refund status                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Phase 2: APPLY (lelca-db, one SQL transaction)                        │
//! │  ├── Restore inventory quantities                                      │
//! │  ├── Append the refund record                                          │
//! │  └── Persist the new status                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Planning is all-or-nothing: a request containing one valid item and
//! one over-quota item produces no plan at all, so nothing downstream
//! can apply a partial refund. The plan itself never mutates anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{RefundItem, RefundRecord, Transaction, TransactionStatus};

// =============================================================================
// Request Types
// =============================================================================

/// One requested return line: which item, how many units.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundRequest {
    pub item_id: String,
    pub quantity: i64,
}

/// Operator-supplied metadata captured with a refund.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundMeta {
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Refund Plan
// =============================================================================

/// A validated refund, ready to apply.
///
/// Produced only when every requested line passed validation. Carries
/// the per-item snapshot, the refund total, and the status the
/// transaction must transition to once the plan is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundPlan {
    /// Snapshot of what this refund returns (positive quantities only).
    pub items: Vec<RefundItem>,
    /// Sum of the snapshot's line totals, in cents.
    pub total_amount_cents: i64,
    /// Status after applying: `Refunded` when cumulative returns reach
    /// cumulative sold quantity, otherwise `PartiallyRefunded`.
    pub new_status: TransactionStatus,
}

impl RefundPlan {
    /// Materializes the plan into an immutable [`RefundRecord`].
    ///
    /// The note number comes from the persisted monotonic counter; the
    /// caller issues it in the same storage transaction that applies
    /// the plan.
    pub fn into_record(
        self,
        refund_note_number: String,
        refund_date: DateTime<Utc>,
        meta: RefundMeta,
    ) -> RefundRecord {
        RefundRecord {
            refund_note_number,
            refund_date,
            items: self.items,
            total_amount_cents: self.total_amount_cents,
            reason: meta.reason,
            notes: meta.notes,
        }
    }
}

// =============================================================================
// Planning
// =============================================================================

/// Validates a refund request against a transaction and its prior
/// refund history.
///
/// ## Validation Order
/// 1. `AlreadyRefunded` if the transaction is terminal.
/// 2. Per requested line, in request order:
///    - `ItemNotInTransaction` if the id never appeared on the receipt
///    - `OverRefund` if the quantity exceeds what is still refundable
///      (original sold quantity minus all prior refunds of that item)
///    - zero/negative quantities are skipped as no-ops
/// 3. `EmptyRefund` if nothing survived filtering.
///
/// Every line is checked before anything is applied; the first
/// violation fails the whole batch.
///
/// ## Conservation Invariant
/// For every line item, the sum of refunded quantities across all
/// refund records never exceeds the originally sold quantity. The
/// `remaining` arithmetic below is what maintains it.
pub fn plan_refund(
    transaction: &Transaction,
    requests: &[RefundRequest],
) -> CoreResult<RefundPlan> {
    if transaction.status == TransactionStatus::Refunded {
        return Err(CoreError::AlreadyRefunded {
            transaction_id: transaction.transaction_id.clone(),
        });
    }

    // Previously refunded quantity per item, across all prior records.
    let mut refunded_qty: HashMap<&str, i64> = HashMap::new();
    for record in &transaction.refunds {
        for item in &record.items {
            *refunded_qty.entry(item.item_id.as_str()).or_insert(0) += item.quantity;
        }
    }

    let mut snapshot: Vec<RefundItem> = Vec::new();
    let mut total_amount_cents: i64 = 0;

    for request in requests {
        let original = transaction.line_item(&request.item_id).ok_or_else(|| {
            CoreError::ItemNotInTransaction {
                item_id: request.item_id.clone(),
            }
        })?;

        let already_refunded = refunded_qty.get(request.item_id.as_str()).copied().unwrap_or(0);
        let remaining = original.quantity - already_refunded;

        if request.quantity > remaining {
            return Err(CoreError::OverRefund {
                item_id: request.item_id.clone(),
                item_name: original.item_name.clone(),
                requested: request.quantity,
                remaining,
            });
        }

        if request.quantity <= 0 {
            continue;
        }

        let line_total_cents = request.quantity * original.unit_price_cents;
        total_amount_cents += line_total_cents;

        snapshot.push(RefundItem {
            item_id: request.item_id.clone(),
            item_name: original.item_name.clone(),
            quantity: request.quantity,
            unit_price_cents: original.unit_price_cents,
            line_total_cents,
        });
    }

    if snapshot.is_empty() {
        return Err(CoreError::EmptyRefund);
    }

    // Status is cumulative across ALL line items, not per-item: a
    // three-line transaction is Refunded only once every line's full
    // quantity has been returned across one or more refund actions.
    let total_sold = transaction.total_sold_quantity();
    let total_refunded = transaction.total_refunded_quantity()
        + snapshot.iter().map(|i| i.quantity).sum::<i64>();

    let new_status = if total_refunded >= total_sold {
        TransactionStatus::Refunded
    } else {
        TransactionStatus::PartiallyRefunded
    };

    Ok(RefundPlan {
        items: snapshot,
        total_amount_cents,
        new_status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewTransaction, PaymentMethod, TransactionItem};
    use chrono::Utc;

    fn request(item_id: &str, quantity: i64) -> RefundRequest {
        RefundRequest {
            item_id: item_id.to_string(),
            quantity,
        }
    }

    fn transaction_with(items: Vec<(&str, i64, i64)>) -> Transaction {
        let items: Vec<TransactionItem> = items
            .into_iter()
            .map(|(id, qty, unit_price)| TransactionItem {
                item_id: id.to_string(),
                item_name: format!("Item {}", id),
                quantity: qty,
                unit_price_cents: unit_price,
                line_total_cents: qty * unit_price,
            })
            .collect();
        let subtotal: i64 = items.iter().map(|i| i.line_total_cents).sum();

        Transaction::create(
            NewTransaction {
                items,
                subtotal_cents: subtotal,
                tax_cents: 0,
                total_amount_cents: subtotal,
                payment_method: PaymentMethod::Cash,
                amount_tendered_cents: Some(subtotal),
                change_given_cents: Some(0),
                card_details: None,
                momo_details: None,
                cashier: None,
            },
            "RCP-000000-000".to_string(),
        )
    }

    fn apply(txn: &mut Transaction, plan: RefundPlan) {
        txn.status = plan.new_status;
        txn.refunds.push(plan.into_record(
            format!("REF-{:05}", txn.refunds.len() + 1),
            Utc::now(),
            RefundMeta {
                reason: "Customer return".to_string(),
                notes: None,
            },
        ));
    }

    #[test]
    fn test_partial_refund_of_single_line() {
        // Scenario: 10 × 5.00 sold, refund 4 → Partially Refunded, 20.00
        let txn = transaction_with(vec![("x", 10, 500)]);
        let plan = plan_refund(&txn, &[request("x", 4)]).unwrap();

        assert_eq!(plan.new_status, TransactionStatus::PartiallyRefunded);
        assert_eq!(plan.total_amount_cents, 2000);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].quantity, 4);
        assert_eq!(plan.items[0].line_total_cents, 2000);
    }

    #[test]
    fn test_second_refund_completes_the_transaction() {
        let mut txn = transaction_with(vec![("x", 10, 500)]);

        let first = plan_refund(&txn, &[request("x", 4)]).unwrap();
        apply(&mut txn, first);

        let second = plan_refund(&txn, &[request("x", 6)]).unwrap();
        assert_eq!(second.new_status, TransactionStatus::Refunded);
        apply(&mut txn, second);

        assert_eq!(txn.refunds.len(), 2);
        assert_eq!(txn.total_refunded_quantity(), 10);
    }

    #[test]
    fn test_refund_on_terminal_transaction_is_rejected() {
        let mut txn = transaction_with(vec![("x", 10, 500)]);
        let plan = plan_refund(&txn, &[request("x", 10)]).unwrap();
        apply(&mut txn, plan);
        assert_eq!(txn.status, TransactionStatus::Refunded);

        let err = plan_refund(&txn, &[request("x", 1)]).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyRefunded { .. }));
    }

    #[test]
    fn test_over_refund_rejects_whole_batch() {
        // Two lines (5 and 3); requesting 6 of the first must fail even
        // though the second request alone would be valid.
        let txn = transaction_with(vec![("a", 5, 100), ("b", 3, 200)]);

        let err = plan_refund(&txn, &[request("a", 6), request("b", 1)]).unwrap_err();
        match err {
            CoreError::OverRefund {
                requested,
                remaining,
                ..
            } => {
                assert_eq!(requested, 6);
                assert_eq!(remaining, 5);
            }
            other => panic!("expected OverRefund, got {other:?}"),
        }
    }

    #[test]
    fn test_over_refund_accounts_for_prior_refunds() {
        let mut txn = transaction_with(vec![("x", 10, 500)]);
        let plan = plan_refund(&txn, &[request("x", 7)]).unwrap();
        apply(&mut txn, plan);

        let err = plan_refund(&txn, &[request("x", 4)]).unwrap_err();
        match err {
            CoreError::OverRefund { remaining, .. } => assert_eq!(remaining, 3),
            other => panic!("expected OverRefund, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let txn = transaction_with(vec![("x", 10, 500)]);
        let err = plan_refund(&txn, &[request("nope", 1)]).unwrap_err();
        assert!(matches!(err, CoreError::ItemNotInTransaction { .. }));
    }

    #[test]
    fn test_zero_quantity_entries_are_skipped() {
        let txn = transaction_with(vec![("a", 5, 100), ("b", 3, 200)]);

        let plan = plan_refund(&txn, &[request("a", 0), request("b", 2)]).unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].item_id, "b");
    }

    #[test]
    fn test_all_zero_quantities_is_empty_refund() {
        let txn = transaction_with(vec![("a", 5, 100)]);
        let err = plan_refund(&txn, &[request("a", 0), request("a", -2)]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyRefund));
    }

    #[test]
    fn test_multi_line_status_is_cumulative_not_per_item() {
        // Fully refunding one of two lines is still partial.
        let mut txn = transaction_with(vec![("a", 5, 100), ("b", 3, 200)]);

        let plan = plan_refund(&txn, &[request("a", 5)]).unwrap();
        assert_eq!(plan.new_status, TransactionStatus::PartiallyRefunded);
        apply(&mut txn, plan);

        let plan = plan_refund(&txn, &[request("b", 3)]).unwrap();
        assert_eq!(plan.new_status, TransactionStatus::Refunded);
    }

    #[test]
    fn test_conservation_across_refund_sequences() {
        let mut txn = transaction_with(vec![("a", 5, 100), ("b", 3, 200)]);

        for req in [request("a", 2), request("b", 3), request("a", 3)] {
            let plan = plan_refund(&txn, &[req]).unwrap();
            apply(&mut txn, plan);

            assert!(txn.refunded_quantity_for("a") <= 5);
            assert!(txn.refunded_quantity_for("b") <= 3);
        }

        assert_eq!(txn.status, TransactionStatus::Refunded);
        // Status never moves backwards and further refunds are refused.
        assert!(plan_refund(&txn, &[request("a", 1)]).is_err());
    }

    #[test]
    fn test_plan_does_not_mutate_the_transaction() {
        let txn = transaction_with(vec![("x", 10, 500)]);
        let before = txn.clone();

        let _ = plan_refund(&txn, &[request("x", 4)]).unwrap();
        let _ = plan_refund(&txn, &[request("x", 40)]).unwrap_err();

        assert_eq!(txn, before);
    }

    #[test]
    fn test_into_record_carries_meta_and_number() {
        let txn = transaction_with(vec![("x", 10, 500)]);
        let plan = plan_refund(&txn, &[request("x", 4)]).unwrap();
        let now = Utc::now();

        let record = plan.into_record(
            "REF-00042".to_string(),
            now,
            RefundMeta {
                reason: "Wrong size".to_string(),
                notes: Some("Customer exchanged in store".to_string()),
            },
        );

        assert_eq!(record.refund_note_number, "REF-00042");
        assert_eq!(record.refund_date, now);
        assert_eq!(record.total_amount_cents, 2000);
        assert_eq!(record.reason, "Wrong size");
    }
}
