//! # Document Numbering
//!
//! Issues the human-facing document numbers printed on receipts and
//! refund notes, backed by the persisted `counters` table.
//!
//! ## Formats (stable, parsed by existing printed documents)
//! ```text
//! receipt_number:     RCP-<6-digit timestamp tail>-<3-digit random>
//! refund_note_number: REF-<5-digit zero-padded counter>
//! ```
//!
//! Each issuance increments its counter row exactly once, inside the
//! caller's SQL transaction: a rolled-back sale or refund does not
//! consume a number.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};

use crate::error::DbResult;

/// Counter row backing receipt issuance.
pub const RECEIPT_COUNTER: &str = "receipt";

/// Counter row backing refund note issuance.
pub const REFUND_NOTE_COUNTER: &str = "refund_note";

// =============================================================================
// Counter Access
// =============================================================================

/// Atomically increments a counter and returns the new value.
///
/// Runs inside the caller's transaction so the increment commits or
/// rolls back together with the document that consumed it.
pub(crate) async fn next_counter(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
) -> DbResult<i64> {
    // Seed the row if a fresh database predates the counter.
    sqlx::query("INSERT OR IGNORE INTO counters (name, value) VALUES (?1, 0)")
        .bind(name)
        .execute(&mut **tx)
        .await?;

    sqlx::query("UPDATE counters SET value = value + 1 WHERE name = ?1")
        .bind(name)
        .execute(&mut **tx)
        .await?;

    let value: i64 = sqlx::query_scalar("SELECT value FROM counters WHERE name = ?1")
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

    Ok(value)
}

// =============================================================================
// Formats
// =============================================================================

/// Formats a receipt number for the given instant.
///
/// The tail is the last 6 digits of the millisecond timestamp; the
/// suffix is a 3-digit zero-padded random component so two receipts in
/// the same millisecond stay distinct.
pub fn receipt_number(now: DateTime<Utc>) -> String {
    let tail = now.timestamp_millis().rem_euclid(1_000_000);
    format!("RCP-{:06}-{:03}", tail, random_3_digits())
}

/// Formats a refund note number from the monotonic counter value.
pub fn refund_note_number(counter: i64) -> String {
    format!("REF-{:05}", counter)
}

/// 3 digits of entropy from the clock's sub-second nanos.
fn random_3_digits() -> u32 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    nanos % 1000
}

// =============================================================================
// Issuance
// =============================================================================

/// Issues the next receipt number, bumping the receipt counter.
pub(crate) async fn issue_receipt_number(tx: &mut Transaction<'_, Sqlite>) -> DbResult<String> {
    next_counter(tx, RECEIPT_COUNTER).await?;
    Ok(receipt_number(Utc::now()))
}

/// Issues the next refund note number from the monotonic counter.
pub(crate) async fn issue_refund_note_number(
    tx: &mut Transaction<'_, Sqlite>,
) -> DbResult<String> {
    let counter = next_counter(tx, REFUND_NOTE_COUNTER).await?;
    Ok(refund_note_number(counter))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_receipt_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap();
        let number = receipt_number(now);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "RCP");
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 3);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_receipt_number_tail_matches_timestamp() {
        let now = Utc.timestamp_millis_opt(1_717_245_045_123).unwrap();
        let number = receipt_number(now);
        // ...045123 are the last six digits of the millisecond clock
        assert!(number.starts_with("RCP-045123-"));
    }

    #[test]
    fn test_refund_note_number_is_zero_padded() {
        assert_eq!(refund_note_number(1), "REF-00001");
        assert_eq!(refund_note_number(42), "REF-00042");
        assert_eq!(refund_note_number(99999), "REF-99999");
    }
}
