//! # Settings Repository
//!
//! Persists the single versioned settings blob and runs the canonical
//! migration on load.
//!
//! ## Load Path
//! ```text
//! SELECT payload ──► serde_json::Value ──► lelca_core::settings::migrate()
//!                                                 │
//!                   canonical Settings ◄──────────┘
//!                        │
//!                        └── written back when the stored shape was stale,
//!                            so migration runs once, not on every read
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use lelca_core::settings::{migrate, Settings};

/// Repository for the settings blob.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads settings, migrating any legacy shape to the canonical one.
    ///
    /// A missing row yields current defaults. When migration changed
    /// the stored shape, the canonical form is written back so
    /// subsequent loads skip the conversion.
    pub async fn load(&self) -> DbResult<Settings> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        let Some(payload) = payload else {
            debug!("No stored settings, using defaults");
            return Ok(Settings::current_defaults());
        };

        let raw: serde_json::Value = serde_json::from_str(&payload)
            .map_err(|e| DbError::Internal(format!("Corrupt settings payload: {e}")))?;

        let settings = migrate(raw.clone());

        // Re-serialize and compare: a difference means the stored blob
        // was a legacy shape.
        let canonical = serde_json::to_value(&settings)
            .map_err(|e| DbError::Internal(format!("Settings serialization: {e}")))?;
        if canonical != raw {
            info!("Migrated settings to canonical shape");
            self.save(&settings).await?;
        }

        Ok(settings)
    }

    /// Saves settings in canonical form.
    pub async fn save(&self, settings: &Settings) -> DbResult<()> {
        let payload = serde_json::to_string(settings)
            .map_err(|e| DbError::Internal(format!("Settings serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO settings (id, payload) VALUES (1, ?1)
            ON CONFLICT (id) DO UPDATE SET payload = excluded.payload
            "#,
        )
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Resets settings to current defaults.
    pub async fn reset(&self) -> DbResult<Settings> {
        let defaults = Settings::current_defaults();
        self.save(&defaults).await?;
        Ok(defaults)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
