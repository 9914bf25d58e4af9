//! Postgres balance store
//!
//! The balance update and the entry insert ride one database transaction, so
//! a committed entry always has a matching balance change. Per-owner
//! serialization comes from the row-level lock the conditional UPDATE takes.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::LedgerEntry;
use crate::store::BalanceStore;
use typecraft_common::{Error, Result};

/// All columns in the ledger_entries table, used for SELECT and RETURNING clauses.
const LEDGER_ENTRY_COLUMNS: &str = "id, owner, delta, reason, created_at";

#[derive(Clone)]
pub struct PgBalanceStore {
    pool: PgPool,
}

impl PgBalanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// An unreachable ledger store is a recoverable condition: the caller may
/// retry the whole transaction, since nothing was committed.
fn unavailable(error: sqlx::Error) -> Error {
    Error::LedgerUnavailable(error.to_string())
}

#[async_trait::async_trait]
impl BalanceStore for PgBalanceStore {
    async fn balance(&self, owner: Uuid) -> Result<i32> {
        let credits = sqlx::query_scalar::<_, i32>("SELECT credits FROM users WHERE id = $1")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        match credits {
            Some(credits) => Ok(credits),
            None => {
                // Provisioning may not have run yet for this owner.
                tracing::warn!(%owner, "No account row yet; reporting zero balance");
                Ok(0)
            }
        }
    }

    async fn apply(&self, owner: Uuid, delta: i32, reason: &str) -> Result<i32> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let updated = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET credits = credits + $2, updated_at = NOW() \
             WHERE id = $1 AND credits + $2 >= 0 \
             RETURNING credits",
        )
        .bind(owner)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unavailable)?;

        let new_balance = match updated {
            Some(credits) => credits,
            None => {
                // Either the balance cannot cover the delta or the row is
                // missing entirely; look once more to tell them apart.
                let available =
                    sqlx::query_scalar::<_, i32>("SELECT credits FROM users WHERE id = $1")
                        .bind(owner)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(unavailable)?;

                return match available {
                    Some(available) => Err(Error::InsufficientCredits {
                        required: -delta,
                        available,
                    }),
                    None => Err(Error::NotFound(format!("No account row for {}", owner))),
                };
            }
        };

        let entry = if delta < 0 {
            LedgerEntry::debit(owner, -delta, reason)
        } else {
            LedgerEntry::credit(owner, delta, reason)
        };

        sqlx::query(
            "INSERT INTO ledger_entries (id, owner, delta, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.id)
        .bind(entry.owner)
        .bind(entry.delta)
        .bind(&entry.reason)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        tx.commit().await.map_err(unavailable)?;

        Ok(new_balance)
    }

    async fn history(&self, owner: Uuid) -> Result<Vec<LedgerEntry>> {
        let query = format!(
            "SELECT {LEDGER_ENTRY_COLUMNS} FROM ledger_entries \
             WHERE owner = $1 ORDER BY created_at DESC"
        );
        let entries = sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(entries)
    }
}
