//! Balance ledger trait for dependency injection and testing.
//!
//! The ledger stores one `MonthlyBalanceSnapshot` per employee and month. The
//! trait can be mocked using mockall for testing purposes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{EngineError, Result},
    models::balance::MonthlyBalanceSnapshot,
    types::UserId,
};

/// Repository trait for monthly balance snapshots.
///
/// Implementations must refuse a second snapshot for the same employee and
/// month so that concurrent closes cannot both win.
/// Use `MockBalanceLedgerTrait` in tests to mock the behavior.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceLedgerTrait: Send + Sync {
    /// Find the snapshot closed for an employee and month
    async fn find_snapshot(
        &self,
        user_id: UserId,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyBalanceSnapshot>>;

    /// Insert a snapshot, failing with `InvalidState` if the month is already closed
    async fn insert_snapshot(&self, snapshot: MonthlyBalanceSnapshot) -> Result<()>;

    /// All snapshots of an employee, oldest first
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<MonthlyBalanceSnapshot>>;
}

type LedgerKey = (UserId, i32, u32);

/// Ledger held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    snapshots: RwLock<HashMap<LedgerKey, MonthlyBalanceSnapshot>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: impl IntoIterator<Item = MonthlyBalanceSnapshot>) -> Self {
        let snapshots = snapshots
            .into_iter()
            .map(|s| ((s.user_id, s.year, s.month), s))
            .collect();
        Self {
            snapshots: RwLock::new(snapshots),
        }
    }
}

#[async_trait]
impl BalanceLedgerTrait for InMemoryLedger {
    async fn find_snapshot(
        &self,
        user_id: UserId,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyBalanceSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(&(user_id, year, month)).cloned())
    }

    async fn insert_snapshot(&self, snapshot: MonthlyBalanceSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().await;
        let key = (snapshot.user_id, snapshot.year, snapshot.month);
        if snapshots.contains_key(&key) {
            return Err(EngineError::InvalidState(format!(
                "Month {}-{:02} already closed for {}",
                snapshot.year, snapshot.month, snapshot.user_id
            )));
        }
        snapshots.insert(key, snapshot);
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<MonthlyBalanceSnapshot>> {
        let snapshots = self.snapshots.read().await;
        let mut rows: Vec<_> = snapshots
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.year, s.month));
        Ok(rows)
    }
}
