use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

/// Hands out one exclusive async lock per account id.
///
/// The registry itself is guarded by a std mutex held only long enough to
/// clone out the entry; callers await the returned lock after the registry
/// guard is released, so the registry never blocks across a storage call.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `account`, creating it on first use. Entries
    /// are never removed; the registry grows like the account table does.
    pub fn lock_for(&self, account: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("account lock registry poisoned");
        locks.entry(account).or_default().clone()
    }
}
