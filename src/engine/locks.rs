use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::account::AccountId;

/// Per-account locks serializing the read-check-append sequence of debits.
///
/// Every debit path holds the owning account's lock for the whole
/// balance-read/sufficiency-check/append sequence, so two concurrent debits
/// against a balance that only covers one can never both pass the check.
/// Credits and reads do not take a table lock: each store call is atomic on
/// its own, and a racing deposit can only increase the balance.
#[derive(Debug, Default)]
pub(super) struct AccountLocks {
    table: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    fn entry(&self, id: AccountId) -> Arc<Mutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.entry(id).or_default().clone()
    }

    /// Run `f` with the account locked.
    pub(super) fn with_account<T>(&self, id: AccountId, f: impl FnOnce() -> T) -> T {
        let lock = self.entry(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Run `f` with both accounts locked, acquiring in ascending id order so
    /// two opposite-direction transfers between the same pair cannot
    /// deadlock. A self-transfer takes the lock once.
    pub(super) fn with_pair<T>(&self, a: AccountId, b: AccountId, f: impl FnOnce() -> T) -> T {
        if a == b {
            return self.with_account(a, f);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_lock = self.entry(first);
        let second_lock = self.entry(second);
        let _first = first_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _second = second_lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    #[test]
    fn test_same_account_serializes() {
        let locks = Arc::new(AccountLocks::default());
        let in_section = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let in_section = in_section.clone();
                let max_seen = max_seen.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        locks.with_account(1, || {
                            let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            in_section.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_opposite_direction_pairs_do_not_deadlock() {
        let locks = Arc::new(AccountLocks::default());
        let a = {
            let locks = locks.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    locks.with_pair(1, 2, || {});
                }
            })
        };
        let b = {
            let locks = locks.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    locks.with_pair(2, 1, || {});
                }
            })
        };
        a.join().unwrap();
        b.join().unwrap();
    }

    #[test]
    fn test_self_pair_locks_once() {
        let locks = AccountLocks::default();
        // Would deadlock if the same mutex were acquired twice.
        locks.with_pair(1, 1, || {});
    }
}
