use crate::error::LedgerError;
use crate::transaction::Transaction;
use std::collections::HashMap;

/// Unordered id → (transaction, fee) pool. No eviction beyond mining and
/// reconvergence removal (§4.3).
#[derive(Debug, Default, Clone)]
pub struct Mempool {
    entries: HashMap<String, (Transaction, u64)>,
}

impl Mempool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts `tx` under its id, replacing any existing entry for that id.
    pub fn add(&mut self, id: String, tx: Transaction, fee: u64) {
        self.entries.insert(id, (tx, fee));
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Up to `k` entries ordered by fee descending, ties broken by id for a
    /// deterministic snapshot. Returns the fee stored at admission time,
    /// same as the original's `get_transactions` — callers do not
    /// re-verify.
    #[must_use]
    pub fn top(&self, k: usize) -> Vec<(String, Transaction, u64)> {
        let mut all: Vec<_> = self.entries.iter().collect();
        all.sort_by(|(id_a, (_, fee_a)), (id_b, (_, fee_b))| {
            fee_b.cmp(fee_a).then_with(|| id_a.cmp(id_b))
        });
        all.into_iter()
            .take(k)
            .map(|(id, (tx, fee))| (id.clone(), tx.clone(), *fee))
            .collect()
    }

    /// # Errors
    /// Returns `NotInPool` if `id` is absent.
    pub fn remove(&mut self, id: &str) -> Result<(), LedgerError> {
        self.entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::NotInPool(id.to_string()))
    }

    pub fn flush(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxOutput;

    fn tx(amount: u64) -> Transaction {
        Transaction::new(vec![], vec![TxOutput::new("a".repeat(64), amount)], 1)
    }

    #[test]
    fn top_orders_by_fee_descending() {
        let mut pool = Mempool::new();
        pool.add("a".to_string(), tx(1), 5);
        pool.add("b".to_string(), tx(2), 10);
        pool.add("c".to_string(), tx(3), 1);

        let top = pool.top(2);
        assert_eq!(top[0].0, "b");
        assert_eq!(top[1].0, "a");
    }

    #[test]
    fn ties_break_by_id() {
        let mut pool = Mempool::new();
        pool.add("z".to_string(), tx(1), 5);
        pool.add("a".to_string(), tx(2), 5);

        let top = pool.top(2);
        assert_eq!(top[0].0, "a");
        assert_eq!(top[1].0, "z");
    }

    #[test]
    fn top_returns_stored_fee_without_reverification() {
        let mut pool = Mempool::new();
        pool.add("a".to_string(), tx(1), 7);

        let top = pool.top(1);
        assert_eq!(top[0].2, 7);
    }

    #[test]
    fn remove_absent_fails() {
        let mut pool = Mempool::new();
        assert!(matches!(pool.remove("missing"), Err(LedgerError::NotInPool(_))));
    }

    #[test]
    fn add_is_idempotent_by_id() {
        let mut pool = Mempool::new();
        pool.add("a".to_string(), tx(1), 5);
        pool.add("a".to_string(), tx(1), 7);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.top(1)[0].1.outputs[0].amount, 1);
    }

    #[test]
    fn flush_empties_pool() {
        let mut pool = Mempool::new();
        pool.add("a".to_string(), tx(1), 5);
        pool.flush();
        assert!(pool.is_empty());
    }
}
