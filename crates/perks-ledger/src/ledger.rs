//! The in-memory points ledger: an append-only log of point transactions.
//!
//! [`Ledger`] holds every [`LedgerEntry`] in insertion order and answers
//! per-actor questions (history, balance) by scanning it. The in-memory
//! store keeps its ledger table in one of these; the `PostgreSQL` store
//! loads an actor's rows and hands them to [`balance`](crate::balance).
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Derived balance**: no per-actor counter is kept; the balance is
//!   recomputed from the entries on every read.

use perks_types::{ActorId, LedgerEntry};

/// Append-only log of point transactions.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a pre-built [`LedgerEntry`].
    ///
    /// Entries are validated by [`EntryBuilder`](crate::EntryBuilder)
    /// before they get here.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Iterate over one actor's entries, oldest first.
    pub fn entries_for(&self, actor_id: ActorId) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.entries.iter().filter(move |e| e.actor_id == actor_id)
    }

    /// The actor's current balance (sum of their entries).
    pub fn balance_of(&self, actor_id: ActorId) -> i64 {
        crate::balance(self.entries_for(actor_id))
    }

    /// Return all entries.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use perks_types::LedgerCategory;

    use super::*;
    use crate::EntryBuilder;

    fn credit(actor_id: ActorId, amount: i64) -> LedgerEntry {
        EntryBuilder::award(actor_id, LedgerCategory::Earn, amount, "Shift bonus".to_owned())
            .unwrap()
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance_of(ActorId::new()), 0);
    }

    #[test]
    fn balances_are_per_actor() {
        let alice = ActorId::new();
        let bob = ActorId::new();
        let mut ledger = Ledger::new();

        ledger.append(credit(alice, 300));
        ledger.append(credit(bob, 50));
        ledger.append(credit(alice, 200));

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.balance_of(alice), 500);
        assert_eq!(ledger.balance_of(bob), 50);
        assert_eq!(ledger.entries_for(alice).count(), 2);
    }

    #[test]
    fn adjustments_can_debit() {
        let actor = ActorId::new();
        let mut ledger = Ledger::new();
        ledger.append(credit(actor, 100));
        let adjustment = EntryBuilder::award(
            actor,
            LedgerCategory::Adjust,
            -30,
            "Duplicate credit".to_owned(),
        )
        .unwrap();
        ledger.append(adjustment);

        assert_eq!(ledger.balance_of(actor), 70);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let actor = ActorId::new();
        let mut ledger = Ledger::new();
        ledger.append(credit(actor, 1));
        ledger.append(credit(actor, 2));
        ledger.append(credit(actor, 3));

        let amounts: Vec<i64> = ledger.entries().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![1, 2, 3]);
    }
}
