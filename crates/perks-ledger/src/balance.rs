//! The balance calculator.
//!
//! An actor's point balance is the sum of the amounts of all their ledger
//! entries. There is no stored balance column anywhere in the system; every
//! balance the portals show, and the one the booking workflow checks before
//! charging, comes from this function.

use perks_types::LedgerEntry;

/// Sum the amounts of a sequence of ledger entries.
///
/// An empty sequence has balance 0. The caller is responsible for passing
/// only the entries of one actor. Addition saturates at the `i64` bounds.
pub fn balance<'a, I>(entries: I) -> i64
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    entries
        .into_iter()
        .fold(0_i64, |total, entry| total.saturating_add(entry.amount))
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Utc;
    use perks_types::{ActorId, LedgerCategory, LedgerEntryId};

    use super::*;

    fn entry(actor_id: ActorId, amount: i64) -> LedgerEntry {
        let category = if amount >= 0 {
            LedgerCategory::Earn
        } else {
            LedgerCategory::Spend
        };
        LedgerEntry {
            id: LedgerEntryId::new(),
            actor_id,
            amount,
            category,
            reason: "test".to_owned(),
            booking_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_ledger_has_zero_balance() {
        let none: &[LedgerEntry] = &[];
        assert_eq!(balance(none), 0);
    }

    #[test]
    fn balance_is_sum_of_amounts() {
        let actor = ActorId::new();
        let amounts = [500, -120, 75, -455, 1000, -1];
        let entries: Vec<LedgerEntry> = amounts.iter().map(|a| entry(actor, *a)).collect();

        assert_eq!(balance(&entries), amounts.iter().sum::<i64>());
    }

    #[test]
    fn every_prefix_matches_running_sum() {
        let actor = ActorId::new();
        let entries: Vec<LedgerEntry> = [40, 60, -50, 25, -75]
            .iter()
            .map(|a| entry(actor, *a))
            .collect();

        let mut running = 0_i64;
        for (n, e) in entries.iter().enumerate() {
            running += e.amount;
            assert_eq!(balance(entries.iter().take(n + 1)), running);
        }
    }

    #[test]
    fn repeated_reads_agree() {
        let actor = ActorId::new();
        let entries = vec![entry(actor, 300), entry(actor, -100)];
        assert_eq!(balance(&entries), balance(&entries));
        assert_eq!(balance(&entries), 200);
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let actor = ActorId::new();
        let entries = vec![entry(actor, i64::MAX), entry(actor, 10)];
        assert_eq!(balance(&entries), i64::MAX);
    }
}
