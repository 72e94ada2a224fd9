//! Booking/debit reconciliation.
//!
//! Every booking must be paired with exactly one `Spend` entry whose amount
//! is the negated booking cost, and no `Spend` entry may point at a booking
//! that does not exist. The booking workflow writes both rows in a single
//! transaction, so under correct operation this check always comes back
//! clean. It exists to detect drift from manual database edits or a
//! storage backend that lost a write.
//!
//! Balances are checked too: spends are never allowed to exceed the
//! balance, so a negative balance means the ledger is inconsistent.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use perks_types::{ActorId, Booking, BookingId, LedgerCategory, LedgerEntry, LedgerEntryId};

/// A single inconsistency found by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// A booking has no matching debit.
    MissingDebit {
        /// The unpaid booking.
        booking_id: BookingId,
    },
    /// A booking has more than one debit.
    DuplicateDebit {
        /// The booking charged more than once.
        booking_id: BookingId,
        /// Number of debits found.
        count: usize,
    },
    /// The debit does not equal the negated booking cost.
    AmountMismatch {
        /// The booking.
        booking_id: BookingId,
        /// Amount the debit should carry (`-points_cost`).
        expected: i64,
        /// Sum of the debits actually recorded.
        actual: i64,
    },
    /// A spend entry refers to a booking that does not exist.
    OrphanDebit {
        /// The dangling entry.
        entry_id: LedgerEntryId,
        /// The booking id it refers to.
        booking_id: BookingId,
    },
    /// An actor's entries sum to less than zero.
    NegativeBalance {
        /// The overdrawn actor.
        actor_id: ActorId,
        /// The derived balance.
        balance: i64,
    },
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Number of bookings examined.
    pub bookings_checked: usize,
    /// Number of ledger entries examined.
    pub entries_checked: usize,
    /// Everything that did not line up.
    pub discrepancies: Vec<Discrepancy>,
}

impl ReconciliationReport {
    /// Whether no discrepancies were found.
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Cross-check bookings against the ledger.
///
/// `bookings` and `entries` should be complete snapshots of their tables;
/// passing a subset produces spurious orphan or missing-debit findings.
pub fn reconcile(bookings: &[Booking], entries: &[LedgerEntry]) -> ReconciliationReport {
    let mut debits: BTreeMap<BookingId, Vec<&LedgerEntry>> = BTreeMap::new();
    let mut balances: BTreeMap<ActorId, Vec<&LedgerEntry>> = BTreeMap::new();

    for entry in entries {
        balances.entry(entry.actor_id).or_default().push(entry);
        if let Some(booking_id) = entry.booking_id {
            if entry.category == LedgerCategory::Spend {
                debits.entry(booking_id).or_default().push(entry);
            }
        }
    }

    let mut discrepancies = Vec::new();
    let known: BTreeSet<BookingId> = bookings.iter().map(|b| b.id).collect();

    for booking in bookings {
        let paid = debits.get(&booking.id).map_or(&[][..], Vec::as_slice);
        match paid {
            [] => discrepancies.push(Discrepancy::MissingDebit {
                booking_id: booking.id,
            }),
            [single] => {
                let expected = booking.points_cost.saturating_neg();
                if single.amount != expected {
                    discrepancies.push(Discrepancy::AmountMismatch {
                        booking_id: booking.id,
                        expected,
                        actual: single.amount,
                    });
                }
            }
            many => discrepancies.push(Discrepancy::DuplicateDebit {
                booking_id: booking.id,
                count: many.len(),
            }),
        }
    }

    for (booking_id, linked) in &debits {
        if known.contains(booking_id) {
            continue;
        }
        for entry in linked {
            discrepancies.push(Discrepancy::OrphanDebit {
                entry_id: entry.id,
                booking_id: *booking_id,
            });
        }
    }

    for (actor_id, own) in &balances {
        let balance = crate::balance(own.iter().copied());
        if balance < 0 {
            discrepancies.push(Discrepancy::NegativeBalance {
                actor_id: *actor_id,
                balance,
            });
        }
    }

    if !discrepancies.is_empty() {
        tracing::warn!(
            count = discrepancies.len(),
            "Reconciliation found booking/ledger drift"
        );
    }

    ReconciliationReport {
        bookings_checked: bookings.len(),
        entries_checked: entries.len(),
        discrepancies,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use perks_types::{BookingStatus, RentalId, StayRange};

    use super::*;
    use crate::EntryBuilder;

    fn booking(actor_id: ActorId, points_cost: i64) -> Booking {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap_or_default();
        Booking {
            id: BookingId::new(),
            rental_id: RentalId::new(),
            actor_id,
            stay: StayRange::new(start, end).unwrap(),
            status: BookingStatus::Booked,
            points_cost,
            created_at: Utc::now(),
        }
    }

    fn credit(actor_id: ActorId, amount: i64) -> Option<LedgerEntry> {
        EntryBuilder::new(actor_id, LedgerCategory::Earn)
            .amount(amount)
            .reason("Monthly recognition".to_owned())
            .build()
            .ok()
    }

    fn debit(b: &Booking) -> Option<LedgerEntry> {
        EntryBuilder::booking_debit(b).build().ok()
    }

    #[test]
    fn paired_bookings_are_clean() {
        let actor = ActorId::new();
        let b = booking(actor, 200);
        let entries: Vec<LedgerEntry> = [credit(actor, 500), debit(&b)].into_iter().flatten().collect();

        let report = reconcile(&[b], &entries);
        assert!(report.is_clean(), "{:?}", report.discrepancies);
        assert_eq!(report.bookings_checked, 1);
        assert_eq!(report.entries_checked, 2);
    }

    #[test]
    fn booking_without_debit_is_flagged() {
        let actor = ActorId::new();
        let b = booking(actor, 200);
        let entries: Vec<LedgerEntry> = credit(actor, 500).into_iter().collect();

        let report = reconcile(std::slice::from_ref(&b), &entries);
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy::MissingDebit { booking_id: b.id }]
        );
    }

    #[test]
    fn wrong_debit_amount_is_flagged() {
        let actor = ActorId::new();
        let b = booking(actor, 200);
        let mut wrong = booking(actor, 150);
        wrong.id = b.id;
        let entries: Vec<LedgerEntry> = [credit(actor, 500), debit(&wrong)].into_iter().flatten().collect();

        let report = reconcile(std::slice::from_ref(&b), &entries);
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy::AmountMismatch {
                booking_id: b.id,
                expected: -200,
                actual: -150,
            }]
        );
    }

    #[test]
    fn double_charge_is_flagged() {
        let actor = ActorId::new();
        let b = booking(actor, 100);
        let entries: Vec<LedgerEntry> = [credit(actor, 500), debit(&b), debit(&b)].into_iter().flatten().collect();

        let report = reconcile(std::slice::from_ref(&b), &entries);
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy::DuplicateDebit { booking_id: b.id, count: 2 }]
        );
    }

    #[test]
    fn debit_for_unknown_booking_is_orphaned() {
        let actor = ActorId::new();
        let ghost = booking(actor, 100);
        let entries: Vec<LedgerEntry> = [credit(actor, 500), debit(&ghost)].into_iter().flatten().collect();

        let report = reconcile(&[], &entries);
        assert!(matches!(
            report.discrepancies.as_slice(),
            [Discrepancy::OrphanDebit { booking_id, .. }] if *booking_id == ghost.id
        ));
    }

    #[test]
    fn overdrawn_actor_is_flagged() {
        let actor = ActorId::new();
        let b = booking(actor, 300);
        let entries: Vec<LedgerEntry> = [credit(actor, 100), debit(&b)].into_iter().flatten().collect();

        let report = reconcile(std::slice::from_ref(&b), &entries);
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy::NegativeBalance { actor_id: actor, balance: -200 }]
        );
    }
}
