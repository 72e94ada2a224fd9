//! Loads the `seed` config section into the in-memory store.

use chrono::Utc;
use tracing::info;

use perks_booking::{MemoryStore, PerksStore};
use perks_ledger::EntryBuilder;
use perks_types::{Actor, ActorId, LedgerCategory, Rental, RentalId};

use crate::config::SeedSection;
use crate::error::ServerError;

/// Insert every seeded actor, session, opening balance, and rental.
pub async fn apply(store: &MemoryStore, seed: &SeedSection) -> Result<(), ServerError> {
    for entry in &seed.actors {
        let actor = Actor {
            id: ActorId::new(),
            display_name: entry.name.clone(),
            email: entry.email.clone(),
            role: entry.role,
            disabled: entry.disabled,
            created_at: Utc::now(),
        };
        store.insert_actor(actor.clone()).await;
        store.insert_session(&entry.token, actor.id).await;

        if entry.points > 0 {
            let credit = EntryBuilder::award(
                actor.id,
                LedgerCategory::Earn,
                entry.points,
                "Opening balance".to_owned(),
            )
            .map_err(|e| ServerError::Seed(format!("{}: {e}", entry.email)))?;
            store.append_entry(&credit).await?;
        }
    }

    for entry in &seed.rentals {
        let rental = Rental {
            id: RentalId::new(),
            title: entry.title.clone(),
            description: entry.description.clone(),
            location: entry.location.clone(),
            image_ref: entry.image_ref.clone(),
            nightly_points: entry.nightly_points,
            weekly_points: entry.weekly_points,
            active: entry.active,
            created_at: Utc::now(),
        };
        store.save_rental(&rental).await?;
    }

    info!(
        actors = seed.actors.len(),
        rentals = seed.rentals.len(),
        "Seed data loaded"
    );
    Ok(())
}
