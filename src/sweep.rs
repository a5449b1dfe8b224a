//! Periodic reconciliation of stored election statuses against the clock.
//!
//! Statuses are denormalised onto election documents so that list queries can
//! filter on them directly. Routes derive the live status on read, but stored
//! values still drift between requests. The sweeper catches up every
//! `sweep_interval` seconds with two bulk updates.

use chrono::{DateTime, Utc};
use mongodb::{bson::doc, bson::Document, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::{self, sync::Mutex, task::JoinHandle},
    Build, Orbit, Rocket,
};

use crate::config::Config;
use crate::error::Result;
use crate::model::{
    common::ElectionStatus,
    db::election::Election,
    mongodb::Coll,
};

/// What a single sweep changed.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct SweepOutcome {
    pub activated: u64,
    pub closed: u64,
}

/// Filter matching active elections whose end time has passed.
pub fn close_due(now: DateTime<Utc>) -> Document {
    doc! {
        "status": ElectionStatus::Active,
        "end_time": { "$lte": now },
    }
}

/// Filter matching upcoming elections whose window is currently open.
/// An upcoming election whose entire window has already passed is left
/// alone; it never ran, so it never closes.
pub fn activate_due(now: DateTime<Utc>) -> Document {
    doc! {
        "status": ElectionStatus::Upcoming,
        "start_time": { "$lte": now },
        "end_time": { "$gt": now },
    }
}

/// Bring stored statuses in line with the given instant.
/// An election whose entire window passed between sweeps matches neither
/// filter: it was never activated, so it stays upcoming rather than being
/// closed.
pub async fn reconcile_statuses(
    elections: &Coll<Election>,
    now: DateTime<Utc>,
) -> Result<SweepOutcome> {
    let closed = elections
        .update_many(
            close_due(now),
            doc! { "$set": { "status": ElectionStatus::Closed } },
            None,
        )
        .await?
        .modified_count;

    let activated = elections
        .update_many(
            activate_due(now),
            doc! { "$set": { "status": ElectionStatus::Active } },
            None,
        )
        .await?
        .modified_count;

    Ok(SweepOutcome { activated, closed })
}

/// Handle on the background sweep loop.
#[derive(Default)]
pub struct StatusSweeper {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl StatusSweeper {
    /// Start sweeping at the given interval. The first sweep runs
    /// immediately so stale statuses are corrected on boot.
    pub async fn start(&self, db: Database, interval: std::time::Duration) {
        let task = tokio::spawn(async move {
            let elections = Coll::from_db(&db);
            loop {
                match reconcile_statuses(&elections, Utc::now()).await {
                    Ok(outcome) if outcome.activated > 0 || outcome.closed > 0 => {
                        info!(
                            "Status sweep: activated {}, closed {}",
                            outcome.activated, outcome.closed
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!("Status sweep failed: {e}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
        let old = self.handle.lock().await.replace(task);
        if let Some(old) = old {
            old.abort();
        }
    }

    pub async fn stop(&self) {
        if let Some(task) = self.handle.lock().await.take() {
            task.abort();
        }
    }
}

/// A fairing that runs the status sweeper for the lifetime of the server.
pub struct StatusSweepFairing;

#[rocket::async_trait]
impl Fairing for StatusSweepFairing {
    fn info(&self) -> Info {
        Info {
            name: "Status sweeper",
            kind: Kind::Ignite | Kind::Liftoff | Kind::Shutdown,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        Ok(rocket.manage(StatusSweeper::default()))
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let db = rocket
            .state::<Database>()
            .expect("DatabaseFairing must be attached before StatusSweepFairing")
            .clone();
        let config = rocket
            .state::<Config>()
            .expect("ConfigFairing must be attached before StatusSweepFairing");
        let sweeper = rocket
            .state::<StatusSweeper>()
            .expect("sweeper managed on ignite");
        sweeper.start(db, config.sweep_interval()).await;
        info!(
            "Status sweeper running every {}s",
            config.sweep_interval().as_secs()
        );
    }

    async fn on_shutdown(&self, rocket: &Rocket<Orbit>) {
        if let Some(sweeper) = rocket.state::<StatusSweeper>() {
            sweeper.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mongodb::bson::Bson;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn close_filter_targets_expired_active_elections() {
        let now = at(1_700_000_000);
        let filter = close_due(now);
        assert_eq!(filter.get_str("status").unwrap(), "active");
        let bound = filter.get_document("end_time").unwrap();
        assert_eq!(
            bound.get("$lte").unwrap(),
            &Bson::DateTime(now.into()),
        );
    }

    #[test]
    fn activate_filter_skips_elections_whose_window_passed() {
        let now = at(1_700_000_000);
        let filter = activate_due(now);
        assert_eq!(filter.get_str("status").unwrap(), "upcoming");
        // Both bounds present: started already, but not yet ended.
        assert_eq!(
            filter.get_document("start_time").unwrap().get("$lte").unwrap(),
            &Bson::DateTime(now.into()),
        );
        assert_eq!(
            filter.get_document("end_time").unwrap().get("$gt").unwrap(),
            &Bson::DateTime(now.into()),
        );
    }
}
