#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod sweep;

pub use config::Config;

/// Assemble the server: routes, catchers, and fairings.
///
/// Fairing order matters: the database fairing reads the application config,
/// and the status sweeper needs the database in managed state.
pub async fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .register("/", error::catchers())
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .attach(config::DatabaseFairing)
        .attach(sweep::StatusSweepFairing)
}
