//! ENS lookup web application: the lookup page, its JSON API and the
//! `enslookup` command line.

pub mod config;
pub mod page;
pub mod server;
pub mod sessions;
pub mod text;

pub use config::Settings;
pub use server::{build_router, start_server, AppState};
