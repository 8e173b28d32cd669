//! initrack - tabletop combat state engine
//!
//! Turn order, hit points, hit dice, death saves and round-scoped
//! consumables as pure state transitions, plus a small CLI around
//! persisted JSON snapshots.

pub mod combat;
pub mod config;
pub mod store;

pub use config::Config;
