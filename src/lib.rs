//! charsheet - character sheet rules core
//!
//! Dice notation, ability math, resource pools, conditions and reference
//! data lookups for a tabletop character sheet. Everything here is
//! synchronous and free of I/O; storage and rendering live elsewhere.

pub mod abilities;
pub mod conditions;
pub mod config;
pub mod dice;
pub mod error;
pub mod resources;
pub mod ruleset;
pub mod sheet;

pub use config::Settings;
pub use error::{Result, RulesError};
