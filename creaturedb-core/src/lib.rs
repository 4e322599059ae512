//! # Creature Database Core Library
//!
//! Game-agnostic storage for designer-authored creature records.
//!
//! A [`Creature`] holds one creature's editable attributes (name, health,
//! immortality flag, portrait and animator asset references, movement
//! speeds). A [`CreatureStore`] keeps an ordered collection of them, loaded
//! once from an [`AssetStorage`] backend and written back after every
//! successful mutation.
//!
//! ## Contract
//!
//! - Identifiers are unique within a store.
//! - Insertion order is preserved; the collection is never re-sorted.
//! - Duplicate ids on `add` and unknown ids on `remove`/`update` are logged
//!   as warnings and leave both memory and the asset untouched.
//! - Only persistence failures surface as errors, and they roll the
//!   in-memory change back.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod creature;
pub mod error;
pub mod persistence;
pub mod store;
pub mod types;

pub use config::{CreatureDbConfig, CreatureDefaults};
pub use creature::Creature;
pub use error::CreatureDbError;
pub use persistence::AssetStorage;
pub use store::{CreatureStore, SharedStore};
pub use types::*;
