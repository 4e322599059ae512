//! # creaturedb-editor — Editor Session for the Creature Database
//!
//! Toolkit-independent glue between a list-and-details editor panel and
//! the `creaturedb-core` store. A widget toolkit drives an
//! [`EditorSession`] from its callbacks and re-renders whenever a
//! subscribed listener receives a [`StoreEvent`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Editor panel (any toolkit)         │
//! │   list ◄── rows()    details ◄── selected() │
//! │     │ add / remove / select / search        │
//! │     │ field committed ──► commit(edit)      │
//! │  ┌──▼──────────────────────────────┐        │
//! │  │        creaturedb-editor        │        │
//! │  │   EditorSession ──► StoreEvent  │        │
//! │  └──────────────┬──────────────────┘        │
//! │  ┌──────────────▼──────────────────┐        │
//! │  │        creaturedb-core          │        │
//! │  └─────────────────────────────────┘        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events` — change notifications and per-field edits
//! - `session` — selection, search filter, CRUD actions

pub mod events;
pub mod session;

pub use events::{FieldEdit, StoreEvent};
pub use session::{EditorSession, ListRow};
