//! Editor session — the state behind a list-and-details creature panel.
//!
//! The panel calls into the session from its widget callbacks; the session
//! applies the change to the store and notifies listeners so the panel can
//! re-render. Field commits always edit a copy of the selected record and
//! write it back under the same id.

use creaturedb_core::error::Result;
use creaturedb_core::{AssetRef, Creature, CreatureDefaults, CreatureId, CreatureStore};
use tracing::{debug, warn};

use crate::events::{FieldEdit, StoreEvent};

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

/// One entry of the creature list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    /// Record id, passed back to `select`/`remove_creature`.
    pub id: CreatureId,
    /// Display name.
    pub name: String,
    /// Thumbnail; the panel shows a placeholder when absent.
    pub portrait: Option<AssetRef>,
}

impl From<&Creature> for ListRow {
    fn from(creature: &Creature) -> Self {
        Self {
            id: creature.id.clone(),
            name: creature.name.clone(),
            portrait: creature.portrait.clone(),
        }
    }
}

/// Selection, search filter and CRUD actions over an injected store.
pub struct EditorSession {
    store: CreatureStore,
    defaults: CreatureDefaults,
    selection: Option<CreatureId>,
    search: String,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("store", &self.store)
            .field("selection", &self.selection)
            .field("search", &self.search)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Start a session over `store`; new creatures use `defaults`.
    #[must_use]
    pub fn new(store: CreatureStore, defaults: CreatureDefaults) -> Self {
        Self {
            store,
            defaults,
            selection: None,
            search: String::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener called after every change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// "Add creature" button: append a default creature.
    ///
    /// Returns the new id, or `None` if the store refused it.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store cannot be saved.
    pub fn add_creature(&mut self) -> Result<Option<CreatureId>> {
        let creature = Creature::new_default(&self.defaults);
        let id = creature.id.clone();
        if !self.store.add(creature)? {
            return Ok(None);
        }
        self.emit(&StoreEvent::Added { id: id.clone() });
        Ok(Some(id))
    }

    /// Delete button on a list row. Clears the selection if it pointed there.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store cannot be saved.
    pub fn remove_creature(&mut self, id: &CreatureId) -> Result<bool> {
        if !self.store.remove(id)? {
            return Ok(false);
        }
        self.emit(&StoreEvent::Removed { id: id.clone() });
        if self.selection.as_ref() == Some(id) {
            self.clear_selection();
        }
        Ok(true)
    }

    /// List selection. Returns `false` (and changes nothing) for unknown ids.
    pub fn select(&mut self, id: &CreatureId) -> bool {
        if !self.store.contains(id) {
            warn!(id = %id, "Cannot select unknown creature");
            return false;
        }
        if self.selection.as_ref() != Some(id) {
            self.selection = Some(id.clone());
            self.emit(&StoreEvent::Selected {
                id: Some(id.clone()),
            });
        }
        true
    }

    /// Drop the selection; the details panel shows its empty message.
    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.emit(&StoreEvent::Selected { id: None });
        }
    }

    /// A details-panel field was committed: update a copy of the selected
    /// creature and write it back.
    ///
    /// Returns `Ok(false)` with a warning if nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store cannot be saved.
    pub fn commit(&mut self, edit: FieldEdit) -> Result<bool> {
        let Some(id) = self.selection.clone() else {
            warn!(field = edit.field_name(), "Field committed with no creature selected");
            return Ok(false);
        };
        debug!(id = %id, field = edit.field_name(), "Committing field");
        if !self.store.update_with(&id, |c| edit.apply(c))? {
            return Ok(false);
        }
        self.emit(&StoreEvent::Updated { id });
        Ok(true)
    }

    /// Search box changed.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search {
            self.search.clone_from(&term);
            self.emit(&StoreEvent::FilterChanged { term });
        }
    }

    // ------------------------------------------------------------------
    // View data
    // ------------------------------------------------------------------

    /// Rows for the list view, filtered by the search term, in store order.
    #[must_use]
    pub fn rows(&self) -> Vec<ListRow> {
        self.store
            .iter()
            .filter(|c| c.matches_search(&self.search))
            .map(ListRow::from)
            .collect()
    }

    /// The selected creature, for the details panel.
    #[must_use]
    pub fn selected(&self) -> Option<&Creature> {
        self.selection.as_ref().and_then(|id| self.store.find(id))
    }

    /// Id of the selected creature.
    #[must_use]
    pub fn selection(&self) -> Option<&CreatureId> {
        self.selection.as_ref()
    }

    /// Current search term.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Read access to the underlying store.
    #[must_use]
    pub fn store(&self) -> &CreatureStore {
        &self.store
    }

    /// End the session and hand the store back.
    #[must_use]
    pub fn into_store(self) -> CreatureStore {
        self.store
    }

    fn emit(&mut self, event: &StoreEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use creaturedb_core::persistence::MemoryAsset;
    use std::sync::{Arc, Mutex};

    fn session() -> EditorSession {
        let store = CreatureStore::load(MemoryAsset::new()).expect("load");
        EditorSession::new(store, CreatureDefaults::default())
    }

    fn recorded(session: &mut EditorSession) -> Arc<Mutex<Vec<StoreEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        session.subscribe(move |e| sink.lock().expect("lock").push(e.clone()));
        log
    }

    #[test]
    fn add_creature_uses_defaults_and_notifies() {
        let mut s = session();
        let log = recorded(&mut s);

        let id = s.add_creature().expect("add").expect("id");
        let rows = s.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "New creature");
        assert_eq!(*log.lock().expect("lock"), vec![StoreEvent::Added { id }]);
    }

    #[test]
    fn commit_without_selection_is_noop() {
        let mut s = session();
        s.add_creature().expect("add");
        let log = recorded(&mut s);

        assert!(!s.commit(FieldEdit::Name("Wolf".into())).expect("commit"));
        assert!(log.lock().expect("lock").is_empty());
    }

    #[test]
    fn commit_updates_selected_creature() {
        let mut s = session();
        let id = s.add_creature().expect("add").expect("id");
        assert!(s.select(&id));

        assert!(s.commit(FieldEdit::Name("Wolf".into())).expect("commit"));
        assert!(s.commit(FieldEdit::SprintMultiplier(2.0)).expect("commit"));

        let selected = s.selected().expect("selected");
        assert_eq!(selected.id, id);
        assert_eq!(selected.name, "Wolf");
        assert!((selected.sprint_multiplier - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn removing_selected_clears_selection() {
        let mut s = session();
        let id = s.add_creature().expect("add").expect("id");
        s.select(&id);
        let log = recorded(&mut s);

        assert!(s.remove_creature(&id).expect("remove"));
        assert!(s.selected().is_none());
        assert_eq!(
            *log.lock().expect("lock"),
            vec![
                StoreEvent::Removed { id },
                StoreEvent::Selected { id: None },
            ]
        );
    }

    #[test]
    fn select_unknown_is_refused() {
        let mut s = session();
        assert!(!s.select(&CreatureId::from("ghost")));
        assert!(s.selection().is_none());
    }

    #[test]
    fn search_filters_rows() {
        let mut s = session();
        for name in ["Wolf", "Bear", "Werewolf"] {
            let id = s.add_creature().expect("add").expect("id");
            s.select(&id);
            s.commit(FieldEdit::Name(name.into())).expect("commit");
        }

        s.set_search("wolf");
        let names: Vec<_> = s.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Wolf", "Werewolf"]);

        s.set_search("");
        assert_eq!(s.rows().len(), 3);
    }
}
