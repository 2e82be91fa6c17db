//! Selection model.
//!
//! "Selected" is a flag on each element. This module keeps the state that sits
//! beside those flags: the last-selected element (an id re-resolved through
//! the store on every access), the pass-through target that receives routed
//! input, and the modifier latches.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::element::ElementId;
use crate::input::Latches;
use crate::store::ZOrderStore;

#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    last_selected: Option<ElementId>,
    pass_through: Option<ElementId>,
    pub latches: Latches,
}

impl SelectionModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select one element. Returns false when it is absent or unselectable.
    pub fn select(&mut self, store: &mut ZOrderStore, id: &ElementId) -> bool {
        let Some(element) = store.get_mut(id) else {
            return false;
        };
        if !element.is_selectable() {
            return false;
        }
        element.selected = true;
        self.last_selected = Some(*id);
        true
    }

    /// Clear one element's flag. Returns false when it is absent.
    pub fn deselect(&mut self, store: &mut ZOrderStore, id: &ElementId) -> bool {
        let Some(element) = store.get_mut(id) else {
            return false;
        };
        element.selected = false;
        self.forget(id);
        true
    }

    /// Additive click: deselect when already selected, else select. Returns
    /// the new selected state.
    pub fn toggle_additive(&mut self, store: &mut ZOrderStore, id: &ElementId) -> bool {
        if store.get(id).is_some_and(|e| e.selected) {
            self.deselect(store, id);
            false
        } else {
            self.select(store, id)
        }
    }

    /// Select every selectable element. Returns how many are selected.
    pub fn select_all(&mut self, store: &mut ZOrderStore) -> usize {
        let ids: Vec<ElementId> = store.iter().filter(|e| e.is_selectable()).map(|e| e.id).collect();
        for id in &ids {
            self.select(store, id);
        }
        ids.len()
    }

    /// Deselect everything, end pass-through and reset the latches.
    ///
    /// Returns the ids that were selected, each of which has left edit mode.
    pub fn select_none(&mut self, store: &mut ZOrderStore) -> Vec<ElementId> {
        let mut ended = Vec::new();
        store.for_each_mut(|e| {
            if e.selected {
                ended.push(e.id);
            }
            e.selected = false;
        });
        self.last_selected = None;
        self.pass_through = None;
        self.latches.reset();
        ended
    }

    /// Select the next selectable element below the last-selected one,
    /// wrapping at the bottom. The rest of the selection is cleared.
    pub fn select_next(&mut self, store: &mut ZOrderStore) -> Option<ElementId> {
        self.cycle(store, true)
    }

    /// Select the next selectable element above the last-selected one,
    /// wrapping at the top.
    pub fn select_prev(&mut self, store: &mut ZOrderStore) -> Option<ElementId> {
        self.cycle(store, false)
    }

    fn cycle(&mut self, store: &mut ZOrderStore, downward: bool) -> Option<ElementId> {
        if store.is_empty() || self.pass_through.is_some() {
            return None;
        }
        let len = store.len();
        let current = self.last_selected(store).and_then(|id| store.layer_index_of(&id));
        let target = (1..=len).find_map(|step| {
            let index = match (current, downward) {
                (Some(c), true) => (c + step) % len,
                (Some(c), false) => (c + len - step % len) % len,
                (None, true) => (step - 1) % len,
                (None, false) => (len - step % len) % len,
            };
            let id = store.ids()[index];
            store.get(&id).filter(|e| e.is_selectable()).map(|e| e.id)
        })?;
        self.select_none(store);
        self.select(store, &target);
        Some(target)
    }

    /// Ids of the selected elements, top to bottom.
    #[must_use]
    pub fn selected_ids(&self, store: &ZOrderStore) -> Vec<ElementId> {
        store.iter().filter(|e| e.selected).map(|e| e.id).collect()
    }

    #[must_use]
    pub fn has_selection(&self, store: &ZOrderStore) -> bool {
        store.iter().any(|e| e.selected)
    }

    /// The last-selected element, if it is still present and selected.
    #[must_use]
    pub fn last_selected(&self, store: &ZOrderStore) -> Option<ElementId> {
        self.last_selected.filter(|id| store.get(id).is_some_and(|e| e.selected))
    }

    #[must_use]
    pub fn pass_through(&self) -> Option<ElementId> {
        self.pass_through
    }

    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.pass_through.is_some()
    }

    /// Route input to `id`. It must already be selected.
    pub fn set_pass_through(&mut self, store: &ZOrderStore, id: &ElementId) -> bool {
        if !store.get(id).is_some_and(|e| e.selected) {
            return false;
        }
        self.pass_through = Some(*id);
        true
    }

    /// End pass-through routing. Returns the element that was receiving it.
    pub fn clear_pass_through(&mut self) -> Option<ElementId> {
        self.pass_through.take()
    }

    /// Drop every handle to `id`. Called when it is deselected or removed.
    pub fn forget(&mut self, id: &ElementId) {
        if self.last_selected == Some(*id) {
            self.last_selected = None;
        }
        if self.pass_through == Some(*id) {
            self.pass_through = None;
        }
    }
}
