//! Z-ordered element store.
//!
//! `ZOrderStore` keeps the authoritative element list. The draw order is a
//! sequence of ids where index 0 is the topmost layer; the elements themselves
//! live in an id-keyed map so lookups stay O(1). Every mutation goes through a
//! method here so the two views never disagree.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use crate::element::{Element, ElementId};

#[derive(Debug, Clone, Default)]
pub struct ZOrderStore {
    order: Vec<ElementId>,
    objects: HashMap<ElementId, Element>,
}

impl ZOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element on top. Returns false if the id is already present.
    pub fn add(&mut self, element: Element) -> bool {
        if self.objects.contains_key(&element.id) {
            return false;
        }
        self.order.insert(0, element.id);
        self.objects.insert(element.id, element);
        true
    }

    /// Insert an element at a layer index, clamped to the bottom.
    pub fn insert_at(&mut self, index: usize, element: Element) -> bool {
        if self.objects.contains_key(&element.id) {
            return false;
        }
        let index = index.min(self.order.len());
        self.order.insert(index, element.id);
        self.objects.insert(element.id, element);
        true
    }

    /// Remove an element, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let element = self.objects.remove(id)?;
        self.order.retain(|o| o != id);
        Some(element)
    }

    /// Substitute `new` for the element `old`, keeping its layer.
    ///
    /// Fails when `old` is absent or when `new` carries the id of a different
    /// live element.
    pub fn replace(&mut self, old: &ElementId, new: Element) -> Option<Element> {
        let index = self.layer_index_of(old)?;
        if new.id != *old && self.objects.contains_key(&new.id) {
            return None;
        }
        let previous = self.objects.remove(old)?;
        self.order[index] = new.id;
        self.objects.insert(new.id, new);
        Some(previous)
    }

    pub fn move_to_front(&mut self, id: &ElementId) -> bool {
        match self.layer_index_of(id) {
            Some(index) if index > 0 => {
                let id = self.order.remove(index);
                self.order.insert(0, id);
                true
            }
            _ => false,
        }
    }

    pub fn move_to_back(&mut self, id: &ElementId) -> bool {
        match self.layer_index_of(id) {
            Some(index) if index + 1 < self.order.len() => {
                let id = self.order.remove(index);
                self.order.push(id);
                true
            }
            _ => false,
        }
    }

    /// Swap with the element one layer above.
    pub fn move_forward(&mut self, id: &ElementId) -> bool {
        match self.layer_index_of(id) {
            Some(index) if index > 0 => {
                self.order.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap with the element one layer below.
    pub fn move_backward(&mut self, id: &ElementId) -> bool {
        match self.layer_index_of(id) {
            Some(index) if index + 1 < self.order.len() => {
                self.order.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.objects.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.objects.contains_key(id)
    }

    /// 0-based depth from the top, or `None` when absent.
    #[must_use]
    pub fn layer_index_of(&self, id: &ElementId) -> Option<usize> {
        if !self.objects.contains_key(id) {
            return None;
        }
        self.order.iter().position(|o| o == id)
    }

    /// Ids from top to bottom.
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.order
    }

    /// Elements from top to bottom.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> + '_ {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Apply `f` to every element.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        for element in self.objects.values_mut() {
            f(element);
        }
    }

    /// Deep copy of the elements in draw order (top first).
    #[must_use]
    pub fn snapshot(&self) -> Vec<Element> {
        self.iter().cloned().collect()
    }

    /// Replace the whole contents with `elements` (top first).
    ///
    /// Later duplicates of an id are dropped so the store stays consistent.
    pub fn install(&mut self, elements: Vec<Element>) {
        self.clear();
        for element in elements {
            if self.objects.contains_key(&element.id) {
                tracing::warn!(id = %element.id, "duplicate id dropped on install");
                continue;
            }
            self.order.push(element.id);
            self.objects.insert(element.id, element);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.objects.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the draw order and the id index describe the same set, each id
    /// appearing exactly once.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.objects.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(self.order.len());
        self.order.iter().all(|id| {
            seen.insert(*id) && self.objects.get(id).is_some_and(|e| e.id == *id)
        })
    }
}
