//! Grouping and ungrouping of the selection.
//!
//! A group stores its children bottom-first, positioned relative to the
//! group's top-left corner at the size the group had when it was made
//! (`base_width` x `base_height`). Resizing, rotating, shearing or flipping
//! the group afterwards is folded into the children when it is ungrouped.

#[cfg(test)]
#[path = "group_test.rs"]
mod group_test;

use kurbo::Point;

use crate::element::{Element, ElementId, ElementKind, Group};
use crate::engine::{Scene, SceneEvent};
use crate::transform::{local_to_canvas, transformed_bounds};

/// Build a group from `members` given bottom-first.
fn make_group(members: Vec<Element>) -> Option<Element> {
    let bounds = members
        .iter()
        .map(|e| transformed_bounds(e, 1.0))
        .reduce(|acc, r| acc.union(r))?;
    let children = members
        .into_iter()
        .map(|mut child| {
            child.selected = false;
            child.x -= bounds.x0;
            child.y -= bounds.y0;
            child
        })
        .collect();
    let group = Group { children, base_width: bounds.width(), base_height: bounds.height() };
    Some(Element::new(ElementKind::Group(group), bounds.x0, bounds.y0, bounds.width(), bounds.height()))
}

/// The children of `group` placed on the canvas, bottom-first, with the
/// group's current size, rotation, shear and flips applied.
fn restore_children(group: &Element, data: &Group) -> Vec<Element> {
    let sx = if data.base_width > 0.0 { group.width / data.base_width } else { 1.0 };
    let sy = if data.base_height > 0.0 { group.height / data.base_height } else { 1.0 };
    let to_canvas = local_to_canvas(group, 1.0);
    let mirrored = group.flip_horizontal != group.flip_vertical;

    data.children
        .iter()
        .map(|child| {
            let mut restored = child.clone();
            restored.width = child.width * sx;
            restored.height = child.height * sy;

            let mut centre = Point::new((child.x + child.width / 2.0) * sx, (child.y + child.height / 2.0) * sy);
            if group.flip_horizontal {
                centre.x = group.width - centre.x;
            }
            if group.flip_vertical {
                centre.y = group.height - centre.y;
            }
            let centre = to_canvas * centre;
            restored.x = centre.x - restored.width / 2.0;
            restored.y = centre.y - restored.height / 2.0;

            let own = if mirrored { -child.rotation } else { child.rotation };
            restored.set_rotation(own + group.rotation);
            restored.shear_x = child.shear_x + group.shear_x;
            restored.shear_y = child.shear_y + group.shear_y;
            restored.flip_horizontal = child.flip_horizontal != group.flip_horizontal;
            restored.flip_vertical = child.flip_vertical != group.flip_vertical;
            restored.selected = false;
            restored
        })
        .collect()
}

impl Scene {
    /// Wrap the selected mutable, groupable elements in one group placed on
    /// top. Needs at least two such elements and no pass-through session.
    pub fn group_selected(&mut self) -> bool {
        if self.selection.is_pass_through() {
            return false;
        }
        // Bottom-most first, the order children are drawn in.
        let members: Vec<Element> = self
            .store
            .iter()
            .rev()
            .filter(|e| e.selected && e.is_mutable() && e.is_groupable() && !e.is_unbounded())
            .cloned()
            .collect();
        if members.len() < 2 {
            return false;
        }
        let ids: Vec<ElementId> = members.iter().map(|e| e.id).collect();
        let Some(group) = make_group(members) else {
            return false;
        };
        let group_id = group.id;

        self.save_context();
        self.suspend_save();
        for id in &ids {
            self.detach(id);
        }
        self.attach(group);
        self.select_none();
        self.selection.select(&mut self.store, &group_id);
        self.resume_save();
        self.last_command = None;
        tracing::info!(id = %group_id, count = ids.len(), "grouped selection");
        self.selection_changed(Some(group_id));
        true
    }

    /// Break every selected group back into its children, at the group's
    /// layer. The restored children end up selected.
    pub fn ungroup_selected(&mut self) -> bool {
        if self.selection.is_pass_through() {
            return false;
        }
        let groups: Vec<ElementId> =
            self.store.iter().rev().filter(|e| e.selected && e.is_group()).map(|e| e.id).collect();
        if groups.is_empty() {
            return false;
        }

        self.save_context();
        self.suspend_save();
        let mut restored_ids = Vec::new();
        for id in &groups {
            let Some(index) = self.store.layer_index_of(id) else {
                continue;
            };
            let Some(group) = self.detach(id) else {
                continue;
            };
            let ElementKind::Group(data) = &group.kind else {
                continue;
            };
            // Each insert at `index` lands above the previous one.
            for child in restore_children(&group, data) {
                let child_id = child.id;
                if self.attach_at(index, child) {
                    restored_ids.push(child_id);
                }
            }
        }
        self.select_none();
        for id in &restored_ids {
            self.selection.select(&mut self.store, id);
        }
        self.resume_save();
        self.last_command = None;
        tracing::info!(groups = groups.len(), restored = restored_ids.len(), "ungrouped selection");
        let last = self.selection.last_selected(&self.store);
        self.selection_changed(last);
        true
    }
}
