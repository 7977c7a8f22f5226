use std::collections::HashMap;

use crate::dom::{Dom, ElementId, ElementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(width: u16, height: u16) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn right(&self) -> u16 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> u16 {
        self.y + self.height
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Where each visible element landed during the last render. Hidden
/// elements get no rect.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    rects: HashMap<ElementId, Rect>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ElementId, rect: Rect) {
        self.rects.insert(id, rect);
    }

    pub fn get(&self, id: ElementId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Find the deepest visible button at the given coordinates. Children are
/// tested in reverse order so the last-rendered element wins on overlap.
pub fn hit_test(dom: &Dom, layout: &Layout, root: ElementId, x: u16, y: u16) -> Option<ElementId> {
    let rect = layout.get(root)?;
    if !rect.contains(x, y) {
        return None;
    }

    for child in dom.children_of(root).into_iter().rev() {
        if let Some(hit) = hit_test(dom, layout, child, x, y) {
            return Some(hit);
        }
    }

    let node = dom.get(root)?;
    if node.kind == ElementKind::Button {
        Some(root)
    } else {
        None
    }
}
