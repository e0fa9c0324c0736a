//! In-memory element tree implementing [`ElementHost`].

use super::{ElementHost, ElementId, GhostStyle};
use crate::error::{DndError, DndResult};
use kurbo::{Point, Rect};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
    classes: BTreeSet<String>,
    ghost: Option<GhostStyle>,
}

impl Node {
    fn new(rect: Rect, parent: Option<ElementId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            rect,
            classes: BTreeSet::new(),
            ghost: None,
        }
    }

    /// Rectangle used for hit testing: ghosts are positioned by their style.
    fn hit_rect(&self) -> Rect {
        self.ghost.map_or(self.rect, |style| style.rect())
    }
}

/// Hit-test candidate collected during a paint-order walk.
struct Candidate {
    id: ElementId,
    z_index: i32,
    paint_order: usize,
}

/// A minimal document: top-level elements in paint order, each with a
/// subtree of children. Later elements paint above earlier ones; ghost
/// z-indices lift whole subtrees above everything else.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: HashMap<ElementId, Node>,
    roots: Vec<ElementId>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a top-level element covering `rect`.
    pub fn create_element(&mut self, rect: Rect) -> ElementId {
        let id = Uuid::new_v4();
        self.nodes.insert(id, Node::new(rect, None));
        self.roots.push(id);
        id
    }

    /// Create a child element inside `parent`.
    pub fn create_child(&mut self, parent: ElementId, rect: Rect) -> DndResult<ElementId> {
        let id = Uuid::new_v4();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(DndError::ElementNotFound(parent))?;
        parent_node.children.push(id);
        self.nodes.insert(id, Node::new(rect, Some(parent)));
        Ok(id)
    }

    /// Check whether an element exists in the scene (attached or not).
    pub fn exists(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    /// Check whether an element is reachable from the document roots.
    pub fn is_attached(&self, element: ElementId) -> bool {
        let mut current = element;
        loop {
            match self.nodes.get(&current) {
                Some(node) => match node.parent {
                    Some(parent) => current = parent,
                    None => return self.roots.contains(&current),
                },
                None => return false,
            }
        }
    }

    /// Number of elements in the scene, including detached ones.
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level elements in paint order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Children of an element in paint order.
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(&element)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Classes currently set on an element.
    pub fn classes(&self, element: ElementId) -> Vec<&str> {
        self.nodes
            .get(&element)
            .map(|node| node.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Ghost style applied to an element, if any.
    pub fn ghost_style(&self, element: ElementId) -> Option<GhostStyle> {
        self.nodes.get(&element).and_then(|node| node.ghost)
    }

    /// All attached elements carrying ghost styling.
    pub fn ghosts(&self) -> Vec<ElementId> {
        let mut ghosts: Vec<_> = self
            .nodes
            .iter()
            .filter(|(id, node)| node.ghost.is_some() && self.is_attached(**id))
            .map(|(id, _)| *id)
            .collect();
        ghosts.sort();
        ghosts
    }

    fn detach(&mut self, element: ElementId) {
        let parent = self.nodes.get(&element).and_then(|node| node.parent);
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| *child != element);
                }
                if let Some(node) = self.nodes.get_mut(&element) {
                    node.parent = None;
                }
            }
            None => self.roots.retain(|root| *root != element),
        }
    }

    fn clone_subtree(&mut self, element: ElementId, parent: Option<ElementId>) -> DndResult<ElementId> {
        let source = self
            .nodes
            .get(&element)
            .cloned()
            .ok_or(DndError::ElementNotFound(element))?;
        let id = Uuid::new_v4();
        self.nodes.insert(
            id,
            Node {
                parent,
                children: Vec::new(),
                ..source.clone()
            },
        );
        for child in source.children {
            let cloned = self.clone_subtree(child, Some(id))?;
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(cloned);
            }
        }
        Ok(id)
    }

    fn collect_candidates(
        &self,
        element: ElementId,
        point: Point,
        z_index: i32,
        out: &mut Vec<Candidate>,
        order: &mut usize,
    ) {
        let Some(node) = self.nodes.get(&element) else {
            return;
        };
        let z_index = match node.ghost {
            // Ghost subtrees are either hidden or transparent to the pointer.
            Some(style) if !style.visible || !style.pointer_events => return,
            Some(style) => style.z_index,
            None => z_index,
        };
        *order += 1;
        if node.hit_rect().contains(point) {
            out.push(Candidate {
                id: element,
                z_index,
                paint_order: *order,
            });
        }
        for child in &node.children {
            self.collect_candidates(*child, point, z_index, out, order);
        }
    }
}

impl ElementHost for MemoryScene {
    fn element_at(&self, point: Point) -> Option<ElementId> {
        let mut candidates = Vec::new();
        let mut order = 0;
        for root in &self.roots {
            self.collect_candidates(*root, point, 0, &mut candidates, &mut order);
        }
        candidates
            .into_iter()
            .max_by_key(|c| (c.z_index, c.paint_order))
            .map(|c| c.id)
    }

    fn bounds(&self, element: ElementId) -> DndResult<Rect> {
        let node = self
            .nodes
            .get(&element)
            .ok_or(DndError::ElementNotFound(element))?;
        if !self.is_attached(element) {
            return Err(DndError::Detached(element));
        }
        Ok(node.hit_rect())
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    fn deep_clone(&mut self, element: ElementId) -> DndResult<ElementId> {
        self.clone_subtree(element, None)
    }

    fn append_to_document(&mut self, element: ElementId) -> DndResult<()> {
        if !self.nodes.contains_key(&element) {
            return Err(DndError::ElementNotFound(element));
        }
        self.detach(element);
        self.roots.push(element);
        Ok(())
    }

    fn remove(&mut self, element: ElementId) {
        if !self.nodes.contains_key(&element) {
            return;
        }
        self.detach(element);
        let mut stack = vec![element];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                stack.extend(node.children);
            }
        }
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.classes.remove(class);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|node| node.classes.contains(class))
    }

    fn set_ghost_style(&mut self, element: ElementId, style: GhostStyle) -> DndResult<()> {
        let node = self
            .nodes
            .get_mut(&element)
            .ok_or(DndError::ElementNotFound(element))?;
        node.ghost = Some(style);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_at_prefers_later_paint_order() {
        let mut scene = MemoryScene::new();
        let below = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = scene.create_element(Rect::new(50.0, 50.0, 150.0, 150.0));

        assert_eq!(scene.element_at(Point::new(10.0, 10.0)), Some(below));
        assert_eq!(scene.element_at(Point::new(75.0, 75.0)), Some(above));
        assert_eq!(scene.element_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_child_is_hit_before_parent() {
        let mut scene = MemoryScene::new();
        let parent = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = scene.create_child(parent, Rect::new(10.0, 10.0, 30.0, 30.0)).unwrap();

        assert_eq!(scene.element_at(Point::new(20.0, 20.0)), Some(child));
        assert_eq!(scene.element_at(Point::new(60.0, 60.0)), Some(parent));
        assert!(scene.contains(parent, child));
        assert!(!scene.contains(child, parent));
    }

    #[test]
    fn test_deep_clone_is_detached_copy() {
        let mut scene = MemoryScene::new();
        let parent = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        scene.create_child(parent, Rect::new(10.0, 10.0, 30.0, 30.0)).unwrap();
        scene.add_class(parent, "cell");

        let clone = scene.deep_clone(parent).unwrap();

        assert_ne!(clone, parent);
        assert!(!scene.is_attached(clone));
        assert!(scene.has_class(clone, "cell"));
        assert_eq!(scene.children(clone).len(), 1);
        assert_eq!(scene.element_count(), 4);
    }

    #[test]
    fn test_ghost_never_intercepts_pointer() {
        let mut scene = MemoryScene::new();
        let target = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let ghost = scene.deep_clone(target).unwrap();
        scene.append_to_document(ghost).unwrap();
        let style = GhostStyle::hidden(Rect::new(0.0, 0.0, 100.0, 100.0)).placed_at(Point::ZERO);
        scene.set_ghost_style(ghost, style).unwrap();

        assert_eq!(scene.element_at(Point::new(50.0, 50.0)), Some(target));
        assert_eq!(scene.ghosts(), vec![ghost]);
    }

    #[test]
    fn test_bounds_require_attached_element() {
        let mut scene = MemoryScene::new();
        let el = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let clone = scene.deep_clone(el).unwrap();

        assert_eq!(scene.bounds(el).unwrap(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(matches!(scene.bounds(clone), Err(DndError::Detached(id)) if id == clone));

        scene.append_to_document(clone).unwrap();
        assert!(scene.bounds(clone).is_ok());

        let missing = Uuid::new_v4();
        assert!(matches!(scene.bounds(missing), Err(DndError::ElementNotFound(_))));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut scene = MemoryScene::new();
        let parent = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = scene.create_child(parent, Rect::new(10.0, 10.0, 30.0, 30.0)).unwrap();

        scene.remove(parent);

        assert!(!scene.exists(parent));
        assert!(!scene.exists(child));
        assert!(scene.roots().is_empty());

        // Removing again is harmless
        scene.remove(parent);
    }

    #[test]
    fn test_class_operations_are_idempotent() {
        let mut scene = MemoryScene::new();
        let el = scene.create_element(Rect::new(0.0, 0.0, 10.0, 10.0));

        scene.add_class(el, "hover");
        scene.add_class(el, "hover");
        assert_eq!(scene.classes(el), vec!["hover"]);

        scene.remove_class(el, "hover");
        scene.remove_class(el, "hover");
        assert!(scene.classes(el).is_empty());

        // Unknown elements are ignored
        scene.add_class(Uuid::new_v4(), "hover");
    }
}
