//! Object tree construction.
//!
//! [`TreeBuilder`] walks the registry depth first, asking a pluggable
//! [`ChildEnumerator`] for each object's children. Child order is the order
//! the host returns. Shared children are expanded every time they appear; an
//! object that shows up as its own ancestor, or one past the depth bound,
//! becomes a leaf.

use smallvec::SmallVec;
use std::fmt;
use tracing::{debug, warn};

use crate::class::ClassId;
use crate::host::{Host, ObjectId};
use crate::property::{DeviceProperty, ObjectProperty};
use crate::registry::Registry;

/// One object of the tree. Owns its subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub object: ObjectId,
    pub class: ClassId,
    pub name: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(object: ObjectId, class: ClassId, name: impl Into<String>) -> Self {
        Self { object, class, name: name.into(), children: Vec::new() }
    }

    /// Node with the given children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// First node for `object`, depth first.
    pub fn find(&self, object: ObjectId) -> Option<&Node> {
        if self.object == object {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(object))
    }

    /// Object ids in depth-first pre-order.
    pub fn objects(&self) -> Vec<ObjectId> {
        let mut out = Vec::with_capacity(self.count());
        self.collect_objects(&mut out);
        out
    }

    fn collect_objects(&self, out: &mut Vec<ObjectId>) {
        out.push(self.object);
        for child in &self.children {
            child.collect_objects(out);
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} {} [{}]", "", self.object, self.name, self.class, indent = depth * 2)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Display name used when an object has none.
pub fn placeholder_name(object: ObjectId) -> String {
    format!("<untitled @{}>", object.0)
}

// ============================================================================
// Child enumeration
// ============================================================================

/// Strategy listing the children of an object.
pub trait ChildEnumerator<H: Host> {
    fn children(&self, registry: &Registry<H>, object: ObjectId) -> Vec<ObjectId>;
}

impl<H, F> ChildEnumerator<H> for F
where
    H: Host,
    F: Fn(&Registry<H>, ObjectId) -> Vec<ObjectId>,
{
    fn children(&self, registry: &Registry<H>, object: ObjectId) -> Vec<ObjectId> {
        self(registry, object)
    }
}

/// Children from the owned-objects property; none if it is missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct OwnedObjects;

impl<H: Host> ChildEnumerator<H> for OwnedObjects {
    fn children(&self, registry: &Registry<H>, object: ObjectId) -> Vec<ObjectId> {
        owned_objects(registry, object).unwrap_or_default()
    }
}

/// Owned objects, or for a device without them, its streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct OwnedObjectsOrStreams;

impl<H: Host> ChildEnumerator<H> for OwnedObjectsOrStreams {
    fn children(&self, registry: &Registry<H>, object: ObjectId) -> Vec<ObjectId> {
        if let Some(children) = owned_objects(registry, object) {
            return children;
        }
        let is_device = registry
            .class_of(object)
            .is_some_and(|class| class.is_subclass(ClassId::DEVICE));
        if !is_device {
            return Vec::new();
        }
        registry
            .get(DeviceProperty::Streams, object, None)
            .and_then(|v| v.as_object_ids().map(<[ObjectId]>::to_vec))
            .unwrap_or_default()
    }
}

fn owned_objects<H: Host>(registry: &Registry<H>, object: ObjectId) -> Option<Vec<ObjectId>> {
    registry
        .get(ObjectProperty::OwnedObjects, object, None)?
        .as_object_ids()
        .map(<[ObjectId]>::to_vec)
}

// ============================================================================
// Builder
// ============================================================================

/// Ancestors of the node being built.
type Path = SmallVec<[ObjectId; 16]>;

/// Builds [`Node`] trees from a registry.
pub struct TreeBuilder<'a, H: Host, E: ChildEnumerator<H>> {
    registry: &'a Registry<H>,
    enumerator: E,
    max_depth: usize,
}

impl<'a, H: Host, E: ChildEnumerator<H>> TreeBuilder<'a, H, E> {
    /// Builder bounded by the registry's configured depth.
    pub fn new(registry: &'a Registry<H>, enumerator: E) -> Self {
        let max_depth = registry.config().max_tree_depth;
        Self { registry, enumerator, max_depth }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the tree rooted at `object`.
    #[tracing::instrument(skip_all, fields(root = object.0))]
    pub fn build(&self, object: ObjectId) -> Node {
        let mut path = Path::new();
        let node = self.build_node(object, 0, &mut path);
        debug!("built tree of {} nodes", node.count());
        node
    }

    fn build_node(&self, object: ObjectId, depth: usize, path: &mut Path) -> Node {
        let mut node = self.leaf(object);
        let children = self.enumerator.children(self.registry, object);
        if children.is_empty() {
            return node;
        }
        if depth >= self.max_depth {
            warn!("tree depth limit {} reached at {}", self.max_depth, object);
            return node;
        }

        path.push(object);
        node.children = children
            .into_iter()
            .map(|child| {
                if path.contains(&child) {
                    warn!("cycle: {} is its own ancestor, not expanding", child);
                    self.leaf(child)
                } else {
                    self.build_node(child, depth + 1, path)
                }
            })
            .collect();
        path.pop();
        node
    }

    fn leaf(&self, object: ObjectId) -> Node {
        let class = self.registry.class_of(object).unwrap_or(ClassId::OBJECT);
        let name = self
            .registry
            .name_of(object)
            .unwrap_or_else(|| placeholder_name(object));
        Node::new(object, class, name)
    }
}

impl<H: Host> Registry<H> {
    /// Tree rooted at `object`, using owned objects with the device-streams
    /// fallback.
    pub fn build_tree(&self, object: ObjectId) -> Node {
        TreeBuilder::new(self, OwnedObjectsOrStreams).build(object)
    }
}
