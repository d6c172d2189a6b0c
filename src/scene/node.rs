use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::scene::NodeHandle;
use crate::scene::transform::{LocalTransform, Transform};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity. Assigned monotonically, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a node takes part in per-frame collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Active,
    Passive,
}

/// A lifecycle transition reported to scene observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Activated,
    Deactivated,
    Terminated,
}

/// A scene node.
///
/// # Design
///
/// - Only hierarchy, identity, lifecycle state and the transform live here
/// - Cameras, lights, models and sprites sit in the scene's component maps
/// - `parent` and `children` are non-owning handles; the [`Scene`] owns
///   every node
///
/// [`Scene`]: crate::scene::Scene
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    pub name: Cow<'static, str>,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial ===
    pub(crate) transform: Transform,

    // === Lifecycle ===
    pub(crate) state: NodeState,
    pub(crate) terminated: bool,
}

impl Clone for Node {
    /// Copies the name, local transform and state into a detached node with
    /// a fresh [`NodeId`]. Hierarchy links and cached matrices are left behind.
    fn clone(&self) -> Self {
        let mut node = Self::with_transform(self.name.clone(), *self.transform.local());
        node.state = self.state;
        node
    }
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_transform(name, LocalTransform::IDENTITY)
    }

    #[must_use]
    pub fn with_transform(name: impl Into<Cow<'static, str>>, local: LocalTransform) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(local),
            state: NodeState::Active,
            terminated: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node handle (`None` for root nodes).
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Child handles in insertion order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Read-only transform. Mutate through the `Scene` setters.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Active and not terminated.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == NodeState::Active && !self.terminated
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let a = Node::new("a");
        let b = Node::new("b");
        assert!(b.id() > a.id());
        assert_ne!(a.id().get(), 0);
    }

    #[test]
    fn new_node_is_active_root() {
        let node = Node::new("root");
        assert!(node.is_active());
        assert!(node.parent().is_none());
        assert!(node.children().is_empty());
        assert_eq!(node.transform().translation(), glam::Vec3::ZERO);
    }
}
