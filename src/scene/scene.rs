use std::borrow::Cow;

use glam::{Mat4, Quat, Vec3};
use slotmap::{SlotMap, SparseSecondaryMap};

use crate::scene::NodeHandle;
use crate::scene::camera::Camera;
use crate::scene::environment::Environment;
use crate::scene::light::Light;
use crate::scene::model::Model;
use crate::scene::node::{Node, NodeState, StateChange};
use crate::scene::sprite::Sprite;
use crate::scene::transform::LocalTransform;
use crate::scene::transform_system;

/// What happens to the children of a removed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Children move to the removed node's parent (or become roots).
    #[default]
    Reparent,
    /// The whole subtree is removed.
    Cascade,
}

type StateObserver = Box<dyn FnMut(NodeHandle, StateChange)>;

/// Component storage keyed by node, iterated in insertion order.
struct ComponentStore<T> {
    map: SparseSecondaryMap<NodeHandle, T>,
    order: Vec<NodeHandle>,
}

impl<T> ComponentStore<T> {
    fn new() -> Self {
        Self {
            map: SparseSecondaryMap::new(),
            order: Vec::new(),
        }
    }

    /// Replacing a component keeps the node's place in the order.
    fn insert(&mut self, handle: NodeHandle, value: T) -> Option<T> {
        let previous = self.map.insert(handle, value);
        if previous.is_none() {
            self.order.push(handle);
        }
        previous
    }

    fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let removed = self.map.remove(handle);
        if removed.is_some() {
            self.order.retain(|&h| h != handle);
        }
        removed
    }

    fn iter(&self) -> impl Iterator<Item = (NodeHandle, &T)> {
        self.order
            .iter()
            .filter_map(|&h| self.map.get(h).map(|value| (h, value)))
    }
}

/// Scene graph container.
///
/// The scene is the sole owner of every [`Node`]. Hierarchy links are
/// non-owning handles, and per-node components (camera, light, model,
/// sprite) live in side tables keyed by [`NodeHandle`].
///
/// Local transforms are edited through the scene so every edit invalidates
/// the node's subtree exactly once. World matrices are derived lazily on
/// query and memoized.
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    root_nodes: Vec<NodeHandle>,

    // ==== Components ====
    cameras: ComponentStore<Camera>,
    lights: ComponentStore<Light>,
    models: ComponentStore<Model>,
    sprites: ComponentStore<Sprite>,

    pub environment: Environment,

    observers: Vec<StateObserver>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            cameras: ComponentStore::new(),
            lights: ComponentStore::new(),
            models: ComponentStore::new(),
            sprites: ComponentStore::new(),
            environment: Environment::new(),
            observers: Vec::new(),
        }
    }

    // ========================================================================
    // Node creation
    // ========================================================================

    /// Creates an empty root node.
    pub fn create_node(&mut self, name: impl Into<Cow<'static, str>>) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Starts building a node.
    pub fn build_node(&mut self, name: impl Into<Cow<'static, str>>) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    /// Adds a detached node as a root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        debug_assert!(node.parent.is_none() && node.children.is_empty());
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, node: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.add_node(node);
        self.add_child(parent, handle);
        handle
    }

    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let handle = self.create_node(camera.name.clone());
        self.cameras.insert(handle, camera);
        handle
    }

    pub fn add_light(&mut self, light: Light) -> NodeHandle {
        let handle = self.create_node("Light");
        self.lights.insert(handle, light);
        handle
    }

    pub fn add_model(&mut self, model: Model) -> NodeHandle {
        let handle = self.create_node("Model");
        self.models.insert(handle, model);
        handle
    }

    pub fn add_sprite(&mut self, sprite: Sprite) -> NodeHandle {
        let handle = self.create_node("Sprite");
        self.sprites.insert(handle, sprite);
        handle
    }

    // ========================================================================
    // Component access
    // ========================================================================

    /// Attaches a camera to an existing node. Cameras are processed in the
    /// order they were first attached.
    pub fn set_camera(&mut self, handle: NodeHandle, camera: Camera) -> Option<Camera> {
        debug_assert!(self.nodes.contains_key(handle), "unknown node {handle:?}");
        self.cameras.insert(handle, camera)
    }

    pub fn set_light(&mut self, handle: NodeHandle, light: Light) -> Option<Light> {
        debug_assert!(self.nodes.contains_key(handle), "unknown node {handle:?}");
        self.lights.insert(handle, light)
    }

    pub fn set_model(&mut self, handle: NodeHandle, model: Model) -> Option<Model> {
        debug_assert!(self.nodes.contains_key(handle), "unknown node {handle:?}");
        self.models.insert(handle, model)
    }

    pub fn set_sprite(&mut self, handle: NodeHandle, sprite: Sprite) -> Option<Sprite> {
        debug_assert!(self.nodes.contains_key(handle), "unknown node {handle:?}");
        self.sprites.insert(handle, sprite)
    }

    pub fn camera(&self, handle: NodeHandle) -> Option<&Camera> {
        self.cameras.map.get(handle)
    }

    pub fn camera_mut(&mut self, handle: NodeHandle) -> Option<&mut Camera> {
        self.cameras.map.get_mut(handle)
    }

    pub fn light(&self, handle: NodeHandle) -> Option<&Light> {
        self.lights.map.get(handle)
    }

    pub fn light_mut(&mut self, handle: NodeHandle) -> Option<&mut Light> {
        self.lights.map.get_mut(handle)
    }

    pub fn model(&self, handle: NodeHandle) -> Option<&Model> {
        self.models.map.get(handle)
    }

    pub fn model_mut(&mut self, handle: NodeHandle) -> Option<&mut Model> {
        self.models.map.get_mut(handle)
    }

    pub fn sprite(&self, handle: NodeHandle) -> Option<&Sprite> {
        self.sprites.map.get(handle)
    }

    /// Camera nodes in registration order, regardless of state.
    pub fn cameras(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.cameras.order.iter().copied()
    }

    // ========================================================================
    // Node queries
    // ========================================================================

    #[inline]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Applies `edit` to the node's local transform, then invalidates the
    /// node and its descendants once. Returns `false` for an unknown handle.
    pub fn update_transform(&mut self, handle: NodeHandle, edit: impl FnOnce(&mut LocalTransform)) -> bool {
        debug_assert!(self.nodes.contains_key(handle), "transform edit on unknown node {handle:?}");
        let Some(node) = self.nodes.get_mut(handle) else { return false };
        edit(node.transform.local_mut());
        let invalidated = transform_system::invalidate_subtree(&self.nodes, handle);
        log::trace!("Transform edit on {handle:?} invalidated {invalidated} nodes");
        true
    }

    pub fn set_local_transform(&mut self, handle: NodeHandle, local: LocalTransform) -> bool {
        self.update_transform(handle, |t| *t = local)
    }

    pub fn set_translation(&mut self, handle: NodeHandle, translation: Vec3) -> bool {
        self.update_transform(handle, |t| t.translation = translation)
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: Quat) -> bool {
        self.update_transform(handle, |t| t.rotation = rotation)
    }

    /// Euler angles in radians, XYZ order.
    pub fn set_rotation_euler(&mut self, handle: NodeHandle, x: f32, y: f32, z: f32) -> bool {
        self.update_transform(handle, |t| t.set_rotation_euler(x, y, z))
    }

    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) -> bool {
        self.update_transform(handle, |t| t.scale = scale)
    }

    /// Points the node's +Z axis at `target` (parent space).
    pub fn look_at(&mut self, handle: NodeHandle, target: Vec3, up: Vec3) -> bool {
        self.update_transform(handle, |t| t.look_at(target, up))
    }

    /// Object-to-world matrix, recomputed lazily if stale.
    pub fn object_to_world(&self, handle: NodeHandle) -> Option<Mat4> {
        transform_system::resolve_object_to_world(&self.nodes, handle)
    }

    /// World-to-object matrix, recomputed lazily if stale.
    pub fn world_to_object(&self, handle: NodeHandle) -> Option<Mat4> {
        transform_system::resolve_world_to_object(&self.nodes, handle)
    }

    /// World-space origin of the node.
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.object_to_world(handle).map(|m| m.w_axis.truncate())
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Makes `child` the last child of `parent`, detaching it from its
    /// previous parent. Self-attachment and cycles are refused.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> bool {
        if parent == child {
            log::warn!("Cannot attach node to itself!");
            return false;
        }
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::warn!("add_child: unknown node ({parent:?} <- {child:?})");
            return false;
        }
        if self.is_ancestor_of(child, parent) {
            log::warn!("add_child: attaching {child:?} under {parent:?} would create a cycle");
            return false;
        }

        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        transform_system::invalidate_subtree(&self.nodes, child);
        true
    }

    /// Detaches `child` from `parent`; it becomes a root. Does nothing if it
    /// is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> bool {
        let is_child = self.nodes.get(child).is_some_and(|n| n.parent == Some(parent));
        if !is_child {
            return false;
        }
        self.detach(child);
        self.root_nodes.push(child);
        transform_system::invalidate_subtree(&self.nodes, child);
        true
    }

    /// Detaches every child of `parent`, in order. They become roots.
    pub fn remove_all_children(&mut self, parent: NodeHandle) {
        let Some(node) = self.nodes.get_mut(parent) else { return };
        let children = std::mem::take(&mut node.children);
        for child in children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
                self.root_nodes.push(child);
                transform_system::invalidate_subtree(&self.nodes, child);
            }
        }
    }

    /// `true` if `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor_of(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut cursor = Some(node);
        while let Some(h) = cursor {
            if h == ancestor {
                return true;
            }
            cursor = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Unlinks `child` from its parent's child list (or the root list).
    fn detach(&mut self, child: NodeHandle) {
        let parent = self.nodes.get_mut(child).and_then(|n| n.parent.take());
        match parent {
            Some(p) => {
                if let Some(n) = self.nodes.get_mut(p)
                    && let Some(i) = n.children.iter().position(|&x| x == child)
                {
                    n.children.remove(i);
                }
            }
            None => {
                if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
                    self.root_nodes.remove(i);
                }
            }
        }
    }

    /// Visits the direct children of `handle` in insertion order.
    ///
    /// The visitor borrows the scene immutably, so the hierarchy cannot
    /// change during the walk.
    pub fn for_each_child(&self, handle: NodeHandle, mut visitor: impl FnMut(NodeHandle, &Node)) {
        let Some(node) = self.nodes.get(handle) else { return };
        for &child in &node.children {
            if let Some(c) = self.nodes.get(child) {
                visitor(child, c);
            }
        }
    }

    /// Visits all descendants of `handle` (excluding itself), pre-order, in
    /// insertion order.
    pub fn for_each_descendant(&self, handle: NodeHandle, mut visitor: impl FnMut(NodeHandle, &Node)) {
        let Some(node) = self.nodes.get(handle) else { return };
        let mut stack: Vec<NodeHandle> = node.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let Some(n) = self.nodes.get(current) else { continue };
            visitor(current, n);
            stack.extend(n.children.iter().rev().copied());
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Registers an observer called on every state transition.
    pub fn on_state_change(&mut self, observer: impl FnMut(NodeHandle, StateChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, handle: NodeHandle, change: StateChange) {
        for observer in &mut self.observers {
            observer(handle, change);
        }
    }

    /// Switches a node between active and passive. Returns `true` if the
    /// state changed. Terminated nodes cannot be reactivated.
    pub fn set_state(&mut self, handle: NodeHandle, state: NodeState) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else { return false };
        if node.state == state {
            return false;
        }
        if node.terminated && state == NodeState::Active {
            log::warn!("Ignoring activation of terminated node '{}' ({})", node.name, node.id());
            return false;
        }
        node.state = state;
        let change = match state {
            NodeState::Active => StateChange::Activated,
            NodeState::Passive => StateChange::Deactivated,
        };
        self.notify(handle, change);
        true
    }

    pub fn activate(&mut self, handle: NodeHandle) -> bool {
        self.set_state(handle, NodeState::Active)
    }

    pub fn deactivate(&mut self, handle: NodeHandle) -> bool {
        self.set_state(handle, NodeState::Passive)
    }

    /// Terminates a node. Idempotent: only the first call notifies.
    pub fn terminate(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.get_mut(handle) else { return false };
        if node.terminated {
            return false;
        }
        node.terminated = true;
        self.notify(handle, StateChange::Terminated);
        true
    }

    /// Removes a node and its components. Children are handled per `policy`.
    /// Returns the number of nodes removed.
    pub fn remove_node(&mut self, handle: NodeHandle, policy: RemovalPolicy) -> usize {
        if !self.nodes.contains_key(handle) {
            return 0;
        }
        let parent = self.nodes[handle].parent;
        self.detach(handle);

        let doomed: Vec<NodeHandle> = match policy {
            RemovalPolicy::Cascade => {
                let mut all = vec![handle];
                self.for_each_descendant(handle, |h, _| all.push(h));
                all
            }
            RemovalPolicy::Reparent => {
                let children = std::mem::take(&mut self.nodes[handle].children);
                for child in children {
                    self.nodes[child].parent = None;
                    self.root_nodes.push(child);
                    if let Some(p) = parent {
                        self.add_child(p, child);
                    } else {
                        transform_system::invalidate_subtree(&self.nodes, child);
                    }
                }
                vec![handle]
            }
        };

        for &h in &doomed {
            self.cameras.remove(h);
            self.lights.remove(h);
            self.models.remove(h);
            self.sprites.remove(h);
            self.nodes.remove(h);
        }
        log::debug!("Removed {} node(s) rooted at {handle:?}", doomed.len());
        doomed.len()
    }

    /// Removes every terminated node. Returns the number of nodes removed.
    pub fn purge_terminated(&mut self, policy: RemovalPolicy) -> usize {
        let terminated: Vec<NodeHandle> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.terminated)
            .map(|(h, _)| h)
            .collect();
        terminated
            .into_iter()
            .map(|h| self.remove_node(h, policy))
            .sum()
    }

    // ========================================================================
    // Active iteration (insertion order)
    // ========================================================================

    pub fn for_each_active_camera(&self, visitor: impl FnMut(NodeHandle, &Node, &Camera)) {
        self.for_each_active(&self.cameras, visitor);
    }

    pub fn for_each_active_light(&self, visitor: impl FnMut(NodeHandle, &Node, &Light)) {
        self.for_each_active(&self.lights, visitor);
    }

    pub fn for_each_active_model(&self, visitor: impl FnMut(NodeHandle, &Node, &Model)) {
        self.for_each_active(&self.models, visitor);
    }

    pub fn for_each_active_sprite(&self, visitor: impl FnMut(NodeHandle, &Node, &Sprite)) {
        self.for_each_active(&self.sprites, visitor);
    }

    fn for_each_active<T>(&self, store: &ComponentStore<T>, mut visitor: impl FnMut(NodeHandle, &Node, &T)) {
        for (handle, component) in store.iter() {
            if let Some(node) = self.nodes.get(handle)
                && node.is_active()
            {
                visitor(handle, node, component);
            }
        }
    }
}

// ============================================================================
// Node Builder
// ============================================================================

pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeHandle>,
    camera: Option<Camera>,
    light: Option<Light>,
    model: Option<Model>,
    sprite: Option<Sprite>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scene,
            node: Node::new(name),
            parent: None,
            camera: None,
            light: None,
            model: None,
            sprite: None,
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.node.transform.local_mut().translation = translation;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.node.transform.local_mut().rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.node.transform.local_mut().scale = scale;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn passive(mut self) -> Self {
        self.node.state = NodeState::Passive;
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    #[must_use]
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Inserts the node into the scene and returns its handle.
    pub fn build(self) -> NodeHandle {
        let scene = self.scene;
        let handle = match self.parent {
            Some(parent) => scene.add_to_parent(self.node, parent),
            None => scene.add_node(self.node),
        };
        if let Some(camera) = self.camera {
            scene.cameras.insert(handle, camera);
        }
        if let Some(light) = self.light {
            scene.lights.insert(handle, light);
        }
        if let Some(model) = self.model {
            scene.models.insert(handle, model);
        }
        if let Some(sprite) = self.sprite {
            scene.sprites.insert(handle, sprite);
        }
        handle
    }
}
