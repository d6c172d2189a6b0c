//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create/remove nodes, attach/detach hierarchy
//! - Node identity and lifecycle (active / passive / terminated)
//! - State change observers
//! - Removal policies and purging
//! - Traversal order and active component iteration
//! - NodeBuilder convenience API

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use prism::resources::{BoundingSphere, MaterialHandle, MeshHandle, TextureHandle};
use prism::scene::{
    Camera, DistanceFalloff, Light, Model, Node, NodeHandle, NodeState, RemovalPolicy, Scene,
    Sprite, StateChange,
};

fn test_model() -> Model {
    Model::new(
        MeshHandle::default(),
        MaterialHandle::default(),
        36,
        BoundingSphere::new(Vec3::ZERO, 1.0).into(),
    )
}

fn names(scene: &Scene, handles: &[NodeHandle]) -> Vec<String> {
    handles
        .iter()
        .map(|&h| scene.node(h).unwrap().name().to_string())
        .collect()
}

// ============================================================================
// Node Creation & Identity
// ============================================================================

#[test]
fn scene_create_node() {
    let mut scene = Scene::new();
    let handle = scene.create_node("TestNode");
    assert_eq!(scene.node(handle).unwrap().name(), "TestNode");
    assert!(scene.root_nodes().contains(&handle));
    assert_eq!(scene.len(), 1);
}

#[test]
fn scene_unique_ids() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let other = Node::new("c");

    let id_a = scene.node(a).unwrap().id();
    let id_b = scene.node(b).unwrap().id();
    assert_ne!(id_a, id_b);
    assert_ne!(id_b, other.id());
    assert!(id_a.get() >= 1);
}

#[test]
fn scene_cloned_node_gets_fresh_id() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let a = scene.create_node("a");
    let child = scene.create_node("child");
    scene.add_child(parent, a);
    scene.add_child(a, child);
    scene.set_translation(a, Vec3::new(1.0, 2.0, 3.0));
    scene.deactivate(a);

    let copy = scene.node(a).unwrap().clone();
    let b = scene.add_node(copy);

    let (node_a, node_b) = (scene.node(a).unwrap(), scene.node(b).unwrap());
    assert_ne!(node_a.id(), node_b.id());
    assert_eq!(node_b.name(), "a");
    assert_eq!(node_b.state(), NodeState::Passive);
    assert_eq!(node_b.transform().translation(), Vec3::new(1.0, 2.0, 3.0));
    assert!(node_b.parent().is_none());
    assert!(node_b.children().is_empty());
    assert!(scene.root_nodes().contains(&b));
}

#[test]
fn scene_new_node_is_active() {
    let mut scene = Scene::new();
    let handle = scene.create_node("n");
    let node = scene.node(handle).unwrap();
    assert_eq!(node.state(), NodeState::Active);
    assert!(node.is_active());
    assert!(!node.is_terminated());
}

#[test]
fn scene_add_camera_names_node_after_camera() {
    let mut scene = Scene::new();
    let mut camera = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);
    camera.name = "MainCamera".into();
    let handle = scene.add_camera(camera);
    assert_eq!(scene.node(handle).unwrap().name(), "MainCamera");
    assert!(scene.camera(handle).is_some());
}

// ============================================================================
// Hierarchy: Attach / Detach
// ============================================================================

#[test]
fn scene_attach_sets_parent_child() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let child = scene.create_node("child");

    assert!(scene.add_child(parent, child));
    assert_eq!(scene.node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.node(parent).unwrap().children(), &[child]);
    assert!(!scene.root_nodes().contains(&child));
}

#[test]
fn scene_attach_removes_from_old_parent() {
    let mut scene = Scene::new();
    let p1 = scene.create_node("p1");
    let p2 = scene.create_node("p2");
    let child = scene.create_node("child");

    scene.add_child(p1, child);
    scene.add_child(p2, child);

    assert!(scene.node(p1).unwrap().children().is_empty());
    assert_eq!(scene.node(p2).unwrap().children(), &[child]);
}

#[test]
fn scene_attach_to_self_is_noop() {
    let mut scene = Scene::new();
    let node = scene.create_node("n");
    assert!(!scene.add_child(node, node));
    assert_eq!(scene.node(node).unwrap().parent(), None);
}

#[test]
fn scene_children_keep_insertion_order() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let c = scene.create_node("c");
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    for child in [c, a, b] {
        scene.add_child(parent, child);
    }

    let mut visited = Vec::new();
    scene.for_each_child(parent, |h, _| visited.push(h));
    assert_eq!(names(&scene, &visited), ["c", "a", "b"]);
}

#[test]
fn scene_remove_all_children() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let a = scene.add_to_parent(Node::new("a"), parent);
    let b = scene.add_to_parent(Node::new("b"), parent);

    scene.remove_all_children(parent);
    assert!(scene.node(parent).unwrap().children().is_empty());
    assert!(scene.root_nodes().contains(&a));
    assert!(scene.root_nodes().contains(&b));
    assert_eq!(scene.node(a).unwrap().parent(), None);
}

#[test]
fn scene_is_ancestor_of() {
    let mut scene = Scene::new();
    let root = scene.create_node("root");
    let mid = scene.add_to_parent(Node::new("mid"), root);
    let leaf = scene.add_to_parent(Node::new("leaf"), mid);
    let other = scene.create_node("other");

    assert!(scene.is_ancestor_of(root, leaf));
    assert!(scene.is_ancestor_of(leaf, leaf));
    assert!(!scene.is_ancestor_of(leaf, root));
    assert!(!scene.is_ancestor_of(other, leaf));
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn scene_descendants_are_visited_pre_order() {
    let mut scene = Scene::new();
    let root = scene.create_node("root");
    let a = scene.add_to_parent(Node::new("a"), root);
    scene.add_to_parent(Node::new("a1"), a);
    scene.add_to_parent(Node::new("a2"), a);
    let b = scene.add_to_parent(Node::new("b"), root);
    scene.add_to_parent(Node::new("b1"), b);

    let mut visited = Vec::new();
    scene.for_each_descendant(root, |h, _| visited.push(h));
    assert_eq!(names(&scene, &visited), ["a", "a1", "a2", "b", "b1"]);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn scene_state_changes_notify_observers() {
    let mut scene = Scene::new();
    let node = scene.create_node("n");

    let events: Rc<RefCell<Vec<(NodeHandle, StateChange)>>> = Rc::default();
    let sink = Rc::clone(&events);
    scene.on_state_change(move |h, change| sink.borrow_mut().push((h, change)));

    assert!(scene.deactivate(node));
    assert!(!scene.deactivate(node));
    assert!(scene.activate(node));
    assert!(scene.terminate(node));

    assert_eq!(
        *events.borrow(),
        [
            (node, StateChange::Deactivated),
            (node, StateChange::Activated),
            (node, StateChange::Terminated),
        ]
    );
}

#[test]
fn scene_terminate_is_idempotent() {
    let mut scene = Scene::new();
    let node = scene.create_node("n");

    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    scene.on_state_change(move |_, change| {
        if change == StateChange::Terminated {
            *sink.borrow_mut() += 1;
        }
    });

    assert!(scene.terminate(node));
    assert!(!scene.terminate(node));
    assert_eq!(*count.borrow(), 1);
    assert!(scene.node(node).unwrap().is_terminated());
    assert!(!scene.node(node).unwrap().is_active());
}

#[test]
fn scene_terminated_node_cannot_be_reactivated() {
    let mut scene = Scene::new();
    let node = scene.create_node("n");
    scene.deactivate(node);
    scene.terminate(node);

    assert!(!scene.activate(node));
    assert_eq!(scene.node(node).unwrap().state(), NodeState::Passive);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn scene_remove_node_reparents_children() {
    let mut scene = Scene::new();
    let root = scene.create_node("root");
    let mid = scene.add_to_parent(Node::new("mid"), root);
    let leaf = scene.add_to_parent(Node::new("leaf"), mid);
    scene.set_translation(mid, Vec3::new(5.0, 0.0, 0.0));
    scene.set_translation(leaf, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(scene.world_position(leaf), Some(Vec3::new(6.0, 0.0, 0.0)));

    assert_eq!(scene.remove_node(mid, RemovalPolicy::Reparent), 1);
    assert!(!scene.contains(mid));
    assert_eq!(scene.node(leaf).unwrap().parent(), Some(root));
    assert_eq!(scene.node(root).unwrap().children(), &[leaf]);
    // The removed ancestor no longer contributes.
    assert_eq!(scene.world_position(leaf), Some(Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn scene_remove_root_reparents_children_to_roots() {
    let mut scene = Scene::new();
    let root = scene.create_node("root");
    let child = scene.add_to_parent(Node::new("child"), root);

    scene.remove_node(root, RemovalPolicy::Reparent);
    assert!(scene.root_nodes().contains(&child));
    assert!(!scene.root_nodes().contains(&root));
    assert_eq!(scene.node(child).unwrap().parent(), None);
}

#[test]
fn scene_remove_node_cascades_subtree() {
    let mut scene = Scene::new();
    let root = scene.create_node("root");
    let child = scene.add_to_parent(Node::new("child"), root);
    let grandchild = scene.add_to_parent(Node::new("grandchild"), child);
    let light = scene
        .build_node("lamp")
        .with_parent(child)
        .with_light(Light::new_directional(Vec3::ONE, 1.0))
        .build();

    assert_eq!(scene.remove_node(child, RemovalPolicy::Cascade), 3);
    assert!(scene.contains(root));
    assert!(!scene.contains(grandchild));
    assert!(scene.light(light).is_none());
    assert!(scene.node(root).unwrap().children().is_empty());
}

#[test]
fn scene_remove_unknown_node_is_noop() {
    let mut scene = Scene::new();
    let node = scene.create_node("n");
    scene.remove_node(node, RemovalPolicy::Cascade);
    assert_eq!(scene.remove_node(node, RemovalPolicy::Cascade), 0);
    assert!(scene.is_empty());
}

#[test]
fn scene_purge_terminated() {
    let mut scene = Scene::new();
    let keep = scene.create_node("keep");
    let doomed = scene.create_node("doomed");
    let doomed_child = scene.add_to_parent(Node::new("doomed_child"), doomed);
    scene.terminate(doomed);

    assert_eq!(scene.purge_terminated(RemovalPolicy::Cascade), 2);
    assert!(scene.contains(keep));
    assert!(!scene.contains(doomed_child));
}

// ============================================================================
// Components & Active Iteration
// ============================================================================

#[test]
fn scene_set_component_returns_previous() {
    let mut scene = Scene::new();
    let node = scene.create_node("lamp");
    assert!(scene.set_light(node, Light::new_directional(Vec3::ONE, 1.0)).is_none());

    let previous = scene.set_light(node, Light::new_directional(Vec3::ONE, 2.0));
    assert_eq!(previous.map(|l| l.intensity), Some(1.0));
    assert_eq!(scene.light(node).map(|l| l.intensity), Some(2.0));
}

#[test]
fn scene_active_lights_skip_passive_and_terminated() {
    let mut scene = Scene::new();
    let falloff = DistanceFalloff::new(0.0, 10.0);
    let a = scene.add_light(Light::new_omni(Vec3::ONE, 1.0, falloff));
    let b = scene.add_light(Light::new_omni(Vec3::ONE, 2.0, falloff));
    let c = scene.add_light(Light::new_omni(Vec3::ONE, 3.0, falloff));
    let d = scene.add_light(Light::new_omni(Vec3::ONE, 4.0, falloff));
    scene.deactivate(b);
    scene.terminate(c);

    let mut visited = Vec::new();
    scene.for_each_active_light(|h, _, light| visited.push((h, light.intensity)));
    assert_eq!(visited, [(a, 1.0), (d, 4.0)]);
}

#[test]
fn scene_passive_parent_does_not_hide_active_child() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let model = scene.build_node("model").with_parent(parent).with_model(test_model()).build();
    scene.deactivate(parent);

    let mut visited = Vec::new();
    scene.for_each_active_model(|h, _, _| visited.push(h));
    assert_eq!(visited, [model]);
}

#[test]
fn scene_cameras_iterate_in_registration_order() {
    let mut scene = Scene::new();
    let first = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    let second = scene.add_camera(Camera::new_orthographic(10.0, 10.0, 0.1, 100.0));
    scene.deactivate(first);

    assert_eq!(scene.cameras().collect::<Vec<_>>(), [first, second]);

    let mut active = Vec::new();
    scene.for_each_active_camera(|h, _, _| active.push(h));
    assert_eq!(active, [second]);
}

// ============================================================================
// NodeBuilder
// ============================================================================

#[test]
fn builder_applies_transform_parent_and_components() {
    let mut scene = Scene::new();
    let parent = scene.build_node("parent").with_translation(Vec3::new(0.0, 10.0, 0.0)).build();
    let sprite = scene
        .build_node("sprite")
        .with_parent(parent)
        .with_translation(Vec3::new(1.0, 0.0, 0.0))
        .with_scale(Vec3::splat(2.0))
        .with_sprite(Sprite::new(TextureHandle::default(), Vec2::new(4.0, 2.0)))
        .build();

    assert_eq!(scene.node(sprite).unwrap().parent(), Some(parent));
    assert_eq!(scene.world_position(sprite), Some(Vec3::new(1.0, 10.0, 0.0)));
    assert_eq!(scene.sprite(sprite).unwrap().size, Vec2::new(4.0, 2.0));
    assert_eq!(scene.node(sprite).unwrap().transform().scale(), Vec3::splat(2.0));
}

#[test]
fn builder_passive_node_is_skipped() {
    let mut scene = Scene::new();
    scene.build_node("hidden").passive().with_model(test_model()).build();
    let visible = scene.build_node("visible").with_model(test_model()).build();

    let mut visited = Vec::new();
    scene.for_each_active_model(|h, _, _| visited.push(h));
    assert_eq!(visited, [visible]);
}
