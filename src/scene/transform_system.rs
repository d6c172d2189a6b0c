//! Transform System
//!
//! Resolves and invalidates the memoized matrices of the scene graph. Kept
//! apart from [`Scene`](crate::scene::Scene) so it only borrows the node
//! storage.
//!
//! # Resolution
//!
//! A query walks up from the node until it meets an ancestor whose cache is
//! fresh (or passes the root), then recomputes downward. Each stale node on
//! the path is recomputed exactly once and its result cached, so siblings
//! queried afterwards reuse the shared ancestors.
//!
//! # Invalidation
//!
//! Invalidation marks both caches of a node and all its descendants stale.
//! A node whose caches are both stale already has a fully stale subtree
//! (a fresh descendant implies fresh ancestors), so the walk stops there.

use glam::Mat4;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

type Chain<'a> = SmallVec<[&'a Node; 16]>;

/// Object-to-world matrix of `handle`, recomputing stale ancestors on the way.
pub fn resolve_object_to_world(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Option<Mat4> {
    let node = nodes.get(handle)?;
    if let Some(cached) = node.transform.cached_object_to_world() {
        return Some(cached);
    }

    let (chain, mut world) = stale_chain(nodes, node, |n| n.transform.cached_object_to_world());
    for n in chain.iter().rev() {
        world *= n.transform.local_matrix();
        n.transform.store_object_to_world(world);
    }
    Some(world)
}

/// World-to-object matrix of `handle`: `localInverse * parentWorldToObject`.
pub fn resolve_world_to_object(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Option<Mat4> {
    let node = nodes.get(handle)?;
    if let Some(cached) = node.transform.cached_world_to_object() {
        return Some(cached);
    }

    let (chain, mut inverse) = stale_chain(nodes, node, |n| n.transform.cached_world_to_object());
    for n in chain.iter().rev() {
        inverse = n.transform.local_inverse_matrix() * inverse;
        n.transform.store_world_to_object(inverse);
    }
    Some(inverse)
}

/// Collects `node` and its stale ancestors (nearest first) and returns the
/// fresh base they compose onto.
fn stale_chain<'a>(
    nodes: &'a SlotMap<NodeHandle, Node>,
    node: &'a Node,
    cached: impl Fn(&Node) -> Option<Mat4>,
) -> (Chain<'a>, Mat4) {
    let mut chain = Chain::new();
    chain.push(node);

    let mut cursor = node.parent;
    while let Some(parent_handle) = cursor {
        debug_assert!(nodes.contains_key(parent_handle), "dangling parent handle {parent_handle:?}");
        let Some(parent) = nodes.get(parent_handle) else { break };
        if let Some(base) = cached(parent) {
            return (chain, base);
        }
        chain.push(parent);
        cursor = parent.parent;
    }
    (chain, Mat4::IDENTITY)
}

/// Marks `root` and its descendants stale. Returns the number of nodes that
/// had at least one fresh cache.
pub fn invalidate_subtree(nodes: &SlotMap<NodeHandle, Node>, root: NodeHandle) -> usize {
    let mut stack: SmallVec<[NodeHandle; 32]> = SmallVec::new();
    stack.push(root);

    let mut invalidated = 0;
    while let Some(handle) = stack.pop() {
        let Some(node) = nodes.get(handle) else { continue };
        if !node.transform.invalidate() {
            continue;
        }
        invalidated += 1;
        stack.extend(node.children.iter().copied());
    }
    invalidated
}
