use foundation::arena::Arena;
use foundation::ids::{NodeId, ResourceId};
use foundation::math::{Mat4, Vec3, mat4_mul};

use crate::components::Transform;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: ResourceId,
        material: ResourceId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: &'static str,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,
    /// Lower draws first within the same blend class.
    pub render_order: i32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: &'static str) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn mesh(name: &'static str, geometry: ResourceId, material: ResourceId) -> Self {
        Self::with_kind(name, NodeKind::Mesh { geometry, material })
    }

    fn with_kind(name: &'static str, kind: NodeKind) -> Self {
        Self {
            name,
            transform: Transform::identity(),
            kind,
            visible: true,
            render_order: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn material(&self) -> Option<ResourceId> {
        match self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            NodeKind::Group => None,
        }
    }
}

/// A visible mesh node with its composed world transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Leaf {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: ResourceId,
    pub material: ResourceId,
    pub render_order: i32,
}

/// Parent/child hierarchy of groups and meshes.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Arena<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds under `parent`, or as a top-level object when `parent` is None.
    pub fn add(&mut self, parent: Option<NodeId>, node: Node) -> Option<NodeId> {
        match parent {
            Some(parent) => self.add_child(parent, node),
            None => Some(self.add_root(node)),
        }
    }

    pub fn add_root(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.alloc(Node { parent: None, ..node }));
        self.roots.push(id);
        id
    }

    /// Returns `None` if `parent` is no longer in the graph.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        if !self.nodes.contains(parent.0) {
            return None;
        }
        let id = NodeId(self.nodes.alloc(Node {
            parent: Some(parent),
            ..node
        }));
        self.nodes.get_mut(parent.0)?.children.push(id);
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        self.update(id, |n| n.transform = transform)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        self.update(id, |n| n.transform.position = position)
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Vec3) -> bool {
        self.update(id, |n| n.transform.rotation = rotation)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.update(id, |n| n.visible = visible)
    }

    fn update(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    /// Composed transform from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(id.0)?;
        let mut m = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent.0)?;
            m = mat4_mul(node.transform.matrix(), m);
        }
        Some(m)
    }

    /// Detaches `id` from its parent and removes it with all descendants.
    /// Returns the removed nodes, parents before children.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<Node> {
        let Some(node) = self.nodes.get(id.0) else {
            return Vec::new();
        };
        match node.parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent.0) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next.0) {
                stack.extend(node.children.iter().rev().copied());
                removed.push(node);
            }
        }
        removed
    }

    /// Removes every top-level object. Returns how many nodes went away.
    pub fn clear(&mut self) -> usize {
        let roots = std::mem::take(&mut self.roots);
        roots
            .into_iter()
            .map(|r| self.remove_subtree(r).len())
            .sum()
    }

    /// Visible meshes in depth-first order. A hidden group hides its subtree.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|r| (*r, foundation::math::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = mat4_mul(parent_world, node.transform.matrix());
            if let NodeKind::Mesh { geometry, material } = node.kind {
                out.push(Leaf {
                    node: id,
                    world,
                    geometry,
                    material,
                    render_order: node.render_order,
                });
            }
            stack.extend(node.children.iter().rev().map(|c| (*c, world)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::ids::{IdAllocator, ResourceKind};
    use foundation::math::{approx_eq, mat4_transform_point};
    use pretty_assertions::assert_eq;

    fn mesh_node(ids: &mut IdAllocator, name: &'static str) -> Node {
        Node::mesh(
            name,
            ids.next(ResourceKind::Geometry),
            ids.next(ResourceKind::Material),
        )
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut g = SceneGraph::new();
        let mut ids = IdAllocator::new();
        let root = g.add_root(
            Node::group("root").with_transform(Transform::translate(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = g
            .add_child(
                root,
                mesh_node(&mut ids, "child")
                    .with_transform(Transform::translate(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();
        let m = g.world_matrix(child).unwrap();
        let p = mat4_transform_point(m, Vec3::ZERO);
        assert!(approx_eq(p, Vec3::new(1.0, 2.0, 0.0), 1e-6));
        assert_eq!(g.leaves()[0].world, m);
    }

    #[test]
    fn rotation_of_parent_moves_child() {
        let mut g = SceneGraph::new();
        let mut ids = IdAllocator::new();
        let root = g.add_root(Node::group("root"));
        let child = g
            .add_child(
                root,
                mesh_node(&mut ids, "moon")
                    .with_transform(Transform::translate(Vec3::new(0.0, 0.0, 3.0))),
            )
            .unwrap();
        g.set_rotation(root, Vec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0));
        let p = mat4_transform_point(g.world_matrix(child).unwrap(), Vec3::ZERO);
        assert!(approx_eq(p, Vec3::new(3.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let mut g = SceneGraph::new();
        let mut ids = IdAllocator::new();
        let root = g.add_root(Node::group("root"));
        let a = g.add_child(root, Node::group("a")).unwrap();
        let b = g.add_child(a, mesh_node(&mut ids, "b")).unwrap();
        let c = g.add_child(root, mesh_node(&mut ids, "c")).unwrap();

        let removed = g.remove_subtree(a);
        assert_eq!(removed.iter().map(|n| n.name).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!g.contains(b));
        assert!(g.contains(c));
        assert_eq!(g.get(root).unwrap().children(), &[c]);
        assert_eq!(g.add_child(a, Node::group("stale")), None);
    }

    #[test]
    fn hidden_groups_hide_their_meshes() {
        let mut g = SceneGraph::new();
        let mut ids = IdAllocator::new();
        let root = g.add_root(Node::group("root"));
        let shell = g.add_child(root, Node::group("shell")).unwrap();
        g.add_child(shell, mesh_node(&mut ids, "inner")).unwrap();
        let outer = g.add_child(root, mesh_node(&mut ids, "outer")).unwrap();
        assert_eq!(g.leaves().len(), 2);

        g.set_visible(shell, false);
        let leaves = g.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].node, outer);
    }

    #[test]
    fn clear_removes_every_top_level_object() {
        let mut g = SceneGraph::new();
        let mut ids = IdAllocator::new();
        let a = g.add_root(Node::group("a"));
        g.add_child(a, mesh_node(&mut ids, "a1")).unwrap();
        g.add_root(mesh_node(&mut ids, "b"));
        assert_eq!(g.clear(), 3);
        assert!(g.is_empty());
        assert!(g.roots().is_empty());
        assert!(g.leaves().is_empty());
    }
}
