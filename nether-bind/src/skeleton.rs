//! Skeleton indexing
//!
//! Builds a flat, parent-linked node table from the source hierarchy in
//! breadth-first order. Each node is appended before its children are
//! enqueued, so every parent index is strictly smaller than its children's
//! and the root sits at index 0.
//!
//! The table also remembers each node's depth-first pre-order id, the same
//! id the flattener assigns, so mesh owners map back to nodes without going
//! through names.

use std::collections::VecDeque;

use glam::Mat4;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::source::{SourceNode, to_engine_matrix};

/// A node of the imported skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    pub name: String,
    /// `None` for the root
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    /// Bind-pose local transform (column-major)
    pub local_transform: Mat4,
    /// Set when a bone record (or a synthetic rigid bone) drives this node
    pub is_bone: bool,
}

/// Breadth-first node table plus name lookup
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    nodes: Vec<SkeletonNode>,
    names: HashMap<String, u32>,
    /// Skeleton index per pre-order traversal id
    preorder: Vec<u32>,
}

impl Skeleton {
    /// Index the hierarchy under `root`
    pub fn build(root: &SourceNode) -> Self {
        // Pre-order ids: children pushed in reverse so they pop in declaration order
        let mut order: Vec<&SourceNode> = Vec::new();
        let mut child_ids: Vec<Vec<u32>> = Vec::new();
        let mut stack: Vec<(&SourceNode, Option<u32>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            let id = order.len() as u32;
            order.push(node);
            child_ids.push(Vec::with_capacity(node.children.len()));
            if let Some(parent) = parent {
                child_ids[parent as usize].push(id);
            }
            for child in node.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        let mut nodes: Vec<SkeletonNode> = Vec::with_capacity(order.len());
        let mut names = HashMap::new();
        let mut preorder = vec![0u32; order.len()];
        let mut queue: VecDeque<(u32, Option<u32>)> = VecDeque::new();
        queue.push_back((0, None));

        while let Some((id, parent)) = queue.pop_front() {
            let source = order[id as usize];
            let index = nodes.len() as u32;
            preorder[id as usize] = index;
            nodes.push(SkeletonNode {
                name: source.name.clone(),
                parent,
                children: Vec::with_capacity(source.children.len()),
                local_transform: to_engine_matrix(&source.transform),
                is_bone: false,
            });

            if let Some(parent) = parent {
                nodes[parent as usize].children.push(index);
            }

            // First occurrence wins for duplicate names
            if !source.name.is_empty() {
                match names.entry(source.name.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(index);
                    }
                    Entry::Occupied(_) => {
                        tracing::debug!("Duplicate node name '{}' at index {}", source.name, index);
                    }
                }
            }

            for &child in &child_ids[id as usize] {
                queue.push_back((child, Some(index)));
            }
        }

        tracing::debug!("Skeleton: {} nodes", nodes.len());

        Self {
            nodes,
            names,
            preorder,
        }
    }

    /// Index of the root node
    #[inline]
    pub fn root_index(&self) -> u32 {
        0
    }

    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    pub fn node(&self, index: u32) -> Option<&SkeletonNode> {
        self.nodes.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by name
    pub fn find(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }

    /// Skeleton index of the node with depth-first pre-order id `id`
    pub fn preorder_node(&self, id: u32) -> Option<u32> {
        self.preorder.get(id as usize).copied()
    }

    /// Parent chain of `index`, nearest ancestor first
    pub fn ancestors(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        std::iter::successors(self.node(index).and_then(|n| n.parent), move |&i| {
            self.nodes[i as usize].parent
        })
    }

    /// Global bind-pose transform of every node
    ///
    /// One forward pass: parents are always resolved before their children.
    pub fn global_transforms(&self) -> Vec<Mat4> {
        let mut globals: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let global = match node.parent {
                Some(parent) => globals[parent as usize] * node.local_transform,
                None => node.local_transform,
            };
            globals.push(global);
        }
        globals
    }

    /// Flag the named node as a bone. Returns false if no node has that name.
    pub(crate) fn mark_bone(&mut self, name: &str) -> bool {
        match self.find(name) {
            Some(index) => {
                self.nodes[index as usize].is_bone = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_all_bones(&mut self) {
        for node in &mut self.nodes {
            node.is_bone = true;
        }
    }

    /// Number of nodes flagged as bones
    pub fn bone_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_bone).count()
    }
}
