//! Hierarchical workspace tree of a project.
//!
//! Two fixed containers (Data, Models) hold device nodes; each device node
//! holds one analysis node per computed analysis, whose children are the
//! result leaves in field order:
//!
//! ```text
//! Data                      (container)
//! +-- meas1                 Table
//!     +-- Magnetic Field    Analysis
//!         +-- z             List
//!         +-- Bx            List
//!         ...
//! Models                    (container)
//! +-- AppleIISabia 1        Table
//! ```
//!
//! Nodes live in a flat `Vec` indexed by `NodeId` with intrusive
//! parent/child/sibling links. Nodes are never removed.

use crate::types::{AnalysisKind, DeviceKind};

use super::id::NodeId;

/// Fixed top-level containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Data,
    Model,
}

/// Items below the containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Data,
    Model,
    MagneticField,
    Trajectory,
    PhaseError,
    Integrals,
    RollOffPeaks,
    RollOffAmp,
    Result,
}

impl ItemKind {
    /// Item type of the analysis node for `kind`
    pub fn analysis(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::MagneticField => ItemKind::MagneticField,
            AnalysisKind::Trajectory => ItemKind::Trajectory,
            AnalysisKind::PhaseError => ItemKind::PhaseError,
            AnalysisKind::FieldIntegrals => ItemKind::Integrals,
            AnalysisKind::RollOffPeaks => ItemKind::RollOffPeaks,
            AnalysisKind::RollOffAmp => ItemKind::RollOffAmp,
        }
    }

    /// Analysis kind of an analysis node, `None` for other items
    pub fn analysis_kind(self) -> Option<AnalysisKind> {
        match self {
            ItemKind::MagneticField => Some(AnalysisKind::MagneticField),
            ItemKind::Trajectory => Some(AnalysisKind::Trajectory),
            ItemKind::PhaseError => Some(AnalysisKind::PhaseError),
            ItemKind::Integrals => Some(AnalysisKind::FieldIntegrals),
            ItemKind::RollOffPeaks => Some(AnalysisKind::RollOffPeaks),
            ItemKind::RollOffAmp => Some(AnalysisKind::RollOffAmp),
            _ => None,
        }
    }

    pub fn is_device(self) -> bool {
        matches!(self, ItemKind::Data | ItemKind::Model)
    }
}

/// Typed node of the explore tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Container(ContainerKind),
    Item(ItemKind),
}

impl NodeType {
    pub fn item(self) -> Option<ItemKind> {
        match self {
            NodeType::Item(kind) => Some(kind),
            NodeType::Container(_) => None,
        }
    }
}

/// A single node in the explore tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub node_type: NodeType,
    /// First column
    pub label: String,
    /// Second column, right aligned
    pub annotation: String,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub next_sibling: NodeId,
    pub depth: u16,
}

/// Result leaf resolved to the cache key it mirrors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRef {
    pub device: String,
    pub kind: AnalysisKind,
    pub label: String,
}

/// Flat-storage explore tree.
#[derive(Debug)]
pub struct ExploreTree {
    nodes: Vec<TreeNode>,
    data_root: NodeId,
    model_root: NodeId,
}

impl Default for ExploreTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExploreTree {
    /// Create a tree holding only the two containers.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            data_root: NodeId::INVALID,
            model_root: NodeId::INVALID,
        };
        tree.data_root = tree.push(
            NodeId::INVALID,
            NodeType::Container(ContainerKind::Data),
            DeviceKind::Data.display_name(),
            "",
        );
        tree.model_root = tree.push(
            NodeId::INVALID,
            NodeType::Container(ContainerKind::Model),
            DeviceKind::Model.display_name(),
            "",
        );
        tree
    }

    fn push(&mut self, parent: NodeId, node_type: NodeType, label: &str, annotation: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let depth = self.get(parent).map_or(0, |p| p.depth + 1);
        self.nodes.push(TreeNode {
            id,
            node_type,
            label: label.to_string(),
            annotation: annotation.to_string(),
            parent,
            first_child: NodeId::INVALID,
            next_sibling: NodeId::INVALID,
            depth,
        });

        if parent.is_valid() {
            let first = self.nodes[parent.index()].first_child;
            if !first.is_valid() {
                self.nodes[parent.index()].first_child = id;
            } else {
                let mut cur = first;
                loop {
                    let next = self.nodes[cur.index()].next_sibling;
                    if !next.is_valid() {
                        self.nodes[cur.index()].next_sibling = id;
                        break;
                    }
                    cur = next;
                }
            }
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn data_root(&self) -> NodeId {
        self.data_root
    }

    pub fn model_root(&self) -> NodeId {
        self.model_root
    }

    /// Top-level containers in display order
    pub fn roots(&self) -> [NodeId; 2] {
        [self.data_root, self.model_root]
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        if id.is_valid() {
            self.nodes.get(id.index())
        } else {
            None
        }
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(|n| n.node_type)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.label.as_str())
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Iterate over children of a given node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::INVALID);
        ChildIter {
            tree: self,
            current: first,
        }
    }

    /// Add a device under its container; annotation `"Table"`.
    pub fn add_device_node(&mut self, kind: DeviceKind, name: &str) -> NodeId {
        let (parent, item) = match kind {
            DeviceKind::Data => (self.data_root, ItemKind::Data),
            DeviceKind::Model => (self.model_root, ItemKind::Model),
        };
        self.push(parent, NodeType::Item(item), name, "Table")
    }

    /// Add an analysis node with one result leaf per `(label, annotation)`.
    pub fn add_analysis_subtree(
        &mut self,
        device_node: NodeId,
        kind: AnalysisKind,
        leaves: &[(String, String)],
    ) -> NodeId {
        let analysis = self.push(
            device_node,
            NodeType::Item(ItemKind::analysis(kind)),
            kind.display_name(),
            "Analysis",
        );
        for (label, annotation) in leaves {
            self.push(analysis, NodeType::Item(ItemKind::Result), label, annotation);
        }
        analysis
    }

    /// Replace the label column of a node.
    pub fn set_label(&mut self, node: NodeId, label: &str) {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.label = label.to_string();
        }
    }

    /// Device nodes under the container of `kind`
    pub fn devices(&self, kind: DeviceKind) -> impl Iterator<Item = &TreeNode> {
        let root = match kind {
            DeviceKind::Data => self.data_root,
            DeviceKind::Model => self.model_root,
        };
        self.children(root)
    }

    /// Device node labeled `name`, searching both containers
    pub fn find_device(&self, name: &str) -> Option<NodeId> {
        self.devices(DeviceKind::Data)
            .chain(self.devices(DeviceKind::Model))
            .find(|n| n.label == name)
            .map(|n| n.id)
    }

    /// Analysis node of `kind` under a device node
    pub fn analysis_node(&self, device_node: NodeId, kind: AnalysisKind) -> Option<NodeId> {
        self.children(device_node)
            .find(|n| n.node_type == NodeType::Item(ItemKind::analysis(kind)))
            .map(|n| n.id)
    }

    /// Nearest device ancestor of `node` (itself if it is a device)
    pub fn device_of(&self, node: NodeId) -> Option<NodeId> {
        let mut cur = node;
        while let Some(n) = self.get(cur) {
            if n.node_type.item().is_some_and(ItemKind::is_device) {
                return Some(cur);
            }
            cur = n.parent;
        }
        None
    }

    /// Resolve a result leaf to its device, analysis kind and field label
    pub fn resolve_leaf(&self, leaf: NodeId) -> Option<LeafRef> {
        let node = self.get(leaf)?;
        if node.node_type != NodeType::Item(ItemKind::Result) {
            return None;
        }
        let analysis = self.get(node.parent)?;
        let kind = analysis.node_type.item()?.analysis_kind()?;
        let device = self.get(analysis.parent)?;
        Some(LeafRef {
            device: device.label.clone(),
            kind,
            label: node.label.clone(),
        })
    }

    /// Every `(kind, device)` with an analysis subtree, plus its leaf labels
    pub fn analysis_pairs(&self) -> Vec<(AnalysisKind, String, Vec<String>)> {
        let mut pairs = Vec::new();
        for root in self.roots() {
            for device in self.children(root) {
                for analysis in self.children(device.id) {
                    if let Some(kind) = analysis.node_type.item().and_then(ItemKind::analysis_kind) {
                        let labels = self.children(analysis.id).map(|l| l.label.clone()).collect();
                        pairs.push((kind, device.label.clone(), labels));
                    }
                }
            }
        }
        pairs
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a ExploreTree,
    current: NodeId,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() {
            return None;
        }
        let node = &self.tree.nodes[self.current.index()];
        self.current = node.next_sibling;
        Some(node)
    }
}
