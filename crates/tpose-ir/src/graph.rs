//! Operator graph mutated by the transpose push-through handlers.
//!
//! Nodes reference tensors through [`EdgeId`] handles. An edge is the logical
//! value, so re-homing an edge onto a different producer slot leaves every
//! consumer pointing at the same value without touching the consumers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::attr::Attribute;
use crate::error::IrError;
use crate::types::{Scalar, TensorShape};

/// The default ONNX operator domain.
pub const ONNX_DOMAIN: &str = "";
/// Vendor domain for contrib operators.
pub const MS_DOMAIN: &str = "com.microsoft";
/// Domain the layout transformer moves channel-last nodes into.
pub const MS_INTERNAL_NHWC_DOMAIN: &str = "com.ms.internal.nhwc";

/// A unique identifier for a node in the graph.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct NodeId(pub u32);

/// A unique identifier for an edge (tensor) in the graph.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct EdgeId(pub u32);

fn is_onnx_domain(domain: &str) -> bool {
    domain.is_empty() || domain == "ai.onnx"
}

/// Operator identity of a node: type, domain and opset version.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Operator {
    pub op_type: String,
    pub domain: String,
    pub since_version: u32,
}

impl Operator {
    pub fn new(op_type: impl Into<String>, domain: impl Into<String>, since_version: u32) -> Self {
        Self {
            op_type: op_type.into(),
            domain: domain.into(),
            since_version,
        }
    }

    /// An operator in the default ONNX domain.
    pub fn onnx(op_type: impl Into<String>, since_version: u32) -> Self {
        Self::new(op_type, ONNX_DOMAIN, since_version)
    }

    /// A contrib operator in the `com.microsoft` domain.
    pub fn contrib(op_type: impl Into<String>, since_version: u32) -> Self {
        Self::new(op_type, MS_DOMAIN, since_version)
    }

    /// Handler lookup key: the bare type for ONNX operators, `domain.op_type`
    /// for everything else.
    pub fn key(&self) -> String {
        if is_onnx_domain(&self.domain) {
            self.op_type.clone()
        } else {
            format!("{}.{}", self.domain, self.op_type)
        }
    }

    /// Returns `true` if this is `op_type` in `domain`. `""` and `"ai.onnx"`
    /// name the same domain.
    pub fn is_op(&self, op_type: &str, domain: &str) -> bool {
        if self.op_type != op_type {
            return false;
        }
        if is_onnx_domain(domain) {
            is_onnx_domain(&self.domain)
        } else {
            self.domain == domain
        }
    }
}

/// Metadata about a tensor edge in the graph.
#[derive(Clone, Debug)]
pub struct TensorInfo {
    /// Human-readable name.
    pub name: String,
    /// Element type.
    pub scalar: Scalar,
    /// Shape, or `None` when even the rank is unknown.
    pub shape: Option<TensorShape>,
}

impl TensorInfo {
    pub fn new(name: impl Into<String>, scalar: Scalar, shape: Option<TensorShape>) -> Self {
        Self {
            name: name.into(),
            scalar,
            shape,
        }
    }

    /// Static rank, if the shape is known.
    pub fn rank(&self) -> Option<usize> {
        self.shape.as_ref().map(TensorShape::rank)
    }
}

/// A node in the graph.
#[derive(Clone, Debug)]
pub struct GraphNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Operator identity.
    pub op: Operator,
    /// Input edges; `None` marks an omitted optional input.
    pub inputs: Vec<Option<EdgeId>>,
    /// Output edges; `None` marks an unused optional output.
    pub outputs: Vec<Option<EdgeId>>,
    /// Named attributes.
    pub attributes: BTreeMap<String, Attribute>,
    /// Execution target, unset until partitioning assigns one.
    pub execution_provider: Option<String>,
    /// Human-readable name for this node.
    pub name: String,
}

impl GraphNode {
    pub fn is_op(&self, op_type: &str, domain: &str) -> bool {
        self.op.is_op(op_type, domain)
    }

    pub fn execution_provider(&self) -> Option<&str> {
        self.execution_provider.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attribute_int(&self, name: &str) -> Option<i64> {
        self.attribute(name).and_then(Attribute::as_int)
    }

    pub fn attribute_int_or(&self, name: &str, default: i64) -> i64 {
        self.attribute_int(name).unwrap_or(default)
    }

    pub fn attribute_string(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Attribute::as_str)
    }

    pub fn attribute_ints(&self, name: &str) -> Option<&[i64]> {
        self.attribute(name).and_then(Attribute::as_ints)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Attribute>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Removes an attribute, returning its previous value.
    pub fn clear_attribute(&mut self, name: &str) -> Option<Attribute> {
        self.attributes.remove(name)
    }

    /// Returns `true` if output `slot` exists and is in use.
    pub fn has_output(&self, slot: usize) -> bool {
        matches!(self.outputs.get(slot), Some(Some(_)))
    }
}

/// A directed acyclic graph of operators.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// All live nodes, in insertion order.
    pub nodes: Vec<GraphNode>,
    /// All tensor edges, keyed by EdgeId.
    pub edges: HashMap<EdgeId, TensorInfo>,
    /// Graph-level input edge ids.
    pub inputs: Vec<EdgeId>,
    /// Graph-level output edge ids.
    pub outputs: Vec<EdgeId>,
    next_node_id: u32,
    next_edge_id: u32,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tensor edge to the graph and return its id.
    pub fn add_edge(&mut self, info: TensorInfo) -> EdgeId {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(id, info);
        id
    }

    /// Add a node to the graph and return its id.
    ///
    /// Inputs and outputs accept either `EdgeId` or `Option<EdgeId>`.
    ///
    /// # Panics
    ///
    /// Panics if any referenced edge has not been registered via
    /// [`add_edge`](Self::add_edge), or if an output edge already has a
    /// producer node.
    pub fn add_node<I, O>(
        &mut self,
        op: Operator,
        inputs: I,
        outputs: O,
        name: impl Into<String>,
    ) -> NodeId
    where
        I: IntoIterator,
        I::Item: Into<Option<EdgeId>>,
        O: IntoIterator,
        O::Item: Into<Option<EdgeId>>,
    {
        let name = name.into();
        let inputs: Vec<Option<EdgeId>> = inputs.into_iter().map(Into::into).collect();
        let outputs: Vec<Option<EdgeId>> = outputs.into_iter().map(Into::into).collect();

        for &e in inputs.iter().chain(outputs.iter()).flatten() {
            assert!(
                self.edges.contains_key(&e),
                "add_node({name}): EdgeId({}) not registered in graph",
                e.0,
            );
        }

        for &out in outputs.iter().flatten() {
            if let Some(existing) = self.edge_producer(out) {
                panic!(
                    "add_node({name}): EdgeId({}) already produced by node {:?}",
                    out.0, existing.name,
                );
            }
        }

        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(GraphNode {
            id,
            op,
            inputs,
            outputs,
            attributes: BTreeMap::new(),
            execution_provider: None,
            name,
        });
        id
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges (tensors) in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&TensorInfo> {
        self.edges.get(&id)
    }

    /// Find the node that produces the given edge, if any.
    pub fn edge_producer(&self, edge: EdgeId) -> Option<&GraphNode> {
        self.nodes
            .iter()
            .find(|n| n.outputs.contains(&Some(edge)))
    }

    /// Find all nodes that consume the given edge.
    pub fn edge_consumers(&self, edge: EdgeId) -> Vec<&GraphNode> {
        self.nodes
            .iter()
            .filter(|n| n.inputs.contains(&Some(edge)))
            .collect()
    }

    /// Creates a node with `op` as its identity, carrying over the inputs,
    /// attributes, execution target and name of `source`.
    ///
    /// The copy has as many output slots as `source`, all empty; use
    /// [`move_output`](Self::move_output) to transfer them.
    pub fn copy_node(&mut self, source: NodeId, op: Operator) -> Result<NodeId, IrError> {
        let src = self.node(source).ok_or(IrError::UnknownNode(source))?;
        let copy = GraphNode {
            id: NodeId(self.next_node_id),
            op,
            inputs: src.inputs.clone(),
            outputs: vec![None; src.outputs.len()],
            attributes: src.attributes.clone(),
            execution_provider: src.execution_provider.clone(),
            name: src.name.clone(),
        };
        self.next_node_id += 1;
        let id = copy.id;
        self.nodes.push(copy);
        Ok(id)
    }

    /// Moves the edge in output slot `src_slot` of `src` to slot `dst_slot`
    /// of `dst`. The source slot is left empty.
    pub fn move_output(
        &mut self,
        src: NodeId,
        src_slot: usize,
        dst: NodeId,
        dst_slot: usize,
    ) -> Result<(), IrError> {
        let src_idx = self.node_index(src).ok_or(IrError::UnknownNode(src))?;
        let dst_idx = self.node_index(dst).ok_or(IrError::UnknownNode(dst))?;
        if src_slot >= self.nodes[src_idx].outputs.len() {
            return Err(IrError::OutputSlot {
                node: src,
                slot: src_slot,
            });
        }
        if dst_slot >= self.nodes[dst_idx].outputs.len() {
            return Err(IrError::OutputSlot {
                node: dst,
                slot: dst_slot,
            });
        }

        let edge = self.nodes[src_idx].outputs[src_slot].take();
        self.nodes[dst_idx].outputs[dst_slot] = edge;
        Ok(())
    }

    /// Removes a node, returning it. Its handle is dead afterwards.
    pub fn remove_node(&mut self, id: NodeId) -> Result<GraphNode, IrError> {
        let idx = self.node_index(id).ok_or(IrError::UnknownNode(id))?;
        Ok(self.nodes.remove(idx))
    }

    /// Returns nodes in topological order.
    ///
    /// The ordering is deterministic: among ready nodes, the one with the
    /// smaller [`NodeId`] is emitted first.
    ///
    /// # Panics
    ///
    /// Panics if the graph contains a cycle.
    pub fn topological_order(&self) -> Vec<&GraphNode> {
        let mut edge_producer: HashMap<EdgeId, usize> = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            for &out in node.outputs.iter().flatten() {
                edge_producer.insert(out, i);
            }
        }

        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        let mut consumers: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (ci, node) in self.nodes.iter().enumerate() {
            for inp in node.inputs.iter().flatten() {
                if let Some(&pi) = edge_producer.get(inp) {
                    in_degree[ci] += 1;
                    consumers[pi].push(ci);
                }
            }
        }

        let mut ready: BTreeSet<(NodeId, usize)> = BTreeSet::new();
        for (i, &deg) in in_degree.iter().enumerate() {
            if deg == 0 {
                ready.insert((self.nodes[i].id, i));
            }
        }

        let mut result: Vec<&GraphNode> = Vec::with_capacity(n);

        while let Some((_, idx)) = ready.pop_first() {
            result.push(&self.nodes[idx]);

            for &ci in &consumers[idx] {
                in_degree[ci] -= 1;
                if in_degree[ci] == 0 {
                    ready.insert((self.nodes[ci].id, ci));
                }
            }
        }

        assert!(
            result.len() == n,
            "topological_order: graph contains a cycle ({} of {} nodes visited)",
            result.len(),
            n,
        );

        result
    }
}
