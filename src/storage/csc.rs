//! CSC (Compressed Sparse Column) sampling-graph container
//!
//! Stores incoming edges grouped per destination node, the layout neighbor
//! samplers index by. The container is immutable once constructed and is
//! shared behind an `Arc`; its buffers alias the caller's storage.
//!
//! # CSC format
//!
//! ```text
//! Graph (incoming edges): 0 ← 1, 0 ← 2, 1 ← 0
//!
//! CSC:
//!   indptr:  [0, 2, 3, 3]  // Node 0: sources [0..2), Node 1: [2..3), Node 2: [3..3)
//!   indices: [1, 2, 0]      // Source node of each incoming edge
//! ```

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::GraphError;
use crate::storage::archive::{ArchiveReader, ArchiveWriter};
use crate::storage::tensor::IntTensor;

/// Format identity constant leading every serialized graph.
///
/// ASCII `"CSCGRAPH"` packed big-end-first into a positive `i64`. A reader
/// that sees anything else is looking at the wrong format or at corrupt
/// bytes; there is no further version negotiation.
pub const SERIALIZE_MAGIC: i64 = 0x4353_4347_5241_5048;

// Archive field names. The write/read order below is the wire contract:
//
//   magic_num             i64     always
//   indptr                tensor  always
//   indices               tensor  always
//   has_node_type_offset  bool    always
//   node_type_offset      tensor  iff has_node_type_offset
//   has_type_per_edge     bool    always
//   type_per_edge         tensor  iff has_type_per_edge
const FIELD_MAGIC: &str = "CSCSamplingGraph/magic_num";
const FIELD_INDPTR: &str = "CSCSamplingGraph/indptr";
const FIELD_INDICES: &str = "CSCSamplingGraph/indices";
const FIELD_HAS_NODE_TYPE_OFFSET: &str = "CSCSamplingGraph/has_node_type_offset";
const FIELD_NODE_TYPE_OFFSET: &str = "CSCSamplingGraph/node_type_offset";
const FIELD_HAS_TYPE_PER_EDGE: &str = "CSCSamplingGraph/has_type_per_edge";
const FIELD_TYPE_PER_EDGE: &str = "CSCSamplingGraph/type_per_edge";

/// CSC graph container handed to neighbor-sampling routines.
///
/// Holds the index buffers of a (possibly heterogeneous) directed graph:
/// `indptr`/`indices` for the incoming-edge structure, plus optional
/// `node_type_offset` (contiguous node-id range per node type) and
/// `type_per_edge` (edge type id per entry of `indices`).
///
/// All accessors take `&self` and the fields never change after
/// construction, so a shared handle may be read from any number of threads
/// without synchronization.
///
/// # Example
///
/// ```
/// use muestra_graph::{CscSamplingGraph, IntTensor};
///
/// let graph = CscSamplingGraph::from_csc(
///     IntTensor::from_vec(vec![0, 2, 3, 3]),
///     IntTensor::from_vec(vec![1, 2, 0]),
///     None,
///     None,
/// ).unwrap();
///
/// assert_eq!(graph.num_nodes(), 3);
/// assert_eq!(graph.num_edges(), 3);
/// assert_eq!(graph.in_neighbors(0).unwrap(), &[1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscSamplingGraph {
    /// Offsets into `indices` delimiting each node's incoming-edge sources
    /// Length: `num_nodes` + 1
    indptr: IntTensor,

    /// Source node of each incoming edge, grouped by destination
    /// Length: `num_edges`
    indices: IntTensor,

    /// Contiguous global-id range per node type, monotonic from 0
    /// Length: `num_node_types` + 1
    node_type_offset: Option<IntTensor>,

    /// Edge type id per entry of `indices`
    /// Length: `num_edges`
    type_per_edge: Option<IntTensor>,
}

impl CscSamplingGraph {
    /// Construct directly, checking only the core invariants.
    ///
    /// Checks: `indptr` and `indices` are rank 1, `indptr` is non-empty,
    /// and both live on the same device. Optional-field invariants are the
    /// caller's responsibility on this path; use [`from_csc`] for the
    /// validated factory.
    ///
    /// [`from_csc`]: CscSamplingGraph::from_csc
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` naming the violated invariant
    pub fn new(
        indptr: IntTensor,
        indices: IntTensor,
        node_type_offset: Option<IntTensor>,
        type_per_edge: Option<IntTensor>,
    ) -> Result<Self, GraphError> {
        if indptr.rank() != 1 {
            return Err(GraphError::InvalidArgument(format!(
                "indptr must be rank 1, got rank {}",
                indptr.rank()
            )));
        }
        if indices.rank() != 1 {
            return Err(GraphError::InvalidArgument(format!(
                "indices must be rank 1, got rank {}",
                indices.rank()
            )));
        }
        if indptr.is_empty() {
            return Err(GraphError::InvalidArgument(
                "indptr must hold at least one offset".to_owned(),
            ));
        }
        if indptr.device() != indices.device() {
            return Err(GraphError::InvalidArgument(format!(
                "indptr on {} but indices on {}",
                indptr.device(),
                indices.device()
            )));
        }
        Ok(Self {
            indptr,
            indices,
            node_type_offset,
            type_per_edge,
        })
    }

    /// Validated factory: build a shared graph from raw CSC buffers.
    ///
    /// Checks, in order: `node_type_offset` is rank 1 when present;
    /// `type_per_edge` is rank 1 and aligned with `indices` when present;
    /// then the core checks of [`new`]. The buffers are aliased, never
    /// copied, and no dtype or device conversion happens.
    ///
    /// [`new`]: CscSamplingGraph::new
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` naming the violated invariant
    pub fn from_csc(
        indptr: IntTensor,
        indices: IntTensor,
        node_type_offset: Option<IntTensor>,
        type_per_edge: Option<IntTensor>,
    ) -> Result<Arc<Self>, GraphError> {
        if let Some(offset) = &node_type_offset {
            if offset.rank() != 1 {
                return Err(GraphError::InvalidArgument(format!(
                    "node_type_offset must be rank 1, got rank {}",
                    offset.rank()
                )));
            }
        }
        if let Some(types) = &type_per_edge {
            if types.rank() != 1 {
                return Err(GraphError::InvalidArgument(format!(
                    "type_per_edge must be rank 1, got rank {}",
                    types.rank()
                )));
            }
            if types.len() != indices.len() {
                return Err(GraphError::InvalidArgument(format!(
                    "type_per_edge length {} does not match indices length {}",
                    types.len(),
                    indices.len()
                )));
            }
        }
        let graph = Self::new(indptr, indices, node_type_offset, type_per_edge)?;
        trace!(
            num_nodes = graph.num_nodes(),
            num_edges = graph.num_edges(),
            "graph constructed"
        );
        Ok(Arc::new(graph))
    }

    /// Offsets into `indices` delimiting each node's incoming-edge sources.
    #[must_use]
    pub fn indptr(&self) -> &IntTensor {
        &self.indptr
    }

    /// Source node of each incoming edge, grouped by destination.
    #[must_use]
    pub fn indices(&self) -> &IntTensor {
        &self.indices
    }

    /// Per-type contiguous node-id ranges, when the graph is heterogeneous.
    #[must_use]
    pub fn node_type_offset(&self) -> Option<&IntTensor> {
        self.node_type_offset.as_ref()
    }

    /// Per-edge type ids, when the graph is heterogeneous.
    #[must_use]
    pub fn type_per_edge(&self) -> Option<&IntTensor> {
        self.type_per_edge.as_ref()
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.indices.len()
    }

    /// Number of node types, when `node_type_offset` is present.
    #[must_use]
    pub fn num_node_types(&self) -> Option<usize> {
        self.node_type_offset
            .as_ref()
            .map(|offset| offset.len().saturating_sub(1))
    }

    /// Source nodes of the incoming edges of `node`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `node` is out of bounds
    #[allow(clippy::cast_sign_loss)] // indptr entries are non-negative by contract
    pub fn in_neighbors(&self, node: usize) -> Result<&[i64], GraphError> {
        if node >= self.num_nodes() {
            return Err(GraphError::InvalidArgument(format!(
                "node id {node} out of bounds for {} nodes",
                self.num_nodes()
            )));
        }
        let offsets = self.indptr.as_slice();
        let start = offsets[node] as usize;
        let end = offsets[node + 1] as usize;
        Ok(&self.indices.as_slice()[start..end])
    }

    /// Number of incoming edges of `node`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `node` is out of bounds
    pub fn in_degree(&self, node: usize) -> Result<usize, GraphError> {
        Ok(self.in_neighbors(node)?.len())
    }

    /// Serialize the graph into `archive` as ordered named fields.
    ///
    /// Append-only and non-mutating: repeated saves of an unchanged graph
    /// produce byte-identical output.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails
    pub fn save<W: Write>(&self, archive: &mut ArchiveWriter<W>) -> Result<(), GraphError> {
        archive.write_i64(FIELD_MAGIC, SERIALIZE_MAGIC)?;
        archive.write_tensor(FIELD_INDPTR, &self.indptr)?;
        archive.write_tensor(FIELD_INDICES, &self.indices)?;
        archive.write_bool(FIELD_HAS_NODE_TYPE_OFFSET, self.node_type_offset.is_some())?;
        if let Some(offset) = &self.node_type_offset {
            archive.write_tensor(FIELD_NODE_TYPE_OFFSET, offset)?;
        }
        archive.write_bool(FIELD_HAS_TYPE_PER_EDGE, self.type_per_edge.is_some())?;
        if let Some(types) = &self.type_per_edge {
            archive.write_tensor(FIELD_TYPE_PER_EDGE, types)?;
        }
        debug!(
            num_nodes = self.num_nodes(),
            num_edges = self.num_edges(),
            "graph saved"
        );
        Ok(())
    }

    /// Deserialize a graph from `archive`.
    ///
    /// Reads the magic number first, then `indptr` and `indices`, then each
    /// optional field behind its presence flag. Either a fully populated
    /// graph comes back or an error does; there is no partially loaded
    /// value to misuse.
    ///
    /// # Errors
    ///
    /// `FormatMismatch` if the magic number differs from
    /// [`SERIALIZE_MAGIC`]; `MissingField` if a required field or a
    /// flagged optional field is absent or ill-formed; `Io` on torn reads
    pub fn load<R: Read>(archive: &mut ArchiveReader<R>) -> Result<Self, GraphError> {
        let magic = archive.read_i64(FIELD_MAGIC)?;
        if magic != SERIALIZE_MAGIC {
            return Err(GraphError::FormatMismatch {
                found: magic,
                expected: SERIALIZE_MAGIC,
            });
        }
        let indptr = archive.read_tensor(FIELD_INDPTR)?;
        let indices = archive.read_tensor(FIELD_INDICES)?;
        let node_type_offset = if archive.read_bool(FIELD_HAS_NODE_TYPE_OFFSET)? {
            Some(archive.read_tensor(FIELD_NODE_TYPE_OFFSET)?)
        } else {
            None
        };
        let type_per_edge = if archive.read_bool(FIELD_HAS_TYPE_PER_EDGE)? {
            Some(archive.read_tensor(FIELD_TYPE_PER_EDGE)?)
        } else {
            None
        };

        // Decoded buffers go through the trusted constructor so a corrupt
        // archive cannot yield a container violating the core invariants.
        let graph = Self::new(indptr, indices, node_type_offset, type_per_edge)?;
        debug!(
            num_nodes = graph.num_nodes(),
            num_edges = graph.num_edges(),
            "graph loaded"
        );
        Ok(graph)
    }
}
