//! muestra-graph: CSC graph container for neighbor-sampling pipelines
//!
//! # Overview
//!
//! muestra-graph holds the index buffers of a large (possibly
//! heterogeneous) directed graph in CSC form, validates them once at
//! construction, and round-trips the whole container through an ordered
//! binary archive. Downstream samplers read the buffers concurrently
//! through a shared handle; this crate defines the invariants and the
//! on-disk contract they rely on.
//!
//! # Quick Start
//!
//! ```
//! use muestra_graph::{ArchiveReader, ArchiveWriter, CscSamplingGraph, IntTensor};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Wrap raw CSC buffers (incoming edges grouped per destination node)
//! let graph = CscSamplingGraph::from_csc(
//!     IntTensor::from_vec(vec![0, 2, 3, 3]),  // indptr
//!     IntTensor::from_vec(vec![1, 2, 0]),     // indices
//!     None,
//!     None,
//! )?;
//!
//! // Query incoming neighbors (O(1) via CSC indexing)
//! assert_eq!(graph.in_neighbors(0)?, &[1, 2]);
//!
//! // Persist and restore through the archive protocol
//! let mut writer = ArchiveWriter::new(Vec::new());
//! graph.save(&mut writer)?;
//! let bytes = writer.into_inner();
//!
//! let loaded = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice()))?;
//! assert_eq!(loaded.num_nodes(), 3);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Architecture
//!
//! - **Storage**: CSC (Compressed Sparse Column) with optional per-type
//!   node ranges and per-edge type ids for heterogeneous graphs
//! - **Sharing**: `Arc`-handled container over zero-copy aliased buffers
//! - **Persistence**: ordered named-field binary archive behind a format
//!   magic number

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod storage;

// Re-export core types
pub use error::GraphError;
pub use storage::{
    ArchiveReader, ArchiveWriter, CscSamplingGraph, Device, IntTensor, SERIALIZE_MAGIC,
};

// Error type
pub use anyhow::{Error, Result};
