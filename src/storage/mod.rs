//! Graph storage layer
//!
//! Provides the CSC (Compressed Sparse Column) sampling-graph container,
//! the shared integer buffers backing it, and the ordered binary archive
//! protocol used for persistence.

pub mod archive;
pub mod csc;
pub mod tensor;

pub use archive::{ArchiveReader, ArchiveWriter};
pub use csc::{CscSamplingGraph, SERIALIZE_MAGIC};
pub use tensor::{Device, IntTensor};
