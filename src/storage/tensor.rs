//! Shared integer buffers backing the graph container
//!
//! Stands in for the numeric-tensor runtime that owns index buffers in a
//! full sampling pipeline. A tensor carries a shape, an opaque storage
//! location, and reference-counted element storage; cloning aliases the
//! same allocation rather than copying it.

use std::fmt;
use std::sync::Arc;

use crate::error::GraphError;

/// Storage location of a tensor's elements.
///
/// Passes through the container opaquely. The container only requires that
/// `indptr` and `indices` agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Host memory
    Cpu,
    /// Accelerator memory, identified by ordinal
    Accelerator(u32),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Accelerator(ordinal) => write!(f, "accelerator:{ordinal}"),
        }
    }
}

/// Rank-aware integer tensor with shared element storage.
///
/// Elements are stored row-major as `i64`. `Clone` is cheap: it clones the
/// `Arc`, so a cloned tensor aliases the original allocation. The crate
/// never hands out mutable access to the elements, which is what makes
/// zero-copy sharing between caller and container safe.
///
/// # Example
///
/// ```
/// use muestra_graph::IntTensor;
///
/// let indptr = IntTensor::from_vec(vec![0, 2, 3, 3]);
/// assert_eq!(indptr.rank(), 1);
/// assert_eq!(indptr.len(), 4);
///
/// let alias = indptr.clone();
/// assert!(alias.aliases(&indptr));
/// ```
#[derive(Debug, Clone)]
pub struct IntTensor {
    /// Dimension sizes; rank = `shape.len()`
    shape: Vec<usize>,
    /// Storage location (opaque passthrough)
    device: Device,
    /// Row-major elements, length = product of `shape`
    data: Arc<[i64]>,
}

impl IntTensor {
    /// Create a rank-1 host tensor from a vector of elements.
    #[must_use]
    pub fn from_vec(values: Vec<i64>) -> Self {
        let shape = vec![values.len()];
        Self {
            shape,
            device: Device::Cpu,
            data: values.into(),
        }
    }

    /// Create a host tensor with an explicit shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the element count does not match the
    /// product of the dimensions.
    pub fn with_shape(values: Vec<i64>, shape: Vec<usize>) -> Result<Self, GraphError> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(GraphError::InvalidArgument(format!(
                "shape {shape:?} implies {expected} elements, got {}",
                values.len()
            )));
        }
        Ok(Self {
            shape,
            device: Device::Cpu,
            data: values.into(),
        })
    }

    /// Re-tag the tensor with a storage location.
    ///
    /// The elements stay where they are; the tag is an opaque passthrough
    /// used only for the device-equality check at graph construction.
    #[must_use]
    pub fn on_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Storage location tag.
    #[must_use]
    pub const fn device(&self) -> Device {
        self.device
    }

    /// Dimension sizes.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Read-only view of the elements.
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Whether two tensors share the same allocation.
    #[must_use]
    pub fn aliases(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Value equality: shape and elements. The storage location tag is not part
/// of the value; a tensor round-tripped through an archive compares equal
/// to its accelerator-tagged original.
impl PartialEq for IntTensor {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

impl Eq for IntTensor {}
