//! Ordered named-field binary archive protocol
//!
//! Records are written in a fixed order and read back in the same order:
//! the reader asks for each field *by name* and fails with `MissingField`
//! when the stream disagrees. There is no random access and no index; the
//! field order itself is the wire contract.
//!
//! # Wire format
//!
//! All integers are little-endian.
//!
//! ```text
//! record := name_len:u16 | name:utf8 | tag:u8 | payload
//!
//! tag 0 (i64)    payload := value:i64
//! tag 1 (bool)   payload := value:u8            (0 or 1)
//! tag 2 (tensor) payload := rank:u8
//!                           dim:u64  * rank
//!                           elem:i64 * product(dims)
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::error::GraphError;
use crate::storage::csc::CscSamplingGraph;
use crate::storage::tensor::IntTensor;

const TAG_I64: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_TENSOR: u8 = 2;

/// Upper bound on element preallocation while decoding a tensor.
///
/// Dims read from a corrupt stream can claim arbitrarily many elements;
/// capping the reserve means a bogus count runs into `UnexpectedEof`
/// instead of exhausting memory.
const PREALLOC_CAP: usize = 1 << 22;

/// Writes ordered, named records to an underlying byte sink.
///
/// Append-only: each `write_*` call frames one record after the previous
/// one, and nothing is ever rewritten.
#[derive(Debug)]
pub struct ArchiveWriter<W: Write> {
    sink: W,
}

impl<W: Write> ArchiveWriter<W> {
    /// Wrap a byte sink.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    fn write_header(&mut self, name: &str, tag: u8) -> Result<(), GraphError> {
        let bytes = name.as_bytes();
        let len = u16::try_from(bytes.len())
            .map_err(|_| GraphError::InvalidArgument(format!("field name too long: {name}")))?;
        self.sink.write_all(&len.to_le_bytes())?;
        self.sink.write_all(bytes)?;
        self.sink.write_all(&[tag])?;
        Ok(())
    }

    /// Write a named 64-bit signed integer record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    pub fn write_i64(&mut self, name: &str, value: i64) -> Result<(), GraphError> {
        self.write_header(name, TAG_I64)?;
        self.sink.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Write a named boolean record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    pub fn write_bool(&mut self, name: &str, value: bool) -> Result<(), GraphError> {
        self.write_header(name, TAG_BOOL)?;
        self.sink.write_all(&[u8::from(value)])?;
        Ok(())
    }

    /// Write a named tensor record: rank, dims, then elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails or the tensor rank
    /// exceeds the wire format's `u8` rank field.
    #[allow(clippy::cast_possible_truncation)] // platforms with >64-bit usize unsupported
    pub fn write_tensor(&mut self, name: &str, tensor: &IntTensor) -> Result<(), GraphError> {
        self.write_header(name, TAG_TENSOR)?;
        let rank = u8::try_from(tensor.rank())
            .map_err(|_| GraphError::InvalidArgument(format!("tensor rank too large for {name}")))?;
        self.sink.write_all(&[rank])?;
        for &dim in tensor.shape() {
            self.sink.write_all(&(dim as u64).to_le_bytes())?;
        }
        for &value in tensor.as_slice() {
            self.sink.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }

    /// Flush the underlying sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails to flush.
    pub fn flush(&mut self) -> Result<(), GraphError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Reads ordered, named records from an underlying byte source.
///
/// Each `read_*` call names the field expected next. A record whose name
/// or tag disagrees, or a clean end-of-stream at a record boundary, is
/// reported as `MissingField` for that name; a torn record surfaces the
/// underlying I/O error.
#[derive(Debug)]
pub struct ArchiveReader<R: Read> {
    source: R,
}

impl<R: Read> ArchiveReader<R> {
    /// Wrap a byte source.
    pub fn new(source: R) -> Self {
        Self { source }
    }

    fn expect_header(&mut self, name: &str, tag: u8) -> Result<(), GraphError> {
        let mut len_buf = [0_u8; 2];
        // EOF at a record boundary means the field was never written
        match self.source.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(GraphError::MissingField(name.to_owned()));
            }
            Err(e) => return Err(e.into()),
        }
        let len = usize::from(u16::from_le_bytes(len_buf));
        let mut name_buf = vec![0_u8; len];
        self.source.read_exact(&mut name_buf)?;
        if name_buf != name.as_bytes() {
            return Err(GraphError::MissingField(name.to_owned()));
        }
        let mut tag_buf = [0_u8; 1];
        self.source.read_exact(&mut tag_buf)?;
        if tag_buf[0] != tag {
            return Err(GraphError::MissingField(name.to_owned()));
        }
        Ok(())
    }

    /// Read the named 64-bit signed integer record expected next.
    ///
    /// # Errors
    ///
    /// `MissingField` if the next record is not an i64 named `name`;
    /// `Io` on a torn record.
    pub fn read_i64(&mut self, name: &str) -> Result<i64, GraphError> {
        self.expect_header(name, TAG_I64)?;
        let mut buf = [0_u8; 8];
        self.source.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Read the named boolean record expected next.
    ///
    /// # Errors
    ///
    /// `MissingField` if the next record is not a bool named `name` or its
    /// payload byte is neither 0 nor 1; `Io` on a torn record.
    pub fn read_bool(&mut self, name: &str) -> Result<bool, GraphError> {
        self.expect_header(name, TAG_BOOL)?;
        let mut buf = [0_u8; 1];
        self.source.read_exact(&mut buf)?;
        match buf[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(GraphError::MissingField(name.to_owned())),
        }
    }

    /// Read the named tensor record expected next.
    ///
    /// Decoded tensors live in host memory.
    ///
    /// # Errors
    ///
    /// `MissingField` if the next record is not a tensor named `name`;
    /// `Io` on a torn record.
    #[allow(clippy::cast_possible_truncation)] // dims beyond usize hit EOF long before
    pub fn read_tensor(&mut self, name: &str) -> Result<IntTensor, GraphError> {
        self.expect_header(name, TAG_TENSOR)?;
        let mut rank_buf = [0_u8; 1];
        self.source.read_exact(&mut rank_buf)?;
        let rank = usize::from(rank_buf[0]);

        let mut shape = Vec::with_capacity(rank);
        for _ in 0..rank {
            let mut dim_buf = [0_u8; 8];
            self.source.read_exact(&mut dim_buf)?;
            shape.push(u64::from_le_bytes(dim_buf) as usize);
        }

        let count: usize = shape.iter().product();
        let mut values = Vec::with_capacity(count.min(PREALLOC_CAP));
        let mut elem_buf = [0_u8; 8];
        for _ in 0..count {
            self.source.read_exact(&mut elem_buf)?;
            values.push(i64::from_le_bytes(elem_buf));
        }
        IntTensor::with_shape(values, shape)
    }
}

impl CscSamplingGraph {
    /// Write the graph to an archive file at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or serialization fails
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn write_archive<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = ArchiveWriter::new(BufWriter::new(file));
        self.save(&mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), "archive written");
        Ok(())
    }

    /// Read a graph from an archive file at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, the magic number does
    /// not match, or a field is missing or ill-formed
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn read_archive<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = ArchiveReader::new(BufReader::new(file));
        let graph = Self::load(&mut reader)?;
        debug!(path = %path.display(), "archive read");
        Ok(graph)
    }
}
