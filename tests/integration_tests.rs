//! Integration tests for muestra-graph
//!
//! Exercises archive round-trips and failure modes end to end, the way a
//! dataloading pipeline would drive the container.

use muestra_graph::{
    ArchiveReader, ArchiveWriter, CscSamplingGraph, GraphError, IntTensor, SERIALIZE_MAGIC,
};

/// 3-node citation-style graph: node 0 cited by {1, 2}, node 1 cited by {0}.
fn citation_graph() -> std::sync::Arc<CscSamplingGraph> {
    CscSamplingGraph::from_csc(
        IntTensor::from_vec(vec![0, 2, 3, 3]),
        IntTensor::from_vec(vec![1, 2, 0]),
        None,
        None,
    )
    .unwrap()
}

/// 5-node heterogeneous graph: node type 0 = ids [0,2), type 1 = ids [2,5).
fn typed_graph() -> std::sync::Arc<CscSamplingGraph> {
    CscSamplingGraph::from_csc(
        IntTensor::from_vec(vec![0, 1, 2, 4, 4, 5]),
        IntTensor::from_vec(vec![2, 3, 0, 1, 4]),
        Some(IntTensor::from_vec(vec![0, 2, 5])),
        Some(IntTensor::from_vec(vec![1, 1, 0, 0, 1])),
    )
    .unwrap()
}

fn save_to_vec(graph: &CscSamplingGraph) -> Vec<u8> {
    let mut writer = ArchiveWriter::new(Vec::new());
    graph.save(&mut writer).unwrap();
    writer.into_inner()
}

#[test]
fn test_homogeneous_round_trip() {
    let graph = citation_graph();
    let bytes = save_to_vec(&graph);

    let loaded = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap();

    assert_eq!(loaded.num_nodes(), 3);
    assert_eq!(loaded.num_edges(), 3);
    assert_eq!(loaded.indptr().as_slice(), graph.indptr().as_slice());
    assert_eq!(loaded.indices().as_slice(), graph.indices().as_slice());
    assert!(loaded.node_type_offset().is_none());
    assert!(loaded.type_per_edge().is_none());
    assert_eq!(loaded, *graph);
}

#[test]
fn test_heterogeneous_round_trip() {
    let graph = typed_graph();
    let bytes = save_to_vec(&graph);

    let loaded = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap();

    assert_eq!(loaded.num_node_types(), Some(2));
    assert_eq!(loaded.node_type_offset().unwrap().as_slice(), &[0, 2, 5]);
    assert_eq!(
        loaded.type_per_edge().unwrap().as_slice(),
        &[1, 1, 0, 0, 1]
    );
    assert_eq!(loaded, *graph);
}

#[test]
fn test_omitted_optional_fields_stay_unset() {
    let bytes = save_to_vec(&citation_graph());
    let loaded = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap();
    assert!(loaded.node_type_offset().is_none());
    assert!(loaded.type_per_edge().is_none());
    assert_eq!(loaded.num_node_types(), None);
}

#[test]
fn test_save_is_idempotent() {
    let graph = typed_graph();
    let first = save_to_vec(&graph);
    let second = save_to_vec(&graph);
    assert_eq!(first, second);

    // Saving a loaded copy reproduces the same bytes too
    let loaded = CscSamplingGraph::load(&mut ArchiveReader::new(first.as_slice())).unwrap();
    assert_eq!(save_to_vec(&loaded), first);
}

#[test]
fn test_magic_mismatch_is_fatal() {
    let mut writer = ArchiveWriter::new(Vec::new());
    writer
        .write_i64("CSCSamplingGraph/magic_num", 0x600D_F00D)
        .unwrap();

    let bytes = writer.into_inner();
    let err = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap_err();
    assert!(matches!(
        err,
        GraphError::FormatMismatch { found: 0x600D_F00D, .. }
    ));
}

#[test]
fn test_archive_cut_after_required_fields() {
    let mut writer = ArchiveWriter::new(Vec::new());
    writer
        .write_i64("CSCSamplingGraph/magic_num", SERIALIZE_MAGIC)
        .unwrap();
    writer
        .write_tensor(
            "CSCSamplingGraph/indptr",
            &IntTensor::from_vec(vec![0, 1]),
        )
        .unwrap();
    writer
        .write_tensor("CSCSamplingGraph/indices", &IntTensor::from_vec(vec![0]))
        .unwrap();
    // stream ends before the presence flags

    let bytes = writer.into_inner();
    let err = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap_err();
    assert!(matches!(
        err,
        GraphError::MissingField(name) if name == "CSCSamplingGraph/has_node_type_offset"
    ));
}

#[test]
fn test_true_flag_without_field() {
    let mut writer = ArchiveWriter::new(Vec::new());
    writer
        .write_i64("CSCSamplingGraph/magic_num", SERIALIZE_MAGIC)
        .unwrap();
    writer
        .write_tensor(
            "CSCSamplingGraph/indptr",
            &IntTensor::from_vec(vec![0, 1]),
        )
        .unwrap();
    writer
        .write_tensor("CSCSamplingGraph/indices", &IntTensor::from_vec(vec![0]))
        .unwrap();
    writer
        .write_bool("CSCSamplingGraph/has_node_type_offset", true)
        .unwrap();
    // flag promises a field the stream does not carry

    let bytes = writer.into_inner();
    let err = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap_err();
    assert!(matches!(
        err,
        GraphError::MissingField(name) if name == "CSCSamplingGraph/node_type_offset"
    ));
}

#[test]
fn test_fields_out_of_order_rejected() {
    let mut writer = ArchiveWriter::new(Vec::new());
    writer
        .write_i64("CSCSamplingGraph/magic_num", SERIALIZE_MAGIC)
        .unwrap();
    // indices written where indptr belongs
    writer
        .write_tensor("CSCSamplingGraph/indices", &IntTensor::from_vec(vec![0]))
        .unwrap();

    let bytes = writer.into_inner();
    let err = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap_err();
    assert!(matches!(
        err,
        GraphError::MissingField(name) if name == "CSCSamplingGraph/indptr"
    ));
}

#[test]
fn test_truncated_tensor_payload() {
    let mut bytes = save_to_vec(&citation_graph());
    bytes.truncate(bytes.len() / 2);

    let err = CscSamplingGraph::load(&mut ArchiveReader::new(bytes.as_slice())).unwrap_err();
    // Torn mid-record: the underlying I/O error surfaces
    assert!(matches!(err, GraphError::Io(_)));
}

#[tokio::test]
async fn test_file_round_trip() {
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.bin");

    let graph = typed_graph();
    graph.write_archive(&path).await.unwrap();
    assert!(path.exists());

    let loaded = CscSamplingGraph::read_archive(&path).await.unwrap();
    assert_eq!(loaded, *graph);
}

#[tokio::test]
async fn test_read_archive_missing_file() {
    let result = CscSamplingGraph::read_archive("/nonexistent/graph.bin").await;
    assert!(result.is_err());
}

#[test]
fn test_shared_handle_concurrent_reads() {
    let graph = typed_graph();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let handle = std::sync::Arc::clone(&graph);
            scope.spawn(move || {
                for node in 0..handle.num_nodes() {
                    let neighbors = handle.in_neighbors(node).unwrap();
                    assert_eq!(neighbors.len(), handle.in_degree(node).unwrap());
                }
                assert_eq!(handle.num_edges(), 5);
            });
        }
    });
}
