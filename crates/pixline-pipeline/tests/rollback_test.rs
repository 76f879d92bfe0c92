//! Failure-path scenarios: every abort must leave nothing servable and
//! nothing staged.

mod helpers;

use std::sync::Arc;

use image::ImageFormat;
use tempfile::tempdir;

use helpers::{
    dir_entries, encode_as, halves_raster, pipeline_with_store, test_pipeline, test_store,
    FaultMode, FaultyStore,
};
use pixline_core::{ArtifactKind, OutputFormat, ProcessingOptions, UploadCandidate};

fn options() -> ProcessingOptions {
    ProcessingOptions {
        target_width: 192,
        target_height: 108,
        quality: 85,
        output_format: OutputFormat::Jpeg,
        thumbnail_size: 64,
    }
}

fn png_candidate() -> UploadCandidate {
    let png = encode_as(&halves_raster(300, 200), ImageFormat::Png);
    UploadCandidate::new(png, "image/png", "photo.png")
}

#[tokio::test]
async fn test_staging_failure_surfaces_storage_error() {
    let root = tempdir().unwrap();
    let store = FaultyStore::new(test_store(root.path()).await, FaultMode::Stage);
    let pipeline = pipeline_with_store(root.path(), Arc::new(store)).await;

    let err = pipeline
        .ingest(png_candidate(), Some(options()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "STORAGE_ERROR");
    assert!(err.is_retryable());
    assert!(dir_entries(&root.path().join("uploads")).is_empty());
    assert!(dir_entries(&root.path().join("staging")).is_empty());
}

#[tokio::test]
async fn test_primary_publish_failure_leaves_nothing_servable() {
    let root = tempdir().unwrap();
    let store = FaultyStore::new(
        test_store(root.path()).await,
        FaultMode::Publish(ArtifactKind::Original),
    );
    let pipeline = pipeline_with_store(root.path(), Arc::new(store)).await;

    let err = pipeline
        .ingest(png_candidate(), Some(options()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "STORAGE_ERROR");
    // A fault between stage and publish leaves zero bytes at the
    // destination: a concurrent reader can never see a partial artifact.
    assert!(dir_entries(&root.path().join("uploads")).is_empty());
    assert!(dir_entries(&root.path().join("staging")).is_empty());
}

#[tokio::test]
async fn test_thumbnail_publish_failure_rolls_back_published_primary() {
    let root = tempdir().unwrap();
    let store = FaultyStore::new(
        test_store(root.path()).await,
        FaultMode::Publish(ArtifactKind::Thumbnail),
    );
    let pipeline = pipeline_with_store(root.path(), Arc::new(store)).await;

    let err = pipeline
        .ingest(png_candidate(), Some(options()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "STORAGE_ERROR");
    assert!(err.is_retryable());

    // The primary was published before the thumbnail fault, so the
    // all-or-nothing policy must have removed it again.
    assert!(dir_entries(&root.path().join("uploads")).is_empty());
    assert!(dir_entries(&root.path().join("staging")).is_empty());
}

#[tokio::test]
async fn test_corrupt_body_behind_valid_magic_fails_transcode_cleanly() {
    let root = tempdir().unwrap();
    let pipeline = test_pipeline(root.path()).await;

    // Valid JPEG magic, truncated body: passes the signature check but
    // cannot decode.
    let mut jpeg = encode_as(&halves_raster(300, 200), ImageFormat::Jpeg);
    jpeg.truncate(64);
    let candidate = UploadCandidate::new(jpeg, "image/jpeg", "truncated.jpg");

    let err = pipeline
        .ingest(candidate, Some(options()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "TRANSCODE_ERROR");
    assert!(!err.is_retryable());
    assert_eq!(err.client_message(), "unsupported or corrupt image");

    // The staged original was rolled back; nothing is servable.
    assert!(dir_entries(&root.path().join("uploads")).is_empty());
    assert!(dir_entries(&root.path().join("staging")).is_empty());
}
