//! Shared fixtures for the pipeline integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;

use pixline_core::{
    ArtifactDescriptor, ArtifactId, ArtifactKind, OutputFormat, PipelineConfig,
};
use pixline_pipeline::{telemetry, Pipeline, PipelineContext};
use pixline_storage::{ArtifactStore, LocalArtifactStore, StorageError, StorageResult};

pub fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        staging_dir: root.join("staging"),
        public_dir: root.join("uploads"),
        ..PipelineConfig::default()
    }
}

pub async fn test_store(root: &Path) -> LocalArtifactStore {
    LocalArtifactStore::new(root.join("staging"), root.join("uploads"), "/uploads")
        .await
        .unwrap()
}

pub async fn test_pipeline(root: &Path) -> Pipeline {
    telemetry::init();
    let store = test_store(root).await;
    let ctx = PipelineContext::new(test_config(root), Arc::new(store)).unwrap();
    Pipeline::new(ctx)
}

pub async fn pipeline_with_store(root: &Path, store: Arc<dyn ArtifactStore>) -> Pipeline {
    telemetry::init();
    let ctx = PipelineContext::new(test_config(root), store).unwrap();
    Pipeline::new(ctx)
}

/// Entries in a directory, empty if it does not exist yet.
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// A `width x height` raster, left half red, right half blue.
pub fn halves_raster(width: u32, height: u32) -> DynamicImage {
    let mut raster = RgbaImage::new(width, height);
    for (x, _, pixel) in raster.enumerate_pixels_mut() {
        *pixel = if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        };
    }
    DynamicImage::ImageRgba8(raster)
}

pub fn encode_as(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), format)
        .unwrap();
    buffer
}

/// Minimal little-endian TIFF payload with an orientation tag and,
/// optionally, a GPS IFD carrying a GPSVersionID entry.
pub fn exif_payload(orientation: u8, with_gps: bool) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);

    let entries: u16 = if with_gps { 2 } else { 1 };
    tiff.extend_from_slice(&entries.to_le_bytes());

    tiff.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(&[orientation, 0x00, 0x00, 0x00]);

    if with_gps {
        let gps_offset: u32 = 8 + 2 + 2 * 12 + 4;
        tiff.extend_from_slice(&[0x25, 0x88, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(&gps_offset.to_le_bytes());
    }

    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    if with_gps {
        tiff.extend_from_slice(&[0x01, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(&[0x02, 0x02, 0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    }

    tiff
}

/// JPEG bytes for `img` with an EXIF segment attached.
pub fn jpeg_with_exif(img: &DynamicImage, orientation: u8, with_gps: bool) -> Vec<u8> {
    let plain = encode_as(img, ImageFormat::Jpeg);
    let mut jpeg = Jpeg::from_bytes(plain.into()).unwrap();
    jpeg.set_exif(Some(exif_payload(orientation, with_gps).into()));
    jpeg.encoder().bytes().to_vec()
}

pub fn decode_file(path: &Path) -> DynamicImage {
    image::ImageReader::open(path).unwrap().decode().unwrap()
}

/// Where a fault gets injected into the wrapped store.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    Stage,
    Publish(ArtifactKind),
}

/// Store wrapper that fails one operation and forwards the rest, for
/// exercising the orchestrator's rollback paths.
pub struct FaultyStore {
    inner: LocalArtifactStore,
    mode: FaultMode,
}

impl FaultyStore {
    pub fn new(inner: LocalArtifactStore, mode: FaultMode) -> Self {
        FaultyStore { inner, mode }
    }
}

#[async_trait]
impl ArtifactStore for FaultyStore {
    async fn stage(&self, bytes: Vec<u8>) -> StorageResult<PathBuf> {
        if self.mode == FaultMode::Stage {
            return Err(StorageError::Stage("injected staging fault".to_string()));
        }
        self.inner.stage(bytes).await
    }

    async fn publish(
        &self,
        staged: &Path,
        id: ArtifactId,
        kind: ArtifactKind,
        format: OutputFormat,
    ) -> StorageResult<ArtifactDescriptor> {
        if self.mode == FaultMode::Publish(kind) {
            return Err(StorageError::Publish("injected publish fault".to_string()));
        }
        self.inner.publish(staged, id, kind, format).await
    }

    async fn discard(&self, staged: &Path) {
        self.inner.discard(staged).await
    }

    async fn remove(&self, id: ArtifactId) -> StorageResult<()> {
        self.inner.remove(id).await
    }
}
