//! Trait definitions for the codec module.

use async_trait::async_trait;
use std::path::Path;

use super::error::CodecError;
use super::types::{DecodeTargets, DecodedAudio};

/// Turns a source file into raw PCM audio plus its metadata.
///
/// Implementations are built once per run and shared read-only by every
/// worker, so they must not keep per-job state.
#[async_trait]
pub trait Decoder: Send + Sync {
    /// Returns the name of this decoder implementation.
    fn name(&self) -> &str;

    /// Extension (without dot) of the files this decoder accepts.
    fn extension(&self) -> &'static str;

    /// Whether `decode` wants a scratch path for an embedded image.
    fn extracts_image(&self) -> bool {
        false
    }

    /// Decodes `input` into the scratch paths in `targets`.
    async fn decode(
        &self,
        input: &Path,
        targets: &DecodeTargets,
    ) -> Result<DecodedAudio, CodecError>;
}

/// Turns raw PCM audio plus metadata into a target file.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Extension (without dot) of the files this encoder produces.
    fn extension(&self) -> &'static str;

    /// Encodes `decoded` into `output`. The output file must not exist yet.
    async fn encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError>;
}
