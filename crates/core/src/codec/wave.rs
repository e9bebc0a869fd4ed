//! WAVE passthrough codecs.
//!
//! WAVE is already the intermediate format, so both directions are plain
//! file copies. The format has no native tag or cover art support; asking
//! for either is rejected when the codec is built.

use async_trait::async_trait;
use std::path::Path;

use super::error::CodecError;
use super::read_header;
use super::traits::{Decoder, Encoder};
use super::types::{CodecOptions, DecodeTargets, DecodedAudio};

const RIFF_MARKER: &[u8; 4] = b"RIFF";
const WAVE_MARKER: &[u8; 4] = b"WAVE";

fn reject_metadata(options: &CodecOptions) -> Result<(), CodecError> {
    if options.metadata {
        return Err(CodecError::UnsupportedOption {
            codec: "wave",
            option: "metadata",
        });
    }
    if options.image {
        return Err(CodecError::UnsupportedOption {
            codec: "wave",
            option: "embedded images",
        });
    }
    Ok(())
}

/// Verifies the input and copies it to the scratch audio path.
#[derive(Debug, Clone, Default)]
pub struct WaveDecoder;

impl WaveDecoder {
    pub fn new(options: CodecOptions) -> Result<Self, CodecError> {
        reject_metadata(&options)?;
        Ok(Self)
    }

    async fn check_marker(input: &Path) -> Result<(), CodecError> {
        let invalid = || CodecError::InvalidMarker {
            format: "WAVE",
            path: input.to_path_buf(),
        };

        let header = match read_header(input, 12).await {
            Ok(header) => header,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(invalid()),
            Err(e) => return Err(CodecError::Io(e)),
        };

        if &header[0..4] != RIFF_MARKER || &header[8..12] != WAVE_MARKER {
            return Err(invalid());
        }
        Ok(())
    }
}

#[async_trait]
impl Decoder for WaveDecoder {
    fn name(&self) -> &str {
        "wave"
    }

    fn extension(&self) -> &'static str {
        "wav"
    }

    async fn decode(
        &self,
        input: &Path,
        targets: &DecodeTargets,
    ) -> Result<DecodedAudio, CodecError> {
        Self::check_marker(input).await?;
        tokio::fs::copy(input, &targets.audio).await?;
        Ok(DecodedAudio::audio_only(&targets.audio))
    }
}

/// Copies the intermediate audio to the output path.
#[derive(Debug, Clone, Default)]
pub struct WaveEncoder;

impl WaveEncoder {
    pub fn new(options: CodecOptions) -> Result<Self, CodecError> {
        reject_metadata(&options)?;
        Ok(Self)
    }
}

#[async_trait]
impl Encoder for WaveEncoder {
    fn name(&self) -> &str {
        "wave"
    }

    fn extension(&self) -> &'static str {
        "wav"
    }

    async fn encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError> {
        tokio::fs::copy(&decoded.audio, output).await?;
        Ok(())
    }
}
