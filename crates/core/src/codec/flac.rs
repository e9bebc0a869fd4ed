//! FLAC decoder and encoder built on the reference `flac` and `metaflac` tools.
//!
//! Tags are Vorbis comments and pass through unchanged; cover art is carried
//! as the PICTURE metadata block.
//!
//! References:
//! - <https://xiph.org/vorbis/doc/v-comment.html>
//! - <https://wiki.xiph.org/VorbisComment>

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::CodecError;
use super::locate::ToolLocator;
use super::process::{ensure_output, has_content, ToolCommand};
use super::read_header;
use super::traits::{Decoder, Encoder};
use super::types::{CodecOptions, DecodeTargets, DecodedAudio};
use crate::metadata::TagSet;

const FLAC: &str = "flac";
const METAFLAC: &str = "metaflac";
const STREAM_MARKER: &[u8; 4] = b"fLaC";
/// Highest compression level `flac` accepts.
const MAX_COMPRESSION_LEVEL: u8 = 8;

/// Decodes FLAC files to PCM and exports their tags and cover art.
#[derive(Debug, Clone)]
pub struct FlacDecoder {
    flac: PathBuf,
    metaflac: PathBuf,
    options: CodecOptions,
}

impl FlacDecoder {
    /// Resolves `flac` and `metaflac`, failing if either is missing.
    pub fn new(options: CodecOptions, locator: &ToolLocator) -> Result<Self, CodecError> {
        Ok(Self {
            flac: locator.resolve(FLAC)?,
            metaflac: locator.resolve(METAFLAC)?,
            options,
        })
    }

    fn decode_command(&self, input: &Path, audio: &Path) -> ToolCommand {
        ToolCommand::new(FLAC, &self.flac)
            .arg(input)
            .arg("-o")
            .arg(audio)
            .arg("--force")
            .arg("--no-utf8-convert")
            .arg("--decode")
            .arg("--totally-silent")
    }

    fn export_tags_command(&self, input: &Path) -> ToolCommand {
        ToolCommand::new(METAFLAC, &self.metaflac)
            .arg("--no-utf8-convert")
            .arg("--export-tags-to=-")
            .arg(input)
    }

    fn export_picture_command(&self, input: &Path, image: &Path) -> ToolCommand {
        ToolCommand::new(METAFLAC, &self.metaflac)
            .arg_pair("--export-picture-to=", image)
            .arg(input)
    }

    async fn check_marker(input: &Path) -> Result<(), CodecError> {
        match read_header(input, STREAM_MARKER.len()).await {
            Ok(header) if header == STREAM_MARKER => Ok(()),
            Ok(_) => Err(CodecError::InvalidMarker {
                format: "FLAC",
                path: input.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(CodecError::InvalidMarker {
                    format: "FLAC",
                    path: input.to_path_buf(),
                })
            }
            Err(e) => Err(CodecError::Io(e)),
        }
    }
}

#[async_trait]
impl Decoder for FlacDecoder {
    fn name(&self) -> &str {
        "flac"
    }

    fn extension(&self) -> &'static str {
        "flac"
    }

    fn extracts_image(&self) -> bool {
        self.options.image
    }

    async fn decode(
        &self,
        input: &Path,
        targets: &DecodeTargets,
    ) -> Result<DecodedAudio, CodecError> {
        Self::check_marker(input).await?;

        self.decode_command(input, &targets.audio).run().await?;
        // the audio target is pre-created empty, so existence proves nothing
        if !has_content(&targets.audio).await {
            return Err(CodecError::OutputMissing {
                path: targets.audio.clone(),
            });
        }

        let tags = if self.options.metadata {
            let out = self.export_tags_command(input).run().await?;
            TagSet::parse_vorbis_comments(&String::from_utf8_lossy(&out))
        } else {
            TagSet::new()
        };

        let mut image = None;
        if let (true, Some(path)) = (self.options.image, targets.image.as_deref()) {
            // metaflac exits non-zero when the file has no PICTURE block
            match self.export_picture_command(input, path).run().await {
                Ok(_) if has_content(path).await => image = Some(path.to_path_buf()),
                Ok(_) => debug!("No cover image in {}", input.display()),
                Err(e) => debug!("No cover image exported from {}: {}", input.display(), e),
            }
        }

        Ok(DecodedAudio {
            audio: targets.audio.clone(),
            tags,
            image,
        })
    }
}

/// Encodes PCM audio to FLAC, embedding tags and cover art in one pass.
#[derive(Debug, Clone)]
pub struct FlacEncoder {
    flac: PathBuf,
    options: CodecOptions,
}

impl FlacEncoder {
    /// Resolves `flac`, failing if it is missing.
    pub fn new(options: CodecOptions, locator: &ToolLocator) -> Result<Self, CodecError> {
        Ok(Self {
            flac: locator.resolve(FLAC)?,
            options,
        })
    }

    /// Compression level derived from the 0-100 quality, capped at 8.
    fn compression_level(&self) -> u8 {
        self.options.quality.tenths().min(MAX_COMPRESSION_LEVEL)
    }

    fn encode_command(&self, decoded: &DecodedAudio, output: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(FLAC, &self.flac)
            .arg("--totally-silent")
            .arg(format!("-{}", self.compression_level()))
            .arg("-o")
            .arg(output);

        if self.options.metadata {
            for (key, value) in decoded.tags.iter() {
                cmd = cmd.arg("-T").arg(format!("{}={}", key, value));
            }
        }

        if let (true, Some(image)) = (self.options.image, decoded.image.as_deref()) {
            cmd = cmd.arg_pair("--picture=", image);
        }

        cmd.arg(&decoded.audio)
    }
}

#[async_trait]
impl Encoder for FlacEncoder {
    fn name(&self) -> &str {
        "flac"
    }

    fn extension(&self) -> &'static str {
        "flac"
    }

    async fn encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError> {
        self.encode_command(decoded, output).run().await?;
        ensure_output(output).await
    }
}
