//! AAC encoder built on the Nero AAC codec tools.
//!
//! Audio goes through `neroAacEnc`; tags and cover art are injected
//! afterwards with `neroAacTag`. The MPEG-4 container uses the Nero Digital
//! tag vocabulary, so tags are translated with [`vorbis_to_nero`] first.
//!
//! Reference:
//! - <ftp://ftp6.nero.com/tutorials/nerodigital/audio_encoder/NeroDigitalAudio_tut_eng.pdf>

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::CodecError;
use super::locate::ToolLocator;
use super::process::{ensure_output, ToolCommand};
use super::traits::Encoder;
use super::types::{CodecOptions, DecodedAudio};
use crate::metadata::vorbis_to_nero;

const NERO_AAC_ENC: &str = "neroAacEnc";
const NERO_AAC_TAG: &str = "neroAacTag";

/// Encodes PCM audio to AAC in an MPEG-4 container.
#[derive(Debug, Clone)]
pub struct NeroAacEncoder {
    encoder: PathBuf,
    tagger: PathBuf,
    options: CodecOptions,
}

impl NeroAacEncoder {
    /// Resolves `neroAacEnc` and `neroAacTag`, failing if either is missing.
    pub fn new(options: CodecOptions, locator: &ToolLocator) -> Result<Self, CodecError> {
        Ok(Self {
            encoder: locator.resolve(NERO_AAC_ENC)?,
            tagger: locator.resolve(NERO_AAC_TAG)?,
            options,
        })
    }

    fn encode_command(&self, audio: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(NERO_AAC_ENC, &self.encoder)
            .arg("-if")
            .arg(audio)
            .arg("-of")
            .arg(output)
            .arg("-q")
            .arg(format!("{:.2}", self.options.quality.fraction()))
    }

    /// Builds the tagging pass, or `None` when there is nothing to inject.
    fn tag_command(&self, decoded: &DecodedAudio, output: &Path) -> Option<ToolCommand> {
        let mut cmd = ToolCommand::new(NERO_AAC_TAG, &self.tagger).arg(output);
        let mut injected = false;

        if self.options.metadata {
            for (field, value) in vorbis_to_nero(&decoded.tags).iter() {
                cmd = cmd.arg(format!("-meta:{}={}", field, value));
                injected = true;
            }
        }

        if let (true, Some(image)) = (self.options.image, decoded.image.as_deref()) {
            cmd = cmd.arg_pair("-add-cover:front:", image);
            injected = true;
        }

        injected.then_some(cmd)
    }
}

#[async_trait]
impl Encoder for NeroAacEncoder {
    fn name(&self) -> &str {
        "nero_aac"
    }

    fn extension(&self) -> &'static str {
        "m4a"
    }

    async fn encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError> {
        self.encode_command(&decoded.audio, output).run().await?;
        ensure_output(output).await?;

        if let Some(tag) = self.tag_command(decoded, output) {
            tag.run().await?;
        }
        Ok(())
    }
}
