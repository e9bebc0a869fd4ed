//! Opus encoder built on `opusenc` from opus-tools.
//!
//! Opus files carry Vorbis comments, so tags pass through unchanged and a
//! single `opusenc` call handles audio, tags and cover art.
//!
//! Reference:
//! - <https://opus-codec.org/docs/opus-tools/opusenc.html>

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::CodecError;
use super::locate::ToolLocator;
use super::process::{ensure_output, ToolCommand};
use super::traits::Encoder;
use super::types::{CodecOptions, DecodedAudio};

const OPUSENC: &str = "opusenc";

/// Encodes PCM audio to Ogg Opus.
#[derive(Debug, Clone)]
pub struct OpusEncoder {
    opusenc: PathBuf,
    options: CodecOptions,
}

impl OpusEncoder {
    /// Resolves `opusenc`, failing if it is missing.
    pub fn new(options: CodecOptions, locator: &ToolLocator) -> Result<Self, CodecError> {
        Ok(Self {
            opusenc: locator.resolve(OPUSENC)?,
            options,
        })
    }

    fn encode_command(&self, decoded: &DecodedAudio, output: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(OPUSENC, &self.opusenc)
            .arg("--comp")
            .arg(self.options.quality.tenths().to_string());

        if self.options.metadata {
            for (key, value) in decoded.tags.iter() {
                cmd = cmd.arg("--comment").arg(format!("{}={}", key, value));
            }
        }

        if let (true, Some(image)) = (self.options.image, decoded.image.as_deref()) {
            cmd = cmd.arg("--picture").arg(image);
        }

        cmd.arg(&decoded.audio).arg(output)
    }
}

#[async_trait]
impl Encoder for OpusEncoder {
    fn name(&self) -> &str {
        "opus"
    }

    fn extension(&self) -> &'static str {
        "opus"
    }

    async fn encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError> {
        self.encode_command(decoded, output).run().await?;
        ensure_output(output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Quality;
    use std::ffi::OsString;

    fn encoder(options: CodecOptions) -> OpusEncoder {
        OpusEncoder {
            opusenc: PathBuf::from("/bin/opusenc"),
            options,
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_encode_command() {
        let options = CodecOptions::default()
            .with_metadata(true)
            .with_image(true)
            .with_quality(Quality::new(75).unwrap());
        let decoded = DecodedAudio {
            audio: PathBuf::from("/tmp/audio"),
            tags: [("TITLE", "Song"), ("VERSION", "Remix")].into_iter().collect(),
            image: Some(PathBuf::from("/tmp/cover")),
        };

        let cmd = encoder(options).encode_command(&decoded, Path::new("/out/song.opus"));
        assert_eq!(
            strings(cmd.args()),
            vec![
                "--comp",
                "7",
                "--comment",
                "TITLE=Song",
                "--comment",
                "VERSION=Remix",
                "--picture",
                "/tmp/cover",
                "/tmp/audio",
                "/out/song.opus"
            ]
        );
    }

    #[test]
    fn test_encode_command_without_image() {
        let options = CodecOptions::default().with_metadata(true).with_image(true);
        let decoded = DecodedAudio::audio_only("/tmp/audio");
        let cmd = encoder(options).encode_command(&decoded, Path::new("/out/song.opus"));
        assert_eq!(
            strings(cmd.args()),
            vec!["--comp", "5", "/tmp/audio", "/out/song.opus"]
        );
    }
}
