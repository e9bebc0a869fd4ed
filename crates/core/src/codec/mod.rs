//! Codec module: decode and encode contracts backed by external programs.
//!
//! The pipeline never touches audio samples itself. A [`Decoder`] turns a
//! source file into raw PCM audio in a scratch file plus a [`TagSet`] and an
//! optional cover image; an [`Encoder`] turns that back into a target file.
//!
//! | format | decode            | encode                     |
//! |--------|-------------------|----------------------------|
//! | flac   | `flac`, `metaflac`| `flac`                     |
//! | wave   | copy              | copy                       |
//! | aac    |                   | `neroAacEnc`, `neroAacTag` |
//! | opus   |                   | `opusenc`                  |
//!
//! Codecs resolve their programs when they are built, so a missing tool
//! aborts the run before any job starts.
//!
//! # Example
//!
//! ```ignore
//! use transcoder_core::codec::{build_decoder, build_encoder, CodecOptions, SourceFormat,
//!     TargetFormat, ToolLocator, ToolsConfig};
//!
//! let locator = ToolLocator::new(ToolsConfig::default());
//! let decoder = build_decoder(SourceFormat::Flac, CodecOptions::default(), &locator)?;
//! let encoder = build_encoder(TargetFormat::Opus, CodecOptions::default(), &locator)?;
//! ```
//!
//! [`TagSet`]: crate::metadata::TagSet

mod error;
mod flac;
mod locate;
mod nero;
mod opus;
mod process;
mod traits;
mod types;
mod wave;

use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

pub use error::CodecError;
pub use flac::{FlacDecoder, FlacEncoder};
pub use locate::{ToolLocator, ToolsConfig};
pub use nero::NeroAacEncoder;
pub use opus::OpusEncoder;
pub use traits::{Decoder, Encoder};
pub use types::{
    CodecOptions, DecodeTargets, DecodedAudio, Quality, SourceFormat, TargetFormat, UnknownFormat,
};
pub use wave::{WaveDecoder, WaveEncoder};

/// Builds the decoder for `format`.
pub fn build_decoder(
    format: SourceFormat,
    options: CodecOptions,
    locator: &ToolLocator,
) -> Result<Arc<dyn Decoder>, CodecError> {
    Ok(match format {
        SourceFormat::Flac => Arc::new(FlacDecoder::new(options, locator)?),
        SourceFormat::Wave => Arc::new(WaveDecoder::new(options)?),
    })
}

/// Builds the encoder for `format`.
pub fn build_encoder(
    format: TargetFormat,
    options: CodecOptions,
    locator: &ToolLocator,
) -> Result<Arc<dyn Encoder>, CodecError> {
    Ok(match format {
        TargetFormat::Opus => Arc::new(OpusEncoder::new(options, locator)?),
        TargetFormat::Aac => Arc::new(NeroAacEncoder::new(options, locator)?),
        TargetFormat::Flac => Arc::new(FlacEncoder::new(options, locator)?),
        TargetFormat::Wave => Arc::new(WaveEncoder::new(options)?),
    })
}

/// Reads the first `len` bytes of a file.
pub(crate) async fn read_header(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut header = vec![0u8; len];
    file.read_exact(&mut header).await?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_locator(dir: &TempDir) -> ToolLocator {
        ToolLocator::with_search_path(
            ToolsConfig::default().with_bin_dir(dir.path().to_path_buf()),
            None,
        )
    }

    #[test]
    fn test_wave_codecs_need_no_tools() {
        let dir = TempDir::new().unwrap();
        let locator = empty_locator(&dir);

        let decoder = build_decoder(SourceFormat::Wave, CodecOptions::default(), &locator).unwrap();
        assert_eq!(decoder.extension(), "wav");
        let encoder = build_encoder(TargetFormat::Wave, CodecOptions::default(), &locator).unwrap();
        assert_eq!(encoder.extension(), "wav");
    }

    #[test]
    fn test_missing_tools_fail_at_construction() {
        let dir = TempDir::new().unwrap();
        let locator = empty_locator(&dir);

        assert!(build_decoder(SourceFormat::Flac, CodecOptions::default(), &locator).is_err());
        for format in [TargetFormat::Opus, TargetFormat::Aac, TargetFormat::Flac] {
            let err = build_encoder(format, CodecOptions::default(), &locator)
                .err()
                .unwrap();
            assert!(err.is_construction_error(), "{format}: {err}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_extensions_match_formats() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        for tool in ["flac", "metaflac", "opusenc", "neroAacEnc", "neroAacTag"] {
            let path = dir.path().join(tool);
            std::fs::write(&path, b"#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        let locator = empty_locator(&dir);

        for &format in SourceFormat::ALL {
            let decoder = build_decoder(format, CodecOptions::default(), &locator).unwrap();
            assert_eq!(decoder.extension(), format.extension());
        }
        for &format in TargetFormat::ALL {
            let encoder = build_encoder(format, CodecOptions::default(), &locator).unwrap();
            assert_eq!(encoder.extension(), format.extension());
        }
    }
}
