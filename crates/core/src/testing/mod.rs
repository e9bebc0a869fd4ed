//! Testing utilities and mock codec implementations.
//!
//! The mocks implement [`Decoder`](crate::codec::Decoder) and
//! [`Encoder`](crate::codec::Encoder) with plain file copies, so the worker
//! pool can be exercised without `flac`, `opusenc` or `neroAacEnc`
//! installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use transcoder_core::processor::{Dispatcher, DispatcherConfig};
//! use transcoder_core::testing::{MockDecoder, MockEncoder};
//!
//! let decoder = MockDecoder::new("flac");
//! let encoder = MockEncoder::new("opus");
//! decoder.fail_on("broken.flac");
//!
//! let dispatcher = Dispatcher::with_codecs(
//!     DispatcherConfig::new("/music", "/out"),
//!     Arc::new(decoder.clone()),
//!     Arc::new(encoder.clone()),
//! )?;
//! let summary = dispatcher.run().await?;
//! assert_eq!(encoder.encode_count(), summary.transcoded);
//! ```

mod mock_codec;

pub use mock_codec::{MockDecoder, MockEncoder, RecordedEncode, MOCK_COVER, MOCK_PARTIAL};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// A minimal PCM WAVE file (44.1kHz, 16-bit stereo) with `data_len`
    /// bytes of deterministic sample data.
    pub fn wave_bytes(data_len: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&2u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&44_100u32.to_le_bytes());
        bytes.extend_from_slice(&(44_100u32 * 4).to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend((0..data_len).map(|i| (i % 251) as u8));
        bytes
    }

    /// Bytes that pass the FLAC marker check. Not a decodable stream.
    pub fn flac_bytes() -> Vec<u8> {
        let mut bytes = b"fLaC".to_vec();
        bytes.extend_from_slice(&[0x80, 0, 0, 34]);
        bytes.resize(42, 0);
        bytes
    }

    /// Write a WAVE fixture at each relative path under `root`, creating
    /// parent directories as needed.
    pub fn write_tree(root: &Path, files: &[&str]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|relative| {
                let path = root.join(relative);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).expect("create fixture directory");
                }
                std::fs::write(&path, wave_bytes(32)).expect("write fixture file");
                path
            })
            .collect()
    }

}
