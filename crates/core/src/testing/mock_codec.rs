//! Mock codec implementations for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::codec::{CodecError, DecodeTargets, DecodedAudio, Decoder, Encoder};
use crate::metadata::TagSet;

/// Bytes the mock decoder writes to the image target.
pub const MOCK_COVER: &[u8] = b"cover";

/// Bytes a failing mock encoder leaves behind at the output path.
pub const MOCK_PARTIAL: &[u8] = b"partial";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Tracks how many calls are running at once.
#[derive(Debug, Default)]
struct Concurrency {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl Concurrency {
    fn enter(&self) -> InFlight<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }
}

/// Decrements the in-flight count on drop, including during a panic.
struct InFlight<'a>(&'a Concurrency);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct DecoderState {
    failing: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    last_targets: Mutex<Option<DecodeTargets>>,
    decodes: AtomicUsize,
    concurrency: Concurrency,
}

/// Mock decoder that copies the input to the audio target.
///
/// Clones share state, so a test can keep a handle while the pool owns
/// another one behind an `Arc<dyn Decoder>`.
#[derive(Debug, Clone)]
pub struct MockDecoder {
    extension: &'static str,
    extracts_image: bool,
    tags: TagSet,
    delay: Duration,
    state: Arc<DecoderState>,
}

impl MockDecoder {
    pub fn new(extension: &'static str) -> Self {
        Self {
            extension,
            extracts_image: false,
            tags: TagSet::new(),
            delay: Duration::ZERO,
            state: Arc::new(DecoderState::default()),
        }
    }

    /// Request an image target and write [`MOCK_COVER`] to it.
    pub fn with_image(mut self, enabled: bool) -> Self {
        self.extracts_image = enabled;
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Simulated decode time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every decode of an input with this file name.
    pub fn fail_on(&self, name: &str) {
        self.state
            .failing
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// Panic on every decode of an input with this file name.
    pub fn panic_on(&self, name: &str) {
        self.state
            .panicking
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// Number of decodes attempted, failed ones included.
    pub fn decode_count(&self) -> usize {
        self.state.decodes.load(Ordering::SeqCst)
    }

    pub fn last_targets(&self) -> Option<DecodeTargets> {
        self.state.last_targets.lock().unwrap().clone()
    }

    pub fn max_concurrency(&self) -> usize {
        self.state.concurrency.max.load(Ordering::SeqCst)
    }

    async fn run_decode(
        &self,
        input: &Path,
        targets: &DecodeTargets,
    ) -> Result<DecodedAudio, CodecError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let name = file_name(input);
        let panic = self.state.panicking.lock().unwrap().contains(&name);
        if panic {
            panic!("mock decoder panic on {name}");
        }
        let fail = self.state.failing.lock().unwrap().contains(&name);
        if fail {
            return Err(CodecError::tool_failed("mock-decoder", Some(1), b"forced failure"));
        }

        tokio::fs::copy(input, &targets.audio).await?;
        let image = match &targets.image {
            Some(image) => {
                tokio::fs::write(image, MOCK_COVER).await?;
                Some(image.clone())
            }
            None => None,
        };

        Ok(DecodedAudio {
            audio: targets.audio.clone(),
            tags: self.tags.clone(),
            image,
        })
    }
}

#[async_trait]
impl Decoder for MockDecoder {
    fn name(&self) -> &str {
        "mock"
    }

    fn extension(&self) -> &'static str {
        self.extension
    }

    fn extracts_image(&self) -> bool {
        self.extracts_image
    }

    async fn decode(
        &self,
        input: &Path,
        targets: &DecodeTargets,
    ) -> Result<DecodedAudio, CodecError> {
        self.state.decodes.fetch_add(1, Ordering::SeqCst);
        *self.state.last_targets.lock().unwrap() = Some(targets.clone());

        let _in_flight = self.state.concurrency.enter();
        self.run_decode(input, targets).await
    }
}

/// A recorded encode call.
#[derive(Debug, Clone)]
pub struct RecordedEncode {
    pub decoded: DecodedAudio,
    pub output: PathBuf,
    pub success: bool,
}

#[derive(Debug, Default)]
struct EncoderState {
    failing: Mutex<HashSet<String>>,
    encodes: Mutex<Vec<RecordedEncode>>,
    concurrency: Concurrency,
}

/// Mock encoder that copies the decoded audio to the output path.
#[derive(Debug, Clone)]
pub struct MockEncoder {
    extension: &'static str,
    delay: Duration,
    state: Arc<EncoderState>,
}

impl MockEncoder {
    pub fn new(extension: &'static str) -> Self {
        Self {
            extension,
            delay: Duration::ZERO,
            state: Arc::new(EncoderState::default()),
        }
    }

    /// Simulated encode time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every encode to an output with this file name, after writing
    /// [`MOCK_PARTIAL`] to it.
    pub fn fail_on(&self, name: &str) {
        self.state
            .failing
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    pub fn encode_count(&self) -> usize {
        self.state.encodes.lock().unwrap().len()
    }

    pub fn encodes(&self) -> Vec<RecordedEncode> {
        self.state.encodes.lock().unwrap().clone()
    }

    pub fn max_concurrency(&self) -> usize {
        self.state.concurrency.max.load(Ordering::SeqCst)
    }

    async fn run_encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let fail = self.state.failing.lock().unwrap().contains(&file_name(output));
        if fail {
            tokio::fs::write(output, MOCK_PARTIAL).await?;
            return Err(CodecError::tool_failed("mock-encoder", Some(1), b"forced failure"));
        }

        tokio::fs::copy(&decoded.audio, output).await?;
        Ok(())
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    fn extension(&self) -> &'static str {
        self.extension
    }

    async fn encode(&self, decoded: &DecodedAudio, output: &Path) -> Result<(), CodecError> {
        let result = {
            let _in_flight = self.state.concurrency.enter();
            self.run_encode(decoded, output).await
        };

        self.state.encodes.lock().unwrap().push(RecordedEncode {
            decoded: decoded.clone(),
            output: output.to_path_buf(),
            success: result.is_ok(),
        });
        result
    }
}
