//! Codec integration tests against stand-in codec programs.
//!
//! Each test installs small shell scripts named after the real programs
//! (`flac`, `metaflac`, `opusenc`, `neroAacEnc`, `neroAacTag`) into a bin
//! folder. The scripts copy audio through and record their arguments, so
//! the tests check the exact command lines and the tag crosswalk without
//! the real encoders installed.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use transcoder_core::{
    codec::{Quality, SourceFormat, TargetFormat, ToolLocator, ToolsConfig},
    processor::{Dispatcher, DispatcherConfig, RunSummary},
    testing::fixtures,
};

const FLAC: &str = r#"#!/bin/sh
out=""; prev=""; last=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"; last="$a"
done
if [ "$1" = "--totally-silent" ]; then
  printf '%s\n' "$@" > "$(dirname "$0")/flac-encode.args"
  cp "$last" "$out"
else
  cp "$1" "$out"
fi
"#;

const METAFLAC: &str = r#"#!/bin/sh
for a in "$@"; do
  case "$a" in
    --export-tags-to=-)
      printf 'TITLE=Song\nVERSION=Remix\nTRACKNUMBER=03\nARTIST=Band\nCOMMENT=first line\nsecond line\n'
      ;;
    --export-picture-to=*)
      printf 'cover' > "${a#--export-picture-to=}"
      ;;
  esac
done
"#;

const OPUSENC: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/opusenc.args"
prev=""; last=""
for a in "$@"; do prev="$last"; last="$a"; done
cp "$prev" "$last"
"#;

const NERO_AAC_ENC: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/neroAacEnc.args"
cp "$2" "$4"
"#;

const NERO_AAC_TAG: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/neroAacTag.args"
"#;

const FAILING: &str = "#!/bin/sh\necho 'encoder exploded' >&2\nexit 3\n";

/// A bin folder of stand-in programs plus the folders of one run.
struct ToolHarness {
    bin: TempDir,
    input: TempDir,
    output: TempDir,
    scratch: TempDir,
}

impl ToolHarness {
    fn new() -> Self {
        let harness = Self {
            bin: TempDir::new().unwrap(),
            input: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
            scratch: TempDir::new().unwrap(),
        };
        harness.install("flac", FLAC);
        harness.install("metaflac", METAFLAC);
        harness.install("opusenc", OPUSENC);
        harness.install("neroAacEnc", NERO_AAC_ENC);
        harness.install("neroAacTag", NERO_AAC_TAG);
        harness
    }

    fn install(&self, name: &str, script: &str) {
        let path = self.bin.path().join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn locator(&self) -> ToolLocator {
        ToolLocator::with_search_path(
            ToolsConfig::default().with_bin_dir(self.bin.path().to_path_buf()),
            None,
        )
    }

    fn add_flac(&self, name: &str) -> PathBuf {
        let path = self.input.path().join(name);
        std::fs::write(&path, fixtures::flac_bytes()).unwrap();
        path
    }

    fn add_wave(&self, name: &str) -> PathBuf {
        let path = self.input.path().join(name);
        std::fs::write(&path, fixtures::wave_bytes(256)).unwrap();
        path
    }

    fn config(&self, target: TargetFormat) -> DispatcherConfig {
        self.config_from(SourceFormat::Flac, target)
    }

    fn config_from(&self, source: SourceFormat, target: TargetFormat) -> DispatcherConfig {
        DispatcherConfig::new(self.input.path(), self.output.path())
            .with_formats(source, target)
            .with_scratch_dir(self.scratch.path().to_path_buf())
    }

    async fn run(&self, config: DispatcherConfig) -> RunSummary {
        Dispatcher::new(config, &self.locator())
            .unwrap()
            .run()
            .await
            .unwrap()
    }

    fn was_called(&self, file: &str) -> bool {
        self.bin.path().join(file).exists()
    }

    /// Arguments the named program was last called with, one per entry.
    fn recorded_args(&self, file: &str) -> Vec<String> {
        read_lines(&self.bin.path().join(file))
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path()).unwrap().count() == 0
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_flac_to_aac_translates_tags() {
    let h = ToolHarness::new();
    let source = h.add_flac("song.flac");

    let config = h
        .config(TargetFormat::Aac)
        .with_quality(Quality::new(75).unwrap());
    let summary = Dispatcher::new(config, &h.locator())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.transcoded, 1);
    let output = std::fs::canonicalize(h.output.path()).unwrap().join("song.m4a");
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&source).unwrap());

    let enc = h.recorded_args("neroAacEnc.args");
    assert_eq!(enc[0], "-if");
    assert_eq!(enc[2], "-of");
    assert_eq!(&enc[4..], ["-q", "0.75"]);

    let tag = h.recorded_args("neroAacTag.args");
    assert_eq!(PathBuf::from(&tag[0]), output);
    assert!(tag.contains(&"-meta:title=Song [Remix]".to_string()));
    assert!(tag.contains(&"-meta:track=3".to_string()));
    assert!(tag.contains(&"-meta:artist=Band".to_string()));
    assert!(!tag.iter().any(|a| a.starts_with("-meta:version")));
    // no cover requested
    assert!(!tag.iter().any(|a| a.starts_with("-add-cover")));

    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_flac_to_opus_with_cover() {
    let h = ToolHarness::new();
    h.add_flac("song.flac");

    let config = h.config(TargetFormat::Opus).with_copy_image(true);
    let summary = Dispatcher::new(config, &h.locator())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.transcoded, 1);
    assert!(h.output.path().join("song.opus").is_file());

    let args = h.recorded_args("opusenc.args");
    assert_eq!(&args[0..2], ["--comp", "5"]);
    let comment = args.iter().position(|a| a == "TITLE=Song").unwrap();
    assert_eq!(args[comment - 1], "--comment");
    assert!(args.contains(&"COMMENT=first line".to_string()));
    let picture = args.iter().position(|a| a == "--picture").unwrap();
    let scratch = std::fs::canonicalize(h.scratch.path()).unwrap();
    assert!(Path::new(&args[picture + 1]).starts_with(&scratch));

    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_flac_to_flac_compression_level() {
    let h = ToolHarness::new();
    h.add_flac("song.flac");
    let out = TempDir::new().unwrap();

    let config = DispatcherConfig::new(h.input.path(), out.path())
        .with_formats(SourceFormat::Flac, TargetFormat::Flac)
        .with_scratch_dir(h.scratch.path().to_path_buf())
        .with_quality(Quality::new(100).unwrap());
    Dispatcher::new(config, &h.locator())
        .unwrap()
        .run()
        .await
        .unwrap();

    let args = h.recorded_args("flac-encode.args");
    assert_eq!(&args[0..2], ["--totally-silent", "-8"]);
    assert!(args.contains(&"-T".to_string()));
    assert!(args.contains(&"VERSION=Remix".to_string()));
    assert!(out.path().join("song.flac").is_file());
}

#[tokio::test]
async fn test_flac_to_wave_drops_tags() {
    let h = ToolHarness::new();
    let source = h.add_flac("song.flac");

    let summary = h.run(h.config(TargetFormat::Wave)).await;

    assert_eq!(summary.transcoded, 1);
    assert_eq!(summary.failed, 0);
    let output = h.output.path().join("song.wav");
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&source).unwrap());
    assert!(!h.was_called("flac-encode.args"));
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_wave_to_opus_has_no_comments() {
    let h = ToolHarness::new();
    let source = h.add_wave("song.wav");

    let summary = h
        .run(h.config_from(SourceFormat::Wave, TargetFormat::Opus))
        .await;

    assert_eq!(summary.transcoded, 1);
    let output = h.output.path().join("song.opus");
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&source).unwrap());
    let args = h.recorded_args("opusenc.args");
    assert_eq!(&args[0..2], ["--comp", "5"]);
    assert!(!args.contains(&"--comment".to_string()));
    assert!(!args.contains(&"--picture".to_string()));
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_wave_to_flac_has_no_tags() {
    let h = ToolHarness::new();
    h.add_wave("song.wav");

    let summary = h
        .run(h.config_from(SourceFormat::Wave, TargetFormat::Flac))
        .await;

    assert_eq!(summary.transcoded, 1);
    assert!(h.output.path().join("song.flac").is_file());
    let args = h.recorded_args("flac-encode.args");
    assert_eq!(args[0], "--totally-silent");
    assert!(!args.contains(&"-T".to_string()));
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_wave_to_aac_skips_tagging() {
    let h = ToolHarness::new();
    h.add_wave("song.wav");

    let summary = h
        .run(h.config_from(SourceFormat::Wave, TargetFormat::Aac))
        .await;

    assert_eq!(summary.transcoded, 1);
    assert!(h.output.path().join("song.m4a").is_file());
    assert!(h.was_called("neroAacEnc.args"));
    assert!(!h.was_called("neroAacTag.args"));
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_failing_encoder_is_contained() {
    let h = ToolHarness::new();
    h.install("opusenc", FAILING);
    h.add_flac("a.flac");
    h.add_flac("b.flac");

    let summary = Dispatcher::new(h.config(TargetFormat::Opus), &h.locator())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.transcoded, 0);
    assert_eq!(std::fs::read_dir(h.output.path()).unwrap().count(), 0);
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_invalid_flac_marker_is_a_job_failure() {
    let h = ToolHarness::new();
    h.add_flac("good.flac");
    std::fs::write(h.input.path().join("fake.flac"), fixtures::wave_bytes(16)).unwrap();

    let summary = Dispatcher::new(h.config(TargetFormat::Opus), &h.locator())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.transcoded, 1);
    assert_eq!(summary.failed, 1);
    assert!(!h.output.path().join("fake.opus").exists());
}

#[test]
fn test_missing_tagger_aborts_construction() {
    let h = ToolHarness::new();
    std::fs::remove_file(h.bin.path().join("neroAacTag")).unwrap();

    let err = Dispatcher::new(h.config(TargetFormat::Aac), &h.locator()).unwrap_err();
    assert!(err.to_string().contains("neroAacTag"));
}
