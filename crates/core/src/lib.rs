pub mod codec;
pub mod config;
pub mod metadata;
pub mod processor;
pub mod scratch;
pub mod testing;

pub use codec::{
    build_decoder, build_encoder, CodecError, CodecOptions, Decoder, Encoder, Quality,
    SourceFormat, TargetFormat, ToolLocator, ToolsConfig,
};
pub use config::{
    load_config, load_config_from_str, load_config_with, validate_config, Config, ConfigError,
    JobConfig,
};
pub use processor::{Dispatcher, DispatcherConfig, PipelineError, RunSummary};
