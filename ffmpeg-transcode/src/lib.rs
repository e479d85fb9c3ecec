//! Single-stream transcoding: elect one stream of an input file, decode it,
//! re-encode it at a constant frame rate and mux it into an output file.
//!
//! The pipeline is written against the traits in [`backend`], [`container`]
//! and [`codec`]; the `ffmpeg` feature provides the implementation on top of
//! `ffmpeg-next`.

pub mod backend;
pub mod codec;
pub mod config;
pub mod container;
pub mod decoder;
pub mod elector;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod packet;
pub mod pipeline;
pub mod profile;
pub mod session;
pub mod stage;
pub mod stream;
pub mod timestamp;

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;

#[cfg(test)]
mod testing;

pub use error::{Result, TranscodeError};
pub use pipeline::TranscodeStats;
pub use session::{TranscodeJob, transcode};

/// Registers FFmpeg components (formats, devices, codecs). Call once at startup
/// before opening any file.
#[cfg(feature = "ffmpeg")]
pub fn init() -> anyhow::Result<()> {
    ffmpeg_next::init().map_err(|e| anyhow::anyhow!("ffmpeg_next init: {}", e))
}
