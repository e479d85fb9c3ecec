use std::path::PathBuf;

use clap::Parser;
use ffmpeg_transcode::stream::MediaKind;

/// Re-encodes the best video stream of INPUT as constant-bitrate video in OUTPUT.
#[derive(Debug, Parser)]
#[command(name = "cbr-transcode")]
#[command(about = "Transcode one stream of a media file at a constant bitrate")]
pub struct Args {
    /// Input media file.
    pub input: PathBuf,

    /// Output media file; the container is guessed from the extension.
    pub output: PathBuf,

    /// JSON configuration file applied before the flags below.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Encoder name, e.g. libx264.
    #[arg(long)]
    pub codec: Option<String>,

    /// Target bitrate in bit/s.
    #[arg(short, long)]
    pub bitrate: Option<i64>,

    /// Keyframe interval in frames.
    #[arg(short, long)]
    pub gop: Option<u32>,

    /// Output frame rate; 0 keeps the source frame rate.
    #[arg(long)]
    pub fps: Option<u32>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Encode progressive frames instead of top-field-first interlaced.
    #[arg(long)]
    pub progressive: bool,

    /// Input stream index to transcode instead of the elected one.
    #[arg(short, long, allow_negative_numbers = true)]
    pub stream: Option<i32>,

    /// Kind of stream to elect.
    #[arg(short, long)]
    pub kind: Option<MediaKind>,

    /// Force the input format, e.g. lavfi.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Log codec and pipeline details (-vv for every unit).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod cli_test;
