use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use ffmpeg_transcode::config::Options;
use ffmpeg_transcode::profile::{CbrProfile, MuxProfile};
use ffmpeg_transcode::stream::MediaKind;
use ffmpeg_transcode::timestamp::Rational;
use serde::Deserialize;

use crate::cli::Args;

/// Contents of the `--config` JSON file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub kind: Option<String>,
    pub stream: Option<i32>,
    pub format: Option<String>,
    /// Demuxer or device options, e.g. `video_size` for v4l2.
    pub input_options: BTreeMap<String, String>,
    pub encode: EncodeSection,
    pub mux: MuxSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeSection {
    pub codec: Option<String>,
    pub bitrate: Option<i64>,
    pub gop: Option<u32>,
    /// 0 keeps the source frame rate.
    pub fps: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_format: Option<String>,
    pub interlaced: Option<bool>,
    /// `[num, den]`
    pub sample_aspect_ratio: Option<[i32; 2]>,
    /// An empty string disables the option.
    pub preset: Option<String>,
    pub tune: Option<String>,
    pub rc_lookahead: Option<u32>,
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MuxSection {
    pub muxrate: Option<i64>,
    pub max_delay: Option<i64>,
    pub options: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Everything a run needs, after defaults, the config file and the flags were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub kind: MediaKind,
    pub stream: i32,
    pub format: Option<String>,
    pub input_options: Options,
    pub profile: CbrProfile,
    pub mux: MuxProfile,
}

impl Settings {
    pub fn resolve(file: FileConfig, args: &Args) -> anyhow::Result<Self> {
        let mut profile = CbrProfile::default();
        let encode = file.encode;
        if let Some(codec) = encode.codec {
            profile.codec = codec;
        }
        if let Some(bitrate) = encode.bitrate {
            profile.bit_rate = bitrate;
        }
        if let Some(gop) = encode.gop {
            profile.gop_size = gop;
        }
        if let Some(fps) = encode.fps {
            profile.fps = frame_rate(fps);
        }
        profile.width = encode.width;
        profile.height = encode.height;
        if let Some(format) = encode.pixel_format {
            profile.pixel_format = format;
        }
        if let Some(interlaced) = encode.interlaced {
            profile.interlaced = interlaced;
        }
        if let Some([num, den]) = encode.sample_aspect_ratio {
            if num <= 0 || den <= 0 {
                anyhow::bail!("invalid sample aspect ratio {}:{}", num, den);
            }
            profile.sample_aspect_ratio = Rational::new(num, den);
        }
        if let Some(preset) = encode.preset {
            profile.preset = non_empty(preset);
        }
        if let Some(tune) = encode.tune {
            profile.tune = non_empty(tune);
        }
        if encode.rc_lookahead.is_some() {
            profile.rc_lookahead = encode.rc_lookahead;
        }
        profile.extra_options = encode.options.iter().collect::<Options>();

        if let Some(codec) = &args.codec {
            profile.codec = codec.clone();
        }
        if let Some(bitrate) = args.bitrate {
            profile.bit_rate = bitrate;
        }
        if let Some(gop) = args.gop {
            profile.gop_size = gop;
        }
        if let Some(fps) = args.fps {
            profile.fps = frame_rate(fps);
        }
        if args.width.is_some() {
            profile.width = args.width;
        }
        if args.height.is_some() {
            profile.height = args.height;
        }
        if args.progressive {
            profile.interlaced = false;
        }

        let defaults = MuxProfile::for_bit_rate(profile.bit_rate);
        let mux = MuxProfile {
            mux_rate: file.mux.muxrate.or(defaults.mux_rate),
            max_delay: file.mux.max_delay.or(defaults.max_delay),
            extra_options: file.mux.options.iter().collect(),
        };

        let kind = match (args.kind, file.kind) {
            (Some(kind), _) => kind,
            (None, Some(kind)) => kind.parse()?,
            (None, None) => MediaKind::Video,
        };

        Ok(Self {
            kind,
            stream: args.stream.or(file.stream).unwrap_or(-1),
            format: args.format.clone().or(file.format),
            input_options: file.input_options.iter().collect(),
            profile,
            mux,
        })
    }
}

fn frame_rate(fps: u32) -> Option<u32> {
    (fps > 0).then_some(fps)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
