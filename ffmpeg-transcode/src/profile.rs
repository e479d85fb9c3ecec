//! Constant-bitrate encoding profile and muxer settings.

use crate::config::{CodecFlags, EncoderConfig, EncoderConfigurator, FieldOrder, Options};
use crate::stream::{ElectedStream, MediaKind, OutputStream};
use crate::timestamp::Rational;

/// Constant-bitrate video profile, tuned for broadcast-style x264 output by default
/// (6 Mbit/s, 25 fps, interlaced top field first, HRD signalling).
#[derive(Debug, Clone, PartialEq)]
pub struct CbrProfile {
    pub codec: String,
    pub bit_rate: i64,
    pub gop_size: u32,
    /// Output frame rate; inherits the source's average frame rate when unset.
    pub fps: Option<u32>,
    /// Output size; inherits the source picture size when unset.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_format: String,
    pub interlaced: bool,
    pub sample_aspect_ratio: Rational,
    pub preset: Option<String>,
    pub tune: Option<String>,
    pub rc_lookahead: Option<u32>,
    pub extra_options: Options,
}

impl Default for CbrProfile {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            bit_rate: 6_000_000,
            gop_size: 25,
            fps: Some(25),
            width: None,
            height: None,
            pixel_format: "yuv420p".to_string(),
            interlaced: true,
            sample_aspect_ratio: Rational::new(64, 45),
            preset: Some("faster".to_string()),
            tune: Some("film".to_string()),
            rc_lookahead: Some(25),
            extra_options: Options::new(),
        }
    }
}

impl CbrProfile {
    /// VBV buffer filled to 90% at start.
    pub fn initial_buffer_occupancy(&self) -> i64 {
        self.bit_rate * 9 / 10
    }

    /// libx264 private parameters pinning the VBV to the target rate.
    pub fn x264_params(&self) -> String {
        let kbps = self.bit_rate / 1000;
        format!(
            "vbv-maxrate={}:vbv-bufsize={}:force-cfr=1:nal-hrd=cbr",
            kbps, kbps
        )
    }

    fn is_x264(&self) -> bool {
        self.codec == "libx264"
    }
}

impl EncoderConfigurator for CbrProfile {
    fn configure(
        &self,
        source: &ElectedStream,
        stream: &mut OutputStream,
        config: &mut EncoderConfig,
    ) -> anyhow::Result<()> {
        if source.kind() != MediaKind::Video {
            anyhow::bail!(
                "constant bitrate profile needs a video source, got {}",
                source.kind()
            );
        }
        if self.bit_rate <= 0 {
            anyhow::bail!("invalid bitrate {}", self.bit_rate);
        }
        let frame_rate = match self.fps {
            Some(0) => anyhow::bail!("invalid frame rate 0"),
            Some(fps) => Rational::new(i32::try_from(fps)?, 1),
            None => {
                let rate = source.stream().rate();
                if !rate.is_valid() {
                    anyhow::bail!("source frame rate {} is unknown, set one explicitly", rate);
                }
                rate
            }
        };

        let width = self.width.unwrap_or(source.stream().width());
        let height = self.height.unwrap_or(source.stream().height());
        if width == 0 || height == 0 {
            anyhow::bail!("invalid video size {}x{}", width, height);
        }

        if let Some(preset) = &self.preset {
            config.options.set("preset", preset);
        }
        if let Some(tune) = &self.tune {
            config.options.set("tune", tune);
        }
        if let Some(lookahead) = self.rc_lookahead {
            config.options.set_int("rc-lookahead", lookahead as i64);
        }

        config.kind = MediaKind::Video;
        config.width = width;
        config.height = height;
        config.pixel_format = self.pixel_format.clone();
        config.gop_size = self.gop_size;

        config.bit_rate = self.bit_rate;
        config.max_bit_rate = self.bit_rate;
        config.rc_buffer_size = i32::try_from(self.bit_rate)?;
        config.rc_initial_buffer_occupancy = i32::try_from(self.initial_buffer_occupancy())?;

        if self.is_x264() {
            config.options.set("x264-params", &self.x264_params());
        }

        if self.interlaced {
            config.field_order = FieldOrder::TopFirst;
            config.flags = CodecFlags {
                interlaced_dct: true,
                interlaced_me: true,
                closed_gop: true,
                global_header: config.flags.global_header,
            };
        } else {
            config.field_order = FieldOrder::Progressive;
            config.flags.closed_gop = true;
        }

        config.time_base = frame_rate.invert();
        config.frame_rate = frame_rate;
        config.sample_aspect_ratio = self.sample_aspect_ratio;
        config.options.merge(&self.extra_options);

        stream.set_time_base(config.time_base);
        Ok(())
    }
}

/// Options passed to the muxer when the output header is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxProfile {
    /// Target mux rate in bit/s (MPEG-TS pads to it).
    pub mux_rate: Option<i64>,
    /// Maximum demux-decode delay in microseconds.
    pub max_delay: Option<i64>,
    pub extra_options: Options,
}

impl Default for MuxProfile {
    fn default() -> Self {
        Self {
            mux_rate: Some(6_300_000),
            max_delay: Some(6_000_000),
            extra_options: Options::new(),
        }
    }
}

impl MuxProfile {
    /// Mux rate leaving 300 kbit/s of headroom above the video bitrate.
    pub fn for_bit_rate(bit_rate: i64) -> Self {
        Self {
            mux_rate: Some(bit_rate + 300_000),
            ..Default::default()
        }
    }

    pub fn to_options(&self) -> Options {
        let mut options = Options::new();
        if let Some(rate) = self.mux_rate {
            options.set_int("muxrate", rate);
        }
        if let Some(delay) = self.max_delay {
            options.set_int("max_delay", delay);
        }
        options.merge(&self.extra_options);
        options
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;
