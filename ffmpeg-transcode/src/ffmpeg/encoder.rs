use std::str::FromStr;

use ffmpeg_next::codec;
use ffmpeg_next::format::Pixel;

use super::convert::{dictionary, from_ffmpeg_packet};
use super::frame::RawFrame;
use super::output::AvOutput;
use super::scaler::Scaler;
use crate::codec::FrameEncoder;
use crate::config::{EncoderConfig, FieldOrder};
use crate::error::{CodecError, EINVAL, OpenFailure};
use crate::packet::Packet;
use crate::stream::{MediaKind, OutputStream};
use crate::timestamp::Rational;

/// An opened libavcodec video encoder bound to one output stream.
pub struct AvEncoder {
    inner: ffmpeg_next::codec::encoder::Video,
    time_base: Rational,
    scaler: Option<Scaler>,
}

impl AvEncoder {
    pub fn open(
        output: &mut AvOutput,
        stream: &OutputStream,
        config: &EncoderConfig,
    ) -> Result<Self, OpenFailure> {
        if config.kind != MediaKind::Video {
            return Err(OpenFailure::UnsupportedMedia(config.kind));
        }
        let codec = ffmpeg_next::encoder::find_by_name(&config.codec)
            .ok_or_else(|| OpenFailure::CodecNotFound(config.codec.clone()))?;
        let format = Pixel::from_str(&config.pixel_format)
            .map_err(|_| {
                OpenFailure::Configure(format!("unknown pixel format {}", config.pixel_format))
            })?;

        let mut encoder = ffmpeg_next::codec::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| OpenFailure::Open(e.into()))?;

        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(format);
        encoder.set_bit_rate(config.bit_rate.max(0) as usize);
        encoder.set_max_bit_rate(config.max_bit_rate.max(0) as usize);
        encoder.set_gop(config.gop_size);
        encoder.set_time_base(config.time_base);
        encoder.set_frame_rate(Some(config.frame_rate));
        encoder.set_aspect_ratio(config.sample_aspect_ratio);
        encoder.set_flags(codec_flags(config));
        unsafe {
            let ptr = encoder.as_mut_ptr();
            (*ptr).rc_min_rate = config.min_bit_rate;
            (*ptr).rc_buffer_size = config.rc_buffer_size;
            (*ptr).rc_initial_buffer_occupancy = config.rc_initial_buffer_occupancy;
            (*ptr).field_order = field_order(config.field_order);
        }

        let mut inner = encoder
            .open_as_with(codec, dictionary(&config.options))
            .map_err(|e| OpenFailure::Open(e.into()))?;
        // libavcodec may reset the aspect ratio while opening.
        inner.set_aspect_ratio(config.sample_aspect_ratio);

        let context = output.context_mut();
        unsafe {
            let ret = ffmpeg_next::ffi::avcodec_parameters_from_context(
                (**(*context.as_mut_ptr()).streams.add(stream.index())).codecpar,
                inner.as_ptr() as *mut ffmpeg_next::ffi::AVCodecContext,
            );
            if ret < 0 {
                return Err(OpenFailure::Parameters(ffmpeg_next::Error::from(ret).into()));
            }
        }
        if let Some(mut out) = context.stream_mut(stream.index()) {
            out.set_time_base(stream.time_base().unwrap_or(config.time_base));
        }

        let time_base = unsafe { ffmpeg_next::Rational::from((*inner.as_ptr()).time_base) }.into();
        Ok(Self {
            inner,
            time_base,
            scaler: None,
        })
    }

    /// Converts `frame` when its format or size differs from the encoder's.
    fn convert(
        &mut self,
        frame: &ffmpeg_next::frame::Video,
    ) -> Result<Option<ffmpeg_next::frame::Video>, CodecError> {
        let target = (self.inner.format(), self.inner.width(), self.inner.height());
        if (frame.format(), frame.width(), frame.height()) == target {
            return Ok(None);
        }
        if !self.scaler.as_ref().is_some_and(|s| s.accepts(frame)) {
            let source = (frame.format(), frame.width(), frame.height());
            self.scaler = Some(Scaler::new(source, target)?);
        }
        let mut converted = ffmpeg_next::frame::Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(frame, &mut converted)?;
        }
        converted.set_pts(frame.pts());
        converted.set_kind(frame.kind());
        Ok(Some(converted))
    }
}

fn codec_flags(config: &EncoderConfig) -> codec::Flags {
    let mut flags = codec::Flags::empty();
    flags.set(codec::Flags::INTERLACED_DCT, config.flags.interlaced_dct);
    flags.set(codec::Flags::INTERLACED_ME, config.flags.interlaced_me);
    flags.set(codec::Flags::CLOSED_GOP, config.flags.closed_gop);
    flags.set(codec::Flags::GLOBAL_HEADER, config.flags.global_header);
    flags
}

fn field_order(order: FieldOrder) -> ffmpeg_next::ffi::AVFieldOrder {
    use ffmpeg_next::ffi::AVFieldOrder::*;
    match order {
        FieldOrder::Unknown => AV_FIELD_UNKNOWN,
        FieldOrder::Progressive => AV_FIELD_PROGRESSIVE,
        FieldOrder::TopFirst => AV_FIELD_TT,
        FieldOrder::BottomFirst => AV_FIELD_BB,
        FieldOrder::TopBottom => AV_FIELD_TB,
        FieldOrder::BottomTop => AV_FIELD_BT,
    }
}

impl FrameEncoder for AvEncoder {
    type Frame = RawFrame;

    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn send_frame(&mut self, frame: Option<&RawFrame>) -> Result<(), CodecError> {
        let Some(frame) = frame else {
            return Ok(self.inner.send_eof()?);
        };
        let Some(video) = frame.as_video() else {
            return Err(CodecError::other(EINVAL, "audio frame sent to a video encoder"));
        };
        match self.convert(video)? {
            Some(converted) => self.inner.send_frame(&converted)?,
            None => self.inner.send_frame(video)?,
        }
        Ok(())
    }

    fn receive_packet(&mut self) -> Result<Packet, CodecError> {
        let mut packet = ffmpeg_next::Packet::empty();
        self.inner.receive_packet(&mut packet)?;
        Ok(from_ffmpeg_packet(&packet))
    }
}
