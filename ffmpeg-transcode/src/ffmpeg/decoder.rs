use super::convert::{codec_id, dictionary, to_ffmpeg_packet};
use super::frame::RawFrame;
use super::input::AvInput;
use crate::codec::PacketDecoder;
use crate::config::Options;
use crate::error::{CodecError, OpenFailure};
use crate::packet::Packet;
use crate::stream::{ElectedStream, MediaKind};

enum DecoderType {
    Video(ffmpeg_next::codec::decoder::Video),
    Audio(ffmpeg_next::codec::decoder::Audio),
}

/// An opened libavcodec decoder.
pub struct AvDecoder {
    inner: DecoderType,
}

impl AvDecoder {
    pub fn open(
        input: &AvInput,
        stream: &ElectedStream,
        options: &Options,
    ) -> Result<Self, OpenFailure> {
        let codec = ffmpeg_next::decoder::find(codec_id(stream.codec()))
            .ok_or_else(|| OpenFailure::CodecNotFound(stream.codec().to_string()))?;
        let parameters = input.parameters(stream.index()).ok_or_else(|| {
            OpenFailure::Parameters(CodecError::other(
                crate::error::AVERROR_STREAM_NOT_FOUND,
                "Stream not found",
            ))
        })?;

        let mut decoder_ctx = ffmpeg_next::codec::Context::new_with_codec(codec);
        decoder_ctx
            .set_parameters(parameters)
            .map_err(|e| OpenFailure::Parameters(e.into()))?;
        unsafe {
            (*decoder_ctx.as_mut_ptr()).time_base =
                ffmpeg_next::Rational::from(stream.time_base()).into();
        }

        let opened = decoder_ctx
            .decoder()
            .open_as_with(codec, dictionary(options))
            .map_err(|e| OpenFailure::Open(e.into()))?;

        let inner = match stream.kind() {
            MediaKind::Video => {
                DecoderType::Video(opened.video().map_err(|e| OpenFailure::Open(e.into()))?)
            }
            MediaKind::Audio => {
                DecoderType::Audio(opened.audio().map_err(|e| OpenFailure::Open(e.into()))?)
            }
            other => return Err(OpenFailure::UnsupportedMedia(other)),
        };
        Ok(Self { inner })
    }
}

impl PacketDecoder for AvDecoder {
    type Frame = RawFrame;

    fn send_packet(&mut self, packet: Option<&Packet>) -> Result<(), CodecError> {
        let result = match (&mut self.inner, packet) {
            (DecoderType::Video(decoder), Some(packet)) => {
                decoder.send_packet(&to_ffmpeg_packet(packet))
            }
            (DecoderType::Audio(decoder), Some(packet)) => {
                decoder.send_packet(&to_ffmpeg_packet(packet))
            }
            (DecoderType::Video(decoder), None) => decoder.send_eof(),
            (DecoderType::Audio(decoder), None) => decoder.send_eof(),
        };
        result.map_err(CodecError::from)
    }

    fn receive_frame(&mut self) -> Result<RawFrame, CodecError> {
        match &mut self.inner {
            DecoderType::Video(decoder) => {
                let mut frame = ffmpeg_next::frame::Video::empty();
                decoder.receive_frame(&mut frame)?;
                Ok(RawFrame::Video(frame))
            }
            DecoderType::Audio(decoder) => {
                let mut frame = ffmpeg_next::frame::Audio::empty();
                decoder.receive_frame(&mut frame)?;
                Ok(RawFrame::Audio(frame))
            }
        }
    }
}
