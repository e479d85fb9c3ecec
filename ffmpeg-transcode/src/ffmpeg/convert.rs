//! Conversions between the pipeline types and their `ffmpeg_next` counterparts.

use std::ffi::CString;

use bytes::Bytes;
use ffmpeg_next::{Dictionary, codec, media};

use crate::config::Options;
use crate::error::CodecError;
use crate::packet::Packet;
use crate::stream::MediaKind;
use crate::timestamp::Rational;

impl From<ffmpeg_next::Error> for CodecError {
    fn from(e: ffmpeg_next::Error) -> Self {
        match e {
            ffmpeg_next::Error::Eof => CodecError::Eof,
            ffmpeg_next::Error::Other { errno } if errno == ffmpeg_next::util::error::EAGAIN => {
                CodecError::Again
            }
            e => {
                let message = e.to_string();
                CodecError::other(e.into(), message)
            }
        }
    }
}

impl From<ffmpeg_next::Rational> for Rational {
    fn from(r: ffmpeg_next::Rational) -> Self {
        Rational::new(r.numerator(), r.denominator())
    }
}

impl From<Rational> for ffmpeg_next::Rational {
    fn from(r: Rational) -> Self {
        ffmpeg_next::Rational::new(r.numerator(), r.denominator())
    }
}

impl From<media::Type> for MediaKind {
    fn from(kind: media::Type) -> Self {
        match kind {
            media::Type::Video => MediaKind::Video,
            media::Type::Audio => MediaKind::Audio,
            media::Type::Subtitle => MediaKind::Subtitle,
            media::Type::Data => MediaKind::Data,
            media::Type::Attachment => MediaKind::Attachment,
            media::Type::Unknown => MediaKind::Unknown,
        }
    }
}

pub(crate) fn dictionary(options: &Options) -> Dictionary<'static> {
    let mut dict = Dictionary::new();
    for (key, value) in options.iter() {
        dict.set(key, value);
    }
    dict
}

/// Resolves a codec name as reported by [`codec::Id::name`] back to its id.
pub(crate) fn codec_id(name: &str) -> codec::Id {
    let Ok(name) = CString::new(name) else {
        return codec::Id::None;
    };
    unsafe {
        let descriptor = ffmpeg_next::ffi::avcodec_descriptor_get_by_name(name.as_ptr());
        if descriptor.is_null() {
            codec::Id::None
        } else {
            codec::Id::from((*descriptor).id)
        }
    }
}

pub(crate) fn from_ffmpeg_packet(packet: &ffmpeg_next::Packet) -> Packet {
    let data = packet
        .data()
        .map(Bytes::copy_from_slice)
        .unwrap_or_default();
    let mut out = Packet::new(packet.stream(), data)
        .with_pts(packet.pts())
        .with_dts(packet.dts());
    out.set_duration(packet.duration());
    out.set_key(packet.is_key());
    let position = packet.position();
    out.set_position((position >= 0).then_some(position as i64));
    out
}

pub(crate) fn to_ffmpeg_packet(packet: &Packet) -> ffmpeg_next::Packet {
    let mut out = ffmpeg_next::Packet::copy(packet.data());
    out.set_stream(packet.index());
    out.set_pts(packet.pts());
    out.set_dts(packet.dts());
    out.set_duration(packet.duration());
    out.set_position(packet.position().map_or(-1, |p| p as isize));
    if packet.is_key() {
        out.set_flags(codec::packet::Flags::KEY);
    }
    out
}
