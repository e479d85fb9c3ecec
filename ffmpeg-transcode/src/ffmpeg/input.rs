use std::ffi::CString;
use std::path::Path;

use ffmpeg_next::Dictionary;
use ffmpeg_next::format::stream::Disposition;

use super::convert::from_ffmpeg_packet;
use crate::container::Demuxer;
use crate::error::{CodecError, EINVAL};
use crate::packet::Packet;
use crate::stream::AvStream;

/// An opened input file or device.
pub struct AvInput {
    inner: ffmpeg_next::format::context::Input,
    streams: Vec<AvStream>,
    finished: bool,
}

impl AvInput {
    /// Resolve input format by name (e.g. "lavfi", "v4l2") via FFmpeg's av_find_input_format.
    fn find_input_format(name: &str) -> Result<ffmpeg_next::format::format::Input, CodecError> {
        let cname = CString::new(name)
            .map_err(|e| CodecError::other(EINVAL, format!("invalid format name {:?}: {}", name, e)))?;
        let ptr = unsafe { ffmpeg_next::ffi::av_find_input_format(cname.as_ptr()) };
        if ptr.is_null() {
            return Err(CodecError::other(
                EINVAL,
                format!("input format not found: {}", name),
            ));
        }
        Ok(unsafe { ffmpeg_next::format::format::Input::wrap(ptr as *mut _) })
    }

    pub fn open(
        path: &Path,
        format: Option<&str>,
        options: Dictionary,
    ) -> Result<Self, CodecError> {
        use ffmpeg_next::format::format::Format;

        let input = match format {
            Some(name) => {
                let fmt = Self::find_input_format(name)?;
                ffmpeg_next::format::open_with(path, &Format::Input(fmt), options)?.input()
            }
            None => ffmpeg_next::format::input_with_dictionary(path, options)?,
        };

        let streams = input.streams().map(describe).collect();
        Ok(Self {
            inner: input,
            streams,
            finished: false,
        })
    }

    pub(crate) fn parameters(&self, index: usize) -> Option<ffmpeg_next::codec::Parameters> {
        self.inner.stream(index).map(|s| s.parameters())
    }
}

fn describe(stream: ffmpeg_next::format::stream::Stream<'_>) -> AvStream {
    let parameters = stream.parameters();
    let (width, height, bit_rate) = unsafe {
        let ptr = parameters.as_ptr();
        (
            (*ptr).width.max(0) as u32,
            (*ptr).height.max(0) as u32,
            (*ptr).bit_rate,
        )
    };
    let disposition = stream.disposition();

    AvStream::new(
        stream.index(),
        parameters.medium().into(),
        parameters.id().name(),
        stream.time_base().into(),
    )
    .with_rate(stream.avg_frame_rate().into())
    .with_size(width, height)
    .with_bit_rate(bit_rate)
    .with_default(disposition.contains(Disposition::DEFAULT))
    .with_attached_picture(disposition.contains(Disposition::ATTACHED_PIC))
}

impl Demuxer for AvInput {
    fn streams(&self) -> &[AvStream] {
        &self.streams
    }

    fn read_packet(&mut self) -> Result<Option<Packet>, CodecError> {
        if self.finished {
            return Ok(None);
        }
        let mut packet = ffmpeg_next::Packet::empty();
        match packet.read(&mut self.inner) {
            Ok(()) => Ok(Some(from_ffmpeg_packet(&packet))),
            Err(ffmpeg_next::Error::Eof) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
