use std::path::Path;

use super::convert::{dictionary, to_ffmpeg_packet};
use crate::config::Options;
use crate::container::Muxer;
use crate::error::{CodecError, EINVAL};
use crate::packet::Packet;
use crate::stream::OutputStream;
use crate::timestamp::Rational;

/// An output file. The container format is guessed from the file name.
pub struct AvOutput {
    inner: ffmpeg_next::format::context::Output,
    have_written_header: bool,
    have_written_trailer: bool,
}

impl AvOutput {
    pub fn open(path: &Path) -> Result<Self, CodecError> {
        let output = ffmpeg_next::format::output(&path)?;
        Ok(Self {
            inner: output,
            have_written_header: false,
            have_written_trailer: false,
        })
    }

    pub(crate) fn context_mut(&mut self) -> &mut ffmpeg_next::format::context::Output {
        &mut self.inner
    }
}

impl Muxer for AvOutput {
    fn add_stream(&mut self) -> Result<OutputStream, CodecError> {
        let index = self
            .inner
            .add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?
            .index();
        unsafe {
            (**(*self.inner.as_mut_ptr()).streams.add(index)).id = index as i32;
        }
        Ok(OutputStream::new(index))
    }

    fn wants_global_header(&self) -> bool {
        self.inner
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER)
    }

    fn write_header(&mut self, options: &Options) -> Result<(), CodecError> {
        let unused = self.inner.write_header_with(dictionary(options))?;
        for (key, value) in unused.iter() {
            log::warn!("muxer option not used: {}={}", key, value);
        }
        self.have_written_header = true;
        Ok(())
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.inner.stream(index).map(|s| s.time_base().into())
    }

    fn write_interleaved(&mut self, packet: Packet) -> Result<(), CodecError> {
        if !self.have_written_header {
            return Err(CodecError::other(EINVAL, "packet written before the header"));
        }
        to_ffmpeg_packet(&packet).write_interleaved(&mut self.inner)?;
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<(), CodecError> {
        if self.have_written_header && !self.have_written_trailer {
            self.have_written_trailer = true;
            self.inner.write_trailer()?;
        }
        Ok(())
    }
}
