//! Drives packets from the input through the decoder and encoder into the output.

use crate::codec::{FrameEncoder, PacketDecoder};
use crate::container::{Demuxer, Muxer};
use crate::decoder::Decoder;
use crate::encoder::{Encoder, Sent};
use crate::error::{Result, Stage, TranscodeError};
use crate::frame::{MediaFrame, PictureType};
use crate::stage::Pump;
use crate::timestamp::rescale_packet;

/// Counters of a finished (or aborted) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    pub packets_read: u64,
    pub frames_decoded: u64,
    pub frames_encoded: u64,
    pub packets_written: u64,
    /// Frames or end-of-input signals the encoder refused and got again.
    pub encoder_retries: u64,
}

/// A fully opened transcode: the output header has been written.
///
/// Frames are re-timed to a constant frame rate: the n-th accepted frame gets
/// pts `n` in the encoder time base, whatever the source said.
pub struct Pipeline<I, M, D, E>
where
    D: PacketDecoder,
{
    input: I,
    output: M,
    decoder: Decoder<D>,
    encoder: Encoder<E>,
    held: Option<D::Frame>,
    next_pts: i64,
    decoding_done: bool,
    packets_written: u64,
}

impl<I, M, D, E> Pipeline<I, M, D, E>
where
    I: Demuxer,
    M: Muxer,
    D: PacketDecoder,
    E: FrameEncoder<Frame = D::Frame>,
{
    pub fn new(input: I, output: M, decoder: Decoder<D>, encoder: Encoder<E>) -> Self {
        Self {
            input,
            output,
            decoder,
            encoder,
            held: None,
            next_pts: 0,
            decoding_done: false,
            packets_written: 0,
        }
    }

    pub fn stats(&self) -> TranscodeStats {
        TranscodeStats {
            packets_read: self.decoder.packets_read(),
            frames_decoded: self.decoder.frames_decoded(),
            frames_encoded: self.encoder.frames_encoded(),
            packets_written: self.packets_written,
            encoder_retries: self.encoder.retries(),
        }
    }

    /// Runs to completion and writes the trailer.
    ///
    /// On failure the encoder is not flushed; the trailer is still attempted so
    /// that what was muxed so far stays readable.
    pub fn run(mut self) -> Result<TranscodeStats> {
        match self.transcode() {
            Ok(()) => {
                self.output.write_trailer().map_err(TranscodeError::Trailer)?;
                let stats = self.stats();
                log::info!(
                    "transcode finished: {} packets read, {} frames decoded, {} frames encoded, {} packets written",
                    stats.packets_read,
                    stats.frames_decoded,
                    stats.frames_encoded,
                    stats.packets_written
                );
                Ok(stats)
            }
            Err(e) => {
                log::error!("{} (code {})", e, e.code().unwrap_or_default());
                if let Err(trailer) = self.output.write_trailer() {
                    log::warn!("failed to write trailer after error: {}", trailer);
                }
                Err(e)
            }
        }
    }

    fn transcode(&mut self) -> Result<()> {
        let encoder_time_base = self.encoder.time_base();
        let output_index = self.encoder.stream().index();
        let output_time_base = self
            .output
            .stream_time_base(output_index)
            .unwrap_or(encoder_time_base);
        log::debug!(
            "rescaling packets from {} to {}",
            encoder_time_base,
            output_time_base
        );

        loop {
            if self.held.is_none() && !self.decoding_done {
                self.next_frame()?;
            }

            if let Some(frame) = self.held.as_mut() {
                frame.set_pts(Some(self.next_pts));
                frame.set_picture_type(PictureType::None);
                frame.set_key(false);
                if self.encoder.send(Some(&*frame))? == Sent::Accepted {
                    log::debug!("frame sent to encoder: pts {}", self.next_pts);
                    self.held = None;
                    self.next_pts += 1;
                }
            } else if self.decoding_done {
                self.encoder.send(None)?;
            }

            match self.encoder.receive()? {
                Pump::Ready(mut packet) => {
                    rescale_packet(&mut packet, encoder_time_base, output_time_base);
                    packet.set_index(output_index);
                    log::debug!(
                        "writing packet: pts {:?}, dts {:?}, size {}",
                        packet.pts(),
                        packet.dts(),
                        packet.size()
                    );
                    self.output
                        .write_interleaved(packet)
                        .map_err(|e| TranscodeError::fatal(Stage::Mux, e))?;
                    self.packets_written += 1;
                }
                Pump::WouldBlock => {}
                Pump::EndOfStream => return Ok(()),
            }
        }
    }

    /// Pumps the decoder until it yields a frame or runs dry.
    fn next_frame(&mut self) -> Result<()> {
        loop {
            match self.decoder.pump(&mut self.input)? {
                Pump::Ready(frame) => {
                    self.held = Some(frame);
                    return Ok(());
                }
                Pump::WouldBlock => continue,
                Pump::EndOfStream => {
                    self.decoding_done = true;
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
