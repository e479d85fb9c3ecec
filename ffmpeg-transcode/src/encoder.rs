use crate::backend::MediaBackend;
use crate::codec::FrameEncoder;
use crate::config::{EncoderConfig, EncoderConfigurator};
use crate::container::Muxer;
use crate::error::{CodecError, EINVAL, OpenFailure, Result, Stage, TranscodeError};
use crate::frame::MediaFrame;
use crate::packet::Packet;
use crate::stage::{Pump, StageState, Submission, after_receive, after_send};
use crate::stream::{ElectedStream, OutputStream};
use crate::timestamp::Rational;

/// Outcome of [`Encoder::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sent {
    Accepted,
    /// The encoder is full; extract packets and send the same frame again.
    WouldBlock,
}

/// Encode stage: turns frames into packets for one output stream.
///
/// The caller keeps ownership of a frame until it was accepted. While a
/// frame is refused, the stage remembers its pts and rejects any other frame.
pub struct Encoder<E> {
    inner: E,
    codec: String,
    stream: OutputStream,
    state: StageState<Option<i64>>,
    frames: u64,
    packets: u64,
    retries: u64,
}

impl<E: FrameEncoder> Encoder<E> {
    pub fn new(inner: E, codec: &str, stream: OutputStream) -> Self {
        Self {
            inner,
            codec: codec.to_string(),
            stream,
            state: StageState::Idle,
            frames: 0,
            packets: 0,
            retries: 0,
        }
    }

    /// Adds a stream to `output` and opens encoder `codec` for it.
    ///
    /// `configurator` fills in the configuration; the global header flag is
    /// set on top of it when the output format asks for it.
    pub fn open<B, C>(
        backend: &B,
        output: &mut B::Output,
        codec: &str,
        source: &ElectedStream,
        configurator: &C,
    ) -> Result<Self>
    where
        B: MediaBackend<Encoder = E> + ?Sized,
        C: EncoderConfigurator + ?Sized,
    {
        let open_error = |reason| TranscodeError::OpenEncoder {
            name: codec.to_string(),
            reason,
        };

        if !backend.has_encoder(codec) {
            return Err(open_error(OpenFailure::CodecNotFound(codec.to_string())));
        }

        let mut stream = output
            .add_stream()
            .map_err(|e| open_error(OpenFailure::StreamAllocation(e)))?;

        let mut config = EncoderConfig::new(codec);
        configurator
            .configure(source, &mut stream, &mut config)
            .map_err(|e| open_error(OpenFailure::Configure(format!("{:#}", e))))?;

        if output.wants_global_header() {
            config.flags.global_header = true;
        }

        let inner = backend
            .open_encoder(output, &stream, &config)
            .map_err(open_error)?;
        if stream.time_base().is_none() {
            stream.set_time_base(config.time_base);
        }

        log::info!(
            "opened encoder {} for output stream {}: {}x{} {} {} bit/s, time base {}",
            codec,
            stream.index(),
            config.width,
            config.height,
            config.pixel_format,
            config.bit_rate,
            config.time_base
        );
        Ok(Self::new(inner, codec, stream))
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }

    pub fn stream(&self) -> &OutputStream {
        &self.stream
    }

    /// Time base of the produced packets.
    pub fn time_base(&self) -> Rational {
        self.inner.time_base()
    }

    pub fn state(&self) -> &StageState<Option<i64>> {
        &self.state
    }

    pub fn frames_encoded(&self) -> u64 {
        self.frames
    }

    pub fn packets_encoded(&self) -> u64 {
        self.packets
    }

    /// Submissions refused with would-block so far.
    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Submits `frame`, or the end-of-input signal for `None`.
    ///
    /// After end of input, further `None` calls are no-ops and any frame is an error.
    pub fn send(&mut self, frame: Option<&E::Frame>) -> Result<Sent> {
        let submission = match frame {
            Some(frame) => {
                if self.state.is_finishing() {
                    return Err(fatal(CodecError::Eof));
                }
                if let Some(pending) = self.state.pending() {
                    if *pending != frame.pts() {
                        return Err(fatal(CodecError::other(
                            EINVAL,
                            "frame submitted before the refused frame was sent again",
                        )));
                    }
                }
                Submission::Unit(frame.pts())
            }
            None => {
                if self.state.is_finishing() {
                    return Ok(Sent::Accepted);
                }
                if self.state.pending().is_some() {
                    return Err(fatal(CodecError::other(
                        EINVAL,
                        "end of input signalled while a refused frame is pending",
                    )));
                }
                Submission::EndOfInput
            }
        };

        let is_frame = matches!(submission, Submission::Unit(_));
        let result = self.inner.send_frame(frame);
        self.state = after_send(submission, result).map_err(fatal)?;

        match (&self.state, is_frame) {
            (StageState::HaveUnit(_), _) | (StageState::Idle, false) => {
                self.retries += 1;
                Ok(Sent::WouldBlock)
            }
            (_, true) => {
                self.frames += 1;
                Ok(Sent::Accepted)
            }
            (_, false) => {
                log::debug!("{} encoder draining after {} frames", self.codec, self.frames);
                Ok(Sent::Accepted)
            }
        }
    }

    /// Extracts at most one packet.
    pub fn receive(&mut self) -> Result<Pump<Packet>> {
        let result = self.inner.receive_packet();
        let pump = after_receive(&mut self.state, result).map_err(fatal)?;
        if let Pump::Ready(_) = pump {
            self.packets += 1;
        }
        Ok(pump)
    }

    /// Sends `frame` and extracts at most one packet.
    pub fn pump(&mut self, frame: Option<&E::Frame>) -> Result<(Sent, Pump<Packet>)> {
        let sent = self.send(frame)?;
        let pump = self.receive()?;
        Ok((sent, pump))
    }
}

fn fatal(source: CodecError) -> TranscodeError {
    TranscodeError::fatal(Stage::Encode, source)
}

#[cfg(test)]
#[path = "encoder_test.rs"]
mod encoder_test;
