use crate::backend::MediaBackend;
use crate::codec::PacketDecoder;
use crate::config::{DecoderConfig, Options};
use crate::container::Demuxer;
use crate::error::{CodecError, Result, Stage, TranscodeError};
use crate::frame::MediaFrame;
use crate::packet::Packet;
use crate::stage::{Pump, StageState, Submission, after_receive, after_send};
use crate::stream::{ElectedStream, MediaKind};
use crate::timestamp::Rational;

/// Decode stage: pulls packets of one stream out of a [`Demuxer`] and turns them into frames.
pub struct Decoder<D> {
    inner: D,
    stream_index: usize,
    kind: MediaKind,
    time_base: Rational,
    state: StageState<Packet>,
    packets_read: u64,
    frames: u64,
}

impl<D: PacketDecoder> Decoder<D> {
    pub fn new(inner: D, stream: &ElectedStream) -> Self {
        Self {
            inner,
            stream_index: stream.index(),
            kind: stream.kind(),
            time_base: stream.time_base(),
            state: StageState::Idle,
            packets_read: 0,
            frames: 0,
        }
    }

    /// Opens a decoder for `stream` with the stream's own codec parameters.
    /// `config` options are applied on top; frames are always reference counted.
    pub fn open<B>(
        backend: &B,
        input: &B::Input,
        stream: &ElectedStream,
        config: Option<&DecoderConfig>,
    ) -> Result<Self>
    where
        B: MediaBackend<Decoder = D> + ?Sized,
    {
        let mut options = Options::new();
        if let Some(config) = config {
            options.merge(&config.options);
        }
        options.set("refcounted_frames", "1");

        let inner = backend
            .open_decoder(input, stream, &options)
            .map_err(|reason| TranscodeError::OpenDecoder {
                kind: stream.kind(),
                reason,
            })?;
        log::info!(
            "opened {} decoder for stream {} ({})",
            stream.kind(),
            stream.index(),
            stream.codec()
        );
        Ok(Self::new(inner, stream))
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Time base of the packets fed to the decoder.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn state(&self) -> &StageState<Packet> {
        &self.state
    }

    /// Packets of the decoded stream read from the input so far.
    pub fn packets_read(&self) -> u64 {
        self.packets_read
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames
    }

    /// Makes one step: submits at most one packet (or the end-of-input signal)
    /// and extracts at most one frame.
    ///
    /// A packet the decoder refused is resubmitted before anything new is read
    /// from `source`. Returned frames carry no timing from the source.
    pub fn pump<S>(&mut self, source: &mut S) -> Result<Pump<D::Frame>>
    where
        S: Demuxer + ?Sized,
    {
        match std::mem::replace(&mut self.state, StageState::Idle) {
            StageState::Eof => {
                self.state = StageState::Eof;
                return Ok(Pump::EndOfStream);
            }
            StageState::Draining => self.state = StageState::Draining,
            StageState::HaveUnit(packet) => self.submit(Submission::Unit(packet))?,
            StageState::Idle => {
                let submission = self.next_submission(source)?;
                self.submit(submission)?;
            }
        }

        let result = self.inner.receive_frame();
        match after_receive(&mut self.state, result).map_err(fatal)? {
            Pump::Ready(mut frame) => {
                frame.clear_timing();
                self.frames += 1;
                Ok(Pump::Ready(frame))
            }
            Pump::WouldBlock => Ok(Pump::WouldBlock),
            Pump::EndOfStream => {
                log::debug!("{} decoder flushed after {} frames", self.kind, self.frames);
                Ok(Pump::EndOfStream)
            }
        }
    }

    fn next_submission<S>(&mut self, source: &mut S) -> Result<Submission<Packet>>
    where
        S: Demuxer + ?Sized,
    {
        loop {
            match source.read_packet() {
                Ok(Some(packet)) if packet.index() == self.stream_index => {
                    self.packets_read += 1;
                    return Ok(Submission::Unit(packet));
                }
                Ok(Some(_)) => continue,
                Ok(None) | Err(CodecError::Eof) => return Ok(Submission::EndOfInput),
                Err(e) => return Err(TranscodeError::fatal(Stage::Demux, e)),
            }
        }
    }

    fn submit(&mut self, submission: Submission<Packet>) -> Result<()> {
        let result = match &submission {
            Submission::Unit(packet) => self.inner.send_packet(Some(packet)),
            Submission::EndOfInput => self.inner.send_packet(None),
        };
        self.state = after_send(submission, result).map_err(fatal)?;
        Ok(())
    }
}

fn fatal(source: CodecError) -> TranscodeError {
    TranscodeError::fatal(Stage::Decode, source)
}

#[cfg(test)]
#[path = "decoder_test.rs"]
mod decoder_test;
