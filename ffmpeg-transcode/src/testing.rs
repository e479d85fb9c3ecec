//! Scripted in-memory backend used by the unit tests.
//!
//! Codecs model a libavcodec style queue: `delay` frames are held back until
//! end of input, sends are refused once `capacity` units are queued, and a
//! script can inject extra would-block answers. A codec panics when a refused
//! unit is not resubmitted next, which is how the tests catch dropped or
//! reordered units.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::MediaBackend;
use crate::codec::{FrameEncoder, PacketDecoder};
use crate::config::{EncoderConfig, Options};
use crate::container::{Demuxer, Muxer};
use crate::error::{CodecError, EINVAL, OpenFailure};
use crate::frame::{MediaFrame, PictureType};
use crate::packet::Packet;
use crate::stream::{AvStream, ElectedStream, MediaKind, OutputStream};
use crate::timestamp::Rational;

pub const INPUT_TIME_BASE: Rational = Rational::new(1, 90_000);
/// Ticks per frame at 25 fps in [`INPUT_TIME_BASE`].
pub const FRAME_TICKS: i64 = 3_600;

/// Everything the fakes observed, shared between the backend and its handles.
#[derive(Debug, Default)]
pub struct Recorder {
    pub packets_read: usize,
    /// Packets accepted by the decoder, `None` for the end-of-input signal.
    pub decoder_accepted: Vec<Option<i64>>,
    pub decoder_options: Option<Options>,
    /// Ids of the frames the decoder produced, in order.
    pub frames_decoded: Vec<u64>,
    pub encoder_config: Option<EncoderConfig>,
    /// Frames accepted by the encoder as they were submitted.
    pub encoder_accepted: Vec<FakeFrame>,
    pub encoder_eof_signals: usize,
    pub output_opened: bool,
    pub header: Option<Options>,
    pub written: Vec<Packet>,
    pub trailer_written: bool,
}

pub type Shared = Rc<RefCell<Recorder>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeFrame {
    pub id: u64,
    pub pts: Option<i64>,
    pub duration: i64,
    pub key: bool,
    pub picture_type: PictureType,
}

impl MediaFrame for FakeFrame {
    fn pts(&self) -> Option<i64> {
        self.pts
    }

    fn set_pts(&mut self, pts: Option<i64>) {
        self.pts = pts;
    }

    fn clear_timing(&mut self) {
        self.pts = None;
        self.duration = 0;
    }

    fn set_picture_type(&mut self, kind: PictureType) {
        self.picture_type = kind;
    }

    fn set_key(&mut self, key: bool) {
        self.key = key;
    }
}

/// Injected codec behaviour.
#[derive(Debug, Clone, Default)]
pub struct CodecScript {
    /// Frames held back until end of input.
    pub delay: usize,
    /// Queued units at which sends start being refused.
    pub capacity: usize,
    /// Per send call: `true` refuses the call with would-block.
    pub refuse_send: VecDeque<bool>,
    /// Per receive call: `true` answers would-block even if output is ready.
    pub refuse_receive: VecDeque<bool>,
    /// Id of the unit whose extraction fails fatally.
    pub fail_at: Option<u64>,
}

impl CodecScript {
    pub fn new(delay: usize, capacity: usize) -> Self {
        Self {
            delay,
            capacity,
            ..Default::default()
        }
    }

    fn next_send_refused(&mut self) -> bool {
        self.refuse_send.pop_front().unwrap_or(false)
    }

    fn next_receive_refused(&mut self) -> bool {
        self.refuse_receive.pop_front().unwrap_or(false)
    }
}

/// Unit tracked by a fake codec: the frame id plus its timing.
#[derive(Debug, Clone)]
struct Queued {
    id: u64,
    pts: Option<i64>,
    duration: i64,
}

/// The queue both fake codecs are built on.
#[derive(Debug)]
struct FakeCodec {
    script: CodecScript,
    queue: VecDeque<Queued>,
    next_id: u64,
    flushing: bool,
    /// Key of the last refused submission, `Some(None)` for end of input.
    refused: Option<Option<u64>>,
}

impl FakeCodec {
    fn new(script: CodecScript) -> Self {
        Self {
            script,
            queue: VecDeque::new(),
            next_id: 1,
            flushing: false,
            refused: None,
        }
    }

    /// Checks a submission against the queue and the script.
    fn send(&mut self, key: Option<u64>) -> Result<(), CodecError> {
        if self.flushing {
            return Err(CodecError::Eof);
        }
        if let Some(refused) = self.refused.take() {
            assert_eq!(refused, key, "refused unit was not resubmitted first");
        }
        let full = key.is_some() && self.queue.len() >= self.script.capacity;
        if full || self.script.next_send_refused() {
            self.refused = Some(key);
            return Err(CodecError::Again);
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Queued, CodecError> {
        if self.script.next_receive_refused() {
            return Err(CodecError::Again);
        }
        let ready = self.queue.len() > self.script.delay || (self.flushing && !self.queue.is_empty());
        if ready {
            if let Some(front) = self.queue.front() {
                if self.script.fail_at == Some(front.id) {
                    return Err(CodecError::other(EINVAL, "Invalid data found when processing input"));
                }
            }
            return self.queue.pop_front().ok_or(CodecError::Again);
        }
        if self.flushing {
            Err(CodecError::Eof)
        } else {
            Err(CodecError::Again)
        }
    }
}

pub struct FakeDecoder {
    codec: FakeCodec,
    recorder: Shared,
}

impl PacketDecoder for FakeDecoder {
    type Frame = FakeFrame;

    fn send_packet(&mut self, packet: Option<&Packet>) -> Result<(), CodecError> {
        // Packets are keyed by their position in the input.
        let key = packet.map(|p| p.position().unwrap_or_default() as u64);
        self.codec.send(key)?;
        match packet {
            Some(packet) => {
                let id = self.codec.next_id;
                self.codec.next_id += 1;
                self.codec.queue.push_back(Queued {
                    id,
                    pts: packet.pts(),
                    duration: packet.duration(),
                });
            }
            None => self.codec.flushing = true,
        }
        self.recorder
            .borrow_mut()
            .decoder_accepted
            .push(packet.and_then(|p| p.pts()));
        Ok(())
    }

    fn receive_frame(&mut self) -> Result<FakeFrame, CodecError> {
        let queued = self.codec.receive()?;
        self.recorder.borrow_mut().frames_decoded.push(queued.id);
        Ok(FakeFrame {
            id: queued.id,
            pts: queued.pts,
            duration: queued.duration,
            key: true,
            picture_type: PictureType::I,
        })
    }
}

pub struct FakeEncoder {
    codec: FakeCodec,
    time_base: Rational,
    recorder: Shared,
}

impl FrameEncoder for FakeEncoder {
    type Frame = FakeFrame;

    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn send_frame(&mut self, frame: Option<&FakeFrame>) -> Result<(), CodecError> {
        self.codec.send(frame.map(|f| f.id))?;
        let mut recorder = self.recorder.borrow_mut();
        match frame {
            Some(frame) => {
                self.codec.queue.push_back(Queued {
                    id: frame.id,
                    pts: frame.pts,
                    duration: 1,
                });
                recorder.encoder_accepted.push(frame.clone());
            }
            None => {
                self.codec.flushing = true;
                recorder.encoder_eof_signals += 1;
            }
        }
        Ok(())
    }

    fn receive_packet(&mut self) -> Result<Packet, CodecError> {
        let queued = self.codec.receive()?;
        let mut packet = Packet::new(0, queued.id.to_le_bytes().to_vec())
            .with_pts(queued.pts)
            .with_dts(queued.pts);
        packet.set_duration(queued.duration);
        Ok(packet)
    }
}

/// Decodes the frame id a [`FakeEncoder`] stored in a packet payload.
pub fn packet_frame_id(packet: &Packet) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&packet.data()[..8]);
    u64::from_le_bytes(bytes)
}

pub struct FakeInput {
    streams: Vec<AvStream>,
    packets: VecDeque<Packet>,
    read_error_at: Option<usize>,
    recorder: Shared,
}

impl Demuxer for FakeInput {
    fn streams(&self) -> &[AvStream] {
        &self.streams
    }

    fn read_packet(&mut self) -> Result<Option<Packet>, CodecError> {
        let mut recorder = self.recorder.borrow_mut();
        if self.read_error_at == Some(recorder.packets_read) {
            return Err(CodecError::other(-5, "Input/output error"));
        }
        let packet = self.packets.pop_front();
        if packet.is_some() {
            recorder.packets_read += 1;
        }
        Ok(packet)
    }
}

pub struct FakeOutput {
    path: PathBuf,
    streams: Vec<OutputStream>,
    setup: OutputSetup,
    recorder: Shared,
}

impl FakeOutput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Muxer for FakeOutput {
    fn add_stream(&mut self) -> Result<OutputStream, CodecError> {
        let stream = OutputStream::new(self.streams.len());
        self.streams.push(stream.clone());
        Ok(stream)
    }

    fn wants_global_header(&self) -> bool {
        self.setup.global_header
    }

    fn write_header(&mut self, options: &Options) -> Result<(), CodecError> {
        if let Some(err) = self.setup.header_error.clone() {
            return Err(err);
        }
        self.recorder.borrow_mut().header = Some(options.clone());
        Ok(())
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.setup
            .time_base
            .or_else(|| self.streams.get(index).and_then(|s| s.time_base()))
    }

    fn write_interleaved(&mut self, packet: Packet) -> Result<(), CodecError> {
        let mut recorder = self.recorder.borrow_mut();
        if self.setup.write_error_at == Some(recorder.written.len()) {
            return Err(CodecError::other(-28, "No space left on device"));
        }
        recorder.written.push(packet);
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<(), CodecError> {
        self.recorder.borrow_mut().trailer_written = true;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputSetup {
    pub global_header: bool,
    /// Time base the muxer forces on its stream, like MPEG-TS does with 1/90000.
    pub time_base: Option<Rational>,
    pub header_error: Option<CodecError>,
    pub write_error_at: Option<usize>,
}

/// Builds the content of a fake input file.
#[derive(Debug, Clone, Default)]
pub struct FakeMedia {
    pub streams: Vec<AvStream>,
    pub packets: Vec<Packet>,
}

impl FakeMedia {
    /// `frames` packets of a 25 fps 320x240 video stream at index 0.
    pub fn video(frames: usize) -> Self {
        let stream = AvStream::new(0, MediaKind::Video, "h264", INPUT_TIME_BASE)
            .with_rate(Rational::new(25, 1))
            .with_size(320, 240);
        let mut media = Self {
            streams: vec![stream],
            packets: Vec::new(),
        };
        media.push_packets(0, frames);
        media
    }

    /// Adds an audio stream and interleaves one of its packets after every video packet.
    pub fn with_audio(mut self) -> Self {
        let index = self.streams.len();
        self.streams.push(AvStream::new(
            index,
            MediaKind::Audio,
            "aac",
            Rational::new(1, 48_000),
        ));
        let video = std::mem::take(&mut self.packets);
        for packet in video {
            let pts = packet.pts();
            self.packets.push(packet);
            self.packets.push(Packet::new(index, vec![0u8; 4]).with_pts(pts));
        }
        self.renumber();
        self
    }

    fn push_packets(&mut self, index: usize, count: usize) {
        for i in 0..count as i64 {
            // Source timing deliberately starts late and jitters.
            let pts = 180_000 + i * FRAME_TICKS + (i % 3) * 10;
            let mut packet = Packet::new(index, vec![1u8; 16]).with_pts(Some(pts)).with_dts(Some(pts));
            packet.set_duration(FRAME_TICKS);
            self.packets.push(packet);
        }
        self.renumber();
    }

    fn renumber(&mut self) {
        for (position, packet) in self.packets.iter_mut().enumerate() {
            packet.set_position(Some(position as i64));
        }
    }
}

pub struct FakeBackend {
    pub recorder: Shared,
    pub media: FakeMedia,
    pub read_error_at: Option<usize>,
    pub undecodable: Vec<String>,
    pub encoders: Vec<String>,
    pub decoder: CodecScript,
    pub encoder: CodecScript,
    pub encoder_open_error: Option<CodecError>,
    pub output: OutputSetup,
}

impl FakeBackend {
    pub fn new(media: FakeMedia) -> Self {
        Self {
            recorder: Shared::default(),
            media,
            read_error_at: None,
            undecodable: Vec::new(),
            encoders: vec!["libx264".to_string(), "mpeg4".to_string()],
            decoder: CodecScript::new(2, 4),
            encoder: CodecScript::new(3, 4),
            encoder_open_error: None,
            output: OutputSetup::default(),
        }
    }

    pub fn recorder(&self) -> std::cell::Ref<'_, Recorder> {
        self.recorder.borrow()
    }
}

impl MediaBackend for FakeBackend {
    type Frame = FakeFrame;
    type Input = FakeInput;
    type Output = FakeOutput;
    type Decoder = FakeDecoder;
    type Encoder = FakeEncoder;

    fn open_input(&self, path: &Path) -> Result<FakeInput, CodecError> {
        if path.as_os_str().is_empty() {
            return Err(CodecError::other(-2, "No such file or directory"));
        }
        Ok(FakeInput {
            streams: self.media.streams.clone(),
            packets: self.media.packets.iter().cloned().collect(),
            read_error_at: self.read_error_at,
            recorder: self.recorder.clone(),
        })
    }

    fn open_output(&self, path: &Path) -> Result<FakeOutput, CodecError> {
        File::create(path).map_err(|e| CodecError::other(-2, e.to_string()))?;
        self.recorder.borrow_mut().output_opened = true;
        Ok(FakeOutput {
            path: path.to_path_buf(),
            streams: Vec::new(),
            setup: self.output.clone(),
            recorder: self.recorder.clone(),
        })
    }

    fn has_decoder(&self, stream: &AvStream) -> bool {
        !self.undecodable.iter().any(|c| c == stream.codec())
    }

    fn has_encoder(&self, name: &str) -> bool {
        self.encoders.iter().any(|e| e == name)
    }

    fn open_decoder(
        &self,
        _input: &FakeInput,
        _stream: &ElectedStream,
        options: &Options,
    ) -> Result<FakeDecoder, OpenFailure> {
        self.recorder.borrow_mut().decoder_options = Some(options.clone());
        Ok(FakeDecoder {
            codec: FakeCodec::new(self.decoder.clone()),
            recorder: self.recorder.clone(),
        })
    }

    fn open_encoder(
        &self,
        output: &mut FakeOutput,
        stream: &OutputStream,
        config: &EncoderConfig,
    ) -> Result<FakeEncoder, OpenFailure> {
        if let Some(err) = self.encoder_open_error.clone() {
            return Err(OpenFailure::Open(err));
        }
        self.recorder.borrow_mut().encoder_config = Some(config.clone());
        if let Some(slot) = output.streams.get_mut(stream.index()) {
            slot.set_time_base(stream.time_base().unwrap_or(config.time_base));
        }
        Ok(FakeEncoder {
            codec: FakeCodec::new(self.encoder.clone()),
            time_base: config.time_base,
            recorder: self.recorder.clone(),
        })
    }
}
