//! Send/receive codec primitives wrapped by the decode and encode stages.
//!
//! Both traits follow the libavcodec contract: a submission may be refused with
//! [`CodecError::Again`] until output has been drained, an extraction returns
//! [`CodecError::Again`] until more input arrives and [`CodecError::Eof`] once
//! the codec is fully flushed after end of input.

use crate::error::CodecError;
use crate::frame::MediaFrame;
use crate::packet::Packet;
use crate::timestamp::Rational;

pub trait PacketDecoder {
    type Frame: MediaFrame;

    /// Submits one packet, or `None` to signal end of input.
    fn send_packet(&mut self, packet: Option<&Packet>) -> Result<(), CodecError>;

    fn receive_frame(&mut self) -> Result<Self::Frame, CodecError>;
}

pub trait FrameEncoder {
    type Frame: MediaFrame;

    /// Time base of the timestamps on submitted frames and produced packets.
    fn time_base(&self) -> Rational;

    /// Submits one frame, or `None` to signal end of input. The frame is only
    /// borrowed; ownership stays with the caller until it has been accepted.
    fn send_frame(&mut self, frame: Option<&Self::Frame>) -> Result<(), CodecError>;

    fn receive_packet(&mut self) -> Result<Packet, CodecError>;
}
