use crate::config::Options;
use crate::error::CodecError;
use crate::packet::Packet;
use crate::stream::{AvStream, OutputStream};
use crate::timestamp::Rational;

/// Input container.
pub trait Demuxer {
    fn streams(&self) -> &[AvStream];

    /// Reads the next packet of any stream. `Ok(None)` marks the end of the input
    /// and keeps being returned on every later call.
    fn read_packet(&mut self) -> Result<Option<Packet>, CodecError>;
}

/// Output container.
pub trait Muxer {
    /// Allocates a new, not yet configured, output stream.
    fn add_stream(&mut self) -> Result<OutputStream, CodecError>;

    /// Whether the format wants codec headers out of band (extradata).
    fn wants_global_header(&self) -> bool;

    fn write_header(&mut self, options: &Options) -> Result<(), CodecError>;

    /// Time base chosen by the muxer. Only final once the header has been written.
    fn stream_time_base(&self, index: usize) -> Option<Rational>;

    /// Writes one packet, interleaving it with the other streams by dts.
    fn write_interleaved(&mut self, packet: Packet) -> Result<(), CodecError>;

    fn write_trailer(&mut self) -> Result<(), CodecError>;
}
