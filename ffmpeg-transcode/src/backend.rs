use std::path::Path;

use crate::codec::{FrameEncoder, PacketDecoder};
use crate::config::{EncoderConfig, Options};
use crate::container::{Demuxer, Muxer};
use crate::error::{CodecError, OpenFailure};
use crate::frame::MediaFrame;
use crate::stream::{AvStream, ElectedStream, OutputStream};

/// The media library the pipeline runs on: containers plus codec lookup.
///
/// Every handle it hands out owns its native resources and releases them on drop.
pub trait MediaBackend {
    type Frame: MediaFrame;
    type Input: Demuxer;
    type Output: Muxer;
    type Decoder: PacketDecoder<Frame = Self::Frame>;
    type Encoder: FrameEncoder<Frame = Self::Frame>;

    fn open_input(&self, path: &Path) -> Result<Self::Input, CodecError>;

    /// Creates the output context; the container format is guessed from the path.
    fn open_output(&self, path: &Path) -> Result<Self::Output, CodecError>;

    fn has_decoder(&self, stream: &AvStream) -> bool;

    fn has_encoder(&self, name: &str) -> bool;

    /// Copies the stream's codec parameters into a new decoder and opens it with `options`.
    fn open_decoder(
        &self,
        input: &Self::Input,
        stream: &ElectedStream,
        options: &Options,
    ) -> Result<Self::Decoder, OpenFailure>;

    /// Opens the encoder with `config` and copies the negotiated parameters into
    /// the output stream `stream`.
    fn open_encoder(
        &self,
        output: &mut Self::Output,
        stream: &OutputStream,
        config: &EncoderConfig,
    ) -> Result<Self::Encoder, OpenFailure>;
}
