//! [`MediaBackend`] on top of `ffmpeg-next`.

mod convert;
mod decoder;
mod encoder;
mod frame;
mod input;
mod output;
mod scaler;

use std::path::Path;

pub use decoder::AvDecoder;
pub use encoder::AvEncoder;
pub use frame::RawFrame;
pub use input::AvInput;
pub use output::AvOutput;

use crate::backend::MediaBackend;
use crate::config::{EncoderConfig, Options};
use crate::error::{CodecError, OpenFailure};
use crate::stream::{AvStream, ElectedStream, OutputStream};

/// Opens files through libavformat and codecs through libavcodec.
///
/// Call [`crate::init`] once before using it.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    input_format: Option<String>,
    input_options: Options,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the input format instead of probing, e.g. `lavfi` or `v4l2`.
    pub fn with_input_format(mut self, format: &str) -> Self {
        self.input_format = Some(format.to_string());
        self
    }

    /// Demuxer (or device) options used when opening inputs.
    pub fn with_input_options(mut self, options: Options) -> Self {
        self.input_options = options;
        self
    }
}

impl MediaBackend for FfmpegBackend {
    type Frame = RawFrame;
    type Input = AvInput;
    type Output = AvOutput;
    type Decoder = AvDecoder;
    type Encoder = AvEncoder;

    fn open_input(&self, path: &Path) -> Result<AvInput, CodecError> {
        AvInput::open(
            path,
            self.input_format.as_deref(),
            convert::dictionary(&self.input_options),
        )
    }

    fn open_output(&self, path: &Path) -> Result<AvOutput, CodecError> {
        AvOutput::open(path)
    }

    fn has_decoder(&self, stream: &AvStream) -> bool {
        ffmpeg_next::decoder::find(convert::codec_id(stream.codec())).is_some()
    }

    fn has_encoder(&self, name: &str) -> bool {
        ffmpeg_next::encoder::find_by_name(name).is_some()
    }

    fn open_decoder(
        &self,
        input: &AvInput,
        stream: &ElectedStream,
        options: &Options,
    ) -> Result<AvDecoder, OpenFailure> {
        AvDecoder::open(input, stream, options)
    }

    fn open_encoder(
        &self,
        output: &mut AvOutput,
        stream: &OutputStream,
        config: &EncoderConfig,
    ) -> Result<AvEncoder, OpenFailure> {
        AvEncoder::open(output, stream, config)
    }
}
