use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

use crate::stream::MediaKind;

/// `AVERROR(EAGAIN)` on Linux.
pub const EAGAIN: i32 = -11;
/// `AVERROR(EINVAL)` on Linux.
pub const EINVAL: i32 = -22;
/// `AVERROR_EOF`
pub const AVERROR_EOF: i32 = -541_478_725;
/// `AVERROR_STREAM_NOT_FOUND`
pub const AVERROR_STREAM_NOT_FOUND: i32 = -1_381_258_232;
/// `AVERROR_DECODER_NOT_FOUND`
pub const AVERROR_DECODER_NOT_FOUND: i32 = -1_128_613_112;
/// `AVERROR_ENCODER_NOT_FOUND`
pub const AVERROR_ENCODER_NOT_FOUND: i32 = -1_129_203_192;

/// Outcome of a single codec or container primitive that did not succeed.
///
/// `Again` and `Eof` are flow control rather than failures; the stages translate them
/// into `WouldBlock` / `EndOfStream`. Only `Other` ever aborts a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Resource temporarily unavailable")]
    Again,
    #[error("End of file")]
    Eof,
    #[error("{message}")]
    Other { code: i32, message: String },
}

impl CodecError {
    pub fn other(code: i32, message: impl Into<String>) -> Self {
        CodecError::Other {
            code,
            message: message.into(),
        }
    }

    /// Native (negative) error code of the underlying library.
    pub fn code(&self) -> i32 {
        match self {
            CodecError::Again => EAGAIN,
            CodecError::Eof => AVERROR_EOF,
            CodecError::Other { code, .. } => *code,
        }
    }
}

/// The part of the pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Demux,
    Decode,
    Encode,
    Mux,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Demux => "demuxer",
            Stage::Decode => "decoder",
            Stage::Encode => "encoder",
            Stage::Mux => "muxer",
        };
        f.write_str(name)
    }
}

/// Why a decoder or encoder could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenFailure {
    #[error("codec '{0}' not found")]
    CodecNotFound(String),
    #[error("could not allocate output stream: {0}")]
    StreamAllocation(CodecError),
    #[error("failed to copy codec parameters: {0}")]
    Parameters(CodecError),
    #[error("failed to initialise codec context using custom initialisation: {0}")]
    Configure(String),
    #[error("{0} codecs are not supported")]
    UnsupportedMedia(MediaKind),
    #[error("{0}")]
    Open(CodecError),
}

impl OpenFailure {
    pub fn code(&self) -> Option<i32> {
        match self {
            OpenFailure::CodecNotFound(_) => None,
            OpenFailure::StreamAllocation(e) | OpenFailure::Parameters(e) | OpenFailure::Open(e) => {
                Some(e.code())
            }
            OpenFailure::Configure(_) | OpenFailure::UnsupportedMedia(_) => None,
        }
    }
}

/// Stream election failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectError {
    #[error("could not find '{kind}' stream in input file")]
    StreamNotFound { kind: MediaKind },
    #[error("failed to find '{kind}' decoder for codec '{codec}'")]
    DecoderNotFound { kind: MediaKind, codec: String },
}

impl ElectError {
    pub fn code(&self) -> i32 {
        match self {
            ElectError::StreamNotFound { .. } => AVERROR_STREAM_NOT_FOUND,
            ElectError::DecoderNotFound { .. } => AVERROR_DECODER_NOT_FOUND,
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("could not open media at path '{}': {source}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("could not create media context for '{}': {source}", path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error(transparent)]
    Elect(#[from] ElectError),
    #[error("failed to open '{kind}' decoder: {reason}")]
    OpenDecoder { kind: MediaKind, reason: OpenFailure },
    #[error("failed to open encoder '{name}': {reason}")]
    OpenEncoder { name: String, reason: OpenFailure },
    #[error("error occurred when writing output header: {0}")]
    Header(CodecError),
    #[error("unexpected error received from {stage}: {source}. Cannot continue.")]
    Fatal {
        stage: Stage,
        #[source]
        source: CodecError,
    },
    #[error("error occurred when writing output trailer: {0}")]
    Trailer(CodecError),
}

impl TranscodeError {
    pub fn fatal(stage: Stage, source: CodecError) -> Self {
        TranscodeError::Fatal { stage, source }
    }

    /// Native error code of the first failing operation, if there was one.
    pub fn code(&self) -> Option<i32> {
        match self {
            TranscodeError::OpenInput { source, .. }
            | TranscodeError::OpenOutput { source, .. }
            | TranscodeError::Fatal { source, .. } => Some(source.code()),
            TranscodeError::Header(e) | TranscodeError::Trailer(e) => Some(e.code()),
            TranscodeError::Elect(e) => Some(e.code()),
            TranscodeError::OpenDecoder { reason, .. } => match reason {
                OpenFailure::CodecNotFound(_) => Some(AVERROR_DECODER_NOT_FOUND),
                other => other.code(),
            },
            TranscodeError::OpenEncoder { reason, .. } => match reason {
                OpenFailure::CodecNotFound(_) => Some(AVERROR_ENCODER_NOT_FOUND),
                other => other.code(),
            },
        }
    }

    /// Errors raised while setting the pipeline up, before any media was written.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TranscodeError::OpenInput { .. }
                | TranscodeError::OpenOutput { .. }
                | TranscodeError::Elect(_)
                | TranscodeError::OpenDecoder { .. }
                | TranscodeError::OpenEncoder { .. }
                | TranscodeError::Header(_)
        )
    }

    /// Process exit status for this error: the native code truncated the way a
    /// C `main` returning it would be, never 0.
    pub fn exit_code(&self) -> i32 {
        match self.code() {
            Some(code) if code & 0xff != 0 => code & 0xff,
            _ => 1,
        }
    }
}

pub type Result<T, E = TranscodeError> = std::result::Result<T, E>;
