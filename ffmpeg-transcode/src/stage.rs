//! State shared by the decode and encode stages.
//!
//! A stage wraps one send/receive codec. Its state tracks what the last
//! submission left behind so that a refused unit is offered again before
//! anything new is pulled from upstream.

use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageState<U> {
    /// Nothing pending; the next call pulls fresh input.
    #[default]
    Idle,
    /// The codec refused this unit; it must be resubmitted before anything else.
    HaveUnit(U),
    /// End of input was signalled; only extraction remains.
    Draining,
    /// The codec is fully flushed.
    Eof,
}

impl<U> StageState<U> {
    pub fn is_draining(&self) -> bool {
        matches!(self, StageState::Draining)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, StageState::Eof)
    }

    /// End of input was already signalled to the codec.
    pub fn is_finishing(&self) -> bool {
        matches!(self, StageState::Draining | StageState::Eof)
    }

    pub fn pending(&self) -> Option<&U> {
        match self {
            StageState::HaveUnit(unit) => Some(unit),
            _ => None,
        }
    }
}

/// Result of one pump of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pump<T> {
    Ready(T),
    /// Nothing available right now; call again.
    WouldBlock,
    /// The stage is exhausted and will never produce again.
    EndOfStream,
}

impl<T> Pump<T> {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Pump::EndOfStream)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Pump::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// What was offered to the codec's send half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<U> {
    Unit(U),
    EndOfInput,
}

/// Next state after a send attempt.
///
/// A refused unit is kept for resubmission. A refused end-of-input signal
/// leaves the stage idle so the signal is sent again on the next pump.
pub fn after_send<U>(
    submission: Submission<U>,
    result: Result<(), CodecError>,
) -> Result<StageState<U>, CodecError> {
    match (submission, result) {
        (Submission::Unit(_), Ok(())) => Ok(StageState::Idle),
        (Submission::Unit(unit), Err(CodecError::Again)) => Ok(StageState::HaveUnit(unit)),
        (Submission::EndOfInput, Ok(())) | (Submission::EndOfInput, Err(CodecError::Eof)) => {
            Ok(StageState::Draining)
        }
        (Submission::EndOfInput, Err(CodecError::Again)) => Ok(StageState::Idle),
        (_, Err(e)) => Err(e),
    }
}

/// Translates a receive result into a pump outcome, moving the state to
/// [`StageState::Eof`] once the codec reports it is flushed.
pub fn after_receive<U, T>(
    state: &mut StageState<U>,
    result: Result<T, CodecError>,
) -> Result<Pump<T>, CodecError> {
    match result {
        Ok(value) => Ok(Pump::Ready(value)),
        Err(CodecError::Again) => Ok(Pump::WouldBlock),
        Err(CodecError::Eof) => {
            *state = StageState::Eof;
            Ok(Pump::EndOfStream)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "stage_test.rs"]
mod stage_test;
