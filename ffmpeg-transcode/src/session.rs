//! Opens everything one transcode needs and runs it.

use std::path::{Path, PathBuf};

use crate::backend::MediaBackend;
use crate::config::{DecoderConfig, EncoderConfigurator, Options};
use crate::container::{Demuxer, Muxer};
use crate::decoder::Decoder;
use crate::elector::elect;
use crate::encoder::Encoder;
use crate::error::{Result, TranscodeError};
use crate::pipeline::{Pipeline, TranscodeStats};
use crate::stream::{ElectedStream, MediaKind};

/// One input file, one elected stream, one output file.
#[derive(Debug, Clone)]
pub struct TranscodeJob<C> {
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: MediaKind,
    /// Stream index to use, or `-1` to let the elector choose.
    pub preferred_stream: i32,
    pub decoder: DecoderConfig,
    pub codec: String,
    pub configurator: C,
    /// Options for the output header, e.g. `muxrate`.
    pub mux_options: Options,
}

impl<C> TranscodeJob<C> {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, codec: &str, configurator: C) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            kind: MediaKind::Video,
            preferred_stream: -1,
            decoder: DecoderConfig::default(),
            codec: codec.to_string(),
            configurator,
            mux_options: Options::new(),
        }
    }
}

/// Transcodes `job.input` into `job.output`.
///
/// The output file is only created once the input was opened and a decodable
/// stream was found. If setting up the encoder or writing the header fails,
/// the output is closed and a file this call created is removed again.
pub fn transcode<B, C>(backend: &B, job: &TranscodeJob<C>) -> Result<TranscodeStats>
where
    B: MediaBackend + ?Sized,
    C: EncoderConfigurator,
{
    let input = backend
        .open_input(&job.input)
        .map_err(|source| TranscodeError::OpenInput {
            path: job.input.clone(),
            source,
        })?;
    log::info!(
        "opened input {} with {} streams",
        job.input.display(),
        input.streams().len()
    );

    let elected = elect(backend, &input, job.kind, job.preferred_stream)?;
    let decoder = Decoder::open(backend, &input, &elected, Some(&job.decoder))?;

    let existed = job.output.exists();
    let mut output = backend
        .open_output(&job.output)
        .map_err(|source| TranscodeError::OpenOutput {
            path: job.output.clone(),
            source,
        })?;

    let encoder = match prepare_output(backend, job, &elected, &mut output) {
        Ok(encoder) => encoder,
        Err(e) => {
            drop(output);
            if !existed {
                discard_output(&job.output);
            }
            return Err(e);
        }
    };

    Pipeline::new(input, output, decoder, encoder).run()
}

fn prepare_output<B, C>(
    backend: &B,
    job: &TranscodeJob<C>,
    elected: &ElectedStream,
    output: &mut B::Output,
) -> Result<Encoder<B::Encoder>>
where
    B: MediaBackend + ?Sized,
    C: EncoderConfigurator,
{
    let encoder = Encoder::open(backend, output, &job.codec, elected, &job.configurator)?;
    output
        .write_header(&job.mux_options)
        .map_err(TranscodeError::Header)?;
    log::info!("wrote header of {}", job.output.display());
    Ok(encoder)
}

fn discard_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("removed incomplete output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
