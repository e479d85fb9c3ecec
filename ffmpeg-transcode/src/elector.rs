//! Picks the input stream to transcode.

use crate::backend::MediaBackend;
use crate::container::Demuxer;
use crate::error::ElectError;
use crate::stream::{AvStream, ElectedStream, MediaKind};

/// Chooses the best stream of `kind` in `input`.
///
/// A `preferred` index of `-1` (or anything below it) lets the elector decide;
/// any other value restricts the candidates to that single stream. Candidates
/// are ranked by the default disposition, then picture size (video), then
/// bitrate; ties go to the lowest index. Attached pictures (cover art) are
/// never elected, and neither is a stream without an available decoder.
pub fn elect<B>(
    backend: &B,
    input: &B::Input,
    kind: MediaKind,
    preferred: i32,
) -> Result<ElectedStream, ElectError>
where
    B: MediaBackend + ?Sized,
{
    let preferred = usize::try_from(preferred.max(-1)).ok();

    let candidates: Vec<&AvStream> = input
        .streams()
        .iter()
        .filter(|s| s.kind() == kind)
        .filter(|s| preferred.is_none_or(|index| s.index() == index))
        .filter(|s| !s.is_attached_picture())
        .collect();

    let mut best: Option<&AvStream> = None;
    let mut undecodable: Option<&AvStream> = None;
    for stream in candidates {
        if !backend.has_decoder(stream) {
            log::debug!(
                "skipping stream {}: no decoder for codec {}",
                stream.index(),
                stream.codec()
            );
            undecodable.get_or_insert(stream);
            continue;
        }
        // Strictly greater keeps the lowest index on ties.
        if best.is_none_or(|current| rank(stream) > rank(current)) {
            best = Some(stream);
        }
    }

    match (best, undecodable) {
        (Some(stream), _) => {
            log::info!(
                "elected {} stream {} ({})",
                kind,
                stream.index(),
                stream.codec()
            );
            Ok(ElectedStream::new(stream.clone()))
        }
        (None, Some(stream)) => Err(ElectError::DecoderNotFound {
            kind,
            codec: stream.codec().to_string(),
        }),
        (None, None) => Err(ElectError::StreamNotFound { kind }),
    }
}

fn rank(stream: &AvStream) -> (bool, u64, i64) {
    let pixels = stream.width() as u64 * stream.height() as u64;
    (stream.is_default(), pixels, stream.bit_rate())
}

#[cfg(test)]
#[path = "elector_test.rs"]
mod elector_test;
