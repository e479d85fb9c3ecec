use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::timestamp::Rational;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Subtitle => "subtitle",
            MediaKind::Data => "data",
            MediaKind::Attachment => "attachment",
            MediaKind::Unknown => "unknown",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "subtitle" => Ok(MediaKind::Subtitle),
            "data" => Ok(MediaKind::Data),
            "attachment" => Ok(MediaKind::Attachment),
            other => Err(anyhow::anyhow!("unknown media kind: {}", other)),
        }
    }
}

/// Descriptor of one stream found in the input container.
#[derive(Debug, Clone, PartialEq)]
pub struct AvStream {
    index: usize,
    kind: MediaKind,
    codec: String,
    time_base: Rational,
    rate: Rational,
    width: u32,
    height: u32,
    bit_rate: i64,
    is_default: bool,
    is_attached_picture: bool,
}

impl AvStream {
    pub fn new(index: usize, kind: MediaKind, codec: &str, time_base: Rational) -> Self {
        Self {
            index,
            kind,
            codec: codec.to_string(),
            time_base,
            rate: Rational::new(0, 1),
            width: 0,
            height: 0,
            bit_rate: 0,
            is_default: false,
            is_attached_picture: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Short codec name, e.g. "h264".
    pub fn codec(&self) -> &str {
        &self.codec
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Average frame rate; 0/1 when the container does not know it.
    pub fn rate(&self) -> Rational {
        self.rate
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_rate(&self) -> i64 {
        self.bit_rate
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Cover art and similar single-picture "video" streams.
    pub fn is_attached_picture(&self) -> bool {
        self.is_attached_picture
    }

    pub fn with_rate(mut self, rate: Rational) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_bit_rate(mut self, bit_rate: i64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn with_attached_picture(mut self, is_attached_picture: bool) -> Self {
        self.is_attached_picture = is_attached_picture;
        self
    }
}

/// The input stream chosen for transcoding. Read-only once elected.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectedStream {
    stream: AvStream,
}

impl ElectedStream {
    pub(crate) fn new(stream: AvStream) -> Self {
        Self { stream }
    }

    pub fn index(&self) -> usize {
        self.stream.index()
    }

    pub fn kind(&self) -> MediaKind {
        self.stream.kind()
    }

    pub fn codec(&self) -> &str {
        self.stream.codec()
    }

    pub fn time_base(&self) -> Rational {
        self.stream.time_base()
    }

    pub fn stream(&self) -> &AvStream {
        &self.stream
    }
}

/// Output stream descriptor allocated in the muxer for the encoder's packets.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStream {
    index: usize,
    time_base: Option<Rational>,
}

impl OutputStream {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            time_base: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Time base requested from the muxer. The muxer may still pick another one
    /// when the header is written.
    pub fn time_base(&self) -> Option<Rational> {
        self.time_base
    }

    pub fn set_time_base(&mut self, time_base: Rational) {
        self.time_base = Some(time_base);
    }
}
