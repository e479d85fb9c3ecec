use crate::stream::{ElectedStream, MediaKind, OutputStream};
use crate::timestamp::Rational;

/// Ordered string key/value options handed to a codec or muxer, like an `AVDictionary`.
/// Setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<(String, String)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, &value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every entry of `other` over this set.
    pub fn merge(&mut self, other: &Options) {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Options {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut options = Options::new();
        for (k, v) in iter {
            options.set(k.as_ref(), v.as_ref());
        }
        options
    }
}

/// Interlacing field order of the encoded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Unknown,
    Progressive,
    /// Top field coded and displayed first.
    TopFirst,
    /// Bottom field coded and displayed first.
    BottomFirst,
    /// Top coded first, bottom displayed first.
    TopBottom,
    /// Bottom coded first, top displayed first.
    BottomTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecFlags {
    pub interlaced_dct: bool,
    pub interlaced_me: bool,
    pub closed_gop: bool,
    /// Place stream headers in extradata instead of every keyframe.
    pub global_header: bool,
}

/// Overrides applied to the decoder after the stream parameters were copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    pub options: Options,
}

/// Everything the encoder is opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub codec: String,
    pub kind: MediaKind,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    pub bit_rate: i64,
    pub min_bit_rate: i64,
    pub max_bit_rate: i64,
    pub rc_buffer_size: i32,
    pub rc_initial_buffer_occupancy: i32,
    pub gop_size: u32,
    pub time_base: Rational,
    pub frame_rate: Rational,
    pub sample_aspect_ratio: Rational,
    pub field_order: FieldOrder,
    pub flags: CodecFlags,
    /// Codec-private options, e.g. `preset` or `x264-params`.
    pub options: Options,
}

impl EncoderConfig {
    pub fn new(codec: &str) -> Self {
        Self {
            codec: codec.to_string(),
            kind: MediaKind::Video,
            width: 0,
            height: 0,
            pixel_format: "yuv420p".to_string(),
            bit_rate: 0,
            min_bit_rate: 0,
            max_bit_rate: 0,
            rc_buffer_size: 0,
            rc_initial_buffer_occupancy: 0,
            gop_size: 12,
            time_base: Rational::new(1, 25),
            frame_rate: Rational::new(25, 1),
            sample_aspect_ratio: Rational::new(0, 1),
            field_order: FieldOrder::Unknown,
            flags: CodecFlags::default(),
            options: Options::new(),
        }
    }
}

/// Fills in the encoder configuration before the encoder is opened.
///
/// Called once by [`crate::encoder::Encoder::open`] with the elected source stream, the freshly
/// allocated output stream and a default configuration for the selected codec.
pub trait EncoderConfigurator {
    fn configure(
        &self,
        source: &ElectedStream,
        stream: &mut OutputStream,
        config: &mut EncoderConfig,
    ) -> anyhow::Result<()>;
}

impl<T: EncoderConfigurator + ?Sized> EncoderConfigurator for &T {
    fn configure(
        &self,
        source: &ElectedStream,
        stream: &mut OutputStream,
        config: &mut EncoderConfig,
    ) -> anyhow::Result<()> {
        (**self).configure(source, stream, config)
    }
}
