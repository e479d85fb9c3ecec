use bytes::Bytes;

/// One unit of compressed bitstream with its timing metadata.
///
/// Read from the input container on the way in, produced by the encoder on the way out.
/// Timestamps are expressed in whatever time base the owner of the packet is working in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    data: Bytes,
    index: usize,
    pts: Option<i64>,
    dts: Option<i64>,
    duration: i64,
    position: Option<i64>,
    is_key: bool,
}

impl Packet {
    pub fn new(index: usize, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            index,
            ..Default::default()
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn pts(&self) -> Option<i64> {
        self.pts
    }

    pub fn set_pts(&mut self, pts: Option<i64>) {
        self.pts = pts;
    }

    pub fn dts(&self) -> Option<i64> {
        self.dts
    }

    pub fn set_dts(&mut self, dts: Option<i64>) {
        self.dts = dts;
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: i64) {
        self.duration = duration;
    }

    /// Byte offset in the source container, if known.
    pub fn position(&self) -> Option<i64> {
        self.position
    }

    pub fn set_position(&mut self, position: Option<i64>) {
        self.position = position;
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn set_key(&mut self, is_key: bool) {
        self.is_key = is_key;
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn with_pts(mut self, pts: Option<i64>) -> Self {
        self.pts = pts;
        self
    }

    pub fn with_dts(mut self, dts: Option<i64>) -> Self {
        self.dts = dts;
        self
    }
}
