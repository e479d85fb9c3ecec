/// Picture type hint attached to a raw video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PictureType {
    /// Let the encoder decide.
    #[default]
    None,
    I,
    P,
    B,
}

/// A decoded sample or pixel buffer travelling from the decoder to the encoder.
///
/// The pipeline never looks at the payload; it only rewrites timing and the
/// hints that would otherwise steer the encoder's GOP decisions.
pub trait MediaFrame {
    fn pts(&self) -> Option<i64>;

    fn set_pts(&mut self, pts: Option<i64>);

    /// Forgets every timestamp inherited from the source packet
    /// (presentation time, packet decode time, duration, position).
    fn clear_timing(&mut self);

    fn set_picture_type(&mut self, kind: PictureType);

    fn set_key(&mut self, key: bool);
}
