use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;

/// Converts decoded pictures to the encoder's pixel format and size.
pub struct Scaler {
    context: scaling::Context,
    source: (Pixel, u32, u32),
}

impl Scaler {
    pub fn new(
        source: (Pixel, u32, u32),
        destination: (Pixel, u32, u32),
    ) -> Result<Self, ffmpeg_next::Error> {
        let (format, width, height) = source;
        let (dst_format, dst_width, dst_height) = destination;
        let context = scaling::Context::get(
            format,
            width,
            height,
            dst_format,
            dst_width,
            dst_height,
            scaling::Flags::BILINEAR,
        )?;
        Ok(Self { context, source })
    }

    /// Whether this scaler was built for frames shaped like `frame`.
    pub fn accepts(&self, frame: &ffmpeg_next::frame::Video) -> bool {
        self.source == (frame.format(), frame.width(), frame.height())
    }

    pub fn run(
        &mut self,
        frame: &ffmpeg_next::frame::Video,
        dst: &mut ffmpeg_next::frame::Video,
    ) -> Result<(), ffmpeg_next::Error> {
        self.context.run(frame, dst)
    }
}
