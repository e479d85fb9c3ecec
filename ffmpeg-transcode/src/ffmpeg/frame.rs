use ffmpeg_next::picture;

use crate::frame::{MediaFrame, PictureType};

/// `AV_FRAME_FLAG_KEY`
const AV_FRAME_FLAG_KEY: i32 = 1 << 1;

/// A decoded FFmpeg frame.
#[derive(Clone)]
pub enum RawFrame {
    Video(ffmpeg_next::frame::Video),
    Audio(ffmpeg_next::frame::Audio),
}

impl RawFrame {
    fn as_mut_ptr(&mut self) -> *mut ffmpeg_next::ffi::AVFrame {
        unsafe {
            match self {
                RawFrame::Video(frame) => frame.as_mut_ptr(),
                RawFrame::Audio(frame) => frame.as_mut_ptr(),
            }
        }
    }

    pub fn as_video(&self) -> Option<&ffmpeg_next::frame::Video> {
        match self {
            RawFrame::Video(frame) => Some(frame),
            RawFrame::Audio(_) => None,
        }
    }
}

impl MediaFrame for RawFrame {
    fn pts(&self) -> Option<i64> {
        match self {
            RawFrame::Video(frame) => frame.pts(),
            RawFrame::Audio(frame) => frame.pts(),
        }
    }

    fn set_pts(&mut self, pts: Option<i64>) {
        match self {
            RawFrame::Video(frame) => frame.set_pts(pts),
            RawFrame::Audio(frame) => frame.set_pts(pts),
        }
    }

    fn clear_timing(&mut self) {
        let ptr = self.as_mut_ptr();
        unsafe {
            (*ptr).pts = ffmpeg_next::ffi::AV_NOPTS_VALUE;
            (*ptr).pkt_dts = ffmpeg_next::ffi::AV_NOPTS_VALUE;
            (*ptr).best_effort_timestamp = ffmpeg_next::ffi::AV_NOPTS_VALUE;
            (*ptr).duration = 0;
            (*ptr).pkt_pos = -1;
            (*ptr).pkt_size = -1;
        }
    }

    fn set_picture_type(&mut self, kind: PictureType) {
        if let RawFrame::Video(frame) = self {
            frame.set_kind(match kind {
                PictureType::None => picture::Type::None,
                PictureType::I => picture::Type::I,
                PictureType::P => picture::Type::P,
                PictureType::B => picture::Type::B,
            });
        }
    }

    fn set_key(&mut self, key: bool) {
        let ptr = self.as_mut_ptr();
        unsafe {
            if key {
                (*ptr).flags |= AV_FRAME_FLAG_KEY;
            } else {
                (*ptr).flags &= !AV_FRAME_FLAG_KEY;
            }
        }
    }
}
