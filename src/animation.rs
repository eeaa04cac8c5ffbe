//! Bounding-box growth animation.
//!
//! The box grows from zero to its target size in a fixed number of equal
//! steps; the app pulls one frame per repaint. Once the target is reached the
//! sequence is exhausted and stays exhausted.

/// Box size at one animation frame, in display pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFrame {
    pub width: f32,
    pub height: f32,
    /// True for the last frame, drawn solid with the label plate
    pub is_final: bool,
}

#[derive(Debug, Clone)]
pub struct BoxGrowth {
    target_w: f32,
    target_h: f32,
    step_w: f32,
    step_h: f32,
    current_w: f32,
    current_h: f32,
    done: bool,
}

impl BoxGrowth {
    pub fn new(target_w: f32, target_h: f32, frames: u32) -> Self {
        let frames = frames.max(1) as f32;
        let target_w = target_w.max(0.0);
        let target_h = target_h.max(0.0);
        Self {
            target_w,
            target_h,
            step_w: target_w / frames,
            step_h: target_h / frames,
            current_w: 0.0,
            current_h: 0.0,
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The fully grown box, regardless of progress
    pub fn target(&self) -> BoxFrame {
        BoxFrame { width: self.target_w, height: self.target_h, is_final: true }
    }
}

impl Iterator for BoxGrowth {
    type Item = BoxFrame;

    fn next(&mut self) -> Option<BoxFrame> {
        if self.done {
            return None;
        }
        if self.current_w < self.target_w || self.current_h < self.target_h {
            let frame = BoxFrame { width: self.current_w, height: self.current_h, is_final: false };
            self.current_w = (self.current_w + self.step_w).min(self.target_w);
            self.current_h = (self.current_h + self.step_h).min(self.target_h);
            return Some(frame);
        }
        self.done = true;
        Some(self.target())
    }
}

impl std::iter::FusedIterator for BoxGrowth {}
