//! Rendering configuration
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

/// Configuration for frame rendering and encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Frames per second of the produced video
    pub fps: u32,

    /// Draw the running frame number in the info panel
    pub show_frame_count: bool,

    /// GIF quantisation speed, 1 (best) to 30 (fastest)
    pub gif_speed: i32,

    /// Multiplier of the base font size, derived from the height when unset
    pub text_scale: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fps: 3,
            show_frame_count: true,
            gif_speed: 10,
            text_scale: None,
        }
    }
}

impl RenderConfig {
    pub fn text_scale(&self) -> u32 {
        self.text_scale.unwrap_or((self.height / 300).max(1)).max(1)
    }

    /// Canvas size rounded down to even dimensions, as video encoders expect
    pub fn canvas_size(&self) -> (u32, u32) {
        ((self.width.max(2)) & !1, (self.height.max(2)) & !1)
    }
}
