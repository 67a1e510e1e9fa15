//! Named colours used by the grid renderer
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use image::Rgba;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 128, 0, 255]);
pub const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
pub const YELLOW: Rgba<u8> = Rgba([255, 255, 0, 255]);
pub const WHEAT: Rgba<u8> = Rgba([245, 222, 179, 255]);
pub const LAVENDER: Rgba<u8> = Rgba([230, 230, 250, 255]);
pub const SIENNA: Rgba<u8> = Rgba([160, 82, 45, 255]);
pub const SADDLE_BROWN: Rgba<u8> = Rgba([139, 69, 19, 255]);
pub const DARK_GREEN: Rgba<u8> = Rgba([0, 100, 0, 255]);
pub const DARK_RED: Rgba<u8> = Rgba([139, 0, 0, 255]);

// Occupancy cells
pub const CRIMSON: Rgba<u8> = Rgba([220, 20, 60, 255]);
pub const GOLD: Rgba<u8> = Rgba([255, 215, 0, 255]);
pub const VIOLET: Rgba<u8> = Rgba([238, 130, 238, 255]);
pub const LIGHT_SKY_BLUE: Rgba<u8> = Rgba([135, 206, 250, 255]);
pub const ORANGE: Rgba<u8> = Rgba([255, 165, 0, 255]);
pub const GREEN_YELLOW: Rgba<u8> = Rgba([173, 255, 47, 255]);

/// Same colour with its alpha channel scaled to `alpha` in `[0, 1]`
pub fn with_alpha(color: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = color;
    let scaled = (f32::from(a) * alpha.clamp(0.0, 1.0)).round() as u8;
    Rgba([r, g, b, scaled])
}
