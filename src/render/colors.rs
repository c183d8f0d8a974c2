//! Color definitions for arena contents

use serde::Serialize;

use crate::core::types::Rgb;

/// RGBA color (0.0 to 1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::new(
            rgb.r as f32 / 255.0,
            rgb.g as f32 / 255.0,
            rgb.b as f32 / 255.0,
            1.0,
        )
    }
}

pub const BACKGROUND: Color = Color::new(0.0, 0.0, 0.0, 1.0);
pub const FOOD_CAP: Color = Color::new(1.0, 0.0, 0.0, 1.0);
pub const FOOD_STEM: Color = Color::new(1.0, 1.0, 1.0, 1.0);
pub const OBSTACLE: Color = Color::new(50.0 / 255.0, 50.0 / 255.0, 50.0 / 255.0, 1.0);
