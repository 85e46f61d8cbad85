use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color {
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
    pub eff: u8,
}

impl From<(u8, u8, u8)> for Color {
    fn from((h, s, v): (u8, u8, u8)) -> Self {
        Color::new(h, s, v)
    }
}

impl Color {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Color {
            hue: h,
            sat: s,
            val: v,
            eff: 0,
        }
    }

    /// Eight hex digits, `hue sat val eff`. Used as the persisted bucket key.
    pub fn to_literal(&self) -> String {
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            self.hue, self.sat, self.val, self.eff
        )
    }

    pub fn from_literal(literal: &str) -> Option<Color> {
        if literal.len() != 8 || !literal.is_ascii() {
            return None;
        }

        let byte = |at: usize| u8::from_str_radix(&literal[at..at + 2], 16).ok();
        Some(Color {
            hue: byte(0)?,
            sat: byte(2)?,
            val: byte(4)?,
            eff: byte(6)?,
        })
    }

    pub const WHITE: Color = Color::new(0, 0, 255);
    pub const GRAY: Color = Color::new(0, 0, 128);
    pub const DARK_GRAY: Color = Color::new(0, 0, 64);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GREEN: Color = Color::new(64, 255, 255);
    pub const RED: Color = Color::new(0, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Color::GRAY
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_literal())
    }
}
