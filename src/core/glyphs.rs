use crate::core::colors::Color;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Glyph {
    pub symbol: char,
    pub foreground: Color,
    pub background: Color,
}

impl Default for Glyph {
    fn default() -> Self {
        Glyph {
            symbol: ' ',
            foreground: Color::GRAY,
            background: Color::BLACK,
        }
    }
}

impl Glyph {
    pub const fn new(symbol: char, foreground: Color, background: Color) -> Self {
        Glyph {
            symbol,
            foreground,
            background,
        }
    }

    pub const fn plain(symbol: char) -> Self {
        Glyph::new(symbol, Color::GRAY, Color::BLACK)
    }

    pub fn with_foreground(self, foreground: Color) -> Self {
        Glyph { foreground, ..self }
    }
}
