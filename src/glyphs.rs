use crossterm::style::Color;

use crate::barycenter::effective_mass;
use crate::body::{CelestialBody, SOLAR_MASS_KG};
use crate::debris::{ASTEROID_GLYPH, KUIPER_GLYPH};
use crate::raster::ORBIT_GLYPH;

pub const SUN_GLYPH: char = '☉';
pub const HOT_STAR_GLYPH: char = '✦';
pub const WHITE_STAR_GLYPH: char = '✧';
pub const ORANGE_STAR_GLYPH: char = '✩';
pub const RED_DWARF_GLYPH: char = '✪';
pub const GENERIC_STAR_GLYPH: char = '✶';

const KNOWN_SYMBOLS: [(&str, char); 10] = [
    ("Sun", SUN_GLYPH),
    ("Mercury", '☿'),
    ("Venus", '♀'),
    ("Earth", '♁'),
    ("Mars", '♂'),
    ("Jupiter", '♃'),
    ("Saturn", '♄'),
    ("Uranus", '♅'),
    ("Neptune", '♆'),
    ("Pluto", '♇'),
];

/// Single-width glyphs for bodies without a traditional symbol.
const GENERIC_PALETTE: [char; 20] = [
    '●', '◉', '◎', '○', '◯', '◍', '◐', '◑', '◒', '◓', '⊕', '⊗', '⊙', '◆', '◇', '◈', '❂', '✺', '⦿', '⬡',
];

/// Glyph for a body name: the traditional symbol for the Sun and the nine
/// canonical Sol bodies, otherwise a palette entry picked by a stable hash.
pub fn symbol_for(name: &str) -> char {
    KNOWN_SYMBOLS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, g)| *g)
        .unwrap_or_else(|| GENERIC_PALETTE[palette_index(name)])
}

/// `h = (h + codepoint) mod len` over the name's chars.
pub fn palette_index(name: &str) -> usize {
    name.chars()
        .fold(0usize, |h, c| (h + c as usize) % GENERIC_PALETTE.len())
}

/// Spectral class letter from explicit class, then temperature, then mass.
/// `None` when an explicit class is present but not one of OBAFGKM.
pub fn spectral_class(star: &CelestialBody) -> Option<char> {
    let explicit = star.stellar_class.trim();
    if !explicit.is_empty() {
        return explicit
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| "OBAFGKM".contains(*c));
    }
    if star.temperature > 0.0 {
        return Some(class_by_temperature(star.temperature));
    }
    Some(class_by_mass(effective_mass(star) / SOLAR_MASS_KG))
}

pub fn class_by_temperature(kelvin: f64) -> char {
    match kelvin {
        t if t >= 30_000.0 => 'O',
        t if t >= 10_000.0 => 'B',
        t if t >= 7_500.0 => 'A',
        t if t >= 6_000.0 => 'F',
        t if t >= 5_200.0 => 'G',
        t if t >= 3_700.0 => 'K',
        _ => 'M',
    }
}

pub fn class_by_mass(solar_masses: f64) -> char {
    match solar_masses {
        m if m > 16.0 => 'O',
        m if m > 2.1 => 'B',
        m if m > 1.4 => 'A',
        m if m > 1.04 => 'F',
        m if m > 0.8 => 'G',
        m if m > 0.45 => 'K',
        _ => 'M',
    }
}

/// Star glyph by spectral class. The Sun is always ☉.
pub fn star_symbol(star: &CelestialBody) -> char {
    if star.display_name() == "Sun" {
        return SUN_GLYPH;
    }
    match spectral_class(star) {
        Some('O' | 'B') => HOT_STAR_GLYPH,
        Some('A' | 'F') => WHITE_STAR_GLYPH,
        Some('G') => SUN_GLYPH,
        Some('K') => ORANGE_STAR_GLYPH,
        Some('M') => RED_DWARF_GLYPH,
        _ => GENERIC_STAR_GLYPH,
    }
}

/// Display hint for a glyph. Not part of the grid's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphStyle {
    pub fg: Color,
    pub bold: bool,
}

impl GlyphStyle {
    const fn bold(fg: Color) -> Self {
        Self { fg, bold: true }
    }
    const fn plain(fg: Color) -> Self {
        Self { fg, bold: false }
    }
}

const ORANGE: Color = Color::Rgb { r: 255, g: 165, b: 0 };

pub fn style_for(glyph: char) -> GlyphStyle {
    match glyph {
        ORBIT_GLYPH => GlyphStyle::plain(Color::DarkGrey),
        ASTEROID_GLYPH => GlyphStyle::plain(ORANGE),
        KUIPER_GLYPH => GlyphStyle::plain(Color::Blue),
        SUN_GLYPH => GlyphStyle::bold(Color::Yellow),
        '☿' | '♇' => GlyphStyle::bold(Color::Grey),
        '♀' => GlyphStyle::bold(Color::Yellow),
        '♁' => GlyphStyle::bold(Color::Blue),
        '♂' => GlyphStyle::bold(Color::Red),
        '♃' => GlyphStyle::bold(ORANGE),
        '♄' => GlyphStyle::bold(Color::Magenta),
        '♅' => GlyphStyle::bold(Color::DarkCyan),
        '♆' => GlyphStyle::bold(Color::DarkBlue),
        HOT_STAR_GLYPH => GlyphStyle::bold(Color::Blue),
        WHITE_STAR_GLYPH | GENERIC_STAR_GLYPH => GlyphStyle::bold(Color::White),
        ORANGE_STAR_GLYPH => GlyphStyle::bold(ORANGE),
        RED_DWARF_GLYPH => GlyphStyle::bold(Color::Red),
        _ => GlyphStyle::plain(Color::White),
    }
}
