//! Terminal orbital visualization: planets, stars and debris belts rendered
//! into a character grid, plus the tokio/crossterm explorer around it.

pub mod api;
pub mod app;
pub mod barycenter;
pub mod body;
pub mod catalog;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod debris;
pub mod ephemeris;
pub mod glyphs;
pub mod input;
pub mod raster;
pub mod scale;
pub mod state;
pub mod term;

pub use body::{BodyKind, CelestialBody};
pub use compositor::{Compositor, Frame, FrameTime, ScreenPosition};
pub use glyphs::{style_for, symbol_for, GlyphStyle};
pub use raster::Grid;
