//! Grid map: the immutable maze the player walks through.
//!
//! # Invariants
//! - Loaded once at startup; never mutated afterwards.
//! - Every row holds exactly `width` glyphs after loading.
//! - The declared start lies on an open cell.

mod grid;

pub use grid::{GridMap, MapError, OPEN_GLYPHS, START_MARKER, is_wall_glyph};
