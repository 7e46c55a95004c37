pub mod artifacts;
pub mod chart;
pub mod glyphs;
