pub mod series;
pub mod theme;
