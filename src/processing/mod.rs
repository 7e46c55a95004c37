pub mod descent;
pub mod extrema;
pub mod moving_average;
pub mod summary;
pub mod threshold;
