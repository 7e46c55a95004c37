use plotters::style::RGBColor;

/// Series colours, in the order charts assign them.
pub const COLOR_PALETTE: [RGBColor; 5] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
];

pub fn color_for_index(index: usize) -> RGBColor {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

/// Fixed colours for chart chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: RGBColor,
    pub frame: RGBColor,
    pub grid: RGBColor,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            frame: RGBColor(0, 0, 0),
            grid: RGBColor(176, 176, 176),
        }
    }
}
