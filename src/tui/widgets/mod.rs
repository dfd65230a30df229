pub mod chart;
pub mod raw_table;

use ratatui::style::Color;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::LightBlue,
];

pub fn series_color(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}
