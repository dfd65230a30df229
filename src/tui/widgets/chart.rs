use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::series_color;
use crate::dashboard::{ChartKind, ChartView};

const BAR_WIDTH: u16 = 3;
const GROUP_GAP: u16 = 2;

pub fn draw(f: &mut Frame, view: &ChartView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view.title))
        .title_style(Style::default().fg(Color::Cyan));

    if !view.has_data() {
        let empty = Paragraph::new("No attempts logged yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    match view.kind {
        ChartKind::Bar => draw_bars(f, view, block, area),
        ChartKind::Line => draw_lines(f, view, block, area),
    }
}

// Most recent dates that fit the width, one group per date.
fn draw_bars(f: &mut Frame, view: &ChartView, block: Block, area: Rect) {
    let table = &view.table;
    let group_width = view.columns.len() as u16 * BAR_WIDTH + GROUP_GAP;
    let visible = (area.width.saturating_sub(2) / group_width.max(1)).max(1) as usize;
    let start = table.dates.len().saturating_sub(visible);

    let columns: Vec<_> = view
        .columns
        .iter()
        .filter_map(|label| table.column(label))
        .collect();

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(BAR_WIDTH)
        .bar_gap(0)
        .group_gap(GROUP_GAP);

    for (i, date) in table.dates.iter().enumerate().skip(start) {
        let bars: Vec<Bar> = columns
            .iter()
            .enumerate()
            .map(|(c, column)| {
                let value = column.values[i].max(0.0) as u64;
                Bar::default()
                    .value(value)
                    .text_value(value.to_string())
                    .style(Style::default().fg(series_color(c)))
            })
            .collect();
        let group = BarGroup::default()
            .label(Line::from(date.format("%m-%d").to_string()))
            .bars(&bars);
        chart = chart.data(group);
    }

    f.render_widget(chart, area);
}

fn draw_lines(f: &mut Frame, view: &ChartView, block: Block, area: Rect) {
    let table = &view.table;
    let first = table.dates[0];
    let xs: Vec<f64> = table.dates.iter().map(|d| day_offset(first, *d)).collect();
    let x_max = xs.last().copied().unwrap_or(0.0).max(1.0);
    let y_max = table.max_over(&view.columns).max(100.0);

    let points: Vec<(&str, Vec<(f64, f64)>)> = view
        .columns
        .iter()
        .filter_map(|label| table.column(label))
        .map(|column| {
            let series = xs.iter().copied().zip(column.values.iter().copied()).collect();
            (column.label.as_str(), series)
        })
        .collect();

    let datasets: Vec<Dataset> = points
        .iter()
        .enumerate()
        .map(|(i, (label, series))| {
            Dataset::default()
                .name(label.to_string())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(i)))
                .data(series)
        })
        .collect();

    let last = *table.dates.last().unwrap_or(&first);
    let mid = first + chrono::Duration::days((last - first).num_days() / 2);
    let x_labels: Vec<Span> = [first, mid, last]
        .iter()
        .map(|d| Span::raw(d.format("%m-%d").to_string()))
        .collect();
    let y_labels: Vec<Span> = [0.0, y_max / 2.0, y_max]
        .iter()
        .map(|v| Span::raw(format!("{v:.0}")))
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("date")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("%")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn day_offset(first: NaiveDate, date: NaiveDate) -> f64 {
    (date - first).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_offset_counts_calendar_days() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        assert_eq!(day_offset(a, b), 3.0);
        assert_eq!(day_offset(a, a), 0.0);
    }
}
