use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use crate::dashboard::ChartView;

pub fn draw(f: &mut Frame, view: &ChartView, offset: usize, area: Rect) {
    let table = &view.table;

    let mut header = vec!["date".to_string()];
    header.extend(table.columns.iter().map(|c| c.label.clone()));

    let rows: Vec<Row> = table
        .dates
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(i, date)| {
            let mut cells = vec![date.to_string()];
            cells.extend(
                table
                    .columns
                    .iter()
                    .map(|c| view.kind.format(c.values[i])),
            );
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = header
        .iter()
        .map(|h| Constraint::Length(h.len().max(10) as u16))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} rows ", table.dates.len()))
        .title_style(Style::default().fg(Color::Magenta));

    let widget = Table::new(rows, widths)
        .header(
            Row::new(header).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .column_spacing(1)
        .block(block);

    f.render_widget(widget, area);
}
