use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{chart, raw_table};
use super::{App, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles: Vec<&str> = app.dashboard.views().iter().map(|v| v.title).collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" studydash "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let view = app.current();

    if !app.show_raw {
        chart::draw(f, view, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    chart::draw(f, view, chunks[0]);
    raw_table::draw(f, view, app.table_offset, chunks[1]);
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("h/l", Style::default().fg(Color::Cyan)),
        Span::raw(" Views  "),
        Span::styled("1-3", Style::default().fg(Color::Cyan)),
        Span::raw(" Jump  "),
        Span::styled("t", Style::default().fg(Color::Cyan)),
        Span::raw(if app.show_raw {
            " Hide table  "
        } else {
            " Show table  "
        }),
    ];

    if app.show_raw {
        spans.extend(vec![
            Span::styled("j/k", Style::default().fg(Color::Cyan)),
            Span::raw(" Scroll  "),
            Span::styled("g/G", Style::default().fg(Color::Cyan)),
            Span::raw(" Top/Bot  "),
        ]);
    }

    spans.extend(vec![
        Span::styled("q", Style::default().fg(Color::Cyan)),
        Span::raw(" Quit"),
    ]);

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
