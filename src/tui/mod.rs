mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::dashboard::{ChartView, Dashboard};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Daily,
    Coverage,
    Accuracy,
}

impl View {
    pub const ALL: [View; 3] = [View::Daily, View::Coverage, View::Accuracy];

    fn next(&self) -> Self {
        match self {
            View::Daily => View::Coverage,
            View::Coverage => View::Accuracy,
            View::Accuracy => View::Daily,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Daily => View::Accuracy,
            View::Coverage => View::Daily,
            View::Accuracy => View::Coverage,
        }
    }

    fn index(&self) -> usize {
        match self {
            View::Daily => 0,
            View::Coverage => 1,
            View::Accuracy => 2,
        }
    }
}

pub struct App {
    pub dashboard: Dashboard,
    pub view: View,
    pub show_raw: bool,
    pub table_offset: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let show_raw = dashboard.daily.show_raw;
        Self {
            dashboard,
            view: View::Daily,
            show_raw,
            table_offset: 0,
            should_quit: false,
        }
    }

    pub fn current(&self) -> &ChartView {
        self.dashboard.views()[self.view.index()]
    }

    fn switch_to(&mut self, view: View) {
        self.view = view;
        self.table_offset = 0;
    }

    fn last_row(&self) -> usize {
        self.current().table.dates.len().saturating_sub(1)
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }

            // Views: h/l, arrows, Tab, or jump by number
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.switch_to(self.view.prev())
            }
            KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => {
                self.switch_to(self.view.prev())
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                self.switch_to(self.view.next())
            }
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.switch_to(View::ALL[idx]);
            }

            // Raw table
            KeyCode::Char('t') => self.show_raw = !self.show_raw,
            KeyCode::Char('j') | KeyCode::Down if self.show_raw => {
                self.table_offset = (self.table_offset + 1).min(self.last_row());
            }
            KeyCode::Char('k') | KeyCode::Up if self.show_raw => {
                self.table_offset = self.table_offset.saturating_sub(1);
            }
            KeyCode::Char('g') if self.show_raw => self.table_offset = 0,
            KeyCode::Char('G') if self.show_raw => self.table_offset = self.last_row(),

            _ => {}
        }
    }
}

pub fn run(dashboard: Dashboard) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(dashboard);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
