use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::Backend};
use std::{io, time::Duration};

use super::{App, Nav, Screen};

impl App {
    pub async fn run_tui(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
        terminal.show_cursor()?;

        res
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
    {
        loop {
            if self.should_quit {
                return Ok(());
            }

            self.tick();

            terminal.draw(|f| self.render(f))?;

            // Poll events with a short timeout so spinners keep moving.
            if event::poll(Duration::from_millis(80))? {
                match event::read()? {
                    Event::Key(key) => self.on_key(key).await,
                    Event::Paste(data) => self.on_paste(data),
                    _ => {}
                }
            }
        }
    }

    /// Drain async results (poll snapshots, submissions) without blocking.
    fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);

        let nav = match &mut self.screen {
            Screen::Home(home) => home.tick(),
            Screen::Run(run) => run.tick(&self.api),
            Screen::History(_) => Nav::Stay,
        };
        // Ticks only ever navigate to a freshly created run view.
        if let Nav::Run(run_id) = nav {
            self.screen = Screen::Run(super::RunScreen::open(&self.api, run_id));
        }
    }

    async fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let nav = match &mut self.screen {
            Screen::Home(home) => home.handle_key(&self.api, key),
            Screen::Run(run) => run.handle_key(&self.api, key),
            Screen::History(history) => history.handle_key(key),
        };
        self.navigate(nav).await;
    }

    fn on_paste(&mut self, data: String) {
        match &mut self.screen {
            Screen::Home(home) => home.insert_text(&data),
            Screen::Run(run) => run.insert_text(&data),
            Screen::History(_) => {}
        }
    }

    fn render(&mut self, f: &mut Frame<'_>) {
        let tick = self.tick_count;
        match &mut self.screen {
            Screen::Home(home) => home.render(f, tick),
            Screen::Run(run) => run.render(f, tick),
            Screen::History(history) => history.render(f),
        }
    }
}
