use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::oneshot;

use super::{Nav, spinner_frame};
use crate::core::api::ApiClient;

const SUBMIT_ERROR: &str = "Failed to start analysis. Please try again.";

/// The idea form: free-text input, submitted to the backend to create a run.
pub struct HomeScreen {
    idea: String,
    cursor: usize, // byte offset into `idea`
    submitting: bool,
    error: Option<String>,
    submit_rx: Option<oneshot::Receiver<Result<String, String>>>,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self {
            idea: String::new(),
            cursor: 0,
            submitting: false,
            error: None,
            submit_rx: None,
        }
    }

    fn prev_boundary(&self) -> usize {
        self.idea[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.idea[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.cursor)
    }

    pub fn insert_text(&mut self, text: &str) {
        if self.submitting {
            return;
        }
        self.idea.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn start_submit(&mut self, api: &ApiClient) {
        let (tx, rx) = oneshot::channel();
        let api = api.clone();
        let idea = self.idea.clone();
        tokio::spawn(async move {
            let result = api.start_analysis(&idea).await.map_err(|e| {
                tracing::error!("start analysis failed: {:#}", e);
                SUBMIT_ERROR.to_string()
            });
            let _ = tx.send(result);
        });
        self.submit_rx = Some(rx);
        self.submitting = true;
        self.error = None;
    }

    pub fn tick(&mut self) -> Nav {
        if let Some(rx) = &mut self.submit_rx {
            match rx.try_recv() {
                Ok(Ok(run_id)) => {
                    self.submit_rx = None;
                    self.submitting = false;
                    return Nav::Run(run_id);
                }
                Ok(Err(msg)) => {
                    self.submit_rx = None;
                    self.submitting = false;
                    self.error = Some(msg);
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.submit_rx = None;
                    self.submitting = false;
                    self.error = Some(SUBMIT_ERROR.to_string());
                }
            }
        }
        Nav::Stay
    }

    pub fn handle_key(&mut self, api: &ApiClient, key: KeyEvent) -> Nav {
        // The whole form is disabled while a submission is in flight.
        if self.submitting {
            return Nav::Stay;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    if !self.idea.trim().is_empty() {
                        self.start_submit(api);
                    }
                }
                KeyCode::Char('l') => return Nav::History,
                _ => {}
            }
            return Nav::Stay;
        }

        match key.code {
            KeyCode::Esc => return Nav::Quit,
            KeyCode::Enter => {
                self.idea.insert(self.cursor, '\n');
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.idea.remove(prev);
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.idea.len() {
                    self.idea.remove(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.idea.len(),
            KeyCode::Char(c) => {
                self.idea.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => {}
        }
        Nav::Stay
    }

    pub fn render(&self, f: &mut Frame<'_>, tick: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .split(f.area());

        let header = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Validate Your Next Big Idea",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  Market analysis, risk assessment and execution plans from a team of AI agents.",
                Style::default().fg(Color::DarkGray),
            )),
        ]);
        f.render_widget(header, chunks[0]);

        let input_style = if self.submitting {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let input = Paragraph::new(self.idea.as_str())
            .block(
                Block::default()
                    .title(" Describe your startup idea ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .style(input_style);
        f.render_widget(input, chunks[1]);

        // Place the cursor inside the textarea.
        if !self.submitting {
            let before = &self.idea[..self.cursor];
            let row = before.matches('\n').count() as u16;
            let col = before
                .rsplit('\n')
                .next()
                .map(|line| line.chars().count())
                .unwrap_or(0) as u16;
            let inner_w = chunks[1].width.saturating_sub(2);
            let x = chunks[1].x + 1 + col.min(inner_w.saturating_sub(1));
            let y = chunks[1].y + 1 + row.min(chunks[1].height.saturating_sub(3));
            f.set_cursor_position((x, y));
        }

        let status_line = if self.submitting {
            Line::from(Span::styled(
                format!("  {} Starting Analysis Engine...", spinner_frame(tick)),
                Style::default().fg(Color::Yellow),
            ))
        } else if let Some(error) = &self.error {
            Line::from(Span::styled(
                format!("  Error: {}", error),
                Style::default().fg(Color::Red),
            ))
        } else {
            Line::from(Span::styled(
                "  Be as specific as possible for better results.",
                Style::default().fg(Color::DarkGray),
            ))
        };
        f.render_widget(Paragraph::new(vec![Line::from(""), status_line]), chunks[2]);

        let hints = Paragraph::new(Line::from(Span::styled(
            "  Ctrl+S start analysis · Ctrl+L history · Esc quit",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(hints, chunks[3]);
    }
}
