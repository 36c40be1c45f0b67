use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::Nav;
use crate::core::api::ApiClient;
use crate::core::model::{RunStatus, RunSummary, human_timestamp, sort_newest_first};

fn status_color(status: RunStatus) -> Color {
    match status {
        RunStatus::Completed => Color::Green,
        RunStatus::Failed => Color::Red,
        RunStatus::Running => Color::Cyan,
        _ => Color::DarkGray,
    }
}

/// Past runs, fetched once on entry and sorted newest first.
pub struct HistoryScreen {
    result: Result<Vec<RunSummary>, String>,
    selected: usize,
}

impl HistoryScreen {
    pub async fn load(api: &ApiClient) -> Self {
        let result = match api.list_runs().await {
            Ok(mut runs) => {
                sort_newest_first(&mut runs);
                Ok(runs)
            }
            Err(e) => {
                tracing::error!("history fetch failed: {:#}", e);
                Err("Failed to load history.".to_string())
            }
        };
        Self {
            result,
            selected: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Nav {
        let runs = match &self.result {
            Ok(runs) => runs,
            Err(_) => {
                return match key.code {
                    KeyCode::Esc | KeyCode::Char('n') => Nav::Home,
                    KeyCode::Char('q') => Nav::Quit,
                    _ => Nav::Stay,
                };
            }
        };

        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < runs.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(run) = runs.get(self.selected) {
                    return Nav::Run(run.run_id.clone());
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => return Nav::Home,
            KeyCode::Char('q') => return Nav::Quit,
            _ => {}
        }
        Nav::Stay
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());

        let lines: Vec<Line> = match &self.result {
            Err(error) => vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", error),
                    Style::default().fg(Color::Red),
                )),
            ],
            Ok(runs) if runs.is_empty() => vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No analyses yet",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "  Start your first idea validation analysis today.",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
            Ok(runs) => runs
                .iter()
                .enumerate()
                .map(|(i, run)| self.run_line(i, run))
                .collect(),
        };

        let widget = Paragraph::new(lines).block(
            Block::default()
                .title(" Analysis History ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(widget, chunks[0]);

        let hints = Paragraph::new(Line::from(Span::styled(
            "  ↑/↓ select · Enter open · n new analysis · q quit",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(hints, chunks[1]);
    }

    fn run_line(&self, index: usize, run: &RunSummary) -> Line<'static> {
        let selected = index == self.selected;
        let marker = if selected { " ▶ " } else { "   " };
        let idea = run.idea_text.clone().unwrap_or_else(|| "Untitled Idea".to_string());
        let idea_style = if selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(
                marker.to_string(),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("{:<18}", run.status.label()),
                Style::default().fg(status_color(run.status)),
            ),
            Span::styled(
                format!("{}  ", human_timestamp(&run.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(idea, idea_style),
        ])
    }
}
