use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::spinner_frame;
use crate::core::model::Interview;

/// The only outcome of the form: an answer map to relay to the backend.
/// A confirmed skip submits an empty map.
pub enum FormAction {
    Submit(HashMap<String, String>),
}

/// Clarifying-question form shown while a run is WAITING_FOR_INPUT.
///
/// Answers are keyed by question id. Submit unlocks only when every answer
/// is non-empty after trimming; skip asks for confirmation first. While a
/// submission is in flight every input is disabled.
pub struct InterviewForm {
    interview: Interview,
    answers: Vec<String>,
    selected: usize,
    cursor: usize, // byte offset into the selected answer
    submitting: bool,
    confirm_skip: bool,
    error: Option<String>,
}

impl InterviewForm {
    pub fn new(interview: Interview) -> Self {
        let answers = vec![String::new(); interview.questions.len()];
        Self {
            interview,
            answers,
            selected: 0,
            cursor: 0,
            submitting: false,
            confirm_skip: false,
            error: None,
        }
    }

    pub fn all_answered(&self) -> bool {
        self.answers.iter().all(|a| !a.trim().is_empty())
    }

    pub fn answer_map(&self) -> HashMap<String, String> {
        self.interview
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(q, a)| (q.id.clone(), a.clone()))
            .collect()
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
        self.error = None;
    }

    pub fn submission_failed(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.cursor = self.answers[index].len();
    }

    pub fn insert_text(&mut self, text: &str) {
        if self.submitting || self.confirm_skip {
            return;
        }
        self.answers[self.selected].insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormAction> {
        if self.submitting {
            return None;
        }

        if self.confirm_skip {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_skip = false;
                    return Some(FormAction::Submit(HashMap::new()));
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_skip = false;
                }
                _ => {}
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    if self.all_answered() {
                        return Some(FormAction::Submit(self.answer_map()));
                    }
                }
                KeyCode::Char('k') => self.confirm_skip = true,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                if self.selected > 0 {
                    self.select(self.selected - 1);
                }
                return None;
            }
            KeyCode::Down | KeyCode::Tab => {
                if self.selected + 1 < self.answers.len() {
                    self.select(self.selected + 1);
                }
                return None;
            }
            _ => {}
        }

        let answer = &mut self.answers[self.selected];
        match key.code {
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let prev = answer[..self.cursor]
                        .char_indices()
                        .next_back()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    answer.remove(prev);
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if self.cursor < answer.len() {
                    answer.remove(self.cursor);
                }
            }
            KeyCode::Left => {
                self.cursor = answer[..self.cursor]
                    .char_indices()
                    .next_back()
                    .map(|(i, _)| i)
                    .unwrap_or(0);
            }
            KeyCode::Right => {
                self.cursor = answer[self.cursor..]
                    .chars()
                    .next()
                    .map(|c| self.cursor + c.len_utf8())
                    .unwrap_or(self.cursor);
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = answer.len(),
            KeyCode::Char(c) => {
                answer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect, tick: usize) {
        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                "We need a bit more info",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "The agents have a few clarifying questions about your idea.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
        ];

        for (i, question) in self.interview.questions.iter().enumerate() {
            let selected = i == self.selected;
            let marker = if selected { "▶ " } else { "  " };
            let label_style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                format!("{}{}. {}", marker, i + 1, question.text),
                label_style,
            )));

            if selected && let Some(guidance) = &question.guidance {
                lines.push(Line::from(Span::styled(
                    format!("     ℹ {}", guidance),
                    Style::default().fg(Color::Blue),
                )));
            }

            let answer = &self.answers[i];
            let answer_style = if self.submitting {
                Style::default().fg(Color::DarkGray)
            } else if answer.trim().is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            };
            let shown = if answer.is_empty() {
                "Your answer...".to_string()
            } else {
                answer.clone()
            };
            let cursor_mark = if selected && !self.submitting { "▏" } else { "" };
            lines.push(Line::from(Span::styled(
                format!("     {}{}", shown, cursor_mark),
                answer_style,
            )));
            lines.push(Line::from(""));
        }

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )));
        }

        if self.submitting {
            lines.push(Line::from(Span::styled(
                format!("{} Submitting...", spinner_frame(tick)),
                Style::default().fg(Color::Yellow),
            )));
        } else if self.all_answered() {
            lines.push(Line::from(Span::styled(
                "Ctrl+S submit answers · Ctrl+K skip · ↑/↓ switch question",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Answer every question to submit · Ctrl+K skip · ↑/↓ switch question",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let widget = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Interview ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);

        if self.confirm_skip {
            let popup_w = area.width.saturating_sub(8).min(64);
            let popup_h = 5.min(area.height);
            let popup = Rect {
                x: area.x + (area.width.saturating_sub(popup_w)) / 2,
                y: area.y + (area.height.saturating_sub(popup_h)) / 2,
                width: popup_w,
                height: popup_h,
            };
            if popup.width == 0 || popup.height == 0 {
                return;
            }
            let confirm = Paragraph::new(vec![
                Line::from("Skip the questions?"),
                Line::from(Span::styled(
                    "The analysis might be less accurate without these details.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "y confirm · n cancel",
                    Style::default().fg(Color::Yellow),
                )),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .wrap(Wrap { trim: false });
            f.render_widget(Clear, popup);
            f.render_widget(confirm, popup);
        }
    }
}
