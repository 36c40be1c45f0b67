use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::oneshot;

use super::interview::{FormAction, InterviewForm};
use super::report::report_lines;
use super::{Nav, spinner_frame};
use crate::core::api::ApiClient;
use crate::core::model::{RunState, RunStatus};
use crate::core::poller::{POLL_INTERVAL, PollUpdate, RunPoller};
use crate::core::progress::{self, PHASES, StepState};

const FEEDBACK_ERROR: &str = "Failed to submit answers. Please try again.";
const FAILED_FALLBACK: &str = "An unexpected error occurred during analysis.";

/// Exhaustive presentation state of a run view. Every snapshot lands in
/// exactly one variant; there is no implicit fallthrough.
enum RunPhase {
    Loading,
    Polling(RunState),
    AwaitingInput { run: RunState, form: InterviewForm },
    Completed(RunState),
    Failed { message: String },
}

/// One mounted run view: owns at most one live poller at a time, plus the
/// in-flight feedback submission when the interview form is up.
pub struct RunScreen {
    run_id: String,
    phase: RunPhase,
    poller: Option<RunPoller>,
    feedback_rx: Option<oneshot::Receiver<Result<(), String>>>,
    scroll: u16,
    notice: Option<String>,
}

impl RunScreen {
    pub fn open(api: &ApiClient, run_id: String) -> Self {
        let poller = RunPoller::spawn(api.clone(), run_id.clone(), POLL_INTERVAL);
        Self {
            run_id,
            phase: RunPhase::Loading,
            poller: Some(poller),
            feedback_rx: None,
            scroll: 0,
            notice: None,
        }
    }

    fn apply_snapshot(&mut self, run: RunState) {
        match run.status {
            RunStatus::Completed => {
                self.poller = None;
                self.scroll = 0;
                self.phase = RunPhase::Completed(run);
            }
            RunStatus::Failed => {
                self.poller = None;
                let message = run.error.unwrap_or_else(|| FAILED_FALLBACK.to_string());
                self.phase = RunPhase::Failed { message };
            }
            RunStatus::WaitingForInput => {
                self.poller = None;
                match run.interview.clone() {
                    Some(interview) if !interview.questions.is_empty() => {
                        self.phase = RunPhase::AwaitingInput {
                            form: InterviewForm::new(interview),
                            run,
                        };
                    }
                    // Waiting with nothing to ask: keep showing progress;
                    // reload is the way out.
                    _ => self.phase = RunPhase::Polling(run),
                }
            }
            _ => self.phase = RunPhase::Polling(run),
        }
    }

    /// Restart polling after a feedback submission, optimistically showing
    /// RUNNING until the next snapshot confirms it.
    fn resume_polling(&mut self, api: &ApiClient) {
        let phase = std::mem::replace(&mut self.phase, RunPhase::Loading);
        if let RunPhase::AwaitingInput { mut run, .. } = phase {
            run.status = RunStatus::Running;
            run.interview = None;
            self.phase = RunPhase::Polling(run);
        }
        self.poller = Some(RunPoller::spawn(
            api.clone(),
            self.run_id.clone(),
            POLL_INTERVAL,
        ));
    }

    pub fn tick(&mut self, api: &ApiClient) -> Nav {
        while let Some(update) = self.poller.as_mut().and_then(RunPoller::try_next) {
            match update {
                PollUpdate::Snapshot(run) => self.apply_snapshot(run),
                PollUpdate::Error(message) => {
                    self.poller = None;
                    self.phase = RunPhase::Failed { message };
                }
            }
        }

        if let Some(rx) = &mut self.feedback_rx {
            match rx.try_recv() {
                Ok(Ok(())) => {
                    self.feedback_rx = None;
                    self.resume_polling(api);
                }
                Ok(Err(message)) => {
                    self.feedback_rx = None;
                    if let RunPhase::AwaitingInput { form, .. } = &mut self.phase {
                        form.submission_failed(message);
                    }
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.feedback_rx = None;
                    if let RunPhase::AwaitingInput { form, .. } = &mut self.phase {
                        form.submission_failed(FEEDBACK_ERROR.to_string());
                    }
                }
            }
        }

        Nav::Stay
    }

    pub fn insert_text(&mut self, text: &str) {
        if let RunPhase::AwaitingInput { form, .. } = &mut self.phase {
            form.insert_text(text);
        }
    }

    pub fn handle_key(&mut self, api: &ApiClient, key: KeyEvent) -> Nav {
        match &mut self.phase {
            RunPhase::AwaitingInput { form, .. } => {
                if let Some(FormAction::Submit(answers)) = form.handle_key(key) {
                    form.begin_submit();
                    let (tx, rx) = oneshot::channel();
                    let api = api.clone();
                    let run_id = self.run_id.clone();
                    tokio::spawn(async move {
                        let result = api.submit_feedback(&run_id, &answers).await.map_err(|e| {
                            tracing::error!("feedback submission failed: {:#}", e);
                            FEEDBACK_ERROR.to_string()
                        });
                        let _ = tx.send(result);
                    });
                    self.feedback_rx = Some(rx);
                }
                Nav::Stay
            }
            RunPhase::Completed(run) => match key.code {
                KeyCode::Esc | KeyCode::Char('n') => Nav::Home,
                KeyCode::Char('h') => Nav::History,
                KeyCode::Char('q') => Nav::Quit,
                KeyCode::Char('e') => {
                    let url = api.export_markdown_url(&run.run_id);
                    self.notice = Some(match open::that(&url) {
                        Ok(()) => format!("Opened {}", url),
                        Err(e) => {
                            tracing::error!("failed to open export url: {:#}", e);
                            format!("Could not open a browser; export is at {}", url)
                        }
                    });
                    Nav::Stay
                }
                KeyCode::Up => {
                    self.scroll = self.scroll.saturating_sub(1);
                    Nav::Stay
                }
                KeyCode::Down => {
                    self.scroll = self.scroll.saturating_add(1);
                    Nav::Stay
                }
                KeyCode::PageUp => {
                    self.scroll = self.scroll.saturating_sub(10);
                    Nav::Stay
                }
                KeyCode::PageDown => {
                    self.scroll = self.scroll.saturating_add(10);
                    Nav::Stay
                }
                _ => Nav::Stay,
            },
            RunPhase::Failed { .. } | RunPhase::Loading | RunPhase::Polling(_) => match key.code {
                KeyCode::Esc | KeyCode::Char('n') => Nav::Home,
                KeyCode::Char('h') => Nav::History,
                KeyCode::Char('q') => Nav::Quit,
                // Manual reload: rebuild the whole view, fresh poller included.
                KeyCode::Char('r') => {
                    *self = RunScreen::open(api, self.run_id.clone());
                    Nav::Stay
                }
                _ => Nav::Stay,
            },
        }
    }

    pub fn render(&mut self, f: &mut Frame<'_>, tick: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());
        let area = chunks[0];

        match &self.phase {
            RunPhase::Loading => {
                let widget = Paragraph::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  {} Loading...", spinner_frame(tick)),
                        Style::default().fg(Color::Cyan),
                    )),
                ])
                .block(self.frame_block());
                f.render_widget(widget, area);
            }
            RunPhase::Polling(run) => {
                let widget = Paragraph::new(progress_lines(run, tick))
                    .block(self.frame_block())
                    .wrap(Wrap { trim: false });
                f.render_widget(widget, area);
            }
            RunPhase::AwaitingInput { form, .. } => form.render(f, area, tick),
            RunPhase::Completed(run) => {
                let lines = match &run.report {
                    Some(report) => report_lines(report),
                    None => vec![
                        Line::from(""),
                        Line::from(Span::styled(
                            "  The run completed but the backend returned no report.",
                            Style::default().fg(Color::Yellow),
                        )),
                    ],
                };
                self.render_report(f, area, lines);
            }
            RunPhase::Failed { message } => {
                let widget = Paragraph::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "  Analysis Failed",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  {}", message),
                        Style::default().fg(Color::Red),
                    )),
                ])
                .block(self.frame_block())
                .wrap(Wrap { trim: false });
                f.render_widget(widget, area);
            }
        }

        f.render_widget(self.hints_line(), chunks[1]);
    }

    fn render_report(&mut self, f: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>) {
        // Clamp so scrolling stops at the last page of content.
        let visible = area.height.saturating_sub(2);
        let max_scroll = (lines.len() as u16).saturating_sub(visible);
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }

        let widget = Paragraph::new(lines)
            .block(self.frame_block())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(widget, area);
    }

    fn frame_block(&self) -> Block<'_> {
        Block::default()
            .title(format!(" Run {} ", self.run_id))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
    }

    fn hints_line(&self) -> Paragraph<'_> {
        let text = if let Some(notice) = &self.notice {
            format!("  {}", notice)
        } else {
            match &self.phase {
                RunPhase::AwaitingInput { .. } => {
                    "  Ctrl+S submit · Ctrl+K skip · Ctrl+C quit".to_string()
                }
                RunPhase::Completed(_) => {
                    "  ↑/↓ scroll · e export markdown · n new analysis · h history · q quit"
                        .to_string()
                }
                RunPhase::Failed { .. } => {
                    "  r retry analysis · n new analysis · h history · q quit".to_string()
                }
                _ => "  r reload · n new analysis · h history · q quit".to_string(),
            }
        };
        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )))
    }
}

fn progress_lines(run: &RunState, tick: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Analyzing Your Idea",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  The agents are researching the market, scanning competitors and assessing risks.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  This usually takes 1-2 minutes; progress below is approximate.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let progress = progress::derive(&run.events, run.status);
    for (phase, state) in PHASES.iter().zip(&progress.steps) {
        let line = match state {
            StepState::Completed => Line::from(vec![
                Span::styled("   ✔ ", Style::default().fg(Color::Green)),
                Span::styled(phase.label, Style::default().fg(Color::DarkGray)),
            ]),
            StepState::Current => Line::from(vec![
                Span::styled(
                    format!("   {} ", spinner_frame(tick)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    phase.label,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", phase.detail),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            StepState::Pending => Line::from(vec![
                Span::styled("   ○ ", Style::default().fg(Color::DarkGray)),
                Span::styled(phase.label, Style::default().fg(Color::DarkGray)),
            ]),
        };
        lines.push(line);
    }

    lines
}
