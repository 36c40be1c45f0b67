use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle of a backend analysis run. The backend owns this vocabulary;
/// anything we don't recognise maps to `Unknown` instead of failing the
/// whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Queued,
    Started,
    Running,
    WaitingForInput,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Terminal or paused states stop the poll loop.
    pub fn stops_polling(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::WaitingForInput
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Queued => "QUEUED",
            RunStatus::Started => "STARTED",
            RunStatus::Running => "RUNNING",
            RunStatus::WaitingForInput => "WAITING_FOR_INPUT",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Append-only progress event emitted by the pipeline. Ordering is
/// chronological and is the only progress signal the backend exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub agent: Option<String>,
}

pub const AGENT_STARTED: &str = "AGENT_STARTED";
pub const AGENT_FINISHED: &str = "AGENT_FINISHED";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub guidance: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// Full run state as returned by `GET /analysis/{run_id}`. The client never
/// mutates this; it only re-fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub idea_text: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub events: Vec<RunEvent>,
    #[serde(default)]
    pub interview: Option<Interview>,
    #[serde(default)]
    pub report: Option<ClarityReport>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One row of `GET /analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub created_at: String,
    #[serde(default)]
    pub idea_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "PURSUE")]
    Pursue,
    #[serde(rename = "PIVOT")]
    Pivot,
    #[serde(rename = "KILL")]
    Kill,
    #[serde(other)]
    Unknown,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pursue => "PURSUE",
            Verdict::Pivot => "PIVOT",
            Verdict::Kill => "KILL",
            Verdict::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub run_id: String,
    pub created_at: String,
    pub model: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub title: String,
    pub one_liner: String,
    pub expanded_summary: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
}

/// Persona records are free-form on the wire; we read the three fields the
/// report view shows and default the rest away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub pain_points: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audience {
    #[serde(default)]
    pub primary_users: Vec<String>,
    #[serde(default)]
    pub jobs_to_be_done: Vec<String>,
    #[serde(default)]
    pub personas: Vec<Persona>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    #[serde(default)]
    pub demand_signals: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    pub positioning: String,
}

/// `mitigations` pairs positionally with `top_risks`; the backend may emit
/// fewer mitigations than risks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risks {
    #[serde(default)]
    pub top_risks: Vec<String>,
    #[serde(default)]
    pub mitigations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    #[serde(default)]
    pub mvp_scope: Vec<String>,
    #[serde(default)]
    pub two_week_plan: Vec<String>,
    #[serde(default)]
    pub two_month_plan: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scores {
    pub market_demand: ScoreDetail,
    pub competitive_advantage: ScoreDetail,
    pub technical_feasibility: ScoreDetail,
    pub business_viability: ScoreDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub confidence: f64,
    #[serde(default)]
    pub scores: Option<Scores>,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub question_id: String,
    pub question_text: String,
    pub answer_text: String,
    pub analysis: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewEvaluation {
    #[serde(default)]
    pub evaluations: Vec<AnswerEvaluation>,
    pub summary: String,
}

/// The structured report produced by a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarityReport {
    pub meta: ReportMeta,
    pub idea: Idea,
    pub audience: Audience,
    pub market: Market,
    pub risks: Risks,
    pub execution: Execution,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub interview_evaluation: Option<InterviewEvaluation>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Newest first. Backend timestamps are ISO-8601, so lexicographic order is
/// chronological order; no parse needed for sorting.
pub fn sort_newest_first(runs: &mut [RunSummary]) {
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Best-effort local rendering of a backend timestamp. Falls back to the raw
/// string for shapes we don't recognise.
pub fn human_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(run_id: &str, created_at: &str) -> RunSummary {
        RunSummary {
            run_id: run_id.to_string(),
            status: RunStatus::Completed,
            created_at: created_at.to_string(),
            idea_text: None,
        }
    }

    #[test]
    fn runs_sort_newest_first() {
        let mut runs = vec![
            summary("t2", "2026-03-02T10:00:00"),
            summary("t1", "2026-03-01T10:00:00"),
            summary("t3", "2026-03-03T10:00:00"),
        ];
        sort_newest_first(&mut runs);
        let order: Vec<&str> = runs.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(order, vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let run: RunState = serde_json::from_str(
            r#"{"run_id": "abc", "status": "ARCHIVED", "events": []}"#,
        )
        .expect("unknown status must not fail the payload");
        assert_eq!(run.status, RunStatus::Unknown);
    }

    #[test]
    fn run_state_parses_with_optional_sections_missing() {
        let run: RunState =
            serde_json::from_str(r#"{"run_id": "abc", "status": "RUNNING"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.events.is_empty());
        assert!(run.interview.is_none());
        assert!(run.report.is_none());
    }

    #[test]
    fn status_stops_polling_only_when_settled() {
        assert!(RunStatus::Completed.stops_polling());
        assert!(RunStatus::Failed.stops_polling());
        assert!(RunStatus::WaitingForInput.stops_polling());
        assert!(!RunStatus::Queued.stops_polling());
        assert!(!RunStatus::Started.stops_polling());
        assert!(!RunStatus::Running.stops_polling());
    }

    #[test]
    fn human_timestamp_reads_naive_iso() {
        assert_eq!(
            human_timestamp("2026-03-01T10:30:00.123456"),
            "2026-03-01 10:30"
        );
        assert_eq!(human_timestamp("not-a-date"), "not-a-date");
    }
}
