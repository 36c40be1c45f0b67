use crate::core::model::{AGENT_FINISHED, AGENT_STARTED, RunEvent, RunStatus};

/// One named phase of the analysis pipeline, mapped to the agents that
/// produce its events.
pub struct Phase {
    pub label: &'static str,
    pub detail: &'static str,
    pub agents: &'static [&'static str],
}

/// Fixed pipeline order. The backend never reports a progress percentage;
/// the client reconstructs one from the agent start/finish events below.
pub const PHASES: &[Phase] = &[
    Phase {
        label: "Initial Assessment",
        detail: "Formulating clarifying questions",
        agents: &["InterviewerAgent"],
    },
    Phase {
        label: "Strategic Planning",
        detail: "Structuring the analysis plan",
        agents: &["PlannerAgent"],
    },
    Phase {
        label: "Market Research",
        detail: "Analyzing market trends and audience",
        agents: &["MarketAgent", "AudienceInsightAgent", "CompetitorScanAgent"],
    },
    Phase {
        label: "Risk Assessment",
        detail: "Identifying potential risks and pitfalls",
        agents: &["RiskAgent"],
    },
    Phase {
        label: "Execution Planning",
        detail: "Drafting execution roadmap",
        agents: &["ExecutionAgent"],
    },
    Phase {
        label: "Review & Verdict",
        detail: "Finalizing verdict and recommendations",
        agents: &["JudgeAgent", "InterviewEvaluatorAgent"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Current,
    Completed,
}

/// Smoothed per-phase display states plus the index treated as "current".
pub struct Progress {
    pub steps: Vec<StepState>,
    pub current: usize,
}

fn has_event(events: &[RunEvent], event_type: &str, agents: &[&str]) -> bool {
    events.iter().any(|e| {
        e.event_type == event_type
            && e.agent
                .as_deref()
                .is_some_and(|agent| agents.contains(&agent))
    })
}

/// Raw state of a single phase, before display smoothing.
///
/// The interview phase is forced COMPLETED whenever the run is waiting for
/// input: the interviewer is done asking even though its finish event may
/// not have landed yet.
fn phase_state(phase: &Phase, events: &[RunEvent], status: RunStatus) -> StepState {
    if phase.agents.contains(&"InterviewerAgent") && status == RunStatus::WaitingForInput {
        return StepState::Completed;
    }
    if has_event(events, AGENT_FINISHED, phase.agents) {
        return StepState::Completed;
    }
    if has_event(events, AGENT_STARTED, phase.agents) {
        return StepState::Current;
    }
    StepState::Pending
}

/// Derive the displayed progress list from the event log.
///
/// The raw per-phase states can be inconsistent (finish events without a
/// start, skipped phases, out-of-order arrival), so the display applies a
/// smoothing pass: everything before the current index renders completed.
/// The result is approximate progress, not an audit trail.
pub fn derive(events: &[RunEvent], status: RunStatus) -> Progress {
    let raw: Vec<StepState> = PHASES
        .iter()
        .map(|phase| phase_state(phase, events, status))
        .collect();

    let active = raw.iter().position(|s| *s == StepState::Current);
    let last_completed = raw.iter().rposition(|s| *s == StepState::Completed);
    let current = match (active, last_completed) {
        (Some(i), _) => i,
        (None, Some(i)) => i + 1,
        (None, None) => 0,
    };

    let steps = raw
        .iter()
        .enumerate()
        .map(|(i, computed)| {
            if *computed == StepState::Completed || i < current {
                StepState::Completed
            } else if i == current {
                StepState::Current
            } else {
                StepState::Pending
            }
        })
        .collect();

    Progress { steps, current }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RunEvent;

    fn ev(event_type: &str, agent: &str) -> RunEvent {
        RunEvent {
            event_type: event_type.to_string(),
            agent: Some(agent.to_string()),
        }
    }

    fn labels_of(state: StepState, progress: &Progress) -> Vec<&'static str> {
        progress
            .steps
            .iter()
            .zip(PHASES)
            .filter(|(s, _)| **s == state)
            .map(|(_, p)| p.label)
            .collect()
    }

    #[test]
    fn empty_log_starts_at_first_phase() {
        let progress = derive(&[], RunStatus::Running);
        assert_eq!(progress.current, 0);
        assert_eq!(progress.steps[0], StepState::Current);
        assert!(progress.steps[1..].iter().all(|s| *s == StepState::Pending));
    }

    #[test]
    fn started_planner_marks_planning_current_and_assessment_completed() {
        let events = vec![ev(AGENT_STARTED, "PlannerAgent")];
        let progress = derive(&events, RunStatus::Running);
        assert_eq!(PHASES[progress.current].label, "Strategic Planning");
        assert_eq!(progress.steps[0], StepState::Completed);
        assert_eq!(progress.steps[1], StepState::Current);
    }

    #[test]
    fn finished_agent_completes_its_phase_and_advances() {
        let events = vec![
            ev(AGENT_STARTED, "InterviewerAgent"),
            ev(AGENT_FINISHED, "InterviewerAgent"),
        ];
        let progress = derive(&events, RunStatus::Running);
        assert_eq!(PHASES[progress.current].label, "Strategic Planning");
        assert_eq!(labels_of(StepState::Completed, &progress), vec![
            "Initial Assessment"
        ]);
    }

    #[test]
    fn any_agent_of_a_group_completes_the_group_phase() {
        let events = vec![ev(AGENT_FINISHED, "AudienceInsightAgent")];
        let progress = derive(&events, RunStatus::Running);
        assert!(
            labels_of(StepState::Completed, &progress).contains(&"Market Research")
        );
    }

    #[test]
    fn waiting_for_input_forces_interview_phase_completed() {
        // No events at all: the override alone must complete the phase.
        let progress = derive(&[], RunStatus::WaitingForInput);
        assert_eq!(progress.steps[0], StepState::Completed);
    }

    #[test]
    fn no_phase_before_current_renders_non_completed() {
        // Out-of-order log: a late phase finished with nothing before it.
        let events = vec![ev(AGENT_FINISHED, "ExecutionAgent")];
        let progress = derive(&events, RunStatus::Running);
        assert_eq!(PHASES[progress.current].label, "Review & Verdict");
        for step in &progress.steps[..progress.current] {
            assert_eq!(*step, StepState::Completed);
        }
    }

    #[test]
    fn finish_before_start_still_reads_completed() {
        let events = vec![
            ev(AGENT_FINISHED, "PlannerAgent"),
            ev(AGENT_STARTED, "PlannerAgent"),
        ];
        let progress = derive(&events, RunStatus::Running);
        assert_eq!(progress.steps[1], StepState::Completed);
    }

    #[test]
    fn all_finished_leaves_no_current_phase() {
        let events: Vec<RunEvent> = PHASES
            .iter()
            .map(|p| ev(AGENT_FINISHED, p.agents[0]))
            .collect();
        let progress = derive(&events, RunStatus::Running);
        assert_eq!(progress.current, PHASES.len());
        assert!(progress.steps.iter().all(|s| *s == StepState::Completed));
    }

    #[test]
    fn events_without_agents_are_ignored() {
        let events = vec![RunEvent {
            event_type: "RUN_STARTED".to_string(),
            agent: None,
        }];
        let progress = derive(&events, RunStatus::Running);
        assert_eq!(progress.current, 0);
    }
}
