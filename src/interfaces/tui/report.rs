use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::core::model::{ClarityReport, ScoreDetail, Verdict};

/// Fixed verdict → colour mapping, neutral for anything unexpected.
pub fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Pursue => Color::Green,
        Verdict::Kill => Color::Red,
        Verdict::Pivot => Color::Yellow,
        Verdict::Unknown => Color::DarkGray,
    }
}

pub fn verdict_icon(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pursue => "✔",
        Verdict::Kill => "✘",
        Verdict::Pivot => "⚠",
        Verdict::Unknown => "·",
    }
}

/// A 20-cell confidence meter plus the percentage, e.g. `▰▰▰▰…▱ 72% confidence`.
pub fn confidence_bar(confidence: f64) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * 20.0).round() as usize;
    let bar: String = "▰".repeat(filled) + &"▱".repeat(20 - filled);
    format!("{} {:.0}% confidence", bar, confidence.clamp(0.0, 1.0) * 100.0)
}

fn header(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn sub_header(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    ))
}

fn bullet(text: &str) -> Line<'static> {
    Line::from(format!("  • {}", text))
}

fn numbered(i: usize, text: &str) -> Line<'static> {
    Line::from(format!("  {:>2}. {}", i + 1, text))
}

fn body(text: &str) -> Line<'static> {
    Line::from(format!("  {}", text))
}

fn score_lines(label: &str, detail: &ScoreDetail) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(
                format!("  {:<24}", label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{:.1}/10", detail.score),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(Span::styled(
            format!("    {}", detail.reasoning),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

/// Render a report to styled text. Pure: no state, no side effects — the
/// caller owns scrolling and layout.
pub fn report_lines(report: &ClarityReport) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    let recommendation = &report.recommendation;
    let color = verdict_color(recommendation.verdict);

    // Verdict banner
    lines.push(Line::from(vec![
        Span::styled(
            format!(" {} ", verdict_icon(recommendation.verdict)),
            Style::default().fg(color),
        ),
        Span::styled(
            format!("Final Verdict: {}", recommendation.verdict.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!("   {}", confidence_bar(recommendation.confidence)),
        Style::default().fg(color),
    )));
    lines.push(body(&recommendation.rationale));
    lines.push(Line::from(""));

    if let Some(scores) = &recommendation.scores {
        lines.push(header("Scores", Color::Cyan));
        lines.extend(score_lines("Market Demand", &scores.market_demand));
        lines.extend(score_lines(
            "Competitive Advantage",
            &scores.competitive_advantage,
        ));
        lines.extend(score_lines(
            "Technical Feasibility",
            &scores.technical_feasibility,
        ));
        lines.extend(score_lines("Business Viability", &scores.business_viability));
        lines.push(Line::from(""));
    }

    lines.push(header("Idea Overview", Color::Magenta));
    lines.push(Line::from(Span::styled(
        format!("  {}", report.idea.title),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(body(&report.idea.one_liner));
    lines.push(body(&report.idea.expanded_summary));
    if !report.idea.assumptions.is_empty() {
        lines.push(sub_header("  Assumptions"));
        for assumption in &report.idea.assumptions {
            lines.push(bullet(assumption));
        }
    }
    lines.push(Line::from(""));

    lines.push(header("Audience", Color::Blue));
    lines.push(sub_header("  Primary Users"));
    for user in &report.audience.primary_users {
        lines.push(bullet(user));
    }
    lines.push(sub_header("  Jobs To Be Done"));
    for job in &report.audience.jobs_to_be_done {
        lines.push(bullet(job));
    }
    if !report.audience.personas.is_empty() {
        lines.push(sub_header("  Personas"));
        for persona in &report.audience.personas {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", persona.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("({})", persona.role),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            if !persona.pain_points.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    \"{}\"", persona.pain_points),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }
    lines.push(Line::from(""));

    lines.push(header("Market & Competition", Color::Magenta));
    lines.push(sub_header("  Key Competitors"));
    for competitor in &report.market.competitors {
        lines.push(bullet(competitor));
    }
    lines.push(sub_header("  Demand Signals"));
    for signal in &report.market.demand_signals {
        lines.push(bullet(signal));
    }
    lines.push(sub_header("  Positioning"));
    lines.push(body(&report.market.positioning));
    lines.push(Line::from(""));

    lines.push(header("Risks & Mitigation", Color::Yellow));
    for (i, risk) in report.risks.top_risks.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled("  ⚠ ", Style::default().fg(Color::Yellow)),
            Span::from(risk.clone()),
        ]));
        // Mitigations pair positionally with risks; a missing one is fine.
        if let Some(mitigation) = report.risks.mitigations.get(i) {
            lines.push(Line::from(Span::styled(
                format!("    Mitigation: {}", mitigation),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines.push(Line::from(""));

    lines.push(header("Execution Plan", Color::Green));
    lines.push(sub_header("  MVP Scope"));
    for feature in &report.execution.mvp_scope {
        lines.push(bullet(feature));
    }
    lines.push(sub_header("  2-Week Plan"));
    for (i, step) in report.execution.two_week_plan.iter().enumerate() {
        lines.push(numbered(i, step));
    }
    lines.push(sub_header("  2-Month Plan"));
    for (i, step) in report.execution.two_month_plan.iter().enumerate() {
        lines.push(numbered(i, step));
    }
    lines.push(Line::from(""));

    if let Some(evaluation) = &report.interview_evaluation {
        lines.push(header("Interview Analysis", Color::Cyan));
        lines.push(body(&evaluation.summary));
        for item in &evaluation.evaluations {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  Q: {}", item.question_text),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("  A: \"{}\"", item.answer_text),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(body(&item.analysis));
            for suggestion in &item.suggestions {
                lines.push(Line::from(Span::styled(
                    format!("    ✦ {}", suggestion),
                    Style::default().fg(Color::Blue),
                )));
            }
            for concern in &item.concerns {
                lines.push(Line::from(Span::styled(
                    format!("    ⚠ {}", concern),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    if !report.sources.is_empty() {
        lines.push(header("Sources & References", Color::DarkGray));
        for source in &report.sources {
            lines.push(Line::from(Span::styled(
                format!("  {} — {}", source.title, source.url),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{
        Audience, ClarityReport, Execution, Idea, Market, Recommendation, ReportMeta, Risks,
    };

    fn sample_report() -> ClarityReport {
        ClarityReport {
            meta: ReportMeta {
                run_id: "abc123".to_string(),
                created_at: "2026-03-01T10:00:00".to_string(),
                model: "test-model".to_string(),
                version: Some("0.1".to_string()),
            },
            idea: Idea {
                title: "CampKit".to_string(),
                one_liner: "Rent high-end camping gear".to_string(),
                expanded_summary: "A marketplace for camping gear.".to_string(),
                assumptions: vec![],
            },
            audience: Audience {
                primary_users: vec!["Weekend campers".to_string()],
                jobs_to_be_done: vec!["Avoid buying gear".to_string()],
                personas: vec![],
            },
            market: Market {
                demand_signals: vec!["Rising search volume".to_string()],
                competitors: vec!["REI rentals".to_string()],
                positioning: "Premium gear, zero ownership.".to_string(),
            },
            risks: Risks {
                top_risks: vec!["Seasonality".to_string(), "Logistics cost".to_string()],
                mitigations: vec!["Off-season storage partnerships".to_string()],
            },
            execution: Execution {
                mvp_scope: vec!["Listings".to_string()],
                two_week_plan: vec!["Landing page".to_string()],
                two_month_plan: vec!["First 100 rentals".to_string()],
            },
            recommendation: Recommendation {
                verdict: Verdict::Pursue,
                confidence: 0.8,
                scores: None,
                rationale: "Strong demand signals.".to_string(),
            },
            interview_evaluation: None,
            sources: vec![],
        }
    }

    fn rendered_text(report: &ClarityReport) -> String {
        report_lines(report)
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn verdict_mapping_is_fixed_three_way_with_neutral_default() {
        assert_eq!(verdict_color(Verdict::Pursue), Color::Green);
        assert_eq!(verdict_color(Verdict::Kill), Color::Red);
        assert_eq!(verdict_color(Verdict::Pivot), Color::Yellow);
        assert_eq!(verdict_color(Verdict::Unknown), Color::DarkGray);
    }

    #[test]
    fn confidence_bar_is_twenty_cells_plus_percent() {
        let bar = confidence_bar(0.8);
        assert!(bar.starts_with(&"▰".repeat(16)));
        assert!(bar.contains("80% confidence"));
        assert_eq!(confidence_bar(0.0).matches('▱').count(), 20);
        assert_eq!(confidence_bar(1.0).matches('▰').count(), 20);
        // Out-of-range values clamp instead of panicking.
        assert_eq!(confidence_bar(1.7).matches('▰').count(), 20);
    }

    #[test]
    fn report_renders_every_section_in_order() {
        let text = rendered_text(&sample_report());
        let sections = [
            "Final Verdict: PURSUE",
            "Idea Overview",
            "Audience",
            "Market & Competition",
            "Risks & Mitigation",
            "Execution Plan",
        ];
        let mut last = 0;
        for section in sections {
            let at = text[last..]
                .find(section)
                .unwrap_or_else(|| panic!("missing section {section:?}"));
            last += at;
        }
    }

    #[test]
    fn missing_mitigations_do_not_invent_lines() {
        let text = rendered_text(&sample_report());
        assert_eq!(text.matches("Mitigation:").count(), 1);
        assert!(text.contains("Seasonality"));
        assert!(text.contains("Logistics cost"));
    }

    #[test]
    fn optional_sections_render_only_when_present() {
        let report = sample_report();
        let text = rendered_text(&report);
        assert!(!text.contains("Scores"));
        assert!(!text.contains("Sources & References"));
        assert!(!text.contains("Interview Analysis"));
    }
}
