use anyhow::Result;
use console::style;

use crate::core::api::ApiClient;
use crate::core::model::{RunStatus, human_timestamp, sort_newest_first};
use crate::core::terminal::print_info;

fn status_cell(status: RunStatus) -> console::StyledObject<String> {
    let label = format!("{:<17}", status.label());
    match status {
        RunStatus::Completed => style(label).green(),
        RunStatus::Failed => style(label).red(),
        RunStatus::Running | RunStatus::Started => style(label).cyan(),
        _ => style(label).dim(),
    }
}

/// `clarity history` — print past runs to stdout, newest first.
pub async fn run(api: &ApiClient) -> Result<()> {
    let mut runs = api.list_runs().await?;
    sort_newest_first(&mut runs);

    if runs.is_empty() {
        print_info("No analyses yet. Start one with: clarity new --idea \"...\"");
        return Ok(());
    }

    for run in &runs {
        let idea = run.idea_text.as_deref().unwrap_or("Untitled Idea");
        let idea = if idea.chars().count() > 60 {
            let truncated: String = idea.chars().take(59).collect();
            format!("{}…", truncated)
        } else {
            idea.to_string()
        };
        println!(
            " {} {}  {}  {}",
            style(format!("{:<16}", human_timestamp(&run.created_at))).dim(),
            status_cell(run.status),
            style(&run.run_id).dim(),
            idea
        );
    }
    Ok(())
}
