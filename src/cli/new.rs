use anyhow::{Result, bail};

use crate::core::api::ApiClient;
use crate::core::terminal::print_success;
use crate::interfaces::tui::App;

pub(crate) fn parse_idea_arg(args: &[String], start: usize) -> Option<String> {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--idea" | "-i" => return args.get(i + 1).cloned(),
            _ => i += 1,
        }
    }
    None
}

/// `clarity new --idea <text>` — start a run and drop straight into the TUI
/// on its run view.
pub async fn run(api: ApiClient, args: &[String]) -> Result<()> {
    let Some(idea) = parse_idea_arg(args, 2) else {
        bail!("Usage: clarity new --idea \"<your startup idea>\"");
    };
    if idea.trim().is_empty() {
        bail!("The idea text is empty");
    }

    let run_id = api.start_analysis(&idea).await?;
    print_success(&format!("Analysis started: {}", run_id));

    App::watch(api, run_id).run_tui().await
}

#[cfg(test)]
mod tests {
    use super::parse_idea_arg;

    #[test]
    fn reads_long_and_short_idea_flags() {
        let long: Vec<String> = ["clarity", "new", "--idea", "a marketplace"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parse_idea_arg(&long, 2).as_deref(), Some("a marketplace"));

        let short: Vec<String> = ["clarity", "new", "-i", "a marketplace"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parse_idea_arg(&short, 2).as_deref(), Some("a marketplace"));

        let none: Vec<String> = ["clarity", "new"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_idea_arg(&none, 2), None);
    }
}
