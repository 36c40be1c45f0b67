mod export;
mod history;
mod new;

use anyhow::{Context, Result, bail};

use crate::core::api::{ApiClient, DEFAULT_API_URL};
use crate::core::terminal::{self, GuideSection, print_error};
use crate::interfaces::tui::App;

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Analysis")
        .command("tui", "Open the interactive terminal UI (default)")
        .command("new", "Start an analysis (--idea <text>) and watch it")
        .command("watch", "Watch an existing run (watch <run_id>)")
        .print();

    GuideSection::new("Results")
        .command("history", "List past analyses, newest first")
        .command("export", "Open the markdown export (export <run_id>)")
        .print();

    GuideSection::new("Options")
        .command("--api-url", "Backend base URL (or CLARITY_API_URL)")
        .print();

    println!(
        " {} {} <command> [args]\n",
        console::style("Usage:").bold(),
        console::style("clarity").green()
    );
}

/// Extract `--api-url <url>` from anywhere in the argument list, falling back
/// to the environment and then the default. Returns the resolved URL and the
/// remaining positional arguments.
pub(crate) fn resolve_api_url(
    args: &[String],
    env_url: Option<String>,
) -> Result<(String, Vec<String>)> {
    let mut rest = Vec::new();
    let mut from_flag: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--api-url" {
            let Some(value) = args.get(i + 1) else {
                bail!("--api-url requires a value");
            };
            from_flag = Some(value.clone());
            i += 2;
        } else {
            rest.push(args[i].clone());
            i += 1;
        }
    }

    let raw = from_flag
        .or(env_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    url::Url::parse(&raw).with_context(|| format!("Invalid backend URL: {}", raw))?;
    Ok((raw, rest))
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (api_url, args) = resolve_api_url(&args, std::env::var("CLARITY_API_URL").ok())?;
    let api = ApiClient::new(api_url);

    if let Err(e) = crate::logging::init() {
        // Logging is best-effort; the client still works without a log file.
        print_error(&format!("Logging disabled: {:#}", e));
    }

    match args.get(1).map(String::as_str) {
        None | Some("tui") => App::new(api).run_tui().await,
        Some("new") => new::run(api, &args).await,
        Some("watch") => {
            let Some(run_id) = args.get(2) else {
                bail!("Usage: clarity watch <run_id>");
            };
            App::watch(api, run_id.clone()).run_tui().await
        }
        Some("history") => history::run(&api).await,
        Some("export") => {
            let Some(run_id) = args.get(2) else {
                bail!("Usage: clarity export <run_id>");
            };
            export::run(&api, run_id)
        }
        Some("help" | "--help" | "-h") => {
            print_help();
            Ok(())
        }
        Some(other) => {
            print_help();
            bail!("Unknown command: {}", other)
        }
    }
}
