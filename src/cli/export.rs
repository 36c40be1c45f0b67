use anyhow::{Context, Result};

use crate::core::api::ApiClient;
use crate::core::terminal::print_link;

/// `clarity export <run_id>` — hand the markdown export URL to the browser.
/// The report body itself is never fetched by the client.
pub fn run(api: &ApiClient, run_id: &str) -> Result<()> {
    let url = api.export_markdown_url(run_id);
    print_link("Markdown export", &url);
    open::that(&url).with_context(|| format!("Failed to open {}", url))?;
    Ok(())
}
