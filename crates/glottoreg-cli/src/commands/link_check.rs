//! Best-effort reachability probe for every link URL in the dataset.
//!
//! This is an operational aid, not a correctness gate: one dead link
//! never aborts the batch, and the command is excluded from the
//! pipeline. HEAD first, then a ranged GET for servers that reject HEAD.

use std::time::Duration;

use serde_json::Value;

use glottoreg_core::report::{Report, Violation};
use glottoreg_store::dataset;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::root_commands::LinkCheckArgs;
use crate::commands::shared;

struct Target {
    line: usize,
    resource_id: String,
    url: String,
}

/// Handle `glt link-check`.
pub async fn handle(args: &LinkCheckArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let records = dataset::read_strict(&args.dataset)?;
    let mut targets = Vec::new();
    for record in &records {
        let resource_id = record
            .value
            .get("resource_id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>");
        let Some(links) = record.value.get("links").and_then(Value::as_array) else {
            continue;
        };
        for link in links {
            if let Some(url) = link.get("url").and_then(Value::as_str) {
                targets.push(Target {
                    line: record.line,
                    resource_id: resource_id.to_string(),
                    url: url.to_string(),
                });
            }
        }
    }
    if let Some(limit) = args.limit {
        targets.truncate(limit);
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!("glottoreg/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let mut report = Report::new();
    let checked = targets.len();
    for target in targets {
        match probe(&client, &target.url).await {
            Ok(()) => {
                tracing::debug!(url = %target.url, "link ok");
                if flags.format == OutputFormat::Text && !flags.quiet {
                    println!("ok {}", target.url);
                }
            }
            Err(reason) => report.error(Violation::at_line(
                target.line,
                format!("{}: {}: {reason}", target.resource_id, target.url),
            )),
        }
    }

    if flags.format == OutputFormat::Text && !flags.quiet {
        println!("link-check: {checked} link(s) probed");
    }
    shared::report::finish("link-check", &report, flags.format)
}

/// HEAD, falling back to a 1-byte ranged GET when the server rejects
/// HEAD (400/403/405) or refuses it outright.
async fn probe(client: &reqwest::Client, url: &str) -> Result<(), String> {
    match client.head(url).send().await {
        Ok(resp) if resp.status().is_success() => return Ok(()),
        Ok(resp) if !matches!(resp.status().as_u16(), 400 | 403 | 405) => {
            return Err(format!("HTTP {}", resp.status()));
        }
        Ok(_) | Err(_) => {}
    }

    let resp = client
        .get(url)
        .header(reqwest::header::RANGE, "bytes=0-0")
        .send()
        .await
        .map_err(|error| format!("request failed: {error}"))?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", resp.status()))
    }
}
