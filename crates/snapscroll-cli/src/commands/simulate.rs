use std::path::Path;

use anyhow::{Context, Result};

use snapscroll_core::script::{run_script, Script, TraceRecord};
use snapscroll_core::AppConfig;

pub async fn run(config: &AppConfig, path: &Path, json: bool) -> Result<()> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading script {}", path.display()))?;
    let script = Script::parse(&source)?;

    tracing::info!(steps = script.steps.len(), sections = script.sections.len(), "Running script");
    let trace = run_script(config, &script)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        for record in &trace {
            println!("{}", format_record(record));
        }
    }
    Ok(())
}

fn format_record(record: &TraceRecord) -> String {
    let mut flags = Vec::new();
    if record.snapping {
        flags.push("snapping");
    }
    if record.suppress_input {
        flags.push("suppressed");
    }
    if record.snapped_to_end {
        flags.push("end");
    }

    let mut line = format!(
        "{:>6}ms  {:<20} {:<8} section {} top {:>7.1}",
        record.at_ms, record.step, record.lifecycle, record.current_index, record.container_top
    );
    if let Some(disposition) = &record.disposition {
        line.push_str(&format!("  [{}]", disposition));
    }
    if !flags.is_empty() {
        line.push_str(&format!("  {}", flags.join(",")));
    }
    if !record.events.is_empty() {
        line.push_str(&format!("  <{}>", record.events.join("; ")));
    }
    line
}
