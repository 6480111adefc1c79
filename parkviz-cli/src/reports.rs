use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

use parkviz_core::{BatchOutput, RenderKind, RenderRequest};

fn kind_label(kind: RenderKind) -> &'static str {
    match kind {
        RenderKind::Original => "original",
        RenderKind::Composite => "composite",
        RenderKind::Member => "member",
    }
}

fn tag_text(request: &RenderRequest) -> String {
    [&request.tags.model_tag, &request.tags.model_hint_tag]
        .into_iter()
        .flatten()
        .map(|tag| format!("[{tag}]"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn generate_console_report(
    out: &mut dyn Write,
    output: &BatchOutput,
    written: &[PathBuf],
) -> Result<()> {
    let summary = &output.manifest.summary;
    writeln!(out, "{}", "🌳 Park Result Gallery".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;
    writeln!(out, "Files: {}", summary.files)?;
    writeln!(out, "Parsed: {}", summary.records.to_string().green())?;
    writeln!(out, "Failed: {}", summary.failures.to_string().red())?;
    writeln!(out, "Groups: {}", summary.groups)?;
    writeln!(out, "Images: {}", summary.images)?;
    writeln!(
        out,
        "Threshold: {:.2} (composites {})",
        summary.threshold,
        if summary.composite { "on" } else { "off" }
    )?;
    writeln!(out)?;

    for group in &output.batch.groups {
        writeln!(
            out,
            "{} {} ({})",
            format!("Group {}", group.ordinal).bold(),
            group.group_id.dimmed(),
            group.members.len()
        )?;
        if !group.meta_tag.is_empty() || !group.timestamp.is_empty() {
            writeln!(out, "   Run: {} {}", group.meta_tag, group.timestamp)?;
        }
        for request in output
            .render_requests
            .iter()
            .filter(|request| request.group == group.ordinal)
        {
            let kind = match request.kind {
                RenderKind::Original => kind_label(request.kind).cyan(),
                RenderKind::Composite => kind_label(request.kind).yellow(),
                RenderKind::Member => kind_label(request.kind).normal(),
            };
            writeln!(
                out,
                "   {kind:9} {} {}",
                request.filename,
                tag_text(request).magenta()
            )?;
        }
        writeln!(out)?;
    }

    if !output.failures.is_empty() {
        writeln!(out, "{}", "Failures".bright_red().bold())?;
        for failure in &output.failures {
            writeln!(out, "   • {}: {}", failure.file, failure.reason.red())?;
        }
        writeln!(out)?;
    }

    for path in written {
        writeln!(out, "📁 Wrote {}", path.display())?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, output: &BatchOutput) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&output.manifest)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    output: &BatchOutput,
    written: &[PathBuf],
) -> Result<()> {
    let summary = &output.manifest.summary;
    writeln!(out, "# Park Result Gallery\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Files**: {}", summary.files)?;
    writeln!(out, "- **Parsed**: {}", summary.records)?;
    writeln!(out, "- **Failed**: {}", summary.failures)?;
    writeln!(out, "- **Groups**: {}", summary.groups)?;
    writeln!(out, "- **Images**: {}", summary.images)?;
    writeln!(out, "- **Threshold**: {:.2}\n", summary.threshold)?;

    for group in &output.batch.groups {
        writeln!(out, "## Group {} (`{}`)\n", group.ordinal, group.group_id)?;
        writeln!(out, "| Kind | Image | Removed | Tags |")?;
        writeln!(out, "|------|-------|---------|------|")?;
        for request in output
            .render_requests
            .iter()
            .filter(|request| request.group == group.ordinal)
        {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                kind_label(request.kind),
                request.filename.replace('|', "\\|"),
                request.removal_ids.joined(", "),
                tag_text(request)
            )?;
        }
        writeln!(out)?;
    }

    if !output.failures.is_empty() {
        writeln!(out, "## Failures\n")?;
        for failure in &output.failures {
            writeln!(out, "- `{}`: {}", failure.file, failure.reason)?;
        }
        writeln!(out)?;
    }

    if !written.is_empty() {
        writeln!(out, "## Outputs\n")?;
        for path in written {
            writeln!(out, "- `{}`", path.display())?;
        }
    }
    Ok(())
}
