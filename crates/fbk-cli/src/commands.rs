use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use fbk_diff::{format_diff_with_context, percent_changed, DiffFormat};
use fbk_sink::{ClientConfig, FeedbackProvider, FeedbackSink};
use fbk_tracker::{TrackerOptions, TrackerSettings};
use fbk_types::{FeedbackPayload, Metadata, Vote};
use serde_json::{json, Value};

use crate::cli::{Cli, Command, DiffArgs, OutputFormat, ReplayArgs, SendArgs};
use crate::replay::{self, PrintSink, ReplayScript};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &cli.output),
        Command::Send(args) => cmd_send(args, &cli.output).await,
        Command::Replay(args) => cmd_replay(args).await,
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn cmd_diff(args: DiffArgs, output: &OutputFormat) -> anyhow::Result<()> {
    print!("{}", render_diff(&args, output)?);
    Ok(())
}

fn render_diff(args: &DiffArgs, output: &OutputFormat) -> anyhow::Result<String> {
    let before = read_json(&args.before)?;
    let after = read_json(&args.after)?;
    let percent = percent_changed(&before, &after);
    let vote = Vote::from_percent_changed(percent);
    let diff = format_diff_with_context(&before, &after, args.format, args.context);

    let mut out = String::new();
    match output {
        OutputFormat::Json => {
            let report = json!({
                "percent_changed": percent,
                "vote": vote,
                "format": args.format,
                "diff": diff,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            let vote_label = match vote {
                Vote::Upvote => vote.as_str().green(),
                Vote::Downvote => vote.as_str().red(),
            };
            let percent = format!("{:.1}%", percent * 100.0);
            writeln!(out, "Changed {} ({})", percent.bold(), vote_label)?;
            if diff.is_empty() {
                writeln!(out, "No changes.")?;
            } else if args.format == DiffFormat::Git {
                for line in diff.lines() {
                    writeln!(out, "{}", paint_diff_line(line))?;
                }
            } else {
                writeln!(out, "{diff}")?;
            }
        }
    }
    Ok(out)
}

fn paint_diff_line(line: &str) -> colored::ColoredString {
    if line.starts_with("@@") {
        line.cyan()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.normal()
    }
}

/// Parse `key=value` pairs; values that are not valid JSON are kept as strings.
fn parse_metadata(pairs: &[String]) -> anyhow::Result<Option<Metadata>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut metadata = Metadata::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("metadata `{pair}` is not key=value"))?;
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        metadata.insert(key.trim().to_string(), value);
    }
    Ok(Some(metadata))
}

async fn cmd_send(args: SendArgs, output: &OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(project) = args.project {
        config.project = project;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key;
    }
    anyhow::ensure!(!config.project.is_empty(), "a project is required (--project or config)");

    let provider = FeedbackProvider::new(config.with_env_fallback())?;

    let mut payload = FeedbackPayload::new(args.session, args.vote)
        .with_metadata(parse_metadata(&args.metadata)?);
    if let Some(explanation) = args.explanation {
        payload = payload.with_explanation(explanation);
    }
    if let Some(correction) = args.correction {
        payload = payload.with_correction(correction);
    }
    if let Some(selection) = args.selection {
        payload = payload.with_selection(selection);
    }
    if let Some(trigger) = args.trigger {
        payload = payload.with_trigger(trigger);
    }

    let session = payload.session_id.clone();
    provider.sink().submit(payload).await?;

    match output {
        OutputFormat::Json => println!(
            "{}",
            json!({"submitted": true, "project": provider.project(), "session": session})
        ),
        OutputFormat::Text => println!(
            "{} Feedback submitted to {} for session {}",
            "✓".green().bold(),
            provider.project().bold(),
            session.yellow()
        ),
    }
    Ok(())
}

async fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let script: ReplayScript = serde_json::from_value(read_json(&args.script)?)
        .with_context(|| format!("invalid replay script {}", args.script.display()))?;

    let settings = match &args.settings {
        Some(path) => TrackerSettings::load(path)?,
        None => TrackerSettings::default(),
    };
    let mut options = TrackerOptions::from_settings(settings);
    if let Some(ms) = args.debounce_ms {
        options.settings.debounce_ms = ms;
    }
    if let Some(format) = args.format {
        options.settings.diff_format = format;
    }
    if args.keep_initial_nullish {
        options.settings.ignore_initial_nullish = false;
    }

    replay::run(script, options, Arc::new(PrintSink)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_pairs() {
        let meta = parse_metadata(&["page=settings".into(), "count=3".into(), "flag=true".into()])
            .unwrap()
            .unwrap();
        assert_eq!(meta["page"], "settings");
        assert_eq!(meta["count"], 3);
        assert_eq!(meta["flag"], true);

        assert!(parse_metadata(&[]).unwrap().is_none());
        assert!(parse_metadata(&["novalue".into()]).is_err());
    }

    fn diff_args(dir: &tempfile::TempDir, before: &Value, after: &Value, format: DiffFormat) -> DiffArgs {
        let before_path = dir.path().join("before.json");
        let after_path = dir.path().join("after.json");
        std::fs::write(&before_path, before.to_string()).unwrap();
        std::fs::write(&after_path, after.to_string()).unwrap();
        DiffArgs {
            before: before_path,
            after: after_path,
            format,
            context: fbk_diff::DEFAULT_CONTEXT_LINES,
        }
    }

    #[test]
    fn diff_json_output_reports_percentage_vote_and_diff() {
        let dir = tempfile::tempdir().unwrap();
        let args = diff_args(&dir, &json!({"a": 1, "b": 2}), &json!({"a": 1, "b": 3}), DiffFormat::Json);

        let out = render_diff(&args, &OutputFormat::Json).unwrap();
        let report: Value = serde_json::from_str(&out).unwrap();
        assert!((report["percent_changed"].as_f64().unwrap() - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(report["vote"], "upvote");
        assert_eq!(report["format"], "json");

        let diff: Value = serde_json::from_str(report["diff"].as_str().unwrap()).unwrap();
        assert_eq!(diff["before"], json!({"a": 1, "b": 2}));
        assert_eq!(diff["after"], json!({"a": 1, "b": 3}));
    }

    #[test]
    fn diff_text_output_for_identical_documents() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let args = diff_args(&dir, &json!([1, 2]), &json!([1, 2]), DiffFormat::Git);

        let out = render_diff(&args, &OutputFormat::Text).unwrap();
        assert_eq!(out, "Changed 0.0% (upvote)\nNo changes.\n");
    }

    #[test]
    fn diff_of_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = diff_args(&dir, &json!(1), &json!(2), DiffFormat::Git);
        args.after = dir.path().join("missing.json");
        let err = render_diff(&args, &OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn diff_lines_are_painted_by_prefix() {
        colored::control::set_override(false);
        assert_eq!(paint_diff_line("+  \"a\": 1").to_string(), "+  \"a\": 1");
        assert_eq!(paint_diff_line("@@ -1,3 +1,3 @@").to_string(), "@@ -1,3 +1,3 @@");
    }
}
