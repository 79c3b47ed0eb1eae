//! pdfbuilder - Assemble one PDF from PDF pages and images.
//!
//! Command-line front end: build, list, preview and an interactive session.

mod cli;

use clap::Parser;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::{BuildArgs, Cli, Commands, ListArgs, PreviewArgs, SessionArgs};
use pdfbuilder::collection::{AddReport, PageCollection};
use pdfbuilder::config::{Config, OverwriteMode};
use pdfbuilder::error::{BuilderError, Result};
use pdfbuilder::output::{
    OutputFormatter, ProgressBar, ProgressStyle, display_add_report, display_export_summary,
    display_outcome,
};
use pdfbuilder::render::Previewer;
use pdfbuilder::session::{Command, Outcome, Session};
use pdfbuilder::source::PageSource;
use pdfbuilder::utils::expand_inputs;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(verbose_requested(&cli.command));

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

fn verbose_requested(command: &Commands) -> bool {
    match command {
        Commands::Build(args) => args.verbose,
        Commands::Session(args) => args.verbose,
        Commands::List(_) | Commands::Preview(_) => false,
    }
}

/// Library diagnostics go through `log`; `RUST_LOG` overrides the default.
fn init_logging(verbose: bool) {
    let default = if verbose { "pdfbuilder=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build(args) => run_build(args).await,
        Commands::List(args) => run_list(args).await,
        Commands::Preview(args) => run_preview(args).await,
        Commands::Session(args) => run_session(args).await,
    }
}

/// Expand inputs and add them to `collection`, with a progress bar.
async fn add_inputs(
    collection: &mut PageCollection,
    inputs: &[PathBuf],
    formatter: &OutputFormatter,
) -> Result<AddReport> {
    let paths = expand_inputs(inputs)?;
    formatter.debug(&format!("{} file(s) after expanding inputs", paths.len()));

    let mut progress = if formatter.should_print() && paths.len() > 1 {
        ProgressBar::new(paths.len(), ProgressStyle::Bar)
    } else {
        ProgressBar::disabled()
    };
    progress.set_message("Adding files");

    let report = collection
        .add_paths_with_progress(&paths, |done, _| progress.update(done))
        .await;
    progress.finish();

    report
}

async fn run_build(args: BuildArgs) -> Result<()> {
    let inputs = args.get_all_inputs().await?;
    let config = args.to_config(inputs)?;
    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfbuilder::NAME, pdfbuilder::VERSION));
        formatter.blank_line();
    }

    let mut session = Session::from_config(&config);
    let mut report = add_inputs(session.collection_mut(), &config.inputs, &formatter).await?;
    display_add_report(&formatter, &report);
    apply_edits(&mut session, &config.edits, &formatter, &mut report).await?;

    if session.collection().is_empty() {
        return Err(report
            .rejected
            .into_iter()
            .next()
            .unwrap_or(BuilderError::NothingToExport));
    }

    if config.dry_run {
        formatter.section("Pages");
        formatter.page_list(&session.collection().labels(), None);
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        formatter.info("  Run without --dry-run to create the PDF");
        return Ok(());
    }

    let mode = handle_output_overwrite(&config, &formatter).await?;
    let mut session = session.with_overwrite_mode(mode);

    formatter.info(&format!("Writing to: {}", config.output.display()));
    let outcome = session.save(&config.output).await?;
    if let Outcome::Saved { export, write } = &outcome {
        display_export_summary(&formatter, export, write);
    }

    Ok(())
}

/// Apply `--edit` commands in order, showing what each one did.
///
/// Files rejected by `add` edits are appended to `report`.
async fn apply_edits(
    session: &mut Session,
    edits: &[Command],
    formatter: &OutputFormatter,
    report: &mut AddReport,
) -> Result<()> {
    for edit in edits {
        formatter.debug(&format!("Applying '{edit}'"));
        let outcome = session.apply(edit.clone()).await?;
        display_outcome(formatter, &outcome, session.collection().selected());

        if let Outcome::Added(added) = outcome {
            report.added += added.added;
            report.rejected.extend(added.rejected);
        }
    }
    Ok(())
}

/// One row of `list --json`.
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    position: usize,
    label: &'a str,
    #[serde(flatten)]
    source: &'a PageSource,
}

async fn run_list(args: ListArgs) -> Result<()> {
    let formatter = OutputFormatter::quiet();
    let mut collection = PageCollection::new();
    let report = add_inputs(&mut collection, &args.inputs, &formatter).await?;
    for error in &report.rejected {
        formatter.warning(&format!("Skipped: {error}"));
    }

    if args.json {
        let entries: Vec<ListEntry<'_>> = collection
            .iter()
            .enumerate()
            .map(|(i, entry)| ListEntry {
                position: i + 1,
                label: &entry.label,
                source: &entry.source,
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| BuilderError::other(format!("Failed to encode JSON: {e}")))?;
        println!("{json}");
    } else {
        formatter.page_list(&collection.labels(), None);
    }

    match report.rejected.into_iter().next() {
        Some(first) if collection.is_empty() => Err(first),
        _ => Ok(()),
    }
}

async fn run_preview(args: PreviewArgs) -> Result<()> {
    let formatter = OutputFormatter::new(args.quiet, false);
    let layout = args.layout()?;

    let mut session = Session::default().with_previewer(Previewer::new(layout));
    let report = add_inputs(session.collection_mut(), &args.inputs, &formatter).await?;
    display_add_report(&formatter, &report);

    let outcome = session.write_previews(&args.out_dir).await?;
    display_outcome(&formatter, &outcome, None);

    if let Some(strip) = &args.strip {
        let outcome = session.write_strip(strip).await?;
        display_outcome(&formatter, &outcome, None);
    }
    Ok(())
}

async fn run_session(args: SessionArgs) -> Result<()> {
    let formatter = OutputFormatter::new(false, args.verbose);
    let options = args.export.export_options()?;
    let mut session = Session::new(options).with_overwrite_mode(args.export.overwrite_mode());

    if !args.inputs.is_empty() {
        let report = add_inputs(session.collection_mut(), &args.inputs, &formatter).await?;
        display_add_report(&formatter, &report);
    }

    let interactive = std::io::stdin().is_terminal();
    if interactive {
        formatter.info("Type 'help' for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        if interactive {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match session.execute_line(&line).await {
            Ok(Some(Outcome::Quit)) => break,
            Ok(Some(outcome)) => {
                display_outcome(&formatter, &outcome, session.collection().selected());
            }
            Ok(None) => {}
            Err(err) => formatter.error(&err.to_string()),
        }
    }

    Ok(())
}

/// Decide whether the output may be written, asking the user if needed.
///
/// Returns the mode to write with.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<OverwriteMode> {
    if !output_exists(&config.output).await {
        return Ok(config.overwrite_mode);
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(OverwriteMode::Force),
        OverwriteMode::NoClobber => Err(BuilderError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() || !std::io::stdin().is_terminal() {
                return Err(BuilderError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            let mut stdout = tokio::io::stdout();
            stdout.write_all(b"Overwrite? [y/N]: ").await?;
            stdout.flush().await?;

            let mut response = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut response)
                .await
                .map_err(|err| BuilderError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(OverwriteMode::Force),
                _ => Err(BuilderError::Cancelled),
            }
        }
    }
}

async fn output_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_config(output: PathBuf, mode: OverwriteMode) -> Config {
        let mut config = Config::new(vec![PathBuf::from("a.png")], output);
        config.overwrite_mode = mode;
        config
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config(dir.path().join("new.pdf"), OverwriteMode::Prompt);

        let mode = handle_output_overwrite(&config, &OutputFormatter::quiet())
            .await
            .unwrap();
        assert_eq!(mode, OverwriteMode::Prompt);
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_force() {
        let existing = NamedTempFile::new().unwrap();
        let config = test_config(existing.path().to_path_buf(), OverwriteMode::Force);

        let mode = handle_output_overwrite(&config, &OutputFormatter::quiet())
            .await
            .unwrap();
        assert_eq!(mode, OverwriteMode::Force);
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_no_clobber() {
        let existing = NamedTempFile::new().unwrap();
        let config = test_config(existing.path().to_path_buf(), OverwriteMode::NoClobber);

        let result = handle_output_overwrite(&config, &OutputFormatter::quiet()).await;
        assert!(matches!(result, Err(BuilderError::OutputExists { .. })));
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_prompt_when_quiet() {
        let existing = NamedTempFile::new().unwrap();
        let config = test_config(existing.path().to_path_buf(), OverwriteMode::Prompt);

        let result = handle_output_overwrite(&config, &OutputFormatter::quiet()).await;
        assert!(matches!(result, Err(BuilderError::OutputExists { .. })));
    }

    #[tokio::test]
    async fn test_apply_edits_collects_rejected_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.png");
        let edits = vec![
            Command::Add(vec![missing]),
            Command::Reset,
        ];

        let mut session = Session::default();
        session.collection_mut().push(PageSource::image("a.png"));
        let mut report = AddReport::default();

        apply_edits(&mut session, &edits, &OutputFormatter::quiet(), &mut report)
            .await
            .unwrap();

        assert_eq!(report.added, 0);
        assert_eq!(report.rejected.len(), 1);
        assert!(matches!(report.rejected[0], BuilderError::FileNotFound { .. }));
        assert!(session.collection().is_empty());
    }

    #[test]
    fn test_list_entry_json() {
        let source = PageSource::pdf_page("doc.pdf", 1);
        let entry = ListEntry {
            position: 2,
            label: "doc.pdf-2",
            source: &source,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["position"], 2);
        assert_eq!(json["kind"], "pdf_page");
        assert_eq!(json["index"], 1);
    }
}
