use anyhow::{Context, Result};
use chrono::Utc;
use taskflow::cli::commands::{CleanCommand, ConcatCommand, ListCommand, RunCommand, ValidateCommand};
use taskflow::cli::output::*;
use taskflow::cli::{Cli, Command};
use taskflow::core::config::{BatchConfig, TaskReport};
use taskflow::core::Settlement;
use taskflow::execution::Scheduler;
use taskflow::files::{clean_directory, concat_files, delete_directory, list_files};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_plan(cmd).await?,
        Command::Validate(cmd) => validate_plan(cmd)?,
        Command::Concat(cmd) => concat(cmd).await?,
        Command::Clean(cmd) => clean(cmd).await?,
        Command::List(cmd) => list(cmd).await?,
    }

    Ok(())
}

async fn run_plan(cmd: &RunCommand) -> Result<()> {
    let config = BatchConfig::from_file(&cmd.file).context("Failed to load batch plan")?;
    let strategy = config.strategy(cmd.limit);
    let names: Vec<String> = config.tasks.iter().map(|t| t.name.clone()).collect();

    println!(
        "{} Running {} ({} tasks, {})",
        ROCKET,
        style(&config.name).bold(),
        style(names.len()).cyan(),
        format_strategy(strategy)
    );

    let progress = create_progress_bar(names.len());
    let bar = progress.clone();
    let progress_names = names.clone();
    let scheduler = Scheduler::new(strategy).on_progress(move |settlement: &Settlement<TaskReport, String>| {
        bar.println(format_settlement(settlement, &progress_names));
        bar.inc(1);
    });

    let started_at = Utc::now();
    let result = scheduler.run(config.to_tasks()).await;
    progress.finish_and_clear();
    let elapsed = Utc::now().signed_duration_since(started_at);

    match result {
        Ok(reports) => {
            if cmd.json {
                let data = serde_json::json!({
                    "name": config.name,
                    "results": reports,
                    "elapsed_ms": elapsed.num_milliseconds(),
                });
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!(
                    "\n{} {} completed {} in {}ms",
                    CHECK,
                    style(&config.name).bold(),
                    style("successfully").green(),
                    elapsed.num_milliseconds()
                );
                for (index, report) in reports.iter().enumerate() {
                    println!("  {}. {} ({}ms)", index + 1, report.name, report.latency_ms);
                }
            }
            Ok(())
        }
        Err(failure) => {
            if cmd.json {
                let discarded: Vec<_> = failure
                    .discarded
                    .iter()
                    .map(|later| {
                        serde_json::json!({
                            "task": names.get(later.index),
                            "error": format_task_failure(&later.failure),
                        })
                    })
                    .collect();
                let data = serde_json::json!({
                    "name": config.name,
                    "failed": names.get(failure.index),
                    "error": format_task_failure(&failure.failure),
                    "discarded": discarded,
                });
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!(
                    "\n{} {} {}",
                    CROSS,
                    style(&config.name).bold(),
                    style("failed").red()
                );
                println!("{}", format_aggregate_failure(&failure, &names));
            }
            error!("{}", failure);
            std::process::exit(1);
        }
    }
}

fn validate_plan(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating batch plan...", INFO);

    match BatchConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Batch plan is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Tasks: {}", style(config.tasks.len()).cyan());
            println!("  Concurrency: {}", format_strategy(config.strategy(None)));

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

async fn concat(cmd: &ConcatCommand) -> Result<()> {
    match concat_files(&cmd.files, &cmd.output).await {
        Ok(written) => {
            println!(
                "{} Wrote {} bytes from {} file(s) to {}",
                CHECK,
                style(written).cyan(),
                cmd.files.len(),
                style(cmd.output.display()).bold()
            );
            Ok(())
        }
        Err(e) => {
            if let Some(index) = e.file_index() {
                if let Some(path) = cmd.files.get(index) {
                    println!("{} Stopped at {}", WARN, style(path.display()).bold());
                }
            }
            Err(e).context("Concatenation failed")
        }
    }
}

async fn clean(cmd: &CleanCommand) -> Result<()> {
    if cmd.remove {
        delete_directory(&cmd.dir)
            .await
            .with_context(|| format!("Failed to remove {}", cmd.dir.display()))?;
        println!("{} Removed {}", CHECK, style(cmd.dir.display()).bold());
    } else {
        clean_directory(&cmd.dir)
            .await
            .with_context(|| format!("Failed to clean {}", cmd.dir.display()))?;
        println!("{} Cleaned {}", CHECK, style(cmd.dir.display()).bold());
    }
    Ok(())
}

async fn list(cmd: &ListCommand) -> Result<()> {
    let files = list_files(cmd.dir.clone(), cmd.recursive)
        .await
        .with_context(|| format!("Failed to list {}", cmd.dir.display()))?;
    for file in &files {
        println!("{}", file.display());
    }
    Ok(())
}
