//! aimalign - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use aimalign::aggregate;
use aimalign::checkpoint::{self, OutputLog};
use aimalign::classify::ClassificationDriver;
use aimalign::cli::{Args, Commands, Verbosity};
use aimalign::config::Config;
use aimalign::oracle::{OpenAiClient, RetryManager};
use aimalign::store;
use aimalign::suggest::{self, SuggestionDriver};
use aimalign::types::StageSummary;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let mut config = Config::load(args.config.clone())?;
    if let Some(model) = &args.model {
        config.oracle.classify_model = model.clone();
        config.oracle.suggest_model = model.clone();
    }

    match &args.command {
        Commands::Classify {
            input,
            output,
            save_frequency,
        } => {
            run_classify(args, &config, input, output, *save_frequency).await?;
        }
        Commands::Suggest {
            input,
            output,
            save_frequency,
        } => {
            run_suggest(args, &config, input, output, *save_frequency).await?;
        }
        Commands::Run {
            input,
            classified,
            output,
            save_frequency,
        } => {
            run_classify(args, &config, input, classified, *save_frequency).await?;
            run_suggest(args, &config, classified, output, *save_frequency).await?;
        }
        Commands::Config => show_config(&config),
    }

    Ok(())
}

async fn run_classify(
    args: &Args,
    config: &Config,
    input: &Path,
    output: &Path,
    save_frequency: Option<usize>,
) -> Result<()> {
    // Fatal setup checks happen before any oracle call: credential, input
    // table, and writable output path.
    let api_key = config.api_key()?;
    let records = store::load_outcomes(input, &config.pipeline.placeholder_patterns)?;
    let mut done = checkpoint::completed_classifications(output)?;
    let mut log = OutputLog::open(
        output,
        save_frequency.unwrap_or(config.pipeline.save_frequency),
    )?;

    if args.verbosity().show_progress() {
        println!(
            "Classifying {} outcome records from {} ({} already complete)",
            records.len(),
            input.display(),
            done.len()
        );
    }
    if args.verbosity().show_units() {
        println!(
            "Oracle: {} at {}",
            config.oracle.classify_model, config.oracle.base_url
        );
    }

    let client = OpenAiClient::new(
        &config.oracle.base_url,
        &api_key,
        &config.oracle.classify_model,
        Duration::from_secs(config.oracle.request_timeout_secs),
    )?;
    let driver = ClassificationDriver::new(
        client,
        retry_manager(config),
        Duration::from_millis(config.pipeline.classify_call_spacing_ms),
        config.oracle.classify_temperature,
    );

    let pb = progress_bar(records.len() as u64, args.verbosity());
    let summary = driver.run(&records, &mut done, &mut log, &pb).await?;
    pb.finish_and_clear();

    print_summary("Classification", &summary, output);
    Ok(())
}

async fn run_suggest(
    args: &Args,
    config: &Config,
    input: &Path,
    output: &Path,
    save_frequency: Option<usize>,
) -> Result<()> {
    let api_key = config.api_key()?;
    let rows = store::load_classified(input, &config.pipeline.placeholder_patterns)?;
    let groups = aggregate::group_courses(rows);
    let mut done = checkpoint::completed_suggestions(output)?;
    let mut log = OutputLog::open(
        output,
        save_frequency.unwrap_or(config.pipeline.save_frequency),
    )?;

    let total_units = suggest::unit_count(&groups);
    if args.verbosity().show_progress() {
        println!(
            "Generating suggestions for {} courses, {} units ({} already complete)",
            groups.len(),
            total_units,
            done.len()
        );
    }
    if args.verbosity().show_units() {
        println!(
            "Oracle: {} at {}",
            config.oracle.suggest_model, config.oracle.base_url
        );
    }

    let client = OpenAiClient::new(
        &config.oracle.base_url,
        &api_key,
        &config.oracle.suggest_model,
        Duration::from_secs(config.oracle.request_timeout_secs),
    )?;
    let driver = SuggestionDriver::new(
        client,
        retry_manager(config),
        Duration::from_millis(config.pipeline.suggest_call_spacing_ms),
        config.oracle.suggest_temperature,
        config.oracle.suggest_max_tokens,
    );

    let pb = progress_bar(total_units as u64, args.verbosity());
    let summary = driver.run(&groups, &mut done, &mut log, &pb).await?;
    pb.finish_and_clear();

    print_summary("Suggestion", &summary, output);
    Ok(())
}

fn retry_manager(config: &Config) -> RetryManager {
    RetryManager::with_config(
        config.retry.max_attempts,
        config.retry.base_delay_ms,
        config.retry.max_delay_ms,
    )
}

fn progress_bar(len: u64, verbosity: Verbosity) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );
    pb
}

fn print_summary(stage: &str, summary: &StageSummary, output: &Path) {
    println!("\n{} {}", stage.bold(), "complete".green().bold());
    println!("  Succeeded:        {}", summary.succeeded.to_string().green());
    if summary.failed > 0 {
        println!("  Failed:           {}", summary.failed.to_string().red());
    } else {
        println!("  Failed:           0");
    }
    if summary.skipped_empty > 0 {
        println!("  Empty (no call):  {}", summary.skipped_empty);
    }
    println!("  Already complete: {}", summary.already_done);
    println!("  Output: {}", output.display());
}

fn show_config(config: &Config) {
    println!("\naimalign configuration\n");
    println!("Oracle:");
    println!("  Base URL:        {}", config.oracle.base_url);
    println!("  Classify model:  {}", config.oracle.classify_model);
    println!("  Suggest model:   {}", config.oracle.suggest_model);
    println!("  Key from:        ${}", config.oracle.api_key_env);
    println!();
    println!("Retry:");
    println!("  Max attempts:    {}", config.retry.max_attempts);
    println!(
        "  Backoff:         {}ms base, {}ms cap",
        config.retry.base_delay_ms, config.retry.max_delay_ms
    );
    println!();
    println!("Pipeline:");
    println!(
        "  Call spacing:    {}ms classify, {}ms suggest",
        config.pipeline.classify_call_spacing_ms, config.pipeline.suggest_call_spacing_ms
    );
    println!("  Save frequency:  {}", config.pipeline.save_frequency);
    println!();
}
