//! prepfit: class balancing and feature selection CLI
//!
//! Loads a CSV or Parquet dataset, runs the balancing and selection stages in
//! configured order, and writes the processed dataset plus a JSON run report.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use prepfit::cli::{confirm_step, prompt_target_mapping, select_target_column, Cli};
use prepfit::pipeline::{
    analyze_target_column, dataframe_to_table, get_column_names, load_dataset, save_dataset,
    table_to_dataframe, DatasetStats, PipelineCoordinator, TargetAnalysis,
};
use prepfit::report::{export_run_report, ProcessingSummary, RunReport};
use prepfit::utils::{
    abandon_spinner, create_spinner, finish_with_success, print_banner, print_block,
    print_completion, print_config, print_count, print_info, print_step_header,
    print_step_time, print_success,
};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,prepfit=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.resolve_config()?;
    let input = cli.input.clone();
    let output_path = cli.output_path();
    let report_path = cli.report_path();

    let target = match &cli.target {
        Some(target) => target.clone(),
        None if cli.no_confirm => anyhow::bail!(
            "Target column is required when using --no-confirm. Use -t/--target to specify."
        ),
        None => select_target_column(&get_column_names(&input)?)?,
    };

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&input, &target, &output_path, &config);

    if !cli.no_confirm && !confirm_step("Proceed with these settings?")? {
        println!("Cancelled by user.");
        return Ok(());
    }

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let df = match load_dataset(&input, cli.infer_schema_length) {
        Ok(df) => df,
        Err(err) => {
            abandon_spinner(&spinner);
            return Err(err);
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let stats = DatasetStats::of(&df);
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", stats.rows);
    println!("      Columns: {}", stats.columns);
    println!("      Estimated memory: {:.2} MB", stats.memory_mb);

    let mut mapping = cli.target_mapping()?;
    if mapping.is_none() && !cli.no_confirm {
        if let TargetAnalysis::NeedsMapping { unique_values } = analyze_target_column(&df, &target)? {
            print_info(&format!(
                "Target '{}' is not binary 0/1, choose the event value",
                target
            ));
            mapping = Some(prompt_target_mapping(&unique_values)?);
        }
    }

    let table = dataframe_to_table(&df, &target, cli.feature_list(), mapping.as_ref())?;
    drop(df);

    let classes = table.class_counts();
    print_success(&format!(
        "{} feature(s), {} row(s) (class 0: {}, class 1: {})",
        table.n_features(),
        table.len(),
        classes.zeros,
        classes.ones
    ));

    let mut summary = ProcessingSummary::new(table.n_features(), classes);
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Balancing and selection
    let coordinator = PipelineCoordinator::new(config.clone())?;
    let [first, second] = coordinator.stage_order();
    print_step_header(2, &format!("{} → {}", first, second));

    let step_start = Instant::now();
    let spinner = create_spinner("Processing...");
    let result = match coordinator.run(table) {
        Ok(result) => result,
        Err(err) => {
            abandon_spinner(&spinner);
            return Err(err.into());
        }
    };
    finish_with_success(&spinner, "Processing complete");
    summary.record_result(&result);

    match result.balance_stats {
        Some(stats) => print_count(
            "synthetic row(s) needed",
            stats.synthetic,
            Some(&format!(
                "(minority label {}, majority kept {} of {})",
                stats.minority_label, stats.undersampled_majority, stats.original_majority
            )),
        ),
        None => print_info("Data balancing disabled"),
    }

    println!();
    print_block(&result.selection_report.to_string());
    print_step_time(step_start.elapsed());

    // Step 3: Save results
    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    let saved = table_to_dataframe(&result.table, &target)
        .and_then(|mut output_df| save_dataset(&mut output_df, &output_path));
    if let Err(err) = saved {
        abandon_spinner(&spinner);
        return Err(err);
    }
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
    let save_elapsed = step_start.elapsed();
    summary.set_save_time(save_elapsed);
    print_step_time(save_elapsed);

    let report = RunReport::new(&input, &output_path, &target, &config, &result, &summary);
    export_run_report(&report, &report_path)?;
    print_success(&format!("Run report written to {}", report_path.display()));

    summary.display();
    print_completion();

    Ok(())
}
