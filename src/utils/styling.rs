//! Terminal styling for the command-line front end

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};

use crate::config::{BalanceMethod, PipelineConfig, SelectionMethod};
use crate::report::format_duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static SCALES: Emoji<'_, '_> = Emoji("⚖️  ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");

const CARD_WIDTH: usize = 56;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("prepfit").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Class balancing and feature selection for training data").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

fn card_row(content: String) {
    println!("    │ {}", content);
}

/// Print the configuration card
pub fn print_config(input: &Path, target: &str, output: &Path, config: &PipelineConfig) {
    let line = "─".repeat(CARD_WIDTH - 2);
    let balancing = &config.data_balancing;
    let selection = &config.feature_engineering;

    println!("    ┌{}┐", line);
    card_row(format!("{}", style("⚙️  Configuration").cyan().bold()));
    println!("    ├{}┤", line);
    card_row(format!("{}Input:  {}", FOLDER, truncate_path(input, 38)));
    card_row(format!("{}Target: {}", TARGET, truncate_string(target, 38)));
    card_row(format!("{}Output: {}", SAVE, truncate_path(output, 38)));
    println!("    ├{}┤", line);

    let balancing_text = match balancing.method {
        BalanceMethod::None => "none".to_string(),
        BalanceMethod::Smote => format!(
            "smote (keep {:.0}% majority, minority ratio {:.2}, k={})",
            balancing.undersampling_ratio * 100.0,
            balancing.minority_to_majority_ratio,
            balancing.k_neighbors
        ),
    };
    card_row(format!(
        "{}Balancing: {} {}",
        SCALES,
        style(balancing_text).yellow(),
        style(format!("[order {}]", balancing.execution_order)).dim()
    ));

    let selection_text = match selection.method {
        SelectionMethod::None => "none".to_string(),
        SelectionMethod::Correlation => format!(
            "correlation (max {}, threshold {:.2})",
            selection.max_features, selection.multicollinearity_threshold
        ),
    };
    card_row(format!(
        "{}Selection: {} {}",
        LINK,
        style(selection_text).yellow(),
        style(format!("[order {}]", selection.execution_order)).dim()
    ));
    card_row(format!("{}Seed:      {}", DICE, style(config.seed).yellow()));
    println!("    └{}┘", line);
    println!();
}

/// Print a step header
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_info(message: &str) {
    println!("    {}{}", INFO, message);
}

pub fn print_step_time(duration: Duration) {
    println!("    {}", style(format!("⏱  {}", format_duration(duration))).dim());
}

/// Print a styled count, e.g. "Found 35 synthetic rows (k=5)"
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    match detail {
        Some(detail) => println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(detail).dim()
        ),
        None => println!("      Found {} {}", style(count).yellow().bold(), description),
    }
}

/// Print an indented multi-line block, dimmed
pub fn print_block(text: &str) {
    for line in text.lines() {
        println!("      {}", style(line).dim());
    }
}

pub fn print_completion() {
    println!();
    println!(
        "    {}{}",
        ROCKET,
        style("prepfit processing complete!").green().bold()
    );
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

/// Keep the tail of `s` so it fits in `max_len` characters
fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count + 3 - max_len).collect();
        format!("...{}", tail)
    }
}
