//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

use crate::pipeline::TargetMapping;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Let the user pick the label column
pub fn select_target_column(columns: &[String]) -> Result<String> {
    if columns.is_empty() {
        anyhow::bail!("Dataset has no columns to choose a target from");
    }
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select the target (label) column")
        .items(columns)
        .default(columns.len() - 1)
        .interact()?;
    Ok(columns[index].clone())
}

/// Ask which label values mean event (1) and non-event (0)
pub fn prompt_target_mapping(unique_values: &[String]) -> Result<TargetMapping> {
    if unique_values.len() < 2 {
        anyhow::bail!(
            "Target column needs at least two distinct values, found {}",
            unique_values.len()
        );
    }

    let theme = ColorfulTheme::default();
    let event = Select::with_theme(&theme)
        .with_prompt("Which value represents the EVENT (1)?")
        .items(unique_values)
        .default(0)
        .interact()?;

    let remaining: Vec<&String> = unique_values
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != event)
        .map(|(_, v)| v)
        .collect();
    let non_event = Select::with_theme(&theme)
        .with_prompt("Which value represents the NON-EVENT (0)?")
        .items(&remaining)
        .default(0)
        .interact()?;

    Ok(TargetMapping::new(
        unique_values[event].clone(),
        remaining[non_event].clone(),
    ))
}
