//! Terminal summary of a processing run

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{ClassCounts, ProcessedResult, StageKind};

/// Counts and timings shown after a run
#[derive(Debug, Default, Clone)]
pub struct ProcessingSummary {
    pub original_rows: usize,
    pub balanced_rows: usize,
    pub final_rows: usize,
    pub synthetic_rows: usize,
    pub initial_features: usize,
    pub final_features: usize,
    pub classes_before: ClassCounts,
    pub classes_after: ClassCounts,
    pub load_time: Duration,
    pub balancing_time: Duration,
    pub selection_time: Duration,
    pub save_time: Duration,
}

impl ProcessingSummary {
    pub fn new(initial_features: usize, classes_before: ClassCounts) -> Self {
        Self {
            initial_features,
            final_features: initial_features,
            original_rows: classes_before.total(),
            balanced_rows: classes_before.total(),
            final_rows: classes_before.total(),
            classes_before,
            classes_after: classes_before,
            ..Default::default()
        }
    }

    /// Take row, feature and stage-time figures from a finished run
    pub fn record_result(&mut self, result: &ProcessedResult) {
        self.original_rows = result.original_count;
        self.balanced_rows = result.balanced_count;
        self.final_rows = result.table.len();
        self.synthetic_rows = result.balance_stats.map_or(0, |s| s.synthetic);
        self.final_features = result.feature_count();
        self.classes_after = result.table.class_counts();

        for timing in &result.timings {
            match timing.stage {
                StageKind::Balancing => self.balancing_time = timing.duration,
                StageKind::Selection => self.selection_time = timing.duration,
            }
        }
    }

    pub fn set_load_time(&mut self, duration: Duration) {
        self.load_time = duration;
    }

    pub fn set_save_time(&mut self, duration: Duration) {
        self.save_time = duration;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.balancing_time + self.selection_time + self.save_time
    }

    /// Percentage of the label-1 class, before and after
    fn event_rates(&self) -> (f64, f64) {
        let rate = |c: &ClassCounts| {
            if c.total() == 0 {
                0.0
            } else {
                c.ones as f64 / c.total() as f64 * 100.0
            }
        };
        (rate(&self.classes_before), rate(&self.classes_after))
    }

    /// Build the summary table
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Before").add_attribute(Attribute::Bold),
            Cell::new("After").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("Rows"),
            Cell::new(self.original_rows),
            Cell::new(self.final_rows).add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Class 0"),
            Cell::new(self.classes_before.zeros),
            Cell::new(self.classes_after.zeros),
        ]);
        table.add_row(vec![
            Cell::new("Class 1"),
            Cell::new(self.classes_before.ones),
            Cell::new(self.classes_after.ones),
        ]);

        let (rate_before, rate_after) = self.event_rates();
        table.add_row(vec![
            Cell::new("Event rate"),
            Cell::new(format!("{:.1}%", rate_before)),
            Cell::new(format!("{:.1}%", rate_after)).fg(Color::Cyan),
        ]);

        table.add_row(vec![
            Cell::new("Synthetic rows"),
            Cell::new("-"),
            Cell::new(self.synthetic_rows).fg(if self.synthetic_rows == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);

        table.add_row(vec![
            Cell::new("Features"),
            Cell::new(self.initial_features),
            Cell::new(self.final_features)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    fn timing_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
        ]);

        let steps = [
            ("Load", self.load_time),
            ("Data Balancing", self.balancing_time),
            ("Feature Selection", self.selection_time),
            ("Save", self.save_time),
        ];
        for (name, duration) in steps {
            table.add_row(vec![Cell::new(name), Cell::new(format_duration(duration))]);
        }
        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(format_duration(self.total_time())).add_attribute(Attribute::Bold),
        ]);
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PROCESSING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }

        println!();
        for line in self.timing_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}

/// Human-friendly duration: milliseconds below one second, seconds otherwise
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}
