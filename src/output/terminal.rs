// Colored terminal output for the hot-word report.
//
// This module handles all terminal-specific formatting: colors, bars and
// column alignment. The `report` command delegates here.

use colored::Colorize;

use crate::aggregate::time_bucket::TimeDistribution;
use crate::records::LineStats;
use crate::report::categories::CategoryTally;
use crate::report::{CooccurrenceView, DashboardSnapshot, FrequencyView};

/// Widest bar drawn, in cells.
const BAR_WIDTH: usize = 30;

/// Longest keyword shown before truncation.
const MAX_WORD_CHARS: usize = 12;

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.max(1))
}

/// Display the top keywords by weighted heat.
pub fn display_frequency(view: &FrequencyView) {
    if view.keywords.is_empty() {
        println!("No keywords yet. Run `hotwords run` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Top {} Hot Words ===", view.keywords.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<16} {:>6}",
        "Rank".dimmed(),
        "Keyword".dimmed(),
        "Heat".dimmed(),
    );
    println!("  {}", "-".repeat(60).dimmed());

    let max = view.keywords.first().map(|k| k.heat).unwrap_or(0);
    for (i, kw) in view.keywords.iter().enumerate() {
        let word = super::truncate_chars(&kw.word, MAX_WORD_CHARS);
        let heat = bar(kw.heat, max);
        let heat = match i {
            0..=2 => heat.red().bold(),
            3..=9 => heat.yellow(),
            _ => heat.normal(),
        };
        println!("  {:>4}. {:<16} {:>6}  {}", i + 1, word, kw.heat, heat);
    }

    println!();
    println!("  Total heat: {}", view.total_heat.to_string().bold());
}

/// Display the strongest co-occurrence edges.
pub fn display_cooccurrence(view: &CooccurrenceView) {
    println!(
        "\n{}",
        format!("=== Co-occurrence ({} edges) ===", view.edges.len()).bold()
    );
    if view.edges.is_empty() {
        println!("  {}", "No pair appeared together often enough.".dimmed());
        return;
    }
    println!();

    for edge in &view.edges {
        println!(
            "  {:<14} {} {:<14} {:>4}",
            super::truncate_chars(&edge.word1, MAX_WORD_CHARS),
            "<->".dimmed(),
            super::truncate_chars(&edge.word2, MAX_WORD_CHARS),
            edge.count,
        );
    }
}

/// Display the 24-hour distribution, one row per hour.
pub fn display_time_distribution(dist: &TimeDistribution) {
    println!("\n{}", "=== Hourly Distribution ===".bold());
    println!();
    println!(
        "  {:>4}  {:>5}  {:>6}  {}",
        "Hour".dimmed(),
        "Words".dimmed(),
        "Heat".dimmed(),
        "Top keywords".dimmed(),
    );
    println!("  {}", "-".repeat(60).dimmed());

    let max = dist.buckets.iter().map(|b| b.total_heat).max().unwrap_or(0);
    for bucket in &dist.buckets {
        if bucket.total_heat == 0 {
            println!("  {:>4}  {}", bucket.label().dimmed(), "-".dimmed());
            continue;
        }
        let top: Vec<&str> = bucket
            .top_keywords
            .iter()
            .take(3)
            .map(|k| k.word.as_str())
            .collect();
        let label = if bucket.total_heat == max {
            bucket.label().red().bold()
        } else {
            bucket.label().normal()
        };
        println!(
            "  {:>4}  {:>5}  {:>6}  {}",
            label,
            bucket.hot_word_count,
            bucket.total_heat,
            top.join(" "),
        );
    }
}

/// Display the category tally for the top keywords.
pub fn display_categories(tally: &CategoryTally) {
    println!("\n{}", "=== Categories ===".bold());
    println!();
    let max = tally.counts.iter().map(|(_, n)| *n as u64).max().unwrap_or(0);
    for (category, n) in &tally.counts {
        let drawn = if *n == 0 {
            String::new()
        } else {
            bar(*n as u64, max)
        };
        println!("  {}  {:>3}  {}", category.label(), n, drawn.cyan());
    }
}

/// Display the full report.
pub fn display_snapshot(snapshot: &DashboardSnapshot) {
    display_frequency(&snapshot.frequency);
    display_categories(&snapshot.categories);
    display_cooccurrence(&snapshot.cooccurrence);
    match &snapshot.time {
        Some(dist) => display_time_distribution(dist),
        None => println!(
            "\n  {}",
            "No hourly distribution (no history snapshots yet).".dimmed()
        ),
    }
    println!(
        "\n  {}",
        format!("Generated at {}", snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
}

/// One line per stage summarizing how much input was kept.
pub fn display_stage_stats(stage: &str, stats: &LineStats) {
    let skipped = if stats.skipped > 0 {
        stats.skipped.to_string().yellow()
    } else {
        stats.skipped.to_string().normal()
    };
    println!(
        "  {:<14} read {:>6}  emitted {:>6}  skipped {:>5}",
        stage.bold(),
        stats.read,
        stats.emitted,
        skipped,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        // Non-zero values always draw something
        assert_eq!(bar(1, 1000).chars().count(), 1);
        assert!(bar(3, 0).is_empty());
    }
}
