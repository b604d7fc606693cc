//! Output formatting for CLI

use crate::{pipeline::RunResult, q_learning::SavedAgent};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

pub fn print_run_result(result: &RunResult) {
    print_stats_table(&[
        ("Episodes", format_number(result.episodes)),
        ("Wins", format_number(result.wins)),
        ("Win ratio", format!("{:.4}", result.win_rate)),
        ("Steps", format_number(result.total_steps)),
        ("Mean reward", format!("{:.4}", result.mean_reward)),
    ]);
}

pub fn print_saved_agent(saved: &SavedAgent) {
    let metadata = &saved.metadata;
    print_stats_table(&[
        ("Format version", saved.version.to_string()),
        ("Agent", saved.kind.to_string()),
        ("Actions", saved.n_actions.to_string()),
        ("Stored states", format_number(saved.table_len())),
        ("Episodes trained", format_number(metadata.episodes_trained)),
        (
            "Environment",
            metadata.environment.clone().unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Last seed",
            metadata
                .seed
                .map_or_else(|| "-".to_string(), |seed| seed.to_string()),
        ),
        (
            "Saved at",
            metadata.saved_at.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
