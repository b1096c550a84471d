//! Human-readable output.

use std::fmt::Write;

use weather_core::{CurrentConditions, DailySummary, LocationRecord, model::Units};

/// Capitalize the first letter of every word.
fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn degrees(value: f64, units: Units) -> String {
    // Adding zero turns -0 into 0.
    format!("{}{}", value.round() + 0.0, units.temperature_suffix())
}

pub fn current(current: &CurrentConditions, units: Units) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", current.name);
    let _ = writeln!(out, "  {} [{}]", capitalize(&current.description), current.icon);
    let _ = writeln!(out, "  {}", degrees(current.temp, units));
    let _ = write!(
        out,
        "  Max: {} | Min: {}",
        degrees(current.temp_max, units),
        degrees(current.temp_min, units),
    );
    out
}

pub fn forecast(days: &[DailySummary], units: Units) -> String {
    if days.is_empty() {
        return "No forecast available.".to_string();
    }

    let mut out = String::from("Next days:");
    for day in days {
        let _ = write!(
            out,
            "\n  {}  {:<20} Min: {} | Max: {}",
            day.date.format("%a %d/%m"),
            capitalize(&day.description),
            degrees(day.temp_min, units),
            degrees(day.temp_max, units),
        );
    }
    out
}

pub fn history(entries: &[LocationRecord], units: Units) -> String {
    if entries.is_empty() {
        return "No recent searches.".to_string();
    }

    let mut out = String::from("Recent searches:");
    for (i, entry) in entries.iter().enumerate() {
        let _ = write!(
            out,
            "\n  {}. {} {} {} [{}]",
            i + 1,
            entry.name,
            degrees(entry.temp, units),
            capitalize(&entry.description),
            entry.icon,
        );
    }
    out
}
