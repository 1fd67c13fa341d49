//! Shared formatting helpers for the service and membership normalizers.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Derives a URL-safe slug from a display title.
///
/// Slugs are a display/URL convenience, not a unique key: two items with the
/// same title produce the same slug. Callers that need a stable identity
/// should use the record's Square id.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUNS.replace_all(cleaned.trim(), "-");
    HYPHEN_RUNS
        .replace_all(&hyphenated, "-")
        .trim_matches('-')
        .to_string()
}

/// Formats an integer minor-unit amount as whole dollars, e.g. `5000` -> `"$50"`.
/// A zero amount renders as `"Free"`.
pub fn format_price(amount: i64) -> String {
    if amount == 0 {
        return "Free".to_string();
    }
    format!("${}", (amount as f64 / 100.0).round() as i64)
}

/// Formats a service duration in milliseconds as a human-readable string,
/// e.g. `5400000` -> `"1 hour 30 mins"`.
pub fn format_duration(duration_ms: i64) -> String {
    let minutes = duration_ms / 60_000;
    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;

    if hours > 0 && remaining_minutes > 0 {
        format!(
            "{} hour{} {} min{}",
            hours,
            plural(hours),
            remaining_minutes,
            plural(remaining_minutes)
        )
    } else if hours > 0 {
        format!("{} hour{}", hours, plural(hours))
    } else {
        format!("{} min{}", minutes, plural(minutes))
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

/// Extracts feature bullets from an item description: scans for a line
/// containing a case-insensitive `features:` marker, then collects the `•`
/// lines that follow it, stopping at the first non-bullet line.
pub fn extract_features(description: &str) -> Vec<String> {
    let lines: Vec<&str> = description.lines().collect();
    let Some(marker_index) = lines
        .iter()
        .position(|line| line.to_lowercase().contains("features:"))
    else {
        return Vec::new();
    };

    lines[marker_index + 1..]
        .iter()
        .take_while(|line| line.trim().starts_with('•'))
        .filter_map(|line| strip_bullet(line))
        .collect()
}

/// Extracts benefit bullets from a subscription plan description: every `•`
/// line anywhere in the text counts, with no `Features:` gating. This is
/// deliberately looser than `extract_features`.
pub fn extract_benefits(description: &str) -> Vec<String> {
    description
        .lines()
        .filter(|line| line.trim().starts_with('•'))
        .filter_map(strip_bullet)
        .collect()
}

fn strip_bullet(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let stripped = trimmed.strip_prefix('•').unwrap_or(trimmed).trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercase_hyphenated() {
        assert_eq!(slugify("Classic Mani"), "classic-mani");
        assert_eq!(slugify("Gel  Polish   Change"), "gel-polish-change");
    }

    #[test]
    fn slug_strips_punctuation_and_edge_hyphens() {
        assert_eq!(slugify("Mani & Pedi (Deluxe)!"), "mani-pedi-deluxe");
        assert_eq!(slugify(" - Spa Day - "), "spa-day");
        assert_eq!(slugify("Nails --- Art"), "nails-art");
    }

    #[test]
    fn slug_contains_only_safe_characters() {
        let slug = slugify("Crème Brûlée Nails #1!");
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn zero_amount_is_free() {
        assert_eq!(format_price(0), "Free");
    }

    #[test]
    fn prices_render_as_whole_dollars() {
        assert_eq!(format_price(12000), "$120");
        assert_eq!(format_price(5000), "$50");
        // 150 minor units rounds to the nearest whole dollar
        assert_eq!(format_price(150), "$2");
        assert_eq!(format_price(149), "$1");
    }

    #[test]
    fn durations_render_with_pluralization() {
        assert_eq!(format_duration(3_600_000), "1 hour");
        assert_eq!(format_duration(5_400_000), "1 hour 30 mins");
        assert_eq!(format_duration(1_800_000), "30 mins");
        assert_eq!(format_duration(60_000), "1 min");
        assert_eq!(format_duration(7_200_000), "2 hours");
        assert_eq!(format_duration(7_260_000), "2 hours 1 min");
    }

    #[test]
    fn features_require_the_marker() {
        assert_eq!(
            extract_features("Main text\n\nFeatures:\n• A\n• B\n\nOther"),
            vec!["A", "B"]
        );
        assert!(extract_features("• A\n• B").is_empty());
    }

    #[test]
    fn feature_marker_is_case_insensitive() {
        assert_eq!(extract_features("Intro\nFEATURES:\n• Shine"), vec!["Shine"]);
    }

    #[test]
    fn feature_collection_stops_at_first_non_bullet_line() {
        let description = "Intro\nFeatures:\n• A\nnot a bullet\n• B";
        assert_eq!(extract_features(description), vec!["A"]);
    }

    #[test]
    fn benefits_need_no_marker() {
        assert_eq!(extract_benefits("• X\n• Y"), vec!["X", "Y"]);
        assert_eq!(
            extract_benefits("Plan intro\n• X\nmiddle text\n• Y"),
            vec!["X", "Y"]
        );
    }

    #[test]
    fn empty_bullets_are_dropped() {
        assert_eq!(extract_benefits("• X\n•   \n• Y"), vec!["X", "Y"]);
    }
}
