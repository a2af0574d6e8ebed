use anyhow::{bail, Result};

/// Parse a duration input into seconds.
///
/// Accepts "1h30m", "45s", "2h", "90" (bare integers are seconds). Unit
/// parts must appear in h, m, s order, each at most once.
pub fn parse_duration(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("Empty time string");
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid time string: {}", input));
    }

    parse_hms(trimmed).ok_or_else(|| anyhow::anyhow!("Invalid time string: {}", input))
}

fn parse_hms(input: &str) -> Option<u32> {
    // Units must appear in descending order, so track the last factor seen
    let mut total: u32 = 0;
    let mut digits = String::new();
    let mut last_factor = u32::MAX;

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let factor = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        if digits.is_empty() || factor >= last_factor {
            return None;
        }
        last_factor = factor;

        let value: u32 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(factor)?)?;
        digits.clear();
    }

    // Trailing digits without a unit ("1h30") are malformed
    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

/// Format seconds as "1h30m0s" (all units, no padding)
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{}h{}m{}s", hours, minutes, seconds)
}

/// Format seconds as a zero-padded clock, "00:05:30"
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
