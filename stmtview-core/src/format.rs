//! Currency/percent formatting and the chart colour palette.

use regex::Regex;
use std::sync::LazyLock;

static AMOUNT_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("amount pattern is valid"));

/// Format as en-US dollars: `$1,234.56`, `-$12.00`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// One decimal place, e.g. `87.5%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Numeric value of a currency-formatted amount.
///
/// Everything except digits, `.` and `-` is dropped, so `"$1,200.50"`,
/// `"1200.50 CR"` and `"USD 1,200.50"` all read as 1200.5.
pub fn parse_amount(amount: &str) -> Option<f64> {
    let cleaned = AMOUNT_NOISE.replace_all(amount, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Slice colours: indigo, pink, green, amber, violet.
pub const PALETTE: [Rgb; 5] = [
    Rgb(79, 70, 229),
    Rgb(236, 72, 153),
    Rgb(34, 197, 94),
    Rgb(245, 158, 11),
    Rgb(99, 102, 241),
];

/// Palette cycled (or truncated) to exactly `n` colours.
pub fn palette_for(n: usize) -> Vec<Rgb> {
    PALETTE.iter().copied().cycle().take(n).collect()
}
