//! pt-BR number parsing for rendered result fields
//!
//! The page formats money through `Intl.NumberFormat('pt-BR')`, which yields
//! text such as `R$ 31.200,00` (with a non-breaking space after the symbol),
//! and percentages as `12,5%`.

/// Characters the page may emit as non-breaking spaces.
const NBSP: [char; 2] = ['\u{a0}', '\u{202f}'];

/// Parse a rendered currency or percentage string.
///
/// Returns `None` for anything that does not reduce to a finite number.
/// A trailing `%` takes priority over currency handling, and percentages
/// are returned as magnitudes (`12,5%` is `12.5`, not `0.125`).
pub fn parse_brl(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }

    let cleaned = raw.replace(&NBSP[..], "");
    let text = cleaned.trim();

    if text.ends_with('%') {
        let magnitude = text.replace('%', "").replace(',', ".");
        return parse_finite(magnitude.trim());
    }

    let digits = text.replace("R$", "").replace('R', "").replace(' ', "");
    let normalized = digits.replace('.', "").replace(',', ".");
    parse_finite(&normalized)
}

fn parse_finite(text: &str) -> Option<f64> {
    // Rust accepts "inf" and "NaN"; rendered money never contains letters
    if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
