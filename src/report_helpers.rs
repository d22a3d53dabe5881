use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Compute the max display width of some text column, with a minimum of `min`.
/// Contributor names are often non-ASCII, so this measures terminal columns.
pub fn max_text_width<'a>(texts: impl Iterator<Item = &'a str>, min: usize) -> usize {
    texts.map(|t| t.width()).max().unwrap_or(min).max(min)
}

/// Left-align `text` in a column `width` terminal cells wide.
pub fn pad_right(text: &str, width: usize) -> String {
    let w = text.width();
    if w >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - w))
    }
}

/// Print a horizontal separator of box-drawing chars.
pub fn separator(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Serialize to pretty JSON and print to stdout.
pub fn print_json_stdout(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "report_helpers_test.rs"]
mod tests;
