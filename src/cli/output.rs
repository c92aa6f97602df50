//! Output formatting for CLI commands
//!
//! Provides utilities for formatting command output in human-readable
//! or JSON formats. Supports colored output (respects NO_COLOR env var).

use crate::cli::OutputFormat;

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for work titles
    pub fn title(s: &str) -> ColoredString {
        s.cyan().bold()
    }

    /// Style for identifiers and DOIs
    pub fn link(s: &str) -> ColoredString {
        s.blue()
    }

    /// Style for numbers/counts
    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for warning messages
    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Style for dim/secondary text
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    /// Style for highlighted terms inside snippets
    pub fn highlight(s: &str) -> ColoredString {
        s.yellow().bold()
    }

    /// Style for rank numbers
    pub fn rank(s: &str) -> ColoredString {
        s.green().bold()
    }
}

/// Format a round-trip time given in milliseconds
pub fn format_duration_ms(millis: f64) -> String {
    let secs = millis / 1000.0;
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs - (mins * 60.0);
        format!("{mins:.0}m {remaining_secs:.1}s")
    } else if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{millis:.0}ms")
    }
}

/// Split a snippet into `(text, highlighted)` segments around its markup
///
/// An unterminated marker highlights the rest of the snippet.
fn highlight_segments<'a>(snippet: &'a str, pre_tag: &str, post_tag: &str) -> Vec<(&'a str, bool)> {
    if pre_tag.is_empty() {
        return vec![(snippet, false)];
    }

    let mut parts = snippet.split(pre_tag);
    let mut segments = vec![(parts.next().unwrap_or_default(), false)];
    for part in parts {
        let (marked, rest) = match post_tag.is_empty() {
            true => (part, ""),
            false => part.split_once(post_tag).unwrap_or((part, "")),
        };
        segments.push((marked, true));
        segments.push((rest, false));
    }
    segments
}

/// Replace `pre`/`post` markup in a snippet with terminal highlighting
pub fn render_highlight(snippet: &str, pre_tag: &str, post_tag: &str) -> String {
    render_highlight_truncated(snippet, pre_tag, post_tag, usize::MAX)
}

/// Like [`render_highlight`], but keeps at most `max_chars` visible characters
///
/// Markup never counts toward the limit and is never cut.
pub fn render_highlight_truncated(
    snippet: &str,
    pre_tag: &str,
    post_tag: &str,
    max_chars: usize,
) -> String {
    let segments = highlight_segments(snippet, pre_tag, post_tag);
    let visible: usize = segments.iter().map(|(text, _)| text.chars().count()).sum();
    let cut = visible > max_chars;
    let mut budget = if cut { max_chars.saturating_sub(3) } else { visible };

    let mut rendered = String::new();
    for (text, marked) in segments {
        if budget == 0 {
            break;
        }
        let kept: String = text.chars().take(budget).collect();
        budget -= kept.chars().count();
        match marked {
            true => rendered.push_str(&colors::highlight(&kept).to_string()),
            false => rendered.push_str(&kept),
        }
    }
    if cut {
        rendered.push_str("...");
    }
    rendered
}

/// Truncate to `max_chars` characters, appending "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Print output based on format
pub fn print_output<T: serde::Serialize>(data: &T, format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            // Human format should be handled by the caller
            // This is a fallback that just prints JSON
            if let Ok(json) = serde_json::to_string_pretty(data) {
                println!("{json}");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(data) {
                println!("{json}");
            }
        }
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", colors::warning("Warning"), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}: {}", colors::error("Error"), message);
}

/// Print a header/title
pub fn print_header(title: &str) {
    println!("{}", colors::label(title));
}
