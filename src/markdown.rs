//! Line-oriented Markdown to HTML conversion.
//!
//! This is deliberately not a Markdown compiler. It understands exactly three
//! constructs, each handled by a single-pass rule over raw lines:
//!
//! | Rule | Input | Output |
//! |------|-------|--------|
//! | [`parse_header`] | `## Title` | `<h2> Title</h2>` |
//! | [`parse_alternate_header`] | `Title` followed by `===` / `---` | `<h1>Title</h1>` / `<h2>Title</h2>` |
//! | [`parse_paragraphs`] | blank lines | alternating `<p>` / `</p>` |
//!
//! Lists, links, emphasis and code blocks pass through untouched.
//!
//! ## Quirks
//!
//! - The text after the hashes is not trimmed, so `# Title` keeps its space.
//! - Heading levels are not capped: `#######x` becomes `<h7>x</h7>`.
//! - A non-empty underline made only of whitespace strips to length zero, and
//!   zero `=` characters equals that length, so it produces an `<h1>`.
//! - Paragraph tags alternate by how many blank lines have been seen, so an odd
//!   number of blank lines leaves the last `<p>` open.

use std::fs;
use std::path::Path;

/// Result of trying the Setext rule on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlternateHeader {
    /// The line was an underline; holds the heading built from the prior line.
    Header(String),
    /// Not an underline. Both inputs come back as they were given.
    Unchanged { line: String, prior: String },
}

/// Convert an ATX header line (`#`, `##`, ...) into an `<hN>` element.
///
/// Lines that are empty or do not start with `#` are returned unchanged.
pub fn parse_header(line: &str) -> String {
    if !line.starts_with('#') {
        return line.to_string();
    }
    let level = line.bytes().take_while(|&b| b == b'#').count();
    let run = "#".repeat(level);
    let rest = line.split_once(run.as_str()).map_or("", |(_, rest)| rest);
    format!("<h{level}>{rest}</h{level}>")
}

/// Convert a Setext underline into a heading built from `prior`.
///
/// A line of `=` gives `<h1>`, a line of `-` gives `<h2>`. The comparison is
/// between the number of marker characters in the raw line and the length of
/// the trimmed line, so surrounding whitespace is tolerated.
pub fn parse_alternate_header(line: &str, prior: &str) -> AlternateHeader {
    if line.is_empty() {
        return AlternateHeader::Unchanged {
            line: line.to_string(),
            prior: prior.to_string(),
        };
    }

    let stripped_len = line.trim().chars().count();
    if line.matches('=').count() == stripped_len {
        AlternateHeader::Header(format!("<h1>{prior}</h1>"))
    } else if line.matches('-').count() == stripped_len {
        AlternateHeader::Header(format!("<h2>{prior}</h2>"))
    } else {
        AlternateHeader::Unchanged {
            line: line.to_string(),
            prior: prior.to_string(),
        }
    }
}

/// Split `text` into lines at every Unicode line boundary.
///
/// Breaks on `\n`, `\r`, `\r\n`, vertical tab, form feed, the file/group/record
/// separators, NEL, and the Unicode line and paragraph separators. A trailing
/// break does not produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && let Some(&(_, '\n')) = chars.peek() {
            chars.next();
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Blank means nothing but whitespace, counting the ASCII separator controls.
fn is_blank(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

/// Replace blank lines with alternating `<p>` and `</p>` tags.
pub fn parse_paragraphs(text: &str) -> String {
    paragraph_lines(split_lines(text))
}

fn paragraph_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut blank_count = 0usize;
    lines
        .into_iter()
        .map(|line| {
            if is_blank(line) {
                let tag = if blank_count % 2 == 0 { "<p>" } else { "</p>" };
                blank_count += 1;
                tag
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert a whole Markdown document with all three rules.
///
/// Setext underlines are checked first against the previous line, as long as
/// that line was plain text (not blank and not already a heading). The ATX
/// rule runs on everything else, and paragraph tags are added last.
pub fn to_html(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut prior_is_plain = false;

    for line in split_lines(text) {
        if prior_is_plain && let Some(prior) = lines.last_mut() {
            if let AlternateHeader::Header(heading) = parse_alternate_header(line, prior) {
                *prior = heading;
                prior_is_plain = false;
                continue;
            }
        }

        let converted = parse_header(line);
        prior_is_plain = converted == line && !is_blank(line);
        lines.push(converted);
    }

    paragraph_lines(lines.iter().map(String::as_str))
}

/// Read a Markdown file and write its HTML conversion to `output`.
pub fn convert_file(input: &Path, output: &Path) -> std::io::Result<()> {
    let text = fs::read_to_string(input)?;
    fs::write(output, to_html(&text))
}
