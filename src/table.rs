//! CSV to HTML table conversion.
//!
//! The first row is treated as the header row and rendered with `<th>` cells;
//! every following row becomes a `<tr>` of `<td>` cells. Cell text is inserted
//! verbatim. The result is a complete, whitespace-free HTML document that
//! [`prettify`] can break onto a few lines for readability.

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no data: a table needs at least a header row")]
    NoData,
}

/// Markers that get a newline appended, applied in this order.
const NEWLINE_AFTER: &[&str] = &["<html>", "<body>", "<table>", "</tr>", "</table>", "</body>"];

/// Render rows as an HTML table document. The first row holds the headers.
pub fn render_table<R, C>(rows: &[R]) -> Result<String, TableError>
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let (headers, body) = rows.split_first().ok_or(TableError::NoData)?;

    let mut html = String::from("<html><body><table><tr>");
    for cell in headers.as_ref() {
        html.push_str("<th>");
        html.push_str(cell.as_ref());
        html.push_str("</th>");
    }
    html.push_str("</tr>");

    for row in body {
        html.push_str("<tr>");
        for cell in row.as_ref() {
            html.push_str("<td>");
            html.push_str(cell.as_ref());
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }

    html.push_str("</table></body></html>");
    Ok(html)
}

/// How a rendered table is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One line, exactly as [`render_table`] produced it.
    Compact,
    /// A newline after each structural tag (see [`prettify`]).
    #[default]
    LineBroken,
}

impl Layout {
    pub fn apply(self, html: &str) -> String {
        match self {
            Layout::Compact => html.to_string(),
            Layout::LineBroken => prettify(html),
        }
    }
}

/// Insert a newline after each structural tag.
pub fn prettify(html: &str) -> String {
    NEWLINE_AFTER.iter().fold(html.to_string(), |acc, marker| {
        acc.replace(marker, &format!("{marker}\n"))
    })
}

/// Read every record of a CSV file. Rows may have different lengths.
pub fn read_csv(path: &Path) -> Result<Vec<Vec<String>>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Render a CSV file as an HTML table document.
pub fn csv_file_to_html(path: &Path) -> Result<String, TableError> {
    let rows = read_csv(path)?;
    render_table(&rows)
}

/// Convert a CSV file and write the table to `html_path` in `layout`.
pub fn convert_csv_file(
    csv_path: &Path,
    html_path: &Path,
    layout: Layout,
) -> Result<(), TableError> {
    let html = csv_file_to_html(csv_path)?;
    fs::write(html_path, layout.apply(&html))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn render_header_and_body_rows() {
        let rows = vec![vec!["A", "B"], vec!["1", "2"]];
        assert_eq!(
            render_table(&rows).unwrap(),
            "<html><body><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table></body></html>"
        );
    }

    #[test]
    fn render_header_only() {
        let rows = vec![vec!["Only"]];
        assert_eq!(
            render_table(&rows).unwrap(),
            "<html><body><table><tr><th>Only</th></tr></table></body></html>"
        );
    }

    #[test]
    fn render_empty_is_no_data() {
        let rows: Vec<Vec<String>> = vec![];
        assert!(matches!(render_table(&rows), Err(TableError::NoData)));
    }

    #[test]
    fn prettify_breaks_after_markers() {
        let html = "<html><body><table><tr><th>A</th></tr><tr><td>1</td></tr></table></body></html>";
        assert_eq!(
            prettify(html),
            "<html>\n<body>\n<table>\n<tr><th>A</th></tr>\n<tr><td>1</td></tr>\n</table>\n</body>\n</html>"
        );
    }

    #[test]
    fn prettify_leaves_other_text_alone() {
        assert_eq!(prettify("<p>hi</p>"), "<p>hi</p>");
    }

    #[test]
    fn read_csv_handles_quotes_and_ragged_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.csv");
        fs::write(&path, "name,notes\nada,\"first, programmer\"\nlin\n").unwrap();

        let rows = read_csv(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["name".to_string(), "notes".to_string()],
                vec!["ada".to_string(), "first, programmer".to_string()],
                vec!["lin".to_string()],
            ]
        );
    }

    #[test]
    fn empty_csv_file_is_no_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        assert!(matches!(csv_file_to_html(&path), Err(TableError::NoData)));
    }

    #[test]
    fn convert_csv_file_writes_pretty_table() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("data.csv");
        let html_path = tmp.path().join("data.html");
        fs::write(&csv_path, "A,B\n1,2\n").unwrap();

        convert_csv_file(&csv_path, &html_path, Layout::LineBroken).unwrap();
        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.starts_with("<html>\n<body>\n<table>\n"));
        assert!(html.contains("<tr><td>1</td><td>2</td></tr>\n"));
    }

    #[test]
    fn convert_csv_file_compact_layout() {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("data.csv");
        let html_path = tmp.path().join("data.html");
        fs::write(&csv_path, "A,B\n1,2\n").unwrap();

        convert_csv_file(&csv_path, &html_path, Layout::Compact).unwrap();
        assert_eq!(
            fs::read_to_string(&html_path).unwrap(),
            "<html><body><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table></body></html>"
        );
    }
}
