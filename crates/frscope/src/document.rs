//! Read-only access to the parts of a rendered document the pipeline needs.
//!
//! [`HtmlDocument`] parses markup with `scraper`; [`StaticDocument`] is an
//! in-memory fixture for tests and for hosts that already hold the pieces.

use scraper::{ElementRef, Html, Selector};

/// Narrow view over a document snapshot.
pub trait DocumentReader {
    /// Cell texts of every table row, in document order.
    ///
    /// Each inner vector holds the text content of the row's `td` cells.
    fn table_rows(&self) -> Vec<Vec<String>>;

    /// Text content of every `script` element.
    fn script_texts(&self) -> Vec<String>;

    /// Document title with whitespace collapsed.
    fn title(&self) -> String;

    /// Full text content of the document body.
    fn body_text(&self) -> String;
}

/// A parsed HTML document.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

impl DocumentReader for HtmlDocument {
    fn table_rows(&self) -> Vec<Vec<String>> {
        let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
            Selector::parse("table"),
            Selector::parse("tr"),
            Selector::parse("td"),
        ) else {
            return Vec::new();
        };

        let mut rows = Vec::new();
        for table in self.html.select(&table_sel) {
            for row in table.select(&row_sel) {
                rows.push(row.select(&cell_sel).map(text_of).collect());
            }
        }
        rows
    }

    fn script_texts(&self) -> Vec<String> {
        match Selector::parse("script") {
            Ok(sel) => self.html.select(&sel).map(text_of).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn title(&self) -> String {
        let raw = Selector::parse("title")
            .ok()
            .and_then(|sel| self.html.select(&sel).next().map(text_of))
            .unwrap_or_default();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn body_text(&self) -> String {
        Selector::parse("body")
            .ok()
            .and_then(|sel| self.html.select(&sel).next().map(text_of))
            .unwrap_or_else(|| self.html.root_element().text().collect())
    }
}

/// Document assembled from pre-extracted parts.
#[derive(Debug, Clone, Default)]
pub struct StaticDocument {
    pub rows: Vec<Vec<String>>,
    pub scripts: Vec<String>,
    pub title: String,
    pub body: String,
}

impl StaticDocument {
    /// Builds a document whose only table holds the given (frequency, amplitude) cells.
    pub fn with_rows<I, A, B>(rows: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|(a, b)| vec![a.into(), b.into()])
                .collect(),
            ..Default::default()
        }
    }
}

impl DocumentReader for StaticDocument {
    fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows.clone()
    }

    fn script_texts(&self) -> Vec<String> {
        self.scripts.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn body_text(&self) -> String {
        self.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head><title>  Acme   X1 Headphones Review </title>
        <script>var chart = { data: [[20, 1.5]] };</script>
        </head>
        <body>
            <h1>Raw Frequency Response Left</h1>
            <table>
                <tr><th>Frequency</th><th>dB</th></tr>
                <tr><td>1,000</td><td>2.5</td></tr>
                <tr><td>20</td></tr>
            </table>
            <table><tr><td>50</td><td>-1</td><td>extra</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_table_rows() {
        let doc = HtmlDocument::parse(PAGE);
        let rows = doc.table_rows();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec!["1,000".to_string(), "2.5".to_string()]);
        assert_eq!(rows[2].len(), 1);
        assert_eq!(rows[3].len(), 3);
    }

    #[test]
    fn test_scripts_title_body() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.script_texts().len(), 1);
        assert!(doc.script_texts()[0].contains("data: [[20, 1.5]]"));
        assert_eq!(doc.title(), "Acme X1 Headphones Review");
        assert!(doc.body_text().contains("Response Left"));
    }

    #[test]
    fn test_static_document_rows() {
        let doc = StaticDocument::with_rows([("20", "0.0"), ("500", "1.2")]);
        assert_eq!(doc.table_rows().len(), 2);
        assert!(doc.script_texts().is_empty());
    }
}
