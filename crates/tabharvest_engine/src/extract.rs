use scraper::{ElementRef, Html, Selector};

/// Markup collaborator: finds the data table and returns its body rows as
/// trimmed cell text. `None` means no table was present at all.
pub trait TableExtractor: Send + Sync {
    fn extract_rows(&self, html: &str) -> Option<Vec<Vec<String>>>;
}

/// Extractor for Drupal "views" listings: `table.views-table`, `tbody tr`, `td`.
#[derive(Debug, Clone)]
pub struct ViewsTableExtractor {
    table: Selector,
    body: Selector,
    row: Selector,
    cell: Selector,
}

impl Default for ViewsTableExtractor {
    fn default() -> Self {
        Self::with_selectors("table.views-table", "td")
            .expect("default selectors are valid CSS")
    }
}

impl ViewsTableExtractor {
    /// Builds an extractor for a different table marker or cell selector.
    /// Returns `None` when either selector does not parse.
    pub fn with_selectors(table: &str, cell: &str) -> Option<Self> {
        Some(Self {
            table: Selector::parse(table).ok()?,
            body: Selector::parse("tbody").ok()?,
            row: Selector::parse("tr").ok()?,
            cell: Selector::parse(cell).ok()?,
        })
    }

    /// Each text node is trimmed on its own, then the pieces are joined
    /// without a separator.
    fn row_cells(&self, row: ElementRef<'_>) -> Vec<String> {
        row.select(&self.cell)
            .map(|cell| cell.text().map(str::trim).collect::<String>())
            .collect()
    }
}

impl TableExtractor for ViewsTableExtractor {
    fn extract_rows(&self, html: &str) -> Option<Vec<Vec<String>>> {
        let doc = Html::parse_document(html);
        let table = doc.select(&self.table).next()?;

        // A table without a body is still a table, just an empty one.
        let Some(body) = table.select(&self.body).next() else {
            return Some(Vec::new());
        };

        let rows = body
            .select(&self.row)
            .map(|row| self.row_cells(row))
            .filter(|cells| !cells.is_empty())
            .collect();
        Some(rows)
    }
}

/// Extraction result for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub rows: Option<Vec<Vec<String>>>,
    /// Only meaningful when `rows` is `None`; computed from the response's
    /// final URL, never from the markup.
    pub login_redirect: bool,
}

pub fn extract_page(
    extractor: &dyn TableExtractor,
    html: &str,
    final_url: &str,
    login_markers: &[String],
) -> Extraction {
    match extractor.extract_rows(html) {
        Some(rows) => Extraction {
            rows: Some(rows),
            login_redirect: false,
        },
        None => Extraction {
            rows: None,
            login_redirect: is_login_redirect(final_url, login_markers),
        },
    }
}

pub fn is_login_redirect(final_url: &str, login_markers: &[String]) -> bool {
    let lowered = final_url.to_ascii_lowercase();
    login_markers
        .iter()
        .any(|marker| lowered.contains(&marker.to_ascii_lowercase()))
}
