// src/extract/table.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace, warn};

use super::text::collapse_whitespace;

static DETAIL_TABLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body > blockquote > table:nth-of-type(2)")
        .expect("detail table selector should parse")
});
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector should parse"));

/// Upper bounds browsers apply to `colspan` / `rowspan`.
pub const MAX_COLSPAN: usize = 1_000;
pub const MAX_ROWSPAN: usize = 65_534;

/// One header/data pair seen while walking a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub header: String,
    pub data: String,
}

/// Header text → data text for one detail table, in first-seen order.
/// The first occurrence of a header wins; later duplicates are dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderDataMap {
    entries: Vec<RawCell>,
    index: HashMap<String, usize>,
}

impl HeaderDataMap {
    /// Returns `false` (and changes nothing) when `header` is already present.
    pub fn insert(&mut self, header: impl Into<String>, data: impl Into<String>) -> bool {
        let header = header.into();
        if self.index.contains_key(&header) {
            return false;
        }
        self.index.insert(header.clone(), self.entries.len());
        self.entries.push(RawCell {
            header,
            data: data.into(),
        });
        true
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.index
            .get(header)
            .map(|&i| self.entries[i].data.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.header.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawCell> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Into<String>, D: Into<String>> FromIterator<(H, D)> for HeaderDataMap {
    fn from_iter<T: IntoIterator<Item = (H, D)>>(iter: T) -> Self {
        let mut map = HeaderDataMap::default();
        for (h, d) in iter {
            map.insert(h, d);
        }
        map
    }
}

/// A cell whose rowspan still owes rows below it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSpan {
    remaining_rows: usize,
    header: String,
    data: String,
    is_header: bool,
}

/// Row-by-row walker over one table. Span state lives only as long as the walker.
#[derive(Debug, Default)]
pub struct TableWalker {
    map: HeaderDataMap,
    pending: BTreeMap<usize, PendingSpan>,
    rows_seen: usize,
}

impl TableWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one `<tr>`.
    pub fn push_row(&mut self, row: ElementRef<'_>) {
        self.rows_seen += 1;

        // 1) carryover: every live span occupies its column for this row
        let mut occupied: BTreeSet<usize> = BTreeSet::new();
        let mut header: Option<String> = None;
        let mut carried: Vec<(String, String)> = Vec::new();
        self.pending.retain(|&col, span| {
            occupied.insert(col);
            if span.is_header {
                if header.is_none() {
                    header = Some(span.header.clone());
                }
            } else {
                carried.push((span.header.clone(), span.data.clone()));
            }
            span.remaining_rows -= 1;
            span.remaining_rows > 0
        });
        for (h, d) in carried {
            if !self.map.insert(h.as_str(), d) {
                trace!(header = %h, "carried span already recorded");
            }
        }

        // 2) place real cells left to right, skipping occupied columns
        let mut cursor = 0usize;
        for cell in row.children().filter_map(ElementRef::wrap) {
            let name = cell.value().name();
            if name != "th" && name != "td" {
                continue;
            }
            while occupied.contains(&cursor) {
                cursor += 1;
            }
            let col = cursor;
            let rowspan = span_attr(cell, "rowspan", MAX_ROWSPAN);
            let colspan = span_attr(cell, "colspan", MAX_COLSPAN);

            if name == "th" {
                let text = header_text(cell);
                if rowspan > 1 {
                    self.register_span(col, colspan, rowspan, &text, "", true);
                }
                header = Some(text);
            } else if let Some(h) = header.as_deref().filter(|h| !h.is_empty()) {
                let data = cell_text(cell);
                if rowspan > 1 {
                    self.register_span(col, colspan, rowspan, h, &data, false);
                }
                if !self.map.insert(h, data) {
                    debug!(header = %h, "duplicate header ignored");
                }
            }

            let end = col.saturating_add(colspan);
            occupied.extend(col..end);
            cursor = end;
        }
    }

    fn register_span(
        &mut self,
        col: usize,
        colspan: usize,
        rowspan: usize,
        header: &str,
        data: &str,
        is_header: bool,
    ) {
        for c in col..col.saturating_add(colspan) {
            let span = PendingSpan {
                remaining_rows: rowspan - 1,
                header: header.to_string(),
                data: data.to_string(),
                is_header,
            };
            if let Some(old) = self.pending.insert(c, span) {
                warn!(
                    column = c,
                    row = self.rows_seen,
                    replaced = %old.header,
                    by = %header,
                    "overlapping rowspan; keeping the newer span"
                );
            }
        }
    }

    /// Columns that still owe rows, for inspection.
    pub fn pending_columns(&self) -> Vec<usize> {
        self.pending.keys().copied().collect()
    }

    pub fn finish(self) -> HeaderDataMap {
        self.map
    }
}

/// Find the detail table (second table under the page's blockquote).
pub fn locate_detail_table(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&DETAIL_TABLE).next()
}

/// Walk every row of `table`.
pub fn walk_table(table: ElementRef<'_>) -> HeaderDataMap {
    let mut walker = TableWalker::new();
    for row in table.select(&ROW) {
        walker.push_row(row);
    }
    walker.finish()
}

/// Locate and walk the detail table. `None` when the page has no such table.
pub fn walk(doc: &Html) -> Option<HeaderDataMap> {
    match locate_detail_table(doc) {
        Some(table) => Some(walk_table(table)),
        None => {
            warn!("detail table not found");
            None
        }
    }
}

/// Header cell text: trimmed text nodes concatenated, whitespace collapsed.
pub fn header_text(cell: ElementRef<'_>) -> String {
    let joined: String = cell.text().map(str::trim).collect();
    collapse_whitespace(&joined)
}

/// Data cell text: trimmed text nodes joined by a space, `<br>` kept as `\n`.
pub fn cell_text(cell: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(text) => {
                let t = text.trim();
                if t.is_empty() {
                    continue;
                }
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(t);
            }
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out.trim().to_string()
}

fn span_attr(cell: ElementRef<'_>, attr: &str, max: usize) -> usize {
    match cell.value().attr(attr).map(str::trim) {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) if n > max as u64 => {
                warn!(
                    cell = cell.value().name(),
                    attr,
                    value = raw,
                    max,
                    "span too large, clamping"
                );
                max
            }
            Ok(n) if n > 0 => n as usize,
            _ => {
                warn!(
                    cell = cell.value().name(),
                    attr,
                    value = raw,
                    "could not read span, defaulting to 1"
                );
                1
            }
        },
    }
}
