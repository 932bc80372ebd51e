//! HTML table extraction.
//!
//! Pages are reduced to [`RawTable`] row sets: header names plus body rows of
//! cell text and the first link in each cell. Interpreting the columns is left
//! to [`crate::transform`].

pub mod boxscore;
pub mod schedule;
pub mod season;


use crate::error::ParseError;
use scraper::{ElementRef, Html, Node, Selector};

pub use boxscore::{parse_boxscore, BoxscoreTables};
pub use schedule::parse_schedule;
pub use season::parse_season_index;

/// One table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
}

/// A parsed HTML table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub id: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header matching one of `candidates`.
    pub fn column_index(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }

    pub fn require_column(&self, candidates: &[&str], field: &str) -> Result<usize, ParseError> {
        self.column_index(candidates)
            .ok_or_else(|| ParseError::MissingColumn {
                field: field.to_string(),
                tried: candidates.join(", "),
            })
    }

    /// Cell at `row`/`col`, if the row has that many cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector {
        selector: css.to_string(),
    })
}

/// Replace HTML comments that wrap a `<table>` with their contents.
///
/// basketball-reference ships most secondary tables inside comments and
/// reveals them with JavaScript. Only comment nodes of the parsed document are
/// unwrapped; comment markers inside scripts or attribute values are left alone.
pub fn unwrap_commented_tables(html: &str) -> String {
    // The tokenizer normalises line endings, so comment text only matches LF input.
    let html = html.replace("\r\n", "\n");
    let doc = Html::parse_document(&html);

    doc.tree
        .values()
        .filter_map(|node| match node {
            Node::Comment(comment) if comment.contains("<table") => Some(comment.to_string()),
            _ => None,
        })
        .fold(html.clone(), |out, inner| {
            out.replacen(&format!("<!--{}-->", inner), &inner, 1)
        })
}

/// Parse `html` after unwrapping commented tables.
pub(crate) fn document(html: &str) -> Html {
    Html::parse_document(&unwrap_commented_tables(html))
}

/// First table in the document.
pub fn first_table(html: &str) -> Result<RawTable, ParseError> {
    let doc = document(html);
    let table_sel = selector("table")?;
    let table = doc.select(&table_sel).next().ok_or(ParseError::NoTable)?;
    read_table(table)
}

/// Convert a `<table>` element into a [`RawTable`].
pub fn read_table(table: ElementRef<'_>) -> Result<RawTable, ParseError> {
    let tr_sel = selector("tr")?;
    let head_row_sel = selector("thead tr")?;
    let body_row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;

    let head_rows: Vec<ElementRef<'_>> = table.select(&head_row_sel).collect();
    let (header_row, body_rows): (Option<ElementRef<'_>>, Vec<ElementRef<'_>>) =
        if !head_rows.is_empty() {
            let body: Vec<ElementRef<'_>> = table.select(&body_row_sel).collect();
            let body = if body.is_empty() {
                // thead present but rows sit directly under <table>
                table
                    .select(&tr_sel)
                    .filter(|tr| head_rows.iter().all(|h| h.id() != tr.id()))
                    .collect()
            } else {
                body
            };
            (head_rows.last().copied(), body)
        } else {
            let mut all = table.select(&tr_sel);
            let first = all.next();
            (first, all.collect())
        };

    let headers = header_row
        .map(|row| {
            let names = row.select(&cell_sel).map(clean_text).collect();
            dedupe_headers(names)
        })
        .unwrap_or_default();

    let rows = body_rows
        .into_iter()
        .filter(|tr| !has_class(tr, "thead"))
        .map(|tr| tr.select(&cell_sel).map(read_cell).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.text.is_empty()))
        .collect();

    Ok(RawTable {
        id: table.value().attr("id").map(str::to_string),
        headers,
        rows,
    })
}

fn read_cell(cell: ElementRef<'_>) -> Cell {
    let href = selector("a")
        .ok()
        .and_then(|a_sel| cell.select(&a_sel).next())
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    Cell {
        text: clean_text(cell),
        href,
    }
}

/// Element text with whitespace runs (`&nbsp;` included) collapsed.
fn clean_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value()
        .attr("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Suffix repeated header names with `.1`, `.2`, … in order of appearance.
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<(String, usize)> = Vec::new();

    names
        .into_iter()
        .map(|name| match seen.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => {
                *count += 1;
                format!("{}.{}", name, count)
            }
            None => {
                seen.push((name.clone(), 0));
                name
            }
        })
        .collect()
}
