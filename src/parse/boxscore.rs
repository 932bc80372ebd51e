//! Game boxscore pages.

use super::{document, read_table, selector, RawTable};
use crate::error::ParseError;
use crate::models::TeamRole;
use scraper::{ElementRef, Html, Selector};

/// Stat tables found on a boxscore page, one per team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxscoreTables {
    pub visitors: Option<RawTable>,
    pub home: Option<RawTable>,
}

impl BoxscoreTables {
    pub fn get(&self, role: TeamRole) -> Option<&RawTable> {
        match role {
            TeamRole::Home => self.home.as_ref(),
            TeamRole::Visitors => self.visitors.as_ref(),
        }
    }

    /// Total stat rows across both tables.
    pub fn len(&self) -> usize {
        self.visitors.as_ref().map_or(0, RawTable::len) + self.home.as_ref().map_or(0, RawTable::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Locate the visitor and home stat tables.
///
/// Lookup order: the per-team `div_box-score-visitor` / `div_box-score-home`
/// wrappers, then the first two tables of `div_box-score` (visitor first), then
/// any table on the page in document order.
pub fn parse_boxscore(html: &str) -> Result<BoxscoreTables, ParseError> {
    let doc = document(html);
    let table_sel = selector("table")?;

    let mut visitors = table_in_div(&doc, "div_box-score-visitor", &table_sel)?;
    let mut home = table_in_div(&doc, "div_box-score-home", &table_sel)?;

    let combined_sel = selector("div#div_box-score")?;
    if let Some(div) = doc.select(&combined_sel).next() {
        let mut tables = div.select(&table_sel);
        let first = tables.next();
        let second = tables.next();
        visitors = visitors.or(first);
        home = home.or(second);
    }

    if visitors.is_none() || home.is_none() {
        for table in doc.select(&table_sel) {
            let taken = [visitors, home];
            if taken.iter().flatten().any(|t| t.id() == table.id()) {
                continue;
            }
            if visitors.is_none() {
                visitors = Some(table);
            } else if home.is_none() {
                home = Some(table);
            } else {
                break;
            }
        }
    }

    if visitors.is_none() && home.is_none() {
        return Err(ParseError::NoTable);
    }

    Ok(BoxscoreTables {
        visitors: visitors.map(read_table).transpose()?,
        home: home.map(read_table).transpose()?,
    })
}

fn table_in_div<'a>(
    doc: &'a Html,
    div_id: &str,
    table_sel: &Selector,
) -> Result<Option<ElementRef<'a>>, ParseError> {
    let div_sel = selector(&format!("div#{}", div_id))?;
    Ok(doc
        .select(&div_sel)
        .next()
        .and_then(|div| div.select(table_sel).next()))
}
