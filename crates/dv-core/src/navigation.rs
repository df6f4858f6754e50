//! List pagination and record-to-record navigation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tables::EntityTable;

/// Rows per list page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// One page of a table's browse list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ListPage {
    /// 0-based page number.
    pub index: usize,
    /// Offset of the first row on this page.
    pub offset: usize,
    /// Rows on this page.
    pub len: usize,
    /// `start-end` with 1-based inclusive bounds, or `0` for an empty table.
    pub label: String,
    /// Site path: `/{table}/` for the first page, `/{table}/{label}/` after.
    pub path: String,
}

impl ListPage {
    /// Row range this page covers, for slicing.
    #[must_use]
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Split `total` rows into pages. An empty table still gets one (empty) page.
#[must_use]
pub fn paginate(table: EntityTable, total: usize, page_size: usize) -> Vec<ListPage> {
    let page_size = page_size.max(1);
    let page_count = total.div_ceil(page_size).max(1);

    (0..page_count)
        .map(|index| {
            let offset = index * page_size;
            let len = page_size.min(total.saturating_sub(offset));
            let label = if len == 0 {
                "0".to_string()
            } else {
                format!("{}-{}", offset + 1, offset + len)
            };
            let path = if index == 0 {
                format!("/{table}/")
            } else {
                format!("/{table}/{label}/")
            };
            ListPage {
                index,
                offset,
                len,
                label,
                path,
            }
        })
        .collect()
}

/// Neighbour ids for an entity page, given the table's ids in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordNav {
    pub first_id: i64,
    pub last_id: i64,
    pub prev_id: Option<i64>,
    pub next_id: Option<i64>,
}

impl RecordNav {
    /// `None` when `position` is out of bounds.
    #[must_use]
    pub fn for_position(ids: &[i64], position: usize) -> Option<Self> {
        let (&first_id, &last_id) = (ids.first()?, ids.last()?);
        if position >= ids.len() {
            return None;
        }
        Some(Self {
            first_id,
            last_id,
            prev_id: position.checked_sub(1).map(|p| ids[p]),
            next_id: ids.get(position + 1).copied(),
        })
    }

    #[must_use]
    pub fn for_id(ids: &[i64], id: i64) -> Option<Self> {
        let position = ids.iter().position(|&candidate| candidate == id)?;
        Self::for_position(ids, position)
    }
}

/// Site path of one entity page.
#[must_use]
pub fn entity_path(table: EntityTable, id: i64) -> String {
    format!("/{table}/{id}/")
}
