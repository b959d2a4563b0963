//! Pagination and the video listing query builder.

use std::str::FromStr;

use rusqlite::types::Value;
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// One-based page window. `skip = (page - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Page {
    /// Returns `None` for page 0. The limit is clamped to `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Option<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return None;
        }
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Some(Self { page, limit })
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Views,
    Duration,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Title => "v.title",
            SortField::Views => "v.views",
            SortField::Duration => "v.duration",
            SortField::CreatedAt => "v.created_at",
            SortField::UpdatedAt => "v.updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "views" => Ok(SortField::Views),
            "duration" => Ok(SortField::Duration),
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            other => Err(format!("cannot sort videos by '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `"asc"` sorts ascending; anything else, including nothing, descending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter, sort and page window for the public video listing.
#[derive(Debug, Clone, Default)]
pub struct VideoListing {
    pub title_contains: Option<String>,
    pub owner: Option<Uuid>,
    pub sort: Option<(SortField, SortOrder)>,
    pub page: Page,
}

impl VideoListing {
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(
            "SELECT v.id, v.title, v.description, v.thumbnail, v.video_file, v.views, v.duration,
                    v.created_at, u.username, u.avatar
             FROM videos v
             JOIN users u ON u.id = v.owner_id
             WHERE 1 = 1",
        );
        let mut params = Vec::new();

        if let Some(text) = self.title_contains.as_deref().filter(|t| !t.is_empty()) {
            sql.push_str(" AND v.title LIKE ? ESCAPE '\\'");
            params.push(Value::Text(format!("%{}%", escape_like(text))));
        }
        if let Some(owner) = self.owner {
            sql.push_str(" AND v.owner_id = ?");
            params.push(Value::Text(owner.to_string()));
        }
        if let Some((field, order)) = self.sort {
            sql.push_str(&format!(" ORDER BY {} {}", field.column(), order.keyword()));
        }

        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(i64::from(self.page.limit())));
        params.push(Value::Integer(self.page.skip() as i64));

        (sql, params)
    }
}

pub(crate) fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
