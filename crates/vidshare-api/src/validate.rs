//! Input checks and the ownership guard shared by every handler.

use uuid::Uuid;
use vidshare_db::Page;
use vidshare_types::models::{Comment, Playlist, Tweet, Video};

use crate::error::ApiError;

/// Parses a path identifier. `what` names the record in the error message.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidIdentifier(format!("Invalid {} ID", what)))
}

/// Trims the value; blank or missing becomes `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    non_blank(value).ok_or_else(|| ApiError::InvalidInput(message.into()))
}

pub fn page(page: Option<u32>, limit: Option<u32>) -> Result<Page, ApiError> {
    Page::new(page, limit).ok_or_else(|| ApiError::InvalidInput("page must be 1 or greater".into()))
}

pub fn found<T>(record: Option<T>, message: &str) -> Result<T, ApiError> {
    record.ok_or_else(|| ApiError::NotFound(message.into()))
}

pub fn exists(present: bool, message: &str) -> Result<(), ApiError> {
    if present {
        Ok(())
    } else {
        Err(ApiError::NotFound(message.into()))
    }
}

/// Records that belong to a single user.
pub trait Owned {
    fn owner(&self) -> Uuid;
}

impl Owned for Video {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Comment {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Tweet {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Playlist {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

/// Missing record → `NotFound`; someone else's → `Forbidden`.
pub fn owned_by<T: Owned>(
    record: Option<T>,
    requester: Uuid,
    not_found: &str,
    forbidden: &str,
) -> Result<T, ApiError> {
    let record = found(record, not_found)?;
    if record.owner() != requester {
        return Err(ApiError::Forbidden(forbidden.into()));
    }
    Ok(record)
}
