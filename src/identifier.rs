use crate::models::Row;
use anyhow::Result;
use uuid::Uuid;

/// Source of statistically unique row identifiers.
///
/// Generation may fail (for example when the OS entropy source errors), so
/// every call returns a `Result` and callers must not emit a row without
/// its identifier.
pub trait IdSource: Sync {
    fn next_id(&self) -> Result<String>;
}

/// Random version-4 UUIDs in hyphenated lowercase form (36 characters).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomUuid;

impl IdSource for RandomUuid {
    fn next_id(&self) -> Result<String> {
        Ok(Uuid::new_v4().hyphenated().to_string())
    }
}

/// Returns `row` with one freshly generated identifier appended.
pub fn augment_row<I: IdSource + ?Sized>(mut row: Row, ids: &I) -> Result<Row> {
    let id = ids.next_id()?;
    row.push(id);
    Ok(row)
}
