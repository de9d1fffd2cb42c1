//! Engine error taxonomy.
//!
//! Only conditions that abort an operation live here. Duplicate submissions,
//! out-of-sequence meals and clock skew are ordinary outcomes and never surface
//! as a [`VitalityError`].

/// Errors returned by the vitality engine.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VitalityError {
    /// No ledger exists for this owner/companion pair.
    #[error("companion not found: {companion_id} (owner {owner_id})")]
    NotFound {
        owner_id: String,
        companion_id: String,
    },
    /// The companion was retired; its ledger is frozen.
    #[error("companion is retired: {0}")]
    Retired(String),
    /// The ledger changed underneath a read-modify-write cycle.
    #[error("ledger version conflict for companion {0}")]
    Conflict(String),
    /// Caller-supplied input failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A stored row could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),
    /// Storage layer failure. Nothing from the failed call was committed.
    #[error("persistence failure: {0}")]
    Persistence(rusqlite::Error),
}

impl VitalityError {
    pub(crate) fn not_found(owner_id: &str, companion_id: &str) -> Self {
        Self::NotFound {
            owner_id: owner_id.to_string(),
            companion_id: companion_id.to_string(),
        }
    }

    /// True when the underlying storage rejected a row because of a unique index.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Persistence(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

impl From<rusqlite::Error> for VitalityError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
                Self::Corrupt(inner.to_string())
            }
            other => Self::Persistence(other),
        }
    }
}

/// Engine result type.
pub type Result<T> = std::result::Result<T, VitalityError>;

/// A column value that could not be parsed back into its Rust type.
#[derive(Debug, thiserror::Error)]
#[error("column {column}: {message}")]
pub(crate) struct ColumnParseError {
    pub column: usize,
    pub message: String,
}

/// Read a TEXT column and parse it with `FromStr`, reporting failures as a
/// rusqlite conversion error so they flow through `query_row`/`query_map`.
pub(crate) fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(ColumnParseError {
                column: idx,
                message: format!("{e} ({raw:?})"),
            }),
        )
    })
}

/// Nullable variant of [`parse_column`].
pub(crate) fn parse_optional_column<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(ColumnParseError {
                    column: idx,
                    message: format!("{e} ({raw:?})"),
                }),
            )
        }),
    }
}
