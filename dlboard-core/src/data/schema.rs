//! Versioned column contract for the downloads CSV.
//!
//! The upstream reporter owns the file layout. Pinning the columns we rely on
//! here means a renamed or retyped column fails loudly at parse time instead
//! of producing an empty chart.

/// How a column's cells are coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `YYYY-MM-DD`, or a datetime whose date part is taken.
    Date,
    /// Free text, kept verbatim apart from trimming.
    Text,
    /// Non-negative integer.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

/// Expected layout of the downloads CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSchema {
    pub version: u32,
    pub columns: &'static [ColumnSpec],
}

pub const REPORT_DATE: &str = "report_date";
pub const PLATFORM: &str = "platform";
pub const DAILY_DOWNLOADS: &str = "daily_downloads";
pub const COLLECTED_DATE: &str = "date";
pub const CUMULATIVE_TOTAL: &str = "cumulative_total";

impl DownloadSchema {
    pub const V1: DownloadSchema = DownloadSchema {
        version: 1,
        columns: &[
            ColumnSpec {
                name: REPORT_DATE,
                kind: ColumnKind::Date,
                required: true,
            },
            ColumnSpec {
                name: PLATFORM,
                kind: ColumnKind::Text,
                required: true,
            },
            ColumnSpec {
                name: DAILY_DOWNLOADS,
                kind: ColumnKind::Count,
                required: true,
            },
            ColumnSpec {
                name: COLLECTED_DATE,
                kind: ColumnKind::Date,
                required: false,
            },
            ColumnSpec {
                name: CUMULATIVE_TOTAL,
                kind: ColumnKind::Count,
                required: false,
            },
        ],
    };

    /// True if `name` is one of this schema's columns.
    pub fn knows(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Map a header row onto schema columns.
    pub fn resolve(&self, header: &[String]) -> Result<ColumnMap, SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for name in header {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        let find = |name: &str| header.iter().position(|h| h == name);

        for spec in self.columns.iter().filter(|c| c.required) {
            if find(spec.name).is_none() {
                return Err(SchemaError::MissingColumn {
                    column: spec.name.to_string(),
                    version: self.version,
                });
            }
        }

        // Required columns were checked above.
        let required = |name: &str| find(name).unwrap_or_default();

        Ok(ColumnMap {
            report_date: required(REPORT_DATE),
            platform: required(PLATFORM),
            daily_downloads: required(DAILY_DOWNLOADS),
            collected_date: find(COLLECTED_DATE),
            cumulative_total: find(CUMULATIVE_TOTAL),
            extra: header
                .iter()
                .enumerate()
                .filter(|(_, h)| !self.knows(h))
                .map(|(i, _)| i)
                .collect(),
        })
    }
}

/// Field positions of schema columns within a particular header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub report_date: usize,
    pub platform: usize,
    pub daily_downloads: usize,
    pub collected_date: Option<usize>,
    pub cumulative_total: Option<usize>,
    /// Positions of columns the schema does not know, in source order.
    pub extra: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column '{column}' (schema v{version})")]
    MissingColumn { column: String, version: u32 },

    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),
}
