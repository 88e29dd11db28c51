//! Field → column mappings.

/// A fixed table from logical field names (as they appear in request data) to
/// physical column names.
///
/// Mappings are declared once per entity as `const` items and never built at
/// runtime. Fields missing from the table are used verbatim as the column name.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldMapping {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// A mapping with no renames.
    pub const fn identity() -> Self {
        Self { entries: &[] }
    }

    /// Column name for `field`.
    pub fn column_for<'a>(&self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(field, |(_, column)| *column)
    }

    /// The explicit (field, column) pairs.
    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }
}
