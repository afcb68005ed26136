use serde::{Deserialize, Serialize};

/// A source position inside a configuration file.
///
/// Lines are 1-based. Column fields are optional because several upstream
/// parsers only report line ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl SourceLocation {
    /// Create a location spanning `start_line..=end_line` in `file`.
    #[must_use]
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
            start_column: None,
            end_column: None,
        }
    }

    /// Attach column information.
    #[must_use]
    pub const fn with_columns(mut self, start: u32, end: u32) -> Self {
        self.start_column = Some(start);
        self.end_column = Some(end);
        self
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new("", 1, 1)
    }
}
