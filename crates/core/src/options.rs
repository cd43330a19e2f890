use crate::numeral::Numerals;

/// How identifier and string casing is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    /// Keywords match case-insensitively; keys and strings keep their casing.
    #[default]
    Preserve,
    /// Lowercase the whole document before reading. Keys and strings come
    /// out lowercased as well.
    Lowercase,
}

/// Per-read configuration. Plain data: two readers with different options
/// never share state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub numerals: Numerals,
    pub case: CaseMode,
}

impl ReadOptions {
    pub fn with_numerals(mut self, numerals: Numerals) -> Self {
        self.numerals = numerals;
        self
    }

    pub fn with_case(mut self, case: CaseMode) -> Self {
        self.case = case;
        self
    }
}
