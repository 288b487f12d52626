/// Whitespace-separated terms that must all appear in a line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    terms: Vec<String>,
}

impl LineFilter {
    pub fn new(pattern: &str) -> Self {
        Self {
            terms: pattern.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Case-sensitive substring match of every term against the raw line.
    /// The timestamp prefix is part of the line.
    pub fn matches(&self, line: &str) -> bool {
        self.terms.iter().all(|term| line.contains(term.as_str()))
    }
}
