/// Raised when no token matches the text at `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte offset of the first unmatched character.
    pub pos:  usize,
    /// A few characters of source starting at `pos`.
    pub near: String,
}

impl LexError {
    /// Builds an error for `source` at `pos`, capturing the nearby text.
    ///
    /// # Example
    /// ```
    /// use algebrist::error::LexError;
    ///
    /// let e = LexError::at("1 + @foo", 4);
    /// assert_eq!(e.near, "@foo");
    /// ```
    #[must_use]
    pub fn at(source: &str, pos: usize) -> Self {
        let near = source.get(pos..).unwrap_or_default().chars().take(10).collect();
        Self { pos, near }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error at position {}: Invalid expression near '{}'.", self.pos, self.near)
    }
}

impl std::error::Error for LexError {}
