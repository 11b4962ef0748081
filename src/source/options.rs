//! Text source options.

/// Options for reading PDF documents.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Error handling mode for page-level failures
    pub error_mode: ErrorMode,

    /// Whether to walk content streams for positioned text spans
    pub collect_layout: bool,
}

impl SourceOptions {
    /// Create new source options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the whole document when a single page cannot be read.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable layout span collection.
    pub fn with_layout(mut self, collect: bool) -> Self {
        self.collect_layout = collect;
        self
    }

    /// Read page text only.
    pub fn text_only(mut self) -> Self {
        self.collect_layout = false;
        self
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            collect_layout: true,
        }
    }
}

/// How page-level failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the document on any page error
    Strict,
    /// Keep the page with empty content and continue
    #[default]
    Lenient,
}
