/// One already-typed segment of the dotted path before the caret.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub name: String,
    /// `Some(arity)` when the segment is a completed call like `getAge()`.
    pub call: Option<usize>,
}

impl PathSegment {
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call: None,
        }
    }

    pub fn call(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            call: Some(arity),
        }
    }

    pub fn is_call(&self) -> bool {
        self.call.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    /// Property or method member of the resolved path (or the default root).
    Property,
    /// The caret sits directly in front of an opening paren.
    Method,
    /// A `#`-prefixed function reference.
    Function,
}

/// Ephemeral completion request, rebuilt from scratch on every keystroke.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionContext {
    pub root_path: Vec<PathSegment>,
    /// The in-progress final segment; empty right after a `.`.
    pub partial: String,
    pub cursor: CursorKind,
}
