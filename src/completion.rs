use crate::index::SymbolTable;

pub mod candidate;
pub mod context;
pub mod keywords;
pub mod resolver;
pub mod tokenizer;

pub use candidate::{Candidate, CandidateKind};
pub use context::{CompletionContext, CursorKind, PathSegment};

/// One keystroke: tokenize the caret-bounded expression, then resolve the
/// dotted path against the table. Never fails; "nothing to suggest" is an
/// empty list.
pub fn complete(text: &str, caret: usize, table: &SymbolTable) -> Vec<Candidate> {
    let ctx = tokenizer::tokenize(text, caret);
    resolver::resolve(&ctx, table)
}
