//! SpEL keywords offered alongside top-level identifiers.

/// Special variables available in every rule expression.
pub const SPECIAL_VARS: &[&str] = &["#fn", "#root", "#this"];

/// Word operators and literals; symbolic operators are never prefix-typed.
pub const KEYWORDS: &[&str] = &[
    "and",
    "between",
    "false",
    "instanceof",
    "matches",
    "not",
    "null",
    "or",
    "true",
];

pub fn all() -> impl Iterator<Item = &'static str> {
    SPECIAL_VARS.iter().chain(KEYWORDS.iter()).copied()
}
