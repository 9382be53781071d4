use serde::Serialize;
use std::sync::Arc;

use crate::index::{FieldInfo, MethodInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Field,
    Method,
    /// A `#fn` namespace method.
    Function,
    /// A bound root object.
    Variable,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: Arc<str>,
    pub kind: CandidateKind,
    /// Declared type for fields, signature summary for methods.
    #[serde(rename = "type")]
    pub detail: String,
    /// The text the presenter inserts; methods get trailing parens so the
    /// editor can park the caret between them.
    #[serde(skip)]
    pub insert_text: String,
}

impl Candidate {
    pub fn field(info: &FieldInfo) -> Self {
        Self {
            name: Arc::clone(&info.name),
            kind: CandidateKind::Field,
            detail: info.declared_type.to_string(),
            insert_text: info.name.to_string(),
        }
    }

    pub fn method(info: &MethodInfo, kind: CandidateKind) -> Self {
        Self {
            name: Arc::clone(&info.name),
            kind,
            detail: info.signature(),
            insert_text: format!("{}()", info.name),
        }
    }

    pub fn variable(name: &Arc<str>, class_name: &str) -> Self {
        Self {
            name: Arc::clone(name),
            kind: CandidateKind::Variable,
            detail: class_name.to_string(),
            insert_text: name.to_string(),
        }
    }

    pub fn keyword(text: &'static str) -> Self {
        Self {
            name: Arc::from(text),
            kind: CandidateKind::Keyword,
            detail: String::new(),
            insert_text: text.to_string(),
        }
    }
}
