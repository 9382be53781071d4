//! SpEL completion engine for YAML rule files.
//!
//! The engine is built from three pieces: a [`index::SymbolTable`] populated by
//! scanning a Java/SpringBoot source tree, a tokenizer that splits the partial
//! expression under the caret into a dotted path, and a resolver that walks the
//! path against the table and returns ranked candidates. The editor widget that
//! presents the candidates is an external collaborator.

pub mod completion;
pub mod engine;
pub mod index;
