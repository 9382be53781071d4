//! Walks the tokenized path against the symbol table and produces ranked
//! candidates. An unresolvable type along the way is the designed `Unknown`
//! sentinel: resolution stops and the result is empty, never an error.

use std::sync::Arc;

use super::candidate::{Candidate, CandidateKind};
use super::context::{CompletionContext, PathSegment};
use super::keywords;
use crate::index::{ClassInfo, FieldInfo, MethodInfo, SymbolTable, TypeRef, FUNCTION_NAMESPACE};

pub fn resolve(ctx: &CompletionContext, table: &SymbolTable) -> Vec<Candidate> {
    if ctx.root_path.is_empty() {
        return top_level_candidates(ctx, table);
    }

    let mut current = root_type(&ctx.root_path[0], table);
    for segment in &ctx.root_path[1..] {
        let TypeRef::Known(class) = current else {
            return Vec::new();
        };
        current = advance(&class, segment, table);
    }
    let TypeRef::Known(class) = current else {
        return Vec::new();
    };

    let method_kind = if ctx.root_path.len() == 1 && ctx.root_path[0].name == FUNCTION_NAMESPACE {
        CandidateKind::Function
    } else {
        CandidateKind::Method
    };
    member_candidates(&class, &ctx.partial, method_kind)
}

/// The first segment names a bound root object or a `#` special variable.
fn root_type(segment: &PathSegment, table: &SymbolTable) -> TypeRef {
    if segment.is_call() {
        return TypeRef::Unknown;
    }
    match segment.name.as_str() {
        FUNCTION_NAMESPACE => table
            .function_root()
            .map(|ns| TypeRef::Known(Arc::clone(ns)))
            .unwrap_or(TypeRef::Unknown),
        "#this" | "#root" => table.default_root_type(),
        name => table.root_type(name),
    }
}

/// Advance one segment: calls through the method's return type (overload
/// picked by arity), plain segments through the field's declared type.
fn advance(class: &ClassInfo, segment: &PathSegment, table: &SymbolTable) -> TypeRef {
    match segment.call {
        Some(arity) => {
            let Some(overloads) = class.methods.get(segment.name.as_str()) else {
                return TypeRef::Unknown;
            };
            let method = overloads
                .iter()
                .find(|m| m.arity() == arity)
                .or_else(|| overloads.first());
            match method {
                Some(m) => table.lookup_type(&m.return_type),
                None => TypeRef::Unknown,
            }
        }
        None => match class.fields.get(segment.name.as_str()) {
            Some(field) => table.lookup_type(&field.declared_type),
            None => TypeRef::Unknown,
        },
    }
}

/// Every member whose name starts with the partial segment (case-sensitive).
/// Fields come before methods, alphabetical within each kind; overloads show
/// once per distinct arity, ascending.
fn member_candidates(
    class: &ClassInfo,
    partial: &str,
    method_kind: CandidateKind,
) -> Vec<Candidate> {
    let mut fields: Vec<&FieldInfo> = class
        .fields
        .values()
        .filter(|f| f.name.starts_with(partial))
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    let mut methods: Vec<&MethodInfo> = class
        .methods
        .values()
        .flatten()
        .filter(|m| m.name.starts_with(partial))
        .collect();
    methods.sort_by(|a, b| a.name.cmp(&b.name).then(a.arity().cmp(&b.arity())));
    methods.dedup_by(|a, b| a.name == b.name && a.arity() == b.arity());

    fields
        .into_iter()
        .map(Candidate::field)
        .chain(methods.into_iter().map(|m| Candidate::method(m, method_kind)))
        .collect()
}

/// No dotted path yet: members of the default root, then the bound root
/// objects, then SpEL special variables and keywords.
fn top_level_candidates(ctx: &CompletionContext, table: &SymbolTable) -> Vec<Candidate> {
    let partial = ctx.partial.as_str();
    let mut out = Vec::new();

    if let TypeRef::Known(class) = table.default_root_type() {
        out.extend(member_candidates(&class, partial, CandidateKind::Method));
    }

    let mut roots: Vec<(&Arc<str>, &Arc<str>)> = table
        .roots()
        .filter(|(name, _)| name.starts_with(partial))
        .collect();
    roots.sort_by(|a, b| a.0.cmp(b.0));
    out.extend(
        roots
            .into_iter()
            .map(|(name, class)| Candidate::variable(name, class)),
    );

    out.extend(
        keywords::all()
            .filter(|kw| kw.starts_with(partial))
            .map(Candidate::keyword),
    );

    out
}
