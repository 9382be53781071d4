//! Splits the expression text under the caret into a dotted path plus the
//! in-progress final segment. Total: malformed input (unterminated literals,
//! unbalanced brackets) yields a best-effort context, never an error, since
//! completion must stay available mid-edit.

use super::context::{CompletionContext, CursorKind, PathSegment};

/// Tokenize `text` up to `caret` (0-based, counted in characters).
pub fn tokenize(text: &str, caret: usize) -> CompletionContext {
    let byte_caret = text
        .char_indices()
        .nth(caret)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let prefix = &text[..byte_caret];

    let chain = &prefix[chain_start(prefix)..];
    let (root_path, partial) = split_chain(chain);

    let cursor = if chain.starts_with('#') {
        CursorKind::Function
    } else if text[byte_caret..].starts_with('(') {
        CursorKind::Method
    } else {
        CursorKind::Property
    };

    CompletionContext {
        root_path,
        partial,
        cursor,
    }
}

/// Byte offset where the chain containing the caret begins. A chain is a
/// dotted sequence of identifiers, calls and selections: `a.b(x).?[...].c`.
/// Whitespace and operators at bracket depth 0 start a new chain; a balanced
/// bracket group stays inside its chain; text inside string literals is inert.
fn chain_start(prefix: &str) -> usize {
    let chars: Vec<(usize, char)> = prefix.char_indices().collect();
    let mut start = 0usize;
    // Chain starts saved at each open bracket, restored when it closes.
    let mut stack: Vec<usize> = Vec::new();
    let mut quote: Option<char> = None;

    for (i, &(pos, ch)) in chars.iter().enumerate() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        let next = chars.get(i + 1).map(|&(_, c)| c);
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => {
                stack.push(start);
                start = pos + ch.len_utf8();
            }
            ')' | ']' | '}' => {
                // Unbalanced close acts as a plain delimiter.
                start = stack.pop().unwrap_or(pos + ch.len_utf8());
            }
            '.' => {}
            // Selection/projection heads: `.?[...]`, `.![...]`, `.^[...]`
            '?' | '!' | '^' if next == Some('[') => {}
            c if is_ident_char(c) => {}
            _ => start = pos + ch.len_utf8(),
        }
    }
    start
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#'
}

/// Split a chain on `.` at bracket depth 0 outside string literals. Leading
/// pieces become path segments, the trailing piece (possibly empty) the
/// partial segment.
fn split_chain(chain: &str) -> (Vec<PathSegment>, String) {
    let mut pieces: Vec<&str> = Vec::new();
    let mut seg_start = 0usize;
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for (i, ch) in chain.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '.' if depth == 0 => {
                pieces.push(&chain[seg_start..i]);
                seg_start = i + 1;
            }
            _ => {}
        }
    }

    let partial = chain[seg_start..].trim().to_string();
    let segments = pieces.iter().map(|p| parse_segment(p)).collect();
    (segments, partial)
}

fn parse_segment(raw: &str) -> PathSegment {
    let raw = raw.trim();
    match raw.find('(') {
        Some(open) => PathSegment::call(raw[..open].trim(), call_arity(&raw[open..])),
        None => PathSegment::property(raw),
    }
}

/// Argument count of a call segment, commas counted at paren depth 1 only.
fn call_arity(args: &str) -> usize {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut commas = 0usize;
    let mut has_content = false;

    for ch in args.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                has_content = true;
            }
            '(' | '[' | '{' => {
                if depth > 0 {
                    has_content = true;
                }
                depth += 1;
            }
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 1 => commas += 1,
            c if depth >= 1 && !c.is_whitespace() => has_content = true,
            _ => {}
        }
    }

    if has_content { commas + 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_end(text: &str) -> CompletionContext {
        tokenize(text, text.chars().count())
    }

    #[test]
    fn test_simple_property_access() {
        let ctx = at_end("baseInfo.idN");
        assert_eq!(ctx.root_path, vec![PathSegment::property("baseInfo")]);
        assert_eq!(ctx.partial, "idN");
        assert_eq!(ctx.cursor, CursorKind::Property);
    }

    #[test]
    fn test_trailing_dot_gives_empty_partial() {
        let ctx = at_end("baseInfo.");
        assert_eq!(ctx.root_path, vec![PathSegment::property("baseInfo")]);
        assert_eq!(ctx.partial, "");
    }

    #[test]
    fn test_empty_expression() {
        let ctx = at_end("");
        assert!(ctx.root_path.is_empty());
        assert_eq!(ctx.partial, "");
        assert_eq!(ctx.cursor, CursorKind::Property);
    }

    #[test]
    fn test_closed_call_stays_in_path() {
        let ctx = at_end("baseInfo.getSpouse().idN");
        assert_eq!(
            ctx.root_path,
            vec![
                PathSegment::property("baseInfo"),
                PathSegment::call("getSpouse", 0),
            ]
        );
        assert_eq!(ctx.partial, "idN");
    }

    #[test]
    fn test_call_arguments_counted_by_arity() {
        let ctx = at_end("baseInfo.pick(a, f(x, y), 'lit').n");
        assert_eq!(
            ctx.root_path,
            vec![
                PathSegment::property("baseInfo"),
                PathSegment::call("pick", 3),
            ]
        );
    }

    #[test]
    fn test_chain_isolated_from_surrounding_expression() {
        let ctx = at_end("age > 18 && baseInfo.n");
        assert_eq!(ctx.root_path, vec![PathSegment::property("baseInfo")]);
        assert_eq!(ctx.partial, "n");
    }

    #[test]
    fn test_caret_inside_call_arguments_starts_fresh_chain() {
        let ctx = at_end("#fn.contains(baseInfo.idN");
        assert_eq!(ctx.root_path, vec![PathSegment::property("baseInfo")]);
        assert_eq!(ctx.partial, "idN");
    }

    #[test]
    fn test_dots_inside_string_literal_do_not_split() {
        let ctx = at_end("baseInfo.matches('a.b.c').le");
        assert_eq!(
            ctx.root_path,
            vec![
                PathSegment::property("baseInfo"),
                PathSegment::call("matches", 1),
            ]
        );
        assert_eq!(ctx.partial, "le");
    }

    #[test]
    fn test_selection_expression_does_not_break_the_chain() {
        let ctx = at_end("orders.?[price > 10].cou");
        assert_eq!(ctx.root_path.len(), 2);
        assert_eq!(ctx.root_path[0], PathSegment::property("orders"));
        assert_eq!(ctx.partial, "cou");
    }

    #[test]
    fn test_function_namespace_cursor() {
        let ctx = at_end("#fn.con");
        assert_eq!(ctx.root_path, vec![PathSegment::property("#fn")]);
        assert_eq!(ctx.partial, "con");
        assert_eq!(ctx.cursor, CursorKind::Function);
    }

    #[test]
    fn test_unterminated_literal_is_best_effort() {
        let ctx = at_end("name == 'abc.de");
        assert!(ctx.root_path.is_empty());
        assert_eq!(ctx.partial, "'abc.de");
    }

    #[test]
    fn test_caret_mid_text_ignores_the_rest() {
        //          0123456789012
        let text = "baseInfo.idNumber == null";
        let ctx = tokenize(text, 12);
        assert_eq!(ctx.root_path, vec![PathSegment::property("baseInfo")]);
        assert_eq!(ctx.partial, "idN");
    }

    #[test]
    fn test_caret_before_open_paren_is_method_cursor() {
        let text = "baseInfo.getAge()";
        let ctx = tokenize(text, 15);
        assert_eq!(ctx.partial, "getAge");
        assert_eq!(ctx.cursor, CursorKind::Method);
    }

    #[test]
    fn test_caret_past_end_clamps() {
        let ctx = tokenize("baseInfo.n", 999);
        assert_eq!(ctx.partial, "n");
    }

    #[test]
    fn test_unbalanced_close_bracket_does_not_panic() {
        let ctx = at_end("foo).bar");
        assert_eq!(ctx.root_path, vec![PathSegment::property("")]);
        assert_eq!(ctx.partial, "bar");
    }
}
