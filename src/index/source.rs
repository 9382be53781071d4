use std::sync::Arc;
use tree_sitter::{Node, Parser};

use super::{ClassInfo, FieldInfo, MethodInfo};

/// A file the scan skips entirely. Recorded as a diagnostic, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("tree-sitter failed to produce a parse tree")]
    Unparseable,
    #[error("source contains syntax errors")]
    Syntax,
}

/// Parse one Java source file and return every class/interface declared in it,
/// nested types included. Fields keep their declared type text (generics and
/// all); methods keep name, return type and ordered parameter types.
pub fn parse_java_source(source: &str, function_suffix: &str) -> Result<Vec<ClassInfo>, ParseError> {
    let mut parser = make_java_parser();
    let tree = parser.parse(source, None).ok_or(ParseError::Unparseable)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::Syntax);
    }

    let bytes = source.as_bytes();
    let package = extract_package(root, bytes);
    let mut results = Vec::new();
    collect_classes(
        root,
        bytes,
        package.as_deref(),
        None,
        function_suffix,
        &mut results,
    );
    Ok(results)
}

fn collect_classes(
    node: Node,
    bytes: &[u8],
    package: Option<&str>,
    outer: Option<&str>,
    function_suffix: &str,
    out: &mut Vec<ClassInfo>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration" => {
                if let Some((info, local_path)) =
                    parse_type_declaration(child, bytes, package, outer, function_suffix)
                {
                    // Inner classes are indexed too, qualified through the outer path.
                    if let Some(body) = child.child_by_field_name("body") {
                        collect_classes(
                            body,
                            bytes,
                            package,
                            Some(&local_path),
                            function_suffix,
                            out,
                        );
                    }
                    out.push(info);
                }
            }
            _ => collect_classes(child, bytes, package, outer, function_suffix, out),
        }
    }
}

fn parse_type_declaration(
    node: Node,
    bytes: &[u8],
    package: Option<&str>,
    outer: Option<&str>,
    function_suffix: &str,
) -> Option<(ClassInfo, String)> {
    let name = node_text(node.child_by_field_name("name")?, bytes);
    if name.is_empty() {
        return None;
    }

    let local_path = match outer {
        Some(o) => format!("{o}.{name}"),
        None => name.to_string(),
    };
    let qualified = match package {
        Some(pkg) => format!("{pkg}.{local_path}"),
        None => local_path.clone(),
    };

    let mut fields = Vec::new();
    let mut methods = Vec::new();

    // Record components behave as readable properties.
    if node.kind() == "record_declaration"
        && let Some(params) = node.child_by_field_name("parameters")
    {
        fields.extend(parse_record_components(params, bytes));
    }

    if let Some(body) = node.child_by_field_name("body") {
        let members = if body.kind() == "enum_body" {
            body.named_children(&mut body.walk())
                .find(|n| n.kind() == "enum_body_declarations")
        } else {
            Some(body)
        };
        if let Some(members) = members {
            extract_fields(members, bytes, &mut fields);
            extract_methods(members, bytes, &mut methods);
        }
    }

    let info = ClassInfo::new(
        name,
        qualified.as_str(),
        fields,
        methods,
        name.ends_with(function_suffix),
    );
    Some((info, local_path))
}

fn extract_fields(body: Node, bytes: &[u8], out: &mut Vec<FieldInfo>) {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        // constant_declaration covers interface constants
        if child.kind() != "field_declaration" && child.kind() != "constant_declaration" {
            continue;
        }
        let Some(ty) = child.child_by_field_name("type") else {
            continue;
        };
        let declared_type = node_text(ty, bytes);
        let mut dc = child.walk();
        for declarator in child.children_by_field_name("declarator", &mut dc) {
            if let Some(name) = declarator.child_by_field_name("name") {
                out.push(FieldInfo {
                    name: Arc::from(node_text(name, bytes)),
                    declared_type: Arc::from(declared_type),
                });
            }
        }
    }
}

fn extract_methods(body: Node, bytes: &[u8], out: &mut Vec<MethodInfo>) {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        // Constructors are not completion targets.
        if child.kind() != "method_declaration" {
            continue;
        }
        if let Some(m) = parse_method(child, bytes) {
            out.push(m);
        }
    }
}

fn parse_method(node: Node, bytes: &[u8]) -> Option<MethodInfo> {
    let name = node_text(node.child_by_field_name("name")?, bytes);
    let return_type = node
        .child_by_field_name("type")
        .map(|n| node_text(n, bytes))
        .unwrap_or("void");
    let parameter_types = node
        .child_by_field_name("parameters")
        .map(|p| parse_parameter_types(p, bytes))
        .unwrap_or_default();

    Some(MethodInfo {
        name: Arc::from(name),
        return_type: Arc::from(return_type),
        parameter_types,
    })
}

fn parse_parameter_types(params: Node, bytes: &[u8]) -> Vec<Arc<str>> {
    let mut cursor = params.walk();
    params
        .children(&mut cursor)
        .filter(|c| matches!(c.kind(), "formal_parameter" | "spread_parameter"))
        .filter_map(|c| {
            // spread_parameter carries no field names; fall back to the first
            // type-shaped child.
            c.child_by_field_name("type").or_else(|| {
                c.named_children(&mut c.walk())
                    .find(|n| is_type_kind(n.kind()))
            })
        })
        .map(|n| Arc::from(node_text(n, bytes)))
        .collect()
}

fn parse_record_components(params: Node, bytes: &[u8]) -> Vec<FieldInfo> {
    let mut cursor = params.walk();
    params
        .children(&mut cursor)
        .filter(|c| c.kind() == "formal_parameter")
        .filter_map(|c| {
            let name = c.child_by_field_name("name")?;
            let ty = c.child_by_field_name("type")?;
            Some(FieldInfo {
                name: Arc::from(node_text(name, bytes)),
                declared_type: Arc::from(node_text(ty, bytes)),
            })
        })
        .collect()
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "void_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "type_identifier"
            | "array_type"
            | "generic_type"
            | "scoped_type_identifier"
    )
}

fn extract_package(root: Node, bytes: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    let pkg = root
        .children(&mut cursor)
        .find(|n| n.kind() == "package_declaration")?;
    pkg.named_children(&mut pkg.walk())
        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
        .map(|n| node_text(n, bytes).to_string())
}

fn node_text<'a>(node: Node, bytes: &'a [u8]) -> &'a str {
    node.utf8_text(bytes).unwrap_or("")
}

fn make_java_parser() -> Parser {
    let mut p = Parser::new();
    p.set_language(&tree_sitter_java::LANGUAGE.into())
        .expect("java grammar");
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_fields_and_methods_indexed() {
        let src = indoc::indoc! {r#"
            package com.example.rules;

            public class BaseInfo {
                private String idNumber;
                private String name;
                public int getAge() { return 0; }
                public boolean matchesAny(String a, String b) { return false; }
            }
        "#};
        let classes = parse_java_source(src, "Functions").unwrap();
        assert_eq!(classes.len(), 1);
        let base = &classes[0];
        assert_eq!(base.name.as_ref(), "BaseInfo");
        assert_eq!(base.qualified_name.as_ref(), "com.example.rules.BaseInfo");
        assert!(!base.is_function_class);

        assert_eq!(base.fields["idNumber"].declared_type.as_ref(), "String");
        assert_eq!(base.fields["name"].declared_type.as_ref(), "String");

        let get_age = &base.methods["getAge"][0];
        assert_eq!(get_age.return_type.as_ref(), "int");
        assert_eq!(get_age.arity(), 0);

        let matches_any = &base.methods["matchesAny"][0];
        assert_eq!(
            matches_any
                .parameter_types
                .iter()
                .map(|t| t.as_ref())
                .collect::<Vec<_>>(),
            vec!["String", "String"]
        );
    }

    #[test]
    fn test_overloads_grouped_by_name() {
        let src = indoc::indoc! {r#"
            public class RuleFunctions {
                public boolean containsAny(String value) { return false; }
                public boolean containsAny(String value, String other) { return false; }
            }
        "#};
        let classes = parse_java_source(src, "Functions").unwrap();
        let fns = &classes[0];
        assert!(fns.is_function_class);
        assert_eq!(fns.methods["containsAny"].len(), 2);
    }

    #[test]
    fn test_interface_methods_indexed() {
        let src = indoc::indoc! {r#"
            package com.example;

            public interface RiskService {
                int score(String idNumber);
            }
        "#};
        let classes = parse_java_source(src, "Functions").unwrap();
        let iface = &classes[0];
        assert_eq!(iface.name.as_ref(), "RiskService");
        assert!(iface.methods.contains_key("score"));
    }

    #[test]
    fn test_nested_class_qualified_through_outer() {
        let src = indoc::indoc! {r#"
            package com.example;

            public class Outer {
                public static class Inner {
                    private String code;
                }
            }
        "#};
        let classes = parse_java_source(src, "Functions").unwrap();
        let inner = classes
            .iter()
            .find(|c| c.name.as_ref() == "Inner")
            .unwrap();
        assert_eq!(inner.qualified_name.as_ref(), "com.example.Outer.Inner");
        assert!(inner.fields.contains_key("code"));
        assert!(classes.iter().any(|c| c.name.as_ref() == "Outer"));
    }

    #[test]
    fn test_generic_field_type_kept_verbatim() {
        let src = indoc::indoc! {r#"
            public class Holder {
                private List<BaseInfo> members;
            }
        "#};
        let classes = parse_java_source(src, "Functions").unwrap();
        assert_eq!(
            classes[0].fields["members"].declared_type.as_ref(),
            "List<BaseInfo>"
        );
    }

    #[test]
    fn test_syntax_error_is_reported_not_indexed() {
        let src = "public class Broken { void oops( }";
        assert!(matches!(
            parse_java_source(src, "Functions"),
            Err(ParseError::Syntax)
        ));
    }

    #[test]
    fn test_no_package_uses_simple_name_as_qualified() {
        let src = "public class Plain { }";
        let classes = parse_java_source(src, "Functions").unwrap();
        assert_eq!(classes[0].qualified_name.as_ref(), "Plain");
    }
}
