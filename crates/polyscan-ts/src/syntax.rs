//! Small helpers over tree-sitter JavaScript syntax nodes.

use tree_sitter::Node;

/// Source text of a node.
pub(crate) fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

/// Strips any number of enclosing parentheses.
pub(crate) fn unwrap_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Named children, skipping comments.
pub(crate) fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// Whether the node is a function expression of any form.
pub(crate) fn is_function(node: &Node<'_>) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

/// Whether the node introduces a new function scope.
pub(crate) fn is_function_scope(node: &Node<'_>) -> bool {
    is_function(node)
        || matches!(
            node.kind(),
            "function_declaration" | "generator_function_declaration" | "method_definition"
        )
}

/// Value of a string literal without quotes; `None` for other nodes.
///
/// Template strings count as literals only when they have no substitutions.
pub(crate) fn string_value(node: &Node<'_>, src: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => {
            let raw = text(node, src);
            Some(raw.get(1..raw.len().saturating_sub(1)).unwrap_or("").to_string())
        }
        "template_string" => {
            let mut cursor = node.walk();
            if node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution")
            {
                return None;
            }
            let raw = text(node, src);
            Some(raw.trim_matches('`').to_string())
        }
        _ => None,
    }
}

/// Outcome of reading an expression as a dotted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Path {
    /// `a`, `a.b.c`, `a['b']`.
    Static(Vec<String>),
    /// `a[expr]` or `a[expr].b.c` with a non-literal key.
    Computed {
        /// Text of the object expression.
        object: String,
        /// Text of the key expression.
        key: String,
        /// Static segments following the computed member.
        rest: Vec<String>,
    },
    /// Anything else.
    NotStatic,
}

/// Reads an identifier or member chain as path segments.
///
/// Leading global prefixes (`window.`) are dropped so `window.A.B` and
/// `A.B` name the same thing.
pub(crate) fn path_of(node: &Node<'_>, src: &[u8], strip: &[String]) -> Path {
    let node = unwrap_parens(*node);
    let mut segments = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "identifier" => {
                segments.push(text(&current, src).to_string());
                break;
            }
            "member_expression" => {
                let (Some(object), Some(property)) = (
                    current.child_by_field_name("object"),
                    current.child_by_field_name("property"),
                ) else {
                    return Path::NotStatic;
                };
                if current.child_by_field_name("optional_chain").is_some() {
                    return Path::NotStatic;
                }
                segments.push(text(&property, src).to_string());
                current = unwrap_parens(object);
            }
            "subscript_expression" => {
                let (Some(object), Some(index)) = (
                    current.child_by_field_name("object"),
                    current.child_by_field_name("index"),
                ) else {
                    return Path::NotStatic;
                };
                if let Some(key) = string_value(&index, src) {
                    segments.push(key);
                } else {
                    segments.reverse();
                    return Path::Computed {
                        object: text(&object, src).to_string(),
                        key: text(&index, src).to_string(),
                        rest: segments,
                    };
                }
                current = unwrap_parens(object);
            }
            _ => return Path::NotStatic,
        }
    }
    segments.reverse();
    while segments.len() > 1 && strip.iter().any(|p| *p == segments[0]) {
        segments.remove(0);
    }
    Path::Static(segments)
}

/// Dotted form of a static reference, or `None`.
pub(crate) fn dotted(node: &Node<'_>, src: &[u8], strip: &[String]) -> Option<String> {
    match path_of(node, src, strip) {
        Path::Static(segments) => Some(segments.join(".")),
        _ => None,
    }
}

/// The statement that owns the documentation of `node`.
///
/// Declarators document through their declaration, expressions through
/// their expression statement, and anything exported through the export.
pub(crate) fn doc_owner(node: Node<'_>) -> Node<'_> {
    let mut owner = node;
    if let Some(parent) = owner.parent() {
        if matches!(
            parent.kind(),
            "lexical_declaration" | "variable_declaration" | "expression_statement"
        ) {
            owner = parent;
        }
    }
    if let Some(parent) = owner.parent() {
        if parent.kind() == "export_statement" {
            owner = parent;
        }
    }
    owner
}

/// Nearest `/** ... */` block immediately preceding `node`.
///
/// Line comments and plain block comments between the two are skipped;
/// any other syntax ends the search.
pub(crate) fn leading_doc<'t>(node: &Node<'t>, src: &[u8]) -> Option<Node<'t>> {
    let mut sibling = node.prev_sibling();
    while let Some(candidate) = sibling {
        if candidate.kind() != "comment" {
            return None;
        }
        if text(&candidate, src).starts_with("/**") {
            return Some(candidate);
        }
        sibling = candidate.prev_sibling();
    }
    None
}

/// Property key of an object pair, method or field.
///
/// Returns `Err` with the key text for computed keys that are not literals.
pub(crate) fn property_name(key: &Node<'_>, src: &[u8]) -> Result<String, String> {
    match key.kind() {
        "string" => string_value(key, src).ok_or_else(|| text(key, src).to_string()),
        "computed_property_name" => key
            .named_child(0)
            .and_then(|inner| string_value(&inner, src))
            .ok_or_else(|| text(key, src).to_string()),
        _ => Ok(text(key, src).to_string()),
    }
}

/// Whether `node` has an anonymous child token with the given text.
pub(crate) fn has_token(node: &Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

/// Return statements of a function body, not descending into nested
/// functions or classes.
pub(crate) fn returns<'t>(body: &Node<'t>) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![*body];
    while let Some(node) = stack.pop() {
        if node.kind() == "return_statement" {
            found.push(node);
            continue;
        }
        let mut cursor = node.walk();
        let mut children: Vec<Node<'t>> = node
            .named_children(&mut cursor)
            .filter(|c| !is_function_scope(c) && !matches!(c.kind(), "class" | "class_declaration"))
            .collect();
        children.reverse();
        stack.extend(children);
    }
    found
}

/// Expression returned by a `return` statement, if any.
pub(crate) fn return_value<'t>(ret: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = ret.walk();
    let value = ret
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Parser, Tree};

    fn parse(src: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .unwrap();
        parser.parse(src, None).unwrap()
    }

    fn first_expression(tree: &Tree) -> Node<'_> {
        let stmt = tree.root_node().named_child(0).unwrap();
        stmt.named_child(0).unwrap()
    }

    #[test]
    fn reads_member_chains() {
        let src = "window.Polymer.Foo['Bar'];";
        let tree = parse(src);
        let expr = first_expression(&tree);
        let strip = vec!["window".to_string()];
        assert_eq!(
            path_of(&expr, src.as_bytes(), &strip),
            Path::Static(vec!["Polymer".into(), "Foo".into(), "Bar".into()])
        );
    }

    #[test]
    fn reports_computed_keys() {
        let src = "NS[key];";
        let tree = parse(src);
        let expr = first_expression(&tree);
        assert_eq!(
            path_of(&expr, src.as_bytes(), &[]),
            Path::Computed {
                object: "NS".into(),
                key: "key".into(),
                rest: vec![]
            }
        );
    }

    #[test]
    fn computed_key_inside_chain() {
        let src = "window.NS[key].Inner.Foo;";
        let tree = parse(src);
        let expr = first_expression(&tree);
        assert_eq!(
            path_of(&expr, src.as_bytes(), &[]),
            Path::Computed {
                object: "window.NS".into(),
                key: "key".into(),
                rest: vec!["Inner".into(), "Foo".into()]
            }
        );
    }

    #[test]
    fn calls_are_not_static() {
        let src = "a.b().c;";
        let tree = parse(src);
        let expr = first_expression(&tree);
        assert_eq!(path_of(&expr, src.as_bytes(), &[]), Path::NotStatic);
    }

    #[test]
    fn finds_nearest_doc_comment() {
        let src = "/** doc */\n// note\nconst a = 1;";
        let tree = parse(src);
        let decl = tree.root_node().named_child(2).unwrap();
        let doc = leading_doc(&decl, src.as_bytes()).unwrap();
        assert_eq!(text(&doc, src.as_bytes()), "/** doc */");
    }

    #[test]
    fn string_literals() {
        let src = "f('a', `b`, `c${d}`);";
        let tree = parse(src);
        let call = first_expression(&tree);
        let args = call.child_by_field_name("arguments").unwrap();
        let values: Vec<Option<String>> = named_children(&args)
            .iter()
            .map(|a| string_value(a, src.as_bytes()))
            .collect();
        assert_eq!(values, vec![Some("a".into()), Some("b".into()), None]);
    }
}
