//! Type oracle - native type queries for expression nodes
//!
//! The parser/type-checker is an external collaborator. The core only needs
//! a query mapping an expression node to its resolved native type, used to
//! recognize member-access targets and inline values. `SyntacticOracle` is
//! the default implementation and answers from literal syntax alone; full
//! semantic inference is out of scope.

use tree_sitter::Node;

/// Query interface onto the external type checker
pub trait TypeOracle {
    /// Resolved native type of an expression node, if known
    fn type_of(&self, node: &Node, source: &str) -> Option<String>;

    /// Printable inline value for literal initializers, if recognized
    fn inline_value(&self, node: &Node, source: &str) -> Option<String>;
}

/// Default oracle answering from literal syntax only
#[derive(Debug, Default)]
pub struct SyntacticOracle;

impl TypeOracle for SyntacticOracle {
    fn type_of(&self, node: &Node, source: &str) -> Option<String> {
        let ty = match node.kind() {
            "string" | "template_string" => "string",
            "number" => "number",
            "true" | "false" => "boolean",
            "null" => "null",
            "undefined" => "undefined",
            "array" => "array",
            "object" => "object",
            "arrow_function" | "function_expression" | "generator_function" => "function",
            "new_expression" => {
                let ctor = node
                    .child_by_field_name("constructor")
                    .and_then(|n| n.utf8_text(source.as_bytes()).ok())?;
                return Some(ctor.to_string());
            }
            _ => return None,
        };
        Some(ty.to_string())
    }

    fn inline_value(&self, node: &Node, source: &str) -> Option<String> {
        match node.kind() {
            "string" | "number" | "true" | "false" | "null" | "undefined" => node
                .utf8_text(source.as_bytes())
                .ok()
                .map(|s| s.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, SourceGrammar};

    fn first_initializer(source: &str) -> (tree_sitter::Tree, String) {
        let tree = parse(source, SourceGrammar::TypeScript).unwrap();
        (tree, source.to_string())
    }

    #[test]
    fn test_literal_types() {
        let (tree, source) = first_initializer("const x = 42;");
        let root = tree.root_node();
        let declarator = root
            .named_child(0)
            .unwrap()
            .named_child(0)
            .unwrap();
        let value = declarator.child_by_field_name("value").unwrap();

        let oracle = SyntacticOracle;
        assert_eq!(oracle.type_of(&value, &source).as_deref(), Some("number"));
        assert_eq!(oracle.inline_value(&value, &source).as_deref(), Some("42"));
    }
}
