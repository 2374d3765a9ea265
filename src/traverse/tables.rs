//! Traverser table - which node kinds are walked, and into which slots
//!
//! Built once at pipeline construction and passed by reference into the
//! traversal; extensions add entries through the builder, never replacing
//! base entries. Kinds absent from the table are silently skipped.

use std::collections::BTreeMap;

/// Which named children of a node kind the engine descends into
#[derive(Debug, Clone, Copy)]
pub enum SlotSpec {
    /// Every named child; slot name is the child's field name when present
    AllNamed,
    /// Only children under the listed field names; an empty list makes the
    /// kind a leaf whose processor reads the subtree itself
    Fields(&'static [&'static str]),
}

/// Immutable kind → slot-spec dispatch table
#[derive(Debug, Default)]
pub struct TraverserTable {
    entries: BTreeMap<&'static str, SlotSpec>,
}

impl TraverserTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a traverser for a node kind. Additive: an existing base
    /// entry wins over a later extension entry.
    pub fn register(&mut self, kind: &'static str, spec: SlotSpec) {
        self.entries.entry(kind).or_insert(spec);
    }

    /// Look up the slot spec for a node kind
    pub fn get(&self, kind: &str) -> Option<&SlotSpec> {
        self.entries.get(kind)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The base table covering the TypeScript grammar surface the core models
pub fn default_traversers() -> TraverserTable {
    let mut table = TraverserTable::new();

    // File root
    table.register("program", SlotSpec::AllNamed);

    // Import/export statements read their own subtree
    table.register("import_statement", SlotSpec::Fields(&[]));
    table.register("export_statement", SlotSpec::AllNamed);

    // Declarations
    table.register("class_declaration", SlotSpec::Fields(&["body"]));
    table.register("abstract_class_declaration", SlotSpec::Fields(&["body"]));
    table.register("class_body", SlotSpec::AllNamed);
    table.register("method_definition", SlotSpec::Fields(&["return_type", "body"]));
    table.register("public_field_definition", SlotSpec::Fields(&["type", "value"]));
    table.register("interface_declaration", SlotSpec::Fields(&[]));
    table.register("function_declaration", SlotSpec::Fields(&["return_type", "body"]));
    table.register(
        "generator_function_declaration",
        SlotSpec::Fields(&["return_type", "body"]),
    );
    table.register("lexical_declaration", SlotSpec::AllNamed);
    table.register("variable_declaration", SlotSpec::AllNamed);
    table.register("variable_declarator", SlotSpec::Fields(&["type", "value"]));
    table.register("enum_declaration", SlotSpec::Fields(&[]));
    table.register("type_alias_declaration", SlotSpec::Fields(&["value"]));
    table.register("internal_module", SlotSpec::Fields(&["body"]));
    table.register("module", SlotSpec::Fields(&["body"]));

    // Statements
    table.register("statement_block", SlotSpec::AllNamed);
    table.register("expression_statement", SlotSpec::AllNamed);
    table.register("return_statement", SlotSpec::AllNamed);
    table.register("throw_statement", SlotSpec::AllNamed);
    table.register("if_statement", SlotSpec::AllNamed);
    table.register("else_clause", SlotSpec::AllNamed);
    table.register("for_statement", SlotSpec::AllNamed);
    table.register("for_in_statement", SlotSpec::AllNamed);
    table.register("while_statement", SlotSpec::AllNamed);
    table.register("do_statement", SlotSpec::AllNamed);
    table.register("try_statement", SlotSpec::AllNamed);
    table.register("catch_clause", SlotSpec::Fields(&["body"]));
    table.register("finally_clause", SlotSpec::AllNamed);
    table.register("switch_statement", SlotSpec::AllNamed);
    table.register("switch_body", SlotSpec::AllNamed);
    table.register("switch_case", SlotSpec::AllNamed);
    table.register("switch_default", SlotSpec::AllNamed);

    // Expressions that can carry references
    table.register("call_expression", SlotSpec::Fields(&["arguments"]));
    table.register("new_expression", SlotSpec::Fields(&["arguments"]));
    table.register("arguments", SlotSpec::AllNamed);
    table.register("binary_expression", SlotSpec::AllNamed);
    table.register("unary_expression", SlotSpec::AllNamed);
    table.register("ternary_expression", SlotSpec::AllNamed);
    table.register("parenthesized_expression", SlotSpec::AllNamed);
    table.register("assignment_expression", SlotSpec::AllNamed);
    table.register("augmented_assignment_expression", SlotSpec::AllNamed);
    table.register("await_expression", SlotSpec::AllNamed);
    table.register("arrow_function", SlotSpec::Fields(&["body"]));
    table.register("object", SlotSpec::AllNamed);
    table.register("array", SlotSpec::AllNamed);
    table.register("pair", SlotSpec::Fields(&["value"]));

    // Type positions
    table.register("type_annotation", SlotSpec::AllNamed);
    table.register("type_identifier", SlotSpec::Fields(&[]));
    table.register("nested_type_identifier", SlotSpec::Fields(&[]));
    table.register("generic_type", SlotSpec::AllNamed);
    table.register("type_arguments", SlotSpec::AllNamed);
    table.register("union_type", SlotSpec::AllNamed);
    table.register("intersection_type", SlotSpec::AllNamed);
    table.register("array_type", SlotSpec::AllNamed);
    table.register("tuple_type", SlotSpec::AllNamed);

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_entries_win_over_extensions() {
        let mut table = default_traversers();
        let before = table.len();
        // A later registration for an existing kind is ignored
        table.register("program", SlotSpec::Fields(&[]));
        assert_eq!(table.len(), before);
        assert!(matches!(table.get("program"), Some(SlotSpec::AllNamed)));
    }

    #[test]
    fn test_unmodeled_kind_absent() {
        let table = default_traversers();
        assert!(table.get("jsx_element").is_none());
    }
}
