//! AST oracle wrapper - grammar selection and parsing
//!
//! Thin front over the tree-sitter grammars. The grammar is picked by file
//! extension; `.d.ts` declaration files parse with the TypeScript grammar.

use crate::{Error, Result};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Grammar used to parse one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceGrammar {
    TypeScript,
    Tsx,
    JavaScript,
}

/// Pick the grammar for a source path by extension
pub fn grammar_for_path(path: &Path) -> SourceGrammar {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tsx") => SourceGrammar::Tsx,
        Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => SourceGrammar::JavaScript,
        _ => SourceGrammar::TypeScript,
    }
}

/// Parse a source string with the given grammar
pub fn parse(source: &str, grammar: SourceGrammar) -> Result<Tree> {
    let language: tree_sitter::Language = match grammar {
        SourceGrammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        SourceGrammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        SourceGrammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
    };

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Parse(format!("Failed to load grammar: {}", e)))?;

    parser
        .parse(source, None)
        .ok_or_else(|| Error::Parse("Parser returned no tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_for_path() {
        assert_eq!(
            grammar_for_path(Path::new("a.ts")),
            SourceGrammar::TypeScript
        );
        assert_eq!(grammar_for_path(Path::new("a.d.ts")), SourceGrammar::TypeScript);
        assert_eq!(grammar_for_path(Path::new("a.tsx")), SourceGrammar::Tsx);
        assert_eq!(
            grammar_for_path(Path::new("a.js")),
            SourceGrammar::JavaScript
        );
    }

    #[test]
    fn test_parse_typescript() {
        let tree = parse("export const x: number = 1;", SourceGrammar::TypeScript).unwrap();
        assert_eq!(tree.root_node().kind(), "program");
        assert!(!tree.root_node().has_error());
    }
}
