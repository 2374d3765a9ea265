//! Concept payload types
//!
//! Every extracted fact is a `Concept` variant holding a plain payload
//! struct. Named payloads carry a `ConceptId` and an FQN slot that starts
//! unset; the symbol resolution subsystem fills the slot from its side-table
//! exactly once, at end-of-file finalization. Unresolved slots stay unset
//! permanently.

use crate::fqn::Fqn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Locally-unique id of a concept within one file extraction.
///
/// Used as the key into the resolver's FQN side-table, so the resolver never
/// holds references into already-returned concept graphs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ConceptId(pub u32);

/// Extension side-channel for upstream processors; excluded from output.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Source span of a declaration, 1-indexed inclusive lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
}

impl Span {
    pub fn from_node(node: &tree_sitter::Node) -> Self {
        Self {
            start_line: node.start_position().row as u32 + 1,
            end_line: node.end_position().row as u32 + 1,
        }
    }
}

/// Kinds of concepts the core extracts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConceptKind {
    Module,
    Class,
    Interface,
    Function,
    Method,
    Property,
    Variable,
    Enum,
    TypeAlias,
    Namespace,
    Dependency,
    Export,
    ExternalModule,
    ExternalDeclaration,
}

impl ConceptKind {
    /// Get the string representation of the concept kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ConceptKind::Module => "module",
            ConceptKind::Class => "class",
            ConceptKind::Interface => "interface",
            ConceptKind::Function => "function",
            ConceptKind::Method => "method",
            ConceptKind::Property => "property",
            ConceptKind::Variable => "variable",
            ConceptKind::Enum => "enum",
            ConceptKind::TypeAlias => "type_alias",
            ConceptKind::Namespace => "namespace",
            ConceptKind::Dependency => "dependency",
            ConceptKind::Export => "export",
            ConceptKind::ExternalModule => "external_module",
            ConceptKind::ExternalDeclaration => "external_declaration",
        }
    }

    /// Get all concept kinds
    pub fn all() -> &'static [ConceptKind] {
        &[
            ConceptKind::Module,
            ConceptKind::Class,
            ConceptKind::Interface,
            ConceptKind::Function,
            ConceptKind::Method,
            ConceptKind::Property,
            ConceptKind::Variable,
            ConceptKind::Enum,
            ConceptKind::TypeAlias,
            ConceptKind::Namespace,
            ConceptKind::Dependency,
            ConceptKind::Export,
            ConceptKind::ExternalModule,
            ConceptKind::ExternalDeclaration,
        ]
    }
}

impl FromStr for ConceptKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "module" => Ok(ConceptKind::Module),
            "class" => Ok(ConceptKind::Class),
            "interface" => Ok(ConceptKind::Interface),
            "function" | "fn" => Ok(ConceptKind::Function),
            "method" => Ok(ConceptKind::Method),
            "property" | "field" => Ok(ConceptKind::Property),
            "variable" | "var" | "const" | "let" => Ok(ConceptKind::Variable),
            "enum" => Ok(ConceptKind::Enum),
            "type_alias" | "typealias" | "type" => Ok(ConceptKind::TypeAlias),
            "namespace" => Ok(ConceptKind::Namespace),
            "dependency" => Ok(ConceptKind::Dependency),
            "export" => Ok(ConceptKind::Export),
            "external_module" => Ok(ConceptKind::ExternalModule),
            "external_declaration" => Ok(ConceptKind::ExternalDeclaration),
            _ => Err(crate::Error::InvalidFqn(format!(
                "Unknown concept kind: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ConceptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Member visibility as declared in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Binding form of a variable declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Const,
    Let,
    Var,
}

/// Whether a reference points at a module or a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Module,
    Declaration,
}

/// Export surface classification of one export entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Value,
    Type,
    Namespace,
}

/// A reference to a type by name, resolved to an FQN after the file's
/// declaration set is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
}

/// A function or method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub type_str: Option<String>,
    pub optional: bool,
}

/// An in-project source file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConcept {
    #[serde(flatten)]
    pub fqn: Fqn,
    /// Absolute path of the source file
    pub path: String,
    /// Path relative to the project root
    pub relative_path: String,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A class declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub is_abstract: bool,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub type_parameters: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A method on a class or interface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_async: bool,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub span: Span,
}

/// A property on a class or interface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub optional: bool,
    #[serde(rename = "type")]
    pub type_str: Option<String>,
    pub span: Span,
}

/// An interface declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub extends: Vec<TypeRef>,
    pub type_parameters: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A standalone function declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub is_async: bool,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A module-, namespace- or block-scoped variable declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub binding: BindingKind,
    #[serde(rename = "type")]
    pub type_str: Option<String>,
    /// Inline initializer value, when the type oracle recognizes one
    pub value: Option<String>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// One member of an enum declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub name: String,
    pub value: Option<String>,
}

/// An enum declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A type alias declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub type_parameters: Vec<String>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A namespace (internal module) declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDecl {
    #[serde(skip)]
    pub id: ConceptId,
    pub name: String,
    #[serde(flatten)]
    pub fqn: Option<Fqn>,
    pub span: Span,
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: Metadata,
}

/// A recorded reference from one declaration or module to another.
///
/// After the end-of-file merge, at most one dependency exists per distinct
/// (source, target) pair; `cardinality` is the collapsed reference count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    #[serde(skip)]
    pub id: ConceptId,
    /// Global FQN of the referencing scope
    pub source: String,
    pub source_kind: RefKind,
    /// Identifier text as written at the reference site
    #[serde(skip)]
    pub target_text: String,
    /// Resolved global FQN of the target; unresolved declaration targets are
    /// discarded by the merge
    pub target: Option<String>,
    pub target_kind: RefKind,
    pub cardinality: u32,
}

/// One export statement entry, possibly a re-export pointer that the
/// cross-file pass flattens into a direct export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    #[serde(skip)]
    pub id: ConceptId,
    /// Exported identifier; `None` for a wildcard `export *`
    pub identifier: Option<String>,
    pub alias: Option<String>,
    /// FQN of the underlying declaration, once resolved
    pub decl_fqn: Option<Fqn>,
    /// Raw module specifier for re-exports (`export ... from "..."`)
    pub import_source: Option<String>,
    /// Whether `import_source` resolves inside the analyzed project
    pub source_in_project: Option<bool>,
    pub is_default: bool,
    pub export_kind: ExportKind,
    /// Absolute path of the exporting file
    pub file_path: String,
}

/// Synthesized stand-in for an out-of-project module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalModule {
    pub fqn: String,
    pub declarations: Vec<ExternalDeclaration>,
}

/// Synthesized stand-in for a referenced member of an external module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDeclaration {
    pub name: String,
    pub fqn: String,
}

/// An extracted fact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "concept", rename_all = "snake_case")]
pub enum Concept {
    Module(ModuleConcept),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Function(FunctionDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
    Variable(VariableDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
    Namespace(NamespaceDecl),
    Dependency(Dependency),
    Export(ExportEntry),
    ExternalModule(ExternalModule),
    ExternalDeclaration(ExternalDeclaration),
}

impl Concept {
    /// Get the kind of this concept
    pub fn kind(&self) -> ConceptKind {
        match self {
            Concept::Module(_) => ConceptKind::Module,
            Concept::Class(_) => ConceptKind::Class,
            Concept::Interface(_) => ConceptKind::Interface,
            Concept::Function(_) => ConceptKind::Function,
            Concept::Method(_) => ConceptKind::Method,
            Concept::Property(_) => ConceptKind::Property,
            Concept::Variable(_) => ConceptKind::Variable,
            Concept::Enum(_) => ConceptKind::Enum,
            Concept::TypeAlias(_) => ConceptKind::TypeAlias,
            Concept::Namespace(_) => ConceptKind::Namespace,
            Concept::Dependency(_) => ConceptKind::Dependency,
            Concept::Export(_) => ConceptKind::Export,
            Concept::ExternalModule(_) => ConceptKind::ExternalModule,
            Concept::ExternalDeclaration(_) => ConceptKind::ExternalDeclaration,
        }
    }

    /// Declared name of a named concept
    pub fn name(&self) -> Option<&str> {
        match self {
            Concept::Class(c) => Some(&c.name),
            Concept::Interface(c) => Some(&c.name),
            Concept::Function(c) => Some(&c.name),
            Concept::Method(c) => Some(&c.name),
            Concept::Property(c) => Some(&c.name),
            Concept::Variable(c) => Some(&c.name),
            Concept::Enum(c) => Some(&c.name),
            Concept::TypeAlias(c) => Some(&c.name),
            Concept::Namespace(c) => Some(&c.name),
            _ => None,
        }
    }

    /// Resolved FQN of a named concept, if resolution succeeded
    pub fn fqn(&self) -> Option<&Fqn> {
        match self {
            Concept::Module(c) => Some(&c.fqn),
            Concept::Class(c) => c.fqn.as_ref(),
            Concept::Interface(c) => c.fqn.as_ref(),
            Concept::Function(c) => c.fqn.as_ref(),
            Concept::Method(c) => c.fqn.as_ref(),
            Concept::Property(c) => c.fqn.as_ref(),
            Concept::Variable(c) => c.fqn.as_ref(),
            Concept::Enum(c) => c.fqn.as_ref(),
            Concept::TypeAlias(c) => c.fqn.as_ref(),
            Concept::Namespace(c) => c.fqn.as_ref(),
            _ => None,
        }
    }

    /// Visit every FQN slot in this concept, including nested members and
    /// type references. The resolver's finalization pass uses this to
    /// materialize side-table entries without holding back-references.
    pub fn for_each_fqn_slot(&mut self, f: &mut dyn FnMut(ConceptId, &mut Option<Fqn>)) {
        fn visit_type_ref(r: &mut TypeRef, f: &mut dyn FnMut(ConceptId, &mut Option<Fqn>)) {
            f(r.id, &mut r.fqn);
        }
        match self {
            Concept::Class(c) => {
                f(c.id, &mut c.fqn);
                if let Some(ext) = c.extends.as_mut() {
                    visit_type_ref(ext, f);
                }
                for imp in &mut c.implements {
                    visit_type_ref(imp, f);
                }
                for m in &mut c.methods {
                    f(m.id, &mut m.fqn);
                }
                for p in &mut c.properties {
                    f(p.id, &mut p.fqn);
                }
            }
            Concept::Interface(c) => {
                f(c.id, &mut c.fqn);
                for ext in &mut c.extends {
                    visit_type_ref(ext, f);
                }
                for m in &mut c.methods {
                    f(m.id, &mut m.fqn);
                }
                for p in &mut c.properties {
                    f(p.id, &mut p.fqn);
                }
            }
            Concept::Function(c) => f(c.id, &mut c.fqn),
            Concept::Method(c) => f(c.id, &mut c.fqn),
            Concept::Property(c) => f(c.id, &mut c.fqn),
            Concept::Variable(c) => f(c.id, &mut c.fqn),
            Concept::Enum(c) => f(c.id, &mut c.fqn),
            Concept::TypeAlias(c) => f(c.id, &mut c.fqn),
            Concept::Namespace(c) => f(c.id, &mut c.fqn),
            Concept::Export(c) => f(c.id, &mut c.decl_fqn),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_kind_roundtrip() {
        for kind in ConceptKind::all() {
            let s = kind.as_str();
            let parsed: ConceptKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_metadata_excluded_from_output() {
        let mut var = VariableDecl {
            id: ConceptId(1),
            name: "x".to_string(),
            fqn: Some(Fqn::new("\"/p/a.ts\".x", "\"./a.ts\".x")),
            binding: BindingKind::Const,
            type_str: Some("number".to_string()),
            value: Some("1".to_string()),
            span: Span {
                start_line: 1,
                end_line: 1,
            },
            doc: None,
            metadata: Metadata::new(),
        };
        var.metadata
            .insert("internal".to_string(), serde_json::json!(true));

        let json = serde_json::to_value(Concept::Variable(var)).unwrap();
        assert!(json.get("metadata").is_none());
        assert_eq!(json["globalFqn"], "\"/p/a.ts\".x");
        assert_eq!(json["concept"], "variable");
    }

    #[test]
    fn test_fqn_slot_visit() {
        let mut class = Concept::Class(ClassDecl {
            id: ConceptId(1),
            name: "Foo".to_string(),
            fqn: None,
            is_abstract: false,
            extends: Some(TypeRef {
                id: ConceptId(2),
                name: "Base".to_string(),
                fqn: None,
            }),
            implements: vec![],
            type_parameters: vec![],
            methods: vec![],
            properties: vec![],
            span: Span {
                start_line: 1,
                end_line: 3,
            },
            doc: None,
            metadata: Metadata::new(),
        });

        let mut visited = Vec::new();
        class.for_each_fqn_slot(&mut |id, _slot| visited.push(id));
        assert_eq!(visited, vec![ConceptId(1), ConceptId(2)]);
    }
}
