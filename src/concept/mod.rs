//! Concept Model - extracted-fact value types
//!
//! A concept is one extracted fact (a class, a variable, a dependency edge).
//! Concepts are plain data grouped in a `ConceptMap` by the AST slot they
//! were produced under and by concept kind.

pub mod map;
pub mod model;

pub use map::ConceptMap;
pub use model::{
    BindingKind, ClassDecl, Concept, ConceptId, ConceptKind, Dependency, EnumDecl, EnumMember,
    ExportEntry, ExportKind, ExternalDeclaration, ExternalModule, FunctionDecl, InterfaceDecl,
    Metadata, MethodDecl, ModuleConcept, NamespaceDecl, Param, PropertyDecl, RefKind, Span,
    TypeAliasDecl, TypeRef, VariableDecl, Visibility,
};
