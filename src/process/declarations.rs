//! Declaration processors - classes, interfaces, functions, variables,
//! enums, type aliases and namespaces
//!
//! Each declaration opens its own body scope before registering, so
//! registration goes to the enclosing scope (`inside_own_scope`). The
//! declaration's FQN is not written directly: the processor schedules a
//! resolution of the registered name and the end-of-file flush fills the
//! slot from the side-table.

use super::modules::has_default_keyword;
use super::{ProcessingContext, Processor};
use crate::concept::{
    BindingKind, ClassDecl, Concept, ConceptKind, ConceptMap, EnumDecl, EnumMember, FunctionDecl,
    InterfaceDecl, Metadata, MethodDecl, NamespaceDecl, Param, PropertyDecl, RefKind, Span,
    TypeAliasDecl, TypeRef, VariableDecl, Visibility,
};
use crate::context::{ContextKey, ContextValue};
use crate::Result;
use tree_sitter::Node;

/// Name under which default-export declarations are registered and FQN'd
pub const DEFAULT_EXPORT_NAME: &str = "default";

// ---------------------------------------------------------------------------
// Shared helpers

/// Text of a node, or empty
fn text(node: &Node, ctx: &ProcessingContext) -> String {
    ctx.node_text(node)
}

/// Declared name from the `name` field
fn declared_name(node: &Node, ctx: &ProcessingContext) -> Option<String> {
    node.child_by_field_name("name").map(|n| text(&n, ctx))
}

/// A declaration is default when its parent export marks it `default`, or
/// when its module-level identifier matches the file's recorded
/// `export default name;`
fn is_default_export(node: &Node, name: Option<&str>, ctx: &ProcessingContext) -> bool {
    if let Some(parent) = node.parent() {
        if parent.kind() == "export_statement" && has_default_keyword(&parent) {
            return true;
        }
    }
    let at_module_scope = ctx
        .contexts
        .current_scope()
        .map(|s| s.global == ctx.file.module_global)
        .unwrap_or(false);
    if !at_module_scope {
        return false;
    }
    match (name, ctx.contexts.get(ContextKey::DefaultExportName)) {
        (Some(name), Some(recorded)) => recorded.as_text() == Some(name),
        _ => false,
    }
}

/// Registration name: `default` for default exports, the identifier otherwise
fn registration_name(node: &Node, name: Option<&str>, ctx: &ProcessingContext) -> String {
    if is_default_export(node, name, ctx) {
        DEFAULT_EXPORT_NAME.to_string()
    } else {
        name.unwrap_or(DEFAULT_EXPORT_NAME).to_string()
    }
}

/// Stash the registration name in the declaration's frame; the after hook
/// reads it back once the declaration's own scope is in effect.
fn remember_registration(reg: &str, ctx: &mut ProcessingContext) {
    ctx.contexts
        .set(ContextKey::RegistrationName, ContextValue::Text(reg.to_string()));
}

/// Registration name recorded by the before hook
fn recorded_registration(ctx: &ProcessingContext) -> Option<String> {
    ctx.contexts
        .get_local(ContextKey::RegistrationName)
        .and_then(ContextValue::as_text)
        .map(String::from)
}

/// Leading `/** ... */` comment, looked up past a wrapping export statement
fn doc_comment(node: &Node, ctx: &ProcessingContext) -> Option<String> {
    let mut anchor = *node;
    if let Some(parent) = node.parent() {
        if parent.kind() == "export_statement" {
            anchor = parent;
        }
    }
    let prev = anchor.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let raw = text(&prev, ctx);
    if !raw.starts_with("/**") {
        return None;
    }
    let cleaned = raw
        .trim_start_matches("/**")
        .trim_end_matches("*/")
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Some(cleaned).filter(|s| !s.is_empty())
}

/// True if the node has an anonymous keyword child of the given kind
fn has_keyword(node: &Node, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == keyword);
    found
}

/// Text of the type inside a `type_annotation` field
fn annotated_type(node: &Node, field: &str, ctx: &ProcessingContext) -> Option<String> {
    let annotation = node.child_by_field_name(field)?;
    let inner = annotation.named_child(0)?;
    Some(text(&inner, ctx))
}

/// Parameters from a `formal_parameters` node
fn parse_params(node: &Node, ctx: &ProcessingContext) -> Vec<Param> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    let mut out = Vec::new();
    for param in params.named_children(&mut cursor) {
        if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
            continue;
        }
        let name = param
            .child_by_field_name("pattern")
            .map(|n| text(&n, ctx))
            .unwrap_or_default();
        out.push(Param {
            name,
            type_str: annotated_type(&param, "type", ctx),
            optional: param.kind() == "optional_parameter",
        });
    }
    out
}

/// Type parameter names from a `type_parameters` field
fn type_parameters(node: &Node, ctx: &ProcessingContext) -> Vec<String> {
    let Some(params) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "type_parameter")
        .filter_map(|n| n.child_by_field_name("name").map(|name| text(&name, ctx)))
        .collect()
}

/// Accessibility modifier of a class member
fn visibility(node: &Node, ctx: &ProcessingContext) -> Visibility {
    let mut cursor = node.walk();
    let modifier = node
        .children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier");
    match modifier.map(|n| text(&n, ctx)).as_deref() {
        Some("private") => Visibility::Private,
        Some("protected") => Visibility::Protected,
        _ => Visibility::Public,
    }
}

/// Unwrap method concepts from a taken list
fn unwrap_methods(taken: Vec<Concept>) -> Vec<MethodDecl> {
    taken
        .into_iter()
        .filter_map(|c| match c {
            Concept::Method(m) => Some(m),
            _ => None,
        })
        .collect()
}

/// Unwrap property concepts from a taken list
fn unwrap_properties(taken: Vec<Concept>) -> Vec<PropertyDecl> {
    taken
        .into_iter()
        .filter_map(|c| match c {
            Concept::Property(p) => Some(p),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Classes

pub struct ClassProcessor;

impl Processor for ClassProcessor {
    fn name(&self) -> &'static str {
        "class"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["class_declaration", "abstract_class_declaration"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let name = declared_name(node, ctx);
        let reg = registration_name(node, name.as_deref(), ctx);
        ctx.contexts.open_scope(Some(&reg));
        remember_registration(&reg, ctx);
        ctx.register_declaration(&reg, true)?;
        let scope_global = ctx.contexts.current_scope().map(|s| s.global.clone());
        if let Some(global) = scope_global {
            ctx.contexts
                .set(ContextKey::DependencySource, ContextValue::Text(global));
        }
        Ok(())
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx);
        let reg = recorded_registration(ctx)
            .unwrap_or_else(|| registration_name(node, name.as_deref(), ctx));

        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&reg, id);

        let mut out = Vec::new();
        let mut extends = None;
        let mut implements = Vec::new();
        if let Some(heritage) = find_child_of_kind(node, "class_heritage") {
            for (clause_kind, type_name) in heritage_types(&heritage, ctx) {
                let ref_id = ctx.next_id();
                ctx.schedule_fqn_resolution(&type_name, ref_id);
                out.push(Concept::Dependency(ctx.register_dependency(
                    &type_name,
                    RefKind::Declaration,
                    true,
                )?));
                let type_ref = TypeRef {
                    id: ref_id,
                    name: type_name,
                    fqn: None,
                };
                if clause_kind == "extends_clause" && extends.is_none() {
                    extends = Some(type_ref);
                } else {
                    implements.push(type_ref);
                }
            }
        }

        let methods = unwrap_methods(children.take("body", ConceptKind::Method));
        let properties = unwrap_properties(children.take("body", ConceptKind::Property));

        out.push(Concept::Class(ClassDecl {
            id,
            name: name.unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string()),
            fqn: None,
            is_abstract: node.kind() == "abstract_class_declaration",
            extends,
            implements,
            type_parameters: type_parameters(node, ctx),
            methods,
            properties,
            span: Span::from_node(node),
            doc: doc_comment(node, ctx),
            metadata: Metadata::new(),
        }));
        Ok(out)
    }
}

fn find_child_of_kind<'tree>(node: &Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// (clause kind, referenced type name) pairs from a class heritage
fn heritage_types(heritage: &Node, ctx: &ProcessingContext) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    let mut cursor = heritage.walk();
    for clause in heritage.named_children(&mut cursor) {
        match clause.kind() {
            "extends_clause" => {
                let mut inner = clause.walk();
                for value in clause.named_children(&mut inner) {
                    if matches!(
                        value.kind(),
                        "identifier" | "member_expression" | "type_identifier" | "nested_type_identifier"
                    ) {
                        out.push(("extends_clause", text(&value, ctx)));
                    }
                }
            }
            "implements_clause" => {
                let mut inner = clause.walk();
                for ty in clause.named_children(&mut inner) {
                    if matches!(
                        ty.kind(),
                        "type_identifier" | "nested_type_identifier" | "generic_type"
                    ) {
                        let name = ty
                            .child_by_field_name("name")
                            .map(|n| text(&n, ctx))
                            .unwrap_or_else(|| text(&ty, ctx));
                        out.push(("implements_clause", name));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Class members

pub struct MethodProcessor;

impl Processor for MethodProcessor {
    fn name(&self) -> &'static str {
        "method"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["method_definition"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let name = declared_name(node, ctx).unwrap_or_default();
        ctx.contexts.open_scope(Some(&name));
        ctx.register_declaration(&name, true)?;
        let scope_global = ctx.contexts.current_scope().map(|s| s.global.clone());
        if let Some(global) = scope_global {
            ctx.contexts
                .set(ContextKey::DependencySource, ContextValue::Text(global));
        }
        Ok(())
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx).unwrap_or_default();
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&name, id);

        Ok(vec![Concept::Method(MethodDecl {
            id,
            name,
            fqn: None,
            visibility: visibility(node, ctx),
            is_static: has_keyword(node, "static"),
            is_async: has_keyword(node, "async"),
            params: parse_params(node, ctx),
            return_type: annotated_type(node, "return_type", ctx),
            span: Span::from_node(node),
        })])
    }
}

pub struct PropertyProcessor;

impl Processor for PropertyProcessor {
    fn name(&self) -> &'static str {
        "property"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["public_field_definition"]
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx).unwrap_or_default();
        ctx.register_declaration(&name, false)?;
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&name, id);

        let type_str = annotated_type(node, "type", ctx).or_else(|| {
            node.child_by_field_name("value")
                .and_then(|v| ctx.oracle.type_of(&v, ctx.source))
        });

        Ok(vec![Concept::Property(PropertyDecl {
            id,
            name,
            fqn: None,
            visibility: visibility(node, ctx),
            is_static: has_keyword(node, "static"),
            optional: has_keyword(node, "?"),
            type_str,
            span: Span::from_node(node),
        })])
    }
}

// ---------------------------------------------------------------------------
// Interfaces

pub struct InterfaceProcessor;

impl Processor for InterfaceProcessor {
    fn name(&self) -> &'static str {
        "interface"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["interface_declaration"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let name = declared_name(node, ctx);
        let reg = registration_name(node, name.as_deref(), ctx);
        ctx.contexts.open_scope(Some(&reg));
        remember_registration(&reg, ctx);
        ctx.register_declaration(&reg, true)?;
        let scope_global = ctx.contexts.current_scope().map(|s| s.global.clone());
        if let Some(global) = scope_global {
            ctx.contexts
                .set(ContextKey::DependencySource, ContextValue::Text(global));
        }
        Ok(())
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx);
        let reg = recorded_registration(ctx)
            .unwrap_or_else(|| registration_name(node, name.as_deref(), ctx));
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&reg, id);

        let mut out = Vec::new();
        let mut extends = Vec::new();
        for type_name in interface_extends(node, ctx) {
            let ref_id = ctx.next_id();
            ctx.schedule_fqn_resolution(&type_name, ref_id);
            out.push(Concept::Dependency(ctx.register_dependency(
                &type_name,
                RefKind::Declaration,
                true,
            )?));
            extends.push(TypeRef {
                id: ref_id,
                name: type_name,
                fqn: None,
            });
        }

        let (methods, properties) = interface_members(node, ctx)?;

        out.push(Concept::Interface(InterfaceDecl {
            id,
            name: name.unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string()),
            fqn: None,
            extends,
            type_parameters: type_parameters(node, ctx),
            methods,
            properties,
            span: Span::from_node(node),
            doc: doc_comment(node, ctx),
            metadata: Metadata::new(),
        }));
        Ok(out)
    }
}

fn interface_extends(node: &Node, ctx: &ProcessingContext) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !child.kind().contains("extends") {
            continue;
        }
        let mut inner = child.walk();
        for ty in child.named_children(&mut inner) {
            if matches!(
                ty.kind(),
                "type_identifier" | "nested_type_identifier" | "generic_type"
            ) {
                let name = ty
                    .child_by_field_name("name")
                    .map(|n| text(&n, ctx))
                    .unwrap_or_else(|| text(&ty, ctx));
                out.push(name);
            }
        }
    }
    out
}

/// Interface members are read directly rather than traversed; the interface
/// scope was opened in the before hook, so registrations land inside it.
fn interface_members(
    node: &Node,
    ctx: &mut ProcessingContext,
) -> Result<(Vec<MethodDecl>, Vec<PropertyDecl>)> {
    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let Some(body) = node.child_by_field_name("body") else {
        return Ok((methods, properties));
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let Some(member_name) = declared_name(&member, ctx) else {
            continue;
        };
        match member.kind() {
            "method_signature" => {
                ctx.register_declaration(&member_name, false)?;
                let id = ctx.next_id();
                ctx.schedule_fqn_resolution(&member_name, id);
                methods.push(MethodDecl {
                    id,
                    name: member_name,
                    fqn: None,
                    visibility: Visibility::Public,
                    is_static: false,
                    is_async: false,
                    params: parse_params(&member, ctx),
                    return_type: annotated_type(&member, "return_type", ctx),
                    span: Span::from_node(&member),
                });
            }
            "property_signature" => {
                ctx.register_declaration(&member_name, false)?;
                let id = ctx.next_id();
                ctx.schedule_fqn_resolution(&member_name, id);
                properties.push(PropertyDecl {
                    id,
                    name: member_name,
                    fqn: None,
                    visibility: Visibility::Public,
                    is_static: false,
                    optional: has_keyword(&member, "?"),
                    type_str: annotated_type(&member, "type", ctx),
                    span: Span::from_node(&member),
                });
            }
            _ => {}
        }
    }
    Ok((methods, properties))
}

// ---------------------------------------------------------------------------
// Functions

pub struct FunctionProcessor;

impl Processor for FunctionProcessor {
    fn name(&self) -> &'static str {
        "function"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["function_declaration", "generator_function_declaration"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let name = declared_name(node, ctx);
        let reg = registration_name(node, name.as_deref(), ctx);
        ctx.contexts.open_scope(Some(&reg));
        remember_registration(&reg, ctx);
        ctx.register_declaration(&reg, true)?;
        let scope_global = ctx.contexts.current_scope().map(|s| s.global.clone());
        if let Some(global) = scope_global {
            ctx.contexts
                .set(ContextKey::DependencySource, ContextValue::Text(global));
        }
        Ok(())
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx);
        let reg = recorded_registration(ctx)
            .unwrap_or_else(|| registration_name(node, name.as_deref(), ctx));
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&reg, id);

        Ok(vec![Concept::Function(FunctionDecl {
            id,
            name: name.unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string()),
            fqn: None,
            is_async: has_keyword(node, "async"),
            params: parse_params(node, ctx),
            return_type: annotated_type(node, "return_type", ctx),
            span: Span::from_node(node),
            doc: doc_comment(node, ctx),
            metadata: Metadata::new(),
        })])
    }
}

// ---------------------------------------------------------------------------
// Variables

pub struct VariableProcessor;

impl Processor for VariableProcessor {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["variable_declarator"]
    }

    /// Destructuring patterns are intentionally unmodeled
    fn applies(&self, node: &Node, _ctx: &ProcessingContext) -> bool {
        node.child_by_field_name("name")
            .map(|n| n.kind() == "identifier")
            .unwrap_or(false)
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx).unwrap_or_default();
        let reg = registration_name(node, Some(&name), ctx);
        ctx.register_declaration(&reg, false)?;
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&reg, id);

        let value_node = node.child_by_field_name("value");
        let type_str = annotated_type(node, "type", ctx).or_else(|| {
            value_node
                .as_ref()
                .and_then(|v| ctx.oracle.type_of(v, ctx.source))
        });
        let value = value_node
            .as_ref()
            .and_then(|v| ctx.oracle.inline_value(v, ctx.source));

        let parent = node.parent();
        let binding = match parent.as_ref().map(|p| p.kind()) {
            Some("variable_declaration") => BindingKind::Var,
            _ => {
                let keyword = parent
                    .as_ref()
                    .and_then(|p| p.child(0))
                    .map(|k| ctx.node_text(&k));
                if keyword.as_deref() == Some("let") {
                    BindingKind::Let
                } else {
                    BindingKind::Const
                }
            }
        };
        let doc = parent
            .as_ref()
            .and_then(|p| doc_comment(p, ctx));

        Ok(vec![Concept::Variable(VariableDecl {
            id,
            name,
            fqn: None,
            binding,
            type_str,
            value,
            span: Span::from_node(node),
            doc,
            metadata: Metadata::new(),
        })])
    }
}

// ---------------------------------------------------------------------------
// Enums

pub struct EnumProcessor;

impl Processor for EnumProcessor {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["enum_declaration"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let name = declared_name(node, ctx);
        let reg = registration_name(node, name.as_deref(), ctx);
        ctx.contexts.open_scope(Some(&reg));
        remember_registration(&reg, ctx);
        ctx.register_declaration(&reg, true)?;
        Ok(())
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx);
        let reg = recorded_registration(ctx)
            .unwrap_or_else(|| registration_name(node, name.as_deref(), ctx));
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&reg, id);

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    "enum_assignment" => {
                        let member_name = declared_name(&member, ctx).unwrap_or_default();
                        ctx.register_declaration(&member_name, false)?;
                        members.push(EnumMember {
                            name: member_name,
                            value: member
                                .child_by_field_name("value")
                                .map(|v| ctx.node_text(&v)),
                        });
                    }
                    "property_identifier" => {
                        let member_name = ctx.node_text(&member);
                        ctx.register_declaration(&member_name, false)?;
                        members.push(EnumMember {
                            name: member_name,
                            value: None,
                        });
                    }
                    _ => {}
                }
            }
        }

        Ok(vec![Concept::Enum(EnumDecl {
            id,
            name: name.unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string()),
            fqn: None,
            is_const: has_keyword(node, "const"),
            members,
            span: Span::from_node(node),
            doc: doc_comment(node, ctx),
            metadata: Metadata::new(),
        })])
    }
}

// ---------------------------------------------------------------------------
// Type aliases

pub struct TypeAliasProcessor;

impl Processor for TypeAliasProcessor {
    fn name(&self) -> &'static str {
        "type_alias"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["type_alias_declaration"]
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = declared_name(node, ctx).unwrap_or_default();
        ctx.register_declaration(&name, false)?;
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&name, id);

        Ok(vec![Concept::TypeAlias(TypeAliasDecl {
            id,
            name,
            fqn: None,
            type_parameters: type_parameters(node, ctx),
            span: Span::from_node(node),
            doc: doc_comment(node, ctx),
            metadata: Metadata::new(),
        })])
    }
}

// ---------------------------------------------------------------------------
// Namespaces

pub struct NamespaceProcessor;

impl Processor for NamespaceProcessor {
    fn name(&self) -> &'static str {
        "namespace"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["internal_module", "module"]
    }

    fn before_children(&self, node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        let name = namespace_name(node, ctx);
        ctx.contexts.open_scope(Some(&name));
        ctx.register_declaration(&name, true)?;
        let scope_global = ctx.contexts.current_scope().map(|s| s.global.clone());
        if let Some(global) = scope_global {
            ctx.contexts
                .set(ContextKey::DependencySource, ContextValue::Text(global));
        }
        Ok(())
    }

    fn after_children(
        &self,
        node: &Node,
        ctx: &mut ProcessingContext,
        _children: &mut ConceptMap,
    ) -> Result<Vec<Concept>> {
        let name = namespace_name(node, ctx);
        let id = ctx.next_id();
        ctx.schedule_fqn_resolution(&name, id);

        Ok(vec![Concept::Namespace(NamespaceDecl {
            id,
            name,
            fqn: None,
            span: Span::from_node(node),
            doc: doc_comment(node, ctx),
            metadata: Metadata::new(),
        })])
    }
}

fn namespace_name(node: &Node, ctx: &ProcessingContext) -> String {
    declared_name(node, ctx)
        .unwrap_or_default()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

// ---------------------------------------------------------------------------
// Anonymous block scopes

pub struct BlockScopeProcessor;

/// Parents whose processor already opened the body scope. Arrow and
/// function expressions have no processor, so their blocks open an
/// anonymous scope here.
const SCOPE_OWNERS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "method_definition",
    "internal_module",
    "module",
];

impl Processor for BlockScopeProcessor {
    fn name(&self) -> &'static str {
        "block_scope"
    }

    fn node_kinds(&self) -> &'static [&'static str] {
        &["statement_block"]
    }

    fn applies(&self, node: &Node, _ctx: &ProcessingContext) -> bool {
        node.parent()
            .map(|p| !SCOPE_OWNERS.contains(&p.kind()))
            .unwrap_or(true)
    }

    fn before_children(&self, _node: &Node, ctx: &mut ProcessingContext) -> Result<()> {
        ctx.contexts.open_scope(None);
        Ok(())
    }
}
