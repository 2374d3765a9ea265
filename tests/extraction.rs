//! Per-file extraction tests: concepts, FQNs, dependencies

use codefacts::concept::{Concept, ConceptKind};
use codefacts::extract::FileExtraction;
use codefacts::oracle::SyntacticOracle;
use codefacts::{Extractor, ProjectContext};
use std::path::Path;

fn extract(source: &str) -> FileExtraction {
    let project = ProjectContext::new("/proj");
    let extractor = Extractor::new();
    extractor
        .extract_source(
            &project,
            Path::new("/proj/src/main.ts"),
            source,
            &SyntacticOracle,
        )
        .unwrap()
}

fn of_kind(file: &FileExtraction, kind: ConceptKind) -> Vec<&Concept> {
    file.concepts.of_kind(kind).collect()
}

const MODULE: &str = "\"/proj/src/main.ts\"";

#[test]
fn test_module_concept() {
    let file = extract("const x = 1;");
    let modules = of_kind(&file, ConceptKind::Module);
    assert_eq!(modules.len(), 1);
    let Concept::Module(module) = modules[0] else {
        panic!("expected module");
    };
    assert_eq!(module.fqn.global, MODULE);
    assert_eq!(module.fqn.local, "\"./src/main.ts\"");
    assert_eq!(module.path, "/proj/src/main.ts");
}

#[test]
fn test_variable_concept() {
    let file = extract("/** The answer */\nconst answer: number = 42;");
    let vars = of_kind(&file, ConceptKind::Variable);
    assert_eq!(vars.len(), 1);
    let Concept::Variable(var) = vars[0] else {
        panic!("expected variable");
    };
    assert_eq!(var.name, "answer");
    assert_eq!(
        var.fqn.as_ref().unwrap().global,
        format!("{}.answer", MODULE)
    );
    assert_eq!(var.type_str.as_deref(), Some("number"));
    assert_eq!(var.value.as_deref(), Some("42"));
    assert_eq!(var.doc.as_deref(), Some("The answer"));
}

#[test]
fn test_class_with_members() {
    let source = r#"
class Greeter {
    private name: string;

    greet(message: string): string {
        return message;
    }
}
"#;
    let file = extract(source);
    let classes = of_kind(&file, ConceptKind::Class);
    assert_eq!(classes.len(), 1);
    let Concept::Class(class) = classes[0] else {
        panic!("expected class");
    };
    assert_eq!(class.name, "Greeter");
    assert_eq!(
        class.fqn.as_ref().unwrap().global,
        format!("{}.Greeter", MODULE)
    );

    assert_eq!(class.methods.len(), 1);
    let method = &class.methods[0];
    assert_eq!(method.name, "greet");
    assert_eq!(
        method.fqn.as_ref().unwrap().global,
        format!("{}.Greeter.greet", MODULE)
    );
    assert_eq!(method.return_type.as_deref(), Some("string"));
    assert_eq!(method.params.len(), 1);
    assert_eq!(method.params[0].name, "message");

    assert_eq!(class.properties.len(), 1);
    let property = &class.properties[0];
    assert_eq!(property.name, "name");
    assert_eq!(
        property.visibility,
        codefacts::concept::Visibility::Private
    );

    // Promoted members do not bubble as standalone concepts
    assert!(of_kind(&file, ConceptKind::Method).is_empty());
    assert!(of_kind(&file, ConceptKind::Property).is_empty());
}

#[test]
fn test_default_export_class_fqn_segment() {
    let file = extract("export default class Foo {}");
    let classes = of_kind(&file, ConceptKind::Class);
    assert_eq!(classes.len(), 1);
    let Concept::Class(class) = classes[0] else {
        panic!("expected class");
    };
    // Local name stays Foo; the FQN identifier segment is `default`
    assert_eq!(class.name, "Foo");
    assert_eq!(
        class.fqn.as_ref().unwrap().global,
        format!("{}.default", MODULE)
    );
}

#[test]
fn test_default_export_statement_names_earlier_declaration() {
    let file = extract("function run() {}\nexport default run;");
    let functions = of_kind(&file, ConceptKind::Function);
    assert_eq!(functions.len(), 1);
    let Concept::Function(function) = functions[0] else {
        panic!("expected function");
    };
    assert_eq!(function.name, "run");
    assert_eq!(
        function.fqn.as_ref().unwrap().global,
        format!("{}.default", MODULE)
    );
}

#[test]
fn test_dependency_merge_cardinality() {
    let source = r#"
function helper() {}
function main() {
    helper();
    helper();
}
"#;
    let file = extract(source);
    let deps = of_kind(&file, ConceptKind::Dependency);
    assert_eq!(deps.len(), 1);
    let Concept::Dependency(dep) = deps[0] else {
        panic!("expected dependency");
    };
    assert_eq!(dep.source, format!("{}.main", MODULE));
    assert_eq!(dep.target.as_deref(), Some(format!("{}.helper", MODULE).as_str()));
    assert_eq!(dep.cardinality, 2);
}

#[test]
fn test_unresolved_dependency_dropped() {
    let file = extract("function main() { missing(); }");
    assert!(of_kind(&file, ConceptKind::Dependency).is_empty());
}

#[test]
fn test_self_dependency_dropped() {
    let file = extract("function rec() { rec(); }");
    assert!(of_kind(&file, ConceptKind::Dependency).is_empty());
}

#[test]
fn test_class_heritage_dependencies() {
    let source = r#"
class Base {}
interface Marker {}
class Derived extends Base implements Marker {}
"#;
    let file = extract(source);
    let classes = of_kind(&file, ConceptKind::Class);
    let derived = classes
        .iter()
        .find_map(|c| match c {
            Concept::Class(cls) if cls.name == "Derived" => Some(cls),
            _ => None,
        })
        .unwrap();

    let extends = derived.extends.as_ref().unwrap();
    assert_eq!(extends.name, "Base");
    assert_eq!(
        extends.fqn.as_ref().unwrap().global,
        format!("{}.Base", MODULE)
    );
    assert_eq!(derived.implements.len(), 1);
    assert_eq!(
        derived.implements[0].fqn.as_ref().unwrap().global,
        format!("{}.Marker", MODULE)
    );

    let deps = of_kind(&file, ConceptKind::Dependency);
    assert_eq!(deps.len(), 2);
}

#[test]
fn test_enum_members() {
    let file = extract("enum Color { Red, Green = 2 }");
    let enums = of_kind(&file, ConceptKind::Enum);
    assert_eq!(enums.len(), 1);
    let Concept::Enum(decl) = enums[0] else {
        panic!("expected enum");
    };
    assert_eq!(decl.name, "Color");
    assert_eq!(decl.members.len(), 2);
    assert_eq!(decl.members[0].name, "Red");
    assert_eq!(decl.members[1].name, "Green");
    assert_eq!(decl.members[1].value.as_deref(), Some("2"));
}

#[test]
fn test_interface_members_and_extends() {
    let source = r#"
interface Base { id: number; }
interface Shape extends Base {
    area(): number;
    label?: string;
}
"#;
    let file = extract(source);
    let interfaces = of_kind(&file, ConceptKind::Interface);
    assert_eq!(interfaces.len(), 2);
    let shape = interfaces
        .iter()
        .find_map(|c| match c {
            Concept::Interface(i) if i.name == "Shape" => Some(i),
            _ => None,
        })
        .unwrap();
    assert_eq!(shape.extends.len(), 1);
    assert_eq!(shape.extends[0].name, "Base");
    assert_eq!(shape.methods.len(), 1);
    assert_eq!(shape.methods[0].name, "area");
    assert_eq!(shape.properties.len(), 1);
    assert!(shape.properties[0].optional);
    assert_eq!(
        shape.methods[0].fqn.as_ref().unwrap().global,
        format!("{}.Shape.area", MODULE)
    );
}

#[test]
fn test_type_alias_and_type_reference_dependency() {
    let source = r#"
interface User { id: number; }
type UserList = Array<User>;
"#;
    let file = extract(source);
    let aliases = of_kind(&file, ConceptKind::TypeAlias);
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0].name(), Some("UserList"));

    let deps = of_kind(&file, ConceptKind::Dependency);
    let targets: Vec<_> = deps
        .iter()
        .filter_map(|c| match c {
            Concept::Dependency(d) => d.target.as_deref(),
            _ => None,
        })
        .collect();
    assert!(targets.contains(&format!("{}.User", MODULE).as_str()));
}

#[test]
fn test_export_entries_with_alias() {
    let source = r#"
export const a = 1;
const b = 2;
export { b as bee };
"#;
    let file = extract(source);
    let exports = of_kind(&file, ConceptKind::Export);
    assert_eq!(exports.len(), 2);

    let Concept::Export(a) = exports[0] else {
        panic!("expected export");
    };
    assert_eq!(a.identifier.as_deref(), Some("a"));
    assert_eq!(a.decl_fqn.as_ref().unwrap().global, format!("{}.a", MODULE));

    let Concept::Export(bee) = exports[1] else {
        panic!("expected export");
    };
    assert_eq!(bee.identifier.as_deref(), Some("b"));
    assert_eq!(bee.alias.as_deref(), Some("bee"));
    assert_eq!(
        bee.decl_fqn.as_ref().unwrap().global,
        format!("{}.b", MODULE)
    );
}

#[test]
fn test_span_lines() {
    let file = extract("\nclass Late {\n}\n");
    let classes = of_kind(&file, ConceptKind::Class);
    let Concept::Class(class) = classes[0] else {
        panic!("expected class");
    };
    assert_eq!(class.span.start_line, 2);
    assert_eq!(class.span.end_line, 3);
}
