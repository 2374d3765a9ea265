//! Scope and name-resolution behavior across whole files

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

fn dependency_targets(file: &FileExtraction) -> Vec<(String, String)> {
    file.concepts
        .of_kind(ConceptKind::Dependency)
        .filter_map(|c| match c {
            Concept::Dependency(d) => {
                Some((d.source.clone(), d.target.clone().unwrap_or_default()))
            }
            _ => None,
        })
        .collect()
}

const MODULE: &str = "\"/proj/src/main.ts\"";

#[test]
fn test_forward_reference_resolves() {
    let source = r#"
function main() {
    return helper();
}
function helper() {}
"#;
    let file = extract(source);
    let deps = dependency_targets(&file);
    assert_eq!(
        deps,
        vec![(
            format!("{}.main", MODULE),
            format!("{}.helper", MODULE)
        )]
    );
}

#[test]
fn test_this_member_suffix_resolution() {
    let source = r#"
class Service {
    helper() {}
    run() {
        this.helper();
    }
}
"#;
    let file = extract(source);
    let deps = dependency_targets(&file);
    assert_eq!(
        deps,
        vec![(
            format!("{}.Service.run", MODULE),
            format!("{}.Service.helper", MODULE)
        )]
    );
}

#[test]
fn test_namespace_dotted_prefix_resolution() {
    let source = r#"
namespace ns {
    export function f() {}
}
function main() {
    ns.f();
}
"#;
    let file = extract(source);
    let deps = dependency_targets(&file);
    assert!(deps.contains(&(
        format!("{}.main", MODULE),
        format!("{}.ns.f", MODULE)
    )));
}

#[test]
fn test_namespace_members_carry_namespace_path() {
    let source = r#"
namespace ns {
    export const value = 1;
}
"#;
    let file = extract(source);
    let vars: Vec<_> = file.concepts.of_kind(ConceptKind::Variable).collect();
    assert_eq!(vars.len(), 1);
    let Concept::Variable(var) = vars[0] else {
        panic!("expected variable");
    };
    assert_eq!(
        var.fqn.as_ref().unwrap().global,
        format!("{}.ns.value", MODULE)
    );
}

#[test]
fn test_block_scoped_variable_gets_anonymous_scope() {
    let source = r#"
function f() {
    if (true) {
        const y = 1;
    }
}
"#;
    let file = extract(source);
    let vars: Vec<_> = file.concepts.of_kind(ConceptKind::Variable).collect();
    assert_eq!(vars.len(), 1);
    let Concept::Variable(var) = vars[0] else {
        panic!("expected variable");
    };
    let global = &var.fqn.as_ref().unwrap().global;
    assert!(
        global.starts_with(&format!("{}.f.#", MODULE)),
        "expected anonymous scope segment, got {}",
        global
    );
    assert!(global.ends_with(".y"));
}

#[test]
fn test_import_alias_resolution() {
    let source = r#"
import { helper as h } from "./util";
function main() {
    h();
}
"#;
    let file = extract(source);
    let deps = dependency_targets(&file);
    // The aliased call resolves to the source module's exported name; the
    // import statement itself records the module edge.
    assert!(deps.contains(&(
        format!("{}.main", MODULE),
        "\"/proj/src/util\".helper".to_string()
    )));
    assert!(deps.contains(&(
        MODULE.to_string(),
        "\"/proj/src/util\"".to_string()
    )));
}

#[test]
fn test_namespace_import_dotted_member() {
    let source = r#"
import * as sub from "./utils/sub";
function main() {
    sub.fn();
}
"#;
    let file = extract(source);
    let deps = dependency_targets(&file);
    assert!(deps.contains(&(
        format!("{}.main", MODULE),
        "\"/proj/src/utils/sub\".fn".to_string()
    )));
}

#[test]
fn test_nearer_declaration_shadows() {
    let source = r#"
function target() {}
namespace inner {
    export function target() {}
    export function caller() {
        target();
    }
}
"#;
    let file = extract(source);
    let deps = dependency_targets(&file);
    assert!(deps.contains(&(
        format!("{}.inner.caller", MODULE),
        format!("{}.inner.target", MODULE)
    )));
    // The outer target is shadowed, so no edge points at it
    assert!(!deps
        .iter()
        .any(|(_, t)| t == &format!("{}.target", MODULE)));
}
