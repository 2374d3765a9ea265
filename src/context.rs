//! Local Context Stack - inherited state threaded through the traversal
//!
//! A frame is pushed when a traverser enters an AST node and popped on exit.
//! Lookups walk from the innermost frame outward, giving nearest-enclosing-
//! scope semantics (lexical shadowing). The stack is owned by the per-file
//! `ProcessingContext` and threaded explicitly through every traversal call;
//! it is never global state.

use std::collections::BTreeMap;

/// Keys under which processors store inherited state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContextKey {
    /// Named slot of the parent this node occupies (plus list index)
    Slot,
    /// Enclosing named or anonymously-numbered lexical scope
    FqnScope,
    /// Global FQN of the scope that owns dependency edges recorded below it
    DependencySource,
    /// Identifier named by a separate `export default name;` statement
    DefaultExportName,
    /// Name a scope-opening declaration registered itself under
    RegistrationName,
}

/// Values stored in context frames
#[derive(Debug, Clone)]
pub enum ContextValue {
    Flag(bool),
    Text(String),
    Scope(FqnScope),
}

impl ContextValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ContextValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<&FqnScope> {
        match self {
            ContextValue::Scope(s) => Some(s),
            _ => None,
        }
    }
}

/// Per-frame record of the enclosing lexical scope.
///
/// Concatenating the scope identifiers top-down yields the namespace path of
/// any declaration registered inside the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FqnScope {
    /// Dotted global identifier of this scope (absolute-path rooted)
    pub global: String,
    /// Dotted local identifier (project-root relative)
    pub local: String,
    /// Counter handing out indices to anonymous child scopes
    pub anon_counter: u32,
}

impl FqnScope {
    pub fn new(global: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            global: global.into(),
            local: local.into(),
            anon_counter: 0,
        }
    }
}

type Frame = BTreeMap<ContextKey, ContextValue>;

/// Ordered stack of key-value frames
#[derive(Debug, Default)]
pub struct LocalContexts {
    frames: Vec<Frame>,
}

impl LocalContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh frame (traverser entry)
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Pop the innermost frame (traverser exit)
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Current stack depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Set a value in the innermost frame
    pub fn set(&mut self, key: ContextKey, value: ContextValue) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(key, value);
        }
    }

    /// Look up a key walking from the innermost frame outward
    pub fn get(&self, key: ContextKey) -> Option<&ContextValue> {
        self.frames.iter().rev().find_map(|frame| frame.get(&key))
    }

    /// Look up a key in the innermost frame only
    pub fn get_local(&self, key: ContextKey) -> Option<&ContextValue> {
        self.frames.last().and_then(|frame| frame.get(&key))
    }

    /// Open a new lexical scope in the innermost frame.
    ///
    /// A named scope extends the enclosing scope's identifiers with the given
    /// segment; an anonymous scope draws a monotonically increasing index
    /// from the enclosing scope instead.
    pub fn open_scope(&mut self, identifier: Option<&str>) {
        let segment = match identifier {
            Some(name) => name.to_string(),
            None => format!("#{}", self.next_anon_index()),
        };
        let (global, local) = match self.current_scope() {
            Some(scope) => (
                crate::fqn::join_segment(&scope.global, &segment),
                crate::fqn::join_segment(&scope.local, &segment),
            ),
            None => (segment.clone(), segment.clone()),
        };
        self.set(ContextKey::FqnScope, ContextValue::Scope(FqnScope::new(global, local)));
    }

    /// Open the file-level module scope with explicit identifiers
    pub fn open_module_scope(&mut self, global: &str, local: &str) {
        self.set(
            ContextKey::FqnScope,
            ContextValue::Scope(FqnScope::new(global, local)),
        );
    }

    /// Nearest enclosing scope, if any
    pub fn current_scope(&self) -> Option<&FqnScope> {
        self.get(ContextKey::FqnScope).and_then(ContextValue::as_scope)
    }

    /// Scope enclosing the current one (skips the innermost scope frame).
    ///
    /// Declarations that open their own body scope before registering must be
    /// registered here so they are visible to their siblings, not to
    /// themselves.
    pub fn enclosing_scope(&self) -> Option<&FqnScope> {
        self.scope_chain().into_iter().rev().nth(1)
    }

    /// All enclosing scopes, outermost first
    pub fn scope_chain(&self) -> Vec<&FqnScope> {
        self.frames
            .iter()
            .filter_map(|frame| frame.get(&ContextKey::FqnScope))
            .filter_map(ContextValue::as_scope)
            .collect()
    }

    /// Snapshot of enclosing scope global identifiers, outermost first
    pub fn scope_snapshot(&self) -> Vec<String> {
        self.scope_chain()
            .into_iter()
            .map(|scope| scope.global.clone())
            .collect()
    }

    /// Global FQN of the nearest dependency-source scope
    pub fn dependency_source(&self) -> Option<&str> {
        self.get(ContextKey::DependencySource)
            .and_then(ContextValue::as_text)
    }

    fn next_anon_index(&mut self) -> u32 {
        for frame in self.frames.iter_mut().rev() {
            if let Some(ContextValue::Scope(scope)) = frame.get_mut(&ContextKey::FqnScope) {
                scope.anon_counter += 1;
                return scope.anon_counter;
            }
        }
        0
    }
}
