//! Common types used throughout the compiler
//!
//! Identifier interning, branch label allocation and the lexical scope stack.
//! None of these hold global state; each compilation owns its own instances.

use log::trace;
use serde::{Deserialize, Serialize, Serializer};
use std::cell::RefCell;
use std::collections::HashMap;
use thiserror::Error;

/// Label identifier for code generation
pub type LabelId = u32;

/// Handle to an interned identifier. Two names are equal exactly when their
/// text is equal, so comparison never touches the string data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Name(u32);

impl Name {
    pub fn index(self) -> u32 {
        self.0
    }
}

thread_local! {
    /// Strings of the interner installed by [`Interner::with_resolved_names`]
    static RESOLVED_NAMES: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Serializes as the identifier text inside [`Interner::with_resolved_names`]
/// and as the bare index everywhere else.
impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = RESOLVED_NAMES.with(|names| {
            names
                .borrow()
                .as_ref()
                .and_then(|names| names.get(self.index() as usize).cloned())
        });
        match text {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_u32(self.index()),
        }
    }
}

/// Deduplicating string table for identifiers
#[derive(Debug, Clone, Default)]
pub struct Interner {
    lookup: HashMap<String, Name>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing handle if it was seen before
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.lookup.get(text) {
            return name;
        }
        let name = Name(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.lookup.insert(text.to_string(), name);
        name
    }

    /// Look up a handle without interning
    pub fn get(&self, text: &str) -> Option<Name> {
        self.lookup.get(text).copied()
    }

    pub fn resolve(&self, name: Name) -> &str {
        self.strings
            .get(name.0 as usize)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Run `f` with every [`Name`] serialized as its text from this table
    pub fn with_resolved_names<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = RESOLVED_NAMES.with(|names| names.replace(Some(self.strings.clone())));
        let result = f();
        RESOLVED_NAMES.with(|names| *names.borrow_mut() = previous);
        result
    }
}

/// Label generator for code generation
///
/// Labels use the assembler-local `.L` prefix so they can never collide with
/// a symbol defined by the program being compiled.
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    next_id: LabelId,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate a new unique label
    pub fn new_label(&mut self) -> String {
        let label = format!(".L{}", self.next_id);
        self.next_id += 1;
        trace!("allocated label {label}");
        label
    }

    /// Generate a new unique label with a tag between prefix and number
    pub fn new_label_with_prefix(&mut self, prefix: &str) -> String {
        let label = format!(".L{}{}", prefix, self.next_id);
        self.next_id += 1;
        trace!("allocated label {label}");
        label
    }

    pub fn allocated(&self) -> LabelId {
        self.next_id
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    #[error("no scope is open")]
    NoOpenScope,

    #[error("name already declared in this scope")]
    AlreadyDeclared,
}

/// Stack of nested lexical scopes, innermost last
///
/// Each scope owns its name to symbol mapping. Scopes are strictly nested, so
/// popping always discards the innermost one.
#[derive(Debug, Clone)]
pub struct ScopeStack<V> {
    scopes: Vec<HashMap<Name, V>>,
}

impl<V> Default for ScopeStack<V> {
    fn default() -> Self {
        Self { scopes: Vec::new() }
    }
}

impl<V> ScopeStack<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Close the innermost scope. Returns `false` when none was open.
    pub fn pop_scope(&mut self) -> bool {
        self.scopes.pop().is_some()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare(&mut self, name: Name, value: V) -> Result<(), ScopeError> {
        let scope = self.scopes.last_mut().ok_or(ScopeError::NoOpenScope)?;
        if scope.contains_key(&name) {
            return Err(ScopeError::AlreadyDeclared);
        }
        scope.insert(name, value);
        Ok(())
    }

    /// Search from the innermost scope outward
    pub fn lookup(&self, name: Name) -> Option<&V> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    pub fn exists_in_current_scope(&self, name: Name) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.contains_key(&name))
            .unwrap_or(false)
    }
}
