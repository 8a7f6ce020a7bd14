use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

/// A point in the container source.
///
/// `line` is 1-based and `column` is 0-based, the convention of ESTree-style
/// parsers. Columns count UTF-16 code units, as LSP positions do. Editors
/// that count lines from zero must subtract one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A `{start, end}` pair of locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Span {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }
}

/// Outcome of a classification step.
///
/// Every dispatch point of the analyzer returns one of these so that skipping
/// an unsupported construct is an explicit branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<T> {
    Recognized(T),
    Unrecognized,
}

impl<T> Classified<T> {
    pub fn recognized(self) -> Option<T> {
        match self {
            Classified::Recognized(value) => Some(value),
            Classified::Unrecognized => None,
        }
    }
}

/// What the right-hand side of a variable declaration looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredKind {
    /// `const x = require('y')`
    ModuleImport,
    /// `const x = make()` or `const x = a.b()`
    Call,
    /// `const x = 5`
    Literal,
    /// `const x = y`
    Alias,
    /// Anything else, including a missing initializer.
    Unclassified,
}

/// Syntactic kind of an object property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// `foo: ...`
    Identifier,
    /// `'foo': ...` or `1: ...`
    Literal,
    /// `['foo']: ...`
    Computed,
}

/// Shape of the first argument passed to a registration builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    Identifier,
    Literal,
}

/// A local name bound by a variable declaration in the container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    pub name: CompactString,

    pub declared_kind: DeclaredKind,

    /// Span of the whole declarator.
    pub location: Span,

    /// Span of the bound identifier, or of the destructured key.
    pub name_span: Span,

    /// Set for `ModuleImport` (argument list text) and `Literal` (raw text).
    pub raw_value: Option<CompactString>,

    /// Set for `Alias`, and for `Call` when the callee is a plain identifier.
    pub alias_target: Option<CompactString>,
}

/// A service registered with the container through a builder call,
/// e.g. `userService: asClass(UserService)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEntry {
    pub name: CompactString,

    pub key_kind: KeyKind,

    /// Span of the key token, not of the builder call.
    pub location: Span,

    /// Name of the builder function (`asClass`, `asValue`, ...).
    pub builder_callee: CompactString,

    /// Kind of the first builder argument, if it is an identifier or literal.
    pub argument_kind: Option<ArgumentKind>,

    pub alias_target: Option<CompactString>,

    pub raw_value: Option<CompactString>,
}

/// Which table a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionSource {
    Registration,
    Variable,
}

/// A single definition site for a looked-up name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub source: DefinitionSource,
    pub span: Span,
}

/// The two symbol tables extracted from one container source.
///
/// A name may be present in both tables, callers have to check each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    pub variables: FxHashMap<CompactString, VariableBinding>,
    pub registrations: FxHashMap<CompactString, RegistrationEntry>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.registrations.is_empty()
    }

    /// Insert a binding, replacing any earlier one of the same name.
    pub fn insert_variable(&mut self, binding: VariableBinding) {
        self.variables.insert(binding.name.clone(), binding);
    }

    /// Insert a registration, replacing any earlier one of the same name.
    pub fn insert_registration(&mut self, entry: RegistrationEntry) {
        self.registrations.insert(entry.name.clone(), entry);
    }

    /// All definition sites for `name`, registration first.
    pub fn lookup(&self, name: &str) -> SmallVec<[Definition; 2]> {
        let mut found = SmallVec::new();

        if let Some(entry) = self.registrations.get(name) {
            found.push(Definition {
                source: DefinitionSource::Registration,
                span: entry.location,
            });
        }

        if let Some(binding) = self.variables.get(name) {
            found.push(Definition {
                source: DefinitionSource::Variable,
                span: binding.name_span,
            });
        }

        found
    }
}

/// An open editor document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Full document text; the server uses full sync.
    pub content: String,

    pub version: i32,
}

impl DocumentState {
    pub fn new(content: String, version: i32) -> Self {
        Self { content, version }
    }
}
