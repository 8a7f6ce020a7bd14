//! Structural parser for container modules.
//!
//! tree-sitter produces a concrete syntax tree; this module lowers the top
//! level of it into a small ESTree-shaped statement model that the container
//! analyzer dispatches on. Only the shapes the analyzer cares about get their
//! own variants, everything else keeps its node kind in an `Other` variant.

use crate::languages::LanguageSupport;
use crate::types::{KeyKind, SourceLocation, Span};
use compact_str::CompactString;
use thiserror::Error;
use tree_sitter::{Node, Parser, Point};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("parser produced no tree")]
    NoTree,

    #[error("syntax error at {line}:{column}")]
    Syntax { line: u32, column: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach spans to statements, declarators, bindings and keys.
    pub record_locations: bool,

    /// Drop top-level statements that contain syntax errors instead of
    /// failing the whole parse.
    pub tolerant: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            record_locations: true,
            tolerant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `const`, `let` and `var` declarations.
    VariableDeclaration { declarations: Vec<Declarator> },
    Expression(Expression),
    Other { kind: CompactString },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarator {
    pub id: Pattern,
    pub init: Option<Expression>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Identifier {
        name: CompactString,
        span: Option<Span>,
    },
    Object {
        properties: Vec<PatternProperty>,
    },
    Other {
        kind: CompactString,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternProperty {
    /// `{ a }`, `{ a: b }` and `{ a = 1 }` all expose the key `a`.
    Property { key: PropertyKey },
    Other { kind: CompactString },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKey {
    pub kind: KeyKind,
    /// Resolved key name. `None` for computed keys that are not string literals.
    pub name: Option<CompactString>,
    /// Key text as written, quotes and brackets included.
    pub raw: CompactString,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Identifier {
        name: CompactString,
    },
    Literal {
        raw: CompactString,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        /// Source text between the parentheses.
        arguments_text: CompactString,
    },
    Member {
        object: Box<Expression>,
        property: Option<CompactString>,
        computed: bool,
    },
    Object {
        properties: Vec<Property>,
    },
    Other {
        kind: CompactString,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    KeyValue { key: PropertyKey, value: Expression },
    Other { kind: CompactString },
}

/// Parse a module and lower its top-level statements.
pub fn parse_module(
    language: &dyn LanguageSupport,
    text: &str,
    options: ParseOptions,
) -> Result<Program, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&language.grammar())?;
    let tree = parser.parse(text, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();

    if root.has_error() && !options.tolerant {
        let at = first_error(root).unwrap_or(root).start_position();
        return Err(ParseError::Syntax {
            line: at.row as u32 + 1,
            column: at.column as u32,
        });
    }

    let lowering = Lowering {
        language,
        source: text,
        record_locations: options.record_locations,
    };

    let mut body = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.is_extra() {
            continue;
        }
        if child.has_error() || child.is_error() {
            tracing::debug!(
                kind = child.kind(),
                row = child.start_position().row,
                "Dropping statement with syntax errors"
            );
            continue;
        }
        body.push(lowering.statement(child));
    }

    Ok(Program { body })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error);
    found
}

struct Lowering<'a> {
    language: &'a dyn LanguageSupport,
    source: &'a str,
    record_locations: bool,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node) -> CompactString {
        node.utf8_text(self.source.as_bytes())
            .map(CompactString::from)
            .unwrap_or_default()
    }

    fn span(&self, node: Node) -> Option<Span> {
        self.record_locations.then(|| {
            Span::new(
                self.location(node.start_byte(), node.start_position()),
                self.location(node.end_byte(), node.end_position()),
            )
        })
    }

    /// tree-sitter columns count bytes; ours count UTF-16 code units.
    fn location(&self, byte: usize, point: Point) -> SourceLocation {
        let line_start = byte.saturating_sub(point.column);
        let column = self
            .source
            .get(line_start..byte)
            .map_or(point.column, |prefix| prefix.encode_utf16().count());
        SourceLocation::new(point.row as u32 + 1, column as u32)
    }

    fn other(node: Node) -> CompactString {
        CompactString::from(node.kind())
    }

    fn statement(&self, node: Node) -> Statement {
        let kind = match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = node.walk();
                let declarations = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() == "variable_declarator")
                    .map(|child| self.declarator(child))
                    .collect();
                StatementKind::VariableDeclaration { declarations }
            }
            "expression_statement" => match first_named(node) {
                Some(expression) => StatementKind::Expression(self.expression(expression)),
                None => StatementKind::Other {
                    kind: Self::other(node),
                },
            },
            _ => StatementKind::Other {
                kind: Self::other(node),
            },
        };

        Statement {
            kind,
            span: self.span(node),
        }
    }

    fn declarator(&self, node: Node) -> Declarator {
        let id = match node.child_by_field_name("name") {
            Some(name) => self.pattern(name),
            None => Pattern::Other {
                kind: Self::other(node),
            },
        };

        Declarator {
            id,
            init: node
                .child_by_field_name("value")
                .map(|value| self.expression(value)),
            span: self.span(node),
        }
    }

    fn pattern(&self, node: Node) -> Pattern {
        match node.kind() {
            "identifier" => Pattern::Identifier {
                name: self.text(node),
                span: self.span(node),
            },
            "object_pattern" => {
                let mut cursor = node.walk();
                let properties = node
                    .named_children(&mut cursor)
                    .filter(|child| !child.is_extra())
                    .map(|child| self.pattern_property(child))
                    .collect();
                Pattern::Object { properties }
            }
            _ => Pattern::Other {
                kind: Self::other(node),
            },
        }
    }

    fn pattern_property(&self, node: Node) -> PatternProperty {
        let key = match node.kind() {
            "shorthand_property_identifier_pattern" => Some(self.identifier_key(node)),
            "pair_pattern" => node
                .child_by_field_name("key")
                .and_then(|key| self.property_key(key)),
            "object_assignment_pattern" => {
                node.child_by_field_name("left")
                    .and_then(|left| match self.pattern_property(left) {
                        PatternProperty::Property { key } => Some(key),
                        PatternProperty::Other { .. } => None,
                    })
            }
            _ => None,
        };

        match key {
            Some(key) => PatternProperty::Property { key },
            None => PatternProperty::Other {
                kind: Self::other(node),
            },
        }
    }

    fn identifier_key(&self, node: Node) -> PropertyKey {
        let raw = self.text(node);
        PropertyKey {
            kind: KeyKind::Identifier,
            name: Some(raw.clone()),
            raw,
            span: self.span(node),
        }
    }

    fn property_key(&self, node: Node) -> Option<PropertyKey> {
        let raw = self.text(node);
        let (kind, name) = match node.kind() {
            "property_identifier" | "shorthand_property_identifier" => {
                (KeyKind::Identifier, Some(raw.clone()))
            }
            "string" => (
                KeyKind::Literal,
                Some(CompactString::from(self.language.strip_quotes(&raw))),
            ),
            "number" => (KeyKind::Literal, Some(raw.clone())),
            "computed_property_name" => {
                let name = first_named(node)
                    .filter(|inner| inner.kind() == "string")
                    .map(|inner| {
                        CompactString::from(self.language.strip_quotes(&self.text(inner)))
                    });
                (KeyKind::Computed, name)
            }
            _ => return None,
        };

        Some(PropertyKey {
            kind,
            name,
            raw,
            span: self.span(node),
        })
    }

    fn expression(&self, node: Node) -> Expression {
        let kind = node.kind();

        if self.language.is_identifier(kind) {
            return Expression::Identifier {
                name: self.text(node),
            };
        }
        if self.language.is_literal(kind) {
            return Expression::Literal {
                raw: self.text(node),
            };
        }

        match kind {
            "parenthesized_expression" => match first_named(node) {
                Some(inner) => self.expression(inner),
                None => Expression::Other {
                    kind: Self::other(node),
                },
            },
            "call_expression" => self.call(node),
            "member_expression" => Expression::Member {
                object: Box::new(self.child_expression(node, "object")),
                property: node
                    .child_by_field_name("property")
                    .map(|property| self.text(property)),
                computed: false,
            },
            "subscript_expression" => Expression::Member {
                object: Box::new(self.child_expression(node, "object")),
                property: node
                    .child_by_field_name("index")
                    .filter(|index| index.kind() == "string")
                    .map(|index| CompactString::from(self.language.strip_quotes(&self.text(index)))),
                computed: true,
            },
            "object" => {
                let mut cursor = node.walk();
                let properties = node
                    .named_children(&mut cursor)
                    .filter(|child| !child.is_extra())
                    .map(|child| self.property(child))
                    .collect();
                Expression::Object { properties }
            }
            _ => Expression::Other {
                kind: Self::other(node),
            },
        }
    }

    fn child_expression(&self, node: Node, field: &str) -> Expression {
        match node.child_by_field_name(field) {
            Some(child) => self.expression(child),
            None => Expression::Other {
                kind: Self::other(node),
            },
        }
    }

    fn call(&self, node: Node) -> Expression {
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return Expression::Other {
                kind: Self::other(node),
            };
        };

        // A template string in argument position is a tagged template.
        if arguments.kind() != "arguments" {
            return Expression::Other {
                kind: CompactString::from("tagged_template"),
            };
        }

        let mut cursor = arguments.walk();
        let lowered = arguments
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .map(|child| self.expression(child))
            .collect();

        let text = self.text(arguments);
        let inner = text
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(text.as_str())
            .trim();

        Expression::Call {
            callee: Box::new(self.child_expression(node, "function")),
            arguments: lowered,
            arguments_text: CompactString::from(inner),
        }
    }

    fn property(&self, node: Node) -> Property {
        match node.kind() {
            "pair" => {
                let key = node
                    .child_by_field_name("key")
                    .and_then(|key| self.property_key(key));
                match (key, node.child_by_field_name("value")) {
                    (Some(key), Some(value)) => Property::KeyValue {
                        key,
                        value: self.expression(value),
                    },
                    _ => Property::Other {
                        kind: Self::other(node),
                    },
                }
            }
            "shorthand_property_identifier" => Property::KeyValue {
                key: self.identifier_key(node),
                value: Expression::Identifier {
                    name: self.text(node),
                },
            },
            _ => Property::Other {
                kind: Self::other(node),
            },
        }
    }
}

fn first_named(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|child| !child.is_extra());
    found
}
