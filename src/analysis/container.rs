//! Container analysis.
//!
//! A single pass over the top-level statements of a container module that
//! fills two tables: local variable bindings and container registrations.
//! There is no recursion into nested scopes. The only nested structure that
//! is inspected is the object literal passed to a `register` call.
//!
//! Every classifier returns [`Classified`]; anything `Unrecognized` is skipped
//! without a diagnostic, since most statements in a real container file are
//! of no interest here.

use crate::analysis::parser::{
    parse_module, Declarator, Expression, ParseOptions, Pattern, PatternProperty, Program,
    Property, PropertyKey, StatementKind,
};
use crate::analysis::preprocess::strip_placeholders;
use crate::constants::{MODULE_LOADER, REGISTER_METHOD};
use crate::error_ext::ResultExt;
use crate::languages::JavaScript;
use crate::types::{
    AnalysisResult, ArgumentKind, Classified, DeclaredKind, KeyKind, RegistrationEntry, Span,
    VariableBinding,
};
use compact_str::CompactString;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalyzerOptions {
    /// Callee name that marks a module import.
    pub module_loader: CompactString,

    /// Method name that marks a registration call.
    pub register_method: CompactString,

    /// Keep analyzing the statements that parse when others do not.
    pub tolerant: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            module_loader: CompactString::from(MODULE_LOADER),
            register_method: CompactString::from(REGISTER_METHOD),
            tolerant: false,
        }
    }
}

/// Analyze a container source with default options.
///
/// Never fails: a source that does not parse yields an empty result.
pub fn analyze(source: &str) -> AnalysisResult {
    analyze_with(source, &AnalyzerOptions::default())
}

pub fn analyze_with(source: &str, options: &AnalyzerOptions) -> AnalysisResult {
    let prepared = strip_placeholders(source);
    let parse_options = ParseOptions {
        record_locations: true,
        tolerant: options.tolerant,
    };

    let Some(program) = parse_module(&JavaScript, &prepared, parse_options)
        .ok_warn("Unable to parse container file")
    else {
        return AnalysisResult::new();
    };

    analyze_program(&program, options)
}

/// Walk already-parsed top-level statements.
pub fn analyze_program(program: &Program, options: &AnalyzerOptions) -> AnalysisResult {
    let mut result = AnalysisResult::new();

    if program.body.is_empty() {
        debug!("No declarations found");
        return result;
    }

    for statement in &program.body {
        match &statement.kind {
            StatementKind::VariableDeclaration { declarations } => {
                for declarator in declarations {
                    let classified = classify_declarator(declarator, options);
                    if let Classified::Recognized(bindings) = classified {
                        bindings
                            .into_iter()
                            .for_each(|binding| result.insert_variable(binding));
                    }
                }
            }
            StatementKind::Expression(expression) => {
                if let Classified::Recognized(arguments) =
                    classify_registration_call(expression, options)
                {
                    for properties in arguments.iter().filter_map(object_properties) {
                        properties
                            .iter()
                            .filter_map(|property| classify_registration(property).recognized())
                            .for_each(|entry| {
                                debug!(
                                    name = %entry.name,
                                    at = %entry.location.start,
                                    "Registration found"
                                );
                                result.insert_registration(entry)
                            });
                    }
                }
            }
            StatementKind::Other { .. } => {}
        }
    }

    debug!(
        variables = result.variables.len(),
        registrations = result.registrations.len(),
        "Analyzed container"
    );

    result
}

/// Bindings introduced by one declarator.
pub fn classify_declarator(
    declarator: &Declarator,
    options: &AnalyzerOptions,
) -> Classified<Vec<VariableBinding>> {
    let location = declarator.span.unwrap_or_default();

    match &declarator.id {
        Pattern::Identifier { name, span } => {
            Classified::Recognized(vec![classify_identifier_binding(
                name,
                location,
                span.unwrap_or(location),
                declarator.init.as_ref(),
                options,
            )])
        }
        Pattern::Object { properties } => {
            let source_name = match &declarator.init {
                Some(Expression::Identifier { name }) => Some(name),
                _ => None,
            };
            let bindings = properties
                .iter()
                .filter_map(|property| {
                    classify_destructured_property(property, source_name, location).recognized()
                })
                .collect();
            Classified::Recognized(bindings)
        }
        Pattern::Other { .. } => Classified::Unrecognized,
    }
}

fn classify_identifier_binding(
    name: &CompactString,
    location: Span,
    name_span: Span,
    init: Option<&Expression>,
    options: &AnalyzerOptions,
) -> VariableBinding {
    let (declared_kind, raw_value, alias_target) = match init {
        Some(Expression::Call {
            callee,
            arguments_text,
            ..
        }) => match callee.as_ref() {
            Expression::Identifier { name } if *name == options.module_loader => {
                (DeclaredKind::ModuleImport, Some(arguments_text.clone()), None)
            }
            Expression::Identifier { name } => (DeclaredKind::Call, None, Some(name.clone())),
            _ => (DeclaredKind::Call, None, None),
        },
        Some(Expression::Literal { raw }) => (DeclaredKind::Literal, Some(raw.clone()), None),
        Some(Expression::Identifier { name }) => (DeclaredKind::Alias, None, Some(name.clone())),
        _ => (DeclaredKind::Unclassified, None, None),
    };

    VariableBinding {
        name: name.clone(),
        declared_kind,
        location,
        name_span,
        raw_value,
        alias_target,
    }
}

/// Identifier keys alias the destructured identifier. When the right-hand
/// side is not a bare identifier there is nothing to alias and the binding is
/// `Unclassified`. String and number keys are `Literal` whatever the
/// right-hand side is.
fn classify_destructured_property(
    property: &PatternProperty,
    source_name: Option<&CompactString>,
    location: Span,
) -> Classified<VariableBinding> {
    let PatternProperty::Property { key } = property else {
        return Classified::Unrecognized;
    };
    let Some(name) = &key.name else {
        return Classified::Unrecognized;
    };

    let (declared_kind, raw_value, alias_target) = match (key.kind, source_name) {
        (KeyKind::Identifier, Some(source)) => (DeclaredKind::Alias, None, Some(source.clone())),
        (KeyKind::Identifier, None) => (DeclaredKind::Unclassified, None, None),
        (KeyKind::Literal, _) => (DeclaredKind::Literal, Some(key.raw.clone()), None),
        (KeyKind::Computed, _) => return Classified::Unrecognized,
    };

    Classified::Recognized(VariableBinding {
        name: name.clone(),
        declared_kind,
        location,
        name_span: key.span.unwrap_or(location),
        raw_value,
        alias_target,
    })
}

/// Arguments of a `<object>.register(...)` call.
pub fn classify_registration_call<'e>(
    expression: &'e Expression,
    options: &AnalyzerOptions,
) -> Classified<&'e [Expression]> {
    let Expression::Call {
        callee, arguments, ..
    } = expression
    else {
        return Classified::Unrecognized;
    };

    match callee.as_ref() {
        Expression::Member {
            property: Some(property),
            computed: false,
            ..
        } if *property == options.register_method => {
            Classified::Recognized(arguments.as_slice())
        }
        _ => Classified::Unrecognized,
    }
}

fn object_properties(argument: &Expression) -> Option<&[Property]> {
    match argument {
        Expression::Object { properties } => Some(properties.as_slice()),
        _ => None,
    }
}

/// A registration is a property whose value calls a plain identifier,
/// e.g. `userService: asClass(UserService)`.
pub fn classify_registration(property: &Property) -> Classified<RegistrationEntry> {
    let Property::KeyValue { key, value } = property else {
        return Classified::Unrecognized;
    };
    let Expression::Call {
        callee, arguments, ..
    } = value
    else {
        return Classified::Unrecognized;
    };
    let Expression::Identifier { name: builder } = callee.as_ref() else {
        return Classified::Unrecognized;
    };
    let PropertyKey {
        kind,
        name: Some(name),
        span,
        ..
    } = key
    else {
        return Classified::Unrecognized;
    };

    let (argument_kind, alias_target, raw_value) = match classify_builder_argument(arguments) {
        Classified::Recognized((ArgumentKind::Identifier, text)) => {
            (Some(ArgumentKind::Identifier), Some(text), None)
        }
        Classified::Recognized((ArgumentKind::Literal, text)) => {
            (Some(ArgumentKind::Literal), None, Some(text))
        }
        Classified::Unrecognized => (None, None, None),
    };

    Classified::Recognized(RegistrationEntry {
        name: name.clone(),
        key_kind: *kind,
        location: span.unwrap_or_default(),
        builder_callee: builder.clone(),
        argument_kind,
        alias_target,
        raw_value,
    })
}

/// Only the first builder argument is inspected.
fn classify_builder_argument(arguments: &[Expression]) -> Classified<(ArgumentKind, CompactString)> {
    match arguments.first() {
        Some(Expression::Identifier { name }) => {
            Classified::Recognized((ArgumentKind::Identifier, name.clone()))
        }
        Some(Expression::Literal { raw }) => {
            Classified::Recognized((ArgumentKind::Literal, raw.clone()))
        }
        _ => Classified::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceLocation;

    #[test]
    fn test_empty_source() {
        assert!(analyze("").is_empty());
        assert!(analyze("// nothing but a comment\n").is_empty());
    }

    #[test]
    fn test_unparseable_source_is_empty() {
        let result = analyze("const container = require('awilix');\ncontainer.register({{{ ;");
        assert!(result.variables.is_empty());
        assert!(result.registrations.is_empty());
    }

    #[test]
    fn test_module_import() {
        let result = analyze("const awilix = require('awilix');");
        let binding = &result.variables["awilix"];
        assert_eq!(binding.declared_kind, DeclaredKind::ModuleImport);
        assert_eq!(binding.raw_value.as_deref(), Some("'awilix'"));
        assert_eq!(binding.alias_target, None);
    }

    #[test]
    fn test_call_records_identifier_callee() {
        let result = analyze("const container = createContainer();");
        let binding = &result.variables["container"];
        assert_eq!(binding.declared_kind, DeclaredKind::Call);
        assert_eq!(binding.alias_target.as_deref(), Some("createContainer"));
        assert_eq!(binding.raw_value, None);
    }

    #[test]
    fn test_literal_and_alias() {
        let result = analyze("const port = 5;\nconst name = 'api';\nconst db = database;");
        assert_eq!(result.variables["port"].declared_kind, DeclaredKind::Literal);
        assert_eq!(result.variables["port"].raw_value.as_deref(), Some("5"));
        assert_eq!(result.variables["name"].raw_value.as_deref(), Some("'api'"));
        assert_eq!(result.variables["db"].declared_kind, DeclaredKind::Alias);
        assert_eq!(result.variables["db"].alias_target.as_deref(), Some("database"));
    }

    #[test]
    fn test_unclassified_initializers() {
        let result = analyze("let pending;\nconst handler = () => 1;\nconst neg = -1;");
        for name in ["pending", "handler", "neg"] {
            let binding = &result.variables[name];
            assert_eq!(binding.declared_kind, DeclaredKind::Unclassified, "{name}");
            assert_eq!(binding.raw_value, None);
            assert_eq!(binding.alias_target, None);
        }
    }

    #[test]
    fn test_every_declarator_is_processed() {
        let result = analyze("let a = 1, b = 2;");
        assert_eq!(result.variables["a"].raw_value.as_deref(), Some("1"));
        assert_eq!(result.variables["b"].raw_value.as_deref(), Some("2"));
    }

    #[test]
    fn test_destructured_from_call_is_unclassified() {
        let result = analyze("const { asClass, asValue } = require('awilix');");
        assert_eq!(result.variables.len(), 2);
        assert_eq!(result.variables["asClass"].declared_kind, DeclaredKind::Unclassified);
        assert_eq!(result.variables["asValue"].alias_target, None);
    }

    #[test]
    fn test_destructured_name_span_points_at_key() {
        let result = analyze("const { a, b } = obj;");
        let b = &result.variables["b"];
        assert_eq!(b.location.start, SourceLocation::new(1, 6));
        assert_eq!(b.name_span.start, SourceLocation::new(1, 11));
    }

    #[test]
    fn test_array_pattern_is_skipped() {
        assert!(analyze("const [first, second] = pair;").variables.is_empty());
    }

    #[test]
    fn test_registration_argument_kinds() {
        let source = r#"container.register({
  repo: asClass(Repo),
  url: asValue('postgres://localhost'),
  factory: asFunction(() => new Thing()),
  empty: asValue(),
});"#;
        let result = analyze(source);

        let repo = &result.registrations["repo"];
        assert_eq!(repo.argument_kind, Some(ArgumentKind::Identifier));
        assert_eq!(repo.alias_target.as_deref(), Some("Repo"));

        let url = &result.registrations["url"];
        assert_eq!(url.argument_kind, Some(ArgumentKind::Literal));
        assert_eq!(url.raw_value.as_deref(), Some("'postgres://localhost'"));
        assert_eq!(url.alias_target, None);

        for name in ["factory", "empty"] {
            let entry = &result.registrations[name];
            assert_eq!(entry.argument_kind, None);
            assert_eq!(entry.alias_target, None);
            assert_eq!(entry.raw_value, None);
        }
    }

    #[test]
    fn test_non_registration_properties_are_skipped() {
        let source = r#"container.register({
  plain: 42,
  chained: asClass(Service).singleton(),
  member: awilix.asClass(Service),
  shorthand,
  ...extra,
  kept: asClass(Kept),
});"#;
        let result = analyze(source);
        assert_eq!(result.registrations.len(), 1);
        assert!(result.registrations.contains_key("kept"));
    }

    #[test]
    fn test_registration_key_kinds() {
        let source = "container.register({ 'quoted-key': asValue(1), ['computed']: asValue(2), [dynamic]: asValue(3) });";
        let result = analyze(source);
        assert_eq!(result.registrations.len(), 2);
        assert_eq!(result.registrations["quoted-key"].key_kind, KeyKind::Literal);
        assert_eq!(result.registrations["computed"].key_kind, KeyKind::Computed);
    }

    #[test]
    fn test_non_object_arguments_are_skipped() {
        let source = "container.register('single', asClass(Single), { other: asClass(Other) });";
        let result = analyze(source);
        assert_eq!(result.registrations.len(), 1);
        assert!(result.registrations.contains_key("other"));
    }

    #[test]
    fn test_only_register_method_counts() {
        let source = "container.resolve({ a: asClass(A) });\nregister({ b: asClass(B) });\ncontainer['register']({ c: asClass(C) });";
        assert!(analyze(source).registrations.is_empty());
    }

    #[test]
    fn test_placeholder_does_not_break_analysis() {
        let source = "container.register({\n  a: asClass(A),\n  ...\n});";
        let result = analyze(source);
        assert_eq!(result.registrations["a"].location.start, SourceLocation::new(2, 2));
    }

    #[test]
    fn test_custom_options() {
        let options = AnalyzerOptions {
            module_loader: "load".into(),
            register_method: "add".into(),
            tolerant: false,
        };
        let result = analyze_with("const m = load('m');\nc.add({ s: asClass(S) });", &options);
        assert_eq!(result.variables["m"].declared_kind, DeclaredKind::ModuleImport);
        assert!(result.registrations.contains_key("s"));
    }

    #[test]
    fn test_tolerant_option_keeps_good_statements() {
        let source = "const kept = require('kept');\nconst = ;";
        assert!(analyze(source).is_empty());

        let options = AnalyzerOptions {
            tolerant: true,
            ..AnalyzerOptions::default()
        };
        let result = analyze_with(source, &options);
        assert_eq!(result.variables["kept"].declared_kind, DeclaredKind::ModuleImport);
    }

    #[test]
    fn test_repeated_calls_do_not_share_state() {
        let first = analyze("const onlyInFirst = 1;");
        let second = analyze("const onlyInSecond = 2;");
        assert!(first.variables.contains_key("onlyInFirst"));
        assert!(!second.variables.contains_key("onlyInFirst"));
    }
}
