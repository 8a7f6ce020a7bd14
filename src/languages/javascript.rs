use crate::languages::LanguageSupport;
use tree_sitter::Language;

pub struct JavaScript;

impl LanguageSupport for JavaScript {
    fn grammar(&self) -> Language {
        tree_sitter_javascript::LANGUAGE.into()
    }

    // Matches ESTree `Literal`; template strings are not literals there.
    fn literal_kinds(&self) -> &'static [&'static str] {
        &["string", "number", "true", "false", "null", "regex"]
    }

    // `undefined` is a plain identifier in ESTree.
    fn identifier_kinds(&self) -> &'static [&'static str] {
        &["identifier", "undefined"]
    }
}
