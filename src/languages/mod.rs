use tree_sitter::Language;

pub mod javascript;

pub use javascript::JavaScript;

/// Grammar-specific knowledge needed to lower a tree-sitter tree into the
/// statement model.
pub trait LanguageSupport: Send + Sync {
    fn grammar(&self) -> Language;

    /// Node kinds that lower to a literal value.
    fn literal_kinds(&self) -> &'static [&'static str];

    /// Node kinds that are references to a binding.
    fn identifier_kinds(&self) -> &'static [&'static str] {
        &["identifier"]
    }

    fn is_literal(&self, kind: &str) -> bool {
        self.literal_kinds().contains(&kind)
    }

    fn is_identifier(&self, kind: &str) -> bool {
        self.identifier_kinds().contains(&kind)
    }

    fn strip_quotes<'a>(&self, text: &'a str) -> &'a str {
        text.trim_matches(|c| c == '"' || c == '\'')
    }
}
