use once_cell::sync::OnceCell;
use tree_sitter::Query;

use super::LanguageGrammar;

pub struct GoGrammar;

static GO_DECLARATIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl LanguageGrammar for GoGrammar {
    fn name(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["go"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn declarations_query(&self) -> &str {
        r#"
        (function_declaration
            name: (identifier) @name
        ) @function

        (method_declaration
            name: (field_identifier) @name
        ) @function

        (type_spec
            name: (type_identifier) @name
        ) @class
        "#
    }

    fn cached_declarations_query(&self) -> Option<&'static Query> {
        GO_DECLARATIONS_QUERY.get_or_try_init(|| {
            Query::new(&self.language(), self.declarations_query())
        }).ok()
    }
}
