use once_cell::sync::OnceCell;
use tree_sitter::Query;

use super::LanguageGrammar;

pub struct TypeScriptGrammar;

static TYPESCRIPT_DECLARATIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl LanguageGrammar for TypeScriptGrammar {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["ts", "tsx", "js", "jsx"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    }

    fn declarations_query(&self) -> &str {
        r#"
        (function_declaration
            name: (identifier) @name
        ) @function

        (method_definition
            name: (property_identifier) @name
        ) @function

        (variable_declarator
            name: (identifier) @name
            value: (arrow_function)
        ) @function

        (class_declaration
            name: (type_identifier) @name
        ) @class

        (interface_declaration
            name: (type_identifier) @name
        ) @class
        "#
    }

    fn cached_declarations_query(&self) -> Option<&'static Query> {
        TYPESCRIPT_DECLARATIONS_QUERY.get_or_try_init(|| {
            Query::new(&self.language(), self.declarations_query())
        }).ok()
    }
}
