use once_cell::sync::OnceCell;
use tree_sitter::Query;

use super::LanguageGrammar;

pub struct JavaGrammar;

static JAVA_DECLARATIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl LanguageGrammar for JavaGrammar {
    fn name(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["java"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn declarations_query(&self) -> &str {
        r#"
        (method_declaration
            name: (identifier) @name
        ) @function

        (class_declaration
            name: (identifier) @name
        ) @class

        (interface_declaration
            name: (identifier) @name
        ) @class
        "#
    }

    fn cached_declarations_query(&self) -> Option<&'static Query> {
        JAVA_DECLARATIONS_QUERY.get_or_try_init(|| {
            Query::new(&self.language(), self.declarations_query())
        }).ok()
    }
}
