use once_cell::sync::OnceCell;
use tree_sitter::Query;

use super::LanguageGrammar;

pub struct CSharpGrammar;

static CSHARP_DECLARATIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl LanguageGrammar for CSharpGrammar {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["cs"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_c_sharp::LANGUAGE.into()
    }

    fn declarations_query(&self) -> &str {
        r#"
        (method_declaration
            name: (identifier) @name
        ) @function

        (local_function_statement
            name: (identifier) @name
        ) @function

        (class_declaration
            name: (identifier) @name
        ) @class

        (interface_declaration
            name: (identifier) @name
        ) @class

        (struct_declaration
            name: (identifier) @name
        ) @class
        "#
    }

    fn cached_declarations_query(&self) -> Option<&'static Query> {
        CSHARP_DECLARATIONS_QUERY.get_or_try_init(|| {
            Query::new(&self.language(), self.declarations_query())
        }).ok()
    }
}
