use once_cell::sync::OnceCell;
use tree_sitter::Query;

use super::LanguageGrammar;

pub struct CppGrammar;

static CPP_DECLARATIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl LanguageGrammar for CppGrammar {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["cpp", "cc", "cxx", "hpp", "h", "hxx"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn declarations_query(&self) -> &str {
        r#"
        (function_definition
            declarator: (function_declarator
                declarator: (identifier) @name
            )
        ) @function

        (function_definition
            declarator: (function_declarator
                declarator: (qualified_identifier
                    name: (identifier) @name
                )
            )
        ) @function

        (function_definition
            declarator: (function_declarator
                declarator: (field_identifier) @name
            )
        ) @function

        (class_specifier
            name: (type_identifier) @name
        ) @class

        (struct_specifier
            name: (type_identifier) @name
        ) @class
        "#
    }

    fn cached_declarations_query(&self) -> Option<&'static Query> {
        CPP_DECLARATIONS_QUERY.get_or_try_init(|| {
            Query::new(&self.language(), self.declarations_query())
        }).ok()
    }
}
