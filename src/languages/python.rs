use once_cell::sync::OnceCell;
use tree_sitter::Query;

use super::LanguageGrammar;

pub struct PythonGrammar;

static PYTHON_DECLARATIONS_QUERY: OnceCell<Query> = OnceCell::new();

impl LanguageGrammar for PythonGrammar {
    fn name(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["py", "pyi"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn declarations_query(&self) -> &str {
        r#"
        (function_definition
            name: (identifier) @name
        ) @function

        (class_definition
            name: (identifier) @name
        ) @class
        "#
    }

    fn cached_declarations_query(&self) -> Option<&'static Query> {
        PYTHON_DECLARATIONS_QUERY.get_or_try_init(|| {
            Query::new(&self.language(), self.declarations_query())
        }).ok()
    }
}
