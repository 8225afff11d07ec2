use tree_sitter::{Node, Tree};

use crate::error::{BankError, Result};
use crate::languages::LanguageGrammar;

/// Source text with its syntax tree
pub struct ParsedSource<'a> {
    pub tree: Tree,
    pub source: &'a str,
    pub language: &'static str,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }
}

pub fn parse_source<'a>(source: &'a str, grammar: &dyn LanguageGrammar) -> Result<ParsedSource<'a>> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar.language())
        .map_err(|e| BankError::Parse(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| BankError::Parse(format!("failed to parse {} source", grammar.name())))?;

    Ok(ParsedSource {
        tree,
        source,
        language: grammar.name(),
    })
}
