use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::{Node, StreamingIterator};

use super::parser::{parse_source, ParsedSource};
use super::{PatternKind, PatternRecord};
use crate::error::{BankError, Result};
use crate::languages::LanguageGrammar;

/// Name fragments that mark a declaration as reusable
pub const VOCABULARY: &[&str] = &[
    "util", "helper", "format", "parse", "convert", "validate", "check", "base", "abstract", "manager",
    "service",
];

static FUNCTION_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:function|def|fn|func|fun)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("function regex")
});

static ARROW_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*(?:async\s+)?\(")
        .expect("arrow function regex")
});

static C_STYLE_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Za-z_][A-Za-z0-9_ \t\*]*?[ \t\*]([A-Za-z_][A-Za-z0-9_]*)[ \t]*\([^;{}\n]*\)[ \t]*\{")
        .expect("c-style function regex")
});

static CLASS_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:class|struct|interface|trait|object|module)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("class regex")
});

pub fn is_vocabulary_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    VOCABULARY.iter().any(|keyword| lower.contains(keyword))
}

/// Turns the text of one source file into pattern records.
pub trait PatternExtractor {
    fn extract(&self, source: &str, file: &str) -> Result<Vec<PatternRecord>>;
}

/// Byte offsets of line starts, for offset to line-number lookup
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line of `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Declaration matching over a tree-sitter syntax tree
pub struct SyntaxExtractor {
    grammar: Arc<dyn LanguageGrammar>,
}

impl SyntaxExtractor {
    pub fn new(grammar: Arc<dyn LanguageGrammar>) -> Self {
        Self { grammar }
    }

    fn description(&self, parsed: &ParsedSource, node: &Node) -> Option<String> {
        if parsed.language == "python" {
            if let Some(doc) = python_docstring(parsed, node) {
                return Some(doc);
            }
        }
        doc_comment(parsed, node)
    }
}

impl PatternExtractor for SyntaxExtractor {
    fn extract(&self, source: &str, file: &str) -> Result<Vec<PatternRecord>> {
        let query = self
            .grammar
            .cached_declarations_query()
            .ok_or_else(|| BankError::Parse(format!("no declarations query for {}", self.grammar.name())))?;
        let parsed = parse_source(source, self.grammar.as_ref())?;
        if parsed.root_node().has_error() {
            return Err(BankError::Parse(format!("{} syntax errors in {}", self.grammar.name(), file)));
        }

        let mut records = Vec::new();
        let mut cursor = tree_sitter::QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.root_node(), parsed.source_bytes());

        while let Some(m) = matches.next() {
            let mut name: Option<&str> = None;
            let mut decl: Option<(Node, PatternKind)> = None;

            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                match capture_name {
                    "name" => name = Some(parsed.node_text(&capture.node)),
                    "function" => decl = Some((capture.node, PatternKind::UtilityFunction)),
                    "class" => decl = Some((capture.node, PatternKind::ReusableClass)),
                    _ => {}
                }
            }

            if let (Some(name), Some((node, kind))) = (name, decl) {
                if !is_vocabulary_name(name) {
                    continue;
                }
                records.push(PatternRecord {
                    name: name.to_string(),
                    file: file.to_string(),
                    line: node.start_position().row + 1,
                    kind,
                    description: self.description(&parsed, &node),
                });
            }
        }

        Ok(dedup(records))
    }
}

fn python_docstring(parsed: &ParsedSource, node: &Node) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }

    let raw = parsed.node_text(&string);
    let trimmed = raw
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    first_line(trimmed)
}

/// Doc comment directly preceding the declaration or its wrapping statement
fn doc_comment(parsed: &ParsedSource, node: &Node) -> Option<String> {
    let mut current = *node;
    loop {
        if let Some(prev) = current.prev_named_sibling() {
            if prev.kind().contains("comment") {
                let text = parsed.node_text(&prev).trim();
                if text.starts_with("///") || text.starts_with("/**") || text.starts_with("//!") {
                    let cleaned = text
                        .trim_start_matches('/')
                        .trim_start_matches('*')
                        .trim_start_matches('!')
                        .trim_end_matches("*/")
                        .trim();
                    return first_line(cleaned);
                }
            }
            return None;
        }

        let parent = current.parent()?;
        if !matches!(
            parent.kind(),
            "export_statement" | "lexical_declaration" | "variable_declaration" | "decorated_definition"
        ) {
            return None;
        }
        current = parent;
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Declaration-like regex matching for languages without a grammar
#[derive(Default)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PatternExtractor for RegexExtractor {
    fn extract(&self, source: &str, file: &str) -> Result<Vec<PatternRecord>> {
        let lines = LineIndex::new(source);
        let mut records = Vec::new();

        let function_regexes: [&Regex; 3] = [&*FUNCTION_KEYWORD, &*ARROW_FUNCTION, &*C_STYLE_FUNCTION];
        let candidates = function_regexes
            .iter()
            .map(|re| (*re, PatternKind::UtilityFunction))
            .chain(std::iter::once((&*CLASS_KEYWORD, PatternKind::ReusableClass)));

        for (re, kind) in candidates {
            for caps in re.captures_iter(source) {
                let Some(name) = caps.get(1) else { continue };
                if !is_vocabulary_name(name.as_str()) {
                    continue;
                }
                records.push(PatternRecord {
                    name: name.as_str().to_string(),
                    file: file.to_string(),
                    line: lines.line_of(name.start()),
                    kind,
                    description: None,
                });
            }
        }

        records.sort_by_key(|r| r.line);
        Ok(dedup(records))
    }
}

fn dedup(records: Vec<PatternRecord>) -> Vec<PatternRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.name.clone(), r.line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::REGISTRY;

    fn syntax(language: &str, source: &str) -> Vec<PatternRecord> {
        let grammar = REGISTRY.get_by_name(language).unwrap();
        SyntaxExtractor::new(grammar).extract(source, "file").unwrap()
    }

    fn names(records: &[PatternRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_vocabulary() {
        assert!(is_vocabulary_name("formatDate"));
        assert!(is_vocabulary_name("BaseRepository"));
        assert!(is_vocabulary_name("UserService"));
        assert!(!is_vocabulary_name("main"));
        assert!(!is_vocabulary_name("render"));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
    }

    #[test]
    fn test_python_functions_and_classes() {
        let source = r#"
def parse_config(path):
    """Read the settings file.

    Longer text.
    """
    return path

def main():
    pass

class BaseHandler:
    pass
"#;
        let records = syntax("python", source);
        assert_eq!(names(&records), vec!["parse_config", "BaseHandler"]);
        assert_eq!(records[0].kind, PatternKind::UtilityFunction);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].description.as_deref(), Some("Read the settings file."));
        assert_eq!(records[1].kind, PatternKind::ReusableClass);
        assert_eq!(records[1].line, 12);
        assert_eq!(records[1].description, None);
    }

    #[test]
    fn test_typescript_declarations() {
        let source = r#"
/** Formats a price for display */
export function formatPrice(n: number): string { return `${n}`; }

const validateEmail = (s: string) => s.includes("@");

class UserService {
    checkAccess() { return true; }
}

function render() {}
"#;
        let records = syntax("typescript", source);
        let found = names(&records);
        assert!(found.contains(&"formatPrice"));
        assert!(found.contains(&"validateEmail"));
        assert!(found.contains(&"UserService"));
        assert!(found.contains(&"checkAccess"));
        assert!(!found.contains(&"render"));

        let format = records.iter().find(|r| r.name == "formatPrice").unwrap();
        assert_eq!(format.description.as_deref(), Some("Formats a price for display"));
    }

    #[test]
    fn test_rust_declarations() {
        let source = r#"
/// Parses a header line
fn parse_header(line: &str) -> &str { line }

struct ConnectionManager;

fn run() {}
"#;
        let records = syntax("rust", source);
        assert_eq!(names(&records), vec!["parse_header", "ConnectionManager"]);
        assert_eq!(records[0].description.as_deref(), Some("Parses a header line"));
    }

    #[test]
    fn test_go_declarations() {
        let source = "package main\n\nfunc validateInput(s string) bool { return s != \"\" }\n\ntype cacheManager struct{}\n";
        let records = syntax("go", source);
        assert_eq!(names(&records), vec!["validateInput", "cacheManager"]);
    }

    #[test]
    fn test_syntax_errors_rejected() {
        let grammar = REGISTRY.get_by_name("python").unwrap();
        let result = SyntaxExtractor::new(grammar).extract("def format_value(x:\n    return x\n", "broken.py");
        assert!(matches!(result, Err(BankError::Parse(_))));
    }

    #[test]
    fn test_regex_extractor_kotlin() {
        let source = "class UserManager {\n    fun formatName(n: String) = n\n    fun run() {}\n}\n";
        let records = RegexExtractor::new().extract(source, "User.kt").unwrap();
        assert_eq!(names(&records), vec!["UserManager", "formatName"]);
        assert_eq!(records[1].line, 2);
        assert_eq!(records[1].kind, PatternKind::UtilityFunction);
    }

    #[test]
    fn test_regex_extractor_c_style() {
        let source = "#include <stdio.h>\n\nstatic int parse_args(int argc, char **argv) {\n    return 0;\n}\n\nint main(void) {\n}\n";
        let records = RegexExtractor::new().extract(source, "main.c").unwrap();
        assert_eq!(names(&records), vec!["parse_args"]);
        assert_eq!(records[0].line, 3);
    }

    #[test]
    fn test_regex_extractor_ruby_and_php() {
        let ruby = RegexExtractor::new().extract("module Helpers\n  def format_money(x)\n  end\nend\n", "a.rb").unwrap();
        assert_eq!(names(&ruby), vec!["Helpers", "format_money"]);

        let php = RegexExtractor::new().extract("<?php\nfunction check_token($t) {}\n", "a.php").unwrap();
        assert_eq!(names(&php), vec!["check_token"]);
    }

    #[test]
    fn test_regex_extractor_dedups_same_line() {
        let source = "const parseRow = (r) => r;\n";
        let records = RegexExtractor::new().extract(source, "a.js").unwrap();
        assert_eq!(records.len(), 1);
    }
}
