//! Tree-sitter C++ front-end producing the class relation stream.
//!
//! Every `class_specifier` with a body is reported in document order, nested
//! classes included. Forward declarations carry no bases and are skipped.

use std::path::Path;
use std::sync::OnceLock;

use class_tag::ClassDecl;
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator};

/// Static cache for the class query.
static CLASS_QUERY: OnceLock<Query> = OnceLock::new();
/// Static cache for the class + struct query.
static CLASS_STRUCT_QUERY: OnceLock<Query> = OnceLock::new();

const CLASS_S_EXPR: &str = r#"
    (class_specifier
      name: (type_identifier) @class.name
      body: (field_declaration_list)) @class.def
"#;

const STRUCT_S_EXPR: &str = r#"
    (struct_specifier
      name: (type_identifier) @class.name
      body: (field_declaration_list)) @class.def
"#;

fn get_class_query() -> &'static Query {
    CLASS_QUERY.get_or_init(|| {
        Query::new(&tree_sitter_cpp::LANGUAGE.into(), CLASS_S_EXPR)
            .expect("class query compilation failed: hardcoded S-expression is malformed")
    })
}

fn get_class_struct_query() -> &'static Query {
    CLASS_STRUCT_QUERY.get_or_init(|| {
        let source = format!("{CLASS_S_EXPR}\n{STRUCT_S_EXPR}");
        Query::new(&tree_sitter_cpp::LANGUAGE.into(), &source)
            .expect("class/struct query compilation failed: hardcoded S-expression is malformed")
    })
}

/// Errors produced while extracting declarations.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parser setup failed: {0}")]
    Grammar(String),
    #[error("parse returned no tree")]
    NoTree,
}

/// A C++ header seen through the class relation interface.
#[derive(Debug, Clone)]
pub struct CppHeader {
    source: Vec<u8>,
    include_structs: bool,
}

impl CppHeader {
    pub fn from_source(source: impl Into<Vec<u8>>) -> Self {
        Self {
            source: source.into(),
            include_structs: false,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let source = std::fs::read(path).map_err(|source| ExtractError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_source(source))
    }

    /// Also report `struct` declarations.
    pub fn include_structs(mut self, yes: bool) -> Self {
        self.include_structs = yes;
        self
    }

    /// Every class declaration with its direct bases, in document order.
    pub fn classes(&self) -> Result<Vec<ClassDecl>, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| ExtractError::Grammar(e.to_string()))?;
        let tree = parser.parse(&self.source, None).ok_or(ExtractError::NoTree)?;

        let query = if self.include_structs {
            get_class_struct_query()
        } else {
            get_class_query()
        };
        let capture_names = query.capture_names();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), self.source.as_slice());
        let mut classes = Vec::new();

        while let Some(m) = matches.next() {
            let def_node = m
                .captures
                .iter()
                .find(|c| capture_names[c.index as usize] == "class.def")
                .map(|c| c.node);
            let name_node = m
                .captures
                .iter()
                .find(|c| capture_names[c.index as usize] == "class.name")
                .map(|c| c.node);
            let (Some(def_node), Some(name_node)) = (def_node, name_node) else {
                continue;
            };
            let Ok(name) = name_node.utf8_text(&self.source) else {
                continue;
            };

            classes.push((
                def_node.start_byte(),
                ClassDecl {
                    name: name.to_string(),
                    bases: base_names(def_node, &self.source),
                },
            ));
        }

        // Matches from different patterns may interleave; restore document order.
        classes.sort_by_key(|(start, _)| *start);
        Ok(classes.into_iter().map(|(_, decl)| decl).collect())
    }
}

/// Simple names of every base in the declaration's base clause.
fn base_names(def_node: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut bases = Vec::new();
    let mut cursor = def_node.walk();
    for child in def_node.named_children(&mut cursor) {
        if child.kind() != "base_class_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for spec in child.named_children(&mut clause_cursor) {
            if let Some(name) = simple_type_name(spec, source) {
                bases.push(name);
            }
        }
    }
    bases
}

/// `ns::Base` → `Base`, `Base<T>` → `Base`; access specifiers yield `None`.
fn simple_type_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "type_identifier" => node.utf8_text(source).ok().map(str::to_string),
        "qualified_identifier" | "template_type" => {
            simple_type_name(node.child_by_field_name("name")?, source)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> Vec<ClassDecl> {
        CppHeader::from_source(src).classes().unwrap()
    }

    #[test]
    fn extracts_classes_and_bases_in_order() {
        let src = r#"
class BaseShape {
public:
    virtual ~BaseShape() = default;
};
class DynamicShape : public BaseShape {};
class Particle final : public DynamicShape {};
class Line final : public BaseShape {};
"#;
        let classes = extract(src);
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["BaseShape", "DynamicShape", "Particle", "Line"]);
        assert!(classes[0].bases.is_empty());
        assert_eq!(classes[1].bases, ["BaseShape"]);
        assert_eq!(classes[2].bases, ["DynamicShape"]);
        assert_eq!(classes[3].bases, ["BaseShape"]);
    }

    #[test]
    fn forward_declarations_are_skipped() {
        let classes = extract("class Later;\nclass Now {};\n");
        assert_eq!(classes, [ClassDecl::new("Now")]);
    }

    #[test]
    fn qualified_and_template_bases_use_simple_names() {
        let src = r#"
namespace geo { class Shape {}; }
template <typename T> class Holder {};
class Circle : public geo::Shape {};
class Boxed : protected Holder<int> {};
"#;
        let classes = extract(src);
        let circle = classes.iter().find(|c| c.name == "Circle").unwrap();
        let boxed = classes.iter().find(|c| c.name == "Boxed").unwrap();
        assert_eq!(circle.bases, ["Shape"]);
        assert_eq!(boxed.bases, ["Holder"]);
    }

    #[test]
    fn multiple_bases_are_reported_in_source_order() {
        let classes = extract("class A {};\nclass B {};\nclass C : public A, private B {};\n");
        assert_eq!(classes[2].bases, ["A", "B"]);
    }

    #[test]
    fn nested_classes_follow_their_outer_class() {
        let src = r#"
class Outer {
    class Inner : public Outer {};
};
"#;
        let classes = extract(src);
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Inner"]);
        assert_eq!(classes[1].bases, ["Outer"]);
    }

    #[test]
    fn structs_only_when_enabled() {
        let src = "class A {};\nstruct Plain : A {};\n";
        assert_eq!(extract(src).len(), 1);

        let with_structs = CppHeader::from_source(src)
            .include_structs(true)
            .classes()
            .unwrap();
        assert_eq!(with_structs.len(), 2);
        assert_eq!(with_structs[1].bases, ["A"]);
    }

    #[test]
    fn from_file_reports_missing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = CppHeader::from_file(dir.path().join("Shapes.hpp")).unwrap_err();
        assert!(matches!(err, ExtractError::Read { .. }));
        assert!(err.to_string().contains("Shapes.hpp"));
    }

    #[test]
    fn empty_source_has_no_classes() {
        assert!(extract("").is_empty());
    }
}
