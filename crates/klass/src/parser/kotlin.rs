//! Kotlin 解析器 - 使用 tree-sitter 读取文件头和顶层声明
//!
//! 只读取 package、import、主构造函数参数和父类型列表，不做类型解析。

use super::{KlassParser, DISABLE_MARKER};
use crate::factory::ItemFactory;
use crate::types::KlassWithRelations;
use tree_sitter::{Node, Parser};

#[derive(Debug, Default)]
struct Header {
    package: Vec<String>,
    imports: Vec<Import>,
}

#[derive(Debug)]
struct Import {
    package: Vec<String>,
    name: String,
    alias: Option<String>,
}

#[derive(Debug)]
struct Declaration {
    name: String,
    parameters: Vec<String>,
    inheritances: Vec<String>,
}

/// `.kt` 文件解析器
pub struct KotlinParser {
    parser: Option<Parser>,
}

impl KotlinParser {
    pub fn new() -> Self {
        Self {
            parser: Self::create_parser(),
        }
    }

    fn create_parser() -> Option<Parser> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&tree_sitter_kotlin_ng::LANGUAGE.into()) {
            tracing::warn!("Failed to load Kotlin grammar: {}", e);
            return None;
        }
        Some(parser)
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl KlassParser for KotlinParser {
    fn extension(&self) -> &str {
        "kt"
    }

    fn parse(
        &mut self,
        factory: &mut ItemFactory,
        text: &str,
        declared_name: &str,
        file_path: &str,
    ) -> Option<KlassWithRelations> {
        let parser = self.parser.as_mut()?;
        let tree = parser.parse(text, None)?;
        let root = tree.root_node();

        let header = read_header(root, text);
        let declarations = find_declarations(root, text);
        let declaration = declarations
            .iter()
            .find(|d| d.name == declared_name)
            .or_else(|| declarations.first())?;

        let item = factory
            .create_item(&declaration.name, &header.package, None)
            .canonical()
            .clone();

        // 被构造过滤器排除的 import 不进入关系
        let file_imports = header
            .imports
            .iter()
            .map(|import| factory.create_item(&import.name, &import.package, import.alias.as_deref()))
            .filter(|import| !import.is_excluded())
            .collect();

        Some(KlassWithRelations {
            item,
            file_path: file_path.to_string(),
            file_imports,
            parameters: declaration.parameters.clone(),
            inheritances: declaration.inheritances.clone(),
            disabled: has_disable_marker(root, text),
        })
    }
}

fn node_text<'a>(node: Node, content: &'a str) -> &'a str {
    &content[node.byte_range()]
}

/// 标识符文本，去掉反引号
fn identifier_text(node: Node, content: &str) -> String {
    node_text(node, content).trim_matches('`').to_string()
}

/// `a.b.c` 拆成段
fn qualified_segments(node: Node, content: &str) -> Vec<String> {
    let mut cursor = node.walk();
    let segments = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "identifier")
        .map(|c| identifier_text(c, content))
        .collect();
    segments
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let child = node.children(&mut cursor).find(|c| c.kind() == kind);
    child
}

fn read_header(root: Node, content: &str) -> Header {
    let mut header = Header::default();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_header" => {
                if let Some(name) = child_of_kind(child, "qualified_identifier") {
                    header.package = qualified_segments(name, content);
                }
            }
            "import" => {
                if let Some(import) = read_import(child, content) {
                    header.imports.push(import);
                }
            }
            _ => {}
        }
    }

    header
}

/// 通配符 import 没有对应的条目，返回 None
fn read_import(node: Node, content: &str) -> Option<Import> {
    if child_of_kind(node, "*").is_some() {
        return None;
    }

    let mut package = qualified_segments(child_of_kind(node, "qualified_identifier")?, content);
    let name = package.pop()?;
    // `as` 后面的别名是 import 节点的直接子节点
    let alias = child_of_kind(node, "identifier").map(|alias| identifier_text(alias, content));

    Some(Import { package, name, alias })
}

/// 顶层的 class / interface / object 声明，嵌套声明不算
fn find_declarations(root: Node, content: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if !matches!(child.kind(), "class_declaration" | "object_declaration") {
            continue;
        }
        let Some(name) = child.child_by_field_name("name") else {
            continue;
        };

        let parameters = child_of_kind(child, "primary_constructor")
            .and_then(|constructor| child_of_kind(constructor, "class_parameters"))
            .map(|parameters| read_parameters(parameters, content))
            .unwrap_or_default();

        let inheritances = child_of_kind(child, "delegation_specifiers")
            .map(|specifiers| read_supertypes(specifiers, content))
            .unwrap_or_default();

        declarations.push(Declaration {
            name: identifier_text(name, content),
            parameters,
            inheritances,
        });
    }

    declarations
}

fn read_parameters(node: Node, content: &str) -> Vec<String> {
    let mut cursor = node.walk();
    let parameters = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "class_parameter")
        .filter_map(|parameter| parameter_descriptor(parameter, content))
        .collect();
    parameters
}

/// 构造参数的 "name: Type"，默认值丢弃
fn parameter_descriptor(node: Node, content: &str) -> Option<String> {
    let mut name = None;
    let mut after_colon = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_extra() {
            continue;
        }
        match child.kind() {
            ":" => after_colon = true,
            "=" => break,
            "identifier" if !after_colon && name.is_none() => {
                name = Some(identifier_text(child, content));
            }
            _ if after_colon && child.is_named() => {
                let ty = node_text(child, content).split_whitespace().collect::<Vec<_>>().join(" ");
                return Some(format!("{}: {}", name?, ty));
            }
            _ => {}
        }
    }

    None
}

/// 父类型名称，去掉构造参数和类型参数
fn read_supertypes(node: Node, content: &str) -> Vec<String> {
    let mut cursor = node.walk();
    let supertypes = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "delegation_specifier")
        .filter_map(|specifier| supertype_name(specifier, content))
        .collect();
    supertypes
}

fn supertype_name(node: Node, content: &str) -> Option<String> {
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();

    for child in children {
        let name = match child.kind() {
            "user_type" => Some(user_type_name(child, content)),
            "nullable_type" | "constructor_invocation" | "explicit_delegation" => {
                supertype_name(child, content)
            }
            _ => None,
        };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return Some(name);
        }
    }
    None
}

/// `com.app.Base<T>` -> "com.app.Base"
fn user_type_name(node: Node, content: &str) -> String {
    qualified_segments(node, content).join(".")
}

fn has_disable_marker(node: Node, content: &str) -> bool {
    if matches!(node.kind(), "line_comment" | "block_comment") {
        return node_text(node, content).contains(DISABLE_MARKER);
    }

    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| has_disable_marker(child, content));
    found
}
