use crate::settings::GeneratorSettings;
use klass::{join_package, split_parameter, ItemRef, KlassWithRelations};
use std::collections::{HashMap, HashSet};

const ROOT_PACKAGE_TITLE: &str = "<root>";

/// Mermaid 类图生成器，每个包一个文档
pub struct MermaidGenerator {
    generated_file_name: String,
    markdown: bool,
}

/// 构建中的文档，行去重
#[derive(Default)]
struct Document {
    nodes: Vec<String>,
    edges: Vec<String>,
    links: Vec<String>,
    /// 节点 key -> 节点 id
    ids: HashMap<String, String>,
    taken: HashSet<String>,
    seen_edges: HashSet<String>,
}

impl Document {
    /// 声明节点，返回 (id, 是否新声明)
    ///
    /// 不同 key 清洗后撞名时追加 `_2`、`_3` 后缀
    fn declare(&mut self, key: &str, base: &str, label: &str) -> (String, bool) {
        if let Some(id) = self.ids.get(key) {
            return (id.clone(), false);
        }

        let mut id = base.to_string();
        let mut suffix = 1;
        while self.taken.contains(&id) {
            suffix += 1;
            id = format!("{}_{}", base, suffix);
        }

        self.taken.insert(id.clone());
        self.ids.insert(key.to_string(), id.clone());
        self.nodes.push(format!("    class {}[\"{}\"]", id, label));
        (id, true)
    }

    fn declare_item(&mut self, item: &KlassWithRelations) -> (String, bool) {
        let qualified_name = item.item.qualified_name();
        self.declare(&qualified_name, &MermaidGenerator::node_id(&qualified_name), item.name())
    }

    fn edge(&mut self, edge: String) {
        if self.seen_edges.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }
}

impl MermaidGenerator {
    pub fn new(settings: &GeneratorSettings) -> Self {
        Self {
            generated_file_name: settings.generated_file_name.clone(),
            markdown: settings.is_markdown(),
        }
    }

    /// 生成一个包目录的类图
    ///
    /// `relative_output_path` 是目标根目录到源码根目录的相对路径，类节点通过它链接源文件
    pub fn generate(
        &self,
        items: &[KlassWithRelations],
        child_packages: &[String],
        relative_output_path: &str,
    ) -> String {
        let package: Vec<String> = items
            .first()
            .map(|item| item.file_package().to_vec())
            .unwrap_or_default();
        let mut document = Document::default();

        for item in items {
            let (id, declared) = document.declare_item(item);
            if !declared {
                continue;
            }
            for parameter in &item.parameters {
                document
                    .nodes
                    .push(format!("    {} : {}", id, Self::member(parameter)));
            }
            document.links.push(format!(
                "    click {} href \"{}\" \"{}\"",
                id,
                Self::source_link(item, relative_output_path),
                item.file_path
            ));
        }

        for item in items {
            self.add_relations(&mut document, item, items);
        }

        self.add_child_packages(&mut document, &package, child_packages);
        self.render(&package, relative_output_path, document)
    }

    /// 没有条目的包：只有子包链接的占位图
    pub fn generate_empty(
        &self,
        diagram_package: &[String],
        child_packages: &[String],
        relative_output_path: &str,
    ) -> String {
        let mut document = Document::default();
        self.add_child_packages(&mut document, diagram_package, child_packages);
        self.render(diagram_package, relative_output_path, document)
    }

    fn add_relations(&self, document: &mut Document, item: &KlassWithRelations, locals: &[KlassWithRelations]) {
        let (id, _) = document.declare_item(item);
        let mut used_imports: Vec<&ItemRef> = Vec::new();

        for inheritance in &item.inheritances {
            let target = match Self::resolve(item, locals, inheritance) {
                Some(Target::Import(import)) => {
                    used_imports.push(import);
                    Self::declare_import(document, import)
                }
                Some(Target::Local(local)) => document.declare_item(local).0,
                None => document.declare(inheritance, &Self::node_id(inheritance), inheritance).0,
            };
            document.edge(format!("    {} <|-- {}", target, id));
        }

        for parameter in &item.parameters {
            let Some((name, type_name)) = split_parameter(parameter) else {
                continue;
            };
            let target = match Self::resolve(item, locals, type_name) {
                Some(Target::Import(import)) => {
                    used_imports.push(import);
                    Self::declare_import(document, import)
                }
                Some(Target::Local(local)) if local.item.id() != item.item.id() => {
                    document.declare_item(local).0
                }
                _ => continue,
            };
            document.edge(format!("    {} --> {} : {}", id, target, name));
        }

        for import in &item.file_imports {
            if used_imports.iter().any(|used| *used == import) {
                continue;
            }
            let target = Self::declare_import(document, import);
            match import.code_identifier() {
                Some(alias) => document.edge(format!("    {} ..> {} : as {}", id, target, alias)),
                None => document.edge(format!("    {} ..> {}", id, target)),
            }
        }
    }

    /// 按 `item` 中的写法解析类型名：先查 import，再查同包条目
    fn resolve<'a>(
        item: &'a KlassWithRelations,
        locals: &'a [KlassWithRelations],
        written: &str,
    ) -> Option<Target<'a>> {
        if let Some(import) = item.resolve_import(written) {
            return match locals.iter().find(|local| local.item.id() == import.canonical().id()) {
                Some(local) => Some(Target::Local(local)),
                None => Some(Target::Import(import)),
            };
        }

        if let Some(local) = locals.iter().find(|local| local.name() == written) {
            return Some(Target::Local(local));
        }

        // 全限定名引用已导入的条目
        item.file_imports
            .iter()
            .find(|import| import.canonical().qualified_name() == written)
            .map(Target::Import)
    }

    fn declare_import(document: &mut Document, import: &ItemRef) -> String {
        let qualified_name = import.canonical().qualified_name();
        document
            .declare(&qualified_name, &Self::node_id(&qualified_name), &qualified_name)
            .0
    }

    fn add_child_packages(&self, document: &mut Document, package: &[String], child_packages: &[String]) {
        for child in child_packages {
            let mut child_package = package.to_vec();
            child_package.push(child.clone());
            let joined = join_package(&child_package);
            let base = format!("package_{}", Self::node_id(&joined));

            let (id, declared) = document.declare(&format!("package:{}", joined), &base, child);
            if declared {
                document.nodes.push(format!("    <<package>> {}", id));
                document.links.push(format!(
                    "    click {} href \"{}/{}\" \"{}\"",
                    id, child, self.generated_file_name, child
                ));
            }
        }
    }

    fn render(&self, package: &[String], relative_output_path: &str, document: Document) -> String {
        let title = if package.is_empty() {
            ROOT_PACKAGE_TITLE.to_string()
        } else {
            join_package(package)
        };

        let mut lines = vec![
            "---".to_string(),
            format!("title: {}", title),
            "---".to_string(),
            "classDiagram".to_string(),
        ];
        let package_path = package.join("/");
        let source = [relative_output_path.trim_matches('/'), package_path.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");
        if !source.is_empty() {
            lines.push(format!("    %% source: {}", source));
        }
        lines.extend(document.nodes);
        lines.extend(document.edges);
        lines.extend(document.links);

        let mermaid = lines.join("\n");
        if self.markdown {
            format!("```mermaid\n{}\n```\n", mermaid)
        } else {
            format!("{}\n", mermaid)
        }
    }

    /// 从条目所在目录的图链接到源文件
    fn source_link(item: &KlassWithRelations, relative_output_path: &str) -> String {
        let mut parts = vec!["..".to_string(); item.directory_depth()];
        let relative = relative_output_path.trim_matches('/');
        if !relative.is_empty() {
            parts.push(relative.to_string());
        }
        parts.push(item.file_path.clone());
        parts.join("/")
    }

    /// 泛型写成 `List~Item~`，函数类型的 `->` 保留
    fn member(parameter: &str) -> String {
        parameter
            .split("->")
            .map(|part| part.replace(['<', '>'], "~"))
            .collect::<Vec<_>>()
            .join("->")
    }

    /// 清洗为 Mermaid 节点 id
    #[doc(hidden)]
    pub fn node_id(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}

enum Target<'a> {
    Local(&'a KlassWithRelations),
    Import(&'a ItemRef),
}

#[cfg(test)]
mod tests {
    use super::*;
    use klass::ItemFactory;

    fn generator() -> MermaidGenerator {
        MermaidGenerator::new(&GeneratorSettings::default())
    }

    fn entity(
        factory: &mut ItemFactory,
        name: &str,
        package: &str,
        imports: Vec<ItemRef>,
        parameters: &[&str],
        inheritances: &[&str],
    ) -> KlassWithRelations {
        let item = factory.create_item_from_string(name, package, None);
        KlassWithRelations {
            item: item.canonical().clone(),
            file_path: format!("{}/{}.kt", package.replace('.', "/"), name),
            file_imports: imports,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            inheritances: inheritances.iter().map(|i| i.to_string()).collect(),
            disabled: false,
        }
    }

    #[test]
    fn test_node_id_replaces_special_chars() {
        assert_eq!(MermaidGenerator::node_id("com.app.Button"), "com_app_Button");
        assert_eq!(MermaidGenerator::node_id("my-pkg/x"), "my_pkg_x");
        assert_eq!(MermaidGenerator::node_id("Plain_Name1"), "Plain_Name1");
    }

    #[test]
    fn test_generate_single_item() {
        let mut factory = ItemFactory::new();
        let button = entity(&mut factory, "Button", "com.app.ui", vec![], &["text: String"], &[]);

        let doc = generator().generate(&[button], &["widgets".to_string()], "../src");

        assert!(doc.starts_with("```mermaid\n---\ntitle: com.app.ui\n---\nclassDiagram\n"));
        assert!(doc.ends_with("```\n"));
        assert!(doc.contains("    %% source: ../src/com/app/ui"));
        assert!(doc.contains("    class com_app_ui_Button[\"Button\"]"));
        assert!(doc.contains("    com_app_ui_Button : text: String"));
        assert!(doc.contains(
            "    click com_app_ui_Button href \"../../../../src/com/app/ui/Button.kt\" \"com/app/ui/Button.kt\""
        ));
        assert!(doc.contains("    class package_com_app_ui_widgets[\"widgets\"]"));
        assert!(doc.contains("    <<package>> package_com_app_ui_widgets"));
        assert!(doc.contains(
            "    click package_com_app_ui_widgets href \"widgets/class_relations.md\" \"widgets\""
        ));
        assert!(!doc.contains("<|--"));
        assert!(!doc.contains("-->"));
    }

    #[test]
    fn test_generate_relations() {
        let mut factory = ItemFactory::new();
        let repository = factory.create_item_from_string("Repository", "com.app.data", None);
        let cache = factory.create_item_from_string("Cache", "com.app.data", Some("LocalCache"));
        let logger = factory.create_item_from_string("Logger", "com.app.log", None);

        let base = entity(&mut factory, "Base", "com.app", vec![], &[], &[]);
        let screen = entity(
            &mut factory,
            "Screen",
            "com.app",
            vec![repository, cache, logger],
            &["repository: Repository", "cache: LocalCache?", "count: Int"],
            &["Base", "Lifecycle"],
        );

        let doc = generator().generate(&[base, screen], &[], "");

        assert!(doc.contains("    com_app_Base <|-- com_app_Screen"));
        assert!(doc.contains("    class Lifecycle[\"Lifecycle\"]"));
        assert!(doc.contains("    Lifecycle <|-- com_app_Screen"));
        assert!(doc.contains("    com_app_Screen --> com_app_data_Repository : repository"));
        assert!(doc.contains("    com_app_Screen --> com_app_data_Cache : cache"));
        assert!(doc.contains("    com_app_Screen ..> com_app_log_Logger"));
        assert!(doc.contains("    class com_app_data_Repository[\"com.app.data.Repository\"]"));
        assert!(!doc.contains("..> com_app_data_Repository"));
        assert!(doc.contains("    com_app_Screen : count: Int"));
        assert!(!doc.contains("--> Int"));
        assert_eq!(doc.matches("class com_app_data_Cache[").count(), 1);
    }

    #[test]
    fn test_alias_imports_label_edges() {
        let mut factory = ItemFactory::new();
        let first = factory.create_item_from_string("Color", "com.theme", Some("ThemeColor"));
        let second = factory.create_item_from_string("Color", "com.theme", Some("Tint"));
        let view = entity(&mut factory, "View", "com.app", vec![first, second], &[], &[]);

        let doc = generator().generate(&[view], &[], "");

        assert!(doc.contains("    com_app_View ..> com_theme_Color : as ThemeColor"));
        assert!(doc.contains("    com_app_View ..> com_theme_Color : as Tint"));
        assert_eq!(doc.matches("class com_theme_Color[").count(), 1);
    }

    #[test]
    fn test_generics_in_members() {
        let mut factory = ItemFactory::new();
        let list = entity(&mut factory, "Holder", "a", vec![], &["items: List<Item>"], &[]);
        let doc = generator().generate(&[list], &[], "");
        assert!(doc.contains("    a_Holder : items: List~Item~"));
    }

    #[test]
    fn test_function_types_in_members() {
        let mut factory = ItemFactory::new();
        let button = entity(
            &mut factory,
            "Button",
            "a",
            vec![],
            &["listener: (Int) -> Unit", "mapper: (List<Int>) -> Map<A, B>"],
            &[],
        );
        let doc = generator().generate(&[button], &[], "");
        assert!(doc.contains("    a_Button : listener: (Int) -> Unit\n"));
        assert!(doc.contains("    a_Button : mapper: (List~Int~) -> Map~A, B~\n"));
    }

    #[test]
    fn test_colliding_node_ids_stay_distinct() {
        let mut factory = ItemFactory::new();
        let nested = factory.create_item_from_string("Bar", "a.Foo", None);
        let local = entity(&mut factory, "Foo_Bar", "a", vec![nested], &["x: Int"], &[]);

        let doc = generator().generate(&[local], &[], "");

        assert!(doc.contains("    class a_Foo_Bar[\"Foo_Bar\"]"));
        assert!(doc.contains("    a_Foo_Bar : x: Int"));
        assert!(doc.contains("    click a_Foo_Bar href"));
        assert!(doc.contains("    class a_Foo_Bar_2[\"a.Foo.Bar\"]"));
        assert!(doc.contains("    a_Foo_Bar ..> a_Foo_Bar_2"));
        assert_eq!(doc.matches("    click ").count(), 1);
    }

    #[test]
    fn test_generate_empty() {
        let package = vec!["com".to_string(), "app".to_string()];
        let doc = generator().generate_empty(&package, &["ui".to_string(), "data".to_string()], "");

        assert!(doc.contains("title: com.app"));
        assert!(doc.contains("    class package_com_app_ui[\"ui\"]"));
        assert!(doc.contains("    class package_com_app_data[\"data\"]"));
        assert!(doc.contains("href \"ui/class_relations.md\""));
        assert!(!doc.contains("<|--"));
        assert_eq!(doc.matches("    class ").count(), 2);
    }

    #[test]
    fn test_plain_output_without_fence() {
        let settings = GeneratorSettings {
            generated_file_name: "diagram.mmd".to_string(),
            ..Default::default()
        };
        let doc = MermaidGenerator::new(&settings).generate_empty(&[], &[], "");
        assert_eq!(doc, "---\ntitle: <root>\n---\nclassDiagram\n");
    }
}
