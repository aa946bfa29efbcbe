//! 单文件视图 - 一个源文件及其同目录文件

use crate::error::{DiagramError, Result};
use crate::mermaid::MermaidGenerator;
use crate::settings::GeneratorSettings;
use klass::{ItemFactory, KlassFilterFactory, KlassParser, KlassWithRelations};
use std::fs;
use std::path::Path;

/// 解析后的文件、同目录的其他定义以及它们的类图
#[derive(Debug)]
pub struct Inspection {
    pub entity: KlassWithRelations,
    pub adjacent: Vec<KlassWithRelations>,
    pub document: String,
    /// 解析目录后条目存储中已知的包
    pub packages: Vec<String>,
    /// 存储中该文件所在包的条目
    pub package_items: Vec<String>,
}

/// 解析 `file` 及其同目录的源文件
///
/// `file` 本身没有声明时返回 `None`
pub fn inspect_file<P: KlassParser>(
    parser: &mut P,
    settings: &GeneratorSettings,
    file: &Path,
) -> Result<Option<Inspection>> {
    let mut factory = ItemFactory::new();
    factory.apply_filters(KlassFilterFactory::new().create_filters(&settings.filters)?);

    let file = &file.canonicalize()?;
    let directory = file
        .parent()
        .ok_or_else(|| DiagramError::Settings(format!("{} has no parent directory", file.display())))?;

    let entity = match parse_file(parser, &mut factory, file)? {
        Some(entity) => entity,
        None => return Ok(None),
    };

    let mut siblings: Vec<_> = fs::read_dir(directory)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path != file
                && path.extension().is_some_and(|e| e == parser.extension())
        })
        .collect();
    siblings.sort();

    let mut adjacent = Vec::new();
    for sibling in &siblings {
        if let Some(definition) = parse_file(parser, &mut factory, sibling)? {
            if !definition.item.is_excluded() {
                adjacent.push(definition);
            }
        }
    }

    let mut items = adjacent.clone();
    items.push(entity.clone());
    let document = MermaidGenerator::new(settings).generate(&items, &[], "");

    let package = entity.file_package_string();
    let package_items = factory
        .get_items_for_package(&package)
        .iter()
        .map(|item| item.name.clone())
        .collect();

    Ok(Some(Inspection {
        entity,
        adjacent,
        document,
        packages: factory.get_all_packages(),
        package_items,
    }))
}

fn parse_file<P: KlassParser>(
    parser: &mut P,
    factory: &mut ItemFactory,
    file: &Path,
) -> Result<Option<KlassWithRelations>> {
    let text = fs::read_to_string(file)?;
    let declared_name = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(parser.parse(factory, &text, &declared_name, &file_name))
}
