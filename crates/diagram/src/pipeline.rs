//! 生成流水线 - 源码树到按包类图

use crate::error::Result;
use crate::mermaid::MermaidGenerator;
use crate::scope::emits_empty_diagram;
use crate::settings::GeneratorSettings;
use crate::walker::{relative_forward_slash, DirectoryNode, SortedFileTreeWalker};
use klass::{ItemFactory, KlassDisabledFiltering, KlassFilterFactory, KlassParser, KlassWithRelations};
use serde::Serialize;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// 一次生成的结果
#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerationReport {
    /// 已写入的类图文件，按遍历顺序
    pub written: Vec<PathBuf>,
    /// 没有生成类图的相对目录
    pub skipped: Vec<String>,
    /// 产出定义的源文件数
    pub parsed_files: usize,
    /// 没有可用声明的源文件
    pub unparsed_files: Vec<String>,
}

/// 单次运行状态，每次目录输出后重置
struct RunState {
    source: PathBuf,
    destination: PathBuf,
    /// 目标根目录到源码根目录，"/" 分隔
    destination_path_from_source: String,
    package_prefix: Vec<String>,
    generator: MermaidGenerator,
    factory: ItemFactory,
    definitions: Vec<KlassWithRelations>,
    report: GenerationReport,
}

/// 遍历源码树，每个包目录写一张类图
pub struct GenerationPipeline<P: KlassParser> {
    settings: GeneratorSettings,
    parser: P,
}

impl<P: KlassParser> GenerationPipeline<P> {
    pub fn new(settings: GeneratorSettings, parser: P) -> Self {
        Self { settings, parser }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// 遍历 `source` 一次，写入 `destination`
    ///
    /// 过滤器在任何读写之前解析，任何 I/O 错误都会中止运行
    pub fn run(&mut self, source: &Path, destination: &Path) -> Result<GenerationReport> {
        self.settings.validate()?;
        let filters = KlassFilterFactory::new().create_filters(&self.settings.filters)?;

        let source = source.canonicalize()?;
        fs::create_dir_all(destination)?;
        let destination = destination.canonicalize()?;
        tracing::info!("Generating diagrams: {} -> {}", source.display(), destination.display());

        let mut factory = ItemFactory::new();
        factory.apply_filters(filters);

        let mut run = RunState {
            destination_path_from_source: relative_forward_slash(&source, &destination),
            source: source.clone(),
            destination,
            package_prefix: self.settings.package_prefix(),
            generator: MermaidGenerator::new(&self.settings),
            factory,
            definitions: Vec::new(),
            report: GenerationReport::default(),
        };

        let left = RefCell::new(Vec::new());
        let mut walker = SortedFileTreeWalker::new(&source, |node: &DirectoryNode| {
            left.borrow_mut().push(node.clone());
        })
        .with_extension(self.parser.extension());

        loop {
            let next = walker.next();

            // `next` 产出之前已完成的目录
            let finished = std::mem::take(&mut *left.borrow_mut());
            for node in &finished {
                self.flush(&mut run, node)?;
            }

            match next {
                Some(file) => self.read_definition(&mut run, &file?)?,
                None => break,
            }
        }

        tracing::info!(
            "Wrote {} diagrams, skipped {} directories",
            run.report.written.len(),
            run.report.skipped.len()
        );
        Ok(run.report)
    }

    fn read_definition(&mut self, run: &mut RunState, file: &Path) -> Result<()> {
        let text = fs::read_to_string(file)?;
        let declared_name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_path = relative_forward_slash(file, &run.source);

        match self.parser.parse(&mut run.factory, &text, &declared_name, &file_path) {
            Some(definition) if definition.item.is_excluded() => {
                tracing::debug!("Filtered out {}", definition.item.qualified_name());
            }
            Some(definition) => {
                run.report.parsed_files += 1;
                run.definitions.push(definition);
            }
            None => {
                tracing::debug!("No declaration found in {}", file_path);
                run.report.unparsed_files.push(file_path);
            }
        }
        Ok(())
    }

    /// 输出已完成目录的类图并重置作用域
    fn flush(&self, run: &mut RunState, node: &DirectoryNode) -> Result<()> {
        let relative = relative_forward_slash(&node.directory, &run.source);
        let child_packages = node.sub_directory_names();
        let items = KlassDisabledFiltering.filter(&run.definitions);

        let document = if items.is_empty() {
            if emits_empty_diagram(&run.package_prefix, &relative) {
                let diagram_package: Vec<String> = relative.split('/').map(str::to_string).collect();
                Some(run.generator.generate_empty(
                    &diagram_package,
                    &child_packages,
                    &run.destination_path_from_source,
                ))
            } else {
                None
            }
        } else {
            Some(run.generator.generate(&items, &child_packages, &run.destination_path_from_source))
        };

        match document {
            Some(document) => {
                let target = Self::target_path(&run.destination, &relative, &self.settings.generated_file_name);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, document)?;
                tracing::info!("Wrote {} ({} items)", target.display(), items.len());
                run.report.written.push(target);
            }
            None => {
                tracing::debug!("Skipping out-of-scope directory '{}'", relative);
                run.report.skipped.push(relative);
            }
        }

        run.definitions.clear();
        run.factory.clear();
        Ok(())
    }

    fn target_path(destination: &Path, relative: &str, file_name: &str) -> PathBuf {
        let mut target = destination.to_path_buf();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            target.push(segment);
        }
        target.push(file_name);
        target
    }
}
