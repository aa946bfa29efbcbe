//! 条目过滤器
//!
//! 构造期过滤器由 `name` 或 `name:argument` 形式的配置字符串解析，注册到条目工厂。
//! 禁用过滤单独执行，每张图一次。

use crate::item::{split_package, KlassItem};
use crate::types::KlassWithRelations;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
    #[error("Invalid argument for filter {filter}: {reason}")]
    InvalidArgument { filter: String, reason: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;

/// 条目谓词，条目必须通过所有已注册的过滤器
pub trait KlassFilter {
    fn name(&self) -> &str;

    fn accepts(&self, item: &KlassItem) -> bool;
}

const STDLIB_ROOTS: &[&str] = &["kotlin", "kotlinx", "java", "javax", "android", "androidx"];

/// 排除平台和标准库类型
pub struct StdlibFilter;

impl KlassFilter for StdlibFilter {
    fn name(&self) -> &str {
        "stdlib"
    }

    fn accepts(&self, item: &KlassItem) -> bool {
        match item.file_package.first() {
            Some(root) => !STDLIB_ROOTS.contains(&root.as_str()),
            None => true,
        }
    }
}

/// 排除某个包内的条目，"a.b" 同时匹配 "a.b.c"
pub struct PackageFilter {
    prefix: Vec<String>,
}

impl KlassFilter for PackageFilter {
    fn name(&self) -> &str {
        "exclude-package"
    }

    fn accepts(&self, item: &KlassItem) -> bool {
        !item.file_package.starts_with(&self.prefix)
    }
}

/// 排除简单名匹配 glob 的条目
pub struct NameFilter {
    pattern: glob::Pattern,
}

impl KlassFilter for NameFilter {
    fn name(&self) -> &str {
        "exclude-name"
    }

    fn accepts(&self, item: &KlassItem) -> bool {
        !self.pattern.matches(&item.name)
    }
}

/// 排除没有包声明的条目
pub struct RootPackageFilter;

impl KlassFilter for RootPackageFilter {
    fn name(&self) -> &str {
        "root-package"
    }

    fn accepts(&self, item: &KlassItem) -> bool {
        !item.file_package.is_empty()
    }
}

/// 从配置解析过滤器名称
pub struct KlassFilterFactory;

impl KlassFilterFactory {
    pub fn new() -> Self {
        Self
    }

    /// 每个名称一个过滤器，保持输入顺序，遇到第一个未知名称即失败
    pub fn create_filters(&self, names: &[String]) -> Result<Vec<Box<dyn KlassFilter>>> {
        names.iter().map(|name| self.create_filter(name)).collect()
    }

    fn create_filter(&self, config: &str) -> Result<Box<dyn KlassFilter>> {
        let config = config.trim();
        let (name, argument) = match config.split_once(':') {
            Some((name, argument)) => (name, Some(argument.trim())),
            None => (config, None),
        };

        match (name, argument) {
            ("stdlib", None) => Ok(Box::new(StdlibFilter)),
            ("root-package", None) => Ok(Box::new(RootPackageFilter)),
            ("exclude-package", Some(package)) if !package.is_empty() => Ok(Box::new(PackageFilter {
                prefix: split_package(package),
            })),
            ("exclude-name", Some(pattern)) if !pattern.is_empty() => {
                let pattern = glob::Pattern::new(pattern).map_err(|e| FilterError::InvalidArgument {
                    filter: name.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Box::new(NameFilter { pattern }))
            }
            ("stdlib" | "root-package", Some(_)) => Err(FilterError::InvalidArgument {
                filter: name.to_string(),
                reason: "takes no argument".to_string(),
            }),
            ("exclude-package" | "exclude-name", _) => Err(FilterError::InvalidArgument {
                filter: name.to_string(),
                reason: "argument required".to_string(),
            }),
            _ => Err(FilterError::UnknownFilter(config.to_string())),
        }
    }
}

impl Default for KlassFilterFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// 每张图执行一次，移除源码标记为禁用的实体
///
/// 不修改输入，也不修改条目缓存
pub struct KlassDisabledFiltering;

impl KlassDisabledFiltering {
    pub fn filter(&self, items: &[KlassWithRelations]) -> Vec<KlassWithRelations> {
        items.iter().filter(|item| !item.disabled).cloned().collect()
    }
}
