//! 生成器配置

use crate::error::{DiagramError, Result};
use klass::split_package;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 一次运行中所有类图共享的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorSettings {
    /// 写入目标每个包目录的文件名
    pub generated_file_name: String,
    /// 项目根包，点分隔，例如 "com.app"
    pub project_package_prefix: String,
    /// 构造期过滤器名称，见 `klass::KlassFilterFactory`
    pub filters: Vec<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            generated_file_name: "class_relations.md".to_string(),
            project_package_prefix: String::new(),
            filters: Vec::new(),
        }
    }
}

impl GeneratorSettings {
    /// 读取 JSON 配置文件，缺省的键保持默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 应用 `CLASS_RELATIONS_*` 环境变量覆盖
    pub fn with_env(mut self) -> Self {
        if let Ok(v) = std::env::var("CLASS_RELATIONS_FILE_NAME") {
            if !v.is_empty() {
                self.generated_file_name = v;
            }
        }

        if let Ok(v) = std::env::var("CLASS_RELATIONS_PACKAGE_PREFIX") {
            self.project_package_prefix = v;
        }

        if let Ok(v) = std::env::var("CLASS_RELATIONS_FILTERS") {
            self.filters = v
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.generated_file_name.trim();
        if name.is_empty() {
            return Err(DiagramError::Settings("generatedFileName must not be empty".to_string()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(DiagramError::Settings(format!(
                "generatedFileName must be a plain file name: {}",
                name
            )));
        }
        Ok(())
    }

    /// 项目包前缀拆成段
    pub fn package_prefix(&self) -> Vec<String> {
        split_package(self.project_package_prefix.trim())
    }

    /// Markdown 输出用 mermaid 代码块包裹
    pub fn is_markdown(&self) -> bool {
        self.generated_file_name.ends_with(".md")
    }
}
