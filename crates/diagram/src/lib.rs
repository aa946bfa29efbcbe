//! diagram - 按包生成类关系图
//!
//! 对源码树做有序后序遍历，每个包目录一张 Mermaid 类图

mod error;
mod inspect;
mod mermaid;
mod pipeline;
mod scope;
mod settings;
mod walker;

pub use error::{DiagramError, Result};
pub use inspect::{inspect_file, Inspection};
pub use mermaid::MermaidGenerator;
pub use pipeline::{GenerationPipeline, GenerationReport};
pub use scope::{emits_empty_diagram, starts_with_but_not_equal};
pub use settings::GeneratorSettings;
pub use walker::{relative_forward_slash, DirectoryNode, SortedFileTreeWalker};
