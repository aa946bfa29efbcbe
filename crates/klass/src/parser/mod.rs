mod kotlin;

pub use kotlin::KotlinParser;

use crate::factory::ItemFactory;
use crate::types::KlassWithRelations;

/// 让文件不进入生成类图的标记注释
pub const DISABLE_MARKER: &str = "class-relations:disable";

/// 源码语言解析器 trait
pub trait KlassParser {
    /// 处理的文件扩展名，不含点
    fn extension(&self) -> &str;

    /// 解析一个源文件的声明实体
    ///
    /// 条目通过 `factory` 创建，与同一作用域共享标识。文件没有类声明时返回 `None`
    fn parse(
        &mut self,
        factory: &mut ItemFactory,
        text: &str,
        declared_name: &str,
        file_path: &str,
    ) -> Option<KlassWithRelations>;
}
