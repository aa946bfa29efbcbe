use crate::item::{ItemRef, KlassItem};
use std::rc::Rc;

/// 解析后的源文件：声明的条目及其关系
#[derive(Debug, Clone)]
pub struct KlassWithRelations {
    /// 声明对应的规范条目
    pub item: Rc<KlassItem>,
    /// 相对源码根目录的路径，"/" 分隔
    pub file_path: String,
    /// 通过构造期过滤器的 import，带别名的是 [`ItemRef::Alias`]
    pub file_imports: Vec<ItemRef>,
    /// "name: Type" 形式的构造参数
    pub parameters: Vec<String>,
    /// 父类型原样名称，不含类型参数和调用参数
    pub inheritances: Vec<String>,
    /// 源文件标记为不进入类图
    pub disabled: bool,
}

impl KlassWithRelations {
    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn file_package(&self) -> &[String] {
        &self.item.file_package
    }

    pub fn file_package_string(&self) -> String {
        self.item.file_package_string()
    }

    /// 每个 import 的全限定段：["com", "app", "Button"]
    pub fn import_paths(&self) -> Vec<Vec<String>> {
        self.file_imports
            .iter()
            .map(|import| {
                let mut path = import.file_package().to_vec();
                path.push(import.name().to_string());
                path
            })
            .collect()
    }

    /// 按本文件的 import 解析写出的名称
    pub fn resolve_import(&self, local_name: &str) -> Option<&ItemRef> {
        self.file_imports
            .iter()
            .find(|import| import.local_name() == local_name)
    }

    /// 源码根目录到本文件之间的目录层数
    pub fn directory_depth(&self) -> usize {
        self.file_path.matches('/').count()
    }
}

/// 拆出 "name: Type" 的名称和类型
///
/// 类型去掉泛型参数和可空标记："items: List<Item>?" 得到 ("items", "List")
pub fn split_parameter(parameter: &str) -> Option<(&str, &str)> {
    let (name, ty) = parameter.split_once(':')?;
    let ty = ty.trim();
    let end = ty
        .find(|c: char| c == '<' || c == '?' || c == '(' || c.is_whitespace())
        .unwrap_or(ty.len());
    let ty = &ty[..end];
    let ty = ty.rsplit('.').next().unwrap_or(ty);
    if ty.is_empty() {
        return None;
    }
    Some((name.trim(), ty))
}
