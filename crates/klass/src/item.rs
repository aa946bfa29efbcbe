use std::fmt;
use std::rc::Rc;

/// 源码和配置中的包分隔符
pub const PACKAGE_SEPARATOR: char = '.';

/// 缓存条目的标识
///
/// 由 [`crate::ItemFactory`] 的计数器分配，`clear()` 后计数器不重置，
/// 只有来自同一次缓存的同一条目才相等
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u64);

/// 一个类实体的规范记录
#[derive(Debug)]
pub struct KlassItem {
    pub(crate) id: ItemId,
    pub name: String,
    pub file_package: Vec<String>,
    /// 被构造期过滤器排除
    pub(crate) excluded: bool,
}

impl KlassItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn file_package_string(&self) -> String {
        join_package(&self.file_package)
    }

    /// 全限定名："com.app.ui.Button"
    pub fn qualified_name(&self) -> String {
        if self.file_package.is_empty() {
            self.name.clone()
        } else {
            format!("{}{}{}", self.file_package_string(), PACKAGE_SEPARATOR, self.name)
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }
}

/// 规范条目在 import 处的别名引用
#[derive(Debug)]
pub struct AliasKlassItem {
    pub(crate) id: ItemId,
    pub delegate: Rc<KlassItem>,
    pub code_identifier: String,
}

impl AliasKlassItem {
    pub fn id(&self) -> ItemId {
        self.id
    }
}

/// 条目工厂返回的句柄
#[derive(Debug, Clone)]
pub enum ItemRef {
    Klass(Rc<KlassItem>),
    Alias(Rc<AliasKlassItem>),
}

impl ItemRef {
    pub fn id(&self) -> ItemId {
        match self {
            ItemRef::Klass(item) => item.id,
            ItemRef::Alias(alias) => alias.id,
        }
    }

    /// 规范条目，别名取其委托
    pub fn canonical(&self) -> &Rc<KlassItem> {
        match self {
            ItemRef::Klass(item) => item,
            ItemRef::Alias(alias) => &alias.delegate,
        }
    }

    pub fn name(&self) -> &str {
        &self.canonical().name
    }

    pub fn file_package(&self) -> &[String] {
        &self.canonical().file_package
    }

    pub fn file_package_string(&self) -> String {
        self.canonical().file_package_string()
    }

    pub fn code_identifier(&self) -> Option<&str> {
        match self {
            ItemRef::Klass(_) => None,
            ItemRef::Alias(alias) => Some(&alias.code_identifier),
        }
    }

    /// 源码中引用该条目的名称：有别名用别名，否则用名称
    pub fn local_name(&self) -> &str {
        self.code_identifier().unwrap_or_else(|| self.name())
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, ItemRef::Alias(_))
    }

    pub fn is_excluded(&self) -> bool {
        self.canonical().excluded
    }

    /// 是否同一规范实体，忽略别名
    pub fn same_entity(&self, other: &ItemRef) -> bool {
        self.canonical().id == other.canonical().id
    }
}

impl PartialEq for ItemRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ItemRef {}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Klass(item) => write!(f, "{}", item.qualified_name()),
            ItemRef::Alias(alias) => write!(
                f,
                "{} as {}",
                alias.delegate.qualified_name(),
                alias.code_identifier
            ),
        }
    }
}

/// 把 "a.b.c" 拆成段，空字符串是根包
pub fn split_package(package: &str) -> Vec<String> {
    if package.is_empty() {
        return Vec::new();
    }
    package.split(PACKAGE_SEPARATOR).map(str::to_string).collect()
}

pub fn join_package(segments: &[String]) -> String {
    segments.join(&PACKAGE_SEPARATOR.to_string())
}
