//! 条目规范化存储 - 一个生成作用域内的条目缓存

use crate::filter::KlassFilter;
use crate::item::{join_package, split_package, AliasKlassItem, ItemId, ItemRef, KlassItem};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    name: String,
    package: Vec<String>,
    code_identifier: Option<String>,
}

/// 每个 (name, package) 一个规范 [`KlassItem`]，每个额外的代码标识符一个 [`AliasKlassItem`]
///
/// 不能在并发遍历间共享，流水线持有一个实例，每次目录输出后清空
pub struct ItemFactory {
    cache: HashMap<ItemKey, ItemRef>,
    filters: Vec<Box<dyn KlassFilter>>,
    next_id: u64,
}

impl ItemFactory {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            filters: Vec::new(),
            next_id: 0,
        }
    }

    pub fn create_item(
        &mut self,
        name: &str,
        package_list: &[String],
        code_identifier: Option<&str>,
    ) -> ItemRef {
        let canonical = self.canonical_item(name, package_list);
        let identifier = match code_identifier {
            Some(identifier) => identifier,
            None => return ItemRef::Klass(canonical),
        };

        let key = ItemKey {
            name: name.to_string(),
            package: package_list.to_vec(),
            code_identifier: Some(identifier.to_string()),
        };
        if let Some(existing) = self.cache.get(&key) {
            return existing.clone();
        }
        let alias = ItemRef::Alias(Rc::new(AliasKlassItem {
            id: self.next_id(),
            delegate: canonical,
            code_identifier: identifier.to_string(),
        }));
        self.cache.insert(key, alias.clone());
        alias
    }

    /// 同 [`Self::create_item`]，包名以 "a.b.c" 形式给出
    pub fn create_item_from_string(
        &mut self,
        name: &str,
        package_string: &str,
        code_identifier: Option<&str>,
    ) -> ItemRef {
        let package_list = split_package(package_string);
        self.create_item(name, &package_list, code_identifier)
    }

    fn canonical_item(&mut self, name: &str, package_list: &[String]) -> Rc<KlassItem> {
        let key = ItemKey {
            name: name.to_string(),
            package: package_list.to_vec(),
            code_identifier: None,
        };
        if let Some(ItemRef::Klass(existing)) = self.cache.get(&key) {
            return existing.clone();
        }

        let mut item = KlassItem {
            id: self.next_id(),
            name: name.to_string(),
            file_package: package_list.to_vec(),
            excluded: false,
        };
        item.excluded = self.filters.iter().any(|filter| !filter.accepts(&item));
        if item.excluded {
            tracing::debug!("Item {} rejected by construction filters", item.qualified_name());
        }

        let item = Rc::new(item);
        self.cache.insert(key, ItemRef::Klass(item.clone()));
        item
    }

    fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 注册构造期过滤器
    ///
    /// 之后创建且未通过任一过滤器的条目标记为排除，已缓存的条目保持原状
    pub fn apply_filters(&mut self, filters: Vec<Box<dyn KlassFilter>>) {
        self.filters.extend(filters);
    }

    /// 当前缓存中 "a.b.c" 包下的规范条目，按名称排序
    pub fn get_items_for_package(&self, package_string: &str) -> Vec<Rc<KlassItem>> {
        let package = split_package(package_string);
        let mut items: Vec<_> = self
            .canonical_items()
            .filter(|item| item.file_package == package)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// 所有缓存规范条目的包，去重排序
    pub fn get_all_packages(&self) -> Vec<String> {
        self.canonical_items()
            .map(|item| join_package(&item.file_package))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn canonical_items(&self) -> impl Iterator<Item = &Rc<KlassItem>> {
        self.cache.values().filter_map(|item| match item {
            ItemRef::Klass(item) => Some(item),
            ItemRef::Alias(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// 清空所有规范条目和别名，已注册的过滤器保留
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for ItemFactory {
    fn default() -> Self {
        Self::new()
    }
}
