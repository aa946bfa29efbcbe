//! klass - 类关系模型
//!
//! 规范条目、构造期与禁用过滤器，以及产出 [`KlassWithRelations`] 的源码解析器

mod factory;
mod filter;
mod item;
mod parser;
mod types;

pub use factory::ItemFactory;
pub use filter::{FilterError, KlassDisabledFiltering, KlassFilter, KlassFilterFactory};
pub use item::{join_package, split_package, AliasKlassItem, ItemId, ItemRef, KlassItem, PACKAGE_SEPARATOR};
pub use parser::{KlassParser, KotlinParser, DISABLE_MARKER};
pub use types::{split_parameter, KlassWithRelations};
