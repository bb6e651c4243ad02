pub mod config;
pub mod error;
pub mod factory;
pub mod item;
pub mod layout;
pub mod registry;
pub mod snapshot;
pub mod tree;
pub mod value;

pub use config::Config;
pub use error::{ParamError, Result};
pub use factory::ParameterFactory;
pub use item::ParameterItem;
pub use layout::{CategoryEntry, ItemEntry, LayoutIndex, TreeLayout};
pub use registry::CategoryRegistry;
pub use snapshot::{render_tree, CategorySnapshot, ItemSnapshot, TreeSnapshot};
pub use tree::{CategoryId, CategoryTree, CategoryView, Level, TraversalOrder};
pub use value::{Deferred, Number, ParamValue, ValueKind, ValueTypeValidator};
