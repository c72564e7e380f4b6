//! Node (file or folder) domain entities.

pub mod filter;
pub mod kind;
pub mod model;
pub mod name;

pub use filter::ListFilter;
pub use kind::{FileAttributes, NodeKind, NodeView};
pub use model::{FOLDER_CONTENT_TYPE, MAX_TREE_DEPTH, NewNode, Node};
pub use name::{MAX_NAME_LENGTH, normalize_name};
