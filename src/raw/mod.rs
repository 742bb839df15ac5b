mod arena;
mod cursor;
mod handle;
mod node;
mod raw_llrb_tree_map;
mod size;

pub(crate) use cursor::Cursor;
pub(crate) use raw_llrb_tree_map::RawLLRBTreeMap;
