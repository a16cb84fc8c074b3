pub mod import_map;

pub use import_map::MapData;
