/// Open Tile Dungeon Backend Library
///
/// 地圖格子模擬的空間感知核心：戰爭迷霧視野與碰撞偵測

pub mod comp;
pub mod config;
pub mod map;
pub mod tick;
pub mod vision;

// Re-export commonly used types
pub use crate::comp::*;
pub use crate::map::MapData;
