/// 瓦片網格
///
/// 以網格座標存取瓦片的外觀染色與視線穿透旗標，
/// 霧化系統是唯一會改寫染色的地方
use serde::{Deserialize, Serialize};
use vek::Vec2;

/// 無染色（完全不霧化的原始外觀）
pub const TINT_NONE: u32 = 0xFFFF_FFFF;

/// 單一瓦片
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// 目前顯示的染色 (ARGB)，由渲染層讀取
    pub tint: u32,
    /// 視線是否可穿透（載入時決定，關卡存活期間不變）
    pub see_through: bool,
}

impl Tile {
    pub fn floor() -> Self {
        Tile { tint: TINT_NONE, see_through: true }
    }

    pub fn wall() -> Self {
        Tile { tint: TINT_NONE, see_through: false }
    }
}

/// 整張關卡的瓦片網格，以 ECS resource 形式存在
///
/// 世界座標 1.0 單位對應一格，原點在左下角
#[derive(Clone, Debug, Default)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileMap {
    pub fn new(width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), (width * height) as usize);
        Self { width, height, tiles }
    }

    /// 填滿同一種瓦片的網格，測試場景用
    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        Self::new(width, height, vec![tile; (width * height) as usize])
    }

    pub fn width(&self) -> i32 { self.width }

    pub fn height(&self) -> i32 { self.height }

    /// 世界座標落在哪一格
    pub fn coord_of(pos: Vec2<f32>) -> Vec2<i32> {
        Vec2::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    fn index(&self, c: Vec2<i32>) -> Option<usize> {
        if c.x < 0 || c.y < 0 || c.x >= self.width || c.y >= self.height {
            // 地圖外：回傳 None，呼叫端靜默跳過
            None
        } else {
            Some((c.y * self.width + c.x) as usize)
        }
    }

    pub fn at(&self, c: Vec2<i32>) -> Option<&Tile> {
        self.index(c).map(|i| &self.tiles[i])
    }

    pub fn at_mut(&mut self, c: Vec2<i32>) -> Option<&mut Tile> {
        self.index(c).map(move |i| &mut self.tiles[i])
    }

    pub fn tile_at(&self, pos: Vec2<f32>) -> Option<&Tile> {
        self.at(Self::coord_of(pos))
    }

    pub fn can_see_through(&self, c: Vec2<i32>) -> Option<bool> {
        self.at(c).map(|t| t.see_through)
    }
}
