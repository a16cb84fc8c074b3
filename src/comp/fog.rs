/// 戰爭迷霧狀態
///
/// 每個關卡實例各自擁有一份，以 ECS resource 傳遞，
/// 不用全域單例；關卡切換時整份重置
use hashbrown::HashMap;
use specs::Entity;
use vek::Vec2;

use super::tile::TileMap;

#[derive(Default)]
pub struct FogOfWar {
    /// 已霧化瓦片 -> 霧化前的原始染色
    ///
    /// 首次霧化時擷取一次，瓦片還在霧中就不再覆寫
    pub darkened: HashMap<Vec2<i32>, u32>,
    /// 目前被隱藏的實體
    pub hidden: Vec<Entity>,
    /// 上次計算視野時觀察者的位置
    pub last_observer_pos: Option<Vec2<f32>>,
}

impl FogOfWar {
    pub fn is_darkened(&self, c: Vec2<i32>) -> bool {
        self.darkened.contains_key(&c)
    }

    /// 還原所有霧化瓦片的染色，回傳待顯示的隱藏實體
    ///
    /// 呼叫端負責把回傳實體的可見旗標設回 true
    pub fn revert(&mut self, map: &mut TileMap) -> Vec<Entity> {
        for (c, orig) in self.darkened.drain() {
            if let Some(tile) = map.at_mut(c) {
                tile.tint = orig;
            }
        }
        std::mem::take(&mut self.hidden)
    }

    /// 清空狀態，不碰地圖（關卡切換後舊地圖已不存在）
    pub fn reset(&mut self) {
        self.darkened.clear();
        self.hidden.clear();
        self.last_observer_pos = None;
    }
}
