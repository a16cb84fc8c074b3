/// 可繪製組件
///
/// 渲染層讀取 `visible` 決定是否畫出實體，霧化系統是唯一的寫入者
use serde::{Deserialize, Serialize};
use specs::storage::VecStorage;
use specs::Component;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub visible: bool,
}

impl Default for Drawable {
    fn default() -> Self { Drawable { visible: true } }
}

impl Component for Drawable {
    type Storage = VecStorage<Self>;
}
