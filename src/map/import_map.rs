/// 關卡地圖 JSON 匯入
///
/// Rows 由上往下列出每一列，'#' 是牆、'.' 是地板；
/// 轉成 TileMap 時第一列對應最大的 y（世界座標原點在左下角）
use std::fs;
use std::path::Path;

use failure::{err_msg, Error};
use serde::{Deserialize, Serialize};
use vek::Vec2;

use crate::comp::{Tile, TileMap};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MapData {
    pub Name: String,
    pub Rows: Vec<String>,
}

impl MapData {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    /// 轉成瓦片網格，列長不一致或出現未知符號時回傳錯誤
    pub fn to_tilemap(&self) -> Result<TileMap, Error> {
        if self.Rows.is_empty() {
            return Err(err_msg(format!("map '{}' has no rows", self.Name)));
        }
        let width = self.Rows[0].chars().count();
        if width == 0 {
            return Err(err_msg(format!("map '{}' has an empty first row", self.Name)));
        }
        let height = self.Rows.len();
        let tiles = vec![Tile::floor(); width * height];
        let mut map = TileMap::new(width as i32, height as i32, tiles);
        for (ri, row) in self.Rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(err_msg(format!(
                    "map '{}' row {} has length {}, expected {}",
                    self.Name,
                    ri,
                    row.chars().count(),
                    width
                )));
            }
            let y = (height - 1 - ri) as i32;
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::wall(),
                    '.' => Tile::floor(),
                    other => {
                        return Err(err_msg(format!(
                            "map '{}' has unknown glyph '{}' at row {} col {}",
                            self.Name, other, ri, x
                        )))
                    }
                };
                if let Some(t) = map.at_mut(Vec2::new(x as i32, y)) {
                    *t = tile;
                }
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_convert() {
        let data = MapData::from_json(
            r####"{"Name": "cell", "Rows": ["###", "#.#", "###"]}"####,
        )
        .unwrap();
        assert_eq!(data.Name, "cell");
        let map = data.to_tilemap().unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        // 中央是地板，四周是牆
        assert_eq!(map.can_see_through(Vec2::new(1, 1)), Some(true));
        assert_eq!(map.can_see_through(Vec2::new(0, 0)), Some(false));
        assert_eq!(map.can_see_through(Vec2::new(2, 2)), Some(false));
    }

    #[test]
    fn test_first_row_is_top_of_map() {
        let data = MapData {
            Name: "strip".into(),
            Rows: vec!["#.".into(), "..".into()],
        };
        let map = data.to_tilemap().unwrap();
        // Rows[0] 的牆在左上，即世界座標 (0, 1)
        assert_eq!(map.can_see_through(Vec2::new(0, 1)), Some(false));
        assert_eq!(map.can_see_through(Vec2::new(0, 0)), Some(true));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = MapData {
            Name: "bad".into(),
            Rows: vec!["###".into(), "##".into()],
        };
        assert!(data.to_tilemap().is_err());
    }

    #[test]
    fn test_unknown_glyph_rejected() {
        let data = MapData {
            Name: "bad".into(),
            Rows: vec!["#x#".into()],
        };
        assert!(data.to_tilemap().is_err());
    }

    #[test]
    fn test_empty_map_rejected() {
        let data = MapData { Name: "void".into(), Rows: vec![] };
        assert!(data.to_tilemap().is_err());
    }
}
