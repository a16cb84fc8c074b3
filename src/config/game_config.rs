use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GameSetting {
    pub MAP: String,
    pub TPS: u64,
    pub VIEW_DISTANCE: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Setting {
    game: GameSetting,
}

impl Default for GameSetting {
    fn default() -> Self {
        let file_path = "game.toml";
        let mut file = match File::open(file_path) {
            Ok(f) => f,
            Err(e) => panic!("no such file {} exception:{}", file_path, e),
        };
        let mut str_val = String::new();
        match file.read_to_string(&mut str_val) {
            Ok(s) => s,
            Err(e) => panic!("Error Reading ApplicationConfig: {}", e),
        };
        let setting: Setting = toml::from_str(&str_val).unwrap();
        setting.game
    }
}

lazy_static! {
    pub static ref CONFIG: GameSetting = GameSetting::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting() {
        let setting: Setting = toml::from_str(
            r#"
            [game]
            MAP = "maps/demo.json"
            TPS = 10
            VIEW_DISTANCE = 7
            "#,
        )
        .unwrap();
        assert_eq!(setting.game.TPS, 10);
        assert_eq!(setting.game.VIEW_DISTANCE, 7);
        assert_eq!(setting.game.MAP, "maps/demo.json");
    }
}
