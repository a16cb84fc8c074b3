/// 遞迴陰影投射 (recursive shadowcasting)
///
/// 以觀察者為中心把四周分成八個對稱象限，每個象限用同一套
/// 掃描邏輯搭配不同的座標轉換；光束被不可穿透的瓦片截斷後，
/// 剩餘的縮窄光束改放進工作堆疊處理，而不是原生遞迴，
/// 堆疊深度因此受半徑上限約束
use hashbrown::HashSet;
use vek::Vec2;

/// 八個象限的 2x2 座標轉換 (xx, xy, yx, yy)
pub const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, -1],
    [0, 1, -1, 0],
    [0, -1, -1, 0],
    [-1, 0, 0, -1],
    [-1, 0, 0, 1],
    [0, -1, 1, 0],
    [0, 1, 1, 0],
    [1, 0, 0, 1],
];

/// 掃描一個象限，把光束內且距離平方小於 radius² 的格子放進 `visible`
///
/// `see_through`: `None` 表示地圖外沒有瓦片，直接跳過且不影響光束；
/// `Some(false)` 表示瓦片擋住視線
pub fn cast_light<F>(
    origin: Vec2<i32>,
    radius: i32,
    octant: [i32; 4],
    see_through: F,
    visible: &mut HashSet<Vec2<i32>>,
) where
    F: Fn(Vec2<i32>) -> Option<bool>,
{
    let [xx, xy, yx, yy] = octant;
    // (起始列, 光束左界, 光束右界)
    let mut pending: Vec<(i32, f32, f32)> = vec![(1, 1.0, 0.0)];

    while let Some((row, mut start, end)) = pending.pop() {
        if start < end {
            // 光束已閉合
            continue;
        }
        let mut new_start = 0.0_f32;
        let mut i = row;
        'rows: while i <= radius {
            let dy = -i;
            let mut blocked = false;
            let mut dx = -i;
            while dx <= 0 {
                let world = Vec2::new(origin.x + dx * xx + dy * xy, origin.y + dx * yx + dy * yy);
                // 這一格左右兩側邊緣的斜率
                let l_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
                let r_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);
                if start < r_slope {
                    // 還沒進入光束
                    dx += 1;
                    continue;
                } else if end > l_slope {
                    // 光束已掃過這一列剩下的格子
                    break;
                }
                if dx * dx + dy * dy < radius * radius {
                    visible.insert(world);
                }
                match see_through(world) {
                    None => {
                        // 地圖邊緣，沒有瓦片
                        dx += 1;
                        continue;
                    }
                    Some(transparent) => {
                        if blocked {
                            if !transparent {
                                // 連續遮擋，繼續縮窄
                                new_start = r_slope;
                                dx += 1;
                                continue;
                            }
                            blocked = false;
                            start = new_start;
                        } else if !transparent && i < radius {
                            // 遮擋開始：下一列縮窄後的子掃描進工作堆疊
                            blocked = true;
                            pending.push((i + 1, start, l_slope));
                            new_start = r_slope;
                        }
                    }
                }
                dx += 1;
            }
            if blocked {
                // 整列在遮擋中結束，這道光束到此為止
                break 'rows;
            }
            i += 1;
        }
    }
}
