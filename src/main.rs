use failure::Error;
use std::io;
use std::thread;
use std::time::Duration;

use otdb::comp::*;
use otdb::config::CONFIG;
use otdb::map::MapData;

fn read_input() -> String {
    let mut buffer = String::new();

    io::stdin()
        .read_line(&mut buffer)
        .expect("Failed to read input");

    buffer.trim().to_string()
}

fn main() -> std::result::Result<(), Error> {
    log4rs::init_file("log4rs.yml", Default::default()).unwrap();
    let map = MapData::from_file(&CONFIG.MAP)?;
    log::info!("loaded map '{}' ({} rows)", map.Name, map.Rows.len());

    let mut state = State::new(&map)?;
    state.set_view_distance(CONFIG.VIEW_DISTANCE);
    state.create_test_scene();

    let mut clock = Clock::new(Duration::from_secs_f64(1.0 / CONFIG.TPS as f64));
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || loop {
        let msg = read_input();
        tx.send(msg).unwrap();
    });
    loop {
        for msg in rx.try_iter() {
            if let Err(e) = state.handle_command(&msg) {
                log::warn!("command '{}' failed: {}", msg, e);
            }
        }
        state.tick(clock.dt())?;

        // Wait for the next tick.
        clock.tick();
    }
}
