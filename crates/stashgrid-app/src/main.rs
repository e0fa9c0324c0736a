//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    use stashgrid_app::{BoardConfig, FileStorage, InventoryBoard};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    env_logger::init();
    log::info!("Starting Stashgrid");

    let config = match std::env::args().nth(1) {
        Some(path) => match BoardConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        },
        None => BoardConfig::default(),
    };

    let hold = Duration::from_millis(config.start_delay_ms.saturating_add(20));
    let mut board = match config.save_path.clone() {
        Some(path) => {
            log::info!("Saving inventory to {}", path.display());
            InventoryBoard::with_storage(config, Rc::new(FileStorage::new(path)))
        }
        None => InventoryBoard::new(config),
    };
    let Some(script) = demo_script(&board, hold) else {
        log::error!("Board is too small for the demo session");
        std::process::exit(1);
    };

    for outcome in script.run(&mut board, Instant::now()) {
        log::info!("Session result: {:?}", outcome);
    }
    for line in board.inventory().summary() {
        log::info!("{}", line);
    }
}

/// Move the first item to the last cell, then swap the first two cells.
#[cfg(feature = "native")]
fn demo_script(board: &stashgrid_app::InventoryBoard, hold: std::time::Duration) -> Option<stashgrid_app::Script> {
    let last = board.cell_count().checked_sub(1)?;
    Some(
        stashgrid_app::Script::new()
            .drag(board.cell_center(0)?, board.cell_center(last)?, hold)
            .drag(board.cell_center(1)?, board.cell_center(0)?, hold),
    )
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
