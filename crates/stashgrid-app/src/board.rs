//! Inventory grid wired to the drag-and-drop engine.
//!
//! Every cell element is both a draggable (carrying its cell index) and a
//! dropzone. Dropping one cell on another moves or swaps the items in the
//! shared [`Inventory`].

use crate::config::BoardConfig;
use crate::inventory::{Inventory, MoveResult};
use crate::storage::InventoryStorage;
use kurbo::{Point, Rect};
use stashgrid_core::{
    DragController, DragDropContext, DragHandlers, DragKey, DragOptions, DragState, DragSubject, DropHandlers,
    DropOptions, Dropzone, ElementHost, ElementId, MemoryScene, PointerEvent, ReleaseOutcome,
};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Match key shared by every cell.
pub const CELL_ITEM_KIND: &str = "cell-item";

/// A completed move between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardMove {
    pub from: usize,
    pub to: usize,
    pub result: MoveResult,
}

#[derive(Debug)]
struct BoardCell {
    element: ElementId,
    key: DragKey,
    zone: Rc<Dropzone>,
}

/// A headless inventory board: scene, engine context and inventory.
pub struct InventoryBoard {
    config: BoardConfig,
    scene: MemoryScene,
    context: DragDropContext,
    container: ElementId,
    cells: Vec<BoardCell>,
    inventory: Rc<RefCell<Inventory>>,
    moves: Rc<RefCell<Vec<BoardMove>>>,
}

type SharedStorage = Option<Rc<dyn InventoryStorage>>;

impl InventoryBoard {
    /// Lay out the grid described by `config` and mount every cell.
    pub fn new(config: BoardConfig) -> Self {
        Self::build(config, None)
    }

    /// Like [`InventoryBoard::new`], but restores the inventory from `storage`
    /// and saves it after every move. An empty store starts from the
    /// configured items.
    pub fn with_storage(config: BoardConfig, storage: Rc<dyn InventoryStorage>) -> Self {
        Self::build(config, Some(storage))
    }

    fn build(config: BoardConfig, storage: SharedStorage) -> Self {
        let inventory = Rc::new(RefCell::new(Self::initial_inventory(&config, storage.as_deref())));
        let moves = Rc::new(RefCell::new(Vec::new()));
        let mut scene = MemoryScene::new();
        let mut context = DragDropContext::new();

        let size = config.cell_size;
        let container = scene.create_element(Rect::new(
            0.0,
            0.0,
            config.columns as f64 * size,
            config.rows as f64 * size,
        ));

        let mut cells = Vec::with_capacity(config.cell_count());
        for index in 0..config.cell_count() {
            let rect = Self::cell_rect(&config, index);
            let element = match scene.create_child(container, rect) {
                Ok(element) => element,
                Err(err) => {
                    log::error!("Cannot create cell {}: {}", index, err);
                    continue;
                }
            };

            let controller = DragController::new(
                Self::drag_options(&config),
                index,
                Self::drag_handlers(&inventory),
                context.registry().clone(),
            );
            let zone = Rc::new(Dropzone::new(
                DropOptions::new(CELL_ITEM_KIND).with_drop_zone_class(config.drop_zone_class.clone()),
                Self::drop_handlers(index, &inventory, &moves, &storage),
            ));
            zone.bind(controller.bind(element));

            let key = context.mount_draggable(controller);
            context.mount_dropzone(zone.clone());
            cells.push(BoardCell { element, key, zone });
        }

        log::info!(
            "Board ready: {}x{} cells, {} occupied",
            config.columns,
            config.rows,
            inventory.borrow().summary().len()
        );

        Self {
            config,
            scene,
            context,
            container,
            cells,
            inventory,
            moves,
        }
    }

    fn initial_inventory(config: &BoardConfig, storage: Option<&dyn InventoryStorage>) -> Inventory {
        let Some(storage) = storage else {
            return config.inventory();
        };
        match storage.load() {
            Ok(saved) if saved.is_empty() => config.inventory(),
            Ok(saved) => {
                log::info!("Restored {} saved items", saved.len());
                Inventory::from_saved(config.cell_count(), saved).with_titles(config.titles.clone())
            }
            Err(err) => {
                log::warn!("Cannot load saved inventory, using defaults: {}", err);
                config.inventory()
            }
        }
    }

    fn cell_rect(config: &BoardConfig, index: usize) -> Rect {
        let column = (index % config.columns) as f64;
        let row = (index / config.columns) as f64;
        let size = config.cell_size;
        Rect::new(column * size, row * size, (column + 1.0) * size, (row + 1.0) * size)
    }

    fn drag_options(config: &BoardConfig) -> DragOptions {
        DragOptions::new(CELL_ITEM_KIND)
            .with_start_delay(Duration::from_millis(config.start_delay_ms))
            .with_dragging_class(config.dragging_class.clone())
            .with_dragging_clone_class(config.dragging_clone_class.clone())
    }

    fn drag_handlers(inventory: &Rc<RefCell<Inventory>>) -> DragHandlers<usize> {
        let occupied = inventory.clone();
        DragHandlers::new()
            .prevent_when(move |cell| occupied.borrow().item(*cell.item()).is_none())
            .on_failed_drop(|cell| log::info!("Drop of cell {} failed", *cell.item()))
    }

    fn drop_handlers(
        target: usize,
        inventory: &Rc<RefCell<Inventory>>,
        moves: &Rc<RefCell<Vec<BoardMove>>>,
        storage: &SharedStorage,
    ) -> DropHandlers {
        let inventory = inventory.clone();
        let moves = moves.clone();
        let storage = storage.clone();
        DropHandlers::new().on_successful_drop(move |subject: &dyn DragSubject| {
            let Some(source) = subject.downcast_ref::<usize>() else {
                log::warn!("Cell {} received a foreign '{}' draggable", target, subject.kind());
                return;
            };
            let from = *source.item();
            let result = inventory.borrow_mut().move_item(from, target);
            log::info!("Cell {} -> cell {}: {:?}", from, target, result);
            moves.borrow_mut().push(BoardMove { from, to: target, result });

            if result == MoveResult::Unchanged {
                return;
            }
            if let Some(storage) = &storage {
                if let Err(err) = storage.save(&inventory.borrow().saved_items()) {
                    log::warn!("Cannot save inventory: {}", err);
                }
            }
        })
    }

    /// Deliver a pointer event at `now`.
    pub fn handle(&mut self, event: PointerEvent, now: Instant) -> Option<ReleaseOutcome> {
        self.context.handle_pointer_event(event, &mut self.scene, now)
    }

    /// Fire due long-press timers.
    pub fn tick(&mut self, now: Instant) {
        self.context.tick(&mut self.scene, now);
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scene(&self) -> &MemoryScene {
        &self.scene
    }

    pub fn context(&self) -> &DragDropContext {
        &self.context
    }

    pub fn inventory(&self) -> Ref<'_, Inventory> {
        self.inventory.borrow()
    }

    /// Moves performed so far, oldest first.
    pub fn moves(&self) -> Ref<'_, [BoardMove]> {
        Ref::map(self.moves.borrow(), Vec::as_slice)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_element(&self, index: usize) -> Option<ElementId> {
        self.cells.get(index).map(|cell| cell.element)
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Centre of a cell in scene coordinates.
    pub fn cell_center(&self, index: usize) -> Option<Point> {
        (index < self.cells.len()).then(|| Self::cell_rect(&self.config, index).center())
    }

    /// Drag state of the controller mounted on a cell.
    pub fn cell_state(&self, index: usize) -> Option<DragState> {
        self.cells
            .get(index)
            .and_then(|cell| self.context.drag_state(cell.key))
    }

    /// Whether a cell currently shows the hover class.
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.cells
            .get(index)
            .and_then(|cell| cell.zone.element())
            .is_some_and(|element| self.scene.has_class(element, &self.config.drop_zone_class))
    }

    /// Unmount every cell, discarding any drag in progress.
    pub fn teardown(&mut self) {
        for cell in self.cells.drain(..) {
            self.context.unmount_draggable(cell.key, &mut self.scene);
            self.context.unmount_dropzone(&cell.zone);
        }
    }
}

impl std::fmt::Debug for InventoryBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryBoard")
            .field("config", &self.config)
            .field("cells", &self.cells.len())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
