use skylane_core::InventoryService;

#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
}
