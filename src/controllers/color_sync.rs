use esp_println::println;
use ledstrip_core::{ColorUpdate, SharedColorCell};

/// Applies remotely pushed color documents to the cell the render task
/// reads from.
pub struct ColorSyncController {
    cell: &'static SharedColorCell,
}

impl ColorSyncController {
    pub fn new(cell: &'static SharedColorCell) -> Self {
        Self { cell }
    }

    pub(crate) fn apply(&self, update: ColorUpdate) {
        let color = update.color();
        println!("sync: color set to {:08x}", color.bits());
        self.cell.store(color);
    }
}
