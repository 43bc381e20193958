mod color_sync;

pub use color_sync::ColorSyncController;
