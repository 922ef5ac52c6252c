pub mod detail_overlay;
pub mod gallery;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use detail_overlay::{DetailOverlay, DetailOverlayProps};
pub use gallery::{GalleryView, GalleryViewProps, handle_search_keys};
