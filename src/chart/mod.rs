pub mod arrow;
pub mod colors;
pub mod drag;
pub mod layout;
pub mod prepare;

pub use arrow::{route, route_all, Arrow, ArrowStyle, PathCommand};
pub use colors::ColorConfig;
pub use drag::{interpret, DragAction, DragContext, DragOutcome};
pub use layout::{apply_patches, layout, shift_work_days, DatePatch, Layout, LayoutConfig};
pub use prepare::prepare;
