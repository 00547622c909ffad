pub mod debug_overlay;
pub mod frame;
pub mod frame_differ;
pub mod motion_analyzer;
pub mod pixel;
pub mod region_grid;
