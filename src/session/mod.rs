pub mod draw_box;
pub mod experiment;
pub mod memory_box;
pub mod navigator;
pub mod screen;
