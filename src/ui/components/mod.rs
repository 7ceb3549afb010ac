pub mod draw_canvas;
pub mod memory_recap;
pub mod status_bar;
pub mod text_box;
