pub mod canvas_renderer;
