// Presentation layer - Projection onto the renderer and user input
pub mod adapter;
pub mod console_renderer;
pub mod range_input;
