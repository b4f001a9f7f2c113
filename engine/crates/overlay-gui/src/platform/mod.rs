pub mod input_backend;
pub mod input_event;
pub mod window;
pub mod winit_event_adapter;
