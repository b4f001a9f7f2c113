//! imgui 的 Vulkan 渲染后端
//!
//! 参考 imgui-rs-vulkan-renderer 以及 imgui 官方的 imgui_impl_vulkan。
//! 后端只负责将 imgui 的 draw data 录制到外部提供的 command buffer 中，
//! 不负责 render pass 的开始与结束，也不负责提交。

pub mod gui_backend;
pub mod gui_font;
pub mod gui_mesh;
pub mod gui_pass;
pub mod gui_vertex_layout;
pub mod memory;
pub mod vulkan_renderer;
