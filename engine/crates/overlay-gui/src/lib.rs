//! 调试 overlay：将 imgui 的控件调用转发给 imgui，并将生成的 draw data 录制到宿主的 command buffer 中
//!
//! 典型的一帧：
//! ```ignore
//! gui.prepare_for_next_frame();
//! gui.begin_panel("stats", 0.0, 0.0, 0.3, 0.2);
//! gui.text("hello");
//! gui.end_panel();
//! // 宿主开始 render pass
//! gui.draw(&cmd)?;
//! // 宿主结束 render pass
//! ```

pub mod config;
pub mod error;
pub mod gui_adapter;
pub mod platform;
pub mod timer;

#[cfg(test)]
mod test_support;

pub use config::OverlayConfig;
pub use error::OverlayError;
pub use gui_adapter::OverlayGuiAdapter;
