//! overlay 的 Vulkan 访问层
//!
//! 本 crate 不创建 device、swapchain 或 command buffer，只描述 overlay 需要从宿主渲染器拿到什么：
//! - [`foundation::context::GfxContext`]：instance / device / queue、GPU 内存分配器以及函数加载器
//! - [`swapchain::swapchain_info::SwapchainInfo`]：swapchain 的 image 数量
//! - [`commands::command_list::CommandList`]：正在录制的 command buffer
//!
//! 以及 GUI 所需的超大 descriptor pool。

pub mod commands;
pub mod descriptors;
pub mod error;
pub mod foundation;
pub mod swapchain;
