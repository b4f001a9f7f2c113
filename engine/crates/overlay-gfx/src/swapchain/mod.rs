pub mod swapchain_info;
