use ash::vk;
use std::cell::Cell;

/// overlay 需要从 swapchain 获取的信息
///
/// 只用于决定 GUI 后端内部的多帧缓冲数量
pub trait SwapchainInfo {
    fn image_count(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfxSwapchainImageInfo {
    pub image_extent: vk::Extent2D,
    pub image_cnt: usize,
    pub image_format: vk::Format,
}

impl SwapchainInfo for GfxSwapchainImageInfo {
    #[inline]
    fn image_count(&self) -> u32 {
        self.image_cnt as u32
    }
}

/// swapchain 重建之后，宿主可以直接 `set` 新的信息，overlay 持有的 `Rc` 不需要替换
impl SwapchainInfo for Cell<GfxSwapchainImageInfo> {
    #[inline]
    fn image_count(&self) -> u32 {
        self.get().image_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_info(image_cnt: usize) -> GfxSwapchainImageInfo {
        GfxSwapchainImageInfo {
            image_extent: vk::Extent2D { width: 1280, height: 720 },
            image_cnt,
            image_format: vk::Format::B8G8R8A8_UNORM,
        }
    }

    #[test]
    fn test_image_count() {
        assert_eq!(image_info(3).image_count(), 3);
    }

    #[test]
    fn test_cell_reflects_recreated_swapchain() {
        let info = Cell::new(image_info(2));
        assert_eq!(info.image_count(), 2);

        info.set(image_info(4));
        assert_eq!(info.image_count(), 4);
    }
}
