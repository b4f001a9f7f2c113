use std::ops::Deref;

use ash::vk;

use crate::error::{GraphicsResourceError, VkResultExt};

/// overlay 的 GPU 内存分配器，对 vma 的简单包装
///
/// vma 创建时需要引用 instance 和 device，
/// 宿主必须保证在分配器（以及从它分配出的资源）销毁之前，这两个对象一直有效
pub struct GfxMemAllocator {
    inner: vk_mem::Allocator,
}

impl GfxMemAllocator {
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: &ash::Device,
        api_version: u32,
    ) -> Result<Self, GraphicsResourceError> {
        let mut vma_ci = vk_mem::AllocatorCreateInfo::new(instance, device, physical_device);
        vma_ci.vulkan_api_version = api_version;

        let inner = unsafe { vk_mem::Allocator::new(vma_ci) }.vk_op("vmaCreateAllocator")?;
        Ok(Self { inner })
    }
}

impl Deref for GfxMemAllocator {
    type Target = vk_mem::Allocator;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
