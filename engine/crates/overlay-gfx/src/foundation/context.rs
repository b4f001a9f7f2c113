use ash::vk;
use std::ffi::CStr;
use std::rc::Rc;

use crate::error::{GraphicsResourceError, VkResultExt};
use crate::foundation::mem_allocator::GfxMemAllocator;

/// overlay 从宿主渲染器获取 Vulkan 对象的接口
///
/// overlay 只借用这些对象，不负责它们的创建与销毁。
/// descriptor pool 的创建也通过该接口完成，这样 overlay 本身不需要持有 `ash::Device`。
pub trait GfxContext {
    fn vk_instance(&self) -> vk::Instance;
    fn vk_physical_device(&self) -> vk::PhysicalDevice;
    fn vk_device(&self) -> vk::Device;

    fn graphics_queue(&self) -> vk::Queue;
    fn graphics_queue_family_index(&self) -> u32;

    /// instance 创建时使用的 API 版本
    fn vk_api_version(&self) -> u32;

    /// GUI 的 mesh、字体纹理等 GPU 资源都从这里分配；没有分配器时返回 `None`
    fn allocator(&self) -> Option<Rc<GfxMemAllocator>>;

    /// device 级别的函数加载器，按名字查找函数指针
    fn load_function(&self, name: &CStr) -> vk::PFN_vkVoidFunction;

    fn create_descriptor_pool(
        &self,
        create_info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> Result<vk::DescriptorPool, GraphicsResourceError>;

    fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool);
}

/// 基于 ash 的 [`GfxContext`] 实现
///
/// 包装宿主已经创建好的 instance 和 device，不负责销毁它们。
pub struct AshGfxContext {
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,

    graphics_queue: vk::Queue,
    graphics_queue_family_index: u32,

    api_version: u32,

    allocator: Rc<GfxMemAllocator>,
}

// new & init
impl AshGfxContext {
    /// # param
    /// * graphics_queue_family_index - 图形队列所在的 queue family，使用该 family 的第 0 个队列
    /// * api_version - 创建 instance 时的 `vk::ApplicationInfo::api_version`
    pub fn new(
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        graphics_queue_family_index: u32,
        api_version: u32,
    ) -> Result<Self, GraphicsResourceError> {
        let graphics_queue = unsafe { device.get_device_queue(graphics_queue_family_index, 0) };
        let allocator = Rc::new(GfxMemAllocator::new(&instance, physical_device, &device, api_version)?);

        log::info!(
            "overlay gfx context: queue family {}, api version {}.{}.{}",
            graphics_queue_family_index,
            vk::api_version_major(api_version),
            vk::api_version_minor(api_version),
            vk::api_version_patch(api_version),
        );

        Ok(Self {
            instance,
            physical_device,
            device,
            graphics_queue,
            graphics_queue_family_index,
            api_version,
            allocator,
        })
    }
}

// getters
impl AshGfxContext {
    #[inline]
    pub fn ash_instance(&self) -> &ash::Instance {
        &self.instance
    }

    #[inline]
    pub fn ash_device(&self) -> &ash::Device {
        &self.device
    }
}

impl GfxContext for AshGfxContext {
    #[inline]
    fn vk_instance(&self) -> vk::Instance {
        self.instance.handle()
    }
    #[inline]
    fn vk_physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }
    #[inline]
    fn vk_device(&self) -> vk::Device {
        self.device.handle()
    }
    #[inline]
    fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }
    #[inline]
    fn graphics_queue_family_index(&self) -> u32 {
        self.graphics_queue_family_index
    }
    #[inline]
    fn vk_api_version(&self) -> u32 {
        self.api_version
    }
    #[inline]
    fn allocator(&self) -> Option<Rc<GfxMemAllocator>> {
        Some(self.allocator.clone())
    }

    fn load_function(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe { self.instance.get_device_proc_addr(self.device.handle(), name.as_ptr()) }
    }

    fn create_descriptor_pool(
        &self,
        create_info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> Result<vk::DescriptorPool, GraphicsResourceError> {
        unsafe { self.device.create_descriptor_pool(create_info, None) }.vk_op("vkCreateDescriptorPool")
    }

    fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool) {
        unsafe { self.device.destroy_descriptor_pool(pool, None) }
    }
}
