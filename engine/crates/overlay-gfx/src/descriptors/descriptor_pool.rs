use ash::vk;

use crate::error::GraphicsResourceError;
use crate::foundation::context::GfxContext;

/// GUI descriptor pool 中包含的 11 种标准 descriptor 类型
pub const GUI_DESCRIPTOR_TYPES: [vk::DescriptorType; 11] = [
    vk::DescriptorType::SAMPLER,
    vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
    vk::DescriptorType::SAMPLED_IMAGE,
    vk::DescriptorType::STORAGE_IMAGE,
    vk::DescriptorType::UNIFORM_TEXEL_BUFFER,
    vk::DescriptorType::STORAGE_TEXEL_BUFFER,
    vk::DescriptorType::UNIFORM_BUFFER,
    vk::DescriptorType::STORAGE_BUFFER,
    vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
    vk::DescriptorType::STORAGE_BUFFER_DYNAMIC,
    vk::DescriptorType::INPUT_ATTACHMENT,
];

/// GUI 使用的超大 descriptor pool 的描述
///
/// 每种类型的数量相同，pool 允许单独释放 descriptor set（用户纹理需要）。
/// 1000 这个数字来自 imgui 官方的示例代码，并不是调优的结果，因此做成可配置的。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiDescriptorPoolDesc {
    pub descriptors_per_type: u32,
}

impl Default for GuiDescriptorPoolDesc {
    fn default() -> Self {
        Self {
            descriptors_per_type: Self::DEFAULT_DESCRIPTORS_PER_TYPE,
        }
    }
}

// new & init
impl GuiDescriptorPoolDesc {
    pub const DEFAULT_DESCRIPTORS_PER_TYPE: u32 = 1000;

    pub fn new(descriptors_per_type: u32) -> Self {
        Self { descriptors_per_type }
    }
}

// getters
impl GuiDescriptorPoolDesc {
    /// Vulkan 要求 descriptor_count 和 max_sets 都大于 0，因此最少为 1
    #[inline]
    fn per_type(&self) -> u32 {
        self.descriptors_per_type.max(1)
    }

    pub fn pool_sizes(&self) -> [vk::DescriptorPoolSize; GUI_DESCRIPTOR_TYPES.len()] {
        GUI_DESCRIPTOR_TYPES.map(|ty| vk::DescriptorPoolSize {
            ty,
            descriptor_count: self.per_type(),
        })
    }

    #[inline]
    pub fn max_sets(&self) -> u32 {
        self.per_type().saturating_mul(GUI_DESCRIPTOR_TYPES.len() as u32)
    }
}

// tools
impl GuiDescriptorPoolDesc {
    pub fn create(&self, gfx_context: &dyn GfxContext) -> Result<vk::DescriptorPool, GraphicsResourceError> {
        let pool_sizes = self.pool_sizes();
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(self.max_sets())
            .pool_sizes(&pool_sizes);

        let pool = gfx_context.create_descriptor_pool(&create_info)?;
        log::info!(
            "created gui descriptor pool: {} descriptors per type, {} sets",
            self.per_type(),
            self.max_sets()
        );
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;
    use proptest::prelude::*;
    use crate::foundation::mem_allocator::GfxMemAllocator;
    use std::cell::RefCell;
    use std::ffi::CStr;
    use std::rc::Rc;

    /// 记录 descriptor pool 创建参数的假 context
    #[derive(Default)]
    struct RecordingContext {
        created: RefCell<Vec<(vk::DescriptorPoolCreateFlags, u32, Vec<vk::DescriptorPoolSize>)>>,
    }

    impl GfxContext for RecordingContext {
        fn vk_instance(&self) -> vk::Instance {
            vk::Instance::null()
        }
        fn vk_physical_device(&self) -> vk::PhysicalDevice {
            vk::PhysicalDevice::null()
        }
        fn vk_device(&self) -> vk::Device {
            vk::Device::null()
        }
        fn graphics_queue(&self) -> vk::Queue {
            vk::Queue::null()
        }
        fn graphics_queue_family_index(&self) -> u32 {
            0
        }
        fn vk_api_version(&self) -> u32 {
            vk::API_VERSION_1_2
        }
        fn allocator(&self) -> Option<Rc<GfxMemAllocator>> {
            None
        }
        fn load_function(&self, _name: &CStr) -> vk::PFN_vkVoidFunction {
            None
        }
        fn create_descriptor_pool(
            &self,
            create_info: &vk::DescriptorPoolCreateInfo<'_>,
        ) -> Result<vk::DescriptorPool, GraphicsResourceError> {
            let sizes = unsafe {
                std::slice::from_raw_parts(create_info.p_pool_sizes, create_info.pool_size_count as usize)
            };
            self.created.borrow_mut().push((create_info.flags, create_info.max_sets, sizes.to_vec()));
            Ok(vk::DescriptorPool::from_raw(7))
        }
        fn destroy_descriptor_pool(&self, _pool: vk::DescriptorPool) {}
    }

    #[test]
    fn test_default_pool_matches_imgui_example() {
        let desc = GuiDescriptorPoolDesc::default();
        let sizes = desc.pool_sizes();

        assert_eq!(sizes.len(), 11);
        assert!(sizes.iter().all(|size| size.descriptor_count == 1000));
        assert_eq!(desc.max_sets(), 11_000);
    }

    #[test]
    fn test_every_descriptor_type_appears_once() {
        let sizes = GuiDescriptorPoolDesc::default().pool_sizes();
        for ty in GUI_DESCRIPTOR_TYPES {
            assert_eq!(sizes.iter().filter(|size| size.ty == ty).count(), 1);
        }
    }

    #[test]
    fn test_zero_per_type_is_clamped() {
        let desc = GuiDescriptorPoolDesc::new(0);
        assert!(desc.pool_sizes().iter().all(|size| size.descriptor_count == 1));
        assert_eq!(desc.max_sets(), 11);
    }

    #[test]
    fn test_create_passes_freeable_flag() {
        let ctx = RecordingContext::default();
        let pool = GuiDescriptorPoolDesc::new(16).create(&ctx).unwrap();

        assert_eq!(pool.as_raw(), 7);
        let created = ctx.created.borrow();
        assert_eq!(created.len(), 1);
        let (flags, max_sets, sizes) = &created[0];
        assert!(flags.contains(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET));
        assert_eq!(*max_sets, 16 * 11);
        assert_eq!(sizes.len(), 11);
    }

    proptest! {
        #[test]
        fn prop_max_sets_covers_every_type(per_type in 1u32..100_000) {
            let desc = GuiDescriptorPoolDesc::new(per_type);
            let total: u64 = desc.pool_sizes().iter().map(|size| size.descriptor_count as u64).sum();
            prop_assert_eq!(total, desc.max_sets() as u64);
        }
    }
}
