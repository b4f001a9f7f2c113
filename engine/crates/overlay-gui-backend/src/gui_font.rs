use ash::vk;
use imgui::TextureId;
use overlay_gfx::error::{GraphicsResourceError, VkResultExt};
use overlay_gfx::foundation::mem_allocator::GfxMemAllocator;
use vk::Handle;
use vk_mem::Alloc;

use crate::memory::{GfxHostBuffer, execute_one_time_commands};

/// 为一张纹理分配 descriptor set 并写入 combined image sampler
pub fn allocate_texture_set(
    device: &ash::Device,
    descriptor_pool: vk::DescriptorPool,
    set_layout: vk::DescriptorSetLayout,
    sampler: vk::Sampler,
    image_view: vk::ImageView,
    image_layout: vk::ImageLayout,
) -> Result<vk::DescriptorSet, GraphicsResourceError> {
    let alloc_info = vk::DescriptorSetAllocateInfo::default()
        .descriptor_pool(descriptor_pool)
        .set_layouts(std::slice::from_ref(&set_layout));
    let descriptor_set =
        unsafe { device.allocate_descriptor_sets(&alloc_info) }.vk_op("vkAllocateDescriptorSets")?[0];

    let image_info = vk::DescriptorImageInfo {
        sampler,
        image_view,
        image_layout,
    };
    let write = vk::WriteDescriptorSet::default()
        .dst_set(descriptor_set)
        .dst_binding(0)
        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
        .image_info(std::slice::from_ref(&image_info));
    unsafe { device.update_descriptor_sets(std::slice::from_ref(&write), &[]) };

    Ok(descriptor_set)
}

/// imgui 的 texture id 就是 descriptor set 的句柄
#[inline]
pub fn texture_id_from_set(descriptor_set: vk::DescriptorSet) -> TextureId {
    TextureId::new(descriptor_set.as_raw() as usize)
}

#[inline]
pub fn set_from_texture_id(texture_id: TextureId) -> vk::DescriptorSet {
    vk::DescriptorSet::from_raw(texture_id.id() as u64)
}

/// imgui 字体图集对应的 GPU 纹理
pub struct GuiFontTexture {
    image: vk::Image,
    allocation: Option<vk_mem::Allocation>,
    image_view: vk::ImageView,
    sampler: vk::Sampler,
    descriptor_set: vk::DescriptorSet,
}

// new & init
impl GuiFontTexture {
    /// 将 RGBA32 的字体图集上传到 GPU，并从 `descriptor_pool` 中分配 descriptor set
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &ash::Device,
        allocator: &GfxMemAllocator,
        queue_family: u32,
        queue: vk::Queue,
        descriptor_pool: vk::DescriptorPool,
        set_layout: vk::DescriptorSetLayout,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, GraphicsResourceError> {
        let mut font = Self {
            image: vk::Image::null(),
            allocation: None,
            image_view: vk::ImageView::null(),
            sampler: vk::Sampler::null(),
            descriptor_set: vk::DescriptorSet::null(),
        };

        let result = font.create_image(device, allocator, width, height).and_then(|_| {
            font.upload_pixels(device, allocator, queue_family, queue, width, height, pixels)?;
            font.descriptor_set = allocate_texture_set(
                device,
                descriptor_pool,
                set_layout,
                font.sampler,
                font.image_view,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            )?;
            Ok(())
        });

        match result {
            Ok(()) => {
                log::info!("uploaded imgui font atlas: {width}x{height}");
                Ok(font)
            }
            Err(e) => {
                font.destroy(device, allocator);
                Err(e)
            }
        }
    }

    fn create_image(
        &mut self,
        device: &ash::Device,
        allocator: &GfxMemAllocator,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsResourceError> {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(vk::Format::R8G8B8A8_UNORM)
            .extent(vk::Extent3D { width, height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        let alloc_ci = vk_mem::AllocationCreateInfo {
            usage: vk_mem::MemoryUsage::AutoPreferDevice,
            ..Default::default()
        };
        let (image, allocation) = unsafe { allocator.create_image(&image_info, &alloc_ci) }
            .vma_op("vmaCreateImage", "imgui font atlas")?;
        self.image = image;
        self.allocation = Some(allocation);

        let view_info = vk::ImageViewCreateInfo::default()
            .image(self.image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(vk::Format::R8G8B8A8_UNORM)
            .subresource_range(color_subresource_range());
        self.image_view = unsafe { device.create_image_view(&view_info, None) }.vk_op("vkCreateImageView")?;

        let sampler_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .min_lod(-1000.0)
            .max_lod(1000.0)
            .max_anisotropy(1.0);
        self.sampler = unsafe { device.create_sampler(&sampler_info, None) }.vk_op("vkCreateSampler")?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn upload_pixels(
        &self,
        device: &ash::Device,
        allocator: &GfxMemAllocator,
        queue_family: u32,
        queue: vk::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), GraphicsResourceError> {
        let mut stage_buffer = GfxHostBuffer::new(
            allocator,
            pixels.len().max(1) as vk::DeviceSize,
            vk::BufferUsageFlags::TRANSFER_SRC,
            "imgui font stage buffer",
        )?;

        let image = self.image;
        let result = stage_buffer.write_slices(allocator, [pixels]).and_then(|_| {
            execute_one_time_commands(device, queue_family, queue, |cmd| unsafe {
                let to_transfer = vk::ImageMemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::empty())
                    .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .old_layout(vk::ImageLayout::UNDEFINED)
                    .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(color_subresource_range());
                device.cmd_pipeline_barrier(
                    cmd,
                    vk::PipelineStageFlags::TOP_OF_PIPE,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    std::slice::from_ref(&to_transfer),
                );

                let region = vk::BufferImageCopy::default()
                    .image_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    })
                    .image_extent(vk::Extent3D { width, height, depth: 1 });
                device.cmd_copy_buffer_to_image(
                    cmd,
                    stage_buffer.vk_buffer(),
                    image,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    std::slice::from_ref(&region),
                );

                let to_shader_read = vk::ImageMemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .dst_access_mask(vk::AccessFlags::SHADER_READ)
                    .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(color_subresource_range());
                device.cmd_pipeline_barrier(
                    cmd,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::PipelineStageFlags::FRAGMENT_SHADER,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    std::slice::from_ref(&to_shader_read),
                );
            })
        });

        stage_buffer.destroy(allocator);
        result
    }
}

// getters
impl GuiFontTexture {
    #[inline]
    pub fn texture_id(&self) -> TextureId {
        texture_id_from_set(self.descriptor_set)
    }
}

// tools
impl GuiFontTexture {
    /// descriptor set 随 pool 一起回收，这里不单独释放
    pub fn destroy(&mut self, device: &ash::Device, allocator: &GfxMemAllocator) {
        unsafe {
            device.destroy_sampler(self.sampler, None);
            device.destroy_image_view(self.image_view, None);
            if let Some(mut allocation) = self.allocation.take() {
                allocator.destroy_image(self.image, &mut allocation);
            }
        }
        self.sampler = vk::Sampler::null();
        self.image_view = vk::ImageView::null();
        self.image = vk::Image::null();
        self.descriptor_set = vk::DescriptorSet::null();
    }
}

fn color_subresource_range() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_id_round_trips_through_descriptor_set() {
        let set = vk::DescriptorSet::from_raw(0xdead_beef);
        let id = texture_id_from_set(set);

        assert_eq!(id.id(), 0xdead_beef);
        assert_eq!(set_from_texture_id(id), set);
    }
}
