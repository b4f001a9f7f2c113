use ash::vk;
use overlay_gfx::error::{GraphicsResourceError, VkResultExt};
use overlay_gfx::foundation::mem_allocator::GfxMemAllocator;
use vk_mem::Alloc;

/// CPU 可写的 buffer，每帧由 CPU 直接写入
///
/// 创建后一直保持 map 状态，直到 destroy
pub struct GfxHostBuffer {
    buffer: vk::Buffer,
    allocation: vk_mem::Allocation,
    mapped_ptr: *mut u8,
    size: vk::DeviceSize,
}

// new & init
impl GfxHostBuffer {
    pub fn new(
        allocator: &GfxMemAllocator,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        debug_usage: &'static str,
    ) -> Result<Self, GraphicsResourceError> {
        let buffer_ci = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let alloc_ci = vk_mem::AllocationCreateInfo {
            usage: vk_mem::MemoryUsage::AutoPreferDevice,
            flags: vk_mem::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE,
            ..Default::default()
        };

        let (buffer, mut allocation) =
            unsafe { allocator.create_buffer(&buffer_ci, &alloc_ci) }.vma_op("vmaCreateBuffer", debug_usage)?;

        let mapped_ptr = match unsafe { allocator.map_memory(&mut allocation) }.vk_op("vmaMapMemory") {
            Ok(ptr) => ptr,
            Err(e) => {
                unsafe { allocator.destroy_buffer(buffer, &mut allocation) };
                return Err(e);
            }
        };

        Ok(Self {
            buffer,
            allocation,
            mapped_ptr,
            size,
        })
    }
}

// getters
impl GfxHostBuffer {
    #[inline]
    pub fn vk_buffer(&self) -> vk::Buffer {
        self.buffer
    }

    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

// tools
impl GfxHostBuffer {
    /// 将若干段数据依次拷贝到 buffer 的开头，超出容量的部分会被截断
    pub fn write_slices<'a, T: Copy + 'a>(
        &mut self,
        allocator: &GfxMemAllocator,
        slices: impl IntoIterator<Item = &'a [T]>,
    ) -> Result<(), GraphicsResourceError> {
        let mapped = self.mapped_ptr as *mut T;
        let capacity = self.size as usize / size_of::<T>().max(1);

        let mut offset = 0;
        for slice in slices {
            let count = slice.len().min(capacity - offset);
            unsafe { std::ptr::copy_nonoverlapping(slice.as_ptr(), mapped.add(offset), count) };
            offset += count;
        }

        // memory 不一定是 coherent 的
        let written = (offset * size_of::<T>()) as vk::DeviceSize;
        allocator.flush_allocation(&self.allocation, 0, written).vk_op("vmaFlushAllocation")
    }

    pub fn destroy(mut self, allocator: &GfxMemAllocator) {
        unsafe {
            allocator.unmap_memory(&mut self.allocation);
            allocator.destroy_buffer(self.buffer, &mut self.allocation);
        }
    }
}

/// 在一个临时的 command pool 上录制并提交一次性的命令，然后等待队列空闲
pub fn execute_one_time_commands(
    device: &ash::Device,
    queue_family: u32,
    queue: vk::Queue,
    record: impl FnOnce(vk::CommandBuffer),
) -> Result<(), GraphicsResourceError> {
    let pool_info = vk::CommandPoolCreateInfo::default()
        .flags(vk::CommandPoolCreateFlags::TRANSIENT)
        .queue_family_index(queue_family);
    let command_pool = unsafe { device.create_command_pool(&pool_info, None) }.vk_op("vkCreateCommandPool")?;

    let result = (|| {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer =
            unsafe { device.allocate_command_buffers(&alloc_info) }.vk_op("vkAllocateCommandBuffers")?[0];

        let begin_info =
            vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { device.begin_command_buffer(command_buffer, &begin_info) }.vk_op("vkBeginCommandBuffer")?;
        record(command_buffer);
        unsafe { device.end_command_buffer(command_buffer) }.vk_op("vkEndCommandBuffer")?;

        let submit_info = vk::SubmitInfo::default().command_buffers(std::slice::from_ref(&command_buffer));
        unsafe {
            device
                .queue_submit(queue, std::slice::from_ref(&submit_info), vk::Fence::null())
                .vk_op("vkQueueSubmit")?;
            device.queue_wait_idle(queue).vk_op("vkQueueWaitIdle")
        }
    })();

    // command buffer 随 pool 一起释放
    unsafe { device.destroy_command_pool(command_pool, None) };
    result
}

/// 当前容量不够时，计算新的 buffer 大小；够用时返回 `None`
///
/// 按 2 的幂增长，最小 64 KiB
pub fn grown_buffer_size(current: vk::DeviceSize, required: vk::DeviceSize) -> Option<vk::DeviceSize> {
    const MIN_BUFFER_SIZE: vk::DeviceSize = 64 * 1024;

    if required <= current {
        return None;
    }
    Some(required.max(MIN_BUFFER_SIZE).next_power_of_two())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grown_buffer_size() {
        assert_eq!(grown_buffer_size(0, 0), None);
        assert_eq!(grown_buffer_size(0, 100), Some(64 * 1024));
        assert_eq!(grown_buffer_size(64 * 1024, 64 * 1024), None);
        assert_eq!(grown_buffer_size(64 * 1024, 64 * 1024 + 1), Some(128 * 1024));
    }

    proptest! {
        #[test]
        fn prop_grown_size_fits_request(current in 0u64..(1 << 30), required in 1u64..(1 << 30)) {
            match grown_buffer_size(current, required) {
                Some(size) => {
                    prop_assert!(size >= required);
                    prop_assert!(size.is_power_of_two());
                }
                None => prop_assert!(required <= current),
            }
        }
    }
}
