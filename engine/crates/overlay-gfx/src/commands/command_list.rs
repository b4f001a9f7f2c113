use ash::vk;

/// 正在录制的 command buffer
///
/// overlay 假定调用者已经在该 command buffer 上开始了 render pass
pub trait CommandList {
    fn vk_command_buffer(&self) -> vk::CommandBuffer;
}

impl CommandList for vk::CommandBuffer {
    #[inline]
    fn vk_command_buffer(&self) -> vk::CommandBuffer {
        *self
    }
}

/// 由宿主分配的 command buffer，附带调试名称
///
/// 不负责 command buffer 的分配与释放
#[derive(Clone, Debug)]
pub struct GfxCommandBuffer {
    handle: vk::CommandBuffer,
    debug_name: String,
}

// new & init
impl GfxCommandBuffer {
    pub fn from_raw(handle: vk::CommandBuffer, debug_name: impl Into<String>) -> Self {
        Self {
            handle,
            debug_name: debug_name.into(),
        }
    }
}

// getters
impl GfxCommandBuffer {
    #[inline]
    pub fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }

    #[inline]
    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }
}

impl CommandList for GfxCommandBuffer {
    #[inline]
    fn vk_command_buffer(&self) -> vk::CommandBuffer {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn test_wrapped_handle_is_forwarded() {
        let raw = vk::CommandBuffer::from_raw(0x42);
        let cmd = GfxCommandBuffer::from_raw(raw, "overlay-pass");

        assert_eq!(cmd.vk_command_buffer(), raw);
        assert_eq!(raw.vk_command_buffer(), raw);
        assert_eq!(cmd.debug_name(), "overlay-pass");
    }
}
