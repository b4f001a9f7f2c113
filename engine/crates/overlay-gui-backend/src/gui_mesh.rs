use ash::vk;
use overlay_gfx::error::GraphicsResourceError;
use overlay_gfx::foundation::mem_allocator::GfxMemAllocator;

use crate::gui_vertex_layout::{ImGuiVertexLayoutAoS, index_buffer_size};
use crate::memory::{GfxHostBuffer, grown_buffer_size};

/// 一帧 imgui 绘制所需的 vertex buffer 和 index buffer
///
/// 每个 swapchain image 对应一份，buffer 只增不减，
/// 复用时 GPU 必然已经处理完了上一次使用该份数据的帧
#[derive(Default)]
pub struct GuiMesh {
    vertex_buffer: Option<GfxHostBuffer>,
    index_buffer: Option<GfxHostBuffer>,
}

impl GuiMesh {
    /// 将 draw data 中的全部顶点和索引拷贝到 buffer 中，容量不够时重新创建
    pub fn upload(
        &mut self,
        allocator: &GfxMemAllocator,
        draw_data: &imgui::DrawData,
    ) -> Result<(), GraphicsResourceError> {
        let vertex_size = ImGuiVertexLayoutAoS::buffer_size(draw_data.total_vtx_count as usize);
        let index_size = index_buffer_size(draw_data.total_idx_count as usize);

        Self::ensure_capacity(
            &mut self.vertex_buffer,
            allocator,
            vertex_size,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            "imgui vertex buffer",
        )?;
        Self::ensure_capacity(
            &mut self.index_buffer,
            allocator,
            index_size,
            vk::BufferUsageFlags::INDEX_BUFFER,
            "imgui index buffer",
        )?;

        if let Some(vertex_buffer) = &mut self.vertex_buffer {
            vertex_buffer.write_slices(allocator, draw_data.draw_lists().map(|list| list.vtx_buffer()))?;
        }
        if let Some(index_buffer) = &mut self.index_buffer {
            index_buffer.write_slices(allocator, draw_data.draw_lists().map(|list| list.idx_buffer()))?;
        }
        Ok(())
    }

    fn ensure_capacity(
        buffer: &mut Option<GfxHostBuffer>,
        allocator: &GfxMemAllocator,
        required: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        debug_usage: &'static str,
    ) -> Result<(), GraphicsResourceError> {
        let current = buffer.as_ref().map_or(0, GfxHostBuffer::size);
        let Some(new_size) = grown_buffer_size(current, required) else {
            return Ok(());
        };

        if let Some(old) = buffer.take() {
            old.destroy(allocator);
        }
        log::debug!("{debug_usage} grows to {new_size} bytes");
        *buffer = Some(GfxHostBuffer::new(allocator, new_size, usage, debug_usage)?);
        Ok(())
    }

    #[inline]
    pub fn vk_vertex_buffer(&self) -> Option<vk::Buffer> {
        self.vertex_buffer.as_ref().map(GfxHostBuffer::vk_buffer)
    }

    #[inline]
    pub fn vk_index_buffer(&self) -> Option<vk::Buffer> {
        self.index_buffer.as_ref().map(GfxHostBuffer::vk_buffer)
    }

    pub fn destroy(self, allocator: &GfxMemAllocator) {
        if let Some(buffer) = self.vertex_buffer {
            buffer.destroy(allocator);
        }
        if let Some(buffer) = self.index_buffer {
            buffer.destroy(allocator);
        }
    }
}
