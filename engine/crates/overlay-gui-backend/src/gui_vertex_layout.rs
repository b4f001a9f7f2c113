use ash::vk;
use std::mem::offset_of;

/// imgui 的顶点布局：AoS，直接使用 `imgui::DrawVert`
///
/// color 是 R8G8B8A8，在 shader 中按 unorm 读取
pub struct ImGuiVertexLayoutAoS;

impl ImGuiVertexLayoutAoS {
    pub fn vertex_input_bindings() -> Vec<vk::VertexInputBindingDescription> {
        vec![vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<imgui::DrawVert>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    pub fn vertex_input_attributes() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(imgui::DrawVert, pos) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 1,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(imgui::DrawVert, uv) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 2,
                format: vk::Format::R8G8B8A8_UNORM,
                offset: offset_of!(imgui::DrawVert, col) as u32,
            },
        ]
    }

    #[inline]
    pub fn buffer_size(vertex_cnt: usize) -> vk::DeviceSize {
        (vertex_cnt * size_of::<imgui::DrawVert>()) as vk::DeviceSize
    }
}

/// imgui 使用 16 位索引
pub const GUI_INDEX_TYPE: vk::IndexType = if size_of::<imgui::DrawIdx>() == 2 {
    vk::IndexType::UINT16
} else {
    vk::IndexType::UINT32
};

#[inline]
pub fn index_buffer_size(index_cnt: usize) -> vk::DeviceSize {
    (index_cnt * size_of::<imgui::DrawIdx>()) as vk::DeviceSize
}
