use ash::vk;
use itertools::Itertools;
use overlay_gfx::error::{GraphicsResourceError, VkResultExt};
use std::path::Path;

use crate::gui_backend::GuiBackendInitInfo;
use crate::gui_vertex_layout::ImGuiVertexLayoutAoS;

/// vertex shader 中的 push constant，将 imgui 的屏幕坐标变换到 NDC
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GuiPushConstant {
    pub scale: [f32; 2],
    pub translate: [f32; 2],
}

impl GuiPushConstant {
    pub fn new(display_pos: [f32; 2], display_size: [f32; 2]) -> Self {
        let scale = [2.0 / display_size[0], 2.0 / display_size[1]];
        Self {
            scale,
            translate: [-1.0 - display_pos[0] * scale[0], -1.0 - display_pos[1] * scale[1]],
        }
    }
}

/// 将 imgui 的 clip rect 转换为 framebuffer 上的 scissor
///
/// 裁剪到 framebuffer 范围内，完全不可见时返回 `None`
pub fn clip_rect_to_scissor(
    clip_rect: [f32; 4],
    clip_offset: [f32; 2],
    clip_scale: [f32; 2],
    framebuffer_size: [f32; 2],
) -> Option<vk::Rect2D> {
    let min_x = ((clip_rect[0] - clip_offset[0]) * clip_scale[0]).max(0.0);
    let min_y = ((clip_rect[1] - clip_offset[1]) * clip_scale[1]).max(0.0);
    let max_x = ((clip_rect[2] - clip_offset[0]) * clip_scale[0]).min(framebuffer_size[0]);
    let max_y = ((clip_rect[3] - clip_offset[1]) * clip_scale[1]).min(framebuffer_size[1]);

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    Some(vk::Rect2D {
        offset: vk::Offset2D {
            x: min_x as i32,
            y: min_y as i32,
        },
        extent: vk::Extent2D {
            width: (max_x - min_x) as u32,
            height: (max_y - min_y) as u32,
        },
    })
}

/// imgui 的绘制 pipeline
///
/// set 0 binding 0 是 combined image sampler，每个 texture 对应一个 descriptor set
pub struct GuiPass {
    descriptor_set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
}

// new & init
impl GuiPass {
    pub fn new(device: &ash::Device, init_info: &GuiBackendInitInfo<'_>) -> Result<Self, GraphicsResourceError> {
        let binding = vk::DescriptorSetLayoutBinding::default()
            .binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT);
        let set_layout_info =
            vk::DescriptorSetLayoutCreateInfo::default().bindings(std::slice::from_ref(&binding));
        let descriptor_set_layout = unsafe { device.create_descriptor_set_layout(&set_layout_info, None) }
            .vk_op("vkCreateDescriptorSetLayout")?;

        let mut pass = Self {
            descriptor_set_layout,
            pipeline_layout: vk::PipelineLayout::null(),
            pipeline: vk::Pipeline::null(),
        };

        // 中途失败时需要销毁已经创建的对象
        if let Err(e) = pass.create_pipeline(device, init_info) {
            pass.destroy(device);
            return Err(e);
        }
        Ok(pass)
    }

    fn create_pipeline(
        &mut self,
        device: &ash::Device,
        init_info: &GuiBackendInitInfo<'_>,
    ) -> Result<(), GraphicsResourceError> {
        let push_constant_range = vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size: size_of::<GuiPushConstant>() as u32,
        };
        let layout_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(std::slice::from_ref(&self.descriptor_set_layout))
            .push_constant_ranges(std::slice::from_ref(&push_constant_range));
        self.pipeline_layout =
            unsafe { device.create_pipeline_layout(&layout_info, None) }.vk_op("vkCreatePipelineLayout")?;

        let vertex_module = create_shader_module(device, &init_info.shaders.vertex)?;
        let fragment_module = match create_shader_module(device, &init_info.shaders.fragment) {
            Ok(module) => module,
            Err(e) => {
                unsafe { device.destroy_shader_module(vertex_module, None) };
                return Err(e);
            }
        };

        let shader_stages = [
            (vk::ShaderStageFlags::VERTEX, vertex_module),
            (vk::ShaderStageFlags::FRAGMENT, fragment_module),
        ]
        .into_iter()
        .map(|(stage, module)| {
            vk::PipelineShaderStageCreateInfo::default()
                .stage(stage)
                .module(module)
                .name(c"main")
        })
        .collect_vec();

        let vertex_bindings = ImGuiVertexLayoutAoS::vertex_input_bindings();
        let vertex_attributes = ImGuiVertexLayoutAoS::vertex_input_attributes();
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state =
            vk::PipelineInputAssemblyStateCreateInfo::default().topology(vk::PrimitiveTopology::TRIANGLE_LIST);

        // viewport 和 scissor 都是动态的，只需要声明数量
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .line_width(1.0);

        let multisample_state =
            vk::PipelineMultisampleStateCreateInfo::default().rasterization_samples(init_info.msaa_samples);

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(true)
            .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
            .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(vk::BlendFactor::ONE)
            .dst_alpha_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
            .alpha_blend_op(vk::BlendOp::ADD);
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .attachments(std::slice::from_ref(&color_blend_attachment));

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(false)
            .depth_write_enable(false);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .depth_stencil_state(&depth_stencil_state)
            .dynamic_state(&dynamic_state)
            .layout(self.pipeline_layout)
            .render_pass(init_info.render_pass)
            .subpass(init_info.subpass);

        let pipeline_result = unsafe {
            device.create_graphics_pipelines(
                init_info.pipeline_cache,
                std::slice::from_ref(&pipeline_info),
                None,
            )
        };

        unsafe {
            device.destroy_shader_module(vertex_module, None);
            device.destroy_shader_module(fragment_module, None);
        }

        let pipelines = pipeline_result.map_err(|(_, result)| result).vk_op("vkCreateGraphicsPipelines")?;
        self.pipeline = pipelines[0];
        Ok(())
    }
}

// getters
impl GuiPass {
    #[inline]
    pub fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout {
        self.descriptor_set_layout
    }

    #[inline]
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }
}

// tools
impl GuiPass {
    /// 绑定 pipeline，设置 viewport 和 push constant
    ///
    /// 每帧开始以及 imgui 要求重置渲染状态时调用
    pub fn setup_render_state(
        &self,
        device: &ash::Device,
        command_buffer: vk::CommandBuffer,
        draw_data: &imgui::DrawData,
        framebuffer_size: [f32; 2],
        vertex_buffer: vk::Buffer,
        index_buffer: vk::Buffer,
        index_type: vk::IndexType,
    ) {
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: framebuffer_size[0],
            height: framebuffer_size[1],
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let push_constant = GuiPushConstant::new(draw_data.display_pos, draw_data.display_size);

        unsafe {
            device.cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, self.pipeline);
            device.cmd_bind_vertex_buffers(command_buffer, 0, &[vertex_buffer], &[0]);
            device.cmd_bind_index_buffer(command_buffer, index_buffer, 0, index_type);
            device.cmd_set_viewport(command_buffer, 0, std::slice::from_ref(&viewport));
            device.cmd_push_constants(
                command_buffer,
                self.pipeline_layout,
                vk::ShaderStageFlags::VERTEX,
                0,
                bytemuck::bytes_of(&push_constant),
            );
        }
    }

    pub fn destroy(&mut self, device: &ash::Device) {
        unsafe {
            device.destroy_pipeline(self.pipeline, None);
            device.destroy_pipeline_layout(self.pipeline_layout, None);
            device.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
        }
        self.pipeline = vk::Pipeline::null();
        self.pipeline_layout = vk::PipelineLayout::null();
        self.descriptor_set_layout = vk::DescriptorSetLayout::null();
    }
}

fn create_shader_module(device: &ash::Device, path: &Path) -> Result<vk::ShaderModule, GraphicsResourceError> {
    let shader_load_err = |source| GraphicsResourceError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(shader_load_err)?;
    let code = ash::util::read_spv(&mut file).map_err(shader_load_err)?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
    unsafe { device.create_shader_module(&create_info, None) }.vk_op("vkCreateShaderModule")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_constant_is_16_bytes() {
        assert_eq!(size_of::<GuiPushConstant>(), 16);
    }

    fn assert_close(actual: [f32; 2], expected: [f32; 2]) {
        assert!(
            (actual[0] - expected[0]).abs() < 1e-5 && (actual[1] - expected[1]).abs() < 1e-5,
            "{actual:?} != {expected:?}"
        );
    }

    fn to_ndc(pc: &GuiPushConstant, p: [f32; 2]) -> [f32; 2] {
        [p[0] * pc.scale[0] + pc.translate[0], p[1] * pc.scale[1] + pc.translate[1]]
    }

    #[test]
    fn test_push_constant_maps_display_to_ndc() {
        let pc = GuiPushConstant::new([0.0, 0.0], [800.0, 600.0]);

        assert_close(to_ndc(&pc, [0.0, 0.0]), [-1.0, -1.0]);
        assert_close(to_ndc(&pc, [800.0, 600.0]), [1.0, 1.0]);
        assert_close(to_ndc(&pc, [400.0, 300.0]), [0.0, 0.0]);
    }

    #[test]
    fn test_push_constant_respects_display_pos() {
        let pc = GuiPushConstant::new([100.0, 50.0], [200.0, 100.0]);

        assert_close(to_ndc(&pc, [100.0, 50.0]), [-1.0, -1.0]);
        assert_close(to_ndc(&pc, [300.0, 150.0]), [1.0, 1.0]);
    }

    #[test]
    fn test_scissor_applies_scale_and_clamps() {
        let scissor = clip_rect_to_scissor([-10.0, 5.0, 50.0, 500.0], [0.0, 0.0], [2.0, 2.0], [100.0, 200.0])
            .unwrap();
        assert_eq!(scissor.offset, vk::Offset2D { x: 0, y: 10 });
        assert_eq!(scissor.extent, vk::Extent2D { width: 100, height: 190 });
    }

    #[test]
    fn test_scissor_outside_framebuffer_is_skipped() {
        assert!(clip_rect_to_scissor([300.0, 0.0, 400.0, 10.0], [0.0, 0.0], [1.0, 1.0], [100.0, 100.0]).is_none());
        assert!(clip_rect_to_scissor([10.0, 10.0, 10.0, 20.0], [0.0, 0.0], [1.0, 1.0], [100.0, 100.0]).is_none());
    }

    #[test]
    fn test_scissor_subtracts_display_offset() {
        let scissor = clip_rect_to_scissor([110.0, 60.0, 150.0, 80.0], [100.0, 50.0], [1.0, 1.0], [800.0, 600.0])
            .unwrap();
        assert_eq!(scissor.offset, vk::Offset2D { x: 10, y: 10 });
        assert_eq!(scissor.extent, vk::Extent2D { width: 40, height: 20 });
    }
}
