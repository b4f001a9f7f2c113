use ash::vk;
use imgui::internal::RawWrapper;
use imgui::{DrawCmd, DrawCmdParams, DrawData, TextureId};
use overlay_gfx::error::{GraphicsResourceError, VkResultExt};
use overlay_gfx::foundation::mem_allocator::GfxMemAllocator;
use std::ffi::{CStr, c_void};
use std::rc::Rc;

use crate::gui_backend::{GuiBackendInitInfo, GuiRendererBackend};
use crate::gui_font::{GuiFontTexture, allocate_texture_set, set_from_texture_id, texture_id_from_set};
use crate::gui_mesh::GuiMesh;
use crate::gui_pass::{GuiPass, clip_rect_to_scissor};
use crate::gui_vertex_layout::GUI_INDEX_TYPE;

/// 初始化前必须能够加载到的 device 函数
const REQUIRED_DEVICE_FUNCTIONS: [&CStr; 6] = [
    c"vkCreateGraphicsPipelines",
    c"vkCreateDescriptorSetLayout",
    c"vkAllocateDescriptorSets",
    c"vkCreateBuffer",
    c"vkCmdDrawIndexed",
    c"vkQueueSubmit",
];

/// init 之后才存在的状态
struct RendererState {
    device: ash::Device,
    allocator: Rc<GfxMemAllocator>,
    descriptor_pool: vk::DescriptorPool,

    pass: GuiPass,
    font: GuiFontTexture,

    /// 每个 swapchain image 一份
    meshes: Vec<GuiMesh>,
    frame_index: usize,
}

/// 基于 ash 的 imgui 渲染后端
#[derive(Default)]
pub struct VulkanGuiRenderer {
    state: Option<RendererState>,
}

impl VulkanGuiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn check_functions(init_info: &GuiBackendInitInfo<'_>) -> Result<(), GraphicsResourceError> {
        match REQUIRED_DEVICE_FUNCTIONS.iter().find(|name| (init_info.loader)(name).is_none()) {
            Some(name) => Err(GraphicsResourceError::MissingFunction {
                name: name.to_string_lossy().into_owned(),
            }),
            None => Ok(()),
        }
    }

    fn load_device(init_info: &GuiBackendInitInfo<'_>) -> ash::Device {
        let loader = init_info.loader;
        unsafe {
            ash::Device::load_with(
                |name| match loader(name) {
                    Some(function) => function as *const c_void,
                    None => std::ptr::null(),
                },
                init_info.device,
            )
        }
    }
}

impl GuiRendererBackend for VulkanGuiRenderer {
    fn init(
        &mut self,
        imgui: &mut imgui::Context,
        init_info: &GuiBackendInitInfo<'_>,
    ) -> Result<(), GraphicsResourceError> {
        if self.state.is_some() {
            log::warn!("vulkan gui renderer is already initialized, shutting down the previous one");
            self.shutdown();
        }

        Self::check_functions(init_info)?;
        let allocator = init_info.allocator.clone().ok_or(GraphicsResourceError::MissingAllocator)?;
        let device = Self::load_device(init_info);

        let mut pass = GuiPass::new(&device, init_info)?;

        let font = {
            let fonts = imgui.fonts();
            let atlas = fonts.build_rgba32_texture();
            GuiFontTexture::new(
                &device,
                &allocator,
                init_info.queue_family,
                init_info.queue,
                init_info.descriptor_pool,
                pass.descriptor_set_layout(),
                atlas.width,
                atlas.height,
                atlas.data,
            )
        };
        let font = match font {
            Ok(font) => font,
            Err(e) => {
                pass.destroy(&device);
                return Err(e);
            }
        };
        imgui.fonts().tex_id = font.texture_id();

        imgui.io_mut().backend_flags.insert(imgui::BackendFlags::RENDERER_HAS_VTX_OFFSET);
        imgui.set_renderer_name(Some(String::from("overlay-gui-vulkan")));

        let mesh_cnt = init_info.image_count.max(init_info.min_image_count).max(1) as usize;
        log::info!(
            "vulkan gui renderer initialized: {} mesh slots, api version {}.{}",
            mesh_cnt,
            vk::api_version_major(init_info.api_version),
            vk::api_version_minor(init_info.api_version),
        );

        self.state = Some(RendererState {
            device,
            allocator,
            descriptor_pool: init_info.descriptor_pool,
            pass,
            font,
            meshes: (0..mesh_cnt).map(|_| GuiMesh::default()).collect(),
            frame_index: 0,
        });
        Ok(())
    }

    fn new_frame(&mut self) {
        if let Some(state) = &mut self.state {
            state.frame_index = (state.frame_index + 1) % state.meshes.len();
        }
    }

    fn render_draw_data(
        &mut self,
        draw_data: &DrawData,
        command_buffer: vk::CommandBuffer,
    ) -> Result<(), GraphicsResourceError> {
        let Some(state) = &mut self.state else {
            log::warn!("vulkan gui renderer is not initialized, skip rendering");
            return Ok(());
        };

        let framebuffer_size = [
            draw_data.display_size[0] * draw_data.framebuffer_scale[0],
            draw_data.display_size[1] * draw_data.framebuffer_scale[1],
        ];
        if framebuffer_size[0] <= 0.0 || framebuffer_size[1] <= 0.0 || draw_data.total_vtx_count == 0 {
            return Ok(());
        }

        let mesh = &mut state.meshes[state.frame_index];
        mesh.upload(&state.allocator, draw_data)?;
        let (Some(vertex_buffer), Some(index_buffer)) = (mesh.vk_vertex_buffer(), mesh.vk_index_buffer()) else {
            return Ok(());
        };

        let device = &state.device;
        let pass = &state.pass;
        let setup_render_state = || {
            pass.setup_render_state(
                device,
                command_buffer,
                draw_data,
                framebuffer_size,
                vertex_buffer,
                index_buffer,
                GUI_INDEX_TYPE,
            )
        };
        setup_render_state();

        let clip_offset = draw_data.display_pos;
        let clip_scale = draw_data.framebuffer_scale;

        let mut index_offset = 0;
        let mut vertex_offset = 0;
        // 和上一个 command 使用同一张纹理时不需要重新绑定
        let mut last_texture_id: Option<TextureId> = None;

        for draw_list in draw_data.draw_lists() {
            for command in draw_list.commands() {
                match command {
                    DrawCmd::Elements {
                        count,
                        cmd_params:
                            DrawCmdParams {
                                clip_rect,
                                texture_id,
                                vtx_offset,
                                idx_offset,
                            },
                    } => {
                        let Some(scissor) =
                            clip_rect_to_scissor(clip_rect, clip_offset, clip_scale, framebuffer_size)
                        else {
                            continue;
                        };

                        unsafe {
                            device.cmd_set_scissor(command_buffer, 0, std::slice::from_ref(&scissor));

                            if Some(texture_id) != last_texture_id {
                                device.cmd_bind_descriptor_sets(
                                    command_buffer,
                                    vk::PipelineBindPoint::GRAPHICS,
                                    pass.pipeline_layout(),
                                    0,
                                    &[set_from_texture_id(texture_id)],
                                    &[],
                                );
                                last_texture_id = Some(texture_id);
                            }

                            device.cmd_draw_indexed(
                                command_buffer,
                                count as u32,
                                1,
                                index_offset + idx_offset as u32,
                                vertex_offset + vtx_offset as i32,
                                0,
                            );
                        }
                    }
                    DrawCmd::ResetRenderState => {
                        setup_render_state();
                        last_texture_id = None;
                    }
                    DrawCmd::RawCallback { callback, raw_cmd } => unsafe {
                        callback(draw_list.raw(), raw_cmd);
                    },
                }
            }

            index_offset += draw_list.idx_buffer().len() as u32;
            vertex_offset += draw_list.vtx_buffer().len() as i32;
        }

        Ok(())
    }

    fn add_texture(
        &mut self,
        sampler: vk::Sampler,
        image_view: vk::ImageView,
        image_layout: vk::ImageLayout,
    ) -> Result<TextureId, GraphicsResourceError> {
        let Some(state) = &self.state else {
            return Err(GraphicsResourceError::Vulkan {
                op: "vkAllocateDescriptorSets",
                result: vk::Result::ERROR_INITIALIZATION_FAILED,
            });
        };

        let descriptor_set = allocate_texture_set(
            &state.device,
            state.descriptor_pool,
            state.pass.descriptor_set_layout(),
            sampler,
            image_view,
            image_layout,
        )?;
        Ok(texture_id_from_set(descriptor_set))
    }

    fn remove_texture(&mut self, texture_id: TextureId) {
        let Some(state) = &self.state else {
            return;
        };
        if texture_id == state.font.texture_id() {
            log::warn!("font texture can not be removed");
            return;
        }

        let descriptor_set = set_from_texture_id(texture_id);
        if let Err(e) = unsafe { state.device.free_descriptor_sets(state.descriptor_pool, &[descriptor_set]) }
            .vk_op("vkFreeDescriptorSets")
        {
            log::error!("failed to remove gui texture {:?}: {e}", texture_id);
        }
    }

    fn shutdown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        if let Err(e) = unsafe { state.device.device_wait_idle() }.vk_op("vkDeviceWaitIdle") {
            log::error!("{e}");
        }

        for mesh in state.meshes.drain(..) {
            mesh.destroy(&state.allocator);
        }
        state.font.destroy(&state.device, &state.allocator);
        state.pass.destroy(&state.device);

        log::info!("vulkan gui renderer shut down");
    }
}

impl Drop for VulkanGuiRenderer {
    fn drop(&mut self) {
        if self.state.is_some() {
            log::warn!("vulkan gui renderer dropped without shutdown");
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui_backend::GuiShaderPaths;

    fn init_info<'a>(
        shaders: &'a GuiShaderPaths,
        loader: &'a dyn Fn(&CStr) -> vk::PFN_vkVoidFunction,
    ) -> GuiBackendInitInfo<'a> {
        GuiBackendInitInfo {
            api_version: vk::API_VERSION_1_2,
            instance: vk::Instance::null(),
            physical_device: vk::PhysicalDevice::null(),
            device: vk::Device::null(),
            queue_family: 0,
            queue: vk::Queue::null(),
            pipeline_cache: vk::PipelineCache::null(),
            descriptor_pool: vk::DescriptorPool::null(),
            render_pass: vk::RenderPass::null(),
            subpass: 0,
            min_image_count: 2,
            image_count: 3,
            msaa_samples: vk::SampleCountFlags::TYPE_1,
            allocator: None,
            shaders,
            loader,
        }
    }

    #[test]
    fn test_init_fails_without_device_functions() {
        let mut imgui = imgui::Context::create();
        let shaders = GuiShaderPaths::default();
        let loader = |_: &CStr| -> vk::PFN_vkVoidFunction { None };

        let mut renderer = VulkanGuiRenderer::new();
        let err = renderer.init(&mut imgui, &init_info(&shaders, &loader)).unwrap_err();

        assert!(matches!(err, GraphicsResourceError::MissingFunction { ref name } if name == "vkCreateGraphicsPipelines"));
        assert!(!renderer.is_initialized());
    }

    #[test]
    fn test_init_fails_without_allocator() {
        unsafe extern "system" fn noop() {}

        let mut imgui = imgui::Context::create();
        let shaders = GuiShaderPaths::default();
        let loader = |_: &CStr| -> vk::PFN_vkVoidFunction { Some(noop) };

        let mut renderer = VulkanGuiRenderer::new();
        let err = renderer.init(&mut imgui, &init_info(&shaders, &loader)).unwrap_err();

        assert!(matches!(err, GraphicsResourceError::MissingAllocator));
        assert!(!renderer.is_initialized());
    }

    #[test]
    fn test_uninitialized_renderer_is_inert() {
        let mut renderer = VulkanGuiRenderer::new();
        renderer.new_frame();
        renderer.remove_texture(TextureId::new(1));
        renderer.shutdown();

        assert!(
            renderer
                .add_texture(vk::Sampler::null(), vk::ImageView::null(), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .is_err()
        );
    }
}
