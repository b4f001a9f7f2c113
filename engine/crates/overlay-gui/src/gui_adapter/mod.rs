//! 参考 imgui-rs-vulkan-renderer 以及 imgui 官方的 example_glfw_vulkan

mod widgets;

use ash::vk;
use imgui::TextureId;
use overlay_gfx::commands::command_list::CommandList;
use overlay_gfx::foundation::context::GfxContext;
use overlay_gfx::swapchain::swapchain_info::SwapchainInfo;
use overlay_gui_backend::gui_backend::{GuiBackendInitInfo, GuiRendererBackend};
use overlay_gui_backend::vulkan_renderer::VulkanGuiRenderer;
use std::ffi::CStr;
use std::rc::Rc;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::platform::input_backend::{InputBackend, InputBackendKind};
use crate::platform::input_event::InputEvent;
use crate::platform::window::PlatformWindowHandle;
use crate::timer::FrameTimer;

/// imgui 同一时刻只能有一个激活的 context，其他 context 需要挂起
enum GuiContextSlot {
    Active(imgui::Context),
    Suspended(imgui::SuspendedContext),
}

/// 将 imgui 接入宿主的 Vulkan 渲染器
///
/// # 生命周期
/// - 构造时创建 imgui context，析构时最后销毁
/// - GPU 资源在 [`Self::init_render_resources`] 和 [`Self::cleanup_render_resources`] 之间有效，
///   render pass 重建时只需要重新调用这两个函数
///
/// GPU 资源无效、帧没有开始或者 context 被挂起时，所有控件调用都是空操作
pub struct OverlayGuiAdapter {
    gfx_context: Rc<dyn GfxContext>,
    swapchain: Rc<dyn SwapchainInfo>,

    /// 只在状态切换的过程中短暂为 None
    imgui_ctx: Option<GuiContextSlot>,

    descriptor_pool: vk::DescriptorPool,
    /// 为 null 表示 GPU 资源没有初始化
    render_pass: vk::RenderPass,

    /// 控件坐标的参考大小，桌面端为逻辑像素
    width_before_dpi_scale: f32,
    height_before_dpi_scale: f32,

    /// 本帧是否没有打开任何 panel
    is_empty: bool,
    /// 处于 new frame 和 render 之间
    frame_open: bool,
    /// 尚未 end 的 panel 数量
    open_panels: u32,

    input_backend: InputBackend,
    renderer: Box<dyn GuiRendererBackend>,
    timer: FrameTimer,
    config: OverlayConfig,
}

// new & init
impl OverlayGuiAdapter {
    /// 使用 [`VulkanGuiRenderer`] 作为渲染后端
    pub fn new(
        gfx_context: Rc<dyn GfxContext>,
        swapchain: Rc<dyn SwapchainInfo>,
        window: PlatformWindowHandle,
        config: OverlayConfig,
    ) -> Result<Self, OverlayError> {
        Self::with_backend(gfx_context, swapchain, window, config, Box::new(VulkanGuiRenderer::new()))
    }

    pub fn with_backend(
        gfx_context: Rc<dyn GfxContext>,
        swapchain: Rc<dyn SwapchainInfo>,
        window: PlatformWindowHandle,
        config: OverlayConfig,
        renderer: Box<dyn GuiRendererBackend>,
    ) -> Result<Self, OverlayError> {
        let input_backend = InputBackend::new(window, &config)?;

        if unsafe { !imgui::sys::igGetCurrentContext().is_null() } {
            return Err(OverlayError::ContextBusy);
        }
        let mut imgui_ctx = imgui::Context::create();
        Self::setup_context(&mut imgui_ctx, &config, input_backend.kind());
        input_backend.attach(imgui_ctx.io_mut());

        let [width_before_dpi_scale, height_before_dpi_scale] = input_backend.display_size();
        log::info!(
            "overlay gui created: reference size {}x{}",
            width_before_dpi_scale,
            height_before_dpi_scale
        );

        Ok(Self {
            gfx_context,
            swapchain,
            imgui_ctx: Some(GuiContextSlot::Active(imgui_ctx)),
            descriptor_pool: vk::DescriptorPool::null(),
            render_pass: vk::RenderPass::null(),
            width_before_dpi_scale,
            height_before_dpi_scale,
            is_empty: true,
            frame_open: false,
            open_panels: 0,
            input_backend,
            renderer,
            timer: FrameTimer::default(),
            config,
        })
    }

    fn setup_context(imgui_ctx: &mut imgui::Context, config: &OverlayConfig, kind: InputBackendKind) {
        // disable automatic saving .ini file
        imgui_ctx.set_ini_filename(None);
        imgui_ctx.set_platform_name(Some(format!("overlay-gui-{kind:?}").to_lowercase()));

        // theme
        {
            let style = imgui_ctx.style_mut();
            style.use_dark_colors();
            // WindowBg: 半透明深色背景
            style.colors[imgui::StyleColor::WindowBg as usize] = [0.1, 0.1, 0.1, config.window_bg_alpha];
        }

        imgui_ctx.fonts().add_font(&[imgui::FontSource::DefaultFontData {
            config: Some(imgui::FontConfig {
                size_pixels: config.font_size,
                ..Default::default()
            }),
        }]);
    }

    /// 创建 descriptor pool 并初始化渲染后端，随后立即开始第一帧
    ///
    /// 已经初始化过时会先清理旧的资源（例如窗口大小改变后 render pass 被重建）
    pub fn init_render_resources(&mut self, render_pass: vk::RenderPass) -> Result<(), OverlayError> {
        // context 被挂起时保留现有资源
        if !matches!(self.imgui_ctx, Some(GuiContextSlot::Active(_))) {
            return Err(OverlayError::ContextBusy);
        }

        if self.initialized() {
            log::warn!("overlay gui is already initialized, cleaning up before re-init");
            self.cleanup_render_resources();
        }

        let Some(GuiContextSlot::Active(imgui_ctx)) = &mut self.imgui_ctx else {
            return Err(OverlayError::ContextBusy);
        };

        let descriptor_pool = self.config.descriptor_pool.desc().create(&*self.gfx_context)?;

        let gfx_context = &self.gfx_context;
        let loader = |name: &CStr| gfx_context.load_function(name);
        let shaders = self.config.shaders.shader_paths();
        let image_count = self.swapchain.image_count();

        let init_info = GuiBackendInitInfo {
            api_version: gfx_context.vk_api_version(),
            instance: gfx_context.vk_instance(),
            physical_device: gfx_context.vk_physical_device(),
            device: gfx_context.vk_device(),
            queue_family: gfx_context.graphics_queue_family_index(),
            queue: gfx_context.graphics_queue(),
            pipeline_cache: vk::PipelineCache::null(),
            descriptor_pool,
            render_pass,
            subpass: 0,
            min_image_count: image_count,
            image_count,
            msaa_samples: vk::SampleCountFlags::TYPE_1,
            allocator: gfx_context.allocator(),
            shaders: &shaders,
            loader: &loader,
        };

        if let Err(e) = self.renderer.init(imgui_ctx, &init_info) {
            log::error!("failed to init overlay gui renderer: {e}");
            gfx_context.destroy_descriptor_pool(descriptor_pool);
            return Err(e.into());
        }

        self.descriptor_pool = descriptor_pool;
        self.render_pass = render_pass;
        log::info!("overlay gui render resources initialized, {} swapchain images", image_count);

        self.prepare_for_next_frame();
        Ok(())
    }
}

// destroy
impl OverlayGuiAdapter {
    /// 释放 GPU 资源，回到未初始化的状态；imgui context 保留
    pub fn cleanup_render_resources(&mut self) {
        self.close_frame();

        if self.initialized() {
            self.renderer.shutdown();
        }
        if self.descriptor_pool != vk::DescriptorPool::null() {
            self.gfx_context.destroy_descriptor_pool(self.descriptor_pool);
            self.descriptor_pool = vk::DescriptorPool::null();
        }
        if self.render_pass != vk::RenderPass::null() {
            log::info!("overlay gui render resources cleaned up");
        }
        self.render_pass = vk::RenderPass::null();
    }
}

impl Drop for OverlayGuiAdapter {
    fn drop(&mut self) {
        self.input_backend.shutdown();
        self.cleanup_render_resources();

        // imgui context 最后销毁
        match self.imgui_ctx.take() {
            // 挂起的 context 销毁时会对当前 context 调用 igEndFrame，先把当前 context 换下来
            Some(GuiContextSlot::Suspended(suspended)) => unsafe {
                let current = imgui::sys::igGetCurrentContext();
                imgui::sys::igSetCurrentContext(std::ptr::null_mut());
                drop(suspended);
                imgui::sys::igSetCurrentContext(current);
            },
            slot => drop(slot),
        }
    }
}

// getters
impl OverlayGuiAdapter {
    #[inline]
    pub fn initialized(&self) -> bool {
        self.render_pass != vk::RenderPass::null()
    }

    /// 本帧是否没有打开任何 panel
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        matches!(self.imgui_ctx, Some(GuiContextSlot::Suspended(_)))
    }

    /// 将 0-1 的横向比例转换为像素
    #[inline]
    pub fn abs_x(&self, x: f32) -> f32 {
        x * self.width_before_dpi_scale
    }

    /// 将 0-1 的纵向比例转换为像素
    #[inline]
    pub fn abs_y(&self, y: f32) -> f32 {
        y * self.height_before_dpi_scale
    }

    #[inline]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    #[inline]
    pub fn input_backend_kind(&self) -> InputBackendKind {
        self.input_backend.kind()
    }

    #[inline]
    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    #[inline]
    pub fn descriptor_pool(&self) -> vk::DescriptorPool {
        self.descriptor_pool
    }

    /// overlay 是否需要独占鼠标输入，宿主可以据此屏蔽相机控制
    pub fn want_capture_mouse(&self) -> bool {
        self.active_io().is_some_and(|io| io.want_capture_mouse)
    }

    pub fn want_capture_keyboard(&self) -> bool {
        self.active_io().is_some_and(|io| io.want_capture_keyboard)
    }

    fn active_io(&self) -> Option<&imgui::Io> {
        match &self.imgui_ctx {
            Some(GuiContextSlot::Active(imgui_ctx)) if self.initialized() => Some(imgui_ctx.io()),
            _ => None,
        }
    }

    /// 是否可以调用控件
    #[inline]
    fn building(&self) -> bool {
        self.initialized() && self.frame_open && matches!(self.imgui_ctx, Some(GuiContextSlot::Active(_)))
    }
}

// phase
impl OverlayGuiAdapter {
    /// 将窗口事件转发给 imgui
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let Some(GuiContextSlot::Active(imgui_ctx)) = &mut self.imgui_ctx {
            self.input_backend.handle_event(imgui_ctx.io_mut(), event);
        }
    }

    /// 开始新的一帧，之后才能调用控件
    ///
    /// 上一帧如果没有 draw，会先被关闭
    pub fn prepare_for_next_frame(&mut self) {
        if !self.initialized() {
            return;
        }
        self.close_frame();

        let Some(GuiContextSlot::Active(imgui_ctx)) = &mut self.imgui_ctx else {
            return;
        };

        self.timer.tick();
        imgui_ctx.io_mut().delta_time = self.timer.delta_secs();
        self.renderer.new_frame();
        self.input_backend.prepare_frame(imgui_ctx.io_mut());

        imgui_ctx.new_frame();
        self.frame_open = true;
        self.is_empty = true;
    }

    /// 结束本帧的控件构建，将 draw data 录制到 command buffer 中
    ///
    /// command buffer 必须已经处于 render pass 内部，render pass 的开始与结束由调用者负责
    pub fn draw(&mut self, command_list: &dyn CommandList) -> Result<(), OverlayError> {
        if !self.building() {
            return Ok(());
        }
        let Some(GuiContextSlot::Active(imgui_ctx)) = &mut self.imgui_ctx else {
            return Ok(());
        };

        unsafe {
            for _ in 0..self.open_panels {
                imgui::sys::igEnd();
            }
        }
        self.open_panels = 0;
        self.frame_open = false;

        let draw_data = imgui_ctx.render();
        self.renderer.render_draw_data(draw_data, command_list.vk_command_buffer())?;
        Ok(())
    }

    /// 关闭还没有 draw 的帧
    fn close_frame(&mut self) {
        if !self.frame_open {
            return;
        }
        if let Some(GuiContextSlot::Active(_)) = &self.imgui_ctx {
            unsafe {
                for _ in 0..self.open_panels {
                    imgui::sys::igEnd();
                }
                imgui::sys::igEndFrame();
            }
        }
        self.open_panels = 0;
        self.frame_open = false;
    }
}

// context switch
impl OverlayGuiAdapter {
    /// 挂起 imgui context，使其他 overlay 可以创建或激活自己的 context
    pub fn suspend(&mut self) {
        self.close_frame();
        self.imgui_ctx = match self.imgui_ctx.take() {
            Some(GuiContextSlot::Active(imgui_ctx)) => {
                log::info!("overlay gui context suspended");
                Some(GuiContextSlot::Suspended(imgui_ctx.suspend()))
            }
            other => other,
        };
    }

    /// 重新激活 imgui context；其他 context 仍处于激活状态时返回 [`OverlayError::ContextBusy`]
    pub fn activate(&mut self) -> Result<(), OverlayError> {
        match self.imgui_ctx.take() {
            Some(GuiContextSlot::Suspended(suspended)) => match suspended.activate() {
                Ok(imgui_ctx) => {
                    log::info!("overlay gui context activated");
                    self.imgui_ctx = Some(GuiContextSlot::Active(imgui_ctx));
                    Ok(())
                }
                Err(suspended) => {
                    self.imgui_ctx = Some(GuiContextSlot::Suspended(suspended));
                    Err(OverlayError::ContextBusy)
                }
            },
            other => {
                self.imgui_ctx = other;
                Ok(())
            }
        }
    }
}

// textures
impl OverlayGuiAdapter {
    /// 注册宿主的纹理，返回的 id 可以交给 [`Self::image`] 使用
    pub fn add_texture(
        &mut self,
        sampler: vk::Sampler,
        image_view: vk::ImageView,
        image_layout: vk::ImageLayout,
    ) -> Option<TextureId> {
        if !self.initialized() {
            return None;
        }
        match self.renderer.add_texture(sampler, image_view, image_layout) {
            Ok(texture_id) => Some(texture_id),
            Err(e) => {
                log::error!("failed to add overlay texture: {e}");
                None
            }
        }
    }

    pub fn remove_texture(&mut self, texture_id: TextureId) {
        if self.initialized() {
            self.renderer.remove_texture(texture_id);
        }
    }
}
