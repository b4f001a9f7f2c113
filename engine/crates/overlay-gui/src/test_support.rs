//! 测试用的假 context、假窗口和记录调用的 GUI 后端

use ash::vk;
use ash::vk::Handle;
use imgui::TextureId;
use overlay_gfx::error::GraphicsResourceError;
use overlay_gfx::foundation::context::GfxContext;
use overlay_gfx::foundation::mem_allocator::GfxMemAllocator;
use overlay_gfx::swapchain::swapchain_info::GfxSwapchainImageInfo;
use overlay_gui_backend::gui_backend::{GuiBackendInitInfo, GuiRendererBackend};
use std::cell::{Cell, RefCell};
use std::ffi::CStr;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use crate::platform::window::PlatformWindow;

/// imgui 同一时刻只允许一个激活的 context，创建 context 的测试需要串行执行
pub fn test_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FakeWindow {
    pub size: Cell<[u32; 2]>,
    pub scale: f64,
}

impl FakeWindow {
    pub fn new(size: [u32; 2], scale: f64) -> Self {
        Self {
            size: Cell::new(size),
            scale,
        }
    }
}

impl PlatformWindow for FakeWindow {
    fn inner_size(&self) -> [u32; 2] {
        self.size.get()
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }
}

/// 记录 descriptor pool 的创建与销毁
#[derive(Default)]
pub struct FakeGfxContext {
    pub created_pools: RefCell<Vec<(vk::DescriptorPool, u32)>>,
    pub destroyed_pools: RefCell<Vec<vk::DescriptorPool>>,
    pub loaded_functions: RefCell<Vec<String>>,
    next_handle: Cell<u64>,
}

impl FakeGfxContext {
    pub fn live_pools(&self) -> usize {
        self.created_pools.borrow().len() - self.destroyed_pools.borrow().len()
    }
}

impl GfxContext for FakeGfxContext {
    fn vk_instance(&self) -> vk::Instance {
        vk::Instance::from_raw(0x10)
    }
    fn vk_physical_device(&self) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(0x20)
    }
    fn vk_device(&self) -> vk::Device {
        vk::Device::from_raw(0x30)
    }
    fn graphics_queue(&self) -> vk::Queue {
        vk::Queue::from_raw(0x40)
    }
    fn graphics_queue_family_index(&self) -> u32 {
        2
    }
    fn vk_api_version(&self) -> u32 {
        vk::API_VERSION_1_2
    }
    fn allocator(&self) -> Option<Rc<GfxMemAllocator>> {
        None
    }
    fn load_function(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        self.loaded_functions.borrow_mut().push(name.to_string_lossy().into_owned());
        None
    }
    fn create_descriptor_pool(
        &self,
        create_info: &vk::DescriptorPoolCreateInfo<'_>,
    ) -> Result<vk::DescriptorPool, GraphicsResourceError> {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);

        let pool = vk::DescriptorPool::from_raw(0x1000 + handle);
        self.created_pools.borrow_mut().push((pool, create_info.max_sets));
        Ok(pool)
    }
    fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool) {
        self.destroyed_pools.borrow_mut().push(pool);
    }
}

pub fn swapchain_info(image_cnt: usize) -> Rc<GfxSwapchainImageInfo> {
    Rc::new(GfxSwapchainImageInfo {
        image_extent: vk::Extent2D {
            width: 1280,
            height: 720,
        },
        image_cnt,
        image_format: vk::Format::B8G8R8A8_UNORM,
    })
}

/// init 时收到的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedInitInfo {
    pub device: vk::Device,
    pub queue_family: u32,
    pub descriptor_pool: vk::DescriptorPool,
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
    pub min_image_count: u32,
    pub image_count: u32,
    pub msaa_samples: vk::SampleCountFlags,
    pub pipeline_cache: vk::PipelineCache,
}

#[derive(Default)]
pub struct BackendCalls {
    pub inits: Vec<RecordedInitInfo>,
    pub new_frames: usize,
    pub renders: Vec<(vk::CommandBuffer, i32)>,
    pub added_textures: usize,
    pub removed_textures: Vec<TextureId>,
    pub shutdowns: usize,
}

/// 不访问 GPU 的后端，只记录调用
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Rc<RefCell<BackendCalls>>,
    pub fail_init: bool,
}

impl RecordingBackend {
    pub fn new() -> (Self, Rc<RefCell<BackendCalls>>) {
        let backend = Self::default();
        let calls = backend.calls.clone();
        (backend, calls)
    }

    pub fn failing() -> (Self, Rc<RefCell<BackendCalls>>) {
        let (mut backend, calls) = Self::new();
        backend.fail_init = true;
        (backend, calls)
    }
}

impl GuiRendererBackend for RecordingBackend {
    fn init(
        &mut self,
        imgui: &mut imgui::Context,
        init_info: &GuiBackendInitInfo<'_>,
    ) -> Result<(), GraphicsResourceError> {
        (init_info.loader)(c"vkCmdDrawIndexed");
        if self.fail_init {
            return Err(GraphicsResourceError::MissingFunction {
                name: "vkCmdDrawIndexed".to_string(),
            });
        }

        // imgui 要求 new frame 之前字体图集已经生成
        imgui.fonts().build_rgba32_texture();
        imgui.fonts().tex_id = TextureId::new(1);

        self.calls.borrow_mut().inits.push(RecordedInitInfo {
            device: init_info.device,
            queue_family: init_info.queue_family,
            descriptor_pool: init_info.descriptor_pool,
            render_pass: init_info.render_pass,
            subpass: init_info.subpass,
            min_image_count: init_info.min_image_count,
            image_count: init_info.image_count,
            msaa_samples: init_info.msaa_samples,
            pipeline_cache: init_info.pipeline_cache,
        });
        Ok(())
    }

    fn new_frame(&mut self) {
        self.calls.borrow_mut().new_frames += 1;
    }

    fn render_draw_data(
        &mut self,
        draw_data: &imgui::DrawData,
        command_buffer: vk::CommandBuffer,
    ) -> Result<(), GraphicsResourceError> {
        self.calls.borrow_mut().renders.push((command_buffer, draw_data.total_vtx_count));
        Ok(())
    }

    fn add_texture(
        &mut self,
        _sampler: vk::Sampler,
        _image_view: vk::ImageView,
        _image_layout: vk::ImageLayout,
    ) -> Result<TextureId, GraphicsResourceError> {
        let mut calls = self.calls.borrow_mut();
        calls.added_textures += 1;
        Ok(TextureId::new(100 + calls.added_textures))
    }

    fn remove_texture(&mut self, texture_id: TextureId) {
        self.calls.borrow_mut().removed_textures.push(texture_id);
    }

    fn shutdown(&mut self) {
        self.calls.borrow_mut().shutdowns += 1;
    }
}
