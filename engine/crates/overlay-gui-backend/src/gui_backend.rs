use ash::vk;
use imgui::{DrawData, TextureId};
use overlay_crate_tools::resource::OverlayPath;
use overlay_gfx::error::GraphicsResourceError;
use overlay_gfx::foundation::mem_allocator::GfxMemAllocator;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// 编译后的 imgui shader（SPIR-V）路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for GuiShaderPaths {
    fn default() -> Self {
        Self {
            vertex: OverlayPath::shader_build_path("imgui/imgui.vert"),
            fragment: OverlayPath::shader_build_path("imgui/imgui.frag"),
        }
    }
}

impl GuiShaderPaths {
    /// 在指定目录下查找 `imgui.vert.spv` 和 `imgui.frag.spv`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vertex: dir.join("imgui.vert.spv"),
            fragment: dir.join("imgui.frag.spv"),
        }
    }
}

/// device 级别的函数加载器
pub type GuiFunctionLoader<'a> = &'a dyn Fn(&CStr) -> vk::PFN_vkVoidFunction;

/// 初始化 GUI 后端所需的全部参数
///
/// instance、device、queue 和 descriptor pool 都由调用者管理，后端只共享 allocator
pub struct GuiBackendInitInfo<'a> {
    pub api_version: u32,
    pub instance: vk::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: vk::Device,
    pub queue_family: u32,
    pub queue: vk::Queue,
    pub pipeline_cache: vk::PipelineCache,
    /// 字体以及用户纹理的 descriptor set 从这里分配
    pub descriptor_pool: vk::DescriptorPool,
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
    pub min_image_count: u32,
    /// 决定后端内部 vertex/index buffer 的份数
    pub image_count: u32,
    pub msaa_samples: vk::SampleCountFlags,
    /// mesh 和字体纹理的内存从这里分配，为 `None` 时 init 失败
    pub allocator: Option<Rc<GfxMemAllocator>>,
    pub shaders: &'a GuiShaderPaths,
    /// 用于加载 device 函数表
    pub loader: GuiFunctionLoader<'a>,
}

/// GUI 的渲染后端
///
/// # 调用顺序
/// `init` → (`new_frame` → `render_draw_data`)* → `shutdown`
pub trait GuiRendererBackend {
    /// 创建 pipeline，上传字体纹理
    fn init(
        &mut self,
        imgui: &mut imgui::Context,
        init_info: &GuiBackendInitInfo<'_>,
    ) -> Result<(), GraphicsResourceError>;

    /// 每帧开始时调用，切换到下一份 mesh 数据
    fn new_frame(&mut self);

    /// 将 draw data 录制到 command buffer 中
    ///
    /// command buffer 必须处于 render pass 内部
    fn render_draw_data(
        &mut self,
        draw_data: &DrawData,
        command_buffer: vk::CommandBuffer,
    ) -> Result<(), GraphicsResourceError>;

    /// 注册一张用户纹理，返回可以直接交给 imgui 使用的 id
    fn add_texture(
        &mut self,
        sampler: vk::Sampler,
        image_view: vk::ImageView,
        image_layout: vk::ImageLayout,
    ) -> Result<TextureId, GraphicsResourceError>;

    fn remove_texture(&mut self, texture_id: TextureId);

    /// 销毁后端创建的全部对象
    fn shutdown(&mut self);
}
