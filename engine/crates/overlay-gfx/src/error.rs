use ash::vk;
use std::path::PathBuf;

/// 创建或销毁 GPU 资源时的错误
///
/// Vulkan 的返回值不会被静默丢弃，而是在 init / draw / cleanup 的边界上返回给调用者
#[derive(Debug, thiserror::Error)]
pub enum GraphicsResourceError {
    /// 某个 Vulkan 调用返回了错误码
    #[error("{op} failed: {result}")]
    Vulkan { op: &'static str, result: vk::Result },

    /// physical device 上找不到满足要求的 memory type
    #[error("no suitable memory type for {usage}")]
    NoSuitableMemoryType { usage: &'static str },

    /// SPIR-V 文件不存在或者格式错误
    #[error("failed to load shader {path:?}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 函数加载器没有返回所需的入口
    #[error("vulkan entry point {name} is not available")]
    MissingFunction { name: String },

    /// 宿主没有提供 GPU 内存分配器
    #[error("gpu memory allocator is not available")]
    MissingAllocator,
}

/// 将 `Result<T, vk::Result>` 转换为带有操作名的 [`GraphicsResourceError`]
pub trait VkResultExt<T> {
    fn vk_op(self, op: &'static str) -> Result<T, GraphicsResourceError>;

    /// vma 找不到合适的 memory type 时返回 `ERROR_FEATURE_NOT_PRESENT`，单独区分出来
    fn vma_op(self, op: &'static str, usage: &'static str) -> Result<T, GraphicsResourceError>;
}

impl<T> VkResultExt<T> for Result<T, vk::Result> {
    #[inline]
    fn vk_op(self, op: &'static str) -> Result<T, GraphicsResourceError> {
        self.map_err(|result| GraphicsResourceError::Vulkan { op, result })
    }

    fn vma_op(self, op: &'static str, usage: &'static str) -> Result<T, GraphicsResourceError> {
        self.map_err(|result| match result {
            vk::Result::ERROR_FEATURE_NOT_PRESENT => GraphicsResourceError::NoSuitableMemoryType { usage },
            result => GraphicsResourceError::Vulkan { op, result },
        })
    }
}
