//! 着色器编译任务

use std::path::{Path, PathBuf};

/// Shader 的执行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// 根据文件名解析 shader stage，不支持的扩展名返回 `None`
    pub fn from_file_name(shader_name: &str) -> Option<Self> {
        let stage = match () {
            _ if shader_name.ends_with(".vert") => Self::Vertex,
            _ if shader_name.ends_with(".frag") => Self::Fragment,
            _ if shader_name.ends_with(".comp") => Self::Compute,
            _ => return None,
        };
        Some(stage)
    }

    /// glslc 的 `-fshader-stage` 参数
    pub fn glslc_stage(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Fragment => "frag",
            Self::Compute => "comp",
        }
    }
}

/// 一个具体的编译任务
#[derive(Debug)]
pub struct ShaderCompileTask {
    pub shader_path: PathBuf,
    pub output_path: PathBuf,
    pub shader_stage: ShaderStage,
}

impl ShaderCompileTask {
    /// # Arguments
    /// * `shader_path` - 位于 `src_root` 下的 shader 源文件
    /// * `src_root` - shader 源码根目录
    /// * `build_root` - 输出根目录，保持和源码相同的目录结构
    ///
    /// # Returns
    /// 文件不在 `src_root` 下，或者扩展名不被支持时返回 None
    pub fn new(shader_path: &Path, src_root: &Path, build_root: &Path) -> Option<Self> {
        let relative_path = shader_path.strip_prefix(src_root).ok()?;
        let shader_name = shader_path.file_name()?.to_str()?;
        let shader_stage = ShaderStage::from_file_name(shader_name)?;

        // imgui.vert -> imgui.vert.spv
        let mut output_path = build_root.join(relative_path).into_os_string();
        output_path.push(".spv");

        Some(Self {
            shader_path: shader_path.to_path_buf(),
            output_path: PathBuf::from(output_path),
            shader_stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_keeps_relative_dir() {
        let task = ShaderCompileTask::new(
            Path::new("/ws/shader/src/imgui/imgui.frag"),
            Path::new("/ws/shader/src"),
            Path::new("/ws/shader/.build"),
        )
        .unwrap();

        assert_eq!(task.output_path, PathBuf::from("/ws/shader/.build/imgui/imgui.frag.spv"));
        assert_eq!(task.shader_stage, ShaderStage::Fragment);
    }

    #[test]
    fn test_unsupported_files_are_skipped() {
        let src = Path::new("/ws/shader/src");
        let build = Path::new("/ws/shader/.build");

        assert!(ShaderCompileTask::new(Path::new("/ws/shader/src/readme.md"), src, build).is_none());
        assert!(ShaderCompileTask::new(Path::new("/elsewhere/imgui.vert"), src, build).is_none());
    }
}
