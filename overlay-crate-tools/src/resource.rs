use std::path::{Path, PathBuf};

/// 统一资源路径管理
///
/// 所有路径基于工作区根目录（通过 `CARGO_MANIFEST_DIR` 推导）。
/// 避免使用硬编码相对路径，确保在不同构建环境下路径一致。
///
/// # 使用示例
/// ```ignore
/// let config = OverlayPath::resources_path("overlay.toml");              // resources/overlay.toml
/// let vert = OverlayPath::shader_build_path("imgui/imgui.vert");        // shader/.build/imgui/imgui.vert.spv
/// ```
pub struct OverlayPath {}
impl OverlayPath {
    /// 获取 `resources/` 目录下的文件路径
    pub fn resources_path(filename: &str) -> PathBuf {
        Self::workspace_path().join("resources").join(filename)
    }

    /// 获取 `shader/.build/` 目录下的着色器路径（编译后的 SPIR-V）
    ///
    /// 在文件名后追加 `.spv`，和 shader-build 的输出规则保持一致
    pub fn shader_build_path(filename: &str) -> PathBuf {
        let mut path = Self::shader_build_root_path().join(filename).into_os_string();
        path.push(".spv");
        PathBuf::from(path)
    }

    /// 获取工作区根目录
    pub fn workspace_path() -> PathBuf {
        // 从 overlay-crate-tools 推导到 workspace root
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir.parent().unwrap_or(manifest_dir).to_path_buf()
    }

    pub fn shader_root_path() -> PathBuf {
        Self::workspace_path().join("shader")
    }

    /// shader 源码目录
    pub fn shader_src_path() -> PathBuf {
        Self::shader_root_path().join("src")
    }

    /// shader 编译输出目录
    pub fn shader_build_root_path() -> PathBuf {
        Self::shader_root_path().join(".build")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_build_path_appends_spv() {
        let path = OverlayPath::shader_build_path("imgui/imgui.vert");
        assert!(path.ends_with("shader/.build/imgui/imgui.vert.spv"));
    }

    #[test]
    fn test_workspace_contains_crate_tools() {
        let workspace = OverlayPath::workspace_path();
        assert!(workspace.join("overlay-crate-tools").is_dir());
    }
}
