use anyhow::Context;
use overlay_crate_tools::resource::OverlayPath;
use overlay_gfx::descriptors::descriptor_pool::GuiDescriptorPoolDesc;
use overlay_gui_backend::gui_backend::GuiShaderPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// overlay 的配置，对应 `resources/overlay.toml`
///
/// 所有字段都有默认值，配置文件中可以只写需要修改的部分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// 为 false 时不绑定窗口，使用 `width` / `height` 作为显示区域
    pub show_window: bool,

    pub width: u32,
    pub height: u32,

    /// 默认字体的像素大小
    pub font_size: f32,

    /// 窗口背景的不透明度
    pub window_bg_alpha: f32,

    pub descriptor_pool: DescriptorPoolConfig,
    pub shaders: ShaderConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_window: true,
            width: 1280,
            height: 720,
            font_size: 13.0,
            window_bg_alpha: 0.9,
            descriptor_pool: DescriptorPoolConfig::default(),
            shaders: ShaderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorPoolConfig {
    pub descriptors_per_type: u32,
}

impl Default for DescriptorPoolConfig {
    fn default() -> Self {
        Self {
            descriptors_per_type: GuiDescriptorPoolDesc::DEFAULT_DESCRIPTORS_PER_TYPE,
        }
    }
}

impl DescriptorPoolConfig {
    #[inline]
    pub fn desc(&self) -> GuiDescriptorPoolDesc {
        GuiDescriptorPoolDesc::new(self.descriptors_per_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// SPIR-V 所在目录，相对路径基于 workspace 根目录；
    /// 为空时使用 `shader/.build/imgui`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl ShaderConfig {
    pub fn shader_paths(&self) -> GuiShaderPaths {
        match &self.dir {
            Some(dir) => GuiShaderPaths::from_dir(OverlayPath::workspace_path().join(dir)),
            None => GuiShaderPaths::default(),
        }
    }
}

// new & init
impl OverlayConfig {
    /// 不绑定窗口的配置，常用于测试和离屏渲染
    pub fn headless(width: u32, height: u32) -> Self {
        Self {
            show_window: false,
            width,
            height,
            ..Default::default()
        }
    }

    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).with_context(|| format!("读取配置文件失败: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content).with_context(|| format!("解析 TOML 配置失败: {:?}", path.as_ref()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path.as_ref(), content).with_context(|| format!("写入配置文件失败: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = OverlayConfig::from_toml_str("").unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.descriptor_pool.descriptors_per_type, 1000);
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let config = OverlayConfig::from_toml_str(
            r#"
            show_window = false
            width = 640

            [descriptor_pool]
            descriptors_per_type = 64

            [shaders]
            dir = "custom/spv"
            "#,
        )
        .unwrap();

        assert!(!config.show_window);
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert_eq!(config.descriptor_pool.desc().max_sets(), 64 * 11);

        let paths = config.shaders.shader_paths();
        assert!(paths.vertex.ends_with("custom/spv/imgui.vert.spv"));
        assert!(paths.fragment.ends_with("custom/spv/imgui.frag.spv"));
    }

    #[test]
    fn test_default_shader_paths_point_to_build_dir() {
        let paths = ShaderConfig::default().shader_paths();
        assert!(paths.vertex.ends_with("shader/.build/imgui/imgui.vert.spv"));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(OverlayConfig::from_toml_str("width = \"wide\"").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("overlay-config-{}.toml", std::process::id()));
        let config = OverlayConfig {
            font_size: 16.0,
            ..OverlayConfig::headless(320, 240)
        };

        config.save_to_file(&path).unwrap();
        let loaded = OverlayConfig::from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = OverlayConfig::from_file("/definitely/not/here/overlay.toml").unwrap_err();
        assert!(format!("{err:#}").contains("overlay.toml"));
    }

    #[test]
    fn test_workspace_config_parses() {
        let config = OverlayConfig::from_file(OverlayPath::resources_path("overlay.toml")).unwrap();
        assert_eq!(config.descriptor_pool.descriptors_per_type, 1000);
    }
}
