//! GLSL 着色器编译器
//!
//! 使用 glslc (来自 Vulkan SDK) 将 GLSL 着色器编译为 SPIR-V

use anyhow::{Context, bail};
use overlay_crate_tools::resource::OverlayPath;

use crate::common::ShaderCompileTask;

#[derive(Debug, Default)]
pub struct GlslCompiler;

impl GlslCompiler {
    pub const fn new() -> Self {
        Self
    }

    pub fn compile(&self, task: &ShaderCompileTask) -> anyhow::Result<()> {
        let output = std::process::Command::new("glslc")
            .arg(format!("-I{}", OverlayPath::shader_root_path().display()))
            .arg(format!("-fshader-stage={}", task.shader_stage.glslc_stage()))
            .arg("-g") // 生成调试信息
            .arg("--target-env=vulkan1.0")
            .arg("-o")
            .arg(&task.output_path)
            .arg(&task.shader_path)
            .output()
            .context("failed to execute glslc, is the Vulkan SDK installed?")?;

        if !output.stdout.is_empty() {
            log::info!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        }
        if !output.stderr.is_empty() {
            log::error!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        }
        if !output.status.success() {
            bail!("glslc failed on {:?}: {}", task.shader_path, output.status);
        }
        Ok(())
    }
}
