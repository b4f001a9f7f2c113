//! Shader 编译工具
//!
//! 将 `shader/src` 下的所有 GLSL 文件编译为 SPIR-V 文件，输出到 `shader/.build` 目录

mod common;
mod glsl;

use anyhow::Context;
use common::ShaderCompileTask;
use glsl::GlslCompiler;
use overlay_crate_tools::init_log::init_log;
use overlay_crate_tools::resource::OverlayPath;
use rayon::prelude::*;

fn main() -> anyhow::Result<()> {
    init_log();

    let src_root = OverlayPath::shader_src_path();
    let build_root = OverlayPath::shader_build_root_path();
    log::info!("Shader source path: {:?}", src_root);
    log::info!("Shader output path: {:?}", build_root);

    let tasks = walkdir::WalkDir::new(&src_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| ShaderCompileTask::new(entry.path(), &src_root, &build_root))
        .collect::<Vec<_>>();

    let compiler = GlslCompiler::new();
    let failed = tasks
        .par_iter()
        .filter_map(|task| {
            log::info!("Compiling shader: {:?}", task.shader_path);

            let result = task
                .output_path
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .with_context(|| format!("failed to create output dir for {:?}", task.output_path))
                .and_then(|_| compiler.compile(task));
            result.err()
        })
        .inspect(|e| log::error!("{e:#}"))
        .count();

    if failed > 0 {
        anyhow::bail!("{failed} of {} shaders failed to compile", tasks.len());
    }
    log::info!("Shader compilation completed: {} shaders.", tasks.len());
    Ok(())
}
