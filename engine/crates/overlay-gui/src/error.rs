use overlay_gfx::error::GraphicsResourceError;

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error(transparent)]
    Gfx(#[from] GraphicsResourceError),

    /// `show_window` 为 true，但没有提供窗口
    #[error("overlay is configured to show a window, but no window was given")]
    MissingWindow,

    /// 进程中已经有另一个处于激活状态的 imgui context
    #[error("another imgui context is active")]
    ContextBusy,
}
