use std::rc::Rc;
use std::sync::Arc;

/// overlay 需要从窗口获取的信息
pub trait PlatformWindow {
    /// 窗口内部区域的物理像素大小
    fn inner_size(&self) -> [u32; 2];

    fn scale_factor(&self) -> f64;

    /// 逻辑像素大小：物理像素除以缩放系数
    fn logical_size(&self) -> [f32; 2] {
        let [width, height] = self.inner_size();
        let scale = self.scale_factor().max(f64::MIN_POSITIVE);
        [(width as f64 / scale) as f32, (height as f64 / scale) as f32]
    }
}

impl PlatformWindow for winit::window::Window {
    fn inner_size(&self) -> [u32; 2] {
        let size = winit::window::Window::inner_size(self);
        [size.width, size.height]
    }

    fn scale_factor(&self) -> f64 {
        winit::window::Window::scale_factor(self)
    }
}

impl<T: PlatformWindow + ?Sized> PlatformWindow for Arc<T> {
    fn inner_size(&self) -> [u32; 2] {
        (**self).inner_size()
    }

    fn scale_factor(&self) -> f64 {
        (**self).scale_factor()
    }
}

/// 创建 overlay 时传入的窗口，同时决定使用哪种输入后端
#[derive(Clone, Default)]
pub enum PlatformWindowHandle {
    /// 桌面窗口，使用逻辑像素
    Desktop(Rc<dyn PlatformWindow>),
    /// 移动端窗口，使用物理像素，触摸作为鼠标
    Mobile(Rc<dyn PlatformWindow>),
    #[default]
    None,
}

impl PlatformWindowHandle {
    pub fn desktop(window: impl PlatformWindow + 'static) -> Self {
        Self::Desktop(Rc::new(window))
    }

    pub fn mobile(window: impl PlatformWindow + 'static) -> Self {
        Self::Mobile(Rc::new(window))
    }
}
