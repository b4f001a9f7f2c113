use std::rc::Rc;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::platform::input_event::{ElementState, InputEvent, KeyCode, Modifiers, MouseButton, TouchPhase};
use crate::platform::window::{PlatformWindow, PlatformWindowHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBackendKind {
    Desktop,
    Mobile,
    Headless,
}

/// 将窗口状态和输入事件喂给 imgui
///
/// 在运行时根据 [`PlatformWindowHandle`] 和配置选择
pub enum InputBackend {
    /// 坐标使用逻辑像素，framebuffer scale 为窗口的缩放系数
    Desktop { window: Rc<dyn PlatformWindow> },
    /// 坐标使用物理像素，触摸作为鼠标左键
    Mobile { window: Rc<dyn PlatformWindow> },
    /// 没有窗口，显示区域来自配置
    Headless { display_size: [f32; 2] },
}

// new & init
impl InputBackend {
    pub fn new(window: PlatformWindowHandle, config: &OverlayConfig) -> Result<Self, OverlayError> {
        let headless_size = [config.width as f32, config.height as f32];
        if !config.show_window {
            return Ok(Self::Headless {
                display_size: headless_size,
            });
        }

        match window {
            PlatformWindowHandle::Desktop(window) => Ok(Self::Desktop { window }),
            PlatformWindowHandle::Mobile(window) => Ok(Self::Mobile { window }),
            PlatformWindowHandle::None => Err(OverlayError::MissingWindow),
        }
    }

    /// 将初始的显示区域写入 imgui
    pub fn attach(&self, io: &mut imgui::Io) {
        io.display_size = self.display_size();
        io.display_framebuffer_scale = self.framebuffer_scale();
        log::info!(
            "overlay input backend {:?}: display size {:?}, framebuffer scale {:?}",
            self.kind(),
            io.display_size,
            io.display_framebuffer_scale
        );
    }
}

// getters
impl InputBackend {
    pub fn kind(&self) -> InputBackendKind {
        match self {
            Self::Desktop { .. } => InputBackendKind::Desktop,
            Self::Mobile { .. } => InputBackendKind::Mobile,
            Self::Headless { .. } => InputBackendKind::Headless,
        }
    }

    /// imgui 的显示区域大小，和控件坐标使用同一个单位
    pub fn display_size(&self) -> [f32; 2] {
        match self {
            Self::Desktop { window } => window.logical_size(),
            Self::Mobile { window } => {
                let [width, height] = window.inner_size();
                [width as f32, height as f32]
            }
            Self::Headless { display_size } => *display_size,
        }
    }

    pub fn framebuffer_scale(&self) -> [f32; 2] {
        match self {
            Self::Desktop { window } => {
                let scale = window.scale_factor() as f32;
                [scale, scale]
            }
            Self::Mobile { .. } | Self::Headless { .. } => [1.0, 1.0],
        }
    }
}

// phase
impl InputBackend {
    /// 每帧开始前调用：桌面和移动端从窗口读取当前大小，无窗口时写入配置中的大小
    pub fn prepare_frame(&self, io: &mut imgui::Io) {
        io.display_size = self.display_size();
        io.display_framebuffer_scale = self.framebuffer_scale();
    }

    pub fn handle_event(&self, io: &mut imgui::Io, event: &InputEvent) {
        // 无窗口时显示区域始终是配置中的大小
        if let Self::Headless { .. } = self {
            if event.is_pointer() || matches!(event, InputEvent::Resized { .. }) {
                return;
            }
        }

        match event {
            InputEvent::KeyboardInput { key_code, state, text } => {
                if let Some(key) = Self::key_to_imgui(*key_code) {
                    io.add_key_event(key, *state == ElementState::Pressed);
                }
                if let Some(text) = text {
                    text.chars().filter(|c| !c.is_control()).for_each(|c| io.add_input_character(c));
                }
            }
            InputEvent::ModifiersChanged(modifiers) => Self::update_modifiers(io, *modifiers),
            InputEvent::MouseMoved { physical_position } => {
                io.add_mouse_pos_event(self.to_display_position(*physical_position));
            }
            InputEvent::CursorLeft => {
                io.add_mouse_pos_event([-f32::MAX, -f32::MAX]);
            }
            InputEvent::MouseButtonInput { button, state } => {
                if let Some(button) = Self::button_to_imgui(*button) {
                    io.add_mouse_button_event(button, *state == ElementState::Pressed);
                }
            }
            InputEvent::MouseWheel { delta_x, delta_y } => {
                io.add_mouse_wheel_event([*delta_x, *delta_y]);
            }
            InputEvent::Touch {
                phase,
                physical_position,
            } => {
                // 桌面端的触摸由系统转换为鼠标事件
                if let Self::Mobile { .. } = self {
                    io.add_mouse_pos_event(self.to_display_position(*physical_position));
                    match phase {
                        TouchPhase::Started => io.add_mouse_button_event(imgui::MouseButton::Left, true),
                        TouchPhase::Ended | TouchPhase::Cancelled => {
                            io.add_mouse_button_event(imgui::MouseButton::Left, false)
                        }
                        TouchPhase::Moved => {}
                    }
                }
            }
            InputEvent::Focused(focused) => unsafe {
                imgui::sys::ImGuiIO_AddFocusEvent(io as *mut imgui::Io as *mut imgui::sys::ImGuiIO, *focused);
            },
            InputEvent::Resized { .. } => {
                // 桌面和移动端以窗口的实时大小为准
                io.display_size = self.display_size();
            }
            InputEvent::Other => {}
        }
    }

    /// 释放窗口，之后退化为无窗口模式
    pub fn shutdown(&mut self) {
        if let Self::Desktop { .. } | Self::Mobile { .. } = self {
            log::info!("overlay input backend {:?} shut down", self.kind());
            *self = Self::Headless {
                display_size: self.display_size(),
            };
        }
    }
}

// tools
impl InputBackend {
    /// 物理像素坐标转换为 imgui 使用的坐标
    pub fn to_display_position(&self, physical_position: [f64; 2]) -> [f32; 2] {
        match self {
            Self::Desktop { window } => {
                let scale = window.scale_factor().max(f64::MIN_POSITIVE);
                [(physical_position[0] / scale) as f32, (physical_position[1] / scale) as f32]
            }
            Self::Mobile { .. } | Self::Headless { .. } => {
                [physical_position[0] as f32, physical_position[1] as f32]
            }
        }
    }

    fn update_modifiers(io: &mut imgui::Io, modifiers: Modifiers) {
        io.add_key_event(imgui::Key::ModShift, modifiers.shift);
        io.add_key_event(imgui::Key::ModCtrl, modifiers.ctrl);
        io.add_key_event(imgui::Key::ModAlt, modifiers.alt);
        io.add_key_event(imgui::Key::ModSuper, modifiers.logo);
    }

    fn button_to_imgui(button: MouseButton) -> Option<imgui::MouseButton> {
        match button {
            MouseButton::Left => Some(imgui::MouseButton::Left),
            MouseButton::Right => Some(imgui::MouseButton::Right),
            MouseButton::Middle => Some(imgui::MouseButton::Middle),
            MouseButton::Back => Some(imgui::MouseButton::Extra1),
            MouseButton::Forward => Some(imgui::MouseButton::Extra2),
            MouseButton::Other(_) => None,
        }
    }

    fn key_to_imgui(key_code: KeyCode) -> Option<imgui::Key> {
        let key = match key_code {
            KeyCode::Tab => imgui::Key::Tab,
            KeyCode::ArrowLeft => imgui::Key::LeftArrow,
            KeyCode::ArrowRight => imgui::Key::RightArrow,
            KeyCode::ArrowUp => imgui::Key::UpArrow,
            KeyCode::ArrowDown => imgui::Key::DownArrow,
            KeyCode::PageUp => imgui::Key::PageUp,
            KeyCode::PageDown => imgui::Key::PageDown,
            KeyCode::Home => imgui::Key::Home,
            KeyCode::End => imgui::Key::End,
            KeyCode::Delete => imgui::Key::Delete,
            KeyCode::Backspace => imgui::Key::Backspace,
            KeyCode::Space => imgui::Key::Space,
            KeyCode::Enter => imgui::Key::Enter,
            KeyCode::Escape => imgui::Key::Escape,
            KeyCode::KeyA => imgui::Key::A,
            KeyCode::KeyC => imgui::Key::C,
            KeyCode::KeyV => imgui::Key::V,
            KeyCode::KeyX => imgui::Key::X,
            KeyCode::KeyY => imgui::Key::Y,
            KeyCode::KeyZ => imgui::Key::Z,
            KeyCode::Other => return None,
        };
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeWindow, test_lock};
    use proptest::prelude::*;

    fn windowed_config() -> OverlayConfig {
        OverlayConfig::default()
    }

    fn imgui_context(display_size: [f32; 2]) -> imgui::Context {
        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);
        imgui.fonts().build_rgba32_texture();
        imgui.io_mut().display_size = display_size;
        imgui
    }

    #[test]
    fn test_headless_uses_config_size() {
        let backend = InputBackend::new(PlatformWindowHandle::None, &OverlayConfig::headless(640, 480)).unwrap();

        assert_eq!(backend.kind(), InputBackendKind::Headless);
        assert_eq!(backend.display_size(), [640.0, 480.0]);
        assert_eq!(backend.framebuffer_scale(), [1.0, 1.0]);
    }

    #[test]
    fn test_headless_ignores_given_window() {
        let window = PlatformWindowHandle::desktop(FakeWindow::new([800, 600], 2.0));
        let backend = InputBackend::new(window, &OverlayConfig::headless(320, 200)).unwrap();
        assert_eq!(backend.kind(), InputBackendKind::Headless);
    }

    #[test]
    fn test_windowed_without_window_fails() {
        let result = InputBackend::new(PlatformWindowHandle::None, &windowed_config());
        assert!(matches!(result, Err(OverlayError::MissingWindow)));
    }

    #[test]
    fn test_desktop_uses_logical_size() {
        let window = PlatformWindowHandle::desktop(FakeWindow::new([2560, 1440], 2.0));
        let backend = InputBackend::new(window, &windowed_config()).unwrap();

        assert_eq!(backend.kind(), InputBackendKind::Desktop);
        assert_eq!(backend.display_size(), [1280.0, 720.0]);
        assert_eq!(backend.framebuffer_scale(), [2.0, 2.0]);
        assert_eq!(backend.to_display_position([200.0, 100.0]), [100.0, 50.0]);
    }

    #[test]
    fn test_mobile_uses_physical_size() {
        let window = PlatformWindowHandle::mobile(FakeWindow::new([1080, 2340], 3.0));
        let backend = InputBackend::new(window, &windowed_config()).unwrap();

        assert_eq!(backend.kind(), InputBackendKind::Mobile);
        assert_eq!(backend.display_size(), [1080.0, 2340.0]);
        assert_eq!(backend.framebuffer_scale(), [1.0, 1.0]);
        assert_eq!(backend.to_display_position([200.0, 100.0]), [200.0, 100.0]);
    }

    #[test]
    fn test_shutdown_releases_window() {
        let window = Rc::new(FakeWindow::new([800, 600], 1.0));
        let handle = PlatformWindowHandle::Desktop(window.clone());
        let mut backend = InputBackend::new(handle, &windowed_config()).unwrap();
        assert_eq!(Rc::strong_count(&window), 2);

        backend.shutdown();
        assert_eq!(backend.kind(), InputBackendKind::Headless);
        assert_eq!(backend.display_size(), [800.0, 600.0]);
        assert_eq!(Rc::strong_count(&window), 1);
    }

    #[test]
    fn test_headless_ignores_resize_and_pointer() {
        let _guard = test_lock();
        let mut imgui = imgui_context([640.0, 480.0]);
        let backend = InputBackend::new(PlatformWindowHandle::None, &OverlayConfig::headless(640, 480)).unwrap();

        backend.handle_event(
            imgui.io_mut(),
            &InputEvent::Resized {
                physical_width: 1024,
                physical_height: 768,
            },
        );
        backend.handle_event(
            imgui.io_mut(),
            &InputEvent::MouseButtonInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
            },
        );
        backend.prepare_frame(imgui.io_mut());

        assert_eq!(backend.display_size(), [640.0, 480.0]);
        assert_eq!(imgui.io().display_size, [640.0, 480.0]);
        assert!(!imgui.new_frame().is_mouse_down(imgui::MouseButton::Left));
        imgui.render();
    }

    #[test]
    fn test_focus_loss_releases_keys() {
        let _guard = test_lock();
        let mut imgui = imgui_context([640.0, 480.0]);
        let backend = InputBackend::new(PlatformWindowHandle::None, &OverlayConfig::headless(640, 480)).unwrap();

        backend.handle_event(
            imgui.io_mut(),
            &InputEvent::KeyboardInput {
                key_code: KeyCode::Space,
                state: ElementState::Pressed,
                text: None,
            },
        );
        assert!(imgui.new_frame().is_key_down(imgui::Key::Space));
        imgui.render();

        backend.handle_event(imgui.io_mut(), &InputEvent::Focused(false));
        assert!(!imgui.new_frame().is_key_down(imgui::Key::Space));
        imgui.render();
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(InputBackend::key_to_imgui(KeyCode::ArrowLeft), Some(imgui::Key::LeftArrow));
        assert_eq!(InputBackend::key_to_imgui(KeyCode::KeyC), Some(imgui::Key::C));
        assert_eq!(InputBackend::key_to_imgui(KeyCode::Other), None);
        assert_eq!(InputBackend::button_to_imgui(MouseButton::Other(7)), None);
    }

    proptest! {
        #[test]
        fn prop_display_position_scales_back(
            x in 0.0f64..8192.0,
            y in 0.0f64..8192.0,
            scale in 0.5f64..4.0,
        ) {
            let window = PlatformWindowHandle::desktop(FakeWindow::new([3840, 2160], scale));
            let backend = InputBackend::new(window, &windowed_config()).unwrap();

            let [lx, ly] = backend.to_display_position([x, y]);
            prop_assert!((lx as f64 * scale - x).abs() < 1e-2);
            prop_assert!((ly as f64 * scale - y).abs() < 1e-2);
        }
    }
}
