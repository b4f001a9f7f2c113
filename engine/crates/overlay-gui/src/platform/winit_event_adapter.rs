use winit::event::{KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::platform::input_event::{ElementState, InputEvent, KeyCode, Modifiers, MouseButton, TouchPhase};

/// 将 winit 的窗口事件转换为 overlay 的输入事件
pub struct WinitEventAdapter {}
impl WinitEventAdapter {
    pub fn from_winit_event(event: &WindowEvent) -> InputEvent {
        match event {
            WindowEvent::CursorMoved { position, .. } => InputEvent::MouseMoved {
                physical_position: [position.x, position.y],
            },
            WindowEvent::CursorLeft { .. } => InputEvent::CursorLeft,
            WindowEvent::MouseWheel { delta, .. } => {
                let (delta_x, delta_y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => ((pos.x / 100.0) as f32, (pos.y / 100.0) as f32),
                };
                InputEvent::MouseWheel { delta_x, delta_y }
            }
            WindowEvent::MouseInput { state, button, .. } => InputEvent::MouseButtonInput {
                button: Self::button_from_winit(*button),
                state: Self::state_from_winit(*state),
            },
            WindowEvent::KeyboardInput { event, .. } => {
                let KeyEvent {
                    physical_key,
                    state,
                    text,
                    ..
                } = event;
                let key_code = match physical_key {
                    PhysicalKey::Code(key_code) => Self::key_from_winit(*key_code),
                    PhysicalKey::Unidentified(_) => KeyCode::Other,
                };
                let state = Self::state_from_winit(*state);
                InputEvent::KeyboardInput {
                    key_code,
                    state,
                    text: text
                        .as_ref()
                        .filter(|_| state == ElementState::Pressed)
                        .map(|text| text.to_string()),
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                InputEvent::ModifiersChanged(Modifiers {
                    shift: state.shift_key(),
                    ctrl: state.control_key(),
                    alt: state.alt_key(),
                    logo: state.super_key(),
                })
            }
            WindowEvent::Touch(touch) => InputEvent::Touch {
                phase: Self::touch_phase_from_winit(touch.phase),
                physical_position: [touch.location.x, touch.location.y],
            },
            WindowEvent::Focused(focused) => InputEvent::Focused(*focused),
            WindowEvent::Resized(physical_size) => InputEvent::Resized {
                physical_width: physical_size.width,
                physical_height: physical_size.height,
            },
            _ => InputEvent::Other,
        }
    }

    fn button_from_winit(button: winit::event::MouseButton) -> MouseButton {
        match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            winit::event::MouseButton::Back => MouseButton::Back,
            winit::event::MouseButton::Forward => MouseButton::Forward,
            winit::event::MouseButton::Other(code) => MouseButton::Other(code),
        }
    }

    fn key_from_winit(key: winit::keyboard::KeyCode) -> KeyCode {
        use winit::keyboard::KeyCode as WinitKey;
        match key {
            WinitKey::Tab => KeyCode::Tab,
            WinitKey::ArrowLeft => KeyCode::ArrowLeft,
            WinitKey::ArrowRight => KeyCode::ArrowRight,
            WinitKey::ArrowUp => KeyCode::ArrowUp,
            WinitKey::ArrowDown => KeyCode::ArrowDown,
            WinitKey::PageUp => KeyCode::PageUp,
            WinitKey::PageDown => KeyCode::PageDown,
            WinitKey::Home => KeyCode::Home,
            WinitKey::End => KeyCode::End,
            WinitKey::Delete => KeyCode::Delete,
            WinitKey::Backspace => KeyCode::Backspace,
            WinitKey::Space => KeyCode::Space,
            WinitKey::Enter | WinitKey::NumpadEnter => KeyCode::Enter,
            WinitKey::Escape => KeyCode::Escape,
            WinitKey::KeyA => KeyCode::KeyA,
            WinitKey::KeyC => KeyCode::KeyC,
            WinitKey::KeyV => KeyCode::KeyV,
            WinitKey::KeyX => KeyCode::KeyX,
            WinitKey::KeyY => KeyCode::KeyY,
            WinitKey::KeyZ => KeyCode::KeyZ,
            _ => KeyCode::Other,
        }
    }

    fn state_from_winit(state: winit::event::ElementState) -> ElementState {
        match state {
            winit::event::ElementState::Pressed => ElementState::Pressed,
            winit::event::ElementState::Released => ElementState::Released,
        }
    }

    fn touch_phase_from_winit(phase: winit::event::TouchPhase) -> TouchPhase {
        match phase {
            winit::event::TouchPhase::Started => TouchPhase::Started,
            winit::event::TouchPhase::Moved => TouchPhase::Moved,
            winit::event::TouchPhase::Ended => TouchPhase::Ended,
            winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn test_resized_keeps_physical_size() {
        let event = WindowEvent::Resized(PhysicalSize::new(1920, 1080));
        assert_eq!(
            WinitEventAdapter::from_winit_event(&event),
            InputEvent::Resized {
                physical_width: 1920,
                physical_height: 1080
            }
        );
    }

    #[test]
    fn test_focus_and_unhandled_events() {
        assert_eq!(WinitEventAdapter::from_winit_event(&WindowEvent::Focused(false)), InputEvent::Focused(false));
        assert_eq!(WinitEventAdapter::from_winit_event(&WindowEvent::CloseRequested), InputEvent::Other);
    }

    #[test]
    fn test_key_mapping_covers_widget_keys() {
        assert_eq!(WinitEventAdapter::key_from_winit(winit::keyboard::KeyCode::NumpadEnter), KeyCode::Enter);
        assert_eq!(WinitEventAdapter::key_from_winit(winit::keyboard::KeyCode::KeyZ), KeyCode::KeyZ);
        assert_eq!(WinitEventAdapter::key_from_winit(winit::keyboard::KeyCode::F1), KeyCode::Other);
    }
}
