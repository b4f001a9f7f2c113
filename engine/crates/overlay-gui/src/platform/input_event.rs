// 参考 winit::MouseButton
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

// 参考 winit::ElementState
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum ElementState {
    Pressed,
    Released,
}

// 参考 winit::TouchPhase
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// imgui 控件会用到的按键，参考 winit::KeyCode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyCode {
    Tab,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    Delete,
    Backspace,
    Space,
    Enter,
    Escape,
    KeyA,
    KeyC,
    KeyV,
    KeyX,
    KeyY,
    KeyZ,

    Other,
}

#[derive(Debug, Default, Hash, PartialEq, Eq, Clone, Copy)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

/// 输入事件类型
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// 键盘按键事件，`text` 是按下时产生的字符
    KeyboardInput {
        key_code: KeyCode,
        state: ElementState,
        text: Option<String>,
    },
    ModifiersChanged(Modifiers),
    /// 鼠标按键事件
    MouseButtonInput {
        button: MouseButton,
        state: ElementState,
    },
    /// 鼠标移动事件
    MouseMoved {
        physical_position: [f64; 2],
    },
    /// 鼠标离开窗口
    CursorLeft,
    /// 鼠标滚轮事件，单位为行
    MouseWheel {
        delta_x: f32,
        delta_y: f32,
    },
    /// 触摸事件，只处理单点
    Touch {
        phase: TouchPhase,
        physical_position: [f64; 2],
    },
    Focused(bool),
    /// 窗口大小改变事件
    Resized {
        physical_width: u32,
        physical_height: u32,
    },

    Other,
}

impl InputEvent {
    /// 鼠标和触摸相关的事件
    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::MouseButtonInput { .. }
                | Self::MouseMoved { .. }
                | Self::CursorLeft
                | Self::MouseWheel { .. }
                | Self::Touch { .. }
        )
    }
}
