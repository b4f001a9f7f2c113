use glam::Vec3;
use imgui::TextureId;
use imgui::sys::{ImVec2, ImVec4};
use std::ffi::CString;

use super::OverlayGuiAdapter;

/// 字符串中间的 `\0` 之后的内容会被截断
fn to_cstring(text: &str) -> CString {
    let text = text.split('\0').next().unwrap_or_default();
    CString::new(text).unwrap_or_default()
}

#[inline]
fn im_vec2(x: f32, y: f32) -> ImVec2 {
    ImVec2 { x, y }
}

// 控件：直接转发给 imgui，不能构建控件时原样返回输入
impl OverlayGuiAdapter {
    /// 开始一个 panel，坐标和大小都是相对于参考大小的比例，只在第一次出现时生效
    pub fn begin_panel(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        if !self.building() {
            return;
        }
        self.is_empty = false;

        let name = to_cstring(name);
        unsafe {
            imgui::sys::igSetNextWindowPos(
                im_vec2(self.abs_x(x), self.abs_y(y)),
                imgui::sys::ImGuiCond_Once as _,
                im_vec2(0.0, 0.0),
            );
            imgui::sys::igSetNextWindowSize(
                im_vec2(self.abs_x(width), self.abs_y(height)),
                imgui::sys::ImGuiCond_Once as _,
            );
            // 折叠时 igBegin 返回 false，但仍然需要 igEnd
            imgui::sys::igBegin(name.as_ptr(), std::ptr::null_mut(), 0);
        }
        self.open_panels += 1;
    }

    pub fn end_panel(&mut self) {
        if !self.building() || self.open_panels == 0 {
            return;
        }
        unsafe { imgui::sys::igEnd() };
        self.open_panels -= 1;
    }

    pub fn text(&mut self, text: &str) {
        if !self.building() {
            return;
        }
        let text = to_cstring(text);
        unsafe { imgui::sys::igTextUnformatted(text.as_ptr(), std::ptr::null()) };
    }

    pub fn text_colored(&mut self, text: &str, color: Vec3) {
        if !self.building() {
            return;
        }
        let text = to_cstring(text);
        unsafe {
            imgui::sys::igPushStyleColor_Vec4(
                imgui::sys::ImGuiCol_Text as _,
                ImVec4 {
                    x: color.x,
                    y: color.y,
                    z: color.z,
                    w: 1.0,
                },
            );
            imgui::sys::igTextUnformatted(text.as_ptr(), std::ptr::null());
            imgui::sys::igPopStyleColor(1);
        }
    }

    pub fn checkbox(&mut self, name: &str, value: bool) -> bool {
        if !self.building() {
            return value;
        }
        let name = to_cstring(name);
        let mut value = value;
        unsafe { imgui::sys::igCheckbox(name.as_ptr(), &mut value) };
        value
    }

    pub fn slider_int(&mut self, name: &str, value: i32, min: i32, max: i32) -> i32 {
        if !self.building() {
            return value;
        }
        let name = to_cstring(name);
        let mut value = value;
        unsafe { imgui::sys::igSliderInt(name.as_ptr(), &mut value, min, max, c"%d".as_ptr(), 0) };
        value
    }

    pub fn slider_float(&mut self, name: &str, value: f32, min: f32, max: f32) -> f32 {
        if !self.building() {
            return value;
        }
        let name = to_cstring(name);
        let mut value = value;
        unsafe { imgui::sys::igSliderFloat(name.as_ptr(), &mut value, min, max, c"%.3f".as_ptr(), 0) };
        value
    }

    pub fn color_edit_3(&mut self, name: &str, color: Vec3) -> Vec3 {
        if !self.building() {
            return color;
        }
        let name = to_cstring(name);
        let mut rgb = color.to_array();
        unsafe { imgui::sys::igColorEdit3(name.as_ptr(), rgb.as_mut_ptr(), 0) };
        Vec3::from_array(rgb)
    }

    pub fn button(&mut self, label: &str) -> bool {
        if !self.building() {
            return false;
        }
        let label = to_cstring(label);
        unsafe { imgui::sys::igButton(label.as_ptr(), im_vec2(0.0, 0.0)) }
    }

    /// 显示 [`Self::add_texture`] 注册的纹理，大小是相对于参考大小的比例
    pub fn image(&mut self, texture_id: TextureId, width: f32, height: f32) {
        if !self.building() {
            return;
        }
        unsafe {
            imgui::sys::igImage(
                texture_id.id() as imgui::sys::ImTextureID,
                im_vec2(self.abs_x(width), self.abs_y(height)),
                im_vec2(0.0, 0.0),
                im_vec2(1.0, 1.0),
                ImVec4 {
                    x: 1.0,
                    y: 1.0,
                    z: 1.0,
                    w: 1.0,
                },
                ImVec4 {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 0.0,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_nul_truncates() {
        assert_eq!(to_cstring("fps\0hidden").to_str().unwrap(), "fps");
        assert_eq!(to_cstring("").to_str().unwrap(), "");
        assert_eq!(to_cstring("plain").to_str().unwrap(), "plain");
    }
}
