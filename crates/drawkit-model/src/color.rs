//! 颜色与线型
//!
//! 颜色除 RGB 值外还有两个特殊取值：ByLayer（跟随图层）和 ByBlock（跟随块）。

use serde::{Deserialize, Serialize};

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从十六进制值创建（如 0xFF0000 表示红色）
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    /// 0xRRGGBB 形式的 RGB 值
    pub const fn to_hex(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    // 预定义颜色（AutoCAD ACI颜色兼容）
    pub const RED: Color = Color::new(255, 0, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// 颜色跟随图层（ByLayer）
    pub const BY_LAYER: Color = Color::with_alpha(0, 0, 0, 0);

    /// 颜色跟随块（ByBlock）
    pub const BY_BLOCK: Color = Color::with_alpha(0, 0, 0, 1);

    /// ACI 索引 1~7 对应的标准颜色，0 为 ByBlock，256 为 ByLayer
    pub fn from_aci(index: u16) -> Option<Self> {
        match index {
            0 => Some(Self::BY_BLOCK),
            1 => Some(Self::RED),
            2 => Some(Self::YELLOW),
            3 => Some(Self::GREEN),
            4 => Some(Self::CYAN),
            5 => Some(Self::BLUE),
            6 => Some(Self::MAGENTA),
            7 => Some(Self::WHITE),
            256 => Some(Self::BY_LAYER),
            _ => None,
        }
    }

    pub fn is_by_layer(&self) -> bool {
        self.a == 0
    }

    pub fn is_by_block(&self) -> bool {
        self.a == 1 && self.r == 0 && self.g == 0 && self.b == 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BY_LAYER
    }
}

/// 线型
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum LineType {
    /// 连续线（实线）
    Continuous,
    /// 虚线
    Dashed,
    /// 点划线
    DashDot,
    /// 中心线
    Center,
    /// 隐藏线
    Hidden,
    /// 按名称引用的线型
    Named(String),
    /// 跟随图层
    #[default]
    ByLayer,
    /// 跟随块
    ByBlock,
}

impl LineType {
    /// 线型模式（正数表示画线，负数表示空白）
    pub fn pattern(&self) -> Vec<f64> {
        match self {
            LineType::Dashed => vec![12.0, -6.0],
            LineType::DashDot => vec![12.0, -6.0, 0.0, -6.0],
            LineType::Center => vec![32.0, -6.0, 6.0, -6.0],
            LineType::Hidden => vec![6.0, -3.0],
            _ => vec![],
        }
    }

    /// 按 DXF 线型名解析，未知名称保留为 [`LineType::Named`]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "CONTINUOUS" => LineType::Continuous,
            "DASHED" => LineType::Dashed,
            "DASHDOT" => LineType::DashDot,
            "CENTER" => LineType::Center,
            "HIDDEN" => LineType::Hidden,
            "BYLAYER" | "" => LineType::ByLayer,
            "BYBLOCK" => LineType::ByBlock,
            _ => LineType::Named(name.to_string()),
        }
    }
}
