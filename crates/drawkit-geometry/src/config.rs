//! 采样配置

use serde::{Deserialize, Serialize};

/// 曲线离散化使用的采样数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// 圆弧离散为折线时的分段数
    pub arc_segments: usize,
    /// 样条离散为折线时的采样点数
    pub spline_samples: usize,
    /// 样条弧长数值积分的采样点数
    pub length_samples: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            arc_segments: 100,
            spline_samples: 100,
            length_samples: 1000,
        }
    }
}
