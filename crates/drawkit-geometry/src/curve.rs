//! 曲线抽象
//!
//! 二维/三维曲线的公共接口，以及延迟计算的包围盒缓存。

use std::cell::Cell;

use crate::math::{BoundingBox2, BoundingBox3, Point2, Point3};
use crate::matrix::Matrix4;
use crate::transform::Transform2D;

/// 延迟计算的包围盒
///
/// 修改几何的操作调用 [`BoundsCache::invalidate`]，下一次读取时重新计算。
#[derive(Debug, Clone, Default)]
pub struct BoundsCache<B: Copy> {
    value: Cell<Option<B>>,
}

impl<B: Copy> BoundsCache<B> {
    pub fn new() -> Self {
        Self {
            value: Cell::new(None),
        }
    }

    /// 读取缓存，缺失时用 `compute` 计算并保存
    pub fn get_or_compute(&self, compute: impl FnOnce() -> B) -> B {
        match self.value.get() {
            Some(value) => value,
            None => {
                let value = compute();
                self.value.set(Some(value));
                value
            }
        }
    }

    /// 标记为过期
    pub fn invalidate(&self) {
        self.value.set(None);
    }

    /// 是否需要重新计算
    pub fn is_stale(&self) -> bool {
        self.value.get().is_none()
    }
}

// 缓存不参与曲线的相等比较
impl<B: Copy> PartialEq for BoundsCache<B> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// 二维曲线
pub trait Curve2d {
    /// 曲线长度
    fn length(&self) -> f64;

    /// 包围盒（延迟计算）
    fn bounding_box(&self) -> BoundingBox2;

    fn start_point(&self) -> Point2;

    fn end_point(&self) -> Point2;

    /// 起点与终点是否重合
    fn closed(&self) -> bool;

    /// 离散为 `num_points` 段的折线
    fn get_points(&self, num_points: usize) -> Vec<Point2>;

    /// 原地变换
    fn transform(&mut self, transform: &Transform2D) -> &mut Self;
}

/// 三维曲线
pub trait Curve3d {
    fn length(&self) -> f64;

    fn bounding_box(&self) -> BoundingBox3;

    fn start_point(&self) -> Point3;

    fn end_point(&self) -> Point3;

    fn closed(&self) -> bool;

    fn get_points(&self, num_points: usize) -> Vec<Point3>;

    fn transform(&mut self, matrix: &Matrix4) -> &mut Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_cache() {
        let cache: BoundsCache<BoundingBox2> = BoundsCache::new();
        assert!(cache.is_stale());

        let mut calls = 0;
        let b = BoundingBox2::from_points([Point2::new(1.0, 2.0)]);
        cache.get_or_compute(|| {
            calls += 1;
            b
        });
        cache.get_or_compute(|| {
            calls += 1;
            b
        });
        assert_eq!(calls, 1);

        cache.invalidate();
        assert!(cache.is_stale());
    }
}
