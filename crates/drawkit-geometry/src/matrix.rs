//! 4x4 齐次变换矩阵
//!
//! 对 `nalgebra::Matrix4<f64>` 的封装，存储为列主序的 16 个元素，
//! 在其上补充 CAD 常用操作：位置/旋转/缩放的组合与分解、拉伸方向坐标系等。
//!
//! 注意：
//! - [`Matrix4::invert`] 在行列式恰好为 0 时返回全零矩阵而不是报错，
//!   需要区分时请先检查 [`Matrix4::determinant`]。
//! - [`Matrix4::decompose`] 假设矩阵由 [`Matrix4::compose`] 产生，含剪切的矩阵分解结果是有损的。

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::math::{Point3, Vector3};
use crate::quaternion::Quaternion;

/// 判断法向是否为 +Z 时使用的容差
const AXIS_TOLERANCE: f64 = 1e-6;

/// 任意轴算法的阈值
const ARBITRARY_AXIS_LIMIT: f64 = 1.0 / 64.0;

/// 4x4 齐次变换矩阵（列主序）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(na::Matrix4<f64>);

impl Matrix4 {
    /// 单位矩阵
    pub fn identity() -> Self {
        Self(na::Matrix4::identity())
    }

    /// 全零矩阵
    pub fn zero() -> Self {
        Self(na::Matrix4::zeros())
    }

    /// 按行主序给出 16 个元素创建矩阵
    #[rustfmt::skip]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n11: f64, n12: f64, n13: f64, n14: f64,
        n21: f64, n22: f64, n23: f64, n24: f64,
        n31: f64, n32: f64, n33: f64, n34: f64,
        n41: f64, n42: f64, n43: f64, n44: f64,
    ) -> Self {
        Self(na::Matrix4::new(
            n11, n12, n13, n14,
            n21, n22, n23, n24,
            n31, n32, n33, n34,
            n41, n42, n43, n44,
        ))
    }

    /// 从列主序数组创建
    pub fn from_array(elements: &[f64; 16]) -> Self {
        Self(na::Matrix4::from_column_slice(elements))
    }

    /// 导出为列主序数组
    pub fn to_array(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.0.as_slice());
        out
    }

    /// 列主序元素视图
    pub fn elements(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// 获取第 `row` 行第 `col` 列的元素
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.0[(row, col)] = value;
    }

    /// 后乘：`self * m`
    pub fn multiply(&self, m: &Matrix4) -> Self {
        Self(self.0 * m.0)
    }

    /// 前乘：`m * self`
    pub fn pre_multiply(&self, m: &Matrix4) -> Self {
        Self(m.0 * self.0)
    }

    pub fn multiply_scalar(&self, s: f64) -> Self {
        Self(self.0 * s)
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// 求逆，奇异矩阵（行列式为 0）返回全零矩阵
    pub fn invert(&self) -> Self {
        if self.determinant() == 0.0 {
            return Self::zero();
        }
        self.0
            .try_inverse()
            .map(Self)
            .unwrap_or_else(Self::zero)
    }

    /// 平移矩阵
    #[rustfmt::skip]
    pub fn make_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(
            1.0, 0.0, 0.0, x,
            0.0, 1.0, 0.0, y,
            0.0, 0.0, 1.0, z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn make_rotation_x(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn make_rotation_y(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn make_rotation_z(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 绕任意单位轴旋转
    #[rustfmt::skip]
    pub fn make_rotation_axis(axis: &Vector3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let (tx, ty) = (t * x, t * y);
        Self::new(
            tx * x + c, tx * y - s * z, tx * z + s * y, 0.0,
            tx * y + s * z, ty * y + c, ty * z - s * x, 0.0,
            tx * z - s * y, ty * z + s * x, t * z * z + c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 纯旋转矩阵
    pub fn make_rotation_from_quaternion(q: &Quaternion) -> Self {
        Self::compose(&Vector3::zeros(), q, &Vector3::new(1.0, 1.0, 1.0))
    }

    #[rustfmt::skip]
    pub fn make_scale(x: f64, y: f64, z: f64) -> Self {
        Self::new(
            x, 0.0, 0.0, 0.0,
            0.0, y, 0.0, 0.0,
            0.0, 0.0, z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 以三个基向量为列构造矩阵
    #[rustfmt::skip]
    pub fn make_basis(x_axis: &Vector3, y_axis: &Vector3, z_axis: &Vector3) -> Self {
        Self::new(
            x_axis.x, y_axis.x, z_axis.x, 0.0,
            x_axis.y, y_axis.y, z_axis.y, 0.0,
            x_axis.z, y_axis.z, z_axis.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 取出前三列作为基向量
    pub fn extract_basis(&self) -> (Vector3, Vector3, Vector3) {
        (self.column(0), self.column(1), self.column(2))
    }

    fn column(&self, index: usize) -> Vector3 {
        Vector3::new(self.get(0, index), self.get(1, index), self.get(2, index))
    }

    /// 设置平移分量
    pub fn set_position(&mut self, position: &Vector3) {
        self.set(0, 3, position.x);
        self.set(1, 3, position.y);
        self.set(2, 3, position.z);
    }

    /// 取出平移分量
    pub fn position(&self) -> Vector3 {
        self.column(3)
    }

    /// 三个轴上的最大缩放系数
    pub fn max_scale_on_axis(&self) -> f64 {
        let (x, y, z) = self.extract_basis();
        x.norm_squared()
            .max(y.norm_squared())
            .max(z.norm_squared())
            .sqrt()
    }

    /// 由平移、旋转、缩放组合变换矩阵（等价于 T * R * S）
    pub fn compose(position: &Vector3, quaternion: &Quaternion, scale: &Vector3) -> Self {
        let (x, y, z, w) = (quaternion.x, quaternion.y, quaternion.z, quaternion.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        let (sx, sy, sz) = (scale.x, scale.y, scale.z);

        #[rustfmt::skip]
        let m = Self::new(
            (1.0 - (yy + zz)) * sx, (xy - wz) * sy, (xz + wy) * sz, position.x,
            (xy + wz) * sx, (1.0 - (xx + zz)) * sy, (yz - wx) * sz, position.y,
            (xz - wy) * sx, (yz + wx) * sy, (1.0 - (xx + yy)) * sz, position.z,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// 分解为平移、旋转、缩放
    ///
    /// 行列式为负（含镜像）时将 X 方向缩放取负。
    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        let (cx, cy, cz) = self.extract_basis();
        let mut sx = cx.norm();
        let sy = cy.norm();
        let sz = cz.norm();

        if self.determinant() < 0.0 {
            sx = -sx;
        }

        let rotation = Self::make_basis(&(cx / sx), &(cy / sy), &(cz / sz));
        let quaternion = Quaternion::from_rotation_matrix(&rotation);

        (self.position(), quaternion, Vector3::new(sx, sy, sz))
    }

    /// 由拉伸方向（OCS 法向）生成坐标系变换
    ///
    /// 采用 DXF 任意轴算法；法向为 +Z 时返回单位矩阵。
    pub fn from_extrusion_direction(extrusion: &Vector3) -> Self {
        let normal = extrusion.normalize();
        if (normal - Vector3::z()).amax() <= AXIS_TOLERANCE {
            return Self::identity();
        }
        let x_axis = if normal.x.abs() < ARBITRARY_AXIS_LIMIT
            && normal.y.abs() < ARBITRARY_AXIS_LIMIT
        {
            Vector3::y().cross(&normal).normalize()
        } else {
            Vector3::z().cross(&normal).normalize()
        };
        let y_axis = normal.cross(&x_axis).normalize();
        Self::make_basis(&x_axis, &y_axis, &normal)
    }

    /// 变换点（含透视除法）
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        let m = &self.0;
        let w = m[(3, 0)] * p.x + m[(3, 1)] * p.y + m[(3, 2)] * p.z + m[(3, 3)];
        let w = if w == 0.0 { 1.0 } else { 1.0 / w };
        Point3::new(
            (m[(0, 0)] * p.x + m[(0, 1)] * p.y + m[(0, 2)] * p.z + m[(0, 3)]) * w,
            (m[(1, 0)] * p.x + m[(1, 1)] * p.y + m[(1, 2)] * p.z + m[(1, 3)]) * w,
            (m[(2, 0)] * p.x + m[(2, 1)] * p.y + m[(2, 2)] * p.z + m[(2, 3)]) * w,
        )
    }

    /// 变换向量（忽略平移）
    pub fn transform_vector(&self, v: &Vector3) -> Vector3 {
        self.0.fixed_view::<3, 3>(0, 0) * v
    }

    /// 逐元素在容差内相等
    pub fn equals(&self, other: &Matrix4, tol: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}
