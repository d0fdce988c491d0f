//! 四元数与欧拉角
//!
//! 仅用于表示旋转（单位四元数），矩阵组合/分解见 [`crate::matrix`]。

use serde::{Deserialize, Serialize};

use crate::math::Vector3;
use crate::matrix::Matrix4;

/// 欧拉角（弧度，XYZ 内旋顺序）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// 旋转四元数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// 单位四元数（无旋转）
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// 由旋转轴与角度创建，`axis` 需为单位向量
    pub fn from_axis_angle(axis: &Vector3, angle: f64) -> Self {
        let half = angle / 2.0;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// 绕 Z 轴旋转
    pub fn from_z_rotation(angle: f64) -> Self {
        Self::from_axis_angle(&Vector3::z(), angle)
    }

    /// 由 XYZ 顺序的欧拉角创建
    pub fn from_euler(euler: &Euler) -> Self {
        let (s1, c1) = (euler.x / 2.0).sin_cos();
        let (s2, c2) = (euler.y / 2.0).sin_cos();
        let (s3, c3) = (euler.z / 2.0).sin_cos();

        Self {
            x: s1 * c2 * c3 + c1 * s2 * s3,
            y: c1 * s2 * c3 - s1 * c2 * s3,
            z: c1 * c2 * s3 + s1 * s2 * c3,
            w: c1 * c2 * c3 - s1 * s2 * s3,
        }
    }

    /// 由纯旋转矩阵（左上 3x3 无缩放）提取四元数
    pub fn from_rotation_matrix(m: &Matrix4) -> Self {
        let (m11, m12, m13) = (m.get(0, 0), m.get(0, 1), m.get(0, 2));
        let (m21, m22, m23) = (m.get(1, 0), m.get(1, 1), m.get(1, 2));
        let (m31, m32, m33) = (m.get(2, 0), m.get(2, 1), m.get(2, 2));

        let trace = m11 + m22 + m33;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self {
                w: 0.25 / s,
                x: (m32 - m23) * s,
                y: (m13 - m31) * s,
                z: (m21 - m12) * s,
            }
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            Self {
                w: (m32 - m23) / s,
                x: 0.25 * s,
                y: (m12 + m21) / s,
                z: (m13 + m31) / s,
            }
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            Self {
                w: (m13 - m31) / s,
                x: (m12 + m21) / s,
                y: 0.25 * s,
                z: (m23 + m32) / s,
            }
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            Self {
                w: (m21 - m12) / s,
                x: (m13 + m31) / s,
                y: (m23 + m32) / s,
                z: 0.25 * s,
            }
        }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// 归一化；零四元数归一化为单位四元数
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        Self {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        }
    }

    /// 共轭（单位四元数的逆）
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Hamilton 乘积 `self * other`
    pub fn multiply(&self, other: &Self) -> Self {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (other.x, other.y, other.z, other.w);
        Self {
            x: ax * bw + aw * bx + ay * bz - az * by,
            y: ay * bw + aw * by + az * bx - ax * bz,
            z: az * bw + aw * bz + ax * by - ay * bx,
            w: aw * bw - ax * bx - ay * by - az * bz,
        }
    }

    /// 用该四元数旋转向量
    pub fn rotate_vector(&self, v: &Vector3) -> Vector3 {
        let q = Vector3::new(self.x, self.y, self.z);
        let t = 2.0 * q.cross(v);
        v + self.w * t + q.cross(&t)
    }

    /// 与另一四元数表示同一旋转（q 与 -q 等价）
    pub fn same_rotation(&self, other: &Self, tol: f64) -> bool {
        (self.dot(other).abs() - 1.0).abs() <= tol
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}
