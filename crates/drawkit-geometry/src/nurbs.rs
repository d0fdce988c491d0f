//! NURBS 基础算法
//!
//! 节点区间查找、基函数、有理点求值、拟合点参数化与全局插值。
//! 算法编号参考 Piegl & Tiller《The NURBS Book》。

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::Point3;

/// 由拟合点生成节点向量时的参数化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KnotParameterization {
    /// 等距参数，与点的位置无关
    #[default]
    Uniform,
    /// 按累计弦长分配参数
    Chord,
    /// 按弦长平方根分配参数（向心参数化）
    SqrtChord,
}

/// 查找参数 `u` 所在的节点区间下标（A2.1）
///
/// `num_control_points` 为控制点数量，`u` 超出定义域时夹取到首/末区间。
pub fn find_span(degree: usize, knots: &[f64], num_control_points: usize, u: f64) -> usize {
    let n = num_control_points - 1;
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// 计算区间 `span` 上非零的 `degree + 1` 个基函数值（A2.2）
pub fn basis_functions(span: usize, u: f64, degree: usize, knots: &[f64]) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { n[r] / denom };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// 有理 B 样条求值
///
/// 控制点按权重齐次化后求和，再除以权重和。
pub fn evaluate_point(
    u: f64,
    degree: usize,
    knots: &[f64],
    control_points: &[Point3],
    weights: &[f64],
) -> Point3 {
    let span = find_span(degree, knots, control_points.len(), u);
    let basis = basis_functions(span, u, degree, knots);

    let (mut x, mut y, mut z, mut w) = (0.0, 0.0, 0.0, 0.0);
    for (j, n) in basis.iter().enumerate() {
        let index = span - degree + j;
        let p = &control_points[index];
        let nw = n * weights[index];
        x += p.x * nw;
        y += p.y * nw;
        z += p.z * nw;
        w += nw;
    }

    if w == 0.0 {
        return Point3::new(x, y, z);
    }
    Point3::new(x / w, y / w, z / w)
}

/// 拟合点对应的参数值，范围 [0, 1]
///
/// 所有点重合时退化为等距参数。
pub fn fit_parameters(points: &[Point3], parameterization: KnotParameterization) -> Vec<f64> {
    let count = points.len();
    if count < 2 {
        return vec![0.0; count];
    }

    let uniform = || (0..count).map(|i| i as f64 / (count - 1) as f64).collect::<Vec<_>>();

    let distances: Vec<f64> = match parameterization {
        KnotParameterization::Uniform => return uniform(),
        KnotParameterization::Chord => points.windows(2).map(|w| (w[1] - w[0]).norm()).collect(),
        KnotParameterization::SqrtChord => points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm().sqrt())
            .collect(),
    };

    let total: f64 = distances.iter().sum();
    if total == 0.0 {
        return uniform();
    }

    let mut params = Vec::with_capacity(count);
    let mut acc = 0.0;
    params.push(0.0);
    for d in &distances[..count - 2] {
        acc += d;
        params.push(acc / total);
    }
    params.push(1.0);
    params
}

/// 由参数值取平均生成两端夹紧的节点向量（NURBS Book 式 9.8）
pub fn averaged_knots(params: &[f64], degree: usize) -> Vec<f64> {
    let n = params.len();
    let mut knots = vec![0.0; degree + 1];

    for j in 1..n.saturating_sub(degree) {
        let sum: f64 = params[j..j + degree].iter().sum();
        knots.push(sum / degree as f64);
    }

    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// 按参数化方式为拟合点生成节点向量
pub fn generate_knots(points: &[Point3], degree: usize, parameterization: KnotParameterization) -> Vec<f64> {
    averaged_knots(&fit_parameters(points, parameterization), degree)
}

/// 全局插值求控制点（A9.1）
///
/// 求解 `N(t_k) · P = Q`，得到的曲线在参数 `params[k]` 处经过 `points[k]`。
pub fn interpolate_control_points(
    points: &[Point3],
    params: &[f64],
    knots: &[f64],
    degree: usize,
) -> Result<Vec<Point3>, GeometryError> {
    let n = points.len();
    let mut a = DMatrix::<f64>::zeros(n, n);

    for (k, &t) in params.iter().enumerate() {
        let span = find_span(degree, knots, n, t);
        let basis = basis_functions(span, t, degree, knots);
        for (j, value) in basis.into_iter().enumerate() {
            a[(k, span - degree + j)] = value;
        }
    }

    let b = DMatrix::<f64>::from_fn(n, 3, |row, col| points[row][col]);
    let solution = a.lu().solve(&b).ok_or(GeometryError::SingularSystem)?;

    Ok((0..n)
        .map(|row| Point3::new(solution[(row, 0)], solution[(row, 1)], solution[(row, 2)]))
        .collect())
}

/// 有效参数域 `[knots[degree], knots[len - degree - 1]]`
pub fn parameter_domain(degree: usize, knots: &[f64]) -> (f64, f64) {
    (knots[degree], knots[knots.len() - degree - 1])
}

/// 以等距采样折线近似计算弧长
pub fn curve_length(
    degree: usize,
    knots: &[f64],
    control_points: &[Point3],
    weights: &[f64],
    samples: usize,
) -> f64 {
    let samples = samples.max(2);
    let (start, end) = parameter_domain(degree, knots);
    let step = (end - start) / (samples - 1) as f64;

    let mut length = 0.0;
    let mut prev = evaluate_point(start, degree, knots, control_points, weights);
    for i in 1..samples {
        let u = if i == samples - 1 { end } else { start + i as f64 * step };
        let p = evaluate_point(u, degree, knots, control_points, weights);
        length += (p - prev).norm();
        prev = p;
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, approx_eq_tol, points3_approx_eq};

    fn clamped_knots() -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]
    }

    #[test]
    fn test_find_span() {
        let knots = clamped_knots();
        assert_eq!(find_span(3, &knots, 5, 0.0), 3);
        assert_eq!(find_span(3, &knots, 5, 0.25), 3);
        assert_eq!(find_span(3, &knots, 5, 0.5), 4);
        assert_eq!(find_span(3, &knots, 5, 1.0), 4);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = clamped_knots();
        for u in [0.0, 0.1, 0.37, 0.5, 0.8, 1.0] {
            let span = find_span(3, &knots, 5, u);
            let sum: f64 = basis_functions(span, u, 3, &knots).iter().sum();
            assert!(approx_eq(sum, 1.0), "u = {u}, sum = {sum}");
        }
    }

    #[test]
    fn test_weights_pull_curve() {
        let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let plain = evaluate_point(0.5, 3, &knots, &points, &[1.0; 4]);
        let heavy = evaluate_point(0.5, 3, &knots, &points, &[1.0, 5.0, 5.0, 1.0]);
        assert!(heavy.y > plain.y);
    }

    #[test]
    fn test_fit_parameters() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(9.0, 0.0, 0.0),
        ];

        let uniform = fit_parameters(&points, KnotParameterization::Uniform);
        assert!(approx_eq(uniform[1], 1.0 / 3.0));

        let chord = fit_parameters(&points, KnotParameterization::Chord);
        assert!(approx_eq(chord[1], 1.0 / 9.0));
        assert!(approx_eq(chord[2], 5.0 / 9.0));
        assert_eq!(chord[3], 1.0);

        let sqrt = fit_parameters(&points, KnotParameterization::SqrtChord);
        assert!(approx_eq(sqrt[1], 1.0 / 5.0));
        assert!(approx_eq(sqrt[2], 3.0 / 5.0));
    }

    #[test]
    fn test_averaged_knots_are_clamped() {
        let params = [0.0, 0.2, 0.5, 0.7, 1.0];
        let knots = averaged_knots(&params, 3);
        assert_eq!(knots.len(), params.len() + 3 + 1);
        assert_eq!(&knots[..4], &[0.0; 4]);
        assert_eq!(&knots[5..], &[1.0; 4]);
        assert!(approx_eq(knots[4], (0.2 + 0.5 + 0.7) / 3.0));
    }

    #[test]
    fn test_interpolation_passes_through_fit_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.5),
            Point3::new(3.0, 3.0, 1.0),
            Point3::new(5.0, 1.0, 0.0),
            Point3::new(6.0, -1.0, -0.5),
        ];
        for parameterization in [
            KnotParameterization::Uniform,
            KnotParameterization::Chord,
            KnotParameterization::SqrtChord,
        ] {
            let params = fit_parameters(&points, parameterization);
            let knots = averaged_knots(&params, 3);
            let control = interpolate_control_points(&points, &params, &knots, 3).unwrap();
            let weights = vec![1.0; control.len()];
            for (t, q) in params.iter().zip(&points) {
                let p = evaluate_point(*t, 3, &knots, &control, &weights);
                assert!(points3_approx_eq(&p, q, 1e-9), "{parameterization:?}: {p} != {q}");
            }
        }
    }

    #[test]
    fn test_straight_line_length() {
        let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let length = curve_length(3, &knots, &points, &[1.0; 4], 200);
        assert!(approx_eq_tol(length, 3.0, 1e-9));
    }
}
