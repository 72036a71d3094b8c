//! Derivative-free minimisation used for likelihood estimation.

/// Result of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether a convergence criterion was met before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values.
    pub f_tolerance: f64,
    /// Convergence tolerance on the simplex diameter.
    pub x_tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Offset of the initial simplex vertices from the starting point.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            f_tolerance: 1e-8,
            x_tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

/// Minimise `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+inf`, so the simplex moves
/// away from regions where the objective is undefined.
///
/// # Example
/// ```
/// use cpi_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 1e-3);
/// assert!((result.optimal_point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if n == 0 {
        let value = eval(initial);
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: value,
            iterations: 0,
            converged: value.is_finite(),
        };
    }

    let mut vertices: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    vertices.push((initial.to_vec(), eval(initial)));
    for i in 0..n {
        let mut v = initial.to_vec();
        v[i] += if initial[i].abs() > 1e-8 {
            config.initial_step * initial[i].abs().max(1.0)
        } else {
            config.initial_step
        };
        let f = eval(&v);
        vertices.push((v, f));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        vertices.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = vertices[0].1;
        let worst = vertices[n].1;
        if best.is_finite() && (worst - best).abs() <= config.f_tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }
        if simplex_diameter(&vertices) <= config.x_tolerance {
            converged = best.is_finite();
            break;
        }

        let centroid = centroid_without_last(&vertices);
        let worst_point = vertices[n].0.clone();

        let reflected = along(&centroid, &worst_point, -config.alpha);
        let f_reflected = eval(&reflected);

        if f_reflected < vertices[0].1 {
            let expanded = along(&centroid, &worst_point, -config.alpha * config.gamma);
            let f_expanded = eval(&expanded);
            vertices[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }

        if f_reflected < vertices[n - 1].1 {
            vertices[n] = (reflected, f_reflected);
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < vertices[n].1 {
            let p = along(&centroid, &worst_point, -config.alpha * config.rho);
            let f = eval(&p);
            (p, f)
        } else {
            let p = along(&centroid, &worst_point, config.rho);
            let f = eval(&p);
            (p, f)
        };

        if f_contracted < f_reflected.min(vertices[n].1) {
            vertices[n] = (contracted, f_contracted);
            continue;
        }

        let anchor = vertices[0].0.clone();
        for vertex in vertices.iter_mut().skip(1) {
            for (x, a) in vertex.0.iter_mut().zip(&anchor) {
                *x = a + config.sigma * (*x - a);
            }
            vertex.1 = eval(&vertex.0);
        }
    }

    vertices.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (optimal_point, optimal_value) = vertices.swap_remove(0);

    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

/// Centroid of all vertices except the last (worst after sorting).
fn centroid_without_last(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let count = vertices.len() - 1;
    let dim = vertices[0].0.len();
    let mut centroid = vec![0.0; dim];
    for (point, _) in &vertices[..count] {
        for (c, x) in centroid.iter_mut().zip(point) {
            *c += x;
        }
    }
    for c in &mut centroid {
        *c /= count as f64;
    }
    centroid
}

/// `centroid + t * (point - centroid)`.
fn along(centroid: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + t * (p - c))
        .collect()
}

fn simplex_diameter(vertices: &[(Vec<f64>, f64)]) -> f64 {
    let best = &vertices[0].0;
    vertices[1..]
        .iter()
        .map(|(p, _)| {
            p.iter()
                .zip(best)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        })
        .fold(0.0, f64::max)
}
