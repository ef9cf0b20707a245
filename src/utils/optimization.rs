//! Derivative-free minimization used for parameter estimation.

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the best point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex collapsed below the tolerance.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Minimize `objective` starting from `initial` with the Nelder-Mead simplex.
///
/// Points are clamped into `bounds` (one `(min, max)` pair per dimension)
/// before every evaluation.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        match bounds {
            None => point,
            Some(b) => point
                .into_iter()
                .enumerate()
                .map(|(i, x)| b.get(i).map_or(x, |&(lo, hi)| x.clamp(lo, hi)))
                .collect(),
        }
    };
    let eval = |point: &[f64]| {
        let v = objective(point);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let mut vertices: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    let start = clamp(initial.to_vec());
    let start_value = eval(&start);
    vertices.push((start, start_value));
    for i in 0..n {
        let mut point = initial.to_vec();
        point[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        let point = clamp(point);
        let value = eval(&point);
        vertices.push((point, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let best_value = vertices[0].1;
        let worst_value = vertices[n].1;
        let second_worst_value = vertices[n - 1].1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| vertices[..n].iter().map(|(p, _)| p[j]).sum::<f64>() / n as f64)
            .collect();

        let spread = worst_value - best_value;
        let size = vertices
            .iter()
            .map(|(p, _)| distance(p, &centroid))
            .fold(0.0, f64::max);
        if spread.abs() < config.tolerance || size < config.tolerance {
            converged = true;
            break;
        }

        let toward = |from: &[f64], coef: f64| -> Vec<f64> {
            clamp(
                centroid
                    .iter()
                    .zip(from.iter())
                    .map(|(c, p)| c + coef * (p - c))
                    .collect(),
            )
        };

        let reflected = toward(&vertices[n].0, -config.alpha);
        let reflected_value = eval(&reflected);

        if reflected_value < best_value {
            let expanded = toward(&reflected, config.gamma);
            let expanded_value = eval(&expanded);
            vertices[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < second_worst_value {
            vertices[n] = (reflected, reflected_value);
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < worst_value {
            let point = toward(&reflected, config.rho);
            let value = eval(&point);
            (point, value)
        } else {
            let point = toward(&vertices[n].0, config.rho);
            let value = eval(&point);
            (point, value)
        };

        if contracted_value < worst_value.min(reflected_value) {
            vertices[n] = (contracted, contracted_value);
            continue;
        }

        // Shrink toward the best vertex
        let best = vertices[0].0.clone();
        for vertex in vertices.iter_mut().skip(1) {
            let point = clamp(
                best.iter()
                    .zip(vertex.0.iter())
                    .map(|(b, p)| b + config.sigma * (p - b))
                    .collect(),
            );
            let value = eval(&point);
            *vertex = (point, value);
        }
    }

    let (optimal_point, optimal_value) = vertices
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((initial.to_vec(), f64::NAN));

    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
