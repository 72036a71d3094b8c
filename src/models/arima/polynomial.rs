//! Lag-polynomial algebra for seasonal ARIMA models.
//!
//! Polynomials are stored as coefficient vectors in ascending powers of the
//! backshift operator `B`, with a leading `1.0`. An AR operator
//! `1 - phi_1 B - ... - phi_p B^p` is stored as `[1, -phi_1, ..., -phi_p]`,
//! an MA operator `1 + theta_1 B + ...` as `[1, theta_1, ...]`.

/// Margin kept between admissible roots and the unit circle.
pub const ROOT_MARGIN: f64 = 1e-4;

/// Product of two lag polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// AR operator `1 - sum phi_i B^(i*lag)`.
pub fn ar_operator(coefficients: &[f64], lag: usize) -> Vec<f64> {
    spread(coefficients, lag, -1.0)
}

/// MA operator `1 + sum theta_i B^(i*lag)`.
pub fn ma_operator(coefficients: &[f64], lag: usize) -> Vec<f64> {
    spread(coefficients, lag, 1.0)
}

fn spread(coefficients: &[f64], lag: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * lag + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * lag] = sign * c;
    }
    poly
}

/// Differencing operator `(1 - B)^d (1 - B^s)^D`.
pub fn differencing_operator(d: usize, cap_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    for _ in 0..cap_d {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        poly = multiply(&poly, &seasonal);
    }
    poly
}

/// Map partial autocorrelations in (-1, 1) to AR coefficients.
///
/// Durbin-Levinson recursion; any input with `|pacf_k| < 1` yields a
/// stationary AR polynomial.
pub fn pacf_to_ar(pacf: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(pacf.len());
    for (k, &kappa) in pacf.iter().enumerate() {
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - kappa * prev[k - 1 - j];
        }
        phi.push(kappa);
    }
    phi
}

/// Reverse of [`pacf_to_ar`] (step-down recursion).
///
/// Returns `None` when some partial autocorrelation reaches the unit
/// circle, i.e. the AR polynomial is not stationary.
pub fn ar_to_pacf(phi: &[f64]) -> Option<Vec<f64>> {
    let mut a = phi.to_vec();
    let mut pacf = vec![0.0; a.len()];
    for k in (0..a.len()).rev() {
        let kappa = a[k];
        if !kappa.is_finite() || kappa.abs() >= 1.0 {
            return None;
        }
        pacf[k] = kappa;
        let denom = 1.0 - kappa * kappa;
        let prev = a.clone();
        for j in 0..k {
            a[j] = (prev[j] + kappa * prev[k - 1 - j]) / denom;
        }
        a.truncate(k);
    }
    Some(pacf)
}

/// True if `1 - sum phi_i B^i` has all roots outside the unit circle.
///
/// Uses the step-down test and requires every partial autocorrelation to
/// stay `ROOT_MARGIN` away from +-1.
pub fn is_stationary(phi: &[f64]) -> bool {
    match ar_to_pacf(phi) {
        Some(pacf) => pacf.iter().all(|k| k.abs() < 1.0 - ROOT_MARGIN),
        None => false,
    }
}

/// True if `1 + sum theta_i B^i` has all roots outside the unit circle.
pub fn is_invertible(theta: &[f64]) -> bool {
    let negated: Vec<f64> = theta.iter().map(|t| -t).collect();
    is_stationary(&negated)
}

/// Coefficients `a_i` of an AR-form operator `1 - sum a_i B^i`.
pub fn ar_form(operator: &[f64]) -> Vec<f64> {
    operator.iter().skip(1).map(|c| -c).collect()
}

/// Infinite-MA weights `psi_0..psi_{h-1}` of `ma(B) / ar(B)`.
///
/// `ar` and `ma` are operators with leading 1 as stored in this module.
pub fn psi_weights(ar: &[f64], ma: &[f64], h: usize) -> Vec<f64> {
    let a = ar_form(ar);
    let mut psi = vec![0.0; h];
    for j in 0..h {
        let mut value = if j == 0 {
            1.0
        } else {
            ma.get(j).copied().unwrap_or(0.0)
        };
        for i in 1..=j.min(a.len()) {
            value += a[i - 1] * psi[j - i];
        }
        psi[j] = value;
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn multiply_expands_seasonal_product() {
        // (1 - 0.5B)(1 - 0.3B^2) = 1 - 0.5B - 0.3B^2 + 0.15B^3
        let product = multiply(&ar_operator(&[0.5], 1), &ar_operator(&[0.3], 2));
        let expected = [1.0, -0.5, -0.3, 0.15];
        for (a, b) in product.iter().zip(expected) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn differencing_operator_shapes() {
        assert_eq!(differencing_operator(0, 0, 12), vec![1.0]);
        assert_eq!(differencing_operator(2, 0, 12), vec![1.0, -2.0, 1.0]);

        let seasonal = differencing_operator(1, 1, 4);
        // (1 - B)(1 - B^4) = 1 - B - B^4 + B^5
        assert_eq!(seasonal, vec![1.0, -1.0, 0.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn pacf_round_trip() {
        let pacf = vec![0.6, -0.3, 0.2];
        let phi = pacf_to_ar(&pacf);
        let back = ar_to_pacf(&phi).unwrap();
        for (a, b) in back.iter().zip(&pacf) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn pacf_to_ar_order_two() {
        // phi_2 = k2, phi_1 = k1 (1 - k2)
        let phi = pacf_to_ar(&[0.5, 0.2]);
        assert_relative_eq!(phi[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(phi[1], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn stationarity_checks() {
        assert!(is_stationary(&[]));
        assert!(is_stationary(&[0.5]));
        assert!(!is_stationary(&[1.0]));
        assert!(!is_stationary(&[1.2]));
        // AR(2) with phi1 + phi2 > 1 is explosive
        assert!(!is_stationary(&[0.7, 0.4]));
        assert!(is_stationary(&[0.5, 0.3]));
    }

    #[test]
    fn invertibility_checks() {
        assert!(is_invertible(&[0.5]));
        assert!(is_invertible(&[-0.9]));
        assert!(!is_invertible(&[-1.0]));
        assert!(!is_invertible(&[1.5]));
    }

    #[test]
    fn psi_weights_ar1() {
        let psi = psi_weights(&ar_operator(&[0.5], 1), &[1.0], 4);
        assert_eq!(psi, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn psi_weights_random_walk() {
        let psi = psi_weights(&differencing_operator(1, 0, 12), &[1.0], 5);
        assert_eq!(psi, vec![1.0; 5]);
    }

    #[test]
    fn psi_weights_ma1() {
        let psi = psi_weights(&[1.0], &ma_operator(&[0.4], 1), 3);
        assert_eq!(psi, vec![1.0, 0.4, 0.0]);
    }
}
