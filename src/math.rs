use num_traits::Float;

/// Zero-mean Gaussian probability density at `x` with standard deviation
/// `sigma`: `(1 / (sqrt(2π)·σ)) · e^(−x² / (2σ²))`.
pub fn gaussian_weight<F: Float>(x: F, sigma: F) -> F {
    let two = F::from(2.0).unwrap();
    let two_pi = two * F::from(std::f64::consts::PI).unwrap();

    let coef = F::one() / (two_pi.sqrt() * sigma);
    let exp_arg = -(x * x) / (two * sigma * sigma);

    coef * exp_arg.exp()
}
