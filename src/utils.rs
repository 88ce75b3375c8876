/// Round `value` to `decimals` decimal places.
pub(crate) fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn is_default<D: Default + Eq>(value: &D) -> bool {
    value == &D::default()
}
