/// Round to one decimal place, the only formatting the engine applies.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parse a `"<score> / <max>"` cell into its score part.
///
/// Only the text before the first `/` matters; the maximum is ignored because
/// every module shares one configured per-module maximum.
pub fn parse_score(raw: &str) -> Option<f64> {
    let head = raw.split('/').next()?.trim();
    let value: f64 = head.parse().ok()?;
    value.is_finite().then(|| round1(value))
}
