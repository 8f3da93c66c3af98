//! Common helpers for projection math (angle units, meridional arc).

use super::ellipsoid::Ellipsoid;

/// Degrees to radians.
#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Radians to degrees (signed).
#[inline]
pub fn to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Scaled meridional arc from latitude `phi0` to `phi`, in metres.
///
/// Ordnance Survey four-term series in powers of the third flattening `n`,
/// multiplied by `b * f0` so it is directly usable as a grid northing offset.
pub fn meridional_arc(ellipsoid: &Ellipsoid, f0: f64, phi: f64, phi0: f64) -> f64 {
    let n = ellipsoid.n;
    let n2 = n * n;
    let n3 = n2 * n;

    let d = phi - phi0;
    let s = phi + phi0;

    let ma = (1.0 + n + 5.0 / 4.0 * n2 + 5.0 / 4.0 * n3) * d;
    let mb = (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * d.sin() * s.cos();
    let mc = (15.0 / 8.0 * n2 + 15.0 / 8.0 * n3) * (2.0 * d).sin() * (2.0 * s).cos();
    let md = 35.0 / 24.0 * n3 * (3.0 * d).sin() * (3.0 * s).cos();

    ellipsoid.b * f0 * (ma - mb + mc - md)
}
