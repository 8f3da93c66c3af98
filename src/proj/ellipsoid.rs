/// Reference ellipsoid parameters.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Semi-minor axis (metres)
    pub b: f64,
    /// Flattening: (a - b) / a
    pub f: f64,
    /// First eccentricity squared: 1 - b^2 / a^2
    pub e2: f64,
    /// Third flattening: (a - b) / (a + b)
    pub n: f64,
}

impl Ellipsoid {
    /// Build from semi-major axis and flattening.
    pub const fn new(a: f64, f: f64) -> Self {
        Self::from_axes(a, a * (1.0 - f))
    }

    /// Build from both semi-axes, the form the Ordnance Survey publishes.
    pub const fn from_axes(a: f64, b: f64) -> Self {
        Self {
            a,
            b,
            f: (a - b) / a,
            e2: 1.0 - (b * b) / (a * a),
            n: (a - b) / (a + b),
        }
    }

    /// Get the first eccentricity (computed at runtime).
    pub fn eccentricity(&self) -> f64 {
        self.e2.sqrt()
    }
}

/// Airy 1830, the ellipsoid underlying OSGB36 and the National Grid.
pub const AIRY_1830: Ellipsoid = Ellipsoid::from_axes(6_377_563.396, 6_356_256.910);
pub const WGS84: Ellipsoid = Ellipsoid::new(6_378_137.0, 1.0 / 298.257_223_563);
