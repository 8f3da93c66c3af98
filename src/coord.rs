/// A longitude/latitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeographicCoordinate {
    pub lon: f64,
    pub lat: f64,
}

impl GeographicCoordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<(f64, f64)> for GeographicCoordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// National Grid easting/northing in metres from the false origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedCoordinate {
    pub easting: f64,
    pub northing: f64,
}

impl ProjectedCoordinate {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }
}

impl From<(f64, f64)> for ProjectedCoordinate {
    fn from((easting, northing): (f64, f64)) -> Self {
        Self { easting, northing }
    }
}
