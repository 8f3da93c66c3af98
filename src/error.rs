use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Coordinate ({easting:.1}, {northing:.1}) lies outside the National Grid")]
    OutOfRange { easting: f64, northing: f64 },

    #[error("Invalid digit count {0}: expected one of 2, 4, 6, 8, 10")]
    InvalidDigits(u8),

    #[error("Invalid grid reference: {0}")]
    Parse(String),

    #[error("Invalid shape: {0}")]
    Shape(String),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjError),
}

#[derive(Error, Debug)]
pub enum ProjError {
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
