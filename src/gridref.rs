//! Alphanumeric grid references: the two-letter 100 km square plus
//! truncated easting and northing offsets within it.

use std::fmt;
use std::str::FromStr;

use crate::coord::ProjectedCoordinate;
use crate::error::GridError;

const SQUARE_SIZE: f64 = 100_000.0;
/// Valid 100 km square indices: eastings 0..=6, northings 0..=12.
const MAX_E100K: i64 = 6;
const MAX_N100K: i64 = 12;

/// Number of figures in a grid reference, split evenly between easting and northing.
///
/// 2 figures locate a 10 km square, 10 figures a 1 m square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digits(u8);

impl Digits {
    /// Eight figures (10 m cells), the precision of the map readout.
    pub const DEFAULT: Digits = Digits(8);

    pub fn new(digits: u8) -> Result<Self, GridError> {
        match digits {
            2 | 4 | 6 | 8 | 10 => Ok(Self(digits)),
            other => Err(GridError::InvalidDigits(other)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Figures per component (easting or northing).
    pub fn per_axis(self) -> usize {
        usize::from(self.0 / 2)
    }

    /// Size in metres of the cell a reference at this precision identifies.
    pub fn resolution(self) -> f64 {
        10f64.powi(5 - i32::from(self.0 / 2))
    }
}

impl Default for Digits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Digits {
    type Error = GridError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Pad a number with leading zeros to `width` characters.
///
/// Numbers already wider than `width` are left untouched.
pub fn zero_pad(value: u32, width: usize) -> String {
    format!("{value:0width$}")
}

/// A National Grid reference such as `TQ 3003 8041`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridReference {
    letters: [u8; 2],
    square_index: (u8, u8),
    easting: u32,
    northing: u32,
    digits: Digits,
}

impl GridReference {
    /// Encode a numeric easting/northing (metres) at the given precision.
    ///
    /// Fails with `GridError::OutOfRange` when the point does not fall in one
    /// of the lettered 100 km squares (or is not finite).
    pub fn from_projected(easting: f64, northing: f64, digits: Digits) -> Result<Self, GridError> {
        let out_of_range = || GridError::OutOfRange { easting, northing };

        if !easting.is_finite() || !northing.is_finite() {
            return Err(out_of_range());
        }

        let e100k = (easting / SQUARE_SIZE).floor();
        let n100k = (northing / SQUARE_SIZE).floor();
        let in_grid = (0.0..=MAX_E100K as f64).contains(&e100k)
            && (0.0..=MAX_N100K as f64).contains(&n100k);
        if !in_grid {
            return Err(out_of_range());
        }

        let square_index = (e100k as u8, n100k as u8);
        let letters = square_letters(square_index);

        let resolution = digits.resolution();
        let e = (easting.rem_euclid(SQUARE_SIZE) / resolution).floor() as u32;
        let n = (northing.rem_euclid(SQUARE_SIZE) / resolution).floor() as u32;

        Ok(Self {
            letters,
            square_index,
            easting: e,
            northing: n,
            digits,
        })
    }

    /// The two-letter 100 km square, e.g. `"TQ"`.
    pub fn square(&self) -> &str {
        std::str::from_utf8(&self.letters).unwrap_or_default()
    }

    /// Easting offset within the square, in units of `digits.resolution()`.
    pub fn easting(&self) -> u32 {
        self.easting
    }

    /// Northing offset within the square, in units of `digits.resolution()`.
    pub fn northing(&self) -> u32 {
        self.northing
    }

    pub fn digits(&self) -> Digits {
        self.digits
    }

    /// South-west corner of the referenced cell, in metres from the false origin.
    pub fn to_projected(&self) -> ProjectedCoordinate {
        let (e100k, n100k) = self.square_index;
        let resolution = self.digits.resolution();
        ProjectedCoordinate::new(
            f64::from(e100k) * SQUARE_SIZE + f64::from(self.easting) * resolution,
            f64::from(n100k) * SQUARE_SIZE + f64::from(self.northing) * resolution,
        )
    }
}

impl fmt::Display for GridReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.digits.per_axis();
        write!(
            f,
            "{} {} {}",
            self.square(),
            zero_pad(self.easting, width),
            zero_pad(self.northing, width)
        )
    }
}

impl FromStr for GridReference {
    type Err = GridError;

    /// Parse `"TQ 3003 8041"`, `"tq30038041"`, `"TQ 30037 80412"` and similar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| GridError::Parse(format!("{s:?}: {reason}"));

        let mut chars = s.chars();
        let (Some(c1), Some(c2)) = (chars.next(), chars.next()) else {
            return Err(invalid("too short"));
        };
        let l1 = letter_index(c1).ok_or_else(|| invalid("bad first letter"))?;
        let l2 = letter_index(c2).ok_or_else(|| invalid("bad second letter"))?;

        let (e100k, n100k) = square_indices(l1, l2);
        if !(0..=MAX_E100K).contains(&e100k) || !(0..=MAX_N100K).contains(&n100k) {
            return Err(invalid("square is outside the National Grid"));
        }
        let square_index = (e100k as u8, n100k as u8);
        let letters = square_letters(square_index);

        let rest = chars.as_str();
        if !rest.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()) {
            return Err(invalid("unexpected character"));
        }
        let groups: Vec<&str> = rest.split_whitespace().collect();
        let (east, north) = match groups.as_slice() {
            [both] if both.len() % 2 == 0 => both.split_at(both.len() / 2),
            [east, north] => (*east, *north),
            [] => return Err(invalid("missing easting and northing")),
            _ => return Err(invalid("expected an even number of figures")),
        };

        if east.len() != north.len() {
            return Err(invalid("easting and northing differ in length"));
        }
        if east.is_empty() || east.len() > 5 {
            return Err(invalid("expected 1 to 5 figures per axis"));
        }

        let digits = Digits::new((east.len() * 2) as u8)?;
        let easting = east.parse().map_err(|_| invalid("bad easting"))?;
        let northing = north.parse().map_err(|_| invalid("bad northing"))?;

        Ok(Self {
            letters,
            square_index,
            easting,
            northing,
            digits,
        })
    }
}

/// Letters for the 100 km square at the given indices: OS 5x5 lettering,
/// 500 km squares first, with 'I' skipped.
fn square_letters((e100k, n100k): (u8, u8)) -> [u8; 2] {
    let (e100k, n100k) = (i64::from(e100k), i64::from(n100k));
    let mut l1 = (19 - n100k) - (19 - n100k) % 5 + (e100k + 10) / 5;
    let mut l2 = (19 - n100k) * 5 % 25 + e100k % 5;

    if l1 > 7 {
        l1 += 1;
    }
    if l2 > 7 {
        l2 += 1;
    }
    [b'A' + l1 as u8, b'A' + l2 as u8]
}

/// 100 km square indices from the positions of its two letters.
fn square_indices(l1: i64, l2: i64) -> (i64, i64) {
    ((l1 - 2).rem_euclid(5) * 5 + l2 % 5, (19 - (l1 / 5) * 5) - l2 / 5)
}

/// Position of a grid letter in the 25-letter alphabet (no 'I').
fn letter_index(c: char) -> Option<i64> {
    let c = c.to_ascii_uppercase();
    if !c.is_ascii_uppercase() || c == 'I' {
        return None;
    }
    let index = i64::from(c as u8 - b'A');
    Some(if index > 7 { index - 1 } else { index })
}
