//! Expected-Value Model: how many guesses a city "should" get given its population.
//!
//! The model is a piecewise linear function of `log10(population)` whose
//! output is exponentiated. Segments are half a decade wide and start at
//! `log10 = 3.5`. Only the first intercept is fitted; every later intercept
//! is derived so that adjacent segments meet at their shared breakpoint.
//!
//! A population on or below the first breakpoint, or beyond the last
//! segment, has no expected value.

use log::debug;

use crate::record::{City, RecordSet};

/// Base of the exponentiation applied to the linear part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exponent {
    /// `10^y`
    Ten,
    /// `e^y`
    Natural,
}

/// A continuous piecewise log-linear curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiecewiseLogLinear {
    slopes: &'static [f64],
    base_intercept: f64,
    /// Upper bound of the last segment, if it is wider than the others.
    last_upper: Option<f64>,
    exponent: Exponent,
}

/// One linear piece, valid for `lower < log10(population) <= upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub lower: f64,
    pub upper: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl Segment {
    #[must_use]
    pub fn contains(&self, log_population: f64) -> bool {
        self.lower < log_population && log_population <= self.upper
    }

    #[must_use]
    pub fn linear(&self, log_population: f64) -> f64 {
        self.slope * log_population + self.intercept
    }
}

const FIRST_BREAKPOINT: f64 = 3.5;
const SEGMENT_WIDTH: f64 = 0.5;

/// Calibration fitted on the European quiz.
///
/// The last segment is stretched to `log10 = 9` to cover the largest cities.
pub const EUROPE: PiecewiseLogLinear = PiecewiseLogLinear {
    slopes: &[
        1.341_877_648_234_351_3,
        1.429_839_330_734_348,
        1.630_638_428_310_031_5,
        1.592_853_724_040_515_4,
        1.175_288_474_783_39,
        0.407_333_147_285_194_6,
    ],
    base_intercept: -3.651_537_374_003_276,
    last_upper: Some(9.0),
    exponent: Exponent::Ten,
};

/// Calibration fitted on the earlier U.S. quiz, kept for comparison.
pub const USA: PiecewiseLogLinear = PiecewiseLogLinear {
    slopes: &[
        2.041_264_76,
        2.017_001_43,
        3.865_514_36,
        3.804_282_62,
        1.647_923_31,
        0.111_986_09,
        0.093_911_42,
    ],
    base_intercept: -3.271_261_79,
    last_upper: None,
    exponent: Exponent::Natural,
};

impl PiecewiseLogLinear {
    /// The curve's segments in ascending order, with continuity-derived intercepts.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let last = self.slopes.len().saturating_sub(1);
        let mut intercept = self.base_intercept;
        let mut previous_slope = None;
        let mut lower = FIRST_BREAKPOINT;
        self.slopes.iter().enumerate().map(move |(i, &slope)| {
            if let Some(previous) = previous_slope {
                intercept = previous * lower + intercept - slope * lower;
            }
            let upper = match self.last_upper {
                Some(upper) if i == last => upper,
                _ => lower + SEGMENT_WIDTH,
            };
            let segment = Segment {
                lower,
                upper,
                slope,
                intercept,
            };
            previous_slope = Some(slope);
            lower += SEGMENT_WIDTH;
            segment
        })
    }

    /// Expected number of guesses for a city with this population.
    ///
    /// Returns `None` outside the model's domain.
    #[must_use]
    pub fn expected_guesses(&self, population: f64) -> Option<f64> {
        let log_population = population.log10();
        let segment = self.segments().find(|s| s.contains(log_population))?;
        Some(self.exponentiate(segment.linear(log_population)))
    }

    fn exponentiate(&self, y: f64) -> f64 {
        match self.exponent {
            Exponent::Ten => 10f64.powf(y),
            Exponent::Natural => y.exp(),
        }
    }

    /// Fills in `expectedCount` for cities where it is absent or zero.
    ///
    /// Returns the number of cities that received a value.
    #[expect(clippy::cast_precision_loss)]
    pub fn fill_missing(&self, cities: &mut RecordSet<City>) -> usize {
        let mut filled = 0;
        for city in cities.iter_mut() {
            if city.known_expected_count().is_some() {
                continue;
            }
            if let Some(expected) = self.expected_guesses(city.population as f64) {
                debug!("Derived expected count {expected:.1} for {}", city.id);
                city.expected_count = Some(expected);
                filled += 1;
            }
        }
        filled
    }
}

/// Expected guesses under the [`EUROPE`] calibration.
#[must_use]
pub fn expected_guesses(population: f64) -> Option<f64> {
    EUROPE.expected_guesses(population)
}
