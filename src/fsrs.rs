// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The FSRS-5 memory model: the forgetting curve and the formulas that
//! update stability and difficulty after a review.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// Time in days.
pub type T = f64;

/// Retrievability: the probability of recall, in [0, 1].
pub type R = f64;

/// Stability: the time in days for retrievability to fall to 90%.
pub type Stability = f64;

/// Difficulty, in [1, 10].
pub type Difficulty = f64;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }

    fn as_float(self) -> f64 {
        match self {
            Grade::Again => 1.0,
            Grade::Hard => 2.0,
            Grade::Good => 3.0,
            Grade::Easy => 4.0,
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            _ => fail(format!("invalid grade: {value} (expected 1 to 4)")),
        }
    }
}

/// Default FSRS-5 weights.
const W: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

const F: f64 = 19.0 / 81.0;

const C: f64 = -0.5;

/// The smallest stability any update may produce.
pub const S_MIN: Stability = 0.01;

pub fn retrievability(t: T, s: Stability) -> R {
    (1.0 + F * (t / s.max(S_MIN))).powf(C)
}

/// The time in days for retrievability to fall to `r_d`.
pub fn interval(r_d: R, s: Stability) -> T {
    (s / F) * (r_d.powf(1.0 / C) - 1.0)
}

pub fn initial_stability(g: Grade) -> Stability {
    match g {
        Grade::Again => W[0],
        Grade::Hard => W[1],
        Grade::Good => W[2],
        Grade::Easy => W[3],
    }
}

pub fn initial_difficulty(g: Grade) -> Difficulty {
    clamp_d(W[4] - f64::exp(W[5] * (g.as_float() - 1.0)) + 1.0)
}

fn s_success(d: Difficulty, s: Stability, r: R, g: Grade) -> Stability {
    let t_d = 11.0 - d;
    let t_s = s.powf(-W[9]);
    let t_r = f64::exp(W[10] * (1.0 - r)) - 1.0;
    let h = if g == Grade::Hard { W[15] } else { 1.0 };
    let b = if g == Grade::Easy { W[16] } else { 1.0 };
    let c = f64::exp(W[8]);
    let alpha = 1.0 + t_d * t_s * t_r * h * b * c;
    s * alpha
}

fn s_fail(d: Difficulty, s: Stability, r: R) -> Stability {
    let d_f = d.powf(-W[12]);
    let s_f = (s + 1.0).powf(W[13]) - 1.0;
    let r_f = f64::exp(W[14] * (1.0 - r));
    let c_f = W[11];
    let s_f = d_f * s_f * r_f * c_f;
    f64::min(s_f, s)
}

/// Stability after a review at least one day after the previous one.
pub fn new_stability(d: Difficulty, s: Stability, r: R, g: Grade) -> Stability {
    let s = s.max(S_MIN);
    let s_new = if g == Grade::Again {
        s_fail(d, s, r)
    } else {
        s_success(d, s, r, g)
    };
    s_new.max(S_MIN)
}

/// Stability after a review on the same day as the previous one.
pub fn short_term_stability(s: Stability, g: Grade) -> Stability {
    let s = s.max(S_MIN);
    let mut sinc = f64::exp(W[17] * (g.as_float() - 3.0 + W[18]));
    // A successful same-day review never lowers stability.
    if g >= Grade::Good {
        sinc = sinc.max(1.0);
    }
    (s * sinc).max(S_MIN)
}

fn delta_d(g: Grade) -> f64 {
    -W[6] * (g.as_float() - 3.0)
}

fn dp(d: Difficulty, g: Grade) -> f64 {
    d + delta_d(g) * ((10.0 - d) / 9.0)
}

pub fn new_difficulty(d: Difficulty, g: Grade) -> Difficulty {
    clamp_d(W[7] * initial_difficulty(Grade::Easy) + (1.0 - W[7]) * dp(d, g))
}

fn clamp_d(d: Difficulty) -> Difficulty {
    d.clamp(1.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_retrievability_at_stability() {
        for s in [0.5, 1.0, 3.7, 100.0] {
            assert!(approx(retrievability(s, s), 0.9));
        }
    }

    #[test]
    fn test_retrievability_decays() {
        let s = 10.0;
        assert!(approx(retrievability(0.0, s), 1.0));
        assert!(retrievability(5.0, s) > retrievability(20.0, s));
    }

    #[test]
    fn test_interval_equals_stability_at_target_recall() {
        for s in [0.5, 1.0, 3.7, 100.0] {
            assert!(approx(interval(0.9, s), s));
        }
    }

    #[test]
    fn test_initial_stability_ordered() {
        assert!(initial_stability(Grade::Again) < initial_stability(Grade::Hard));
        assert!(initial_stability(Grade::Hard) < initial_stability(Grade::Good));
        assert!(initial_stability(Grade::Good) < initial_stability(Grade::Easy));
    }

    #[test]
    fn test_initial_difficulty_in_range() {
        for g in Grade::ALL {
            let d = initial_difficulty(g);
            assert!((1.0..=10.0).contains(&d));
        }
        assert!(initial_difficulty(Grade::Again) > initial_difficulty(Grade::Easy));
    }

    #[test]
    fn test_new_difficulty_bounded() {
        let mut d = initial_difficulty(Grade::Good);
        for _ in 0..50 {
            d = new_difficulty(d, Grade::Again);
            assert!(d <= 10.0);
        }
        for _ in 0..50 {
            d = new_difficulty(d, Grade::Easy);
            assert!(d >= 1.0);
        }
    }

    #[test]
    fn test_new_stability_ordering() {
        let d = 5.0;
        let s = 10.0;
        let r = retrievability(10.0, s);
        let again = new_stability(d, s, r, Grade::Again);
        let hard = new_stability(d, s, r, Grade::Hard);
        let good = new_stability(d, s, r, Grade::Good);
        let easy = new_stability(d, s, r, Grade::Easy);
        assert!(again <= s);
        assert!(hard < good);
        assert!(good < easy);
    }

    #[test]
    fn test_short_term_stability() {
        let s = 3.0;
        assert!(short_term_stability(s, Grade::Again) < s);
        assert!(short_term_stability(s, Grade::Good) >= s);
        assert!(short_term_stability(s, Grade::Easy) > short_term_stability(s, Grade::Good));
    }

    #[test]
    fn test_zero_stability_stays_positive() {
        assert!(new_stability(5.0, 0.0, 0.5, Grade::Again) > 0.0);
        assert!(short_term_stability(0.0, Grade::Again) > 0.0);
        assert!(retrievability(1.0, 0.0).is_finite());
    }

    #[test]
    fn test_grade_try_from() {
        assert_eq!(Grade::try_from(1).ok(), Some(Grade::Again));
        assert_eq!(Grade::try_from(4).ok(), Some(Grade::Easy));
        assert!(Grade::try_from(0).is_err());
        assert!(Grade::try_from(5).is_err());
    }
}
