use std::fmt::{Display, Formatter};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
}

impl Genre {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Adventure => "Adventure",
            Self::Animation => "Animation",
            Self::Comedy => "Comedy",
            Self::Crime => "Crime",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime range in hours. Bounds are inclusive on the upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum DurationBucket {
    #[value(name = "under-2h", alias = "<2h")]
    UnderTwoHours,
    #[value(name = "2-3h")]
    TwoToThreeHours,
    #[value(name = "over-3h", alias = ">3h")]
    OverThreeHours,
}

impl DurationBucket {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnderTwoHours => "< 2 hrs",
            Self::TwoToThreeHours => "2 - 3 hrs",
            Self::OverThreeHours => "> 3 hrs",
        }
    }

    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::UnderTwoHours => "Duration <= 2.0",
            Self::TwoToThreeHours => "(Duration > 2.0 AND Duration <= 3.0)",
            Self::OverThreeHours => "Duration > 3.0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum VotesBucket {
    #[value(name = "upto-1000", alias = "<=1000")]
    UpToOneThousand,
    #[value(name = "1001-10000")]
    OneThousandToTenThousand,
    #[value(name = "over-10000", alias = ">10000")]
    OverTenThousand,
}

impl VotesBucket {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpToOneThousand => "<= 1000",
            Self::OneThousandToTenThousand => "1001 to 10,000",
            Self::OverTenThousand => "> 10,000",
        }
    }

    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::UpToOneThousand => "Votes <= 1000",
            Self::OneThousandToTenThousand => "(Votes > 1000 AND Votes <= 10000)",
            Self::OverTenThousand => "Votes > 10000",
        }
    }
}

/// Minimum rating on the 0.0..=10.0 slider, stored in tenths so the 0.1 step
/// is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingThreshold {
    tenths: u8,
}

impl RatingThreshold {
    pub const MAX_TENTHS: u8 = 100;

    pub fn from_tenths(tenths: u8) -> Result<Self, String> {
        if tenths > Self::MAX_TENTHS {
            return Err(format!(
                "rating must be between 0.0 and 10.0, got {}.{}",
                tenths / 10,
                tenths % 10
            ));
        }
        Ok(Self { tenths })
    }

    #[must_use]
    pub const fn tenths(self) -> u8 {
        self.tenths
    }

    #[must_use]
    pub fn value(self) -> f64 {
        f64::from(self.tenths) / 10.0
    }
}

impl Default for RatingThreshold {
    fn default() -> Self {
        Self { tenths: 50 }
    }
}

impl Display for RatingThreshold {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

impl FromStr for RatingThreshold {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("rating must be a number, got `{raw}`"))?;
        if !value.is_finite() || !(0.0..=10.0).contains(&value) {
            return Err(format!("rating must be between 0.0 and 10.0, got {raw}"));
        }

        let scaled = value * 10.0;
        let tenths = scaled.round();
        if (scaled - tenths).abs() > 1e-6 {
            return Err(format!("rating must move in steps of 0.1, got {raw}"));
        }

        Self::from_tenths(tenths as u8)
    }
}
