use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Spacing between intraday data points accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "60min")]
    SixtyMinutes,
}

impl Interval {
    pub const ALL: [Self; 5] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::FiveMinutes => "5min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
            Self::SixtyMinutes => "60min",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1min" | "1m" => Ok(Self::OneMinute),
            "5min" | "5m" => Ok(Self::FiveMinutes),
            "15min" | "15m" => Ok(Self::FifteenMinutes),
            "30min" | "30m" => Ok(Self::ThirtyMinutes),
            "60min" | "60m" | "1h" => Ok(Self::SixtyMinutes),
            other => Err(ValidationError::InvalidInterval {
                value: other.to_owned(),
            }),
        }
    }
}
