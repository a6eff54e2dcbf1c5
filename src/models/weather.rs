use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Next-day weather condition used to scale demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    #[default]
    Cloudy,
    Rainy,
}

impl Weather {
    pub fn multiplier(self) -> f64 {
        match self {
            Weather::Sunny => 1.2,
            Weather::Cloudy => 1.0,
            Weather::Rainy => 0.8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunny" => Ok(Weather::Sunny),
            "cloudy" => Ok(Weather::Cloudy),
            "rainy" => Ok(Weather::Rainy),
            other => Err(format!("unknown weather condition: {}", other)),
        }
    }
}
