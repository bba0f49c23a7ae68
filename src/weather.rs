//! Weather icon codes sent by the companion

use core::str::FromStr;

use crate::ui::assets::Asset;

/// Closed set of condition codes understood by the watchface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IconCode {
    ClearDay,
    ClearNight,
    Rain,
    Snow,
    Sleet,
    Wind,
    Fog,
    Cloudy,
    PartlyCloudyDay,
    PartlyCloudyNight,
}

/// Code string outside of [`IconCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownIconCode;

impl IconCode {
    pub const ALL: [IconCode; 10] = [
        IconCode::ClearDay,
        IconCode::ClearNight,
        IconCode::Rain,
        IconCode::Snow,
        IconCode::Sleet,
        IconCode::Wind,
        IconCode::Fog,
        IconCode::Cloudy,
        IconCode::PartlyCloudyDay,
        IconCode::PartlyCloudyNight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IconCode::ClearDay => "clear-day",
            IconCode::ClearNight => "clear-night",
            IconCode::Rain => "rain",
            IconCode::Snow => "snow",
            IconCode::Sleet => "sleet",
            IconCode::Wind => "wind",
            IconCode::Fog => "fog",
            IconCode::Cloudy => "cloudy",
            IconCode::PartlyCloudyDay => "partly-cloudy-day",
            IconCode::PartlyCloudyNight => "partly-cloudy-night",
        }
    }

    /// Bitmap shown for this condition
    pub fn asset(self) -> Asset {
        match self {
            IconCode::ClearDay => Asset::ClearSkyDay,
            IconCode::ClearNight => Asset::ClearSkyNight,
            IconCode::Rain => Asset::Rain,
            IconCode::Snow => Asset::Snow,
            IconCode::Sleet => Asset::Sleet,
            IconCode::Wind => Asset::Wind,
            IconCode::Fog => Asset::Fog,
            IconCode::Cloudy => Asset::Cloudy,
            IconCode::PartlyCloudyDay => Asset::PartlyCloudyDay,
            IconCode::PartlyCloudyNight => Asset::PartlyCloudyNight,
        }
    }
}

impl FromStr for IconCode {
    type Err = UnknownIconCode;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        IconCode::ALL
            .into_iter()
            .find(|icon| icon.as_str() == code)
            .ok_or(UnknownIconCode)
    }
}
