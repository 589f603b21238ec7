use serde::{Deserialize, Serialize};
use std::fmt;

pub const LATITUDE_LIMIT: f64 = 90.0;
pub const LONGITUDE_LIMIT: f64 = 180.0;

/// A validated point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `None` when either axis is outside its range (or NaN).
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = (-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&latitude);
        let lon_ok = (-LONGITUDE_LIMIT..=LONGITUDE_LIMIT).contains(&longitude);

        (lat_ok && lon_ok).then_some(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°, {:.4}°", self.latitude, self.longitude)
    }
}

/// Eight-point compass rose, labelled in the display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassPoint {
    const ROSE: [CompassPoint; 8] = [
        CompassPoint::North,
        CompassPoint::NorthEast,
        CompassPoint::East,
        CompassPoint::SouthEast,
        CompassPoint::South,
        CompassPoint::SouthWest,
        CompassPoint::West,
        CompassPoint::NorthWest,
    ];

    /// Nearest 45° sector for a bearing in degrees.
    pub fn from_bearing(degrees: f64) -> Self {
        let sector = (degrees / 45.0).round() as i64;
        Self::ROSE[sector.rem_euclid(8) as usize]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompassPoint::North => "С",
            CompassPoint::NorthEast => "СВ",
            CompassPoint::East => "В",
            CompassPoint::SouthEast => "ЮВ",
            CompassPoint::South => "Ю",
            CompassPoint::SouthWest => "ЮЗ",
            CompassPoint::West => "З",
            CompassPoint::NorthWest => "СЗ",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// WMO weather interpretation code, as reported by Open-Meteo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub i32);

impl WeatherCode {
    pub const UNKNOWN_DESCRIPTION: &'static str = "Неизвестно";
    pub const UNKNOWN_ICON: &'static str = "🌡️";

    /// Human-readable description, `None` for codes outside the table.
    pub fn known_description(&self) -> Option<&'static str> {
        let text = match self.0 {
            0 => "Ясно",
            1 => "Преимущественно ясно",
            2 => "Переменная облачность",
            3 => "Пасмурно",
            45 => "Туман",
            48 => "Туман с изморозью",
            51 => "Легкая морось",
            53 => "Умеренная морось",
            55 => "Сильная морось",
            56 => "Легкая ледяная морось",
            57 => "Сильная ледяная морось",
            61 => "Небольшой дождь",
            63 => "Умеренный дождь",
            65 => "Сильный дождь",
            66 => "Ледяной дождь",
            67 => "Сильный ледяной дождь",
            71 => "Небольшой снег",
            73 => "Умеренный снег",
            75 => "Сильный снег",
            77 => "Снежные зерна",
            80 => "Небольшие ливни",
            81 => "Умеренные ливни",
            82 => "Сильные ливни",
            85 => "Небольшой снегопад",
            86 => "Сильный снегопад",
            95 => "Гроза",
            96 => "Гроза с небольшим градом",
            99 => "Гроза с сильным градом",
            _ => return None,
        };
        Some(text)
    }

    pub fn description(&self) -> &'static str {
        self.known_description().unwrap_or(Self::UNKNOWN_DESCRIPTION)
    }

    pub fn icon(&self) -> &'static str {
        match self.0 {
            0 => "☀️",
            1 => "⛅",
            2 => "🌤️",
            3 => "☁️",
            45 | 48 => "🌫️",
            51 | 53 | 55 | 63 | 65 | 81 | 82 => "🌧️",
            56 | 57 | 66 | 67 => "🌧️❄️",
            61 | 80 => "🌦️",
            71 | 73 | 75 | 77 | 85 | 86 => "🌨️",
            95 => "⛈️",
            96 | 99 => "⛈️🌨️",
            _ => Self::UNKNOWN_ICON,
        }
    }
}

/// Normalized snapshot of current conditions at one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub coordinates: Coordinate,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction: CompassPoint,
    pub weather_code: WeatherCode,
    /// Provider-local wall clock time, `HH:MM`.
    pub local_time: String,
    pub timezone: String,
    pub observed_at_epoch_ms: i64,
}

impl WeatherObservation {
    pub fn description(&self) -> &'static str {
        self.weather_code.description()
    }

    pub fn icon(&self) -> &'static str {
        self.weather_code.icon()
    }
}

/// Opaque widget identifier, stable for the widget's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub data: WeatherObservation,
}

impl Widget {
    pub fn coordinates(&self) -> Coordinate {
        self.data.coordinates
    }
}

/// Durable projection of a widget: where it points and when it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedWidget {
    pub coordinates: Coordinate,
    pub timestamp: i64,
}

impl From<&Widget> for PersistedWidget {
    fn from(widget: &Widget) -> Self {
        Self {
            coordinates: widget.data.coordinates,
            timestamp: widget.data.observed_at_epoch_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(90.0, 180.0).is_some());
        assert!(Coordinate::new(-90.0, -180.0).is_some());
        assert!(Coordinate::new(90.5, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.1).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn compass_rounds_to_nearest_sector() {
        assert_eq!(CompassPoint::from_bearing(0.0), CompassPoint::North);
        assert_eq!(CompassPoint::from_bearing(22.0), CompassPoint::North);
        assert_eq!(CompassPoint::from_bearing(23.0), CompassPoint::NorthEast);
        assert_eq!(CompassPoint::from_bearing(90.0), CompassPoint::East);
        assert_eq!(CompassPoint::from_bearing(200.0), CompassPoint::South);
        assert_eq!(CompassPoint::from_bearing(315.0), CompassPoint::NorthWest);
        // 350° rounds up to sector 8, which wraps to north.
        assert_eq!(CompassPoint::from_bearing(350.0), CompassPoint::North);
        assert_eq!(CompassPoint::from_bearing(360.0), CompassPoint::North);
    }

    #[test]
    fn compass_labels() {
        assert_eq!(CompassPoint::East.label(), "В");
        assert_eq!(CompassPoint::SouthWest.to_string(), "ЮЗ");
    }

    #[test]
    fn weather_code_lookup_and_fallback() {
        assert_eq!(WeatherCode(0).description(), "Ясно");
        assert_eq!(WeatherCode(0).icon(), "☀️");
        assert_eq!(WeatherCode(95).description(), "Гроза");
        assert_eq!(WeatherCode(66).icon(), "🌧️❄️");

        assert_eq!(WeatherCode(42).known_description(), None);
        assert_eq!(WeatherCode(42).description(), WeatherCode::UNKNOWN_DESCRIPTION);
        assert_eq!(WeatherCode(42).icon(), WeatherCode::UNKNOWN_ICON);
    }

    #[test]
    fn persisted_widget_json_shape() {
        let entry = PersistedWidget {
            coordinates: Coordinate { latitude: 55.75, longitude: 37.61 },
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(entry).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "coordinates": { "latitude": 55.75, "longitude": 37.61 },
                "timestamp": 1_700_000_000_000_i64
            })
        );
    }
}
