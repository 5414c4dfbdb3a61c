//! Player preferences
//!
//! Stored as individual keys next to the best score, so a corrupt value only
//! resets that one preference.

use crate::persistence::{Storage, keys, read_or_warn, write_or_warn};

/// Sky lighting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleMode {
    /// Slow day/night loop
    #[default]
    Auto,
    Night,
    Dawn,
    Day,
}

impl CycleMode {
    pub const ALL: [CycleMode; 4] = [CycleMode::Auto, CycleMode::Night, CycleMode::Dawn, CycleMode::Day];

    pub fn as_str(&self) -> &'static str {
        match self {
            CycleMode::Auto => "auto",
            CycleMode::Night => "night",
            CycleMode::Dawn => "dawn",
            CycleMode::Day => "day",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(CycleMode::Auto),
            "night" => Some(CycleMode::Night),
            "dawn" => Some(CycleMode::Dawn),
            "day" => Some(CycleMode::Day),
            _ => None,
        }
    }

    /// Next mode in the T-key rotation
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Sky phase in [0, 1] (0 = deep night, 1 = noon). `clock` is seconds
    /// since page load and only matters for `Auto`.
    pub fn sky_phase(&self, clock: f64) -> f32 {
        match self {
            CycleMode::Auto => (((clock * 0.05).sin() + 1.0) * 0.5) as f32,
            CycleMode::Night => 0.05,
            CycleMode::Dawn => 0.35,
            CycleMode::Day => 1.0,
        }
    }
}

/// Weather overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherMode {
    #[default]
    None,
    Rain,
    Snow,
    Fog,
    /// Rain plus lightning
    Storm,
}

impl WeatherMode {
    pub const ALL: [WeatherMode; 5] = [
        WeatherMode::None,
        WeatherMode::Rain,
        WeatherMode::Snow,
        WeatherMode::Fog,
        WeatherMode::Storm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherMode::None => "none",
            WeatherMode::Rain => "rain",
            WeatherMode::Snow => "snow",
            WeatherMode::Fog => "fog",
            WeatherMode::Storm => "storm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "clear" => Some(WeatherMode::None),
            "rain" => Some(WeatherMode::Rain),
            "snow" => Some(WeatherMode::Snow),
            "fog" => Some(WeatherMode::Fog),
            "storm" => Some(WeatherMode::Storm),
            _ => None,
        }
    }

    /// Next mode in the R-key rotation
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Whether this mode flashes the screen
    pub fn has_lightning(&self) -> bool {
        matches!(self, WeatherMode::Storm)
    }
}

/// Player preferences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Reduced motion (half-rate ramp, smaller shake, no dust, no flashes)
    pub reduced_motion: bool,
    pub cycle: CycleMode,
    pub weather: WeatherMode,
    /// Tutorial hint already dismissed once
    pub hint_done: bool,
}

impl Settings {
    /// Load every preference, falling back per key
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        let flag = |v: &str| match v {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        };
        let settings = Self {
            reduced_motion: read_or_warn(storage, keys::REDUCED_MOTION, flag).unwrap_or(false),
            cycle: read_or_warn(storage, keys::CYCLE, CycleMode::from_str).unwrap_or_default(),
            weather: read_or_warn(storage, keys::WEATHER, WeatherMode::from_str).unwrap_or_default(),
            hint_done: read_or_warn(storage, keys::HINT_DONE, flag).unwrap_or(false),
        };
        log::info!(
            "Settings: cycle={} weather={} reduced_motion={}",
            settings.cycle.as_str(),
            settings.weather.as_str(),
            settings.reduced_motion
        );
        settings
    }

    /// Save every preference
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) {
        write_or_warn(storage, keys::REDUCED_MOTION, bit(self.reduced_motion));
        write_or_warn(storage, keys::CYCLE, self.cycle.as_str());
        write_or_warn(storage, keys::WEATHER, self.weather.as_str());
        if self.hint_done {
            write_or_warn(storage, keys::HINT_DONE, "1");
        }
    }

    pub fn cycle_next(&mut self) -> CycleMode {
        self.cycle = self.cycle.next();
        log::info!("Day cycle: {}", self.cycle.as_str());
        self.cycle
    }

    pub fn weather_next(&mut self) -> WeatherMode {
        self.weather = self.weather.next();
        log::info!("Weather: {}", self.weather.as_str());
        self.weather
    }

    /// Camera shake allowed at full amplitude
    pub fn effective_full_shake(&self) -> bool {
        !self.reduced_motion
    }

    /// Storm lightning flashes (suppressed under reduced motion)
    pub fn effective_lightning(&self) -> bool {
        self.weather.has_lightning() && !self.reduced_motion
    }

    /// Particle density multiplier for weather overlays
    pub fn effective_weather_density(&self) -> f32 {
        match (self.weather, self.reduced_motion) {
            (WeatherMode::None, _) => 0.0,
            (_, true) => 0.4,
            (_, false) => 1.0,
        }
    }
}

fn bit(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_defaults_from_empty_storage() {
        let s = Settings::load(&MemoryStorage::new());
        assert_eq!(s, Settings::default());
        assert_eq!(s.cycle, CycleMode::Auto);
        assert_eq!(s.weather, WeatherMode::None);
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::new();
        let s = Settings {
            reduced_motion: true,
            cycle: CycleMode::Dawn,
            weather: WeatherMode::Storm,
            hint_done: true,
        };
        s.save(&mut storage);
        assert_eq!(storage.get(keys::REDUCED_MOTION).unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get(keys::CYCLE).unwrap().as_deref(), Some("dawn"));
        assert_eq!(Settings::load(&storage), s);
    }

    #[test]
    fn test_saved_values_are_plain_strings() {
        let mut storage = MemoryStorage::new();
        let s = Settings {
            weather: WeatherMode::Storm,
            ..Settings::default()
        };
        s.save(&mut storage);
        assert_eq!(storage.get(keys::WEATHER).unwrap().as_deref(), Some("storm"));
        assert_eq!(storage.get(keys::CYCLE).unwrap().as_deref(), Some("auto"));
        assert_eq!(storage.get(keys::REDUCED_MOTION).unwrap().as_deref(), Some("0"));
        assert_eq!(storage.get(keys::HINT_DONE).unwrap(), None);
    }

    #[test]
    fn test_bad_value_only_resets_that_key() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::CYCLE, "midnight").unwrap();
        storage.set(keys::WEATHER, "snow").unwrap();
        let s = Settings::load(&storage);
        assert_eq!(s.cycle, CycleMode::Auto);
        assert_eq!(s.weather, WeatherMode::Snow);
    }

    #[test]
    fn test_rotations_wrap() {
        let mut s = Settings::default();
        let seen: Vec<_> = (0..4).map(|_| s.cycle_next()).collect();
        assert_eq!(seen, vec![CycleMode::Night, CycleMode::Dawn, CycleMode::Day, CycleMode::Auto]);
        for _ in 0..WeatherMode::ALL.len() {
            s.weather_next();
        }
        assert_eq!(s.weather, WeatherMode::None);
    }

    #[test]
    fn test_mode_strings_parse_back() {
        for m in CycleMode::ALL {
            assert_eq!(CycleMode::from_str(m.as_str()), Some(m));
        }
        for m in WeatherMode::ALL {
            assert_eq!(WeatherMode::from_str(m.as_str()), Some(m));
        }
        assert_eq!(WeatherMode::from_str("RAIN"), Some(WeatherMode::Rain));
    }

    #[test]
    fn test_reduced_motion_suppresses_lightning() {
        let mut s = Settings {
            weather: WeatherMode::Storm,
            ..Settings::default()
        };
        assert!(s.effective_lightning());
        s.reduced_motion = true;
        assert!(!s.effective_lightning());
        assert!(!s.effective_full_shake());
        assert_eq!(s.effective_weather_density(), 0.4);
    }

    #[test]
    fn test_fixed_sky_phases() {
        assert_eq!(CycleMode::Night.sky_phase(123.0), 0.05);
        assert_eq!(CycleMode::Day.sky_phase(0.0), 1.0);
        let p = CycleMode::Auto.sky_phase(10.0);
        assert!((0.0..=1.0).contains(&p));
    }
}
