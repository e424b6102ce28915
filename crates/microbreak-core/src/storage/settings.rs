//! User settings.
//!
//! Stored as TOML. Loading is lenient: every field is read on its own and
//! falls back to its default when missing or invalid, and a payload that is
//! not a TOML table at all yields the defaults wholesale.

use std::ops::RangeInclusive;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::audio::is_known_sound;
use crate::error::{SettingsError, ValidationError};
use crate::protocol::Cue;

pub const FOCUS_MINUTES: RangeInclusive<u32> = 1..=240;
pub const INTERVAL_MINUTES: RangeInclusive<u32> = 1..=60;
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 1..=60;

/// Settings keys, in display order.
pub const KEYS: &[&str] = &[
    "focus_duration_minutes",
    "short_break_min_interval_minutes",
    "short_break_max_interval_minutes",
    "long_break_duration_minutes",
    "short_break_sound",
    "end_sound",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub focus_duration_minutes: u32,
    pub short_break_min_interval_minutes: u32,
    pub short_break_max_interval_minutes: u32,
    pub long_break_duration_minutes: u32,
    pub short_break_sound: String,
    pub end_sound: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration_minutes: 60,
            short_break_min_interval_minutes: 5,
            short_break_max_interval_minutes: 8,
            long_break_duration_minutes: 10,
            short_break_sound: "bell-soft".into(),
            end_sound: "success-chime".into(),
        }
    }
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub focus_duration_minutes: Option<u32>,
    pub short_break_min_interval_minutes: Option<u32>,
    pub short_break_max_interval_minutes: Option<u32>,
    pub long_break_duration_minutes: Option<u32>,
    pub short_break_sound: Option<String>,
    pub end_sound: Option<String>,
}

impl Settings {
    /// Checks every constraint. Reports the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_minutes("focus_duration_minutes", self.focus_duration_minutes, &FOCUS_MINUTES)?;
        check_minutes(
            "short_break_min_interval_minutes",
            self.short_break_min_interval_minutes,
            &INTERVAL_MINUTES,
        )?;
        check_minutes(
            "short_break_max_interval_minutes",
            self.short_break_max_interval_minutes,
            &INTERVAL_MINUTES,
        )?;
        check_minutes(
            "long_break_duration_minutes",
            self.long_break_duration_minutes,
            &LONG_BREAK_MINUTES,
        )?;
        if self.short_break_min_interval_minutes > self.short_break_max_interval_minutes {
            return Err(ValidationError::IntervalBoundsInverted {
                min: self.short_break_min_interval_minutes,
                max: self.short_break_max_interval_minutes,
            });
        }
        check_sound("short_break_sound", &self.short_break_sound)?;
        check_sound("end_sound", &self.end_sound)?;
        Ok(())
    }

    /// Applies `patch` on top of `self`. The result is not validated.
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        Self {
            focus_duration_minutes: patch.focus_duration_minutes.unwrap_or(self.focus_duration_minutes),
            short_break_min_interval_minutes: patch
                .short_break_min_interval_minutes
                .unwrap_or(self.short_break_min_interval_minutes),
            short_break_max_interval_minutes: patch
                .short_break_max_interval_minutes
                .unwrap_or(self.short_break_max_interval_minutes),
            long_break_duration_minutes: patch
                .long_break_duration_minutes
                .unwrap_or(self.long_break_duration_minutes),
            short_break_sound: patch.short_break_sound.unwrap_or_else(|| self.short_break_sound.clone()),
            end_sound: patch.end_sound.unwrap_or_else(|| self.end_sound.clone()),
        }
    }

    /// The sound configured for a cue.
    pub fn sound_for(&self, cue: Cue) -> &str {
        match cue {
            Cue::ShortBreak => &self.short_break_sound,
            Cue::End => &self.end_sound,
        }
    }

    /// Lenient parse: field-by-field over the defaults.
    pub fn from_toml_str(content: &str) -> Self {
        let table = match content.parse::<toml::Table>() {
            Ok(table) => table,
            Err(e) => {
                warn!("Stored settings are malformed, using defaults: {e}");
                return Self::default();
            }
        };

        let defaults = Self::default();
        let minutes = |key: &str, range: &RangeInclusive<u32>, fallback: u32| -> u32 {
            let Some(value) = table.get(key) else {
                return fallback;
            };
            match value.as_integer().and_then(|n| u32::try_from(n).ok()) {
                Some(n) if range.contains(&n) => n,
                _ => {
                    warn!("Ignoring stored '{key}' = {value}, using {fallback}");
                    fallback
                }
            }
        };
        let sound = |key: &str, fallback: &str| -> String {
            let Some(value) = table.get(key) else {
                return fallback.to_string();
            };
            match value.as_str() {
                Some(id) if is_known_sound(id) => id.to_string(),
                _ => {
                    warn!("Ignoring stored '{key}' = {value}, using {fallback}");
                    fallback.to_string()
                }
            }
        };

        let mut settings = Self {
            focus_duration_minutes: minutes("focus_duration_minutes", &FOCUS_MINUTES, defaults.focus_duration_minutes),
            short_break_min_interval_minutes: minutes(
                "short_break_min_interval_minutes",
                &INTERVAL_MINUTES,
                defaults.short_break_min_interval_minutes,
            ),
            short_break_max_interval_minutes: minutes(
                "short_break_max_interval_minutes",
                &INTERVAL_MINUTES,
                defaults.short_break_max_interval_minutes,
            ),
            long_break_duration_minutes: minutes(
                "long_break_duration_minutes",
                &LONG_BREAK_MINUTES,
                defaults.long_break_duration_minutes,
            ),
            short_break_sound: sound("short_break_sound", &defaults.short_break_sound),
            end_sound: sound("end_sound", &defaults.end_sound),
        };

        if settings.short_break_min_interval_minutes > settings.short_break_max_interval_minutes {
            warn!(
                "Stored short-break interval {}..{} is inverted, using defaults",
                settings.short_break_min_interval_minutes, settings.short_break_max_interval_minutes
            );
            settings.short_break_min_interval_minutes = defaults.short_break_min_interval_minutes;
            settings.short_break_max_interval_minutes = defaults.short_break_max_interval_minutes;
        }

        settings
    }

    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized.
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get a settings value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "focus_duration_minutes" => self.focus_duration_minutes.to_string(),
            "short_break_min_interval_minutes" => self.short_break_min_interval_minutes.to_string(),
            "short_break_max_interval_minutes" => self.short_break_max_interval_minutes.to_string(),
            "long_break_duration_minutes" => self.long_break_duration_minutes.to_string(),
            "short_break_sound" => self.short_break_sound.clone(),
            "end_sound" => self.end_sound.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a value by key. The whole result must validate, otherwise `self`
    /// is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not parse, or
    /// the updated settings violate a constraint.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let parse_minutes = || {
            value.trim().parse::<u32>().map_err(|e| SettingsError::InvalidValue {
                key: key.to_string(),
                message: format!("cannot parse '{value}' as minutes: {e}"),
            })
        };

        let mut patch = SettingsPatch::default();
        match key {
            "focus_duration_minutes" => patch.focus_duration_minutes = Some(parse_minutes()?),
            "short_break_min_interval_minutes" => {
                patch.short_break_min_interval_minutes = Some(parse_minutes()?)
            }
            "short_break_max_interval_minutes" => {
                patch.short_break_max_interval_minutes = Some(parse_minutes()?)
            }
            "long_break_duration_minutes" => patch.long_break_duration_minutes = Some(parse_minutes()?),
            "short_break_sound" => patch.short_break_sound = Some(value.trim().to_string()),
            "end_sound" => patch.end_sound = Some(value.trim().to_string()),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }

        let updated = self.merged(patch);
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn check_minutes(
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn check_sound(field: &'static str, id: &str) -> Result<(), ValidationError> {
    if is_known_sound(id) {
        Ok(())
    } else {
        Err(ValidationError::UnknownSound {
            field,
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.focus_duration_minutes, 60);
        assert_eq!(settings.short_break_min_interval_minutes, 5);
        assert_eq!(settings.short_break_max_interval_minutes, 8);
        assert_eq!(settings.long_break_duration_minutes, 10);
        assert_eq!(settings.short_break_sound, "bell-soft");
        assert_eq!(settings.end_sound, "success-chime");
    }

    #[test]
    fn toml_roundtrip() {
        let settings = Settings {
            focus_duration_minutes: 90,
            short_break_min_interval_minutes: 3,
            short_break_max_interval_minutes: 5,
            long_break_duration_minutes: 20,
            short_break_sound: "water-drop".into(),
            end_sound: "piano-chord".into(),
        };
        let toml_str = settings.to_toml_string().unwrap();
        assert_eq!(Settings::from_toml_str(&toml_str), settings);
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let settings = Settings::from_toml_str("focus_duration_minutes = 45\nend_sound = \"nature-birds\"\n");
        assert_eq!(settings.focus_duration_minutes, 45);
        assert_eq!(settings.end_sound, "nature-birds");
        assert_eq!(settings.long_break_duration_minutes, 10);
        assert_eq!(settings.short_break_sound, "bell-soft");
    }

    #[test]
    fn invalid_fields_fall_back_individually() {
        let settings = Settings::from_toml_str(
            r#"
            focus_duration_minutes = "ninety"
            long_break_duration_minutes = 0
            short_break_sound = "air-horn"
            end_sound = "meditation-bell"
            unknown_field = true
            "#,
        );
        assert_eq!(settings.focus_duration_minutes, 60);
        assert_eq!(settings.long_break_duration_minutes, 10);
        assert_eq!(settings.short_break_sound, "bell-soft");
        assert_eq!(settings.end_sound, "meditation-bell");
    }

    #[test]
    fn garbage_payload_yields_defaults() {
        assert_eq!(Settings::from_toml_str("{{{ not toml"), Settings::default());
        assert_eq!(Settings::from_toml_str(""), Settings::default());
    }

    #[test]
    fn inverted_stored_bounds_reset_both() {
        let settings = Settings::from_toml_str(
            "short_break_min_interval_minutes = 9\nshort_break_max_interval_minutes = 2\n",
        );
        assert_eq!(settings.short_break_min_interval_minutes, 5);
        assert_eq!(settings.short_break_max_interval_minutes, 8);
    }

    #[test]
    fn validate_reports_violations() {
        let mut settings = Settings::default();
        settings.focus_duration_minutes = 0;
        assert_eq!(
            settings.validate(),
            Err(ValidationError::OutOfRange {
                field: "focus_duration_minutes",
                value: 0,
                min: 1,
                max: 240
            })
        );

        let mut settings = Settings::default();
        settings.short_break_min_interval_minutes = 9;
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::IntervalBoundsInverted { min: 9, max: 8 })
        ));

        let mut settings = Settings::default();
        settings.end_sound = "bell".into();
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::UnknownSound { field: "end_sound", .. })
        ));
    }

    #[test]
    fn min_equal_to_max_is_valid() {
        let mut settings = Settings::default();
        settings.short_break_min_interval_minutes = 3;
        settings.short_break_max_interval_minutes = 3;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn get_and_set_by_key() {
        let mut settings = Settings::default();
        assert_eq!(settings.get("focus_duration_minutes").as_deref(), Some("60"));
        assert_eq!(settings.get("nope"), None);

        settings.set("focus_duration_minutes", "25").unwrap();
        settings.set("short_break_sound", "chime-gentle").unwrap();
        assert_eq!(settings.focus_duration_minutes, 25);
        assert_eq!(settings.get("short_break_sound").as_deref(), Some("chime-gentle"));
    }

    #[test]
    fn set_rejects_bad_input_without_changes() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("focus_duration_minutes", "soon"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set("short_break_min_interval_minutes", "30"),
            Err(SettingsError::Validation(ValidationError::IntervalBoundsInverted { .. }))
        ));
        assert!(matches!(
            settings.set("theme", "dark"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn patch_merges_over_current() {
        let settings = Settings::default().merged(SettingsPatch {
            long_break_duration_minutes: Some(25),
            end_sound: Some("nature-birds".into()),
            ..SettingsPatch::default()
        });
        assert_eq!(settings.long_break_duration_minutes, 25);
        assert_eq!(settings.end_sound, "nature-birds");
        assert_eq!(settings.focus_duration_minutes, 60);
    }

    #[test]
    fn sound_for_cue() {
        let settings = Settings::default();
        assert_eq!(settings.sound_for(Cue::ShortBreak), "bell-soft");
        assert_eq!(settings.sound_for(Cue::End), "success-chime");
    }

    #[test]
    fn every_key_is_readable() {
        let settings = Settings::default();
        for key in KEYS {
            assert!(settings.get(key).is_some(), "missing key {key}");
        }
    }
}
