use std::convert::TryFrom;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Straight-alpha color with channels in `[0, 1]`.
///
/// Serialized as a CSS-style hex string so config files can say
/// `"particleColor": "#00c8ff"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl FromStr for Rgba {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_owned());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |digits: &str| -> Result<f32, ConfigError> {
            let value = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
            Ok(f32::from(value) / 255.0)
        };
        match hex.len() {
            3 => {
                let mut channels = [0.0; 3];
                for (i, c) in hex.chars().enumerate() {
                    channels[i] = channel(&c.to_string().repeat(2))?;
                }
                Ok(Self::rgb(channels[0], channels[1], channels[2]))
            }
            6 | 8 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    1.0
                },
            }),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ConfigError;
    fn try_from(s: String) -> Result<Self, ConfigError> {
        s.parse()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let byte = |c: f32| (c.max(0.0).min(1.0) * 255.0).round() as u8;
        write!(f, "#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))?;
        if self.a < 1.0 {
            write!(f, "{:02x}", byte(self.a))?;
        }
        Ok(())
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> String {
        color.to_string()
    }
}

/// Named sets of tunables. Both behave identically, only the numbers differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Many slow, small particles.
    Calm,
    /// Fewer, faster and larger particles.
    Bold,
}

impl FromStr for Preset {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "calm" => Ok(Preset::Calm),
            "bold" => Ok(Preset::Bold),
            _ => Err(format!("unknown preset {:?}, expected calm or bold", s)),
        }
    }
}

/// Tunables of a [`ParticleField`](crate::ParticleField).
///
/// Fixed once the field is built; changing anything means building a new field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FieldConfig {
    pub particle_count: usize,
    pub particle_color: Rgba,
    pub line_color: Rgba,
    /// Opacity of a line between two coincident particles.
    pub line_opacity: f32,
    /// Pairs closer than this many pixels are connected.
    pub line_distance: f32,
    pub line_width: f32,
    /// Scale of the initial random velocity, in pixels per tick.
    pub particle_speed: f32,
    pub particle_size: f32,
    pub glow_radius: f32,
    pub mouse_interaction: bool,
    pub mouse_radius: f32,
    /// Fraction of the repulsion force applied to velocity each tick.
    pub repulsion_strength: f32,
    /// Per-tick velocity multiplier.
    pub damping: f32,
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::preset(Preset::Calm)
    }
}

impl FieldConfig {
    pub const CYAN: Rgba = Rgba::rgb(0.0, 200.0 / 255.0, 1.0);

    pub fn preset(preset: Preset) -> Self {
        let calm = Self {
            particle_count: 50,
            particle_color: Self::CYAN,
            line_color: Self::CYAN,
            line_opacity: 0.2,
            line_distance: 150.0,
            line_width: 1.0,
            particle_speed: 0.3,
            particle_size: 2.0,
            glow_radius: 10.0,
            mouse_interaction: true,
            mouse_radius: 100.0,
            repulsion_strength: 0.02,
            damping: 0.99,
            seed: None,
        };
        match preset {
            Preset::Calm => calm,
            Preset::Bold => Self {
                particle_count: 20,
                particle_speed: 0.8,
                particle_size: 3.0,
                ..calm
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        check("lineOpacity", self.line_opacity, "within [0, 1]", |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check("lineDistance", self.line_distance, "positive", positive)?;
        check("lineWidth", self.line_width, "positive", positive)?;
        check("particleSpeed", self.particle_speed, "positive", positive)?;
        check("particleSize", self.particle_size, "positive", positive)?;
        check("glowRadius", self.glow_radius, "non-negative", |v| v >= 0.0)?;
        check("mouseRadius", self.mouse_radius, "positive", positive)?;
        check(
            "repulsionStrength",
            self.repulsion_strength,
            "non-negative",
            |v| v >= 0.0,
        )?;
        check("damping", self.damping, "within (0, 1]", |v| {
            v > 0.0 && v <= 1.0
        })?;
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value > 0.0
}

fn check(
    name: &'static str,
    value: f32,
    expected: &'static str,
    ok: impl Fn(f32) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            expected,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        let short: Rgba = "#0cf".parse().unwrap();
        assert_eq!(short, Rgba::rgb(0.0, 0.8, 1.0));

        let long: Rgba = "#00c8ff".parse().unwrap();
        assert_eq!(long, FieldConfig::CYAN);

        let translucent: Rgba = "#ffffff80".parse().unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in &["00c8ff", "#00c8f", "#zzzzzz", "#", "#ééé", "#+f+f+f", "#+ff"] {
            assert!(
                matches!(bad.parse::<Rgba>(), Err(ConfigError::InvalidColor(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn color_survives_json() {
        let json = serde_json::to_string(&FieldConfig::CYAN).unwrap();
        assert_eq!(json, "\"#00c8ff\"");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            FieldConfig::from_json(r##"{ "particleCount": 7, "lineColor": "#ff0000" }"##)
                .unwrap();
        assert_eq!(config.particle_count, 7);
        assert_eq!(config.line_color, Rgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(config.line_distance, 150.0);
        assert!(config.mouse_interaction);
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let result = FieldConfig::from_json(r#"{ "particlecount": 3 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_out_of_range_options() {
        let cases: Vec<(&str, Box<dyn Fn(&mut FieldConfig)>)> = vec![
            ("lineOpacity", Box::new(|c: &mut FieldConfig| c.line_opacity = 1.5)),
            ("lineDistance", Box::new(|c: &mut FieldConfig| c.line_distance = 0.0)),
            ("particleSpeed", Box::new(|c: &mut FieldConfig| c.particle_speed = -1.0)),
            ("particleSize", Box::new(|c: &mut FieldConfig| c.particle_size = f32::NAN)),
            ("mouseRadius", Box::new(|c: &mut FieldConfig| c.mouse_radius = 0.0)),
            ("damping", Box::new(|c: &mut FieldConfig| c.damping = 1.01)),
        ];
        for (expected_name, mutate) in cases {
            let mut config = FieldConfig::default();
            mutate(&mut config);
            match config.validate() {
                Err(ConfigError::OutOfRange { name, .. }) => assert_eq!(name, expected_name),
                other => panic!("{}: unexpected {:?}", expected_name, other),
            }
        }

        let mut empty = FieldConfig::default();
        empty.particle_count = 0;
        assert!(matches!(empty.validate(), Err(ConfigError::NoParticles)));
    }

    #[test]
    fn presets_differ_only_in_numbers() {
        let calm = FieldConfig::preset(Preset::Calm);
        let bold = FieldConfig::preset(Preset::Bold);
        assert_eq!(calm, FieldConfig::default());
        assert_eq!(bold.particle_count, 20);
        assert!(bold.particle_speed > calm.particle_speed);
        assert!(bold.particle_size > calm.particle_size);
        assert_eq!(bold.mouse_interaction, calm.mouse_interaction);
        assert!(bold.validate().is_ok());
        assert_eq!("BOLD".parse::<Preset>(), Ok(Preset::Bold));
    }
}
