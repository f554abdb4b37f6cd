//! Flash, torch, lens and rotation settings.

use serde::{Deserialize, Serialize};

/// Strobe behavior during still capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    /// Fire on every still capture.
    On,
    /// Never fire.
    #[default]
    Off,
    /// Let the camera decide.
    Auto,
}

named_setting!(FlashMode, "flash mode", { On => "on", Off => "off", Auto => "auto" });

impl FlashMode {
    /// Next mode in the Off → On → Auto → Off cycle.
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Auto,
            Self::Auto => Self::Off,
        }
    }

    /// Whether the flash should fire for a still capture.
    pub fn fires(self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Continuous illumination, independent of capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TorchMode {
    /// Light stays on while a session is open.
    On,
    /// Light off.
    #[default]
    Off,
    /// Light follows scene brightness, where the camera supports it.
    Auto,
}

named_setting!(TorchMode, "torch mode", { On => "on", Off => "off", Auto => "auto" });

impl TorchMode {
    /// Torch toggling only switches between on and off; auto turns off.
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On | Self::Auto => Self::Off,
        }
    }
}

/// Physical camera selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraLens {
    /// Whatever the backend considers its primary camera.
    Default,
    /// The user-facing camera.
    Front,
    /// The camera facing away from the user.
    #[default]
    Back,
}

named_setting!(CameraLens, "camera lens", {
    Default => "default",
    Front => "front",
    Back => "back",
});

impl CameraLens {
    /// The opposite facing lens. `Default` switches to `Front`.
    pub fn toggled(self) -> Self {
        match self {
            Self::Back | Self::Default => Self::Front,
            Self::Front => Self::Back,
        }
    }
}

/// Output image orientation correction, clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// Quarter turn.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three quarter turn.
    Deg270,
}

named_setting!(Rotation, "rotation", {
    Deg0 => "0",
    Deg90 => "90",
    Deg180 => "180",
    Deg270 => "270",
});

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Whether applying this rotation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = super::ParseSettingError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        degrees.to_string().parse()
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_toggle_cycle() {
        let mut mode = FlashMode::Off;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = mode.toggled();
            seen.push(mode);
        }
        assert_eq!(seen, vec![FlashMode::On, FlashMode::Auto, FlashMode::Off]);
    }

    #[test]
    fn test_torch_toggle_never_returns_auto() {
        assert_eq!(TorchMode::Off.toggled(), TorchMode::On);
        assert_eq!(TorchMode::On.toggled(), TorchMode::Off);
        assert_eq!(TorchMode::Auto.toggled(), TorchMode::Off);
    }

    #[test]
    fn test_lens_toggle() {
        assert_eq!(CameraLens::Back.toggled(), CameraLens::Front);
        assert_eq!(CameraLens::Front.toggled(), CameraLens::Back);
        assert_eq!(CameraLens::Default.toggled(), CameraLens::Front);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("AUTO".parse::<FlashMode>().unwrap(), FlashMode::Auto);
        assert_eq!(" front ".parse::<CameraLens>().unwrap(), CameraLens::Front);
        assert_eq!("270".parse::<Rotation>().unwrap(), Rotation::Deg270);
    }

    #[test]
    fn test_parse_error_lists_choices() {
        let err = "strobe".parse::<FlashMode>().unwrap_err();
        assert_eq!(err.kind, "flash mode");
        assert_eq!(err.expected, "on, off, auto");
        assert!(err.to_string().contains("\"strobe\""));
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::try_from(90).unwrap(), Rotation::Deg90);
        assert!(Rotation::try_from(45).is_err());
        assert!(Rotation::Deg270.swaps_dimensions());
        assert!(!Rotation::Deg180.swaps_dimensions());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(FlashMode::default(), FlashMode::Off);
        assert_eq!(TorchMode::default(), TorchMode::Off);
        assert_eq!(CameraLens::default(), CameraLens::Back);
        assert_eq!(Rotation::default().degrees(), 0);
    }
}
