//! Closed value sets governing capture behavior.
//!
//! Every setting serializes as a lowercase string (rotation as its degree
//! number) and parses back from the same text, so the same values work on
//! the command line and in TOML configuration files.

use thiserror::Error;

/// Error returned when text does not name a known setting value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?} (expected one of: {expected})")]
pub struct ParseSettingError {
    /// Setting being parsed.
    pub kind: &'static str,
    /// Offending input.
    pub value: String,
    /// Accepted spellings, comma separated.
    pub expected: &'static str,
}

/// Implements `Display` and `FromStr` for a fieldless enum using the given
/// lowercase names.
macro_rules! named_setting {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase name of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::settings::ParseSettingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err($crate::settings::ParseSettingError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: concat!($($name, ", "),+).trim_end_matches(", "),
                    }),
                }
            }
        }
    };
}

mod modes;
mod output;

pub use modes::{CameraLens, FlashMode, Rotation, TorchMode};
pub use output::{Directory, ImageFormat};
