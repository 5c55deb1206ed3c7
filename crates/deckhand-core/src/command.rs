// ── Transport commands ──
//
// All write operations flow through a single `TransportCommand` enum.
// Parameters are validated locally; anything rejected here never
// produces network traffic.

use deckhand_api::MAX_SHUTTLE_SPEED;

use crate::error::CoreError;

/// A mutating operation against the session's transport sub-unit.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    Play,
    Stop,
    /// Start recording, optionally naming the new clip.
    Record { clip_name: Option<String> },
    /// Wind at a signed multiple of play speed.
    Shuttle { speed: f64 },
}

impl TransportCommand {
    /// Check parameters before dispatch.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Shuttle { speed } if !speed.is_finite() => Err(CoreError::ValidationFailed {
                message: format!("shuttle speed {speed} is not a finite number"),
            }),
            Self::Shuttle { speed } if speed.abs() > MAX_SHUTTLE_SPEED => {
                Err(CoreError::ValidationFailed {
                    message: format!(
                        "shuttle speed {speed} outside supported range ±{MAX_SHUTTLE_SPEED}"
                    ),
                })
            }
            Self::Record {
                clip_name: Some(name),
            } if name.trim().is_empty() => Err(CoreError::ValidationFailed {
                message: "clip name must not be blank".into(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_commands_always_valid() {
        assert!(TransportCommand::Play.validate().is_ok());
        assert!(TransportCommand::Stop.validate().is_ok());
        assert!(
            TransportCommand::Record { clip_name: None }
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn shuttle_speed_bounds_enforced() {
        assert!(TransportCommand::Shuttle { speed: 2.0 }.validate().is_ok());
        assert!(
            TransportCommand::Shuttle { speed: -50.0 }
                .validate()
                .is_ok()
        );
        assert!(
            TransportCommand::Shuttle { speed: 50.5 }
                .validate()
                .is_err()
        );
        assert!(
            TransportCommand::Shuttle { speed: f64::NAN }
                .validate()
                .is_err()
        );
        assert!(
            TransportCommand::Shuttle {
                speed: f64::INFINITY
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn blank_clip_name_rejected() {
        let cmd = TransportCommand::Record {
            clip_name: Some("  ".into()),
        };
        assert!(matches!(
            cmd.validate(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }
}
