//! # Animation Config
//!
//! Declarative per-node animation settings.
//!
//! A config is a two-state machine: `disabled → enabled`. While enabled the
//! remaining fields fully determine an [`AnimationDescriptor`]; type-specific
//! parameters that were left unset fall back to per-type defaults.
//!
//! Preview playback carries no persisted state. [`AnimationPreview`] is a
//! replay counter: bumping it asks the presentation layer to remount the
//! animated node so it runs again from its initial state.

use serde::{Deserialize, Serialize};

/// `repeat` value meaning "loop forever"
pub const REPEAT_FOREVER: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    Fade,
    Slide,
    Scale,
    Rotate,
    Bounce,
    Pulse,
    Shake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationTrigger {
    Load,
    Hover,
    Click,
    InView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub trigger: AnimationTrigger,
    /// Seconds
    pub duration: f64,
    /// Seconds
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub repeat: u32,
    #[serde(default = "default_ease")]
    pub ease: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
}

fn default_ease() -> String {
    "easeOut".to_string()
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: AnimationKind::Fade,
            trigger: AnimationTrigger::Load,
            duration: 0.5,
            delay: 0.0,
            repeat: 0,
            ease: default_ease(),
            direction: None,
            distance: None,
            angle: None,
            intensity: None,
        }
    }
}

/// Timing shared by every animation kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub duration: f64,
    pub delay: f64,
    pub repeat: u32,
    pub ease: String,
}

/// Type-specific parameters, defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnimationParams {
    Fade,
    Slide { direction: Direction, distance: f64 },
    Scale { intensity: f64 },
    Rotate { angle: f64 },
    Bounce { distance: f64 },
    Pulse { intensity: f64 },
    Shake { intensity: f64 },
}

/// Fully resolved animation handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDescriptor {
    pub trigger: AnimationTrigger,
    pub timing: Timing,
    pub params: AnimationParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationState {
    Disabled,
    Enabled(AnimationDescriptor),
}

impl AnimationConfig {
    pub fn new(kind: AnimationKind, trigger: AnimationTrigger) -> Self {
        Self {
            kind,
            trigger,
            ..Self::default()
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn state(&self) -> AnimationState {
        if !self.enabled {
            return AnimationState::Disabled;
        }
        AnimationState::Enabled(self.descriptor())
    }

    fn descriptor(&self) -> AnimationDescriptor {
        let params = match self.kind {
            AnimationKind::Fade => AnimationParams::Fade,
            AnimationKind::Slide => AnimationParams::Slide {
                direction: self.direction.unwrap_or(Direction::Up),
                distance: self.distance.unwrap_or(50.0),
            },
            AnimationKind::Scale => AnimationParams::Scale {
                intensity: self.intensity.unwrap_or(0.8),
            },
            AnimationKind::Rotate => AnimationParams::Rotate {
                angle: self.angle.unwrap_or(180.0),
            },
            AnimationKind::Bounce => AnimationParams::Bounce {
                distance: self.distance.unwrap_or(20.0),
            },
            AnimationKind::Pulse => AnimationParams::Pulse {
                intensity: self.intensity.unwrap_or(1.1),
            },
            AnimationKind::Shake => AnimationParams::Shake {
                intensity: self.intensity.unwrap_or(10.0),
            },
        };

        AnimationDescriptor {
            trigger: self.trigger,
            timing: Timing {
                duration: self.duration.max(0.0),
                delay: self.delay.max(0.0),
                repeat: self.repeat,
                ease: self.ease.clone(),
            },
            params,
        }
    }
}

/// Restart-on-demand preview counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationPreview {
    replay: u64,
}

impl AnimationPreview {
    pub fn replay(&mut self) -> u64 {
        self.replay += 1;
        self.replay
    }

    /// Key that changes whenever the preview must remount
    pub fn remount_key(&self) -> u64 {
        self.replay
    }
}
