//! Pose label handling
//!
//! The pose model reports one probability per class every frame. The
//! stabilizer filters those down to a single confident label, and
//! `lane_for_label` turns that label into a catcher lane.

use serde::{Deserialize, Serialize};

use crate::sim::Lane;

/// Map a stabilized label to a lane.
///
/// Accepts the Korean class names the model is trained with and their
/// English equivalents (case-insensitive). Anything else is `None`.
pub fn lane_for_label(label: &str) -> Option<Lane> {
    let label = label.trim();
    match label {
        "왼쪽" => return Some(Lane::Left),
        "가운데" => return Some(Lane::Center),
        "오른쪽" => return Some(Lane::Right),
        _ => {}
    }
    match label.to_ascii_uppercase().as_str() {
        "LEFT" => Some(Lane::Left),
        "CENTER" => Some(Lane::Center),
        "RIGHT" => Some(Lane::Right),
        _ => None,
    }
}

/// One class probability from the pose model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(alias = "className")]
    pub class_name: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(class_name: &str, probability: f32) -> Self {
        Self {
            class_name: class_name.to_string(),
            probability,
        }
    }
}

/// Confidence + agreement filter over per-frame predictions
#[derive(Debug, Clone)]
pub struct PredictionStabilizer {
    threshold: f32,
    smoothing_frames: usize,
    /// Label currently winning, and how many frames in a row
    candidate: Option<(String, usize)>,
    stable: Option<String>,
}

impl PredictionStabilizer {
    pub fn new(threshold: f32, smoothing_frames: usize) -> Self {
        Self {
            threshold,
            smoothing_frames: smoothing_frames.max(1),
            candidate: None,
            stable: None,
        }
    }

    /// Feed one frame of predictions; returns the stable label, if any.
    ///
    /// A label becomes stable after topping the frame with at least
    /// `threshold` probability for `smoothing_frames` frames in a row. The
    /// stable label persists through unconfident frames.
    pub fn stabilize(&mut self, predictions: &[Prediction]) -> Option<&str> {
        let top = predictions
            .iter()
            .filter(|p| p.probability.is_finite())
            .max_by(|a, b| a.probability.total_cmp(&b.probability));

        match top {
            Some(p) if p.probability >= self.threshold => {
                let count = match &self.candidate {
                    Some((label, count)) if *label == p.class_name => count + 1,
                    _ => 1,
                };
                self.candidate = Some((p.class_name.clone(), count));
                if count >= self.smoothing_frames && self.stable.as_deref() != Some(p.class_name.as_str()) {
                    log::debug!("stable label -> {}", p.class_name);
                    self.stable = Some(p.class_name.clone());
                }
            }
            _ => self.candidate = None,
        }

        self.stable.as_deref()
    }

    pub fn stable_label(&self) -> Option<&str> {
        self.stable.as_deref()
    }

    pub fn reset(&mut self) {
        self.candidate = None;
        self.stable = None;
    }
}
