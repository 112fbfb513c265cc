//! Geometry types and the visibility check-point model.
//!
//! Every element property read is best-effort: a read that fails (or finds
//! the element detached) leaves its field `None` instead of aborting the run.
//! The verdict reducer is therefore pure and total over these types.

use serde::Deserialize;
use std::fmt;

/// Viewport-relative element bounds, captured at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Size of the browser's visible drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Raw per-field element read, straight from the in-page probe script.
///
/// Field-level `null`s mean that particular read failed inside the page;
/// the whole snapshot being absent means the element went stale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CtaSnapshot {
    pub visible: Option<bool>,
    pub rect: Option<BoundingBox>,
    pub enabled: Option<bool>,
    pub text: Option<String>,
    pub class_attr: Option<String>,
}

/// When a check point was taken relative to the scroll action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    AfterScroll,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initial => write!(f, "initial"),
            Phase::AfterScroll => write!(f, "after scroll"),
        }
    }
}

/// Viewport containment rule.
///
/// The policy is explicit configuration rather than a single hardcoded rule:
/// `VerticalMargin` checks the vertical span only and tolerates the element
/// overhanging the bottom edge by up to `margin_px`; `StrictAllEdges`
/// requires the box fully inside the viewport on all four sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContainmentPolicy {
    VerticalMargin { margin_px: f64 },
    StrictAllEdges,
}

impl Default for ContainmentPolicy {
    fn default() -> Self {
        ContainmentPolicy::VerticalMargin { margin_px: 100.0 }
    }
}

impl ContainmentPolicy {
    pub fn contains(&self, bbox: &BoundingBox, viewport: &ViewportSize) -> bool {
        match self {
            ContainmentPolicy::VerticalMargin { margin_px } => {
                bbox.y >= 0.0 && bbox.y + bbox.height <= viewport.height + margin_px
            }
            ContainmentPolicy::StrictAllEdges => {
                bbox.x >= 0.0
                    && bbox.y >= 0.0
                    && bbox.x + bbox.width <= viewport.width
                    && bbox.y + bbox.height <= viewport.height
            }
        }
    }
}

/// One measurement of the resolved element, before or after the scroll.
#[derive(Debug, Clone)]
pub struct CheckPoint {
    pub phase: Phase,
    pub visible: Option<bool>,
    pub bounding_box: Option<BoundingBox>,
    /// `None` when the box or the viewport size was unavailable.
    pub in_viewport: Option<bool>,
}

impl CheckPoint {
    /// Build a check point from a best-effort snapshot. A stale element is
    /// passed in as `None` and yields an all-unknown check point.
    pub fn from_snapshot(
        phase: Phase,
        snapshot: Option<&CtaSnapshot>,
        viewport: Option<&ViewportSize>,
        policy: ContainmentPolicy,
    ) -> Self {
        let visible = snapshot.and_then(|s| s.visible);
        let bounding_box = snapshot.and_then(|s| s.rect);
        let in_viewport = match (bounding_box.as_ref(), viewport) {
            (Some(bbox), Some(vp)) => Some(policy.contains(bbox, vp)),
            _ => None,
        };
        Self {
            phase,
            visible,
            bounding_box,
            in_viewport,
        }
    }
}
