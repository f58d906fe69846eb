use serde::Deserialize;

use crate::types::{GestureLabel, HandSkeleton, Landmark, landmarks};

/// (tip, base knuckle) landmark pairs for the four tracked fingers. The
/// thumb is deliberately left out; its tip-to-wrist distance barely changes
/// between an open hand and a fist.
const TRACKED_FINGERS: [(usize, usize); 4] = [
    (landmarks::INDEX_TIP, landmarks::INDEX_MCP),
    (landmarks::MIDDLE_TIP, landmarks::MIDDLE_MCP),
    (landmarks::RING_TIP, landmarks::RING_MCP),
    (landmarks::PINKY_TIP, landmarks::PINKY_MCP),
];

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A finger counts as curled when its tip sits closer to the wrist than
    /// `curl_tolerance` times its base knuckle's distance to the wrist. Both
    /// distances are measured from the same wrist point, so the test is
    /// invariant to hand size and distance from the camera.
    pub curl_tolerance: f32,
    /// Curled-finger count at or above which the hand reads as Closed.
    pub closed_min_curled: usize,
    /// Curled-finger count at or below which the hand reads as Open.
    pub open_max_curled: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            curl_tolerance: 1.2,
            closed_min_curled: 3,
            open_max_curled: 1,
        }
    }
}

pub struct GestureClassifier {
    cfg: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    /// Reduce one skeleton to a gesture label. Pure and stateless; distances
    /// are taken in the 2-D image plane only.
    pub fn classify(&self, hand: &HandSkeleton) -> GestureLabel {
        let wrist = hand.point(landmarks::WRIST);

        let curled = TRACKED_FINGERS
            .iter()
            .filter(|&&(tip, mcp)| {
                let tip_dist = planar_distance(hand.point(tip), wrist);
                let base_dist = planar_distance(hand.point(mcp), wrist);
                tip_dist < base_dist * self.cfg.curl_tolerance
            })
            .count();

        if curled >= self.cfg.closed_min_curled {
            GestureLabel::Closed
        } else if curled <= self.cfg.open_max_curled {
            GestureLabel::Open
        } else {
            GestureLabel::Ambiguous
        }
    }

    /// Fold per-hand labels into the single label handed to the debouncer.
    /// Hands are taken in detection order and the last decisive label wins;
    /// an Ambiguous hand never overwrites an earlier decisive one. No hands
    /// at all reads as Ambiguous.
    pub fn net_gesture(&self, hands: &[HandSkeleton]) -> GestureLabel {
        let mut net = GestureLabel::Ambiguous;
        for hand in hands {
            match self.classify(hand) {
                GestureLabel::Ambiguous => {}
                label => net = label,
            }
        }
        net
    }
}

fn planar_distance(a: Landmark, b: Landmark) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}
