use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use crate::{
    debounce::ActionDebouncer,
    gesture::GestureClassifier,
    landmark::LandmarkSource,
    sink::ActionSink,
    types::{ActionEvent, HandSkeleton},
};

pub struct GrabTracker<K: ActionSink> {
    classifier: GestureClassifier,
    debouncer: ActionDebouncer,
    sink: K,
}

impl<K: ActionSink> GrabTracker<K> {
    pub fn new(classifier: GestureClassifier, debouncer: ActionDebouncer, sink: K) -> Self {
        Self {
            classifier,
            debouncer,
            sink,
        }
    }

    /// One pipeline step: classify the frame's hands, feed the debouncer and
    /// fire the resulting action at the sink, if any. A failed notification
    /// is logged and dropped; local state keeps whatever the debouncer
    /// already decided, so a lost grab is never resent.
    pub fn process(&mut self, hands: &[HandSkeleton], now: Instant) -> Option<ActionEvent> {
        let gesture = self.classifier.net_gesture(hands);
        let action = self.debouncer.observe(gesture, now);

        if let Some(action) = action {
            log::info!("emitting {action:?} to sink");
            if let Err(err) = self.sink.send(action) {
                log::warn!("failed to notify sink of {action:?}: {err}");
            }
        }

        action
    }
}

/// The cooperative capture loop: pull, infer, process, repeat. Every
/// per-frame failure is logged and skipped; only the stop flag ends the
/// loop.
pub fn run_loop<S, K>(source: &mut S, tracker: &mut GrabTracker<K>, stop: &AtomicBool)
where
    S: LandmarkSource,
    K: ActionSink,
{
    while !stop.load(Ordering::Relaxed) {
        match source.next_hands() {
            Ok(observation) => {
                tracker.process(&observation.hands, observation.captured_at);
            }
            Err(err) => {
                log::warn!("frame skipped: {err:?}");
            }
        }
    }

    log::info!("stop requested, leaving capture loop");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        debounce::DebounceConfig,
        gesture::ClassifierConfig,
        sink::SinkError,
        types::{GestureLabel, Landmark, NUM_LANDMARKS, landmarks},
    };

    /// Records every action the tracker tries to send, optionally failing
    /// each call to model an unreachable sink.
    struct RecordingSink {
        sent: Vec<ActionEvent>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Self {
            Self {
                sent: Vec::new(),
                fail,
            }
        }
    }

    impl ActionSink for RecordingSink {
        fn send(&mut self, action: ActionEvent) -> Result<(), SinkError> {
            self.sent.push(action);
            if self.fail {
                Err(SinkError::Rejected("unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn hand(label: GestureLabel) -> HandSkeleton {
        let tip_dist = match label {
            GestureLabel::Closed => 0.05,
            GestureLabel::Open => 0.30,
            GestureLabel::Ambiguous => unreachable!("build ambiguous hands per finger"),
        };
        let mut points = [Landmark::default(); NUM_LANDMARKS];
        points[landmarks::WRIST] = Landmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
        };
        for (tip, mcp) in [
            (landmarks::INDEX_TIP, landmarks::INDEX_MCP),
            (landmarks::MIDDLE_TIP, landmarks::MIDDLE_MCP),
            (landmarks::RING_TIP, landmarks::RING_MCP),
            (landmarks::PINKY_TIP, landmarks::PINKY_MCP),
        ] {
            points[mcp] = Landmark {
                x: 0.5 + 0.10,
                y: 0.5,
                z: 0.0,
            };
            points[tip] = Landmark {
                x: 0.5 + tip_dist,
                y: 0.5,
                z: 0.0,
            };
        }
        HandSkeleton::new(points)
    }

    fn tracker(sink: &mut RecordingSink) -> GrabTracker<&mut RecordingSink> {
        GrabTracker::new(
            GestureClassifier::new(ClassifierConfig::default()),
            ActionDebouncer::new(&DebounceConfig::default()),
            sink,
        )
    }

    #[test]
    fn closed_streak_sends_exactly_one_grab() {
        let mut sink = RecordingSink::new(false);
        let mut tracker = tracker(&mut sink);
        let t0 = Instant::now();

        let closed = vec![hand(GestureLabel::Closed)];
        tracker.process(&closed, t0);
        tracker.process(&closed, t0 + Duration::from_millis(200));
        tracker.process(&closed, t0 + Duration::from_millis(400));

        drop(tracker);
        assert_eq!(sink.sent, vec![ActionEvent::Grab]);
    }

    #[test]
    fn grab_then_open_sends_no_release() {
        let mut sink = RecordingSink::new(false);
        let mut tracker = tracker(&mut sink);
        let t0 = Instant::now();

        tracker.process(&[hand(GestureLabel::Closed)], t0);
        tracker.process(&[hand(GestureLabel::Open)], t0 + Duration::from_millis(1_500));

        drop(tracker);
        assert_eq!(sink.sent, vec![ActionEvent::Grab]);
    }

    #[test]
    fn empty_frames_send_nothing() {
        let mut sink = RecordingSink::new(false);
        let mut tracker = tracker(&mut sink);
        let t0 = Instant::now();

        tracker.process(&[], t0);
        tracker.process(&[], t0 + Duration::from_millis(100));

        drop(tracker);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn grab_open_close_cycle_sends_two_grabs() {
        let mut sink = RecordingSink::new(false);
        let mut tracker = tracker(&mut sink);
        let t0 = Instant::now();

        tracker.process(&[hand(GestureLabel::Closed)], t0);
        tracker.process(&[hand(GestureLabel::Open)], t0 + Duration::from_millis(1_500));
        tracker.process(&[hand(GestureLabel::Closed)], t0 + Duration::from_millis(1_600));

        drop(tracker);
        assert_eq!(sink.sent, vec![ActionEvent::Grab, ActionEvent::Grab]);
    }

    #[test]
    fn sink_failure_does_not_roll_back_debouncer() {
        let mut sink = RecordingSink::new(true);
        let mut tracker = tracker(&mut sink);
        let t0 = Instant::now();

        let closed = vec![hand(GestureLabel::Closed)];
        // First grab fails on the wire but still arms the machine: the next
        // closed frames must not trigger a resend.
        tracker.process(&closed, t0);
        tracker.process(&closed, t0 + Duration::from_millis(300));
        tracker.process(&closed, t0 + Duration::from_millis(1_500));

        // Only a full open/close cycle past the cooldown earns another try.
        tracker.process(&[hand(GestureLabel::Open)], t0 + Duration::from_millis(1_700));
        tracker.process(&closed, t0 + Duration::from_millis(1_800));

        drop(tracker);
        assert_eq!(sink.sent, vec![ActionEvent::Grab, ActionEvent::Grab]);
    }
}
