use crate::core::error::DeckError;
use crate::models::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Damped spring used for settle-back animations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub damping: f64,
    pub stiffness: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            damping: 20.0,
            stiffness: 200.0,
        }
    }
}

/// Relative slack on the commit threshold, per unit of reference width
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Tunables for the gesture state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    /// Layout width that drag distance and off-screen travel are measured against
    pub reference_width: f64,
    /// Fraction of the reference width a release must cross to commit
    pub threshold_fraction: f64,
    /// Rotation in degrees applied per full reference width of horizontal drag
    pub rotation_per_width_deg: f64,
    /// Off-screen travel as a multiple of the reference width
    pub exit_distance_factor: f64,
    pub exit_rotation_deg: f64,
    pub commit_duration_ms: u64,
    pub spring: SpringParams,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            reference_width: 390.0,
            threshold_fraction: 0.4,
            rotation_per_width_deg: 20.0,
            exit_distance_factor: 1.5,
            exit_rotation_deg: 45.0,
            commit_duration_ms: 250,
            spring: SpringParams::default(),
        }
    }
}

impl SwipeConfig {
    pub fn with_reference_width(reference_width: f64) -> Self {
        Self {
            reference_width,
            ..Self::default()
        }
    }

    /// Minimum horizontal displacement that commits a release
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold_fraction * self.reference_width
    }

    /// Threshold less rounding slack, so `dx` at exactly the fraction commits
    /// even when the product rounds upward (0.4 * 414 = 165.60000000000002)
    #[inline]
    fn commit_cutoff(&self) -> f64 {
        self.threshold() - THRESHOLD_EPSILON * self.reference_width
    }

    pub fn validate(&self) -> Result<(), DeckError> {
        if !(self.reference_width.is_finite() && self.reference_width > 0.0) {
            return Err(DeckError::InvalidConfig(format!(
                "reference_width must be positive, got {}",
                self.reference_width
            )));
        }
        if !(self.threshold_fraction > 0.0 && self.threshold_fraction <= 1.0) {
            return Err(DeckError::InvalidConfig(format!(
                "threshold_fraction must be in (0, 1], got {}",
                self.threshold_fraction
            )));
        }
        if !(self.exit_distance_factor.is_finite() && self.exit_distance_factor > 1.0) {
            return Err(DeckError::InvalidConfig(format!(
                "exit_distance_factor must move the card off-screen, got {}",
                self.exit_distance_factor
            )));
        }
        if !(self.exit_rotation_deg.is_finite() && self.rotation_per_width_deg.is_finite()) {
            return Err(DeckError::InvalidConfig(format!(
                "rotations must be finite, got exit {} and drag {}",
                self.exit_rotation_deg, self.rotation_per_width_deg
            )));
        }
        if self.commit_duration_ms == 0 {
            return Err(DeckError::InvalidConfig("commit_duration_ms must be non-zero".into()));
        }
        Ok(())
    }
}

/// Drag displacement from the card's resting position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Visual placement of the head card
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CardTransform {
    pub dx: f64,
    pub dy: f64,
    #[serde(rename = "rotationDeg")]
    pub rotation_deg: f64,
}

impl CardTransform {
    pub const ORIGIN: CardTransform = CardTransform {
        dx: 0.0,
        dy: 0.0,
        rotation_deg: 0.0,
    };
}

/// Identifies one requested animation; completed at most once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(pub u64);

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    Settle,
    CommitLeft,
    CommitRight,
}

impl From<Direction> for TransitionKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => TransitionKind::CommitLeft,
            Direction::Right => TransitionKind::CommitRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnimationTiming {
    Timed {
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    Spring(SpringParams),
}

/// What the animation subsystem is asked to play
///
/// The subsystem reports back with `id` exactly once when the animation ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub target: CardTransform,
    pub timing: AnimationTiming,
}

/// Externally visible phase of the gesture machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GesturePhase {
    Idle,
    Dragging,
    SettlingBack,
    Committing,
}

/// Outcome of a release, decided by horizontal displacement only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDecision {
    Settle,
    Commit(Direction),
}

/// Decide a release: `|dx| >= threshold` commits toward the sign of `dx`
///
/// Vertical displacement and velocity play no part.
#[inline]
pub fn decide_release(dx: f64, config: &SwipeConfig) -> ReleaseDecision {
    if dx.abs() >= config.commit_cutoff() {
        ReleaseDecision::Commit(Direction::from_dx(dx))
    } else {
        ReleaseDecision::Settle
    }
}

/// Drag rotation, linear in horizontal offset and unclamped
#[inline]
pub fn drag_rotation(dx: f64, config: &SwipeConfig) -> f64 {
    dx / config.reference_width * config.rotation_per_width_deg
}

/// Result of a completion signal as seen by the gesture machine
#[derive(Debug, Clone, PartialEq)]
pub enum Finished {
    Settled,
    Commit {
        direction: Direction,
        candidate_id: String,
    },
    /// Not the transition currently in flight
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Dragging,
    SettlingBack {
        id: TransitionId,
    },
    Committing {
        id: TransitionId,
        direction: Direction,
        candidate_id: String,
    },
}

/// Gesture-to-decision state machine
///
/// Owns the head card's visual transform and the single in-flight
/// transition. It never touches the card stack; the engine does that once
/// `finish` reports a completed commit.
#[derive(Debug, Clone)]
pub struct GestureMachine {
    config: SwipeConfig,
    phase: Phase,
    transform: CardTransform,
    last_id: u64,
}

impl GestureMachine {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            transform: CardTransform::ORIGIN,
            last_id: 0,
        }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    pub fn phase(&self) -> GesturePhase {
        match self.phase {
            Phase::Idle => GesturePhase::Idle,
            Phase::Dragging => GesturePhase::Dragging,
            Phase::SettlingBack { .. } => GesturePhase::SettlingBack,
            Phase::Committing { .. } => GesturePhase::Committing,
        }
    }

    pub fn transform(&self) -> CardTransform {
        self.transform
    }

    /// Transition awaiting its completion signal, if any
    pub fn in_flight(&self) -> Option<TransitionId> {
        match self.phase {
            Phase::SettlingBack { id } | Phase::Committing { id, .. } => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Touch-start; only accepted from `Idle` with a card on screen
    pub fn begin_drag(&mut self, has_head: bool) -> bool {
        if !has_head || !self.is_idle() {
            return false;
        }
        self.phase = Phase::Dragging;
        self.transform = CardTransform::ORIGIN;
        true
    }

    /// Movement sample while dragging
    pub fn drag_to(&mut self, offset: Offset) -> Option<CardTransform> {
        if self.phase != Phase::Dragging {
            return None;
        }
        self.transform = CardTransform {
            dx: offset.dx,
            dy: offset.dy,
            rotation_deg: drag_rotation(offset.dx, &self.config),
        };
        Some(self.transform)
    }

    /// Touch-end; decides between settling back and committing
    ///
    /// `head_id` is the card under the finger. A release with no card is
    /// treated as a settle.
    pub fn release(&mut self, offset: Offset, head_id: Option<&str>) -> Option<AnimationRequest> {
        self.drag_to(offset)?;

        match (decide_release(offset.dx, &self.config), head_id) {
            (ReleaseDecision::Commit(direction), Some(candidate_id)) => {
                Some(self.start_commit(direction, candidate_id.to_string()))
            }
            _ => Some(self.start_settle()),
        }
    }

    /// Programmatic commit that skips `Dragging`
    pub fn begin_commit(&mut self, direction: Direction, head_id: &str) -> Option<AnimationRequest> {
        if !self.is_idle() {
            return None;
        }
        Some(self.start_commit(direction, head_id.to_string()))
    }

    /// Consume a completion signal
    ///
    /// Only the in-flight transition's id is accepted; the machine returns
    /// to `Idle` with the transform reset.
    pub fn finish(&mut self, id: TransitionId) -> Finished {
        if self.in_flight() != Some(id) {
            return Finished::Unknown;
        }

        let finished = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Committing {
                direction,
                candidate_id,
                ..
            } => Finished::Commit {
                direction,
                candidate_id,
            },
            _ => Finished::Settled,
        };
        self.transform = CardTransform::ORIGIN;
        finished
    }

    /// Drop whatever is in progress; a pending completion becomes unknown
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.transform = CardTransform::ORIGIN;
    }

    fn next_id(&mut self) -> TransitionId {
        self.last_id += 1;
        TransitionId(self.last_id)
    }

    fn start_settle(&mut self) -> AnimationRequest {
        let id = self.next_id();
        self.phase = Phase::SettlingBack { id };
        AnimationRequest {
            id,
            kind: TransitionKind::Settle,
            target: CardTransform::ORIGIN,
            timing: AnimationTiming::Spring(self.config.spring),
        }
    }

    fn start_commit(&mut self, direction: Direction, candidate_id: String) -> AnimationRequest {
        let id = self.next_id();
        self.phase = Phase::Committing {
            id,
            direction,
            candidate_id,
        };
        AnimationRequest {
            id,
            kind: TransitionKind::from(direction),
            target: CardTransform {
                dx: direction.sign() * self.config.exit_distance_factor * self.config.reference_width,
                dy: self.transform.dy,
                rotation_deg: direction.sign() * self.config.exit_rotation_deg,
            },
            timing: AnimationTiming::Timed {
                duration_ms: self.config.commit_duration_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 400.0;

    fn machine() -> GestureMachine {
        GestureMachine::new(SwipeConfig::with_reference_width(WIDTH))
    }

    #[test]
    fn test_threshold_boundary() {
        let config = SwipeConfig::with_reference_width(WIDTH);
        assert_eq!(decide_release(0.39 * WIDTH, &config), ReleaseDecision::Settle);
        assert_eq!(
            decide_release(0.40 * WIDTH, &config),
            ReleaseDecision::Commit(Direction::Right)
        );
        assert_eq!(
            decide_release(-0.40 * WIDTH, &config),
            ReleaseDecision::Commit(Direction::Left)
        );
    }

    #[test]
    fn test_threshold_boundary_at_literal_widths() {
        for (width, at, below) in [(414.0, 165.6, 161.46), (375.0, 150.0, 146.25), (390.0, 156.0, 152.1)] {
            let config = SwipeConfig::with_reference_width(width);
            assert_eq!(decide_release(at, &config), ReleaseDecision::Commit(Direction::Right), "width {}", width);
            assert_eq!(decide_release(-at, &config), ReleaseDecision::Commit(Direction::Left), "width {}", width);
            assert_eq!(decide_release(below, &config), ReleaseDecision::Settle, "width {}", width);
        }
    }

    #[test]
    fn test_release_at_exact_fraction_of_414_commits() {
        let mut gesture = GestureMachine::new(SwipeConfig::with_reference_width(414.0));
        assert!(gesture.begin_drag(true));
        let request = gesture.release(Offset::new(165.6, 0.0), Some("a")).unwrap();
        assert_eq!(request.kind, TransitionKind::CommitRight);
    }

    #[test]
    fn test_vertical_displacement_ignored() {
        let mut gesture = machine();
        assert!(gesture.begin_drag(true));
        let request = gesture.release(Offset::new(10.0, 900.0), Some("a")).unwrap();
        assert_eq!(request.kind, TransitionKind::Settle);
        assert_eq!(gesture.phase(), GesturePhase::SettlingBack);
    }

    #[test]
    fn test_drag_requires_idle_and_head() {
        let mut gesture = machine();
        assert!(!gesture.begin_drag(false));
        assert_eq!(gesture.phase(), GesturePhase::Idle);

        assert!(gesture.begin_drag(true));
        assert!(!gesture.begin_drag(true));
        assert_eq!(gesture.phase(), GesturePhase::Dragging);
    }

    #[test]
    fn test_drag_rotation_is_linear_and_unclamped() {
        let mut gesture = machine();
        gesture.begin_drag(true);

        let half = gesture.drag_to(Offset::new(WIDTH / 2.0, 5.0)).unwrap();
        assert!((half.rotation_deg - 10.0).abs() < 1e-9);
        assert_eq!(half.dy, 5.0);

        let far = gesture.drag_to(Offset::new(-3.0 * WIDTH, 0.0)).unwrap();
        assert!((far.rotation_deg + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_ignored_outside_drag() {
        let mut gesture = machine();
        assert!(gesture.drag_to(Offset::new(50.0, 0.0)).is_none());
        assert!(gesture.release(Offset::new(500.0, 0.0), Some("a")).is_none());
        assert_eq!(gesture.transform(), CardTransform::ORIGIN);
    }

    #[test]
    fn test_commit_request_targets_off_screen() {
        let mut gesture = machine();
        gesture.begin_drag(true);
        let request = gesture.release(Offset::new(-250.0, 12.0), Some("a")).unwrap();

        assert_eq!(request.kind, TransitionKind::CommitLeft);
        assert_eq!(request.target.dx, -1.5 * WIDTH);
        assert_eq!(request.target.dy, 12.0);
        assert_eq!(request.target.rotation_deg, -45.0);
        assert_eq!(request.timing, AnimationTiming::Timed { duration_ms: 250 });
        assert_eq!(gesture.phase(), GesturePhase::Committing);
    }

    #[test]
    fn test_finish_only_accepts_in_flight_id() {
        let mut gesture = machine();
        let request = gesture.begin_commit(Direction::Right, "a").unwrap();

        assert_eq!(gesture.finish(TransitionId(request.id.0 + 1)), Finished::Unknown);
        assert_eq!(gesture.phase(), GesturePhase::Committing);

        assert_eq!(
            gesture.finish(request.id),
            Finished::Commit {
                direction: Direction::Right,
                candidate_id: "a".to_string()
            }
        );
        assert_eq!(gesture.phase(), GesturePhase::Idle);
        // second delivery of the same signal
        assert_eq!(gesture.finish(request.id), Finished::Unknown);
    }

    #[test]
    fn test_settle_returns_to_idle() {
        let mut gesture = machine();
        gesture.begin_drag(true);
        let request = gesture.release(Offset::new(20.0, 0.0), Some("a")).unwrap();
        assert!(matches!(request.timing, AnimationTiming::Spring(_)));

        assert_eq!(gesture.finish(request.id), Finished::Settled);
        assert!(gesture.is_idle());
        assert_eq!(gesture.transform(), CardTransform::ORIGIN);
    }

    #[test]
    fn test_programmatic_commit_requires_idle() {
        let mut gesture = machine();
        gesture.begin_drag(true);
        assert!(gesture.begin_commit(Direction::Left, "a").is_none());
    }

    #[test]
    fn test_transition_ids_increase() {
        let mut gesture = machine();
        let first = gesture.begin_commit(Direction::Left, "a").unwrap().id;
        gesture.reset();
        let second = gesture.begin_commit(Direction::Left, "b").unwrap().id;
        assert!(second > first);
    }

    #[test]
    fn test_config_validation() {
        assert!(SwipeConfig::default().validate().is_ok());
        assert!(SwipeConfig::with_reference_width(0.0).validate().is_err());

        let config = SwipeConfig {
            threshold_fraction: 1.5,
            ..SwipeConfig::default()
        };
        assert!(matches!(config.validate(), Err(DeckError::InvalidConfig(_))));

        let nan_exit = SwipeConfig {
            exit_distance_factor: f64::NAN,
            ..SwipeConfig::default()
        };
        assert!(matches!(nan_exit.validate(), Err(DeckError::InvalidConfig(_))));

        let infinite_rotation = SwipeConfig {
            exit_rotation_deg: f64::INFINITY,
            ..SwipeConfig::default()
        };
        assert!(infinite_rotation.validate().is_err());
    }

    #[test]
    fn test_transition_kind_wire_names() {
        assert_eq!(serde_json::to_string(&TransitionKind::CommitRight).unwrap(), "\"commit-right\"");
        assert_eq!(serde_json::to_string(&TransitionKind::Settle).unwrap(), "\"settle\"");
    }
}
