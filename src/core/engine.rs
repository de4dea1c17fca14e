use crate::core::error::DeckError;
use crate::core::gesture::{
    AnimationRequest, CardTransform, Finished, GestureMachine, GesturePhase, Offset, SwipeConfig,
    TransitionId,
};
use crate::core::history::UndoHistory;
use crate::core::projection::SavedListProjection;
use crate::core::stack::CardStack;
use crate::models::{Candidate, DecisionRecord, Direction};
use serde::Serialize;
use std::sync::Arc;

/// What a completion signal did to the deck
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Card returned to center, nothing changed
    Settled,
    /// Head moved from the stack into history
    Committed(DecisionRecord),
    /// Stale, duplicate or post-teardown signal; nothing changed
    Ignored,
}

/// Read-only view of a deck for clients
#[derive(Debug, Clone, Serialize)]
pub struct DeckSnapshot {
    pub head: Option<Candidate>,
    pub remaining: usize,
    #[serde(rename = "historyLen")]
    pub history_len: usize,
    #[serde(rename = "canUndo")]
    pub can_undo: bool,
    pub phase: GesturePhase,
    pub transform: CardTransform,
    #[serde(rename = "inFlight")]
    pub in_flight: Option<TransitionId>,
}

/// Swipe-deck engine
///
/// Owns the card stack, the undo history and the gesture machine, and keeps
/// the saved-list projection in step with right-swipes. All mutation happens
/// through `&mut self`, so callers serialize access (one logical writer per
/// deck). Stack and history only change inside `complete_transition` and
/// `undo`; requesting an animation never mutates them.
///
/// # Commit protocol
/// 1. Verify the head is still the candidate that was on screen, then pop it
/// 2. Append the decision to history
/// 3. On a right swipe, call the projection's `add`
/// 4. Reset the card transform
pub struct SwipeEngine {
    stack: CardStack,
    history: UndoHistory,
    gesture: GestureMachine,
    saved: Arc<dyn SavedListProjection>,
    alive: bool,
}

impl SwipeEngine {
    pub fn new(config: SwipeConfig, saved: Arc<dyn SavedListProjection>) -> Result<Self, DeckError> {
        config.validate()?;

        Ok(Self {
            stack: CardStack::new(),
            history: UndoHistory::new(),
            gesture: GestureMachine::new(config),
            saved,
            alive: true,
        })
    }

    /// Replace the deck with a fresh, ordered candidate list
    ///
    /// Clears history and abandons any in-flight transition. A list with
    /// repeated ids is rejected and the deck is left as it was.
    pub fn load(&mut self, candidates: Vec<Candidate>) -> Result<(), DeckError> {
        if !self.alive {
            tracing::warn!("Ignoring load of {} candidates after teardown", candidates.len());
            return Ok(());
        }

        let count = candidates.len();
        if let Err(e) = self.stack.load(candidates) {
            tracing::error!("Rejected candidate list: {}", e);
            return Err(e);
        }

        if let Some(id) = self.gesture.in_flight() {
            tracing::debug!("Abandoning transition {} on reload", id);
        }
        self.gesture.reset();
        self.history.clear();

        tracing::info!("Loaded deck with {} candidates", count);
        Ok(())
    }

    /// Touch-start on the head card
    pub fn touch_start(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.gesture.begin_drag(!self.stack.is_empty())
    }

    /// Movement sample during a drag
    pub fn touch_move(&mut self, offset: Offset) -> Option<CardTransform> {
        if !self.alive {
            return None;
        }
        self.gesture.drag_to(offset)
    }

    /// Release; returns the settle or commit animation to play
    pub fn touch_end(&mut self, offset: Offset) -> Option<AnimationRequest> {
        if !self.alive {
            return None;
        }

        let head_id = self.stack.peek_head().map(|c| c.id.as_str());
        let request = self.gesture.release(offset, head_id)?;
        tracing::debug!("Release at dx={:.1} -> {:?} (transition {})", offset.dx, request.kind, request.id);
        Some(request)
    }

    /// Button-driven commit in an explicit direction
    pub fn request_swipe(&mut self, direction: Direction) -> Option<AnimationRequest> {
        if !self.alive {
            return None;
        }

        let head = match self.stack.peek_head() {
            Some(head) => head,
            None => {
                tracing::debug!("Swipe {} ignored: stack is empty", direction);
                return None;
            }
        };

        let request = self.gesture.begin_commit(direction, &head.id);
        match &request {
            Some(r) => tracing::debug!("Programmatic {} swipe on {} (transition {})", direction, head.id, r.id),
            None => tracing::debug!("Swipe {} ignored while {:?}", direction, self.gesture.phase()),
        }
        request
    }

    pub fn request_discard(&mut self) -> Option<AnimationRequest> {
        self.request_swipe(Direction::Left)
    }

    pub fn request_select(&mut self) -> Option<AnimationRequest> {
        self.request_swipe(Direction::Right)
    }

    /// Completion signal from the animation subsystem
    ///
    /// This is the only place a swipe mutates the deck. Signals for anything
    /// other than the in-flight transition are ignored.
    pub fn complete_transition(&mut self, id: TransitionId) -> Result<Completion, DeckError> {
        if !self.alive {
            tracing::warn!("Ignoring completion of transition {} after teardown", id);
            return Ok(Completion::Ignored);
        }

        match self.gesture.finish(id) {
            Finished::Unknown => {
                tracing::warn!("Ignoring completion of unknown transition {}", id);
                Ok(Completion::Ignored)
            }
            Finished::Settled => Ok(Completion::Settled),
            Finished::Commit {
                direction,
                candidate_id,
            } => self
                .apply_commit(direction, &candidate_id)
                .map(Completion::Committed),
        }
    }

    fn apply_commit(&mut self, direction: Direction, candidate_id: &str) -> Result<DecisionRecord, DeckError> {
        let found = self.stack.peek_head().map(|c| c.id.as_str());
        if found != Some(candidate_id) {
            let err = DeckError::StateDesync(format!(
                "expected head {}, found {}",
                candidate_id,
                found.unwrap_or("<empty>")
            ));
            tracing::error!("Dropping {} commit: {}", direction, err);
            return Err(err);
        }

        let candidate = self.stack.pop_head()?;
        let record = DecisionRecord {
            candidate,
            direction,
        };
        self.history.push(record.clone());

        if direction == Direction::Right {
            self.saved.add(&record.candidate);
        }

        tracing::debug!(
            "Committed {} on {} ({} left, {} in history)",
            direction,
            record.candidate.id,
            self.stack.size(),
            self.history.len()
        );
        Ok(record)
    }

    /// Reverse the most recent decision
    ///
    /// Returns `false` when there is nothing to undo or a gesture is in
    /// progress.
    pub fn undo(&mut self) -> Result<bool, DeckError> {
        if !self.alive {
            return Ok(false);
        }
        if !self.gesture.is_idle() {
            tracing::debug!("Undo ignored while {:?}", self.gesture.phase());
            return Ok(false);
        }

        let last_id = match self.history.last() {
            Some(record) => record.candidate.id.clone(),
            None => return Ok(false),
        };
        if self.stack.contains(&last_id) {
            let err = DeckError::StateDesync(format!("undo would duplicate {} on the stack", last_id));
            tracing::error!("Undo dropped: {}", err);
            return Err(err);
        }

        let DecisionRecord {
            candidate,
            direction,
        } = match self.history.pop() {
            Some(record) => record,
            None => return Ok(false),
        };
        self.stack
            .push_front(candidate)
            .map_err(|e| DeckError::StateDesync(e.to_string()))?;

        if direction == Direction::Right {
            self.saved.remove(&last_id);
        }
        self.gesture.reset();

        tracing::info!("Undid {} swipe on {}", direction, last_id);
        Ok(true)
    }

    pub fn request_undo(&mut self) -> Result<bool, DeckError> {
        self.undo()
    }

    /// Mark the deck dead; later signals and input are ignored
    ///
    /// A commit still in flight is lost: its card stays on the stack and
    /// nothing is written to history.
    pub fn teardown(&mut self) {
        if let Some(id) = self.gesture.in_flight() {
            tracing::info!("Deck torn down with transition {} in flight", id);
        }
        self.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn head(&self) -> Option<&Candidate> {
        self.stack.peek_head()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.size()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[DecisionRecord] {
        self.history.records()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.stack.iter()
    }

    pub fn phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    pub fn transform(&self) -> CardTransform {
        self.gesture.transform()
    }

    pub fn config(&self) -> &SwipeConfig {
        self.gesture.config()
    }

    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            head: self.stack.peek_head().cloned(),
            remaining: self.stack.size(),
            history_len: self.history.len(),
            can_undo: !self.history.is_empty() && self.gesture.is_idle(),
            phase: self.gesture.phase(),
            transform: self.gesture.transform(),
            in_flight: self.gesture.in_flight(),
        }
    }
}

impl std::fmt::Debug for SwipeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeEngine")
            .field("stack", &self.stack.size())
            .field("history", &self.history.len())
            .field("phase", &self.gesture.phase())
            .field("alive", &self.alive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::TransitionKind;
    use crate::core::projection::InMemorySavedList;
    use crate::models::Coordinates;

    const WIDTH: f64 = 400.0;

    fn card(id: &str, distance_km: f64) -> Candidate {
        Candidate::new(id, format!("Place {}", id), Coordinates::new(0.0, 0.0)).with_distance(distance_km)
    }

    fn engine_with(ids: &[&str]) -> (SwipeEngine, Arc<InMemorySavedList>) {
        let saved = Arc::new(InMemorySavedList::new());
        let mut engine = SwipeEngine::new(SwipeConfig::with_reference_width(WIDTH), saved.clone()).unwrap();
        engine
            .load(ids.iter().enumerate().map(|(i, id)| card(id, i as f64)).collect())
            .unwrap();
        (engine, saved)
    }

    fn swipe(engine: &mut SwipeEngine, dx: f64) -> Completion {
        assert!(engine.touch_start());
        engine.touch_move(Offset::new(dx / 2.0, 0.0));
        let request = engine.touch_end(Offset::new(dx, 0.0)).unwrap();
        engine.complete_transition(request.id).unwrap()
    }

    #[test]
    fn test_no_mutation_before_completion() {
        let (mut engine, saved) = engine_with(&["a", "b"]);

        let request = engine.request_select().unwrap();
        assert_eq!(request.kind, TransitionKind::CommitRight);
        assert_eq!(engine.stack_len(), 2);
        assert_eq!(engine.history_len(), 0);
        assert!(saved.is_empty());

        let completion = engine.complete_transition(request.id).unwrap();
        assert!(matches!(completion, Completion::Committed(ref r) if r.candidate.id == "a"));
        assert_eq!(engine.stack_len(), 1);
        assert_eq!(engine.history_len(), 1);
        assert!(saved.contains("a"));
    }

    #[test]
    fn test_duplicate_completion_commits_once() {
        let (mut engine, _) = engine_with(&["a", "b", "c"]);

        let request = engine.request_discard().unwrap();
        engine.complete_transition(request.id).unwrap();
        assert_eq!(engine.complete_transition(request.id).unwrap(), Completion::Ignored);
        assert_eq!(engine.stack_len(), 2);
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn test_settle_leaves_deck_untouched() {
        let (mut engine, saved) = engine_with(&["a"]);

        assert_eq!(swipe(&mut engine, 0.2 * WIDTH), Completion::Settled);
        assert_eq!(engine.stack_len(), 1);
        assert_eq!(engine.history_len(), 0);
        assert!(saved.is_empty());
        assert_eq!(engine.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_left_swipe_skips_saved_list() {
        let (mut engine, saved) = engine_with(&["a", "b"]);

        let completion = swipe(&mut engine, -0.5 * WIDTH);
        assert!(matches!(completion, Completion::Committed(ref r) if r.direction == Direction::Left));
        assert!(saved.is_empty());
        assert_eq!(engine.head().unwrap().id, "b");
    }

    #[test]
    fn test_undo_reverses_right_swipe() {
        let (mut engine, saved) = engine_with(&["a", "b"]);
        swipe(&mut engine, 0.6 * WIDTH);
        assert!(saved.contains("a"));

        assert!(engine.undo().unwrap());
        assert_eq!(engine.head().unwrap().id, "a");
        assert_eq!(engine.stack_len(), 2);
        assert!(!saved.contains("a"));
        assert_eq!(engine.transform(), CardTransform::ORIGIN);
    }

    #[test]
    fn test_undo_on_empty_history_is_repeatable_noop() {
        let (mut engine, saved) = engine_with(&["a"]);

        for _ in 0..3 {
            assert!(!engine.undo().unwrap());
        }
        assert_eq!(engine.stack_len(), 1);
        assert!(saved.is_empty());
    }

    #[test]
    fn test_undo_blocked_while_committing() {
        let (mut engine, _) = engine_with(&["a", "b"]);
        let first = engine.request_discard().unwrap();
        engine.complete_transition(first.id).unwrap();

        let second = engine.request_discard().unwrap();
        assert!(!engine.undo().unwrap());
        assert!(matches!(
            engine.complete_transition(second.id).unwrap(),
            Completion::Committed(_)
        ));
        assert_eq!(engine.history_len(), 2);
    }

    #[test]
    fn test_empty_stack_guards() {
        let (mut engine, _) = engine_with(&[]);

        assert!(!engine.touch_start());
        assert!(engine.request_discard().is_none());
        assert!(engine.request_select().is_none());
        assert!(engine.touch_end(Offset::new(WIDTH, 0.0)).is_none());
        assert_eq!(engine.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_second_commit_request_ignored_while_in_flight() {
        let (mut engine, _) = engine_with(&["a", "b"]);

        let request = engine.request_select().unwrap();
        assert!(engine.request_discard().is_none());
        assert!(!engine.touch_start());
        engine.complete_transition(request.id).unwrap();
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn test_teardown_loses_in_flight_commit() {
        let (mut engine, saved) = engine_with(&["a", "b"]);

        let request = engine.request_select().unwrap();
        engine.teardown();
        assert_eq!(engine.complete_transition(request.id).unwrap(), Completion::Ignored);
        assert_eq!(engine.stack_len(), 2);
        assert_eq!(engine.history_len(), 0);
        assert!(saved.is_empty());
        assert!(!engine.is_alive());
    }

    #[test]
    fn test_reload_abandons_in_flight_commit() {
        let (mut engine, _) = engine_with(&["a", "b"]);
        let request = engine.request_select().unwrap();

        engine.load(vec![card("x", 0.1), card("y", 0.2)]).unwrap();
        assert_eq!(engine.complete_transition(request.id).unwrap(), Completion::Ignored);
        assert_eq!(engine.head().unwrap().id, "x");
        assert_eq!(engine.history_len(), 0);
    }

    #[test]
    fn test_load_clears_history() {
        let (mut engine, _) = engine_with(&["a", "b"]);
        swipe(&mut engine, -WIDTH);
        assert_eq!(engine.history_len(), 1);

        engine.load(vec![card("a", 0.1)]).unwrap();
        assert_eq!(engine.history_len(), 0);
        assert!(!engine.undo().unwrap());
    }

    #[test]
    fn test_load_with_duplicates_rejected() {
        let (mut engine, _) = engine_with(&["a"]);
        let result = engine.load(vec![card("x", 0.1), card("x", 0.2)]);

        assert!(matches!(result, Err(DeckError::InvariantViolation(_))));
        assert_eq!(engine.head().unwrap().id, "a");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SwipeConfig::with_reference_width(-1.0);
        let result = SwipeEngine::new(config, Arc::new(InMemorySavedList::new()));
        assert!(matches!(result, Err(DeckError::InvalidConfig(_))));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let (mut engine, _) = engine_with(&["a", "b"]);
        let request = engine.request_discard().unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, GesturePhase::Committing);
        assert_eq!(snapshot.in_flight, Some(request.id));
        assert!(!snapshot.can_undo);

        engine.complete_transition(request.id).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.head.unwrap().id, "b");
        assert!(snapshot.can_undo);
        assert_eq!(snapshot.remaining, 1);
    }
}
