use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("state {0} is already registered")]
    DuplicateState(String),
    #[error("state {0} was never registered")]
    UnknownState(String),
    #[error("tick called before any state was requested")]
    Uninitialized,
}

type EnterFn<C> = Box<dyn FnMut(&mut C)>;
type UpdateFn<S, C> = Box<dyn FnMut(&mut C, f32) -> Option<S>>;
type ExitFn<C> = Box<dyn FnMut(&mut C)>;

/// Lifecycle callbacks for one state. All three are optional. The update
/// callback may return the next state, which is recorded as a pending
/// transition exactly as if `request` had been called from outside.
pub struct StateHooks<S, C> {
    enter: Option<EnterFn<C>>,
    update: Option<UpdateFn<S, C>>,
    exit: Option<ExitFn<C>>,
}

impl<S, C> Default for StateHooks<S, C> {
    fn default() -> Self {
        Self {
            enter: None,
            update: None,
            exit: None,
        }
    }
}

impl<S, C> StateHooks<S, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enter(mut self, enter: impl FnMut(&mut C) + 'static) -> Self {
        self.enter = Some(Box::new(enter));
        self
    }

    pub fn with_update(mut self, update: impl FnMut(&mut C, f32) -> Option<S> + 'static) -> Self {
        self.update = Some(Box::new(update));
        self
    }

    pub fn with_exit(mut self, exit: impl FnMut(&mut C) + 'static) -> Self {
        self.exit = Some(Box::new(exit));
        self
    }
}

/// Deferred-transition state driver. Requesting a transition never runs
/// hooks immediately; the switch happens at the start of the next `tick`, so
/// behavior code can request a state mid-update without re-entering the new
/// state's update in the same frame. A recorded request always replays
/// exit→enter on the next tick, including requests for the currently active
/// state (self-transitions).
pub struct StateMachine<S, C> {
    states: HashMap<S, StateHooks<S, C>>,
    active: Option<S>,
    requested: Option<S>,
}

impl<S, C> Default for StateMachine<S, C> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            active: None,
            requested: None,
        }
    }
}

impl<S, C> StateMachine<S, C>
where
    S: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, state: S, hooks: StateHooks<S, C>) -> Result<(), StateMachineError> {
        if self.states.contains_key(&state) {
            return Err(StateMachineError::DuplicateState(format!("{state:?}")));
        }
        self.states.insert(state, hooks);
        Ok(())
    }

    /// Records `state` as the pending transition target for the next tick.
    pub fn request(&mut self, state: S) -> Result<(), StateMachineError> {
        if !self.states.contains_key(&state) {
            return Err(StateMachineError::UnknownState(format!("{state:?}")));
        }
        self.requested = Some(state);
        Ok(())
    }

    /// State whose update callback ran (or will run) this tick.
    pub fn active(&self) -> Option<S> {
        self.active
    }

    /// Pending transition target, if a request is waiting to be applied.
    pub fn requested(&self) -> Option<S> {
        self.requested
    }

    /// Resolves any pending transition (exit old, enter new), then runs the
    /// active state's update. On the tick a transition lands, the new state's
    /// enter and update both run.
    pub fn tick(&mut self, ctx: &mut C, dt: f32) -> Result<(), StateMachineError> {
        if let Some(next) = self.requested.take() {
            if let Some(current) = self.active {
                if let Some(hooks) = self.states.get_mut(&current) {
                    if let Some(exit) = hooks.exit.as_mut() {
                        exit(ctx);
                    }
                }
            }
            trace!(from = ?self.active, to = ?next, "state transition");
            self.active = Some(next);
            if let Some(hooks) = self.states.get_mut(&next) {
                if let Some(enter) = hooks.enter.as_mut() {
                    enter(ctx);
                }
            }
        }

        let Some(current) = self.active else {
            return Err(StateMachineError::Uninitialized);
        };

        let mut transition = None;
        if let Some(hooks) = self.states.get_mut(&current) {
            if let Some(update) = hooks.update.as_mut() {
                transition = update(ctx, dt);
            }
        }

        if let Some(next) = transition {
            self.request(next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestState {
        A,
        B,
    }

    #[derive(Debug, Default)]
    struct Counters {
        a_updates: u32,
        b_updates: u32,
        b_enters: u32,
        a_exits: u32,
    }

    fn machine_with_ab() -> StateMachine<TestState, Counters> {
        let mut machine = StateMachine::new();
        machine
            .add(
                TestState::A,
                StateHooks::new()
                    .with_update(|counters: &mut Counters, _dt| {
                        counters.a_updates += 1;
                        Some(TestState::B)
                    })
                    .with_exit(|counters| counters.a_exits += 1),
            )
            .expect("register A");
        machine
            .add(
                TestState::B,
                StateHooks::new()
                    .with_enter(|counters: &mut Counters| counters.b_enters += 1)
                    .with_update(|counters, _dt| {
                        counters.b_updates += 1;
                        None
                    }),
            )
            .expect("register B");
        machine
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut machine: StateMachine<TestState, ()> = StateMachine::new();
        machine.add(TestState::A, StateHooks::new()).expect("first");
        assert!(matches!(
            machine.add(TestState::A, StateHooks::new()),
            Err(StateMachineError::DuplicateState(_))
        ));
    }

    #[test]
    fn request_of_unknown_state_fails() {
        let mut machine: StateMachine<TestState, ()> = StateMachine::new();
        machine.add(TestState::A, StateHooks::new()).expect("add");
        assert!(matches!(
            machine.request(TestState::B),
            Err(StateMachineError::UnknownState(_))
        ));
    }

    #[test]
    fn tick_before_any_request_fails() {
        let mut machine = machine_with_ab();
        let mut counters = Counters::default();
        assert_eq!(
            machine.tick(&mut counters, 0.1),
            Err(StateMachineError::Uninitialized)
        );
    }

    #[test]
    fn transition_requested_in_update_is_deferred_one_tick() {
        let mut machine = machine_with_ab();
        let mut counters = Counters::default();
        machine.request(TestState::A).expect("initial state");

        // Tick n: A's update runs (and requests B); B must not run yet.
        machine.tick(&mut counters, 0.1).expect("tick n");
        assert_eq!(counters.a_updates, 1);
        assert_eq!(counters.b_updates, 0);
        assert_eq!(counters.b_enters, 0);
        assert_eq!(machine.active(), Some(TestState::A));
        assert_eq!(machine.requested(), Some(TestState::B));

        // Tick n+1: A exits, B enters, and B's update runs the same tick.
        machine.tick(&mut counters, 0.1).expect("tick n+1");
        assert_eq!(counters.a_updates, 1);
        assert_eq!(counters.a_exits, 1);
        assert_eq!(counters.b_enters, 1);
        assert_eq!(counters.b_updates, 1);
        assert_eq!(machine.active(), Some(TestState::B));
        assert_eq!(machine.requested(), None);
    }

    #[test]
    fn first_tick_runs_enter_then_update() {
        let mut machine: StateMachine<TestState, Counters> = StateMachine::new();
        machine
            .add(
                TestState::B,
                StateHooks::new()
                    .with_enter(|counters: &mut Counters| counters.b_enters += 1)
                    .with_update(|counters, _dt| {
                        counters.b_updates += 1;
                        None
                    }),
            )
            .expect("add");
        let mut counters = Counters::default();
        machine.request(TestState::B).expect("initial state");
        machine.tick(&mut counters, 0.1).expect("first tick");
        assert_eq!(counters.b_enters, 1);
        assert_eq!(counters.b_updates, 1);
    }

    #[test]
    fn self_transition_reruns_exit_and_enter() {
        let mut machine: StateMachine<TestState, Counters> = StateMachine::new();
        machine
            .add(
                TestState::A,
                StateHooks::new()
                    .with_enter(|counters: &mut Counters| counters.b_enters += 1)
                    .with_exit(|counters: &mut Counters| counters.a_exits += 1),
            )
            .expect("add");
        let mut counters = Counters::default();
        machine.request(TestState::A).expect("initial");
        machine.tick(&mut counters, 0.1).expect("tick 1");
        assert_eq!(counters.b_enters, 1);
        assert_eq!(counters.a_exits, 0);

        machine.request(TestState::A).expect("self request");
        machine.tick(&mut counters, 0.1).expect("tick 2");
        assert_eq!(counters.a_exits, 1);
        assert_eq!(counters.b_enters, 2);
    }

    #[test]
    fn request_without_tick_runs_no_hooks() {
        let mut machine = machine_with_ab();
        let mut counters = Counters::default();
        machine.request(TestState::A).expect("request");
        machine.request(TestState::B).expect("re-request");
        assert_eq!(counters.a_updates, 0);
        assert_eq!(counters.b_enters, 0);
        machine.tick(&mut counters, 0.1).expect("tick");
        // The latest request wins; B enters and updates.
        assert_eq!(counters.b_enters, 1);
        assert_eq!(counters.b_updates, 1);
        assert_eq!(counters.a_updates, 0);
    }
}
