//! Bucketed callback storage and ordered dispatch.

use super::bucket::Bucket;
use super::{BoxedCallback, GlobalTrigger, Handle, Trigger};
use crate::core::{State, Symbol, Token, TransitionEvent};
use crate::machine::MachineError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Which conditional buckets apply to a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchGuards {
    /// The exited state is terminal.
    pub exit_terminal: bool,
    /// The exited state is the initial state.
    pub exit_initial: bool,
    /// The entered state is terminal.
    pub enter_terminal: bool,
    /// The entered state is the initial state.
    pub enter_initial: bool,
}

type Event<S, T, P> = TransitionEvent<S, T, P>;

/// All callbacks of one machine.
///
/// Per-state and per-transition buckets exist exactly for the registered
/// states and transitions; binding to anything else fails.
pub struct CallbackRegistry<S: State, T: Symbol, P> {
    enter: HashMap<S, Bucket<Event<S, T, P>>>,
    exit: HashMap<S, Bucket<Event<S, T, P>>>,
    transition: HashMap<S, HashMap<Token<T>, Bucket<Event<S, T, P>>>>,
    enter_terminal: Bucket<Event<S, T, P>>,
    exit_terminal: Bucket<Event<S, T, P>>,
    enter_initial: Bucket<Event<S, T, P>>,
    exit_initial: Bucket<Event<S, T, P>>,
    always: Bucket<Event<S, T, P>>,
    next_handle: u64,
}

impl<S: State, T: Symbol, P> Default for CallbackRegistry<S, T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Symbol, P> CallbackRegistry<S, T, P> {
    pub fn new() -> Self {
        Self {
            enter: HashMap::new(),
            exit: HashMap::new(),
            transition: HashMap::new(),
            enter_terminal: Bucket::default(),
            exit_terminal: Bucket::default(),
            enter_initial: Bucket::default(),
            exit_initial: Bucket::default(),
            always: Bucket::default(),
            next_handle: 0,
        }
    }

    /// Create the empty enter/exit buckets of a newly added state.
    pub fn register_state(&mut self, state: S) {
        self.enter.entry(state.clone()).or_default();
        self.exit.entry(state).or_default();
    }

    /// Create the empty bucket of a newly added transition.
    pub fn register_transition(&mut self, from: S, key: Token<T>) {
        self.transition.entry(from).or_default().entry(key).or_default();
    }

    /// Bind a callback and return its handle.
    ///
    /// No handle is consumed when the target bucket does not exist.
    pub fn bind(
        &mut self,
        trigger: &Trigger<S, T>,
        callback: BoxedCallback<Event<S, T, P>>,
    ) -> Result<Handle, MachineError> {
        let handle = Handle::new(self.next_handle);
        self.bucket_mut(trigger)?.insert(handle, callback);
        self.next_handle += 1;
        debug!(%handle, ?trigger, "callback bound");
        Ok(handle)
    }

    /// Bind a callback to one of the state-independent buckets.
    pub fn bind_global(
        &mut self,
        trigger: GlobalTrigger,
        callback: BoxedCallback<Event<S, T, P>>,
    ) -> Handle {
        let handle = Handle::new(self.next_handle);
        self.global_mut(trigger).insert(handle, callback);
        self.next_handle += 1;
        debug!(%handle, ?trigger, "callback bound");
        handle
    }

    /// Remove a callback from the bucket it was bound to.
    pub fn unbind(&mut self, trigger: &Trigger<S, T>, handle: Handle) -> Result<(), MachineError> {
        if !self.bucket_mut(trigger)?.remove(handle) {
            return Err(MachineError::UnknownHandle { handle });
        }
        debug!(%handle, ?trigger, "callback unbound");
        Ok(())
    }

    /// Number of callbacks currently bound to `trigger`.
    pub fn bound_count(&self, trigger: &Trigger<S, T>) -> Result<usize, MachineError> {
        Ok(self.bucket(trigger)?.len())
    }

    /// Invoke the callbacks of one transition in dispatch order.
    ///
    /// Bucket keys are taken from the event itself: its exited state, its
    /// resolved token and its entered state.
    pub fn dispatch(
        &mut self,
        event: &Event<S, T, P>,
        guards: DispatchGuards,
    ) -> Result<(), MachineError> {
        let from = event.exited_state();
        let to = event.entered_state();

        self.always.invoke(event).map_err(abort)?;
        if let Some(bucket) = self.exit.get_mut(from) {
            bucket.invoke(event).map_err(abort)?;
        }
        if let Some(bucket) = self
            .transition
            .get_mut(from)
            .and_then(|row| row.get_mut(event.token()))
        {
            bucket.invoke(event).map_err(abort)?;
        }
        if let Some(bucket) = self.enter.get_mut(to) {
            bucket.invoke(event).map_err(abort)?;
        }

        let conditional = [
            (guards.exit_terminal, &mut self.exit_terminal),
            (guards.exit_initial, &mut self.exit_initial),
            (guards.enter_terminal, &mut self.enter_terminal),
            (guards.enter_initial, &mut self.enter_initial),
        ];
        for (applies, bucket) in conditional {
            if applies {
                bucket.invoke(event).map_err(abort)?;
            }
        }
        Ok(())
    }

    fn bucket(&self, trigger: &Trigger<S, T>) -> Result<&Bucket<Event<S, T, P>>, MachineError> {
        match trigger {
            Trigger::Enter(state) => self.enter.get(state).ok_or_else(|| unknown_state(state)),
            Trigger::Exit(state) => self.exit.get(state).ok_or_else(|| unknown_state(state)),
            Trigger::Transition(from, key) => {
                if !self.enter.contains_key(from) {
                    return Err(unknown_state(from));
                }
                self.transition
                    .get(from)
                    .and_then(|row| row.get(key))
                    .ok_or_else(|| unknown_transition(from, key))
            }
            Trigger::EnterTerminal => Ok(&self.enter_terminal),
            Trigger::ExitTerminal => Ok(&self.exit_terminal),
            Trigger::EnterInitial => Ok(&self.enter_initial),
            Trigger::ExitInitial => Ok(&self.exit_initial),
            Trigger::Always => Ok(&self.always),
        }
    }

    fn bucket_mut(
        &mut self,
        trigger: &Trigger<S, T>,
    ) -> Result<&mut Bucket<Event<S, T, P>>, MachineError> {
        match trigger {
            Trigger::Enter(state) => self.enter.get_mut(state).ok_or_else(|| unknown_state(state)),
            Trigger::Exit(state) => self.exit.get_mut(state).ok_or_else(|| unknown_state(state)),
            Trigger::Transition(from, key) => {
                if !self.enter.contains_key(from) {
                    return Err(unknown_state(from));
                }
                self.transition
                    .get_mut(from)
                    .and_then(|row| row.get_mut(key))
                    .ok_or_else(|| unknown_transition(from, key))
            }
            Trigger::EnterTerminal => Ok(self.global_mut(GlobalTrigger::EnterTerminal)),
            Trigger::ExitTerminal => Ok(self.global_mut(GlobalTrigger::ExitTerminal)),
            Trigger::EnterInitial => Ok(self.global_mut(GlobalTrigger::EnterInitial)),
            Trigger::ExitInitial => Ok(self.global_mut(GlobalTrigger::ExitInitial)),
            Trigger::Always => Ok(self.global_mut(GlobalTrigger::Always)),
        }
    }

    fn global_mut(&mut self, trigger: GlobalTrigger) -> &mut Bucket<Event<S, T, P>> {
        match trigger {
            GlobalTrigger::EnterTerminal => &mut self.enter_terminal,
            GlobalTrigger::ExitTerminal => &mut self.exit_terminal,
            GlobalTrigger::EnterInitial => &mut self.enter_initial,
            GlobalTrigger::ExitInitial => &mut self.exit_initial,
            GlobalTrigger::Always => &mut self.always,
        }
    }
}

fn unknown_state<S: State>(state: &S) -> MachineError {
    MachineError::UnknownState {
        state: format!("{state:?}"),
    }
}

fn unknown_transition<S: State, T: Symbol>(from: &S, key: &Token<T>) -> MachineError {
    MachineError::UnknownTransition {
        from: format!("{from:?}"),
        token: key.to_string(),
    }
}

fn abort((handle, source): (Handle, super::CallbackError)) -> MachineError {
    warn!(%handle, error = %source, "callback failed, dispatch aborted");
    MachineError::Callback { handle, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{boxed, CallbackError};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;
    type TestEvent = TransitionEvent<&'static str, char, ()>;

    fn record(log: &Log, label: &'static str) -> BoxedCallback<TestEvent> {
        let log = Arc::clone(log);
        boxed(move |_: &TestEvent| log.lock().unwrap().push(label))
    }

    fn registry() -> CallbackRegistry<&'static str, char, ()> {
        let mut registry = CallbackRegistry::new();
        registry.register_state("a");
        registry.register_state("b");
        registry.register_transition("a", Token::Exact('x'));
        registry
    }

    fn event() -> TestEvent {
        TransitionEvent::new("a", "b", Token::Exact('x'), true, 1, 1, None)
    }

    #[test]
    fn handles_are_unique_across_buckets() {
        let log = Log::default();
        let mut registry = registry();

        let first = registry.bind(&Trigger::Always, record(&log, "always")).unwrap();
        let second = registry
            .bind(&Trigger::Enter("a"), record(&log, "enter"))
            .unwrap();
        registry.unbind(&Trigger::Always, first).unwrap();
        let third = registry.bind(&Trigger::Always, record(&log, "always")).unwrap();

        assert_eq!(first.value(), 0);
        assert_eq!(second.value(), 1);
        assert_eq!(third.value(), 2);
    }

    #[test]
    fn global_binds_share_the_handle_counter() {
        let log = Log::default();
        let mut registry = registry();

        let scoped = registry
            .bind(&Trigger::Exit("a"), record(&log, "exit"))
            .unwrap();
        let global = registry.bind_global(GlobalTrigger::ExitInitial, record(&log, "exit_initial"));

        assert_eq!(scoped.value(), 0);
        assert_eq!(global.value(), 1);
        assert_eq!(registry.bound_count(&Trigger::ExitInitial).unwrap(), 1);
        registry.unbind(&GlobalTrigger::ExitInitial.into(), global).unwrap();
        assert_eq!(registry.bound_count(&Trigger::ExitInitial).unwrap(), 0);
    }

    #[test]
    fn bind_to_unknown_targets_fails_without_consuming_a_handle() {
        let log = Log::default();
        let mut registry = registry();

        let state = registry.bind(&Trigger::Exit("z"), record(&log, "exit"));
        let transition = registry.bind(
            &Trigger::Transition("a", Token::Any),
            record(&log, "transition"),
        );
        let transition_from_unknown = registry.bind(
            &Trigger::Transition("z", Token::Exact('x')),
            record(&log, "transition"),
        );
        let handle = registry.bind(&Trigger::Always, record(&log, "always")).unwrap();

        assert!(matches!(state, Err(MachineError::UnknownState { .. })));
        assert!(matches!(
            transition,
            Err(MachineError::UnknownTransition { .. })
        ));
        assert!(matches!(
            transition_from_unknown,
            Err(MachineError::UnknownState { .. })
        ));
        assert_eq!(handle.value(), 0);
    }

    #[test]
    fn bound_count_reads_through_a_shared_borrow() {
        let log = Log::default();
        let mut registry = registry();
        registry
            .bind(&Trigger::Transition("a", Token::Exact('x')), record(&log, "t"))
            .unwrap();

        let shared = &registry;

        assert_eq!(
            shared
                .bound_count(&Trigger::Transition("a", Token::Exact('x')))
                .unwrap(),
            1
        );
        assert_eq!(shared.bound_count(&Trigger::Enter("b")).unwrap(), 0);
        assert!(matches!(
            shared.bound_count(&Trigger::Transition("a", Token::Any)),
            Err(MachineError::UnknownTransition { .. })
        ));
        assert!(matches!(
            shared.bound_count(&Trigger::Exit("z")),
            Err(MachineError::UnknownState { .. })
        ));
    }

    #[test]
    fn unbind_requires_handle_in_the_targeted_bucket() {
        let log = Log::default();
        let mut registry = registry();
        let handle = registry
            .bind(&Trigger::EnterTerminal, record(&log, "enter_terminal"))
            .unwrap();

        let wrong_bucket = registry.unbind(&Trigger::ExitTerminal, handle);
        assert!(matches!(
            wrong_bucket,
            Err(MachineError::UnknownHandle { .. })
        ));

        registry.unbind(&Trigger::EnterTerminal, handle).unwrap();
        let twice = registry.unbind(&Trigger::EnterTerminal, handle);
        assert!(matches!(twice, Err(MachineError::UnknownHandle { .. })));
    }

    #[test]
    fn dispatch_follows_documented_order() {
        let log = Log::default();
        let mut registry = registry();
        for (trigger, label) in [
            (Trigger::EnterInitial, "enter_initial"),
            (Trigger::EnterTerminal, "enter_terminal"),
            (Trigger::ExitInitial, "exit_initial"),
            (Trigger::ExitTerminal, "exit_terminal"),
            (Trigger::Enter("b"), "enter"),
            (Trigger::Transition("a", Token::Exact('x')), "transition"),
            (Trigger::Exit("a"), "exit"),
            (Trigger::Always, "always"),
        ] {
            registry.bind(&trigger, record(&log, label)).unwrap();
        }

        let guards = DispatchGuards {
            exit_terminal: true,
            exit_initial: true,
            enter_terminal: true,
            enter_initial: true,
        };
        registry.dispatch(&event(), guards).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "always",
                "exit",
                "transition",
                "enter",
                "exit_terminal",
                "exit_initial",
                "enter_terminal",
                "enter_initial",
            ]
        );
    }

    #[test]
    fn dispatch_skips_buckets_whose_guard_is_false() {
        let log = Log::default();
        let mut registry = registry();
        registry
            .bind(&Trigger::ExitTerminal, record(&log, "exit_terminal"))
            .unwrap();
        registry
            .bind(&Trigger::EnterInitial, record(&log, "enter_initial"))
            .unwrap();
        registry
            .bind(&Trigger::EnterTerminal, record(&log, "enter_terminal"))
            .unwrap();

        let guards = DispatchGuards {
            enter_terminal: true,
            ..DispatchGuards::default()
        };
        registry.dispatch(&event(), guards).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["enter_terminal"]);
    }

    #[test]
    fn dispatch_error_aborts_remaining_callbacks() {
        let log = Log::default();
        let mut registry = registry();
        registry.bind(&Trigger::Always, record(&log, "always")).unwrap();
        let failing = registry
            .bind(
                &Trigger::Exit("a"),
                boxed(|_: &TestEvent| -> Result<(), CallbackError> { Err("exit failed".into()) }),
            )
            .unwrap();
        registry.bind(&Trigger::Enter("b"), record(&log, "enter")).unwrap();

        let result = registry.dispatch(&event(), DispatchGuards::default());

        match result {
            Err(MachineError::Callback { handle, source }) => {
                assert_eq!(handle, failing);
                assert_eq!(source.to_string(), "exit failed");
            }
            other => panic!("Expected callback error, got {other:?}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["always"]);
    }
}
