//! Counting core
//!
//! Single-threaded dispatcher for the four trigger lines. Each call to
//! [`CountingCore::poll`] is one scheduling tick: every pending flag is
//! inspected in [`Trigger::PRIORITY`] order, its handler runs to
//! completion, and only then is the flag cleared. Edges that arrive while
//! their own handler is running are absorbed by the still-set flag.

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use tally_hal::ByteStore;

use super::report::{Boot, Fault, Handled, StartupError, Tick};
use crate::config::{WorkstationConfig, MAX_GREETING_LEN};
use crate::counter::LifetimeCounter;
use crate::motion::Indexer;
use crate::state::{PendingEvents, Trigger};
use crate::traits::{CoilStepper, CountDisplay, Snapshot};

/// Timings and text the core needs besides its collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoreSettings {
    /// Dead time after a counted part, in ms
    pub debounce_ms: u32,
    /// Greeting shown at start
    pub greeting: String<MAX_GREETING_LEN>,
    /// How long the greeting stays up, in ms
    pub greeting_hold_ms: u32,
}

impl From<&WorkstationConfig> for CoreSettings {
    fn from(config: &WorkstationConfig) -> Self {
        Self {
            debounce_ms: config.counter.debounce_ms,
            greeting: config.display.greeting.clone(),
            greeting_hold_ms: config.display.greeting_hold_ms,
        }
    }
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self::from(&WorkstationConfig::default())
    }
}

/// Event-driven counting and actuation core
///
/// Owns every collaborator for the life of the process. Only the pending
/// flags are shared, with the edge handlers.
pub struct CountingCore<'p, S, D, A, B, T> {
    pending: &'p PendingEvents,
    counter: LifetimeCounter<S>,
    indexer: Indexer<A, B, T>,
    display: D,
    delay: T,
    settings: CoreSettings,
    /// Parts in the current box; never persisted
    in_box: u16,
    /// Last lifetime value known to be in the store
    lifetime: u8,
}

impl<'p, S, D, A, B, T> CountingCore<'p, S, D, A, B, T>
where
    S: ByteStore,
    D: CountDisplay,
    A: CoilStepper,
    B: CoilStepper,
    T: DelayNs,
{
    /// Create a core; nothing touches hardware until [`Self::start`]
    pub fn new(
        pending: &'p PendingEvents,
        counter: LifetimeCounter<S>,
        indexer: Indexer<A, B, T>,
        display: D,
        delay: T,
        settings: CoreSettings,
    ) -> Self {
        Self {
            pending,
            counter,
            indexer,
            display,
            delay,
            settings,
            in_box: 0,
            lifetime: 0,
        }
    }

    /// Greet, then show the persisted lifetime count and an empty box
    ///
    /// A display failure is fatal. A store failure is not: it is returned
    /// in [`Boot::fault`] and the screen shows a lifetime count of 0.
    pub async fn start(&mut self) -> Result<Boot, StartupError> {
        self.display
            .greet(&self.settings.greeting)
            .await
            .map_err(StartupError::Display)?;
        self.delay.delay_ms(self.settings.greeting_hold_ms).await;

        self.in_box = 0;
        let fault = match self.counter.read().await {
            Ok(lifetime) => {
                self.lifetime = lifetime;
                None
            }
            Err(e) => Some(Fault::Store(e)),
        };

        let snapshot = self.snapshot();
        self.display
            .show(snapshot)
            .await
            .map_err(StartupError::Display)?;

        Ok(Boot { snapshot, fault })
    }

    /// Run one scheduling tick
    ///
    /// Flags are read live, in priority order, so a flag raised by an edge
    /// during an earlier handler in the same tick is still picked up.
    pub async fn poll(&mut self) -> Tick {
        let mut tick = Tick::default();

        for trigger in Trigger::PRIORITY {
            if !self.pending.is_pending(trigger) {
                continue;
            }

            let handled = self.handle(trigger).await;
            self.pending.clear(trigger);
            // One slot per trigger, so this cannot overflow
            let _ = tick.handled.push(handled);
        }

        tick
    }

    async fn handle(&mut self, trigger: Trigger) -> Handled {
        let mut handled = Handled::new(trigger);
        match trigger {
            Trigger::CountPart => self.count_part(&mut handled).await,
            Trigger::ResetBox => self.reset_box(&mut handled).await,
            Trigger::ResetLifetime => self.reset_lifetime(&mut handled).await,
            Trigger::PartIncoming => self.part_incoming(&mut handled).await,
        }
        handled
    }

    async fn count_part(&mut self, handled: &mut Handled) {
        self.in_box = self.in_box.saturating_add(1);
        match self.counter.increment_by(1).await {
            Ok(lifetime) => self.lifetime = lifetime,
            Err(e) => handled.fault(Fault::Store(e)),
        }
        self.refresh(handled).await;

        // Counting sensor bounce
        self.delay.delay_ms(self.settings.debounce_ms).await;
    }

    async fn reset_box(&mut self, handled: &mut Handled) {
        self.in_box = 0;
        self.refresh(handled).await;
    }

    async fn reset_lifetime(&mut self, handled: &mut Handled) {
        match self.counter.reset().await {
            Ok(()) => self.lifetime = 0,
            Err(e) => handled.fault(Fault::Store(e)),
        }
        self.refresh(handled).await;
    }

    async fn part_incoming(&mut self, handled: &mut Handled) {
        if let Err(e) = self.indexer.advance().await {
            handled.fault(Fault::Motion(e));
        }
    }

    async fn refresh(&mut self, handled: &mut Handled) {
        let snapshot = self.snapshot();
        handled.snapshot = Some(snapshot);
        if let Err(e) = self.display.show(snapshot).await {
            handled.fault(Fault::Display(e));
        }
    }

    /// Current counter values
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.lifetime, self.in_box)
    }

    /// Parts in the current box
    pub fn in_box(&self) -> u16 {
        self.in_box
    }

    /// Last lifetime count known to be persisted
    pub fn lifetime(&self) -> u8 {
        self.lifetime
    }

    /// Pending flags this core drains
    pub fn pending(&self) -> &'p PendingEvents {
        self.pending
    }

    /// Durable lifetime counter
    pub fn counter(&self) -> &LifetimeCounter<S> {
        &self.counter
    }

    /// Mutable access to the durable lifetime counter
    pub fn counter_mut(&mut self) -> &mut LifetimeCounter<S> {
        &mut self.counter
    }

    /// Indexing actuators
    pub fn indexer(&self) -> &Indexer<A, B, T> {
        &self.indexer
    }

    /// Presentation sink
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutable access to the presentation sink
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverflowPolicy;
    use crate::motion::IndexPlan;
    use crate::testing::{
        Entry, FlakyStore, Journal, MockStepper, Motor, RecordingDisplay, VirtualClock,
    };
    use crate::traits::{DisplayError, StepperError};
    use embassy_futures::block_on;
    use proptest::prelude::*;
    use tally_hal::{CellAddress, StoreError};

    type TestCore<'p> =
        CountingCore<'p, FlakyStore, RecordingDisplay, MockStepper, MockStepper, VirtualClock>;

    struct Rig {
        journal: Journal,
        clock: VirtualClock,
    }

    impl Rig {
        fn new() -> Self {
            let journal = Journal::new();
            let clock = VirtualClock::journaled(&journal);
            Self { journal, clock }
        }

        fn core<'p>(&self, pending: &'p PendingEvents, lifetime: u8) -> TestCore<'p> {
            let nudge = MockStepper::new(Motor::A, &self.journal);
            self.core_with(pending, lifetime, OverflowPolicy::Wrap, nudge)
        }

        fn core_with<'p>(
            &self,
            pending: &'p PendingEvents,
            lifetime: u8,
            policy: OverflowPolicy,
            nudge: MockStepper,
        ) -> TestCore<'p> {
            let config = WorkstationConfig::default();
            let counter =
                LifetimeCounter::new(FlakyStore::new(lifetime), CellAddress::LIFETIME_COUNT, policy);
            let indexer = Indexer::new(
                nudge,
                MockStepper::new(Motor::B, &self.journal),
                self.clock.clone(),
                IndexPlan::from(&config.indexer),
            );
            CountingCore::new(
                pending,
                counter,
                indexer,
                RecordingDisplay::new(),
                self.clock.clone(),
                CoreSettings::from(&config),
            )
        }
    }

    fn started<'p>(rig: &Rig, pending: &'p PendingEvents, lifetime: u8) -> TestCore<'p> {
        let mut core = rig.core(pending, lifetime);
        block_on(core.start()).unwrap();
        rig.journal.clear();
        core
    }

    fn fire(core: &mut TestCore<'_>, trigger: Trigger) -> Tick {
        core.pending().raise(trigger);
        block_on(core.poll())
    }

    #[test]
    fn test_start_greets_then_shows_counts() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = rig.core(&pending, 5);

        let boot = block_on(core.start()).unwrap();
        assert_eq!(boot.snapshot, Snapshot::new(5, 0));
        assert_eq!(boot.fault, None);
        assert_eq!(core.display().greetings, ["Hello, Worker 1!"]);
        assert_eq!(core.display().shown, [Snapshot::new(5, 0)]);
        assert_eq!(rig.journal.entries(), [Entry::WaitMs(1000)]);
    }

    #[test]
    fn test_start_display_failure_is_fatal() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = rig.core(&pending, 0);
        core.display_mut().fail_greet = true;

        assert_eq!(
            block_on(core.start()),
            Err(StartupError::Display(DisplayError::Communication))
        );
    }

    #[test]
    fn test_start_store_failure_is_recoverable() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = rig.core(&pending, 42);
        core.counter_mut().store_mut().fail_reads(true);

        let boot = block_on(core.start()).unwrap();
        assert_eq!(boot.fault, Some(Fault::Store(StoreError::Device)));
        assert_eq!(boot.snapshot, Snapshot::new(0, 0));
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 0);

        let tick = block_on(core.poll());
        assert!(tick.is_idle());
        assert!(rig.journal.entries().is_empty());
    }

    #[test]
    fn test_count_three_parts() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 5);

        for _ in 0..3 {
            let tick = fire(&mut core, Trigger::CountPart);
            assert!(tick.handled(Trigger::CountPart));
            assert!(!pending.is_pending(Trigger::CountPart));
        }

        assert_eq!(core.in_box(), 3);
        assert_eq!(core.counter().store().lifetime(), 8);
        assert_eq!(core.display().last(), Some(Snapshot::new(8, 3)));
        // Debounce after every count
        assert_eq!(rig.journal.entries(), [Entry::WaitMs(200); 3]);
    }

    #[test]
    fn test_reset_box_keeps_lifetime() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 5);
        for _ in 0..3 {
            fire(&mut core, Trigger::CountPart);
        }
        let writes = core.counter().store().writes();

        let tick = fire(&mut core, Trigger::ResetBox);
        assert_eq!(tick.last_snapshot(), Some(Snapshot::new(8, 0)));
        assert_eq!(core.in_box(), 0);
        assert_eq!(core.counter().store().lifetime(), 8);
        assert_eq!(core.counter().store().writes(), writes);
    }

    #[test]
    fn test_reset_lifetime_keeps_box() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 5);
        for _ in 0..3 {
            fire(&mut core, Trigger::CountPart);
        }

        let tick = fire(&mut core, Trigger::ResetLifetime);
        assert_eq!(tick.last_snapshot(), Some(Snapshot::new(0, 3)));
        assert_eq!(core.counter().store().lifetime(), 0);
        assert_eq!(core.in_box(), 3);
    }

    #[test]
    fn test_reset_lifetime_clears_its_own_flag() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 8);

        pending.raise(Trigger::ResetLifetime);
        block_on(core.poll());
        assert!(!pending.is_pending(Trigger::ResetLifetime));

        // A second tick must not reset again
        let tick = block_on(core.poll());
        assert!(tick.is_idle());
    }

    #[test]
    fn test_each_handler_clears_only_its_flag() {
        for trigger in Trigger::PRIORITY {
            let rig = Rig::new();
            let pending = PendingEvents::new();
            let mut core = started(&rig, &pending, 0);

            fire(&mut core, trigger);
            assert!(!pending.any_pending(), "{:?} left a flag set", trigger);
        }
    }

    #[test]
    fn test_part_incoming_runs_indexer_only() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 8);
        let shown = core.display().shown.len();

        let tick = fire(&mut core, Trigger::PartIncoming);
        assert!(tick.handled(Trigger::PartIncoming));
        assert_eq!(tick.last_snapshot(), None);
        assert_eq!(
            rig.journal.entries(),
            [
                Entry::Step(Motor::A, -258),
                Entry::WaitMs(1000),
                Entry::Step(Motor::A, 258),
                Entry::Release(Motor::A),
                Entry::Step(Motor::B, 258),
                Entry::Release(Motor::B),
            ]
        );
        assert!(core.indexer().is_released());
        assert_eq!(core.snapshot(), Snapshot::new(8, 0));
        assert_eq!(core.display().shown.len(), shown);
    }

    #[test]
    fn test_lifetime_wraps_past_cell_max() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 255);

        let tick = fire(&mut core, Trigger::CountPart);
        assert!(tick.handled[0].is_clean());
        assert_eq!(core.counter().store().lifetime(), 0);
        assert_eq!(core.snapshot(), Snapshot::new(0, 1));
    }

    #[test]
    fn test_lifetime_saturates_when_configured() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let nudge = MockStepper::new(Motor::A, &rig.journal);
        let mut core = rig.core_with(&pending, 255, OverflowPolicy::Saturate, nudge);
        block_on(core.start()).unwrap();

        fire(&mut core, Trigger::CountPart);
        assert_eq!(core.counter().store().lifetime(), 255);
        assert_eq!(core.in_box(), 1);
    }

    #[test]
    fn test_all_pending_run_in_priority_order() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 10);

        // Raised in reverse order; dispatch order is fixed
        for trigger in Trigger::PRIORITY.iter().rev() {
            pending.raise(*trigger);
        }
        let tick = block_on(core.poll());

        let order: std::vec::Vec<Trigger> = tick.triggers().collect();
        assert_eq!(order, Trigger::PRIORITY);
        // Count, then box reset, then lifetime reset
        assert_eq!(core.snapshot(), Snapshot::new(0, 0));
        assert!(!pending.any_pending());
    }

    #[test]
    fn test_coalesced_edges_handled_once() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 0);

        let latch = pending.latch(Trigger::CountPart);
        for _ in 0..5 {
            latch.fire();
        }
        let tick = block_on(core.poll());

        assert_eq!(tick.handled.len(), 1);
        assert_eq!(core.in_box(), 1);
        assert_eq!(core.counter().store().lifetime(), 1);
    }

    #[test]
    fn test_store_failure_keeps_box_counting() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 7);
        core.counter_mut().store_mut().fail_writes(true);

        let tick = fire(&mut core, Trigger::CountPart);
        let faults: std::vec::Vec<_> = tick.faults().collect();
        assert_eq!(
            faults,
            [(Trigger::CountPart, Fault::Store(StoreError::Device))]
        );
        // Box advanced, display shows last known lifetime
        assert_eq!(core.in_box(), 1);
        assert_eq!(core.display().last(), Some(Snapshot::new(7, 1)));
        assert!(!pending.is_pending(Trigger::CountPart));

        // Store recovers, counting carries on from the persisted value
        core.counter_mut().store_mut().fail_writes(false);
        fire(&mut core, Trigger::CountPart);
        assert_eq!(core.snapshot(), Snapshot::new(8, 2));
    }

    #[test]
    fn test_reset_lifetime_store_failure() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 7);
        core.counter_mut().store_mut().fail_writes(true);

        let tick = fire(&mut core, Trigger::ResetLifetime);
        assert_eq!(
            tick.handled[0].faults.as_slice(),
            [Fault::Store(StoreError::Device)]
        );
        assert_eq!(core.lifetime(), 7);
        assert!(!pending.is_pending(Trigger::ResetLifetime));
    }

    #[test]
    fn test_display_failure_is_reported_not_fatal() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 0);
        core.display_mut().fail_show = true;

        let tick = fire(&mut core, Trigger::CountPart);
        assert_eq!(
            tick.handled[0].faults.as_slice(),
            [Fault::Display(DisplayError::Communication)]
        );
        assert_eq!(core.counter().store().lifetime(), 1);
    }

    #[test]
    fn test_motion_fault_releases_actuators() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let nudge = MockStepper::new(Motor::A, &rig.journal).fail_on_move(0);
        let mut core = rig.core_with(&pending, 0, OverflowPolicy::Wrap, nudge);
        block_on(core.start()).unwrap();

        let tick = fire(&mut core, Trigger::PartIncoming);
        assert_eq!(
            tick.handled[0].faults.as_slice(),
            [Fault::Motion(StepperError::PinFault)]
        );
        assert!(core.indexer().is_released());
        assert!(!pending.is_pending(Trigger::PartIncoming));
    }

    #[test]
    fn test_box_count_saturates() {
        let rig = Rig::new();
        let pending = PendingEvents::new();
        let mut core = started(&rig, &pending, 0);
        core.in_box = u16::MAX;

        fire(&mut core, Trigger::CountPart);
        assert_eq!(core.in_box(), u16::MAX);
    }

    proptest! {
        #[test]
        fn prop_counts_track_events(start in any::<u8>(), n in 0usize..300) {
            let rig = Rig::new();
            let pending = PendingEvents::new();
            let mut core = started(&rig, &pending, start);

            for _ in 0..n {
                fire(&mut core, Trigger::CountPart);
            }

            prop_assert_eq!(usize::from(core.in_box()), n);
            prop_assert_eq!(
                usize::from(core.counter().store().lifetime()),
                (usize::from(start) + n) % 256
            );
        }

        #[test]
        fn prop_resets_are_independent(
            start in any::<u8>(),
            before in 0usize..20,
            after in 0usize..20,
            reset_box in any::<bool>(),
        ) {
            let rig = Rig::new();
            let pending = PendingEvents::new();
            let mut core = started(&rig, &pending, start);

            for _ in 0..before {
                fire(&mut core, Trigger::CountPart);
            }
            let lifetime = core.counter().store().lifetime();
            let in_box = core.in_box();

            if reset_box {
                fire(&mut core, Trigger::ResetBox);
                prop_assert_eq!(core.in_box(), 0);
                prop_assert_eq!(core.counter().store().lifetime(), lifetime);
            } else {
                fire(&mut core, Trigger::ResetLifetime);
                prop_assert_eq!(core.counter().store().lifetime(), 0);
                prop_assert_eq!(core.in_box(), in_box);
            }

            for _ in 0..after {
                fire(&mut core, Trigger::CountPart);
            }
            prop_assert_eq!(core.snapshot(), Snapshot::new(
                core.counter().store().lifetime(),
                core.in_box(),
            ));
        }
    }
}
