//! Timer descriptor table.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Handle to a timer descriptor inside a [`TimerTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct TimerSlot {
    name: &'static str,
    /// Caller-chosen instance tag, used to route a dispatch back to the
    /// owning entity.
    tag: u32,
    periodic: bool,
    period: Duration,
    /// `Some` while the timer is armed.
    deadline: Option<Instant>,
    /// Number of periods a periodic timer has skipped because dispatch ran
    /// late. Diagnostics only.
    losses: u64,
}

/// Arena of timer descriptors.
///
/// The table itself performs no waiting; the owning [`TimerHost`] worker
/// polls [`take_due`](TimerTable::take_due) and sleeps until
/// [`next_deadline`](TimerTable::next_deadline).
#[derive(Debug, Default)]
pub struct TimerTable {
    slots: BTreeMap<u32, TimerSlot>,
    next_id: u32,
    /// The instant the worker is currently sleeping towards, `None` when it
    /// sleeps without a deadline. Maintained by the worker; used to decide
    /// whether arming a timer must wake it early.
    wake_target: Option<Instant>,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a timer descriptor. The timer starts out inactive.
    pub fn init(&mut self, name: &'static str, tag: u32) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.insert(
            id,
            TimerSlot {
                name,
                tag,
                periodic: false,
                period: Duration::ZERO,
                deadline: None,
                losses: 0,
            },
        );
        TimerId(id)
    }

    /// Stops and removes a timer descriptor. The id is invalid afterwards.
    pub fn free(&mut self, id: TimerId) {
        self.slots
            .remove(&id.0)
            .unwrap_or_else(|| panic!("freeing uninitialized timer {}", id));
    }

    /// (Re)arms a timer `period` from now, returning whether the worker's
    /// current wake target moved earlier and it must be signalled.
    ///
    /// # Panics
    ///
    /// Panics on an uninitialized id, or if `periodic` with a zero period.
    pub fn start(&mut self, id: TimerId, period: Duration, periodic: bool) -> bool {
        assert!(
            !periodic || !period.is_zero(),
            "periodic timer {} started with zero period",
            id
        );

        let deadline = Instant::now() + period;
        let slot = self.slot_mut(id);
        slot.periodic = periodic;
        slot.period = period;
        slot.deadline = Some(deadline);

        self.wakes_earlier(deadline)
    }

    /// Lengthens a one-shot timer's deadline to at least `timeout` from
    /// now. An armed timer is never shortened; an inactive timer is armed
    /// afresh. Returns whether the worker must be signalled.
    ///
    /// # Panics
    ///
    /// Panics on an uninitialized id or a periodic timer.
    pub fn extend(&mut self, id: TimerId, timeout: Duration) -> bool {
        let now = Instant::now();
        let slot = self.slot_mut(id);
        assert!(!slot.periodic, "extend on periodic timer {}", id);

        let deadline = match slot.deadline {
            Some(current) if current >= now + timeout => return false,
            _ => now + timeout,
        };
        slot.period = timeout;
        slot.deadline = Some(deadline);

        self.wakes_earlier(deadline)
    }

    /// Disarms a timer. Stopping an already-inactive timer is a no-op.
    pub fn stop(&mut self, id: TimerId) {
        self.slot_mut(id).deadline = None;
    }

    /// Returns true if the timer is armed.
    pub fn active(&self, id: TimerId) -> bool {
        self.slot(id).deadline.is_some()
    }

    /// Returns the number of periods a periodic timer has skipped.
    pub fn losses(&self, id: TimerId) -> u64 {
        self.slot(id).losses
    }

    /// Returns the instance tag the timer was initialized with.
    pub fn tag(&self, id: TimerId) -> u32 {
        self.slot(id).tag
    }

    /// Returns the name the timer was initialized with.
    pub fn name(&self, id: TimerId) -> &'static str {
        self.slot(id).name
    }

    /// Collects all timers due at `now`, in deadline order.
    ///
    /// One-shot timers are disarmed before being returned, so a dispatch
    /// may re-arm them. Periodic timers advance by whole periods past
    /// `now`, counting skipped periods as losses, and stay armed.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(Instant, TimerId)> = Vec::new();

        for (&id, slot) in self.slots.iter_mut() {
            let Some(deadline) = slot.deadline else {
                continue;
            };
            if deadline > now {
                continue;
            }

            if slot.periodic {
                let behind = now.duration_since(deadline);
                let skipped = behind.as_nanos() / slot.period.as_nanos();
                slot.losses += skipped as u64;
                slot.deadline = Some(deadline + slot.period * (skipped as u32 + 1));
            } else {
                slot.deadline = None;
            }

            due.push((deadline, TimerId(id)));
        }

        due.sort_by_key(|&(deadline, _)| deadline);
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Returns the earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().filter_map(|s| s.deadline).min()
    }

    /// Records the instant the worker is about to sleep towards.
    pub fn set_wake_target(&mut self, target: Option<Instant>) {
        self.wake_target = target;
    }

    fn wakes_earlier(&self, deadline: Instant) -> bool {
        match self.wake_target {
            None => true,
            Some(target) => deadline < target,
        }
    }

    fn slot(&self, id: TimerId) -> &TimerSlot {
        self.slots
            .get(&id.0)
            .unwrap_or_else(|| panic!("use of uninitialized timer {}", id))
    }

    fn slot_mut(&mut self, id: TimerId) -> &mut TimerSlot {
        self.slots
            .get_mut(&id.0)
            .unwrap_or_else(|| panic!("use of uninitialized timer {}", id))
    }
}
