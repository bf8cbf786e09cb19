//! Stream gate types.

use tsn_timer::TimerId;
use tsn_types::Timestamp;

/// Upper bound on gate control list length across all platforms. The
/// actual per-platform limit is in the capability snapshot and is never
/// larger than this.
pub const GCL_LENGTH_MAX: usize = 4;

/// Is the gate closed or open?
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GateState {
    #[default]
    Closed,
    Open,
}

impl GateState {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Closed => "closed",
            GateState::Open => "open",
        }
    }
}

/// One gate control list entry (GCE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateControlEntry {
    /// Gate state while this entry is active.
    pub gate_state: GateState,
    /// Internal priority override, `None` to leave the frame's priority
    /// alone. Valid values are 0 to 7.
    pub ipv: Option<u8>,
    /// How long this entry is active, in nanoseconds. Valid values are 1
    /// to 999,999,999; the sum over all active entries must not exceed the
    /// gate's cycle time.
    pub time_interval_ns: u32,
    /// Frames larger than this are discarded while the entry is active;
    /// 0 disables the check.
    pub interval_octet_max: u32,
}

impl Default for GateControlEntry {
    fn default() -> Self {
        GateControlEntry {
            gate_state: GateState::Closed,
            ipv: None,
            time_interval_ns: 1,
            interval_octet_max: 0,
        }
    }
}

/// Stream gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Gate state on enable, before any GCE takes over.
    pub gate_state: GateState,
    /// Initial internal priority upon frame arrival, `None` to disable the
    /// override. Valid values are 0 to 7.
    pub ipv: Option<u8>,
    /// Schedule cycle time in nanoseconds, 0 to 1,000,000,000. Zero
    /// disables the gate control list.
    pub cycle_time_ns: u32,
    /// CycleTimeExtension in nanoseconds, 0 to 1,000,000,000.
    pub cycle_time_extension_ns: u32,
    /// Schedule anchor: cycles repeat at cycle-time offsets from here.
    pub base_time: Timestamp,
    /// Permanently close the gate if a frame arrives during a closed
    /// state.
    pub close_due_to_invalid_rx_enable: bool,
    /// Permanently close the gate if a frame exceeds the active entry's
    /// octet max.
    pub close_due_to_octets_exceeded_enable: bool,
    /// Number of active entries in `gcl`, at most the platform's GCL
    /// length limit.
    pub gcl_length: u32,
    /// Gate control list; entries beyond `gcl_length` are ignored and
    /// normalized to defaults on `set`.
    pub gcl: [GateControlEntry; GCL_LENGTH_MAX],
    /// Enables the gate.
    pub gate_enabled: bool,
    /// One-shot: signals the start of a configuration change. The
    /// schedule-carrying fields only reach hardware through this.
    pub config_change: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            gate_state: GateState::Closed,
            ipv: None,
            cycle_time_ns: 0,
            cycle_time_extension_ns: 0,
            base_time: Timestamp::ZERO,
            close_due_to_invalid_rx_enable: false,
            close_due_to_octets_exceeded_enable: false,
            gcl_length: 0,
            gcl: [GateControlEntry::default(); GCL_LENGTH_MAX],
            gate_enabled: false,
            config_change: false,
        }
    }
}

/// Stream gate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStatus {
    /// The configuration currently in effect, `None` until a pending
    /// configuration has been adopted by hardware for the first time.
    pub oper_conf: Option<GateConfig>,
    /// The ConfigPending state machine variable.
    pub config_pending: bool,
    /// The configuration that will take effect at its base time, `None`
    /// when nothing is pending.
    pub pend_conf: Option<GateConfig>,
    /// Operational gate state.
    pub oper_gate_state: GateState,
    /// Operational internal priority, `None` when the override is off.
    pub oper_ipv: Option<u8>,
    /// The instant the next config change will occur (or the last one
    /// occurred).
    pub config_change_time: Timestamp,
    /// The hardware's current PTP time.
    pub current_time: Timestamp,
    /// Cycle-time clock granularity, in tenths of nanoseconds.
    pub tick_granularity: u32,
    /// Times a config change was requested with the old schedule still
    /// running and the requested base time in the past (802.1Q 8.6.9.3.1).
    pub config_change_errors: u32,
    /// The gate is latched closed because a frame arrived during a closed
    /// state. Cleared via [`GateControl`].
    pub closed_due_to_invalid_rx: bool,
    /// The gate is latched closed because a frame exceeded the octet max.
    /// Cleared via [`GateControl`].
    pub closed_due_to_octets_exceeded: bool,
}

/// Stream gate control operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateControl {
    pub clear_closed_due_to_invalid_rx: bool,
    pub clear_closed_due_to_octets_exceeded: bool,
}

/// Where a gate is in the two-phase apply protocol.
///
/// The staging timer is armed exactly in `PendingTimer`; the pending
/// configuration travels inside the variant, so "timer active with nothing
/// pending" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Staging {
    /// Gate disabled; hardware cleared any pending change.
    Disabled,
    /// Gate enabled, no configuration change under way.
    Idle,
    /// Pending config handed to hardware with its real (or cycle-snapped)
    /// base time; hardware will adopt it on its own.
    PendingHardware(GateConfig),
    /// Pending base time lies beyond the hardware horizon; the hardware
    /// holds a placeholder base time and the software timer re-evaluates
    /// before it is reached.
    PendingTimer(GateConfig),
}

impl Staging {
    /// The pending configuration, if any.
    pub(crate) fn pending(&self) -> Option<&GateConfig> {
        match self {
            Staging::PendingHardware(pend) | Staging::PendingTimer(pend) => Some(pend),
            Staging::Disabled | Staging::Idle => None,
        }
    }
}

/// Per-instance state.
#[derive(Debug)]
pub(crate) struct GateEntry {
    pub conf: GateConfig,
    pub staging: Staging,
    /// Valid once hardware has adopted a configuration the first time.
    pub oper_conf: Option<GateConfig>,
    pub config_change_errors: u32,
    /// Base-time staging timer; armed iff `staging` is `PendingTimer`.
    pub timer: TimerId,
}
