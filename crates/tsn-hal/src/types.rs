//! Driver data structures.

use std::fmt;
use tsn_types::Timestamp;

/// Handle to an allocated hardware policer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicerHandle(u64);

impl PolicerHandle {
    pub const fn new(raw: u64) -> Self {
        PolicerHandle(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PolicerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// An enable flag paired with a hardware-latched value.
///
/// Used for the sticky conditions (gate closed-due-to, filter
/// block-oversize): `enabled` selects whether the hardware latches the
/// condition at all, `value` is the latch itself. The latch is
/// hardware-owned and only cleared by writing `value = false` back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptBool {
    pub enabled: bool,
    pub value: bool,
}

/// Dual-leaky-bucket policer configuration.
///
/// Rates are in kbps, burst sizes in bytes. The hardware snaps rates and
/// bursts to the nearest supported values; a get after a set returns the
/// effective configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalPolicerConfig {
    pub enabled: bool,
    /// Color aware (true) or color blind (false).
    pub color_aware: bool,
    /// Coupling flag: committed-bucket overflow spills into the excess
    /// bucket.
    pub coupling: bool,
    pub cir_kbps: u32,
    pub cbs_bytes: u32,
    pub eir_kbps: u32,
    pub ebs_bytes: u32,
    /// Discard yellow frames instead of remarking DEI.
    pub drop_yellow: bool,
    pub mark_all_red: OptBool,
}

/// Policer status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalPolicerStatus {
    /// All frames are currently being marked red (and discarded).
    pub mark_all_red: bool,
}

/// One gate control list entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalGce {
    pub gate_open: bool,
    /// Internal priority override while this entry is active, `None` to
    /// leave the frame's priority alone.
    pub prio: Option<u8>,
    pub time_interval_ns: u32,
    /// Frames larger than this are discarded while the entry is active;
    /// 0 disables the check.
    pub octet_max: u32,
}

/// The time-anchored part of a gate configuration, adopted atomically at
/// `base_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalGateSchedule {
    pub base_time: Timestamp,
    pub cycle_time_ns: u32,
    pub cycle_time_ext_ns: u32,
}

/// Stream gate configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalGateConfig {
    pub enabled: bool,
    pub gate_open: bool,
    pub prio: Option<u8>,
    pub close_invalid_rx: OptBool,
    pub close_octets_exceeded: OptBool,
    /// When true, the driver arms adoption of `schedule` (and the most
    /// recently written GCL) at `schedule.base_time`.
    pub config_change: bool,
    pub schedule: HalGateSchedule,
}

/// Stream gate status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalGateStatus {
    pub gate_open: bool,
    pub prio: Option<u8>,
    /// The instant the pending schedule will be (or was) adopted.
    pub config_change_time: Timestamp,
    /// The hardware's current PTP time.
    pub current_time: Timestamp,
    pub config_pending: bool,
    pub close_invalid_rx: bool,
    pub close_octets_exceeded: bool,
}

/// Stream filter configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalFilterConfig {
    pub gate_enabled: bool,
    /// Hardware gate number; only meaningful when `gate_enabled`.
    pub gate_id: u32,
    /// Maximum SDU size in octets, 0 to disable the check.
    pub max_sdu: u32,
    pub block_oversize: OptBool,
}

/// Stream filter status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalFilterStatus {
    pub block_oversize: bool,
}

/// Ingress match/pass/discard counters for one stream or collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressCounters {
    pub rx_match: u64,
    pub rx_gate_pass: u64,
    pub rx_gate_discard: u64,
    pub rx_sdu_pass: u64,
    pub rx_sdu_discard: u64,
    pub rx_red_frames: u64,
}

/// Hardware feature and limit snapshot, queried once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalCapabilities {
    /// When false, the whole subsystem is unavailable on this platform.
    pub psfp_supported: bool,
    pub max_filters: u32,
    pub max_gates: u32,
    pub max_flow_meters: u32,
    pub gcl_length_max: u32,
    /// On affected chip families the base-time comparator is truncated, so
    /// a base time further than this many seconds from current time cannot
    /// be programmed directly. `None` on unaffected families.
    pub base_time_horizon_secs: Option<u64>,
}

impl Default for HalCapabilities {
    fn default() -> Self {
        HalCapabilities {
            psfp_supported: false,
            max_filters: 0,
            max_gates: 0,
            max_flow_meters: 0,
            gcl_length_max: 0,
            base_time_horizon_secs: None,
        }
    }
}
