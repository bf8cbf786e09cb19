//! The driver API surface consumed by the orchestrator.

use crate::error::HalResult;
use crate::types::{
    HalCapabilities, HalFilterConfig, HalFilterStatus, HalGateConfig, HalGateStatus, HalGce,
    HalPolicerConfig, HalPolicerStatus, PolicerHandle,
};
use tsn_types::{FilterId, GateId};

/// Synchronous access to the switch driver's PSFP objects.
///
/// Implementations wrap the vendor SDK; tests substitute mock hardware.
/// Calls are expected to be fast and non-blocking — the orchestrator holds
/// its subsystem lock across them. Every call either succeeds or returns a
/// driver error; the orchestrator never retries.
///
/// Gate and filter hardware instances are addressed directly by their
/// instance ids: the hardware tables are index-based, so no allocation
/// step exists for them. Policers come from a shared pool and must be
/// allocated and freed explicitly.
pub trait PsfpHardware: Send + Sync {
    /// One-shot feature/limit query, called once at startup.
    fn capabilities(&self) -> HalCapabilities;

    /// Allocates one policer from the hardware pool.
    fn policer_alloc(&self) -> HalResult<PolicerHandle>;

    /// Returns a policer to the hardware pool.
    fn policer_free(&self, handle: PolicerHandle) -> HalResult<()>;

    /// Reads the effective policer configuration (rates and bursts snapped
    /// to hardware-supported values).
    fn policer_conf_get(&self, handle: PolicerHandle) -> HalResult<HalPolicerConfig>;

    fn policer_conf_set(&self, handle: PolicerHandle, conf: &HalPolicerConfig) -> HalResult<()>;

    fn policer_status(&self, handle: PolicerHandle) -> HalResult<HalPolicerStatus>;

    fn gate_conf_get(&self, gate_id: GateId) -> HalResult<HalGateConfig>;

    fn gate_conf_set(&self, gate_id: GateId, conf: &HalGateConfig) -> HalResult<()>;

    /// Stages a new gate control list. The list only takes effect together
    /// with the next `gate_conf_set` carrying `config_change = true`.
    fn gate_gcl_set(&self, gate_id: GateId, gcl: &[HalGce]) -> HalResult<()>;

    fn gate_status(&self, gate_id: GateId) -> HalResult<HalGateStatus>;

    fn filter_conf_get(&self, filter_id: FilterId) -> HalResult<HalFilterConfig>;

    fn filter_conf_set(&self, filter_id: FilterId, conf: &HalFilterConfig) -> HalResult<()>;

    fn filter_status(&self, filter_id: FilterId) -> HalResult<HalFilterStatus>;
}
