//! Mock hardware and stream module for the integration tests.

use parking_lot::Mutex;
use psfp_orch::stream::{
    StreamAction, StreamBinding, StreamCapabilities, StreamCatalog, StreamClient, StreamStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tsn_hal::{
    HalCapabilities, HalError, HalFilterConfig, HalFilterStatus, HalGateConfig, HalGateStatus,
    HalGce, HalPolicerConfig, HalPolicerStatus, HalResult, IngressCounters, PolicerHandle,
    PsfpHardware,
};
use tsn_types::{FilterId, GateId, Timestamp};

/// In-memory switch model. Policer rates are taken verbatim (the "closest
/// supported value" is the requested one); gate config-change writes mark
/// the gate pending until the test flips it.
#[derive(Default)]
pub struct FakeSwitch {
    horizon: Option<u64>,
    now: Mutex<Timestamp>,
    calls: AtomicU64,
    next_policer: AtomicU64,
    policers: Mutex<HashMap<u64, HalPolicerConfig>>,
    policer_status: Mutex<HashMap<u64, HalPolicerStatus>>,
    gate_confs: Mutex<HashMap<u32, HalGateConfig>>,
    gate_status: Mutex<HashMap<u32, HalGateStatus>>,
    gcls: Mutex<HashMap<u32, Vec<HalGce>>>,
    filter_confs: Mutex<HashMap<u32, HalFilterConfig>>,
    filter_status: Mutex<HashMap<u32, HalFilterStatus>>,
}

impl FakeSwitch {
    pub fn new(horizon: Option<u64>) -> Self {
        FakeSwitch {
            horizon,
            next_policer: AtomicU64::new(0x4000),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn set_now(&self, now: Timestamp) {
        *self.now.lock() = now;
    }

    pub fn gate_conf(&self, id: GateId) -> Option<HalGateConfig> {
        self.gate_confs.lock().get(&id.as_u32()).copied()
    }

    pub fn set_gate_config_pending(&self, id: GateId, pending: bool) {
        self.gate_status
            .lock()
            .entry(id.as_u32())
            .or_default()
            .config_pending = pending;
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl PsfpHardware for FakeSwitch {
    fn capabilities(&self) -> HalCapabilities {
        HalCapabilities {
            psfp_supported: true,
            max_filters: 256,
            max_gates: 256,
            max_flow_meters: 256,
            gcl_length_max: 4,
            base_time_horizon_secs: self.horizon,
        }
    }

    fn policer_alloc(&self) -> HalResult<PolicerHandle> {
        self.count();
        let handle = PolicerHandle::new(self.next_policer.fetch_add(1, Ordering::Relaxed));
        self.policers
            .lock()
            .insert(handle.as_u64(), HalPolicerConfig::default());
        self.policer_status
            .lock()
            .insert(handle.as_u64(), HalPolicerStatus::default());
        Ok(handle)
    }

    fn policer_free(&self, handle: PolicerHandle) -> HalResult<()> {
        self.count();
        self.policers.lock().remove(&handle.as_u64());
        self.policer_status.lock().remove(&handle.as_u64());
        Ok(())
    }

    fn policer_conf_get(&self, handle: PolicerHandle) -> HalResult<HalPolicerConfig> {
        self.count();
        self.policers
            .lock()
            .get(&handle.as_u64())
            .cloned()
            .ok_or_else(|| HalError::internal("unknown policer"))
    }

    fn policer_conf_set(&self, handle: PolicerHandle, conf: &HalPolicerConfig) -> HalResult<()> {
        self.count();
        self.policers.lock().insert(handle.as_u64(), conf.clone());
        self.policer_status
            .lock()
            .entry(handle.as_u64())
            .or_default()
            .mark_all_red = conf.mark_all_red.enabled && conf.mark_all_red.value;
        Ok(())
    }

    fn policer_status(&self, handle: PolicerHandle) -> HalResult<HalPolicerStatus> {
        self.count();
        self.policer_status
            .lock()
            .get(&handle.as_u64())
            .copied()
            .ok_or_else(|| HalError::internal("unknown policer"))
    }

    fn gate_conf_get(&self, gate_id: GateId) -> HalResult<HalGateConfig> {
        self.count();
        Ok(self
            .gate_confs
            .lock()
            .get(&gate_id.as_u32())
            .copied()
            .unwrap_or_default())
    }

    fn gate_conf_set(&self, gate_id: GateId, conf: &HalGateConfig) -> HalResult<()> {
        self.count();
        {
            let mut status = self.gate_status.lock();
            let entry = status.entry(gate_id.as_u32()).or_default();
            entry.gate_open = conf.gate_open;
            entry.prio = conf.prio;
            entry.close_invalid_rx = conf.close_invalid_rx.enabled && conf.close_invalid_rx.value;
            entry.close_octets_exceeded =
                conf.close_octets_exceeded.enabled && conf.close_octets_exceeded.value;
            if conf.config_change {
                entry.config_pending = true;
                entry.config_change_time = conf.schedule.base_time;
            }
            if !conf.enabled {
                entry.config_pending = false;
            }
        }

        let mut stored = *conf;
        stored.config_change = false;
        self.gate_confs.lock().insert(gate_id.as_u32(), stored);
        Ok(())
    }

    fn gate_gcl_set(&self, gate_id: GateId, gcl: &[HalGce]) -> HalResult<()> {
        self.count();
        self.gcls.lock().insert(gate_id.as_u32(), gcl.to_vec());
        Ok(())
    }

    fn gate_status(&self, gate_id: GateId) -> HalResult<HalGateStatus> {
        self.count();
        let mut status = self
            .gate_status
            .lock()
            .get(&gate_id.as_u32())
            .copied()
            .unwrap_or_default();
        status.current_time = *self.now.lock();
        Ok(status)
    }

    fn filter_conf_get(&self, filter_id: FilterId) -> HalResult<HalFilterConfig> {
        self.count();
        Ok(self
            .filter_confs
            .lock()
            .get(&filter_id.as_u32())
            .copied()
            .unwrap_or_default())
    }

    fn filter_conf_set(&self, filter_id: FilterId, conf: &HalFilterConfig) -> HalResult<()> {
        self.count();
        self.filter_confs.lock().insert(filter_id.as_u32(), *conf);
        self.filter_status
            .lock()
            .entry(filter_id.as_u32())
            .or_default()
            .block_oversize = conf.block_oversize.enabled && conf.block_oversize.value;
        Ok(())
    }

    fn filter_status(&self, filter_id: FilterId) -> HalResult<HalFilterStatus> {
        self.count();
        Ok(self
            .filter_status
            .lock()
            .get(&filter_id.as_u32())
            .copied()
            .unwrap_or_default())
    }
}

/// In-memory stream module.
#[derive(Default)]
pub struct FakeStreams {
    streams: Mutex<HashMap<StreamBinding, StreamStatus>>,
    actions: Mutex<HashMap<StreamBinding, StreamAction>>,
    counters: Mutex<HashMap<StreamBinding, IngressCounters>>,
}

impl FakeStreams {
    pub fn add(&self, binding: StreamBinding) {
        self.streams.lock().insert(binding, StreamStatus::default());
    }

    pub fn last_action(&self, binding: StreamBinding) -> Option<StreamAction> {
        self.actions.lock().get(&binding).copied()
    }

    pub fn set_counters(&self, binding: StreamBinding, counters: IngressCounters) {
        self.counters.lock().insert(binding, counters);
    }
}

impl StreamCatalog for FakeStreams {
    fn capabilities(&self) -> StreamCapabilities {
        StreamCapabilities {
            stream_id_max: 127,
            stream_collection_id_max: 63,
        }
    }

    fn status(&self, binding: StreamBinding) -> Option<StreamStatus> {
        self.streams.lock().get(&binding).copied()
    }

    fn action_set(
        &self,
        binding: StreamBinding,
        _client: StreamClient,
        action: &StreamAction,
    ) -> Result<(), String> {
        self.actions.lock().insert(binding, *action);
        if let Some(status) = self.streams.lock().get_mut(&binding) {
            status.psfp.enabled = action.enabled;
            status.psfp.client_id = action.client_id;
        }
        Ok(())
    }

    fn counters(&self, binding: StreamBinding) -> Result<IngressCounters, String> {
        self.counters
            .lock()
            .get(&binding)
            .copied()
            .ok_or_else(|| "no counters attached".to_string())
    }

    fn counters_clear(&self, binding: StreamBinding) -> Result<(), String> {
        self.counters.lock().remove(&binding);
        Ok(())
    }
}
