//! The orchestrator: public API surface and the single-lock state.

use crate::capabilities::PsfpCapabilities;
use crate::error::{EntityKind, PsfpError, PsfpResult};
use crate::filter::{
    FilterConfig, FilterControl, FilterEntry, FilterStatistics, FilterStatus,
};
use crate::flow_meter::{FlowMeterConfig, FlowMeterControl, FlowMeterEntry, FlowMeterStatus};
use crate::gate::{GateConfig, GateControl, GateEntry, GateStatus};
use crate::stream::{StreamCatalog, StreamEvent};
use log::{error, info};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tsn_hal::PsfpHardware;
use tsn_timer::{TimerDispatch, TimerHost, TimerId, TimerTable, TimerWorker};
use tsn_types::{FilterId, FlowMeterId, GateId};

/// Tunables of the base-time staging machinery.
///
/// Both margins are hardware-derived on the reference platform but vary
/// between chip families, so they are carried as configuration rather
/// than constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsfpOptions {
    /// How far ahead of "now" a hardware base time must lie at minimum.
    /// Base times closer than this are advanced by whole cycles.
    pub schedule_margin_secs: u64,
    /// How long before the hardware's base-time horizon the staging timer
    /// fires, leaving room to re-program the hardware in time.
    pub staging_margin_secs: u64,
}

impl Default for PsfpOptions {
    fn default() -> Self {
        PsfpOptions {
            schedule_margin_secs: 2,
            staging_margin_secs: 10,
        }
    }
}

/// Everything behind the subsystem lock: the three entity maps, the timer
/// table, the boundaries, and the capability snapshot.
pub(crate) struct PsfpInner {
    pub(crate) caps: PsfpCapabilities,
    pub(crate) opts: PsfpOptions,
    pub(crate) hal: Arc<dyn PsfpHardware>,
    pub(crate) streams: Arc<dyn StreamCatalog>,
    /// Gate schedules are only pushed in full once the PTP clock is
    /// trustworthy.
    pub(crate) clock_ready: bool,
    pub(crate) meters: BTreeMap<FlowMeterId, FlowMeterEntry>,
    pub(crate) gates: BTreeMap<GateId, GateEntry>,
    pub(crate) filters: BTreeMap<FilterId, FilterEntry>,
    pub(crate) timers: TimerTable,
    /// Set when a timer operation moved the worker's wake target earlier;
    /// consumed by the lock wrapper, which signals the worker after
    /// releasing the lock.
    pub(crate) wake_worker: bool,
}

impl TimerDispatch for PsfpInner {
    fn timer_table(&mut self) -> &mut TimerTable {
        &mut self.timers
    }

    fn dispatch_timer(&mut self, id: TimerId) {
        self.gate_timer_fired(id);
    }
}

impl PsfpInner {
    /// Deletes everything in dependency order: filters reference meters
    /// and gates, so they go first; gates own timers, so they go before
    /// meters only by convention (they share no edge).
    pub(crate) fn reset_to_defaults(&mut self) {
        info!("resetting PSFP configuration to defaults");

        for id in self.filters.keys().copied().collect::<Vec<_>>() {
            if let Err(e) = self.filter_delete(id) {
                error!("filter {}: delete during reset failed: {}", id, e);
            }
        }
        for id in self.gates.keys().copied().collect::<Vec<_>>() {
            if let Err(e) = self.gate_delete(id) {
                error!("gate {}: delete during reset failed: {}", id, e);
            }
        }
        for id in self.meters.keys().copied().collect::<Vec<_>>() {
            if let Err(e) = self.flow_meter_delete(id) {
                error!("flow meter {}: delete during reset failed: {}", id, e);
            }
        }
    }
}

/// The PSFP subsystem.
///
/// All public operations are synchronous and fully serialized by one
/// coarse lock; the background timer worker takes the same lock for every
/// dispatch. Construction probes capabilities once; on unsupported
/// platforms every operation returns [`PsfpError::NotSupported`] and no
/// worker thread is spawned.
pub struct PsfpOrch {
    // Field order matters: the worker joins its thread on drop and must go
    // before the host it borrows state from.
    worker: Option<TimerWorker<PsfpInner>>,
    host: TimerHost<PsfpInner>,
    caps: PsfpCapabilities,
}

impl PsfpOrch {
    /// Creates the subsystem with default options.
    pub fn new(hal: Arc<dyn PsfpHardware>, streams: Arc<dyn StreamCatalog>) -> Self {
        Self::with_options(hal, streams, PsfpOptions::default())
    }

    /// Creates the subsystem, probing capabilities and spawning the timer
    /// worker.
    ///
    /// # Panics
    ///
    /// Panics if the hardware reports a base-time horizon the staging
    /// machinery cannot work with (not expressible in milliseconds, or not
    /// larger than the staging margin). Such a platform needs a code
    /// change, not error handling.
    pub fn with_options(
        hal: Arc<dyn PsfpHardware>,
        streams: Arc<dyn StreamCatalog>,
        opts: PsfpOptions,
    ) -> Self {
        let caps = PsfpCapabilities::probe(hal.as_ref(), streams.as_ref());

        if let Some(horizon_secs) = caps.base_time_horizon_secs {
            assert!(
                horizon_secs.checked_mul(1000).is_some(),
                "base-time horizon does not fit the timer period in milliseconds"
            );
            assert!(
                horizon_secs > opts.staging_margin_secs,
                "base-time horizon must exceed the staging margin"
            );
        }

        let inner = PsfpInner {
            caps,
            opts,
            hal,
            streams,
            clock_ready: false,
            meters: BTreeMap::new(),
            gates: BTreeMap::new(),
            filters: BTreeMap::new(),
            timers: TimerTable::new(),
            wake_worker: false,
        };

        let host = TimerHost::new(inner);
        let worker = caps
            .psfp_supported
            .then(|| host.spawn_worker("psfp-timer"));

        info!(
            "PSFP subsystem initialized (supported = {})",
            caps.psfp_supported
        );

        PsfpOrch { worker, host, caps }
    }

    /// The capability snapshot. Available whether or not PSFP is
    /// supported.
    pub fn capabilities(&self) -> PsfpCapabilities {
        self.caps
    }

    /// Whether PSFP is supported on this platform.
    pub fn supported(&self) -> bool {
        self.caps.psfp_supported
    }

    /// Signals that the PTP clock is ready: gate schedules can now be
    /// trusted against current time, and latched change requests are
    /// released.
    pub fn clock_ready(&self) {
        if !self.caps.psfp_supported {
            return;
        }
        self.with_inner(|inner| inner.clock_ready_update());
    }

    /// Entry point for the stream module's change notification feed.
    pub fn on_stream_event(&self, event: StreamEvent) {
        if !self.caps.psfp_supported {
            return;
        }
        self.with_inner(|inner| inner.handle_stream_event(event));
    }

    /// Deletes all filters, then all gates, then all meters.
    pub fn reset_to_defaults(&self) {
        if !self.caps.psfp_supported {
            return;
        }
        self.with_inner(|inner| inner.reset_to_defaults());
    }

    // ------------------------------------------------------------------
    // Flow meters
    // ------------------------------------------------------------------

    pub fn flow_meter_default_conf(&self) -> PsfpResult<FlowMeterConfig> {
        self.check_supported()?;
        Ok(FlowMeterConfig::default())
    }

    pub fn flow_meter_get(&self, id: FlowMeterId) -> PsfpResult<FlowMeterConfig> {
        self.check_supported()?;
        self.check_flow_meter_id(id)?;
        self.with_inner(|inner| inner.flow_meter_get(id))
    }

    pub fn flow_meter_set(&self, id: FlowMeterId, conf: &FlowMeterConfig) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_flow_meter_id(id)?;
        self.with_inner(|inner| inner.flow_meter_set(id, conf))
    }

    pub fn flow_meter_delete(&self, id: FlowMeterId) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_flow_meter_id(id)?;
        self.with_inner(|inner| inner.flow_meter_delete(id))
    }

    /// The first created meter id after `prev`, or from the start with
    /// `None`. Returns `Ok(None)` when the iteration is exhausted.
    pub fn flow_meter_next(&self, prev: Option<FlowMeterId>) -> PsfpResult<Option<FlowMeterId>> {
        self.check_supported()?;
        Ok(self.with_inner(|inner| next_key(&inner.meters, prev)))
    }

    pub fn flow_meter_status(&self, id: FlowMeterId) -> PsfpResult<FlowMeterStatus> {
        self.check_supported()?;
        self.check_flow_meter_id(id)?;
        self.with_inner(|inner| inner.flow_meter_status(id))
    }

    pub fn flow_meter_control(&self, id: FlowMeterId, ctrl: &FlowMeterControl) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_flow_meter_id(id)?;
        self.with_inner(|inner| inner.flow_meter_control(id, ctrl))
    }

    // ------------------------------------------------------------------
    // Stream gates
    // ------------------------------------------------------------------

    pub fn gate_default_conf(&self) -> PsfpResult<GateConfig> {
        self.check_supported()?;
        Ok(GateConfig::default())
    }

    pub fn gate_get(&self, id: GateId) -> PsfpResult<GateConfig> {
        self.check_supported()?;
        self.check_gate_id(id)?;
        self.with_inner(|inner| inner.gate_get(id))
    }

    pub fn gate_set(&self, id: GateId, conf: &GateConfig) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_gate_id(id)?;
        self.with_inner(|inner| inner.gate_set(id, conf))
    }

    pub fn gate_delete(&self, id: GateId) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_gate_id(id)?;
        self.with_inner(|inner| inner.gate_delete(id))
    }

    /// The first created gate id after `prev`. `Ok(None)` at the end.
    pub fn gate_next(&self, prev: Option<GateId>) -> PsfpResult<Option<GateId>> {
        self.check_supported()?;
        Ok(self.with_inner(|inner| next_key(&inner.gates, prev)))
    }

    pub fn gate_status(&self, id: GateId) -> PsfpResult<GateStatus> {
        self.check_supported()?;
        self.check_gate_id(id)?;
        self.with_inner(|inner| inner.gate_status(id))
    }

    pub fn gate_control(&self, id: GateId, ctrl: &GateControl) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_gate_id(id)?;
        self.with_inner(|inner| inner.gate_control(id, ctrl))
    }

    /// Diagnostics: whether the gate's base-time staging timer is armed.
    pub fn gate_staging_timer_active(&self, id: GateId) -> PsfpResult<bool> {
        self.check_supported()?;
        self.check_gate_id(id)?;
        self.with_inner(|inner| {
            inner
                .gates
                .get(&id)
                .map(|gate| inner.timers.active(gate.timer))
                .ok_or(PsfpError::NoSuchInstance {
                    kind: EntityKind::Gate,
                    id: id.as_u32(),
                })
        })
    }

    // ------------------------------------------------------------------
    // Stream filters
    // ------------------------------------------------------------------

    pub fn filter_default_conf(&self) -> PsfpResult<FilterConfig> {
        self.check_supported()?;
        Ok(FilterConfig::default())
    }

    pub fn filter_get(&self, id: FilterId) -> PsfpResult<FilterConfig> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_get(id))
    }

    pub fn filter_set(&self, id: FilterId, conf: &FilterConfig) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_set(id, conf))
    }

    pub fn filter_delete(&self, id: FilterId) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_delete(id))
    }

    /// The first created filter id after `prev`. `Ok(None)` at the end.
    pub fn filter_next(&self, prev: Option<FilterId>) -> PsfpResult<Option<FilterId>> {
        self.check_supported()?;
        Ok(self.with_inner(|inner| next_key(&inner.filters, prev)))
    }

    pub fn filter_status(&self, id: FilterId) -> PsfpResult<FilterStatus> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_status(id))
    }

    pub fn filter_control(&self, id: FilterId, ctrl: &FilterControl) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_control(id, ctrl))
    }

    pub fn filter_statistics(&self, id: FilterId) -> PsfpResult<FilterStatistics> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_statistics(id))
    }

    pub fn filter_statistics_clear(&self, id: FilterId) -> PsfpResult<()> {
        self.check_supported()?;
        self.check_filter_id(id)?;
        self.with_inner(|inner| inner.filter_statistics_clear(id))
    }

    // ------------------------------------------------------------------

    /// Runs `f` under the subsystem lock, then signals the timer worker if
    /// a timer operation inside moved its wake target earlier.
    fn with_inner<R>(&self, f: impl FnOnce(&mut PsfpInner) -> R) -> R {
        let mut guard = self.host.lock();
        let result = f(&mut guard);
        let wake = std::mem::take(&mut guard.wake_worker);
        drop(guard);
        if wake {
            self.host.wake_worker();
        }
        result
    }

    fn check_supported(&self) -> PsfpResult<()> {
        if self.caps.psfp_supported {
            Ok(())
        } else {
            Err(PsfpError::NotSupported)
        }
    }

    fn check_flow_meter_id(&self, id: FlowMeterId) -> PsfpResult<()> {
        if id.as_u32() < self.caps.max_flow_meters {
            Ok(())
        } else {
            Err(PsfpError::OutOfRange {
                kind: EntityKind::FlowMeter,
                id: id.as_u32(),
                max: self.caps.max_flow_meters.saturating_sub(1),
            })
        }
    }

    fn check_gate_id(&self, id: GateId) -> PsfpResult<()> {
        if id.as_u32() < self.caps.max_gates {
            Ok(())
        } else {
            Err(PsfpError::OutOfRange {
                kind: EntityKind::Gate,
                id: id.as_u32(),
                max: self.caps.max_gates.saturating_sub(1),
            })
        }
    }

    fn check_filter_id(&self, id: FilterId) -> PsfpResult<()> {
        if id.as_u32() < self.caps.max_filters {
            Ok(())
        } else {
            Err(PsfpError::OutOfRange {
                kind: EntityKind::Filter,
                id: id.as_u32(),
                max: self.caps.max_filters.saturating_sub(1),
            })
        }
    }
}

impl Drop for PsfpOrch {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
    }
}

/// First key strictly greater than `prev` (or the smallest key when
/// `prev` is `None`).
fn next_key<K: Ord + Copy, V>(map: &BTreeMap<K, V>, prev: Option<K>) -> Option<K> {
    let range = match prev {
        None => map.range(..),
        Some(prev) => map.range((Bound::Excluded(prev), Bound::Unbounded)),
    };
    range.map(|(key, _)| *key).next()
}
