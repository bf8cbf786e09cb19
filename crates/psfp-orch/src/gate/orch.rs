//! Stream gate operations and the two-phase apply protocol.

use crate::error::{driver_failure, EntityKind, PsfpError, PsfpResult, ValidationError};
use crate::gate::types::{GateEntry, Staging};
use crate::gate::{GateConfig, GateControl, GateControlEntry, GateState, GateStatus};
use crate::orch::{PsfpInner, PsfpOptions};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tsn_hal::{HalGce, OptBool};
use tsn_types::{GateId, Timestamp};

/// What caused a run of the gate transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateApplyTrigger {
    /// A `set` request (or a deferred one, while the clock was not ready).
    ConfigSet,
    /// The base-time staging timer fired.
    TimerFired,
    /// The PTP clock just became ready.
    ClockReady,
}

fn no_such_gate(id: GateId) -> PsfpError {
    PsfpError::NoSuchInstance {
        kind: EntityKind::Gate,
        id: id.as_u32(),
    }
}

const NS_PER_SEC: u32 = 1_000_000_000;

/// True when the pending base time lies further beyond current time than
/// the hardware's base-time comparator can express.
fn needs_timer_staging(base: &Timestamp, current: &Timestamp, horizon: Option<u64>) -> bool {
    let Some(horizon_secs) = horizon else {
        return false;
    };
    if base <= current {
        return false;
    }
    base.seconds - current.seconds > horizon_secs
}

/// Computes the base time actually written to hardware.
///
/// While the staging timer runs, the hardware is held at the farthest
/// point it can express, so the placeholder schedule cannot take effect
/// before the real base time. Otherwise the pending base time is used
/// directly when it is comfortably ahead of "now"; a base time at or
/// before the margin is advanced by whole cycles to the first point past
/// the margin — preserving a running schedule's phase and never targeting
/// the past.
fn hardware_base_time(
    pend: &GateConfig,
    current: &Timestamp,
    timer_staged: bool,
    horizon: Option<u64>,
    opts: &PsfpOptions,
) -> Timestamp {
    if timer_staged {
        return Timestamp::new(current.seconds + horizon.unwrap_or(0), 0);
    }

    let earliest = current.add_secs(opts.schedule_margin_secs);
    if pend.base_time > earliest {
        return pend.base_time;
    }

    // A zero cycle time (GCL disabled) advances in 1 ns steps.
    let cycle_ns = u64::from(pend.cycle_time_ns.max(1));
    let behind_ns = earliest.nanos_since(&pend.base_time).unwrap_or(0);
    pend.base_time.add_nanos(behind_ns.div_ceil(cycle_ns) * cycle_ns)
}

impl PsfpInner {
    /// Checks every field rule and normalizes entries beyond `gcl_length`
    /// to defaults. Rejects before any state is touched.
    fn validate_gate_conf(&self, conf: &mut GateConfig) -> PsfpResult<()> {
        if let Some(ipv) = conf.ipv {
            if ipv > 7 {
                return Err(ValidationError::InvalidIpv { ipv }.into());
            }
        }

        if conf.cycle_time_ns > NS_PER_SEC {
            return Err(ValidationError::InvalidCycleTime {
                cycle_time_ns: conf.cycle_time_ns,
            }
            .into());
        }

        if conf.cycle_time_extension_ns > NS_PER_SEC {
            return Err(ValidationError::InvalidCycleTimeExtension {
                extension_ns: conf.cycle_time_extension_ns,
            }
            .into());
        }

        if conf.gcl_length > self.caps.gcl_length_max {
            return Err(ValidationError::InvalidGclLength {
                length: conf.gcl_length,
                max: self.caps.gcl_length_max,
            }
            .into());
        }

        for (index, gce) in conf.gcl.iter_mut().enumerate() {
            if index < conf.gcl_length as usize {
                if let Some(ipv) = gce.ipv {
                    if ipv > 7 {
                        return Err(ValidationError::InvalidGceIpv { index, ipv }.into());
                    }
                }
                if gce.time_interval_ns < 1 || gce.time_interval_ns >= NS_PER_SEC {
                    return Err(ValidationError::InvalidGceTimeInterval {
                        index,
                        interval_ns: gce.time_interval_ns,
                    }
                    .into());
                }
                // No bound on interval_octet_max: small values legitimately
                // discard everything.
            } else {
                *gce = GateControlEntry::default();
            }
        }

        // The cycle-time rule only binds when the gate gets (or stays)
        // enabled; a disabled gate may hold a half-edited schedule.
        if conf.gate_enabled {
            let total_ns: u64 = conf
                .gcl
                .iter()
                .take(conf.gcl_length as usize)
                .map(|gce| u64::from(gce.time_interval_ns))
                .sum();
            if total_ns > u64::from(conf.cycle_time_ns) {
                return Err(ValidationError::CycleTimeExceeded {
                    total_ns,
                    cycle_time_ns: conf.cycle_time_ns,
                }
                .into());
            }
        }

        Ok(())
    }

    pub(crate) fn gate_get(&self, id: GateId) -> PsfpResult<GateConfig> {
        self.gates
            .get(&id)
            .map(|entry| entry.conf)
            .ok_or_else(|| no_such_gate(id))
    }

    pub(crate) fn gate_set(&mut self, id: GateId, conf: &GateConfig) -> PsfpResult<()> {
        let mut conf = *conf;
        self.validate_gate_conf(&mut conf)?;

        if let Some(entry) = self.gates.get(&id) {
            if entry.conf == conf {
                debug!("gate {}: no changes", id);
                return Ok(());
            }
        }

        let (new_entry, old_enabled) = match self.gates.get(&id) {
            Some(entry) => (false, entry.conf.gate_enabled),
            None => (true, false),
        };

        if new_entry {
            let timer = self.timers.init("gate-base-time", id.as_u32());
            self.gates.insert(
                id,
                GateEntry {
                    conf,
                    staging: Staging::Disabled,
                    oper_conf: None,
                    config_change_errors: 0,
                    timer,
                },
            );
        } else if let Some(entry) = self.gates.get_mut(&id) {
            entry.conf = conf;
        }

        self.gate_apply(id, GateApplyTrigger::ConfigSet)?;

        if new_entry || old_enabled != conf.gate_enabled {
            self.filters_refresh_for_gate(id, new_entry);
        }

        Ok(())
    }

    pub(crate) fn gate_delete(&mut self, id: GateId) -> PsfpResult<()> {
        let hal = Arc::clone(&self.hal);

        let Some(entry) = self.gates.get(&id) else {
            return Err(no_such_gate(id));
        };
        let timer = entry.timer;

        info!("gate {}: deleting", id);

        // Timer first, map entry second: a fired timer must never observe
        // a half-deleted gate.
        self.timers.stop(timer);
        self.timers.free(timer);
        self.gates.remove(&id);

        // Filters referencing this gate must learn it is gone before its
        // hardware configuration is cleared.
        self.filters_refresh_for_gate(id, true);

        // Attempt both hardware writes even if the first fails.
        if let Err(e) = hal.gate_gcl_set(id, &[]) {
            error!("gate_gcl_set({}) failed while deleting: {}", id, e);
        }
        if let Err(e) = hal.gate_conf_set(id, &Default::default()) {
            error!("gate_conf_set({}) failed while deleting: {}", id, e);
        }

        Ok(())
    }

    /// The one transition function of the gate state machine. Pushes the
    /// schedule-independent fields on every run; pushes the full pending
    /// configuration (GCL, cycle times, base time) when a config change is
    /// requested or the staging timer fired, provided the gate is enabled
    /// and the PTP clock is ready.
    pub(crate) fn gate_apply(&mut self, id: GateId, trigger: GateApplyTrigger) -> PsfpResult<()> {
        let hal = Arc::clone(&self.hal);
        let clock_ready = self.clock_ready;
        let horizon = self.caps.base_time_horizon_secs;
        let opts = self.opts;
        let timer_fired = trigger == GateApplyTrigger::TimerFired;

        let Some(gate) = self.gates.get_mut(&id) else {
            return Err(no_such_gate(id));
        };

        let mut m_conf = hal
            .gate_conf_get(id)
            .map_err(|e| driver_failure("gate_conf_get", e))?;
        let was_enabled = m_conf.enabled;

        m_conf.enabled = gate.conf.gate_enabled;
        m_conf.gate_open = gate.conf.gate_state == GateState::Open;
        m_conf.prio = gate.conf.ipv;

        if !gate.conf.gate_enabled {
            // Disabling clears config-pending in hardware; mirror that and
            // drop any staged change, including a latched change request.
            self.timers.stop(gate.timer);
            gate.oper_conf = None;
            gate.staging = Staging::Disabled;
            gate.conf.config_change = false;
        } else if gate.staging == Staging::Disabled {
            gate.staging = Staging::Idle;
        }

        // The schedule can only be trusted against current time once the
        // PTP clock is ready; until then the change request stays latched
        // and only the limited configuration goes out.
        if gate.conf.gate_enabled && clock_ready && (gate.conf.config_change || timer_fired) {
            if gate.conf.config_change && timer_fired {
                error!(
                    "gate {}: config-change request and staging timer fire coincide",
                    id
                );
            }

            let pend: GateConfig = if gate.conf.config_change {
                gate.conf
            } else {
                match gate.staging.pending() {
                    Some(pend) => *pend,
                    None => {
                        error!("gate {}: staging timer fired with nothing pending", id);
                        return Ok(());
                    }
                }
            };

            let m_status = hal
                .gate_status(id)
                .map_err(|e| driver_failure("gate_status", e))?;
            let current = m_status.current_time;

            if needs_timer_staging(&pend.base_time, &current, horizon) {
                // horizon is always present here, else staging would not
                // have been requested.
                let timeout_secs = horizon.unwrap_or(0).saturating_sub(opts.staging_margin_secs);
                debug!(
                    "gate {}: base time {} beyond horizon at current time {}; staging for {} s",
                    id, pend.base_time, current, timeout_secs
                );
                if self
                    .timers
                    .start(gate.timer, Duration::from_secs(timeout_secs), false)
                {
                    self.wake_worker = true;
                }
                gate.staging = Staging::PendingTimer(pend);
            } else {
                self.timers.stop(gate.timer);
                gate.staging = Staging::PendingHardware(pend);
            }
            let timer_staged = matches!(gate.staging, Staging::PendingTimer(_));

            // Stage the control list; it takes effect together with the
            // config-change write below.
            let gcl: Vec<HalGce> = pend
                .gcl
                .iter()
                .take(pend.gcl_length as usize)
                .map(|gce| HalGce {
                    gate_open: gce.gate_state == GateState::Open,
                    prio: gce.ipv,
                    time_interval_ns: gce.time_interval_ns,
                    octet_max: gce.interval_octet_max,
                })
                .collect();
            hal.gate_gcl_set(id, &gcl)
                .map_err(|e| driver_failure("gate_gcl_set", e))?;

            // The closed-reason latches keep their hardware value while the
            // detection stays enabled; only the control operation clears
            // them.
            m_conf.close_invalid_rx = OptBool {
                enabled: pend.close_due_to_invalid_rx_enable,
                value: pend.close_due_to_invalid_rx_enable && m_status.close_invalid_rx,
            };
            m_conf.close_octets_exceeded = OptBool {
                enabled: pend.close_due_to_octets_exceeded_enable,
                value: pend.close_due_to_octets_exceeded_enable && m_status.close_octets_exceeded,
            };
            m_conf.schedule.cycle_time_ns = pend.cycle_time_ns;
            m_conf.schedule.cycle_time_ext_ns = pend.cycle_time_extension_ns;
            m_conf.schedule.base_time =
                hardware_base_time(&pend, &current, timer_staged, horizon, &opts);
            m_conf.config_change = true;

            debug!(
                "gate {}: applying full configuration (trigger {:?}, hw base time {})",
                id, trigger, m_conf.schedule.base_time
            );
            hal.gate_conf_set(id, &m_conf)
                .map_err(|e| driver_failure("gate_conf_set", e))?;

            // 802.1Q 8.6.9.3.1 c): a change requested against a running
            // schedule with a base time in the past counts as an error.
            if was_enabled && m_conf.enabled && pend.base_time < current {
                gate.config_change_errors += 1;
            }

            gate.conf.config_change = false;
        } else {
            debug!("gate {}: applying limited configuration", id);
            m_conf.config_change = false;
            hal.gate_conf_set(id, &m_conf)
                .map_err(|e| driver_failure("gate_conf_set", e))?;
        }

        Ok(())
    }

    pub(crate) fn gate_status(&mut self, id: GateId) -> PsfpResult<GateStatus> {
        let hal = Arc::clone(&self.hal);

        let Some(gate) = self.gates.get_mut(&id) else {
            return Err(no_such_gate(id));
        };

        let m_status = hal
            .gate_status(id)
            .map_err(|e| driver_failure("gate_status", e))?;

        let mut config_change_time = m_status.config_change_time;
        let mut adopt: Option<GateConfig> = None;
        match &gate.staging {
            Staging::PendingTimer(pend) => {
                // The hardware holds a placeholder base time; report the
                // real one.
                config_change_time = pend.base_time;
            }
            Staging::PendingHardware(pend) => {
                if !m_status.config_pending {
                    adopt = Some(*pend);
                }
            }
            Staging::Idle | Staging::Disabled => {
                if m_status.config_pending {
                    error!(
                        "gate {}: hardware reports a pending config change, software does not",
                        id
                    );
                }
            }
        }

        if let Some(pend) = adopt {
            debug!("gate {}: pending configuration adopted", id);
            gate.oper_conf = Some(pend);
            gate.staging = Staging::Idle;
        }

        Ok(GateStatus {
            oper_conf: gate.oper_conf,
            config_pending: gate.staging.pending().is_some(),
            pend_conf: gate.staging.pending().copied(),
            oper_gate_state: if m_status.gate_open {
                GateState::Open
            } else {
                GateState::Closed
            },
            oper_ipv: m_status.prio,
            config_change_time,
            current_time: m_status.current_time,
            tick_granularity: 1,
            config_change_errors: gate.config_change_errors,
            closed_due_to_invalid_rx: m_status.close_invalid_rx,
            closed_due_to_octets_exceeded: m_status.close_octets_exceeded,
        })
    }

    pub(crate) fn gate_control(&mut self, id: GateId, ctrl: &GateControl) -> PsfpResult<()> {
        if !self.gates.contains_key(&id) {
            return Err(no_such_gate(id));
        }

        if !ctrl.clear_closed_due_to_invalid_rx && !ctrl.clear_closed_due_to_octets_exceeded {
            return Ok(());
        }

        debug!("gate {}: control {:?}", id, ctrl);

        let mut m_conf = self
            .hal
            .gate_conf_get(id)
            .map_err(|e| driver_failure("gate_conf_get", e))?;

        if ctrl.clear_closed_due_to_invalid_rx {
            m_conf.close_invalid_rx.value = false;
        }
        if ctrl.clear_closed_due_to_octets_exceeded {
            m_conf.close_octets_exceeded.value = false;
        }

        self.hal
            .gate_conf_set(id, &m_conf)
            .map_err(|e| driver_failure("gate_conf_set", e))
    }

    /// Timer dispatch target: re-runs the staging decision for the owning
    /// gate against current hardware time.
    pub(crate) fn gate_timer_fired(&mut self, timer: tsn_timer::TimerId) {
        let id = GateId::new(self.timers.tag(timer));
        debug!("gate {}: base-time staging timer fired", id);

        if !self.gates.contains_key(&id) {
            error!("gate {}: staging timer fired for unknown gate", id);
            return;
        }

        if let Err(e) = self.gate_apply(id, GateApplyTrigger::TimerFired) {
            error!("gate {}: staged base-time update failed: {}", id, e);
        }
    }

    /// Marks the PTP clock ready and re-applies every gate, releasing
    /// change requests that were latched while time was untrustworthy.
    pub(crate) fn clock_ready_update(&mut self) {
        if self.clock_ready {
            return;
        }
        self.clock_ready = true;
        info!("PTP clock ready; re-applying stream gate configurations");

        let ids: Vec<GateId> = self.gates.keys().copied().collect();
        for id in ids {
            if let Err(e) = self.gate_apply(id, GateApplyTrigger::ClockReady) {
                error!("gate {}: apply after clock-ready failed: {}", id, e);
            }
        }
    }
}
