//! Flow meter operations.

use crate::error::{driver_failure, EntityKind, PsfpError, PsfpResult};
use crate::flow_meter::types::FlowMeterEntry;
use crate::flow_meter::{ColorMode, FlowMeterConfig, FlowMeterControl, FlowMeterStatus};
use crate::orch::PsfpInner;
use log::{debug, info};
use std::sync::Arc;
use tsn_hal::{HalPolicerConfig, OptBool};
use tsn_types::FlowMeterId;

fn no_such_meter(id: FlowMeterId) -> PsfpError {
    PsfpError::NoSuchInstance {
        kind: EntityKind::FlowMeter,
        id: id.as_u32(),
    }
}

/// Maps a meter configuration onto the policer the hardware understands.
/// The mark-all-red latch value is filled in by the caller from current
/// hardware status.
fn policer_conf_from(conf: &FlowMeterConfig) -> HalPolicerConfig {
    HalPolicerConfig {
        enabled: true,
        color_aware: conf.cm == ColorMode::Aware,
        coupling: conf.cf,
        cir_kbps: conf.cir,
        cbs_bytes: conf.cbs,
        eir_kbps: conf.eir,
        ebs_bytes: conf.ebs,
        drop_yellow: conf.drop_on_yellow,
        mark_all_red: OptBool {
            enabled: conf.mark_all_frames_red_enable,
            value: false,
        },
    }
}

impl PsfpInner {
    pub(crate) fn flow_meter_get(&self, id: FlowMeterId) -> PsfpResult<FlowMeterConfig> {
        self.meters
            .get(&id)
            .map(|entry| entry.conf)
            .ok_or_else(|| no_such_meter(id))
    }

    pub(crate) fn flow_meter_set(
        &mut self,
        id: FlowMeterId,
        conf: &FlowMeterConfig,
    ) -> PsfpResult<()> {
        let hal = Arc::clone(&self.hal);

        let (policer, new_entry) = match self.meters.get(&id) {
            Some(entry) if entry.conf == *conf => {
                debug!("flow meter {}: no changes", id);
                return Ok(());
            }
            Some(entry) => (entry.policer, false),
            None => {
                let handle = hal.policer_alloc().map_err(|e| {
                    info!("flow meter {}: policer allocation failed: {}", id, e);
                    PsfpError::OutOfHardwareResource
                })?;
                debug!("flow meter {}: allocated policer {}", id, handle);
                (handle, true)
            }
        };

        if new_entry {
            // The entry exists from here on even if a later hardware call
            // fails, so the allocated policer stays tracked.
            self.meters.insert(
                id,
                FlowMeterEntry {
                    conf: FlowMeterConfig::cleared(),
                    policer,
                },
            );
        }

        // The mark-all-red latch survives reconfiguration while the feature
        // stays enabled; it is only cleared via the control operation.
        let hw_status = hal
            .policer_status(policer)
            .map_err(|e| driver_failure("policer_status", e))?;

        let mut hw_conf = policer_conf_from(conf);
        hw_conf.mark_all_red.value = hw_status.mark_all_red && hw_conf.mark_all_red.enabled;

        hal.policer_conf_set(policer, &hw_conf)
            .map_err(|e| driver_failure("policer_conf_set", e))?;

        // Read back: the hardware snaps rates and bursts to the closest
        // supported values. Everything else keeps the caller's settings.
        let effective = hal
            .policer_conf_get(policer)
            .map_err(|e| driver_failure("policer_conf_get", e))?;

        let stored = FlowMeterConfig {
            cir: effective.cir_kbps,
            cbs: effective.cbs_bytes,
            eir: effective.eir_kbps,
            ebs: effective.ebs_bytes,
            ..*conf
        };
        if let Some(entry) = self.meters.get_mut(&id) {
            entry.conf = stored;
        }

        if new_entry {
            // Filters referencing this meter can pick up the policer now.
            self.filters_refresh_for_meter(id);
        }

        Ok(())
    }

    pub(crate) fn flow_meter_delete(&mut self, id: FlowMeterId) -> PsfpResult<()> {
        let hal = Arc::clone(&self.hal);

        let Some(entry) = self.meters.remove(&id) else {
            return Err(no_such_meter(id));
        };

        info!("flow meter {}: deleting", id);

        // Dependent filters re-attach (dropping their policer reference)
        // while the policer still exists; only then is it freed.
        self.filters_refresh_for_meter(id);

        hal.policer_free(entry.policer)
            .map_err(|e| driver_failure("policer_free", e))
    }

    pub(crate) fn flow_meter_status(&self, id: FlowMeterId) -> PsfpResult<FlowMeterStatus> {
        let entry = self.meters.get(&id).ok_or_else(|| no_such_meter(id))?;

        let hw_status = self
            .hal
            .policer_status(entry.policer)
            .map_err(|e| driver_failure("policer_status", e))?;

        Ok(FlowMeterStatus {
            mark_all_frames_red: hw_status.mark_all_red,
        })
    }

    pub(crate) fn flow_meter_control(
        &mut self,
        id: FlowMeterId,
        ctrl: &FlowMeterControl,
    ) -> PsfpResult<()> {
        let entry = self.meters.get(&id).ok_or_else(|| no_such_meter(id))?;

        if !ctrl.clear_mark_all_frames_red {
            return Ok(());
        }

        debug!("flow meter {}: clearing mark-all-frames-red", id);

        let mut hw_conf = self
            .hal
            .policer_conf_get(entry.policer)
            .map_err(|e| driver_failure("policer_conf_get", e))?;
        hw_conf.mark_all_red.value = false;
        self.hal
            .policer_conf_set(entry.policer, &hw_conf)
            .map_err(|e| driver_failure("policer_conf_set", e))
    }

    /// Re-attaches and refreshes warnings of every filter referencing the
    /// given meter. Invoked when the meter is created or deleted.
    pub(crate) fn filters_refresh_for_meter(&mut self, id: FlowMeterId) {
        let dependents: Vec<_> = self
            .filters
            .iter()
            .filter(|(_, f)| f.conf.flow_meter_id == Some(id))
            .map(|(fid, _)| *fid)
            .collect();

        for filter_id in dependents {
            self.filter_attach(filter_id);
            self.filter_update_meter_gate_warnings(filter_id);
        }
    }
}
