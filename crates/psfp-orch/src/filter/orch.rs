//! Stream filter operations.

use crate::error::{BindingKind, EntityKind, PsfpError, PsfpResult, ValidationError, driver_failure};
use crate::filter::types::{AttachState, FilterEntry};
use crate::filter::{FilterConfig, FilterControl, FilterStatistics, FilterStatus, FilterWarnings};
use crate::orch::PsfpInner;
use crate::stream::{StreamAction, StreamBinding, StreamClient, StreamEvent};
use log::{debug, error, info};
use std::sync::Arc;
use tsn_hal::{HalFilterConfig, OptBool};
use tsn_types::{FilterId, GateId};

fn no_such_filter(id: FilterId) -> PsfpError {
    PsfpError::NoSuchInstance {
        kind: EntityKind::Filter,
        id: id.as_u32(),
    }
}

impl PsfpInner {
    pub(crate) fn filter_get(&self, id: FilterId) -> PsfpResult<FilterConfig> {
        self.filters
            .get(&id)
            .map(|entry| entry.conf)
            .ok_or_else(|| no_such_filter(id))
    }

    pub(crate) fn filter_set(&mut self, id: FilterId, conf: &FilterConfig) -> PsfpResult<()> {
        if conf.stream_id.is_some() && conf.stream_collection_id.is_some() {
            return Err(ValidationError::BothStreamAndCollection.into());
        }

        // Range checks only; the referenced instances need not exist.
        if let Some(stream_id) = conf.stream_id {
            let raw = stream_id.as_u32();
            if raw < 1 || raw > self.caps.stream_id_max {
                return Err(PsfpError::OutOfRange {
                    kind: EntityKind::Stream,
                    id: raw,
                    max: self.caps.stream_id_max,
                });
            }
        }
        if let Some(collection_id) = conf.stream_collection_id {
            let raw = collection_id.as_u32();
            if raw < 1 || raw > self.caps.stream_collection_id_max {
                return Err(PsfpError::OutOfRange {
                    kind: EntityKind::StreamCollection,
                    id: raw,
                    max: self.caps.stream_collection_id_max,
                });
            }
        }
        if let Some(meter_id) = conf.flow_meter_id {
            if meter_id.as_u32() >= self.caps.max_flow_meters {
                return Err(PsfpError::OutOfRange {
                    kind: EntityKind::FlowMeter,
                    id: meter_id.as_u32(),
                    max: self.caps.max_flow_meters.saturating_sub(1),
                });
            }
        }
        if let Some(gate_id) = conf.gate_id {
            if gate_id.as_u32() >= self.caps.max_gates {
                return Err(PsfpError::OutOfRange {
                    kind: EntityKind::Gate,
                    id: gate_id.as_u32(),
                    max: self.caps.max_gates.saturating_sub(1),
                });
            }
        }

        let new_entry = match self.filters.get(&id) {
            Some(entry) if entry.conf == *conf => {
                debug!("filter {}: no changes", id);
                return Ok(());
            }
            Some(_) => false,
            None => true,
        };

        // Exclusivity: no two filters may own the same stream or the same
        // collection.
        for (other_id, other) in &self.filters {
            if *other_id == id {
                continue;
            }
            if conf.stream_id.is_some() && conf.stream_id == other.conf.stream_id {
                return Err(PsfpError::Conflict(BindingKind::Stream));
            }
            if conf.stream_collection_id.is_some()
                && conf.stream_collection_id == other.conf.stream_collection_id
            {
                return Err(PsfpError::Conflict(BindingKind::StreamCollection));
            }
        }

        if new_entry {
            self.filters.insert(id, FilterEntry::default());
        } else {
            let binding_changed = self.filters.get(&id).is_some_and(|entry| {
                entry.conf.stream_id != conf.stream_id
                    || entry.conf.stream_collection_id != conf.stream_collection_id
            });
            if binding_changed {
                // Release the old binding before claiming the new one.
                self.filter_detach(id);
            }
        }

        if let Some(entry) = self.filters.get_mut(&id) {
            entry.conf = *conf;
        }

        // Attach even when the binding is unchanged: the action parameters
        // (meter linkage in particular) may have changed.
        self.filter_attach(id);
        self.filter_update_meter_gate_warnings(id);

        self.filter_push_hw_conf(id)
    }

    pub(crate) fn filter_delete(&mut self, id: FilterId) -> PsfpResult<()> {
        if !self.filters.contains_key(&id) {
            return Err(no_such_filter(id));
        }

        info!("filter {}: deleting", id);

        self.filter_detach(id);

        if let Err(e) = self.hal.filter_conf_set(id, &HalFilterConfig::default()) {
            error!("filter_conf_set({}) failed while deleting: {}", id, e);
        }

        self.filters.remove(&id);
        Ok(())
    }

    pub(crate) fn filter_status(&self, id: FilterId) -> PsfpResult<FilterStatus> {
        let entry = self.filters.get(&id).ok_or_else(|| no_such_filter(id))?;

        let m_status = self
            .hal
            .filter_status(id)
            .map_err(|e| driver_failure("filter_status", e))?;

        Ok(FilterStatus {
            oper_warnings: entry.warnings,
            blocked_due_to_oversize_frame: m_status.block_oversize,
        })
    }

    pub(crate) fn filter_control(&mut self, id: FilterId, ctrl: &FilterControl) -> PsfpResult<()> {
        if !ctrl.clear_blocked_due_to_oversize_frame {
            return Ok(());
        }

        debug!("filter {}: clearing oversize block", id);

        let mut m_conf = self
            .hal
            .filter_conf_get(id)
            .map_err(|e| driver_failure("filter_conf_get", e))?;
        m_conf.block_oversize.value = false;
        self.hal
            .filter_conf_set(id, &m_conf)
            .map_err(|e| driver_failure("filter_conf_set", e))
    }

    pub(crate) fn filter_statistics(&self, id: FilterId) -> PsfpResult<FilterStatistics> {
        let entry = self.filters.get(&id).ok_or_else(|| no_such_filter(id))?;

        // An unbound filter (or a dangling binding) reads as all-zero, not
        // as an error.
        let counters = entry
            .conf
            .binding()
            .and_then(|binding| self.streams.counters(binding).ok());

        Ok(match counters {
            Some(c) => FilterStatistics {
                matching: c.rx_match,
                passing: c.rx_gate_pass,
                not_passing: c.rx_gate_discard,
                passing_sdu: c.rx_sdu_pass,
                not_passing_sdu: c.rx_sdu_discard,
                red: c.rx_red_frames,
            },
            None => FilterStatistics::default(),
        })
    }

    pub(crate) fn filter_statistics_clear(&self, id: FilterId) -> PsfpResult<()> {
        let entry = self.filters.get(&id).ok_or_else(|| no_such_filter(id))?;

        if let Some(binding) = entry.conf.binding() {
            // Nothing attached is not an error.
            let _ = self.streams.counters_clear(binding);
        }
        Ok(())
    }

    /// Releases the filter's claim on its stream or collection, if it
    /// holds one, and refreshes the stream-group warnings.
    pub(crate) fn filter_detach(&mut self, id: FilterId) {
        let streams = Arc::clone(&self.streams);
        let Some(entry) = self.filters.get_mut(&id) else {
            return;
        };

        if entry.attach.exists && !entry.attach.attach_failed {
            if let Some(binding) = entry.conf.binding() {
                let release = StreamAction::default();
                if let Err(e) = streams.action_set(binding, StreamClient::Psfp, &release) {
                    debug!("filter {}: detach from {} failed: {}", id, binding, e);
                }
            }
        }

        entry.attach = AttachState::default();
        self.filter_update_stream_warnings(id);
    }

    /// Looks up the filter's stream or collection and (re)installs the
    /// action descriptor on it. Absence is recorded, not reported; a
    /// claim already held by a *different* filter id is a subsystem defect
    /// and only logged.
    pub(crate) fn filter_attach(&mut self, id: FilterId) {
        let streams = Arc::clone(&self.streams);
        let Some(entry) = self.filters.get(&id) else {
            return;
        };
        let conf = entry.conf;

        let mut attach = AttachState::default();

        if let Some(binding) = conf.binding() {
            if let Some(status) = streams.status(binding) {
                attach.exists = true;

                if status.psfp.enabled && status.psfp.client_id != id.as_u32() {
                    // The exclusivity check in filter_set makes this
                    // unreachable; seeing it means a code defect somewhere.
                    error!(
                        "filter {}: {} already claimed on behalf of filter {}",
                        id, binding, status.psfp.client_id
                    );
                } else {
                    let action = self.stream_action_for(id, &conf);
                    match streams.action_set(binding, StreamClient::Psfp, &action) {
                        Ok(()) => debug!("filter {}: attached to {}", id, binding),
                        Err(e) => {
                            info!("filter {}: attaching to {} failed: {}", id, binding, e);
                            attach.attach_failed = true;
                        }
                    }
                }
            }
        }

        if let Some(entry) = self.filters.get_mut(&id) {
            entry.attach = attach;
        }
        self.filter_update_stream_warnings(id);
    }

    /// The action descriptor this filter wants on its stream: admit, tag
    /// with our id, prefer cut-through, meter with the bound policer when
    /// it exists, subject frames to our hardware filter.
    fn stream_action_for(&self, id: FilterId, conf: &FilterConfig) -> StreamAction {
        let policer = conf
            .flow_meter_id
            .and_then(|meter_id| self.meters.get(&meter_id))
            .map(|meter| meter.policer);

        StreamAction {
            enabled: true,
            client_id: id.as_u32(),
            cut_through_override: true,
            cut_through_disable: false,
            policer,
            filter: Some(id),
        }
    }

    /// Recomputes the stream-group warnings (none-specified, not-found,
    /// attach-failed, has-upstream-warnings) from the binding and the
    /// latest attach outcome.
    pub(crate) fn filter_update_stream_warnings(&mut self, id: FilterId) {
        let streams = Arc::clone(&self.streams);
        let Some(entry) = self.filters.get_mut(&id) else {
            return;
        };

        entry.warnings.remove(
            FilterWarnings::NO_STREAM_OR_COLLECTION
                | FilterWarnings::STREAM_NOT_FOUND
                | FilterWarnings::COLLECTION_NOT_FOUND
                | FilterWarnings::STREAM_ATTACH_FAIL
                | FilterWarnings::COLLECTION_ATTACH_FAIL
                | FilterWarnings::STREAM_HAS_WARNINGS
                | FilterWarnings::COLLECTION_HAS_WARNINGS,
        );

        match entry.conf.binding() {
            None => entry.warnings.insert(FilterWarnings::NO_STREAM_OR_COLLECTION),
            Some(binding) => {
                let collection = matches!(binding, StreamBinding::Collection(_));
                if !entry.attach.exists {
                    entry.warnings.insert(if collection {
                        FilterWarnings::COLLECTION_NOT_FOUND
                    } else {
                        FilterWarnings::STREAM_NOT_FOUND
                    });
                } else if entry.attach.attach_failed {
                    entry.warnings.insert(if collection {
                        FilterWarnings::COLLECTION_ATTACH_FAIL
                    } else {
                        FilterWarnings::STREAM_ATTACH_FAIL
                    });
                } else if streams
                    .status(binding)
                    .is_some_and(|status| status.has_oper_warnings)
                {
                    // Upstream warnings propagate into ours.
                    entry.warnings.insert(if collection {
                        FilterWarnings::COLLECTION_HAS_WARNINGS
                    } else {
                        FilterWarnings::STREAM_HAS_WARNINGS
                    });
                }
            }
        }

        debug!("filter {}: warnings = {}", id, entry.warnings);
    }

    /// Recomputes the meter/gate warning group (not-found, not-enabled)
    /// from the current maps.
    pub(crate) fn filter_update_meter_gate_warnings(&mut self, id: FilterId) {
        let Some(entry) = self.filters.get(&id) else {
            return;
        };
        let conf = entry.conf;

        let mut add = FilterWarnings::NONE;
        if let Some(meter_id) = conf.flow_meter_id {
            if !self.meters.contains_key(&meter_id) {
                add |= FilterWarnings::FLOW_METER_NOT_FOUND;
            }
        }
        if let Some(gate_id) = conf.gate_id {
            match self.gates.get(&gate_id) {
                None => add |= FilterWarnings::GATE_NOT_FOUND,
                Some(gate) if !gate.conf.gate_enabled => add |= FilterWarnings::GATE_NOT_ENABLED,
                Some(_) => {}
            }
        }

        if let Some(entry) = self.filters.get_mut(&id) {
            entry.warnings.remove(
                FilterWarnings::FLOW_METER_NOT_FOUND
                    | FilterWarnings::GATE_NOT_FOUND
                    | FilterWarnings::GATE_NOT_ENABLED,
            );
            entry.warnings.insert(add);
            debug!("filter {}: warnings = {}", id, entry.warnings);
        }
    }

    /// Pushes the filter's hardware configuration. The hardware gate link
    /// is only enabled while the referenced gate actually exists.
    pub(crate) fn filter_push_hw_conf(&mut self, id: FilterId) -> PsfpResult<()> {
        let hal = Arc::clone(&self.hal);
        let Some(entry) = self.filters.get(&id) else {
            return Err(no_such_filter(id));
        };
        let conf = entry.conf;

        let hw_gate = conf.gate_id.filter(|gate_id| self.gates.contains_key(gate_id));

        let m_status = hal
            .filter_status(id)
            .map_err(|e| driver_failure("filter_status", e))?;

        // The oversize block latch keeps its hardware value while the
        // feature stays enabled; only the control operation clears it.
        let block_enabled = conf.block_due_to_oversize_frame_enable;
        let m_conf = HalFilterConfig {
            gate_enabled: hw_gate.is_some(),
            gate_id: hw_gate.map(|gate_id| gate_id.as_u32()).unwrap_or(0),
            max_sdu: conf.max_sdu_size,
            block_oversize: OptBool {
                enabled: block_enabled,
                value: block_enabled && m_status.block_oversize,
            },
        };

        hal.filter_conf_set(id, &m_conf)
            .map_err(|e| driver_failure("filter_conf_set", e))
    }

    /// Refreshes every filter referencing the given gate. Hardware configs
    /// are re-pushed only on gate creation/deletion; a plain enable-state
    /// change only moves warnings.
    pub(crate) fn filters_refresh_for_gate(&mut self, gate_id: GateId, update_hw_conf: bool) {
        let dependents: Vec<FilterId> = self
            .filters
            .iter()
            .filter(|(_, f)| f.conf.gate_id == Some(gate_id))
            .map(|(filter_id, _)| *filter_id)
            .collect();

        for filter_id in dependents {
            if update_hw_conf {
                if let Err(e) = self.filter_push_hw_conf(filter_id) {
                    error!(
                        "filter {}: hardware update after gate change failed: {}",
                        filter_id, e
                    );
                }
            }
            self.filter_update_meter_gate_warnings(filter_id);
        }
    }

    /// Reacts to a stream-module change notification: every filter bound
    /// to the stream or collection re-attaches and re-derives its
    /// warnings. Add, modify and delete are treated identically.
    pub(crate) fn handle_stream_event(&mut self, event: StreamEvent) {
        debug!("stream event: {:?} on {}", event.change, event.binding);

        let affected: Vec<FilterId> = self
            .filters
            .iter()
            .filter(|(_, f)| f.conf.binding() == Some(event.binding))
            .map(|(filter_id, _)| *filter_id)
            .collect();

        for filter_id in affected {
            self.filter_attach(filter_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orch::testing::fixture;
    use crate::stream::StreamStatus;
    use pretty_assertions::assert_eq;
    use tsn_types::{StreamCollectionId, StreamId};

    fn stream_filter(stream: u32) -> FilterConfig {
        FilterConfig {
            stream_id: Some(StreamId::new(stream)),
            ..Default::default()
        }
    }

    #[test]
    fn test_reject_both_bindings() {
        let (mut inner, _hal, _streams) = fixture(None);
        let conf = FilterConfig {
            stream_id: Some(StreamId::new(1)),
            stream_collection_id: Some(StreamCollectionId::new(1)),
            ..Default::default()
        };
        assert_eq!(
            inner.filter_set(FilterId::new(0), &conf),
            Err(ValidationError::BothStreamAndCollection.into())
        );
    }

    #[test]
    fn test_reject_out_of_range_references() {
        let (mut inner, _hal, _streams) = fixture(None);

        let conf = FilterConfig {
            stream_id: Some(StreamId::new(0)),
            ..Default::default()
        };
        assert!(matches!(
            inner.filter_set(FilterId::new(0), &conf),
            Err(PsfpError::OutOfRange {
                kind: EntityKind::Stream,
                ..
            })
        ));

        let conf = FilterConfig {
            gate_id: Some(GateId::new(10_000)),
            ..Default::default()
        };
        assert!(matches!(
            inner.filter_set(FilterId::new(0), &conf),
            Err(PsfpError::OutOfRange {
                kind: EntityKind::Gate,
                ..
            })
        ));
    }

    #[test]
    fn test_stream_exclusivity() {
        let (mut inner, _hal, _streams) = fixture(None);

        inner.filter_set(FilterId::new(1), &stream_filter(7)).unwrap();
        assert_eq!(
            inner.filter_set(FilterId::new(2), &stream_filter(7)),
            Err(PsfpError::Conflict(BindingKind::Stream))
        );

        // Deleting the owner frees the binding.
        inner.filter_delete(FilterId::new(1)).unwrap();
        assert!(inner.filter_set(FilterId::new(2), &stream_filter(7)).is_ok());
    }

    #[test]
    fn test_unbound_filter_warns() {
        let (mut inner, _hal, _streams) = fixture(None);
        let id = FilterId::new(0);

        inner.filter_set(id, &FilterConfig::default()).unwrap();
        let status = inner.filter_status(id).unwrap();
        assert!(status
            .oper_warnings
            .contains(FilterWarnings::NO_STREAM_OR_COLLECTION));
    }

    #[test]
    fn test_missing_stream_warns_until_created() {
        let (mut inner, _hal, streams) = fixture(None);
        let id = FilterId::new(0);
        let binding = StreamBinding::Stream(StreamId::new(5));

        inner.filter_set(id, &stream_filter(5)).unwrap();
        assert!(inner
            .filter_status(id)
            .unwrap()
            .oper_warnings
            .contains(FilterWarnings::STREAM_NOT_FOUND));

        // The stream appears; the notification feed re-attaches us.
        streams.add(binding, StreamStatus::default());
        inner.handle_stream_event(StreamEvent {
            binding,
            change: crate::stream::StreamChange::Added,
        });

        let warnings = inner.filter_status(id).unwrap().oper_warnings;
        assert!(!warnings.contains(FilterWarnings::STREAM_NOT_FOUND));
        assert_eq!(streams.last_action(binding).unwrap().client_id, id.as_u32());
    }

    #[test]
    fn test_attach_failure_warns() {
        let (mut inner, _hal, streams) = fixture(None);
        let binding = StreamBinding::Stream(StreamId::new(5));
        streams.add(binding, StreamStatus::default());
        streams.fail_next_action_set();

        inner.filter_set(FilterId::new(0), &stream_filter(5)).unwrap();
        assert!(inner
            .filter_status(FilterId::new(0))
            .unwrap()
            .oper_warnings
            .contains(FilterWarnings::STREAM_ATTACH_FAIL));
    }

    #[test]
    fn test_upstream_warnings_propagate() {
        let (mut inner, _hal, streams) = fixture(None);
        let binding = StreamBinding::Stream(StreamId::new(5));
        streams.add(
            binding,
            StreamStatus {
                has_oper_warnings: true,
                ..Default::default()
            },
        );

        inner.filter_set(FilterId::new(0), &stream_filter(5)).unwrap();
        assert!(inner
            .filter_status(FilterId::new(0))
            .unwrap()
            .oper_warnings
            .contains(FilterWarnings::STREAM_HAS_WARNINGS));
    }

    #[test]
    fn test_meter_and_gate_reference_warnings() {
        let (mut inner, _hal, _streams) = fixture(None);
        let id = FilterId::new(0);

        let conf = FilterConfig {
            stream_id: Some(StreamId::new(5)),
            flow_meter_id: Some(tsn_types::FlowMeterId::new(0)),
            gate_id: Some(GateId::new(0)),
            ..Default::default()
        };
        inner.filter_set(id, &conf).unwrap();

        let warnings = inner.filter_status(id).unwrap().oper_warnings;
        assert!(warnings.contains(FilterWarnings::FLOW_METER_NOT_FOUND));
        assert!(warnings.contains(FilterWarnings::GATE_NOT_FOUND));

        // Creating the meter clears its warning.
        inner
            .flow_meter_set(tsn_types::FlowMeterId::new(0), &Default::default())
            .unwrap();
        let warnings = inner.filter_status(id).unwrap().oper_warnings;
        assert!(!warnings.contains(FilterWarnings::FLOW_METER_NOT_FOUND));
        assert!(warnings.contains(FilterWarnings::GATE_NOT_FOUND));
    }

    #[test]
    fn test_binding_change_detaches_old_stream() {
        let (mut inner, _hal, streams) = fixture(None);
        let id = FilterId::new(0);
        let old = StreamBinding::Stream(StreamId::new(5));
        let new = StreamBinding::Stream(StreamId::new(6));
        streams.add(old, StreamStatus::default());
        streams.add(new, StreamStatus::default());

        inner.filter_set(id, &stream_filter(5)).unwrap();
        assert!(streams.last_action(old).unwrap().enabled);

        inner.filter_set(id, &stream_filter(6)).unwrap();
        assert!(!streams.last_action(old).unwrap().enabled);
        assert!(streams.last_action(new).unwrap().enabled);
    }

    #[test]
    fn test_stream_deletion_brings_warning_back() {
        let (mut inner, _hal, streams) = fixture(None);
        let id = FilterId::new(0);
        let binding = StreamBinding::Stream(StreamId::new(5));
        streams.add(binding, StreamStatus::default());

        inner.filter_set(id, &stream_filter(5)).unwrap();
        assert!(!inner
            .filter_status(id)
            .unwrap()
            .oper_warnings
            .contains(FilterWarnings::STREAM_NOT_FOUND));

        streams.remove(binding);
        inner.handle_stream_event(StreamEvent {
            binding,
            change: crate::stream::StreamChange::Deleted,
        });
        assert!(inner
            .filter_status(id)
            .unwrap()
            .oper_warnings
            .contains(FilterWarnings::STREAM_NOT_FOUND));
    }

    #[test]
    fn test_oversize_block_latch_and_control() {
        let (mut inner, hal, _streams) = fixture(None);
        let id = FilterId::new(0);

        let conf = FilterConfig {
            stream_id: Some(StreamId::new(5)),
            max_sdu_size: 1500,
            block_due_to_oversize_frame_enable: true,
            ..Default::default()
        };
        inner.filter_set(id, &conf).unwrap();

        // Hardware latches an oversized frame.
        hal.set_filter_block_oversize(id, true);
        assert!(inner
            .filter_status(id)
            .unwrap()
            .blocked_due_to_oversize_frame);

        inner
            .filter_control(
                id,
                &FilterControl {
                    clear_blocked_due_to_oversize_frame: true,
                },
            )
            .unwrap();
        assert!(!inner
            .filter_status(id)
            .unwrap()
            .blocked_due_to_oversize_frame);
    }

    #[test]
    fn test_statistics_zero_when_unbound() {
        let (mut inner, _hal, _streams) = fixture(None);
        let id = FilterId::new(0);

        inner.filter_set(id, &stream_filter(5)).unwrap();
        assert_eq!(
            inner.filter_statistics(id).unwrap(),
            FilterStatistics::default()
        );
    }

    #[test]
    fn test_statistics_read_through() {
        let (mut inner, _hal, streams) = fixture(None);
        let id = FilterId::new(0);
        let binding = StreamBinding::Stream(StreamId::new(5));
        streams.add(binding, StreamStatus::default());
        streams.set_counters(
            binding,
            tsn_hal::IngressCounters {
                rx_match: 10,
                rx_gate_pass: 8,
                rx_gate_discard: 2,
                rx_sdu_pass: 9,
                rx_sdu_discard: 1,
                rx_red_frames: 3,
            },
        );

        inner.filter_set(id, &stream_filter(5)).unwrap();
        let stats = inner.filter_statistics(id).unwrap();
        assert_eq!(stats.matching, 10);
        assert_eq!(stats.passing, 8);
        assert_eq!(stats.not_passing, 2);
        assert_eq!(stats.red, 3);
    }

    #[test]
    fn test_delete_detaches_and_clears_hardware() {
        let (mut inner, hal, streams) = fixture(None);
        let id = FilterId::new(0);
        let binding = StreamBinding::Stream(StreamId::new(5));
        streams.add(binding, StreamStatus::default());

        inner.filter_set(id, &stream_filter(5)).unwrap();
        inner.filter_delete(id).unwrap();

        assert!(!streams.last_action(binding).unwrap().enabled);
        assert_eq!(hal.filter_conf(id).unwrap(), HalFilterConfig::default());
        assert!(inner.filter_get(id).is_err());
    }
}
