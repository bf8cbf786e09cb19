//! End-to-end tests driving the orchestrator through mock hardware and a
//! mock stream module.

mod common;

use common::{FakeStreams, FakeSwitch};
use psfp_orch::{
    FilterConfig, FilterWarnings, FlowMeterConfig, GateConfig, GateControlEntry, GateState,
    PsfpError, PsfpOrch, StreamBinding, ValidationError,
};
use std::sync::Arc;
use tsn_types::{FilterId, FlowMeterId, GateId, StreamId, Timestamp};

fn setup(horizon: Option<u64>) -> (PsfpOrch, Arc<FakeSwitch>, Arc<FakeStreams>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let hal = Arc::new(FakeSwitch::new(horizon));
    let streams = Arc::new(FakeStreams::default());
    let orch = PsfpOrch::new(hal.clone(), streams.clone());
    orch.clock_ready();
    (orch, hal, streams)
}

fn one_entry_gate(base_time: Timestamp) -> GateConfig {
    let mut conf = GateConfig {
        gate_enabled: true,
        config_change: true,
        cycle_time_ns: 1_000_000,
        base_time,
        gcl_length: 1,
        ..Default::default()
    };
    conf.gcl[0] = GateControlEntry {
        gate_state: GateState::Open,
        ipv: Some(3),
        time_interval_ns: 250_000,
        interval_octet_max: 0,
    };
    conf
}

#[test]
fn scenario_a_meter_gate_filter_lifecycle() {
    let (orch, hal, _streams) = setup(None);
    hal.set_now(Timestamp::new(1000, 0));

    // Meter 0: defaults with cir 10000 / cbs 2048.
    let meter_conf = FlowMeterConfig {
        cir: 10000,
        cbs: 2048,
        ..orch.flow_meter_default_conf().unwrap()
    };
    orch.flow_meter_set(FlowMeterId::new(0), &meter_conf).unwrap();
    assert_eq!(orch.flow_meter_get(FlowMeterId::new(0)).unwrap().cbs, 2048);

    // Gate 0 created disabled: no operational config yet.
    orch.gate_set(GateId::new(0), &GateConfig::default()).unwrap();
    assert_eq!(orch.gate_status(GateId::new(0)).unwrap().oper_conf, None);

    // Filter 0 binds stream 5, gate 0, meter 0. The gate exists but is
    // not enabled.
    let filter_conf = FilterConfig {
        stream_id: Some(StreamId::new(5)),
        gate_id: Some(GateId::new(0)),
        flow_meter_id: Some(FlowMeterId::new(0)),
        ..Default::default()
    };
    orch.filter_set(FilterId::new(0), &filter_conf).unwrap();

    let warnings = orch.filter_status(FilterId::new(0)).unwrap().oper_warnings;
    assert!(warnings.contains(FilterWarnings::GATE_NOT_ENABLED));
    assert!(!warnings.contains(FilterWarnings::GATE_NOT_FOUND));
    assert!(!warnings.contains(FilterWarnings::FLOW_METER_NOT_FOUND));

    // Enabling the gate with a valid one-entry GCL clears the warning on
    // the next status read.
    orch.gate_set(GateId::new(0), &one_entry_gate(Timestamp::new(1010, 0)))
        .unwrap();
    let warnings = orch.filter_status(FilterId::new(0)).unwrap().oper_warnings;
    assert!(!warnings.contains(FilterWarnings::GATE_NOT_ENABLED));
}

#[test]
fn scenario_b_stream_exclusivity() {
    let (orch, _hal, _streams) = setup(None);

    let conf = FilterConfig {
        stream_id: Some(StreamId::new(7)),
        ..Default::default()
    };

    orch.filter_set(FilterId::new(1), &conf).unwrap();
    assert!(matches!(
        orch.filter_set(FilterId::new(2), &conf),
        Err(PsfpError::Conflict(_))
    ));

    orch.filter_delete(FilterId::new(1)).unwrap();
    assert!(orch.filter_set(FilterId::new(2), &conf).is_ok());
}

#[test]
fn scenario_c_invalid_gcl_length_rejected_atomically() {
    let (orch, _hal, _streams) = setup(None);

    let conf = GateConfig {
        gate_enabled: true,
        gcl_length: 5, // capability max is 4
        ..Default::default()
    };
    assert!(matches!(
        orch.gate_set(GateId::new(3), &conf),
        Err(PsfpError::ValidationFailed(
            ValidationError::InvalidGclLength { .. }
        ))
    ));

    // The gate never came into existence.
    assert_eq!(orch.gate_next(None).unwrap(), None);
}

#[test]
fn idempotent_set_performs_no_hardware_calls() {
    let (orch, hal, streams) = setup(None);
    hal.set_now(Timestamp::new(100, 0));
    streams.add(StreamBinding::Stream(StreamId::new(5)));

    // Meter.
    let meter_conf = orch.flow_meter_default_conf().unwrap();
    orch.flow_meter_set(FlowMeterId::new(0), &meter_conf).unwrap();
    let stored = orch.flow_meter_get(FlowMeterId::new(0)).unwrap();
    let baseline = hal.call_count();
    orch.flow_meter_set(FlowMeterId::new(0), &stored).unwrap();
    assert_eq!(hal.call_count(), baseline);

    // Gate: the stored config has the one-shot change flag cleared, so
    // the identical request carries none either.
    let gate_conf = GateConfig {
        gate_state: GateState::Open,
        ..Default::default()
    };
    orch.gate_set(GateId::new(1), &gate_conf).unwrap();
    let stored = orch.gate_get(GateId::new(1)).unwrap();
    let baseline = hal.call_count();
    orch.gate_set(GateId::new(1), &stored).unwrap();
    assert_eq!(hal.call_count(), baseline);

    // Filter.
    let filter_conf = FilterConfig {
        stream_id: Some(StreamId::new(5)),
        ..Default::default()
    };
    orch.filter_set(FilterId::new(0), &filter_conf).unwrap();
    let stored = orch.filter_get(FilterId::new(0)).unwrap();
    let baseline = hal.call_count();
    orch.filter_set(FilterId::new(0), &stored).unwrap();
    assert_eq!(hal.call_count(), baseline);
}

#[test]
fn meter_roundtrip_preserves_flags() {
    let (orch, _hal, _streams) = setup(None);
    let id = FlowMeterId::new(3);

    let conf = FlowMeterConfig {
        cir: 48_128,
        cbs: 4096,
        eir: 1000,
        ebs: 512,
        cf: true,
        drop_on_yellow: true,
        mark_all_frames_red_enable: true,
        ..Default::default()
    };
    orch.flow_meter_set(id, &conf).unwrap();

    let stored = orch.flow_meter_get(id).unwrap();
    assert_eq!(stored.cf, conf.cf);
    assert_eq!(stored.cm, conf.cm);
    assert_eq!(stored.drop_on_yellow, conf.drop_on_yellow);
    assert_eq!(
        stored.mark_all_frames_red_enable,
        conf.mark_all_frames_red_enable
    );

    // Re-setting what get returned is a no-op.
    orch.flow_meter_set(id, &stored).unwrap();
    assert_eq!(orch.flow_meter_get(id).unwrap(), stored);
}

#[test]
fn gate_pending_config_adopted_on_status_read() {
    let (orch, hal, _streams) = setup(None);
    let id = GateId::new(0);
    hal.set_now(Timestamp::new(500, 0));

    orch.gate_set(id, &one_entry_gate(Timestamp::new(600, 0))).unwrap();

    let status = orch.gate_status(id).unwrap();
    assert!(status.config_pending);
    assert!(status.oper_conf.is_none());
    assert_eq!(
        status.pend_conf.unwrap().base_time,
        Timestamp::new(600, 0)
    );

    hal.set_gate_config_pending(id, false);
    let status = orch.gate_status(id).unwrap();
    assert!(!status.config_pending);
    assert_eq!(
        status.oper_conf.unwrap().base_time,
        Timestamp::new(600, 0)
    );
}

#[test]
fn base_time_staging_beyond_horizon() {
    let (orch, hal, _streams) = setup(Some(100));
    let id = GateId::new(0);
    let now = Timestamp::new(10_000, 0);
    hal.set_now(now);

    // Base time 900 s out, horizon 100 s: must be staged.
    orch.gate_set(id, &one_entry_gate(Timestamp::new(10_900, 0)))
        .unwrap();

    assert!(orch.gate_staging_timer_active(id).unwrap());
    let pushed = hal.gate_conf(id).unwrap();
    assert_eq!(pushed.schedule.base_time, Timestamp::new(10_100, 0));

    // Status reports the real base time while staged.
    let status = orch.gate_status(id).unwrap();
    assert!(status.config_pending);
    assert_eq!(status.config_change_time, Timestamp::new(10_900, 0));

    // A request within the horizon goes out directly and stops staging.
    orch.gate_set(id, &one_entry_gate(Timestamp::new(10_050, 0)))
        .unwrap();
    assert!(!orch.gate_staging_timer_active(id).unwrap());
    let pushed = hal.gate_conf(id).unwrap();
    assert_eq!(pushed.schedule.base_time, Timestamp::new(10_050, 0));
}

#[test]
fn meter_deletion_propagates_into_filter_warnings() {
    let (orch, _hal, streams) = setup(None);
    let binding = StreamBinding::Stream(StreamId::new(5));
    streams.add(binding);

    orch.flow_meter_set(FlowMeterId::new(0), &Default::default())
        .unwrap();
    let filter_conf = FilterConfig {
        stream_id: Some(StreamId::new(5)),
        flow_meter_id: Some(FlowMeterId::new(0)),
        ..Default::default()
    };
    orch.filter_set(FilterId::new(0), &filter_conf).unwrap();

    let warnings = orch.filter_status(FilterId::new(0)).unwrap().oper_warnings;
    assert!(!warnings.contains(FilterWarnings::FLOW_METER_NOT_FOUND));
    assert!(streams.last_action(binding).unwrap().policer.is_some());

    orch.flow_meter_delete(FlowMeterId::new(0)).unwrap();

    let warnings = orch.filter_status(FilterId::new(0)).unwrap().oper_warnings;
    assert!(warnings.contains(FilterWarnings::FLOW_METER_NOT_FOUND));
    // The re-pushed stream action no longer references the policer.
    assert!(streams.last_action(binding).unwrap().policer.is_none());

    orch.filter_delete(FilterId::new(0)).unwrap();
    assert_eq!(orch.filter_next(None).unwrap(), None);
}

#[test]
fn statistics_read_through_and_clear() {
    let (orch, _hal, streams) = setup(None);
    let binding = StreamBinding::Stream(StreamId::new(9));
    streams.add(binding);
    streams.set_counters(
        binding,
        tsn_hal::IngressCounters {
            rx_match: 100,
            rx_gate_pass: 90,
            rx_gate_discard: 10,
            rx_sdu_pass: 95,
            rx_sdu_discard: 5,
            rx_red_frames: 7,
        },
    );

    let conf = FilterConfig {
        stream_id: Some(StreamId::new(9)),
        ..Default::default()
    };
    orch.filter_set(FilterId::new(4), &conf).unwrap();

    let stats = orch.filter_statistics(FilterId::new(4)).unwrap();
    assert_eq!(stats.matching, 100);
    assert_eq!(stats.not_passing, 10);
    assert_eq!(stats.red, 7);

    orch.filter_statistics_clear(FilterId::new(4)).unwrap();
    let stats = orch.filter_statistics(FilterId::new(4)).unwrap();
    assert_eq!(stats.matching, 0);
}

#[test]
fn reset_to_defaults_in_dependency_order() {
    let (orch, _hal, streams) = setup(None);
    streams.add(StreamBinding::Stream(StreamId::new(5)));

    orch.flow_meter_set(FlowMeterId::new(0), &Default::default())
        .unwrap();
    orch.gate_set(GateId::new(0), &Default::default()).unwrap();
    let filter_conf = FilterConfig {
        stream_id: Some(StreamId::new(5)),
        flow_meter_id: Some(FlowMeterId::new(0)),
        gate_id: Some(GateId::new(0)),
        ..Default::default()
    };
    orch.filter_set(FilterId::new(0), &filter_conf).unwrap();

    orch.reset_to_defaults();

    assert_eq!(orch.filter_next(None).unwrap(), None);
    assert_eq!(orch.gate_next(None).unwrap(), None);
    assert_eq!(orch.flow_meter_next(None).unwrap(), None);

    // The stream claim was released on the way out.
    assert!(!streams
        .last_action(StreamBinding::Stream(StreamId::new(5)))
        .unwrap()
        .enabled);
}
