//! Platform capability snapshot.

use crate::stream::StreamCatalog;
use tsn_hal::PsfpHardware;

/// Feature and limit snapshot for the PSFP subsystem.
///
/// Assembled once at startup from the hardware capability query and the
/// stream module's maxima, immutable afterwards. When `psfp_supported` is
/// false, every public operation short-circuits to `NotSupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsfpCapabilities {
    /// Whether PSFP is supported on this platform at all.
    pub psfp_supported: bool,
    /// Stream filter instances are numbered `[0; max_filters[`.
    pub max_filters: u32,
    /// Stream gate instances are numbered `[0; max_gates[`.
    pub max_gates: u32,
    /// Flow meter instances are numbered `[0; max_flow_meters[`. Dynamic
    /// policer-pool pressure may exhaust resources sooner.
    pub max_flow_meters: u32,
    /// Maximum gate control list length.
    pub gcl_length_max: u32,
    /// Streams are numbered `[1; stream_id_max]`.
    pub stream_id_max: u32,
    /// Stream collections are numbered `[1; stream_collection_id_max]`.
    pub stream_collection_id_max: u32,
    /// On affected chip families, the furthest base time (in seconds from
    /// current time) the hardware can be programmed with directly. Gates
    /// whose pending base time lies beyond this are staged with a software
    /// timer. `None` on unaffected families.
    pub base_time_horizon_secs: Option<u64>,
}

impl PsfpCapabilities {
    /// Queries hardware and stream-module limits. Called once.
    pub fn probe(hal: &dyn PsfpHardware, streams: &dyn StreamCatalog) -> Self {
        let hw = hal.capabilities();
        if !hw.psfp_supported {
            return PsfpCapabilities::unsupported();
        }

        let stream_caps = streams.capabilities();

        PsfpCapabilities {
            psfp_supported: true,
            max_filters: hw.max_filters,
            max_gates: hw.max_gates,
            max_flow_meters: hw.max_flow_meters,
            gcl_length_max: hw.gcl_length_max,
            stream_id_max: stream_caps.stream_id_max,
            stream_collection_id_max: stream_caps.stream_collection_id_max,
            base_time_horizon_secs: hw.base_time_horizon_secs,
        }
    }

    /// The all-zero snapshot of an unsupported platform.
    pub fn unsupported() -> Self {
        PsfpCapabilities {
            psfp_supported: false,
            max_filters: 0,
            max_gates: 0,
            max_flow_meters: 0,
            gcl_length_max: 0,
            stream_id_max: 0,
            stream_collection_id_max: 0,
            base_time_horizon_secs: None,
        }
    }
}
