//! Stream filter types.

use crate::filter::FilterWarnings;
use crate::stream::StreamBinding;
use tsn_types::{FlowMeterId, GateId, StreamCollectionId, StreamId};

/// Stream filter configuration.
///
/// At most one of `stream_id` and `stream_collection_id` may be set. A
/// filter bound to neither matches nothing (and carries a warning saying
/// so). The meter and gate references are soft: they may name instances
/// that do not exist yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// The stream this filter works on.
    pub stream_id: Option<StreamId>,
    /// The stream collection this filter works on.
    pub stream_collection_id: Option<StreamCollectionId>,
    /// Flow meter applied to the matched traffic.
    pub flow_meter_id: Option<FlowMeterId>,
    /// Stream gate admitting the matched traffic.
    pub gate_id: Option<GateId>,
    /// Frames with an SDU larger than this are discarded; 0 disables the
    /// check.
    pub max_sdu_size: u32,
    /// Once an oversized frame has been discarded, discard all subsequent
    /// frames too, until the block is cleared via [`FilterControl`].
    pub block_due_to_oversize_frame_enable: bool,
}

impl FilterConfig {
    /// The stream-side binding, if any.
    pub fn binding(&self) -> Option<StreamBinding> {
        if let Some(id) = self.stream_collection_id {
            Some(StreamBinding::Collection(id))
        } else {
            self.stream_id.map(StreamBinding::Stream)
        }
    }
}

/// Stream filter status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStatus {
    /// Configurational warnings of this instance.
    pub oper_warnings: FilterWarnings,
    /// An oversized frame has been received with blocking enabled; the
    /// stream stays blocked until cleared via [`FilterControl`].
    pub blocked_due_to_oversize_frame: bool,
}

/// Stream filter control operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterControl {
    /// Clears the blocked-due-to-oversize-frame latch.
    pub clear_blocked_due_to_oversize_frame: bool,
}

/// Stream filter statistics, read through from the hardware counters of
/// the bound stream or collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStatistics {
    /// Frames matching this filter.
    pub matching: u64,
    /// Frames passing the associated gate.
    pub passing: u64,
    /// Frames discarded by the associated gate.
    pub not_passing: u64,
    /// Frames passing the SDU size check.
    pub passing_sdu: u64,
    /// Frames discarded by the SDU size check.
    pub not_passing_sdu: u64,
    /// Frames discarded red by the associated flow meter.
    pub red: u64,
}

/// Outcome of the latest attach attempt towards the stream module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AttachState {
    /// The bound stream or collection exists.
    pub exists: bool,
    /// It exists, but installing our action on it failed.
    pub attach_failed: bool,
}

/// Per-instance state.
#[derive(Debug, Default)]
pub(crate) struct FilterEntry {
    pub conf: FilterConfig,
    pub warnings: FilterWarnings,
    pub attach: AttachState,
}
