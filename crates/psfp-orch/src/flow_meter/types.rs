//! Flow meter types.

use tsn_hal::PolicerHandle;

/// Flow meter color mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Every frame starts green and is marked by the policer's operation.
    #[default]
    Blind,
    /// Frames start at their classified color (green or yellow).
    Aware,
}

impl ColorMode {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Blind => "blind",
            ColorMode::Aware => "aware",
        }
    }
}

/// Flow meter configuration.
///
/// Rates are adjusted to the closest value supported by hardware; a `get`
/// after a `set` returns the effective values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowMeterConfig {
    /// Committed Information Rate in kbps.
    pub cir: u32,
    /// Committed Burst Size in bytes.
    pub cbs: u32,
    /// Excess Information Rate in kbps.
    pub eir: u32,
    /// Excess Burst Size in bytes.
    pub ebs: u32,
    /// Coupling flag: frames that would overflow the committed bucket are
    /// added to the excess bucket unless it is full.
    pub cf: bool,
    /// Color mode.
    pub cm: ColorMode,
    /// Discard yellow frames instead of setting their DEI bit.
    pub drop_on_yellow: bool,
    /// Once a red frame is seen, discard all subsequent frames until the
    /// latch is cleared via [`FlowMeterControl`].
    pub mark_all_frames_red_enable: bool,
}

impl Default for FlowMeterConfig {
    fn default() -> Self {
        FlowMeterConfig {
            cir: 10000,
            cbs: 2048,
            eir: 0,
            ebs: 0,
            cf: false,
            cm: ColorMode::Blind,
            drop_on_yellow: false,
            mark_all_frames_red_enable: false,
        }
    }
}

impl FlowMeterConfig {
    /// The all-zero configuration a half-created entry holds until its
    /// first successful hardware push.
    pub(crate) fn cleared() -> Self {
        FlowMeterConfig {
            cir: 0,
            cbs: 0,
            eir: 0,
            ebs: 0,
            cf: false,
            cm: ColorMode::Blind,
            drop_on_yellow: false,
            mark_all_frames_red_enable: false,
        }
    }
}

/// Flow meter status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowMeterStatus {
    /// All frames are currently being marked red, and therefore discarded.
    pub mark_all_frames_red: bool,
}

/// Flow meter control operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowMeterControl {
    /// Clears the mark-all-frames-red latch.
    pub clear_mark_all_frames_red: bool,
}

/// Per-instance state.
#[derive(Debug, Clone)]
pub(crate) struct FlowMeterEntry {
    pub conf: FlowMeterConfig,
    /// The hardware policer backing this meter, allocated on creation and
    /// freed on deletion after dependent filters have been notified.
    pub policer: PolicerHandle,
}
