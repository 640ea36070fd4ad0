//! Lifecycle phases and flow control.

use bitflags::bitflags;
use std::fmt;

/// Result of running one lifecycle phase, indicating whether the dispatcher
/// continues with the next phase or stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next phase.
    Next,
    /// Stop the pipeline; later phases are skipped.
    Stop,
}

impl Flow {
    /// Whether the pipeline should stop.
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

/// One step of the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Registering the component as the request's root.
    RootRegistration,
    /// The verb's load-data block.
    LoadData,
    /// The component-wide hook after load-data.
    AfterLoadData,
    /// The verb's assign-attributes block.
    AssignAttributes,
    /// The component-wide hook after assign-attributes.
    AfterAssignAttributes,
    /// The mandatory authorize block.
    Authorize,
    /// The verb's store-data block.
    StoreData,
    /// The respond block selected by format.
    Respond,
    /// The before-render hook of render finalization.
    BeforeRender,
    /// Content rendering during finalization.
    Render,
}

impl Phase {
    /// The top-level pipeline, in dispatch order. The after-hooks and the
    /// render phases run nested inside these.
    pub const PIPELINE: [Phase; 6] = [
        Phase::RootRegistration,
        Phase::LoadData,
        Phase::AssignAttributes,
        Phase::Authorize,
        Phase::StoreData,
        Phase::Respond,
    ];

    /// The snake_case phase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::RootRegistration => "root_registration",
            Phase::LoadData => "load_data",
            Phase::AfterLoadData => "after_load_data",
            Phase::AssignAttributes => "assign_attributes",
            Phase::AfterAssignAttributes => "after_assign_attributes",
            Phase::Authorize => "authorize",
            Phase::StoreData => "store_data",
            Phase::Respond => "respond",
            Phase::BeforeRender => "before_render",
            Phase::Render => "render",
        }
    }

    /// The flag for this phase within [`Phases`].
    pub const fn flag(self) -> Phases {
        match self {
            Phase::RootRegistration => Phases::ROOT_REGISTRATION,
            Phase::LoadData => Phases::LOAD_DATA,
            Phase::AfterLoadData => Phases::AFTER_LOAD_DATA,
            Phase::AssignAttributes => Phases::ASSIGN_ATTRIBUTES,
            Phase::AfterAssignAttributes => Phases::AFTER_ASSIGN_ATTRIBUTES,
            Phase::Authorize => Phases::AUTHORIZE,
            Phase::StoreData => Phases::STORE_DATA,
            Phase::Respond => Phases::RESPOND,
            Phase::BeforeRender => Phases::BEFORE_RENDER,
            Phase::Render => Phases::RENDER,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of phases, used to report which phases ran during a dispatch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Phases: u16 {
        /// See [`Phase::RootRegistration`].
        const ROOT_REGISTRATION = 1 << 0;
        /// See [`Phase::LoadData`].
        const LOAD_DATA = 1 << 1;
        /// See [`Phase::AfterLoadData`].
        const AFTER_LOAD_DATA = 1 << 2;
        /// See [`Phase::AssignAttributes`].
        const ASSIGN_ATTRIBUTES = 1 << 3;
        /// See [`Phase::AfterAssignAttributes`].
        const AFTER_ASSIGN_ATTRIBUTES = 1 << 4;
        /// See [`Phase::Authorize`].
        const AUTHORIZE = 1 << 5;
        /// See [`Phase::StoreData`].
        const STORE_DATA = 1 << 6;
        /// See [`Phase::Respond`].
        const RESPOND = 1 << 7;
        /// See [`Phase::BeforeRender`].
        const BEFORE_RENDER = 1 << 8;
        /// See [`Phase::Render`].
        const RENDER = 1 << 9;
    }
}

impl Phases {
    /// Whether the given phase is in the set.
    pub fn ran(self, phase: Phase) -> bool {
        self.contains(phase.flag())
    }
}

impl From<Phase> for Phases {
    fn from(phase: Phase) -> Self {
        phase.flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        let names: Vec<_> = Phase::PIPELINE.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "root_registration",
                "load_data",
                "assign_attributes",
                "authorize",
                "store_data",
                "respond"
            ]
        );
    }

    #[test]
    fn test_phase_flags_are_distinct() {
        let mut all = Phases::empty();
        for phase in [
            Phase::RootRegistration,
            Phase::LoadData,
            Phase::AfterLoadData,
            Phase::AssignAttributes,
            Phase::AfterAssignAttributes,
            Phase::Authorize,
            Phase::StoreData,
            Phase::Respond,
            Phase::BeforeRender,
            Phase::Render,
        ] {
            assert!(!all.ran(phase));
            all |= phase.flag();
        }
        assert_eq!(all, Phases::all());
    }
}
