//! GN to GYP type mapping.

use crate::gyp::GypKind;
use crate::model::TargetKind;

/// How a GN kind is expressed in GYP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindMapping {
    /// A native GYP type.
    Native(GypKind),
    /// A `none` target carrying one synthesised script action.
    ScriptAction,
    /// A `none` target carrying one synthesised copy action.
    CopyAction,
    /// No GYP equivalent.
    Unsupported,
}

/// The fixed GN → GYP type table.
///
/// Source sets have no GYP counterpart and become static libraries; groups
/// become `none` targets whose dependencies carry the weight.
pub(crate) const fn map_kind(kind: &TargetKind) -> KindMapping {
    match kind {
        TargetKind::Executable => KindMapping::Native(GypKind::Executable),
        TargetKind::StaticLibrary | TargetKind::SourceSet => {
            KindMapping::Native(GypKind::StaticLibrary)
        }
        TargetKind::SharedLibrary => KindMapping::Native(GypKind::SharedLibrary),
        TargetKind::LoadableModule => KindMapping::Native(GypKind::LoadableModule),
        TargetKind::Group => KindMapping::Native(GypKind::None),
        TargetKind::Action => KindMapping::ScriptAction,
        TargetKind::Copy => KindMapping::CopyAction,
        TargetKind::ActionForeach | TargetKind::Unsupported(_) => KindMapping::Unsupported,
    }
}

impl KindMapping {
    /// GYP type of the emitted target.
    pub(crate) const fn gyp_kind(self) -> Option<GypKind> {
        match self {
            Self::Native(kind) => Some(kind),
            Self::ScriptAction | Self::CopyAction => Some(GypKind::None),
            Self::Unsupported => None,
        }
    }
}
