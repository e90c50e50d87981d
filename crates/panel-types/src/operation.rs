use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of an operation in the history.
/// Assigned once at creation and never changed by patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpId(pub Uuid);

impl OpId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OpId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A parametric operation in the panel history.
///
/// Serialized flat, e.g. `{"id": "...", "type": "rectCut", "x": 10, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier.
    pub id: OpId,
    /// What the operation does, with its parameters.
    #[serde(flatten)]
    pub kind: OperationKind,
}

impl Operation {
    /// Wrap a kind with a freshly generated id.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            id: OpId::new(),
            kind,
        }
    }

    pub fn with_id(id: OpId, kind: OperationKind) -> Self {
        Self { id, kind }
    }
}

/// The closed set of operation kinds. Dimensions are in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OperationKind {
    /// Replace the whole shape with a `w × h × t` box at the origin.
    Resize { w: f64, h: f64, t: f64 },
    /// Subtract a `w × h × depth` box whose corner sits at `(x, y, 0)`.
    RectCut {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        /// Cut depth. `None` cuts all the way through.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<f64>,
    },
    /// Subtract a cylinder of radius `r` whose base centre sits at `(cx, cy, 0)`.
    CircleCut {
        cx: f64,
        cy: f64,
        r: f64,
        /// Cut depth. `None` cuts all the way through.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<f64>,
    },
    /// Any operation type this build does not know about.
    /// Kept in the history but skipped when the shape is rebuilt.
    #[serde(other)]
    Unsupported,
}

impl OperationKind {
    /// Human-readable name, used in logs and listings.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Resize { .. } => "Resize",
            OperationKind::RectCut { .. } => "Rect Cut",
            OperationKind::CircleCut { .. } => "Circle Cut",
            OperationKind::Unsupported => "Unsupported",
        }
    }

    /// Whether this operation resets the shape rather than modifying it.
    pub fn is_sizing(&self) -> bool {
        matches!(self, OperationKind::Resize { .. })
    }

    /// Merge the patch fields that belong to this variant. Other fields are ignored.
    pub fn apply_patch(&mut self, patch: &OperationPatch) {
        fn set(slot: &mut f64, value: Option<f64>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        match self {
            OperationKind::Resize { w, h, t } => {
                set(w, patch.w);
                set(h, patch.h);
                set(t, patch.t);
            }
            OperationKind::RectCut { x, y, w, h, depth } => {
                set(x, patch.x);
                set(y, patch.y);
                set(w, patch.w);
                set(h, patch.h);
                if patch.depth.is_some() {
                    *depth = patch.depth;
                }
            }
            OperationKind::CircleCut { cx, cy, r, depth } => {
                set(cx, patch.cx);
                set(cy, patch.cy);
                set(r, patch.r);
                if patch.depth.is_some() {
                    *depth = patch.depth;
                }
            }
            OperationKind::Unsupported => {}
        }
    }
}

/// Partial update for an operation's parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationPatch {
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub t: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
    pub r: Option<f64>,
    pub depth: Option<f64>,
}

/// Outer dimensions of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelSize {
    pub w: f64,
    pub h: f64,
    pub t: f64,
}

impl From<PanelSize> for OperationKind {
    fn from(size: PanelSize) -> Self {
        OperationKind::Resize {
            w: size.w,
            h: size.h,
            t: size.t,
        }
    }
}
