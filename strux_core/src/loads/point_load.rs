use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta};
use crate::errors::StruxResult;
use crate::geometry::{Point3, Vector3};
use crate::restricted::{AbsMax1e20, ForceLoadType};

/// Concentrated force or moment at a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub(crate) meta: EntityMeta,
    pub load_case: EntityId,
    pub load_type: ForceLoadType,
    pub position: Point3,
    /// Unit direction of the load
    pub direction: Vector3,
    /// Signed magnitude [kN] or [kNm]
    pub magnitude: AbsMax1e20,
    pub comment: String,
}

impl PointLoad {
    /// Load along `force`; its length becomes the magnitude.
    pub fn new(
        load_case: EntityId,
        load_type: ForceLoadType,
        position: Point3,
        force: Vector3,
        comment: impl Into<String>,
    ) -> StruxResult<Self> {
        let magnitude = AbsMax1e20::new(force.length())?;
        let direction = force.normalize()?;
        Ok(PointLoad {
            meta: EntityMeta::created(),
            load_case,
            load_type,
            position,
            direction,
            magnitude,
            comment: comment.into(),
        })
    }

    pub fn force(load_case: EntityId, position: Point3, force: Vector3, comment: impl Into<String>) -> StruxResult<Self> {
        PointLoad::new(load_case, ForceLoadType::Force, position, force, comment)
    }

    pub fn moment(load_case: EntityId, position: Point3, moment: Vector3, comment: impl Into<String>) -> StruxResult<Self> {
        PointLoad::new(load_case, ForceLoadType::Moment, position, moment, comment)
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    /// Load as a vector: direction scaled by magnitude
    pub fn vector(&self) -> Vector3 {
        self.direction * self.magnitude.value()
    }
}
