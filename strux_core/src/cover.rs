//! # Covers
//!
//! A cover is a load-distributing surface with no stiffness of its own. It
//! passes the loads placed on it to its supporting structures, either in
//! one direction or in both.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta, NamingSequence};
use crate::errors::StruxResult;
use crate::geometry::{Region, Vector3};

/// Prefix of default cover names
pub const COVER_PREFIX: &str = "C0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub region: Region,
    /// Bars and slabs receiving the load, by identity
    pub supporting_structures: Vec<EntityId>,
    /// Unit direction for one-way covers; `None` for two-way
    pub load_bearing_direction: Option<Vector3>,
}

impl Cover {
    /// Cover spanning along `direction`, which is normalized
    pub fn one_way(
        names: &mut NamingSequence,
        region: Region,
        supporting_structures: &[EntityId],
        direction: Vector3,
    ) -> StruxResult<Self> {
        let direction = direction.normalize()?;
        Ok(Cover::build(names, region, supporting_structures, Some(direction)))
    }

    pub fn two_way(names: &mut NamingSequence, region: Region, supporting_structures: &[EntityId]) -> Self {
        Cover::build(names, region, supporting_structures, None)
    }

    fn build(
        names: &mut NamingSequence,
        region: Region,
        supporting_structures: &[EntityId],
        load_bearing_direction: Option<Vector3>,
    ) -> Self {
        let mut refs: Vec<EntityId> = Vec::with_capacity(supporting_structures.len());
        for id in supporting_structures {
            if !refs.contains(id) {
                refs.push(*id);
            }
        }
        Cover {
            meta: EntityMeta::created(),
            name: names.next_name(COVER_PREFIX),
            region,
            supporting_structures: refs,
            load_bearing_direction,
        }
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub fn is_one_way(&self) -> bool {
        self.load_bearing_direction.is_some()
    }
}
