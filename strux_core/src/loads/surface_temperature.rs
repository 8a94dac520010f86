use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta};
use crate::errors::{StruxError, StruxResult};
use crate::geometry::{Point3, Region};
use crate::restricted::AbsMax1e20;

/// Top and bottom surface temperatures at a point [°C]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopBotLocationValue {
    pub point: Point3,
    pub top: AbsMax1e20,
    pub bottom: AbsMax1e20,
}

impl TopBotLocationValue {
    pub fn new(point: Point3, top: f64, bottom: f64) -> StruxResult<Self> {
        Ok(TopBotLocationValue {
            point,
            top: AbsMax1e20::new(top)?,
            bottom: AbsMax1e20::new(bottom)?,
        })
    }
}

/// Temperature variation over a surface: one uniform sample, or three
/// samples spanning a linear field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTemperatureLoad {
    pub(crate) meta: EntityMeta,
    pub load_case: EntityId,
    pub region: Region,
    values: Vec<TopBotLocationValue>,
    pub comment: String,
}

impl SurfaceTemperatureLoad {
    pub fn new(
        region: Region,
        values: Vec<TopBotLocationValue>,
        load_case: EntityId,
        comment: impl Into<String>,
    ) -> StruxResult<Self> {
        check_values(&values)?;
        Ok(SurfaceTemperatureLoad {
            meta: EntityMeta::created(),
            load_case,
            region,
            values,
            comment: comment.into(),
        })
    }

    /// Uniform load with its single sample at the region origin
    pub fn uniform(
        region: Region,
        top: f64,
        bottom: f64,
        load_case: EntityId,
        comment: impl Into<String>,
    ) -> StruxResult<Self> {
        let value = TopBotLocationValue::new(region.coordinate_system().origin(), top, bottom)?;
        SurfaceTemperatureLoad::new(region, vec![value], load_case, comment)
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub fn values(&self) -> &[TopBotLocationValue] {
        &self.values
    }

    pub fn set_values(&mut self, values: Vec<TopBotLocationValue>) -> StruxResult<()> {
        check_values(&values)?;
        self.values = values;
        self.meta.touch();
        Ok(())
    }
}

fn check_values(values: &[TopBotLocationValue]) -> StruxResult<()> {
    match values.len() {
        1 | 3 => Ok(()),
        n => Err(StruxError::arity("temperature", n, "1 or 3")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3;

    fn region() -> Region {
        Region::rectangle(
            Point3::new(1.0, 2.0, 0.0),
            Vector3::new(6.0, 0.0, 0.0),
            Vector3::new(0.0, 4.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_uniform_at_region_origin() {
        let load = SurfaceTemperatureLoad::uniform(region(), 20.0, -5.0, EntityId::new(), "sun").unwrap();
        assert_eq!(load.values().len(), 1);
        assert_eq!(load.values()[0].point, Point3::new(1.0, 2.0, 0.0));
        assert_eq!(load.values()[0].bottom.value(), -5.0);
    }

    #[test]
    fn test_value_count() {
        let v = TopBotLocationValue::new(Point3::ORIGIN, 10.0, 0.0).unwrap();
        let two = SurfaceTemperatureLoad::new(region(), vec![v, v], EntityId::new(), "");
        assert_eq!(two.unwrap_err().error_code(), "ARITY");
        assert!(SurfaceTemperatureLoad::new(region(), vec![v, v, v], EntityId::new(), "").is_ok());
        assert!(SurfaceTemperatureLoad::new(region(), vec![], EntityId::new(), "").is_err());
    }

    #[test]
    fn test_set_values_keeps_old_on_failure() {
        let mut load = SurfaceTemperatureLoad::uniform(region(), 20.0, 0.0, EntityId::new(), "").unwrap();
        let v = TopBotLocationValue::new(Point3::ORIGIN, 10.0, 0.0).unwrap();
        assert!(load.set_values(vec![v, v]).is_err());
        assert_eq!(load.values()[0].top.value(), 20.0);
    }
}
