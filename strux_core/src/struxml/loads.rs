//! Load cases, combinations and loads.

use super::geometry::{read_region, region};
use super::primitives::{attrs, meta_attrs, read_meta, read_point, read_vector, vector};
use super::{FromXml, ToXml};
use crate::errors::StruxResult;
use crate::loads::{LoadCase, LoadCombination, PointLoad, SurfaceTemperatureLoad, TopBotLocationValue};
use crate::restricted::AbsMax1e20;
use crate::xml::{schema, XmlElement};

impl ToXml for LoadCase {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[
                ("name", self.name.clone()),
                ("type", self.case_type.to_string()),
                ("duration_class", self.duration_class.to_string()),
            ],
            &self.meta,
        );
        schema::element("load_case", attributes, Vec::new())
    }
}

impl FromXml for LoadCase {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        Ok(LoadCase {
            meta: read_meta(e)?,
            name: e.required_attr("name")?.to_string(),
            case_type: e.parse_attr("type")?,
            duration_class: e.parse_opt_attr("duration_class")?.unwrap_or_default(),
        })
    }
}

impl ToXml for LoadCombination {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[
                ("name", self.name.clone()),
                ("type", self.combination_type.to_string()),
            ],
            &self.meta,
        );
        let cases = self
            .cases
            .iter()
            .map(|(id, gamma)| XmlElement::new("load_case").with_attr("guid", id).with_attr("gamma", gamma))
            .collect();
        schema::element("load_combination", attributes, cases)
    }
}

impl FromXml for LoadCombination {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let mut combination = LoadCombination {
            meta: read_meta(e)?,
            name: e.required_attr("name")?.to_string(),
            combination_type: e.parse_attr("type")?,
            cases: Vec::new(),
        };
        for case in e.children_named("load_case") {
            combination = combination.with_case(case.parse_attr("guid")?, case.parse_attr("gamma")?)?;
        }
        Ok(combination)
    }
}

// ============================================================================
// Loads
// ============================================================================

impl ToXml for PointLoad {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut attributes = meta_attrs(&self.meta);
        attributes.push(("load_case".to_string(), self.load_case.to_string()));
        attributes.push(("load_type".to_string(), self.load_type.to_string()));
        attributes.push(("comment".to_string(), self.comment.clone()));

        let load = XmlElement::new("load")
            .with_attr("x", self.position.x)
            .with_attr("y", self.position.y)
            .with_attr("z", self.position.z)
            .with_attr("val", self.magnitude);
        schema::element("point_load", attributes, vec![load, vector("direction", self.direction)])
    }
}

impl FromXml for PointLoad {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let load = e.required_child("load")?;
        Ok(PointLoad {
            meta: read_meta(e)?,
            load_case: e.parse_attr("load_case")?,
            load_type: e.parse_attr("load_type")?,
            position: read_point(load)?,
            direction: read_vector(e.required_child("direction")?)?.normalize()?,
            magnitude: AbsMax1e20::new(load.parse_attr("val")?)?,
            comment: e.attr("comment").unwrap_or_default().to_string(),
        })
    }
}

fn temperature(value: &TopBotLocationValue) -> XmlElement {
    XmlElement::new("temperature")
        .with_attr("x", value.point.x)
        .with_attr("y", value.point.y)
        .with_attr("z", value.point.z)
        .with_attr("top_val", value.top)
        .with_attr("bottom_val", value.bottom)
}

impl ToXml for SurfaceTemperatureLoad {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut attributes = meta_attrs(&self.meta);
        attributes.push(("load_case".to_string(), self.load_case.to_string()));
        attributes.push(("comment".to_string(), self.comment.clone()));

        let mut children: Vec<_> = self.values().iter().map(temperature).collect();
        children.push(region(&self.region, false)?);
        schema::element("surface_temperature_variation_load", attributes, children)
    }
}

impl FromXml for SurfaceTemperatureLoad {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let values = e
            .children_named("temperature")
            .map(|t| TopBotLocationValue::new(read_point(t)?, t.parse_attr("top_val")?, t.parse_attr("bottom_val")?))
            .collect::<StruxResult<Vec<_>>>()?;
        let mut load = SurfaceTemperatureLoad::new(
            read_region(e.required_child("region")?, None)?,
            values,
            e.parse_attr("load_case")?,
            e.attr("comment").unwrap_or_default(),
        )?;
        load.meta = read_meta(e)?;
        Ok(load)
    }
}
