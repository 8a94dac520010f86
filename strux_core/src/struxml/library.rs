//! The `sections` and `materials` blocks.

use super::bars::read_eccentricity;
use super::primitives::{attrs, guid_attr, read_meta};
use super::{FromXml, ToXml};
use crate::bars::Eccentricity;
use crate::errors::{StruxError, StruxResult};
use crate::materials::Material;
use crate::restricted::{MaterialFamily, NonNegMax1e15, NonNegMax1e5, Ratio01};
use crate::sections::{ComplexSection, ComplexSectionEntry, Section};
use crate::xml::{schema, XmlElement};

impl ToXml for Section {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[
                ("name", self.name.clone()),
                ("family", self.family.to_string()),
                ("area", self.area.to_string()),
                ("iy", self.iy.to_string()),
                ("iz", self.iz.to_string()),
            ],
            &self.meta,
        );
        schema::element(
            "section",
            attributes,
            vec![XmlElement::new("end"), XmlElement::new("region_group")],
        )
    }
}

impl FromXml for Section {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        Ok(Section {
            meta: read_meta(e)?,
            name: e.required_attr("name")?.to_string(),
            family: e.parse_opt_attr("family")?.unwrap_or(MaterialFamily::Custom),
            area: NonNegMax1e5::new(e.parse_attr("area")?)?,
            iy: NonNegMax1e5::new(e.parse_attr("iy")?)?,
            iz: NonNegMax1e5::new(e.parse_attr("iz")?)?,
        })
    }
}

fn ecc(eccentricity: &Eccentricity) -> XmlElement {
    XmlElement::new("ecc")
        .with_attr("y", eccentricity.y)
        .with_attr("z", eccentricity.z)
}

impl ToXml for ComplexSection {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                schema::element(
                    "section",
                    vec![
                        ("pos".to_string(), entry.pos.to_string()),
                        guid_attr(entry.section),
                    ],
                    vec![ecc(&entry.eccentricity), XmlElement::new("end")],
                )
            })
            .collect::<StruxResult<Vec<_>>>()?;
        schema::element("complex_section", vec![guid_attr(self.id)], entries)
    }
}

impl FromXml for ComplexSection {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let entries = e
            .children_named("section")
            .map(|s| {
                Ok(ComplexSectionEntry {
                    pos: s.parse_attr("pos")?,
                    section: s.parse_attr("guid")?,
                    eccentricity: match s.child("ecc") {
                        Some(ecc) => read_eccentricity(ecc)?,
                        None => Eccentricity::default(),
                    },
                })
            })
            .collect::<StruxResult<Vec<_>>>()?;
        let count = entries.len();
        let entries: [ComplexSectionEntry; 2] = entries
            .try_into()
            .map_err(|_| StruxError::arity("complex_section.section", count, "2 (start and end)"))?;
        Ok(ComplexSection {
            id: e.parse_attr("guid")?,
            entries,
        })
    }
}

impl ToXml for Material {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[
                ("name", self.name.clone()),
                ("standard", self.standard.clone()),
                ("country", self.country.clone()),
            ],
            &self.meta,
        );
        let properties = XmlElement::new(self.family.as_str())
            .with_attr("E", self.e_modulus)
            .with_attr("nu", self.poisson)
            .with_attr("density", self.density);
        schema::element("material", attributes, vec![properties])
    }
}

impl FromXml for Material {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let (family, properties) = MaterialFamily::ALL
            .iter()
            .find_map(|family| e.child(family.as_str()).map(|p| (*family, p)))
            .ok_or_else(|| StruxError::missing_element("steel|concrete|timber|custom", &e.name))?;
        Ok(Material {
            meta: read_meta(e)?,
            name: e.required_attr("name")?.to_string(),
            standard: e.required_attr("standard")?.to_string(),
            country: e.required_attr("country")?.to_string(),
            family,
            e_modulus: NonNegMax1e15::new(properties.parse_attr("E")?)?,
            poisson: Ratio01::new(properties.parse_attr("nu")?)?,
            density: NonNegMax1e5::new(properties.parse_attr("density")?)?,
        })
    }
}
