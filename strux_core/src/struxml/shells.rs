//! Slabs, panels and covers.

use super::geometry::{frame, read_frame, read_region, region};
use super::primitives::{attrs, read_meta, read_point, read_vector, vector};
use super::{FromXml, ToXml};
use crate::cover::Cover;
use crate::errors::StruxResult;
use crate::restricted::{NonNegMax1e5, SlabType};
use crate::shells::{LocationValue, Panel, ShellEccentricity, ShellOrthotropy, Slab, SlabPart};
use crate::xml::{schema, XmlElement};

// ============================================================================
// Slabs
// ============================================================================

fn thickness(value: &LocationValue) -> XmlElement {
    XmlElement::new("thickness")
        .with_attr("x", value.point.x)
        .with_attr("y", value.point.y)
        .with_attr("z", value.point.z)
        .with_attr("val", value.value)
}

impl ToXml for SlabPart {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut attributes = attrs(&[], &self.meta);
        let ecc = &self.eccentricity;
        for (key, value) in [
            ("name", self.name.clone()),
            ("complex_material", self.material.to_string()),
            ("alignment", ecc.alignment.to_string()),
            ("align_offset", ecc.eccentricity.to_string()),
            ("ortho_alfa", self.orthotropy.orthotropic_direction.to_string()),
            ("ortho_ratio", self.orthotropy.e2_over_e1.to_string()),
            ("ecc_calculation", ecc.eccentricity_calculation.to_string()),
            ("ecc_crack", ecc.eccentricity_by_cracking.to_string()),
            ("mesh_size", self.mesh_size.to_string()),
        ] {
            attributes.push((key.to_string(), value));
        }

        let mut children = vec![XmlElement::new("end"), region(&self.region, true)?];
        children.extend(frame(&self.region));
        children.extend(self.thickness.iter().map(thickness));
        schema::element("slab_part", attributes, children)
    }
}

fn read_slab_part(e: &XmlElement) -> StruxResult<SlabPart> {
    schema::check_order(e)?;
    let axes = read_frame(e)?;
    let thickness = e
        .children_named("thickness")
        .map(|t| LocationValue::new(read_point(t)?, t.parse_attr("val")?))
        .collect::<StruxResult<Vec<_>>>()?;

    Ok(SlabPart {
        meta: read_meta(e)?,
        name: e.required_attr("name")?.to_string(),
        region: read_region(e.required_child("region")?, Some(axes))?,
        thickness,
        material: e.parse_attr("complex_material")?,
        eccentricity: ShellEccentricity::new(
            e.parse_opt_attr("alignment")?.unwrap_or_default(),
            e.parse_opt_attr("align_offset")?.unwrap_or(0.0),
            e.parse_opt_attr("ecc_calculation")?.unwrap_or(false),
            e.parse_opt_attr("ecc_crack")?.unwrap_or(false),
        )?,
        orthotropy: ShellOrthotropy::new(
            e.parse_opt_attr("ortho_alfa")?.unwrap_or(0.0),
            e.parse_opt_attr("ortho_ratio")?.unwrap_or(1.0),
        )?,
        mesh_size: NonNegMax1e5::new(e.parse_opt_attr("mesh_size")?.unwrap_or(0.0))?,
    })
}

impl ToXml for Slab {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[("name", self.name().to_string()), ("type", self.slab_type().to_string())],
            &self.meta,
        );
        schema::element("slab", attributes, vec![self.part().to_xml()?, XmlElement::new("end")])
    }
}

impl FromXml for Slab {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let slab_type: SlabType = e.parse_attr("type")?;
        let part = read_slab_part(e.required_child("slab_part")?)?;
        Slab::restore(read_meta(e)?, e.required_attr("name")?.to_string(), slab_type, part)
    }
}

// ============================================================================
// Panels
// ============================================================================

impl ToXml for Panel {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[
                ("name", self.name().to_string()),
                ("type", self.panel_type().to_string()),
            ],
            &self.meta,
        )
        .into_iter()
        .chain([
            ("complex_material".to_string(), self.material().to_string()),
            ("complex_section".to_string(), self.section().to_string()),
            ("thickness".to_string(), self.thickness().to_string()),
        ])
        .collect();

        let mut children = vec![region(self.region(), true)?, XmlElement::new("end")];
        children.extend(frame(self.region()));
        schema::element("panel", attributes, children)
    }
}

impl FromXml for Panel {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let axes = read_frame(e)?;
        Panel::restore(
            read_meta(e)?,
            e.required_attr("name")?.to_string(),
            e.parse_attr("type")?,
            e.parse_attr("complex_material")?,
            e.parse_attr("complex_section")?,
            NonNegMax1e5::new(e.parse_attr("thickness")?)?,
            read_region(e.required_child("region")?, Some(axes))?,
        )
    }
}

// ============================================================================
// Covers
// ============================================================================

impl ToXml for Cover {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(&[("name", self.name.clone())], &self.meta);
        let refs = self
            .supporting_structures
            .iter()
            .map(|id| XmlElement::new("ref").with_attr("guid", id));
        let mut children = vec![
            XmlElement::new("supporting_structures").with_children(refs),
            region(&self.region, false)?,
        ];
        if let Some(direction) = self.load_bearing_direction {
            children.push(vector("load_bearing_direction", direction));
        }
        schema::element("cover", attributes, children)
    }
}

impl FromXml for Cover {
    fn from_xml(e: &XmlElement) -> StruxResult<Self> {
        schema::check_order(e)?;
        let supporting_structures = match e.child("supporting_structures") {
            Some(s) => s
                .children_named("ref")
                .map(|r| r.parse_attr("guid"))
                .collect::<StruxResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        let load_bearing_direction = e
            .child("load_bearing_direction")
            .map(|d| read_vector(d)?.normalize())
            .transpose()?;
        Ok(Cover {
            meta: read_meta(e)?,
            name: e.required_attr("name")?.to_string(),
            region: read_region(e.required_child("region")?, None)?,
            supporting_structures,
            load_bearing_direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, NamingSequence};
    use crate::geometry::{Point3, Region, Vector3};
    use crate::releases::ShellEdgeConnection;
    use crate::shells::ShellProperties;

    fn wall() -> Slab {
        let region =
            Region::rectangle(Point3::ORIGIN, Vector3::new(5.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0)).unwrap();
        let thickness = vec![
            LocationValue::new(Point3::ORIGIN, 0.2).unwrap(),
            LocationValue::new(Point3::new(5.0, 0.0, 0.0), 0.3).unwrap(),
        ];
        Slab::wall(&mut NamingSequence::new(), region, thickness, EntityId::new(), ShellProperties::default())
            .unwrap()
            .set_shell_edge_connection(ShellEdgeConnection::hinged(), &[0])
            .unwrap()
    }

    #[test]
    fn test_slab_part_children_follow_schema_order() {
        let e = wall().to_xml().unwrap();
        let part = e.required_child("slab_part").unwrap();
        let names: Vec<_> = part.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["region", "thickness", "thickness", "local_x", "local_y", "end"]);
        assert_eq!(part.attr("alignment"), Some("center"));
    }

    #[test]
    fn test_slab_round_trip() {
        let slab = wall();
        let read = Slab::from_xml(&slab.to_xml().unwrap()).unwrap();
        assert_eq!(read.name(), "W.1");
        assert_eq!(read.id(), slab.id());
        assert_eq!(read.part().thickness, slab.part().thickness);
        assert_eq!(read.edge_connections(), slab.edge_connections());
        assert!(read
            .region()
            .coordinate_system()
            .local_x()
            .equals(&slab.region().coordinate_system().local_x(), 1e-12));
    }

    #[test]
    fn test_cover_children_and_references() {
        let mut names = NamingSequence::new();
        let region =
            Region::rectangle(Point3::ORIGIN, Vector3::new(6.0, 0.0, 0.0), Vector3::new(0.0, 4.0, 0.0)).unwrap();
        let support = EntityId::new();
        let cover = Cover::one_way(&mut names, region, &[support], Vector3::UNIT_Y).unwrap();

        let e = cover.to_xml().unwrap();
        let names: Vec<_> = e.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["load_bearing_direction", "region", "supporting_structures"]);

        let read = Cover::from_xml(&e).unwrap();
        assert_eq!(read.supporting_structures, vec![support]);
        assert_eq!(read.load_bearing_direction, Some(Vector3::UNIT_Y));
        assert_eq!(read.name, "C0.1");
    }
}
