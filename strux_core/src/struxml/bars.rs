//! Bars, bar parts and connectivity.
//!
//! Trusses carry their single section directly in `complex_section`; other
//! bar types reference a composite section written to the `sections` block,
//! from which their end sections are recovered on read.

use std::collections::HashMap;

use tracing::debug;

use super::geometry::{edge, read_edge};
use super::primitives::{attrs, read_meta, read_vector, vector};
use super::ToXml;
use crate::bars::{Bar, BarPart, BarPartRecord, Eccentricity};
use crate::entity::EntityId;
use crate::errors::{StruxError, StruxResult};
use crate::releases::{Connectivity, SimpleStiffness, StiffBase};
use crate::restricted::{BarType, DetachType};
use crate::sections::ComplexSection;
use crate::xml::{schema, XmlElement};

// ============================================================================
// Connectivity
// ============================================================================

impl ToXml for Connectivity {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut e = self
            .flags()
            .iter()
            .fold(XmlElement::new("connectivity"), |e, (key, fixed)| e.with_attr(*key, fixed));
        if let Some(springs) = &self.springs {
            if let Some(detach) = springs.detach {
                e.push_attr("detach", detach);
            }
            for (name, spring) in springs.entries() {
                e.children.push(
                    XmlElement::new(name)
                        .with_attr("neg", spring.neg)
                        .with_attr("pos", spring.pos),
                );
            }
        }
        schema::element(&e.name, e.attributes, e.children)
    }
}

fn read_spring(e: &XmlElement, name: &str) -> StruxResult<StiffBase> {
    let spring = e.required_child(name)?;
    StiffBase::new(spring.parse_attr("neg")?, spring.parse_attr("pos")?)
}

fn read_connectivity(e: &XmlElement) -> StruxResult<Connectivity> {
    schema::check_order(e)?;
    let springs = if e.children.is_empty() {
        None
    } else {
        let detach: Option<DetachType> = e.parse_opt_attr("detach")?;
        Some(SimpleStiffness {
            mov_x: read_spring(e, "mov_x")?,
            rot_x: read_spring(e, "rot_x")?,
            mov_y: read_spring(e, "mov_y")?,
            rot_y: read_spring(e, "rot_y")?,
            mov_z: read_spring(e, "mov_z")?,
            rot_z: read_spring(e, "rot_z")?,
            detach,
        })
    };
    Ok(Connectivity {
        m_x: e.parse_attr("m_x")?,
        m_y: e.parse_attr("m_y")?,
        m_z: e.parse_attr("m_z")?,
        r_x: e.parse_attr("r_x")?,
        r_y: e.parse_attr("r_y")?,
        r_z: e.parse_attr("r_z")?,
        springs,
    })
}

// ============================================================================
// Eccentricity
// ============================================================================

fn eccentricity(name: &str, ecc: &Eccentricity) -> XmlElement {
    XmlElement::new(name).with_attr("y", ecc.y).with_attr("z", ecc.z)
}

pub(crate) fn read_eccentricity(e: &XmlElement) -> StruxResult<Eccentricity> {
    Eccentricity::new(e.parse_attr("y")?, e.parse_attr("z")?)
}

fn pair<T>(items: Vec<T>, field: &str) -> StruxResult<[T; 2]> {
    let count = items.len();
    <[T; 2]>::try_from(items).map_err(|_| StruxError::arity(field, count, "2 (start and end)"))
}

// ============================================================================
// Bar parts
// ============================================================================

impl ToXml for BarPart {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let mut attributes = attrs(&[], &self.meta);
        attributes.push(("name".to_string(), self.name().to_string()));
        attributes.push(("complex_material".to_string(), self.material().to_string()));
        attributes.push(("complex_section".to_string(), self.complex_section_ref().to_string()));
        if let Some(made) = self.made() {
            attributes.push(("made".to_string(), made.as_str().to_string()));
        }
        attributes.push(("ecc_calc".to_string(), self.ecc_calc().to_string()));

        let mut children = vec![
            edge("curve", self.edge()),
            vector("local-y", self.local_y()),
            XmlElement::new("buckling_data"),
            XmlElement::new("end"),
        ];
        if let Some(model_ecc) = self.model_eccentricity() {
            for connectivity in self.connectivities() {
                children.push(connectivity.to_xml()?);
            }
            let analytical = model_ecc.analytical.iter().map(|e| eccentricity("analytical", e));
            let physical = model_ecc.physical.iter().map(|e| eccentricity("physical", e));
            children.push(
                XmlElement::new("eccentricity")
                    .with_attr("use_default_physical_alignment", model_ecc.use_default_physical_alignment)
                    .with_children(analytical)
                    .with_children(physical),
            );
        }
        schema::element("bar_part", attributes, children)
    }
}

fn read_bar_part(
    e: &XmlElement,
    bar_type: BarType,
    complex_sections: &HashMap<EntityId, ComplexSection>,
) -> StruxResult<BarPart> {
    schema::check_order(e)?;
    let complex_section_ref: EntityId = e.parse_attr("complex_section")?;

    let (complex_section_id, sections, eccentricities, connectivities, section_pos) = if bar_type.rules().has_complex_section {
        let complex = complex_sections
            .get(&complex_section_ref)
            .ok_or_else(|| StruxError::dangling("complex section", complex_section_ref))?;
        let analytical = e
            .required_child("eccentricity")?
            .children_named("analytical")
            .map(read_eccentricity)
            .collect::<StruxResult<Vec<_>>>()?;
        let connectivities = e
            .children_named("connectivity")
            .map(read_connectivity)
            .collect::<StruxResult<Vec<_>>>()?;
        (
            Some(complex_section_ref),
            complex.sections(),
            pair(analytical, "analytical")?,
            pair(connectivities, "connectivity")?,
            [complex.entries[0].pos, complex.entries[1].pos],
        )
    } else {
        (
            None,
            [complex_section_ref; 2],
            [Eccentricity::default(); 2],
            [Connectivity::rigid(); 2],
            [0.0, 1.0],
        )
    };

    let mut part = BarPart::restore(BarPartRecord {
        meta: read_meta(e)?,
        name: e.required_attr("name")?.to_string(),
        bar_type,
        edge: read_edge(e.required_child("curve")?)?,
        local_y: read_vector(e.required_child("local-y")?)?,
        material: e.parse_attr("complex_material")?,
        sections,
        eccentricities,
        connectivities,
        complex_section_id,
        made: e.parse_opt_attr("made")?,
        ecc_calc: e.parse_opt_attr("ecc_calc")?.unwrap_or(true),
    })?;
    part.set_section_pos(&section_pos)?;
    Ok(part)
}

// ============================================================================
// Bars
// ============================================================================

impl ToXml for Bar {
    fn to_xml(&self) -> StruxResult<XmlElement> {
        let attributes = attrs(
            &[("name", self.name().to_string()), ("type", self.bar_type().to_string())],
            &self.meta,
        );
        schema::element("bar", attributes, vec![XmlElement::new("end"), self.part().to_xml()?])
    }
}

pub(crate) fn read_bar(e: &XmlElement, complex_sections: &HashMap<EntityId, ComplexSection>) -> StruxResult<Bar> {
    schema::check_order(e)?;
    let name = e.required_attr("name")?.to_string();
    let bar_type: BarType = e.parse_attr("type")?;
    let part = read_bar_part(e.required_child("bar_part")?, bar_type, complex_sections)?;
    debug!(bar = %name, %bar_type, "read bar");
    Ok(Bar::restore(read_meta(e)?, name, part))
}
