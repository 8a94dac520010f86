//! Child-element order of the interchange schema.
//!
//! Every element that may have children has an entry here. Writers build
//! children in whatever order is convenient and pass them through
//! [`ordered`]; readers check a parsed element with [`check_order`] before
//! reading its children positionally.

use super::XmlElement;
use crate::errors::{StruxError, StruxResult};

/// Root element of an interchange document
pub const ROOT: &str = "database";

/// Namespace written on the root element
pub const NAMESPACE: &str = "urn:strusoft";

/// Allowed children of `parent`, in schema order.
///
/// Elements not listed take no children. Names shared between contexts
/// (e.g. `section` under `sections` and under `complex_section`) use the
/// union of both orders.
pub fn child_order(parent: &str) -> Option<&'static [&'static str]> {
    let order: &'static [&'static str] = match parent {
        "database" => &["entities", "sections", "materials", "end"],
        "entities" => &["bar", "slab", "panel", "advanced-fem", "loads"],

        // Bars
        "bar" => &["bar_part", "end"],
        "bar_part" => &["curve", "local-y", "connectivity", "eccentricity", "buckling_data", "end"],
        "curve" => &["point", "normal", "x_axis"],
        "connectivity" => &["mov_x", "rot_x", "mov_y", "rot_y", "mov_z", "rot_z"],
        "eccentricity" => &["analytical", "physical"],

        // Shells
        "slab" => &["slab_part", "end"],
        "slab_part" => &["region", "thickness", "local_x", "local_y", "end"],
        "panel" => &["region", "local_x", "local_y", "end"],
        "region" => &["contour"],
        "contour" => &["edge"],
        "edge" => &["point", "normal", "x_axis", "edge_connection"],
        "edge_connection" => &["rigidity"],
        "rigidity" => &["motions", "rotations"],

        // Covers
        "advanced-fem" => &["cover"],
        "cover" => &["load_bearing_direction", "region", "supporting_structures"],
        "supporting_structures" => &["ref"],

        // Loads
        "loads" => &[
            "point_load",
            "line_load",
            "surface_temperature_variation_load",
            "load_case",
            "load_combination",
        ],
        "point_load" => &["direction", "load"],
        "surface_temperature_variation_load" => &["region", "temperature"],
        "load_combination" => &["load_case"],

        // Library
        "sections" => &["section", "complex_section"],
        "section" => &["region_group", "ecc", "end"],
        "complex_section" => &["section"],
        "materials" => &["material"],
        "material" => &["steel", "concrete", "timber", "custom"],

        _ => return None,
    };
    Some(order)
}

fn position(parent: &str, order: &[&str], child: &str) -> StruxResult<usize> {
    order
        .iter()
        .position(|name| *name == child)
        .ok_or_else(|| StruxError::schema_order(parent, format!("<{}> is not a valid child", child)))
}

/// Sort `children` into schema order for `parent`.
///
/// The sort is stable, so repeated elements keep their relative order.
/// Fails with `SchemaOrder` if a child is not allowed under `parent`.
pub fn ordered(parent: &str, children: Vec<XmlElement>) -> StruxResult<Vec<XmlElement>> {
    if children.is_empty() {
        return Ok(children);
    }
    let order = child_order(parent)
        .ok_or_else(|| StruxError::schema_order(parent, "element takes no children"))?;

    let mut keyed = children
        .into_iter()
        .map(|child| Ok((position(parent, order, &child.name)?, child)))
        .collect::<StruxResult<Vec<_>>>()?;
    keyed.sort_by_key(|(pos, _)| *pos);
    Ok(keyed.into_iter().map(|(_, child)| child).collect())
}

/// Build an element whose children are put into schema order
pub fn element(name: &str, attributes: Vec<(String, String)>, children: Vec<XmlElement>) -> StruxResult<XmlElement> {
    Ok(XmlElement {
        name: name.to_string(),
        attributes,
        children: ordered(name, children)?,
        text: None,
    })
}

/// Check that the children of `element` follow schema order.
pub fn check_order(element: &XmlElement) -> StruxResult<()> {
    if element.children.is_empty() {
        return Ok(());
    }
    let order = child_order(&element.name)
        .ok_or_else(|| StruxError::schema_order(&element.name, "element takes no children"))?;

    let mut last = 0;
    let mut last_name = "";
    for child in &element.children {
        let pos = position(&element.name, order, &child.name)?;
        if pos < last {
            return Err(StruxError::schema_order(
                &element.name,
                format!("<{}> must come before <{}>", child.name, last_name),
            ));
        }
        last = pos;
        last_name = child.name.as_str();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_is_stable() {
        let children = vec![
            XmlElement::new("end"),
            XmlElement::new("connectivity").with_attr("n", 1),
            XmlElement::new("curve"),
            XmlElement::new("connectivity").with_attr("n", 2),
        ];
        let sorted = ordered("bar_part", children).unwrap();
        let names: Vec<_> = sorted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["curve", "connectivity", "connectivity", "end"]);
        assert_eq!(sorted[1].attr("n"), Some("1"));
        assert_eq!(sorted[2].attr("n"), Some("2"));
    }

    #[test]
    fn test_unknown_child_is_rejected() {
        let err = ordered("bar", vec![XmlElement::new("slab_part")]).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ORDER");
        assert!(ordered("point", vec![XmlElement::new("x")]).is_err());
    }

    #[test]
    fn test_check_order() {
        let good = XmlElement::new("slab_part")
            .with_child(XmlElement::new("region"))
            .with_child(XmlElement::new("thickness"))
            .with_child(XmlElement::new("thickness"))
            .with_child(XmlElement::new("local_x"));
        assert!(check_order(&good).is_ok());

        let bad = XmlElement::new("slab_part")
            .with_child(XmlElement::new("thickness"))
            .with_child(XmlElement::new("region"));
        let err = check_order(&bad).unwrap_err();
        assert_eq!(
            err,
            StruxError::schema_order("slab_part", "<region> must come before <thickness>")
        );
    }

    #[test]
    fn test_every_listed_child_is_unique_in_its_parent() {
        for parent in ["database", "entities", "bar_part", "slab_part", "loads", "edge", "section"] {
            let order = child_order(parent).unwrap();
            for (i, name) in order.iter().enumerate() {
                assert!(!order[i + 1..].contains(name), "{} repeats {}", parent, name);
            }
        }
    }
}
