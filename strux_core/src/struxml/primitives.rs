//! Points, vectors and entity stamps as attributes.

use chrono::{DateTime, Utc};

use crate::entity::{EntityAction, EntityId, EntityMeta};
use crate::errors::{StruxError, StruxResult};
use crate::geometry::{Point3, Vector3};
use crate::xml::XmlElement;

pub(crate) fn point(name: &str, p: Point3) -> XmlElement {
    XmlElement::new(name)
        .with_attr("x", p.x)
        .with_attr("y", p.y)
        .with_attr("z", p.z)
}

pub(crate) fn vector(name: &str, v: Vector3) -> XmlElement {
    XmlElement::new(name)
        .with_attr("x", v.x)
        .with_attr("y", v.y)
        .with_attr("z", v.z)
}

pub(crate) fn read_point(e: &XmlElement) -> StruxResult<Point3> {
    Ok(Point3::new(e.parse_attr("x")?, e.parse_attr("y")?, e.parse_attr("z")?))
}

pub(crate) fn read_vector(e: &XmlElement) -> StruxResult<Vector3> {
    Ok(Vector3::new(e.parse_attr("x")?, e.parse_attr("y")?, e.parse_attr("z")?))
}

/// `guid`, `last_change`, `action`
pub(crate) fn meta_attrs(meta: &EntityMeta) -> Vec<(String, String)> {
    vec![
        ("guid".to_string(), meta.id.to_string()),
        ("last_change".to_string(), meta.last_change_str()),
        ("action".to_string(), meta.action.as_str().to_string()),
    ]
}

/// Prepend `name`-style attributes to the stamp attributes
pub(crate) fn attrs(leading: &[(&str, String)], meta: &EntityMeta) -> Vec<(String, String)> {
    leading
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .chain(meta_attrs(meta))
        .collect()
}

pub(crate) fn read_meta(e: &XmlElement) -> StruxResult<EntityMeta> {
    let id: EntityId = e.parse_attr("guid")?;
    let last_change = match e.attr("last_change") {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|err| {
                StruxError::xml(format!("invalid last_change '{}' on <{}>: {}", raw, e.name, err))
            })?,
        None => return Err(StruxError::missing_attribute("last_change", &e.name)),
    };
    let action: EntityAction = e.parse_opt_attr("action")?.unwrap_or(EntityAction::Added);
    Ok(EntityMeta {
        id,
        last_change,
        action,
    })
}

/// Stamp attributes written without an action, e.g. on library entries
pub(crate) fn guid_attr(id: EntityId) -> (String, String) {
    ("guid".to_string(), id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_round_trip() {
        let mut meta = EntityMeta::created();
        meta.touch();
        let e = XmlElement {
            name: "bar".to_string(),
            attributes: meta_attrs(&meta),
            children: Vec::new(),
            text: None,
        };
        assert_eq!(read_meta(&e).unwrap(), meta);
    }

    #[test]
    fn test_bad_guid() {
        let e = XmlElement::new("bar")
            .with_attr("guid", "not-a-guid")
            .with_attr("last_change", "2024-01-01T00:00:00Z");
        assert!(read_meta(&e).is_err());
    }

    #[test]
    fn test_point_attributes() {
        let e = point("point", Point3::new(1.0, -2.5, 3.0));
        assert_eq!(e.attr("y"), Some("-2.5"));
        assert_eq!(read_point(&e).unwrap(), Point3::new(1.0, -2.5, 3.0));
    }
}
