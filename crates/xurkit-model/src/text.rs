//! Text forms of property values, as used in XUI documents.
//!
//! | Type       | Form                                            |
//! |------------|-------------------------------------------------|
//! | bool       | `true` / `false`                                |
//! | integer    | decimal                                         |
//! | unsigned   | decimal                                         |
//! | float      | six decimals                                    |
//! | string     | verbatim                                        |
//! | colour     | `0xAARRGGBB`                                    |
//! | vector     | `x,y,z`                                         |
//! | quaternion | `x,y,z,w`                                       |
//! | custom     | `count,x,y,c1x,c1y,c2x,c2y,smoothing,...`       |

use glam::{Quat, Vec2, Vec3};
use xurkit_schema::{PropertyDefinition, PropertyType};

use crate::{BezierPoint, Error, Figure, Result, Value};

/// Format a scalar value. Compound values have no text form and format empty.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => format_float(*v),
        Value::String(s) => s.clone(),
        Value::Colour(c) => format!("0x{:08x}", c),
        Value::Vector(v) => format!("{},{},{}", format_float(v.x), format_float(v.y), format_float(v.z)),
        Value::Quaternion(q) => {
            let [x, y, z, w] = q.to_array();
            format!(
                "{},{},{},{}",
                format_float(x),
                format_float(y),
                format_float(z),
                format_float(w)
            )
        }
        Value::Compound(_) => String::new(),
        Value::Figure(figure) => format_figure(figure),
    }
}

fn format_float(v: f32) -> String {
    format!("{:.6}", v)
}

fn format_figure(figure: &Figure) -> String {
    let mut out = figure.points.len().to_string();
    for p in &figure.points {
        for v in [p.point.x, p.point.y, p.ctrl1.x, p.ctrl1.y, p.ctrl2.x, p.ctrl2.y] {
            out.push(',');
            out.push_str(&format_float(v));
        }
        out.push(',');
        out.push_str(&p.smoothing.to_string());
    }
    out
}

/// Parse the text of a scalar property.
///
/// String text is taken verbatim, so empty text is the empty string. For
/// other types surrounding whitespace is ignored and empty text falls back to
/// the definition's default, then to the type's zero value. `bounds` is the
/// bounding box given to figures.
pub fn parse_value(definition: &PropertyDefinition, text: &str, bounds: Vec2) -> Result<Value> {
    if definition.property_type == PropertyType::String {
        return Ok(Value::String(text.to_string()));
    }

    let text = text.trim();
    if text.is_empty() {
        return match definition.default.as_deref().map(str::trim) {
            Some(default) if !default.is_empty() => parse_text(definition, default, bounds),
            _ => Ok(zero_with_bounds(definition.property_type, bounds)),
        };
    }
    parse_text(definition, text, bounds)
}

fn zero_with_bounds(ty: PropertyType, bounds: Vec2) -> Value {
    match ty {
        PropertyType::Custom => Value::Figure(Figure {
            bounds,
            points: Vec::new(),
        }),
        _ => Value::zero(ty),
    }
}

fn parse_text(definition: &PropertyDefinition, text: &str, bounds: Vec2) -> Result<Value> {
    let invalid = || Error::InvalidText {
        property: definition.name.clone(),
        expected: definition.property_type,
        text: text.to_string(),
    };

    let value = match definition.property_type {
        PropertyType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => return Err(invalid()),
        },
        PropertyType::Integer => Value::Int(text.parse().map_err(|_| invalid())?),
        PropertyType::Unsigned => Value::UInt(text.parse().map_err(|_| invalid())?),
        PropertyType::Float => Value::Float(text.parse().map_err(|_| invalid())?),
        PropertyType::String => Value::String(text.to_string()),
        PropertyType::Colour => Value::Colour(parse_colour(text).ok_or_else(invalid)?),
        PropertyType::Vector => {
            let [x, y, z] = parse_floats::<3>(text).ok_or_else(invalid)?;
            Value::Vector(Vec3::new(x, y, z))
        }
        PropertyType::Quaternion => {
            let [x, y, z, w] = parse_floats::<4>(text).ok_or_else(invalid)?;
            Value::Quaternion(Quat::from_xyzw(x, y, z, w))
        }
        PropertyType::Custom => Value::Figure(parse_figure(text, bounds).ok_or_else(invalid)?),
        PropertyType::Object => return Err(invalid()),
    };
    Ok(value)
}

fn parse_colour(text: &str) -> Option<u32> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_floats<const N: usize>(text: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = text.split(',');
    for slot in &mut out {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    parts.next().is_none().then_some(out)
}

fn parse_figure(text: &str, bounds: Vec2) -> Option<Figure> {
    let mut parts = text.split(',').map(str::trim);
    let count: usize = parts.next()?.parse().ok()?;

    let mut points = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let mut f = [0.0f32; 6];
        for slot in &mut f {
            *slot = parts.next()?.parse().ok()?;
        }
        let smoothing = parts.next()?.parse().ok()?;
        points.push(BezierPoint {
            point: Vec2::new(f[0], f[1]),
            ctrl1: Vec2::new(f[2], f[3]),
            ctrl2: Vec2::new(f[4], f[5]),
            smoothing,
        });
    }

    if parts.next().is_some() {
        return None;
    }
    Some(Figure { bounds, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_FIGURE_SIZE;
    use xurkit_schema::PropertyFlags;

    fn def(ty: PropertyType, default: Option<&str>) -> PropertyDefinition {
        PropertyDefinition {
            id: 0,
            name: "P".to_string(),
            property_type: ty,
            flags: PropertyFlags::empty(),
            default: default.map(str::to_string),
            class_name: "XuiElement".to_string(),
            members: Vec::new(),
        }
    }

    fn parse(ty: PropertyType, text: &str) -> Result<Value> {
        parse_value(&def(ty, None), text, DEFAULT_FIGURE_SIZE)
    }

    #[test]
    fn test_scalar_forms() {
        assert_eq!(parse(PropertyType::Bool, "true").unwrap(), Value::Bool(true));
        assert_eq!(parse(PropertyType::Integer, "-12").unwrap(), Value::Int(-12));
        assert_eq!(parse(PropertyType::Colour, "0xff102030").unwrap(), Value::Colour(0xFF102030));
        assert_eq!(format_value(&Value::Colour(0xFF102030)), "0xff102030");
        assert_eq!(format_value(&Value::Float(1.5)), "1.500000");
        assert_eq!(
            parse(PropertyType::Vector, "1, 2.5,-3").unwrap(),
            Value::Vector(Vec3::new(1.0, 2.5, -3.0))
        );
        assert!(parse(PropertyType::Vector, "1,2").is_err());
        assert!(parse(PropertyType::Unsigned, "-1").is_err());
    }

    #[test]
    fn test_empty_uses_default() {
        let width = def(PropertyType::Float, Some("60"));
        assert_eq!(parse_value(&width, "", Vec2::ZERO).unwrap(), Value::Float(60.0));
        assert_eq!(parse(PropertyType::Integer, "  ").unwrap(), Value::Int(0));
    }

    #[test]
    fn test_string_text_is_verbatim() {
        let id = def(PropertyType::String, Some("Label"));
        assert_eq!(parse_value(&id, "", Vec2::ZERO).unwrap(), Value::String(String::new()));
        assert_eq!(
            parse_value(&id, "  padded  ", Vec2::ZERO).unwrap(),
            Value::String("  padded  ".to_string())
        );
    }

    #[test]
    fn test_figure_text() {
        let text = "2,0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,0,\
                    10.000000,5.000000,9.000000,5.000000,11.000000,5.000000,1";
        let value = parse_value(&def(PropertyType::Custom, None), text, Vec2::new(100.0, 50.0)).unwrap();
        let Value::Figure(figure) = &value else {
            panic!("expected figure");
        };
        assert_eq!(figure.bounds, Vec2::new(100.0, 50.0));
        assert_eq!(figure.points.len(), 2);
        assert_eq!(figure.points[1].smoothing, 1);
        assert_eq!(format_value(&value), text);
    }

    #[test]
    fn test_truncated_figure_rejected() {
        assert!(parse(PropertyType::Custom, "1,0,0,0").is_err());
    }
}
