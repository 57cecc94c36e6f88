//! Schema file parsing.
//!
//! A schema file is turned into a staged [`SchemaFile`] that holds every
//! class, ignore entry and (recursively) included file. Nothing touches the
//! registry until the staged file passes the group-level checks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashSet as FastHashSet;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use tracing::{debug, warn};
use xurkit_common::xml::{self, XmlNode};

use crate::{Class, Error, PropertyDefinition, PropertyFlags, PropertyType, Result};

type FxHashSet<T> = FastHashSet<T, BuildHasherDefault<FxHasher>>;

/// Root element of a schema file.
const SCHEMA_ROOT: &str = "XuiSchema";

/// Base-class spelling that marks a hierarchy root.
const NULL_CLASS: &str = "(null)";

/// An ignore-property entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IgnoreEntry {
    /// Class name.
    pub class: String,
    /// Property name.
    pub property: String,
}

/// A parsed schema file together with the contents of its includes.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    /// Path the file was registered under.
    pub path: PathBuf,
    /// Declared classes, in file order.
    pub classes: Vec<Arc<Class>>,
    /// Ignore-property entries.
    pub ignores: Vec<IgnoreEntry>,
}

impl SchemaFile {
    /// Find a class declared by this file.
    pub fn find_class(&self, name: &str) -> Option<&Arc<Class>> {
        self.classes.iter().find(|c| c.name == name)
    }
}

/// Load a schema file from disk, following includes.
pub fn load_file(path: &Path) -> Result<SchemaFile> {
    let text = std::fs::read_to_string(path)?;
    load_source(path, &text)
}

/// Load a schema from text; `origin` anchors relative includes.
pub fn load_source(origin: &Path, text: &str) -> Result<SchemaFile> {
    let mut visited = FxHashSet::default();
    visited.insert(origin.to_path_buf());
    load_recursive(origin, text, &mut visited)
}

fn load_recursive(origin: &Path, text: &str, visited: &mut FxHashSet<PathBuf>) -> Result<SchemaFile> {
    let root = xml::parse_document(text)?;
    if root.tag != SCHEMA_ROOT {
        return Err(Error::malformed(
            origin,
            format!("root element is <{}>, expected <{}>", root.tag, SCHEMA_ROOT),
        ));
    }

    let mut file = SchemaFile {
        path: origin.to_path_buf(),
        classes: Vec::new(),
        ignores: Vec::new(),
    };

    for node in &root.children {
        match node.tag.as_str() {
            "Class" => {
                let class = parse_class(origin, node)?;
                if file.find_class(&class.name).is_some() {
                    return Err(Error::DuplicateClass(class.name));
                }
                file.classes.push(Arc::new(class));
            }
            "IgnoreProperties" => {
                for entry in node.find_all("Ignore") {
                    let class = required_attr(origin, entry, "Class")?;
                    let property = required_attr(origin, entry, "Property")?;
                    file.ignores.push(IgnoreEntry {
                        class: class.to_string(),
                        property: property.to_string(),
                    });
                }
            }
            "Include" => {}
            other => {
                return Err(Error::malformed(origin, format!("unexpected element <{}>", other)));
            }
        }
    }

    for include in root.find_all("Include") {
        let relative = required_attr(origin, include, "Path")?;
        let path = origin
            .parent()
            .map(|dir| dir.join(relative))
            .unwrap_or_else(|| PathBuf::from(relative));

        if !visited.insert(path.clone()) {
            debug!("skipping already visited include {}", path.display());
            continue;
        }

        let included = match std::fs::read_to_string(&path) {
            Ok(text) => load_recursive(&path, &text, visited),
            Err(e) => Err(Error::Io(e)),
        };

        match included {
            Ok(included) => merge_include(&mut file, included)?,
            Err(Error::DuplicateClass(name)) => return Err(Error::DuplicateClass(name)),
            Err(e) => warn!("ignoring include {} of {}: {}", path.display(), origin.display(), e),
        }
    }

    Ok(file)
}

fn merge_include(file: &mut SchemaFile, included: SchemaFile) -> Result<()> {
    for class in included.classes {
        if file.find_class(&class.name).is_some() {
            return Err(Error::DuplicateClass(class.name.clone()));
        }
        file.classes.push(class);
    }
    file.ignores.extend(included.ignores);
    Ok(())
}

fn parse_class(origin: &Path, node: &XmlNode) -> Result<Class> {
    let name = required_attr(origin, node, "Name")?.to_string();
    let base = node
        .attribute("BaseClassName")
        .map(str::trim)
        .filter(|b| !b.is_empty() && *b != NULL_CLASS)
        .map(str::to_string);

    let properties = parse_property_list(origin, node, &name)?;

    Ok(Class {
        name,
        base,
        properties,
    })
}

/// Parse the `<Property>` children of `node`, back-filling `class_name`.
fn parse_property_list(
    origin: &Path,
    node: &XmlNode,
    class_name: &str,
) -> Result<Vec<Arc<PropertyDefinition>>> {
    let mut properties: Vec<Arc<PropertyDefinition>> = Vec::new();

    for (index, prop) in node.find_all("Property").enumerate() {
        let name = required_attr(origin, prop, "Name")?.to_string();
        let id = match prop.attribute("Id") {
            Some(id) => id.trim().parse::<u32>().map_err(|_| {
                Error::malformed(origin, format!("invalid id '{}' on property '{}'", id, name))
            })?,
            None => index as u32,
        };
        let property_type = PropertyType::parse(required_attr(origin, prop, "Type")?)?;
        let flags = PropertyFlags::parse(prop.attribute("Flags").unwrap_or(""))?;
        let default = prop.attribute("Default").map(str::to_string);

        let members = if property_type == PropertyType::Object {
            parse_property_list(origin, prop, class_name)?
        } else {
            Vec::new()
        };

        if properties.iter().any(|p| p.name == name) {
            return Err(Error::DuplicateProperty {
                class: class_name.to_string(),
                property: name,
            });
        }
        if properties.iter().any(|p| p.id == id) {
            return Err(Error::DuplicatePropertyId {
                class: class_name.to_string(),
                id,
            });
        }

        properties.push(Arc::new(PropertyDefinition {
            id,
            name,
            property_type,
            flags,
            default,
            class_name: class_name.to_string(),
            members,
        }));
    }

    Ok(properties)
}

fn required_attr<'a>(origin: &Path, node: &'a XmlNode, key: &str) -> Result<&'a str> {
    node.attribute(key)
        .ok_or_else(|| Error::malformed(origin, format!("<{}> is missing the {} attribute", node.tag, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
<XuiSchema>
  <Class Name="XuiElement" BaseClassName="(null)">
    <Property Id="0" Name="Id" Type="string"/>
    <Property Id="1" Name="Width" Type="float" Default="60"/>
    <Property Id="2" Name="Fill" Type="object">
      <Property Id="0" Name="FillColor" Type="colour" Flags="noanim"/>
      <Property Id="1" Name="StopPos" Type="float" Flags="indexed"/>
    </Property>
  </Class>
  <Class Name="XuiText" BaseClassName="XuiElement"/>
  <IgnoreProperties>
    <Ignore Class="XuiElement" Property="Width"/>
  </IgnoreProperties>
</XuiSchema>"#;

    #[test]
    fn test_parse_schema() {
        let file = load_source(Path::new("schema.xml"), SCHEMA).unwrap();
        assert_eq!(file.classes.len(), 2);

        let element = file.find_class("XuiElement").unwrap();
        assert!(element.is_root());
        assert_eq!(element.properties.len(), 3);

        let (_, fill) = element.find_property("Fill").unwrap();
        assert_eq!(fill.property_type, PropertyType::Object);
        assert_eq!(fill.members.len(), 2);
        assert_eq!(fill.members[1].class_name, "XuiElement");
        assert!(fill.members[1].is_indexed());
        assert!(!fill.members[0].is_animatable());

        let text = file.find_class("XuiText").unwrap();
        assert_eq!(text.base.as_deref(), Some("XuiElement"));
        assert_eq!(file.ignores.len(), 1);
    }

    #[test]
    fn test_duplicate_property_name() {
        let xml = r#"<XuiSchema><Class Name="A">
            <Property Id="0" Name="X" Type="bool"/>
            <Property Id="1" Name="X" Type="bool"/>
        </Class></XuiSchema>"#;
        assert!(matches!(
            load_source(Path::new("a.xml"), xml),
            Err(Error::DuplicateProperty { .. })
        ));
    }

    #[test]
    fn test_duplicate_class_in_file() {
        let xml = r#"<XuiSchema><Class Name="A"/><Class Name="A"/></XuiSchema>"#;
        assert!(matches!(
            load_source(Path::new("a.xml"), xml),
            Err(Error::DuplicateClass(name)) if name == "A"
        ));
    }

    #[test]
    fn test_wrong_root() {
        assert!(matches!(
            load_source(Path::new("a.xml"), "<Schema/>"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_include_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.xml");
        let xml = r#"<XuiSchema><Class Name="A"/><Include Path="missing.xml"/></XuiSchema>"#;
        let file = load_source(&path, xml).unwrap();
        assert_eq!(file.classes.len(), 1);
    }

    #[test]
    fn test_include_merges_classes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("extra.xml"),
            r#"<XuiSchema><Class Name="B" BaseClassName="A"/></XuiSchema>"#,
        )
        .unwrap();
        let path = dir.path().join("main.xml");
        let xml = r#"<XuiSchema><Class Name="A"/><Include Path="extra.xml"/></XuiSchema>"#;
        let file = load_source(&path, xml).unwrap();
        assert!(file.find_class("B").is_some());
    }

    #[test]
    fn test_include_with_duplicate_class_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("extra.xml"),
            r#"<XuiSchema><Class Name="A"/></XuiSchema>"#,
        )
        .unwrap();
        let path = dir.path().join("main.xml");
        let xml = r#"<XuiSchema><Class Name="A"/><Include Path="extra.xml"/></XuiSchema>"#;
        assert!(matches!(load_source(&path, xml), Err(Error::DuplicateClass(_))));
    }
}
