//! Property resolution along a class hierarchy.

use std::sync::Arc;

use xurkit_schema::{Class, PropertyDefinition, SchemaGroup};

/// The resolved hierarchy of one class, root class first.
///
/// Properties are addressed by `(depth, index)`: the position of the
/// declaring class in the hierarchy and the position of the property in
/// that class.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    hierarchy: Vec<Arc<Class>>,
}

impl ClassLayout {
    /// Resolve `class_name` in `group`.
    pub fn resolve(group: &SchemaGroup, class_name: &str) -> xurkit_schema::Result<Self> {
        Ok(Self {
            hierarchy: group.class_hierarchy(class_name)?,
        })
    }

    /// Classes, root first.
    pub fn hierarchy(&self) -> &[Arc<Class>] {
        &self.hierarchy
    }

    /// Find a property by name; the first match walking from the root wins.
    pub fn find(&self, name: &str) -> Option<(usize, usize, &Arc<PropertyDefinition>)> {
        self.hierarchy.iter().enumerate().find_map(|(depth, class)| {
            class
                .find_property(name)
                .map(|(index, definition)| (depth, index, definition))
        })
    }

    /// Property at a `(depth, index)` address.
    pub fn get(&self, depth: usize, index: usize) -> Option<&Arc<PropertyDefinition>> {
        self.hierarchy.get(depth)?.properties.get(index)
    }

    /// Address of a definition declared somewhere in this hierarchy.
    pub fn locate(&self, definition: &PropertyDefinition) -> Option<(usize, usize)> {
        let depth = self
            .hierarchy
            .iter()
            .position(|c| c.name == definition.class_name)?;
        let (index, found) = self.hierarchy[depth].find_property(&definition.name)?;
        found.same_declaration(definition).then_some((depth, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xurkit_schema::SchemaRegistry;

    const SCHEMA: &str = r#"
<XuiSchema>
  <Class Name="XuiElement">
    <Property Id="0" Name="Id" Type="string"/>
    <Property Id="1" Name="Width" Type="float"/>
  </Class>
  <Class Name="XuiText" BaseClassName="XuiElement">
    <Property Id="20" Name="Text" Type="string"/>
    <Property Id="21" Name="Width" Type="integer"/>
  </Class>
</XuiSchema>"#;

    #[test]
    fn test_root_first_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register_source("g", "s.xml", SCHEMA).unwrap();
        let layout = ClassLayout::resolve(registry.group("g").unwrap(), "XuiText").unwrap();

        let (depth, index, width) = layout.find("Width").unwrap();
        assert_eq!((depth, index), (0, 1));
        assert_eq!(width.class_name, "XuiElement");

        let (depth, index, text) = layout.find("Text").unwrap();
        assert_eq!((depth, index), (1, 0));
        assert_eq!(layout.locate(text), Some((1, 0)));
        assert_eq!(layout.get(1, 0).unwrap().name, "Text");
        assert!(layout.get(2, 0).is_none());
    }
}
