//! UI object tree.

use xurkit_schema::PropertyDefinition;

use crate::{NamedFrame, Property, Timeline, Value};

/// Class every writable document must use for its root object.
pub const ROOT_CLASS: &str = "XuiCanvas";

/// Name of the property that identifies an object to timelines.
pub const ID_PROPERTY: &str = "Id";

/// Deepest object nesting the codecs accept, counting the root as one level.
pub const MAX_DEPTH: usize = 256;

/// A UI element: class, properties, child elements and animation.
///
/// The tree owns its children; timelines refer to children by `Id`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UIObject {
    pub class_name: String,
    pub properties: Vec<Property>,
    pub children: Vec<UIObject>,
    pub named_frames: Vec<NamedFrame>,
    pub timelines: Vec<Timeline>,
}

impl UIObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    /// Find a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// The object's `Id` string, if set.
    pub fn id(&self) -> Option<&str> {
        self.property(ID_PROPERTY)
            .and_then(Property::single_value)
            .and_then(Value::as_str)
    }

    /// Find a direct child by its `Id`.
    pub fn find_child_by_id(&self, id: &str) -> Option<&UIObject> {
        self.children.iter().find(|c| c.id() == Some(id))
    }

    /// Check if the object uses the required root class.
    pub fn is_canvas(&self) -> bool {
        self.class_name == ROOT_CLASS
    }

    /// Check if the object carries any timeline data.
    pub fn has_animation(&self) -> bool {
        !self.named_frames.is_empty() || !self.timelines.is_empty()
    }

    /// Iterate over this object and all descendants, depth first, parents before children.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Number of object levels in the tree, counting this object.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((object, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(object.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Drop properties whose definition matches `ignored`, everywhere in the tree.
    ///
    /// Applies to object properties, compound members and keyframes.
    pub fn strip_properties(&mut self, ignored: &mut impl FnMut(&PropertyDefinition) -> bool) {
        let mut keep = |d: &PropertyDefinition| !ignored(d);

        self.properties.retain(|p| keep(p.definition()));
        for property in &mut self.properties {
            property.retain_members(&mut keep);
        }

        for timeline in &mut self.timelines {
            for keyframe in &mut timeline.keyframes {
                keyframe.properties.retain(|p| keep(p.definition()));
                for property in &mut keyframe.properties {
                    property.retain_members(&mut keep);
                }
                // A keyframe property reduced to an empty compound no longer addresses a leaf.
                keyframe
                    .properties
                    .retain(|p| !matches!(p.single_value(), Some(Value::Compound(m)) if m.is_empty()));
            }
        }

        for child in &mut self.children {
            child.strip_properties(ignored);
        }
    }
}

/// Pre-order iterator over an object tree.
pub struct Descendants<'a> {
    stack: Vec<&'a UIObject>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a UIObject;

    fn next(&mut self) -> Option<Self::Item> {
        let object = self.stack.pop()?;
        self.stack.extend(object.children.iter().rev());
        Some(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xurkit_schema::{PropertyFlags, PropertyType};

    fn id_def() -> Arc<PropertyDefinition> {
        Arc::new(PropertyDefinition {
            id: 0,
            name: ID_PROPERTY.to_string(),
            property_type: PropertyType::String,
            flags: PropertyFlags::empty(),
            default: None,
            class_name: "XuiElement".to_string(),
            members: Vec::new(),
        })
    }

    fn named(class: &str, id: &str) -> UIObject {
        let mut object = UIObject::new(class);
        object
            .properties
            .push(Property::single(id_def(), Value::String(id.to_string())).unwrap());
        object
    }

    #[test]
    fn test_depth() {
        let mut root = named("XuiCanvas", "root");
        assert_eq!(root.depth(), 1);

        let mut a = named("XuiScene", "a");
        a.children.push(named("XuiText", "a1"));
        root.children.push(a);
        root.children.push(named("XuiText", "b"));
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut root = named("XuiCanvas", "root");
        let mut a = named("XuiScene", "a");
        a.children.push(named("XuiText", "a1"));
        root.children.push(a);
        root.children.push(named("XuiText", "b"));

        let ids: Vec<_> = root.descendants().filter_map(UIObject::id).collect();
        assert_eq!(ids, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_find_child_by_id() {
        let mut root = UIObject::new(ROOT_CLASS);
        root.children.push(named("XuiText", "label"));
        assert!(root.is_canvas());
        assert_eq!(root.find_child_by_id("label").unwrap().class_name, "XuiText");
        assert!(root.find_child_by_id("missing").is_none());
    }

    #[test]
    fn test_strip_properties() {
        let mut root = named("XuiCanvas", "root");
        root.children.push(named("XuiText", "child"));
        root.strip_properties(&mut |d: &PropertyDefinition| d.name == ID_PROPERTY);
        assert!(root.properties.is_empty());
        assert!(root.children[0].properties.is_empty());
    }
}
