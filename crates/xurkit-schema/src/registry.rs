//! Schema registry.
//!
//! Holds named groups of loaded schema files. One group is current at a time;
//! codecs receive the group they should resolve against as an explicit
//! `&SchemaGroup` argument.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use tracing::{debug, info};

use crate::loader::{self, IgnoreEntry, SchemaFile};
use crate::{Class, Error, PropertyDefinition, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Name of the group that exists in every registry.
pub const DEFAULT_GROUP: &str = "default";

/// A named set of loaded schema files.
#[derive(Debug, Clone, Default)]
pub struct SchemaGroup {
    name: String,
    files: Vec<SchemaFile>,
}

impl SchemaGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loaded files, in registration order.
    pub fn files(&self) -> &[SchemaFile] {
        &self.files
    }

    /// Iterate over every class in the group.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<Class>> {
        self.files.iter().flat_map(|f| f.classes.iter())
    }

    /// Find a class by name; the first registered file wins.
    pub fn find_class(&self, name: &str) -> Option<&Arc<Class>> {
        self.files.iter().find_map(|f| f.find_class(name))
    }

    /// Resolve the class hierarchy of `name`, root class first.
    ///
    /// Fails when a base-class link cannot be resolved or the links loop.
    pub fn class_hierarchy(&self, name: &str) -> Result<Vec<Arc<Class>>> {
        walk_hierarchy(name, |n| self.find_class(n))
    }

    /// Check whether a definition is on the group's ignore list.
    pub fn is_property_ignored(&self, definition: &PropertyDefinition) -> Result<bool> {
        if self.find_class(&definition.class_name).is_none() {
            return Err(Error::UnknownClass(definition.class_name.clone()));
        }
        Ok(self.ignores().any(|entry| {
            entry.class == definition.class_name && entry.property == definition.name
        }))
    }

    fn ignores(&self) -> impl Iterator<Item = &IgnoreEntry> {
        self.files.iter().flat_map(|f| f.ignores.iter())
    }

    fn contains_path(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// Check a staged file against the group; nothing is modified.
    fn validate(&self, staged: &SchemaFile) -> Result<()> {
        for class in &staged.classes {
            if self.find_class(&class.name).is_some() {
                return Err(Error::DuplicateClass(class.name.clone()));
            }
        }

        let lookup = |name: &str| staged.find_class(name).or_else(|| self.find_class(name));

        let mut seen: Vec<&IgnoreEntry> = self.ignores().collect();
        for entry in &staged.ignores {
            if seen.contains(&entry) {
                return Err(Error::DuplicateIgnore {
                    class: entry.class.clone(),
                    property: entry.property.clone(),
                });
            }
            let declared = lookup(&entry.class)
                .map(|class| class.find_property(&entry.property).is_some())
                .unwrap_or(false);
            if !declared {
                return Err(Error::UnknownIgnoreTarget {
                    class: entry.class.clone(),
                    property: entry.property.clone(),
                });
            }
            seen.push(entry);
        }

        for class in &staged.classes {
            let hierarchy = match walk_hierarchy(&class.name, lookup) {
                Ok(hierarchy) => hierarchy,
                // Custom classes may arrive with a later file.
                Err(Error::MissingBaseClass { .. }) => continue,
                Err(e) => return Err(e),
            };
            check_unique_ids(&class.name, &hierarchy)?;
        }

        Ok(())
    }
}

/// Walk base-class links from `name` up to the root and return root-first.
fn walk_hierarchy<'a>(
    name: &str,
    lookup: impl Fn(&str) -> Option<&'a Arc<Class>>,
) -> Result<Vec<Arc<Class>>> {
    let mut chain: Vec<Arc<Class>> = Vec::new();
    let mut current = lookup(name).ok_or_else(|| Error::UnknownClass(name.to_string()))?;

    loop {
        if chain.iter().any(|c| c.name == current.name) {
            return Err(Error::HierarchyCycle(name.to_string()));
        }
        chain.push(Arc::clone(current));

        let Some(base) = current.base.as_deref() else {
            break;
        };
        current = lookup(base).ok_or_else(|| Error::MissingBaseClass {
            class: current.name.clone(),
            base: base.to_string(),
        })?;
    }

    chain.reverse();
    Ok(chain)
}

fn check_unique_ids(class: &str, hierarchy: &[Arc<Class>]) -> Result<()> {
    let mut ids: Vec<u32> = Vec::new();
    for property in hierarchy.iter().flat_map(|c| c.properties.iter()) {
        if ids.contains(&property.id) {
            return Err(Error::DuplicatePropertyId {
                class: class.to_string(),
                id: property.id,
            });
        }
        ids.push(property.id);
    }
    Ok(())
}

/// Registry of schema groups.
///
/// Registration takes `&mut self` and lookups take `&self`, so a registry
/// shared between conversions is only ever mutated while no lookup runs.
///
/// # Example
///
/// ```no_run
/// use xurkit_schema::SchemaRegistry;
///
/// let mut registry = SchemaRegistry::new();
/// registry.register_group("xui", "schemas/XuiElements.xml")?;
/// registry.set_current_group("xui");
///
/// let hierarchy = registry.current_group().class_hierarchy("XuiButton")?;
/// println!("root class: {}", hierarchy[0].name);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    groups: FxHashMap<String, SchemaGroup>,
    current: String,
}

impl SchemaRegistry {
    /// Create a registry holding only the empty default group.
    pub fn new() -> Self {
        let mut groups = FxHashMap::default();
        groups.insert(DEFAULT_GROUP.to_string(), SchemaGroup::new(DEFAULT_GROUP));
        Self {
            groups,
            current: DEFAULT_GROUP.to_string(),
        }
    }

    /// Load a schema file into `group`, creating the group if needed.
    ///
    /// The file is committed only if it passes every consistency check;
    /// registering a path the group already holds is a no-op.
    pub fn register_group(&mut self, group: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        if self.groups.get(group).is_some_and(|g| g.contains_path(&canonical)) {
            debug!("schema {} already registered in group '{}'", canonical.display(), group);
            return Ok(());
        }

        let staged = loader::load_file(&canonical)?;
        self.commit(group, staged)
    }

    /// Register schema text that did not come from disk.
    ///
    /// `origin` names the source and anchors relative includes.
    pub fn register_source(&mut self, group: &str, origin: impl Into<PathBuf>, text: &str) -> Result<()> {
        let origin = origin.into();
        if self.groups.get(group).is_some_and(|g| g.contains_path(&origin)) {
            return Ok(());
        }
        let staged = loader::load_source(&origin, text)?;
        self.commit(group, staged)
    }

    fn commit(&mut self, group: &str, staged: SchemaFile) -> Result<()> {
        let target = self
            .groups
            .entry(group.to_string())
            .or_insert_with(|| SchemaGroup::new(group));
        target.validate(&staged)?;

        info!(
            "registered {} classes from {} into group '{}'",
            staged.classes.len(),
            staged.path.display(),
            group
        );
        target.files.push(staged);
        Ok(())
    }

    /// Make `name` the current group, creating it if it does not exist.
    pub fn set_current_group(&mut self, name: &str) {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| SchemaGroup::new(name));
        self.current = name.to_string();
    }

    /// Name of the current group.
    pub fn current_group_name(&self) -> &str {
        &self.current
    }

    /// The current group.
    pub fn current_group(&self) -> &SchemaGroup {
        // The current group is inserted before it becomes current and groups are never removed.
        &self.groups[self.current.as_str()]
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&SchemaGroup> {
        self.groups.get(name)
    }

    /// Find a class in the current group.
    pub fn find_class(&self, name: &str) -> Option<&Arc<Class>> {
        self.current_group().find_class(name)
    }

    /// Resolve a class hierarchy in the current group, root first.
    pub fn class_hierarchy(&self, name: &str) -> Result<Vec<Arc<Class>>> {
        self.current_group().class_hierarchy(name)
    }

    /// Check a definition against the current group's ignore list.
    pub fn is_property_ignored(&self, definition: &PropertyDefinition) -> Result<bool> {
        self.current_group().is_property_ignored(definition)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
