//! Single-file and batch conversion.

use std::fs;
use std::hash::BuildHasherDefault;
use std::path::{Path, PathBuf};

use hashbrown::HashSet as FastHashSet;
use rustc_hash::FxHasher;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;
use xurkit_model::UIObject;
use xurkit_schema::SchemaGroup;
use xurkit_xui::{XuiReader, XuiWriter};
use xurkit_xur::{XurReader, XurWriteOptions, XurWriter};

use crate::format::{detect_format, is_convertible, FileFormat};
use crate::{Error, Result};

type FxHashSet<T> = FastHashSet<T, BuildHasherDefault<FxHasher>>;

/// Running tally of a batch conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStatus {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// What the batch is doing right now.
    pub description: String,
}

impl BatchStatus {
    /// Files handled so far, whatever the outcome.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.processed() == self.total
    }
}

/// Receives batch progress after every file.
pub trait ProgressSink {
    fn report(&mut self, status: &BatchStatus);
}

impl<F: FnMut(&BatchStatus)> ProgressSink for F {
    fn report(&mut self, status: &BatchStatus) {
        self(status)
    }
}

/// Converts documents between XUI and the XUR versions using one schema group.
pub struct Converter<'g> {
    group: &'g SchemaGroup,
    xur_options: XurWriteOptions,
}

impl<'g> Converter<'g> {
    pub fn new(group: &'g SchemaGroup) -> Self {
        Self {
            group,
            xur_options: XurWriteOptions::default(),
        }
    }

    /// Set the count-header and tool-version options for XUR output.
    ///
    /// The wire version always follows the target format.
    pub fn with_xur_options(mut self, options: XurWriteOptions) -> Self {
        self.xur_options = options;
        self
    }

    /// Decode a document in any supported format.
    pub fn decode(&self, path: impl AsRef<Path>) -> Result<UIObject> {
        let path = path.as_ref();
        match detect_format(path)? {
            FileFormat::Xui => Ok(XuiReader::new(self.group).read_file(path)?),
            FileFormat::Xur5 | FileFormat::Xur8 => Ok(XurReader::new(self.group).read_file(path)?.root),
        }
    }

    /// Encode a tree in `target` format.
    pub fn encode(&self, root: &UIObject, target: FileFormat, out_path: impl AsRef<Path>) -> Result<()> {
        match target.xur_version() {
            None => XuiWriter::write_file(root, out_path)?,
            Some(version) => {
                let options = XurWriteOptions {
                    version,
                    ..self.xur_options
                };
                XurWriter::new(self.group, options).write_file(root, out_path)?;
            }
        }
        Ok(())
    }

    /// Convert one file.
    ///
    /// A file already in the target format is copied byte for byte.
    pub fn convert(&self, path: impl AsRef<Path>, target: FileFormat, out_path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let out_path = out_path.as_ref();
        let source = detect_format(path)?;

        if source == target {
            if same_file(path, out_path) {
                debug!("{} is already {}", path.display(), target);
                return Ok(());
            }
            fs::copy(path, out_path)?;
        } else {
            let root = self.decode(path)?;
            self.encode(&root, target, out_path)?;
        }

        debug!("converted {} ({}) -> {} ({})", path.display(), source, out_path.display(), target);
        Ok(())
    }

    /// Convert every `.xui` and `.xur` file directly inside `dir` into `out_dir`.
    ///
    /// Each file is converted independently; a failure is logged and counted
    /// and the batch moves on. The sink sees the status after every file.
    pub fn mass_convert(
        &self,
        dir: impl AsRef<Path>,
        target: FileFormat,
        out_dir: impl AsRef<Path>,
        sink: Option<&mut dyn ProgressSink>,
    ) -> Result<BatchStatus> {
        let entries = scan_directory(dir)?;
        self.convert_entries(&entries, target, out_dir, sink)
    }

    /// Convert entries listed by [`scan_directory`] into `out_dir`.
    ///
    /// Outputs are named after their input with the target's extension. When
    /// two inputs map to the same output, the first in file-name order is
    /// converted and the later one fails. Unreadable entries count as failures.
    pub fn convert_entries(
        &self,
        entries: &[BatchEntry],
        target: FileFormat,
        out_dir: impl AsRef<Path>,
        mut sink: Option<&mut dyn ProgressSink>,
    ) -> Result<BatchStatus> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)?;

        let mut status = BatchStatus {
            total: entries.len(),
            description: format!("converting {} files to {}", entries.len(), target),
            ..BatchStatus::default()
        };
        info!("{}", status.description);

        let mut claimed = FxHashSet::default();
        for entry in entries {
            match entry {
                BatchEntry::File(file) => {
                    let file_name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    let out_path = out_dir.join(&file_name).with_extension(target.extension());

                    let result = if claimed.insert(out_path.clone()) {
                        self.convert(file, target, &out_path)
                    } else {
                        Err(Error::OutputCollision(out_path))
                    };

                    match result {
                        Ok(()) => {
                            status.succeeded += 1;
                            status.description = format!("converted {}", file_name);
                        }
                        Err(e) => {
                            error!("failed to convert {}: {}", file.display(), e);
                            status.failed += 1;
                            status.description = format!("failed {}: {}", file_name, e);
                        }
                    }
                }
                BatchEntry::Unreadable(e) => {
                    error!("skipping unreadable entry: {}", e);
                    status.failed += 1;
                    status.description = format!("unreadable entry: {}", e);
                }
            }

            if let Some(sink) = sink.as_mut() {
                sink.report(&status);
            }
        }

        status.description = format!(
            "converted {} of {} files ({} failed)",
            status.succeeded, status.total, status.failed
        );
        info!("{}", status.description);
        Ok(status)
    }
}

/// A directory entry picked up for batch conversion.
#[derive(Debug)]
pub enum BatchEntry {
    /// A `.xui` or `.xur` file.
    File(PathBuf),
    /// An entry the directory walk could not read.
    Unreadable(walkdir::Error),
}

/// List the convertible files directly inside `dir`, in file-name order.
///
/// Entries that cannot be read are kept as [`BatchEntry::Unreadable`] so a
/// batch can count them without stopping.
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<BatchEntry>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_convertible(entry.path()) => {
                entries.push(BatchEntry::File(entry.into_path()));
            }
            Ok(_) => {}
            Err(e) if e.path().map_or(true, is_convertible) => {
                warn!("cannot read entry in {}: {}", dir.display(), e);
                entries.push(BatchEntry::Unreadable(e));
            }
            Err(e) => debug!("ignoring unreadable entry: {}", e),
        }
    }
    Ok(entries)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
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
    <Property Id="1" Name="Width" Type="float" Default="60"/>
    <Property Id="2" Name="Height" Type="float" Default="30"/>
    <Property Id="3" Name="Position" Type="vector"/>
  </Class>
  <Class Name="XuiCanvas" BaseClassName="XuiElement"/>
  <Class Name="XuiText" BaseClassName="XuiElement">
    <Property Id="10" Name="Text" Type="string"/>
  </Class>
</XuiSchema>"#;

    const SCENE: &str = r#"<XuiCanvas version="000c">
  <Properties>
    <Width>640</Width>
    <Height>480</Height>
  </Properties>
  <XuiText>
    <Properties>
      <Id>Title</Id>
      <Position>10.000000,20.000000,0.000000</Position>
      <Text>Hello</Text>
    </Properties>
  </XuiText>
  <Timelines>
    <NamedFrames>
      <NamedFrame>
        <Name>start</Name>
        <Time>0</Time>
        <Command>play</Command>
      </NamedFrame>
    </NamedFrames>
    <Timeline>
      <Id>Title</Id>
      <TimelineProp>Width</TimelineProp>
      <KeyFrame>
        <Time>0</Time>
        <Interpolation>0</Interpolation>
        <EaseIn>0</EaseIn>
        <EaseOut>0</EaseOut>
        <EaseScale>0</EaseScale>
        <Prop>10</Prop>
      </KeyFrame>
      <KeyFrame>
        <Time>20</Time>
        <Interpolation>2</Interpolation>
        <EaseIn>-100</EaseIn>
        <EaseOut>0</EaseOut>
        <EaseScale>0</EaseScale>
        <Prop>100</Prop>
      </KeyFrame>
    </Timeline>
  </Timelines>
</XuiCanvas>
"#;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register_source("xui", "elements.xml", SCHEMA).unwrap();
        registry.set_current_group("xui");
        registry
    }

    #[test]
    fn test_same_format_is_byte_copy() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scene.xui");
        let output = dir.path().join("copy.xui");
        fs::write(&input, SCENE).unwrap();

        converter.convert(&input, FileFormat::Xui, &output).unwrap();
        assert_eq!(fs::read(&output).unwrap(), SCENE.as_bytes());

        // Converting onto itself leaves the file alone.
        converter.convert(&input, FileFormat::Xui, &input).unwrap();
        assert_eq!(fs::read(&input).unwrap(), SCENE.as_bytes());
    }

    #[test]
    fn test_convert_through_both_xur_versions() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scene.xui");
        fs::write(&input, SCENE).unwrap();
        let original = converter.decode(&input).unwrap();

        let v8 = dir.path().join("scene8.xur");
        let v5 = dir.path().join("scene5.xur");
        let back = dir.path().join("back.xui");
        converter.convert(&input, FileFormat::Xur8, &v8).unwrap();
        converter.convert(&v8, FileFormat::Xur5, &v5).unwrap();
        converter.convert(&v5, FileFormat::Xui, &back).unwrap();

        assert_eq!(detect_format(&v8).unwrap(), FileFormat::Xur8);
        assert_eq!(detect_format(&v5).unwrap(), FileFormat::Xur5);
        assert_eq!(converter.decode(&back).unwrap(), original);
    }

    #[test]
    fn test_invalid_root_produces_no_output() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("text.xui");
        let output = dir.path().join("text.xur");
        fs::write(&input, "<XuiText><Properties><Text>Hi</Text></Properties></XuiText>").unwrap();

        let result = converter.convert(&input, FileFormat::Xur8, &output);
        assert!(matches!(result, Err(Error::Xur(xurkit_xur::Error::InvalidRoot(_)))));
        assert!(!output.exists());
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.xui"), SCENE).unwrap();
        fs::write(dir.path().join("b.xui"), "<XuiCanvas><XuiBogus/></XuiCanvas>").unwrap();
        fs::write(dir.path().join("c.xui"), SCENE).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a document").unwrap();

        let mut reports = Vec::new();
        let mut sink = |status: &BatchStatus| reports.push(status.clone());
        let status = converter
            .mass_convert(dir.path(), FileFormat::Xur5, &out, Some(&mut sink as &mut dyn ProgressSink))
            .unwrap();

        assert_eq!((status.total, status.succeeded, status.failed), (3, 2, 1));
        assert!(status.is_complete());
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].failed, 1);
        assert!(out.join("a.xur").exists());
        assert!(!out.join("b.xur").exists());
        assert!(out.join("c.xur").exists());
    }

    #[test]
    fn test_batch_requires_directory() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let result = converter.mass_convert(dir.path().join("nope"), FileFormat::Xui, dir.path(), None);
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[test]
    fn test_same_format_xur5_is_identical() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scene.xui");
        let v5 = dir.path().join("scene.xur");
        let copy = dir.path().join("copy.xur");
        let reencoded = dir.path().join("reencoded.xur");
        fs::write(&input, SCENE).unwrap();
        converter.convert(&input, FileFormat::Xur5, &v5).unwrap();

        converter.convert(&v5, FileFormat::Xur5, &copy).unwrap();
        assert_eq!(fs::read(&copy).unwrap(), fs::read(&v5).unwrap());

        let root = converter.decode(&v5).unwrap();
        converter.encode(&root, FileFormat::Xur5, &reencoded).unwrap();
        assert_eq!(fs::read(&reencoded).unwrap(), fs::read(&v5).unwrap());
    }

    #[test]
    fn test_batch_output_collision_fails_later_file() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let scene = dir.path().join("a.xui");
        fs::write(&scene, SCENE).unwrap();
        let empty = dir.path().join("empty.xui");
        fs::write(&empty, "<XuiCanvas/>").unwrap();
        converter.convert(&empty, FileFormat::Xur8, dir.path().join("a.xur")).unwrap();
        fs::remove_file(&empty).unwrap();

        let status = converter.mass_convert(dir.path(), FileFormat::Xur5, &out, None).unwrap();
        assert_eq!((status.total, status.succeeded, status.failed), (2, 1, 1));

        // a.xui sorts first and owns the output.
        let written = converter.decode(out.join("a.xur")).unwrap();
        assert_eq!(written, converter.decode(&scene).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_counts_unreadable_entries() {
        let registry = registry();
        let converter = Converter::new(registry.current_group());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::write(dir.path().join("a.xui"), SCENE).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.xui"), dir.path().join("broken.xui")).unwrap();

        let entries = scan_directory(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[1], BatchEntry::Unreadable(_)));

        let status = converter
            .convert_entries(&entries, FileFormat::Xur8, &out, None)
            .unwrap();
        assert_eq!((status.total, status.succeeded, status.failed), (2, 1, 1));
        assert!(out.join("a.xur").exists());
    }
}
