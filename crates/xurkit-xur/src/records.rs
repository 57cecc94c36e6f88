//! Version 8 keyframe and named-frame tables.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use xurkit_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A `KEYD` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeRecord {
    pub frame: u32,
    pub interpolation: u8,
    pub ease_in: u8,
    pub ease_out: u8,
    pub ease_scale: u8,
    /// Index of the keyframe's first value reference in `KEYP`.
    pub first_value: u32,
}

impl KeyframeRecord {
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.frame);
        writer.write_u8(self.interpolation);
        writer.write_u8(self.ease_in);
        writer.write_u8(self.ease_out);
        writer.write_u8(self.ease_scale);
        writer.write_packed(self.first_value);
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            frame: reader.read_u32()?,
            interpolation: reader.read_u8()?,
            ease_in: reader.read_u8()?,
            ease_out: reader.read_u8()?,
            ease_scale: reader.read_u8()?,
            first_value: reader.read_packed()?,
        })
    }
}

/// A named frame as stored on the wire; names and targets are string references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedFrameRecord {
    pub name: u32,
    pub frame: u32,
    pub command: u8,
    /// Zero when the command has no target.
    pub target: u32,
}

impl NamedFrameRecord {
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_packed(self.name);
        writer.write_u32(self.frame);
        writer.write_u8(self.command);
        writer.write_packed(self.target);
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            name: reader.read_packed()?,
            frame: reader.read_u32()?,
            command: reader.read_u8()?,
            target: reader.read_packed()?,
        })
    }
}

/// Decode a table section until the reader is exhausted.
pub fn read_records<T>(
    reader: &mut BinaryReader<'_>,
    read: impl Fn(&mut BinaryReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    while !reader.is_empty() {
        records.push(read(reader)?);
    }
    Ok(records)
}

/// Slice `count` records starting at `base`, failing when the run leaves the table.
pub fn run<'a, T>(table: &'a [T], pool: &'static str, base: u32, count: usize) -> Result<&'a [T]> {
    let start = base as usize;
    start
        .checked_add(count)
        .and_then(|end| table.get(start..end))
        .ok_or(Error::PoolIndex {
            pool,
            index: base.saturating_add(u32::try_from(count).unwrap_or(u32::MAX)),
            len: table.len(),
        })
}

/// The `NAMD` table being built by one write.
///
/// Objects with identical named-frame sequences share one run; the lookup
/// of already-emitted runs lives only as long as the table.
#[derive(Debug, Default)]
pub struct NamedFrameTable {
    records: Vec<NamedFrameRecord>,
    runs: FxHashMap<Vec<NamedFrameRecord>, u32>,
}

impl NamedFrameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sequence and return its base index, reusing an identical earlier run.
    pub fn claim(&mut self, sequence: Vec<NamedFrameRecord>) -> Result<u32> {
        if sequence.is_empty() {
            return Ok(0);
        }
        if let Some(&base) = self.runs.get(&sequence) {
            return Ok(base);
        }
        let base = u32::try_from(self.records.len()).map_err(|_| Error::Overflow("named frame table"))?;
        self.records.extend_from_slice(&sequence);
        self.runs.insert(sequence, base);
        Ok(base)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        for record in &self.records {
            record.write(writer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: u32, frame: u32) -> NamedFrameRecord {
        NamedFrameRecord {
            name,
            frame,
            command: 0,
            target: 0,
        }
    }

    #[test]
    fn test_identical_sequences_share_a_run() {
        let mut table = NamedFrameTable::new();
        let a = table.claim(vec![record(1, 0), record(2, 10)]).unwrap();
        let b = table.claim(vec![record(3, 0)]).unwrap();
        let c = table.claim(vec![record(1, 0), record(2, 10)]).unwrap();
        assert_eq!((a, b, c), (0, 2, 0));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_records_round_trip_through_section() {
        let mut table = NamedFrameTable::new();
        table.claim(vec![record(1, 5), record(2, 0x1_0000)]).unwrap();
        let mut writer = BinaryWriter::new();
        table.write(&mut writer);

        let mut reader = BinaryReader::new(writer.as_bytes());
        let records = read_records(&mut reader, NamedFrameRecord::read).unwrap();
        assert_eq!(records, [record(1, 5), record(2, 0x1_0000)]);
        assert!(run(&records, "named frame", 1, 2).is_err());
        assert_eq!(run(&records, "named frame", 1, 1).unwrap().len(), 1);
    }
}
