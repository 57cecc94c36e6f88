//! Deduplicated value pools.
//!
//! Each pool section is a list of encoded values of one type. Values are
//! deduplicated by their encoded bytes, so two values share an entry exactly
//! when their bit patterns match, and entries keep first-insertion order.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use xurkit_common::{BinaryReader, BinaryWriter};
use xurkit_model::{BezierPoint, Figure, Quat, Vec2, Vec3};

use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A value that can live in a pool section.
pub trait PoolEntry: Sized {
    /// Pool name, for diagnostics.
    const POOL: &'static str;

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()>;

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self>;
}

impl PoolEntry for String {
    const POOL: &'static str = "string";

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()> {
        Ok(writer.write_utf16_prefixed(self)?)
    }

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(reader.read_utf16_prefixed()?)
    }
}

impl PoolEntry for f32 {
    const POOL: &'static str = "float";

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_f32(*self);
        Ok(())
    }

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(reader.read_f32()?)
    }
}

/// Colours are stored as packed ARGB.
impl PoolEntry for u32 {
    const POOL: &'static str = "colour";

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u32(*self);
        Ok(())
    }

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(reader.read_u32()?)
    }
}

impl PoolEntry for Vec3 {
    const POOL: &'static str = "vector";

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()> {
        for v in self.to_array() {
            writer.write_f32(v);
        }
        Ok(())
    }

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Vec3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?))
    }
}

impl PoolEntry for Quat {
    const POOL: &'static str = "quaternion";

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()> {
        for v in self.to_array() {
            writer.write_f32(v);
        }
        Ok(())
    }

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let x = reader.read_f32()?;
        let y = reader.read_f32()?;
        let z = reader.read_f32()?;
        let w = reader.read_f32()?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }
}

impl PoolEntry for Figure {
    const POOL: &'static str = "figure";

    fn encode(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_f32(self.bounds.x);
        writer.write_f32(self.bounds.y);
        let count = u32::try_from(self.points.len()).map_err(|_| Error::Overflow("figure point count"))?;
        writer.write_u32(count);
        for p in &self.points {
            for v in [p.point, p.ctrl1, p.ctrl2] {
                writer.write_f32(v.x);
                writer.write_f32(v.y);
            }
            writer.write_u8(p.smoothing);
        }
        Ok(())
    }

    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let bounds = read_vec2(reader)?;
        let count = reader.read_u32()? as usize;

        // Each point is 25 bytes; reject counts the section cannot hold.
        if count > reader.remaining() / 25 {
            return Err(xurkit_common::Error::UnexpectedEof {
                needed: count.saturating_mul(25),
                available: reader.remaining(),
            }
            .into());
        }

        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(BezierPoint {
                point: read_vec2(reader)?,
                ctrl1: read_vec2(reader)?,
                ctrl2: read_vec2(reader)?,
                smoothing: reader.read_u8()?,
            });
        }
        Ok(Figure { bounds, points })
    }
}

fn read_vec2(reader: &mut BinaryReader<'_>) -> Result<Vec2> {
    Ok(Vec2::new(reader.read_f32()?, reader.read_f32()?))
}

/// Write-side pool: an order-preserving set of encoded values.
#[derive(Debug)]
pub struct Pool<T> {
    data: BinaryWriter,
    index: FxHashMap<Vec<u8>, u32>,
    _entries: std::marker::PhantomData<T>,
}

impl<T: PoolEntry> Pool<T> {
    pub fn new() -> Self {
        Self {
            data: BinaryWriter::new(),
            index: FxHashMap::default(),
            _entries: std::marker::PhantomData,
        }
    }

    /// Insert a value, returning its index. Equal values share one entry.
    pub fn insert(&mut self, value: &T) -> Result<u32> {
        let key = encode_key(value)?;
        if let Some(&index) = self.index.get(&key) {
            return Ok(index);
        }
        let index = u32::try_from(self.index.len()).map_err(|_| Error::Overflow(T::POOL))?;
        self.data.write_bytes(&key);
        self.index.insert(key, index);
        Ok(index)
    }

    /// Index of a value already in the pool.
    pub fn index_of(&self, value: &T) -> Result<u32> {
        let key = encode_key(value)?;
        self.index.get(&key).copied().ok_or_else(|| {
            Error::InvalidValue(format!("{} value missing from its pool", T::POOL))
        })
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The section payload: entries in insertion order.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }
}

impl<T: PoolEntry> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_key<T: PoolEntry>(value: &T) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new();
    value.encode(&mut writer)?;
    Ok(writer.into_inner())
}

/// Decode a pool section: entries back to back until the reader is exhausted.
pub fn read_entries<T: PoolEntry>(reader: &mut BinaryReader<'_>) -> Result<Vec<T>> {
    let mut entries = Vec::new();
    while !reader.is_empty() {
        entries.push(T::decode(reader)?);
    }
    Ok(entries)
}

/// Look up a pool entry, failing on an out-of-range reference.
pub fn lookup<T: PoolEntry>(entries: &[T], index: u32) -> Result<&T> {
    entries.get(index as usize).ok_or(Error::PoolIndex {
        pool: T::POOL,
        index,
        len: entries.len(),
    })
}
