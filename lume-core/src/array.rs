//! Typed per-vertex attribute storage.
//!
//! [`ArrayData`] holds one `Vec<T>` per supported element type. Every
//! operation is written once against [`Element`] and dispatched over the
//! variants, so scalars and 2/3/4-component vectors share the same code.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LumeError, LumeResult};

/// Sentinel for "no target" entries in a partial index remapping.
pub const INVALID_INDEX: u32 = u32::MAX;

/// A numeric component of an attribute element.
pub trait Component: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Exact ordering. Floats treat `-0.0` and `0.0` as equal and fall back
    /// to `total_cmp` for NaN so the ordering stays total.
    fn compare(&self, other: &Self) -> Ordering;
}

macro_rules! impl_integer_component {
    ($($t:ty),*) => {
        $(impl Component for $t {
            #[inline]
            fn compare(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        })*
    };
}

macro_rules! impl_float_component {
    ($($t:ty),*) => {
        $(impl Component for $t {
            #[inline]
            fn compare(&self, other: &Self) -> Ordering {
                self.partial_cmp(other).unwrap_or_else(|| self.total_cmp(other))
            }
        })*
    };
}

impl_integer_component!(i8, u8, i16, u16, i32, u32);
impl_float_component!(f32, f64);

/// One value of an attribute array: a scalar or a fixed-size vector.
pub trait Element: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn compare(&self, other: &Self) -> Ordering;
}

macro_rules! impl_scalar_element {
    ($($t:ty),*) => {
        $(impl Element for $t {
            #[inline]
            fn compare(&self, other: &Self) -> Ordering {
                Component::compare(self, other)
            }
        })*
    };
}

impl_scalar_element!(i8, u8, i16, u16, i32, u32, f32, f64);

impl<C: Component, const N: usize> Element for [C; N] {
    #[inline]
    fn compare(&self, other: &Self) -> Ordering {
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| Component::compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

macro_rules! with_array {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Float($v) => $body,
            ArrayData::Vec2($v) => $body,
            ArrayData::Vec3($v) => $body,
            ArrayData::Vec4($v) => $body,
            ArrayData::Double($v) => $body,
            ArrayData::Vec2d($v) => $body,
            ArrayData::Vec3d($v) => $body,
            ArrayData::Vec4d($v) => $body,
            ArrayData::Byte($v) => $body,
            ArrayData::UByte($v) => $body,
            ArrayData::Short($v) => $body,
            ArrayData::UShort($v) => $body,
            ArrayData::Int($v) => $body,
            ArrayData::UInt($v) => $body,
            ArrayData::Vec2s($v) => $body,
            ArrayData::Vec3s($v) => $body,
            ArrayData::Vec4s($v) => $body,
            ArrayData::Vec4ub($v) => $body,
        }
    };
}

macro_rules! map_array {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Float($v) => ArrayData::Float($body),
            ArrayData::Vec2($v) => ArrayData::Vec2($body),
            ArrayData::Vec3($v) => ArrayData::Vec3($body),
            ArrayData::Vec4($v) => ArrayData::Vec4($body),
            ArrayData::Double($v) => ArrayData::Double($body),
            ArrayData::Vec2d($v) => ArrayData::Vec2d($body),
            ArrayData::Vec3d($v) => ArrayData::Vec3d($body),
            ArrayData::Vec4d($v) => ArrayData::Vec4d($body),
            ArrayData::Byte($v) => ArrayData::Byte($body),
            ArrayData::UByte($v) => ArrayData::UByte($body),
            ArrayData::Short($v) => ArrayData::Short($body),
            ArrayData::UShort($v) => ArrayData::UShort($body),
            ArrayData::Int($v) => ArrayData::Int($body),
            ArrayData::UInt($v) => ArrayData::UInt($body),
            ArrayData::Vec2s($v) => ArrayData::Vec2s($body),
            ArrayData::Vec3s($v) => ArrayData::Vec3s($body),
            ArrayData::Vec4s($v) => ArrayData::Vec4s($body),
            ArrayData::Vec4ub($v) => ArrayData::Vec4ub($body),
        }
    };
}

macro_rules! with_array_pair {
    ($lhs:expr, $rhs:expr, $a:ident, $b:ident => $body:expr, else $fallback:expr) => {
        match ($lhs, $rhs) {
            (ArrayData::Float($a), ArrayData::Float($b)) => $body,
            (ArrayData::Vec2($a), ArrayData::Vec2($b)) => $body,
            (ArrayData::Vec3($a), ArrayData::Vec3($b)) => $body,
            (ArrayData::Vec4($a), ArrayData::Vec4($b)) => $body,
            (ArrayData::Double($a), ArrayData::Double($b)) => $body,
            (ArrayData::Vec2d($a), ArrayData::Vec2d($b)) => $body,
            (ArrayData::Vec3d($a), ArrayData::Vec3d($b)) => $body,
            (ArrayData::Vec4d($a), ArrayData::Vec4d($b)) => $body,
            (ArrayData::Byte($a), ArrayData::Byte($b)) => $body,
            (ArrayData::UByte($a), ArrayData::UByte($b)) => $body,
            (ArrayData::Short($a), ArrayData::Short($b)) => $body,
            (ArrayData::UShort($a), ArrayData::UShort($b)) => $body,
            (ArrayData::Int($a), ArrayData::Int($b)) => $body,
            (ArrayData::UInt($a), ArrayData::UInt($b)) => $body,
            (ArrayData::Vec2s($a), ArrayData::Vec2s($b)) => $body,
            (ArrayData::Vec3s($a), ArrayData::Vec3s($b)) => $body,
            (ArrayData::Vec4s($a), ArrayData::Vec4s($b)) => $body,
            (ArrayData::Vec4ub($a), ArrayData::Vec4ub($b)) => $body,
            _ => $fallback,
        }
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArrayData {
    Float(Vec<f32>),
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
    Vec4(Vec<[f32; 4]>),
    Double(Vec<f64>),
    Vec2d(Vec<[f64; 2]>),
    Vec3d(Vec<[f64; 3]>),
    Vec4d(Vec<[f64; 4]>),
    Byte(Vec<i8>),
    UByte(Vec<u8>),
    Short(Vec<i16>),
    UShort(Vec<u16>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Vec2s(Vec<[i16; 2]>),
    Vec3s(Vec<[i16; 3]>),
    Vec4s(Vec<[i16; 4]>),
    Vec4ub(Vec<[u8; 4]>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Double,
    Vec2d,
    Vec3d,
    Vec4d,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Vec2s,
    Vec3s,
    Vec4s,
    Vec4ub,
}

fn gather_elements<T: Copy>(values: &[T], indices: &[u32]) -> Vec<T> {
    indices.iter().map(|&i| values[i as usize]).collect()
}

fn compact_elements<T: Copy>(values: &mut Vec<T>, keep: &[u32]) {
    // `keep` is ascending, so each slot is read before it can be overwritten.
    for (slot, &source) in keep.iter().enumerate() {
        if slot as u32 != source {
            values[slot] = values[source as usize];
        }
    }
    values.truncate(keep.len());
}

impl ArrayData {
    pub fn kind(&self) -> ArrayKind {
        match self {
            ArrayData::Float(_) => ArrayKind::Float,
            ArrayData::Vec2(_) => ArrayKind::Vec2,
            ArrayData::Vec3(_) => ArrayKind::Vec3,
            ArrayData::Vec4(_) => ArrayKind::Vec4,
            ArrayData::Double(_) => ArrayKind::Double,
            ArrayData::Vec2d(_) => ArrayKind::Vec2d,
            ArrayData::Vec3d(_) => ArrayKind::Vec3d,
            ArrayData::Vec4d(_) => ArrayKind::Vec4d,
            ArrayData::Byte(_) => ArrayKind::Byte,
            ArrayData::UByte(_) => ArrayKind::UByte,
            ArrayData::Short(_) => ArrayKind::Short,
            ArrayData::UShort(_) => ArrayKind::UShort,
            ArrayData::Int(_) => ArrayKind::Int,
            ArrayData::UInt(_) => ArrayKind::UInt,
            ArrayData::Vec2s(_) => ArrayKind::Vec2s,
            ArrayData::Vec3s(_) => ArrayKind::Vec3s,
            ArrayData::Vec4s(_) => ArrayKind::Vec4s,
            ArrayData::Vec4ub(_) => ArrayKind::Vec4ub,
        }
    }

    pub fn len(&self) -> usize {
        with_array!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compares the elements stored at `lhs` and `rhs`.
    pub fn compare(&self, lhs: usize, rhs: usize) -> Ordering {
        with_array!(self, v => Element::compare(&v[lhs], &v[rhs]))
    }

    /// New array of the same kind holding `self[i]` for each `i` in `indices`.
    pub fn gather(&self, indices: &[u32]) -> ArrayData {
        map_array!(self, v => gather_elements(v, indices))
    }

    /// Keeps only the elements listed in `keep`, in that order.
    /// `keep` must be strictly ascending.
    pub fn compact(&mut self, keep: &[u32]) {
        with_array!(self, v => compact_elements(v, keep))
    }

    pub fn truncate(&mut self, len: usize) {
        with_array!(self, v => v.truncate(len))
    }

    /// An empty array of the same kind.
    pub fn empty_like(&self) -> ArrayData {
        map_array!(self, _v => Vec::new())
    }

    /// New array of the same kind holding `count` copies of `self[index]`.
    pub fn repeat(&self, index: usize, count: usize) -> ArrayData {
        map_array!(self, v => vec![v[index]; count])
    }

    /// Appends `count` copies of `source[index]`.
    pub fn extend_repeat(&mut self, source: &ArrayData, index: usize, count: usize) -> LumeResult<()> {
        let expected = self.kind();
        let actual = source.kind();
        with_array_pair!(self, source, dst, src => {
            let value = src[index];
            dst.extend(std::iter::repeat(value).take(count));
            Ok(())
        }, else Err(LumeError::ArrayKindMismatch { expected, actual }))
    }

    /// Appends `source[index]` and returns the new element's index.
    pub fn push_from(&mut self, source: &ArrayData, index: usize) -> LumeResult<u32> {
        self.extend_repeat(source, index, 1)?;
        Ok(self.len() as u32 - 1)
    }

    pub fn as_vec2(&self) -> Option<&[[f32; 2]]> {
        match self {
            ArrayData::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<&[[f32; 3]]> {
        match self {
            ArrayData::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3_mut(&mut self) -> Option<&mut Vec<[f32; 3]>> {
        match self {
            ArrayData::Vec3(v) => Some(v),
            _ => None,
        }
    }
}
