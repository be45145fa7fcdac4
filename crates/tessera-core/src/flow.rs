//! Multi-channel sample buffers passed between flow pins.
//!
//! [`FlowData`] stores each channel as raw bytes sized
//! `num_samples × sample_type.size()`. Every channel shares the same sample
//! count and element size. Consumers that want a different element type use
//! [`FlowData::view`], which converts into an internal scratch buffer when
//! the types differ, or the typed helpers [`read_samples`](FlowData::read_samples)
//! and [`write_samples`](FlowData::write_samples).
//!
//! Asking for a channel that does not exist panics. Channel layout is set up
//! by the producing node; a consumer requesting an unknown id is a bug.
//!
//! ```rust
//! use tessera_core::{FlowData, FlowKind, SampleType};
//!
//! let mut data = FlowData::new(FlowKind::Audio, SampleType::I16);
//! data.set_num_samples(4);
//! data.write_samples(0, &[0i16, 100, -100, 32767]);
//!
//! let as_f32 = data.read_samples::<f32>(0);
//! assert_eq!(as_f32, vec![0.0, 100.0, -100.0, 32767.0]);
//! assert_eq!(data.view(SampleType::F32, 0).len(), 16);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::handle::Handle;

/// Shared handle to a [`FlowData`] buffer.
pub type FlowHandle = Handle<FlowData>;

/// What a flow buffer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowKind {
    /// Sample-rate control signals.
    Control,
    /// Audio signals.
    #[default]
    Audio,
    /// Anything else.
    Data,
}

/// Logical element type of every sample in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleType {
    /// 32-bit float.
    #[default]
    F32,
    /// 64-bit float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 16-bit signed integer.
    I16,
    /// 8-bit unsigned integer.
    U8,
}

impl SampleType {
    /// Element size in bytes.
    pub const fn size(self) -> usize {
        match self {
            SampleType::F32 | SampleType::I32 => 4,
            SampleType::F64 => 8,
            SampleType::I16 => 2,
            SampleType::U8 => 1,
        }
    }

    fn read_f64(self, bytes: &[u8]) -> f64 {
        match self {
            SampleType::F32 => f32::read_ne(bytes).to_f64(),
            SampleType::F64 => f64::read_ne(bytes).to_f64(),
            SampleType::I32 => i32::read_ne(bytes).to_f64(),
            SampleType::I16 => i16::read_ne(bytes).to_f64(),
            SampleType::U8 => u8::read_ne(bytes).to_f64(),
        }
    }

    fn write_f64(self, out: &mut [u8], value: f64) {
        match self {
            SampleType::F32 => f32::from_f64(value).write_ne(out),
            SampleType::F64 => f64::from_f64(value).write_ne(out),
            SampleType::I32 => i32::from_f64(value).write_ne(out),
            SampleType::I16 => i16::from_f64(value).write_ne(out),
            SampleType::U8 => u8::from_f64(value).write_ne(out),
        }
    }
}

/// Rust element types storable in a [`FlowData`] channel.
///
/// Conversions between element types are plain numeric casts through `f64`;
/// integer targets saturate.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// The matching [`SampleType`].
    const TYPE: SampleType;
    /// Widen to `f64`.
    fn to_f64(self) -> f64;
    /// Narrow from `f64`.
    fn from_f64(value: f64) -> Self;
    /// Decode from native-endian bytes.
    fn read_ne(bytes: &[u8]) -> Self;
    /// Encode as native-endian bytes.
    fn write_ne(self, out: &mut [u8]);
}

macro_rules! impl_sample {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Sample for $ty {
                const TYPE: SampleType = SampleType::$variant;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                #[inline]
                fn read_ne(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; core::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..core::mem::size_of::<$ty>()]);
                    <$ty>::from_ne_bytes(buf)
                }

                #[inline]
                fn write_ne(self, out: &mut [u8]) {
                    out[..core::mem::size_of::<$ty>()].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_sample!(f32 => F32, f64 => F64, i32 => I32, i16 => I16, u8 => U8);

/// Bitflag set describing buffer contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlowFlags(u32);

impl FlowFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Every channel holds zeros.
    pub const SILENT: Self = Self(1 << 0);
    /// The stream restarted; stateful consumers should reset.
    pub const DISCONTINUITY: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `self` with the bits in `other` cleared.
    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

/// Multi-channel raw sample buffer.
#[derive(Clone, Default)]
pub struct FlowData {
    kind: FlowKind,
    sample_type: SampleType,
    flags: FlowFlags,
    num_samples: usize,
    channels: BTreeMap<u32, Vec<u8>>,
    scratch: Vec<u8>,
}

impl fmt::Debug for FlowData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowData")
            .field("kind", &self.kind)
            .field("sample_type", &self.sample_type)
            .field("flags", &self.flags)
            .field("num_samples", &self.num_samples)
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl FlowData {
    /// Create an empty buffer with no channels.
    pub fn new(kind: FlowKind, sample_type: SampleType) -> Self {
        Self {
            kind,
            sample_type,
            ..Self::default()
        }
    }

    /// Create a buffer with zeroed channels `ids`, each `num_samples` long.
    pub fn with_layout(
        kind: FlowKind,
        sample_type: SampleType,
        ids: impl IntoIterator<Item = u32>,
        num_samples: usize,
    ) -> Self {
        let mut data = Self::new(kind, sample_type);
        data.num_samples = num_samples;
        for id in ids {
            data.add_channel(id);
        }
        data
    }

    /// Flow kind.
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Element type.
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Content flags.
    pub fn flags(&self) -> FlowFlags {
        self.flags
    }

    /// Replace the content flags.
    pub fn set_flags(&mut self, flags: FlowFlags) {
        self.flags = flags;
    }

    /// Samples per channel.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Channel ids in ascending order.
    pub fn channel_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.channels.keys().copied()
    }

    /// Returns `true` if channel `id` exists.
    pub fn has_channel_id(&self, id: u32) -> bool {
        self.channels.contains_key(&id)
    }

    /// Resize every channel to `n` samples. Creates channel 0 if there are none.
    ///
    /// New samples are zero.
    pub fn set_num_samples(&mut self, n: usize) {
        self.num_samples = n;
        if self.channels.is_empty() {
            self.channels.insert(0, Vec::new());
        }
        let bytes = n * self.sample_type.size();
        for buf in self.channels.values_mut() {
            buf.resize(bytes, 0);
        }
    }

    /// Add a zeroed channel. Returns `false` if it already existed.
    pub fn add_channel(&mut self, id: u32) -> bool {
        if self.channels.contains_key(&id) {
            return false;
        }
        let bytes = self.num_samples * self.sample_type.size();
        self.channels.insert(id, vec![0; bytes]);
        true
    }

    /// Remove a channel. Returns `false` if it did not exist.
    pub fn remove_channel(&mut self, id: u32) -> bool {
        self.channels.remove(&id).is_some()
    }

    /// Raw bytes of channel `id`.
    ///
    /// # Panics
    ///
    /// If the channel does not exist.
    #[track_caller]
    pub fn channel(&self, id: u32) -> &[u8] {
        match self.channels.get(&id) {
            Some(buf) => buf,
            None => panic!("flow data has no channel {id}"),
        }
    }

    /// Mutable raw bytes of channel `id`.
    ///
    /// # Panics
    ///
    /// If the channel does not exist.
    #[track_caller]
    pub fn channel_mut(&mut self, id: u32) -> &mut [u8] {
        match self.channels.get_mut(&id) {
            Some(buf) => buf,
            None => panic!("flow data has no channel {id}"),
        }
    }

    /// Channel `id` as bytes of `sample_type`.
    ///
    /// Returns the stored bytes when the types match; otherwise converts into
    /// a scratch buffer owned by `self` that the next call overwrites.
    ///
    /// # Panics
    ///
    /// If the channel does not exist.
    #[track_caller]
    pub fn view(&mut self, sample_type: SampleType, id: u32) -> &[u8] {
        let Some(src) = self.channels.get(&id) else {
            panic!("flow data has no channel {id}");
        };
        if sample_type == self.sample_type {
            return src;
        }

        let from = self.sample_type;
        self.scratch.clear();
        self.scratch.resize(self.num_samples * sample_type.size(), 0);
        for (chunk, out) in src
            .chunks_exact(from.size())
            .zip(self.scratch.chunks_exact_mut(sample_type.size()))
        {
            sample_type.write_f64(out, from.read_f64(chunk));
        }
        &self.scratch
    }

    /// Channel `id` decoded as `T`, converting if needed.
    ///
    /// # Panics
    ///
    /// If the channel does not exist.
    #[track_caller]
    pub fn read_samples<T: Sample>(&self, id: u32) -> Vec<T> {
        let from = self.sample_type;
        self.channel(id)
            .chunks_exact(from.size())
            .map(|chunk| {
                if T::TYPE == from {
                    T::read_ne(chunk)
                } else {
                    T::from_f64(from.read_f64(chunk))
                }
            })
            .collect()
    }

    /// Encode `samples` into channel `id`, converting if needed.
    ///
    /// Writes at most `num_samples` values and returns how many were written.
    ///
    /// # Panics
    ///
    /// If the channel does not exist.
    #[track_caller]
    pub fn write_samples<T: Sample>(&mut self, id: u32, samples: &[T]) -> usize {
        let to = self.sample_type;
        let buf = self.channel_mut(id);
        let mut written = 0;
        for (out, &sample) in buf.chunks_exact_mut(to.size()).zip(samples) {
            if T::TYPE == to {
                sample.write_ne(out);
            } else {
                to.write_f64(out, sample.to_f64());
            }
            written += 1;
        }
        written
    }

    /// Zero every channel.
    pub fn zero(&mut self) {
        for buf in self.channels.values_mut() {
            buf.fill(0);
        }
    }

    /// Take on `other`'s layout: channel ids, element type, sample count and
    /// flags. With `copy`, the sample data is copied too; otherwise every
    /// channel is zeroed.
    pub fn match_channel_input(&mut self, other: &FlowData, copy: bool) {
        self.sample_type = other.sample_type;
        self.num_samples = other.num_samples;
        self.flags = other.flags;
        if copy {
            self.channels.clone_from(&other.channels);
            return;
        }

        let bytes = self.num_samples * self.sample_type.size();
        self.channels.retain(|id, _| other.channels.contains_key(id));
        for &id in other.channels.keys() {
            let buf = self.channels.entry(id).or_default();
            buf.clear();
            buf.resize(bytes, 0);
        }
    }

    /// Drop all channel storage. The sample count is kept.
    pub fn free_channels(&mut self) {
        self.channels = BTreeMap::new();
        self.scratch = Vec::new();
    }
}
