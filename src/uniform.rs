//! Named shader uniforms on top of WGSL uniform buffers.
//!
//! OpenGL-style code addresses uniforms by name (`"pointLights[1].position"`).
//! wgpu only knows raw uniform buffers, so this module bridges the two:
//!
//! - [`UniformSink`] is the write-side capability lights and the frame loop
//!   target. It has one required method and typed convenience setters.
//! - [`UniformLayout`] describes a WGSL uniform struct by listing its members
//!   in declaration order, and computes each member's byte offset using the
//!   uniform address space rules.
//! - [`UniformBlock`] is a CPU copy of such a buffer. Named writes are packed
//!   at their offsets; the bytes are then uploaded in one `write_buffer` call.
//! - [`UniformRecorder`] keeps every write in order, for inspection and tests.
//!
//! # Layout rules
//!
//! | Kind   | Align | Size |
//! |--------|-------|------|
//! | `bool` | 4     | 4 (stored as `u32`) |
//! | `i32`  | 4     | 4    |
//! | `f32`  | 4     | 4    |
//! | `vec2` | 8     | 8    |
//! | `vec3` | 16    | 12   |
//! | `vec4` | 16    | 16   |
//! | `mat4` | 16    | 64   |
//!
//! Nested structs start on a 16-byte boundary and their size is rounded up to
//! 16. Arrays of scalars use a 16-byte stride, so the WGSL side declares them
//! as `array<vec4<u32>, N>` and reads `.x`.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

/// A single uniform value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    /// The layout kind this value is written as.
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write_bytes(&self, dst: &mut [u8]) {
        match self {
            UniformValue::Bool(v) => dst.copy_from_slice(bytemuck::bytes_of(&u32::from(*v))),
            UniformValue::Int(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec4(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat4(m) => dst.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
        }
    }
}

/// Something that accepts named uniform writes.
///
/// This is the only thing lights know about shaders. Implementors decide what
/// a write means: [`UniformBlock`] packs it into a GPU-ready buffer,
/// [`UniformRecorder`] just remembers it.
pub trait UniformSink {
    /// Write `value` under `name`.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }
}

impl<S: UniformSink + ?Sized> UniformSink for &mut S {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        (**self).set_uniform(name, value);
    }
}

/// Records every uniform write in the order it was made.
#[derive(Clone, Debug, Default)]
pub struct UniformRecorder {
    writes: Vec<(String, UniformValue)>,
}

impl UniformRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes, oldest first.
    pub fn writes(&self) -> &[(String, UniformValue)] {
        &self.writes
    }

    /// Names written, oldest first (duplicates kept).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(name, _)| name.as_str())
    }

    /// The most recent value written under `name`.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.writes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl UniformSink for UniformRecorder {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.writes.push((name.to_string(), value));
    }
}

/// The type of a member in a [`UniformLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    pub const fn align(self) -> u64 {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat4 => 16,
        }
    }

    pub const fn size(self) -> u64 {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }
}

/// Where a named member lives inside a uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: u64,
    pub kind: UniformKind,
}

/// Byte layout of a WGSL uniform struct, addressed by uniform name.
///
/// Members must be added in the same order the WGSL struct declares them.
///
/// ```
/// use lightbox::{UniformKind, UniformLayout};
///
/// let layout = UniformLayout::builder()
///     .field("view", UniformKind::Mat4)
///     .field("viewPos", UniformKind::Vec3)
///     .field("useDirLight", UniformKind::Bool)
///     .build();
///
/// assert_eq!(layout.slot("viewPos").unwrap().offset, 64);
/// assert_eq!(layout.slot("useDirLight").unwrap().offset, 76);
/// assert_eq!(layout.size(), 80);
/// ```
#[derive(Clone, Debug)]
pub struct UniformLayout {
    slots: HashMap<String, UniformSlot>,
    size: u64,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder::default()
    }

    /// Look up the slot for a uniform name.
    pub fn slot(&self, name: &str) -> Option<UniformSlot> {
        self.slots.get(name).copied()
    }

    /// Total buffer size in bytes (a multiple of 16).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of addressable names.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Builder for [`UniformLayout`]; see its docs for the packing rules.
#[derive(Debug, Default)]
pub struct UniformLayoutBuilder {
    slots: HashMap<String, UniformSlot>,
    offset: u64,
}

const STRUCT_ALIGN: u64 = 16;

fn align_to(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

impl UniformLayoutBuilder {
    /// Add a plain member.
    pub fn field(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        self.push(name.into(), kind);
        self
    }

    /// Add a nested struct member. Its fields become `name.field`.
    pub fn structure(mut self, name: &str, fields: &[(&str, UniformKind)]) -> Self {
        self.push_struct(name, fields);
        self
    }

    /// Add `array<Struct, len>`. Elements become `name[i].field`.
    pub fn struct_array(mut self, name: &str, len: usize, fields: &[(&str, UniformKind)]) -> Self {
        for i in 0..len {
            self.push_struct(&format!("{name}[{i}]"), fields);
        }
        self
    }

    /// Add an array of scalars with a 16-byte stride. Elements become `name[i]`.
    pub fn scalar_array(mut self, name: &str, len: usize, kind: UniformKind) -> Self {
        for i in 0..len {
            self.offset = align_to(self.offset, STRUCT_ALIGN);
            self.push(format!("{name}[{i}]"), kind);
            self.offset = align_to(self.offset, STRUCT_ALIGN);
        }
        self
    }

    pub fn build(self) -> UniformLayout {
        UniformLayout {
            slots: self.slots,
            size: align_to(self.offset.max(STRUCT_ALIGN), STRUCT_ALIGN),
        }
    }

    fn push(&mut self, name: String, kind: UniformKind) {
        let offset = align_to(self.offset, kind.align());
        self.offset = offset + kind.size();
        self.slots.insert(name, UniformSlot { offset, kind });
    }

    fn push_struct(&mut self, prefix: &str, fields: &[(&str, UniformKind)]) {
        self.offset = align_to(self.offset, STRUCT_ALIGN);
        let start = self.offset;
        for (field, kind) in fields {
            self.push(format!("{prefix}.{field}"), *kind);
        }
        self.offset = start + align_to(self.offset - start, STRUCT_ALIGN);
    }
}

/// CPU-side contents of a uniform buffer described by a [`UniformLayout`].
///
/// Writes to names the layout does not contain are dropped, the same way
/// OpenGL ignores a uniform location of -1. A write whose value kind does not
/// match the declared kind is dropped as well.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size() as usize];
        Self {
            layout,
            bytes,
            dirty: true,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Raw bytes ready for `Queue::write_buffer`.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True if anything changed since the last [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Read back the bytes of a named member.
    pub fn read(&self, name: &str) -> Option<&[u8]> {
        let slot = self.layout.slot(name)?;
        let start = slot.offset as usize;
        Some(&self.bytes[start..start + slot.kind.size() as usize])
    }
}

impl UniformSink for UniformBlock {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(slot) = self.layout.slot(name) else {
            log::trace!("ignoring write to undeclared uniform '{name}'");
            return;
        };
        if slot.kind != value.kind() {
            log::warn!(
                "uniform '{name}' is declared {:?} but was written as {:?}",
                slot.kind,
                value.kind()
            );
            return;
        }
        let start = slot.offset as usize;
        let end = start + slot.kind.size() as usize;
        value.write_bytes(&mut self.bytes[start..end]);
        self.dirty = true;
    }
}
