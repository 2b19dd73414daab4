//! Flexible vertex formats and the legacy vertex layouts.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::abi::legacy::vt;
use crate::error::{DeviceError, DeviceResult};

bitflags! {
    /// `D3DFVF_*` bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Fvf: u32 {
        const XYZ = 0x002;
        const XYZRHW = 0x004;
        const XYZB1 = 0x006;
        const XYZB2 = 0x008;
        const XYZB3 = 0x00a;
        const XYZB4 = 0x00c;
        const XYZB5 = 0x00e;
        const XYZW = 0x4002;
        const NORMAL = 0x010;
        /// `D3DFVF_RESERVED1` in version 7, `PSIZE` in the backend. Four bytes either way.
        const RESERVED1 = 0x020;
        const DIFFUSE = 0x040;
        const SPECULAR = 0x080;
        const TEXCOUNT_MASK = 0xf00;
        const TEXCOORD_SIZES = 0xffff_0000;

        const _ = !0;
    }
}

const POSITION_MASK: u32 = 0x400e;
const TEXCOUNT_SHIFT: u32 = 8;

pub const FVF_VERTEX: Fvf = Fvf::from_bits_retain(0x112);
pub const FVF_LVERTEX: Fvf = Fvf::from_bits_retain(0x1e2);
pub const FVF_TLVERTEX: Fvf = Fvf::from_bits_retain(0x1c4);
/// Backend-compatible replacement for [`FVF_LVERTEX`]; drops the reserved dword.
pub const FVF_LVERTEX9: Fvf = Fvf::from_bits_retain(0x1c2);

impl Fvf {
    pub fn has_normal(self) -> bool {
        self.contains(Fvf::NORMAL)
    }

    pub fn texcoord_count(self) -> u32 {
        (self.bits() & Fvf::TEXCOUNT_MASK.bits()) >> TEXCOUNT_SHIFT
    }

    /// Byte size of one vertex, or `None` for a malformed position field.
    pub fn stride(self) -> Option<u32> {
        let bits = self.bits();
        let mut size = match bits & POSITION_MASK {
            0 => 0,
            0x002 => 12,
            0x004 => 16,
            0x4002 => 16,
            b @ (0x006 | 0x008 | 0x00a | 0x00c | 0x00e) => 12 + 4 * ((b - 0x004) / 2),
            _ => return None,
        };
        if self.contains(Fvf::NORMAL) {
            size += 12;
        }
        if self.contains(Fvf::RESERVED1) {
            size += 4;
        }
        if self.contains(Fvf::DIFFUSE) {
            size += 4;
        }
        if self.contains(Fvf::SPECULAR) {
            size += 4;
        }
        for coord in 0..self.texcoord_count() {
            let format = (bits >> (16 + coord * 2)) & 0x3;
            size += match format {
                0 => 8,
                1 => 12,
                2 => 16,
                _ => 4,
            };
        }
        Some(size)
    }
}

/// Expands a version 2 `D3DVERTEXTYPE` tag into its vertex format.
pub fn vertex_type_to_fvf(vertex_type: u32) -> DeviceResult<Fvf> {
    match vertex_type {
        vt::VERTEX => Ok(FVF_VERTEX),
        vt::LVERTEX => Ok(FVF_LVERTEX),
        vt::TLVERTEX => Ok(FVF_TLVERTEX),
        _ => Err(DeviceError::InvalidVertexType),
    }
}

/// `D3DLVERTEX`: pre-lit, untransformed.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub reserved: u32,
    pub color: u32,
    pub specular: u32,
    pub tu: f32,
    pub tv: f32,
}

/// [`LVertex`] without the reserved dword, matching [`FVF_LVERTEX9`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LVertex9 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: u32,
    pub specular: u32,
    pub tu: f32,
    pub tv: f32,
}

impl From<LVertex> for LVertex9 {
    fn from(v: LVertex) -> Self {
        LVertex9 {
            x: v.x,
            y: v.y,
            z: v.z,
            color: v.color,
            specular: v.specular,
            tu: v.tu,
            tv: v.tv,
        }
    }
}

/// Reusable conversion buffer. Grows to the largest draw seen and never shrinks.
#[derive(Debug, Default)]
pub struct VertexScratch {
    bytes: Vec<u8>,
}

impl VertexScratch {
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The first `len` bytes of the last conversion.
    pub fn converted(&self, len: usize) -> &[u8] {
        &self.bytes[..len.min(self.bytes.len())]
    }

    /// Converts `count` packed [`LVertex`] values into [`LVertex9`] and returns the converted bytes.
    pub fn convert_lvertices(&mut self, src: &[u8], count: usize) -> DeviceResult<&[u8]> {
        let src_stride = std::mem::size_of::<LVertex>();
        let dst_stride = std::mem::size_of::<LVertex9>();
        let src_len = count
            .checked_mul(src_stride)
            .ok_or(DeviceError::InvalidParams)?;
        let src = src.get(..src_len).ok_or(DeviceError::InvalidParams)?;

        let needed = count * dst_stride;
        if self.bytes.len() < needed {
            self.bytes.resize(needed, 0);
        }

        for (chunk, out) in src
            .chunks_exact(src_stride)
            .zip(self.bytes.chunks_exact_mut(dst_stride))
        {
            // Client arrays carry no alignment guarantee.
            let vertex: LVertex = bytemuck::pod_read_unaligned(chunk);
            out.copy_from_slice(bytemuck::bytes_of(&LVertex9::from(vertex)));
        }
        Ok(&self.bytes[..needed])
    }
}
