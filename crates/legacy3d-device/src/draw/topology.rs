use std::fmt;

/// Primitive kinds accepted by the legacy draw entry points.
///
/// Legacy and backend ids coincide (`D3DPT_*`), so the enum doubles as the
/// backend's primitive type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PrimitiveType {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
}

impl PrimitiveType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::PointList),
            2 => Some(Self::LineList),
            3 => Some(Self::LineStrip),
            4 => Some(Self::TriangleList),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }

    /// Number of primitives formed by `vertex_count` vertices (or indices).
    pub fn primitive_count(self, vertex_count: u32) -> u32 {
        match self {
            Self::PointList => vertex_count,
            Self::LineList => vertex_count / 2,
            Self::LineStrip => vertex_count.saturating_sub(1),
            Self::TriangleList => vertex_count / 3,
            // Strips and fans share their first two vertices.
            Self::TriangleStrip | Self::TriangleFan => vertex_count.saturating_sub(2),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::PointList => "point_list",
            PrimitiveType::LineList => "line_list",
            PrimitiveType::LineStrip => "line_strip",
            PrimitiveType::TriangleList => "triangle_list",
            PrimitiveType::TriangleStrip => "triangle_strip",
            PrimitiveType::TriangleFan => "triangle_fan",
        };
        f.write_str(s)
    }
}
