/// View state types: ids, rectangles, clear settings

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::xr::Rect2Di;

/// Index of a logical view
pub type ViewId = u16;

/// Pixel rectangle of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl TryFrom<Rect2Di> for ViewRect {
    type Error = Error;

    fn try_from(rect: Rect2Di) -> Result<Self> {
        let convert = |value: i32, what: &str| {
            u16::try_from(value).map_err(|_| {
                Error::PreconditionViolated(format!(
                    "view rect {} {} does not fit a 16-bit pixel coordinate",
                    what, value
                ))
            })
        };
        Ok(Self {
            x: convert(rect.offset.x, "x")?,
            y: convert(rect.offset.y, "y")?,
            width: convert(rect.extent.width, "width")?,
            height: convert(rect.extent.height, "height")?,
        })
    }
}

bitflags! {
    /// Which attachments a view clears
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 0b001;
        const DEPTH = 0b010;
        const STENCIL = 0b100;
    }
}

/// Clear settings of a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearState {
    pub flags: ClearFlags,
    /// Packed 0xRRGGBBAA clear color
    pub rgba: u32,
    pub depth: f32,
    pub stencil: u8,
}

impl ClearState {
    /// Clear color as normalized floats [r, g, b, a]
    pub fn color_f32(&self) -> [f32; 4] {
        let channel = |shift: u32| ((self.rgba >> shift) & 0xff) as f32 / 255.0;
        [channel(24), channel(16), channel(8), channel(0)]
    }
}

impl Default for ClearState {
    fn default() -> Self {
        Self {
            flags: ClearFlags::COLOR | ClearFlags::DEPTH,
            rgba: 0xff3030ff,
            depth: 1.0,
            stencil: 0,
        }
    }
}
