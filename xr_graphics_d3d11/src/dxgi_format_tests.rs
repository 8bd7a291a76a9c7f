use xr_graphics::xrgfx::render::{TextureFormat, COLOR_SWAPCHAIN_FORMATS};

use crate::dxgi_format::*;

#[test]
fn test_dxgi_codes() {
    assert_eq!(dxgi_code(TextureFormat::R8G8B8A8_UNORM), 28);
    assert_eq!(dxgi_code(TextureFormat::B8G8R8A8_UNORM), 87);
    assert_eq!(dxgi_code(TextureFormat::R8G8B8A8_SRGB), 29);
    assert_eq!(dxgi_code(TextureFormat::B8G8R8A8_SRGB), 91);
    assert_eq!(dxgi_code(TextureFormat::D24_UNORM_S8_UINT), 45);
    assert_eq!(dxgi_code(TextureFormat::D32_FLOAT), 40);
}

#[test]
fn test_every_color_format_maps_back() {
    for format in COLOR_SWAPCHAIN_FORMATS {
        assert_eq!(texture_format(dxgi_code(format)), Some(format));
    }
}

#[test]
fn test_typeless_reads_as_unorm() {
    assert_eq!(texture_format(DXGI_FORMAT_R8G8B8A8_TYPELESS), Some(TextureFormat::R8G8B8A8_UNORM));
    assert_eq!(texture_format(DXGI_FORMAT_B8G8R8A8_TYPELESS), Some(TextureFormat::B8G8R8A8_UNORM));
}

#[test]
fn test_unknown_codes() {
    assert_eq!(texture_format(0), None);
    assert_eq!(texture_format(10), None);
    assert_eq!(swapchain_texture_format(-1), None);
    assert_eq!(swapchain_texture_format(i64::from(u32::MAX) + 29), None);
    assert_eq!(swapchain_texture_format(91), Some(TextureFormat::B8G8R8A8_SRGB));
}

#[test]
fn test_runtime_format_selection_with_dxgi_codes() {
    let selected = xr_graphics::format::select_color_swapchain_format(&[91, 28], |f| {
        i64::from(dxgi_code(f))
    })
    .unwrap();
    assert_eq!(selected, 28);
}
