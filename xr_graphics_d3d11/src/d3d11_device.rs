/// D3D11 device bootstrap: adapter selection, feature levels, WARP fallback

use windows::core::Interface;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::*;

use xr_graphics::xrgfx::{AdapterLuid, Error, GraphicsRequirements, Result};
use xr_graphics::{xr_debug, xr_error, xr_info, xr_warn};

use crate::feature_level::{candidate_feature_levels, feature_level_name};

/// Map a failed native call to `Error::NativeError`, logging it
pub(crate) fn hresult(call: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |e| {
        xr_error!(
            "xrgfx::d3d11",
            "{} failed: 0x{:08X} {}",
            call,
            e.code().0 as u32,
            e.message()
        );
        Error::native(call, e.code().0)
    }
}

/// Device, immediate context and what was negotiated
#[derive(Clone)]
pub struct D3D11Device {
    pub device: ID3D11Device,
    pub context: ID3D11DeviceContext,
    pub feature_level: u32,
    pub adapter: AdapterInfo,
    /// True when running on the WARP software rasterizer
    pub warp: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub luid: AdapterLuid,
}

impl AdapterInfo {
    fn from_desc(desc: &DXGI_ADAPTER_DESC) -> Self {
        let len = desc.Description.iter().position(|&c| c == 0).unwrap_or(desc.Description.len());
        Self {
            name: String::from_utf16_lossy(&desc.Description[..len]),
            vendor_id: desc.VendorId,
            device_id: desc.DeviceId,
            luid: AdapterLuid { low: desc.AdapterLuid.LowPart, high: desc.AdapterLuid.HighPart },
        }
    }
}

fn feature_levels(min_feature_level: u32) -> Result<Vec<D3D_FEATURE_LEVEL>> {
    let levels: Vec<D3D_FEATURE_LEVEL> = candidate_feature_levels(min_feature_level)
        .into_iter()
        .map(|level| D3D_FEATURE_LEVEL(level as i32))
        .collect();
    if levels.is_empty() {
        let message = format!(
            "no supported feature level satisfies the runtime minimum 0x{:x}",
            min_feature_level
        );
        xr_error!("xrgfx::d3d11", "{}", message);
        return Err(Error::InitializationFailed(message));
    }
    Ok(levels)
}

fn creation_flags(enable_debug: bool) -> D3D11_CREATE_DEVICE_FLAG {
    let mut flags = D3D11_CREATE_DEVICE_BGRA_SUPPORT;
    if enable_debug {
        flags |= D3D11_CREATE_DEVICE_DEBUG;
    }
    flags
}

/// Create a device on the runtime's adapter, falling back to WARP
pub fn create_device(requirements: &GraphicsRequirements, enable_debug: bool) -> Result<D3D11Device> {
    let levels = feature_levels(requirements.min_feature_level)?;
    let flags = creation_flags(enable_debug);

    let adapter = match requirements.adapter_luid {
        Some(luid) => find_adapter(luid)?,
        None => None,
    };

    let (device, context, level, warp) = match create_with(adapter.as_ref(), &levels, flags) {
        Ok((device, context, level)) => (device, context, level, false),
        Err(hardware) => {
            xr_warn!(
                "xrgfx::d3d11",
                "Hardware device creation failed ({}), falling back to WARP",
                hardware
            );
            let (device, context, level) = create_warp(&levels, flags)?;
            (device, context, level, true)
        }
    };

    let adapter = describe_adapter(&device)?;
    let feature_level = level.0 as u32;
    xr_info!(
        "xrgfx::d3d11",
        "Created D3D11 device on '{}' ({}) at feature level {}",
        adapter.name,
        adapter.luid,
        feature_level_name(feature_level)
    );

    Ok(D3D11Device { device, context, feature_level, adapter, warp })
}

/// Create a device on the WARP software rasterizer
///
/// For hosts without a usable GPU (CI machines, remote sessions).
pub fn create_warp_device(min_feature_level: u32, enable_debug: bool) -> Result<D3D11Device> {
    let levels = feature_levels(min_feature_level)?;
    let (device, context, level) = create_warp(&levels, creation_flags(enable_debug))?;
    let adapter = describe_adapter(&device)?;
    xr_info!(
        "xrgfx::d3d11",
        "Created WARP device at feature level {}",
        feature_level_name(level.0 as u32)
    );
    Ok(D3D11Device { device, context, feature_level: level.0 as u32, adapter, warp: true })
}

/// DXGI adapter whose LUID matches, or `None` to use the default adapter
fn find_adapter(luid: AdapterLuid) -> Result<Option<IDXGIAdapter>> {
    let factory: IDXGIFactory1 =
        unsafe { CreateDXGIFactory1() }.map_err(hresult("CreateDXGIFactory1"))?;

    let mut index = 0;
    // EnumAdapters1 fails with DXGI_ERROR_NOT_FOUND past the last adapter
    while let Ok(adapter) = unsafe { factory.EnumAdapters1(index) } {
        index += 1;
        let desc = unsafe { adapter.GetDesc1() }.map_err(hresult("IDXGIAdapter1::GetDesc1"))?;
        if desc.AdapterLuid.LowPart == luid.low && desc.AdapterLuid.HighPart == luid.high {
            xr_debug!("xrgfx::d3d11", "Using adapter {} for LUID {}", index - 1, luid);
            let adapter: IDXGIAdapter = adapter.cast().map_err(hresult("IDXGIAdapter1::cast"))?;
            return Ok(Some(adapter));
        }
    }

    xr_warn!(
        "xrgfx::d3d11",
        "No adapter with LUID {} among {} adapter(s), using the default adapter",
        luid,
        index
    );
    Ok(None)
}

fn create_with(
    adapter: Option<&IDXGIAdapter>,
    levels: &[D3D_FEATURE_LEVEL],
    flags: D3D11_CREATE_DEVICE_FLAG,
) -> Result<(ID3D11Device, ID3D11DeviceContext, D3D_FEATURE_LEVEL)> {
    // An explicit adapter requires the UNKNOWN driver type
    let driver_type = if adapter.is_some() {
        D3D_DRIVER_TYPE_UNKNOWN
    } else {
        D3D_DRIVER_TYPE_HARDWARE
    };
    create_raw(adapter, driver_type, levels, flags, "D3D11CreateDevice")
}

fn create_warp(
    levels: &[D3D_FEATURE_LEVEL],
    flags: D3D11_CREATE_DEVICE_FLAG,
) -> Result<(ID3D11Device, ID3D11DeviceContext, D3D_FEATURE_LEVEL)> {
    create_raw(None, D3D_DRIVER_TYPE_WARP, levels, flags, "D3D11CreateDevice(WARP)")
}

fn create_raw(
    adapter: Option<&IDXGIAdapter>,
    driver_type: D3D_DRIVER_TYPE,
    levels: &[D3D_FEATURE_LEVEL],
    flags: D3D11_CREATE_DEVICE_FLAG,
    call: &'static str,
) -> Result<(ID3D11Device, ID3D11DeviceContext, D3D_FEATURE_LEVEL)> {
    let mut device: Option<ID3D11Device> = None;
    let mut context: Option<ID3D11DeviceContext> = None;
    let mut level = D3D_FEATURE_LEVEL_11_0;

    unsafe {
        D3D11CreateDevice(
            adapter,
            driver_type,
            HMODULE::default(),
            flags,
            Some(levels),
            D3D11_SDK_VERSION,
            Some(&mut device),
            Some(&mut level),
            Some(&mut context),
        )
    }
    .map_err(hresult(call))?;

    match (device, context) {
        (Some(device), Some(context)) => Ok((device, context, level)),
        _ => {
            xr_error!("xrgfx::d3d11", "{} returned no device", call);
            Err(Error::InitializationFailed(format!("{} returned no device", call)))
        }
    }
}

fn describe_adapter(device: &ID3D11Device) -> Result<AdapterInfo> {
    let dxgi: IDXGIDevice = device.cast().map_err(hresult("ID3D11Device::cast"))?;
    let adapter = unsafe { dxgi.GetAdapter() }.map_err(hresult("IDXGIDevice::GetAdapter"))?;
    let desc = unsafe { adapter.GetDesc() }.map_err(hresult("IDXGIAdapter::GetDesc"))?;
    Ok(AdapterInfo::from_desc(&desc))
}
