/// OpenXR bootstrap for a D3D11 harness
///
/// `XrRuntime` covers instance and system creation and the device requirements;
/// `XrSession` is created once the plugin has produced its graphics binding.

use std::mem;

use openxr as xr;

use xr_graphics::xrgfx::{AdapterLuid, Error, GraphicsRequirements, Result};
use xr_graphics::{xr_debug, xr_error, xr_info, xr_warn};

use crate::d3d11_backend::{D3D11GraphicsBinding, D3D11_ENABLE_EXTENSION};

fn xr_result(call: &'static str) -> impl FnOnce(xr::sys::Result) -> Error {
    move |result| {
        xr_error!("xrgfx::openxr", "{} failed: {}", call, result);
        Error::native(call, result.into_raw())
    }
}

/// Loaded runtime, instance and HMD system
pub struct XrRuntime {
    pub entry: xr::Entry,
    pub instance: xr::Instance,
    pub system: xr::SystemId,
}

impl XrRuntime {
    /// Load the runtime and create an instance with `XR_KHR_D3D11_enable`
    pub fn new(application_name: &str) -> Result<Self> {
        #[cfg(feature = "static")]
        let entry = xr::Entry::linked();
        #[cfg(not(feature = "static"))]
        let entry = unsafe { xr::Entry::load() }.map_err(|e| {
            xr_error!("xrgfx::openxr", "Could not load the OpenXR loader: {}", e);
            Error::InitializationFailed(format!("OpenXR loader: {}", e))
        })?;

        let available = entry.enumerate_extensions().map_err(xr_result("xrEnumerateInstanceExtensionProperties"))?;
        if !available.khr_d3d11_enable {
            let message = format!("runtime does not expose {}", D3D11_ENABLE_EXTENSION);
            xr_error!("xrgfx::openxr", "{}", message);
            return Err(Error::InitializationFailed(message));
        }
        let mut extensions = xr::ExtensionSet::default();
        extensions.khr_d3d11_enable = true;

        let instance = entry
            .create_instance(
                &xr::ApplicationInfo {
                    application_name,
                    application_version: 0,
                    engine_name: "xr_graphics",
                    engine_version: 0,
                    api_version: xr::Version::new(1, 0, 0),
                },
                &extensions,
                &[],
            )
            .map_err(xr_result("xrCreateInstance"))?;

        if let Ok(properties) = instance.properties() {
            xr_info!(
                "xrgfx::openxr",
                "Loaded OpenXR runtime {} {}",
                properties.runtime_name,
                properties.runtime_version
            );
        }

        let system = instance
            .system(xr::FormFactor::HEAD_MOUNTED_DISPLAY)
            .map_err(xr_result("xrGetSystem"))?;

        Ok(Self { entry, instance, system })
    }

    /// Adapter and feature level the runtime needs the device on
    pub fn graphics_requirements(&self) -> Result<GraphicsRequirements> {
        let requirements = self
            .instance
            .graphics_requirements::<xr::D3D11>(self.system)
            .map_err(xr_result("xrGetD3D11GraphicsRequirementsKHR"))?;

        // LUID is { DWORD, LONG } and D3D_FEATURE_LEVEL a 32-bit enum
        if mem::size_of_val(&requirements.adapter_luid) != 8
            || mem::size_of_val(&requirements.min_feature_level) != 4
        {
            let message = "unexpected D3D11 requirements layout".to_string();
            xr_error!("xrgfx::openxr", "{}", message);
            return Err(Error::InitializationFailed(message));
        }
        let [low, high]: [u32; 2] = unsafe { mem::transmute_copy(&requirements.adapter_luid) };
        let min_feature_level: u32 = unsafe { mem::transmute_copy(&requirements.min_feature_level) };

        let requirements = GraphicsRequirements {
            adapter_luid: Some(AdapterLuid { low, high: high as i32 }),
            min_feature_level,
        };
        xr_debug!("xrgfx::openxr", "D3D11 requirements: {:?}", requirements);
        Ok(requirements)
    }

    /// Create a session on the device behind `binding`
    pub fn create_session(&self, binding: &D3D11GraphicsBinding) -> Result<XrSession> {
        let (session, frame_waiter, frame_stream) = unsafe {
            self.instance.create_session::<xr::D3D11>(
                self.system,
                &xr::d3d::SessionCreateInfoD3D11 { device: binding.device },
            )
        }
        .map_err(xr_result("xrCreateSession"))?;

        let mut visualized_spaces = Vec::new();
        for ty in [
            xr::ReferenceSpaceType::VIEW,
            xr::ReferenceSpaceType::LOCAL,
            xr::ReferenceSpaceType::STAGE,
        ] {
            match session.create_reference_space(ty, xr::Posef::IDENTITY) {
                Ok(space) => visualized_spaces.push((ty, space)),
                Err(e) => xr_warn!("xrgfx::openxr", "Failed to create reference space {:?}: {}", ty, e),
            }
        }

        let app_space = session
            .create_reference_space(xr::ReferenceSpaceType::LOCAL, xr::Posef::IDENTITY)
            .map_err(xr_result("xrCreateReferenceSpace"))?;

        xr_info!(
            "xrgfx::openxr",
            "Session created with {} visualized space(s)",
            visualized_spaces.len()
        );
        Ok(XrSession { session, frame_waiter, frame_stream, app_space, visualized_spaces })
    }
}

/// Session, frame loop handles and reference spaces
pub struct XrSession {
    pub session: xr::Session<xr::D3D11>,
    pub frame_waiter: xr::FrameWaiter,
    pub frame_stream: xr::FrameStream<xr::D3D11>,
    /// Space views are located in
    pub app_space: xr::Space,
    pub visualized_spaces: Vec<(xr::ReferenceSpaceType, xr::Space)>,
}
