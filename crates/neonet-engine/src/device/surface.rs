use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// What to do about a failed frame acquisition. `can_reconfigure` is false
/// while the window has a zero-area size.
pub(crate) fn surface_error_action(
    err: &wgpu::SurfaceError,
    can_reconfigure: bool,
) -> (SurfaceErrorAction, bool) {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            (SurfaceErrorAction::Reconfigured, can_reconfigure)
        }
        wgpu::SurfaceError::OutOfMemory => (SurfaceErrorAction::Fatal, false),
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
            (SurfaceErrorAction::SkipFrame, false)
        }
    }
}
