use winit::dpi::PhysicalSize;

use super::desc::Format;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM).
    Fatal,
}

/// Picks the surface format for a requested swap-chain format.
///
/// The requested format wins when supported. Otherwise the other 8-bit UNORM
/// ordering is tried before falling back to whatever the surface lists first.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    requested: Format,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    let preferred = [
        requested.to_wgpu_texture(),
        Some(wgpu::TextureFormat::Rgba8Unorm),
        Some(wgpu::TextureFormat::Bgra8Unorm),
    ];
    for f in preferred.into_iter().flatten() {
        if caps.formats.contains(&f) {
            return Some(f);
        }
    }

    Some(caps.formats[0])
}

/// Maps a present sync interval onto a supported present mode.
///
/// Interval 0 prefers tearing-allowed presentation; anything else is vsync.
pub(crate) fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    sync_interval: u32,
) -> wgpu::PresentMode {
    if sync_interval == 0 {
        for mode in [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox] {
            if caps.present_modes.contains(&mode) {
                return mode;
            }
        }
    }
    wgpu::PresentMode::Fifo
}

pub(crate) fn choose_alpha_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::CompositeAlphaMode {
    if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        return wgpu::CompositeAlphaMode::Opaque;
    }
    caps.alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Applies a new client size to the surface configuration.
///
/// wgpu cannot configure a 0x0 surface; in that case only `size` is updated
/// and configuration waits for the next nonzero size.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(
        formats: Vec<wgpu::TextureFormat>,
        present_modes: Vec<wgpu::PresentMode>,
    ) -> wgpu::SurfaceCapabilities {
        let mut caps = wgpu::SurfaceCapabilities::default();
        caps.formats = formats;
        caps.present_modes = present_modes;
        caps.alpha_modes = vec![wgpu::CompositeAlphaMode::Opaque];
        caps
    }

    #[test]
    fn requested_format_wins_when_supported() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8Unorm],
            vec![],
        );
        assert_eq!(
            choose_surface_format(&c, Format::R8G8B8A8Unorm),
            Some(wgpu::TextureFormat::Rgba8Unorm)
        );
    }

    #[test]
    fn bgra_is_the_fallback_for_rgba() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Bgra8Unorm],
            vec![],
        );
        assert_eq!(
            choose_surface_format(&c, Format::R8G8B8A8Unorm),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn first_format_when_nothing_matches() {
        let c = caps(vec![wgpu::TextureFormat::Rgba16Float], vec![]);
        assert_eq!(
            choose_surface_format(&c, Format::R8G8B8A8Unorm),
            Some(wgpu::TextureFormat::Rgba16Float)
        );
        assert_eq!(choose_surface_format(&caps(vec![], vec![]), Format::Unknown), None);
    }

    #[test]
    fn vsync_interval_is_fifo() {
        let c = caps(vec![], vec![wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo]);
        assert_eq!(choose_present_mode(&c, 1), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn zero_interval_prefers_immediate_then_mailbox() {
        let both = caps(vec![], vec![wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]);
        assert_eq!(choose_present_mode(&both, 0), wgpu::PresentMode::Immediate);

        let mailbox = caps(vec![], vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox]);
        assert_eq!(choose_present_mode(&mailbox, 0), wgpu::PresentMode::Mailbox);

        let fifo_only = caps(vec![], vec![wgpu::PresentMode::Fifo]);
        assert_eq!(choose_present_mode(&fifo_only, 0), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn opaque_alpha_preferred() {
        let mut c = caps(vec![], vec![]);
        c.alpha_modes = vec![wgpu::CompositeAlphaMode::PreMultiplied, wgpu::CompositeAlphaMode::Opaque];
        assert_eq!(choose_alpha_mode(&c), wgpu::CompositeAlphaMode::Opaque);
    }
}
