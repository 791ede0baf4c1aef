use std::fmt;

/// Capability tier requested from the adapter.
///
/// Each level maps to a `wgpu::Limits` preset; a level is available when the
/// adapter limits satisfy it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FeatureLevel {
    Level10_0,
    Level10_1,
    Level11_0,
    Level11_1,
}

impl FeatureLevel {
    /// Levels in the order they are tried.
    pub const PREFERENCE: [FeatureLevel; 4] = [
        FeatureLevel::Level11_1,
        FeatureLevel::Level11_0,
        FeatureLevel::Level10_1,
        FeatureLevel::Level10_0,
    ];

    pub fn limits(self) -> wgpu::Limits {
        match self {
            FeatureLevel::Level11_1 => wgpu::Limits::default(),
            FeatureLevel::Level11_0 => wgpu::Limits::downlevel_defaults(),
            FeatureLevel::Level10_1 => wgpu::Limits::downlevel_webgl2_defaults(),
            FeatureLevel::Level10_0 => wgpu::Limits {
                max_texture_dimension_1d: 1024,
                max_texture_dimension_2d: 1024,
                ..wgpu::Limits::downlevel_webgl2_defaults()
            },
        }
    }

    /// Highest level in `PREFERENCE` that `supported` satisfies.
    pub fn select(supported: &wgpu::Limits) -> Option<FeatureLevel> {
        Self::PREFERENCE
            .into_iter()
            .find(|level| level.limits().check_limits(supported))
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeatureLevel::Level10_0 => "10.0",
            FeatureLevel::Level10_1 => "10.1",
            FeatureLevel::Level11_0 => "11.0",
            FeatureLevel::Level11_1 => "11.1",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_is_descending() {
        let mut sorted = FeatureLevel::PREFERENCE;
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, FeatureLevel::PREFERENCE);
    }

    #[test]
    fn full_limits_select_highest_level() {
        assert_eq!(
            FeatureLevel::select(&wgpu::Limits::default()),
            Some(FeatureLevel::Level11_1)
        );
    }

    #[test]
    fn downlevel_adapter_selects_11_0() {
        assert_eq!(
            FeatureLevel::select(&wgpu::Limits::downlevel_defaults()),
            Some(FeatureLevel::Level11_0)
        );
    }

    #[test]
    fn webgl2_class_adapter_selects_10_1() {
        assert_eq!(
            FeatureLevel::select(&wgpu::Limits::downlevel_webgl2_defaults()),
            Some(FeatureLevel::Level10_1)
        );
    }

    #[test]
    fn adapter_below_every_level_selects_nothing() {
        let tiny = wgpu::Limits {
            max_texture_dimension_2d: 256,
            ..wgpu::Limits::downlevel_webgl2_defaults()
        };
        assert_eq!(FeatureLevel::select(&tiny), None);
    }

    #[test]
    fn display_uses_dotted_version() {
        assert_eq!(FeatureLevel::Level11_1.to_string(), "11.1");
        assert_eq!(FeatureLevel::Level10_0.to_string(), "10.0");
    }
}
