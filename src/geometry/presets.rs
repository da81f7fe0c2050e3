use crate::geometry::torus::TorusParams;

pub struct TorusPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub params: TorusParams,
}

pub const TORUS_PRESETS: &[TorusPreset] = &[
    TorusPreset {
        name: "Ring",
        description: "Thin tube, fine tessellation",
        params: TorusParams {
            major_radius: 1.0,
            minor_radius: 0.2,
            major_segments: 50,
            minor_segments: 50,
        },
    },
    TorusPreset {
        name: "Donut",
        description: "Thick tube with a visible hole",
        params: TorusParams {
            major_radius: 1.0,
            minor_radius: 0.45,
            major_segments: 64,
            minor_segments: 32,
        },
    },
    TorusPreset {
        name: "Horn",
        description: "r = R, the hole closes to a point",
        params: TorusParams {
            major_radius: 0.8,
            minor_radius: 0.8,
            major_segments: 64,
            minor_segments: 48,
        },
    },
    TorusPreset {
        name: "Spindle",
        description: "r > R, self-intersecting surface",
        params: TorusParams {
            major_radius: 0.5,
            minor_radius: 0.8,
            major_segments: 64,
            minor_segments: 48,
        },
    },
    TorusPreset {
        name: "Low Poly",
        description: "Coarse grid, faceting is easy to see",
        params: TorusParams {
            major_radius: 1.0,
            minor_radius: 0.35,
            major_segments: 8,
            minor_segments: 5,
        },
    },
    TorusPreset {
        name: "Minimal",
        description: "Smallest accepted grid (3 x 3)",
        params: TorusParams {
            major_radius: 1.0,
            minor_radius: 0.4,
            major_segments: 3,
            minor_segments: 3,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_preset_is_the_default() {
        assert_eq!(TORUS_PRESETS[0].params, TorusParams::default());
    }

    #[test]
    fn every_preset_is_valid() {
        for preset in TORUS_PRESETS {
            assert!(
                preset.params.validate().is_ok(),
                "preset {} is invalid",
                preset.name
            );
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in TORUS_PRESETS.iter().enumerate() {
            for b in &TORUS_PRESETS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
