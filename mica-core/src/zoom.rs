/// Hexagon size doubles the base grid so bins stay readable on screen.
pub const ZOOM_MULTIPLIER: u32 = 2;

/// Base hexagon edge size in meters, indexed by zoom level 0..=16.
const ZOOM_TO_HEX_SIZE_RAW: [u32; 17] = [
    640_000, 320_000, 160_000, 80_000, 40_000, 20_000, 10_000, 5_000, 2_500, 1_250, 675, 335, 160,
    80, 40, 20, 10,
];

pub const MAX_AGGREGATED_ZOOM: u8 = 16;

/// Hexagon size in meters used by the server's grid at `zoom`. Zoom levels
/// past the table use the finest grid.
pub fn hex_size_meters(zoom: u8) -> u32 {
    let index = usize::from(zoom.min(MAX_AGGREGATED_ZOOM));
    ZOOM_TO_HEX_SIZE_RAW[index] * ZOOM_MULTIPLIER
}

/// "1.3 km" / "40 m" caption for the legend.
pub fn hex_size_caption(zoom: u8) -> String {
    let meters = hex_size_meters(zoom);
    if meters >= 1_000 {
        let km = meters as f64 / 1_000.0;
        if km.fract() == 0.0 {
            format!("{} km", km as u64)
        } else {
            format!("{:.1} km", km)
        }
    } else {
        format!("{} m", meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_multiplier() {
        assert_eq!(hex_size_meters(0), 1_280_000);
        assert_eq!(hex_size_meters(10), 1_350);
        assert_eq!(hex_size_meters(16), 20);
        assert_eq!(hex_size_meters(20), 20);
    }

    #[test]
    fn captions() {
        assert_eq!(hex_size_caption(8), "5 km");
        assert_eq!(hex_size_caption(10), "1.4 km");
        assert_eq!(hex_size_caption(14), "80 m");
    }
}
