//! ASPRS classification code colours.

/// Colour for codes outside the table.
pub const DEFAULT_CLASS_COLOR: [u8; 3] = [200, 200, 200];

/// Display colour for an ASPRS class code. Total over `u8`.
pub fn class_color(code: u8) -> [u8; 3] {
    match code {
        1 => [200, 200, 200], // unclassified
        2 => [165, 80, 40],   // ground
        3 => [0, 255, 0],     // low vegetation
        4 => [0, 150, 0],     // medium vegetation
        5 => [0, 100, 0],     // high vegetation
        6 => [255, 0, 0],     // building
        9 => [0, 0, 255],     // water
        _ => DEFAULT_CLASS_COLOR,
    }
}

/// Class colour scaled to [0, 1].
pub fn class_color_unit(code: u8) -> [f32; 3] {
    let [r, g, b] = class_color(code);
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_classes() {
        assert_eq!(class_color(2), [165, 80, 40]);
        assert_eq!(class_color(6), [255, 0, 0]);
        assert_eq!(class_color(9), [0, 0, 255]);
    }

    #[test]
    fn test_unknown_is_default_grey() {
        for code in [0u8, 7, 8, 17, 64, 255] {
            assert_eq!(class_color(code), DEFAULT_CLASS_COLOR);
        }
        let grey = 200.0 / 255.0;
        assert_eq!(class_color_unit(42), [grey, grey, grey]);
    }
}
