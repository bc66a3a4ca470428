use crate::color::{self, RGB};

/// Magenta, blue, cyan, green, yellow, red
pub fn rainbow() -> Vec<RGB> {
    vec![
        color::rgb(1.0, 0.0, 1.0),
        color::rgb(0.0, 0.0, 1.0),
        color::rgb(0.0, 1.0, 1.0),
        color::rgb(0.0, 1.0, 0.0),
        color::rgb(1.0, 1.0, 0.0),
        color::rgb(1.0, 0.0, 0.0),
    ]
}

/// Rainbow with black at the low end
pub fn rainbow_with_black() -> Vec<RGB> {
    let mut palette = vec![color::rgb(0.0, 0.0, 0.0)];
    palette.extend(rainbow());
    palette
}

pub fn monochrome() -> Vec<RGB> {
    vec![color::rgb(0.0, 0.0, 0.0), color::rgb(1.0, 1.0, 1.0)]
}

pub fn single_color(color: RGB) -> Vec<RGB> {
    vec![color]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalettePreset {
    Rainbow,
    RainbowWithBlack,
    Monochrome,
    /// White everywhere, only opacity shapes the image
    SingleColor,
}

impl PalettePreset {
    pub const ALL: [PalettePreset; 4] = [
        PalettePreset::Rainbow,
        PalettePreset::RainbowWithBlack,
        PalettePreset::Monochrome,
        PalettePreset::SingleColor,
    ];

    pub fn colors(&self) -> Vec<RGB> {
        match self {
            PalettePreset::Rainbow => rainbow(),
            PalettePreset::RainbowWithBlack => rainbow_with_black(),
            PalettePreset::Monochrome => monochrome(),
            PalettePreset::SingleColor => single_color(color::rgb(1.0, 1.0, 1.0)),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn black_anchor() {
        let with_black = rainbow_with_black();

        assert_eq!(with_black.len(), rainbow().len() + 1);
        assert_eq!(with_black[0], color::rgb(0.0, 0.0, 0.0));
        assert_eq!(&with_black[1..], rainbow().as_slice());
    }

    #[test]
    fn presets_not_empty() {
        for preset in PalettePreset::ALL {
            assert!(!preset.colors().is_empty(), "{:?}", preset);
        }
        assert_eq!(PalettePreset::SingleColor.colors(), vec![color::rgb(1.0, 1.0, 1.0)]);
    }
}
