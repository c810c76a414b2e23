pub(crate) const RIGHT: u8 = 0b0001;
pub(crate) const LEFT: u8 = 0b0010;
pub(crate) const UP: u8 = 0b0100;
pub(crate) const DOWN: u8 = 0b1000;

/// Cardinal neighbours checked for same-kind tiles, paired with their mask bit.
pub(crate) const CARDINAL_NEIGHBORS: [((i32, i32), u8); 4] = [
    ((1, 0), RIGHT),
    ((-1, 0), LEFT),
    ((0, -1), UP),
    ((0, 1), DOWN),
];

/// Neighbour mask -> rendering variant. Masks not listed keep the tile's variant.
const AUTOTILE_VARIANTS: [(u8, u32); 9] = [
    (RIGHT | DOWN, 0),
    (RIGHT | DOWN | LEFT, 1),
    (LEFT | DOWN, 2),
    (LEFT | UP | DOWN, 3),
    (LEFT | UP, 4),
    (LEFT | UP | RIGHT, 5),
    (RIGHT | UP, 6),
    (RIGHT | UP | DOWN, 7),
    (RIGHT | LEFT | UP | DOWN, 8),
];

pub(crate) fn variant_for_mask(mask: u8) -> Option<u32> {
    AUTOTILE_VARIANTS
        .iter()
        .find(|(candidate, _)| *candidate == mask)
        .map(|(_, variant)| *variant)
}
