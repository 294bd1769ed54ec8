//! Strike-zone bucketing: pitch coordinates to a 5x5 grid cell.

/// Horizontal bucket edges in feet from the plate center line; anything
/// right of the last edge falls in the outermost column.
pub const PLATE_X_EDGES: [f64; 4] = [-0.708, -0.236, 0.236, 0.708];

/// Vertical bucket edges in feet above the ground.
pub const PLATE_Z_EDGES: [f64; 4] = [1.5, 2.5, 3.5, 4.5];

/// Zone column for a horizontal location, 0 (inside-left) through 4.
pub fn column(px: f64) -> usize {
    for (i, edge) in PLATE_X_EDGES.iter().enumerate() {
        if px <= *edge {
            return i;
        }
    }
    4
}

/// Zone row for a vertical location. The axis is inverted so that row 0 is
/// the top of the zone and row 4 the bottom.
pub fn row(pz: f64) -> usize {
    for (i, edge) in PLATE_Z_EDGES.iter().enumerate() {
        if pz <= *edge {
            return 4 - i;
        }
    }
    0
}

/// (row, column) grid cell for a pitch location.
pub fn bucket(px: f64, pz: f64) -> (usize, usize) {
    (row(pz), column(px))
}
