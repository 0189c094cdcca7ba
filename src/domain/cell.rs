/// Cell kinds and grid geometry.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Empty,
    Firewall, // Solid: the packet dies on contact
    Exit,     // Delivery target
}

impl Cell {
    /// Does entering this cell destroy the packet?
    pub fn is_firewall(self) -> bool {
        matches!(self, Cell::Firewall)
    }

    /// Is this the delivery cell?
    pub fn is_exit(self) -> bool {
        matches!(self, Cell::Exit)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// A grid coordinate. Signed so that off-grid candidates (e.g. a MOV LEFT
/// from column 0) are representable and can be rejected by bounds checks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// The cell reached by moving (dx, dy) from here.
    pub fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos { x: self.x + dx, y: self.y + dy }
    }
}

/// A level's array: rectangular, immutable once built.
///
/// Out-of-bounds is NOT treated as wall here. The engine distinguishes
/// "out of bounds" from "firewall collision", so lookups return `None`
/// past the edge instead of a synthetic solid cell.
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build from row-major cells. Rows must be equal length and non-empty;
    /// the level loader validates that before constructing.
    pub fn new(cells: Vec<Vec<Cell>>) -> Self {
        let height = cells.len();
        let width = cells.first().map_or(0, |r| r.len());
        Grid { cells, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, p: Pos) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }

    /// Cell at `p`, or `None` outside the array.
    pub fn at(&self, p: Pos) -> Option<Cell> {
        if self.in_bounds(p) {
            Some(self.cells[p.y as usize][p.x as usize])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> Grid {
        let cells = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| match ch {
                        '#' => Cell::Firewall,
                        'E' => Cell::Exit,
                        _ => Cell::Empty,
                    })
                    .collect()
            })
            .collect();
        Grid::new(cells)
    }

    #[test]
    fn lookup_inside_bounds() {
        let g = grid_from(&["..#", ".E."]);
        assert_eq!(g.at(Pos::new(2, 0)), Some(Cell::Firewall));
        assert_eq!(g.at(Pos::new(1, 1)), Some(Cell::Exit));
        assert_eq!(g.at(Pos::new(0, 0)), Some(Cell::Empty));
    }

    #[test]
    fn lookup_outside_bounds_is_none() {
        let g = grid_from(&[".."]);
        assert_eq!(g.at(Pos::new(-1, 0)), None);
        assert_eq!(g.at(Pos::new(0, -1)), None);
        assert_eq!(g.at(Pos::new(2, 0)), None);
        assert_eq!(g.at(Pos::new(0, 1)), None);
    }

    #[test]
    fn dimensions() {
        let g = grid_from(&["....", "....", "...."]);
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
    }

    #[test]
    fn offset_goes_negative() {
        let p = Pos::new(0, 0).offset(-1, 0);
        assert_eq!(p, Pos::new(-1, 0));
    }
}
