/// Grid coordinates, directions and map bounds.
///
/// Every write to a `Position` is clamped per axis: a component that would
/// leave `[0, width) x [0, height)` keeps its previous value.

/// Map extents in tiles.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Self {
        Bounds { width, height }
    }

    pub fn contains_x(self, x: i32) -> bool {
        x >= 0 && x < self.width
    }

    pub fn contains_y(self, y: i32) -> bool {
        y >= 0 && y < self.height
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Tile delta (dx, dy); y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Start at the origin and apply a clamped write.
    pub fn new(x: i32, y: i32, bounds: Bounds) -> Self {
        let mut p = Position { x: 0, y: 0 };
        p.set(x, y, bounds);
        p
    }

    pub fn x(self) -> i32 { self.x }
    pub fn y(self) -> i32 { self.y }

    pub fn set(&mut self, x: i32, y: i32, bounds: Bounds) {
        if bounds.contains_x(x) { self.x = x; }
        if bounds.contains_y(y) { self.y = y; }
    }

    /// Position offset by (dx, dy), clamped per axis.
    pub fn offset(self, dx: i32, dy: i32, bounds: Bounds) -> Position {
        let mut p = self;
        p.set(self.x + dx, self.y + dy, bounds);
        p
    }

    /// Neighbouring tile in `dir`; unchanged at the map edge.
    pub fn step(self, dir: Direction, bounds: Bounds) -> Position {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const B: Bounds = Bounds { width: 8, height: 6 };

    #[test]
    fn out_of_range_write_keeps_axis() {
        let mut p = Position::new(3, 2, B);
        p.set(-1, 4, B);
        assert_eq!((p.x(), p.y()), (3, 4));
        p.set(5, 6, B);
        assert_eq!((p.x(), p.y()), (5, 4));
    }

    #[test]
    fn new_outside_bounds_falls_back_to_origin_axis() {
        let p = Position::new(20, 3, B);
        assert_eq!((p.x(), p.y()), (0, 3));
    }

    #[test]
    fn step_at_edge_is_identity() {
        let corner = Position::new(0, 0, B);
        assert_eq!(corner.step(Direction::Up, B), corner);
        assert_eq!(corner.step(Direction::Left, B), corner);
        assert_eq!(corner.step(Direction::Right, B), Position::new(1, 0, B));
    }

    #[test]
    fn opposite_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_step_then_back_returns_unless_clamped(
            x in 0..B.width,
            y in 0..B.height,
            d in direction(),
        ) {
            let p = Position::new(x, y, B);
            let moved = p.step(d, B);
            let (dx, dy) = d.delta();
            let clamped = !B.contains_x(x + dx) || !B.contains_y(y + dy);
            if clamped {
                prop_assert_eq!(moved, p);
            } else {
                prop_assert_eq!(moved.step(d.opposite(), B), p);
            }
        }

        #[test]
        fn prop_positions_stay_in_bounds(
            x in -20i32..20,
            y in -20i32..20,
            dx in -3i32..=3,
            dy in -3i32..=3,
        ) {
            let p = Position::new(x, y, B).offset(dx, dy, B);
            prop_assert!(B.contains_x(p.x()));
            prop_assert!(B.contains_y(p.y()));
        }
    }
}
