//! # stepwise_pathfinding
//!
//! An incremental [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) search on a grid that
//! was classified from an image (walls, a single start and a single end). Instead of running to
//! completion, [Pathfinder::step] performs exactly one expansion per call so that a render loop
//! can drive the search one frame at a time and draw the best-known path in between.
//!
//! Moves are 8-connected with integer costs [C] for cardinal and [D] for diagonal steps. The same
//! [distance] function serves as edge weight and heuristic, which keeps the heuristic admissible
//! and consistent on unit grid steps.
mod error;
mod open_set;
pub mod pathfinder;
pub mod pathing_grid;

pub use error::PathfindingError;
pub use pathfinder::{GoalCheck, Pathfinder, SearchState};
pub use pathing_grid::{Cell, CellKind, Membership, PathingGrid};

use grid_util::point::Point;

/// Cost of a cardinal (straight) move.
pub const C: i32 = 10;
/// Cost of a diagonal move, approximately `C * sqrt(2)`.
pub const D: i32 = 14;

pub(crate) const N_SMALLVEC_SIZE: usize = 8;

/// Octile distance between two points: the cost of taking as many diagonal steps as possible
/// before going straight. Between direct neighbours this is exactly the move cost, so it is used
/// both as the heuristic and as the edge weight.
pub fn distance(a: &Point, b: &Point) -> i32 {
    let delta_x = (a.x - b.x).abs();
    let delta_y = (a.y - b.y).abs();
    if delta_x > delta_y {
        D * delta_y + C * (delta_x - delta_y)
    } else {
        D * delta_x + C * (delta_y - delta_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbour_costs() {
        let origin = Point::new(2, 2);
        assert_eq!(distance(&origin, &Point::new(3, 2)), C);
        assert_eq!(distance(&origin, &Point::new(2, 1)), C);
        assert_eq!(distance(&origin, &Point::new(1, 1)), D);
        assert_eq!(distance(&origin, &Point::new(3, 3)), D);
        assert_eq!(distance(&origin, &origin), 0);
    }

    #[test]
    fn takes_diagonals_first() {
        // Three diagonal steps followed by two straight ones
        assert_eq!(distance(&Point::new(0, 0), &Point::new(5, 3)), 3 * D + 2 * C);
        assert_eq!(distance(&Point::new(0, 0), &Point::new(3, 5)), 3 * D + 2 * C);
    }

    #[test]
    fn symmetric() {
        for (ax, ay, bx, by) in [(0, 0, 4, 4), (1, 7, 3, 2), (-2, 5, 6, -1), (9, 0, 0, 9)] {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            assert_eq!(distance(&a, &b), distance(&b, &a));
        }
    }
}
