use crate::pathing_grid::CellKind;
use grid_util::point::Point;
use thiserror::Error;

/// Errors raised while building a [PathingGrid](crate::PathingGrid) or relocating its endpoints.
///
/// Running out of open cells is not an error: it is reported as
/// [SearchState::Stuck](crate::SearchState::Stuck).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PathfindingError {
    /// No cell of the given endpoint kind exists in the source grid.
    #[error("no {0} cell marked on the grid")]
    MissingEndpoint(CellKind),
    /// More than one cell carries the given endpoint kind.
    #[error("multiple {kind} cells marked, at {first} and {second}")]
    AmbiguousEndpoint {
        kind: CellKind,
        first: Point,
        second: Point,
    },
    /// The cell buffer does not hold `width * height` entries, or the dimensions cannot be
    /// addressed with `i32` coordinates.
    #[error("expected {expected} cells but got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    /// The relocation target is a wall.
    #[error("{0} is a wall")]
    Blocked(Point),
    /// The relocation target is already taken by the other endpoint.
    #[error("{0} already holds an endpoint")]
    Occupied(Point),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_cell() {
        let err = PathfindingError::MissingEndpoint(CellKind::End);
        assert_eq!(err.to_string(), "no end cell marked on the grid");
        let err = PathfindingError::OutOfBounds {
            x: -1,
            y: 2,
            width: 5,
            height: 5,
        };
        assert_eq!(err.to_string(), "(-1, 2) lies outside the 5x5 grid");
    }
}
