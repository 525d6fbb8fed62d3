use crate::error::PathfindingError;
use crate::open_set::CostKey;
use crate::{distance, N_SMALLVEC_SIZE};
use core::fmt;
use grid_util::point::Point;
use log::info;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Classification of a cell, assigned once from the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Free,
    Wall,
    Start,
    End,
}

impl CellKind {
    /// Maps a pixel color to a kind: green is a wall, blue the start and red the end. White and
    /// every unrecognised color are free floor.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> CellKind {
        match (r, g, b) {
            (0, 255, 0) => CellKind::Wall,
            (0, 0, 255) => CellKind::Start,
            (255, 0, 0) => CellKind::End,
            _ => CellKind::Free,
        }
    }
    pub fn from_symbol(symbol: char) -> CellKind {
        match symbol {
            '#' => CellKind::Wall,
            'S' => CellKind::Start,
            'E' => CellKind::End,
            _ => CellKind::Free,
        }
    }
    pub fn symbol(self) -> char {
        match self {
            CellKind::Free => '.',
            CellKind::Wall => '#',
            CellKind::Start => 'S',
            CellKind::End => 'E',
        }
    }
    pub fn walkable(self) -> bool {
        self != CellKind::Wall
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CellKind::Free => "free",
            CellKind::Wall => "wall",
            CellKind::Start => "start",
            CellKind::End => "end",
        };
        f.write_str(name)
    }
}

/// Which search set a cell currently belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Membership {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Search bookkeeping for one grid position. Parents are dense indices into the owning
/// [PathingGrid], never references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub(crate) kind: CellKind,
    pub(crate) g_cost: Option<i32>,
    pub(crate) h_cost: i32,
    pub(crate) parent: Option<usize>,
    pub(crate) membership: Membership,
    pub(crate) visits: u32,
}

impl Cell {
    fn new(kind: CellKind) -> Cell {
        Cell {
            kind,
            g_cost: None,
            h_cost: 0,
            parent: None,
            membership: Membership::Unvisited,
            visits: 0,
        }
    }
    fn clear(&mut self) {
        *self = Cell::new(self.kind);
    }
    pub fn kind(&self) -> CellKind {
        self.kind
    }
    /// Cost of the best known route from the start, [None] while the cell is undiscovered.
    pub fn g_cost(&self) -> Option<i32> {
        self.g_cost
    }
    pub fn h_cost(&self) -> i32 {
        self.h_cost
    }
    pub fn f_cost(&self) -> Option<i32> {
        self.g_cost.map(|g| g + self.h_cost)
    }
    /// Index of the predecessor on the best known route, see [PathingGrid::point].
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
    pub fn membership(&self) -> Membership {
        self.membership
    }
    /// How often the cell was inspected as a neighbour of an expanded cell.
    pub fn visits(&self) -> u32 {
        self.visits
    }
    pub(crate) fn cost_key(&self) -> CostKey {
        CostKey {
            estimated_cost: self.f_cost().unwrap_or(i32::MAX),
            heuristic: self.h_cost,
        }
    }
}

/// [PathingGrid] owns a dense, row-major table of [Cell]s together with the positions of the
/// unique start and end. Walkable cells are grouped into connected components with a
/// [UnionFind] structure so reachability can be queried without searching.
#[derive(Clone, Debug)]
pub struct PathingGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    start: usize,
    end: usize,
    pub components: UnionFind<usize>,
}

impl PathingGrid {
    /// Builds a grid from one kind per cell in row-major order. Exactly one [CellKind::Start] and
    /// one [CellKind::End] must be present.
    pub fn from_kinds(
        width: usize,
        height: usize,
        kinds: Vec<CellKind>,
    ) -> Result<PathingGrid, PathfindingError> {
        // Coordinates are i32, so each side must fit and the cell count must not overflow
        let max_side = i32::MAX as usize;
        let cell_count = width
            .checked_mul(height)
            .filter(|_| width <= max_side && height <= max_side)
            .ok_or(PathfindingError::DimensionMismatch {
                expected: usize::MAX,
                actual: kinds.len(),
            })?;
        if kinds.len() != cell_count {
            return Err(PathfindingError::DimensionMismatch {
                expected: cell_count,
                actual: kinds.len(),
            });
        }
        let point = |ix: usize| Point::new((ix % width) as i32, (ix / width) as i32);
        let mut start = None;
        let mut end = None;
        for (ix, kind) in kinds.iter().enumerate() {
            let slot = match kind {
                CellKind::Start => &mut start,
                CellKind::End => &mut end,
                _ => continue,
            };
            if let Some(first) = *slot {
                return Err(PathfindingError::AmbiguousEndpoint {
                    kind: *kind,
                    first: point(first),
                    second: point(ix),
                });
            }
            *slot = Some(ix);
        }
        let start = start.ok_or(PathfindingError::MissingEndpoint(CellKind::Start))?;
        let end = end.ok_or(PathfindingError::MissingEndpoint(CellKind::End))?;

        let mut grid = PathingGrid {
            width,
            height,
            cells: kinds.into_iter().map(Cell::new).collect(),
            start,
            end,
            components: UnionFind::new(width * height),
        };
        grid.generate_components();
        info!(
            "Loaded {}x{} grid, start at {}, end at {}",
            width,
            height,
            grid.start(),
            grid.end()
        );
        Ok(grid)
    }

    /// Builds a grid from decoded image pixels in row-major order, see [CellKind::from_rgb].
    pub fn from_rgb(
        width: usize,
        height: usize,
        pixels: &[[u8; 3]],
    ) -> Result<PathingGrid, PathfindingError> {
        let kinds = pixels
            .iter()
            .map(|&[r, g, b]| CellKind::from_rgb(r, g, b))
            .collect::<Vec<_>>();
        PathingGrid::from_kinds(width, height, kinds)
    }

    /// Parses rows of `.`, `#`, `S` and `E`, the same layout [Display](fmt::Display) produces.
    /// Blank lines and surrounding whitespace are ignored; all rows must be equally long.
    pub fn from_ascii(map: &str) -> Result<PathingGrid, PathfindingError> {
        let rows = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut kinds = Vec::with_capacity(width * rows.len());
        for row in &rows {
            let len = row.chars().count();
            if len != width {
                return Err(PathfindingError::DimensionMismatch {
                    expected: width,
                    actual: len,
                });
            }
            kinds.extend(row.chars().map(CellKind::from_symbol));
        }
        PathingGrid::from_kinds(width, rows.len(), kinds)
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn start(&self) -> Point {
        self.point(self.start)
    }
    pub fn end(&self) -> Point {
        self.point(self.end)
    }
    pub(crate) fn start_ix(&self) -> usize {
        self.start
    }
    pub(crate) fn end_ix(&self) -> usize {
        self.end
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
    pub fn get_ix(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }
    pub fn get_ix_point(&self, point: &Point) -> Option<usize> {
        self.get_ix(point.x, point.y)
    }
    /// Inverse of [get_ix](Self::get_ix). The index must belong to this grid.
    pub fn point(&self, ix: usize) -> Point {
        Point::new((ix % self.width) as i32, (ix / self.width) as i32)
    }
    pub fn cell(&self, point: &Point) -> Option<&Cell> {
        self.get_ix_point(point).map(|ix| &self.cells[ix])
    }
    pub(crate) fn cell_at(&self, ix: usize) -> &Cell {
        &self.cells[ix]
    }
    pub(crate) fn cell_at_mut(&mut self, ix: usize) -> &mut Cell {
        &mut self.cells[ix]
    }

    /// In-bounds Moore neighbours of `ix` that are neither walls nor closed. Diagonal moves
    /// between two blocked orthogonal cells are allowed.
    pub fn neighbours(&self, ix: usize) -> SmallVec<[usize; N_SMALLVEC_SIZE]> {
        let p = self.point(ix);
        let mut neighbours = SmallVec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(n) = self.get_ix(p.x + dx, p.y + dy) else {
                    continue;
                };
                let cell = &self.cells[n];
                if cell.kind.walkable() && cell.membership != Membership::Closed {
                    neighbours.push(n);
                }
            }
        }
        neighbours
    }

    /// Discards all search progress and seeds the endpoint costs. The end receives a placeholder
    /// g-cost that is overwritten once it is first relaxed.
    pub(crate) fn clear_search(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        let start = self.start();
        let end = self.end();
        let start_cell = &mut self.cells[self.start];
        start_cell.g_cost = Some(0);
        start_cell.h_cost = distance(&start, &end);
        let end_cell = &mut self.cells[self.end];
        end_cell.h_cost = 0;
        end_cell.g_cost = Some(distance(&end, &start));
    }

    /// Moves the start (`kind == Start`) or end (otherwise) onto the cell at `(x, y)`. The vacated
    /// cell becomes free floor. Walls and the other endpoint are rejected.
    pub(crate) fn relocate(
        &mut self,
        kind: CellKind,
        x: i32,
        y: i32,
    ) -> Result<Point, PathfindingError> {
        let target = self
            .get_ix(x, y)
            .ok_or(PathfindingError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })?;
        let (own, other) = if kind == CellKind::Start {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        let target_point = self.point(target);
        if target == own {
            return Ok(target_point);
        }
        if target == other {
            return Err(PathfindingError::Occupied(target_point));
        }
        if !self.cells[target].kind.walkable() {
            return Err(PathfindingError::Blocked(target_point));
        }
        self.cells[own].kind = CellKind::Free;
        self.cells[target].kind = kind;
        if kind == CellKind::Start {
            self.start = target;
        } else {
            self.end = target;
        }
        Ok(target_point)
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, point: &Point) -> Option<usize> {
        self.get_ix_point(point).map(|ix| self.components.find(ix))
    }
    /// Checks if start and goal are walkable and on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        match (self.get_ix_point(start), self.get_ix_point(goal)) {
            (Some(start_ix), Some(goal_ix)) => {
                self.cells[start_ix].kind.walkable()
                    && self.cells[goal_ix].kind.walkable()
                    && self.components.equiv(start_ix, goal_ix)
            }
            _ => false,
        }
    }
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        !self.reachable(start, goal)
    }

    /// Generates a new [UnionFind] structure and links up walkable 8-neighbours to the same
    /// components. Only the forward half of the neighbourhood is visited, the other half is
    /// covered from the neighbour's side.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.cells.len());
        for ix in 0..self.cells.len() {
            if !self.cells[ix].kind.walkable() {
                continue;
            }
            let p = self.point(ix);
            for (dx, dy) in [(1, -1), (1, 0), (1, 1), (0, 1)] {
                if let Some(n) = self.get_ix(p.x + dx, p.y + dy) {
                    if self.cells[n].kind.walkable() {
                        self.components.union(ix, n);
                    }
                }
            }
        }
    }
}

impl fmt::Display for PathingGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            let line = row.iter().map(|cell| cell.kind.symbol()).collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
