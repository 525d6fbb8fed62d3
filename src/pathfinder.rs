use crate::distance;
use crate::error::PathfindingError;
use crate::open_set::{FxIndexSet, OpenSet};
use crate::pathing_grid::{Cell, CellKind, Membership, PathingGrid};
use core::fmt;
use grid_util::point::Point;
use log::{debug, info, warn};

/// When the search is considered solved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GoalCheck {
    /// Stop as soon as the end is first reached by a relaxation. Finishes earlier, but the path
    /// is not guaranteed to be the cheapest.
    #[default]
    OnDiscovery,
    /// Stop only when the end is selected for expansion, which yields a cost-optimal path.
    OnExpansion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// Open cells remain and the end has not been reached.
    Unsolved,
    /// The end has a finalized parent chain back to the start.
    Solved,
    /// The open set ran dry without reaching the end; no path exists.
    Stuck,
}

/// Incremental A* over a [PathingGrid]. Every call to [step](Self::step) expands exactly one
/// cell, so a render loop can advance the search once per frame and draw
/// [current_path](Self::current_path) in between.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    grid: PathingGrid,
    open: OpenSet,
    closed: FxIndexSet<usize>,
    path_found: bool,
    current: usize,
    pub goal_check: GoalCheck,
}

impl Pathfinder {
    /// Takes ownership of the grid and seeds the open set with the start.
    pub fn new(grid: PathingGrid) -> Pathfinder {
        let current = grid.start_ix();
        let mut pathfinder = Pathfinder {
            grid,
            open: OpenSet::new(),
            closed: FxIndexSet::default(),
            path_found: false,
            current,
            goal_check: GoalCheck::default(),
        };
        pathfinder.reset_path();
        pathfinder
    }
    pub fn from_rgb(
        width: usize,
        height: usize,
        pixels: &[[u8; 3]],
    ) -> Result<Pathfinder, PathfindingError> {
        PathingGrid::from_rgb(width, height, pixels).map(Pathfinder::new)
    }
    pub fn from_kinds(
        width: usize,
        height: usize,
        kinds: Vec<CellKind>,
    ) -> Result<Pathfinder, PathfindingError> {
        PathingGrid::from_kinds(width, height, kinds).map(Pathfinder::new)
    }
    pub fn from_ascii(map: &str) -> Result<Pathfinder, PathfindingError> {
        PathingGrid::from_ascii(map).map(Pathfinder::new)
    }
    pub fn with_goal_check(mut self, goal_check: GoalCheck) -> Pathfinder {
        self.goal_check = goal_check;
        self
    }

    pub fn grid(&self) -> &PathingGrid {
        &self.grid
    }
    pub fn map_size(&self) -> (usize, usize) {
        (self.grid.width(), self.grid.height())
    }
    pub fn start(&self) -> Point {
        self.grid.start()
    }
    pub fn end(&self) -> Point {
        self.grid.end()
    }
    /// The most recently expanded cell, or the start right after a reset.
    pub fn current(&self) -> Point {
        self.grid.point(self.current)
    }
    pub fn cell(&self, point: &Point) -> Option<&Cell> {
        self.grid.cell(point)
    }
    pub fn path_found(&self) -> bool {
        self.path_found
    }
    pub fn state(&self) -> SearchState {
        if self.path_found {
            SearchState::Solved
        } else if self.open.is_empty() {
            SearchState::Stuck
        } else {
            SearchState::Unsolved
        }
    }
    /// Cells waiting for expansion, in the order they were discovered.
    pub fn open_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.open.iter().map(|ix| self.grid.point(ix))
    }
    /// Cells already expanded, in expansion order.
    pub fn closed_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.closed.iter().map(|&ix| self.grid.point(ix))
    }
    /// Checks on the precomputed components whether the end can be reached at all.
    pub fn end_reachable(&self) -> bool {
        self.grid.reachable(&self.grid.start(), &self.grid.end())
    }

    /// Advances the search by one expansion and returns the cell it touched. Once solved this is
    /// a no-op returning the end; once stuck it is a no-op returning the start.
    pub fn step(&mut self) -> Point {
        if self.path_found {
            return self.grid.end();
        }
        let grid = &self.grid;
        let Some(current) = self.open.pop_best(|ix| grid.cell_at(ix).cost_key()) else {
            return self.grid.start();
        };
        self.closed.insert(current);
        self.grid.cell_at_mut(current).membership = Membership::Closed;
        self.current = current;
        let current_point = self.grid.point(current);
        debug!("Expanding {}", current_point);

        let end_ix = self.grid.end_ix();
        if current == end_ix {
            return self.finish();
        }

        let end = self.grid.end();
        let current_g = self.grid.cell_at(current).g_cost.unwrap_or(0);
        for n in self.grid.neighbours(current) {
            let n_point = self.grid.point(n);
            let tentative_g = current_g + distance(&current_point, &n_point);
            let in_open = self.open.contains(n);
            let cell = self.grid.cell_at_mut(n);
            cell.visits += 1;
            // Undiscovered cells carry no g-cost, so they are always relaxed
            let improves = cell.g_cost.map_or(true, |g| tentative_g < g);
            if !in_open || improves {
                cell.g_cost = Some(tentative_g);
                cell.h_cost = distance(&n_point, &end);
                cell.parent = Some(current);
                if !in_open {
                    cell.membership = Membership::Open;
                    self.open.insert(n);
                }
                if n == end_ix && self.goal_check == GoalCheck::OnDiscovery {
                    self.current = n;
                    return self.finish();
                }
            }
        }
        if self.open.is_empty() {
            warn!(
                "Open set exhausted after {} expansions, {} cannot be reached from {}",
                self.closed.len(),
                end,
                self.grid.start()
            );
        }
        current_point
    }

    fn finish(&mut self) -> Point {
        self.path_found = true;
        let end = self.grid.end();
        info!(
            "Path to {} found after {} expansions, cost {:?}",
            end,
            self.closed.len(),
            self.grid.cell_at(self.grid.end_ix()).g_cost
        );
        end
    }

    /// Calls [step](Self::step) until the search is solved or stuck, or `max_steps` calls were
    /// made. Returns the number of calls.
    pub fn solve(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.state() == SearchState::Unsolved {
            self.step();
            steps += 1;
        }
        steps
    }

    /// Follows parent links from `from` back to the start, returning the cells from `from` to the
    /// start inclusive. Valid at any point during the search; for an undiscovered cell only the
    /// cell itself is returned and for a point outside the grid the result is empty.
    pub fn retrace_path(&self, from: Point) -> Vec<Point> {
        let Some(from_ix) = self.grid.get_ix_point(&from) else {
            return Vec::new();
        };
        let start = self.grid.start_ix();
        // Parent links are acyclic; the bound only caps the walk at the grid size
        std::iter::successors(Some(from_ix), |&ix| {
            if ix == start {
                None
            } else {
                self.grid.cell_at(ix).parent
            }
        })
        .take(self.grid.len())
        .map(|ix| self.grid.point(ix))
        .collect()
    }
    /// Best known trace from the most recently expanded cell back to the start.
    pub fn current_path(&self) -> Vec<Point> {
        self.retrace_path(self.current())
    }
    /// The finished path in start to end order, [None] until the search is solved.
    pub fn path(&self) -> Option<Vec<Point>> {
        self.path_found.then(|| {
            let mut path = self.retrace_path(self.grid.end());
            path.reverse();
            path
        })
    }

    /// Clears the open and closed sets, reseeds the open set with the start and resets all costs.
    /// The cell classification is kept.
    pub fn reset_path(&mut self) {
        self.open.clear();
        self.closed.clear();
        self.grid.clear_search();
        let start = self.grid.start_ix();
        self.grid.cell_at_mut(start).membership = Membership::Open;
        self.open.insert(start);
        self.current = start;
        self.path_found = false;
    }

    /// Moves the start to `(x, y)` and restarts the search. Rejected moves are logged and leave
    /// everything untouched. Returns the start position after the call.
    pub fn move_start(&mut self, x: i32, y: i32) -> Point {
        match self.try_move_start(x, y) {
            Ok(start) => start,
            Err(err) => {
                warn!("Start not moved: {}", err);
                self.grid.start()
            }
        }
    }
    /// Moves the end to `(x, y)` and restarts the search, see [move_start](Self::move_start).
    pub fn move_end(&mut self, x: i32, y: i32) -> Point {
        match self.try_move_end(x, y) {
            Ok(end) => end,
            Err(err) => {
                warn!("End not moved: {}", err);
                self.grid.end()
            }
        }
    }
    pub fn try_move_start(&mut self, x: i32, y: i32) -> Result<Point, PathfindingError> {
        self.relocate(CellKind::Start, x, y)
    }
    pub fn try_move_end(&mut self, x: i32, y: i32) -> Result<Point, PathfindingError> {
        self.relocate(CellKind::End, x, y)
    }
    fn relocate(&mut self, kind: CellKind, x: i32, y: i32) -> Result<Point, PathfindingError> {
        let target = self.grid.relocate(kind, x, y)?;
        info!("Moved {} to {}, restarting search", kind, target);
        self.reset_path();
        Ok(target)
    }
}

/// Draws the grid with the search overlaid: `*` for the current trace, `o` for open and `x` for
/// closed cells.
impl fmt::Display for Pathfinder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let trace = self.current_path();
        for y in 0..self.grid.height() as i32 {
            let line = (0..self.grid.width() as i32)
                .map(|x| {
                    let p = Point::new(x, y);
                    let Some(cell) = self.grid.cell(&p) else {
                        return ' ';
                    };
                    match cell.kind() {
                        CellKind::Free if trace.contains(&p) => '*',
                        CellKind::Free => match cell.membership() {
                            Membership::Open => 'o',
                            Membership::Closed => 'x',
                            Membership::Unvisited => '.',
                        },
                        kind => kind.symbol(),
                    }
                })
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
