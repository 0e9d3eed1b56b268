use crate::db::indices::CellIdx;
use crate::geom::coord::GridCoord;
use crate::util::observer::RouteObserver;

/// What currently occupies a grid cell.
///
/// `Source` and `Sink` are fixed at parse time and never change for
/// the lifetime of the routing session; `Net` marks a cell claimed by
/// a traceback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellContent {
    Empty,
    Obstacle,
    Source,
    Sink,
    Net,
}

/// One cell of the layout grid.
///
/// `label`, `dist_from_src` and `prev` are transient search state,
/// valid only while one segment search is in flight and cleared by
/// [`Layout::reset_grid`]. `connected`, `content` and `net_num`
/// describe realized routes and survive resets.
#[derive(Clone, Debug)]
pub struct Cell {
    pub coord: GridCoord,
    pub content: CellContent,
    /// 0 for unclaimed cells, otherwise the 1-based id of the owning net.
    pub net_num: u32,
    /// Priority in the current segment search; 0 means unlabelled.
    pub label: u32,
    pub dist_from_src: u32,
    pub prev: Option<CellIdx>,
    pub connected: bool,
    /// Sinks only: Manhattan distance to the net source, set at parse time.
    pub est_dist_from_src: u32,
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            coord: GridCoord::new(x, y),
            content: CellContent::Empty,
            net_num: 0,
            label: 0,
            dist_from_src: 0,
            prev: None,
            connected: false,
            est_dist_from_src: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content == CellContent::Empty
    }

    pub fn is_obstacle(&self) -> bool {
        self.content == CellContent::Obstacle
    }

    pub fn is_source(&self) -> bool {
        self.content == CellContent::Source
    }

    pub fn is_sink(&self) -> bool {
        self.content == CellContent::Sink
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn clear_label(&mut self) {
        self.label = 0;
    }

    /// Manhattan distance to `target`, the A* heuristic.
    pub fn estimate_dist(&self, target: &Cell) -> u32 {
        self.coord.manhattan(target.coord)
    }
}

/// A net: one source pin plus one or more sink pins, all referring to
/// cells in the owning layout's grid arena.
#[derive(Clone, Debug)]
pub struct Net {
    pub num_pins: usize,
    pub source: CellIdx,
    pub sinks: Vec<CellIdx>,
    /// 1-based id, assigned in file order.
    pub net_num: u32,
}

impl Net {
    /// True once every sink is connected to the source trunk.
    pub fn is_routed(&self, grid: &[Cell]) -> bool {
        self.sinks.iter().all(|s| grid[s.index()].connected)
    }

    /// Stable ascending sort of sinks by estimated distance to the
    /// source. Equal estimates keep file order.
    pub fn sort_sinks(&mut self, grid: &[Cell]) {
        self.sinks
            .sort_by_key(|s| grid[s.index()].est_dist_from_src);
    }
}

/// The routing layout: a dense row-major grid of cells plus the
/// netlist parsed from the input file.
///
/// `obstacles` keeps the obstacle coordinates in parse order so a
/// layout can be written back in the input format.
#[derive(Debug)]
pub struct Layout {
    pub xsize: usize,
    pub ysize: usize,
    pub grid: Vec<Cell>,
    pub netlist: Vec<Net>,
    pub obstacles: Vec<GridCoord>,
}

impl Layout {
    pub fn new() -> Self {
        Self {
            xsize: 0,
            ysize: 0,
            grid: Vec::new(),
            netlist: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    /// Allocate an `xsize` x `ysize` grid of empty cells, discarding
    /// any previous contents.
    pub fn init_grid(&mut self, xsize: usize, ysize: usize) {
        self.grid = Vec::with_capacity(xsize * ysize);
        for y in 0..ysize {
            for x in 0..xsize {
                self.grid.push(Cell::new(x as u32, y as u32));
            }
        }
        self.xsize = xsize;
        self.ysize = ysize;
        self.netlist.clear();
        self.obstacles.clear();
    }

    #[inline(always)]
    pub fn index_of(&self, x: u32, y: u32) -> CellIdx {
        assert!(
            (x as usize) < self.xsize && (y as usize) < self.ysize,
            "cell ({}, {}) outside {}x{} grid",
            x,
            y,
            self.xsize,
            self.ysize
        );
        CellIdx::new(y as usize * self.xsize + x as usize)
    }

    #[inline(always)]
    pub fn cell(&self, idx: CellIdx) -> &Cell {
        &self.grid[idx.index()]
    }

    #[inline(always)]
    pub fn cell_mut(&mut self, idx: CellIdx) -> &mut Cell {
        &mut self.grid[idx.index()]
    }

    pub fn cell_at(&self, x: u32, y: u32) -> &Cell {
        self.cell(self.index_of(x, y))
    }

    /// Label a cell and notify the observer channel.
    pub fn set_label(&mut self, idx: CellIdx, label: u32, observer: &mut dyn RouteObserver) {
        let cell = &mut self.grid[idx.index()];
        cell.label = label;
        let coord = cell.coord;
        observer.on_label_changed(coord.x, coord.y, label);
    }

    /// Clear all transient search state. `connected`, `content` and
    /// `net_num` are deliberately left alone so failed segments cannot
    /// corrupt previously realized routes.
    pub fn reset_grid(&mut self, observer: &mut dyn RouteObserver) {
        for cell in &mut self.grid {
            cell.clear_label();
            cell.dist_from_src = 0;
            cell.prev = None;
        }
        observer.on_grid_reset();
    }

    /// Stable ascending sort of the netlist by pin count. This is the
    /// default routing order.
    pub fn sort_netlist(&mut self) {
        self.netlist.sort_by_key(|net| net.num_pins);
    }

    /// Render the grid as text: sources as `[Ns]`, sinks as `[Nt]`,
    /// labelled cells as the label, obstacles as `[**]`, claimed cells
    /// as `[Nn]`.
    pub fn print_grid(&self, out: &mut impl std::fmt::Write) -> std::fmt::Result {
        for y in 0..self.ysize {
            for x in 0..self.xsize {
                let cell = self.cell_at(x as u32, y as u32);
                if cell.is_source() {
                    write!(out, "[{}s]", cell.net_num)?;
                } else if cell.is_sink() {
                    write!(out, "[{}t]", cell.net_num)?;
                } else if cell.label != 0 {
                    write!(out, "[{:>2}]", cell.label)?;
                } else if cell.is_obstacle() {
                    write!(out, "[**]")?;
                } else if cell.content == CellContent::Net {
                    write!(out, "[{}n]", cell.net_num)?;
                } else {
                    write!(out, "[  ]")?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}
