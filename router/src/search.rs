use crate::queue::ExpansionList;
use maze_common::db::core::{CellContent, Layout};
use maze_common::db::indices::CellIdx;
use maze_common::util::observer::RouteObserver;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

// Orthogonal offsets: north, east, south, west.
const DIRS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Up to four orthogonal neighbours of `cell`, in a uniformly random
/// permutation per call. Obstacles and cells claimed by other nets are
/// excluded; cells of the net being routed (`net_num`) pass the
/// filter, so a search may flow through its own trunk.
pub fn neighbours(
    layout: &Layout,
    rng: &mut StdRng,
    cell: CellIdx,
    net_num: u32,
) -> Vec<CellIdx> {
    let origin = layout.cell(cell).coord;
    let mut dirs = DIRS;
    dirs.shuffle(rng);

    let mut out = Vec::with_capacity(4);
    for (dx, dy) in dirs {
        let nx = origin.x as i64 + dx;
        let ny = origin.y as i64 + dy;
        if nx < 0 || nx >= layout.xsize as i64 || ny < 0 || ny >= layout.ysize as i64 {
            continue;
        }
        let idx = layout.index_of(nx as u32, ny as u32);
        let cand = layout.cell(idx);
        if cand.is_obstacle() {
            continue;
        }
        if cand.net_num != 0 && cand.net_num != net_num {
            continue;
        }
        out.push(idx);
    }
    out
}

/// Route a single segment starting at `start`.
///
/// With a `target` this is an A* search from `start` (a net source)
/// to `target` (a sink). Without one, `start` is taken to be a sink
/// and Lee-Moore expansion runs outward until it reaches any cell
/// already connected to the same net.
///
/// On success the path is traced back through `prev`, every cell on it
/// is marked connected, and cells that are neither source nor sink are
/// claimed for the net. Transient grid state is cleared on every exit
/// path, so a failed segment leaves earlier routes intact.
pub fn route_segment(
    layout: &mut Layout,
    rng: &mut StdRng,
    observer: &mut dyn RouteObserver,
    start: CellIdx,
    target: Option<CellIdx>,
) -> bool {
    let net_num = layout.cell(start).net_num;
    let start_coord = layout.cell(start).coord;
    match target {
        Some(t) => {
            let tc = layout.cell(t).coord;
            log::info!(
                "net {}: routing ({}, {}) to ({}, {})",
                net_num,
                start_coord.x,
                start_coord.y,
                tc.x,
                tc.y
            );
        }
        None => {
            log::info!(
                "net {}: expanding sink ({}, {})",
                net_num,
                start_coord.x,
                start_coord.y
            );
        }
    }

    let mut expansion = ExpansionList::new();

    // A*: estimated distance to the target. Lee-Moore: 1.
    let initial = match target {
        Some(t) => start_coord.manhattan(layout.cell(t).coord),
        None => 1,
    };
    layout.set_label(start, initial, observer);
    expansion.add(start, initial);

    let mut found = None;
    while let Some(g) = expansion.extract_min() {
        let hit = match target {
            Some(t) => g == t,
            None => {
                let cell = layout.cell(g);
                cell.connected && cell.net_num == net_num && g != start
            }
        };
        if hit {
            found = Some(g);
            break;
        }

        for n in neighbours(layout, rng, g, net_num) {
            if layout.cell(n).label != 0 {
                continue;
            }
            let dist = layout.cell(g).dist_from_src + 1;
            let label = match target {
                Some(t) => dist + layout.cell(n).estimate_dist(layout.cell(t)),
                None => dist,
            };
            {
                let cell = layout.cell_mut(n);
                cell.dist_from_src = dist;
                cell.prev = Some(g);
            }
            layout.set_label(n, label, observer);
            expansion.add(n, label);
        }
    }

    let Some(mut g) = found else {
        log::info!("net {}: couldn't route segment", net_num);
        layout.reset_grid(observer);
        return false;
    };

    // Traceback: walk prev pointers from the meeting cell to start.
    loop {
        let cell = layout.cell_mut(g);
        cell.connected = true;
        if !cell.is_source() && !cell.is_sink() {
            cell.content = CellContent::Net;
            cell.net_num = net_num;
            let coord = cell.coord;
            observer.on_content_changed(coord.x, coord.y, CellContent::Net, net_num);
        }
        if g == start {
            break;
        }
        match layout.cell(g).prev {
            Some(p) => g = p,
            None => break,
        }
    }

    log::info!("net {}: routed segment", net_num);
    layout.reset_grid(observer);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_common::util::observer::NoopObserver;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn grid(xsize: usize, ysize: usize) -> Layout {
        let mut layout = Layout::new();
        layout.init_grid(xsize, ysize);
        layout
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn neighbours_respect_grid_bounds() {
        let layout = grid(3, 3);
        let mut rng = rng();

        let corner = layout.index_of(0, 0);
        let got: HashSet<CellIdx> = neighbours(&layout, &mut rng, corner, 1).into_iter().collect();
        let want: HashSet<CellIdx> = [layout.index_of(1, 0), layout.index_of(0, 1)].into();
        assert_eq!(got, want);

        let centre = layout.index_of(1, 1);
        assert_eq!(neighbours(&layout, &mut rng, centre, 1).len(), 4);
    }

    #[test]
    fn neighbours_skip_obstacles_and_foreign_nets() {
        let mut layout = grid(3, 3);
        let centre = layout.index_of(1, 1);

        let wall = layout.index_of(1, 0);
        layout.cell_mut(wall).content = CellContent::Obstacle;

        let theirs = layout.index_of(2, 1);
        layout.cell_mut(theirs).net_num = 2;

        let ours = layout.index_of(0, 1);
        layout.cell_mut(ours).net_num = 1;

        let mut rng = rng();
        let got: HashSet<CellIdx> = neighbours(&layout, &mut rng, centre, 1).into_iter().collect();
        let want: HashSet<CellIdx> = [ours, layout.index_of(1, 2)].into();
        assert_eq!(got, want);
    }

    #[test]
    fn neighbour_order_is_shuffled_per_call() {
        let layout = grid(3, 3);
        let centre = layout.index_of(1, 1);
        let mut rng = rng();

        let orders: HashSet<Vec<CellIdx>> = (0..32)
            .map(|_| neighbours(&layout, &mut rng, centre, 1))
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn astar_with_start_equal_to_target_succeeds_immediately() {
        let mut layout = grid(3, 3);
        let src = layout.index_of(1, 1);
        {
            let cell = layout.cell_mut(src);
            cell.content = CellContent::Source;
            cell.net_num = 1;
            cell.connected = true;
        }
        let mut rng = rng();

        assert!(route_segment(
            &mut layout,
            &mut rng,
            &mut NoopObserver,
            src,
            Some(src)
        ));
        assert!(layout.cell(src).is_connected());
        assert!(layout.cell(src).is_source());
    }

    #[test]
    fn failed_segment_resets_transient_state() {
        let mut layout = grid(3, 1);
        let src = layout.index_of(0, 0);
        let sink = layout.index_of(2, 0);
        {
            let cell = layout.cell_mut(src);
            cell.content = CellContent::Source;
            cell.net_num = 1;
            cell.connected = true;
        }
        {
            let cell = layout.cell_mut(sink);
            cell.content = CellContent::Sink;
            cell.net_num = 1;
        }
        layout.cell_mut(layout.index_of(1, 0)).content = CellContent::Obstacle;

        let mut rng = rng();
        assert!(!route_segment(
            &mut layout,
            &mut rng,
            &mut NoopObserver,
            src,
            Some(sink)
        ));

        for cell in &layout.grid {
            assert_eq!(cell.label, 0);
            assert_eq!(cell.dist_from_src, 0);
            assert_eq!(cell.prev, None);
        }
        assert!(!layout.cell(sink).is_connected());
        assert!(layout.cell(src).is_connected());
    }
}
