use crate::search::route_segment;
use maze_common::db::core::Layout;
use maze_common::util::observer::RouteObserver;
use rand::rngs::StdRng;
use std::time::Instant;

/// Outcome of a routing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteSummary {
    pub routed: usize,
    pub total: usize,
}

/// Everything one routing pass mutates, passed explicitly: the layout,
/// the neighbour-ordering RNG (the sole source of nondeterminism) and
/// the observer sink. There is no module-level state.
pub struct RouteCtx<'a> {
    pub layout: &'a mut Layout,
    pub rng: StdRng,
    pub observer: &'a mut dyn RouteObserver,
}

impl<'a> RouteCtx<'a> {
    pub fn new(layout: &'a mut Layout, rng: StdRng, observer: &'a mut dyn RouteObserver) -> Self {
        Self {
            layout,
            rng,
            observer,
        }
    }
}

/// Route every net in the netlist, greedily and in order.
///
/// Nets are sorted ascending by pin count, sinks within a net
/// ascending by estimated distance to the source (both stable). The
/// first segment of a net runs A* from the source to the closest
/// sink; each further sink expands Lee-Moore style until it reaches
/// the net's trunk. A failed segment never aborts the pass.
pub fn route(ctx: &mut RouteCtx<'_>) -> RouteSummary {
    let start = Instant::now();
    let layout = &mut *ctx.layout;

    layout.sort_netlist();

    let total = layout.netlist.len();
    let mut routed = 0;

    for i in 0..total {
        let net_num = layout.netlist[i].net_num;
        log::info!("routing net {}...", net_num);

        {
            let Layout { grid, netlist, .. } = layout;
            netlist[i].sort_sinks(grid);
        }

        let source = layout.netlist[i].source;
        let sinks = layout.netlist[i].sinks.clone();

        if let Some((&first, rest)) = sinks.split_first() {
            route_segment(layout, &mut ctx.rng, &mut *ctx.observer, source, Some(first));

            if !rest.is_empty() {
                log::info!("net {} has multiple sinks", net_num);
                for &sink in rest {
                    route_segment(layout, &mut ctx.rng, &mut *ctx.observer, sink, None);
                }
            }
        }

        if layout.netlist[i].is_routed(&layout.grid) {
            routed += 1;
        } else {
            log::warn!("net {} left unrouted", net_num);
        }
    }

    let summary = RouteSummary { routed, total };
    log::info!(
        "Routed {}/{} nets in {:.2}s",
        routed,
        total,
        start.elapsed().as_secs_f32()
    );
    ctx.observer.on_routing_finished(routed, total);
    summary
}
