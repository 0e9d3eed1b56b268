use crate::db::core::CellContent;

/// Capability set through which the core reports progress to a
/// presentation layer. The core never draws; a GUI subscribes here,
/// headless runs install [`NoopObserver`].
pub trait RouteObserver {
    /// A cell's search label changed (fired by `Layout::set_label`).
    fn on_label_changed(&mut self, x: u32, y: u32, label: u32);

    /// A traceback claimed a cell for a net.
    fn on_content_changed(&mut self, x: u32, y: u32, content: CellContent, net_num: u32);

    /// Transient search state was cleared; recolour wholesale.
    fn on_grid_reset(&mut self);

    /// The routing pass finished.
    fn on_routing_finished(&mut self, routed: usize, total: usize);
}

pub struct NoopObserver;

impl RouteObserver for NoopObserver {
    fn on_label_changed(&mut self, _x: u32, _y: u32, _label: u32) {}

    fn on_content_changed(&mut self, _x: u32, _y: u32, _content: CellContent, _net_num: u32) {}

    fn on_grid_reset(&mut self) {}

    fn on_routing_finished(&mut self, _routed: usize, _total: usize) {}
}
