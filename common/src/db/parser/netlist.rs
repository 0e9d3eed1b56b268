//! Reader and writer for the netlist text format:
//!
//! ```text
//! XSIZE YSIZE
//! NUM_OBSTACLES
//! OX OY            (one per obstacle)
//! NUM_NETS
//! NPINS SX SY TX1 TY1 ...   (NPINS-1 sink pairs per net)
//! ```

use crate::db::core::{CellContent, Layout, Net};
use crate::db::indices::CellIdx;
use crate::geom::coord::GridCoord;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("failed to read netlist: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed netlist at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

fn malformed(line: usize, reason: impl Into<String>) -> NetlistError {
    NetlistError::Malformed {
        line,
        reason: reason.into(),
    }
}

/// Non-blank lines of the input, tagged with 1-based line numbers.
struct Records<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> Records<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    fn next_record(&mut self) -> Result<(usize, String), NetlistError> {
        loop {
            self.line_no += 1;
            match self.lines.next() {
                Some(line) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Ok((self.line_no, line));
                }
                None => return Err(malformed(self.line_no, "unexpected end of file")),
            }
        }
    }
}

fn field<T: FromStr>(
    tokens: &mut SplitWhitespace<'_>,
    line: usize,
    what: &str,
) -> Result<T, NetlistError> {
    let tok = tokens
        .next()
        .ok_or_else(|| malformed(line, format!("missing {what}")))?;
    tok.parse()
        .map_err(|_| malformed(line, format!("invalid {what} '{tok}'")))
}

fn done(tokens: &mut SplitWhitespace<'_>, line: usize) -> Result<(), NetlistError> {
    match tokens.next() {
        Some(tok) => Err(malformed(line, format!("unexpected trailing field '{tok}'"))),
        None => Ok(()),
    }
}

fn cell_index(layout: &Layout, x: u32, y: u32, line: usize) -> Result<CellIdx, NetlistError> {
    if (x as usize) >= layout.xsize || (y as usize) >= layout.ysize {
        return Err(malformed(
            line,
            format!(
                "cell ({}, {}) outside {}x{} grid",
                x, y, layout.xsize, layout.ysize
            ),
        ));
    }
    Ok(layout.index_of(x, y))
}

/// Parse a netlist file into a fresh [`Layout`].
pub fn parse(path: &Path) -> Result<Layout, NetlistError> {
    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}

/// Parse a netlist from any buffered reader. See the module docs for
/// the format.
pub fn parse_reader(reader: impl BufRead) -> Result<Layout, NetlistError> {
    let mut records = Records::new(reader);
    let mut layout = Layout::new();

    // Grid size header.
    let (line, text) = records.next_record()?;
    let mut tokens = text.split_whitespace();
    let xsize: usize = field(&mut tokens, line, "grid width")?;
    let ysize: usize = field(&mut tokens, line, "grid height")?;
    done(&mut tokens, line)?;
    if xsize == 0 || ysize == 0 {
        return Err(malformed(line, "grid dimensions must be positive"));
    }
    layout.init_grid(xsize, ysize);

    // Obstructed cells.
    let (line, text) = records.next_record()?;
    let mut tokens = text.split_whitespace();
    let num_obstacles: usize = field(&mut tokens, line, "obstacle count")?;
    done(&mut tokens, line)?;

    for _ in 0..num_obstacles {
        let (line, text) = records.next_record()?;
        let mut tokens = text.split_whitespace();
        let x: u32 = field(&mut tokens, line, "obstacle x")?;
        let y: u32 = field(&mut tokens, line, "obstacle y")?;
        done(&mut tokens, line)?;

        let idx = cell_index(&layout, x, y, line)?;
        layout.cell_mut(idx).content = CellContent::Obstacle;
        layout.obstacles.push(GridCoord::new(x, y));
    }

    // Nets, numbered from 1 in file order.
    let (line, text) = records.next_record()?;
    let mut tokens = text.split_whitespace();
    let num_nets: usize = field(&mut tokens, line, "net count")?;
    done(&mut tokens, line)?;

    for i in 0..num_nets {
        let net_num = (i + 1) as u32;
        let (line, text) = records.next_record()?;
        let mut tokens = text.split_whitespace();

        let num_pins: usize = field(&mut tokens, line, "pin count")?;
        if num_pins < 2 {
            return Err(malformed(
                line,
                "a net needs a source and at least one sink",
            ));
        }

        let sx: u32 = field(&mut tokens, line, "source x")?;
        let sy: u32 = field(&mut tokens, line, "source y")?;
        let source = cell_index(&layout, sx, sy, line)?;
        if !layout.cell(source).is_empty() {
            return Err(malformed(
                line,
                format!("source cell ({sx}, {sy}) is already claimed"),
            ));
        }
        {
            let cell = layout.cell_mut(source);
            cell.content = CellContent::Source;
            cell.net_num = net_num;
            // The source is trivially part of its own trunk.
            cell.connected = true;
        }
        let src_coord = layout.cell(source).coord;

        let mut sinks = Vec::with_capacity(num_pins - 1);
        for _ in 0..num_pins - 1 {
            let tx: u32 = field(&mut tokens, line, "sink x")?;
            let ty: u32 = field(&mut tokens, line, "sink y")?;
            let sink = cell_index(&layout, tx, ty, line)?;
            if !layout.cell(sink).is_empty() {
                return Err(malformed(
                    line,
                    format!("sink cell ({tx}, {ty}) is already claimed"),
                ));
            }
            let cell = layout.cell_mut(sink);
            cell.content = CellContent::Sink;
            cell.net_num = net_num;
            cell.est_dist_from_src = cell.coord.manhattan(src_coord);
            sinks.push(sink);
        }
        done(&mut tokens, line)?;

        layout.netlist.push(Net {
            num_pins,
            source,
            sinks,
            net_num,
        });
    }

    log::info!(
        "parsed {}x{} grid, {} obstacles, {} nets",
        layout.xsize,
        layout.ysize,
        layout.obstacles.len(),
        layout.netlist.len()
    );
    Ok(layout)
}

/// Write a layout back in the input format. Obstacles and pins are
/// emitted in parse order, so an unrouted layout round-trips.
pub fn write<W: Write>(layout: &Layout, w: &mut W) -> std::io::Result<()> {
    writeln!(w, "{} {}", layout.xsize, layout.ysize)?;
    writeln!(w, "{}", layout.obstacles.len())?;
    for o in &layout.obstacles {
        writeln!(w, "{} {}", o.x, o.y)?;
    }
    writeln!(w, "{}", layout.netlist.len())?;
    for net in &layout.netlist {
        let src = layout.cell(net.source).coord;
        write!(w, "{} {} {}", net.num_pins, src.x, src.y)?;
        for &sink in &net.sinks {
            let c = layout.cell(sink).coord;
            write!(w, " {} {}", c.x, c.y)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    const SIMPLE: &str = "4 3\n2\n1 1\n2 1\n2\n2 0 0 3 0\n3 0 2 3 2 2 0\n";

    fn parse_str(text: &str) -> Result<Layout, NetlistError> {
        parse_reader(text.as_bytes())
    }

    fn reason(err: NetlistError) -> String {
        match err {
            NetlistError::Malformed { reason, .. } => reason,
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn parses_grid_obstacles_and_nets() {
        let layout = parse_str(SIMPLE).unwrap();
        assert_eq!((layout.xsize, layout.ysize), (4, 3));

        assert!(layout.cell_at(1, 1).is_obstacle());
        assert!(layout.cell_at(2, 1).is_obstacle());
        assert_eq!(layout.cell_at(1, 1).net_num, 0);

        assert_eq!(layout.netlist.len(), 2);
        let src = layout.cell_at(0, 0);
        assert!(src.is_source());
        assert!(src.is_connected());
        assert_eq!(src.net_num, 1);

        let sink = layout.cell_at(3, 0);
        assert!(sink.is_sink());
        assert!(!sink.is_connected());
        assert_eq!(sink.est_dist_from_src, 3);

        // Second net: sinks keep file order with estimates precomputed.
        let net = &layout.netlist[1];
        assert_eq!(net.net_num, 2);
        assert_eq!(net.num_pins, 3);
        let first = layout.cell(net.sinks[0]);
        assert_eq!(first.coord.x, 3);
        assert_eq!(first.est_dist_from_src, 3);
        let second = layout.cell(net.sinks[1]);
        assert_eq!(second.est_dist_from_src, 4);
    }

    #[test]
    fn rejects_truncated_file() {
        let err = parse_str("4 3\n2\n1 1\n").unwrap_err();
        assert!(reason(err).contains("unexpected end of file"));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let err = parse_str("4 x\n0\n0\n").unwrap_err();
        assert!(reason(err).contains("grid height"));
    }

    #[test]
    fn rejects_missing_sink_pair() {
        let err = parse_str("4 3\n0\n1\n2 0 0 3\n").unwrap_err();
        assert!(reason(err).contains("missing sink y"));
    }

    #[test]
    fn rejects_trailing_fields() {
        let err = parse_str("4 3\n0\n1\n2 0 0 3 0 9\n").unwrap_err();
        assert!(reason(err).contains("trailing"));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let err = parse_str("4 3\n1\n4 0\n0\n").unwrap_err();
        assert!(reason(err).contains("outside"));
    }

    #[test]
    fn rejects_pin_on_claimed_cell() {
        // Sink lands on an obstacle.
        let err = parse_str("4 3\n1\n3 0\n1\n2 0 0 3 0\n").unwrap_err();
        assert!(reason(err).contains("already claimed"));

        // Source lands on another net's sink.
        let err = parse_str("4 3\n0\n2\n2 0 0 3 0\n2 3 0 3 2\n").unwrap_err();
        assert!(reason(err).contains("already claimed"));
    }

    #[test]
    fn rejects_single_pin_net() {
        let err = parse_str("4 3\n0\n1\n1 0 0\n").unwrap_err();
        assert!(reason(err).contains("at least one sink"));
    }

    #[test]
    fn rejects_zero_sized_grid() {
        let err = parse_str("0 3\n0\n0\n").unwrap_err();
        assert!(reason(err).contains("positive"));
    }

    #[test]
    fn round_trips_through_write() {
        let layout = parse_str(SIMPLE).unwrap();
        let mut out = Vec::new();
        write(&layout, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SIMPLE);
    }

    #[test]
    fn parses_from_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.infile");
        std::fs::write(&path, SIMPLE).unwrap();

        let layout = parse(&path).unwrap();
        assert_eq!(layout.netlist.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse(&dir.path().join("nope.infile")).unwrap_err();
        match err {
            NetlistError::Io(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
