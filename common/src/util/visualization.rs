use crate::db::core::{CellContent, Layout};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

// Net palette, cycled by net id.
const NET_COLOURS: [Rgb<u8>; 8] = [
    Rgb([220, 60, 60]),   // red
    Rgb([230, 215, 60]),  // yellow
    Rgb([200, 200, 200]), // light grey
    Rgb([240, 150, 40]),  // orange
    Rgb([220, 70, 220]),  // magenta
    Rgb([170, 130, 240]), // violet
    Rgb([70, 200, 100]),  // green
    Rgb([150, 60, 200]),  // purple
];

const OBSTACLE_COLOUR: Rgb<u8> = Rgb([50, 80, 210]);
const BACKGROUND: Rgb<u8> = Rgb([20, 20, 20]);

fn net_colour(net_num: u32) -> Rgb<u8> {
    NET_COLOURS[(net_num.saturating_sub(1) as usize) % NET_COLOURS.len()]
}

/// Write a PNG of the layout: obstacles in blue, each net's cells in
/// its palette colour, sources marked white and sinks black.
pub fn draw_layout(layout: &Layout, filename: &str, width: u32, height: u32) {
    if layout.xsize == 0 || layout.ysize == 0 {
        return;
    }
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let cell_w = (width as f64 / layout.xsize as f64).max(1.0);
    let cell_h = (height as f64 / layout.ysize as f64).max(1.0);

    for cell in &layout.grid {
        let colour = match cell.content {
            CellContent::Empty => continue,
            CellContent::Obstacle => OBSTACLE_COLOUR,
            CellContent::Source | CellContent::Sink | CellContent::Net => {
                net_colour(cell.net_num)
            }
        };

        let x0 = (cell.coord.x as f64 * cell_w) as i32;
        let y0 = (cell.coord.y as f64 * cell_h) as i32;
        let rect = ImageRect::at(x0, y0).of_size(cell_w as u32, cell_h as u32);
        draw_filled_rect_mut(&mut img, rect, colour);

        // Pin markers need room to be visible.
        if (cell.is_source() || cell.is_sink()) && cell_w >= 4.0 && cell_h >= 4.0 {
            let marker = if cell.is_source() {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            };
            let mw = (cell_w / 3.0).max(1.0);
            let mh = (cell_h / 3.0).max(1.0);
            let inner = ImageRect::at(x0 + mw as i32, y0 + mh as i32)
                .of_size(mw as u32, mh as u32);
            draw_filled_rect_mut(&mut img, inner, marker);
        }
    }

    let _ = img.save(Path::new(filename));
}
