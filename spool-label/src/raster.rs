//! Label rasterization
//!
//! Text is drawn with Latin-1 bitmap fonts at their native size, then scaled
//! up by a whole factor (nearest neighbour) so strokes stay crisp on thermal
//! printers. Lengths come in as mm and are converted at the CSS reference
//! resolution of 96 px/in times the pixel ratio.

use std::convert::Infallible;
use std::io::Cursor;

use embedded_graphics::mono_font::iso_8859_1::{FONT_7X13, FONT_7X13_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use shared::models::BorderMode;

use crate::error::{ExportError, ExportResult};
use crate::item::RenderedItem;
use crate::layout::{Page, Rect};
use crate::template::Fragment;

const REGULAR: MonoFont<'static> = FONT_7X13;
const BOLD: MonoFont<'static> = FONT_7X13_BOLD;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Reference resolution lengths are laid out at
pub const CSS_DPI: f32 = 96.0;

/// Raster parameters shared by every label of an export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSpec {
    /// Multiplier over [`CSS_DPI`], within `1..=10`
    pub pixel_ratio: f32,
    /// Nominal line height in mm
    pub text_size: f32,
    /// Binarize at this gray level
    pub threshold: Option<u8>,
}

impl RasterSpec {
    pub fn for_dpi(dpi: f32, text_size: f32) -> Self {
        Self {
            pixel_ratio: pixel_ratio(dpi),
            text_size,
            threshold: None,
        }
    }

    /// Pixels for a length in mm
    pub fn px(&self, mm: f32) -> u32 {
        mm_to_px(mm, CSS_DPI * self.pixel_ratio)
    }
}

/// `dpi / 96` clamped to `1..=10`; non-finite input gives 1
pub fn pixel_ratio(dpi: f32) -> f32 {
    if !dpi.is_finite() {
        return 1.0;
    }
    (dpi / CSS_DPI).clamp(1.0, 10.0)
}

fn mm_to_px(mm: f32, dpi: f32) -> u32 {
    if !mm.is_finite() || mm <= 0.0 {
        return 0;
    }
    let px = mm * dpi / 25.4;
    px.round() as u32
}

/// White RGBA canvas that embedded-graphics can draw on
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x as u32 >= w || point.y as u32 >= h {
                continue;
            }
            let px = if color.is_on() { BLACK } else { WHITE };
            self.image.put_pixel(point.x as u32, point.y as u32, px);
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        let (w, h) = self.image.dimensions();
        Size::new(w, h)
    }
}

/// Split fragments into lines of `(text, bold)` runs
fn lines(fragments: &[Fragment]) -> Vec<Vec<(&str, bool)>> {
    let mut lines = vec![Vec::new()];
    for fragment in fragments {
        match fragment {
            Fragment::Text { text, bold } => {
                if let Some(line) = lines.last_mut() {
                    line.push((text.as_str(), *bold));
                }
            }
            Fragment::LineBreak => lines.push(Vec::new()),
        }
    }
    lines
}

fn advance() -> u32 {
    REGULAR.character_size.width + REGULAR.character_spacing
}

/// Draw the fragments at native font size; `None` when there is no text
fn text_block(fragments: &[Fragment]) -> Option<RgbaImage> {
    let lines = lines(fragments);
    let columns = lines
        .iter()
        .map(|line| line.iter().map(|(t, _)| t.chars().count()).sum::<usize>())
        .max()
        .unwrap_or(0) as u32;
    if columns == 0 {
        return None;
    }

    let line_height = REGULAR.character_size.height;
    let mut canvas = Canvas::new(columns * advance(), lines.len() as u32 * line_height);
    for (row, line) in lines.iter().enumerate() {
        let mut x = 0i32;
        let y = (row as u32 * line_height) as i32;
        for (text, bold) in line {
            let font = if *bold { &BOLD } else { &REGULAR };
            let style = MonoTextStyle::new(font, BinaryColor::On);
            let Ok(next) =
                Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(&mut canvas);
            x = next.x;
        }
    }
    Some(canvas.into_image())
}

/// Largest whole scale for the block that honours the text size and fits
///
/// Never below 1; a block that does not fit at 1 is clipped by the caller.
fn block_scale(block: &RgbaImage, area_w: u32, area_h: u32, spec: &RasterSpec) -> u32 {
    let line_px = spec.text_size * CSS_DPI * spec.pixel_ratio / 25.4;
    let target = if line_px.is_finite() {
        // `as` saturates, so huge sizes land on u32::MAX and are capped below.
        (line_px / REGULAR.character_size.height as f32).round() as u32
    } else {
        1
    };
    let fit_w = area_w / block.width().max(1);
    let fit_h = area_h / block.height().max(1);
    target.min(fit_w).min(fit_h).max(1)
}

/// Draw an item's text into `area` (pixels) of `image`
///
/// The block is left-aligned, vertically centred and clipped to the area.
fn draw_item(image: &mut RgbaImage, fragments: &[Fragment], area: (u32, u32, u32, u32), spec: &RasterSpec) {
    let (x, y, w, h) = area;
    let Some(block) = text_block(fragments) else {
        return;
    };
    let scale = block_scale(&block, w, h, spec);
    let scaled = imageops::resize(
        &block,
        block.width() * scale,
        block.height() * scale,
        FilterType::Nearest,
    );
    let visible = imageops::crop_imm(&scaled, 0, 0, scaled.width().min(w), scaled.height().min(h))
        .to_image();
    let top = y + (h - visible.height()) / 2;
    imageops::overlay(image, &visible, x as i64, top as i64);
}

/// Rasterize one item at the given physical size
pub fn rasterize_item(item: &RenderedItem, size: (f32, f32), spec: &RasterSpec) -> ExportResult<RgbaImage> {
    let (w, h) = (spec.px(size.0), spec.px(size.1));
    if w == 0 || h == 0 {
        return Err(ExportError::ZeroSized(item.key.to_string()));
    }

    let mut canvas = Canvas::new(w, h);
    draw_item(canvas.image_mut(), &item.fragments, (0, 0, w, h), spec);
    let mut image = canvas.into_image();
    if let Some(level) = spec.threshold {
        apply_threshold(&mut image, level);
    }
    Ok(image)
}

fn px_rect(rect: &Rect, spec: &RasterSpec) -> (u32, u32, u32, u32) {
    (
        spec.px(rect.x),
        spec.px(rect.y),
        spec.px(rect.width),
        spec.px(rect.height),
    )
}

/// Rasterize a whole page: every item in its content rect plus outlines
pub fn rasterize_page(page: &Page, border: BorderMode, spec: &RasterSpec) -> ExportResult<RgbaImage> {
    let (w, h) = (spec.px(page.width), spec.px(page.height));
    if w == 0 || h == 0 {
        return Err(ExportError::ZeroSized(format!("page {}", page.number)));
    }

    let mut canvas = Canvas::new(w, h);
    for slot in &page.slots {
        if let Some(item) = &slot.item {
            draw_item(canvas.image_mut(), &item.fragments, px_rect(&slot.content, spec), spec);
        }

        let outlined = match border {
            BorderMode::None => false,
            BorderMode::Border => slot.item.is_some(),
            BorderMode::Grid => true,
        };
        if outlined {
            let (x, y, cw, ch) = px_rect(&slot.cell, spec);
            let stroke = spec.pixel_ratio.round().max(1.0) as u32;
            let Ok(()) = Rectangle::new(Point::new(x as i32, y as i32), Size::new(cw, ch))
                .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, stroke))
                .draw(&mut canvas);
        }
    }

    let mut image = canvas.into_image();
    if let Some(level) = spec.threshold {
        apply_threshold(&mut image, level);
    }
    Ok(image)
}

/// Encode as PNG
pub fn encode_png(image: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Apply threshold (binarization) to improve thermal printer output
pub fn apply_threshold(image: &mut RgbaImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let gray = (r as f32 * 0.3 + g as f32 * 0.59 + b as f32 * 0.11) as u8;
        let value = if gray < threshold { 0 } else { 255 };
        pixel.0[0] = value;
        pixel.0[1] = value;
        pixel.0[2] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKey;
    use crate::layout::paginate;
    use shared::models::{EntityKind, LayoutConfig};

    fn item(text: &str) -> RenderedItem {
        RenderedItem {
            key: ItemKey {
                kind: EntityKind::Spool,
                id: "1".into(),
            },
            label: "spool 1".into(),
            fragments: crate::template::markup(text),
        }
    }

    fn dark_pixels(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| p.0[0] < 128).count()
    }

    #[test]
    fn test_block_scale_bounded_by_area() {
        let block = text_block(&crate::template::markup("hello")).unwrap();
        let spec = RasterSpec::for_dpi(300.0, 1e30);
        let scale = block_scale(&block, 600, 350, &spec);
        assert!(block.width() * scale <= 600);
        assert!(block.height() * scale <= 350);

        let spec = RasterSpec::for_dpi(300.0, f32::INFINITY);
        assert_eq!(block_scale(&block, 600, 350, &spec), 1);
        let spec = RasterSpec::for_dpi(300.0, -4.0);
        assert_eq!(block_scale(&block, 600, 350, &spec), 1);
    }

    #[test]
    fn test_huge_text_size_still_rasterizes() {
        let spec = RasterSpec::for_dpi(300.0, 1e30);
        let image = rasterize_item(&item("hello"), (50.0, 30.0), &spec).unwrap();
        assert_eq!(image.dimensions(), (spec.px(50.0), spec.px(30.0)));
        assert!(dark_pixels(&image) > 0);
    }

    #[test]
    fn test_pixel_ratio_clamped() {
        assert_eq!(pixel_ratio(48.0), 1.0);
        assert_eq!(pixel_ratio(300.0), 3.125);
        assert_eq!(pixel_ratio(5000.0), 10.0);
        assert_eq!(pixel_ratio(f32::NAN), 1.0);
    }

    #[test]
    fn test_px_conversion() {
        let spec = RasterSpec::for_dpi(96.0, 3.0);
        assert_eq!(spec.px(25.4), 96);
        assert_eq!(spec.px(0.0), 0);
        assert_eq!(spec.px(-3.0), 0);
        let spec = RasterSpec::for_dpi(192.0, 3.0);
        assert_eq!(spec.px(25.4), 192);
    }

    #[test]
    fn test_rasterize_item_size_and_ink() {
        let spec = RasterSpec::for_dpi(203.0, 3.0);
        let image = rasterize_item(&item("**PLA**\n#1"), (50.0, 30.0), &spec).unwrap();
        assert_eq!(image.dimensions(), (spec.px(50.0), spec.px(30.0)));
        assert!(dark_pixels(&image) > 0);
    }

    #[test]
    fn test_empty_item_is_blank() {
        let spec = RasterSpec::for_dpi(96.0, 3.0);
        let image = rasterize_item(&item(""), (20.0, 10.0), &spec).unwrap();
        assert_eq!(dark_pixels(&image), 0);
    }

    #[test]
    fn test_zero_sized_item_rejected() {
        let spec = RasterSpec::for_dpi(96.0, 3.0);
        let err = rasterize_item(&item("x"), (0.0, 10.0), &spec).unwrap_err();
        assert!(matches!(err, ExportError::ZeroSized(ref s) if s == "spool-1"));
    }

    #[test]
    fn test_text_scaled_down_to_fit() {
        // A long line in a narrow label still renders, clipped at scale 1.
        let spec = RasterSpec::for_dpi(96.0, 10.0);
        let image = rasterize_item(&item("a very long line of label text"), (15.0, 5.0), &spec)
            .unwrap();
        assert_eq!(image.dimensions(), (spec.px(15.0), spec.px(5.0)));
        assert!(dark_pixels(&image) > 0);
    }

    #[test]
    fn test_page_grid_outlines_empty_slots() {
        let mut config = LayoutConfig::label_stock(30.0, 20.0);
        config.skip_items = 1;
        let pages = paginate(&[], &config).unwrap();
        let spec = RasterSpec::for_dpi(96.0, 3.0);

        let none = rasterize_page(&pages[0], BorderMode::None, &spec).unwrap();
        let border = rasterize_page(&pages[0], BorderMode::Border, &spec).unwrap();
        let grid = rasterize_page(&pages[0], BorderMode::Grid, &spec).unwrap();
        assert_eq!(dark_pixels(&none), 0);
        assert_eq!(dark_pixels(&border), 0);
        assert!(dark_pixels(&grid) > 0);
    }

    #[test]
    fn test_encode_png_signature() {
        let image = RgbaImage::from_pixel(4, 3, WHITE);
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_threshold() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([120, 120, 120, 255]));
        image.put_pixel(1, 0, Rgba([220, 220, 220, 255]));
        apply_threshold(&mut image, 185);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }
}
