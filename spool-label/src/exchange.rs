//! Label-exchange document
//!
//! XML understood by label-printer software: the label size in mm and
//! inches, the printable bounds, and a single embedded PNG covering the
//! label. Elements are always written in this order:
//!
//! ```text
//! <LabelDocument>
//!   <labelWidth/> <labelHeight/> <labelWidthInch/> <labelHeightInch/>
//!   <validBoundsX/> <validBoundsY/> <validBoundsWidth/> <validBoundsHeight/>
//!   <Contents><Image><height/><width/><x/><y/><content/></Image></Contents>
//! </LabelDocument>
//! ```

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use crate::error::ExportResult;
use crate::raster::encode_png;

const MM_PER_INCH: f32 = 25.4;

/// Unprintable border assumed on every side, in mm
pub const BOUNDS_INSET: f32 = 1.0;

/// Format a length with at most three decimals and no trailing zeros
fn length(value: f32) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Write an exchange document for a label of `width x height` mm showing `image`
pub fn write_document(width: f32, height: f32, image: &RgbaImage) -> ExportResult<Vec<u8>> {
    let content = STANDARD.encode(encode_png(image)?);
    let bounds_w = (width - 2.0 * BOUNDS_INSET).max(0.0);
    let bounds_h = (height - 2.0 * BOUNDS_INSET).max(0.0);

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer
        .create_element("LabelDocument")
        .write_inner_content(|w| {
            let fields = [
                ("labelWidth", length(width)),
                ("labelHeight", length(height)),
                ("labelWidthInch", length(width / MM_PER_INCH)),
                ("labelHeightInch", length(height / MM_PER_INCH)),
                ("validBoundsX", length(BOUNDS_INSET)),
                ("validBoundsY", length(BOUNDS_INSET)),
                ("validBoundsWidth", length(bounds_w)),
                ("validBoundsHeight", length(bounds_h)),
            ];
            for (name, value) in &fields {
                w.create_element(*name)
                    .write_text_content(BytesText::new(value))?;
            }

            w.create_element("Contents").write_inner_content(|w| {
                w.create_element("Image").write_inner_content(|w| {
                    w.create_element("height")
                        .write_text_content(BytesText::new(&length(height)))?;
                    w.create_element("width")
                        .write_text_content(BytesText::new(&length(width)))?;
                    w.create_element("x")
                        .write_text_content(BytesText::new("0"))?;
                    w.create_element("y")
                        .write_text_content(BytesText::new("0"))?;
                    w.create_element("content")
                        .write_text_content(BytesText::new(&content))?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;

    Ok(writer.into_inner().into_inner())
}
