use super::DeckCanvas;
use crate::card::{ASCENDER_RATIO, Element, LINE_HEIGHT_RATIO, PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH, Point, Rgb, TextBox};
use crate::error::RenderError;
use printpdf::image_crate::{self, DynamicImage, GenericImageView, RgbImage};
use printpdf::lopdf;
use printpdf::utils::calculate_points_for_circle;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point as PdfPoint, Polygon, Pt,
    Rgb as PdfRgb,
};
use printpdf::path::{PaintMode, WindingOrder};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const LAYER: &str = "card";

/// Encoding printpdf selects for its built-in fonts.
const BUILTIN_ENCODING: &str = "WinAnsiEncoding";

fn mm(pt: f32) -> Mm {
    Mm::from(Pt(pt))
}

fn pdf_color(c: Rgb) -> Color {
    let (r, g, b) = c.to_unit();
    Color::Rgb(PdfRgb::new(r, g, b, None))
}

/// Convert a margin-box position to page coordinates.
fn page_point(p: Point) -> PdfPoint {
    PdfPoint::new(mm(PAGE_MARGIN + p.x), mm(PAGE_MARGIN + p.y))
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

/// Fail on the first character the built-in font cannot encode. The encoder
/// drops such characters silently, which would print a truncated card.
fn check_encodable(text: &str) -> Result<(), RenderError> {
    let mut buf = [0u8; 4];
    match text.chars().find(|c| {
        !c.is_control()
            && lopdf::Document::encode_text(Some(BUILTIN_ENCODING), c.encode_utf8(&mut buf))
                .is_empty()
    }) {
        Some(character) => Err(RenderError::Unsupported {
            text: text.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

/// Composite an icon onto the white card background.
fn flatten_on_white(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let blend = |c: u8, a: u8| {
        let (c, a) = (u32::from(c), u32::from(a));
        ((c * a + 255 * (255 - a) + 127) / 255) as u8
    };
    let rgb = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        image_crate::Rgb([blend(r, a), blend(g, a), blend(b, a)])
    });
    DynamicImage::ImageRgb8(rgb)
}

/// [`DeckCanvas`] backed by an in-memory printpdf document.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    assets_dir: PathBuf,
    icons: HashMap<String, DynamicImage>,
}

impl PdfCanvas {
    pub fn new(title: &str, assets_dir: &Path) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            assets_dir: assets_dir.to_path_buf(),
            icons: HashMap::new(),
        })
    }

    pub fn save(self, path: &Path) -> Result<(), RenderError> {
        let file = File::create(path)?;
        self.doc.save(&mut BufWriter::new(file)).map_err(pdf_error)
    }

    fn icon(&mut self, name: &str) -> Result<&DynamicImage, RenderError> {
        if !self.icons.contains_key(name) {
            let path = self.assets_dir.join(name);
            if !path.is_file() {
                return Err(RenderError::MissingAsset(path.display().to_string()));
            }
            let image = image_crate::open(&path).map_err(|e| RenderError::Image {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let image = flatten_on_white(&image);
            self.icons.insert(name.to_string(), image);
        }
        self.icons
            .get(name)
            .ok_or_else(|| RenderError::MissingAsset(name.to_string()))
    }

    fn draw_text(&self, text: &TextBox) -> Result<(), RenderError> {
        check_encodable(&text.text)?;
        self.layer.set_fill_color(pdf_color(text.color));
        let mut baseline = text.at.y - ASCENDER_RATIO * text.size;
        for line in &text.lines {
            self.layer.use_text(
                line.as_str(),
                text.size,
                mm(PAGE_MARGIN + text.at.x),
                mm(PAGE_MARGIN + baseline),
                &self.font,
            );
            baseline -= LINE_HEIGHT_RATIO * text.size;
        }
        Ok(())
    }
}

impl DeckCanvas for PdfCanvas {
    fn start_new_page(&mut self) -> Result<(), RenderError> {
        let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        Ok(())
    }

    fn draw(&mut self, element: &Element) -> Result<(), RenderError> {
        match element {
            Element::Border { color, line_width } => {
                let (w, h) = (
                    PAGE_WIDTH - 2.0 * PAGE_MARGIN,
                    PAGE_HEIGHT - 2.0 * PAGE_MARGIN,
                );
                let corners = [
                    Point::new(0.0, 0.0),
                    Point::new(w, 0.0),
                    Point::new(w, h),
                    Point::new(0.0, h),
                ];
                self.layer.set_outline_color(pdf_color(*color));
                self.layer.set_outline_thickness(*line_width);
                self.layer.add_line(Line {
                    points: corners.iter().map(|p| (page_point(*p), false)).collect(),
                    is_closed: true,
                });
            }
            Element::Text(text) => self.draw_text(text)?,
            Element::Dot {
                center,
                radius,
                color,
            } => {
                let points = calculate_points_for_circle(
                    Pt(*radius),
                    Pt(PAGE_MARGIN + center.x),
                    Pt(PAGE_MARGIN + center.y),
                );
                self.layer.set_fill_color(pdf_color(*color));
                self.layer.add_polygon(Polygon {
                    rings: vec![points],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            Element::Icon { name, at, width } => {
                let layer = self.layer.clone();
                let image = self.icon(name)?;
                let (px_width, px_height) = image.dimensions();
                if px_width == 0 {
                    return Err(RenderError::Image {
                        path: name.clone(),
                        message: "image has zero width".to_string(),
                    });
                }
                // Pick the dpi that maps the pixel width onto `width` points.
                let dpi = px_width as f32 * 72.0 / width;
                let height = px_height as f32 * width / px_width as f32;
                Image::from_dynamic_image(image).add_to_layer(
                    layer,
                    ImageTransform {
                        translate_x: Some(mm(PAGE_MARGIN + at.x)),
                        translate_y: Some(mm(PAGE_MARGIN + at.y - height)),
                        dpi: Some(dpi),
                        ..Default::default()
                    },
                );
            }
        }
        Ok(())
    }
}
