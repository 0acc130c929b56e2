//! Multi-page graphics backed by SVG documents.
//!
//! Every page is built as an SVG document through the `svg` crate. When the graphic is finished,
//! pages are written as SVG, rasterized to PNG with `resvg` or converted to PDF with `svg2pdf`.
//! A PDF graphic is a single file holding all pages. SVG and PNG files hold one page each, so
//! their first page is written to the output path and page `n > 1` to the path with `-n` inserted
//! before the extension.

use super::*;
use crate::datastr::geometry::Rectangle;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use svg::{
    node::element::{Polygon, Polyline},
    Document as SvgDocument, Node,
};

const POINTS_PER_CM: f64 = 72.0 / 2.54;
const PNG_DPI: f64 = 300.0;

/// A graphic of a fixed page size showing a fixed rectangle of the plane.
/// The rectangle is scaled uniformly to fit the page and centered, anything outside is clipped.
pub struct Document {
    path: PathBuf,
    format: OutputFormat,
    width_cm: f64,
    height_cm: f64,
    area: Rectangle,
    // points per unit of the plane
    scale: f64,
    offset: (f64, f64),
    pages: Vec<SvgDocument>,
    color: Color,
    line_width: f64,
}

impl Document {
    pub fn new<P: Into<PathBuf>>(path: P, format: OutputFormat, width_cm: f64, height_cm: f64, area: Rectangle) -> Result<Document, RenderError> {
        if !(width_cm > 0.0 && width_cm.is_finite() && height_cm > 0.0 && height_cm.is_finite()) {
            return Err(RenderError::InvalidPageSize {
                width: width_cm,
                height: height_cm,
            });
        }
        if area.is_empty() {
            return Err(RenderError::EmptyDrawingArea);
        }

        let (page_width, page_height) = (width_cm * POINTS_PER_CM, height_cm * POINTS_PER_CM);
        let scale_x = if area.width() > 0.0 { page_width / area.width() } else { f64::INFINITY };
        let scale_y = if area.height() > 0.0 { page_height / area.height() } else { f64::INFINITY };
        let scale = scale_x.min(scale_y);
        // a single point, nothing to scale
        let scale = if scale.is_finite() { scale } else { 1.0 };
        let offset = ((page_width - area.width() * scale) / 2.0, (page_height - area.height() * scale) / 2.0);

        let mut document = Document {
            path: path.into(),
            format,
            width_cm,
            height_cm,
            area,
            scale,
            offset,
            pages: Vec::new(),
            color: KIT_BLACK,
            line_width: line_width::THIN,
        };
        document.new_page();
        Ok(document)
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// The SVG source of page `page`, starting at 1.
    pub fn page_svg(&self, page: usize) -> String {
        self.pages[page - 1].to_string()
    }

    fn page_size(&self) -> (f64, f64) {
        (self.width_cm * POINTS_PER_CM, self.height_cm * POINTS_PER_CM)
    }

    fn to_page(&self, p: Point) -> (f64, f64) {
        let south_west = self.area.south_west();
        let (_, page_height) = self.page_size();
        (
            self.offset.0 + (p.x - south_west.x) * self.scale,
            page_height - self.offset.1 - (p.y - south_west.y) * self.scale,
        )
    }

    fn points_attribute(&self, points: &[Point]) -> String {
        let mut attribute = String::new();
        for &p in points {
            let (x, y) = self.to_page(p);
            if !attribute.is_empty() {
                attribute.push(' ');
            }
            attribute.push_str(&format!("{:.3},{:.3}", x, y));
        }
        attribute
    }

    fn append<N: Into<Box<dyn Node>>>(&mut self, node: N) {
        if let Some(page) = self.pages.last_mut() {
            page.append(node);
        }
    }

    /// Write the graphic and return the paths written.
    /// PDF graphics are one file with a page per page of the graphic, SVG and PNG graphics one file per page.
    pub fn finish(self) -> Result<Vec<PathBuf>, RenderError> {
        if self.format == OutputFormat::Pdf {
            let svgs: Vec<String> = self.pages.iter().map(ToString::to_string).collect();
            fs::write(&self.path, convert_to_pdf(&svgs, self.page_size())?)?;
            return Ok(vec![self.path]);
        }

        let mut written = Vec::with_capacity(self.pages.len());
        for (index, page) in self.pages.iter().enumerate() {
            let path = page_path(&self.path, index + 1);
            match self.format {
                OutputFormat::Png => fs::write(&path, rasterize(&page.to_string(), self.width_cm, self.height_cm)?)?,
                _ => svg::save(&path, page)?,
            }
            written.push(path);
        }
        Ok(written)
    }
}

impl Graphic for Document {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        let polyline = Polyline::new()
            .set("points", self.points_attribute(points))
            .set("fill", "none")
            .set("stroke", self.color.hex())
            .set("stroke-opacity", self.color.opacity())
            .set("stroke-width", self.line_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");
        self.append(polyline);
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        let polygon = Polygon::new()
            .set("points", self.points_attribute(points))
            .set("fill", "none")
            .set("stroke", self.color.hex())
            .set("stroke-opacity", self.color.opacity())
            .set("stroke-width", self.line_width)
            .set("stroke-linejoin", "round");
        self.append(polygon);
    }

    fn new_page(&mut self) {
        let (width, height) = self.page_size();
        let page = SvgDocument::new()
            .set("width", format!("{}cm", self.width_cm))
            .set("height", format!("{}cm", self.height_cm))
            .set("viewBox", format!("0 0 {} {}", width, height));
        self.pages.push(page);
    }
}

/// Path of page `page` (starting at 1) of a graphic written to `path`.
pub fn page_path(path: &Path, page: usize) -> PathBuf {
    if page <= 1 {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match path.extension() {
        Some(extension) => format!("{}-{}.{}", stem, page, extension.to_string_lossy()),
        None => format!("{}-{}", stem, page),
    };
    path.with_file_name(name)
}

fn rasterize(svg: &str, width_cm: f64, height_cm: f64) -> Result<Vec<u8>, RenderError> {
    use resvg::{tiny_skia, usvg};

    let tree = usvg::Tree::from_str(svg, &usvg::Options::default()).map_err(|e| RenderError::Rasterization(e.to_string()))?;
    let width = (width_cm / 2.54 * PNG_DPI).round().max(1.0) as u32;
    let height = (height_cm / 2.54 * PNG_DPI).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| RenderError::Rasterization(format!("cannot allocate {}x{} pixels", width, height)))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(width as f32 / size.width(), height as f32 / size.height());
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| RenderError::Rasterization(e.to_string()))
}

// Every page becomes a form XObject through svg2pdf, stretched over a page of its own.
fn convert_to_pdf(pages: &[String], (width, height): (f64, f64)) -> Result<Vec<u8>, RenderError> {
    use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref};
    use svg2pdf::usvg;

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids(page_ids.iter().copied()).count(page_ids.len() as i32);

    let form_name = Name(b"Graphic");
    let (width, height) = (width as f32, height as f32);

    for (svg, &page_id) in pages.iter().zip(page_ids.iter()) {
        let tree = usvg::Tree::from_str(svg, &usvg::Options::default()).map_err(|e| RenderError::PdfConversion(e.to_string()))?;
        let (chunk, form_id) = svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default()).map_err(|e| RenderError::PdfConversion(e.to_string()))?;

        // chunk references start at 1 again for every page
        let mut renumbered = HashMap::new();
        let chunk = chunk.renumber(|old| *renumbered.entry(old).or_insert_with(|| alloc.bump()));
        let form_id = renumbered
            .get(&form_id)
            .copied()
            .ok_or_else(|| RenderError::PdfConversion("graphic missing from converted page".to_string()))?;
        let content_id = alloc.bump();

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width, height));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(form_name, form_id);
        page.finish();

        // the form is one unit wide and high
        let mut content = Content::new();
        content.save_state();
        content.transform([width, 0.0, 0.0, height, 0.0, 0.0]);
        content.x_object(form_name);
        content.restore_state();
        pdf.stream(content_id, &content.finish());
        pdf.extend(&chunk);
    }

    Ok(pdf.finish())
}
