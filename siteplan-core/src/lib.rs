use geo_types::{Coord, Polygon};
use png::{BitDepth, ColorType, Encoder};
use serde::{Deserialize, Serialize};
use site_core::SiteReport;

/// Stroke and fill for one layer of the plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub stroke: String,
    pub fill: String,
    pub stroke_width: f64,
    /// SVG `stroke-dasharray`, e.g. `"6 4"`.
    pub dash: Option<String>,
}

impl LayerStyle {
    fn new(stroke: &str, fill: &str, stroke_width: f64, dash: Option<&str>) -> Self {
        LayerStyle {
            stroke: stroke.to_string(),
            fill: fill.to_string(),
            stroke_width,
            dash: dash.map(|d| d.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanStyle {
    pub lot: LayerStyle,
    pub envelope: LayerStyle,
    pub fsr_boundary: LayerStyle,
    pub footprint_fits: LayerStyle,
    pub footprint_exceeds: LayerStyle,
    /// White space around the lot, meters.
    pub margin_m: f64,
    /// Spacing of the background grid, meters. Zero disables the grid.
    pub grid_m: f64,
}

impl Default for PlanStyle {
    fn default() -> Self {
        PlanStyle {
            lot: LayerStyle::new("#222", "#f4f1e8", 2.0, None),
            envelope: LayerStyle::new("#3a6ea5", "none", 1.4, Some("6 4")),
            fsr_boundary: LayerStyle::new("#2e8b57", "#2e8b5722", 1.4, None),
            footprint_fits: LayerStyle::new("#1b5e20", "#66bb6a99", 1.6, None),
            footprint_exceeds: LayerStyle::new("#b71c1c", "#ef535099", 1.6, None),
            margin_m: 3.0,
            grid_m: 5.0,
        }
    }
}

// Shared PNG encoder: RGBA -> PNG bytes (deterministic for same input)
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        {
            let mut writer = enc.write_header()?;
            writer.write_image_data(rgba)?;
        }
    }
    Ok(buf)
}

fn bounds_of(pts: &[Coord<f64>]) -> (f64, f64, f64, f64) {
    let (mut minx, mut miny, mut maxx, mut maxy) = (
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );
    for p in pts {
        minx = minx.min(p.x);
        miny = miny.min(p.y);
        maxx = maxx.max(p.x);
        maxy = maxy.max(p.y);
    }
    (minx, miny, maxx, maxy)
}

/// Renders a north-up plan of the lot in its local metric plane with the
/// envelope, FSR boundary and footprint layered on top. Returns the SVG text
/// and its pixel size.
pub fn build_siteplan_svg(
    report: &SiteReport,
    px_per_m: f64,
    style: &PlanStyle,
) -> (String, u32, u32) {
    let lot = &report.planar_lot.exterior().0;
    let (minx, miny, maxx, maxy) = bounds_of(lot);
    let margin = style.margin_m.max(0.0);
    let w_m = (maxx - minx) + 2.0 * margin;
    let h_m = (maxy - miny) + 2.0 * margin;
    let w_px = (w_m * px_per_m).ceil().max(1.0) as u32;
    let h_px = (h_m * px_per_m).ceil().max(1.0) as u32;

    // SVG y grows downward; flip so north is up.
    let to_px = |p: Coord<f64>| -> (f64, f64) {
        (
            (p.x - minx + margin) * px_per_m,
            (maxy - p.y + margin) * px_per_m,
        )
    };

    let mut s = String::new();
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w_px}\" height=\"{h_px}\" viewBox=\"0 0 {w_px} {h_px}\">\n"
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");

    if style.grid_m > 0.0 {
        s.push_str("<g stroke=\"#e6e6e6\" stroke-width=\"1\">\n");
        let step = style.grid_m * px_per_m;
        let mut x = 0.0;
        while x <= w_px as f64 {
            s.push_str(&format!(
                "<line x1=\"{x:.2}\" y1=\"0\" x2=\"{x:.2}\" y2=\"{h_px}\"/>\n"
            ));
            x += step;
        }
        let mut y = 0.0;
        while y <= h_px as f64 {
            s.push_str(&format!(
                "<line x1=\"0\" y1=\"{y:.2}\" x2=\"{w_px}\" y2=\"{y:.2}\"/>\n"
            ));
            y += step;
        }
        s.push_str("</g>\n");
    }

    s.push_str(&layer(&report.planar_lot, "lot", &style.lot, &to_px));
    if let Some(env) = &report.envelope {
        s.push_str(&layer(&env.planar, "envelope", &style.envelope, &to_px));
    }
    if let Some(fsr) = &report.fsr_boundary {
        s.push_str(&layer(&fsr.planar, "fsr-boundary", &style.fsr_boundary, &to_px));
    }
    if let Some(fp) = &report.footprint {
        let st = if report.exceeds == Some(true) {
            &style.footprint_exceeds
        } else {
            &style.footprint_fits
        };
        s.push_str(&layer(&fp.planar, "footprint", st, &to_px));
    }

    // 10 m scale bar along the bottom margin.
    let bar_px = 10.0 * px_per_m;
    let y = h_px as f64 - (margin * px_per_m) / 2.0;
    let x0 = (margin * px_per_m) / 2.0;
    s.push_str(&format!(
        "<line id=\"scale-bar\" x1=\"{x0:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"#000\" stroke-width=\"2\"/>\n",
        x0 + bar_px
    ));

    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

fn layer<F>(poly: &Polygon<f64>, id: &str, style: &LayerStyle, to_px: &F) -> String
where
    F: Fn(Coord<f64>) -> (f64, f64),
{
    let d = path_from_points(&poly.exterior().0, to_px);
    if d.is_empty() {
        return String::new();
    }
    let dash = style
        .dash
        .as_deref()
        .map(|d| format!(" stroke-dasharray=\"{}\"", svg_escape(d)))
        .unwrap_or_default();
    format!(
        "<path id=\"{id}\" d=\"{d}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{dash}/>\n",
        svg_escape(&style.fill),
        svg_escape(&style.stroke),
        style.stroke_width
    )
}

fn path_from_points<F>(pts: &[Coord<f64>], to_px: &F) -> String
where
    F: Fn(Coord<f64>) -> (f64, f64),
{
    if pts.is_empty() {
        return String::new();
    }
    let (x0, y0) = to_px(pts[0]);
    let mut out = format!("M {:.2} {:.2}", x0, y0);
    for p in &pts[1..] {
        let (x, y) = to_px(*p);
        out.push_str(&format!(" L {:.2} {:.2}", x, y));
    }
    out.push_str(" Z");
    out
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
