use site_core::{SiteScenario, evaluate};
use siteplan_core::{PlanStyle, build_siteplan_svg, encode_rgba_to_png_bytes};
use std::env;
use std::fs;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut verbose = false;
    let mut style_path: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "-v" | "--verbose" => verbose = true,
            "--style" => style_path = args.next(),
            _ => positional.push(a),
        }
    }
    if positional.len() < 2 {
        eprintln!(
            "Usage: siteplan [-v] [--style style.json] <scenario.json> <output.(svg|png)> [px_per_m]"
        );
        std::process::exit(2);
    }
    log::set_logger(&LOGGER)?;
    log::set_max_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });

    let input = &positional[0];
    let output = &positional[1];
    let px_per_m: f64 = positional
        .get(2)
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v > 0.0)
        .unwrap_or(8.0);

    let txt = fs::read_to_string(input)?;
    let scenario = SiteScenario::from_json(&txt)?;
    let style = match &style_path {
        Some(p) => serde_json::from_str(&fs::read_to_string(p)?)?,
        None => PlanStyle::default(),
    };

    let report = evaluate(&scenario.to_input(), &scenario.tolerances)?;
    for issue in &report.issues {
        eprintln!("warning: {:?}: {}", issue.stage, issue.message);
    }
    match report.exceeds {
        Some(true) => eprintln!("footprint exceeds the buildable boundary"),
        Some(false) => log::info!("footprint fits the buildable boundary"),
        None => {}
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    let (svg, w_px, h_px) = build_siteplan_svg(&report, px_per_m, &style);
    if output.to_ascii_lowercase().ends_with(".svg") {
        fs::write(output, svg)?;
        return Ok(());
    }

    // PNG: render SVG -> RGBA and save (deterministic)
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg, &opt).map_err(|e| format!("SVG parse error: {e:?}"))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    let bytes = encode_rgba_to_png_bytes(w_px, h_px, pixmap.data())?;
    fs::write(output, bytes)?;
    log::debug!("wrote {output} ({w_px}x{h_px})");
    Ok(())
}
