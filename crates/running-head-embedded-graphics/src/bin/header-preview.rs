use std::env;
use std::process::ExitCode;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::Pixel;
use running_head::{
    ClockProvider, DocumentKind, DocumentProps, JsonFileSettingsStore, MemorySettingsStore,
    MenuCommand, MetadataProvider, Mode, PageMargins, RepaintScheduler, SeparatorGlyph,
    SettingsStore, SystemClock, TocProvider, TopPadding,
};
use running_head_embedded_graphics::{EgHeaderPainter, EgTextMeasurer};
use running_head_render::{HeaderOverlay, PageFrame, ScreenGeometry};

#[derive(Clone, Debug)]
struct Args {
    modes: Vec<Mode>,
    page: u32,
    pages_done: Option<u32>,
    title: String,
    authors: String,
    chapter: Option<String>,
    time: Option<String>,
    width: u32,
    height: u32,
    margin: u32,
    font_size: Option<u32>,
    bold: bool,
    top_padding: Option<TopPadding>,
    separator: Option<SeparatorGlyph>,
    fixed_layout: bool,
    settings_path: Option<String>,
    json: bool,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cfg = parse_args(args)?;
    match &cfg.settings_path {
        Some(path) => preview(&cfg, JsonFileSettingsStore::open(path)),
        None => preview(&cfg, MemorySettingsStore::new()),
    }
}

fn preview<S: SettingsStore>(cfg: &Args, store: S) -> Result<(), String> {
    let geometry = ScreenGeometry::new(cfg.width, cfg.height);
    let mut overlay = HeaderOverlay::new(store, NoRepaint, geometry, cfg.font_size);
    for command in overrides(cfg) {
        overlay.apply(command).map_err(|e| e.to_string())?;
    }

    let metadata = StaticMetadata {
        title: cfg.title.clone(),
        authors: cfg.authors.clone(),
    };
    let toc = StaticToc {
        chapter: cfg.chapter.clone(),
        pages_done: cfg.pages_done,
    };
    let fixed_clock = cfg.time.clone().map(FixedClock);
    let clock: &dyn ClockProvider = match &fixed_clock {
        Some(clock) => clock,
        None => &SystemClock,
    };
    let frame = PageFrame {
        kind: if cfg.fixed_layout {
            DocumentKind::FixedLayout
        } else {
            DocumentKind::Reflowable
        },
        page_number: cfg.page,
        metadata: Some(&metadata),
        toc: toc.chapter.is_some().then_some(&toc as &dyn TocProvider),
        clock,
        page_margins: PageMargins::uniform(cfg.margin),
    };

    let measurer = EgTextMeasurer::new();
    let painter = EgHeaderPainter::new();
    let modes = if cfg.modes.is_empty() {
        vec![overlay.mode()]
    } else {
        cfg.modes.clone()
    };
    for mode in modes {
        overlay
            .select_mode(i64::from(mode.persisted()))
            .map_err(|e| e.to_string())?;
        let paint = overlay.paint_frame(&frame, &measurer);
        if cfg.json {
            let json = serde_json::to_string_pretty(&paint).map_err(|e| e.to_string())?;
            println!("{}", json);
            continue;
        }

        let mut display = AsciiDisplay::new(cfg.width, cfg.height);
        painter
            .draw(&paint, &mut display)
            .map_err(|_| "draw failed".to_string())?;
        println!("== {} ({} boxes) ==", mode.label(), paint.boxes.len());
        for header_box in &paint.boxes {
            println!(
                "  {:?} at ({}, {}) {}x{}: {:?}",
                header_box.region,
                header_box.x,
                header_box.y,
                header_box.width,
                header_box.height,
                header_box.text
            );
        }
        print!("{}", display.render_inked_rows());
    }
    if measurer.live_faces() != 0 {
        return Err(format!("{} font faces still leased", measurer.live_faces()));
    }
    Ok(())
}

fn overrides(cfg: &Args) -> Vec<MenuCommand> {
    let mut commands = Vec::new();
    if let Some(size) = cfg.font_size {
        commands.push(MenuCommand::SetFontSize(size));
    }
    if cfg.bold {
        commands.push(MenuCommand::SetBold(true));
    }
    if let Some(padding) = cfg.top_padding {
        commands.push(MenuCommand::SetTopPadding(padding));
    }
    if let Some(separator) = cfg.separator {
        commands.push(MenuCommand::SetSeparator(separator));
    }
    commands
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        modes: Vec::new(),
        page: 42,
        pages_done: None,
        title: "Dune".to_string(),
        authors: "Frank Herbert".to_string(),
        chapter: Some("Book One: Dune".to_string()),
        time: None,
        width: 480,
        height: 800,
        margin: 16,
        font_size: None,
        bold: false,
        top_padding: None,
        separator: None,
        fixed_layout: false,
        settings_path: None,
        json: false,
    };

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--mode requires a value".to_string())?;
                if v == "all" {
                    cfg.modes = Mode::ALL.to_vec();
                } else {
                    let index = v
                        .parse::<i64>()
                        .map_err(|_| format!("invalid --mode value '{}'", v))?;
                    let mode = Mode::from_persisted(index).map_err(|e| e.to_string())?;
                    cfg.modes.push(mode);
                }
                i += 2;
            }
            "--page" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--page requires a value".to_string())?;
                cfg.page = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --page value '{}'", v))?;
                i += 2;
            }
            "--pages-done" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--pages-done requires a value".to_string())?;
                cfg.pages_done = Some(
                    v.parse::<u32>()
                        .map_err(|_| format!("invalid --pages-done value '{}'", v))?,
                );
                i += 2;
            }
            "--title" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--title requires a value".to_string())?;
                cfg.title = v.clone();
                i += 2;
            }
            "--authors" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--authors requires a value".to_string())?;
                cfg.authors = v.replace("\\n", "\n");
                i += 2;
            }
            "--chapter" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--chapter requires a value".to_string())?;
                cfg.chapter = Some(v.clone());
                i += 2;
            }
            "--no-toc" => {
                cfg.chapter = None;
                i += 1;
            }
            "--time" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--time requires a value".to_string())?;
                cfg.time = Some(v.clone());
                i += 2;
            }
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.width = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
                i += 2;
            }
            "--height" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--height requires a value".to_string())?;
                cfg.height = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --height value '{}'", v))?;
                i += 2;
            }
            "--margin" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--margin requires a value".to_string())?;
                cfg.margin = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --margin value '{}'", v))?;
                i += 2;
            }
            "--font-size" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--font-size requires a value".to_string())?;
                cfg.font_size = Some(
                    v.parse::<u32>()
                        .map_err(|_| format!("invalid --font-size value '{}'", v))?,
                );
                i += 2;
            }
            "--bold" => {
                cfg.bold = true;
                i += 1;
            }
            "--top-padding" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--top-padding requires a value".to_string())?;
                cfg.top_padding = Some(v.parse::<TopPadding>().map_err(|e| e.to_string())?);
                i += 2;
            }
            "--separator" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--separator requires a value".to_string())?;
                cfg.separator = Some(v.parse::<SeparatorGlyph>().map_err(|e| e.to_string())?);
                i += 2;
            }
            "--fixed-layout" => {
                cfg.fixed_layout = true;
                i += 1;
            }
            "--settings" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--settings requires a value".to_string())?;
                cfg.settings_path = Some(v.clone());
                i += 2;
            }
            "--json" => {
                cfg.json = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    if cfg.width == 0 || cfg.height == 0 {
        return Err("--width and --height must be > 0".to_string());
    }
    if cfg.page == 0 {
        return Err("--page must be > 0".to_string());
    }

    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"header-preview - render header modes as ASCII snapshots

USAGE:
  cargo run -p running-head-embedded-graphics --bin header-preview -- [options]

OPTIONS:
  --mode <n|all>        mode index 1-6, repeatable, or all (default: persisted)
  --page <n>            1-based page number (default: 42)
  --pages-done <n>      pages read in chapter before this one (default: 0)
  --title <text>        book title (default: Dune)
  --authors <text>      authors, \n separated (default: Frank Herbert)
  --chapter <text>      chapter title (default: Book One: Dune)
  --no-toc              preview a book without a table of contents
  --time <text>         fixed clock text (default: local time)
  --width <px>          screen width (default: 480)
  --height <px>         screen height (default: 800)
  --margin <px>         book page margin on each side (default: 16)
  --font-size <px>      header font size, 8-36
  --bold                bold header font
  --top-padding <key>   small|default|large
  --separator <key>     bar|bullet|dot|em_dash|en_dash
  --fixed-layout        treat the document as fixed-layout
  --settings <path>     read and persist settings in a JSON file
  --json                print paint instructions as JSON instead of ASCII
"#
}

struct NoRepaint;

impl RepaintScheduler for NoRepaint {
    fn schedule_repaint(&self) {}
}

struct StaticMetadata {
    title: String,
    authors: String,
}

impl MetadataProvider for StaticMetadata {
    fn document_props(&self) -> Option<DocumentProps> {
        Some(DocumentProps {
            display_title: self.title.clone(),
            authors: self.authors.clone(),
        })
    }
}

struct StaticToc {
    chapter: Option<String>,
    pages_done: Option<u32>,
}

impl TocProvider for StaticToc {
    fn title_for_page(&self, _page: u32) -> Option<String> {
        self.chapter.clone()
    }

    fn chapter_pages_done_for_page(&self, _page: u32) -> Option<u32> {
        Some(self.pages_done.unwrap_or(0))
    }
}

struct FixedClock(String);

impl ClockProvider for FixedClock {
    fn formatted_time(&self, _twelve_hour: bool) -> String {
        self.0.clone()
    }
}

#[derive(Clone, Debug)]
struct AsciiDisplay {
    size: Size,
    pixels: Vec<BinaryColor>,
}

impl AsciiDisplay {
    fn new(width: u32, height: u32) -> Self {
        let len = width.saturating_mul(height) as usize;
        Self {
            size: Size::new(width, height),
            pixels: vec![BinaryColor::Off; len],
        }
    }

    /// Rows with at least one inked pixel, prefixed by their y coordinate.
    fn render_inked_rows(&self) -> String {
        let width = self.size.width as usize;
        let mut out = String::new();
        for (y, row) in self.pixels.chunks(width.max(1)).enumerate() {
            if !row.contains(&BinaryColor::On) {
                continue;
            }
            let last = row
                .iter()
                .rposition(|color| *color == BinaryColor::On)
                .unwrap_or(0);
            out.push_str(&format!("{:4} ", y));
            for color in &row[..=last] {
                out.push(match color {
                    BinaryColor::On => '#',
                    BinaryColor::Off => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

impl OriginDimensions for AsciiDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for AsciiDisplay {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= w || point.y >= h {
                continue;
            }
            let idx = (point.y as u32 * self.size.width + point.x as u32) as usize;
            self.pixels[idx] = color;
        }
        Ok(())
    }
}
