use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

use crate::body::CelestialBody;
use crate::glyphs::{spectral_class, star_symbol, style_for, symbol_for};
use crate::raster::{Grid, BLANK};
use crate::state::AppState;

const LIST_WIDTH: u16 = 24;
const TOP_ROWS: u16 = 2;
const BOTTOM_ROWS: u16 = 2;
const DETAILS_WIDTH: u16 = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            bold: false,
        }
    }
}

pub struct CellBuffer {
    pub w: u16,
    pub h: u16,
    pub cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

pub fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bold: bool) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg: Color::Black, bold });
    }
}

/// Screen regions for one terminal size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub cols: u16,
    pub rows: u16,
    pub list_width: u16,
}

impl Layout {
    pub fn new(cols: u16, rows: u16) -> Self {
        let list_width = if cols >= LIST_WIDTH * 3 { LIST_WIDTH } else { 0 };
        Self { cols, rows, list_width }
    }

    /// Top-left of the orbital view.
    pub fn view_origin(&self) -> (u16, u16) {
        (self.list_width, TOP_ROWS)
    }

    pub fn view_size(&self) -> (usize, usize) {
        let w = self.cols.saturating_sub(self.list_width);
        let h = self.rows.saturating_sub(TOP_ROWS + BOTTOM_ROWS);
        (w as usize, h as usize)
    }
}

/// Copies the orbital grid into the cell buffer, applying glyph styles.
pub fn blit_grid(buf: &mut CellBuffer, grid: &Grid, origin: (u16, u16), enable_color: bool) {
    for (x, y, ch) in grid.occupied() {
        if ch == BLANK {
            continue;
        }
        let style = style_for(ch);
        let fg = if enable_color { style.fg } else { Color::White };
        buf.set(
            origin.0.saturating_add(x as u16),
            origin.1.saturating_add(y as u16),
            Cell { ch, fg, bg: Color::Black, bold: style.bold },
        );
    }
}

pub fn body_glyph(body: &CelestialBody) -> char {
    if body.is_primary() {
        star_symbol(body)
    } else {
        symbol_for(body.display_name())
    }
}

fn fmt_num(v: f64, unit: &str) -> String {
    if v == 0.0 {
        "unknown".to_string()
    } else if v.abs() >= 1e6 {
        format!("{v:.3e} {unit}").trim_end().to_string()
    } else {
        format!("{v:.2} {unit}").trim_end().to_string()
    }
}

/// Label/value lines for the details panel.
pub fn detail_lines(body: &CelestialBody) -> Vec<String> {
    let mut out = vec![
        format!("{} {}", body_glyph(body), body.display_name()),
        format!("Type: {:?}", body.kind),
        format!("Radius: {}", fmt_num(body.mean_radius, "km")),
        format!("Mass: {}", fmt_num(body.mass_kg(), "kg")),
        format!("Density: {}", fmt_num(body.density, "g/cm³")),
        format!("Gravity: {}", fmt_num(body.gravity, "m/s²")),
    ];
    if !body.is_primary() {
        out.push(format!("Distance: {}", fmt_num(body.semimajor_axis, "")));
        out.push(format!("Orbital period: {}", fmt_num(body.sideral_orbit, "days")));
        out.push(format!("Eccentricity: {:.4}", body.eccentricity));
    } else {
        let class = if body.stellar_class.is_empty() {
            spectral_class(body).map(|c| format!("{c} (estimated)")).unwrap_or_else(|| "unknown".into())
        } else {
            body.stellar_class.clone()
        };
        out.push(format!("Stellar class: {class}"));
        out.push(format!("Temperature: {}", fmt_num(body.temperature, "K")));
    }
    out.extend(moon_lines(body));
    out
}

const MAX_LISTED_MOONS: usize = 6;

fn moon_lines(body: &CelestialBody) -> Vec<String> {
    let total = body.moons.len();
    if total == 0 {
        return Vec::new();
    }
    let names = body.moon_names();
    let shown = names.len().min(MAX_LISTED_MOONS);
    let mut out = vec![format!("Moons: {total}")];
    out.extend(names.iter().take(shown).map(|n| format!("  • {n}")));
    if total > shown {
        out.push(format!("  • ... and {} more", total - shown));
    }
    out
}

pub const INSTRUCTIONS: &str =
    "q quit  ←/→ select  Enter details  s next system  p pause  +/- warp  n now  click select";

/// Title, body list, details panel, status and instruction lines.
pub fn draw_hud(buf: &mut CellBuffer, layout: Layout, st: &AppState, enable_color: bool) {
    let hi = if enable_color { Color::Yellow } else { Color::White };
    let dim = if enable_color { Color::Grey } else { Color::White };
    let info = if enable_color { Color::Cyan } else { Color::White };

    draw_text(buf, 1, 0, &format!("✶ {}", st.system().display_name), hi, true);

    if layout.list_width > 0 {
        for (i, body) in st.system().bodies.iter().enumerate() {
            let y = TOP_ROWS + i as u16;
            if y >= layout.rows.saturating_sub(BOTTOM_ROWS) {
                break;
            }
            let selected = i == st.selected;
            let marker = if selected { '>' } else { ' ' };
            let mut line = format!("{marker} {} {}", body_glyph(body), body.display_name());
            line.truncate(line.char_indices().nth(layout.list_width as usize - 1).map_or(line.len(), |(b, _)| b));
            draw_text(buf, 0, y, &line, if selected { hi } else { Color::White }, selected);
        }
    }

    if st.show_details {
        if let Some(body) = st.selected_body() {
            let x0 = layout.cols.saturating_sub(DETAILS_WIDTH);
            for (i, line) in detail_lines(body).iter().enumerate() {
                let y = TOP_ROWS + i as u16;
                for dx in 0..DETAILS_WIDTH {
                    buf.set(x0 + dx, y, Cell::default());
                }
                draw_text(buf, x0 + 1, y, line, if i == 0 { hi } else { Color::White }, i == 0);
            }
        }
    }

    let clock = &st.clock;
    let mut status = format!(
        "{}  {}  warp {:.2} d/s{}",
        st.system().display_name,
        clock.now().format("%Y-%m-%d %H:%M UTC"),
        clock.warp(),
        if clock.is_paused() { "  [paused]" } else { "" }
    );
    if let Some(err) = &st.status {
        status.push_str("  ! ");
        status.push_str(err);
    }
    draw_text(buf, 1, layout.rows.saturating_sub(2), &status, dim, false);
    draw_text(buf, 1, layout.rows.saturating_sub(1), INSTRUCTIONS, info, false);
}

pub struct Terminal {
    out: io::Stdout,
    pub cols: u16,
    pub rows: u16,
    prev: CellBuffer,
    pub cur: CellBuffer,
    full_repaint: bool,
}

impl Terminal {
    pub fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            full_repaint: true,
        })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.full_repaint = true;
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Writes changed cells only, except on the first frame after begin or resize.
    pub fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bold = None;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.full_repaint && c == self.prev.cells[i] {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg), SetBackgroundColor(c.bg))?;
                    last_fg = Some(c.fg);
                }
                if last_bold != Some(c.bold) {
                    let attr = if c.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = Some(c.bold);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.full_repaint = false;
        Ok(())
    }
}
