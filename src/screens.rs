// HomeWatch — Display Pages & Rendering
//
// Seven views: the framed overview list, five single-value detail pages and
// the function-select page. Static chrome is drawn once per full redraw;
// dynamic values are re-rendered in place on sampling ticks, padded with
// trailing spaces so stale digits get overwritten without clearing.

use crate::config::DETAIL_FONT_SIZE;
use crate::events::SensorSample;
use crate::hal::Board;

const STR_MAIN_TITLE: &str = "MODE: MONITOR";
const STR_MAIN_LUX: &str = "LUX : ";
const STR_MAIN_TEMP: &str = "TEMP: ";
const STR_MAIN_ACCX: &str = "ACCX: ";
const STR_MAIN_ACCY: &str = "ACCY: ";
const STR_MAIN_ACCZ: &str = "ACCZ: ";

const STR_BIG_TEMP: &str = "TEMP   ";
const STR_BIG_LIGHT: &str = "LUX   ";
const STR_BIG_ACCX: &str = "ACC X  ";
const STR_BIG_ACCY: &str = "ACC Y  ";
const STR_BIG_ACCZ: &str = "ACC Z  ";

const STR_FUNC_TITLE: &str = "Select Function:";
const FUNC_LABELS: [&str; 4] = ["Siren       ", "Assistance  ", "Lights      ", "Reserved    "];

const ARROW_CHAR: &str = ">";
const BLANK_CHAR: &str = " ";

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The seven display pages. Navigation wraps; only `FunctionSelect`
/// accepts selection/activate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    TempDetail,
    LightDetail,
    AccelX,
    AccelY,
    AccelZ,
    FunctionSelect,
}

impl Page {
    pub fn next(self) -> Self {
        match self {
            Page::Overview => Page::TempDetail,
            Page::TempDetail => Page::LightDetail,
            Page::LightDetail => Page::AccelX,
            Page::AccelX => Page::AccelY,
            Page::AccelY => Page::AccelZ,
            Page::AccelZ => Page::FunctionSelect,
            Page::FunctionSelect => Page::Overview,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Page::Overview => Page::FunctionSelect,
            Page::TempDetail => Page::Overview,
            Page::LightDetail => Page::TempDetail,
            Page::AccelX => Page::LightDetail,
            Page::AccelY => Page::AccelX,
            Page::AccelZ => Page::AccelY,
            Page::FunctionSelect => Page::AccelZ,
        }
    }
}

// ---------------------------------------------------------------------------
// Function Selection
// ---------------------------------------------------------------------------

/// The four armable actions on the function-select page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Function {
    #[default]
    Siren,
    Assistance,
    Lights,
    Reserved,
}

impl Function {
    pub fn next(self) -> Self {
        match self {
            Function::Siren => Function::Assistance,
            Function::Assistance => Function::Lights,
            Function::Lights => Function::Reserved,
            Function::Reserved => Function::Siren,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Function::Siren => Function::Reserved,
            Function::Assistance => Function::Siren,
            Function::Lights => Function::Assistance,
            Function::Reserved => Function::Lights,
        }
    }

    fn row(self) -> i32 {
        match self {
            Function::Siren => 0,
            Function::Assistance => 1,
            Function::Lights => 2,
            Function::Reserved => 3,
        }
    }
}

/// Vertical position of the selection arrow for a given slot.
fn arrow_y(selection: Function) -> i32 {
    13 * (1 + selection.row())
}

// ---------------------------------------------------------------------------
// Chrome
// ---------------------------------------------------------------------------

/// Clear the display and draw the static chrome for `page`.
pub fn draw_chrome(board: &mut impl Board, page: Page, selection: Function) {
    board.clear_display();
    match page {
        Page::Overview => {
            board.render_text(1, 1, STR_MAIN_TITLE, 1);
            board.render_rect(0, 10, 95, 62);
            board.render_text(2, 12, STR_MAIN_LUX, 1);
            board.render_text(2, 22, STR_MAIN_TEMP, 1);
            board.render_text(2, 32, STR_MAIN_ACCX, 1);
            board.render_text(2, 42, STR_MAIN_ACCY, 1);
            board.render_text(2, 52, STR_MAIN_ACCZ, 1);
        }
        Page::TempDetail => board.render_text(20, 1, STR_BIG_TEMP, DETAIL_FONT_SIZE),
        Page::LightDetail => board.render_text(30, 1, STR_BIG_LIGHT, DETAIL_FONT_SIZE),
        Page::AccelX => board.render_text(15, 1, STR_BIG_ACCX, DETAIL_FONT_SIZE),
        Page::AccelY => board.render_text(15, 1, STR_BIG_ACCY, DETAIL_FONT_SIZE),
        Page::AccelZ => board.render_text(15, 1, STR_BIG_ACCZ, DETAIL_FONT_SIZE),
        Page::FunctionSelect => {
            board.render_text(1, 1, STR_FUNC_TITLE, 1);
            board.render_rect(0, 10, 95, 23);
            board.render_rect(0, 23, 95, 36);
            board.render_rect(0, 36, 95, 49);
            board.render_rect(0, 49, 95, 62);
            for (i, label) in FUNC_LABELS.iter().enumerate() {
                board.render_text(9, 13 * (1 + i as i32), label, 1);
            }
            draw_selection_arrow(board, selection);
        }
    }
}

/// Repaint only the selection arrow on the function-select page.
pub fn draw_selection_arrow(board: &mut impl Board, selection: Function) {
    for slot in [
        Function::Siren,
        Function::Assistance,
        Function::Lights,
        Function::Reserved,
    ] {
        board.render_text(2, arrow_y(slot), BLANK_CHAR, 1);
    }
    board.render_text(2, arrow_y(selection), ARROW_CHAR, 1);
}

// ---------------------------------------------------------------------------
// Dynamic Values
// ---------------------------------------------------------------------------

fn fmt_uint(v: u32) -> String {
    format!("{}    ", v)
}

fn fmt_int(v: i16) -> String {
    format!("{}    ", v)
}

fn fmt_temp(tenths: i32) -> String {
    format!("{:.2}   ", tenths as f32 / 10.0)
}

/// Re-render the dynamic numeric fields of `page` without touching chrome.
pub fn draw_values(board: &mut impl Board, page: Page, sample: &SensorSample) {
    let (ax, ay, az) = sample.rel_acc();
    match page {
        Page::Overview => {
            board.render_text(35, 12, &fmt_uint(sample.light), 1);
            board.render_text(35, 22, &fmt_temp(sample.temperature), 1);
            board.render_text(35, 32, &fmt_int(ax), 1);
            board.render_text(35, 42, &fmt_int(ay), 1);
            board.render_text(35, 52, &fmt_int(az), 1);
        }
        Page::TempDetail => {
            board.render_text(15, 27, &fmt_temp(sample.temperature), DETAIL_FONT_SIZE)
        }
        Page::LightDetail => board.render_text(25, 27, &fmt_uint(sample.light), DETAIL_FONT_SIZE),
        Page::AccelX => board.render_text(35, 27, &fmt_int(ax), DETAIL_FONT_SIZE),
        Page::AccelY => board.render_text(35, 27, &fmt_int(ay), DETAIL_FONT_SIZE),
        Page::AccelZ => board.render_text(35, 27, &fmt_int(az), DETAIL_FONT_SIZE),
        Page::FunctionSelect => {} // No sensor values on this page.
    }
}
