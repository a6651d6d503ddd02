//! Screen regions shared by drawing and mouse hit-testing.

use ratatui::layout::{Position, Rect};

use crate::action::Action;

const PANEL_MAX_WIDTH: u16 = 72;
const PASTE_WIDTH: u16 = 11;
const GENERATE_WIDTH: u16 = 14;
const STYLE_WIDTH: u16 = 17;
const SMALL_BUTTON_WIDTH: u16 = 10;
const BUTTON_HEIGHT: u16 = 3;
const CITATION_HEIGHT: u16 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    pub header: Rect,
    pub input_label: Rect,
    pub input: Rect,
    pub paste: Rect,
    pub generate: Rect,
    pub style: Rect,
    pub citation_label: Rect,
    pub citation: Rect,
    pub copy: Rect,
    pub clear: Rect,
    pub status: Rect,
}

impl ViewLayout {
    pub fn new(area: Rect) -> Self {
        let panel_w = area.width.saturating_sub(4).min(PANEL_MAX_WIDTH);
        let x0 = area.x + (area.width - panel_w) / 2;
        let y0 = area.y;

        let input_w = panel_w.saturating_sub(PASTE_WIDTH + 1);

        // Generate and style side by side, centered
        let row_w = GENERATE_WIDTH + 1 + STYLE_WIDTH;
        let gx = x0 + panel_w.saturating_sub(row_w) / 2;

        // Copy and clear side by side, centered
        let pair_w = SMALL_BUTTON_WIDTH * 2 + 2;
        let cx = x0 + panel_w.saturating_sub(pair_w) / 2;

        // The status bar owns the last row; controls live above it
        let status = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, area.height.min(1));
        let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));

        // Copy and clear sit on the bottom of the body, the citation box shrinks to make room
        let citation_y = y0 + 13;
        let buttons_y = (y0 + 21)
            .min(body.bottom().saturating_sub(BUTTON_HEIGHT))
            .max(citation_y);
        let citation_h = CITATION_HEIGHT.min(buttons_y - citation_y);

        // A control that does not fit whole is dropped rather than cut
        let fit = |r: Rect| if r.intersection(body) == r { r } else { Rect::default() };

        Self {
            header: fit(Rect::new(x0, y0 + 1, panel_w, 1)),
            input_label: fit(Rect::new(x0, y0 + 3, panel_w, 1)),
            input: fit(Rect::new(x0, y0 + 4, input_w, BUTTON_HEIGHT)),
            paste: fit(Rect::new(x0 + input_w + 1, y0 + 4, PASTE_WIDTH, BUTTON_HEIGHT)),
            generate: fit(Rect::new(gx, y0 + 8, GENERATE_WIDTH, BUTTON_HEIGHT)),
            style: fit(Rect::new(gx + GENERATE_WIDTH + 1, y0 + 8, STYLE_WIDTH, BUTTON_HEIGHT)),
            citation_label: fit(Rect::new(x0, y0 + 12, panel_w, 1)),
            citation: fit(Rect::new(x0, citation_y, panel_w, citation_h)),
            copy: fit(Rect::new(cx, buttons_y, SMALL_BUTTON_WIDTH, BUTTON_HEIGHT)),
            clear: fit(Rect::new(
                cx + SMALL_BUTTON_WIDTH + 2,
                buttons_y,
                SMALL_BUTTON_WIDTH,
                BUTTON_HEIGHT,
            )),
            status,
        }
    }

    /// Actions for a click at (`col`, `row`).
    ///
    /// Every region is tested; all that contain the point fire, in order.
    /// The input box always contributes either focus or blur.
    pub fn hit_test(&self, col: u16, row: u16) -> Vec<Action> {
        let pos = Position::new(col, row);
        let mut actions = Vec::new();

        if self.input.contains(pos) {
            actions.push(Action::FocusInput);
        } else {
            actions.push(Action::BlurInput);
        }

        let buttons = [
            (self.paste, Action::Paste),
            (self.generate, Action::Generate),
            (self.style, Action::CycleStyle),
            (self.copy, Action::CopyCitation),
            (self.clear, Action::Clear),
        ];
        for (rect, action) in buttons {
            if rect.contains(pos) {
                actions.push(action);
            }
        }

        actions
    }
}
