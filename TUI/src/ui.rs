use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::bubble::BubbleField;
use crate::config::APP_TITLE;
use crate::fluid::FluidGrid;
use crate::layout::ViewLayout;

// Pastel palette
const WHITE: Color = Color::Rgb(255, 255, 255);
const BLACK: Color = Color::Rgb(0, 0, 0);
const PASTEL_PINK: Color = Color::Rgb(255, 204, 255);   // Status bar
const BUTTON_COLOR: Color = Color::Rgb(240, 180, 255);  // Button fill
const BUTTON_BUSY: Color = Color::Rgb(205, 160, 225);   // Generate while fetching
const TEXT_DIM: Color = Color::Rgb(120, 70, 110);       // Hints

const BUBBLE_ALPHA: u16 = 120;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    draw_background(frame, app, area);

    let layout = ViewLayout::new(area);

    let header = Paragraph::new(APP_TITLE)
        .alignment(Alignment::Center)
        .style(Style::default().fg(WHITE).add_modifier(Modifier::BOLD));
    frame.render_widget(header, layout.header);

    draw_label(frame, "Enter Website URL:", layout.input_label);
    draw_input(frame, app, layout.input);
    draw_button(frame, "Paste", layout.paste, BUTTON_COLOR);

    let generate_label = if app.ui.is_loading {
        format!("{} Generate", SPINNER[(app.animation_frame / 6) % SPINNER.len()])
    } else {
        "Generate".to_string()
    };
    let generate_color = if app.ui.is_loading { BUTTON_BUSY } else { BUTTON_COLOR };
    draw_button(frame, &generate_label, layout.generate, generate_color);
    draw_button(frame, &format!("Style: {}", app.ui.style), layout.style, BUTTON_COLOR);

    draw_label(frame, "Citation:", layout.citation_label);
    draw_citation(frame, app, layout.citation);

    draw_button(frame, "Copy", layout.copy, BUTTON_COLOR);
    draw_button(frame, "Clear", layout.clear, BUTTON_COLOR);

    draw_status(frame, app, layout.status);
}

/// Off-screen RGB pixels, two per terminal cell vertically.
struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<(u8, u8, u8)>,
}

impl PixelCanvas {
    fn new(area: Rect) -> Self {
        let width = area.width as usize;
        let height = area.height as usize * 2;
        Self {
            width,
            height,
            pixels: vec![(0, 0, 0); width * height],
        }
    }

    fn paint_fluid(&mut self, fluid: &FluidGrid) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        for py in 0..self.height {
            let gy = py * fluid.height() / self.height;
            for px in 0..self.width {
                let gx = px * fluid.width() / self.width;
                let shade = fluid_shade(fluid.value(gx, gy).unwrap_or(0.0));
                self.pixels[py * self.width + px] = (255, shade, shade);
            }
        }
    }

    fn paint_bubbles(&mut self, field: &BubbleField) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let sx = self.width as f32 / field.width();
        let sy = self.height as f32 / field.height();

        for bubble in field.bubbles() {
            let cx = bubble.x * sx;
            let cy = bubble.y * sy;
            let rx = (bubble.radius * sx).max(0.5);
            let ry = (bubble.radius * sy).max(0.5);

            let x_min = (cx - rx).floor().max(0.0) as usize;
            let y_min = (cy - ry).floor().max(0.0) as usize;
            let x_max = ((cx + rx).ceil().max(0.0) as usize).min(self.width);
            let y_max = ((cy + ry).ceil().max(0.0) as usize).min(self.height);

            for py in y_min..y_max {
                for px in x_min..x_max {
                    let dx = (px as f32 + 0.5 - cx) / rx;
                    let dy = (py as f32 + 0.5 - cy) / ry;
                    if dx * dx + dy * dy <= 1.0 {
                        let p = &mut self.pixels[py * self.width + px];
                        *p = (blend_white(p.0), blend_white(p.1), blend_white(p.2));
                    }
                }
            }
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.height / 2);
        for row in 0..self.height / 2 {
            let top = row * 2 * self.width;
            let bottom = top + self.width;
            let spans: Vec<Span> = (0..self.width)
                .map(|x| {
                    let (tr, tg, tb) = self.pixels[top + x];
                    let (br, bg, bb) = self.pixels[bottom + x];
                    Span::styled(
                        "▀",
                        Style::default().fg(Color::Rgb(tr, tg, tb)).bg(Color::Rgb(br, bg, bb)),
                    )
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines
    }
}

/// Fluid value to the green/blue channel of a pink shade.
fn fluid_shade(value: f32) -> u8 {
    ((180.0 + value * 150.0) as i32).clamp(50, 255) as u8
}

fn blend_white(channel: u8) -> u8 {
    let c = channel as u16;
    (c + (255 - c) * BUBBLE_ALPHA / 255) as u8
}

fn draw_background(frame: &mut Frame, app: &App, area: Rect) {
    let mut canvas = PixelCanvas::new(area);
    canvas.paint_fluid(&app.fluid);
    canvas.paint_bubbles(&app.bubbles);
    frame.render_widget(Paragraph::new(canvas.into_lines()), area);
}

fn draw_label(frame: &mut Frame, text: &str, area: Rect) {
    let label = Paragraph::new(text).style(Style::default().fg(WHITE).add_modifier(Modifier::BOLD));
    frame.render_widget(label, area);
}

fn draw_button(frame: &mut Frame, text: &str, area: Rect, fill: Color) {
    if area.area() == 0 {
        return;
    }
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(fill).fg(BLACK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(BLACK).add_modifier(Modifier::BOLD));
    frame.render_widget(label, inner);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    // Pulse when focused
    let border_color = if app.ui.input_focused {
        let glow = (app.animation_frame as f64 / 20.0).sin() * 0.25 + 0.75;
        let g = (255.0 * glow) as u8;
        Color::Rgb(255, g, 255)
    } else {
        WHITE
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = if app.ui.input_focused && app.animation_frame % 30 < 15 { "|" } else { "" };
    // One column for the leading space, one for the cursor
    let visible = tail_fitting(&app.ui.input, (inner.width as usize).saturating_sub(2));
    let input = Paragraph::new(format!(" {}{}", visible, cursor))
        .style(Style::default().fg(WHITE).add_modifier(Modifier::BOLD));
    frame.render_widget(input, inner);
}

/// Longest suffix of `text` that fits in `width` columns.
fn tail_fitting(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    &text[start..]
}

fn draw_citation(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(WHITE));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = if app.is_fetching() && app.ui.citation.is_empty() {
        "Fetching page...".to_string()
    } else {
        app.ui.citation.clone()
    };
    let citation = Paragraph::new(text)
        .style(Style::default().fg(WHITE).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    frame.render_widget(citation, inner);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    if area.area() == 0 {
        return;
    }
    frame.render_widget(Clear, area);

    let mut spans = Vec::new();
    if let Some(message) = &app.ui.status_message {
        spans.push(Span::styled(format!(" {} ", message), Style::default().fg(BLACK).add_modifier(Modifier::BOLD)));
    }
    spans.push(Span::styled(
        " Click a field to type · Enter generate · Tab style · Esc quit ",
        Style::default().fg(TEXT_DIM),
    ));

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(PASTEL_PINK));
    frame.render_widget(status, area);
}
