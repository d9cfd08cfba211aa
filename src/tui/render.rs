//! Immediate-mode rendering of a [`TallyView`]

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};
use ratatui::Frame;

use crate::effects::{team_style, EffectFrame, Rgb, AVATAR_RADIUS};
use crate::scores::Team;
use crate::tally::{TallyView, TeamView};

const BACKGROUND: Rgb = Rgb(0x17, 0x19, 0x23);
const PANEL: Rgb = Rgb(0x1a, 0x20, 0x2c);
const PILL_BORDER: Rgb = Rgb(0x80, 0x5a, 0xd5);
const PILL_TEXT: Rgb = Rgb(0xb7, 0x94, 0xf4);
const TITLE_GRADIENT: [Rgb; 3] = [
    Rgb(0x0b, 0xc5, 0xea),
    Rgb(0x80, 0x5a, 0xd5),
    Rgb(0xd5, 0x3f, 0x8c),
];
const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
const ONLINE: Rgb = Rgb(0x38, 0xa1, 0x69);
const OFFLINE: Rgb = Rgb(0xe5, 0x3e, 0x3e);

/// Canvas half-extent in avatar pixels, wide enough for the outer ring
const AVATAR_EXTENT: f64 = AVATAR_RADIUS * 3.3;
const AVATAR_COLUMNS: u16 = 30;
const BAR_ROWS: f64 = 3.0;

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// Mix `over` onto `under` with the given opacity
pub fn blend(under: Rgb, over: Rgb, opacity: f64) -> Rgb {
    let a = opacity.clamp(0.0, 1.0);
    let mix = |u: u8, o: u8| (f64::from(u) + (f64::from(o) - f64::from(u)) * a).round() as u8;
    Rgb(mix(under.0, over.0), mix(under.1, over.1), mix(under.2, over.2))
}

fn gradient(stops: &[Rgb], t: f64) -> Rgb {
    match stops {
        [] => WHITE,
        [only] => *only,
        _ => {
            let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            blend(stops[i], stops[i + 1], pos - i as f64)
        }
    }
}

pub fn render(frame: &mut Frame, view: &TallyView) {
    let area = frame.area();
    let effects: Vec<&EffectFrame> = view.teams.iter().filter_map(|t| t.effects.as_ref()).collect();

    let background = effects
        .iter()
        .filter_map(|e| e.background_flash)
        .max_by(|a, b| a.opacity.total_cmp(&b.opacity))
        .map_or(BACKGROUND, |flash| blend(BACKGROUND, flash.color, flash.opacity));

    let border = effects
        .iter()
        .filter_map(|e| e.border_flash)
        .max_by(|a, b| a.opacity.total_cmp(&b.opacity))
        .map_or(background, |flash| blend(background, flash.color, flash.opacity));

    let frame_block = Block::bordered()
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(border.into()))
        .style(Style::default().bg(background.into()));
    let inner = frame_block.inner(area);
    frame.render_widget(frame_block, area);

    let [header, first, second, footer] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    render_header(frame, header, view);
    render_team(frame, first, view.team(Team::One), background);
    render_team(frame, second, view.team(Team::Two), background);
    render_badge(frame, area, view);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit  "),
        Span::styled("1", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("2", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" test vote"),
    ]))
    .centered()
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, footer);
}

fn render_header(frame: &mut Frame, area: Rect, view: &TallyView) {
    let [title_area, pill_row] =
        Layout::vertical([Constraint::Length(2), Constraint::Length(3)]).areas(area);

    let count = view.title.chars().count().max(2) - 1;
    let title: Vec<Span> = view
        .title
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let color = gradient(&TITLE_GRADIENT, i as f64 / count as f64);
            Span::styled(
                c.to_string(),
                Style::default().fg(color.into()).add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(title)).centered(), title_area);

    let text = Line::from(vec![
        Span::styled(
            "Total Votes: ",
            Style::default().fg(PILL_TEXT.into()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            view.total.to_string(),
            Style::default().fg(WHITE.into()).add_modifier(Modifier::BOLD),
        ),
    ]);
    let width = (text.width() as u16 + 4).min(pill_row.width);
    let pill = Rect {
        x: pill_row.x + (pill_row.width - width) / 2,
        width,
        ..pill_row
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(PILL_BORDER.into()))
        .style(Style::default().bg(PANEL.into()));
    frame.render_widget(Paragraph::new(text).centered().block(block), pill);
}

fn render_badge(frame: &mut Frame, area: Rect, view: &TallyView) {
    if area.width < 6 || area.height < 3 {
        return;
    }
    let color = if view.connected { ONLINE } else { OFFLINE };
    let badge = Rect {
        x: area.right() - 5,
        y: area.y + 1,
        width: 3,
        height: 1,
    };
    let text = Paragraph::new(view.badge()).centered().style(
        Style::default()
            .fg(WHITE.into())
            .bg(color.into())
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(text, badge);
}

fn render_team(frame: &mut Frame, area: Rect, team: &TeamView, background: Rgb) {
    let avatar_width = AVATAR_COLUMNS.min(area.width / 3);
    let (avatar_area, bar_column) = match team.team {
        Team::One => {
            let [a, b] = Layout::horizontal([Constraint::Length(avatar_width), Constraint::Fill(1)])
                .spacing(2)
                .areas(area);
            (a, b)
        }
        Team::Two => {
            let [b, a] = Layout::horizontal([Constraint::Fill(1), Constraint::Length(avatar_width)])
                .spacing(2)
                .areas(area);
            (a, b)
        }
    };

    render_avatar(frame, avatar_area, team, background);
    if bar_column.height < 2 {
        return;
    }

    let style = team_style(team.team);
    let mut heading = vec![Span::styled(
        team.label.clone(),
        Style::default().fg(style.accent.into()).add_modifier(Modifier::BOLD),
    )];
    if team.chain >= 2 {
        heading.push(Span::styled(
            format!("  x{} COMBO!", team.chain),
            Style::default().fg(WHITE.into()).add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ));
    }

    let bar_rows = ((BAR_ROWS * team.scale).round() as u16).clamp(1, bar_column.height - 1);
    let used = bar_rows + 1;
    let top = bar_column.y + (bar_column.height - used) / 2;
    let heading_area = Rect { y: top, height: 1, ..bar_column };
    let bar_area = Rect {
        y: top + 1,
        height: bar_rows,
        ..bar_column
    };

    frame.render_widget(Paragraph::new(Line::from(heading)), heading_area);
    frame.render_widget(
        VoteBar {
            fill: team.bar_fill,
            label: format!("{} Votes", team.count),
            color: style.primary,
            shimmer: team.shimmer,
        },
        bar_area,
    );
}

fn render_avatar(frame: &mut Frame, area: Rect, team: &TeamView, background: Rgb) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let style = team_style(team.team);
    // Terminal cells are roughly twice as tall as they are wide.
    let aspect = f64::from(area.width) / (f64::from(area.height) * 2.0);
    let x_extent = AVATAR_EXTENT * aspect.max(0.1);
    let scale = team.scale;
    let effects = team.effects.clone();
    let label = match team.team {
        Team::One => "P1",
        Team::Two => "P2",
    };

    let canvas = Canvas::default()
        .background_color(background.into())
        .marker(Marker::Braille)
        .x_bounds([-x_extent, x_extent])
        .y_bounds([-AVATAR_EXTENT, AVATAR_EXTENT])
        .paint(move |ctx| {
            if let Some(effects) = &effects {
                for ring in &effects.rings {
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius: ring.radius,
                        color: blend(background, ring.color, ring.opacity).into(),
                    });
                }
            }

            let radius = AVATAR_RADIUS * scale;
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius,
                color: style.border.into(),
            });
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: radius * 0.92,
                color: style.primary.into(),
            });

            let wobble = effects.as_ref().map_or(0.0, |e| e.wobble);
            let angle = (90.0 + wobble).to_radians();
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: radius * 0.5,
                x2: angle.cos() * radius * 0.85,
                y2: angle.sin() * radius * 0.85,
                color: style.accent.into(),
            });

            ctx.layer();
            if let Some(effects) = &effects {
                for particle in effects.particles.iter().filter(|p| p.scale > 0.05) {
                    ctx.draw(&Points {
                        coords: &[(particle.x, -particle.y)],
                        color: blend(background, particle.color, particle.opacity).into(),
                    });
                }
                for glyph in effects.glyphs.iter().filter(|g| g.opacity > 0.05) {
                    ctx.print(
                        glyph.x,
                        -glyph.y,
                        Span::styled(
                            glyph.glyph.to_string(),
                            Style::default().fg(blend(background, style.accent, glyph.opacity).into()),
                        ),
                    );
                }
            }
            ctx.print(
                -AVATAR_RADIUS * 0.1,
                0.0,
                Span::styled(label, Style::default().fg(WHITE.into()).add_modifier(Modifier::BOLD)),
            );
        });

    frame.render_widget(canvas, area);
}

/// Horizontal tally bar with a centred vote count and a moving shimmer
pub struct VoteBar {
    /// Fill in percent
    pub fill: f64,
    pub label: String,
    pub color: Rgb,
    /// Shimmer sweep position, 0..1
    pub shimmer: f64,
}

impl Widget for VoteBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let filled = ((f64::from(area.width) * self.fill / 100.0).round() as u16).min(area.width);

        // Sweeps from one bar-length left of the fill to two past it.
        let band = (f64::from(filled) / 3.0).max(1.0);
        let center = f64::from(filled) * (-1.0 + 3.0 * self.shimmer);

        for x in 0..area.width {
            let bg = if x < filled {
                let distance = (f64::from(x) - center).abs();
                let glow = if distance < band { (1.0 - distance / band) * 0.2 } else { 0.0 };
                blend(self.color, WHITE, glow)
            } else {
                PANEL
            };
            for y in area.top()..area.bottom() {
                buf[(area.x + x, y)].set_bg(bg.into());
            }
        }

        let width = self.label.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;
        buf.set_stringn(
            x,
            y,
            &self.label,
            area.width as usize,
            Style::default().fg(WHITE.into()).add_modifier(Modifier::BOLD),
        );
    }
}
