//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]). Nothing in this module mutates
//! anything but the overlay's [`ListState`](ratatui::widgets::ListState).
//!
//! ## For contributors
//!
//! * The screen is a single column: status bar, category chips, headline,
//!   poem, indicator, notification and help, top to bottom.
//! * History and favorites are drawn as a popup over the main view.
//! * Colours come from [`Palette`], one per [`Theme`].

use chrono::{DateTime, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Overlay};
use crate::locale::{self, Category, LanguageChoice};
use crate::store::Theme;

const SKELETON_LINE: &str = "░░░░░░░░░░░░░░░░░░░░░░░░";

struct Palette {
    fg: Color,
    muted: Color,
    accent: Color,
    chip_bg: Color,
    notice: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                chip_bg: Color::DarkGray,
                notice: Color::Yellow,
            },
            Theme::Light => Palette {
                fg: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                chip_bg: Color::Gray,
                notice: Color::Magenta,
            },
        }
    }
}

/// Clock and date strings for the status bar, e.g. `("09:41", "Sun, 18 Oct")`.
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> (String, String)
where
    Tz::Offset: std::fmt::Display,
{
    (
        now.format("%H:%M").to_string(),
        now.format("%a, %d %b").to_string(),
    )
}

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let palette = Palette::for_theme(*app.prefs.theme.get());

    let [status, chips, headline, poem, indicator, notice, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_status_bar(&palette, frame, status);
    draw_chips(app, &palette, frame, chips);
    draw_output(
        frame,
        headline,
        " Headline ",
        &app.headline_out,
        app.skeleton,
        Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        &palette,
    );
    let poem_title = if app.fav_active { " Haiku ★ " } else { " Haiku " };
    draw_output(
        frame,
        poem,
        poem_title,
        &app.poem_out,
        app.skeleton,
        Style::default().fg(palette.accent).add_modifier(Modifier::ITALIC),
        &palette,
    );

    frame.render_widget(
        Paragraph::new(app.indicator()).style(Style::default().fg(palette.muted)),
        indicator,
    );
    if let Some(notification) = &app.notification {
        frame.render_widget(
            Paragraph::new(notification.text.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.notice)),
            notice,
        );
    }
    draw_help(app, &palette, frame, help);

    if app.overlay != Overlay::None {
        draw_overlay(app, &palette, frame);
    }
}

fn draw_status_bar(palette: &Palette, frame: &mut Frame, area: Rect) {
    let (clock, date) = format_clock(&chrono::Local::now());
    let [left, right] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(date.len() as u16 + 1)])
            .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {clock}  "), Style::default().fg(palette.fg)),
            Span::styled(
                "News Haiku",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
        ])),
        left,
    );
    frame.render_widget(
        Paragraph::new(date).style(Style::default().fg(palette.muted)),
        right,
    );
}

fn draw_chips(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let selected = *app.prefs.category.get();
    let country = app.prefs.country.get();
    let language = app.prefs.language.get();
    let language_text = match language {
        LanguageChoice::Auto => "auto".to_string(),
        LanguageChoice::Explicit(code) => code.clone(),
    };
    let mut spans = vec![
        Span::styled(
            format!(" {} {} ", locale::flag_emoji(country), locale::country_name(country)),
            Style::default().fg(palette.fg),
        ),
        Span::styled(format!("· {language_text} "), Style::default().fg(palette.accent)),
        Span::styled("│ ", Style::default().fg(palette.muted)),
    ];
    for category in Category::ALL {
        let style = if category == selected {
            Style::default()
                .fg(palette.fg)
                .bg(palette.chip_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {} ", category.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_output(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    text: &str,
    skeleton: bool,
    style: Style,
    palette: &Palette,
) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted));

    // Skeleton only until the first revealed character arrives.
    let body = if skeleton && text.is_empty() {
        Paragraph::new(SKELETON_LINE).style(Style::default().fg(palette.muted))
    } else {
        Paragraph::new(text.to_string()).style(style)
    };
    frame.render_widget(body.block(block).wrap(Wrap { trim: true }), area);
}

fn draw_help(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let help = match app.overlay {
        Overlay::None => {
            " n: generate  c: copy  f: favorite  w/b: share  [/]: category  </>: country  \
             l: language  s: sound  t: theme  h: history  v: favorites  q: quit"
        }
        Overlay::History => " ↑/↓: move  o: open  c: copy  f: favorite  esc: close",
        Overlay::Favorites => " ↑/↓: move  o: open  c: copy  d: remove  esc: close",
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(palette.muted)),
        area,
    );
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn draw_overlay(app: &mut App, palette: &Palette, frame: &mut Frame) {
    let (title, empty) = match app.overlay {
        Overlay::Favorites => (" Favorites ", "Nothing here yet."),
        _ => (" History ", "History is empty."),
    };
    let area = popup_area(frame.area(), 80, 70);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    frame.render_widget(Clear, area);

    let entries = app.overlay_entries();
    if entries.is_empty() {
        frame.render_widget(
            Paragraph::new(empty)
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let meta = format!(
                "{} • {} • {} • {} • {}",
                entry.source,
                entry.country,
                entry.category.label(),
                entry.poem_language,
                entry.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
            );
            let mut lines = vec![
                Line::styled(meta, Style::default().fg(palette.accent)),
                Line::styled(
                    entry.title.clone(),
                    Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                ),
            ];
            lines.extend(entry.poem.lines().map(|line| {
                Line::styled(
                    format!("  {line}"),
                    Style::default()
                        .fg(palette.muted)
                        .add_modifier(Modifier::ITALIC),
                )
            }));
            lines.push(Line::raw(""));
            ListItem::new(Text::from(lines))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(palette.chip_bg))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::make_app;
    use crate::pipeline::PipelineEvent;
    use crate::testing::entry;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn clock_and_date_format() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 0).unwrap();
        assert_eq!(
            format_clock(&now),
            ("09:05".to_string(), "Sun, 18 Oct".to_string())
        );
    }

    #[test]
    fn draw_initial_screen() {
        let (mut app, _, _) = make_app();
        let screen = render(&mut app);
        assert!(screen.contains("Tap Generate..."));
        assert!(screen.contains("...and turn a headline"));
        assert!(screen.contains("Technology"));
        assert!(screen.contains("Lithuania"));
        assert!(screen.contains("n: generate"));
    }

    #[test]
    fn draw_skeleton_while_busy() {
        let (mut app, _, _) = make_app();
        app.apply(PipelineEvent::Busy(true));
        app.apply(PipelineEvent::HeadlineText(String::new()));
        app.apply(PipelineEvent::PoemText(String::new()));
        let screen = render(&mut app);
        assert!(screen.contains("░░░░"));
        assert!(!screen.contains("Tap Generate"));
    }

    #[test]
    fn draw_empty_overlays() {
        let (mut app, _, _) = make_app();
        app.open_overlay(Overlay::History);
        assert!(render(&mut app).contains("History is empty."));

        app.open_overlay(Overlay::Favorites);
        assert!(render(&mut app).contains("Nothing here yet."));
    }

    #[test]
    fn draw_history_entries() {
        let (mut app, library, _) = make_app();
        library.record(entry("Quiet harbour", "gulls\nsalt wind\nnets"));
        app.open_overlay(Overlay::History);

        let screen = render(&mut app);
        assert!(screen.contains("Quiet harbour"));
        assert!(screen.contains("salt wind"));
        assert!(screen.contains("Example News • US • General • en"));
    }

    #[test]
    fn draw_notification() {
        let (mut app, _, _) = make_app();
        app.notify("Country: Latvia");
        assert!(render(&mut app).contains("Country: Latvia"));
    }

    #[test]
    fn draw_light_theme_and_tiny_terminal() {
        let (mut app, _, _) = make_app();
        app.toggle_theme();
        let backend = TestBackend::new(10, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }
}
