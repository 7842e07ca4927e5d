use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use ratatui_image::StatefulImage;

use crate::{
    app::state::{App, InputMode},
    player::commands::PlayerState,
    playlist::LOCAL_ARTIST,
    ui::{
        cover::{CoverState, ImageCache},
        format_duration,
        notifications::NotificationLevel,
        theme::get_theme,
    },
};

const ROUNDED_BORDER: border::Set = border::ROUNDED;
const BUTTON_SPACING: u16 = 3;

fn block_with_title(title: &'_ str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(ROUNDED_BORDER)
        .title(title)
}

pub fn render(f: &mut Frame, app: &mut App, image_cache: &mut ImageCache) {
    let theme = get_theme();
    let area = f.area();

    let background = Block::default().style(Style::default().bg(theme.bg));
    f.render_widget(background, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(f, chunks[0]);
    draw_now_playing(f, chunks[1], app, image_cache);
    draw_playback_controls(f, chunks[2], app);
    draw_footer(f, chunks[3], app);

    if app.playlist_open {
        draw_playlist_overlay(f, chunks[1], app);
    } else {
        app.layout_regions.playlist_items = None;
    }

    draw_notifications(f, area, app);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let theme = get_theme();
    let header = Paragraph::new("Cassette")
        .style(theme.header_style())
        .block(block_with_title(" 🎧 ").border_style(theme.border_style(false)))
        .centered();
    f.render_widget(header, area);
}

fn draw_now_playing(f: &mut Frame, area: Rect, app: &App, image_cache: &mut ImageCache) {
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_album_art(f, panels[0], app, image_cache);
    draw_song_info(f, panels[1], app);
}

fn draw_album_art(f: &mut Frame, area: Rect, app: &App, image_cache: &mut ImageCache) {
    let theme = get_theme();

    // Border lights up while playing
    let border_style = if app.is_playing {
        Style::new().fg(theme.slider_color(true))
    } else {
        theme.border_style(false)
    };
    let block = block_with_title(" ● Album Art ")
        .border_style(border_style)
        .style(Style::default().bg(theme.bg));

    let image_area = block.inner(area);
    f.render_widget(block, area);

    let placeholder = match (app.cover_path(), &mut image_cache.state) {
        (Some(current), CoverState::Ready { path, protocol }) if path.as_path() == current => {
            let thumb_height = image_area.height.min(image_area.width / 2).max(1);
            let thumb_width = thumb_height * 2;

            let centered_area = Rect {
                x: image_area.x + (image_area.width.saturating_sub(thumb_width)) / 2,
                y: image_area.y + (image_area.height.saturating_sub(thumb_height)) / 2,
                width: thumb_width.min(image_area.width),
                height: thumb_height,
            };

            f.render_stateful_widget(StatefulImage::default(), centered_area, protocol);
            return;
        }
        (Some(current), CoverState::Loading(path)) if path.as_path() == current => {
            "Loading cover..."
        }
        (Some(_), _) => LOCAL_ARTIST,
        (None, _) => "Music",
    };

    let text_area = Rect {
        x: image_area.x,
        y: image_area.y + image_area.height.saturating_sub(2) / 2,
        width: image_area.width,
        height: 2.min(image_area.height),
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled("♪", theme.title_style())),
            Line::from(Span::styled(placeholder, theme.label_style())),
        ])
        .alignment(Alignment::Center),
        text_area,
    );
}

fn draw_song_info(f: &mut Frame, area: Rect, app: &App) {
    let theme = get_theme();
    let block = block_with_title(" ● Now Playing ").border_style(theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(song) = app.now_playing.as_ref() else {
        let text_area = Rect {
            x: inner.x,
            y: inner.y + inner.height / 2,
            width: inner.width,
            height: 1.min(inner.height),
        };
        f.render_widget(
            Paragraph::new("No Songs Added")
                .alignment(Alignment::Center)
                .style(theme.title_style()),
            text_area,
        );
        return;
    };

    let label = theme.label_style();
    let value = theme.value_style();

    let status = match (app.player_state, app.is_playing) {
        (PlayerState::Loading, _) => Span::styled("Loading", Style::new().fg(theme.info)),
        (_, true) => Span::styled("Playing", Style::new().fg(theme.playing)),
        (_, false) => Span::styled("Paused", Style::new().fg(theme.paused)),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Title:   ", label),
            Span::styled(song.title.as_str(), theme.title_style()),
        ]),
        Line::from(vec![
            Span::styled("Artist:  ", label),
            Span::styled(song.artist.as_str(), Style::new().fg(theme.accent)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled("Status:  ", label), status]),
        Line::from(vec![
            Span::styled("Track:   ", label),
            Span::styled(
                format!(
                    "{} / {}",
                    app.playlist.current_index() + 1,
                    app.playlist.len()
                ),
                value,
            ),
        ]),
        Line::from(vec![
            Span::styled("File:    ", label),
            Span::styled(song.path.display().to_string(), theme.label_style()),
        ]),
    ];

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::NONE)),
        Rect {
            x: inner.x + 1,
            y: inner.y + 1,
            width: inner.width.saturating_sub(2),
            height: inner.height.saturating_sub(1),
        },
    );
}

fn draw_playback_controls(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = get_theme();

    let block = block_with_title(" ● Controls ").border_style(theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let play_label = if app.is_playing && app.player_state == PlayerState::Loading {
        format!("{} Loading", app.loading.current_frame())
    } else if app.is_playing {
        "󰏤 Pause".to_string()
    } else {
        "󰐊 Play".to_string()
    };

    let labels = [
        "󰒮 Prev".to_string(),
        play_label,
        "󰒭 Next".to_string(),
        "󰲸 Playlist".to_string(),
        "󰐕 Add".to_string(),
    ];
    let buttons = Layout::horizontal(
        labels
            .iter()
            .map(|l| Constraint::Length(Line::from(l.as_str()).width() as u16)),
    )
    .flex(Flex::Center)
    .spacing(BUTTON_SPACING)
    .split(rows[0]);

    for (i, (label, rect)) in labels.iter().zip(buttons.iter()).enumerate() {
        let style = match i {
            1 => theme.header_style(),
            3 if app.playlist_open => theme.selection_style(),
            _ => theme.value_style(),
        };
        f.render_widget(Paragraph::new(label.as_str()).style(style), *rect);
    }

    app.layout_regions.prev_button = Some(buttons[0]);
    app.layout_regions.play_button = Some(buttons[1]);
    app.layout_regions.next_button = Some(buttons[2]);
    app.layout_regions.playlist_button = Some(buttons[3]);
    app.layout_regions.add_button = Some(buttons[4]);

    let slider = draw_progress_bar(f, rows[2], app);
    app.layout_regions.progress_bar = Some(slider);
}

/// Draws `current ━━━●─── total` and returns the slider area.
fn draw_progress_bar(f: &mut Frame, area: Rect, app: &App) -> Rect {
    let theme = get_theme();
    let progress_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(8),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(format_duration(app.current_position))
            .alignment(Alignment::Right)
            .style(theme.value_style()),
        progress_chunks[0],
    );

    let slider_width = progress_chunks[2].width as usize;
    let progress = app.progress_percent() / 100.0;
    let filled = ((progress * slider_width as f64) as usize).min(slider_width);
    let slider_color = theme.slider_color(app.is_playing);

    let mut slider = String::new();
    for i in 0..slider_width {
        if i < filled.saturating_sub(1) {
            slider.push('━');
        } else if i == filled.saturating_sub(1) || (filled == 0 && i == 0) {
            slider.push('●');
        } else {
            slider.push('─');
        }
    }

    let head = filled.max(1).min(slider_width);
    let slider_spans = vec![
        Span::styled(
            slider.chars().take(head).collect::<String>(),
            Style::new().fg(slider_color),
        ),
        Span::styled(
            slider.chars().skip(head).collect::<String>(),
            Style::new().fg(theme.fg_dim),
        ),
    ];
    f.render_widget(Paragraph::new(Line::from(slider_spans)), progress_chunks[2]);

    // Duration only shows once the player knows it
    let total = if app.total_duration.is_zero() {
        "0:00".to_string()
    } else {
        format_duration(app.total_duration)
    };
    f.render_widget(
        Paragraph::new(total)
            .alignment(Alignment::Left)
            .style(theme.value_style()),
        progress_chunks[4],
    );

    progress_chunks[2]
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [vertical] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(vertical);
    rect
}

fn draw_playlist_overlay(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = get_theme();
    let rect = centered_rect(70, 90, area);
    f.render_widget(Clear, rect);

    let title = format!(" ● Playlist ({}) ", app.playlist.len());
    let block = block_with_title(&title)
        .title_bottom(Line::from(" ↑↓/jk: Move | Enter/Click: Play | Esc/l: Close ").centered())
        .border_style(theme.border_style(true))
        .style(theme.overlay_style());

    if app.playlist.is_empty() {
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        f.render_widget(
            Paragraph::new("Playlist is empty. Press a to add a song.")
                .alignment(Alignment::Center)
                .style(theme.label_style()),
            Rect {
                y: inner.y + inner.height / 2,
                height: 1.min(inner.height),
                ..inner
            },
        );
        app.layout_regions.playlist_items = Some(rect);
        app.layout_regions.playlist_offset = 0;
        return;
    }

    let active = app.playlist.current_index();
    let items: Vec<ListItem> = app
        .playlist
        .songs()
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let is_active = i == active;
            let prefix = if is_active { "▶ " } else { "  " };
            let title_style = if is_active {
                theme.current_style()
            } else {
                theme.value_style()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{:02}. {}", prefix, i + 1, song.title), title_style),
                Span::styled(format!("  {}", song.artist), theme.label_style()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::new()
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_spacing(ratatui::widgets::HighlightSpacing::Always);

    let mut list_state = ListState::default().with_selected(Some(app.playlist_cursor));
    f.render_stateful_widget(list, rect, &mut list_state);

    app.layout_regions.playlist_items = Some(rect);
    app.layout_regions.playlist_offset = list_state.offset();
}

fn draw_notifications(f: &mut Frame, area: Rect, app: &App) {
    let theme = get_theme();
    let width = area.width.min(50);

    for (i, notification) in app
        .notifications
        .active_notifications()
        .iter()
        .rev()
        .enumerate()
    {
        let y = area.y + 1 + i as u16;
        if y >= area.bottom() {
            break;
        }
        let rect = Rect {
            x: area.right().saturating_sub(width + 1),
            y,
            width,
            height: 1,
        };
        let color = match notification.level {
            NotificationLevel::Info => theme.info,
            NotificationLevel::Warning => theme.paused,
            NotificationLevel::Error => theme.accent_alt,
        };
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", notification.level.prefix()),
                    Style::new().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(notification.text.as_str(), theme.value_style()),
            ]))
            .style(theme.overlay_style()),
            rect,
        );
    }
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = get_theme();

    if app.input_mode == InputMode::AddSong {
        let block = block_with_title(" Add song path (Enter: add | Esc: cancel) ")
            .border_style(theme.border_style(true));
        let inner = block.inner(area);
        f.render_widget(
            Paragraph::new(app.input_buffer.as_str())
                .style(theme.value_style())
                .block(block),
            area,
        );
        let typed = Line::from(app.input_buffer.as_str()).width() as u16;
        let cursor_x = inner.x + typed.min(inner.width.saturating_sub(1));
        f.set_cursor_position((cursor_x, inner.y));
        return;
    }

    let keybinds = if app.playlist_open {
        "↑↓/jk: Move | Enter: Play | Esc/l: Close | Space: Play/Pause | q: Quit"
    } else {
        "Space: Play/Pause | n/p: Next/Prev | ←→: Seek | l: Playlist | a: Add Song | q: Quit"
    };

    f.render_widget(
        Paragraph::new(keybinds)
            .style(theme.label_style())
            .block(block_with_title("").border_style(theme.border_style(false))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::player::commands::PlayerCommand;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use std::sync::mpsc;
    use std::time::Duration;

    fn app() -> (App, mpsc::Receiver<PlayerCommand>) {
        let (tx, rx) = mpsc::channel();
        (App::new(tx, &Config::default()), rx)
    }

    fn app_with_songs(names: &[&str]) -> (App, mpsc::Receiver<PlayerCommand>) {
        let (mut app, rx) = app();
        for name in names {
            app.add_song(format!("/music/{name}").into());
        }
        (app, rx)
    }

    fn draw(width: u16, height: u16, f: impl FnOnce(&mut Frame)) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(f).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (buffer.area.x..buffer.area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    fn rect_text(buffer: &Buffer, rect: Rect) -> String {
        (rect.y..rect.bottom())
            .flat_map(|y| (rect.x..rect.right()).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol())
            .collect()
    }

    fn all_text(buffer: &Buffer) -> String {
        (buffer.area.y..buffer.area.bottom())
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_playlist_shows_placeholder_title() {
        let (app, _rx) = app();
        let buffer = draw(60, 10, |f| draw_song_info(f, f.area(), &app));

        assert!(all_text(&buffer).contains("No Songs Added"));
    }

    #[test]
    fn song_info_shows_title_and_artist() {
        let (app, _rx) = app_with_songs(&["morning.mp3"]);
        let buffer = draw(60, 10, |f| draw_song_info(f, f.area(), &app));

        let text = all_text(&buffer);
        assert!(text.contains("morning"));
        assert!(text.contains(LOCAL_ARTIST));
        assert!(!text.contains("No Songs Added"));
    }

    #[test]
    fn play_button_label_follows_playback() {
        let (mut app, _rx) = app_with_songs(&["a.mp3"]);

        let buffer = draw(90, 5, |f| draw_playback_controls(f, f.area(), &mut app));
        let play = app.layout_regions.play_button.unwrap();
        assert!(rect_text(&buffer, play).contains("Pause"));

        app.pause_song();
        let buffer = draw(90, 5, |f| draw_playback_controls(f, f.area(), &mut app));
        let play = app.layout_regions.play_button.unwrap();
        let label = rect_text(&buffer, play);
        assert!(label.contains("Play"));
        assert!(!label.contains("Pause"));
    }

    #[test]
    fn controls_record_click_regions() {
        let (mut app, _rx) = app();
        let buffer = draw(90, 5, |f| draw_playback_controls(f, f.area(), &mut app));

        let regions = &app.layout_regions;
        for (rect, label) in [
            (regions.prev_button, "Prev"),
            (regions.next_button, "Next"),
            (regions.playlist_button, "Playlist"),
            (regions.add_button, "Add"),
        ] {
            assert!(rect_text(&buffer, rect.unwrap()).contains(label));
        }

        let bar = regions.progress_bar.unwrap();
        assert_eq!(bar.height, 1);
        assert!(bar.width > 0);
        assert!(rect_text(&buffer, bar).contains('●'));
    }

    #[test]
    fn progress_bar_fills_in_proportion() {
        let (mut app, _rx) = app_with_songs(&["a.mp3"]);
        app.total_duration = Duration::from_secs(100);
        app.current_position = Duration::from_secs(50);

        let mut slider = Rect::default();
        let buffer = draw(38, 1, |f| slider = draw_progress_bar(f, f.area(), &app));

        assert_eq!(slider.width, 20);
        let row = row_text(&buffer, 0);
        assert_eq!(row.matches('━').count(), 9);
        assert_eq!(buffer[(slider.x + 9, 0)].symbol(), "●");
        assert!(row.contains("0:50"));
        assert!(row.contains("1:40"));
    }

    #[test]
    fn unknown_duration_reads_zero() {
        let (app, _rx) = app_with_songs(&["a.mp3"]);
        let buffer = draw(38, 1, |f| {
            draw_progress_bar(f, f.area(), &app);
        });

        let row = row_text(&buffer, 0);
        assert_eq!(row.matches("0:00").count(), 2);
        assert_eq!(row.matches('━').count(), 0);
    }

    #[test]
    fn playlist_marks_active_song() {
        let (mut app, _rx) = app_with_songs(&["a.mp3", "b.mp3", "c.mp3"]);
        app.play_from_playlist(1);
        app.toggle_playlist();

        let buffer = draw(60, 20, |f| draw_playlist_overlay(f, f.area(), &mut app));
        let text = all_text(&buffer);

        assert!(text.contains("▶ 02. b"));
        assert!(!text.contains("▶ 01. a"));
        assert!(!text.contains("▶ 03. c"));
        assert!(text.contains("Playlist (3)"));
        assert!(app.layout_regions.playlist_items.is_some());
        assert_eq!(app.layout_regions.playlist_offset, 0);
    }

    #[test]
    fn empty_playlist_overlay_prompts_to_add() {
        let (mut app, _rx) = app();
        app.toggle_playlist();

        let buffer = draw(60, 20, |f| draw_playlist_overlay(f, f.area(), &mut app));

        assert!(all_text(&buffer).contains("Playlist is empty"));
    }
}
