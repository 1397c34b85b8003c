//! Rendering
//!
//! Pure functions from a [`SessionSnapshot`] to a ratatui frame. Every view
//! shares the header and footer; dialogs draw on top of the body.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    ai::{AiReply, Combination, Sentiment, Suggestion, EXAMPLE_PROMPTS},
    catalog::{Category, Emoji, SKIN_TONES},
    collections::{Collection, COLLECTION_COLORS, COLLECTION_GLYPHS},
    colors::{
        theme::{self, accent, background, semantic, status, text},
        Color,
    },
    router::View,
    session::{
        CollectionForm, Dialog, Focus, FormField, NoticeLevel, SessionSnapshot, GRID_COLUMNS,
    },
};

/// Terminal columns per grid cell
const CELL_WIDTH: usize = 5;

fn fg(color: Color) -> Style {
    Style::default().fg(color.to_ratatui())
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { semantic::FOCUS_RING } else { semantic::BORDER };
    Block::default()
        .borders(Borders::ALL)
        .border_style(fg(border))
        .title(Span::styled(format!(" {title} "), fg(text::SECONDARY)))
        .style(Style::default().bg(background::ELEVATION_1.to_ratatui()))
}

/// Draws the whole screen for `snapshot`
pub fn render(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    frame.render_widget(
        Block::default().style(Style::default().bg(background::BASE.to_ratatui())),
        area,
    );

    let [header, body, footer] = split_vertical(
        area,
        [Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)],
    );

    render_header(snapshot, header, frame);
    match &snapshot.view {
        View::Landing => render_landing(body, frame),
        View::Home => render_home(snapshot, body, frame),
        View::Emoji { emoji, .. } => render_emoji(snapshot, emoji, body, frame),
        View::Collections => render_collections(snapshot, body, frame),
        View::Collection { id } => render_collection(snapshot, id, body, frame),
        View::Favorites => render_favorites(snapshot, body, frame),
        View::Suggest => render_suggest(snapshot, body, frame),
    }
    render_footer(snapshot, footer, frame);

    if let Some(dialog) = &snapshot.dialog {
        render_dialog(snapshot, dialog, body, frame);
    }
}

fn split_vertical<const N: usize>(area: Rect, constraints: [Constraint; N]) -> [Rect; N] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    std::array::from_fn(|i| chunks[i])
}

fn render_header(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    let line = Line::from(vec![
        Span::styled(" emojidex ", fg(accent::CORAL).add_modifier(Modifier::BOLD)),
        Span::styled(format!("· {}", snapshot.view.title()), fg(text::SECONDARY)),
        Span::styled(
            format!(
                "   ♥ {}  ▣ {}",
                snapshot.favorites.len(),
                snapshot.collections.len()
            ),
            fg(text::PLACEHOLDER),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    let line = match &snapshot.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => status::INFO,
                NoticeLevel::Success => status::SUCCESS,
                NoticeLevel::Error => status::ERROR,
            };
            Line::from(Span::styled(format!(" {}", notice.text), fg(color)))
        }
        None => Line::from(Span::styled(format!(" {}", key_hints(snapshot)), fg(text::PLACEHOLDER))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn key_hints(snapshot: &SessionSnapshot) -> &'static str {
    if let Some(dialog) = &snapshot.dialog {
        return match dialog {
            Dialog::NewCollection(_) => "type name · tab field · ←/→ choose · enter create · esc cancel",
            Dialog::AddToCollection { .. } => "↑/↓ move · enter toggle · n new collection · esc close",
            Dialog::ConfirmDelete { .. } => "y delete · n keep",
        };
    }

    match (&snapshot.view, snapshot.focus) {
        (View::Landing, _) => "enter get started · q quit",
        (View::Home, Focus::Input) => "type to search · tab chips · ↓ grid · esc clear/back · ctrl+c quit",
        (View::Home, Focus::Chips) => "←/→ move · space toggle · tab next · esc back",
        (View::Home, Focus::Recents) => "←/→ move · enter open · f favorite · ↓ grid · esc back",
        (View::Home, Focus::Grid) => {
            "arrows move · enter open · f favorite · / search · c collections · v favorites · i ai · esc back"
        }
        (View::Emoji { .. }, _) => "f favorite · a add to collection · s skin tone · esc back",
        (View::Collections, _) => "↑/↓ move · enter open · n new · d delete · v favorites · i ai · esc back",
        (View::Collection { .. }, _) => "enter open · f favorite · x remove · d delete collection · esc back",
        (View::Favorites, _) => "enter open · f unfavorite · c collections · i ai · esc back",
        (View::Suggest, Focus::Grid) => "enter open · m mode · e example · tab prompt · esc back",
        (View::Suggest, _) => "type a prompt · enter ask · tab results · esc back",
    }
}

fn render_landing(area: Rect, frame: &mut Frame<'_>) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled("😀 🎉 🍕 🚀 ✨", fg(text::PRIMARY))),
        Line::default(),
        Line::from(Span::styled(
            "emojidex",
            fg(accent::CORAL).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Find the perfect emoji. Save favorites, build collections, ask AI.",
            fg(text::SECONDARY),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to get started",
            fg(accent::SUNFLOWER),
        )),
    ];
    let [_, middle, _] = split_vertical(
        area,
        [Constraint::Fill(1), Constraint::Length(lines.len() as u16), Constraint::Fill(1)],
    );
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), middle);
}

fn render_home(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    let filtering = !snapshot.query.is_empty() || !snapshot.categories.is_empty();
    let [search, chips, recents, grid] = split_vertical(
        area,
        [
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(if filtering { 0 } else { 1 }),
            Constraint::Min(3),
        ],
    );

    let query = if snapshot.query.is_empty() && snapshot.focus != Focus::Input {
        Span::styled("Search emoji…", fg(text::PLACEHOLDER))
    } else {
        Span::styled(format!("{}▏", snapshot.query), fg(text::PRIMARY))
    };
    frame.render_widget(
        Paragraph::new(Line::from(query)).block(panel("Search", snapshot.focus == Focus::Input)),
        search,
    );

    frame.render_widget(Paragraph::new(chip_line(snapshot)), chips);

    if !filtering {
        frame.render_widget(Paragraph::new(recents_line(snapshot)), recents);
    }

    let title = format!("{} emoji", snapshot.items.len());
    render_grid(snapshot, &title, "No emoji match your search", grid, frame);
}

fn recents_line(snapshot: &SessionSnapshot) -> Line<'static> {
    let focused = snapshot.focus == Focus::Recents;
    let mut spans = vec![Span::styled(" Recent: ", fg(text::SECONDARY))];
    if snapshot.recents.is_empty() {
        spans.push(Span::styled("nothing yet", fg(text::PLACEHOLDER)));
        return Line::from(spans);
    }

    for (i, emoji) in snapshot.recents.iter().enumerate() {
        let style = if focused && i == snapshot.recent_cursor {
            Style::default().bg(semantic::SELECTION.to_ratatui())
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("{} ", emoji.glyph), style));
    }
    if let Some(selected) = snapshot.recents.get(snapshot.recent_cursor).filter(|_| focused) {
        spans.push(Span::styled(format!(" {}", selected.name), fg(text::PLACEHOLDER)));
    }
    Line::from(spans)
}

fn chip_line(snapshot: &SessionSnapshot) -> Line<'static> {
    let focused = snapshot.focus == Focus::Chips;
    let chip = |index: usize, label: &str, active: bool| {
        let mut style = if active {
            fg(background::BASE).bg(semantic::CHIP_ACTIVE.to_ratatui())
        } else {
            fg(text::SECONDARY)
        };
        if focused && snapshot.chip_cursor == index {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        Span::styled(format!(" {label} "), style)
    };

    let mut spans = vec![Span::raw(" "), chip(0, "All", snapshot.categories.is_empty())];
    for (i, category) in Category::ALL.iter().enumerate() {
        spans.push(Span::raw(" "));
        spans.push(chip(i + 1, category.label(), snapshot.categories.contains(category)));
    }
    Line::from(spans)
}

/// Emoji grid with the cursor row kept in view
fn render_grid(
    snapshot: &SessionSnapshot,
    title: &str,
    empty: &str,
    area: Rect,
    frame: &mut Frame<'_>,
) {
    let block = panel(title, snapshot.focus == Focus::Grid);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if snapshot.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(empty, fg(text::PLACEHOLDER))).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    // Last line shows the selected emoji.
    let visible_rows = (inner.height as usize).saturating_sub(2).max(1);
    let cursor_row = snapshot.cursor / GRID_COLUMNS;
    let first_row = cursor_row.saturating_sub(visible_rows - 1);

    let mut lines: Vec<Line<'_>> = snapshot
        .items
        .chunks(GRID_COLUMNS)
        .enumerate()
        .skip(first_row)
        .take(visible_rows)
        .map(|(row, emojis)| {
            let spans = emojis.iter().enumerate().map(|(col, emoji)| {
                let index = row * GRID_COLUMNS + col;
                grid_cell(snapshot, emoji, index == snapshot.cursor)
            });
            Line::from(spans.collect::<Vec<_>>())
        })
        .collect();

    if let Some(selected) = snapshot.items.get(snapshot.cursor) {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(selected.name, fg(text::PRIMARY).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", selected.codepoint), fg(text::PLACEHOLDER)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn grid_cell(snapshot: &SessionSnapshot, emoji: &Emoji, selected: bool) -> Span<'static> {
    let marker = if snapshot.is_favorite(emoji.codepoint) { "♥" } else { " " };
    let content = format!(" {}{}", emoji.glyph, marker);
    let padded = format!("{content:<width$}", width = CELL_WIDTH - 1);

    let style = if selected && snapshot.focus == Focus::Grid {
        Style::default()
            .bg(semantic::SELECTION.to_ratatui())
            .fg(semantic::FAVORITE.to_ratatui())
    } else {
        fg(semantic::FAVORITE)
    };
    Span::styled(padded, style)
}

fn render_emoji(snapshot: &SessionSnapshot, emoji: &Emoji, area: Rect, frame: &mut Frame<'_>) {
    let tone = SKIN_TONES[snapshot.skin_tone % SKIN_TONES.len()];
    let favorite = snapshot.is_favorite(emoji.codepoint);

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            format!("  {}", emoji.glyph_with_tone(&tone)),
            fg(text::PRIMARY),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(format!("  {}", emoji.name), fg(text::PRIMARY).add_modifier(Modifier::BOLD)),
            Span::styled(
                if favorite { "  ♥ favorite" } else { "" },
                fg(semantic::FAVORITE),
            ),
        ]),
        detail_line("Codepoint", emoji.codepoint.to_string()),
        detail_line("Category", emoji.category.label().to_string()),
        detail_line("Keywords", emoji.keywords.join(", ")),
    ];

    if emoji.has_skin_tone {
        let mut spans = vec![Span::styled("  Skin tone  ", fg(text::SECONDARY))];
        for (i, tone) in SKIN_TONES.iter().enumerate() {
            let style = if i == snapshot.skin_tone {
                fg(accent::CORAL).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                fg(text::SECONDARY)
            };
            spans.push(Span::styled(format!("{} ", emoji.glyph_with_tone(tone)), style));
        }
        spans.push(Span::styled(tone.label, fg(text::PLACEHOLDER)));
        lines.push(Line::from(spans));
    }

    let member_of: Vec<String> = snapshot
        .collections
        .iter()
        .filter(|c| c.contains(emoji.codepoint))
        .map(|c| format!("{} {}", c.emoji, c.name))
        .collect();
    if !member_of.is_empty() {
        lines.push(detail_line("In", member_of.join(", ")));
    }

    let metadata = [
        ("Meaning", emoji.meaning),
        ("Unicode name", emoji.unicode_name),
        ("Vendor name", emoji.vendor_name),
        ("Also known as", emoji.also_known_as),
        ("Shortcode", emoji.shortcode),
        ("Proposal", emoji.proposal),
    ];
    if metadata.iter().any(|(_, value)| value.is_some()) || !emoji.designs.is_empty() {
        lines.push(Line::default());
    }
    for (label, value) in metadata {
        if let Some(value) = value {
            lines.push(detail_line(label, value.to_string()));
        }
    }
    if !emoji.designs.is_empty() {
        let platforms: Vec<_> = emoji.designs.iter().map(|d| d.platform).collect();
        lines.push(detail_line("Designs", platforms.join(", ")));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel(emoji.name, false)),
        area,
    );
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<14}"), fg(text::SECONDARY)),
        Span::styled(value, fg(text::PRIMARY)),
    ])
}

fn render_collections(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    let block = panel("Collections", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if snapshot.collections.is_empty() {
        frame.render_widget(
            Paragraph::new(vec![
                Line::default(),
                Line::from(Span::styled("No collections yet", fg(text::SECONDARY))),
                Line::from(Span::styled("Press n to create one", fg(text::PLACEHOLDER))),
            ])
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let visible = inner.height.max(1) as usize;
    let first = snapshot.cursor.saturating_sub(visible - 1);
    let lines: Vec<Line<'_>> = snapshot
        .collections
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(i, collection)| collection_row(collection, i == snapshot.cursor))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn collection_row(collection: &Collection, selected: bool) -> Line<'static> {
    let swatch = theme::collection::resolve(&collection.color);
    let row_style = if selected {
        Style::default().bg(semantic::SELECTION.to_ratatui())
    } else {
        Style::default()
    };
    let count = collection.emoji_codepoints.len();
    let name_color = if selected {
        semantic::selection_text()
    } else {
        text::PRIMARY
    };

    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", collection.emoji),
            Style::default()
                .bg(swatch.to_ratatui())
                .fg(swatch.contrast_text().to_ratatui()),
        ),
        Span::raw(" "),
        Span::styled(collection.name.clone(), fg(name_color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {count} emoji{}", if count == 1 { "" } else { "s" }),
            fg(text::PLACEHOLDER),
        ),
    ])
    .style(row_style)
}

fn render_collection(snapshot: &SessionSnapshot, id: &str, area: Rect, frame: &mut Frame<'_>) {
    let title = snapshot
        .collection(id)
        .map(|c| format!("{} {}", c.emoji, c.name))
        .unwrap_or_else(|| "Collection".to_string());
    render_grid(
        snapshot,
        &title,
        "This collection is empty. Press a on any emoji to add it",
        area,
        frame,
    );
}

fn render_favorites(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    render_grid(
        snapshot,
        "Favorites",
        "No favorites yet. Press f on any emoji to save it here",
        area,
        frame,
    );
}

fn render_suggest(snapshot: &SessionSnapshot, area: Rect, frame: &mut Frame<'_>) {
    let [prompt_area, modes, results] = split_vertical(
        area,
        [Constraint::Length(3), Constraint::Length(1), Constraint::Min(3)],
    );
    let ai = &snapshot.ai;

    let prompt = if ai.prompt.is_empty() && snapshot.focus == Focus::Grid {
        Span::styled("Describe a moment, a mood or a message…", fg(text::PLACEHOLDER))
    } else {
        Span::styled(format!("{}▏", ai.prompt), fg(text::PRIMARY))
    };
    frame.render_widget(
        Paragraph::new(Line::from(prompt)).block(panel("Prompt", snapshot.focus != Focus::Grid)),
        prompt_area,
    );

    let mut mode_spans = vec![Span::styled(" Mode: ", fg(text::SECONDARY))];
    for mode in crate::ai::Mode::ALL {
        let style = if mode == ai.mode {
            fg(background::BASE).bg(semantic::CHIP_ACTIVE.to_ratatui())
        } else {
            fg(text::SECONDARY)
        };
        mode_spans.push(Span::styled(format!(" {} ", mode.label()), style));
        mode_spans.push(Span::raw(" "));
    }
    if !snapshot.ai_ready {
        mode_spans.push(Span::styled("(AI unavailable)", fg(status::WARNING)));
    }
    frame.render_widget(Paragraph::new(Line::from(mode_spans)), modes);

    let block = panel("Results", snapshot.focus == Focus::Grid);
    let inner = block.inner(results);
    frame.render_widget(block, results);

    let lines = match (&ai.reply, ai.pending) {
        (_, Some(_)) => vec![Line::from(Span::styled(
            format!("Asking for {} results…", ai.mode),
            fg(accent::SUNFLOWER),
        ))],
        (Some(AiReply::Suggestions(items)), None) => suggestion_lines(items, snapshot.cursor),
        (Some(AiReply::Sentiment(analysis)), None) => sentiment_lines(analysis, snapshot.cursor),
        (Some(AiReply::Combinations(items)), None) => combination_lines(items, snapshot.cursor),
        (None, None) => {
            let mut lines = vec![Line::from(Span::styled("Try one of these:", fg(text::SECONDARY)))];
            lines.extend(
                EXAMPLE_PROMPTS
                    .iter()
                    .map(|p| Line::from(Span::styled(format!("  “{p}”"), fg(text::PLACEHOLDER)))),
            );
            lines
        }
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(semantic::SELECTION.to_ratatui())
    } else {
        Style::default()
    }
}

fn score_bar(score: u8, max: u8, width: usize) -> String {
    let filled = (score as usize * width) / max.max(1) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width.saturating_sub(filled)))
}

fn suggestion_lines(items: &[Suggestion], cursor: usize) -> Vec<Line<'static>> {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Line::from(vec![
                Span::raw(format!(" {} ", s.emoji.glyph)),
                Span::styled(format!("{:<22}", s.emoji.name), fg(text::PRIMARY)),
                Span::styled(score_bar(s.relevance, 10, 10), fg(accent::CORAL)),
                Span::styled(format!(" {}/10  ", s.relevance), fg(text::PLACEHOLDER)),
                Span::styled(s.reason.clone(), fg(text::SECONDARY)),
            ])
            .style(row_style(i == cursor))
        })
        .collect()
}

fn sentiment_lines(analysis: &Sentiment, cursor: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Overall  ", fg(text::SECONDARY)),
            Span::styled(analysis.overall.clone(), fg(text::PRIMARY).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  ({}% confident)", analysis.confidence), fg(text::PLACEHOLDER)),
        ]),
        Line::from(vec![
            Span::styled(" Tone     ", fg(text::SECONDARY)),
            Span::styled(analysis.tone.clone(), fg(text::PRIMARY)),
        ]),
    ];
    for emotion in &analysis.emotions {
        lines.push(Line::from(vec![
            Span::styled(format!("   {:<12}", emotion.name), fg(text::SECONDARY)),
            Span::styled(score_bar(emotion.intensity, 100, 20), fg(accent::SUNFLOWER)),
            Span::styled(format!(" {}%", emotion.intensity), fg(text::PLACEHOLDER)),
        ]));
    }
    lines.push(Line::default());

    let mut spans = vec![Span::styled(" Emoji  ", fg(text::SECONDARY))];
    for (i, emoji) in analysis.emojis.iter().enumerate() {
        spans.push(Span::styled(format!(" {} ", emoji.glyph), row_style(i == cursor)));
    }
    if analysis.emojis.is_empty() {
        spans.push(Span::styled("none matched the catalog", fg(text::PLACEHOLDER)));
    }
    lines.push(Line::from(spans));
    lines
}

fn combination_lines(items: &[Combination], cursor: usize) -> Vec<Line<'static>> {
    items
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            [
                Line::from(vec![
                    Span::raw(format!(" {}  ", c.glyphs())),
                    Span::styled(c.meaning.clone(), fg(text::PRIMARY).add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}/10", c.popularity), fg(text::PLACEHOLDER)),
                ])
                .style(row_style(i == cursor)),
                Line::from(Span::styled(format!("     {}", c.usage), fg(text::SECONDARY))),
            ]
        })
        .collect()
}

/// Rect of `width` x `height` centered in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_dialog(snapshot: &SessionSnapshot, dialog: &Dialog, area: Rect, frame: &mut Frame<'_>) {
    let (title, lines) = match dialog {
        Dialog::NewCollection(form) => ("New collection", form_lines(form)),
        Dialog::AddToCollection { cursor } => ("Add to collection", picker_lines(snapshot, *cursor)),
        Dialog::ConfirmDelete { name, .. } => (
            "Delete collection",
            vec![
                Line::from(Span::styled(format!("Delete \"{name}\"?"), fg(text::PRIMARY))),
                Line::from(Span::styled(
                    "Favorites and recents are not affected.",
                    fg(text::SECONDARY),
                )),
                Line::default(),
                Line::from(Span::styled("y delete · n keep", fg(status::WARNING))),
            ],
        ),
    };

    let height = lines.len() as u16 + 2;
    let rect = centered(area, 52, height);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel(title, true).style(Style::default().bg(background::ELEVATION_2.to_ratatui()))),
        rect,
    );
}

fn form_lines(form: &CollectionForm) -> Vec<Line<'static>> {
    let label = |field: FormField, caption: &'static str| {
        let style = if form.field == field {
            fg(accent::CORAL).add_modifier(Modifier::BOLD)
        } else {
            fg(text::SECONDARY)
        };
        Span::styled(format!("{caption:<8}"), style)
    };

    let mut glyphs = vec![label(FormField::Glyph, "Icon")];
    for (i, glyph) in COLLECTION_GLYPHS.iter().enumerate() {
        let style = if i == form.glyph {
            Style::default().bg(semantic::SELECTION.to_ratatui())
        } else {
            Style::default()
        };
        glyphs.push(Span::styled(format!("{glyph} "), style));
    }

    let mut colors = vec![label(FormField::Color, "Color")];
    for (i, color) in COLLECTION_COLORS.iter().enumerate() {
        let marker = if i == form.color { "◉ " } else { "● " };
        colors.push(Span::styled(marker, fg(theme::collection::resolve(color))));
    }

    let name = if form.name.is_empty() {
        Span::styled("Collection name", fg(text::PLACEHOLDER))
    } else {
        Span::styled(form.name.clone(), fg(text::PRIMARY))
    };

    vec![
        Line::from(vec![label(FormField::Name, "Name"), name]),
        Line::from(glyphs),
        Line::from(colors),
    ]
}

fn picker_lines(snapshot: &SessionSnapshot, cursor: usize) -> Vec<Line<'static>> {
    let View::Emoji { emoji, .. } = &snapshot.view else {
        return Vec::new();
    };
    if snapshot.collections.is_empty() {
        return vec![Line::from(Span::styled(
            "No collections yet. Press n to create one.",
            fg(text::SECONDARY),
        ))];
    }

    snapshot
        .collections
        .iter()
        .enumerate()
        .map(|(i, collection)| {
            let check = if collection.contains(emoji.codepoint) { "[x]" } else { "[ ]" };
            Line::from(vec![
                Span::styled(format!("{check} "), fg(status::SUCCESS)),
                Span::raw(format!("{} ", collection.emoji)),
                Span::styled(collection.name.clone(), fg(text::PRIMARY)),
            ])
            .style(row_style(i == cursor))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::AiOutcome,
        catalog::Catalog,
        event::Event,
        router::Action,
        session::{AiLink, Session},
        state::{AtomicState, SessionState},
        store::{KvStore, MemoryStore, UserStore},
        tui::Tui,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn session_at(view: View) -> Session {
        let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
        Session::new(Catalog::builtin(), store, view)
    }

    fn text_of(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn screen(session: &Session) -> String {
        let snapshot = session.snapshot(true);
        let mut terminal = Terminal::new(TestBackend::new(110, 32)).unwrap();
        terminal
            .draw(|frame| render(&snapshot, frame.area(), frame))
            .unwrap();
        text_of(terminal.backend().buffer())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_landing() {
        let screen = screen(&session_at(View::Landing));
        assert!(screen.contains("Press Enter to get started"));
        assert!(screen.contains("enter get started"));
    }

    #[test]
    fn test_home_shows_chips_and_count() {
        let screen = screen(&session_at(View::Home));
        assert!(screen.contains("Search"));
        assert!(screen.contains("Smileys"));
        assert!(screen.contains(&format!("{} emoji", Catalog::builtin().len())));
        assert!(screen.contains("nothing yet"));
    }

    #[test]
    fn test_home_recents_row() {
        let pizza = Catalog::builtin().find("U+1F355").unwrap();
        let mut session = session_at(View::Home);
        session.dispatch(Action::SelectEmoji(pizza));
        session.dispatch(Action::Back);
        session.handle_key(key(KeyCode::Tab));
        session.handle_key(key(KeyCode::Tab));

        let focused = screen(&session);
        assert!(focused.contains("Recent: 🍕"));
        assert!(focused.contains("enter open · f favorite · ↓ grid"));

        session.handle_key(key(KeyCode::Char('/')));
        for c in "pi".chars() {
            session.handle_key(key(KeyCode::Char(c)));
        }
        assert!(!screen(&session).contains("Recent:"));
    }

    #[test]
    fn test_emoji_detail_lists_metadata() {
        let grin = Catalog::builtin().find("U+1F600").unwrap();
        let mut session = session_at(View::Home);
        session.dispatch(Action::SelectEmoji(grin));
        session.handle_key(key(KeyCode::Char('f')));

        let screen = screen(&session);
        assert!(screen.contains("U+1F600"));
        assert!(screen.contains("Codepoint"));
        assert!(screen.contains("to favorites"));
    }

    #[test]
    fn test_empty_states() {
        assert!(screen(&session_at(View::Collections)).contains("No collections yet"));
        assert!(screen(&session_at(View::Favorites)).contains("No favorites yet"));
        assert!(screen(&session_at(View::Suggest)).contains("Try one of these"));
    }

    #[test]
    fn test_collections_and_dialogs() {
        let mut session = session_at(View::Collections);
        session.handle_key(key(KeyCode::Char('n')));
        assert!(screen(&session).contains("New collection"));

        for c in "Travel plans".chars() {
            session.handle_key(key(KeyCode::Char(c)));
        }
        session.handle_key(key(KeyCode::Enter));
        let listed = screen(&session);
        assert!(listed.contains("Travel plans"));
        assert!(listed.contains("0 emojis"));

        session.handle_key(key(KeyCode::Char('d')));
        assert!(screen(&session).contains("Delete \"Travel plans\"?"));
    }

    #[test]
    fn test_suggest_results_render_through_tui() {
        let (tx, rx) = async_channel::unbounded();
        let session = session_at(View::Suggest).with_ai(AiLink::Ready(tx));
        let state = SessionState::new(session);

        for c in "Late night coding session".chars() {
            state.handle_event(&Event::Key(key(KeyCode::Char(c)))).unwrap();
        }
        state.handle_event(&Event::Key(key(KeyCode::Enter))).unwrap();
        let request = rx.try_recv().unwrap();

        let laptop = Catalog::builtin().find("U+1F4BB").unwrap();
        state
            .handle_event(&Event::custom(AiOutcome {
                seq: request.seq,
                result: Ok(AiReply::Suggestions(vec![Suggestion {
                    emoji: laptop,
                    reason: "Coding all night".into(),
                    relevance: 9,
                }])),
            }))
            .unwrap();

        let mut tui = Tui::with_backend(state, TestBackend::new(110, 32)).unwrap();
        tui.render(render).unwrap();
        let screen = text_of(tui.terminal().backend().buffer());
        assert!(screen.contains("Laptop"));
        assert!(screen.contains("Coding all night"));
        assert!(screen.contains("9/10"));
    }

    #[test]
    fn test_centered_is_clipped() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(area, 20, 4), Rect::new(10, 3, 20, 4));
        assert_eq!(centered(area, 80, 20), area);
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(5, 10, 10), "█████░░░░░");
        assert_eq!(score_bar(100, 100, 4), "████");
    }
}
