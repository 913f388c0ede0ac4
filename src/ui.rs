use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use folio::{
    app::{App, AppState},
    clock::Clock,
    util::fit_width,
    MatchState,
};

const HORIZONTAL_MARGIN: u16 = 5;
const INPUT_WIDTH: u16 = 40;

pub struct AppView<'a, C: Clock>(pub &'a App<C>);

impl<C: Clock> Widget for AppView<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.0.state {
            AppState::Typing => render_typing(self.0, area, buf),
            AppState::Results => render_results(self.0, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn match_style(state: MatchState) -> Style {
    match state {
        MatchState::Neutral => Style::default().fg(Color::Gray),
        MatchState::Matching => Style::default().fg(Color::Green),
        MatchState::Mismatched => Style::default().fg(Color::Red),
    }
}

fn vertical_chunks(area: Rect, heights: &[u16]) -> Vec<Rect> {
    let used: u16 = heights.iter().sum();
    let pad = area.height.saturating_sub(used) / 2;

    let mut constraints = vec![Constraint::Length(pad)];
    constraints.extend(heights.iter().map(|h| Constraint::Length(*h)));
    constraints.push(Constraint::Min(0));

    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(constraints)
        .split(area)
        .iter()
        .skip(1)
        .copied()
        .collect()
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn render_typing<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let session = app.session();
    let scores = app.high_scores();
    let chunks = vertical_chunks(area, &[1, 2, 1, 2, 3, 2, 1, 1]);

    let mut header = Vec::new();
    if let Some(best) = &scores.personal_best {
        header.push(Span::styled("personal best ", dim()));
        header.push(Span::styled(format!("{} wpm", best.wpm), bold()));
    }
    if !scores.is_empty() {
        header.push(Span::styled("   games played ", dim()));
        header.push(Span::styled(scores.total_games_played.to_string(), bold()));
    }
    Paragraph::new(Line::from(header))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let word = fit_width(
        session.current_word().unwrap_or_default(),
        chunks[2].width as usize,
    );
    Paragraph::new(Span::styled(
        word,
        bold().fg(Color::White).add_modifier(Modifier::UNDERLINED),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let style = match_style(session.match_state());
    let field = app.field();
    let shown = if field.is_empty() && !session.has_started() {
        Span::styled("type here", dim().add_modifier(Modifier::ITALIC))
    } else {
        Span::styled(field.to_string(), style.patch(bold()))
    };
    Paragraph::new(shown)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(style),
        )
        .render(centered(chunks[4], INPUT_WIDTH), buf);

    let (position, total) = session.progress();
    Paragraph::new(Span::styled(format!("{position} / {total}"), dim()))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    if session.has_started() {
        Paragraph::new(Span::styled(format!("{}s", app.elapsed_secs()), dim()))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);
    }
}

fn render_results<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let session = app.session();
    let scores = app.high_scores();
    let chunks = vertical_chunks(area, &[1, 1, 3, 1, 1, 1, 2, 1]);

    let new_best = session
        .completion()
        .is_some_and(|c| c.new_personal_best);

    if new_best {
        Paragraph::new(Span::styled(
            "NEW PERSONAL BEST!",
            bold().fg(Color::Green),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    }

    Paragraph::new(Span::styled(
        format!("{} WPM", session.wpm()),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}% acc / {} words / {}s",
            session.accuracy(),
            session.words_completed(),
            app.elapsed_secs()
        ),
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    if let (Some(best), false) = (&scores.personal_best, new_best) {
        Paragraph::new(Line::from(vec![
            Span::styled("personal best ", dim()),
            Span::styled(format!("{} WPM", best.wpm), bold()),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    if let Some(previous) = scores.previous_game() {
        Paragraph::new(Span::styled(
            format!("last game: {} WPM", previous.wpm),
            dim(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }

    let legend = Line::from(vec![
        Span::styled("(r)", bold()),
        Span::styled("etry / ", dim()),
        Span::styled("(n)", bold()),
        Span::styled("ew / ", dim()),
        Span::styled("(esc)", bold()),
        Span::styled("ape", dim()),
    ]);
    Paragraph::new(legend)
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
}
