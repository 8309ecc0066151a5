//! Foreground profile card with the coding statistics panel.

use chrono::Utc;
use nightsky_config::ProfileConfig;
use ratatui::{
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
};
use std::time::Duration;

use crate::stats::{StatsSnapshot, StatsSource};

/// Width of the difficulty progress bars in cells.
pub const BAR_WIDTH: usize = 24;

/// Text bar showing `value` out of `max`.
pub fn progress_bar(value: u32, max: u32, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value.min(max) as f64 / max as f64) * width as f64).round() as usize
    };
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

/// Lines of the profile card, top to bottom.
pub fn card_lines(
    profile: &ProfileConfig,
    stats: Option<&StatsSnapshot>,
    max_age: Duration,
    accent: Color,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(profile.tagline.clone()).centered().dark_gray(),
        Line::default(),
    ];
    lines.extend(profile.links.iter().map(|link| {
        Line::from(Span::styled(
            link.clone(),
            Style::new().fg(accent).add_modifier(Modifier::UNDERLINED),
        ))
        .centered()
    }));

    let Some(snapshot) = stats else {
        return lines;
    };

    lines.push(Line::default());
    let status = match (snapshot.refreshing, snapshot.source) {
        (true, _) => " (refreshing…)",
        (false, StatsSource::Cache) => " (cached)",
        _ => "",
    };
    lines.push(
        Line::from(vec![
            "Coding stats".bold().fg(accent),
            Span::raw(status).dark_gray(),
        ])
        .centered(),
    );

    let Some(s) = &snapshot.stats else {
        lines.push(Line::from("no data yet").centered().dark_gray());
        return lines;
    };

    lines.push(
        Line::from(format!(
            "{} solved of {}",
            s.total_solved,
            s.total_questions()
        ))
        .centered(),
    );
    let (easy, medium, hard) = s
        .totals
        .map(|t| (t.easy, t.medium, t.hard))
        .unwrap_or_default();
    for (label, solved, total, color) in [
        ("Easy  ", s.easy_solved, easy, Color::Green),
        ("Medium", s.medium_solved, medium, Color::Yellow),
        ("Hard  ", s.hard_solved, hard, Color::Red),
    ] {
        // Without totals, scale bars against everything solved
        let max = if total > 0 { total } else { s.total_solved };
        lines.push(
            Line::from(vec![
                Span::raw(format!("{label} {solved:>4} ")),
                Span::styled(progress_bar(solved, max, BAR_WIDTH), Style::new().fg(color)),
            ])
            .centered(),
        );
    }

    let stale = if s.is_fresh(max_age, Utc::now()) {
        ""
    } else {
        " (stale)"
    };
    lines.push(
        Line::from(format!(
            "updated {}{stale}",
            s.fetched_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .centered()
        .dark_gray(),
    );

    lines
}
