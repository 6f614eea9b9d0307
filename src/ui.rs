use itertools::Itertools;
use keyrank::{
    achievements::ACHIEVEMENTS,
    app::{App, Screen},
    challenges::DAILY_CHALLENGES,
    rank::{Rank, RANKS},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Borrowed view of the app that knows how to draw itself
pub struct AppView<'a>(pub &'a App);

fn rank_color(rank: &Rank) -> Color {
    rank.rgb()
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

impl Widget for AppView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.0.screen() {
            Screen::Typing => render_typing(self.0, area, buf),
            Screen::Results => render_results(self.0, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);

    let session = app.session();
    let metrics = session.metrics();
    let progression = app.progress().progression;
    let rank = progression.rank();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(1),    // spacer
            Constraint::Length(4), // prompt
            Constraint::Length(3), // typed text
            Constraint::Length(1), // live metrics
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // legend
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} {}", rank.icon, rank.name),
            bold_style.fg(rank_color(rank)),
        ),
        Span::styled(
            format!("   level {}   {}", progression.level, app.difficulty()),
            dim_bold_style,
        ),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    Paragraph::new(Span::styled(session.text(), dim_bold_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let typed_style = if metrics.error_count > 0 {
        bold_style.fg(Color::Red)
    } else {
        bold_style.fg(Color::Green)
    };
    Paragraph::new(Span::styled(session.typed(), typed_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} err   {:.1}s   +{} xp",
            metrics.wpm,
            metrics.accuracy,
            metrics.error_count,
            metrics.elapsed_ms as f64 / 1000.0,
            app.projected_xp()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[4], buf);

    Paragraph::new(Span::styled(
        "(←) retry / (→) new / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let snapshot = app.progress().snapshot();
    let rank_style = bold_style.fg(rank_color(snapshot.rank));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // final metrics
            Constraint::Length(1), // xp gained
            Constraint::Length(1), // new achievements
            Constraint::Length(1), // padding
            Constraint::Length(1), // level + rank
            Constraint::Length(1), // xp gauge
            Constraint::Length(1), // rank ladder
            Constraint::Length(1), // next rank
            Constraint::Length(1), // padding
            Constraint::Min(0),    // challenges | achievements
            Constraint::Length(1), // legend
        ])
        .split(area);

    if let Some(result) = app.session().result() {
        Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {} err   {:.1}s",
                result.wpm, result.accuracy, result.error_count, result.elapsed_secs
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    }

    if let Some(report) = app.last_report() {
        let mut line = format!(
            "+{} xp   (session {} / achievements {})",
            report.total_xp(),
            report.session_xp,
            report.achievement_xp
        );
        if report.new_best_wpm {
            line.push_str("   new best!");
        }
        if report.ranked_up() {
            line.push_str(&format!("   rank up: {}", report.rank_after.name));
        } else if report.leveled_up() {
            line.push_str("   level up!");
        }
        Paragraph::new(Span::styled(line, Style::default().fg(Color::Magenta)))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let unlocked = if report.new_achievements.is_empty() {
            String::from("no new achievements")
        } else {
            report
                .new_achievements
                .iter()
                .map(|id| {
                    let def = id.definition();
                    format!("{} {}", def.icon, def.name)
                })
                .join("   ")
        };
        Paragraph::new(Span::styled(unlocked, bold_style.fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        format!(
            "level {}   {} {}   best {} wpm   avg {} wpm   {} tests",
            snapshot.level,
            snapshot.rank.icon,
            snapshot.rank.name,
            snapshot.best_wpm,
            snapshot.average_wpm,
            snapshot.total_tests
        ),
        rank_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(rank_color(snapshot.rank)))
        .percent(snapshot.level_progress_percent.round().clamp(0.0, 100.0) as u16)
        .label(format!("{} / {} xp", snapshot.xp, snapshot.xp_for_level))
        .render(chunks[5], buf);

    rank_ladder(snapshot.level).render(chunks[6], buf);

    let next = match (snapshot.next_rank, snapshot.levels_until_next_rank) {
        (Some(next), Some(levels)) => {
            format!("{} levels until {} {}", levels, next.icon, next.name)
        }
        _ => String::from("max rank reached"),
    };
    Paragraph::new(Span::styled(next, italic_style))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[9]);

    let mut challenge_lines = vec![Line::from(Span::styled("daily challenges", bold_style))];
    for status in &snapshot.challenges {
        let Some(challenge) = DAILY_CHALLENGES.iter().find(|c| c.id == status.id) else {
            continue;
        };
        let (marker, style) = if status.complete {
            ("[x]", Style::default().fg(Color::Green))
        } else {
            ("[ ]", Style::default())
        };
        challenge_lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "{} {:<12} {:>3}/{:<3} {:>3.0}%  ",
                    marker,
                    status.name,
                    status.current_count.min(status.target),
                    status.target,
                    status.percent
                ),
                style,
            ),
            Span::styled(
                format!("+{} xp", challenge.xp_reward),
                Style::default().fg(Color::Magenta),
            ),
        ]));
        challenge_lines.push(Line::from(Span::styled(
            format!("    {}", challenge.description),
            italic_style.add_modifier(Modifier::DIM),
        )));
    }
    Paragraph::new(challenge_lines).render(columns[0], buf);

    let mut achievement_lines = vec![Line::from(Span::styled(
        format!(
            "achievements {}/{}",
            snapshot.unlocked_achievement_ids.len(),
            ACHIEVEMENTS.len()
        ),
        bold_style,
    ))];
    achievement_lines.extend(ACHIEVEMENTS.iter().map(|a| {
        let unlocked = snapshot.unlocked_achievement_ids.contains(&a.id);
        let (marker, style) = if unlocked {
            ("[x]", Style::default().fg(Color::Yellow))
        } else {
            ("[ ]", Style::default().add_modifier(Modifier::DIM))
        };
        Line::from(Span::styled(
            format!(
                "{} {} {}: {} (+{} xp)",
                marker, a.icon, a.name, a.description, a.xp_reward
            ),
            style,
        ))
    }));
    Paragraph::new(achievement_lines)
        .wrap(Wrap { trim: true })
        .render(columns[1], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (d)ifficulty / (esc)ape",
        italic_style,
    ))
    .render(chunks[10], buf);
}

/// Every rank in order; tiers the level has not reached yet are dimmed
fn rank_ladder(level: u32) -> Paragraph<'static> {
    let spans = RANKS
        .iter()
        .enumerate()
        .flat_map(|(i, rank)| {
            let style = if level >= rank.min_level {
                Style::default().fg(rank_color(rank))
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            let separator = if i == 0 { "" } else { "  " };
            [
                Span::raw(separator),
                Span::styled(format!("{} {}", rank.icon, rank.name), style),
            ]
        })
        .collect::<Vec<_>>();
    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyrank::{config::Config, texts::TextCorpus};
    use std::sync::mpsc;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    /// Top-left cell of the first occurrence of `needle`
    fn find(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
        let chars: Vec<String> = needle.chars().map(String::from).collect();
        let width = chars.len() as u16;
        let area = buf.area;
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right().saturating_sub(width - 1) {
                let hit = chars
                    .iter()
                    .enumerate()
                    .all(|(i, c)| buf[(x + i as u16, y)].symbol() == c.as_str());
                if hit {
                    return Some((x, y));
                }
            }
        }
        None
    }

    fn finished_app(prompt: &str) -> App {
        let mut app = app(prompt);
        for c in prompt.chars() {
            app.type_char(c);
        }
        app
    }

    fn render_results_screen(app: &App) -> Buffer {
        let area = Rect::new(0, 0, 120, 30);
        let mut buf = Buffer::empty(area);
        AppView(app).render(area, &mut buf);
        buf
    }

    fn app(prompt: &str) -> App {
        let (tx, _rx) = mpsc::channel();
        let corpus = TextCorpus::embedded().unwrap();
        App::new(Config::default(), corpus, Some(prompt.to_string()), tx).unwrap()
    }

    #[test]
    fn typing_screen_shows_prompt_and_metrics() {
        let app = app("hello world");
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        AppView(&app).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("hello world"));
        assert!(text.contains("0 wpm"));
        assert!(text.contains("Novice"));
    }

    #[test]
    fn results_screen_shows_progress() {
        let mut app = app("ok");
        app.type_char('o');
        app.type_char('k');

        let area = Rect::new(0, 0, 100, 24);
        let mut buf = Buffer::empty(area);
        AppView(&app).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("First Steps"));
        assert!(text.contains("daily challenges"));
        assert!(text.contains("levels until"));
    }

    #[test]
    fn challenges_show_description_and_reward() {
        let app = finished_app("ok");
        let text = buffer_text(&render_results_screen(&app));

        for challenge in DAILY_CHALLENGES {
            assert!(text.contains(challenge.description), "{}", challenge.name);
            assert!(text.contains(&format!("+{} xp", challenge.xp_reward)));
        }
    }

    #[test]
    fn achievement_gallery_lists_locked_and_unlocked() {
        let app = finished_app("ok");
        let text = buffer_text(&render_results_screen(&app));

        let unlocked = app.progress().unlocked.len();
        assert!(unlocked > 0);
        assert!(text.contains(&format!("achievements {}/{}", unlocked, ACHIEVEMENTS.len())));
        for achievement in ACHIEVEMENTS {
            assert!(text.contains(achievement.name), "{}", achievement.name);
        }
        assert!(text.contains("Reach 100 WPM"));
    }

    #[test]
    fn rank_ladder_dims_unreached_tiers() {
        let app = finished_app("ok");
        let buf = render_results_screen(&app);

        let legend = find(&buf, "Legend").unwrap();
        assert!(buf[legend].modifier.contains(Modifier::DIM));

        // the ladder is the only line mentioning Grandmaster; Novice is reached
        let (_, row) = find(&buf, "Grandmaster").unwrap();
        let novice = (0..buf.area.width)
            .find(|&x| buf[(x, row)].symbol() == "N")
            .unwrap();
        assert!(!buf[(novice, row)].modifier.contains(Modifier::DIM));
    }
}
