use base64::Engine;
use ratatui::{prelude::*, widgets::*};

use crate::app::{ApiHealth, NotificationLevel};
use crate::messages::ui_events::Route;
use crate::workflow::WorkflowStep;

/// Landing page feature cards: (title, description)
pub const FEATURES: [(&str, &str); 4] = [
    (
        "AI-Powered Face Detection",
        "Advanced facial recognition technology that accurately identifies and maps facial features for seamless swapping.",
    ),
    (
        "Professional Templates",
        "Pre-rendered templates for various professions including Doctor, Professor, Engineer, Lawyer, and more.",
    ),
    (
        "Real-time Processing",
        "Lightning-fast face swapping with real-time preview and instant results.",
    ),
    (
        "Privacy First",
        "Your images are processed securely and never stored permanently on our servers.",
    ),
];

/// Professions showcased on the landing page
pub const SHOWCASE_PROFESSIONS: [(&str, Color); 6] = [
    ("Doctor", Color::Cyan),
    ("Professor", Color::Magenta),
    ("Engineer", Color::Green),
    ("Lawyer", Color::Red),
    ("Business Executive", Color::Blue),
    ("Artist", Color::Yellow),
];

/// Renders the route tabs
pub fn render_tabs<'a>(selected: Route) -> Tabs<'a> {
    let titles: Vec<Line> = [Route::Home, Route::Upload, Route::Result]
        .iter()
        .enumerate()
        .map(|(i, r)| Line::from(format!(" {}:{} ", i + 1, r.title())))
        .collect();

    let index = match selected {
        Route::Home => 0,
        Route::Upload => 1,
        Route::Result => 2,
    };

    Tabs::new(titles)
        .select(index)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        .divider("|")
}

/// The "1 Upload - 2 Profession - 3 Angle" indicator
pub fn step_indicator(step: WorkflowStep) -> Line<'static> {
    let labels = ["Upload Photo", "Choose Profession", "Select Angle"];
    let current = step.number();

    let mut spans = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let n = i as u8 + 1;
        let style = if n < current {
            Style::default().fg(Color::Green)
        } else if n == current {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if n < current { "✓".to_string() } else { n.to_string() };
        spans.push(Span::styled(format!(" {} {} ", marker, label), style));
        if i + 1 < labels.len() {
            spans.push(Span::styled("──", Style::default().fg(Color::DarkGray)));
        }
    }

    Line::from(spans)
}

/// Notification color
pub fn notification_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => Color::Cyan,
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Error => Color::Red,
    }
}

/// Service health indicator
pub fn health_span(health: &ApiHealth) -> Span<'static> {
    match health {
        ApiHealth::Unknown => Span::styled("[?] unknown", Style::default().fg(Color::DarkGray)),
        ApiHealth::Checking => Span::styled("[...] checking", Style::default().fg(Color::Yellow)),
        ApiHealth::Healthy(status) => {
            Span::styled(format!("[+] {}", status), Style::default().fg(Color::Green))
        }
        ApiHealth::Unreachable(reason) => {
            Span::styled(format!("[-] {}", reason), Style::default().fg(Color::Red))
        }
    }
}

/// Human readable byte size
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Column of the cursor after `input` inside a bordered box, clamped to the box
pub fn input_cursor_x(area: Rect, input: &str) -> u16 {
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x.saturating_add(typed).saturating_add(1).min(max_x)
}

/// OSC 52 escape asking the terminal to set the system clipboard
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{}\x07", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_input_cursor_stays_inside_box() {
        let area = Rect::new(10, 5, 40, 3);
        assert_eq!(input_cursor_x(area, ""), 11);
        assert_eq!(input_cursor_x(area, "~/pic.jpg"), 20);
        assert_eq!(input_cursor_x(area, &"x".repeat(100_000)), 48);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_step_indicator_marks_done_steps() {
        let line = step_indicator(WorkflowStep::AwaitingAngleAndConfirm);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("✓ Upload Photo"));
        assert!(text.contains("✓ Choose Profession"));
        assert!(text.contains("3 Select Angle"));
    }
}
