//! AI-Swap TUI - Actor-based face swap client
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async HTTP execution

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ai_swap_tui::config::Config;
use ai_swap_tui::constants::{APP_NAME, APP_VERSION};
use ai_swap_tui::messages::ui_events::{key_to_ui_event, Route};
use ai_swap_tui::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use ai_swap_tui::models::Angle;
use ai_swap_tui::ui::{self, FEATURES, SHOWCASE_PROFESSIONS};
use ai_swap_tui::workflow::WorkflowStep;
use ai_swap_tui::{AppActor, NetworkActor};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", &config.log_file);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(api = %config.api_base_url, version = APP_VERSION, "Starting {}", APP_NAME);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(config.clone(), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(config, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();
    let mut clipboard_seq = 0u64;

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            let ui_event = match event::read()? {
                Event::Key(key) => key_to_ui_event(key, current_state.key_context()),
                // Dropping files onto a terminal pastes their paths
                Event::Paste(text) if current_state.show_picker => Some(UiEvent::PickerPaste(text)),
                Event::Paste(text) => Some(UiEvent::DropFiles(text)),
                _ => None,
            };

            if let Some(event) = ui_event {
                let quit = matches!(event, UiEvent::Quit);
                let _ = ui_tx.send(event);
                if quit {
                    break;
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }

        if let Some(clip) = &current_state.clipboard {
            if clip.seq != clipboard_seq {
                clipboard_seq = clip.seq;
                let mut out = io::stdout();
                out.write_all(ui::osc52_sequence(&clip.text).as_bytes())?;
                out.flush()?;
            }
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    // Main layout with tab bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);

    match state.route {
        Route::Home => draw_home(f, state, main_chunks[1]),
        Route::Upload => draw_upload(f, state, main_chunks[1]),
        Route::Result => draw_result(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);

    // Popups
    if state.show_picker {
        draw_picker_popup(f, state, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }

    draw_notifications(f, state, main_chunks[1]);
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(area);

    f.render_widget(ui::render_tabs(state.route), chunks[0]);

    let health = Line::from(vec![
        Span::styled(format!("{} ", APP_NAME), Style::default().fg(Color::Cyan).bold()),
        ui::health_span(&state.api_health),
    ])
    .right_aligned();
    f.render_widget(Paragraph::new(health), chunks[1]);
}

// ------------------------------------------------------------------ Home

fn draw_home(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Hero
            Constraint::Min(7),    // Features
            Constraint::Length(5), // Professions
            Constraint::Length(3), // Service
        ])
        .split(area);

    let hero = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Transform Your Look with AI-Powered Face Swapping",
            Style::default().fg(Color::Cyan).bold(),
        ))
        .centered(),
        Line::from(""),
        Line::from(
            "Upload your photo and see yourself in different professional roles. \
             Our AI preserves your face while integrating it into professional templates.",
        )
        .centered(),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to get started",
            Style::default().fg(Color::Yellow).bold(),
        ))
        .centered(),
    ];
    f.render_widget(Paragraph::new(hero).wrap(Wrap { trim: true }), chunks[0]);

    let feature_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[1]);
    for ((title, description), cell) in FEATURES.iter().zip(feature_areas.iter()) {
        let card = Paragraph::new(*description)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", title))
                    .title_style(Style::default().fg(Color::Yellow).bold()),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(card, *cell);
    }

    let showcase = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(chunks[2]);
    f.render_widget(
        Paragraph::new(Line::from(" Professional Templates Available ").bold()),
        showcase[0],
    );
    let profession_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 6); 6])
        .split(showcase[1]);
    for ((name, color), cell) in SHOWCASE_PROFESSIONS.iter().zip(profession_areas.iter()) {
        let tile = Paragraph::new(Line::from(*name).centered())
            .style(Style::default().fg(Color::Black).bg(*color).bold())
            .block(Block::default().padding(Padding::vertical(1)));
        f.render_widget(tile, *cell);
    }

    let service = Paragraph::new(Line::from(vec![
        Span::raw(format!(" {} ", state.api_base_url)),
        ui::health_span(&state.api_health),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Service "));
    f.render_widget(service, chunks[3]);
}

// ---------------------------------------------------------------- Upload

fn draw_upload(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    f.render_widget(
        Paragraph::new(ui::step_indicator(state.step).centered()),
        chunks[0],
    );

    if state.step == WorkflowStep::AwaitingImage {
        draw_drop_zone(f, state, chunks[1]);
        return;
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    draw_image_panel(f, state, body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Professions
            Constraint::Length(3), // Angle
            Constraint::Length(3), // Transform
        ])
        .split(body[1]);

    draw_profession_list(f, state, right[0]);
    if state.step == WorkflowStep::AwaitingAngleAndConfirm {
        draw_angle_selector(f, state, right[1]);
        draw_transform_button(f, state, right[2]);
    }
}

fn draw_drop_zone(f: &mut Frame, state: &RenderState, area: Rect) {
    let zone = centered_rect(70, 60, area);

    let (lines, border) = if state.is_uploading {
        let name = state.uploading_file.as_deref().unwrap_or("image");
        (
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("Uploading {}...", name),
                    Style::default().fg(Color::Yellow).bold(),
                ))
                .centered(),
            ],
            Style::default().fg(Color::Yellow),
        )
    } else {
        (
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Drop your image here",
                    Style::default().fg(Color::Cyan).bold(),
                ))
                .centered(),
                Line::from("or press o to browse").centered(),
                Line::from(""),
                Line::from(Span::styled(
                    "JPEG, PNG, WebP up to 10MB",
                    Style::default().fg(Color::DarkGray),
                ))
                .centered(),
            ],
            Style::default().fg(Color::Cyan),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(" Upload Your Photo ");
    f.render_widget(Paragraph::new(lines).block(block), zone);
}

fn draw_image_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Your Photo (x: remove) ");

    let Some(image) = &state.image else {
        f.render_widget(block, area);
        return;
    };

    let face = if image.face_detected {
        Span::styled("detected", Style::default().fg(Color::Green))
    } else {
        Span::styled("not detected", Style::default().fg(Color::Yellow))
    };

    let lines = vec![
        Line::from(Span::styled(image.file.file_name.clone(), Style::default().bold())),
        Line::from(""),
        Line::from(format!("Size:     {}", ui::format_size(image.file.size_bytes))),
        Line::from(format!("Type:     {}", image.file.mime_type)),
        Line::from(format!("Image ID: {}", image.image_id)),
        Line::from(vec![Span::raw("Face:     "), face]),
        Line::from(""),
        Line::from(Span::styled(
            image.preview.url.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_profession_list(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if state.step == WorkflowStep::AwaitingProfession {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        })
        .title(" Choose Your Profession (↑/↓ Enter, r: reload) ");

    if state.professions.is_empty() {
        let text = if state.professions_loading {
            "Loading professions..."
        } else {
            "No professions available. Press r to reload."
        };
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let selected_id = state.selected_profession.as_ref().map(|p| p.id.as_str());
    let items: Vec<ListItem> = state
        .professions
        .iter()
        .map(|p| {
            let marker = if Some(p.id.as_str()) == selected_id { "● " } else { "  " };
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("{}{}", marker, p.name), Style::default().bold()),
                Span::styled(
                    format!("  {} angles available", p.angle_count()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])];
            if !p.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", p.description),
                    Style::default().fg(Color::Gray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    let mut list_state = ListState::default();
    list_state.select(Some(state.profession_cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_angle_selector(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = Vec::new();
    for angle in Angle::ALL {
        let supported = state
            .selected_profession
            .as_ref()
            .map(|p| p.supports(angle))
            .unwrap_or(true);
        let style = if angle == state.angle {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else if supported {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", angle.display_name()), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Select Angle (←/→) ");
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_transform_button(f: &mut Frame, state: &RenderState, area: Rect) {
    let (label, style) = if state.is_swapping {
        ("Processing...", Style::default().fg(Color::Yellow))
    } else {
        ("[ t ] Transform My Image", Style::default().fg(Color::Green).bold())
    };

    let button = Paragraph::new(Line::from(label).centered())
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    f.render_widget(button, area);
}

// ---------------------------------------------------------------- Result

fn draw_result(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(handoff) = &state.result else {
        let text = Paragraph::new("No result yet. Press 2 to start a transformation.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Result "));
        f.render_widget(text, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Heading
            Constraint::Length(5), // Images
            Constraint::Min(6),    // Details
            Constraint::Length(3), // Actions
        ])
        .split(area);

    let heading = Line::from(Span::styled(
        "Your Professional Transformation is Ready!",
        Style::default().fg(Color::Green).bold(),
    ))
    .centered();
    f.render_widget(Paragraph::new(heading), chunks[0]);

    let images = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    f.render_widget(
        Paragraph::new(handoff.original_image.url.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Original ")),
        images[0],
    );
    f.render_widget(
        Paragraph::new(handoff.result.result_url.as_str())
            .style(Style::default().fg(Color::Cyan))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!(" As {} ", handoff.profession.name)),
            ),
        images[1],
    );

    let status = if handoff.result.success {
        Span::styled("Success", Style::default().fg(Color::Green))
    } else {
        Span::styled("Failed", Style::default().fg(Color::Red))
    };
    let mut details = vec![
        Line::from(vec![Span::raw("Profession: "), Span::raw(handoff.profession.name.clone()).bold()]),
        Line::from(format!("Angle:      {}", handoff.result.angle_label())),
        Line::from(vec![Span::raw("Status:     "), status]),
    ];
    if state.is_downloading {
        details.push(Line::from(Span::styled(
            "Downloading...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(path) = &state.last_download {
        details.push(Line::from(format!("Saved to:   {}", path.display())));
    }
    f.render_widget(
        Paragraph::new(details).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Transformation Details "),
        ),
        chunks[2],
    );

    let actions = Line::from(vec![
        Span::styled(" d ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" Download   "),
        Span::styled(" s ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" Share   "),
        Span::styled(" n ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" Try Another "),
    ])
    .centered();
    f.render_widget(
        Paragraph::new(actions).block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}

// -------------------------------------------------------------- Overlays

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if state.show_picker {
        " Tab:complete | Enter:upload | Esc:cancel "
    } else {
        match (state.route, state.step) {
            (Route::Home, _) => " Enter:get started | 1/2/3:switch screen | ?:help | q:quit ",
            (Route::Upload, WorkflowStep::AwaitingImage) => {
                " o:browse | paste or drop a file | ?:help | q:quit "
            }
            (Route::Upload, WorkflowStep::AwaitingAngleAndConfirm) => {
                " ↑/↓:profession | ←/→:angle | t:transform | x:remove image | ?:help "
            }
            (Route::Upload, _) => " ↑/↓:move | Enter:select | r:reload | x:remove image | ?:help ",
            (Route::Result, _) => " d:download | s:share | n:try another | ?:help | q:quit ",
        }
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_notifications(f: &mut Frame, state: &RenderState, area: Rect) {
    let width = 50.min(area.width);
    let x = area.x + area.width.saturating_sub(width);
    let mut y = area.y;

    for notification in state.notifications.iter().rev() {
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect::new(x, y, width, 3);
        let color = ui::notification_color(notification.level);
        let toast = Paragraph::new(notification.message.as_str())
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(Color::Black)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
        y += 3;
    }
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 AI-SWAP - Keyboard Shortcuts

 NAVIGATION
   1 / 2 / 3          Home / Upload / Result
   Enter              Get started (home)

 UPLOAD
   o / Enter          Browse for an image
   paste / drop       Upload a dropped file
   x / Delete         Remove the current image

 PROFESSION & ANGLE
   ↑ / ↓              Move through professions
   Enter              Select profession
   r                  Reload professions
   ← / →              Change angle
   t                  Transform my image

 RESULT
   d                  Download result
   s                  Copy result link
   n / Esc            Try another

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_picker_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Open Image (Tab to complete, Enter to upload, Esc to cancel) ")
        .style(Style::default().bg(Color::Black));

    let content = if state.picker_input.is_empty() {
        "Enter image path...\n\nExample: ~/Pictures/portrait.jpg"
    } else {
        &state.picker_input
    };

    let input = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);

    let cursor_x = ui::input_cursor_x(popup_area, &state.picker_input);
    f.set_cursor_position(Position::new(cursor_x, popup_area.y + 1));
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
