//! App actor - message loop processing UI events and network responses

use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::config::Config;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// How often expired notifications are swept
const NOTIFICATION_TICK: Duration = Duration::from_millis(500);

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        config: Config,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(config),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        for cmd in self.state.startup_commands() {
            self.send(Some(cmd));
        }

        // Send initial render state
        self.render();

        let mut tick = tokio::time::interval(NOTIFICATION_TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    self.render();
                }
                Some(response) = net_rx.recv() => {
                    let follow_up = self.state.handle_response(response);
                    self.send(follow_up);
                    self.render();
                }
                _ = tick.tick() => {
                    if self.state.prune_notifications(chrono::Utc::now()) {
                        self.render();
                    }
                }
                else => break,
            }
        }
    }

    fn render(&self) {
        let _ = self.render_tx.send(self.state.to_render_state());
    }

    fn send(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let cmd = match event {
            // Navigation
            UiEvent::Navigate(route) => self.state.navigate(route),

            // Upload widget
            UiEvent::DropFiles(text) => self.state.drop_files(&text),
            UiEvent::OpenFilePicker => {
                self.state.open_file_picker();
                None
            }
            UiEvent::PickerChar(c) => {
                self.state.picker_char(c);
                None
            }
            UiEvent::PickerPaste(text) => {
                self.state.picker_paste(&text);
                None
            }
            UiEvent::PickerBackspace => {
                self.state.picker_backspace();
                None
            }
            UiEvent::PickerAutocomplete => {
                self.state.picker_autocomplete();
                None
            }
            UiEvent::PickerSubmit => self.state.picker_submit(),
            UiEvent::PickerCancel => {
                self.state.picker_cancel();
                None
            }
            UiEvent::RemoveImage => {
                self.state.remove_image();
                None
            }

            // Profession catalog
            UiEvent::ReloadProfessions => self.state.fetch_professions(),
            UiEvent::NextProfession => {
                self.state.next_profession();
                None
            }
            UiEvent::PrevProfession => {
                self.state.prev_profession();
                None
            }
            UiEvent::SelectProfession => {
                self.state.select_profession();
                None
            }

            // Angle + confirm
            UiEvent::NextAngle => {
                self.state.cycle_angle(true);
                None
            }
            UiEvent::PrevAngle => {
                self.state.cycle_angle(false);
                None
            }
            UiEvent::Transform => self.state.transform(),

            // Result actions
            UiEvent::Download => self.state.download(),
            UiEvent::Share => {
                self.state.share();
                None
            }
            UiEvent::TryAnother => self.state.try_another(),

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                None
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                None
            }

            // System
            UiEvent::Quit => return true,
        };

        self.send(cmd);
        false
    }
}
