//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::workflow::WorkflowStep;

/// The three screens of the application
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Route {
    #[default]
    Home,
    Upload,
    Result,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Upload => "Upload & Transform",
            Route::Result => "Result",
        }
    }
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    Navigate(Route),

    // Upload widget
    /// Text pasted into the window; terminals paste paths of dropped files
    DropFiles(String),
    OpenFilePicker,
    PickerChar(char),
    PickerPaste(String),
    PickerBackspace,
    PickerAutocomplete,
    PickerSubmit,
    PickerCancel,
    RemoveImage,

    // Profession catalog
    ReloadProfessions,
    NextProfession,
    PrevProfession,
    SelectProfession,

    // Angle + confirm
    NextAngle,
    PrevAngle,
    Transform,

    // Result actions
    Download,
    Share,
    TryAnother,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// The slice of render state key mapping depends on
#[derive(Clone, Copy, Debug)]
pub struct KeyContext {
    pub route: Route,
    pub step: WorkflowStep,
    pub show_help: bool,
    pub show_picker: bool,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: KeyContext) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    // Popups first
    if ctx.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if ctx.show_picker {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::PickerCancel),
            KeyCode::Enter => Some(UiEvent::PickerSubmit),
            KeyCode::Tab => Some(UiEvent::PickerAutocomplete),
            KeyCode::Backspace => Some(UiEvent::PickerBackspace),
            KeyCode::Char(c) => Some(UiEvent::PickerChar(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Char('1') => return Some(UiEvent::Navigate(Route::Home)),
        KeyCode::Char('2') => return Some(UiEvent::Navigate(Route::Upload)),
        KeyCode::Char('3') => return Some(UiEvent::Navigate(Route::Result)),
        _ => {}
    }

    match ctx.route {
        Route::Home => match key.code {
            KeyCode::Enter | KeyCode::Char('s') => Some(UiEvent::Navigate(Route::Upload)),
            _ => None,
        },
        Route::Upload => handle_upload_keys(key, ctx.step),
        Route::Result => match key.code {
            KeyCode::Char('d') => Some(UiEvent::Download),
            KeyCode::Char('s') => Some(UiEvent::Share),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::TryAnother),
            _ => None,
        },
    }
}

/// Handle keys for the upload screen
fn handle_upload_keys(key: KeyEvent, step: WorkflowStep) -> Option<UiEvent> {
    match step {
        WorkflowStep::AwaitingImage => match key.code {
            KeyCode::Char('o') | KeyCode::Enter => Some(UiEvent::OpenFilePicker),
            _ => None,
        },
        WorkflowStep::AwaitingProfession | WorkflowStep::AwaitingAngleAndConfirm => {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::PrevProfession),
                KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::NextProfession),
                KeyCode::Enter => Some(UiEvent::SelectProfession),
                KeyCode::Char('r') => Some(UiEvent::ReloadProfessions),
                KeyCode::Char('x') | KeyCode::Delete => Some(UiEvent::RemoveImage),
                KeyCode::Left | KeyCode::Char('h')
                    if step == WorkflowStep::AwaitingAngleAndConfirm =>
                {
                    Some(UiEvent::PrevAngle)
                }
                KeyCode::Right | KeyCode::Char('l')
                    if step == WorkflowStep::AwaitingAngleAndConfirm =>
                {
                    Some(UiEvent::NextAngle)
                }
                KeyCode::Char('t') => Some(UiEvent::Transform),
                _ => None,
            }
        }
        WorkflowStep::Completed => None,
    }
}
