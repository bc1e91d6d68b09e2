use crate::domain::IntervalKind;

/// Callback data carried by the timer control buttons.
pub const CB_START_WORK: &str = "timer:work";
pub const CB_START_BREAK: &str = "timer:break";
pub const CB_STOP: &str = "timer:stop";

/// Inline keyboard (buttons) attached to timer messages.
#[derive(Clone, Debug)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    pub fn single(label: &str, callback_data: &str) -> Self {
        Self {
            buttons: vec![InlineButton {
                label: label.to_string(),
                callback_data: callback_data.to_string(),
            }],
        }
    }

    /// The stop button attached to every "interval started" message.
    pub fn stop_button() -> Self {
        Self::single("Stop", CB_STOP)
    }

    /// The "start the next interval" button sent on completion.
    pub fn start_button(kind: IntervalKind) -> Self {
        match kind {
            IntervalKind::Work => Self::single("Start work", CB_START_WORK),
            IntervalKind::Break => Self::single("Start break", CB_START_BREAK),
        }
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_html: bool,
    pub supports_edit: bool,
    pub supports_inline_keyboards: bool,
    pub max_message_len: usize,
}
