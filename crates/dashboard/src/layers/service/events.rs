use protocol::{ChatMessage, PredictionRequest};

use crate::layers::engine::Forecast;

pub(crate) type Ticket = u64;

#[derive(Debug)]
pub(crate) enum ServiceCommand {
    Predict {
        ticket: Ticket,
        request: PredictionRequest,
    },
    Chat {
        ticket: Ticket,
        text: String,
    },
}

#[derive(Debug)]
pub(crate) enum ServiceEvent {
    PredictionReady {
        ticket: Ticket,
        forecast: Forecast,
    },
    ChatReplied {
        ticket: Ticket,
        message: ChatMessage,
    },
}
