pub(crate) mod chat;
pub(crate) mod prediction;

pub(crate) use chat::{reply_message, ChatSessionClient, Transcript};
pub(crate) use prediction::{Forecast, PredictionClient};
