pub(crate) mod events;
pub(crate) mod logging;
mod worker;

pub(crate) use worker::spawn_service;
