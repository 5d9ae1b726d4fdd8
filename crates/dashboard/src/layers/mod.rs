pub(crate) mod engine;
pub(crate) mod service;
pub(crate) mod ui;
