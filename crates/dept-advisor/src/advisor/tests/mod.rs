mod common;
mod pipeline;
mod service;
