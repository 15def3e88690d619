#![allow(dead_code)]

pub mod chat_server;
pub mod stub_backend;
