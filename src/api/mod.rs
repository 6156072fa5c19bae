// API module
//
// rest  - REST endpoint handlers and router construction
// pages - server-rendered dashboard page

pub mod pages;
pub mod rest;
