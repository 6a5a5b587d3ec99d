/*
 * This module provides the application logic layer, centered around
 * `PackBuilderLogic` which acts as the Presenter/Controller between a GUI
 * front-end and the core pack model. The front-end translates widget
 * interactions into `AppEvent`s and renders the returned `UiCommand`s; all
 * decisions live here. Unit tests for `PackBuilderLogic` are in
 * `handler_tests.rs`.
 */
pub mod events;
pub mod handler;


pub use events::{AppEvent, UiCommand};
pub use handler::PackBuilderLogic;
