//! Task board
//!
//! Column view with search and sort, drag-and-drop status changes, and the
//! storage-backed task service the front ends talk to.

#![warn(missing_docs)]

pub mod view;
pub mod drag;
pub mod service;

pub use view::{Board, BoardQuery, Column, ColumnId, ParseError, SortBy};
pub use drag::{DragLocation, DragResult};
pub use service::{
    BasicTaskService, NewTask, Result, ServiceConfig, ServiceError, TaskService, TaskUpdate,
};
