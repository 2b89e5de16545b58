#![warn(missing_docs)]
//! Tablenote Core - Headless Grid Engine for Ad-hoc Report Tables
//!
//! # Overview
//!
//! `tablenote-core` is the state engine behind a small table note-taking tool: a rectangular
//! grid of formatted cells under a free-text header, exported as a PNG image.
//! It does not draw anything itself; front ends render [`Snapshot`]s and feed user actions back
//! in as [`Command`]s.
//!
//! # Core Features
//!
//! - **Persistent Snapshots**: rows are shared (`Arc`) between snapshots and copied on write
//! - **Undo/Redo**: every mutation is one history step, bounded depth, redo cleared on diverge
//! - **Auto-Fit**: column widths follow their content through a pluggable [`TextMeasurer`]
//! - **Format Clipboard**: copy one cell's look, apply it once
//! - **Column Drag Sessions**: pointer-driven resizing with guaranteed listener release
//! - **Export Boundary**: visible-content filtering and background PNG export via [`ExportAdapter`]
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & State Management       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  History / Format Clipboard / Resize        │  ← Session State
//! ├─────────────────────────────────────────────┤
//! │  Mutation Engine + Auto-Fit                 │  ← Pure Transitions
//! ├─────────────────────────────────────────────┤
//! │  Snapshot (header + Grid of Cells)          │  ← Data Model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Using Command Interface
//!
//! ```rust
//! use tablenote_core::{Command, CommandExecutor, EditCommand, FormatCommand, SelectionCommand};
//!
//! let mut executor = CommandExecutor::with_defaults();
//!
//! executor.execute(Command::Edit(EditCommand::SetText {
//!     row: 0,
//!     col: 0,
//!     text: "Items".to_string(),
//! })).unwrap();
//!
//! executor.execute(Command::Selection(SelectionCommand::Select { row: 0, col: 0 })).unwrap();
//! executor.execute(Command::Format(FormatCommand::ToggleBold)).unwrap();
//!
//! assert!(executor.snapshot().cell(0, 0).unwrap().bold);
//! assert_eq!(executor.undo_depth(), 2);
//! ```
//!
//! ## Using State Management
//!
//! ```rust
//! use tablenote_core::GridStateManager;
//!
//! let mut manager = GridStateManager::with_defaults();
//!
//! manager.subscribe(|change| {
//!     println!("State changed: {:?}", change.change_type);
//! });
//!
//! let grid_state = manager.get_grid_state();
//! println!("{} x {}", grid_state.row_count, grid_state.col_count);
//! ```
//!
//! # Module Description
//!
//! - [`cell`] - Cells, colors and partial updates
//! - [`grid`] - Rectangular grid with copy-on-write rows
//! - [`autofit`] - Column width fitting
//! - [`mutation`] - Pure snapshot transitions
//! - [`clipboard`] - Single-slot format clipboard
//! - [`resize`] - Column drag sessions
//! - [`header`] - Date/shift header text
//! - [`config`] - TOML configuration
//! - [`export`] - Visible snapshot and export adapters
//! - [`commands`] - Unified command interface
//! - [`state`] - State management and query interface

pub mod autofit;
pub mod cell;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod export;
pub mod grid;
pub mod header;
mod history;
pub mod mutation;
pub mod resize;
pub mod snapshot;
pub mod state;

pub use autofit::{AutoFit, CharWidthMeasurer, TextMeasurer, display_width};
pub use cell::{Cell, CellFormat, CellUpdate, Color, ParseColorError};
pub use clipboard::FormatClipboard;
pub use commands::{
    CellAddress, Command, CommandError, CommandExecutor, CommandResult, EditCommand,
    FormatCommand, NoopReason, SelectionCommand, ViewCommand,
};
pub use config::{ConfigError, GridConfig, ResizeHistory};
pub use export::{
    EXPORT_FILE_NAME, ExportAdapter, ExportError, ExportJob, ExportedImage, VisibleSnapshot,
    export_with, save_export,
};
pub use grid::{Grid, MIN_COL_WIDTH};
pub use header::{Clock, FixedClock, Shift, SystemClock, header_text};
pub use mutation::MutationEngine;
pub use resize::ColumnResize;
pub use snapshot::Snapshot;
pub use state::{
    ClipboardState, FullState, GridState, GridStateManager, SelectionState, StateChange,
    StateChangeCallback, StateChangeType, UndoRedoState,
};
