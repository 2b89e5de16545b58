//! State management example
//!
//! Demonstrates how to use `GridStateManager` to track changes and query state.

use std::sync::{Arc, Mutex};
use tablenote_core::{Command, EditCommand, FormatCommand, GridStateManager, SelectionCommand};

fn main() {
    println!("=== Grid state management example ===\n");

    let mut manager = GridStateManager::with_defaults();

    println!("1. Initial grid state:");
    print_grid_state(&manager);

    println!("\n2. Change notifications:");
    let change_count = Arc::new(Mutex::new(0));
    let change_count_clone = change_count.clone();
    manager.subscribe(move |change| {
        let mut count = change_count_clone.lock().unwrap();
        *count += 1;
        println!(
            "  change #{}: {:?} (version {} -> {})",
            count, change.change_type, change.old_version, change.new_version
        );
    });

    manager
        .execute(Command::Edit(EditCommand::SetText {
            row: 0,
            col: 0,
            text: "Items".to_string(),
        }))
        .unwrap();
    manager.click(0, 0).unwrap();
    manager
        .execute(Command::Format(FormatCommand::ToggleBold))
        .unwrap();
    // Ignored: nothing to redo.
    manager.execute(Command::Edit(EditCommand::Redo)).unwrap();

    println!("\n3. Version tracking:");
    let current_version = manager.version();
    println!("  current version: {current_version}");
    println!("  changed since 0: {}", manager.has_changed_since(0));
    println!(
        "  changed since {current_version}: {}",
        manager.has_changed_since(current_version)
    );

    println!("\n4. Column drag:");
    if let Some(session) = manager.begin_column_resize(0, 100) {
        for x in [110, 130, 160] {
            manager.drag_column_resize(&session, x);
        }
        manager.finish_column_resize(session);
    }
    println!("  widths: {:?}", manager.snapshot().col_widths());

    println!("\n5. Full state:");
    manager
        .execute(Command::Selection(SelectionCommand::Clear))
        .unwrap();
    let full_state = manager.get_full_state();
    println!("  header: {}", full_state.grid.header);
    println!("  modified: {}", full_state.grid.is_modified);
    println!("  active cell: {:?}", full_state.selection.active_cell);
    println!("  undo depth: {}", full_state.undo_redo.undo_depth);
    println!("  clipboard: {:?}", full_state.clipboard.pending);
    println!("  total changes: {}", *change_count.lock().unwrap());

    println!("\n=== Done ===");
}

fn print_grid_state(manager: &GridStateManager) {
    let state = manager.get_grid_state();
    println!("  header: {}", state.header);
    println!("  rows: {}", state.row_count);
    println!("  columns: {}", state.col_count);
    println!("  modified: {}", state.is_modified);
    println!("  version: {}", state.version);
}
