//! Command interface example
//!
//! Demonstrates how to use `CommandExecutor` to build a small report table.

use tablenote_core::{
    Color, Command, CommandExecutor, CommandResult, EditCommand, FormatCommand, SelectionCommand,
    Snapshot, ViewCommand,
};

fn main() {
    println!("=== Grid command interface example ===\n");

    let mut executor = CommandExecutor::with_defaults();
    println!("Header: {}", executor.snapshot().header());
    print_shape(executor.snapshot());

    // 1. Templated block
    println!("\n1. Insert the Daily Breakage block:");
    executor
        .execute(Command::Edit(EditCommand::InsertTemplatedBlock))
        .unwrap();
    print_grid(executor.snapshot());

    // 2. Fill in values
    println!("\n2. Fill in values:");
    for (row, values) in [(1, ["4", "1", "3"]), (2, ["10", "2", "8"])] {
        for (offset, value) in values.into_iter().enumerate() {
            executor
                .execute(Command::Edit(EditCommand::SetText {
                    row,
                    col: offset + 1,
                    text: value.to_string(),
                }))
                .unwrap();
        }
    }
    print_grid(executor.snapshot());

    // 3. Formatting through the active cell and the format clipboard
    println!("\n3. Format the totals column:");
    executor
        .execute_batch(vec![
            Command::Selection(SelectionCommand::Select { row: 1, col: 3 }),
            Command::Format(FormatCommand::ToggleBold),
            Command::Format(FormatCommand::SetBackgroundColor {
                color: "#fef08a".parse::<Color>().unwrap(),
            }),
            Command::Format(FormatCommand::CopyFormat),
            Command::Selection(SelectionCommand::Click { row: 2, col: 3 }),
        ])
        .unwrap();
    let cell = executor.snapshot().cell(2, 3).unwrap();
    println!("  (2, 3) bold={} bg={}", cell.bold, cell.bg_color);

    // 4. Undo / redo
    println!("\n4. Undo / redo:");
    println!("  undo depth: {}", executor.undo_depth());
    executor.execute(Command::Edit(EditCommand::Undo)).unwrap();
    println!(
        "  after undo (2, 3) bold={}",
        executor.snapshot().cell(2, 3).unwrap().bold
    );
    executor.execute(Command::Edit(EditCommand::Redo)).unwrap();
    println!(
        "  after redo (2, 3) bold={}",
        executor.snapshot().cell(2, 3).unwrap().bold
    );

    // 5. No-ops
    println!("\n5. Out-of-bounds edits are ignored:");
    let result = executor
        .execute(Command::Edit(EditCommand::SetText {
            row: 99,
            col: 0,
            text: "lost".to_string(),
        }))
        .unwrap();
    println!("  {result:?}");

    // 6. Export content
    println!("\n6. Visible content:");
    if let CommandResult::Visible(visible) = executor
        .execute(Command::View(ViewCommand::GetVisibleSnapshot))
        .unwrap()
    {
        println!(
            "  {} rows x {} columns, widths {:?}",
            visible.row_count(),
            visible.col_count(),
            visible.col_widths
        );
    }

    println!("\n=== Done ===");
}

fn print_shape(snapshot: &Snapshot) {
    println!(
        "Grid: {} rows x {} columns",
        snapshot.row_count(),
        snapshot.col_count()
    );
}

fn print_grid(snapshot: &Snapshot) {
    for row in snapshot.grid().rows().take(4) {
        let texts: Vec<&str> = row.iter().map(|cell| cell.text.as_str()).collect();
        println!("  | {} |", texts.join(" | "));
    }
    println!("  widths: {:?}", snapshot.col_widths());
}
