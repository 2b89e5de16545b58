use pretty_assertions::assert_eq;
use tablenote_core::{
    CellUpdate, Color, Command, CommandExecutor, CommandResult, EditCommand, FormatCommand,
    GridConfig, NoopReason, SelectionCommand, Snapshot, SystemClock, ViewCommand,
};

fn set_text(row: usize, col: usize, text: &str) -> Command {
    Command::Edit(EditCommand::SetText {
        row,
        col,
        text: text.to_string(),
    })
}

fn undo() -> Command {
    Command::Edit(EditCommand::Undo)
}

fn redo() -> Command {
    Command::Edit(EditCommand::Redo)
}

/// Run `setup`, then `command`, and check that undo restores the state before `command` and
/// redo restores the state after it.
fn assert_round_trip(setup: &[Command], command: Command) {
    let mut executor = CommandExecutor::with_defaults();
    executor.execute_batch(setup.to_vec()).unwrap();
    let before: Snapshot = executor.snapshot().clone();

    let result = executor.execute(command.clone()).unwrap();
    assert!(result.is_success(), "{command:?} did not apply: {result:?}");
    let after = executor.snapshot().clone();
    assert_ne!(before, after);

    executor.execute(undo()).unwrap();
    assert_eq!(executor.snapshot(), &before);

    executor.execute(redo()).unwrap();
    assert_eq!(executor.snapshot(), &after);
}

#[test]
fn test_undo_redo_set_text() {
    let mut executor = CommandExecutor::with_defaults();

    executor.execute(set_text(0, 0, "a")).unwrap();
    assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "a");
    assert!(executor.can_undo());
    assert!(!executor.can_redo());

    executor.execute(undo()).unwrap();
    assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "");
    assert!(!executor.can_undo());
    assert!(executor.can_redo());

    executor.execute(redo()).unwrap();
    assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "a");
    assert!(executor.can_undo());
    assert!(!executor.can_redo());
}

#[test]
fn test_round_trip_every_mutation() {
    let select = Command::Selection(SelectionCommand::Select { row: 1, col: 1 });

    assert_round_trip(&[], set_text(2, 3, "hello"));
    assert_round_trip(
        &[],
        Command::Edit(EditCommand::UpdateCell {
            row: 0,
            col: 0,
            update: CellUpdate {
                text: Some("x".to_string()),
                bold: Some(true),
                ..CellUpdate::default()
            },
        }),
    );
    assert_round_trip(&[], Command::Edit(EditCommand::InsertRow));
    assert_round_trip(&[], Command::Edit(EditCommand::InsertColumn));
    assert_round_trip(&[], Command::Edit(EditCommand::InsertTemplatedBlock));
    assert_round_trip(
        &[],
        Command::Edit(EditCommand::SetHeader {
            text: "Inventory".to_string(),
        }),
    );
    assert_round_trip(&[select.clone()], Command::Format(FormatCommand::ToggleBold));
    assert_round_trip(
        &[select.clone()],
        Command::Format(FormatCommand::SetTextColor { color: Color::BLUE }),
    );
    assert_round_trip(
        &[select.clone()],
        Command::Format(FormatCommand::SetBackgroundColor {
            color: Color::rgb(0xfe, 0xf0, 0x8a),
        }),
    );
    assert_round_trip(
        &[
            select,
            Command::Format(FormatCommand::ToggleBold),
            Command::Format(FormatCommand::CopyFormat),
        ],
        Command::Format(FormatCommand::ApplyFormat { row: 4, col: 4 }),
    );
}

#[test]
fn test_undo_sequence_restores_history_in_reverse() {
    let mut executor = CommandExecutor::with_defaults();
    let mut states = vec![executor.snapshot().clone()];

    for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
        executor.execute(set_text(i, i, text)).unwrap();
        states.push(executor.snapshot().clone());
    }
    assert_eq!(executor.undo_depth(), 3);

    for expected in states.iter().rev().skip(1) {
        executor.execute(undo()).unwrap();
        assert_eq!(executor.snapshot(), expected);
    }
    assert_eq!(executor.redo_depth(), 3);
}

#[test]
fn test_new_mutation_clears_redo() {
    let mut executor = CommandExecutor::with_defaults();
    executor.execute(set_text(0, 0, "a")).unwrap();
    executor.execute(set_text(0, 0, "b")).unwrap();

    executor.execute(undo()).unwrap();
    assert!(executor.can_redo());

    executor.execute(set_text(0, 0, "c")).unwrap();
    assert!(!executor.can_redo());

    let result = executor.execute(redo()).unwrap();
    assert!(matches!(result, CommandResult::Noop(NoopReason::NothingToRedo)));
    assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "c");
}

#[test]
fn test_empty_history_is_noop() {
    let mut executor = CommandExecutor::with_defaults();
    let before = executor.snapshot().clone();

    let result = executor.execute(undo()).unwrap();
    assert!(matches!(result, CommandResult::Noop(NoopReason::NothingToUndo)));
    let result = executor.execute(redo()).unwrap();
    assert!(matches!(result, CommandResult::Noop(NoopReason::NothingToRedo)));

    assert_eq!(executor.snapshot(), &before);
}

#[test]
fn test_noops_do_not_record_history() {
    let mut executor = CommandExecutor::with_defaults();

    executor.execute(set_text(99, 0, "x")).unwrap();
    executor.execute(set_text(0, 0, "")).unwrap();
    executor
        .execute(Command::Format(FormatCommand::ToggleBold))
        .unwrap();
    executor
        .execute(Command::Format(FormatCommand::ApplyFormat { row: 0, col: 0 }))
        .unwrap();
    let header = executor.snapshot().header().to_string();
    executor
        .execute(Command::Edit(EditCommand::SetHeader { text: header }))
        .unwrap();

    assert_eq!(executor.undo_depth(), 0);
}

#[test]
fn test_history_limit_drops_oldest() {
    let config = GridConfig {
        history_limit: 3,
        ..GridConfig::default()
    };
    let mut executor = CommandExecutor::new(config, &SystemClock).unwrap();

    for i in 0..5 {
        executor.execute(set_text(0, 0, &i.to_string())).unwrap();
    }
    assert_eq!(executor.undo_depth(), 3);

    while executor.can_undo() {
        executor.execute(undo()).unwrap();
    }
    // The two oldest steps ("" -> "0" -> "1") fell off the stack.
    assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "1");
}

#[test]
fn test_clean_point_tracks_export() {
    let mut executor = CommandExecutor::with_defaults();
    assert!(executor.is_clean());

    executor.execute(set_text(0, 0, "a")).unwrap();
    assert!(!executor.is_clean());

    executor.mark_clean();
    assert!(executor.is_clean());

    executor.execute(undo()).unwrap();
    assert!(!executor.is_clean());
    executor.execute(redo()).unwrap();
    assert!(executor.is_clean());
}

#[test]
fn test_untracked_column_width_is_not_undone() {
    let mut executor = CommandExecutor::with_defaults();
    executor.execute(set_text(0, 0, "a")).unwrap();
    executor
        .execute(Command::View(ViewCommand::SetColumnWidth { col: 2, width: 300 }))
        .unwrap();
    assert_eq!(executor.undo_depth(), 1);

    executor.execute(undo()).unwrap();
    // Undo restores the snapshot recorded before the edit, which predates the resize.
    assert_eq!(executor.snapshot().grid().col_width(2), Some(120));
}
