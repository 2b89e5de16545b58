use pretty_assertions::assert_eq;
use tablenote_core::mutation::{TEMPLATE_HEADER_FORMAT, TEMPLATE_HEADER_LABELS};
use tablenote_core::{
    CellFormat, Command, CommandExecutor, EditCommand, GridConfig, SystemClock,
};

fn insert_block(executor: &mut CommandExecutor) {
    executor
        .execute(Command::Edit(EditCommand::InsertTemplatedBlock))
        .unwrap();
}

fn texts(executor: &CommandExecutor, row: usize) -> Vec<String> {
    executor
        .snapshot()
        .grid()
        .row(row)
        .unwrap()
        .iter()
        .map(|cell| cell.text.clone())
        .collect()
}

#[test]
fn block_on_default_grid() {
    let mut executor = CommandExecutor::with_defaults();
    executor
        .execute(Command::Edit(EditCommand::SetText {
            row: 0,
            col: 5,
            text: "kept".to_string(),
        }))
        .unwrap();
    insert_block(&mut executor);

    let snapshot = executor.snapshot();
    assert_eq!(snapshot.row_count(), 8);
    assert_eq!(snapshot.col_count(), 6);
    assert_eq!(
        texts(&executor, 0),
        vec!["Items", "Get", "Lost", "Total", "", "kept"]
    );
    assert_eq!(texts(&executor, 1), vec!["MB Qt (Pro)", "", "", "", "", ""]);
    assert_eq!(texts(&executor, 2), vec!["MB Qt (N)", "", "", "", "", ""]);

    for col in 0..TEMPLATE_HEADER_LABELS.len() {
        assert_eq!(snapshot.cell(0, col).unwrap().format(), TEMPLATE_HEADER_FORMAT);
    }
    assert_eq!(snapshot.cell(0, 5).unwrap().format(), CellFormat::default());
    assert_eq!(snapshot.cell(1, 0).unwrap().format(), CellFormat::default());
    assert_eq!(snapshot.row_heights(), &[40; 8]);
}

#[test]
fn block_is_one_undo_step() {
    let mut executor = CommandExecutor::with_defaults();
    let before = executor.snapshot().clone();
    insert_block(&mut executor);
    assert_eq!(executor.undo_depth(), 1);

    executor.execute(Command::Edit(EditCommand::Undo)).unwrap();
    assert_eq!(executor.snapshot(), &before);
}

#[test]
fn block_widens_label_column() {
    let mut executor = CommandExecutor::with_defaults();
    insert_block(&mut executor);
    // "MB Qt (Pro)": 11 cells * 9 px + 30 px
    assert_eq!(executor.snapshot().col_widths(), &[129, 120, 120, 120, 120, 120]);
}

#[test]
fn block_pads_narrow_grid() {
    let config = GridConfig {
        rows: 1,
        cols: 2,
        ..GridConfig::default()
    };
    let mut executor = CommandExecutor::new(config, &SystemClock).unwrap();
    insert_block(&mut executor);

    let snapshot = executor.snapshot();
    assert_eq!(snapshot.col_count(), 4);
    assert_eq!(snapshot.row_count(), 3);
    assert!(snapshot.grid().is_rectangular());
    assert_eq!(texts(&executor, 2), vec!["MB Qt (N)", "", "", ""]);
}

#[test]
fn repeated_blocks_stack_under_header_row() {
    let mut executor = CommandExecutor::with_defaults();
    insert_block(&mut executor);
    insert_block(&mut executor);

    assert_eq!(executor.snapshot().row_count(), 10);
    assert_eq!(texts(&executor, 1)[0], "MB Qt (Pro)");
    assert_eq!(texts(&executor, 3)[0], "MB Qt (Pro)");
    assert_eq!(texts(&executor, 4)[0], "MB Qt (N)");
}
