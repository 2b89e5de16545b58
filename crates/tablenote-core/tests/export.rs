use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tablenote_core::{
    Cell, Command, CommandExecutor, CommandResult, EXPORT_FILE_NAME, EditCommand, ExportAdapter,
    ExportError, ExportJob, ExportedImage, GridConfig, GridStateManager, Snapshot, SystemClock,
    ViewCommand, VisibleSnapshot, save_export,
};

/// Encodes the visible shape instead of pixels.
#[derive(Default, Clone)]
struct ShapeAdapter {
    seen: Arc<Mutex<Vec<VisibleSnapshot>>>,
}

impl ExportAdapter for ShapeAdapter {
    fn export(&self, snapshot: &VisibleSnapshot) -> Result<Vec<u8>, ExportError> {
        self.seen.lock().unwrap().push(snapshot.clone());
        Ok(format!("{}x{}", snapshot.row_count(), snapshot.col_count()).into_bytes())
    }
}

struct FailingAdapter;

impl ExportAdapter for FailingAdapter {
    fn export(&self, _snapshot: &VisibleSnapshot) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Render("no fonts".to_string()))
    }
}

fn three_by_three() -> CommandExecutor {
    let config = GridConfig {
        rows: 3,
        cols: 3,
        ..GridConfig::default()
    };
    CommandExecutor::new(config, &SystemClock).unwrap()
}

fn set_text(row: usize, col: usize, text: &str) -> Command {
    Command::Edit(EditCommand::SetText {
        row,
        col,
        text: text.to_string(),
    })
}

fn wait_for(manager: &mut GridStateManager) -> Result<ExportedImage, ExportError> {
    for _ in 0..500 {
        if let Some(result) = manager.poll_export() {
            return result;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("export did not finish");
}

#[test]
fn single_cell_exports_one_by_one() {
    let mut executor = three_by_three();
    executor.execute(set_text(1, 1, "X")).unwrap();

    let visible = executor.visible_snapshot();
    assert_eq!(visible.row_count(), 1);
    assert_eq!(visible.col_count(), 1);
    assert_eq!(visible.cells, vec![vec![executor.snapshot().cell(1, 1).unwrap().clone()]]);
    assert_eq!(visible.header, executor.snapshot().header());
}

#[test]
fn retained_rows_keep_their_own_heights() {
    let mut executor = three_by_three();
    executor.execute(set_text(2, 0, "last")).unwrap();
    assert_eq!(executor.visible_snapshot().row_heights, vec![40]);

    let mut grid = executor.snapshot().grid().clone();
    grid.push_row(90);
    grid.set_cell(3, 2, Cell::new("tall"));
    let visible = VisibleSnapshot::from_snapshot(&Snapshot::new("h", grid));
    assert_eq!(visible.row_heights, vec![40, 90]);
    assert_eq!(visible.col_count(), 2);
}

#[test]
fn visible_snapshot_command_matches_query() {
    let mut executor = three_by_three();
    executor.execute(set_text(0, 2, "corner")).unwrap();
    let result = executor
        .execute(Command::View(ViewCommand::GetVisibleSnapshot))
        .unwrap();
    match result {
        CommandResult::Visible(visible) => assert_eq!(visible, executor.visible_snapshot()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn synchronous_export_marks_clean_point() {
    let mut executor = three_by_three();
    executor.execute(set_text(0, 0, "a")).unwrap();
    assert!(!executor.is_clean());

    let image = executor.export(&ShapeAdapter::default()).unwrap();
    assert_eq!(image.file_name, EXPORT_FILE_NAME);
    assert_eq!(image.bytes, b"1x1");
    assert!(executor.is_clean());
}

#[test]
fn failed_export_leaves_state_untouched() {
    let mut executor = three_by_three();
    executor.execute(set_text(0, 0, "a")).unwrap();
    let before = executor.snapshot().clone();

    let result = executor.export(&FailingAdapter);
    assert!(result.is_err());
    assert_eq!(executor.snapshot(), &before);
    assert!(!executor.is_clean());
}

#[test]
fn background_job_works_on_frozen_copy() {
    let mut executor = three_by_three();
    executor.execute(set_text(0, 0, "before")).unwrap();
    let adapter = ShapeAdapter::default();
    let job = executor.spawn_export(adapter.clone());

    executor.execute(set_text(2, 2, "after")).unwrap();
    let image = job.wait().unwrap();

    assert_eq!(image.bytes, b"1x1");
    let seen = adapter.seen.lock().unwrap();
    assert_eq!(seen[0].cells[0][0].text, "before");
}

#[test]
fn job_reports_adapter_failure() {
    let executor = three_by_three();
    let job = ExportJob::spawn(executor.visible_snapshot(), FailingAdapter);
    match job.wait() {
        Err(ExportError::Render(message)) => assert_eq!(message, "no fonts"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn manager_marks_clean_only_when_unchanged() {
    let mut manager = GridStateManager::with_defaults();
    manager.execute(set_text(0, 0, "a")).unwrap();

    manager.start_export(ShapeAdapter::default());
    assert!(manager.is_exporting());
    wait_for(&mut manager).unwrap();
    assert!(!manager.is_exporting());
    assert!(!manager.is_modified());

    manager.execute(set_text(0, 0, "b")).unwrap();
    manager.start_export(ShapeAdapter::default());
    manager.execute(set_text(0, 0, "c")).unwrap();
    wait_for(&mut manager).unwrap();
    assert!(manager.is_modified());
}

#[test]
fn save_writes_table_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = save_export(b"\x89PNG", dir.path()).unwrap();
    assert_eq!(path, dir.path().join("table.png"));
    assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
}
