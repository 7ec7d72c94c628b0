use chrono::NaiveDate;
use rstest::rstest;
use tempfile::tempdir;

use gantt_layout::config::ChartConfig;
use gantt_layout::io::{export_csv, import_csv, import_csv_str, load_any, load_tasks, save_tasks};
use gantt_layout::model::calendar::{end_of_day, start_of_day};
use gantt_layout::model::{Direction, Task, TaskType, WorkCalendar};
use gantt_layout::GanttError;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[rstest]
fn imports_loose_headers_and_parents() {
    let csv = "\
Task Label,Start Date,End Date,Status,Parent Task
Plan,2024-03-04,2024-03-06,Done,
Build,05/03/2024,08/03/2024,40%,Plan
Ship,2024-03-11,2024-03-11,,
";
    let (tasks, skipped) = import_csv_str(csv).unwrap();
    assert_eq!(skipped, 0);
    assert_eq!(tasks.len(), 3);

    let plan = &tasks[0];
    assert_eq!(plan.progress, 100.0);
    assert_eq!(plan.start, start_of_day(day(4)));
    assert_eq!(plan.end, end_of_day(day(6)));

    let build = &tasks[1];
    assert_eq!(build.progress, 40.0);
    assert_eq!(build.start, start_of_day(day(5)));
    assert_eq!(build.parent_id(), Some(plan.id.as_str()));

    assert_eq!(tasks[2].task_type, TaskType::Milestone);
    assert_eq!(tasks[2].end, tasks[2].start);
}

#[rstest]
fn skips_rows_with_bad_dates() {
    let csv = "name;start;end\nGood;2024-03-04;2024-03-05\nBad;someday;2024-03-05\n";
    let (tasks, skipped) = import_csv_str(csv).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(skipped, 1);
}

#[rstest]
#[case::missing_end("name;start\nA;2024-03-04\n")]
#[case::unknown_headers("foo,bar,baz\n1,2,3\n")]
fn rejects_files_without_required_columns(#[case] csv: &str) {
    assert!(matches!(
        import_csv_str(csv),
        Err(GanttError::MissingColumns { .. })
    ));
}

#[rstest]
fn all_rows_skipped_is_an_error() {
    let csv = "name;start;end\nBad;never;2024-03-05\n";
    assert!(matches!(
        import_csv_str(csv),
        Err(GanttError::NoTasks { skipped: 1 })
    ));
}

#[rstest]
fn csv_export_reads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let mut phase = Task::new_project("p", "Phase", day(4), day(15));
    phase.hide_children = Some(true);
    phase.display_order = Some(2);
    phase.styles.background_color = Some("#7db59a".to_string());
    phase.styles.progress_selected_color = Some("#f7bb53".to_string());

    let mut design = Task::new("a", "Design", day(4), day(6))
        .with_progress(30.0)
        .with_days_duration(3)
        .with_dependency("p");
    design.project = Some("p".to_string());
    design.display_order = Some(1);

    let tasks = vec![
        phase,
        design,
        Task::new_milestone("m", "Review", day(8)).with_dependency("a"),
    ];

    assert_eq!(export_csv(&tasks, &path).unwrap(), 3);
    let (back, skipped) = import_csv(&path).unwrap();
    assert_eq!(skipped, 0);
    assert_eq!(back.len(), 3);

    for (original, read) in tasks.iter().zip(&back) {
        assert_eq!(read.id, original.id);
        assert_eq!(read.name, original.name);
        assert_eq!(read.task_type, original.task_type);
        assert_eq!(read.start, original.start);
        assert_eq!(read.end, original.end);
        assert_eq!(read.progress, original.progress);
        assert_eq!(read.days_duration, original.days_duration);
        assert_eq!(read.dependencies, original.dependencies);
        assert_eq!(read.project, original.project);
        assert_eq!(read.display_order, original.display_order);
        assert_eq!(read.hide_children, original.hide_children);
        assert_eq!(read.styles, original.styles);
    }
}

#[rstest]
fn json_round_trip_and_dispatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let mut task = Task::new("a", "Design", day(4), day(6)).with_progress(30.0);
    task.start_cache = Some(start_of_day(day(3)));
    let tasks = vec![task, Task::new_milestone("m", "Review", day(8))];

    save_tasks(&tasks, &path).unwrap();
    assert_eq!(load_tasks(&path).unwrap(), tasks);
    assert_eq!(load_any(&path).unwrap(), tasks);
}

#[rstest]
fn json_accepts_bare_dates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        r#"[{"id": "a", "name": "A", "start": "2024-03-04", "end": "2024-03-05T23:59:59"}]"#,
    )
    .unwrap();

    let tasks = load_tasks(&path).unwrap();
    assert_eq!(tasks[0].start, start_of_day(day(4)));
    assert_eq!(tasks[0].end, end_of_day(day(5)));
    assert_eq!(tasks[0].task_type, TaskType::Task);
}

#[rstest]
fn missing_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.json");
    match load_tasks(&path) {
        Err(GanttError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an io error, got {:?}", other),
    }
}

#[rstest]
fn config_saves_and_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = ChartConfig {
        column_width: 45.0,
        exclude_weekdays: WorkCalendar::weekends(),
        direction: Direction::Rtl,
        ..ChartConfig::default()
    };

    config.save(&path).unwrap();
    assert_eq!(ChartConfig::load_or_default(Some(&path)).unwrap(), config);
}

#[rstest]
fn partial_config_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"row_height": 40, "exclude_weekdays": [0, 6]}"#).unwrap();

    let config = ChartConfig::load(&path).unwrap();
    assert_eq!(config.row_height, 40.0);
    assert_eq!(config.column_width, 60.0);
    assert_eq!(config.task_height(), 24.0);
    assert!(config.exclude_weekdays.is_active());
}
