use std::collections::HashSet;

use crate::model::{Task, TaskType};

/// Rows to lay out: collapsed projects' descendants removed, then ordered by
/// `display_order` (tasks without one go last, keeping their input order).
pub fn prepare(tasks: &[Task]) -> Vec<Task> {
    let mut visible = remove_hidden(tasks);
    sort_by_display_order(&mut visible);
    visible
}

/// Drop every descendant of a project whose `hide_children` is set.
pub fn remove_hidden(tasks: &[Task]) -> Vec<Task> {
    let mut hidden: HashSet<&str> = HashSet::new();
    for collapsed in tasks
        .iter()
        .filter(|t| t.task_type == TaskType::Project && t.hide_children == Some(true))
    {
        collect_descendants(tasks, collapsed, &mut hidden);
    }
    if !hidden.is_empty() {
        tracing::debug!(hidden = hidden.len(), "hiding collapsed children");
    }
    tasks
        .iter()
        .filter(|t| !hidden.contains(t.id.as_str()))
        .cloned()
        .collect()
}

pub fn sort_by_display_order(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.display_order.unwrap_or(u32::MAX));
}

fn collect_descendants<'a>(tasks: &'a [Task], root: &'a Task, hidden: &mut HashSet<&'a str>) {
    let mut stack = vec![root];
    while let Some(parent) = stack.pop() {
        for task in tasks {
            if task.id != root.id && is_child_of(task, parent) && hidden.insert(task.id.as_str()) {
                stack.push(task);
            }
        }
    }
}

/// Projects own tasks through `project`; other tasks own their dependents.
fn is_child_of(task: &Task, parent: &Task) -> bool {
    match parent.task_type {
        TaskType::Project => task.project.as_deref() == Some(parent.id.as_str()),
        _ => task.dependencies.iter().any(|d| *d == parent.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn collapsed_project_hides_nested_children() {
        let mut project = Task::new_project("p", "Phase", day(4), day(15));
        project.hide_children = Some(true);
        let mut member = Task::new("a", "A", day(4), day(6));
        member.project = Some("p".into());
        let follower = Task::new("b", "B", day(7), day(8)).with_dependency("a");
        let other = Task::new("c", "C", day(7), day(8));

        let visible = remove_hidden(&[project, member, follower, other]);
        assert_eq!(ids(&visible), vec!["p", "c"]);
    }

    #[test]
    fn display_order_sort_is_stable() {
        let mut tasks = vec![
            Task::new("x", "X", day(4), day(5)),
            Task::new("y", "Y", day(4), day(5)),
            Task::new("z", "Z", day(4), day(5)),
        ];
        tasks[2].display_order = Some(1);
        let sorted = prepare(&tasks);
        assert_eq!(ids(&sorted), vec!["z", "x", "y"]);
    }
}
