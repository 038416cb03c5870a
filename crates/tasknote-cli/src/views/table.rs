use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use tasknote_core::date::CalendarDate;
use tasknote_core::models::{
    CalendarEvent, EventKind, InstanceStatus, TaskOccurrenceView, TimeCategory,
};

pub fn display_events(events: &[CalendarEvent], tz: &Tz) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Time", "Kind", "Task", "Status", "When"]);

    for event in events {
        let mut row = Row::new();
        let local_start = event.start.with_timezone(tz);
        let day = if event.all_day {
            CalendarDate::from_utc(event.start).to_string()
        } else {
            local_start.format("%Y-%m-%d").to_string()
        };
        row.add_cell(Cell::new(day));
        row.add_cell(Cell::new(time_text(event, tz)));

        let kind_cell = match event.kind {
            EventKind::RecurringInstance => Cell::new("↻ recurring").fg(Color::Cyan),
            EventKind::ScheduledDate => Cell::new("scheduled"),
            EventKind::DueDate => Cell::new("due").fg(Color::Magenta),
            EventKind::TimeEntry => Cell::new("time entry").fg(Color::DarkGrey),
        };
        row.add_cell(kind_cell);

        let mut title_cell = Cell::new(&event.title);
        match event.status {
            Some(InstanceStatus::Completed) => {
                title_cell = title_cell
                    .add_attribute(Attribute::CrossedOut)
                    .fg(Color::DarkGrey);
            }
            Some(InstanceStatus::Skipped) => {
                title_cell = title_cell.add_attribute(Attribute::Italic).fg(Color::DarkGrey);
            }
            _ => {}
        }
        row.add_cell(title_cell);

        row.add_cell(match event.status {
            Some(InstanceStatus::Completed) => Cell::new("completed").fg(Color::Green),
            Some(InstanceStatus::Skipped) => Cell::new("skipped").fg(Color::DarkGrey),
            Some(InstanceStatus::Pending) => Cell::new("pending"),
            None => Cell::new(""),
        });

        row.add_cell(match event.time_category {
            Some(TimeCategory::Overdue) if event.status != Some(InstanceStatus::Completed) => {
                Cell::new(TimeCategory::Overdue).fg(Color::Red)
            }
            Some(TimeCategory::Today) => Cell::new(TimeCategory::Today).fg(Color::Yellow),
            Some(category) => Cell::new(category),
            None => Cell::new(""),
        });
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(occurrences: &[TaskOccurrenceView], today: CalendarDate) {
    if occurrences.is_empty() {
        println!("No upcoming occurrences (series may have ended)");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Weekday", "Status", "When"]);

    for (i, occurrence) in occurrences.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(i + 1));
        row.add_cell(Cell::new(occurrence.date));
        row.add_cell(Cell::new(occurrence.date.weekday()));
        row.add_cell(match occurrence.status {
            InstanceStatus::Completed => Cell::new("completed").fg(Color::Green),
            InstanceStatus::Skipped => Cell::new("skipped").fg(Color::DarkGrey),
            InstanceStatus::Pending => Cell::new("pending"),
        });
        row.add_cell(Cell::new(TimeCategory::classify(occurrence.date, today)));
        table.add_row(row);
    }

    println!("{table}");
}

fn time_text(event: &CalendarEvent, tz: &Tz) -> String {
    if event.all_day {
        return "all day".to_string();
    }
    let start = clock(event.start, tz);
    match event.end {
        Some(end) => format!("{} - {}", start, clock(end, tz)),
        None => start,
    }
}

fn clock(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn event(all_day: bool, end: Option<DateTime<Utc>>) -> CalendarEvent {
        CalendarEvent {
            id: "timeentry-x".to_string(),
            task_id: Uuid::nil(),
            title: "Writing".to_string(),
            start: Utc.with_ymd_and_hms(2025, 1, 3, 0, 15, 0).unwrap(),
            end,
            all_day,
            kind: EventKind::TimeEntry,
            status: None,
            time_category: None,
        }
    }

    #[test]
    fn test_time_text_uses_local_clock() {
        let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 3, 1, 0, 0).unwrap();
        assert_eq!(time_text(&event(false, Some(end)), &tokyo), "09:15 - 10:00");
        assert_eq!(time_text(&event(false, None), &tokyo), "09:15");
        assert_eq!(time_text(&event(true, None), &tokyo), "all day");
    }
}
