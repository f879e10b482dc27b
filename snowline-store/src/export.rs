//! Spreadsheet export of bookings and lessons for the back office.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::HashMap;
use uuid::Uuid;

use snowline_order::{Booking, Lesson, Teacher};

const BOOKING_HEADERS: [&str; 12] = [
    "ID", "Customer", "Email", "Phone", "Start", "End", "Days", "Items", "Status", "Total", "Notes", "Created",
];

const LESSON_HEADERS: [&str; 16] = [
    "ID", "Customer", "Email", "Phone", "Date", "Start", "Hours", "Discipline", "Level", "Language", "People",
    "Participants", "Teacher", "Status", "Total", "Notes",
];

fn amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_bookings(sheet: &mut Worksheet, bookings: &[Booking], money: &Format) -> Result<(), XlsxError> {
    for (i, booking) in bookings.iter().enumerate() {
        let row = i as u32 + 1;
        let items = booking
            .items
            .iter()
            .map(|item| match &item.size {
                Some(size) => format!("{} ({})", item.name, size),
                None => item.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        sheet.write_string(row, 0, booking.id.to_string())?;
        sheet.write_string(row, 1, &booking.contact.name)?;
        sheet.write_string(row, 2, booking.contact.email())?;
        sheet.write_string(row, 3, booking.contact.phone())?;
        sheet.write_string(row, 4, booking.start_date.to_string())?;
        sheet.write_string(row, 5, booking.end_date.to_string())?;
        sheet.write_number(row, 6, booking.days())?;
        sheet.write_string(row, 7, items)?;
        sheet.write_string(row, 8, booking.status.as_str())?;
        sheet.write_number_with_format(row, 9, amount(booking.total_price_cents), money)?;
        sheet.write_string(row, 10, booking.notes.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 11, booking.created_at.format("%Y-%m-%d %H:%M").to_string())?;
    }
    Ok(())
}

fn write_lessons(
    sheet: &mut Worksheet,
    lessons: &[Lesson],
    teachers: &HashMap<Uuid, &str>,
    money: &Format,
) -> Result<(), XlsxError> {
    for (i, lesson) in lessons.iter().enumerate() {
        let row = i as u32 + 1;
        let participants = lesson
            .participants
            .iter()
            .map(|p| match p.age {
                Some(age) => format!("{} ({})", p.name, age),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let teacher = lesson
            .teacher_id
            .and_then(|id| teachers.get(&id).copied())
            .unwrap_or_default();

        sheet.write_string(row, 0, lesson.id.to_string())?;
        sheet.write_string(row, 1, &lesson.contact.name)?;
        sheet.write_string(row, 2, lesson.contact.email())?;
        sheet.write_string(row, 3, lesson.contact.phone())?;
        sheet.write_string(row, 4, lesson.date.to_string())?;
        sheet.write_string(row, 5, lesson.start_time.format("%H:%M").to_string())?;
        sheet.write_number(row, 6, lesson.duration_hours)?;
        sheet.write_string(row, 7, lesson.discipline.as_str())?;
        sheet.write_string(row, 8, lesson.level.as_str())?;
        sheet.write_string(row, 9, &lesson.language)?;
        sheet.write_number(row, 10, lesson.people())?;
        sheet.write_string(row, 11, participants)?;
        sheet.write_string(row, 12, teacher)?;
        sheet.write_string(row, 13, lesson.status.as_str())?;
        sheet.write_number_with_format(row, 14, amount(lesson.total_price_cents), money)?;
        sheet.write_string(row, 15, lesson.notes.as_deref().unwrap_or_default())?;
    }
    Ok(())
}

/// Build an `.xlsx` workbook with a "Bookings" and a "Lessons" sheet
pub fn export_workbook(bookings: &[Booking], lessons: &[Lesson], teachers: &[Teacher]) -> Result<Vec<u8>, XlsxError> {
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");
    let teacher_names: HashMap<Uuid, &str> = teachers.iter().map(|t| (t.id, t.name.as_str())).collect();

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("Bookings")?;
    write_headers(sheet, &BOOKING_HEADERS, &bold)?;
    write_bookings(sheet, bookings, &money)?;
    sheet.autofit();

    let sheet = workbook.add_worksheet().set_name("Lessons")?;
    write_headers(sheet, &LESSON_HEADERS, &bold)?;
    write_lessons(sheet, lessons, &teacher_names, &money)?;
    sheet.autofit();

    workbook.save_to_buffer()
}
