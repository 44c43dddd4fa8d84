use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, Customer, CustomerPatch, SlotTime,
};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone";
const APPOINTMENT_COLUMNS: &str = "id, customer_id, customer_name, date, time, comment, image_url, \
     status, created_at, seen_by_admin, confirmed_by_customer";

// ── Customers ──

pub fn list_customers(conn: &Connection) -> anyhow::Result<Vec<Customer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY rowid ASC"
    ))?;
    let rows = stmt.query_map([], parse_customer_row)?;

    let mut customers = vec![];
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

pub fn get_customer_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Customer>> {
    let customer = conn
        .query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
            params![id],
            parse_customer_row,
        )
        .optional()?;
    Ok(customer)
}

/// First customer with this exact name. Duplicate names are not expected but
/// the oldest record wins if they exist.
pub fn get_customer_by_name(conn: &Connection, name: &str) -> anyhow::Result<Option<Customer>> {
    let customer = conn
        .query_row(
            &format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE name = ?1 ORDER BY rowid ASC LIMIT 1"
            ),
            params![name],
            parse_customer_row,
        )
        .optional()?;
    Ok(customer)
}

pub fn insert_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name, email, phone) VALUES (?1, ?2, ?3, ?4)",
        params![customer.id, customer.name, customer.email, customer.phone],
    )
    .context("failed to insert customer")?;
    Ok(())
}

pub fn update_customer(
    conn: &Connection,
    id: &str,
    patch: &CustomerPatch,
) -> anyhow::Result<Option<Customer>> {
    let mut sets: Vec<(&str, Box<dyn ToSql>)> = vec![];
    if let Some(name) = &patch.name {
        sets.push(("name", Box::new(name.clone())));
    }
    if let Some(email) = &patch.email {
        sets.push(("email", Box::new(email.clone())));
    }
    if let Some(phone) = &patch.phone {
        sets.push(("phone", Box::new(phone.clone())));
    }

    if !sets.is_empty() {
        execute_update(conn, "customers", id, sets).context("failed to update customer")?;
    }
    get_customer_by_id(conn, id)
}

pub fn delete_customer(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM customers WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Appointments ──

pub fn list_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date ASC, time ASC"
    ))?;
    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id],
            |row| Ok(parse_appointment_row(row)),
        )
        .optional()?;

    result.transpose()
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, customer_id, customer_name, date, time, comment, image_url, status, created_at, seen_by_admin, confirmed_by_customer)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appt.id,
            appt.customer_id,
            appt.customer_name,
            appt.date.format("%Y-%m-%d").to_string(),
            appt.time.to_string(),
            appt.comment,
            appt.image_url,
            appt.status.as_str(),
            appt.created_at.to_rfc3339(),
            appt.seen_by_admin,
            appt.confirmed_by_customer,
        ],
    )
    .context("failed to insert appointment")?;
    Ok(())
}

pub fn update_appointment(
    conn: &Connection,
    id: &str,
    patch: &AppointmentPatch,
) -> anyhow::Result<Option<Appointment>> {
    let mut sets: Vec<(&str, Box<dyn ToSql>)> = vec![];
    if let Some(date) = patch.date {
        sets.push(("date", Box::new(date.format("%Y-%m-%d").to_string())));
    }
    if let Some(time) = patch.time {
        sets.push(("time", Box::new(time.to_string())));
    }
    if let Some(comment) = &patch.comment {
        sets.push(("comment", Box::new(comment.clone())));
    }
    if let Some(image_url) = &patch.image_url {
        sets.push(("image_url", Box::new(image_url.clone())));
    }
    if let Some(status) = patch.status {
        sets.push(("status", Box::new(status.as_str())));
    }
    if let Some(seen) = patch.seen_by_admin {
        sets.push(("seen_by_admin", Box::new(seen)));
    }
    if let Some(confirmed) = patch.confirmed_by_customer {
        sets.push(("confirmed_by_customer", Box::new(confirmed)));
    }

    if !sets.is_empty() {
        execute_update(conn, "appointments", id, sets).context("failed to update appointment")?;
    }
    get_appointment(conn, id)
}

pub fn delete_appointment(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn execute_update(
    conn: &Connection,
    table: &str,
    id: &str,
    sets: Vec<(&str, Box<dyn ToSql>)>,
) -> rusqlite::Result<usize> {
    let assignments: Vec<String> = sets
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE {table} SET {} WHERE id = ?{}",
        assignments.join(", "),
        sets.len() + 1
    );

    let id_param: Box<dyn ToSql> = Box::new(id.to_string());
    let mut params_refs: Vec<&dyn ToSql> = sets.iter().map(|(_, p)| p.as_ref()).collect();
    params_refs.push(id_param.as_ref());

    conn.execute(&sql, params_refs.as_slice())
}

fn parse_customer_row(row: &rusqlite::Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
    })
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let id: String = row.get(0)?;
    let customer_id: String = row.get(1)?;
    let customer_name: String = row.get(2)?;
    let date_str: String = row.get(3)?;
    let time_str: String = row.get(4)?;
    let comment: String = row.get(5)?;
    let image_url: Option<String> = row.get(6)?;
    let status_str: Option<String> = row.get(7)?;
    let created_at_str: Option<String> = row.get(8)?;
    let seen_by_admin: Option<bool> = row.get(9)?;
    let confirmed_by_customer: Option<bool> = row.get(10)?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .with_context(|| format!("appointment {id} has invalid date '{date_str}'"))?;
    let time = SlotTime::parse(&time_str)
        .map_err(|e| anyhow::anyhow!("appointment {id}: {e}"))?;

    // Records from before the lifecycle existed were implicitly confirmed.
    let status = match status_str {
        Some(s) => AppointmentStatus::parse(&s)
            .with_context(|| format!("appointment {id} has unknown status '{s}'"))?,
        None => AppointmentStatus::Confirmed,
    };
    let created_at = created_at_str
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Ok(Appointment {
        id,
        customer_id,
        customer_name,
        date,
        time,
        comment,
        image_url,
        status,
        created_at,
        seen_by_admin: seen_by_admin.unwrap_or(false),
        confirmed_by_customer: confirmed_by_customer
            .unwrap_or(status == AppointmentStatus::Confirmed),
    })
}
