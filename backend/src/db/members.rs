//! Read-side queries over members and their birth/energy rows.

use aidoshop_common::model::energy::{EnergyMap, ZodiacSign};
use aidoshop_common::model::member::{BirthData, Member};
use aidoshop_common::requests::MemberFilter;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::AppError;

/// Upper bound on rows shown by the admin members page.
pub const LIST_LIMIT: usize = 1000;

const MEMBER_COLUMNS: &str = "id, full_name, email, gender, consent_to_emails, focus_areas, \
                              source_page, ip_address, country_code, created_at";

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        gender: row.get(3)?,
        consent_to_emails: row.get(4)?,
        focus_areas: row.get(5)?,
        source_page: row.get(6)?,
        ip_address: row.get(7)?,
        country_code: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub fn find_id_by_email(conn: &Connection, email: &str) -> Result<Option<i64>, AppError> {
    let id = conn
        .query_row(
            "SELECT id FROM members WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_member(conn: &Connection, id: i64) -> Result<Option<Member>, AppError> {
    let sql = format!("SELECT {} FROM members WHERE id = ?1", MEMBER_COLUMNS);
    let member = conn
        .query_row(&sql, params![id], member_from_row)
        .optional()?;
    Ok(member)
}

pub fn get_birth_data(conn: &Connection, member_id: i64) -> Result<Option<BirthData>, AppError> {
    let birth = conn
        .query_row(
            "SELECT id, member_id, date_of_birth, time_of_birth, birth_city, time_zone \
             FROM member_birth_data WHERE member_id = ?1",
            params![member_id],
            |row| {
                Ok(BirthData {
                    id: row.get(0)?,
                    member_id: row.get(1)?,
                    date_of_birth: row.get(2)?,
                    time_of_birth: row.get(3)?,
                    birth_city: row.get(4)?,
                    time_zone: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(birth)
}

pub fn get_energy_map(conn: &Connection, member_id: i64) -> Result<Option<EnergyMap>, AppError> {
    let energy = conn
        .query_row(
            "SELECT id, member_id, energy_type, notes, created_at \
             FROM energy_map WHERE member_id = ?1",
            params![member_id],
            |row| {
                let label: String = row.get(2)?;
                let energy_type = label.parse::<ZodiacSign>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
                })?;
                Ok(EnergyMap {
                    id: row.get(0)?,
                    member_id: row.get(1)?,
                    energy_type,
                    notes: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(energy)
}

/// Newest members first, optionally filtered.
///
/// `focus` is matched as a substring of the stored tags, `search` as a
/// substring of name, email or source page. SQLite `LIKE` is
/// case-insensitive for ASCII, so both filters are too.
pub fn list_members(
    conn: &Connection,
    filter: &MemberFilter,
    limit: Option<usize>,
) -> Result<Vec<Member>, AppError> {
    let sql = format!(
        "SELECT {} FROM members \
         WHERE (?1 IS NULL OR focus_areas LIKE '%' || ?1 || '%') \
           AND (?2 IS NULL \
                OR full_name LIKE '%' || ?2 || '%' \
                OR email LIKE '%' || ?2 || '%' \
                OR source_page LIKE '%' || ?2 || '%') \
         ORDER BY created_at DESC, id DESC \
         LIMIT ?3",
        MEMBER_COLUMNS
    );
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map(|l| l as i64).unwrap_or(-1);

    let mut stmt = conn.prepare(&sql)?;
    let members = stmt
        .query_map(params![filter.focus(), filter.search(), limit], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

pub fn count_members(conn: &Connection) -> Result<i64, AppError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?)
}
