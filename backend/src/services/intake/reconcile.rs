//! Upsert of the member / birth data / energy map triple, keyed by email.
//!
//! A new email inserts all three rows. A known email patches the member with
//! whatever the payload supplied, replaces the birth data outright and
//! recomputes the energy map. Both paths run in one transaction: if any
//! statement fails, the transaction is dropped uncommitted and nothing is
//! kept.

use aidoshop_common::model::energy::ZodiacSign;
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, Transaction};

use crate::db::members::find_id_by_email;
use crate::error::AppError;
use crate::services::intake::normalize::{BirthDetails, NormalizedIntake};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub member_id: i64,
    /// `false` when the email matched an existing member.
    pub created: bool,
}

pub fn upsert_member(
    conn: &mut Connection,
    intake: &NormalizedIntake,
) -> Result<ReconcileOutcome, AppError> {
    let now = Utc::now();
    let sign = ZodiacSign::for_date(intake.birth.date_of_birth);

    let tx = conn.transaction()?;

    let outcome = match find_id_by_email(&tx, &intake.email)? {
        Some(member_id) => {
            debug!("Merging intake into existing member {}", member_id);
            patch_member(&tx, member_id, intake)?;
            ReconcileOutcome {
                member_id,
                created: false,
            }
        }
        None => {
            let member_id = insert_member(&tx, intake, now)?;
            debug!("Created member {} for {}", member_id, intake.email);
            ReconcileOutcome {
                member_id,
                created: true,
            }
        }
    };

    replace_birth_data(&tx, outcome.member_id, &intake.birth)?;
    replace_energy_map(&tx, outcome.member_id, sign, now)?;

    tx.commit()?;
    Ok(outcome)
}

fn insert_member(
    tx: &Transaction<'_>,
    intake: &NormalizedIntake,
    now: DateTime<Utc>,
) -> Result<i64, AppError> {
    tx.execute(
        "INSERT INTO members (full_name, email, gender, consent_to_emails, focus_areas, \
                              source_page, ip_address, country_code, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            intake.display_name(),
            intake.email,
            intake.gender,
            intake.consent_to_emails.unwrap_or(true),
            intake.focus_areas,
            intake.source_page,
            intake.ip_address,
            intake.country_code,
            now,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

/// Sparse patch: a `NULL` parameter keeps the stored value.
fn patch_member(
    tx: &Transaction<'_>,
    member_id: i64,
    intake: &NormalizedIntake,
) -> Result<(), AppError> {
    tx.execute(
        "UPDATE members SET \
            full_name         = COALESCE(?2, full_name), \
            gender            = COALESCE(?3, gender), \
            consent_to_emails = COALESCE(?4, consent_to_emails), \
            focus_areas       = COALESCE(?5, focus_areas), \
            source_page       = COALESCE(?6, source_page), \
            ip_address        = COALESCE(?7, ip_address), \
            country_code      = COALESCE(?8, country_code) \
         WHERE id = ?1",
        params![
            member_id,
            intake.full_name,
            intake.gender,
            intake.consent_to_emails,
            intake.focus_areas,
            intake.source_page,
            intake.ip_address,
            intake.country_code,
        ],
    )?;
    Ok(())
}

/// Every birth field is overwritten, including with `NULL`.
fn replace_birth_data(
    tx: &Transaction<'_>,
    member_id: i64,
    birth: &BirthDetails,
) -> Result<(), AppError> {
    tx.execute(
        "INSERT INTO member_birth_data (member_id, date_of_birth, time_of_birth, birth_city, time_zone) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(member_id) DO UPDATE SET \
            date_of_birth = excluded.date_of_birth, \
            time_of_birth = excluded.time_of_birth, \
            birth_city    = excluded.birth_city, \
            time_zone     = excluded.time_zone",
        params![
            member_id,
            birth.date_of_birth,
            birth.time_of_birth,
            birth.birth_city,
            birth.time_zone,
        ],
    )?;
    Ok(())
}

/// `created_at` is only written on first insert.
fn replace_energy_map(
    tx: &Transaction<'_>,
    member_id: i64,
    sign: ZodiacSign,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    tx.execute(
        "INSERT INTO energy_map (member_id, energy_type, notes, created_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(member_id) DO UPDATE SET \
            energy_type = excluded.energy_type, \
            notes       = excluded.notes",
        params![member_id, sign.label(), sign.auto_notes(), now],
    )?;
    Ok(())
}
