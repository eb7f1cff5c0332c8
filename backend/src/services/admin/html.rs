//! Server-rendered admin pages.
//!
//! The pages are small enough that plain string building is all they need.
//! Anything that came from a member or a query string goes through
//! [`escape`] first.

use aidoshop_common::model::energy::EnergyMap;
use aidoshop_common::model::member::{BirthData, Member};
use aidoshop_common::responses::FocusCount;
use std::fmt::Write;

use crate::services::admin::session::login_url;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ddd;padding:.35rem .5rem;text-align:left;font-size:.9rem}\
th{background:#f4f1fa}.error{color:#b00020}\
.bar{background:#7b5ea7;height:.8rem;display:inline-block}";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{}</style></head><body>{}</body></html>",
        escape(title),
        STYLE,
        body
    )
}

pub fn login_page(error: Option<&str>, next: Option<&str>) -> String {
    let mut body = String::from("<h1>AIDOShop admin</h1>");
    if let Some(error) = error {
        let _ = write!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    let action = escape(&login_url(next));
    let _ = write!(
        body,
        "<form method=\"post\" action=\"{}\">\
         <p><label>Username <input name=\"username\" autocomplete=\"username\"></label></p>\
         <p><label>Password <input name=\"password\" type=\"password\" \
         autocomplete=\"current-password\"></label></p>\
         <p><button type=\"submit\">Log in</button></p></form>",
        action
    );
    page("Admin login", &body)
}

pub fn members_page(
    members: &[Member],
    total: i64,
    focus_counts: &[FocusCount],
    current_focus: &str,
    current_search: &str,
) -> String {
    let mut body = String::from(
        "<h1>Members</h1><p><a href=\"/admin/members/export\">Export CSV</a> | \
         <a href=\"/admin/logout\">Log out</a></p>",
    );

    let _ = write!(
        body,
        "<form method=\"get\" action=\"/admin/members\">\
         <input name=\"focus\" placeholder=\"Focus area\" value=\"{}\"> \
         <input name=\"search\" placeholder=\"Name, email or page\" value=\"{}\"> \
         <button type=\"submit\">Filter</button></form>",
        escape(current_focus),
        escape(current_search)
    );

    body.push_str("<h2>Focus areas</h2>");
    if focus_counts.is_empty() {
        body.push_str("<p>No focus areas recorded.</p>");
    } else {
        let max = focus_counts.iter().map(|f| f.count).max().unwrap_or(1).max(1);
        body.push_str("<table><tr><th>Focus</th><th>Members</th><th></th></tr>");
        for focus in focus_counts {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td><span class=\"bar\" style=\"width:{}%\"></span></td></tr>",
                escape(&focus.label),
                focus.count,
                focus.count * 100 / max
            );
        }
        body.push_str("</table>");
    }

    let _ = write!(body, "<h2>Leads ({} shown of {})</h2>", members.len(), total);
    body.push_str(
        "<table><tr><th>ID</th><th>Name</th><th>Email</th><th>Gender</th><th>Focus</th>\
         <th>Source</th><th>IP</th><th>Country</th><th>Consent</th><th>Created</th></tr>",
    );
    for m in members {
        let _ = write!(
            body,
            "<tr><td><a href=\"/admin/members/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            m.id,
            m.id,
            escape(&m.full_name),
            escape(&m.email),
            escape(m.gender.as_deref().unwrap_or_default()),
            escape(m.focus_areas.as_deref().unwrap_or_default()),
            escape(m.source_page.as_deref().unwrap_or_default()),
            escape(m.ip_address.as_deref().unwrap_or_default()),
            escape(m.country_code.as_deref().unwrap_or_default()),
            if m.consent_to_emails { "yes" } else { "no" },
            m.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    body.push_str("</table>");

    page("Members", &body)
}

fn row(body: &mut String, label: &str, value: &str) {
    let _ = write!(body, "<tr><th>{}</th><td>{}</td></tr>", label, escape(value));
}

pub fn member_page(member: &Member, birth: Option<&BirthData>, energy: Option<&EnergyMap>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1><p><a href=\"/admin/members\">Back to members</a></p><table>",
        escape(&member.full_name)
    );
    row(&mut body, "Email", &member.email);
    row(&mut body, "Gender", member.gender.as_deref().unwrap_or_default());
    row(&mut body, "Focus", member.focus_areas.as_deref().unwrap_or_default());
    row(&mut body, "Source", member.source_page.as_deref().unwrap_or_default());
    row(&mut body, "IP", member.ip_address.as_deref().unwrap_or_default());
    row(&mut body, "Country", member.country_code.as_deref().unwrap_or_default());
    row(&mut body, "Consent", if member.consent_to_emails { "yes" } else { "no" });
    row(&mut body, "Created", &member.created_at.format("%Y-%m-%d %H:%M").to_string());
    body.push_str("</table>");

    body.push_str("<h2>Birth data</h2>");
    match birth {
        Some(birth) => {
            body.push_str("<table>");
            row(&mut body, "Date", &birth.date_of_birth.format("%Y-%m-%d").to_string());
            let time = birth
                .time_of_birth
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default();
            row(&mut body, "Time", &time);
            row(&mut body, "City", birth.birth_city.as_deref().unwrap_or_default());
            row(&mut body, "Time zone", birth.time_zone.as_deref().unwrap_or_default());
            body.push_str("</table>");
        }
        None => body.push_str("<p>No birth data recorded.</p>"),
    }

    body.push_str("<h2>Energy map</h2>");
    match energy {
        Some(energy) => {
            body.push_str("<table>");
            row(&mut body, "Sign", energy.energy_type.label());
            row(&mut body, "Notes", energy.notes.as_deref().unwrap_or_default());
            body.push_str("</table>");
        }
        None => body.push_str("<p>No energy map recorded.</p>"),
    }

    page(&member.full_name, &body)
}
