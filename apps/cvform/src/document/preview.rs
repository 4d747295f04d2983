//! HTML mock-up of the CV shown before generation. Same content and ordering as the
//! assembled document, laid out as a two-column card. All user text is escaped.

use std::fmt::Write;

use crate::document::assembler::{experience_period, sorted_education, sorted_experience};
use crate::models::{FieldId, FormState};

pub fn render_preview(state: &FormState) -> String {
    let state = state.filled_entries_only();
    let v = |field: FieldId| escape(state.value(field));
    let mut html = String::new();

    html.push_str(r#"<div class="cv-preview">"#);
    let objective = state.value(FieldId::Objective).trim();
    if !objective.is_empty() {
        let _ = write!(html, "<h2>Career objective: {}</h2>", escape(objective));
    }
    html.push_str(r#"<div class="cv-grid"><div class="cv-contact">"#);

    match &state.photo {
        Some(photo) => {
            let _ = write!(html, r#"<img src="{}" alt="Photo">"#, escape(&photo.data_url));
        }
        None => html.push_str(r#"<div class="cv-photo-placeholder">Photo</div>"#),
    }
    let _ = write!(
        html,
        "<h3>{}</h3><p>{} | {}</p><p>{}, {}</p><p>Age: {} | {} | {}</p><p>DNI: {} | CUIL: {}</p>",
        v(FieldId::Name),
        v(FieldId::Email),
        v(FieldId::Phone),
        v(FieldId::Address),
        v(FieldId::Locality),
        v(FieldId::Age),
        v(FieldId::MaritalStatus),
        v(FieldId::Nationality),
        v(FieldId::NationalId),
        v(FieldId::TaxId),
    );
    html.push_str(r#"</div><div class="cv-content">"#);

    if !state.experience.is_empty() {
        html.push_str("<h3>Work Experience</h3>");
        for entry in sorted_experience(&state.experience) {
            let _ = write!(
                html,
                "<div class=\"cv-entry\"><h4>{} - {}</h4><p>{}</p>",
                escape(&entry.role),
                escape(&entry.employer),
                escape(&experience_period(entry)),
            );
            push_list(&mut html, entry.description_lines());
            html.push_str("</div>");
        }
    }

    if !state.education.is_empty() {
        html.push_str("<h3>Education</h3>");
        for entry in sorted_education(&state.education) {
            let _ = write!(
                html,
                "<div class=\"cv-entry\"><h4>{} - {}</h4><p>{} - {}</p>",
                escape(&entry.title),
                escape(&entry.institution),
                escape(&entry.start_date),
                escape(&entry.end_date),
            );
            let description = entry.description.trim();
            if !description.is_empty() {
                let _ = write!(html, "<p>{}</p>", escape(description));
            }
            html.push_str("</div>");
        }
    }

    let skills = state.skills();
    if !skills.is_empty() {
        html.push_str("<h3>Skills</h3>");
        push_list(&mut html, skills);
    }

    if state.has_drivers_license() {
        let _ = write!(
            html,
            "<h3>Other</h3><p>Driver's license: {}, expires {}</p>",
            v(FieldId::LicenseType),
            v(FieldId::LicenseExpiry),
        );
    }

    html.push_str("</div></div></div>");
    html
}

fn push_list(html: &mut String, items: Vec<&str>) {
    if items.is_empty() {
        return;
    }
    html.push_str("<ul>");
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape(item));
    }
    html.push_str("</ul>");
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperienceEntry;

    #[test]
    fn test_user_text_is_escaped() {
        let mut form = FormState::default();
        form.set(FieldId::Name, "<script>alert('x')</script>");
        form.set(FieldId::Skills, "C&C++");
        let html = render_preview(&form);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("<li>C&amp;C++</li>"));
    }

    #[test]
    fn test_preview_orders_experience_like_document() {
        let mut form = FormState::default();
        for (employer, start) in [("Old Co", "2019-01-01"), ("New Co", "2022-06-01")] {
            form.experience.push(ExperienceEntry {
                employer: employer.to_string(),
                role: "Dev".to_string(),
                start_date: start.to_string(),
                end_date: None,
                description: String::new(),
            });
        }
        let html = render_preview(&form);
        let new = html.find("New Co").unwrap();
        let old = html.find("Old Co").unwrap();
        assert!(new < old);
        assert!(html.contains("2022-06-01 (Current)"));
    }

    #[test]
    fn test_optional_parts_omitted() {
        let html = render_preview(&FormState::default());
        assert!(!html.contains("Career objective"));
        assert!(!html.contains("Driver's license"));
        assert!(!html.contains("<h3>Skills</h3>"));
        assert!(html.contains("cv-photo-placeholder"));
    }
}
