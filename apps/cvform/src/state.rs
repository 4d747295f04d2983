use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::document::{assemble, render_preview, DocumentTree};
use crate::draft::{DraftLoad, DraftSlot, DraftStore};
use crate::errors::FormError;
use crate::models::{FieldId, FormState};
use crate::render::{DocumentRenderer, DOCUMENT_FILE_NAME};
use crate::sections::{
    self, compute_progress, EducationField, ExperienceField, Progress, SectionKind,
};
use crate::ui::{Notice, UiFeedback};
use crate::upload::{accept_photo, PhotoSource, RawPhoto, UploadError};
use crate::validation::derived::recompute_age;
use crate::validation::{apply_change, Clock, ValidationResult, ValidatorRegistry};

/// One editing session: the form, its latest verdicts and everything needed to persist
/// and emit it. Created when the form opens, dropped when it closes.
pub struct FormSession<S: DraftSlot, U: UiFeedback> {
    form: FormState,
    results: BTreeMap<FieldId, ValidationResult>,
    consent: bool,
    /// Set while a photo read is in flight; generation waits for it.
    photo_pending: bool,
    drafts: DraftStore<S>,
    ui: U,
    /// Pluggable "today" for age and expiry rules. Default: SystemClock.
    clock: Arc<dyn Clock>,
    registry: &'static ValidatorRegistry,
}

impl<S: DraftSlot, U: UiFeedback> FormSession<S, U> {
    /// Opens a session, restoring any saved draft. A corrupt draft is discarded and
    /// reported; the session then starts empty.
    pub fn start(slot: S, ui: U, clock: Arc<dyn Clock>) -> Result<Self, FormError> {
        let mut session = Self {
            form: FormState::default(),
            results: BTreeMap::new(),
            consent: false,
            photo_pending: false,
            drafts: DraftStore::new(slot),
            ui,
            clock,
            registry: ValidatorRegistry::global(),
        };

        match session.drafts.load()? {
            DraftLoad::Empty => debug!("No draft to restore"),
            DraftLoad::Loaded(draft) => {
                session.form = draft.form;
                session.enforce_capacity();
                recompute_age(&mut session.form, session.clock.today());
                session.results = session
                    .registry
                    .validate_all(&session.form, session.clock.today());
                session.ui.notify(Notice::info("Draft loaded."));
            }
            DraftLoad::Corrupt { reason } => {
                session.ui.notify(FormError::CorruptDraft(reason).to_notice());
            }
        }
        session.refresh_progress();
        Ok(session)
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn results(&self) -> &BTreeMap<FieldId, ValidationResult> {
        &self.results
    }

    pub fn progress(&self) -> Progress {
        compute_progress(&self.form, &self.results)
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn photo_pending(&self) -> bool {
        self.photo_pending
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn drafts(&self) -> &DraftStore<S> {
        &self.drafts
    }

    // ────────────────────────────────────────────────────────────────────────
    // Editing
    // ────────────────────────────────────────────────────────────────────────

    /// Applies one edit and returns the verdicts it produced, edited field first.
    pub fn set_field(&mut self, field: FieldId, value: impl Into<String>) -> Vec<ValidationResult> {
        let today = self.clock.today();
        let results = apply_change(&mut self.form, field, value, self.registry, today);
        for result in &results {
            self.ui.mark_field(result);
            self.results.insert(result.field, result.clone());
        }
        if field == FieldId::Skills {
            if let Some(result) = results.first().filter(|r| !r.is_valid) {
                self.ui.notify(Notice::warning(result.message.clone()));
            }
        }
        self.refresh_progress();
        results
    }

    /// Re-derives age and validates every field. Returns true when all are valid.
    pub fn validate_all(&mut self) -> bool {
        let today = self.clock.today();
        recompute_age(&mut self.form, today);
        self.results = self.registry.validate_all(&self.form, today);
        for result in self.results.values() {
            self.ui.mark_field(result);
        }
        self.refresh_progress();
        self.results.values().all(|r| r.is_valid)
    }

    pub fn set_consent(&mut self, granted: bool) {
        self.consent = granted;
    }

    /// Replaces the whole form, e.g. with an imported snapshot, and revalidates.
    pub fn import(&mut self, form: FormState) -> bool {
        self.form = form;
        self.enforce_capacity();
        info!(
            "Imported form ({} education, {} experience entries)",
            self.form.education.len(),
            self.form.experience.len()
        );
        self.validate_all()
    }

    pub fn add_entry(&mut self, kind: SectionKind) -> Result<usize, FormError> {
        let added = sections::add_entry(&mut self.form, kind);
        self.after_entry_edit(added)
    }

    pub fn remove_entry(&mut self, kind: SectionKind, index: usize) -> Result<(), FormError> {
        let removed = sections::remove_entry(&mut self.form, kind, index);
        self.after_entry_edit(removed)
    }

    pub fn set_education_field(
        &mut self,
        index: usize,
        field: EducationField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let edited = sections::set_education_field(&mut self.form, index, field, value);
        self.after_entry_edit(edited)
    }

    pub fn set_experience_field(
        &mut self,
        index: usize,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let edited = sections::set_experience_field(&mut self.form, index, field, value);
        self.after_entry_edit(edited)
    }

    pub fn set_experience_current(&mut self, index: usize, current: bool) -> Result<(), FormError> {
        let edited = sections::set_experience_current(&mut self.form, index, current);
        self.after_entry_edit(edited)
    }

    fn after_entry_edit<T>(&mut self, outcome: Result<T, FormError>) -> Result<T, FormError> {
        match outcome {
            Ok(value) => {
                self.refresh_progress();
                Ok(value)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Photo
    // ────────────────────────────────────────────────────────────────────────

    pub fn begin_photo_upload(&mut self) {
        self.photo_pending = true;
    }

    /// Completes a pending upload. A rejected photo leaves the previous one in place.
    pub fn finish_photo_upload(
        &mut self,
        read: Result<RawPhoto, UploadError>,
    ) -> Result<(), FormError> {
        self.photo_pending = false;
        match read.and_then(|raw| accept_photo(&raw)) {
            Ok(photo) => {
                info!("Photo accepted ({})", photo.mime().unwrap_or("unknown type"));
                self.form.photo = Some(photo);
                self.ui.notify(Notice::success("Photo uploaded."));
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    pub async fn upload_photo(&mut self, source: &dyn PhotoSource) -> Result<(), FormError> {
        self.begin_photo_upload();
        let read = source.read().await;
        self.finish_photo_upload(read)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Draft, preview, generation
    // ────────────────────────────────────────────────────────────────────────

    pub fn save_draft(&mut self) -> Result<(), FormError> {
        match self.drafts.save(&self.form) {
            Ok(_) => {
                self.ui.notify(Notice::success("Draft saved."));
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Builds and shows the HTML preview. Refused while any field is missing or invalid.
    pub fn preview(&mut self) -> Result<String, FormError> {
        self.validate_all();
        let mut blocking = self.form.missing_required();
        blocking.extend(
            self.results
                .values()
                .filter(|r| !r.is_valid)
                .map(|r| r.field),
        );
        blocking.sort();
        blocking.dedup();
        if !blocking.is_empty() {
            return Err(self.report(FormError::InvalidFields { fields: blocking }));
        }

        let html = render_preview(&self.form);
        self.ui.show_preview(&html);
        Ok(html)
    }

    /// Emits the document. Checks run in order (missing required fields, consent,
    /// pending photo) and the first failure aborts. The draft is cleared on success.
    pub fn generate(
        &mut self,
        renderer: &mut dyn DocumentRenderer,
    ) -> Result<DocumentTree, FormError> {
        self.validate_all();

        let missing = self.form.missing_required();
        if let Some(first) = missing.first() {
            self.ui.focus(*first);
            return Err(self.report(FormError::MissingFields { fields: missing }));
        }
        if !self.consent {
            return Err(self.report(FormError::MissingConsent));
        }
        if self.photo_pending {
            return Err(self.report(FormError::PhotoPending));
        }

        let tree = assemble(&self.form);
        if let Err(e) = renderer.render(&tree, DOCUMENT_FILE_NAME) {
            return Err(self.report(e));
        }
        if let Err(e) = self.drafts.clear() {
            return Err(self.report(e.into()));
        }
        info!("Generated {DOCUMENT_FILE_NAME}");
        self.ui.notify(Notice::success("PDF generated successfully!"));
        Ok(tree)
    }

    fn enforce_capacity(&mut self) {
        if let Err(e) = sections::enforce_capacity(&mut self.form) {
            self.ui.notify(e.to_notice());
        }
    }

    fn refresh_progress(&mut self) {
        let progress = self.progress();
        self.ui.set_progress(&progress);
    }

    fn report(&mut self, err: FormError) -> FormError {
        self.ui.notify(err.to_notice());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::NaiveDate;

    use crate::draft::obfuscation::obfuscate;
    use crate::draft::{Draft, FileSlot, MemorySlot, DRAFT_KEY};
    use crate::models::{EducationEntry, EmbeddedPhoto, ExperienceEntry};
    use crate::render::MemoryRenderer;
    use crate::sections::{ProgressSection, MAX_EXPERIENCE};
    use crate::ui::{NoticeLevel, RecordingUi};
    use crate::validation::FixedClock;

    type TestSession = FormSession<MemorySlot, RecordingUi>;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
    }

    fn open(slot: MemorySlot) -> TestSession {
        FormSession::start(slot, RecordingUi::default(), clock()).unwrap()
    }

    fn fill_personal(session: &mut TestSession) {
        for (field, value) in [
            (FieldId::Name, "Ana Lopez"),
            (FieldId::Address, "Av. Siempre Viva 742"),
            (FieldId::Locality, "CABA"),
            (FieldId::Phone, "11 5555-1234"),
            (FieldId::Email, "ana@example.com"),
            (FieldId::MaritalStatus, "Single"),
            (FieldId::BirthDate, "1994-05-10"),
            (FieldId::Nationality, "Argentine"),
            (FieldId::TaxId, "20123456783"),
            (FieldId::NationalId, "30111222"),
            (FieldId::DriversLicense, "no"),
        ] {
            session.set_field(field, value);
        }
    }

    struct StaticPhoto(Result<RawPhoto, UploadError>);

    #[async_trait]
    impl PhotoSource for StaticPhoto {
        async fn read(&self) -> Result<RawPhoto, UploadError> {
            self.0.clone()
        }
    }

    fn png(len: usize) -> RawPhoto {
        RawPhoto {
            bytes: Bytes::from(vec![1u8; len]),
            mime: "image/png".to_string(),
        }
    }

    #[test]
    fn test_birth_date_edit_derives_age() {
        let mut session = open(MemorySlot::default());
        let results = session.set_field(FieldId::BirthDate, "2000-03-15");
        assert!(results[0].is_valid);
        assert_eq!(session.form().value(FieldId::Age), "24");
        assert_eq!(session.ui().marks.last(), results.last());
    }

    #[test]
    fn test_filled_personal_section_reports_progress() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        let progress = session.ui().last_progress().unwrap().clone();
        let personal = progress
            .sections
            .iter()
            .find(|s| s.section == ProgressSection::Personal)
            .unwrap();
        assert!(personal.complete);
        // Personal and Other ("no" license) are complete.
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.percent, 40.0);
    }

    #[test]
    fn test_too_many_skills_raises_notice() {
        let mut session = open(MemorySlot::default());
        session.set_field(FieldId::Skills, "a, b, c, d, e");
        assert!(session.ui().notices.is_empty());

        let results = session.set_field(FieldId::Skills, "a, b, c, d, e, f");
        assert!(!results[0].is_valid);
        assert_eq!(
            session.ui().last_notice().unwrap().level,
            NoticeLevel::Warning
        );
        assert_eq!(session.form().skills().len(), 6);
    }

    #[test]
    fn test_eleventh_experience_entry_rejected() {
        let mut session = open(MemorySlot::default());
        for _ in 0..MAX_EXPERIENCE {
            session.add_entry(SectionKind::Experience).unwrap();
        }
        let err = session.add_entry(SectionKind::Experience).unwrap_err();
        assert!(matches!(err, FormError::Capacity { max: 10, .. }));
        assert_eq!(session.form().experience.len(), 10);
        assert_eq!(
            session.ui().last_notice().unwrap().message,
            "At most 10 experience entries."
        );
    }

    fn twelve_jobs() -> Vec<ExperienceEntry> {
        (0..12)
            .map(|i| ExperienceEntry {
                employer: format!("Employer {i}"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_restored_draft_is_capped_at_ten_jobs() {
        let mut form = FormState::default();
        form.experience = twelve_jobs();
        let draft = Draft {
            version: 1,
            saved_at: chrono::Utc::now(),
            form,
        };
        let mut slot = MemorySlot::default();
        slot.set(DRAFT_KEY, &obfuscate(&serde_json::to_string(&draft).unwrap()))
            .unwrap();

        let session = open(slot);
        assert_eq!(session.form().experience.len(), MAX_EXPERIENCE);
        assert_eq!(session.form().experience[9].employer, "Employer 9");
        assert!(session
            .ui()
            .notices
            .iter()
            .any(|n| n.message == "At most 10 experience entries."));
    }

    #[test]
    fn test_imported_form_is_capped_at_ten_jobs() {
        let mut session = open(MemorySlot::default());
        let mut form = FormState::default();
        form.experience = twelve_jobs();

        session.import(form);
        assert_eq!(session.form().experience.len(), MAX_EXPERIENCE);
        assert_eq!(
            session.ui().last_notice().unwrap().message,
            "At most 10 experience entries."
        );
        assert!(session.add_entry(SectionKind::Experience).is_err());
    }

    #[test]
    fn test_removing_last_education_entry_drops_progress() {
        let mut session = open(MemorySlot::default());
        let i = session.add_entry(SectionKind::Education).unwrap();
        session
            .set_education_field(i, EducationField::Institution, "UBA")
            .unwrap();
        session
            .set_education_field(i, EducationField::Title, "Lic. Sistemas")
            .unwrap();
        let before = session.ui().last_progress().unwrap().completed;

        session.remove_entry(SectionKind::Education, i).unwrap();
        let after = session.ui().last_progress().unwrap();
        assert_eq!(after.completed, before - 1);
        assert!(!after
            .sections
            .iter()
            .find(|s| s.section == ProgressSection::Education)
            .unwrap()
            .complete);
    }

    #[test]
    fn test_binary_draft_file_does_not_stop_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DRAFT_KEY);
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let slot = FileSlot::open(dir.path()).unwrap();
        let session = FormSession::start(slot, RecordingUi::default(), clock()).unwrap();
        assert_eq!(session.form(), &FormState::default());
        assert!(!path.exists());
        assert_eq!(
            session.ui().last_notice().unwrap().level,
            NoticeLevel::Danger
        );
    }

    #[test]
    fn test_bad_entry_index_leaves_state_alone() {
        let mut session = open(MemorySlot::default());
        session.add_entry(SectionKind::Education).unwrap();
        assert!(session.remove_entry(SectionKind::Education, 3).is_err());
        assert_eq!(session.form().education.len(), 1);
    }

    #[test]
    fn test_draft_round_trip_between_sessions() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        for (institution, end) in [("UBA", "2018"), ("ORT", "2012")] {
            let i = session.add_entry(SectionKind::Education).unwrap();
            session
                .set_education_field(i, EducationField::Institution, institution)
                .unwrap();
            session
                .set_education_field(i, EducationField::EndDate, end)
                .unwrap();
        }
        let i = session.add_entry(SectionKind::Experience).unwrap();
        session
            .set_experience_field(i, ExperienceField::Employer, "Acme")
            .unwrap();
        session.set_experience_current(i, true).unwrap();
        session.finish_photo_upload(Ok(png(16))).unwrap();
        session.save_draft().unwrap();
        let saved = session.form().clone();

        let restored = open(session.drafts().slot().clone());
        assert_eq!(restored.form(), &saved);
        assert_eq!(restored.form().education.len(), 2);
        assert!(restored.form().experience[0].is_current());
        assert!(restored.form().photo.is_some());
        assert_eq!(
            restored.ui().notices.first(),
            Some(&Notice::info("Draft loaded."))
        );
    }

    #[test]
    fn test_corrupt_draft_starts_empty_and_clears_slot() {
        let mut slot = MemorySlot::default();
        slot.set(DRAFT_KEY, "%%% garbage %%%").unwrap();
        let session = open(slot);

        assert_eq!(session.form(), &FormState::default());
        assert_eq!(session.drafts().slot().get(DRAFT_KEY).unwrap(), None);
        let notice = session.ui().last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Danger);
        assert!(notice.message.contains("saved draft"));
    }

    #[test]
    fn test_generate_reports_missing_fields_and_focuses_first() {
        let mut session = open(MemorySlot::default());
        session.set_field(FieldId::Name, "Ana Lopez");
        session.set_consent(true);
        let mut renderer = MemoryRenderer::default();

        let err = session.generate(&mut renderer).unwrap_err();
        let FormError::MissingFields { fields } = err else {
            panic!("expected missing fields");
        };
        assert_eq!(fields.first(), Some(&FieldId::Address));
        assert!(!fields.contains(&FieldId::Name));
        assert_eq!(session.ui().focused, vec![FieldId::Address]);
        assert!(renderer.rendered.is_empty());
    }

    #[test]
    fn test_generate_requires_consent() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        let mut renderer = MemoryRenderer::default();

        let err = session.generate(&mut renderer).unwrap_err();
        assert!(matches!(err, FormError::MissingConsent));
        assert!(session
            .ui()
            .last_notice()
            .unwrap()
            .message
            .contains("consent"));
        assert!(renderer.rendered.is_empty());
    }

    #[test]
    fn test_generate_waits_for_pending_photo() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        session.set_consent(true);
        session.begin_photo_upload();
        let mut renderer = MemoryRenderer::default();

        assert!(matches!(
            session.generate(&mut renderer),
            Err(FormError::PhotoPending)
        ));
        session.finish_photo_upload(Ok(png(8))).unwrap();
        assert!(session.generate(&mut renderer).is_ok());
    }

    #[test]
    fn test_successful_generation_clears_draft() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        session.set_consent(true);
        session.save_draft().unwrap();
        assert!(session.drafts().slot().get(DRAFT_KEY).unwrap().is_some());

        let mut renderer = MemoryRenderer::default();
        let tree = session.generate(&mut renderer).unwrap();

        assert_eq!(renderer.rendered.len(), 1);
        assert_eq!(renderer.rendered[0].0, DOCUMENT_FILE_NAME);
        assert_eq!(renderer.rendered[0].1, tree);
        assert!(tree.texts().contains(&"ANA LOPEZ"));
        assert_eq!(session.drafts().slot().get(DRAFT_KEY).unwrap(), None);
        assert_eq!(
            session.ui().last_notice(),
            Some(&Notice::success("PDF generated successfully!"))
        );
    }

    #[test]
    fn test_present_but_invalid_fields_do_not_block_generation() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        session.set_field(FieldId::Phone, "123");
        session.set_consent(true);
        assert!(session.generate(&mut MemoryRenderer::default()).is_ok());
    }

    #[test]
    fn test_preview_refused_until_fields_valid() {
        let mut session = open(MemorySlot::default());
        fill_personal(&mut session);
        session.set_field(FieldId::Phone, "123");

        let err = session.preview().unwrap_err();
        assert!(matches!(
            err,
            FormError::InvalidFields { ref fields } if fields == &vec![FieldId::Phone]
        ));
        assert!(session.ui().previews.is_empty());

        session.set_field(FieldId::Phone, "1155551234");
        let html = session.preview().unwrap();
        assert!(html.contains("Ana Lopez"));
        assert_eq!(session.ui().previews.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_upload_keeps_previous_photo() {
        let mut session = open(MemorySlot::default());
        session.upload_photo(&StaticPhoto(Ok(png(4)))).await.unwrap();
        let first = session.form().photo.clone();
        assert!(first.is_some());

        let too_big = StaticPhoto(Err(UploadError::TooLarge { size: 3_000_000 }));
        let err = session.upload_photo(&too_big).await.unwrap_err();
        assert!(matches!(err, FormError::Upload(UploadError::TooLarge { .. })));
        assert_eq!(session.form().photo, first);
        assert!(!session.photo_pending());
        assert_eq!(
            session.ui().last_notice().unwrap().message,
            "Photo too large. Maximum 2MB."
        );
    }

    #[test]
    fn test_import_replaces_form_and_revalidates() {
        let mut session = open(MemorySlot::default());
        let mut form = FormState::default();
        form.set(FieldId::BirthDate, "2000-03-15");
        form.education.push(EducationEntry {
            institution: "UBA".to_string(),
            title: "Lic.".to_string(),
            ..Default::default()
        });
        form.experience.push(ExperienceEntry::default());
        form.photo = Some(EmbeddedPhoto::new("data:image/png;base64,AA=="));

        assert!(!session.import(form));
        assert_eq!(session.form().value(FieldId::Age), "24");
        assert!(!session.results()[&FieldId::Name].is_valid);
    }
}
