//! # Merge Session
//!
//! One owned context holding everything an operator works on: the loaded
//! templates, the current dataset, the field registry and the mapping store.
//! Every component receives what it needs from here; nothing is global.
//!
//! Replacing the template set or the dataset always recomputes the registry
//! and prunes the mapping store, so stale bindings never survive a reload.

use crate::engine::batch::{BatchOrchestrator, BatchPlan, BatchReport, PlannedRow, Progress};
use crate::engine::diagnostics::{inspect_template, is_legacy_doc, recommend};
use crate::engine::error::{
    BatchError, MappingError, TableError, TemplateError, LEGACY_DOC_HINT, NO_PLACEHOLDERS_HINT,
    UNREADABLE_HINT,
};
use crate::engine::extractor::{PlaceholderScanner, RegexScanner, TemplateNotice};
use crate::engine::filename::{OutputNaming, DEFAULT_IDENTIFYING_COLUMNS};
use crate::engine::mapping::MappingStore;
use crate::engine::ports::{RenderEngine, TableReader};
use crate::engine::registry::FieldRegistry;
use crate::engine::renderer::coerce;
use crate::engine::template::{template_id, Template};
use chrono::{Local, NaiveDate};
use common::model::csv::{ColumnSummary, TableUploadReport};
use common::model::datasource::{CellKind, DataRow};
use common::model::diagnostics::{SessionDiagnostics, TemplateDiagnostics};
use common::model::place_holder::PlaceholderName;
use common::model::template::{TemplateReport, TemplateStatus};
use common::responses::{MappingView, RowView, RowsPage, TemplatesView};
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Behaviour switches of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Hold several templates and pick one per row.
    pub multi_template: bool,
    /// Pre-populate bindings from case-insensitive name matches.
    pub auto_suggest: bool,
    /// Render rows on the rayon pool.
    pub parallel: bool,
    pub identifying_columns: Vec<String>,
    pub output_extension: String,
    /// Date stamped into output names. `None` means today, local time.
    pub date_stamp: Option<NaiveDate>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            multi_template: false,
            auto_suggest: true,
            parallel: false,
            identifying_columns: DEFAULT_IDENTIFYING_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            output_extension: "docx".to_string(),
            date_stamp: None,
        }
    }
}

impl MergeOptions {
    pub fn naming(&self) -> OutputNaming {
        let mut naming = OutputNaming::new(
            self.date_stamp
                .unwrap_or_else(|| Local::now().date_naive()),
        );
        naming.identifying_columns = self.identifying_columns.clone();
        naming.extension = self.output_extension.clone();
        naming
    }
}

pub struct MergeSession {
    options: MergeOptions,
    scanner: Box<dyn PlaceholderScanner>,
    /// Loaded templates in load order, unique by identity.
    templates: Vec<Arc<Template>>,
    reports: Vec<TemplateReport>,
    rows: Arc<Vec<DataRow>>,
    fingerprint: Option<String>,
    registry: FieldRegistry,
    mapping: MappingStore,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

impl MergeSession {
    pub fn new(options: MergeOptions) -> Self {
        Self::with_scanner(options, Box::new(RegexScanner))
    }

    pub fn with_scanner(options: MergeOptions, scanner: Box<dyn PlaceholderScanner>) -> Self {
        Self {
            registry: FieldRegistry::new(options.multi_template),
            options,
            scanner,
            templates: Vec::new(),
            reports: Vec::new(),
            rows: Arc::new(Vec::new()),
            fingerprint: None,
            mapping: MappingStore::default(),
        }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub fn is_multi_template(&self) -> bool {
        self.options.multi_template
    }

    /// Replaces the template set with a single template.
    ///
    /// An unreadable file leaves the session without templates and returns
    /// the error; a file without placeholders is loaded and reported through
    /// the returned notice.
    pub fn load_template(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Option<TemplateNotice>, TemplateError> {
        let file_name = file_name.into();
        let legacy_doc = is_legacy_doc(&bytes);
        let loaded = Template::load(file_name.clone(), bytes, self.scanner.as_ref());
        let (templates, reports, outcome) = match loaded {
            Ok((template, scan)) => {
                let report = loaded_report(&template, scan.notice());
                (vec![Arc::new(template)], vec![report], Ok(scan.notice()))
            }
            Err(e) => {
                let report = unreadable_report(&file_name, &e, legacy_doc);
                (Vec::new(), vec![report], Err(e))
            }
        };
        self.replace_templates(templates, reports);
        outcome
    }

    /// Replaces the whole template set.
    ///
    /// Each file gets a report; unreadable ones are excluded from the set. A
    /// later file with the same identity replaces an earlier one. In
    /// single-template mode more than one file is rejected before anything
    /// changes.
    pub fn load_templates(
        &mut self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<TemplateReport>, TemplateError> {
        if !self.options.multi_template && files.len() > 1 {
            return Err(TemplateError::TooManyTemplates { count: files.len() });
        }

        let mut templates: Vec<Arc<Template>> = Vec::new();
        let mut reports: Vec<TemplateReport> = Vec::new();
        for (file_name, bytes) in files {
            let legacy_doc = is_legacy_doc(&bytes);
            let report = match Template::load(file_name.clone(), bytes, self.scanner.as_ref()) {
                Ok((template, scan)) => {
                    let report = loaded_report(&template, scan.notice());
                    templates.retain(|t| t.id() != template.id());
                    templates.push(Arc::new(template));
                    report
                }
                Err(e) => unreadable_report(&file_name, &e, legacy_doc),
            };
            reports.retain(|r| r.id != report.id);
            reports.push(report);
        }

        self.replace_templates(templates, reports.clone());
        Ok(reports)
    }

    fn replace_templates(&mut self, templates: Vec<Arc<Template>>, reports: Vec<TemplateReport>) {
        info!(
            "Template set replaced: {} loaded, {} reported",
            templates.len(),
            reports.len()
        );
        self.templates = templates;
        self.reports = reports;
        self.registry.set_templates(
            self.templates
                .iter()
                .map(|t| (t.id().to_string(), t.placeholders().to_vec()))
                .collect(),
        );
        self.refresh_mapping();
    }

    /// Replaces the dataset. Columns come from the first row's keys.
    pub fn load_rows(&mut self, rows: Vec<DataRow>) {
        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default();
        info!("Dataset replaced: {} rows, {} columns", rows.len(), columns.len());
        self.registry.set_columns(columns, rows.len());
        self.rows = Arc::new(rows);
        self.refresh_mapping();
    }

    /// Reads `bytes` with `reader` and replaces the dataset.
    ///
    /// Uploading the same bytes again keeps the current dataset and mapping and
    /// reports `unchanged`.
    pub fn load_table(
        &mut self,
        reader: &dyn TableReader,
        bytes: &[u8],
    ) -> Result<TableUploadReport, TableError> {
        let fingerprint = format!("{:x}", md5::compute(bytes));
        let unchanged = self.fingerprint.as_deref() == Some(fingerprint.as_str());
        if !unchanged {
            let rows = reader.read_table(bytes)?;
            self.load_rows(rows);
            self.fingerprint = Some(fingerprint.clone());
        }
        Ok(TableUploadReport {
            columns: self.column_summaries(),
            row_count: self.rows.len(),
            fingerprint,
            unchanged,
        })
    }

    fn column_summaries(&self) -> Vec<ColumnSummary> {
        let first = self.rows.first();
        self.registry
            .columns()
            .iter()
            .map(|title| {
                let value = first.and_then(|row| row.get(title));
                ColumnSummary {
                    title: title.clone(),
                    kind: value.map(|v| v.kind()).unwrap_or(CellKind::Empty),
                    first_row: value.map(|v| coerce(Some(v))),
                }
            })
            .collect()
    }

    fn refresh_mapping(&mut self) {
        self.registry.prune(&mut self.mapping);
        if self.options.auto_suggest {
            self.mapping
                .apply_suggestions(self.registry.placeholders(), self.registry.columns());
        }
    }

    /// Binds a loaded placeholder to a current column, or clears the binding.
    pub fn set_mapping(
        &mut self,
        placeholder: &str,
        column: Option<&str>,
    ) -> Result<(), MappingError> {
        let name = PlaceholderName::new(placeholder)
            .filter(|name| self.registry.has_placeholder(name.as_str()))
            .ok_or_else(|| MappingError::UnknownPlaceholder {
                placeholder: placeholder.to_string(),
            })?;
        let column = column.filter(|c| !c.is_empty());
        if let Some(column) = column {
            if !self.registry.has_column(column) {
                return Err(MappingError::UnknownColumn {
                    column: column.to_string(),
                });
            }
        }
        self.mapping.set_mapping(name, column.map(str::to_string));
        Ok(())
    }

    pub fn get_mapping(&self, placeholder: &str) -> Option<&str> {
        self.mapping.get_mapping(placeholder)
    }

    /// The column a case-insensitive name match would bind `placeholder` to.
    pub fn suggestion_for(&self, placeholder: &str) -> Option<&str> {
        MappingStore::auto_suggest(placeholder, self.registry.columns())
    }

    pub fn set_row_template(
        &mut self,
        row_index: usize,
        template: Option<&str>,
    ) -> Result<(), MappingError> {
        if !self.options.multi_template {
            return Err(MappingError::SingleTemplateMode);
        }
        let row_count = self.rows.len();
        if row_index >= row_count {
            return Err(MappingError::RowOutOfRange {
                row_index,
                row_count,
            });
        }
        let template = template.filter(|t| !t.is_empty());
        if let Some(id) = template {
            if self.template(id).is_none() {
                return Err(MappingError::UnknownTemplate {
                    template: id.to_string(),
                });
            }
        }
        self.mapping
            .set_row_template(row_index, template.map(str::to_string));
        Ok(())
    }

    pub fn get_row_template(&self, row_index: usize) -> Option<&str> {
        self.mapping.get_row_template(row_index)
    }

    pub fn ready_for_mapping(&self) -> bool {
        self.registry.ready_for_mapping()
    }

    pub fn ready_to_generate(&self) -> bool {
        self.registry.ready_to_generate(&self.mapping)
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.id() == id)
            .map(Arc::as_ref)
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter().map(Arc::as_ref)
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        self.registry.columns()
    }

    pub fn placeholders(&self) -> &[PlaceholderName] {
        self.registry.placeholders()
    }

    /// Freezes rows, templates and mapping into a batch plan.
    ///
    /// In multi-template mode only rows with a selected template are planned;
    /// the others are counted as skipped.
    pub fn plan_batch(&self) -> Result<BatchPlan, BatchError> {
        if self.rows.is_empty() {
            return Err(BatchError::NoRows);
        }
        if self.templates.is_empty() {
            return Err(BatchError::NoTemplates);
        }
        let any_bound = self
            .registry
            .placeholders()
            .iter()
            .any(|p| self.mapping.get_mapping(p.as_str()).is_some());
        if !any_bound {
            return Err(BatchError::NothingMapped);
        }

        let items: Vec<PlannedRow> = if self.options.multi_template {
            (0..self.rows.len())
                .filter_map(|row_index| {
                    let id = self.mapping.get_row_template(row_index)?;
                    let template = self.templates.iter().find(|t| t.id() == id)?;
                    Some(PlannedRow {
                        row_index,
                        template: Arc::clone(template),
                    })
                })
                .collect()
        } else {
            let template = &self.templates[0];
            (0..self.rows.len())
                .map(|row_index| PlannedRow {
                    row_index,
                    template: Arc::clone(template),
                })
                .collect()
        };
        if items.is_empty() {
            return Err(BatchError::NoRowTemplates);
        }

        let skipped = self.rows.len() - items.len();
        if skipped > 0 {
            info!("{} rows have no template selected and are skipped", skipped);
        }
        Ok(BatchPlan {
            rows: Arc::clone(&self.rows),
            items,
            mapping: self.mapping.snapshot(),
            naming: self.options.naming(),
            prefix_with_template: self.options.multi_template,
            skipped,
        })
    }

    /// Plans and runs a batch on the calling thread.
    pub fn generate(
        &self,
        engine: &dyn RenderEngine,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<BatchReport, BatchError> {
        self.generate_with(&BatchOrchestrator::new(), engine, progress)
    }

    /// Like [`generate`](Self::generate), driven by a caller-owned orchestrator
    /// so its state and cancel flag stay observable.
    pub fn generate_with(
        &self,
        orchestrator: &BatchOrchestrator,
        engine: &dyn RenderEngine,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<BatchReport, BatchError> {
        let plan = self.plan_batch()?;
        let report = if self.options.parallel {
            orchestrator.run_parallel(&plan, engine, progress)
        } else {
            orchestrator.run(&plan, engine, &mut |p| progress(p))
        };
        Ok(report)
    }

    pub fn mapping_view(&self) -> MappingView {
        let suggestions: BTreeMap<String, String> = self
            .registry
            .placeholders()
            .iter()
            .filter_map(|p| {
                self.suggestion_for(p.as_str())
                    .map(|column| (p.to_string(), column.to_string()))
            })
            .collect();
        MappingView {
            columns: self.registry.columns().to_vec(),
            placeholders: self.registry.usages(),
            mapping: self.mapping.entries(),
            suggestions,
            row_templates: self.mapping.row_templates().clone(),
            ready_for_mapping: self.ready_for_mapping(),
            ready_to_generate: self.ready_to_generate(),
        }
    }

    pub fn templates_view(&self) -> TemplatesView {
        TemplatesView {
            templates: self.reports.clone(),
            placeholders: self.registry.usages(),
        }
    }

    /// Rows `offset..offset + limit` with their values rendered as they would
    /// be substituted. An offset past the end gives an empty page.
    pub fn rows_page(&self, offset: usize, limit: usize) -> RowsPage {
        let columns = self.registry.columns().to_vec();
        let rows = self
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(row_index, row)| RowView {
                row_index,
                values: columns
                    .iter()
                    .map(|column| coerce(row.get(column)))
                    .collect(),
                template: self.mapping.get_row_template(row_index).map(str::to_string),
            })
            .collect();
        RowsPage {
            columns,
            total: self.rows.len(),
            offset,
            rows,
        }
    }

    /// Mapping coverage and the next steps towards a batch.
    pub fn diagnostics(&self) -> SessionDiagnostics {
        let placeholders = self.registry.placeholders();
        let unmapped: Vec<String> = placeholders
            .iter()
            .filter(|p| self.mapping.get_mapping(p.as_str()).is_none())
            .map(PlaceholderName::to_string)
            .collect();
        let mut diagnostics = SessionDiagnostics {
            row_count: self.rows.len(),
            columns: self.registry.columns().to_vec(),
            template_count: self.templates.len(),
            placeholder_count: placeholders.len(),
            mapped_count: placeholders.len() - unmapped.len(),
            unmapped,
            recommendations: Vec::new(),
        };
        let missing_row_templates =
            self.options.multi_template && self.mapping.row_template_count() == 0;
        diagnostics.recommendations = recommend(&diagnostics, missing_row_templates);
        diagnostics
    }
}

fn loaded_report(template: &Template, notice: Option<TemplateNotice>) -> TemplateReport {
    let (status, diagnostics) = match notice {
        Some(TemplateNotice::NoPlaceholdersFound) => {
            warn!("No placeholders found in `{}`", template.file_name());
            let status = TemplateStatus::NoPlaceholdersFound {
                hint: NO_PLACEHOLDERS_HINT.to_string(),
            };
            (status, Some(inspect_template(template.content())))
        }
        None => {
            info!(
                "Loaded template `{}` with {} placeholders",
                template.file_name(),
                template.placeholders().len()
            );
            let status = TemplateStatus::Ready {
                placeholders: template.placeholders().to_vec(),
            };
            (status, None)
        }
    };
    TemplateReport {
        id: template.id().to_string(),
        file_name: template.file_name().to_string(),
        status,
        diagnostics,
    }
}

fn unreadable_report(file_name: &str, error: &TemplateError, legacy_doc: bool) -> TemplateReport {
    warn!("Template `{}` is unreadable: {}", file_name, error);
    let hint = if legacy_doc {
        LEGACY_DOC_HINT
    } else {
        UNREADABLE_HINT
    };
    TemplateReport {
        id: template_id(file_name),
        file_name: file_name.to_string(),
        status: TemplateStatus::Unreadable {
            reason: error.to_string(),
            hint: hint.to_string(),
        },
        diagnostics: Some(TemplateDiagnostics {
            legacy_doc,
            ..TemplateDiagnostics::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::RenderError;
    use crate::engine::ports::MergeFields;
    use common::model::datasource::CellValue;
    use common::model::diagnostics::Recommendation;
    use std::io::{Cursor, Write};
    use std::sync::Mutex;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn docx(text: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> = FileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        write!(
            writer,
            "<w:document><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            text
        )
        .unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn rows(names: &[&str]) -> Vec<DataRow> {
        names
            .iter()
            .map(|n| {
                DataRow::new()
                    .with("name", *n)
                    .with("date", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
            })
            .collect()
    }

    fn options(multi_template: bool) -> MergeOptions {
        MergeOptions {
            multi_template,
            date_stamp: NaiveDate::from_ymd_opt(2024, 1, 5),
            ..MergeOptions::default()
        }
    }

    /// Returns the fields it was given, serialized, as the "document".
    struct EchoEngine;

    impl RenderEngine for EchoEngine {
        fn render(&self, _: Vec<u8>, fields: &MergeFields) -> Result<Vec<u8>, RenderError> {
            let sorted: BTreeMap<_, _> = fields.iter().collect();
            Ok(format!("{:?}", sorted).into_bytes())
        }
    }

    #[test]
    fn header_only_dataset_blocks_mapping() {
        let mut session = MergeSession::new(options(false));
        session.load_template("t.docx", docx("{ten}")).unwrap();
        session.load_rows(Vec::new());
        assert!(session.columns().is_empty());
        assert!(!session.ready_for_mapping());
    }

    #[test]
    fn template_without_placeholders_is_a_notice_not_an_error() {
        let mut session = MergeSession::new(options(false));
        let notice = session.load_template("plain.docx", docx("no tags")).unwrap();
        assert_eq!(notice, Some(TemplateNotice::NoPlaceholdersFound));
        assert!(session.template("plain").is_some());
    }

    #[test]
    fn unreadable_template_is_reported_and_excluded() {
        let mut session = MergeSession::new(options(true));
        let reports = session
            .load_templates(vec![
                ("good.docx".into(), docx("{ten}")),
                ("bad.docx".into(), b"not a zip".to_vec()),
            ])
            .unwrap();
        assert!(reports[0].status.is_loaded());
        assert!(!reports[1].status.is_loaded());
        assert_eq!(session.templates().count(), 1);
        assert_eq!(session.templates_view().templates.len(), 2);
    }

    #[test]
    fn single_mode_rejects_several_templates() {
        let mut session = MergeSession::new(options(false));
        let err = session
            .load_templates(vec![
                ("a.docx".into(), docx("{a}")),
                ("b.docx".into(), docx("{b}")),
            ])
            .unwrap_err();
        assert_eq!(err, TemplateError::TooManyTemplates { count: 2 });
    }

    #[test]
    fn auto_suggest_prepopulates_and_stale_bindings_are_pruned() {
        let mut session = MergeSession::new(options(false));
        session.load_rows(rows(&["An"]));
        session.load_template("t.docx", docx("{Name} {ngay}")).unwrap();
        assert_eq!(session.get_mapping("Name"), Some("name"));
        session.set_mapping("ngay", Some("date")).unwrap();

        session.load_template("t2.docx", docx("{ngay}")).unwrap();
        assert_eq!(session.get_mapping("Name"), None);
        assert_eq!(session.get_mapping("ngay"), Some("date"));

        session.load_rows(vec![DataRow::new().with("other", "x")]);
        assert_eq!(session.get_mapping("ngay"), None);
    }

    #[test]
    fn mapping_rejects_unknown_names() {
        let mut session = MergeSession::new(options(false));
        session.load_rows(rows(&["An"]));
        session.load_template("t.docx", docx("{ten}")).unwrap();
        assert!(matches!(
            session.set_mapping("nope", Some("name")),
            Err(MappingError::UnknownPlaceholder { .. })
        ));
        assert!(matches!(
            session.set_mapping("ten", Some("missing")),
            Err(MappingError::UnknownColumn { .. })
        ));
        assert!(matches!(
            session.set_row_template(0, Some("t")),
            Err(MappingError::SingleTemplateMode)
        ));
    }

    #[test]
    fn generation_needs_rows_templates_and_a_binding() {
        let mut session = MergeSession::new(options(false));
        assert_eq!(session.plan_batch().unwrap_err(), BatchError::NoRows);
        session.load_rows(rows(&["An"]));
        assert_eq!(session.plan_batch().unwrap_err(), BatchError::NoTemplates);
        session.load_template("t.docx", docx("{ten}")).unwrap();
        assert_eq!(session.plan_batch().unwrap_err(), BatchError::NothingMapped);
        session.set_mapping("ten", Some("name")).unwrap();
        assert_eq!(session.plan_batch().unwrap().total(), 1);
    }

    #[test]
    fn single_mode_generates_every_row_in_order() {
        let mut session = MergeSession::new(options(false));
        session.load_rows(rows(&["An", "Binh"]));
        session.load_template("t.docx", docx("{ten} {ngay} {email}")).unwrap();
        session.set_mapping("ten", Some("name")).unwrap();
        session.set_mapping("ngay", Some("date")).unwrap();

        let seen = Mutex::new(Vec::new());
        let report = session
            .generate(&EchoEngine, &|p| seen.lock().unwrap().push(p.processed))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

        let docs: Vec<_> = report.successes().collect();
        assert_eq!(docs[0].filename, "An_2024-01-05.docx");
        assert_eq!(
            String::from_utf8(docs[0].bytes.clone()).unwrap(),
            r#"{"email": "", "ngay": "2024-01-05", "ten": "An"}"#
        );
        assert_eq!(docs[1].filename, "Binh_2024-01-05.docx");
    }

    #[test]
    fn multi_mode_skips_rows_without_a_template() {
        let mut session = MergeSession::new(options(true));
        session.load_rows(rows(&["An", "Binh", "Chi"]));
        session
            .load_templates(vec![
                ("letter.docx".into(), docx("{ten}")),
                ("invoice.docx".into(), docx("{ten} {ngay}")),
            ])
            .unwrap();
        session.set_mapping("ten", Some("name")).unwrap();
        assert_eq!(session.plan_batch().unwrap_err(), BatchError::NoRowTemplates);

        session.set_row_template(0, Some("invoice")).unwrap();
        session.set_row_template(2, Some("letter")).unwrap();
        assert!(matches!(
            session.set_row_template(3, Some("letter")),
            Err(MappingError::RowOutOfRange { .. })
        ));

        let seen = Mutex::new(Vec::new());
        let report = session
            .generate(&EchoEngine, &|p| seen.lock().unwrap().push((p.processed, p.total)))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
        assert_eq!(report.summary().skipped, 1);
        let names: Vec<&str> = report.successes().map(|d| d.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["invoice_An_2024-01-05.docx", "letter_Chi_2024-01-05.docx"]
        );
    }

    #[test]
    fn rows_page_is_a_window_over_rendered_values() {
        let mut session = MergeSession::new(options(true));
        session.load_rows(rows(&["An", "Binh", "Chi"]));
        session
            .load_templates(vec![("letter.docx".into(), docx("{ten}"))])
            .unwrap();
        session.set_row_template(2, Some("letter")).unwrap();

        let page = session.rows_page(1, 5);
        assert_eq!(page.columns, vec!["name", "date"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.offset, 1);
        let indexes: Vec<usize> = page.rows.iter().map(|r| r.row_index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert_eq!(page.rows[0].values, vec!["Binh", "2024-01-05"]);
        assert_eq!(page.rows[0].template, None);
        assert_eq!(page.rows[1].template.as_deref(), Some("letter"));

        assert!(session.rows_page(10, 5).rows.is_empty());
    }

    #[test]
    fn placeholder_free_template_carries_diagnostics() {
        let mut session = MergeSession::new(options(true));
        let reports = session
            .load_templates(vec![
                ("plain.docx".into(), docx("Dear [name]")),
                ("good.docx".into(), docx("{ten}")),
            ])
            .unwrap();
        let plain = reports[0].diagnostics.as_ref().unwrap();
        assert_eq!(plain.text_sample, "Dear [name]");
        assert!(reports[1].diagnostics.is_none());
    }

    #[test]
    fn legacy_doc_upload_gets_its_own_hint() {
        let mut session = MergeSession::new(options(false));
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        bytes.extend_from_slice(b"word 97");
        assert!(session.load_template("old.doc", bytes).is_err());

        let view = session.templates_view();
        let report = &view.templates[0];
        assert!(report.diagnostics.as_ref().unwrap().legacy_doc);
        assert!(matches!(
            &report.status,
            TemplateStatus::Unreadable { hint, .. } if hint == LEGACY_DOC_HINT
        ));
    }

    #[test]
    fn diagnostics_track_mapping_coverage() {
        let mut session = MergeSession::new(options(false));
        session.load_rows(rows(&["An"]));
        session.load_template("t.docx", docx("{ten} {ngay}")).unwrap();

        let before = session.diagnostics();
        assert_eq!((before.placeholder_count, before.mapped_count), (2, 0));
        assert_eq!(before.unmapped, vec!["ten", "ngay"]);
        assert_eq!(before.recommendations, vec![Recommendation::MapPlaceholders]);

        session.set_mapping("ten", Some("name")).unwrap();
        let after = session.diagnostics();
        assert_eq!(after.mapped_count, 1);
        assert_eq!(after.unmapped, vec!["ngay"]);
        assert_eq!(after.recommendations, vec![Recommendation::ReadyToGenerate]);
    }

    #[test]
    fn identical_upload_is_reported_unchanged() {
        struct OneRow;
        impl TableReader for OneRow {
            fn read_table(&self, _: &[u8]) -> Result<Vec<DataRow>, TableError> {
                Ok(vec![DataRow::new().with("name", "An").with("amount", 42.0)])
            }
        }

        let mut session = MergeSession::default();
        let first = session.load_table(&OneRow, b"bytes").unwrap();
        assert!(!first.unchanged);
        assert_eq!(first.row_count, 1);
        assert_eq!(first.columns[1].kind, CellValue::Number(42.0).kind());
        assert_eq!(first.columns[1].first_row.as_deref(), Some("42"));

        let second = session.load_table(&OneRow, b"bytes").unwrap();
        assert!(second.unchanged);
        assert_eq!(second.fingerprint, first.fingerprint);
    }
}
