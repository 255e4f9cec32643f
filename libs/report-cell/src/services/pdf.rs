//! PDF rendering with `printpdf` builtin fonts. A4 portrait, manual
//! y-cursor, word wrapping at a fixed column width.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::models::{HistoryDocument, PrescriptionDocument, ReportError, ReportRow};

const WRAP_COLUMNS: usize = 80;

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?;

        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: Mm(280.0),
        })
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(280.0);
    }

    fn ensure_space(&mut self) {
        if self.y < Mm(20.0) {
            self.break_page();
        }
    }

    fn title(&mut self, text: &str) {
        self.ensure_space();
        self.layer.use_text(text, 14.0, Mm(20.0), self.y, &self.bold);
        self.y -= Mm(10.0);
    }

    fn heading(&mut self, text: &str) {
        self.ensure_space();
        self.layer.use_text(text, 11.0, Mm(20.0), self.y, &self.bold);
        self.y -= Mm(6.0);
    }

    fn line(&mut self, text: &str) {
        for wrapped in wrap_text(text, WRAP_COLUMNS) {
            self.ensure_space();
            self.layer.use_text(&wrapped, 9.0, Mm(25.0), self.y, &self.font);
            self.y -= Mm(4.5);
        }
    }

    fn gap(&mut self, amount: Mm) {
        self.y -= amount;
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Render(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ReportError::Render(format!("PDF buffer error: {e}")))
    }
}

pub fn render_prescription(document: &PrescriptionDocument) -> Result<Vec<u8>, ReportError> {
    let mut page = PageWriter::new("Prescription")?;

    page.title("MEDICAL PRESCRIPTION");
    page.line(&format!(
        "Patient: {} {} ({})",
        document.patient.first_name, document.patient.last_name, document.patient.code
    ));
    page.line(&format!("Age: {}", fmt_i32(document.patient.age)));
    page.line(&format!(
        "Appointment: {} at {}",
        document.appointment.date,
        document.appointment.time.format("%H:%M")
    ));
    page.line(&format!("Attending doctor: {}", document.doctor_name));
    page.line(&format!("Issued on: {}", document.prescription.issued_on));
    page.gap(Mm(4.0));

    if let Some(vitals) = &document.vitals {
        page.heading("VITAL SIGNS:");
        page.line(&format!(
            "weight: {} kg  bp: {}  temp: {} C",
            fmt_f64(vitals.weight_kg),
            vitals.blood_pressure.as_deref().unwrap_or("-"),
            fmt_f64(vitals.temperature_c),
        ));
        page.line(&format!(
            "hr: {} bpm  rr: {} rpm  spo2: {} %",
            fmt_i32(vitals.heart_rate),
            fmt_i32(vitals.respiratory_rate),
            fmt_i32(vitals.oxygen_saturation),
        ));
        page.gap(Mm(4.0));
    }

    page.heading("DIAGNOSIS:");
    page.line(&document.prescription.diagnosis);
    page.gap(Mm(4.0));

    page.heading("MEDICATIONS:");
    page.line(&document.prescription.medications);
    page.gap(Mm(4.0));

    if let Some(instructions) = &document.prescription.instructions {
        page.heading("INSTRUCTIONS:");
        page.line(instructions);
    }
    page.gap(Mm(16.0));

    page.line("_______________________________");
    page.line(&format!("Dr. {}", document.doctor_name));

    page.finish()
}

pub fn render_history(document: &HistoryDocument) -> Result<Vec<u8>, ReportError> {
    let mut page = PageWriter::new("Clinical history")?;

    page.title("CLINICAL HISTORY");
    page.line(&format!(
        "Patient: {} {} ({})",
        document.patient.first_name, document.patient.last_name, document.patient.code
    ));
    page.line(&format!(
        "Born: {}   Phone: {}",
        document.patient.birth_date,
        document.patient.phone.as_deref().unwrap_or("-")
    ));
    page.line(&format!("First visit: {}", document.patient.first_visit));
    page.gap(Mm(4.0));

    page.heading("APPOINTMENTS:");
    if document.appointments.is_empty() {
        page.line("No appointments on record.");
    }
    for appointment in &document.appointments {
        page.line(&format!(
            "{} {}  [{}]  {}",
            appointment.date,
            appointment.time.format("%H:%M"),
            appointment.status,
            appointment.diagnosis.as_deref().unwrap_or("-")
        ));
    }
    page.gap(Mm(4.0));

    page.heading("VITAL SIGNS:");
    if document.vitals.is_empty() {
        page.line("No vital signs recorded.");
    }
    for vitals in &document.vitals {
        page.line(&format!(
            "{}  weight: {}  bp: {}  temp: {}  hr: {}  rr: {}  spo2: {}",
            vitals.recorded_at.format("%Y-%m-%d"),
            fmt_f64(vitals.weight_kg),
            vitals.blood_pressure.as_deref().unwrap_or("-"),
            fmt_f64(vitals.temperature_c),
            fmt_i32(vitals.heart_rate),
            fmt_i32(vitals.respiratory_rate),
            fmt_i32(vitals.oxygen_saturation),
        ));
    }
    page.gap(Mm(4.0));

    page.heading("RECENT DIAGNOSES:");
    if document.recent_diagnoses.is_empty() {
        page.line("None.");
    }
    for entry in &document.recent_diagnoses {
        page.line(&format!(
            "{}  {}",
            entry.recorded_at.format("%Y-%m-%d"),
            entry.text
        ));
    }
    page.gap(Mm(4.0));

    page.heading("RECENT PRESCRIPTIONS:");
    if document.recent_prescriptions.is_empty() {
        page.line("None.");
    }
    for prescription in &document.recent_prescriptions {
        page.line(&format!(
            "{}  {} - {}",
            prescription.issued_on, prescription.diagnosis, prescription.medications
        ));
    }
    page.gap(Mm(4.0));

    page.heading("STUDIES:");
    if document.studies.is_empty() {
        page.line("None.");
    }
    for study in &document.studies {
        page.line(&format!(
            "{}  {}  {}",
            study.uploaded_at.format("%Y-%m-%d"),
            study.file_name,
            study.description.as_deref().unwrap_or("-")
        ));
        if let Some(text) = &study.extracted_text {
            page.line(text);
        }
        page.gap(Mm(2.0));
    }

    page.finish()
}

pub fn render_period_report(title: &str, rows: &[ReportRow]) -> Result<Vec<u8>, ReportError> {
    let mut page = PageWriter::new(title)?;

    page.title(title);
    page.line(&format!("Total appointments: {}", rows.len()));
    page.gap(Mm(4.0));

    if rows.is_empty() {
        page.line("No appointments in this period.");
    }
    for row in rows {
        page.line(&format!(
            "{} {}  {}  [{}]",
            row.appointment.date,
            row.appointment.time.format("%H:%M"),
            row.patient_name,
            row.appointment.status
        ));
    }

    page.finish()
}

fn fmt_f64(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

fn fmt_i32(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
