//! Fixed synthetic patient set and placeholder chart images for demo seeding.
//!
//! # Invariants
//! - Content is fixed; every call returns the same records in the same order.
//! - Records are returned unsaved (`key = None`).
//! - Placeholder images are never empty.

use crate::model::record::{
    Allergy, Attachment, AttachmentError, Medication, PatientRecord, PersonalInformation,
    Severity, Vitals,
};

/// Media type of generated placeholder images.
pub const PLACEHOLDER_MEDIA_TYPE: &str = "image/svg+xml";

/// Returns the synthetic patients used to populate a fresh installation.
pub fn synthetic_patients() -> Vec<PatientRecord> {
    vec![
        patient(
            ["John", "Smith", "1965-03-15", "Male", "MRN-10001"],
            ["130/85 mmHg", "72 bpm", "98.6°F", "16 breaths/min"],
            &[("Penicillin", Severity::Severe)],
            &[("Lisinopril", "10mg", "Once daily"), ("Atorvastatin", "20mg", "Once daily")],
            &["Hypertension", "Hyperlipidemia"],
            "Patient presents for annual check-up. Vitals stable. Continue current medications.",
        ),
        patient(
            ["Emily", "Jones", "1982-07-22", "Female", "MRN-10002"],
            ["118/78 mmHg", "65 bpm", "98.7°F", "14 breaths/min"],
            &[("Pollen", Severity::Mild)],
            &[("Albuterol Inhaler", "2 puffs", "As needed for wheezing")],
            &["Asthma"],
            "Follow-up for asthma management. Patient reports good symptom control.",
        ),
        patient(
            ["Michael", "Williams", "1958-11-02", "Male", "MRN-10003"],
            ["140/90 mmHg", "80 bpm", "98.5°F", "18 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Metformin", "500mg", "Twice daily"), ("Glibenclamide", "5mg", "Once daily")],
            &["Type 2 Diabetes Mellitus"],
            "Discussed diet and exercise modifications. A1C levels slightly elevated.",
        ),
        patient(
            ["Jessica", "Brown", "1990-01-30", "Female", "MRN-10004"],
            ["122/80 mmHg", "88 bpm", "99.0°F", "16 breaths/min"],
            &[("Sulfa Drugs", Severity::Moderate)],
            &[("Sertraline", "50mg", "Once daily")],
            &["Anxiety", "Depression"],
            "Patient reports feeling better on current medication. No side effects noted.",
        ),
        patient(
            ["David", "Garcia", "1975-09-12", "Male", "MRN-10005"],
            ["125/82 mmHg", "75 bpm", "98.6°F", "15 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Omeprazole", "20mg", "Once daily")],
            &["Gastroesophageal Reflux Disease (GERD)"],
            "Patient reports decreased heartburn with daily Omeprazole.",
        ),
        patient(
            ["Sarah", "Miller", "1969-05-25", "Female", "MRN-10006"],
            ["135/88 mmHg", "70 bpm", "98.4°F", "16 breaths/min"],
            &[("Ibuprofen", Severity::Mild)],
            &[("Acetaminophen", "500mg", "As needed for pain")],
            &["Osteoarthritis"],
            "Patient c/o chronic knee pain. Discussed physical therapy options.",
        ),
        patient(
            ["James", "Davis", "1988-08-08", "Male", "MRN-10007"],
            ["120/75 mmHg", "68 bpm", "98.7°F", "14 breaths/min"],
            &[("Peanuts", Severity::Severe)],
            &[("Epinephrine Auto-Injector", "0.3mg", "Carry at all times")],
            &["Peanut Allergy"],
            "Patient educated on avoiding peanuts and using EpiPen.",
        ),
        patient(
            ["Maria", "Rodriguez", "1995-02-18", "Female", "MRN-10008"],
            ["110/70 mmHg", "85 bpm", "98.8°F", "16 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Sumatriptan", "50mg", "As needed for migraine")],
            &["Migraine with Aura"],
            "Patient reports Sumatriptan is effective in aborting migraines.",
        ),
        patient(
            ["Robert", "Martinez", "1971-12-01", "Male", "MRN-10009"],
            ["138/84 mmHg", "78 bpm", "98.5°F", "17 breaths/min"],
            &[("Codeine", Severity::Moderate)],
            &[("Hydrochlorothiazide", "25mg", "Once daily")],
            &["Hypertension"],
            "Blood pressure remains slightly elevated. Advised to monitor at home.",
        ),
        patient(
            ["Linda", "Hernandez", "1955-04-10", "Female", "MRN-10010"],
            ["128/80 mmHg", "72 bpm", "98.6°F", "16 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Alendronate", "70mg", "Once weekly")],
            &["Osteoporosis"],
            "Reminder to take medication with a full glass of water and remain upright for 30 minutes.",
        ),
        patient(
            ["William", "Lopez", "1992-06-07", "Male", "MRN-10011"],
            ["115/72 mmHg", "60 bpm", "98.7°F", "12 breaths/min"],
            &[("Cat Dander", Severity::Mild)],
            &[("Loratadine", "10mg", "As needed for allergies")],
            &["Allergic Rhinitis"],
            "Patient reports symptoms are seasonal and well-controlled with antihistamines.",
        ),
        patient(
            ["Elizabeth", "Gonzalez", "1985-10-14", "Female", "MRN-10012"],
            ["120/78 mmHg", "70 bpm", "98.6°F", "15 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Levothyroxine", "50mcg", "Once daily")],
            &["Hypothyroidism"],
            "TSH levels within normal range on current dose. Continue medication.",
        ),
        patient(
            ["Richard", "Wilson", "1963-01-20", "Male", "MRN-10013"],
            ["133/85 mmHg", "74 bpm", "98.5°F", "16 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Rosuvastatin", "10mg", "Once daily")],
            &["Hyperlipidemia"],
            "Lipid panel shows improvement. Continue statin therapy and lifestyle changes.",
        ),
        patient(
            ["Susan", "Anderson", "1978-03-03", "Female", "MRN-10014"],
            ["105/65 mmHg", "62 bpm", "98.8°F", "14 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Ferrous Sulfate", "325mg", "Once daily")],
            &["Iron Deficiency Anemia"],
            "Patient reports less fatigue. Repeat CBC in 3 months.",
        ),
        patient(
            ["Joseph", "Thomas", "1998-11-28", "Male", "MRN-10015"],
            ["120/80 mmHg", "90 bpm", "98.9°F", "18 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[],
            &["Generalized Anxiety Disorder"],
            "Patient referred to cognitive behavioral therapy. Declined medication at this time.",
        ),
        patient(
            ["Karen", "Taylor", "1960-08-19", "Female", "MRN-10016"],
            ["145/92 mmHg", "82 bpm", "98.6°F", "16 breaths/min"],
            &[("Aspirin", Severity::Moderate)],
            &[("Amlodipine", "5mg", "Once daily"), ("Lisinopril", "20mg", "Once daily")],
            &["Hypertension", "Chronic Kidney Disease Stage 2"],
            "BP not at goal. Increased Lisinopril dose. Monitor renal function.",
        ),
        patient(
            ["Charles", "Moore", "1953-07-04", "Male", "MRN-10017"],
            ["130/80 mmHg", "68 bpm", "98.5°F", "14 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Tamsulosin", "0.4mg", "Once daily")],
            &["Benign Prostatic Hyperplasia (BPH)"],
            "Patient reports improvement in urinary symptoms.",
        ),
        patient(
            ["Nancy", "Jackson", "1949-12-30", "Female", "MRN-10018"],
            ["128/78 mmHg", "70 bpm", "98.6°F", "16 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Warfarin", "5mg", "Once daily")],
            &["Atrial Fibrillation"],
            "INR is therapeutic at 2.5. Continue current dose and monitor weekly.",
        ),
        patient(
            ["Daniel", "White", "2001-04-21", "Male", "MRN-10019"],
            ["124/76 mmHg", "70 bpm", "99.2°F", "16 breaths/min"],
            &[("No Known Allergies", Severity::Unknown)],
            &[("Amoxicillin", "500mg", "Three times daily for 10 days")],
            &["Acute Otitis Media"],
            "Patient presents with right ear pain. Examination confirms infection.",
        ),
        patient(
            ["Patricia", "Harris", "1973-02-14", "Female", "MRN-10020"],
            ["122/82 mmHg", "77 bpm", "98.7°F", "15 breaths/min"],
            &[("Shellfish", Severity::Severe)],
            &[("Fluticasone Nasal Spray", "2 sprays per nostril", "Once daily")],
            &["Chronic Sinusitis"],
            "Patient finds nasal spray helps with congestion. Continue use.",
        ),
    ]
}

/// Renders a 400x500 placeholder chart image naming the patient.
pub fn placeholder_image(name: &str, mrn: &str) -> Result<Attachment, AttachmentError> {
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="500" viewBox="0 0 400 500">
<rect width="400" height="500" fill="#f8fafc"/>
<text x="200" y="50" text-anchor="middle" font-family="sans-serif" font-size="24" font-weight="bold" fill="#1e293b">Patient Chart (DEMO)</text>
<text x="30" y="100" font-family="sans-serif" font-size="16" fill="#1e293b">Name: {name}</text>
<text x="30" y="130" font-family="sans-serif" font-size="16" fill="#1e293b">MRN: {mrn}</text>
<line x1="30" y1="160" x2="370" y2="160" stroke="#94a3b8" stroke-width="1"/>
<text x="30" y="190" font-family="sans-serif" font-size="16" fill="#1e293b">Notes:</text>
<text x="30" y="220" font-family="Courier New, monospace" font-size="14" fill="#1e293b">This is a synthetic patient record</text>
<text x="30" y="240" font-family="Courier New, monospace" font-size="14" fill="#1e293b">generated for demonstration purposes.</text>
<text x="30" y="260" font-family="Courier New, monospace" font-size="14" fill="#1e293b">The associated image is a placeholder.</text>
</svg>
"##,
        name = escape_xml(name),
        mrn = escape_xml(mrn),
    );
    Attachment::new(PLACEHOLDER_MEDIA_TYPE, svg.into_bytes())
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn patient(
    [first_name, last_name, date_of_birth, gender, mrn]: [&str; 5],
    [blood_pressure, heart_rate, temperature, respiratory_rate]: [&str; 4],
    allergies: &[(&str, Severity)],
    medications: &[(&str, &str, &str)],
    diagnosis: &[&str],
    notes: &str,
) -> PatientRecord {
    PatientRecord {
        key: None,
        personal_information: PersonalInformation {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: date_of_birth.to_string(),
            gender: gender.to_string(),
            medical_record_number: mrn.to_string(),
        },
        vitals: Some(Vitals {
            blood_pressure: blood_pressure.to_string(),
            heart_rate: heart_rate.to_string(),
            temperature: temperature.to_string(),
            respiratory_rate: respiratory_rate.to_string(),
        }),
        allergies: allergies
            .iter()
            .map(|(name, severity)| Allergy::new(*name, *severity))
            .collect(),
        medications: medications
            .iter()
            .map(|(name, dosage, frequency)| Medication::new(*name, *dosage, *frequency))
            .collect(),
        diagnosis: diagnosis.iter().map(|entry| (*entry).to_string()).collect(),
        notes: Some(notes.to_string()),
        summary: None,
    }
}
