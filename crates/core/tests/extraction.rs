use hc_core::extractors::{extract_diagnoses, extract_medications};
use hc_core::{
    compute_stays, DiagnosisRole, DocumentExtractor, ExtractionConfig, ServiceEncounter,
};
use hc_types::NonEmptyText;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn as_str(value: &Option<NonEmptyText>) -> Option<&str> {
    value.as_ref().map(NonEmptyText::as_str)
}

fn extract(text: &str) -> hc_core::AggregatedDocument {
    DocumentExtractor::new(ExtractionConfig::default()).extract(text)
}

const RECORD: &str = "\
HISTORIA CLINICA
CC 123456 -- PEREZ GOMEZ JUAN Fec. Nacimiento: 01/01/1980
SEDE DE ATENCION 001 HOSPITAL SAN RAFAEL FOLIO 1 FECHA 10/01/2024 08:00:00 TIPO DE ATENCION : URGENCIAS
DX: A09 GASTROENTERITIS
FORMULA MEDICA
2 ACETAMINOFEN 500MG
Via: ORAL
";

#[test]
fn end_to_end_record() {
    let doc = extract(RECORD);

    assert_eq!(as_str(&doc.paciente.documento), Some("123456"));
    assert_eq!(as_str(&doc.paciente.nombre), Some("PEREZ GOMEZ JUAN"));
    assert_eq!(as_str(&doc.paciente.fecha_nacimiento), Some("01/01/1980"));

    assert_eq!(doc.servicios.len(), 1);
    assert_eq!(as_str(&doc.servicios[0].tipo_atencion), Some("URGENCIAS"));

    assert_eq!(doc.diagnosticos.len(), 1);
    assert_eq!(as_str(&doc.diagnosticos[0].codigo), Some("A09"));
    assert_eq!(doc.diagnosticos[0].tipo, DiagnosisRole::Principal);

    assert_eq!(doc.medicamentos.len(), 1);
    let medication = &doc.medicamentos[0];
    assert_eq!(medication.cantidad.as_str(), "2");
    assert!(as_str(&medication.dosis).is_some_and(|d| d.contains("500MG")));
    assert_eq!(as_str(&medication.via), Some("ORAL"));

    assert_eq!(doc.estancias.len(), 1);
    assert_eq!(doc.estancias[0].dias_estancia, None);
}

#[test]
fn first_diagnosis_is_principal_whatever_its_code() {
    let text = "DX: Z00 CONTROL\nDX: A09 GASTROENTERITIS\nDIAGNOSTICO RELACIONADO: R10.4 DOLOR ABDOMINAL";
    let roles: Vec<DiagnosisRole> = extract_diagnoses(text).into_iter().map(|d| d.tipo).collect();
    assert_eq!(
        roles,
        vec![
            DiagnosisRole::Principal,
            DiagnosisRole::Secundario,
            DiagnosisRole::Secundario
        ]
    );
}

#[test]
fn route_beyond_the_window_is_not_attached() {
    let text = "FORMULA MEDICA\n1 OMEPRAZOL 20MG\nsin novedad\nsin novedad\nsin novedad\nsin novedad\nsin novedad\nsin novedad\nsin novedad\nVia: ORAL";
    let medications = extract_medications(text, 5);

    assert_eq!(medications.len(), 1);
    assert_eq!(medications[0].via, None);

    let wide = extract_medications(text, 10);
    assert_eq!(as_str(&wide[0].via), Some("ORAL"));
}

#[test]
fn same_drug_in_two_blocks_is_listed_twice() {
    let text = "FORMULA MEDICA\n2 ACETAMINOFEN 500MG TABLETA\nCONCILIACION MEDICAMENTOSA\nACETAMINOFEN 500MG TABLETA";
    let medications = extract_medications(text, 5);

    let descriptions: Vec<&str> = medications.iter().map(|m| m.descripcion.as_str()).collect();
    assert_eq!(
        descriptions,
        vec!["ACETAMINOFEN 500MG TABLETA", "ACETAMINOFEN 500MG TABLETA"]
    );
    assert_eq!(medications[0].cantidad.as_str(), "2");
    assert_eq!(medications[1].cantidad.as_str(), "1");
}

#[test]
fn unrelated_regions_do_not_change_medications() {
    let prescription = "FORMULA MEDICA\n2 ACETAMINOFEN 500MG\nVia: ORAL\nFrecuencia: CADA 8 HORAS\n";
    let unrelated = "ORDENES DE LABORATORIO\n1 HEMOGRAMA\nResultado: NORMAL\nEVOLUCION MEDICA\nPaciente estable, via oral tolerada\n";

    let alone = extract(prescription);
    let with_noise = extract(&format!("{unrelated}{prescription}{unrelated}"));

    assert_eq!(alone.medicamentos, with_noise.medicamentos);
    assert_eq!(alone.diagnosticos, with_noise.diagnosticos);
}

#[test]
fn dated_notes_do_not_leak_into_neighbouring_sections() {
    let prescription = "FORMULA MEDICA\n2 ACETAMINOFEN 500MG\nVia: ORAL\n";
    let labs = "ORDENES DE LABORATORIO\n1 HEMOGRAMA\nResultado: NORMAL\n";
    let note = "EVOLUCION MEDICA 12/01/2024 09:00\nPaciente estable\n1 ampolla de dipirona 1 G fue suspendida\n";
    let discharge = "EPICRISIS 15/01/2024\nResumen: alta\n";

    let full = extract(&format!(
        "{note}{prescription}{note}{labs}{note}{discharge}{note}"
    ));

    assert_eq!(full.medicamentos, extract(prescription).medicamentos);
    assert_eq!(full.laboratorios, extract(labs).laboratorios);
    assert_eq!(full.altas, extract(discharge).altas);

    let single = extract(note).evoluciones;
    assert_eq!(single.len(), 1);
    assert_eq!(full.evoluciones, vec![single[0].clone(); 4]);
}

#[test]
fn stay_is_counted_in_calendar_days() {
    let encounter = |admission: &str, discharge: &str| ServiceEncounter {
        sede_codigo: None,
        sede_nombre: None,
        tipo_atencion: NonEmptyText::optional("HOSPITALIZACION"),
        fecha_ingreso: NonEmptyText::optional(admission),
        hora_ingreso: NonEmptyText::optional("08:00"),
        fecha_egreso: NonEmptyText::optional(discharge),
        hora_egreso: NonEmptyText::optional("10:00"),
    };

    let stays = compute_stays(&[
        encounter("2024-01-10", "2024-01-15"),
        encounter("15/01/2024", "10/01/2024"),
    ]);
    assert_eq!(stays[0].dias_estancia, Some(5));
    assert_eq!(stays[1].dias_estancia, Some(-5));
}

#[test]
fn text_without_headers_yields_empty_sequences() {
    let doc = extract("lorem ipsum dolor sit amet\n\n\t12 34 :: --");
    assert!(doc.servicios.is_empty());
    assert!(doc.medicamentos.is_empty());
    assert!(doc.procedimientos.is_empty());
    assert!(doc.cirugias.is_empty());
    assert!(doc.estancias.is_empty());
}

fn template_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("FORMULA MEDICA".to_string()),
        Just("CONCILIACION MEDICAMENTOSA".to_string()),
        Just("PROCEDIMIENTOS QUIRURGICOS".to_string()),
        Just("ORDENES DE LABORATORIO".to_string()),
        Just("DESCRIPCION QUIRURGICA".to_string()),
        Just("Via: ".to_string()),
        Just("DX: ".to_string()),
        Just("Fecha de Aplicación: 31/02/2024 25:99".to_string()),
        "[0-9]{1,3} [A-Z]{3,10} [0-9]{1,4}MG",
        "\\PC{0,40}",
    ]
}

proptest! {
    #[test]
    fn extraction_is_total(lines in prop::collection::vec(template_fragment(), 0..40)) {
        let text = lines.join("\n");
        let doc = extract(&text);
        prop_assert_eq!(doc.estancias.len(), doc.servicios.len());
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC*") {
        let doc = extract(&text);
        prop_assert_eq!(doc.estancias.len(), doc.servicios.len());
    }
}
