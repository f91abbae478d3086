//! Export module tests

use nlu_import_sdk::export::CsvExporter;
use nlu_import_sdk::import::canonical::CanonicalCsvImporter;
use nlu_import_sdk::import::watson::WatsonImporter;

#[test]
fn test_flat_csv_round_trip() {
    let imported = CanonicalCsvImporter::new()
        .import_csv("greeting,hello\ngreeting,hi there\nfarewell,bye\n")
        .unwrap();
    let exported = CsvExporter::new().export(&imported).unwrap();
    assert_eq!(
        exported.content,
        "greeting,hello\ngreeting,hi there\nfarewell,bye\n"
    );
}

#[test]
fn test_export_keeps_placeholder_text() {
    let payload = serde_json::json!({
        "intents": [{
            "intent": "go",
            "examples": [{ "text": "to Paris", "mentions": [{ "entity": "city", "location": [3, 8] }] }]
        }],
        "entities": [{
            "entity": "city",
            "values": [{ "value": "Paris", "type": "synonyms", "synonyms": [] }]
        }]
    })
    .to_string();

    let imported = WatsonImporter::new().import_json(&payload).unwrap();
    let key = imported.slots[0].key.clone();
    let exported = CsvExporter::new().export(&imported).unwrap();
    assert_eq!(
        exported.content,
        format!("go,to {{{{[city].{key}}}}}\n")
    );
}
