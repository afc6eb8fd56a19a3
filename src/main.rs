//! Command-line entry point: OCR a scanned prescription and print the
//! extracted medication names, optionally with drug-safety registry lookups.

use medi_scan::cache::{document_fingerprint, DocumentCache};
use medi_scan::config::AppConfig;
use medi_scan::dur::DurClient;
use medi_scan::observability;
use medi_scan::ocr::OcrClient;
use medi_scan::MedicationExtractor;
use std::time::Instant;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    observability::init_tracing()?;

    let mut args = std::env::args().skip(1);
    let Some(document_path) = args.next() else {
        eprintln!("usage: medi-scan <document> [--safety]");
        std::process::exit(2);
    };
    let with_safety = args.any(|arg| arg == "--safety");

    let config = AppConfig::from_env()?;
    config.validate()?;

    let document = tokio::fs::read(&document_path).await?;
    let fingerprint = document_fingerprint(&document);
    let cache = DocumentCache::default();

    let text = match cache.get(fingerprint) {
        Some(text) => {
            observability::record_cache_metrics(true);
            text
        }
        None => {
            observability::record_cache_metrics(false);
            let ocr_started = Instant::now();
            let client = OcrClient::new(config.clone())?;
            let file_name = std::path::Path::new(&document_path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            let document_size = document.len();
            match client.recognize(document, &file_name).await {
                Ok(text) => {
                    observability::record_ocr_metrics(true, ocr_started.elapsed(), document_size);
                    cache.insert(fingerprint, text.clone());
                    text
                }
                Err(err) => {
                    observability::record_ocr_metrics(false, ocr_started.elapsed(), document_size);
                    error!("OCR failed for '{}': {}", document_path, err);
                    return Err(err.into());
                }
            }
        }
    };

    let extractor = MedicationExtractor::new();
    let started = Instant::now();
    let outcome = extractor.extract(&text)?;
    observability::record_extraction_metrics(
        started.elapsed(),
        text.chars().count(),
        outcome.trace.candidates.len(),
        outcome.medications.len(),
    );

    if outcome.medications.is_empty() {
        println!("인식된 약품이 없습니다.");
        return Ok(());
    }

    info!(
        "Extracted {} medications from '{}'",
        outcome.medications.len(),
        document_path
    );
    for (index, name) in outcome.medications.iter().enumerate() {
        println!("{}. {}", index + 1, name);
    }

    if with_safety {
        let Some(service_key) = config.dur_api_key.clone() else {
            eprintln!("DUR_API_KEY is not set; skipping safety lookups");
            return Ok(());
        };
        let dur = DurClient::new(
            config.dur_base_url.clone(),
            service_key,
            config.recovery.operation_timeout_secs,
        )?;
        for name in &outcome.medications {
            let lookup_started = Instant::now();
            let safety_info = dur.fetch_safety_info(name).await;
            observability::record_registry_metrics(safety_info.len(), lookup_started.elapsed());
            if safety_info.is_empty() {
                println!("\n[{}] 등록된 안전 정보 없음", name);
                continue;
            }
            println!("\n[{}] 안전 정보:", name);
            for (info_type, records) in &safety_info {
                println!("  - {} ({}건)", info_type, records.len());
            }
        }
    }

    Ok(())
}
