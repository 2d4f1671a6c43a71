// src/pipeline/mod.rs

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::audit::{self, AuditLog, ResultCode};
use crate::discover::{self, SheetFormat};
use crate::extract::{self, RawTable, Value};
use crate::soap::{self, EnvelopeOptions, EventRecord, RowError, REQUIRED_COLUMNS};
use crate::stats::RunStats;
use crate::submit::{SoapClient, CONNECTION_ERROR_DETAIL};

pub struct RunConfig {
    pub excel_dir: PathBuf,
    pub soap_endpoint: String,
    pub log_path: PathBuf,
    pub envelope: EnvelopeOptions,
}

impl RunConfig {
    pub fn new(excel_dir: impl Into<PathBuf>, soap_endpoint: impl Into<String>) -> Self {
        RunConfig {
            excel_dir: excel_dir.into(),
            soap_endpoint: soap_endpoint.into(),
            log_path: PathBuf::from(audit::LOG_FILE_NAME),
            envelope: EnvelopeOptions::default(),
        }
    }
}

/// Run the whole batch: enumerate workbooks, validate and submit every row,
/// audit every outcome. Only configuration problems (bad directory,
/// unwritable audit log) abort the run; everything per-file or per-row is
/// classified, logged, counted, and skipped over.
pub fn run(config: &RunConfig) -> Result<RunStats> {
    // Enumerate first: a bad directory must abort before the audit log of
    // the previous run is truncated.
    let files = discover::find_workbooks(&config.excel_dir)?;
    info!(
        dir = %config.excel_dir.display(),
        files = files.len(),
        "discovered workbooks"
    );

    let log = AuditLog::create(&config.log_path)?;
    let client = SoapClient::new(&config.soap_endpoint)?;

    let mut stats = RunStats::default();
    for path in &files {
        process_file(path, &client, &log, config.envelope, &mut stats)?;
    }

    stats.report(log.path());
    Ok(stats)
}

/// Read one workbook and feed its table through validation and submission.
/// An unreadable file produces a single audit record and moves on.
fn process_file(
    path: &Path,
    client: &SoapClient,
    log: &AuditLog,
    envelope: EnvelopeOptions,
    stats: &mut RunStats,
) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    // discover only yields known extensions; default is a harmless fallback
    let format = SheetFormat::from_path(path).unwrap_or(SheetFormat::Xlsx);

    let table = match extract::load_table(path, format) {
        Ok(table) => table,
        Err(e) => {
            error!(file = %file_name, error = %e, "failed to read workbook");
            log.append(
                &file_name,
                None,
                None,
                ResultCode::ErrorLecturaProcesoArchivo,
                &format!("Error crítico leyendo o procesando el archivo: {e}"),
            )?;
            return Ok(());
        }
    };

    info!(file = %file_name, rows = table.rows.len(), "processing file");
    process_table(&file_name, &table, client, log, envelope, stats)
}

/// Validation and submission for one already-extracted table. Split out from
/// `process_file` so the row pipeline can be exercised without workbook
/// fixtures on disk.
fn process_table(
    file_name: &str,
    table: &RawTable,
    client: &SoapClient,
    log: &AuditLog,
    envelope: EnvelopeOptions,
    stats: &mut RunStats,
) -> Result<()> {
    stats.files_read += 1;
    stats.rows_read += table.rows.len() as u64;

    let missing = table.missing_columns(&REQUIRED_COLUMNS);
    if !missing.is_empty() {
        let detail = format!(
            "Cabecera no contiene todas las columnas esperadas. Faltantes: {}",
            missing.join(", ")
        );
        warn!(file = %file_name, missing = ?missing, "file skipped: bad header");
        // one record for the whole file, not one per row
        log.append(file_name, None, None, ResultCode::OmitidoCabecera, &detail)?;
        stats.rows_skipped += table.rows.len() as u64;
        return Ok(());
    }

    for (index, row) in table.rows.iter().enumerate() {
        stats.rows_processed += 1;
        let line = (index + 2) as u32; // header row + 1-based display
        process_row(file_name, line, table, row, client, log, envelope, stats)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn process_row(
    file_name: &str,
    line: u32,
    table: &RawTable,
    row: &[Value],
    client: &SoapClient,
    log: &AuditLog,
    envelope: EnvelopeOptions,
    stats: &mut RunStats,
) -> Result<()> {
    let nulls = table.null_fields(row, &REQUIRED_COLUMNS);
    if !nulls.is_empty() {
        let detail = format!(
            "Contiene valores nulos en columnas esperadas: {}",
            nulls.join(", ")
        );
        warn!(file = %file_name, line, nulls = ?nulls, "row skipped: null required fields");
        log.append(file_name, Some(line), None, ResultCode::OmitidoNulos, &detail)?;
        stats.rows_skipped += 1;
        return Ok(());
    }

    let (record, body) = match build_row_request(table, row, envelope) {
        Ok(built) => built,
        Err(e) => {
            match e.downcast_ref::<RowError>() {
                Some(RowError::MissingColumn(_)) => {
                    warn!(file = %file_name, line, error = %e, "row skipped: missing data");
                    log.append(
                        file_name,
                        Some(line),
                        None,
                        ResultCode::ErrorDatosFila,
                        &e.to_string(),
                    )?;
                    stats.rows_skipped += 1;
                }
                None => {
                    error!(file = %file_name, line, error = %e, "unexpected error building row");
                    log.append(
                        file_name,
                        Some(line),
                        None,
                        ResultCode::ErrorProcesandoFila,
                        &format!("Error inesperado procesando fila: {e}"),
                    )?;
                    stats.rows_failed += 1;
                }
            }
            return Ok(());
        }
    };

    info!(file = %file_name, line, pnr = %record.pnr, "submitting SOAP request");
    match client.send(&body) {
        None => {
            error!(file = %file_name, line, pnr = %record.pnr, "no response from endpoint");
            log.append(
                file_name,
                Some(line),
                None,
                ResultCode::ErrorConexion,
                CONNECTION_ERROR_DETAIL,
            )?;
            stats.rows_failed += 1;
        }
        Some(response) if response.is_success() => {
            info!(file = %file_name, line, pnr = %record.pnr, status = response.status, "row submitted");
            log.append(file_name, Some(line), Some(response.status), ResultCode::Ok, "")?;
            stats.rows_sent += 1;
        }
        Some(response) => {
            let detail = response.error_detail();
            error!(
                file = %file_name,
                line,
                pnr = %record.pnr,
                status = response.status,
                "endpoint rejected row"
            );
            log.append(
                file_name,
                Some(line),
                Some(response.status),
                ResultCode::ErrorHttp,
                &detail,
            )?;
            stats.rows_failed += 1;
        }
    }
    Ok(())
}

fn build_row_request(
    table: &RawTable,
    row: &[Value],
    options: EnvelopeOptions,
) -> Result<(EventRecord, String)> {
    let record = EventRecord::from_row(table, row)?;
    let body = soap::build_envelope(&record, options);
    Ok((record, body))
}
