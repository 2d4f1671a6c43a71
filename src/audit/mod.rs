// src/audit/mod.rs

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Default run-scoped log location, relative to the working directory.
pub const LOG_FILE_NAME: &str = "soap_log.csv";

pub const NOT_APPLICABLE: &str = "N/A";

const HEADER: [&str; 5] = [
    "nombre_archivo",
    "numero_linea",
    "http_status",
    "resultado",
    "detalle_error",
];

/// Terminal classification of one file or row. The strings are part of the
/// log format consumed downstream; they never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok,
    OmitidoCabecera,
    OmitidoNulos,
    ErrorDatosFila,
    ErrorProcesandoFila,
    ErrorConexion,
    ErrorHttp,
    ErrorLecturaProcesoArchivo,
}

impl ResultCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Ok => "OK",
            ResultCode::OmitidoCabecera => "OMITIDO_CABECERA",
            ResultCode::OmitidoNulos => "OMITIDO_NULOS",
            ResultCode::ErrorDatosFila => "ERROR_DATOS_FILA",
            ResultCode::ErrorProcesandoFila => "ERROR_PROCESANDO_FILA",
            ResultCode::ErrorConexion => "ERROR_CONEXION",
            ResultCode::ErrorHttp => "ERROR_HTTP",
            ResultCode::ErrorLecturaProcesoArchivo => "ERROR_LECTURA_PROCESO_ARCHIVO",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only CSV audit log. Created fresh (truncated) at run start with a
/// fixed header; every append opens, writes one fully quoted record, flushes
/// and closes, so a mid-run crash loses at most the in-flight record.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)
            .with_context(|| format!("creating audit log `{}`", path.display()))?;
        let mut writer = quoted_writer(file);
        writer.write_record(HEADER).context("writing audit header")?;
        writer.flush().context("flushing audit header")?;
        Ok(AuditLog { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one outcome record. `line` and `status` print as `N/A` when
    /// absent (file-level outcomes, pre-submission skips, no response).
    pub fn append(
        &self,
        file_name: &str,
        line: Option<u32>,
        status: Option<u16>,
        code: ResultCode,
        detail: &str,
    ) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening audit log `{}`", self.path.display()))?;
        let mut writer = quoted_writer(file);

        let line_field = line.map_or_else(|| NOT_APPLICABLE.to_string(), |l| l.to_string());
        let status_field = status.map_or_else(|| NOT_APPLICABLE.to_string(), |s| s.to_string());
        writer
            .write_record([
                file_name,
                line_field.as_str(),
                status_field.as_str(),
                code.as_str(),
                detail,
            ])
            .context("writing audit record")?;
        writer.flush().context("flushing audit record")?;
        Ok(())
    }
}

fn quoted_writer(file: File) -> csv::Writer<File> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(file)
}
