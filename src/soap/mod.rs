// src/soap/mod.rs

use thiserror::Error;

use crate::extract::{dates, RawTable, Value};

/// The five columns a sheet must declare, in the order the remote schema
/// lists them.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "CDIAPTO",
    "FECHA_EVENTO",
    "PNR_CODE",
    "ASIENTO",
    "TARJETA_FIDELIZACION",
];

#[derive(Debug, Error)]
pub enum RowError {
    #[error("Falta la columna esperada: {0}")]
    MissingColumn(String),
}

/// One validated business event, field values already rendered as text and
/// the event date normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub cdi_apto: String,
    pub fecha_evento: String,
    pub pnr: String,
    pub asiento: String,
    pub tarjeta_fidelizacion: String,
}

impl EventRecord {
    /// Pull the five required fields out of a row. The header check upstream
    /// should make `MissingColumn` impossible, but the guard stays so a bad
    /// row classifies as a data error instead of panicking.
    pub fn from_row(table: &RawTable, row: &[Value]) -> Result<Self, RowError> {
        let field = |name: &str| -> Result<&Value, RowError> {
            table
                .column_index(name)
                .and_then(|idx| row.get(idx))
                .ok_or_else(|| RowError::MissingColumn(name.to_string()))
        };

        Ok(EventRecord {
            cdi_apto: field("CDIAPTO")?.render_text(),
            fecha_evento: dates::normalize_event_date(field("FECHA_EVENTO")?),
            pnr: field("PNR_CODE")?.render_text(),
            asiento: field("ASIENTO")?.render_text(),
            tarjeta_fidelizacion: field("TARJETA_FIDELIZACION")?.render_text(),
        })
    }
}

/// `raw_values` disables XML text escaping, reproducing the legacy
/// byte-for-byte interpolation for wire-compat fixtures. Escaped is the
/// default; raw mode corrupts the envelope if a field carries `&` or `<`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeOptions {
    pub raw_values: bool,
}

/// Build the SOAP 1.2 envelope for one event. Namespaces, element names and
/// nesting are fixed by the remote service and must not change.
pub fn build_envelope(record: &EventRecord, options: EnvelopeOptions) -> String {
    let text = |s: &str| {
        if options.raw_values {
            s.to_string()
        } else {
            escape_text(s)
        }
    };

    format!(
        r#"<soap12:Envelope xmlns:soap12="http://www.w3.org/2003/05/soap-envelope">
  <soap12:Body>
    <ns2:EventoPNR xmlns:ns2="http://ejemplo.com/eventoPNR/v1">
      <cdiApto>{}</cdiApto>
      <fechaEvento>{}</fechaEvento>
      <pnr>{}</pnr>
      <asiento>{}</asiento>
      <tarjetaFidelizacion>{}</tarjetaFidelizacion>
    </ns2:EventoPNR>
  </soap12:Body>
</soap12:Envelope>"#,
        text(&record.cdi_apto),
        text(&record.fecha_evento),
        text(&record.pnr),
        text(&record.asiento),
        text(&record.tarjeta_fidelizacion),
    )
}

/// Escape the characters that are meaningful in XML element text.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Value;

    fn sample_record() -> EventRecord {
        EventRecord {
            cdi_apto: "MAD".into(),
            fecha_evento: "2023-10-26".into(),
            pnr: "ABC123".into(),
            asiento: "10A".into(),
            tarjeta_fidelizacion: "F123456".into(),
        }
    }

    #[test]
    fn envelope_matches_wire_format() {
        let expected = r#"<soap12:Envelope xmlns:soap12="http://www.w3.org/2003/05/soap-envelope">
  <soap12:Body>
    <ns2:EventoPNR xmlns:ns2="http://ejemplo.com/eventoPNR/v1">
      <cdiApto>MAD</cdiApto>
      <fechaEvento>2023-10-26</fechaEvento>
      <pnr>ABC123</pnr>
      <asiento>10A</asiento>
      <tarjetaFidelizacion>F123456</tarjetaFidelizacion>
    </ns2:EventoPNR>
  </soap12:Body>
</soap12:Envelope>"#;
        assert_eq!(build_envelope(&sample_record(), EnvelopeOptions::default()), expected);
    }

    #[test]
    fn field_text_is_escaped_by_default() {
        let mut record = sample_record();
        record.pnr = "A&B <X>".into();
        let envelope = build_envelope(&record, EnvelopeOptions::default());
        assert!(envelope.contains("<pnr>A&amp;B &lt;X&gt;</pnr>"));
    }

    #[test]
    fn raw_mode_reproduces_legacy_interpolation() {
        let mut record = sample_record();
        record.pnr = "A&B".into();
        let envelope = build_envelope(&record, EnvelopeOptions { raw_values: true });
        assert!(envelope.contains("<pnr>A&B</pnr>"));
    }

    #[test]
    fn from_row_reads_fields_by_header_name() {
        let table = RawTable {
            headers: vec![
                "EXTRA".into(),
                "CDIAPTO".into(),
                "FECHA_EVENTO".into(),
                "PNR_CODE".into(),
                "ASIENTO".into(),
                "TARJETA_FIDELIZACION".into(),
            ],
            rows: vec![],
        };
        let row = vec![
            Value::Text("ignored".into()),
            Value::Text("BCN".into()),
            Value::Text("12/03/2025".into()),
            Value::Text("XYZ789".into()),
            Value::Text("20B".into()),
            Value::Number(789012.0),
        ];
        let record = EventRecord::from_row(&table, &row).unwrap();
        assert_eq!(record.cdi_apto, "BCN");
        assert_eq!(record.fecha_evento, "2025-03-12");
        assert_eq!(record.pnr, "XYZ789");
        assert_eq!(record.asiento, "20B");
        assert_eq!(record.tarjeta_fidelizacion, "789012");
    }

    #[test]
    fn from_row_flags_missing_column() {
        let table = RawTable {
            headers: vec!["CDIAPTO".into()],
            rows: vec![],
        };
        let row = vec![Value::Text("MAD".into())];
        let err = EventRecord::from_row(&table, &row).unwrap_err();
        assert!(matches!(err, RowError::MissingColumn(ref c) if c == "FECHA_EVENTO"));
    }
}
