//! Export writers for decoded capture events.
//!
//! Three destinations are supported, selected through [`ExportKind`]: an
//! SQLite table, an Excel workbook and a Microsoft Access database (the
//! latter only with the `access` feature).

use crate::types::CaptureEvent;
use rusqlite::{params, Connection};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during export.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] XlsxError),

    #[cfg(feature = "access")]
    #[error("ODBC error: {0}")]
    Odbc(#[from] odbc_api::Error),

    #[error("Unsupported export: {0}")]
    Unsupported(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// SQLite database (`db`)
    Tabular,
    /// Excel workbook (`xlsx`)
    Spreadsheet,
    /// Microsoft Access database (`accdb`)
    DesktopDatabase,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [Self::Tabular, Self::Spreadsheet, Self::DesktopDatabase];

    /// Short name, also the file extension.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tabular => "db",
            Self::Spreadsheet => "xlsx",
            Self::DesktopDatabase => "accdb",
        }
    }

    /// File written when no output path is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Tabular => "photos.db",
            Self::Spreadsheet => "photos.xlsx",
            Self::DesktopDatabase => "photos.accdb",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportKind {
    type Err = OutputError;

    /// Parses `db`, `xlsx` or `accdb` (case-insensitive, optional leading dot or dash).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches(['.', '-']).to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                OutputError::InvalidFormat(format!("Unknown export type: {}. Use db, xlsx or accdb", s))
            })
    }
}

/// Writes `events` to `path` using the writer selected by `kind`.
///
/// Returns the number of rows written.
pub fn export<P: AsRef<Path>>(
    kind: ExportKind,
    path: P,
    events: &[CaptureEvent],
) -> Result<usize, OutputError> {
    let path = path.as_ref();
    debug!(%kind, path = %path.display(), events = events.len(), "exporting");
    match kind {
        ExportKind::Tabular => write_sqlite(path, events),
        ExportKind::Spreadsheet => write_xlsx(path, events),
        ExportKind::DesktopDatabase => write_access(path, events),
    }
}

// ============================================================================
// SQLite
// ============================================================================

const SQLITE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date DATETIME,
    photo_number INTEGER,
    sticker TEXT
)";

/// Appends capture events to the `photos` table of an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Opens (or creates) the database and ensures the table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OutputError> {
        Self::new(Connection::open(path)?)
    }

    /// Wraps an existing connection, e.g. an in-memory database.
    pub fn new(conn: Connection) -> Result<Self, OutputError> {
        conn.execute_batch(SQLITE_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts all events in a single transaction. Existing rows are kept.
    pub fn write_events(&mut self, events: &[CaptureEvent]) -> Result<usize, OutputError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO photos (date, photo_number, sticker) VALUES (?1, ?2, ?3)")?;
            for event in events {
                stmt.execute(params![
                    event.formatted_timestamp(),
                    event.photo_number(),
                    event.sticker_kind().symbol(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(events.len())
    }

    /// Gives back the underlying connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

/// Appends capture events to an SQLite database file.
pub fn write_sqlite<P: AsRef<Path>>(path: P, events: &[CaptureEvent]) -> Result<usize, OutputError> {
    let path = path.as_ref();
    let mut writer = SqliteWriter::open(path)?;
    let rows = writer.write_events(events)?;
    info!(rows, path = %path.display(), "exported to SQLite database");
    Ok(rows)
}

// ============================================================================
// Excel
// ============================================================================

const XLSX_HEADERS: [&str; 3] = ["Date", "Photo Number", "Sticker"];
const XLSX_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Builds a single-sheet workbook with one row per capture.
pub struct XlsxWriter {
    workbook: Workbook,
    date_format: Format,
    next_row: u32,
}

impl XlsxWriter {
    /// Creates a workbook and writes the header row.
    pub fn new() -> Result<Self, OutputError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        for (col, title) in (0u16..).zip(XLSX_HEADERS) {
            sheet.write_string_with_format(0, col, title, &bold)?;
        }
        sheet.set_column_width(0, 20)?;
        sheet.set_column_width(1, 14)?;

        Ok(Self {
            workbook,
            date_format: Format::new().set_num_format(XLSX_DATE_FORMAT),
            next_row: 1,
        })
    }

    /// Appends a batch of capture events below the rows already written.
    pub fn write_events(&mut self, events: &[CaptureEvent]) -> Result<(), OutputError> {
        let sheet = self.workbook.worksheet_from_index(0)?;
        for event in events {
            let row = self.next_row;
            sheet.write_datetime_with_format(row, 0, &event.naive_timestamp(), &self.date_format)?;
            sheet.write_number(row, 1, event.photo_number())?;
            let symbol = event.sticker_kind().symbol();
            if !symbol.is_empty() {
                sheet.write_string(row, 2, symbol)?;
            }
            self.next_row += 1;
        }
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        (self.next_row - 1) as usize
    }

    /// Saves the workbook, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), OutputError> {
        self.workbook.save(path.as_ref())?;
        Ok(())
    }
}

/// Writes capture events to a new Excel workbook.
pub fn write_xlsx<P: AsRef<Path>>(path: P, events: &[CaptureEvent]) -> Result<usize, OutputError> {
    let path = path.as_ref();
    let mut writer = XlsxWriter::new()?;
    writer.write_events(events)?;
    writer.save(path)?;
    info!(rows = writer.rows(), path = %path.display(), "exported to Excel file");
    Ok(writer.rows())
}

// ============================================================================
// Microsoft Access
// ============================================================================

/// ODBC connection string for an Access database file.
pub fn access_connection_string(path: &Path) -> String {
    format!(
        "Driver={{Microsoft Access Driver (*.mdb, *.accdb)}};DBQ={};",
        path.display()
    )
}

#[cfg(feature = "access")]
const ACCESS_SCHEMA: &str = "CREATE TABLE photos (
    ID AUTOINCREMENT PRIMARY KEY,
    [Date] DATETIME,
    PhotoNumber INTEGER,
    Sticker TEXT
)";

/// Appends capture events to the `photos` table of an Access database
/// through the system ODBC driver.
#[cfg(feature = "access")]
pub struct AccessWriter<'env> {
    conn: odbc_api::Connection<'env>,
}

#[cfg(feature = "access")]
impl<'env> AccessWriter<'env> {
    /// Connects to the database file and ensures the table exists.
    pub fn open<P: AsRef<Path>>(
        env: &'env odbc_api::Environment,
        path: P,
    ) -> Result<Self, OutputError> {
        let conn = env.connect_with_connection_string(
            &access_connection_string(path.as_ref()),
            odbc_api::ConnectionOptions::default(),
        )?;

        // Access SQL has no IF NOT EXISTS. A real failure resurfaces on insert.
        if let Err(e) = conn.execute(ACCESS_SCHEMA, ()) {
            tracing::warn!(error = %e, "photos table not created, assuming it exists");
        }
        Ok(Self { conn })
    }

    /// Inserts all events in a single transaction. Existing rows are kept.
    pub fn write_events(&mut self, events: &[CaptureEvent]) -> Result<usize, OutputError> {
        use odbc_api::IntoParameter;

        self.conn.set_autocommit(false)?;
        for event in events {
            let date = event.formatted_timestamp();
            let photo_number = i32::from(event.photo_number());
            self.conn.execute(
                "INSERT INTO photos ([Date], PhotoNumber, Sticker) VALUES (?, ?, ?)",
                (
                    &date.as_str().into_parameter(),
                    &photo_number,
                    &event.sticker_kind().symbol().into_parameter(),
                ),
            )?;
        }
        self.conn.commit()?;
        self.conn.set_autocommit(true)?;
        Ok(events.len())
    }
}

/// Appends capture events to an Access database file.
#[cfg(feature = "access")]
pub fn write_access<P: AsRef<Path>>(path: P, events: &[CaptureEvent]) -> Result<usize, OutputError> {
    let path = path.as_ref();
    let env = odbc_api::Environment::new()?;
    let mut writer = AccessWriter::open(&env, path)?;
    let rows = writer.write_events(events)?;
    info!(rows, path = %path.display(), "exported to Access database");
    Ok(rows)
}

#[cfg(not(feature = "access"))]
pub fn write_access<P: AsRef<Path>>(path: P, _events: &[CaptureEvent]) -> Result<usize, OutputError> {
    Err(OutputError::Unsupported(format!(
        "cannot write {}: Access export requires the `access` feature",
        path.as_ref().display()
    )))
}
