use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::sheet::{Cell, Sheet};
use super::{
    AssignmentRepository, Recipient, EMAIL_SENT_COLUMN, FIRST_NAME_COLUMN, LAST_NAME_COLUMN,
    RECIPIENT_EMAIL_COLUMN, SENDER_EMAIL_COLUMN, SENDER_NAME_COLUMN,
};
use crate::error::{AppError, Result};
use crate::session::normalize_email;

#[derive(Debug, Clone, Copy)]
struct Columns {
    sender_email: usize,
    sender_name: usize,
    first_name: usize,
    last_name: usize,
    recipient_email: usize,
}

impl Columns {
    fn locate(sheet: &Sheet) -> Result<Self> {
        let find = |header: &str| {
            sheet
                .column(header)
                .ok_or_else(|| AppError::Spreadsheet(format!("missing column '{}'", header)))
        };

        Ok(Self {
            sender_email: find(SENDER_EMAIL_COLUMN)?,
            sender_name: find(SENDER_NAME_COLUMN)?,
            first_name: find(FIRST_NAME_COLUMN)?,
            last_name: find(LAST_NAME_COLUMN)?,
            recipient_email: find(RECIPIENT_EMAIL_COLUMN)?,
        })
    }
}

struct Inner {
    sheet: Sheet,
    /// Sender email -> rows still pending when the file was loaded.
    assignments: HashMap<String, Vec<usize>>,
}

/// Assignment repository reading and rewriting the recipients workbook.
///
/// The table is read once; `mark_sent` rewrites the whole file.
pub struct XlsxAssignmentRepository {
    path: PathBuf,
    columns: Columns,
    inner: RwLock<Inner>,
}

impl XlsxAssignmentRepository {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let sheet = Sheet::load(&path)?;
        let columns = Columns::locate(&sheet)?;
        let sent_col = sheet.column(EMAIL_SENT_COLUMN);

        let mut assignments: HashMap<String, Vec<usize>> = HashMap::new();
        let mut skipped = 0usize;
        for row in 0..sheet.rows.len() {
            if sent_col.is_some_and(|col| sheet.cell(row, col).is_truthy()) {
                continue;
            }
            let sender = normalize_email(&sheet.cell(row, columns.sender_email).text());
            if sender.is_empty() {
                skipped += 1;
                continue;
            }
            assignments.entry(sender).or_default().push(row);
        }

        if skipped > 0 {
            tracing::warn!(skipped, "Rows without a sender email were ignored");
        }
        tracing::info!(
            path = %path.display(),
            rows = sheet.rows.len(),
            senders = assignments.len(),
            "Recipient assignments loaded"
        );

        Ok(Self {
            path,
            columns,
            inner: RwLock::new(Inner { sheet, assignments }),
        })
    }

    fn recipient(&self, sheet: &Sheet, row: usize) -> Recipient {
        let c = self.columns;
        let full_name = sheet.cell(row, c.sender_name).text();
        Recipient {
            recipient_fname: sheet.cell(row, c.first_name).text(),
            recipient_lname: sheet.cell(row, c.last_name).text(),
            recipient_email: sheet.cell(row, c.recipient_email).text(),
            sender_name: full_name.split_whitespace().next().unwrap_or("").to_string(),
            row_index: row,
        }
    }
}

#[async_trait]
impl AssignmentRepository for XlsxAssignmentRepository {
    async fn pending_for(&self, sender_email: &str) -> Vec<Recipient> {
        let inner = self.inner.read().await;
        let sent_col = inner.sheet.column(EMAIL_SENT_COLUMN);

        inner
            .assignments
            .get(&normalize_email(sender_email))
            .map(|rows| {
                rows.iter()
                    .copied()
                    .filter(|&row| !sent_col.is_some_and(|col| inner.sheet.cell(row, col).is_truthy()))
                    .map(|row| self.recipient(&inner.sheet, row))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn mark_sent(&self, row_indices: &[usize]) -> Result<()> {
        if row_indices.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.write().await;
        let sent_col = inner.sheet.ensure_column(EMAIL_SENT_COLUMN);
        for &row in row_indices {
            if !inner.sheet.set_cell(row, sent_col, Cell::Text("TRUE".to_string())) {
                tracing::warn!(row, "Cannot mark unknown spreadsheet row as sent");
            }
        }

        inner.sheet.save(&self.path)?;
        tracing::info!(rows = row_indices.len(), path = %self.path.display(), "Spreadsheet updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;
    use std::path::Path;

    const HEADERS: [&str; 6] = [
        SENDER_EMAIL_COLUMN,
        SENDER_NAME_COLUMN,
        FIRST_NAME_COLUMN,
        LAST_NAME_COLUMN,
        RECIPIENT_EMAIL_COLUMN,
        EMAIL_SENT_COLUMN,
    ];

    enum Sent {
        No,
        Bool,
        Text,
    }

    fn write_fixture(path: &Path, rows: &[(&str, &str, &str, &str, &str, Sent)]) {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        for (c, h) in HEADERS.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (r, (sender, name, first, last, email, sent)) in rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, v) in [sender, name, first, last, email].iter().enumerate() {
                ws.write_string(r, c as u16, **v).unwrap();
            }
            match sent {
                Sent::No => {}
                Sent::Bool => {
                    ws.write_boolean(r, 5, true).unwrap();
                }
                Sent::Text => {
                    ws.write_string(r, 5, "TRUE").unwrap();
                }
            }
        }
        workbook.save(path).unwrap();
    }

    fn fixture(dir: &Path) -> PathBuf {
        let path = dir.join("recipients.xlsx");
        write_fixture(
            &path,
            &[
                ("User@X.com ", "Liga Ozola", "Anna", "Berzina", "anna@y.com", Sent::No),
                ("user@x.com", "Liga Ozola", "Juris", "Kalns", "juris@y.com", Sent::Bool),
                ("other@x.com", "Peteris", "Maris", "Liepa", "maris@y.com", Sent::No),
                ("user@x.com", "Liga Ozola", "Ilze", "Egle", "ilze@y.com", Sent::Text),
                ("", "Nobody", "Lost", "Row", "lost@y.com", Sent::No),
                ("user@x.com", "Liga Ozola", "Karlis", "Roze", "karlis@y.com", Sent::No),
            ],
        );
        path
    }

    #[tokio::test]
    async fn sent_rows_never_surface() {
        let dir = tempfile::tempdir().unwrap();
        let repo = XlsxAssignmentRepository::load(fixture(dir.path())).unwrap();

        let pending = repo.pending_for("user@x.com").await;
        let emails: Vec<_> = pending.iter().map(|r| r.recipient_email.as_str()).collect();
        assert_eq!(emails, vec!["anna@y.com", "karlis@y.com"]);
        assert_eq!(pending[0].row_index, 0);
        assert_eq!(pending[1].row_index, 5);
        assert_eq!(pending[0].sender_name, "Liga");
    }

    #[tokio::test]
    async fn sender_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let repo = XlsxAssignmentRepository::load(fixture(dir.path())).unwrap();

        assert_eq!(
            repo.pending_for("USER@x.COM").await,
            repo.pending_for("user@x.com").await
        );
        assert!(repo.pending_for("nobody@x.com").await.is_empty());
    }

    #[tokio::test]
    async fn mark_sent_updates_memory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path());
        let repo = XlsxAssignmentRepository::load(&path).unwrap();

        repo.mark_sent(&[0]).await.unwrap();

        let pending = repo.pending_for("user@x.com").await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].recipient_email, "karlis@y.com");

        let reloaded = XlsxAssignmentRepository::load(&path).unwrap();
        assert_eq!(reloaded.pending_for("user@x.com").await, pending);
        assert_eq!(reloaded.pending_for("other@x.com").await.len(), 1);
    }

    #[tokio::test]
    async fn mark_sent_adds_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_flag.xlsx");
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        for (c, h) in HEADERS[..5].iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (c, v) in ["a@x.com", "Ann Lee", "Bo", "Dee", "bo@y.com"].iter().enumerate() {
            ws.write_string(1, c as u16, *v).unwrap();
        }
        workbook.save(&path).unwrap();

        let repo = XlsxAssignmentRepository::load(&path).unwrap();
        assert_eq!(repo.pending_for("a@x.com").await.len(), 1);
        repo.mark_sent(&[0]).await.unwrap();

        let sheet = Sheet::load(&path).unwrap();
        assert_eq!(sheet.headers.last().map(String::as_str), Some(EMAIL_SENT_COLUMN));
        assert!(XlsxAssignmentRepository::load(&path)
            .unwrap()
            .pending_for("a@x.com")
            .await
            .is_empty());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        let mut workbook = Workbook::new();
        workbook.add_worksheet().write_string(0, 0, "Email").unwrap();
        workbook.save(&path).unwrap();

        let err = XlsxAssignmentRepository::load(&path).err().unwrap();
        assert!(err.to_string().contains("missing column 'Name'"));
    }
}
