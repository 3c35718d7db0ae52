use anyhow::{bail, Context, Result};
use std::io;

const PEOPLE: &str = r#"
    | name  | age
 1  | Alice | 15
 2  | Bob   | 32
 3  | Carole| 28
 4  | David | 35 "#;

#[derive(Debug, Clone, PartialEq)]
struct Table {
    columns: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

/// Parses a pipe-separated table whose first cell on each row is the row id
/// and whose first line holds the column names.
fn parse_markdown_table(source: &str) -> Result<Table> {
    let mut lines = source.lines().filter(|line| !line.trim().is_empty());

    let header = lines.next().context("table has no header line")?;
    let columns: Vec<String> = header
        .split('|')
        .skip(1)
        .map(|cell| cell.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let mut cells = line.split('|').map(str::trim);
        let id = cells.next().unwrap_or_default().to_string();
        let values: Vec<String> = cells.map(str::to_string).collect();

        if values.len() != columns.len() {
            bail!(
                "row {} has {} values, expected {}",
                index + 1,
                values.len(),
                columns.len()
            );
        }
        rows.push((id, values));
    }

    Ok(Table { columns, rows })
}

fn main() -> Result<()> {
    let table = parse_markdown_table(PEOPLE)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(io::stdout());

    let mut header = vec!["id".to_string()];
    header.extend(table.columns.iter().cloned());
    writer.write_record(&header)?;

    for (id, values) in &table.rows {
        let mut record = vec![id.clone()];
        record.extend(values.iter().cloned());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_people_table() {
        let table = parse_markdown_table(PEOPLE).unwrap();

        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0], ("1".to_string(), vec!["Alice".to_string(), "15".to_string()]));
        assert_eq!(table.rows[2].1[0], "Carole");
        assert_eq!(table.rows[3].1[1], "35");
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = parse_markdown_table("  | a | b\n 1 | x").unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
